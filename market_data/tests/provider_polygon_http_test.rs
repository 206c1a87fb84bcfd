//! Drives `PolygonProvider` against a local listener serving canned responses.
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use market_data::providers::{
    MarketDataProvider, ProviderError,
    polygon_rest::{PolygonConfig, PolygonProvider},
};
use secrecy::SecretString;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

const SNAPSHOT_BODY: &str =
    r#"{"status":"OK","ticker":{"ticker":"AAPL","lastTrade":{"p":150.0},"prevDay":{"c":148.2}}}"#;
const RATE_LIMITED_BODY: &str = r#"{"status":"ERROR","error":"exceeded the maximum requests per minute"}"#;

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Serves `responses` in order, one per connection, and counts the requests.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);

            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base_url, hits)
}

fn provider(base_url: String) -> PolygonProvider {
    PolygonProvider::with_api_key(
        SecretString::new("test-key".to_string().into()),
        PolygonConfig {
            base_url,
            retry_delay: Duration::from_millis(10),
            ..Default::default()
        },
    )
    .expect("Failed to create PolygonProvider")
}

#[tokio::test]
async fn rate_limited_request_is_retried_once() {
    let (base_url, hits) = serve(vec![(429, RATE_LIMITED_BODY), (200, SNAPSHOT_BODY)]).await;

    let quote = provider(base_url).fetch_quote("AAPL").await.unwrap();
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.last_price, 150.0);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn second_rate_limit_gives_up() {
    let (base_url, hits) = serve(vec![(429, RATE_LIMITED_BODY), (429, RATE_LIMITED_BODY)]).await;

    let err = provider(base_url).fetch_quote("AAPL").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::RateLimited { attempts: 2, .. }),
        "unexpected error: {err:?}"
    );
    assert!(err.is_rate_limited());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn server_error_is_reported_without_retry() {
    let (base_url, hits) = serve(vec![(500, "upstream down")]).await;

    let err = provider(base_url).fetch_quote("AAPL").await.unwrap_err();
    match err {
        ProviderError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (base_url, hits) = serve(vec![(200, "<html>maintenance</html>")]).await;

    let err = provider(base_url).fetch_quote("AAPL").await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Decode { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
