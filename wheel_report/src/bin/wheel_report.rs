use anyhow::Result;
use clap::Parser;
use wheel_report::cli::{Cli, init_tracing, run};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = run(cli).await?;
    print!("{output}");
    Ok(())
}
