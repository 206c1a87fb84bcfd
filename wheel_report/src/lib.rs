//! Wheel strategy report: fetches a quote, daily history and the option
//! chain for a symbol and renders ladders and calculator results as text.

pub mod cli;
pub mod config;
pub mod render;
pub mod report;
pub mod service;
