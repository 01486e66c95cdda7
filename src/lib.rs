pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod resolve;
pub mod session;

#[cfg(test)]
mod tests;
