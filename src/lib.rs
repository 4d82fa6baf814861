pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod loader;
pub mod model;
pub mod refresh;
pub mod render;
pub mod server;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests;
