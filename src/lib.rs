pub mod app;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod goals;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod testing;
