//! HTTP server module for the statistics API.

mod handlers;
mod middleware;
mod server;

pub use server::{router, AppState, HttpServer};
