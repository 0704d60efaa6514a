//! HTTP API for the submission server

pub mod handlers;
pub mod server;

pub use server::{build_router, AppContext};
