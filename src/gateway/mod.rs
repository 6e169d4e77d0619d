//! Gateway module - Startup health gate and server lifecycle

pub mod health_check;
pub mod server;

pub use health_check::{check_backend, StartupOutcome};
pub use server::{start, Server};
