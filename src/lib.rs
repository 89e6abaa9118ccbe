//! VibeFeed recommendation service
//!
//! The feed engine lives in [`services::scorer`] and [`services::feed`]; both
//! are synchronous and side-effect free. [`api`] wraps them in an axum service
//! holding a single in-memory session.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
