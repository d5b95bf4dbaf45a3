#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts
)]

pub mod api;
pub mod domain;

pub mod application;
pub mod infrastructure;

pub use application::{ServerConfig, ServerData};
pub use infrastructure::server_impl::connection::{serve, serve_connection};

pub type AnyResult<T> = eyre::Result<T>;
