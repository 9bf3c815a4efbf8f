// parceltrace-api: Async Rust client for the Parcels App tracking API (v3)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::TrackingClient;
pub use error::Error;
pub use transport::TransportConfig;
