//! Typed Rust client for the Textfully SMS HTTP API.
//!
//! The crate is split into a domain layer of validated types, a transport layer for the
//! JSON wire format, and a small client layer that performs the single `POST /messages`
//! round trip and classifies the outcome.
//!
//! ```rust,no_run
//! use textfully::{TextfullyClient, TextfullyError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TextfullyError> {
//!     let client = TextfullyClient::new("tx_apikey");
//!     let response = client.send("+16175555555", "Hello, world!").await?;
//!     println!("queued {} ({})", response.id, response.status);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{ErrorKind, TextfullyClient, TextfullyClientBuilder, TextfullyError};
pub use domain::{ApiError, ApiKey, MessageRequest, MessageResponse, PhoneNumber, ValidationError};
