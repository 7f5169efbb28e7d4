//! Transport layer: wire-format details (JSON bodies sent to and received from Textfully).

mod message;

pub use message::{decode_error_envelope, decode_message_response, encode_message};
