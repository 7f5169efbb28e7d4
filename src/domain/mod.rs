//! Domain layer: strong types with validation and invariants (no I/O).

mod api_error;
mod request;
mod response;
mod validation;
mod value;

pub use api_error::ApiError;
pub use request::MessageRequest;
pub use response::MessageResponse;
pub use validation::ValidationError;
pub use value::{ApiKey, PhoneNumber};
