pub mod error;
pub mod models;
pub mod transport;

pub use error::TransportError;
pub use models::{GenerationMetadata, GenerationRequest, GenerationResult};
pub use transport::{GenerationTransport, HttpTransport};
