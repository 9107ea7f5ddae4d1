pub mod api;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod sudo;
pub mod transport;

pub use envelope::{NormalizedResult, Normalizer};
pub use error::{ApiError, ErrorKind, TransportError};
pub use notify::Notifier;
