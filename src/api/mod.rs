//! Client side of the retrieval-augmented chat backend
//!
//! The backend exposes a single route, `POST /chat`, taking a question and
//! returning an answer with the document fragments it was built from.

mod client;
mod errors;
mod types;

pub use client::{ChatBackend, HttpChatBackend};
pub use errors::{ApiError, ApiResult};
pub use types::{ChatResponse, Source};
