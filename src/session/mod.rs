//! Conversation state
//!
//! This module holds the in-memory chat history and the controller that
//! sends questions to the backend and merges the answers back in.

mod controller;
mod message;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::*;
pub use message::*;
