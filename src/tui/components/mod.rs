pub mod header;
pub mod input;
pub mod message_list;
pub mod sample_questions;

pub use header::{render_header, HEADER_HEIGHT};
pub use input::ChatInput;
pub use message_list::MessageList;
pub use sample_questions::SampleQuestions;
