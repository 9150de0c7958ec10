//! Scribe Chat
//!
//! Answers reader questions from ingested articles:
//! embed the question -> similarity search -> grounded prompt ->
//! one generation call -> flat-prose sanitation. Every failure path ends
//! in fixed, calm copy; raw errors never reach the reader.

pub mod composer;
pub mod prompts;
pub mod retrieval;
pub mod sanitize;
pub mod service;

pub use composer::{AnswerComposer, AskRequest};
pub use retrieval::{Retrieval, RetrievalEngine};
pub use sanitize::clean_text_output;
pub use service::ChatService;
