//! Core conversation logic for Lexi.
//!
//! This crate ties the keyword knowledge store, the conversation controller,
//! and the document viewer model together behind a message-passing session
//! (see [`session::Session`]).

pub mod conversation;
pub mod knowledge;
pub mod session;
pub mod viewer;

pub use conversation::{Conversation, PendingQuery, Snapshot};
pub use knowledge::KnowledgeStore;
pub use session::{Command, Session, SessionHandle};
pub use viewer::{DocumentView, Fragment};
