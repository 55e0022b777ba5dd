//! TUI screens.
//!
//! The chat screen is always visible; the document screen is an overlay
//! shown while the session has a citation open. Screens turn key presses
//! into session [`Command`](lexi_core::Command)s and draw from snapshots.

mod chat;
mod document;

pub(crate) use chat::ChatScreen;
pub(crate) use document::DocumentScreen;
