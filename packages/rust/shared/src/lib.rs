//! Shared types, error model, and configuration for Lexi.
//!
//! This crate is the foundation depended on by all other Lexi crates.
//! It provides:
//! - [`LexiError`]: the unified error type
//! - Domain types ([`KnowledgeRecord`], [`Citation`], [`Message`], [`Role`], [`MessageId`])
//! - Configuration ([`AppConfig`], [`AssistantSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AssistantConfig, AssistantSettings, DocumentsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_config,
};
pub use error::{LexiError, Result};
pub use types::{Citation, KnowledgeRecord, Message, MessageId, Role};
