//! # chatseg-types
//!
//! Shared domain types for chat topic segmentation.
//!
//! This crate defines:
//! - `ChatMessage` and `Topic`: the immutable message record and the window type
//! - The message repository: validated JSON loading, sorted by timestamp
//! - Telegram export normalization into canonical records
//! - `Settings`: layered configuration for every strategy
//!
//! ## Usage
//!
//! ```rust
//! use chatseg_types::parse_messages;
//!
//! let raw = br#"[{"id": 1, "user": "user1", "text": "hi", "timestamp": 10}]"#;
//! let messages = parse_messages(raw).unwrap();
//! assert_eq!(messages.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod repository;
pub mod telegram;

pub use config::{GapConfig, HybridConfig, ReplyChainConfig, Settings};
pub use error::TypesError;
pub use message::{topic_ids, ChatMessage, Topic};
pub use repository::{load_messages, parse_messages};
pub use telegram::{normalize_export, normalize_export_file};
