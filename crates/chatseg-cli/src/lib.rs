//! chatseg command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (segmentation, export, normalization)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, SegmentArgs};
pub use commands::{
    handle_gap, handle_hybrid, handle_normalize_telegram, handle_reply_chain, init_logging,
    load_settings, run_segmentor,
};
