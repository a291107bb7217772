//! CLI argument parsing for chatseg.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Chat topic segmentation
///
/// Cuts a chat log into fixed-size topic windows and optionally exports
/// them as a CSV table.
#[derive(Parser, Debug)]
#[command(name = "chatseg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/chatseg/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every segmentation command
#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    /// JSON array of chat messages
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write topics to this CSV file instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Messages per topic window
    #[arg(short, long)]
    pub topic_size: Option<usize>,
}

/// Segmentation commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split on time gaps between consecutive messages
    Gap {
        #[command(flatten)]
        args: SegmentArgs,

        /// Override the largest gap allowed inside a window
        #[arg(long)]
        max_gap_seconds: Option<i64>,
    },

    /// Follow reply links backward from each reply
    ReplyChain {
        #[command(flatten)]
        args: SegmentArgs,

        /// Override the maximum parent lookups per chain
        #[arg(long)]
        max_chain_hops: Option<usize>,

        /// Keep windows that share messages
        #[arg(long)]
        allow_overlap: bool,
    },

    /// Score sliding windows with the learned cohesion model
    Hybrid {
        #[command(flatten)]
        args: SegmentArgs,

        /// Override the session-splitting gap
        #[arg(long)]
        max_gap_seconds: Option<i64>,

        /// Override the minimum window probability
        #[arg(long)]
        threshold: Option<f64>,

        /// Override the vectorizer artifact path
        #[arg(long)]
        vectorizer: Option<String>,

        /// Override the classifier artifact path
        #[arg(long)]
        classifier: Option<String>,
    },

    /// Convert a Telegram desktop export into the message format
    NormalizeTelegram {
        /// Telegram `result.json`
        #[arg(short, long)]
        input: PathBuf,

        /// Destination JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}
