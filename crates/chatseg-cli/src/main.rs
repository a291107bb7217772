//! chatseg: chat topic segmentation
//!
//! # Usage
//!
//! ```bash
//! chatseg gap --input messages.json [--output topics.csv] [--max-gap-seconds N]
//! chatseg reply-chain --input messages.json [--max-chain-hops N] [--allow-overlap]
//! chatseg hybrid --input messages.json [--threshold P] [--vectorizer PATH] [--classifier PATH]
//! chatseg normalize-telegram --input result.json --output messages.json
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/chatseg/config.toml)
//! 3. Environment variables (CHATSEG_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use chatseg_cli::{
    handle_gap, handle_hybrid, handle_normalize_telegram, handle_reply_chain, init_logging,
    load_settings, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Gap {
            args,
            max_gap_seconds,
        } => {
            handle_gap(&settings, &args, max_gap_seconds)?;
        }
        Commands::ReplyChain {
            args,
            max_chain_hops,
            allow_overlap,
        } => {
            handle_reply_chain(&settings, &args, max_chain_hops, allow_overlap)?;
        }
        Commands::Hybrid {
            args,
            max_gap_seconds,
            threshold,
            vectorizer,
            classifier,
        } => {
            handle_hybrid(
                &settings,
                &args,
                max_gap_seconds,
                threshold,
                vectorizer.as_deref(),
                classifier.as_deref(),
            )?;
        }
        Commands::NormalizeTelegram { input, output } => {
            handle_normalize_telegram(&input, &output)?;
        }
    }

    Ok(())
}
