//! Command implementations for chatseg.
//!
//! Handles:
//! - gap / reply-chain / hybrid: build a segmentor, run it, export or print
//! - normalize-telegram: rewrite a Telegram export as canonical messages

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use chatseg_export::export_topics_csv;
use chatseg_segment::{GapSegmentor, HybridSegmentor, ReplyChainSegmentor, TopicSegmentor};
use chatseg_types::{normalize_export_file, Settings, Topic};

use crate::cli::SegmentArgs;

/// Topics printed in a summary before the rest are elided
const SUMMARY_PREVIEW: usize = 5;

/// Load settings and apply the global log level override.
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn topic_size(settings: &Settings, args: &SegmentArgs) -> usize {
    args.topic_size.unwrap_or(settings.topic_size)
}

/// Run the gap strategy. Returns the number of topics found.
pub fn handle_gap(
    settings: &Settings,
    args: &SegmentArgs,
    max_gap_seconds: Option<i64>,
) -> Result<usize> {
    let mut config = settings.gap.clone();
    if let Some(gap) = max_gap_seconds {
        config.max_gap_seconds = gap;
    }

    let segmentor = GapSegmentor::new(topic_size(settings, args), config)
        .context("Invalid gap segmentor configuration")?;
    run_segmentor(&segmentor, args)
}

/// Run the reply-chain strategy. Returns the number of topics found.
pub fn handle_reply_chain(
    settings: &Settings,
    args: &SegmentArgs,
    max_chain_hops: Option<usize>,
    allow_overlap: bool,
) -> Result<usize> {
    let mut config = settings.reply_chain.clone();
    if let Some(hops) = max_chain_hops {
        config.max_chain_hops = hops;
    }
    if allow_overlap {
        config.non_overlapping = false;
    }

    let segmentor = ReplyChainSegmentor::new(topic_size(settings, args), config)
        .context("Invalid reply-chain segmentor configuration")?;
    run_segmentor(&segmentor, args)
}

/// Run the hybrid strategy. Returns the number of topics found.
pub fn handle_hybrid(
    settings: &Settings,
    args: &SegmentArgs,
    max_gap_seconds: Option<i64>,
    threshold: Option<f64>,
    vectorizer: Option<&str>,
    classifier: Option<&str>,
) -> Result<usize> {
    let mut config = settings.hybrid.clone();
    if let Some(gap) = max_gap_seconds {
        config.max_gap_seconds = gap;
    }
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    if let Some(path) = vectorizer {
        config.vectorizer_path = path.to_string();
    }
    if let Some(path) = classifier {
        config.classifier_path = path.to_string();
    }

    let segmentor = HybridSegmentor::new(topic_size(settings, args), config)
        .context("Failed to build hybrid segmentor")?;
    run_segmentor(&segmentor, args)
}

/// Segment the input file, then export or print the topics.
pub fn run_segmentor(segmentor: &dyn TopicSegmentor, args: &SegmentArgs) -> Result<usize> {
    let topics = segmentor
        .get_topics(&args.input)
        .with_context(|| format!("Failed to segment {:?}", args.input))?;

    match &args.output {
        Some(_) if topics.is_empty() => {
            warn!(input = ?args.input, "No topics found, nothing exported");
        }
        Some(output) => {
            let rows = export_topics_csv(output, &topics)
                .with_context(|| format!("Failed to export topics to {:?}", output))?;
            println!("Exported {} topics to {:?}", rows, output);
        }
        None => print_summary(&topics, segmentor.topic_size()),
    }
    Ok(topics.len())
}

fn print_summary(topics: &[Topic], topic_size: usize) {
    println!("Found {} topics of {} messages", topics.len(), topic_size);

    for (i, topic) in topics.iter().take(SUMMARY_PREVIEW).enumerate() {
        println!();
        println!("Topic {}:", i + 1);
        for message in topic {
            let when = message
                .datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| message.timestamp.to_string());
            println!("  [{}] {}", when, message.render());
        }
    }

    if topics.len() > SUMMARY_PREVIEW {
        println!();
        println!("... and {} more", topics.len() - SUMMARY_PREVIEW);
    }
}

/// Normalize a Telegram export. Returns the number of messages written.
pub fn handle_normalize_telegram(input: &Path, output: &Path) -> Result<usize> {
    let messages = normalize_export_file(input)
        .with_context(|| format!("Failed to read Telegram export {:?}", input))?;

    let file =
        File::create(output).with_context(|| format!("Failed to create {:?}", output))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &messages)
        .context("Failed to write normalized messages")?;
    writer.flush().context("Failed to write normalized messages")?;

    info!(messages = messages.len(), output = ?output, "Normalized Telegram export");
    println!("Wrote {} messages to {:?}", messages.len(), output);
    Ok(messages.len())
}
