//! Topic segmentation strategies for chat logs.
//!
//! Provides:
//! - The `TopicSegmentor` contract shared by every strategy
//! - Time-gap segmentation
//! - Reply-chain segmentation over `reply_to_id` links
//! - Hybrid segmentation (session split + learned window scoring)
//! - Greedy non-overlapping window selection

pub mod error;
pub mod gap;
pub mod hybrid;
pub mod reply_chain;
pub mod segmentor;
pub mod selection;

pub use error::SegmentError;
pub use gap::{GapSegmentor, WindowBuilder};
pub use hybrid::{split_sessions, HybridSegmentor, ScoredWindow};
pub use reply_chain::ReplyChainSegmentor;
pub use segmentor::{TopicSegmentor, TopicSize};
pub use selection::{response_timestamp, select_non_overlapping, GreedySelector};
