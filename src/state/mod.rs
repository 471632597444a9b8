//! Crawl state tracking
//!
//! This module defines the level-by-level state machine driven by the
//! crawl coordinator.

mod crawl_state;

pub use crawl_state::CrawlState;
