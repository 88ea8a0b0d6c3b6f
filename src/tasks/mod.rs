//! Background Tasks Module
//!
//! Contains background tasks owned by the cache.
//!
//! # Tasks
//! - Reaper: removes expired cache entries at the configured interval

mod reaper;

pub use reaper::Reaper;
