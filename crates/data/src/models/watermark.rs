//! Per-profile sync watermark.

use serde::{Deserialize, Serialize};

/// The sync cursor for one profile: the most recently observed update
/// timestamp and the open-deal ids from the prior cycle.
///
/// Written only after a fully successful cycle, as its last step; a failed
/// or cancelled cycle leaves the previous watermark so the next attempt
/// re-fetches overlapping data (upserts make the overlap harmless).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWatermark {
    pub profile_id: String,

    /// Epoch millis of the most recently observed deal update; `None`
    /// before the first successful cycle (meaning: fetch everything).
    pub last_sync_time: Option<i64>,

    /// Ids of deals that were open at the end of the prior cycle, used by
    /// the autoSync short-circuit.
    pub active_deal_ids: Vec<i64>,
}

impl SyncWatermark {
    /// An empty watermark for a profile that has never synced.
    #[must_use]
    pub fn empty(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            last_sync_time: None,
            active_deal_ids: Vec::new(),
        }
    }
}
