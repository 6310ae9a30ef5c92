//! Sync cycle results surfaced to the trigger boundary.

/// Why a cycle was skipped without touching the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Profile has no API key/secret pair.
    MissingCredentials,
    /// Profile filters failed validation.
    InvalidFilters(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "missing API credentials"),
            Self::InvalidFilters(reason) => write!(f, "invalid profile filters: {reason}"),
        }
    }
}

/// Outcome of one deal-sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub profile_id: String,

    /// Deals normalized and persisted this cycle.
    pub deals_synced: usize,

    /// Watermark after the cycle, epoch millis.
    pub last_sync_time: Option<i64>,

    /// Set when the cycle was a configuration no-op.
    pub skipped: Option<SkipReason>,
}

impl SyncReport {
    /// A configuration no-op result.
    #[must_use]
    pub fn skipped(profile_id: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            profile_id: profile_id.into(),
            deals_synced: 0,
            last_sync_time: None,
            skipped: Some(reason),
        }
    }

    /// A completed-cycle result.
    #[must_use]
    pub fn completed(
        profile_id: impl Into<String>,
        deals_synced: usize,
        last_sync_time: Option<i64>,
    ) -> Self {
        Self {
            profile_id: profile_id.into(),
            deals_synced,
            last_sync_time,
            skipped: None,
        }
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.skipped {
            Some(reason) => write!(f, "profile {}: skipped ({reason})", self.profile_id),
            None => write!(
                f,
                "profile {}: {} deals synced, watermark {}",
                self.profile_id,
                self.deals_synced,
                self.last_sync_time
                    .map_or_else(|| "unset".to_string(), |t| t.to_string()),
            ),
        }
    }
}
