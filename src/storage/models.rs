use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What caused a rotation of the global token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationTrigger {
    /// Admin-initiated rotation or manual override.
    Manual,
    /// Fired by the background rotation scheduler.
    Scheduled,
}

/// Durable copy of the current global token.
///
/// This is a cache of the ephemeral store's value kept purely for cold-start
/// recovery; it is rewritten on every rotation and never read outside
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// When the rotation that produced this token happened
    pub rotated_at: DateTime<Utc>,
    /// What caused that rotation
    pub trigger: RotationTrigger,
    /// The 6-digit (or manually set 4-digit) token value
    pub value: String,
}
