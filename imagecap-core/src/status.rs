use serde::{Deserialize, Serialize};

pub const STATUS_IDLE: &str = "idle";
pub const STATUS_IN_FLIGHT: &str = "in_flight";
pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_DEGRADED_FALLBACK: &str = "degraded_fallback";
pub const STATUS_FAILED: &str = "failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    // The request never completed and a placeholder caption is shown instead.
    DegradedFallback,
    Failed,
}

impl RequestStatus {
    /// A stable string label for UI display.
    /// This is intentionally not derived from `Debug`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => STATUS_IDLE,
            Self::InFlight => STATUS_IN_FLIGHT,
            Self::Succeeded => STATUS_SUCCEEDED,
            Self::DegradedFallback => STATUS_DEGRADED_FALLBACK,
            Self::Failed => STATUS_FAILED,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::DegradedFallback | Self::Failed
        )
    }

    pub fn is_in_flight(self) -> bool {
        self == Self::InFlight
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
