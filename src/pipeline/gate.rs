//! Entitlement Gate
//!
//! Pure tier checks. Each gated stage declares its minimum tier, so adding a
//! gated stage never touches pipeline control flow.

use serde::{Deserialize, Serialize};

/// Subscription tiers, ordered from least to most entitled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            _ => Err(format!(
                "Unknown subscription tier: {}. Valid values: free, premium",
                s
            )),
        }
    }
}

/// Stages that require an entitlement check before they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatedStage {
    /// Final document generation and export
    Download,
}

impl GatedStage {
    pub fn required_tier(&self) -> SubscriptionTier {
        match self {
            Self::Download => SubscriptionTier::Premium,
        }
    }
}

impl std::fmt::Display for GatedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
        }
    }
}

pub fn can_proceed(tier: SubscriptionTier, stage: GatedStage) -> bool {
    tier >= stage.required_tier()
}
