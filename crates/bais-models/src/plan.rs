//! Plan tiers, pricing and storage limits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Storage limits in bytes for each plan tier.
pub const BASIC_STORAGE_LIMIT_BYTES: u64 = 1024 * 1024 * 1024; // 1 GiB
pub const PREMIUM_STORAGE_LIMIT_BYTES: u64 = 5 * 1024 * 1024 * 1024; // 5 GiB

/// Monthly prices in KRW.
pub const BASIC_PRICE_KRW: u32 = 9_900;
pub const PREMIUM_PRICE_KRW: u32 = 14_900;

/// Subscription plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Basic,
    Premium,
}

impl PlanTier {
    /// Parse from string (case-insensitive), defaulting to Basic.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "premium" => PlanTier::Premium,
            _ => PlanTier::Basic,
        }
    }

    /// Monthly price in KRW.
    pub fn price_krw(&self) -> u32 {
        match self {
            PlanTier::Basic => BASIC_PRICE_KRW,
            PlanTier::Premium => PREMIUM_PRICE_KRW,
        }
    }

    /// Storage limit in bytes for this plan.
    pub fn storage_limit_bytes(&self) -> u64 {
        match self {
            PlanTier::Basic => BASIC_STORAGE_LIMIT_BYTES,
            PlanTier::Premium => PREMIUM_STORAGE_LIMIT_BYTES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Premium => "premium",
        }
    }

    /// Item name used on payment gateway receipts.
    pub fn item_name(&self) -> String {
        format!("BAIS {} subscription", self.display_name())
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Basic => "Basic",
            PlanTier::Premium => "Premium",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage usage information for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StorageUsage {
    /// Total storage used in bytes.
    pub used_bytes: u64,
    /// Storage limit in bytes.
    pub limit_bytes: u64,
}

impl StorageUsage {
    pub fn new(used_bytes: u64, limit_bytes: u64) -> Self {
        Self {
            used_bytes,
            limit_bytes,
        }
    }

    /// Get usage as a percentage (0-100, may exceed 100 when over limit).
    pub fn percentage(&self) -> f64 {
        if self.limit_bytes == 0 {
            return 100.0;
        }
        (self.used_bytes as f64 / self.limit_bytes as f64) * 100.0
    }

    /// Check if adding bytes would exceed the limit.
    pub fn would_exceed(&self, additional_bytes: u64) -> bool {
        self.used_bytes.saturating_add(additional_bytes) > self.limit_bytes
    }

    /// Get remaining bytes.
    pub fn remaining_bytes(&self) -> u64 {
        self.limit_bytes.saturating_sub(self.used_bytes)
    }

    /// `used / limit` display string.
    pub fn display(&self) -> String {
        format!(
            "{} / {}",
            format_bytes(self.used_bytes),
            format_bytes(self.limit_bytes)
        )
    }
}

/// Format bytes as human-readable string (KB, MB, GB).
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tier_parsing() {
        assert_eq!(PlanTier::from_str("premium"), PlanTier::Premium);
        assert_eq!(PlanTier::from_str("PREMIUM"), PlanTier::Premium);
        assert_eq!(PlanTier::from_str("basic"), PlanTier::Basic);
        assert_eq!(PlanTier::from_str("unknown"), PlanTier::Basic);
    }

    #[test]
    fn test_plan_limits() {
        assert!(PlanTier::Premium.storage_limit_bytes() > PlanTier::Basic.storage_limit_bytes());
        assert!(PlanTier::Premium.price_krw() > PlanTier::Basic.price_krw());
    }

    #[test]
    fn test_storage_usage_percentage() {
        let usage = StorageUsage::new(512 * 1024 * 1024, 1024 * 1024 * 1024);
        assert!((usage.percentage() - 50.0).abs() < 0.01);

        // No plan means no quota
        let none = StorageUsage::new(1, 0);
        assert!((none.percentage() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_storage_usage_would_exceed() {
        let usage = StorageUsage::new(900, 1000);
        assert!(!usage.would_exceed(100));
        assert!(usage.would_exceed(101));
        assert_eq!(usage.remaining_bytes(), 100);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024 + 512 * 1024), "1.50 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }
}
