use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    Guest,
    Free,
    Paid,
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserTier::Guest => "guest",
            UserTier::Free => "free",
            UserTier::Paid => "paid",
        };
        write!(f, "{}", s)
    }
}

/// Tiers reachable by signing in. Guest is only reachable through logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignedInTier {
    Free,
    Paid,
}

impl From<SignedInTier> for UserTier {
    fn from(t: SignedInTier) -> Self {
        match t {
            SignedInTier::Free => UserTier::Free,
            SignedInTier::Paid => UserTier::Paid,
        }
    }
}

impl std::str::FromStr for SignedInTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(SignedInTier::Free),
            "paid" | "pro" => Ok(SignedInTier::Paid),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// Tier-specific counters. Only the counters of the active tier exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum Entitlement {
    Guest,
    Free {
        scans_today: u32,
        /// Calendar day `scans_today` belongs to.
        day: NaiveDate,
    },
    Paid {
        ai_credits: u32,
    },
}

impl Entitlement {
    pub fn tier(&self) -> UserTier {
        match self {
            Entitlement::Guest => UserTier::Guest,
            Entitlement::Free { .. } => UserTier::Free,
            Entitlement::Paid { .. } => UserTier::Paid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub identity: Option<String>,
    pub email: Option<String>,
    /// Scans spent while browsing as a guest.
    pub total_guest_scans: u32,
    pub entitlement: Entitlement,
}

impl User {
    pub fn guest() -> Self {
        Self {
            identity: None,
            email: None,
            total_guest_scans: 0,
            entitlement: Entitlement::Guest,
        }
    }

    pub fn tier(&self) -> UserTier {
        self.entitlement.tier()
    }

    pub fn is_guest(&self) -> bool {
        self.identity.is_none()
    }

    /// Remaining AI credits; zero for anyone who is not on the paid tier.
    pub fn ai_credits(&self) -> u32 {
        match self.entitlement {
            Entitlement::Paid { ai_credits } => ai_credits,
            _ => 0,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::guest()
    }
}
