// File: src/ledger.rs

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use snapgrade_common::models::{Entitlement, SignedInTier, User, UserTier};

pub const GUEST_SCAN_LIMIT: u32 = 3;
pub const FREE_TIER_DAILY_LIMIT: u32 = 3;
pub const PAID_STARTING_CREDITS: u32 = 100;

/// Quota sizes for each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLimits {
    /// Lifetime basic scans for a guest session
    pub guest_scan_limit: u32,
    /// Basic scans per calendar day on the free tier
    pub free_daily_limit: u32,
    /// AI credits granted when signing in on the paid tier
    pub paid_starting_credits: u32,
}

impl Default for LedgerLimits {
    fn default() -> Self {
        Self {
            guest_scan_limit: GUEST_SCAN_LIMIT,
            free_daily_limit: FREE_TIER_DAILY_LIMIT,
            paid_starting_credits: PAID_STARTING_CREDITS,
        }
    }
}

/// Basic scans left for the active user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remaining {
    Limited(u32),
    /// Paid users are not metered on basic scans.
    Unlimited,
}

impl Remaining {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Remaining::Limited(0))
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            Remaining::Limited(n) => Some(*n),
            Remaining::Unlimited => None,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Limited(n) => write!(f, "{}", n),
            Remaining::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Source of "today" for the free tier's daily counter.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock();
        *today = *today + chrono::Days::new(days);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}

/// Holds the single active user and all quota bookkeeping.
///
/// Every check-then-mutate runs under one lock acquisition, so two callers
/// can never both observe "one scan left" and both spend it.
pub struct EntitlementLedger {
    user: Mutex<User>,
    limits: LedgerLimits,
    clock: Arc<dyn Clock>,
}

impl EntitlementLedger {
    pub fn new(limits: LedgerLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: LedgerLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            user: Mutex::new(User::guest()),
            limits,
            clock,
        }
    }

    pub fn limits(&self) -> &LedgerLimits {
        &self.limits
    }

    /// Copy of the current user record.
    pub fn snapshot(&self) -> User {
        self.user.lock().clone()
    }

    pub fn tier(&self) -> UserTier {
        self.user.lock().tier()
    }

    pub fn ai_credits(&self) -> u32 {
        self.user.lock().ai_credits()
    }

    /// Replaces the user with a fresh signed-in record for `tier`.
    ///
    /// Only guest -> free, guest -> paid and free -> paid are accepted.
    /// Anything else (signing in again on the current tier, or paid -> free)
    /// returns `false` and changes nothing; leaving a tier goes through
    /// logout.
    pub fn transition_to(&self, tier: SignedInTier) -> bool {
        let mut user = self.user.lock();

        let from = user.tier();
        let allowed = matches!(
            (from, tier),
            (UserTier::Guest, _) | (UserTier::Free, SignedInTier::Paid)
        );
        if !allowed {
            warn!(
                "Refusing {} -> {} transition; log out first",
                from,
                UserTier::from(tier)
            );
            return false;
        }

        let entitlement = match tier {
            SignedInTier::Free => Entitlement::Free {
                scans_today: 0,
                day: self.clock.today(),
            },
            SignedInTier::Paid => Entitlement::Paid {
                ai_credits: self.limits.paid_starting_credits,
            },
        };

        let identity = Uuid::new_v4().to_string();
        let email = match tier {
            SignedInTier::Free => "free-user@example.com",
            SignedInTier::Paid => "pro-user@example.com",
        };

        info!("User {} signed in: {} -> {}", identity, user.tier(), UserTier::from(tier));

        *user = User {
            identity: Some(identity),
            email: Some(email.to_string()),
            total_guest_scans: user.total_guest_scans,
            entitlement,
        };
        true
    }

    /// Registration shortcut; new accounts start on the free tier.
    pub fn signup(&self) -> bool {
        self.transition_to(SignedInTier::Free)
    }

    /// Logout: back to a brand new guest.
    pub fn reset(&self) {
        let mut user = self.user.lock();
        info!("User {:?} logged out", user.identity);
        *user = User::guest();
    }

    /// Free-tier counts drop by one per spent scan and only climb back when
    /// the clock's day changes.
    pub fn remaining_basic_scans(&self) -> Remaining {
        let user = self.user.lock();
        remaining_for(&user, &self.limits, self.clock.today())
    }

    /// Spends one basic scan. `false` means nothing was left and nothing changed.
    pub fn consume_basic_scan(&self) -> bool {
        let today = self.clock.today();
        let mut guard = self.user.lock();
        let user = &mut *guard;

        if remaining_for(user, &self.limits, today).is_exhausted() {
            debug!("No basic scans left for {} user", user.tier());
            return false;
        }

        match &mut user.entitlement {
            Entitlement::Guest => user.total_guest_scans += 1,
            Entitlement::Free { scans_today, day } => {
                if *day != today {
                    *day = today;
                    *scans_today = 0;
                }
                *scans_today += 1;
            }
            Entitlement::Paid { .. } => {}
        }
        true
    }

    /// Deducts `count` credits, flooring at zero. No-op off the paid tier.
    pub fn consume_ai_credits(&self, count: u32) {
        let mut user = self.user.lock();
        if let Entitlement::Paid { ai_credits } = &mut user.entitlement {
            if *ai_credits > 0 {
                *ai_credits = ai_credits.saturating_sub(count);
                debug!("AI credits now {}", ai_credits);
            }
        }
    }
}

impl Default for EntitlementLedger {
    fn default() -> Self {
        Self::new(LedgerLimits::default())
    }
}

fn remaining_for(user: &User, limits: &LedgerLimits, today: NaiveDate) -> Remaining {
    match &user.entitlement {
        Entitlement::Guest => {
            Remaining::Limited(limits.guest_scan_limit.saturating_sub(user.total_guest_scans))
        }
        Entitlement::Free { scans_today, day } => {
            let used = if *day == today { *scans_today } else { 0 };
            Remaining::Limited(limits.free_daily_limit.saturating_sub(used))
        }
        Entitlement::Paid { .. } => Remaining::Unlimited,
    }
}
