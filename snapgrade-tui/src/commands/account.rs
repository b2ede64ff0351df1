use std::str::FromStr;

use snapgrade_common::models::{SignedInTier, UserTier};
use snapgrade_core::ScanService;

use crate::render::{header_line, render_status};

fn summary(service: &ScanService) -> String {
    header_line(&service.status(), service.ledger().limits())
}

pub fn status(service: &ScanService) -> String {
    render_status(&service.status(), service.ledger().limits())
}

/// Handle "login <free|paid>".
pub fn handle_login(args: &[&str], service: &mut ScanService) -> String {
    let Some(raw) = args.first() else {
        return "Usage: login <free|paid>".to_string();
    };
    let tier = match SignedInTier::from_str(raw) {
        Ok(t) => t,
        Err(e) => return e,
    };

    if service.login(tier) {
        format!("Signed in ({}).\n{}", tier_label(tier), summary(service))
    } else {
        refused(service)
    }
}

pub fn handle_signup(service: &mut ScanService) -> String {
    if service.signup() {
        format!("Free account created.\n{}", summary(service))
    } else {
        refused(service)
    }
}

fn refused(service: &ScanService) -> String {
    match service.status().user.tier() {
        UserTier::Paid => "You're already on the pro tier; log out first to switch accounts.".to_string(),
        _ => "You're already signed in; log out first, or 'login paid' to upgrade.".to_string(),
    }
}

pub fn handle_logout(service: &mut ScanService) -> String {
    service.logout();
    format!("Logged out.\n{}", summary(service))
}

fn tier_label(tier: SignedInTier) -> &'static str {
    match tier {
        SignedInTier::Free => "free",
        SignedInTier::Paid => "pro",
    }
}
