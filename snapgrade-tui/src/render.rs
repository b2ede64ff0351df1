// File: snapgrade-tui/src/render.rs

use colored::{ColoredString, Colorize};

use snapgrade_common::models::{AnalysisCriteria, AnalysisResult, Entitlement, UserTier};
use snapgrade_core::{AnalysisError, LedgerLimits, SessionStatus};

/// The one-line account summary shown above the prompt.
pub fn header_line(status: &SessionStatus, limits: &LedgerLimits) -> String {
    let remaining = status.remaining_basic_scans;
    let account = match &status.user.entitlement {
        Entitlement::Guest => format!(
            "{}/{} Free Scans Left  [signup | login <free|paid>]",
            remaining, limits.guest_scan_limit
        ),
        Entitlement::Free { .. } => format!(
            "Scans Remaining: {}/{}  [login paid | logout]",
            remaining, limits.free_daily_limit
        ),
        Entitlement::Paid { ai_credits } => format!("AI Credits: {}  [logout]", ai_credits),
    };

    let mode = if status.bulk_mode { "bulk" } else { "single" };
    format!(
        "{} | {} image(s) selected ({} mode)",
        account, status.selected_images, mode
    )
}

/// Longer account view for the `status` command.
pub fn render_status(status: &SessionStatus, limits: &LedgerLimits) -> String {
    let user = &status.user;
    let mut out = String::new();
    out.push_str(&format!("Tier: {}\n", user.tier()));
    if let Some(email) = &user.email {
        out.push_str(&format!("Signed in as: {}\n", email));
    }
    if let Some(id) = &user.identity {
        out.push_str(&format!("Account id: {}\n", id));
    }
    match &user.entitlement {
        Entitlement::Guest => {
            out.push_str(&format!(
                "Guest scans used: {}/{}\n",
                user.total_guest_scans, limits.guest_scan_limit
            ));
        }
        Entitlement::Free { scans_today, day } => {
            out.push_str(&format!(
                "Basic scans used on {}: {}/{}\n",
                day, scans_today, limits.free_daily_limit
            ));
        }
        Entitlement::Paid { ai_credits } => {
            out.push_str(&format!("AI credits: {}\n", ai_credits));
        }
    }
    out.push_str(&header_line(status, limits));
    out
}

fn overall_colour(score: u32) -> ColoredString {
    let text = format!("{}/100", score);
    if score < 50 {
        text.red().bold()
    } else if score < 75 {
        text.yellow().bold()
    } else {
        text.green().bold()
    }
}

fn criteria_colour(score: u32) -> ColoredString {
    let text = format!("{:>2}/10", score);
    if score >= 8 {
        text.green()
    } else if score >= 5 {
        text.yellow()
    } else {
        text.red()
    }
}

fn render_row(row: &AnalysisCriteria) -> String {
    let mut line = format!("  {}  {}", criteria_colour(row.score), row.criteria.bold());
    if !row.explanation.is_empty() {
        line.push_str(&format!("\n        {}", row.explanation));
    }
    line
}

/// One report block. Basic (mock) reports carry the preview banner.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if result.is_mock {
        out.push_str(&format!("{}\n", "Basic Analysis Complete".cyan().bold()));
        out.push_str(
            "This is a preview. Upgrade to Pro to unlock a full AI-powered analysis!\n",
        );
    }
    out.push_str(&format!("Overall Score: {}\n", overall_colour(result.overall_score)));
    out.push_str(&format!("{}\n", result.summary));
    for row in &result.report {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

/// All reports of a scan, labelled with the image they belong to when
/// more than one came back.
pub fn render_results(results: &[AnalysisResult], names: &[&str]) -> String {
    if let [only] = results {
        return render_report(only);
    }
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let name = names.get(i).copied().unwrap_or("image");
            format!("== {}. {} ==\n{}", i + 1, name, render_report(result))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Error text, plus the way out when the error is a quota or credit wall.
pub fn render_error(err: &AnalysisError, limits: &LedgerLimits) -> String {
    if !err.prompts_upgrade() {
        return format!("{} {}", "Error:".red().bold(), err);
    }

    let (title, message, action) = match err {
        AnalysisError::QuotaExhausted(UserTier::Guest) => (
            "You've Used Your Free Scans",
            format!(
                "Sign up for a free account to get {} basic scans every day.",
                limits.free_daily_limit
            ),
            "Type 'signup' to create a free account.",
        ),
        AnalysisError::QuotaExhausted(_) => (
            "Daily Limit Reached",
            format!(
                "You've used your {} basic scans for today. Upgrade to Pro for AI-powered analysis!",
                limits.free_daily_limit
            ),
            "Type 'login paid' to upgrade.",
        ),
        _ => (
            "You're Out of AI Credits",
            err.to_string(),
            "Remove some images or add more AI credits to continue.",
        ),
    };
    format!("{}\n{}\n{}", title.yellow().bold(), message, action)
}
