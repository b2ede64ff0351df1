use tracing::warn;

use snapgrade_core::ScanService;

use crate::render::{render_error, render_results};

/// Handle "scan": runs the selection through the orchestrator and renders
/// either the reports or the reason there are none.
pub async fn handle_scan(service: &mut ScanService) -> String {
    let limits = *service.ledger().limits();
    let names: Vec<String> = service
        .selection()
        .images()
        .iter()
        .map(|img| img.display_name().to_string())
        .collect();

    match service.scan().await {
        Ok(results) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            render_results(results, &names)
        }
        Err(e) => {
            warn!("Scan failed: {}", e);
            render_error(&e, &limits)
        }
    }
}
