// File: snapgrade-tui/src/commands/mod.rs

use snapgrade_core::ScanService;

mod account;
mod images;
mod scan;

pub use images::{load_candidate, sniff_mime};

const HELP: &str = "\
Commands:
  help
  status
  login   <free|paid>
  signup
  logout
  bulk    <on|off>
  add     <path> [path...]
  remove  <n>
  list
  scan
  quit
";

/// Runs one command line against the session. Returns whether the user asked
/// to quit, and the text to print.
pub async fn dispatch(line: &str, service: &mut ScanService) -> (bool, Option<String>) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let cmd = parts.first().copied().unwrap_or("").to_lowercase();
    let args = parts.get(1..).unwrap_or(&[]);

    match cmd.as_str() {
        "" => (false, None),
        "help" => (false, Some(HELP.to_string())),
        "status" => (false, Some(account::status(service))),
        "login" => (false, Some(account::handle_login(args, service))),
        "signup" => (false, Some(account::handle_signup(service))),
        "logout" => (false, Some(account::handle_logout(service))),
        "bulk" => (false, Some(images::handle_bulk(args, service))),
        "add" => (false, Some(images::handle_add(args, service).await)),
        "remove" | "rm" => (false, Some(images::handle_remove(args, service))),
        "list" | "ls" => (false, Some(images::list(service))),
        "scan" | "analyze" => (false, Some(scan::handle_scan(service).await)),
        "quit" | "exit" => (true, Some("Bye.".to_string())),
        other => (
            false,
            Some(format!("Unknown command '{}'. Type 'help' for usage.", other)),
        ),
    }
}
