// File: snapgrade-core/src/lib.rs

pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod selection;
pub mod service;

pub use config::{AppConfig, BasicBackendChoice};
pub use error::{AnalysisError, ConfigError, SelectionError};
pub use ledger::{EntitlementLedger, LedgerLimits, Remaining};
pub use orchestrator::AnalysisOrchestrator;
pub use selection::{CandidateFile, ImageSelection};
pub use service::{ScanService, SessionStatus};
