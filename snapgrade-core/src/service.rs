use std::sync::Arc;

use tracing::info;

use snapgrade_ai::{
    FallbackBasicProvider, GeminiProvider, LocalBasicProvider, RemoteBasicProvider,
    UnconfiguredFullBackend,
};
use snapgrade_common::models::{AnalysisResult, SignedInTier, User};
use snapgrade_common::traits::{BasicAnalysisBackend, FullAnalysisBackend};

use crate::config::{AppConfig, BasicBackendChoice};
use crate::error::{AnalysisError, SelectionError};
use crate::ledger::{EntitlementLedger, Remaining};
use crate::orchestrator::AnalysisOrchestrator;
use crate::selection::{CandidateFile, ImageSelection};

/// Point-in-time view of the session for status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub user: User,
    pub remaining_basic_scans: Remaining,
    pub selected_images: usize,
    pub bulk_mode: bool,
}

/// The one controller that owns the session: the ledger, the selection and
/// the last scan's results.
///
/// Scanning takes `&mut self`, so a second scan cannot start while one is
/// outstanding.
pub struct ScanService {
    ledger: Arc<EntitlementLedger>,
    orchestrator: AnalysisOrchestrator,
    selection: ImageSelection,
    last_results: Option<Vec<AnalysisResult>>,
}

impl ScanService {
    pub fn new(ledger: Arc<EntitlementLedger>, orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            ledger,
            orchestrator,
            selection: ImageSelection::new(),
            last_results: None,
        }
    }

    /// Wires real backends from configuration, falling back where a backend
    /// is not configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let full: Arc<dyn FullAnalysisBackend> = match &config.gemini {
            Some(provider_cfg) => Arc::new(GeminiProvider::new(provider_cfg.clone())),
            None => Arc::new(UnconfiguredFullBackend),
        };
        let basic: Arc<dyn BasicAnalysisBackend> = match &config.basic_backend {
            BasicBackendChoice::Remote(url) => Arc::new(RemoteBasicProvider::new(url.clone())),
            BasicBackendChoice::Local => Arc::new(LocalBasicProvider::new()),
            BasicBackendChoice::Fallback => Arc::new(FallbackBasicProvider::new()),
        };

        let mut orchestrator = AnalysisOrchestrator::new(full, basic);
        if let Some(timeout) = config.request_timeout {
            orchestrator = orchestrator.with_request_timeout(timeout);
        }

        Self::new(Arc::new(EntitlementLedger::new(config.limits)), orchestrator)
    }

    pub fn ledger(&self) -> &Arc<EntitlementLedger> {
        &self.ledger
    }

    pub fn login(&mut self, tier: SignedInTier) -> bool {
        self.ledger.transition_to(tier)
    }

    pub fn signup(&mut self) -> bool {
        self.ledger.signup()
    }

    /// Back to a fresh guest; the selection and results are dropped too.
    pub fn logout(&mut self) {
        self.ledger.reset();
        self.selection.clear();
        self.last_results = None;
    }

    /// Changing the mode resets the selection and any shown results.
    pub fn set_bulk_mode(&mut self, bulk: bool) {
        if self.selection.bulk_mode() != bulk {
            self.selection.set_bulk_mode(bulk);
            self.last_results = None;
        }
    }

    pub fn add_files(&mut self, files: Vec<CandidateFile>) -> Result<usize, SelectionError> {
        let added = self.selection.add(files)?;
        self.last_results = None;
        Ok(added)
    }

    pub fn remove_image(&mut self, index: usize) -> Result<(), SelectionError> {
        self.selection.remove(index).map(|_| ())
    }

    pub fn selection(&self) -> &ImageSelection {
        &self.selection
    }

    pub fn last_results(&self) -> Option<&[AnalysisResult]> {
        self.last_results.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            user: self.ledger.snapshot(),
            remaining_basic_scans: self.ledger.remaining_basic_scans(),
            selected_images: self.selection.len(),
            bulk_mode: self.selection.bulk_mode(),
        }
    }

    /// Scans the current selection. Earlier results are cleared first, so a
    /// failed scan leaves no stale report behind.
    pub async fn scan(&mut self) -> Result<&[AnalysisResult], AnalysisError> {
        self.last_results = None;

        let results = self
            .orchestrator
            .run_scan(self.selection.images(), &self.ledger)
            .await?;

        info!("Scan produced {} report(s)", results.len());
        Ok(self.last_results.insert(results).as_slice())
    }
}
