// File: snapgrade-core/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use snapgrade_common::BackendError;
use snapgrade_common::models::{AnalysisCriteria, AnalysisResult, ImagePayload};
use snapgrade_common::traits::{BasicAnalysisBackend, FullAnalysisBackend};
use snapgrade_core::{EntitlementLedger, LedgerLimits};

mock! {
    pub FullBackend {}
    #[async_trait]
    impl FullAnalysisBackend for FullBackend {
        async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError>;
    }
}

mock! {
    pub BasicBackend {}
    #[async_trait]
    impl BasicAnalysisBackend for BasicBackend {
        async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError>;
    }
}

pub fn image(name: &str) -> ImagePayload {
    ImagePayload::new(name.as_bytes().to_vec(), "image/png")
        .unwrap()
        .with_name(name)
}

pub fn images(names: &[&str]) -> Vec<ImagePayload> {
    names.iter().map(|n| image(n)).collect()
}

/// A report whose summary names the image it was produced for.
pub fn report_for(name: &str, score: u32) -> AnalysisResult {
    AnalysisResult {
        overall_score: score,
        summary: format!("report for {}", name),
        report: vec![AnalysisCriteria::new("Lighting", score / 10, "ok")],
        is_mock: false,
    }
}

pub fn ledger_with(limits: LedgerLimits) -> Arc<EntitlementLedger> {
    Arc::new(EntitlementLedger::new(limits))
}

/// Full backend answering per image name after a per-image delay, and
/// recording how many requests were in flight at once.
#[derive(Default)]
pub struct ScriptedFull {
    script: HashMap<String, (Duration, Result<AnalysisResult, BackendError>)>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl ScriptedFull {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, name: &str, delay_ms: u64, score: u32) -> Self {
        self.script.insert(
            name.to_string(),
            (Duration::from_millis(delay_ms), Ok(report_for(name, score))),
        );
        self
    }

    pub fn fail(mut self, name: &str, delay_ms: u64, err: BackendError) -> Self {
        self.script
            .insert(name.to_string(), (Duration::from_millis(delay_ms), Err(err)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FullAnalysisBackend for ScriptedFull {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let name = image.name().unwrap_or_default().to_string();
        let (delay, outcome) = self
            .script
            .get(&name)
            .cloned()
            .unwrap_or_else(|| (Duration::ZERO, Err(BackendError::unavailable("unscripted image"))));

        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
