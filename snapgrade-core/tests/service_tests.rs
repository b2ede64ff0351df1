// tests/service_tests.rs

mod test_utils;

use std::sync::Arc;

use snapgrade_ai::provider::MISSING_API_KEY_MESSAGE;
use snapgrade_common::models::{SignedInTier, UserTier};
use snapgrade_core::{
    AnalysisError, AnalysisOrchestrator, AppConfig, BasicBackendChoice, CandidateFile,
    EntitlementLedger, LedgerLimits, Remaining, ScanService, SelectionError,
};

use test_utils::{MockBasicBackend, MockFullBackend, report_for};

fn png(name: &str) -> CandidateFile {
    CandidateFile {
        name: name.to_string(),
        mime_type: "image/png".to_string(),
        data: vec![0x89, b'P', b'N', b'G'],
    }
}

/// Walks a guest through the whole flow with nothing configured.
#[tokio::test(start_paused = true)]
async fn test_guest_session_with_default_config() {
    let mut service = ScanService::from_config(&AppConfig::default());

    let err = service.scan().await.unwrap_err();
    assert_eq!(err, AnalysisError::NoImages);

    service.add_files(vec![png("kettle.png")]).unwrap();
    let results = service.scan().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].overall_score, 78);
    assert!(results[0].is_mock);

    let status = service.status();
    assert_eq!(status.user.tier(), UserTier::Guest);
    assert_eq!(status.remaining_basic_scans, Remaining::Limited(2));
    assert_eq!(status.selected_images, 1);
    assert!(service.last_results().is_some());
}

#[tokio::test]
async fn test_paid_scan_without_api_key() {
    let mut service = ScanService::from_config(&AppConfig::default());
    assert!(service.login(SignedInTier::Paid));

    service.set_bulk_mode(true);
    service
        .add_files(vec![png("a.png"), png("b.png")])
        .unwrap();

    let err = service.scan().await.unwrap_err();
    assert_eq!(err, AnalysisError::BackendUnavailable(MISSING_API_KEY_MESSAGE.into()));
    assert_eq!(service.ledger().ai_credits(), 100);
    assert!(service.last_results().is_none());
}

#[tokio::test]
async fn test_failed_scan_clears_previous_results() {
    let mut basic = MockBasicBackend::new();
    let mut calls = 0;
    basic.expect_analyze().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(report_for("first", 70))
        } else {
            Err(snapgrade_common::BackendError::unavailable("endpoint down"))
        }
    });
    let mut full = MockFullBackend::new();
    full.expect_analyze().never();

    let ledger = Arc::new(EntitlementLedger::new(LedgerLimits::default()));
    let orchestrator = AnalysisOrchestrator::new(Arc::new(full), Arc::new(basic));
    let mut service = ScanService::new(ledger, orchestrator);

    service.add_files(vec![png("mug.png")]).unwrap();
    service.scan().await.unwrap();
    assert!(service.last_results().is_some());

    let err = service.scan().await.unwrap_err();
    assert!(matches!(err, AnalysisError::BasicAnalysisFailed(_)));
    assert!(service.last_results().is_none());
    assert_eq!(service.status().remaining_basic_scans, Remaining::Limited(2));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mut service = ScanService::from_config(&AppConfig::default());
    service.signup();
    service.add_files(vec![png("lamp.png")]).unwrap();

    service.logout();

    let status = service.status();
    assert_eq!(status.user.tier(), UserTier::Guest);
    assert_eq!(status.user.total_guest_scans, 0);
    assert_eq!(status.selected_images, 0);
}

#[tokio::test]
async fn test_selection_errors_are_surfaced() {
    let mut service = ScanService::from_config(&AppConfig::default());
    let err = service
        .add_files(vec![CandidateFile {
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            data: b"hello".to_vec(),
        }])
        .unwrap_err();
    assert_eq!(err, SelectionError::NoValidImages);
    assert!(service.remove_image(0).is_err());
}

#[tokio::test]
async fn test_switching_mode_starts_a_fresh_selection() {
    let mut full = MockFullBackend::new();
    full.expect_analyze()
        .times(1)
        .returning(|img| Ok(report_for(img.name().unwrap_or_default(), 80)));
    let mut basic = MockBasicBackend::new();
    basic.expect_analyze().never();

    let ledger = Arc::new(EntitlementLedger::new(LedgerLimits::default()));
    let orchestrator = AnalysisOrchestrator::new(Arc::new(full), Arc::new(basic));
    let mut service = ScanService::new(ledger, orchestrator);
    assert!(service.login(SignedInTier::Paid));

    service.set_bulk_mode(true);
    service
        .add_files(vec![png("a.png"), png("b.png"), png("c.png")])
        .unwrap();
    assert_eq!(service.status().selected_images, 3);

    service.set_bulk_mode(false);
    let status = service.status();
    assert!(!status.bulk_mode);
    assert_eq!(status.selected_images, 0);

    service.add_files(vec![png("d.png")]).unwrap();
    let results = service.scan().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(service.ledger().ai_credits(), 99);

    service.set_bulk_mode(true);
    assert!(service.last_results().is_none());
    assert_eq!(service.status().selected_images, 0);
}

#[tokio::test]
async fn test_local_basic_backend_reads_the_upload() {
    let config = AppConfig {
        basic_backend: BasicBackendChoice::Local,
        ..AppConfig::default()
    };
    let mut service = ScanService::from_config(&config);

    let mut encoded = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(640, 480)
        .write_to(&mut encoded, image::ImageFormat::Png)
        .unwrap();
    service
        .add_files(vec![CandidateFile {
            name: "teapot.png".into(),
            mime_type: "image/png".into(),
            data: encoded.into_inner(),
        }])
        .unwrap();

    let results = service.scan().await.unwrap();
    assert_eq!(results[0].overall_score, 78);
    assert_eq!(results[0].report[0].score, 4);
    assert_eq!(results[0].report[0].explanation, "Image resolution is 640px by 480px.");
    assert_eq!(service.status().remaining_basic_scans, Remaining::Limited(2));

    // Header bytes only: not decodable, so no scan is spent.
    service.remove_image(0).unwrap();
    service.add_files(vec![png("broken.png")]).unwrap();
    let err = service.scan().await.unwrap_err();
    assert!(matches!(err, AnalysisError::BasicAnalysisFailed(_)));
    assert_eq!(service.status().remaining_basic_scans, Remaining::Limited(2));
}
