//! Live integration tests against real sites and binaries.
//!
//! Ignored by default; run manually with `cargo test -- --ignored`.

use state_entity_search::browser::BrowserSession;
use state_entity_search::config::Config;
use state_entity_search::models::SearchCriteria;
use state_entity_search::sources::NewYorkAdapter;
use state_entity_search::utils::logging;
use state_entity_search::{App, SourceAdapter, SourceResult};

#[tokio::test]
#[ignore] // needs network access to the New York public inquiry API
async fn live_new_york_name_search() {
    logging::init();

    let adapter = NewYorkAdapter::new(&Config::default());
    let result = adapter
        .query(&SearchCriteria::by_name("Kodak Graphic Communications Company"))
        .await;

    match result {
        SourceResult::Success(record) => {
            assert_ne!(record.entity_name, "N/A");
            assert_ne!(record.business_id, "N/A");
        }
        SourceResult::Ambiguous { candidates } => {
            assert!(!candidates.is_empty());
        }
        other => panic!("expected a match from a well-known entity, got {other:?}"),
    }
}

#[tokio::test]
#[ignore] // needs a local Chromium install
async fn live_browser_launch_and_shutdown() {
    logging::init();

    let session = BrowserSession::launch().await.expect("browser launches");
    session
        .driver()
        .goto("about:blank")
        .await
        .expect("navigation works");
    session.shutdown().await;
}

#[tokio::test]
#[ignore] // needs network, Chromium and (for Kansas) Node.js
async fn live_full_dispatch_writes_a_report() {
    logging::init();

    let scratch = tempfile::tempdir().expect("tempdir");
    let config = Config {
        report_file: scratch.path().join("report.json"),
        ..Config::default()
    };
    let report_file = config.report_file.clone();

    let report = App::new(config)
        .run(&SearchCriteria::by_name("Acme"))
        .await
        .expect("run completes");

    assert_eq!(report.len(), 4);
    let raw = std::fs::read_to_string(report_file).expect("report file exists");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    assert!(json.get("ny").is_some());
}
