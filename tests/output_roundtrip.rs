//! Extracted documents survive a write and re-read unchanged
use iam_action_harvester_lib::domain::UnitDocument;
use iam_action_harvester_lib::infrastructure::{DocumentWriter, UnitPageExtractor, UnitParseContext};
use iam_action_harvester_lib::test_utils::detail_page;
use scraper::Html;

#[tokio::test]
async fn extracted_page_round_trips_through_disk() {
    let html = Html::parse_document(&detail_page("ec2", &["RunInstances", "TerminateInstances"]));
    let document = UnitPageExtractor::new()
        .unwrap()
        .extract(&html, &UnitParseContext::new("Amazon EC2", "https://example.test/list_amazonec2.html"));
    assert_eq!(document.records.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let writer = DocumentWriter::new(dir.path());
    writer.ensure_output_dir().await.unwrap();
    let path = writer.write(&document).await.unwrap();

    let reread = UnitDocument::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(reread, document);
}

#[tokio::test]
async fn empty_document_is_written_with_empty_actions() {
    let dir = tempfile::tempdir().unwrap();
    let writer = DocumentWriter::new(dir.path());
    let path = writer
        .write(&UnitDocument::new("deprecated-svc".into(), Vec::new()))
        .await
        .unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["servicePrefix"], "deprecated-svc");
    assert_eq!(value["actions"], serde_json::json!([]));
}
