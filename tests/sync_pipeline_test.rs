//! End-to-end runs against mock terminology and Bahmni servers

use mockito::{Matcher, Server, ServerGuard};
use procedures_sync::adapters::status::StatusStore;
use procedures_sync::adapters::terminology::ValueSetResource;
use procedures_sync::config::{DelayPolicy, SyncConfig};
use procedures_sync::core::sync::{SyncCoordinator, SyncMode};
use procedures_sync::domain::SyncError;
use std::path::Path;
use tempfile::TempDir;

const CONCEPTS: &str = "/openmrs/ws/rest/v1/bahmni/procedure-orders/concepts";
const BODY_SITES: &str = "/openmrs/ws/rest/v1/bahmni/procedure-orders/body-sites";

fn config_for(terminology: &ServerGuard, bahmni: &ServerGuard, dir: &Path) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.terminology.valueset_url = format!("{}/fhir/ValueSet", terminology.url());
    config.clinical.base_url = bahmni.url();
    config.publish.base_delay_ms = 5;
    config.publish.delay_policy = DelayPolicy::Linear;
    config.paths.source_dir = dir.join("public").to_string_lossy().into_owned();
    config.paths.output_dir = dir.join("output").to_string_lossy().into_owned();
    config
}

fn concept_list(entries: &[(&str, &str, &str)]) -> String {
    let results: Vec<serde_json::Value> = entries
        .iter()
        .map(|(code, display, source)| {
            serde_json::json!({"code": code, "display": display, "source": source})
        })
        .collect();
    serde_json::json!({ "results": results }).to_string()
}

#[tokio::test]
async fn test_publish_run_with_member_failure() {
    let dir = TempDir::new().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(
        public.join("body_sites.csv"),
        "Category,Code,Display\n\
         Body Site,C1,Arm\n\
         Body Site,C2,Leg\n\
         Body Site,C3,Head\n\
         Body Site,C1,Arm duplicate\n",
    )
    .unwrap();
    std::fs::write(public.join("notes.txt"), "ignored").unwrap();

    let mut terminology = Server::new_async().await;
    let mut bahmni = Server::new_async().await;

    let created = terminology
        .mock("POST", "/fhir/ValueSet")
        .match_body(Matcher::Regex(r#""code":"C[13]""#.to_string()))
        .with_status(201)
        .expect(2)
        .create_async()
        .await;
    let rejected = terminology
        .mock("POST", "/fhir/ValueSet")
        .match_body(Matcher::Regex(r#""code":"C2""#.to_string()))
        .with_status(500)
        .with_body("storage full")
        .expect(1)
        .create_async()
        .await;

    let snapshots = bahmni
        .mock("GET", CONCEPTS)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(concept_list(&[
            ("P1", "Biopsy", "procedure"),
            ("C9", "Old site", "bodySite"),
        ]))
        .expect(2)
        .create_async()
        .await;
    let deleted = bahmni
        .mock("DELETE", BODY_SITES)
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&terminology, &bahmni, dir.path());
    let coordinator = SyncCoordinator::from_config(&config).unwrap();
    let report = coordinator.run(SyncMode::PublishNew).await.unwrap();

    created.assert_async().await;
    rejected.assert_async().await;
    snapshots.assert_async().await;
    deleted.assert_async().await;

    assert_eq!(report.outcomes.len(), 1);
    let outcome = &report.outcomes[0];
    assert!(!outcome.is_success());
    assert_eq!(outcome.succeeded_codes().collect::<Vec<_>>(), vec!["C1", "C3"]);
    assert_eq!(outcome.members[1].http_status, Some(500));
    assert!(report.diff.as_ref().unwrap().is_empty());

    let output = dir.path().join("output");
    let converted = std::fs::read_to_string(output.join("body_sites.json")).unwrap();
    let resources: Vec<ValueSetResource> = serde_json::from_str(&converted).unwrap();
    let value_set = resources[0].to_value_set().unwrap();
    assert_eq!(value_set.codes().collect::<Vec<_>>(), vec!["C1", "C2", "C3"]);

    let (_, saved) = StatusStore::new(&output)
        .latest_status()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved, report.outcomes);
}

#[tokio::test]
async fn test_sync_run_pushes_terminology_concepts() {
    let dir = TempDir::new().unwrap();
    let mut terminology = Server::new_async().await;
    let mut bahmni = Server::new_async().await;

    terminology
        .mock("GET", "/fhir/ValueSet")
        .with_status(200)
        .with_header("content-type", "application/fhir+json")
        .with_body(
            serde_json::json!({
                "resourceType": "Bundle",
                "entry": [{"resource": {
                    "resourceType": "ValueSet",
                    "id": "body-site-1",
                    "name": "Body Site",
                    "status": "active",
                    "compose": {"include": [{"concept": [
                        {"code": "B1", "display": "Abdomen"}
                    ]}]}
                }}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let snapshots = bahmni
        .mock("GET", CONCEPTS)
        .with_status(200)
        .with_body(concept_list(&[("P1", "Biopsy", "procedure")]))
        .expect(2)
        .create_async()
        .await;
    let pushed = bahmni
        .mock("POST", CONCEPTS)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "concepts": [{"code": "B1", "display": "Abdomen", "source": "bodySite"}]
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let no_delete = bahmni
        .mock("DELETE", BODY_SITES)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&terminology, &bahmni, dir.path());
    let coordinator = SyncCoordinator::from_config(&config).unwrap();
    let report = coordinator.run(SyncMode::SyncFromTerminology).await.unwrap();

    snapshots.assert_async().await;
    pushed.assert_async().await;
    no_delete.assert_async().await;

    assert_eq!(report.pushed_concepts, 1);
    assert!(report.outcomes.is_empty());
    assert!(report.diff.unwrap().is_empty());
    assert!(!dir.path().join("output").exists());
}

#[tokio::test]
async fn test_fetch_run_fails_when_bahmni_unavailable() {
    let dir = TempDir::new().unwrap();
    let terminology = Server::new_async().await;
    let mut bahmni = Server::new_async().await;

    bahmni
        .mock("GET", CONCEPTS)
        .with_status(503)
        .create_async()
        .await;

    let config = config_for(&terminology, &bahmni, dir.path());
    let coordinator = SyncCoordinator::from_config(&config).unwrap();
    let err = coordinator.run(SyncMode::FetchOnly).await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(_)));
}
