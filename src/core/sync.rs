//! Sync orchestrator
//!
//! Selects one of three mutually exclusive modes for a run and sequences the
//! other components:
//!
//! | Mode | Work | Diff |
//! |---|---|---|
//! | [`SyncMode::PublishNew`] | delete body sites, convert CSV sources, publish | yes |
//! | [`SyncMode::SyncFromTerminology`] | pull value sets, push them as concepts | yes |
//! | [`SyncMode::FetchOnly`] | single snapshot | no |
//!
//! Snapshot and remote write failures end the run with an error. Member
//! publish failures and malformed source rows are recorded in the
//! [`RunReport`] and the run carries on.

use crate::adapters::clinical::{BahmniClient, ClinicalRecordsServer};
use crate::adapters::source::{discover_csv_files, read_rows};
use crate::adapters::status::StatusStore;
use crate::adapters::terminology::{FhirTerminologyClient, TerminologyServer};
use crate::config::SyncConfig;
use crate::core::diff::{diff, DiffReport};
use crate::core::normalize::normalize;
use crate::core::publish::Publisher;
use crate::core::snapshot::SnapshotFetcher;
use crate::core::valueset::build_value_sets;
use crate::domain::{
    Concept, ConceptSnapshot, ConceptSource, MalformedRecordError, PublishOutcome, Result,
    ValueSet,
};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run mode, decided once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Convert and publish the CSV sources
    #[default]
    PublishNew,

    /// Copy the terminology server's value sets into the clinical server
    SyncFromTerminology,

    /// Report the clinical server's concepts only
    FetchOnly,
}

impl SyncMode {
    /// Whether the mode ends with a before/after diff
    pub fn takes_diff(&self) -> bool {
        !matches!(self, Self::FetchOnly)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublishNew => write!(f, "publish"),
            Self::SyncFromTerminology => write!(f, "sync"),
            Self::FetchOnly => write!(f, "fetch"),
        }
    }
}

/// A source row that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub file: String,
    pub error: MalformedRecordError,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: SyncMode,

    /// Snapshot taken before any mutation (the only one for `FetchOnly`)
    pub before: ConceptSnapshot,

    /// Snapshot taken once the mode's work completed
    pub after: Option<ConceptSnapshot>,

    pub diff: Option<DiffReport>,

    /// One per published value set (`PublishNew` only)
    pub outcomes: Vec<PublishOutcome>,

    pub skipped_records: Vec<SkippedRecord>,

    /// Number of concepts pushed (`SyncFromTerminology` only)
    pub pushed_concepts: usize,

    pub status_file: Option<PathBuf>,

    pub duration: Duration,
}

impl RunReport {
    fn new(mode: SyncMode, before: ConceptSnapshot) -> Self {
        Self {
            mode,
            before,
            after: None,
            diff: None,
            outcomes: Vec::new(),
            skipped_records: Vec::new(),
            pushed_concepts: 0,
            status_file: None,
            duration: Duration::ZERO,
        }
    }

    /// Number of members that failed to publish, across all value sets
    pub fn failed_members(&self) -> usize {
        self.outcomes.iter().map(PublishOutcome::failed_count).sum()
    }

    /// Log the run summary
    pub fn log_summary(&self) {
        tracing::info!(
            mode = %self.mode,
            value_sets = self.outcomes.len(),
            failed_members = self.failed_members(),
            skipped_records = self.skipped_records.len(),
            pushed_concepts = self.pushed_concepts,
            duration_secs = self.duration.as_secs(),
            "Run completed"
        );

        for skipped in &self.skipped_records {
            tracing::warn!(file = %skipped.file, error = %skipped.error, "Skipped source row");
        }

        if let Some(diff) = &self.diff {
            diff.log_summary();
        }
    }
}

/// Sync coordinator
pub struct SyncCoordinator {
    terminology: Arc<dyn TerminologyServer>,
    clinical: Arc<dyn ClinicalRecordsServer>,
    snapshots: SnapshotFetcher,
    publisher: Publisher,
    store: StatusStore,
    source_dir: PathBuf,
    canonical_base: String,
}

impl SyncCoordinator {
    /// Creates a coordinator over the given servers
    pub fn new(
        config: &SyncConfig,
        terminology: Arc<dyn TerminologyServer>,
        clinical: Arc<dyn ClinicalRecordsServer>,
    ) -> Self {
        Self {
            snapshots: SnapshotFetcher::new(clinical.clone()),
            publisher: Publisher::new(terminology.clone(), &config.publish),
            store: StatusStore::new(&config.paths.output_dir),
            source_dir: PathBuf::from(&config.paths.source_dir),
            canonical_base: config.terminology.canonical_base.clone(),
            terminology,
            clinical,
        }
    }

    /// Creates a coordinator with the HTTP clients built from configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let terminology = Arc::new(FhirTerminologyClient::new(config.terminology.clone())?);
        let clinical = Arc::new(BahmniClient::new(config.clinical.clone())?);
        Ok(Self::new(config, terminology, clinical))
    }

    /// Executes one run in `mode`
    ///
    /// # Errors
    ///
    /// Returns an error when a snapshot, a clinical-server write, the
    /// terminology read or a filesystem step fails. Work done before the
    /// failure is not rolled back.
    pub async fn run(&self, mode: SyncMode) -> Result<RunReport> {
        let start_time = Instant::now();
        tracing::info!(mode = %mode, "Starting run");

        let before = self.snapshots.take().await?;
        let mut report = RunReport::new(mode, before);

        match mode {
            SyncMode::PublishNew => self.publish_new(&mut report).await?,
            SyncMode::SyncFromTerminology => {
                report.pushed_concepts = self.sync_from_terminology().await?;
            }
            SyncMode::FetchOnly => {}
        }

        if mode.takes_diff() {
            let after = self.snapshots.take().await?;
            report.diff = Some(diff(&report.before, &after));
            report.after = Some(after);
        }

        report.duration = start_time.elapsed();
        report.log_summary();
        Ok(report)
    }

    async fn publish_new(&self, report: &mut RunReport) -> Result<()> {
        self.clinical.delete_body_sites().await?;
        self.store.clear().await?;

        let sources = discover_csv_files(&self.source_dir).await?;
        if sources.is_empty() {
            tracing::warn!(
                dir = %self.source_dir.display(),
                "No CSV source files found; skipping publish"
            );
            return Ok(());
        }

        let mut value_sets = Vec::new();
        for source in &sources {
            let rows = read_rows(&source.path).await?;

            let mut records = Vec::with_capacity(rows.len());
            for result in normalize(rows) {
                match result {
                    Ok(record) => records.push(record),
                    Err(error) => report.skipped_records.push(SkippedRecord {
                        file: source.stem.clone(),
                        error,
                    }),
                }
            }

            let built = build_value_sets(records);
            let path = self
                .store
                .write_value_sets(&source.stem, &built, &self.canonical_base)
                .await?;
            tracing::info!(
                source = %source.path.display(),
                output = %path.display(),
                value_sets = built.len(),
                "Converted source file"
            );
            value_sets.extend(built);
        }

        report.outcomes = self.publisher.publish_all(value_sets).await;
        report.status_file = Some(self.store.save_status(&report.outcomes).await?);
        Ok(())
    }

    async fn sync_from_terminology(&self) -> Result<usize> {
        let value_sets = self.terminology.fetch_value_sets().await?;
        let concepts = concepts_from_value_sets(&value_sets);

        tracing::info!(
            value_sets = value_sets.len(),
            concepts = concepts.len(),
            "Syncing terminology value sets into clinical server"
        );

        self.clinical.push_concepts(&concepts).await?;
        Ok(concepts.len())
    }
}

/// Turns value set members into concepts, first occurrence per code wins
///
/// The source of each concept comes from its value set's name.
pub fn concepts_from_value_sets(value_sets: &[ValueSet]) -> Vec<Concept> {
    let mut seen = HashSet::new();
    let mut concepts = Vec::new();
    for value_set in value_sets {
        let source = ConceptSource::for_value_set_name(&value_set.name);
        for member in &value_set.members {
            if seen.insert(member.code.clone()) {
                concepts.push(Concept::new(&member.code, &member.display, source));
            }
        }
    }
    concepts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DelayPolicy, PublishConfig};
    use crate::domain::{FetchError, Member, PublishError, SyncError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeTerminology {
        value_sets: Vec<ValueSet>,
        created: Mutex<Vec<String>>,
        fetches: Mutex<usize>,
    }

    #[async_trait]
    impl TerminologyServer for FakeTerminology {
        async fn create_member(
            &self,
            _value_set: &ValueSet,
            member: &Member,
        ) -> std::result::Result<u16, PublishError> {
            self.created.lock().unwrap().push(member.code.clone());
            Ok(201)
        }

        async fn fetch_value_sets(&self) -> std::result::Result<Vec<ValueSet>, FetchError> {
            *self.fetches.lock().unwrap() += 1;
            Ok(self.value_sets.clone())
        }

        fn endpoint(&self) -> &str {
            "memory://terminology"
        }
    }

    /// Clinical server whose concept list grows with every push
    #[derive(Default)]
    struct FakeClinical {
        concepts: Mutex<Vec<Concept>>,
        fetches: Mutex<usize>,
        deletes: Mutex<usize>,
        pushes: Mutex<Vec<Vec<Concept>>>,
        fail_fetch: bool,
    }

    #[async_trait]
    impl ClinicalRecordsServer for FakeClinical {
        async fn fetch_concepts(&self) -> std::result::Result<Vec<Concept>, FetchError> {
            *self.fetches.lock().unwrap() += 1;
            if self.fail_fetch {
                return Err(FetchError::ServerError {
                    url: "memory://clinical".to_string(),
                    status: 503,
                    message: "down".to_string(),
                });
            }
            Ok(self.concepts.lock().unwrap().clone())
        }

        async fn delete_body_sites(&self) -> std::result::Result<(), FetchError> {
            *self.deletes.lock().unwrap() += 1;
            self.concepts
                .lock()
                .unwrap()
                .retain(|c| c.source != ConceptSource::BodySite);
            Ok(())
        }

        async fn push_concepts(&self, concepts: &[Concept]) -> std::result::Result<(), FetchError> {
            self.pushes.lock().unwrap().push(concepts.to_vec());
            self.concepts.lock().unwrap().extend_from_slice(concepts);
            Ok(())
        }

        fn endpoint(&self) -> &str {
            "memory://clinical"
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: SyncConfig,
        terminology: Arc<FakeTerminology>,
        clinical: Arc<FakeClinical>,
    }

    impl Fixture {
        fn new(terminology: FakeTerminology, clinical: FakeClinical) -> Self {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("public");
            std::fs::create_dir_all(&source).unwrap();

            let mut config = SyncConfig::default();
            config.paths.source_dir = source.to_string_lossy().into_owned();
            config.paths.output_dir = dir.path().join("output").to_string_lossy().into_owned();
            config.publish = PublishConfig {
                base_delay_ms: 10,
                delay_policy: DelayPolicy::Linear,
            };

            Self {
                _dir: dir,
                config,
                terminology: Arc::new(terminology),
                clinical: Arc::new(clinical),
            }
        }

        fn write_source(&self, name: &str, content: impl AsRef<[u8]>) {
            std::fs::write(
                PathBuf::from(&self.config.paths.source_dir).join(name),
                content,
            )
            .unwrap();
        }

        fn coordinator(&self) -> SyncCoordinator {
            SyncCoordinator::new(&self.config, self.terminology.clone(), self.clinical.clone())
        }
    }

    fn existing_concepts() -> Vec<Concept> {
        vec![
            Concept::new("P1", "Biopsy", ConceptSource::Procedure),
            Concept::new("B-OLD", "Old site", ConceptSource::BodySite),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_new_runs_full_pipeline() {
        let fixture = Fixture::new(
            FakeTerminology::default(),
            FakeClinical {
                concepts: Mutex::new(existing_concepts()),
                ..Default::default()
            },
        );
        fixture.write_source(
            "body_sites.csv",
            "Category,Code,Display\nBody Site,C1,Arm\nBody Site,,Nothing\nBody Site,C2,Leg\nBody Site,C1,Arm again\n",
        );

        let report = fixture.coordinator().run(SyncMode::PublishNew).await.unwrap();

        assert_eq!(*fixture.clinical.deletes.lock().unwrap(), 1);
        assert_eq!(*fixture.clinical.fetches.lock().unwrap(), 2);
        assert_eq!(*fixture.terminology.created.lock().unwrap(), vec!["C1", "C2"]);
        assert_eq!(*fixture.terminology.fetches.lock().unwrap(), 0);

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].is_success());
        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.skipped_records[0].error.row(), 2);

        let diff = report.diff.unwrap();
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].code, "B-OLD");

        let output = PathBuf::from(&fixture.config.paths.output_dir);
        assert!(output.join("body_sites.json").exists());
        assert!(report.status_file.unwrap().starts_with(&output));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_new_skips_undecodable_row() {
        let fixture = Fixture::new(FakeTerminology::default(), FakeClinical::default());
        let mut content = b"Category,Code,Display\nBody Site,C1,Arm\nBody Site,C2,".to_vec();
        content.extend_from_slice(&[0xff, 0xfe]);
        content.extend_from_slice(b"\nBody Site,C3,Head\n");
        fixture.write_source("body_sites.csv", content);

        let report = fixture.coordinator().run(SyncMode::PublishNew).await.unwrap();

        assert_eq!(*fixture.clinical.deletes.lock().unwrap(), 1);
        assert_eq!(*fixture.terminology.created.lock().unwrap(), vec!["C1", "C3"]);
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].is_success());

        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.skipped_records[0].file, "body_sites");
        assert!(matches!(
            report.skipped_records[0].error,
            MalformedRecordError::Unreadable { row: 2, .. }
        ));
        assert!(report.status_file.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_new_without_sources_still_diffs() {
        let fixture = Fixture::new(FakeTerminology::default(), FakeClinical::default());

        let report = fixture.coordinator().run(SyncMode::PublishNew).await.unwrap();

        assert!(report.outcomes.is_empty());
        assert!(report.status_file.is_none());
        assert!(report.diff.is_some());
        assert!(fixture.terminology.created.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_new_clears_output_dir() {
        let fixture = Fixture::new(FakeTerminology::default(), FakeClinical::default());
        let output = PathBuf::from(&fixture.config.paths.output_dir);
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join("stale.json"), "[]").unwrap();

        fixture.coordinator().run(SyncMode::PublishNew).await.unwrap();
        assert!(!output.join("stale.json").exists());
    }

    #[tokio::test]
    async fn test_sync_mode_skips_publish_path() {
        let fixture = Fixture::new(
            FakeTerminology {
                value_sets: vec![
                    ValueSet::new("Body Site", vec![Member::new("B1", "Abdomen")]),
                    ValueSet::new(
                        "Procedures",
                        vec![Member::new("P2", "Excision"), Member::new("B1", "Dup")],
                    ),
                ],
                ..Default::default()
            },
            FakeClinical {
                concepts: Mutex::new(existing_concepts()),
                ..Default::default()
            },
        );
        fixture.write_source("body_sites.csv", "Category,Code,Display\nBody Site,C1,Arm\n");

        let report = fixture
            .coordinator()
            .run(SyncMode::SyncFromTerminology)
            .await
            .unwrap();

        assert_eq!(*fixture.clinical.deletes.lock().unwrap(), 0);
        assert!(fixture.terminology.created.lock().unwrap().is_empty());
        assert!(!PathBuf::from(&fixture.config.paths.output_dir).exists());
        assert_eq!(*fixture.terminology.fetches.lock().unwrap(), 1);

        let pushes = fixture.clinical.pushes.lock().unwrap().clone();
        assert_eq!(
            pushes,
            vec![vec![
                Concept::new("B1", "Abdomen", ConceptSource::BodySite),
                Concept::new("P2", "Excision", ConceptSource::Procedure),
            ]]
        );
        assert_eq!(report.pushed_concepts, 2);

        let diff = report.diff.unwrap();
        let added: Vec<&str> = diff.added.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(added, vec!["B1", "P2"]);
        assert!(diff.removed.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_only_takes_single_snapshot() {
        let fixture = Fixture::new(
            FakeTerminology::default(),
            FakeClinical {
                concepts: Mutex::new(existing_concepts()),
                ..Default::default()
            },
        );

        let report = fixture.coordinator().run(SyncMode::FetchOnly).await.unwrap();

        assert_eq!(*fixture.clinical.fetches.lock().unwrap(), 1);
        assert_eq!(*fixture.clinical.deletes.lock().unwrap(), 0);
        assert!(fixture.clinical.pushes.lock().unwrap().is_empty());
        assert_eq!(*fixture.terminology.fetches.lock().unwrap(), 0);
        assert!(report.diff.is_none());
        assert!(report.after.is_none());
        assert_eq!(report.before.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_fatal() {
        let fixture = Fixture::new(
            FakeTerminology::default(),
            FakeClinical {
                fail_fetch: true,
                ..Default::default()
            },
        );

        let err = fixture
            .coordinator()
            .run(SyncMode::PublishNew)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
        assert_eq!(*fixture.clinical.deletes.lock().unwrap(), 0);
    }

    #[test]
    fn test_concepts_from_value_sets() {
        let value_sets = vec![
            ValueSet::new("Procedure Body Sites", vec![Member::new("B1", "Arm")]),
            ValueSet::new("Radiology", vec![Member::new("R1", "CT"), Member::new("B1", "x")]),
        ];
        let concepts = concepts_from_value_sets(&value_sets);
        assert_eq!(
            concepts,
            vec![
                Concept::new("B1", "Arm", ConceptSource::BodySite),
                Concept::new("R1", "CT", ConceptSource::Procedure),
            ]
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SyncMode::default(), SyncMode::PublishNew);
        assert_eq!(SyncMode::SyncFromTerminology.to_string(), "sync");
        assert!(!SyncMode::FetchOnly.takes_diff());
    }
}
