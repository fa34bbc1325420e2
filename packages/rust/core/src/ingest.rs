//! Bulk import: archive → CSV → deduplicated poets and poems.
//!
//! Records are processed strictly in input order, one at a time, in
//! fixed-size batches. A failure on one record is logged and counted but
//! never aborts the run; only archive and parse failures are fatal, and
//! both happen before the first persistence call.

use std::collections::HashMap;

use poetryhub_shared::{ImportConfig, PoetId, PoetryHubError, Result, poet_name_key};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::archive;
use crate::record::ImportRecord;
use crate::store::CatalogStore;
use crate::tabular;

/// Tunables for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Records per batch. Zero is treated as one.
    pub batch_size: usize,
    /// Bio given to poets created by the import.
    pub default_bio: String,
    /// Name of the CSV entry inside the archive.
    pub archive_entry: String,
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            default_bio: config.default_bio.clone(),
            archive_entry: config.archive_entry.clone(),
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

/// Running counters, emitted after every processed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub total_processed: u64,
    pub added_poems: u64,
    pub added_poets: u64,
    pub skipped_poems: u64,
    pub failed_records: u64,
    /// Title of the record just processed.
    #[serde(rename = "currentPoem")]
    pub current_title: String,
}

/// Final counters for an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_processed: u64,
    pub added_poems: u64,
    pub added_poets: u64,
    pub skipped_poems: u64,
    pub failed_records: u64,
    /// The run stopped early on request.
    pub cancelled: bool,
}

impl ImportSummary {
    fn from_progress(progress: &ImportProgress, cancelled: bool) -> Self {
        Self {
            total_processed: progress.total_processed,
            added_poems: progress.added_poems,
            added_poets: progress.added_poets,
            skipped_poems: progress.skipped_poems,
            failed_records: progress.failed_records,
            cancelled,
        }
    }
}

enum Outcome {
    Added,
    Duplicate,
}

/// Drives one import run against a [`CatalogStore`].
///
/// Owns the run's poet cache (name key → id), so an importer must not be
/// shared between concurrent runs.
pub struct Importer<'a, S: CatalogStore> {
    store: &'a S,
    options: ImportOptions,
    poet_ids: HashMap<String, PoetId>,
    progress: ImportProgress,
    reporter: Option<UnboundedSender<ImportProgress>>,
    cancel: Option<CancellationToken>,
}

impl<'a, S: CatalogStore> Importer<'a, S> {
    pub fn new(store: &'a S, options: ImportOptions) -> Self {
        Self {
            store,
            options,
            poet_ids: HashMap::new(),
            progress: ImportProgress::default(),
            reporter: None,
            cancel: None,
        }
    }

    /// Send a progress snapshot after each processed record.
    pub fn with_progress(mut self, reporter: UnboundedSender<ImportProgress>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Stop between records once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Import `records` and return the final counters.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn run(mut self, records: &[ImportRecord]) -> ImportSummary {
        let batch_size = self.options.batch_size.max(1);
        let mut cancelled = false;

        'batches: for (index, batch) in records.chunks(batch_size).enumerate() {
            for record in batch {
                if self.is_cancelled() {
                    cancelled = true;
                    break 'batches;
                }
                if !record.is_complete() {
                    debug!(line = record.line, "skipping incomplete record");
                    continue;
                }

                match self.import_record(record).await {
                    Ok(Outcome::Added) => self.progress.added_poems += 1,
                    Ok(Outcome::Duplicate) => self.progress.skipped_poems += 1,
                    Err(e) => {
                        let err = PoetryHubError::RecordPersistence {
                            title: record.title.clone(),
                            message: e.to_string(),
                        };
                        warn!(line = record.line, error = %err, "record not imported");
                        self.progress.failed_records += 1;
                    }
                }

                self.progress.total_processed += 1;
                self.progress.current_title = record.title.clone();
                self.report();
            }

            debug!(
                batch = index + 1,
                processed = self.progress.total_processed,
                "batch complete"
            );
        }

        let summary = ImportSummary::from_progress(&self.progress, cancelled);
        info!(
            processed = summary.total_processed,
            added_poems = summary.added_poems,
            added_poets = summary.added_poets,
            skipped = summary.skipped_poems,
            failed = summary.failed_records,
            cancelled,
            "import finished"
        );
        summary
    }

    async fn import_record(&mut self, record: &ImportRecord) -> Result<Outcome> {
        let poet_id = self.resolve_poet(&record.poet_name).await?;

        if self
            .store
            .find_poem_by_title_and_poet(&record.title, &poet_id)
            .await?
            .is_some()
        {
            return Ok(Outcome::Duplicate);
        }

        self.store
            .create_poem(&record.title, &record.body, &poet_id)
            .await?;
        Ok(Outcome::Added)
    }

    /// Cache, then store lookup, then create.
    async fn resolve_poet(&mut self, name: &str) -> Result<PoetId> {
        let key = poet_name_key(name);
        if let Some(id) = self.poet_ids.get(&key) {
            return Ok(id.clone());
        }

        let id = match self.store.find_poet_by_name(name).await? {
            Some(poet) => poet.id,
            None => {
                let poet = self
                    .store
                    .create_poet(name, &self.options.default_bio)
                    .await?;
                self.progress.added_poets += 1;
                poet.id
            }
        };

        self.poet_ids.insert(key, id.clone());
        Ok(id)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn report(&self) {
        if let Some(reporter) = &self.reporter {
            // A closed receiver only means nobody is watching.
            let _ = reporter.send(self.progress.clone());
        }
    }
}

/// Import every poem in a ZIP archive.
///
/// Reads `options.archive_entry` from `bytes`, parses it as CSV, and runs an
/// [`Importer`] over the rows.
#[instrument(skip_all, fields(bytes = bytes.len(), entry = %options.archive_entry))]
pub async fn import_archive<S: CatalogStore>(
    bytes: &[u8],
    store: &S,
    options: ImportOptions,
    progress: Option<UnboundedSender<ImportProgress>>,
    cancel: Option<CancellationToken>,
) -> Result<ImportSummary> {
    let text = archive::read_entry(bytes, &options.archive_entry)?;
    let rows = tabular::parse(&text)?;
    let records: Vec<ImportRecord> = rows.iter().map(ImportRecord::from_row).collect();
    info!(rows = records.len(), "import data parsed");

    let mut importer = Importer::new(store, options);
    if let Some(reporter) = progress {
        importer = importer.with_progress(reporter);
    }
    if let Some(token) = cancel {
        importer = importer.with_cancellation(token);
    }
    Ok(importer.run(&records).await)
}
