//! Cache invalidation publishers.
//!
//! [`JournalInvalidator`] appends every notification as one JSON line to an
//! invalidation journal that cache workers tail. [`LogInvalidator`] only
//! reports notifications through `tracing`, for runs without a journal.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::CacheContext;
use crate::catalog::CacheInvalidator;
use crate::types::ProductId;
use crate::{Error, Result};

/// Event name written for tag-based cache cleaning.
pub const CLEAN_CACHE_BY_TAGS: &str = "clean_cache_by_tags";

/// One line of the invalidation journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Event name, always [`CLEAN_CACHE_BY_TAGS`] for now.
    pub event: String,
    /// Entity ids per cache tag.
    pub tags: BTreeMap<String, BTreeSet<ProductId>>,
    /// When the notification was published.
    pub published_at: DateTime<Utc>,
}

/// Appends clean-by-tags notifications to a JSONL file.
#[derive(Debug, Clone)]
pub struct JournalInvalidator {
    path: PathBuf,
}

impl JournalInvalidator {
    /// Publish to the journal at `path`. The file is created on first publish.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, entry: &JournalEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut line = serde_json::to_vec(entry).map_err(std::io::Error::other)?;
        line.push(b'\n');
        let written = file.write_all(&line).and_then(|()| file.sync_data());
        let unlocked = FileExt::unlock(&file);
        written.and(unlocked)
    }
}

impl CacheInvalidator for JournalInvalidator {
    fn clean_by_tags(&self, context: &CacheContext) -> Result<()> {
        let entry = JournalEntry {
            event: CLEAN_CACHE_BY_TAGS.to_string(),
            tags: context.tags().clone(),
            published_at: Utc::now(),
        };

        self.append(&entry).map_err(|e| {
            Error::CachePublish(format!(
                "failed to append to {}: {e}",
                self.path.display()
            ))
        })?;
        debug!(
            entities = context.len(),
            "Published {} to {}",
            CLEAN_CACHE_BY_TAGS,
            self.path.display()
        );
        Ok(())
    }
}

/// Read every entry of a journal. A missing journal reads as empty;
/// unparseable lines are skipped with a warning.
pub fn read_journal(path: &Path) -> Result<Vec<JournalEntry>> {
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let raw = line?;
        if raw.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalEntry>(&raw) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!("skipping malformed journal line: {err}"),
        }
    }
    Ok(entries)
}

/// Reports notifications through `tracing` and publishes nowhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogInvalidator;

impl CacheInvalidator for LogInvalidator {
    fn clean_by_tags(&self, context: &CacheContext) -> Result<()> {
        info!(
            entities = context.len(),
            "{}: {}",
            CLEAN_CACHE_BY_TAGS,
            context.identities().join(", ")
        );
        Ok(())
    }
}
