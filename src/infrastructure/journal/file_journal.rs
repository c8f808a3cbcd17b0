//! Flat-file step journal: one `step_<n>.json` per round in the chunk workspace.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::domain::errors::JournalError;
use crate::domain::models::StepRecord;
use crate::domain::ports::StepJournal;

static STEP_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^step_(\d+)\.json$").expect("step file pattern is valid"));

/// Step journal stored as individual JSON files in a chunk workspace
///
/// Files that do not match the `step_<n>.json` naming are ignored, so the
/// workspace may hold other artifacts. Records are written to a hidden
/// temporary file, flushed, then hard-linked into place: a step file is
/// either complete or absent, and an existing one is never replaced.
#[derive(Debug, Clone)]
pub struct FileStepJournal {
    dir: PathBuf,
}

impl FileStepJournal {
    /// Open the journal in `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| JournalError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Open an existing journal directory without creating it.
    pub async fn open_existing(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let dir = dir.into();
        let metadata = fs::metadata(&dir).await.map_err(|source| JournalError::Io {
            path: dir.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(JournalError::Io {
                path: dir,
                source: std::io::Error::other("journal location is not a directory"),
            });
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `index`.
    pub fn step_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("step_{index}.json"))
    }

    fn temp_path(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!(".step_{index}.{}.json.tmp", std::process::id()))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> JournalError + '_ {
        move |source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Index encoded in a file name, if it follows the step naming.
    ///
    /// `Some(None)` means the name matches but the number is out of range.
    /// `u32::MAX` is reserved: no step may follow it.
    fn parse_index(file_name: &str) -> Option<Option<u32>> {
        STEP_FILE_PATTERN.captures(file_name).map(|captures| {
            captures[1]
                .parse::<u32>()
                .ok()
                .filter(|index| *index < u32::MAX)
        })
    }

    /// Write `body` to a private temporary file and link it in as `path`.
    ///
    /// Linking fails if `path` already exists, so a record is never
    /// replaced even when two writers race. The temporary file is removed
    /// whether or not publishing succeeds.
    async fn publish(
        &self,
        index: u32,
        temp: &Path,
        path: &Path,
        body: &[u8],
    ) -> Result<(), JournalError> {
        let result = Self::stage_and_link(index, temp, path, body).await;
        if let Err(e) = fs::remove_file(temp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %temp.display(), "failed to remove temporary step file: {}", e);
            }
        }
        result
    }

    async fn stage_and_link(
        index: u32,
        temp: &Path,
        path: &Path,
        body: &[u8],
    ) -> Result<(), JournalError> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp)
            .await
            .map_err(Self::io_error(temp))?;
        file.write_all(body).await.map_err(Self::io_error(temp))?;
        file.sync_all().await.map_err(Self::io_error(temp))?;
        drop(file);

        fs::hard_link(temp, path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                JournalError::IndexExists(index)
            } else {
                JournalError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}

#[async_trait]
impl StepJournal for FileStepJournal {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn scan(&self) -> Result<Vec<(u32, StepRecord)>, JournalError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(Self::io_error(&self.dir))?;

        let mut steps = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(Self::io_error(&self.dir))?
        {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(index) = Self::parse_index(file_name) else {
                continue;
            };
            let Some(index) = index else {
                return Err(JournalError::InvalidIndex { path });
            };

            let raw = fs::read_to_string(&path)
                .await
                .map_err(Self::io_error(&path))?;
            let record: StepRecord = serde_json::from_str(&raw)
                .map_err(|source| JournalError::Malformed {
                    path: path.clone(),
                    source,
                })?;

            steps.push((index, record));
        }

        steps.sort_by_key(|(index, _)| *index);
        debug!(count = steps.len(), "scanned step records");
        Ok(steps)
    }

    #[instrument(skip(self, record), fields(dir = %self.dir.display()))]
    async fn append(&self, index: u32, record: &StepRecord) -> Result<(), JournalError> {
        let path = self.step_path(index);
        if index == u32::MAX {
            return Err(JournalError::InvalidIndex { path });
        }
        if fs::try_exists(&path).await.map_err(Self::io_error(&path))? {
            return Err(JournalError::IndexExists(index));
        }

        let body = serde_json::to_vec_pretty(record).map_err(|source| JournalError::Malformed {
            path: path.clone(),
            source,
        })?;

        let temp = self.temp_path(index);
        self.publish(index, &temp, &path, &body).await?;

        // Make the new directory entry durable.
        #[cfg(unix)]
        fs::File::open(&self.dir)
            .await
            .map_err(Self::io_error(&self.dir))?
            .sync_all()
            .await
            .map_err(Self::io_error(&self.dir))?;

        debug!(index, path = %path.display(), "step record written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
