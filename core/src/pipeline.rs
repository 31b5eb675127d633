use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::source::DirectorySource;
use crate::tokenizer::tokenize;
use crate::{InvertedIndex, Token};

/// What `index_directory` does with counts left over from an earlier run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// Clear the index once the path is validated.
    #[default]
    Fresh,
    /// Add onto existing counts.
    Accumulate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub files_indexed: usize,
    pub bytes_read: u64,
    #[serde(rename = "elapsed_s", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    pub failures: Vec<FileFailure>,
}

impl IndexStats {
    /// Decimal megabytes per second; 0 when no time was measured.
    pub fn throughput_mb_per_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        (self.bytes_read as f64 / 1e6) / secs
    }
}

fn as_secs_f64<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Index the regular files directly inside `path`.
///
/// Fails only when `path` is not a directory (the index is left untouched) or
/// the directory cannot be listed. Files that cannot be read are skipped and
/// reported in [`IndexStats::failures`]; a file's counts reach the index only
/// after it was read to the end.
pub fn index_directory<S: DirectorySource + ?Sized>(
    source: &S,
    index: &mut InvertedIndex,
    path: &Path,
    mode: IndexMode,
) -> Result<IndexStats> {
    let start = Instant::now();
    if !source.is_dir(path) {
        return Err(EngineError::NotADirectory(path.to_path_buf()));
    }
    let files = source.list_files(path)?;
    if mode == IndexMode::Fresh {
        index.clear();
    }

    let mut stats = IndexStats::default();
    for file in files {
        match count_file(source, &file) {
            Ok((counts, bytes)) => {
                let file_id = source.file_id(&file);
                index.register_file(&file_id);
                for (token, n) in &counts {
                    index.add_occurrences(&file_id, token, *n);
                }
                stats.files_indexed += 1;
                stats.bytes_read += bytes;
                tracing::debug!(file = %file_id, bytes, distinct = counts.len(), "indexed file");
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping file");
                let reason = match &err {
                    EngineError::FileUnreadable { source: io_err, .. } => io_err.to_string(),
                    other => other.to_string(),
                };
                stats.failures.push(FileFailure { path: file, reason });
            }
        }
    }
    stats.elapsed = start.elapsed();

    tracing::info!(
        path = %path.display(),
        files = stats.files_indexed,
        skipped = stats.failures.len(),
        bytes = stats.bytes_read,
        terms = index.num_terms(),
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "index build complete"
    );
    Ok(stats)
}

fn count_file<S: DirectorySource + ?Sized>(source: &S, file: &Path) -> Result<(HashMap<Token, u32>, u64)> {
    let unreadable = |e| EngineError::FileUnreadable { path: file.to_path_buf(), source: e };
    let mut reader = source.open(file).map_err(unreadable)?;
    let mut counts: HashMap<Token, u32> = HashMap::new();
    let mut bytes = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(unreadable)?;
        if n == 0 {
            break;
        }
        bytes += n as u64;
        // tokens are ASCII, so a non-UTF-8 byte only acts as a separator
        for token in tokenize(&String::from_utf8_lossy(&buf)) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }
    Ok((counts, bytes))
}
