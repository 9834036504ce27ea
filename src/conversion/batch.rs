use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::convert::ConversionOutcome;
use super::error::{ConversionError, FolderError};

/// Batch progress tracking shared by the workers of one folder
pub struct BatchProcessor {
    pub total_files: usize,
    pub processed_count: AtomicUsize,
}

impl BatchProcessor {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            processed_count: AtomicUsize::new(0),
        }
    }

    /// Increment processed count and return current count
    pub fn increment(&self) -> usize {
        self.processed_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_files == 0 {
            1.0
        } else {
            (self.processed_count.load(Ordering::Relaxed) as f64) / (self.total_files as f64)
        }
    }
}

/// Run `process_fn` over every file on a dedicated pool of `jobs` workers.
///
/// Blocks until all files are done. Results come back in input order.
pub fn process_files_parallel<T, F, P>(
    files: &[PathBuf],
    jobs: usize,
    process_fn: F,
    progress_callback: P,
) -> Result<Vec<T>, rayon::ThreadPoolBuildError>
where
    T: Send,
    F: Fn(&Path) -> T + Send + Sync,
    P: Fn(usize, f64) + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|index| format!("convert-{}", index))
        .build()?;
    let processor = BatchProcessor::new(files.len());

    Ok(pool.install(|| {
        files
            .par_iter()
            .map(|file_path| {
                let result = process_fn(file_path);

                let completed = processor.increment();
                progress_callback(completed, processor.progress());

                result
            })
            .collect()
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Per-folder counts of what happened to each file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub planned: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn record(&mut self, path: &Path, result: Result<ConversionOutcome, ConversionError>) {
        match result {
            Ok(ConversionOutcome::Converted(_)) => self.converted += 1,
            Ok(ConversionOutcome::Skipped(_)) => self.skipped += 1,
            Ok(ConversionOutcome::Planned(_)) => self.planned += 1,
            Err(e) => self.failures.push(FileFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.planned + self.failed()
    }

    pub fn merge(&mut self, other: BatchSummary) {
        self.converted += other.converted;
        self.skipped += other.skipped;
        self.planned += other.planned;
        self.failures.extend(other.failures);
    }
}

/// Whole-run totals across every folder the walker visited
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub folders_converted: usize,
    pub files: BatchSummary,
    pub aborted: Vec<FileFailure>,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn record_folder(&mut self, summary: BatchSummary) {
        self.folders_converted += 1;
        self.files.merge(summary);
    }

    pub fn record_aborted(&mut self, folder: &Path, error: &FolderError) {
        self.aborted.push(FileFailure {
            path: folder.to_path_buf(),
            message: error.to_string(),
        });
    }

    pub fn has_aborted(&self) -> bool {
        !self.aborted.is_empty()
    }
}
