use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single-file conversion. Never aborts sibling jobs.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Destination {} collides with {}", destination.display(), first.display())]
    DestinationCollision { destination: PathBuf, first: PathBuf },
}

/// Failure that aborts the conversion of one whole folder.
#[derive(Error, Debug)]
pub enum FolderError {
    #[error("Failed to create destination folder {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list folder {}: {source}", path.display())]
    ListFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Filename stem '{stem}' of {} is not an integer, modulo filtering aborted", path.display())]
    NonNumericStem { path: PathBuf, stem: String },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
