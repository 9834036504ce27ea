use std::fs;
use std::path::{Path, PathBuf};

use super::error::FolderError;

pub const TIFF_EXTENSIONS: [&str; 2] = [".tif", ".tiff"];

/// Prefix of the resource-fork companions some systems leave next to real files
pub const RESOURCE_FORK_PREFIX: &str = "._";

/// Check whether a file name denotes a convertible TIFF
pub fn is_candidate_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    !name.starts_with(RESOURCE_FORK_PREFIX) && TIFF_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// List the TIFF files directly inside `folder`, sorted by full path
pub fn list_candidates(folder: &Path) -> Result<Vec<PathBuf>, FolderError> {
    let list_error = |source| FolderError::ListFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let path = entry.path();
        if is_candidate_name(&entry.file_name().to_string_lossy()) && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredCandidates {
    pub files: Vec<PathBuf>,
    /// Set when a modulo value was given but filtering had to be disabled
    pub warning: Option<String>,
}

/// Parse a modulo value; zero counts as unusable
pub fn parse_modulo(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|modulo| *modulo != 0)
}

/// Numeric index of a file, taken from its stem (`00042.tif` -> 42)
pub fn file_index(path: &Path) -> Result<i64, FolderError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.trim()
        .parse::<i64>()
        .map_err(|_| FolderError::NonNumericStem {
            path: path.to_path_buf(),
            stem,
        })
}

/// Keep only files whose numeric stem is divisible by the modulo value.
///
/// No value keeps everything. An unparseable value keeps everything and
/// returns a warning. A non-numeric stem fails the whole pass.
pub fn apply_modulo_filter(
    files: Vec<PathBuf>,
    mod_value: Option<&str>,
) -> Result<FilteredCandidates, FolderError> {
    let Some(raw) = mod_value else {
        return Ok(FilteredCandidates {
            files,
            warning: None,
        });
    };

    let Some(modulo) = parse_modulo(raw) else {
        return Ok(FilteredCandidates {
            files,
            warning: Some(format!(
                "Modulo value '{}' must be a non-zero integer. Skipping modulo filtering.",
                raw
            )),
        });
    };

    let mut kept = Vec::new();
    for path in files {
        if file_index(&path)?.wrapping_rem(modulo) == 0 {
            kept.push(path);
        }
    }

    Ok(FilteredCandidates {
        files: kept,
        warning: None,
    })
}
