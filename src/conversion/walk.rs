use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{TargetType, TargetTypeSet};
use crate::utils::warn_println;

/// Directories with this suffix are chunked-array stores and are never entered
pub const CONTAINER_SUFFIX: &str = ".zarr";

/// Suffixes of folders produced by earlier runs
pub const OUTPUT_SUFFIXES: [&str; 2] = ["_jpg", "_png"];

/// A matched folder and the source folders it expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTarget {
    pub matched: PathBuf,
    pub target_type: TargetType,
    pub sources: Vec<PathBuf>,
}

pub fn is_container_store(name: &str) -> bool {
    name.ends_with(CONTAINER_SUFFIX)
}

pub fn is_output_folder(name: &str) -> bool {
    OUTPUT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && is_container_store(&entry.file_name().to_string_lossy())
}

/// Walk `root` and collect every folder whose name is in `target_types`.
///
/// `layers` folders are their own source; `volumes` and `masked_volumes`
/// expand to their immediate subfolders, minus earlier outputs. `.zarr`
/// stores are pruned before matching, so nothing below them is visited.
/// Unreadable entries are reported and skipped.
pub fn discover_targets(root: &Path, target_types: &TargetTypeSet) -> Vec<FolderTarget> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry));

    let mut targets = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn_println(&format!("Skipping unreadable entry: {}", err));
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(target_type) = entry
            .file_name()
            .to_str()
            .and_then(|name| target_types.match_folder(name))
        else {
            continue;
        };

        let matched = entry.path().to_path_buf();
        let sources = if target_type.converts_subfolders() {
            source_subfolders(&matched)
        } else {
            vec![matched.clone()]
        };

        targets.push(FolderTarget {
            matched,
            target_type,
            sources,
        });
    }

    targets
}

/// Immediate subfolders of a volumes folder, sorted, without prior outputs or stores
fn source_subfolders(folder: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) => {
            warn_println(&format!("Cannot list {}: {}", folder.display(), err));
            return Vec::new();
        }
    };

    let mut subfolders: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !is_output_folder(&name) && !is_container_store(&name)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    subfolders.sort();
    subfolders
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    fn sorted_targets(root: &Path, set: &TargetTypeSet) -> Vec<FolderTarget> {
        let mut targets = discover_targets(root, set);
        targets.sort_by(|a, b| a.matched.cmp(&b.matched));
        targets
    }

    #[test]
    fn test_suffix_helpers() {
        assert!(is_container_store("scroll.zarr"));
        assert!(!is_container_store("zarr_notes"));
        assert!(is_output_folder("vol1_jpg"));
        assert!(is_output_folder("vol1_png"));
        assert!(!is_output_folder("vol1_tif"));
    }

    #[test]
    fn test_layers_folder_is_its_own_source() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), &["scroll1/segment/layers"]);

        let targets = sorted_targets(dir.path(), &TargetTypeSet::default());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].target_type, TargetType::Layers);
        assert_eq!(
            targets[0].sources,
            vec![dir.path().join("scroll1/segment/layers")]
        );
    }

    #[test]
    fn test_volumes_expand_to_subfolders_without_outputs() {
        let dir = TempDir::new().unwrap();
        mkdirs(
            dir.path(),
            &[
                "volumes/vol2",
                "volumes/vol1",
                "volumes/vol1_jpg",
                "volumes/vol2_png",
                "volumes/chunks.zarr",
            ],
        );
        fs::write(dir.path().join("volumes/readme.txt"), b"").unwrap();

        let set = TargetTypeSet::new([TargetType::Volumes]);
        let targets = sorted_targets(dir.path(), &set);
        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0].sources,
            vec![
                dir.path().join("volumes/vol1"),
                dir.path().join("volumes/vol2"),
            ]
        );
    }

    #[test]
    fn test_only_requested_types_match() {
        let dir = TempDir::new().unwrap();
        mkdirs(
            dir.path(),
            &["a/volumes/v1", "a/masked_volumes/m1", "b/layers"],
        );

        let masked = sorted_targets(dir.path(), &TargetTypeSet::new([TargetType::MaskedVolumes]));
        assert_eq!(masked.len(), 1);
        assert_eq!(masked[0].sources, vec![dir.path().join("a/masked_volumes/m1")]);

        let all = sorted_targets(dir.path(), &TargetTypeSet::all());
        let kinds: Vec<TargetType> = all.iter().map(|t| t.target_type).collect();
        assert_eq!(
            kinds,
            vec![
                TargetType::MaskedVolumes,
                TargetType::Volumes,
                TargetType::Layers
            ]
        );
    }

    #[test]
    fn test_zarr_store_is_pruned_before_matching() {
        let dir = TempDir::new().unwrap();
        mkdirs(
            dir.path(),
            &["foo.zarr/bar/layers", "foo.zarr/layers", "foo.zarr/volumes/v1"],
        );

        assert!(discover_targets(dir.path(), &TargetTypeSet::all()).is_empty());
    }

    #[test]
    fn test_zarr_root_is_pruned() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), &["store.zarr/layers"]);

        let targets = discover_targets(&dir.path().join("store.zarr"), &TargetTypeSet::all());
        assert!(targets.is_empty());
    }

    #[test]
    fn test_file_named_like_target_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("layers"), b"not a folder").unwrap();

        assert!(discover_targets(dir.path(), &TargetTypeSet::default()).is_empty());
    }
}
