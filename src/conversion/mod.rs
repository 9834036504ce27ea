pub mod batch;
pub mod convert;
pub mod discover;
pub mod error;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::OutputFormat;
use crate::utils::{
    create_progress_bar, error_println, format_duration, validate_root, verbose_println,
    warn_println,
};
use batch::{BatchSummary, RunSummary};
use convert::{ConversionJob, ConversionOutcome};
use error::FolderError;

/// Folder kinds the tree walker looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Volumes,
    MaskedVolumes,
    Layers,
}

impl TargetType {
    pub const ALL: [TargetType; 3] = [
        TargetType::Volumes,
        TargetType::MaskedVolumes,
        TargetType::Layers,
    ];

    /// Directory base name that marks a folder of this kind
    pub fn folder_name(&self) -> &'static str {
        match self {
            TargetType::Volumes => "volumes",
            TargetType::MaskedVolumes => "masked_volumes",
            TargetType::Layers => "layers",
        }
    }

    /// `layers` folders hold TIFFs directly; the other kinds hold one
    /// subfolder per volume.
    pub fn converts_subfolders(&self) -> bool {
        !matches!(self, TargetType::Layers)
    }
}

/// Set of folder kinds eligible for conversion, fixed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTypeSet {
    types: Vec<TargetType>,
}

impl TargetTypeSet {
    pub fn new(types: impl IntoIterator<Item = TargetType>) -> Self {
        let mut unique = Vec::new();
        for target_type in types {
            if !unique.contains(&target_type) {
                unique.push(target_type);
            }
        }
        Self { types: unique }
    }

    pub fn all() -> Self {
        Self::new(TargetType::ALL)
    }

    /// Return the target type whose folder name equals `name`, if it is in the set
    pub fn match_folder(&self, name: &str) -> Option<TargetType> {
        self.types
            .iter()
            .copied()
            .find(|target_type| target_type.folder_name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.folder_name()).collect()
    }
}

impl Default for TargetTypeSet {
    fn default() -> Self {
        Self::new([TargetType::Layers])
    }
}

/// Every parameter of one conversion run, built once at the entry point.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Root of the directory tree to walk (default `./`)
    pub root: PathBuf,
    /// Folder kinds to convert (default `layers`)
    pub target_types: TargetTypeSet,
    /// Output image format (default `jpg`)
    pub output_format: OutputFormat,
    /// JPEG quality 0-100, ignored for PNG (default 95)
    pub quality: u8,
    /// Re-convert files whose destination already exists (default false)
    pub overwrite: bool,
    /// Raw modulo value; a non-integer disables filtering with a warning (default none)
    pub mod_value: Option<String>,
    /// Replaces the source folder as the destination base when set (default none)
    pub output_path: Option<PathBuf>,
    /// Worker count per folder batch (default: available CPUs)
    pub parallel_jobs: usize,
    pub verbose: bool,
    /// Report what would be converted without writing anything
    pub dry_run: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./"),
            target_types: TargetTypeSet::default(),
            output_format: OutputFormat::Jpg,
            quality: 95,
            overwrite: false,
            mod_value: None,
            output_path: None,
            parallel_jobs: num_cpus::get(),
            verbose: false,
            dry_run: false,
        }
    }
}

pub struct ConversionEngine {
    config: ConversionConfig,
}

impl ConversionEngine {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Destination for a source folder: `{output_path or source_folder}` plus `_jpg`/`_png`
    pub fn destination_folder(&self, source_folder: &Path) -> PathBuf {
        let base = self.config.output_path.as_deref().unwrap_or(source_folder);
        let mut name = base.as_os_str().to_os_string();
        name.push(self.config.output_format.folder_suffix());
        PathBuf::from(name)
    }

    /// Convert every candidate TIFF of one folder in parallel.
    ///
    /// Returns once every job has finished. Per-file failures are logged and
    /// counted in the summary; only folder-level problems return an error.
    pub fn convert_folder(&self, source_folder: &Path) -> Result<BatchSummary, FolderError> {
        let dest_folder = self.destination_folder(source_folder);

        if self.config.dry_run {
            verbose_println(
                self.config.verbose,
                &format!("Dry run: would create {}", dest_folder.display()),
            );
        } else if !dest_folder.exists() {
            fs::create_dir_all(&dest_folder).map_err(|source| FolderError::CreateDestination {
                path: dest_folder.clone(),
                source,
            })?;
        }

        let candidates = discover::list_candidates(source_folder)?;
        let filtered =
            discover::apply_modulo_filter(candidates, self.config.mod_value.as_deref())?;
        if let Some(warning) = &filtered.warning {
            warn_println(warning);
        }
        let (files, collisions) = convert::split_destination_collisions(
            filtered.files,
            &dest_folder,
            self.config.output_format,
        );

        verbose_println(
            self.config.verbose,
            &format!(
                "{} files to convert in {} -> {}",
                files.len(),
                source_folder.display(),
                dest_folder.display()
            ),
        );

        let progress = create_progress_bar(files.len() as u64);
        progress.set_message(
            source_folder
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let results = batch::process_files_parallel(
            &files,
            self.config.parallel_jobs,
            |source| {
                let job = ConversionJob {
                    source,
                    dest_folder: &dest_folder,
                    format: self.config.output_format,
                    quality: self.config.quality,
                    overwrite: self.config.overwrite,
                    dry_run: self.config.dry_run,
                };
                convert::convert_single(&job)
            },
            |_, _| progress.inc(1),
        )?;
        progress.finish_and_clear();

        let mut summary = BatchSummary::default();
        for (source, e) in collisions {
            error_println(&format!("Error processing {}: {}", source.display(), e));
            summary.record(&source, Err(e));
        }
        for (source, result) in files.iter().zip(results) {
            match &result {
                Ok(ConversionOutcome::Converted(dest)) => verbose_println(
                    self.config.verbose,
                    &format!("Converted {} -> {}", source.display(), dest.display()),
                ),
                Ok(ConversionOutcome::Skipped(dest)) => verbose_println(
                    self.config.verbose,
                    &format!("Skipped {} (exists: {})", source.display(), dest.display()),
                ),
                Ok(ConversionOutcome::Planned(dest)) => verbose_println(
                    self.config.verbose,
                    &format!("Would convert {} -> {}", source.display(), dest.display()),
                ),
                Err(e) => error_println(&format!("Error processing {}: {}", source.display(), e)),
            }
            summary.record(source, result);
        }

        Ok(summary)
    }

    /// Walk the configured root and convert every eligible folder, one folder at a time.
    pub fn convert_tree(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        validate_root(&self.config.root)?;

        let targets = walk::discover_targets(&self.config.root, &self.config.target_types);
        verbose_println(
            self.config.verbose,
            &format!("Found {} matching folders", targets.len()),
        );

        let mut run = RunSummary::default();
        for target in &targets {
            let folder_start = Instant::now();

            for source in &target.sources {
                println!(
                    "Processing .tif files in {} to {} with quality {}",
                    source.display(),
                    self.config.output_format.label(),
                    self.config.quality
                );
                match self.convert_folder(source) {
                    Ok(summary) => run.record_folder(summary),
                    Err(e) => {
                        error_println(&format!("Aborted {}: {}", source.display(), e));
                        run.record_aborted(source, &e);
                    }
                }
            }

            println!(
                "Time to complete folder {}: {}",
                target.matched.display(),
                format_duration(folder_start.elapsed())
            );
        }

        run.total_duration = start_time.elapsed();
        Ok(run)
    }
}
