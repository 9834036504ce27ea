use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::conversion::{ConversionConfig, TargetType, TargetTypeSet};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossy JPEG at the requested quality
    #[value(name = "jpg")]
    Jpg,
    /// Lossless PNG
    #[value(name = "png")]
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Suffix appended to a source folder to name its destination
    pub fn folder_suffix(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "_jpg",
            OutputFormat::Png => "_png",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "JPG",
            OutputFormat::Png => "PNG",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TargetArg {
    /// Subfolders of every `volumes` folder
    #[value(name = "volumes")]
    Volumes,
    /// Subfolders of every `masked_volumes` folder
    #[value(name = "masked_volumes")]
    MaskedVolumes,
    /// Every `layers` folder
    #[value(name = "layers")]
    Layers,
    /// All of the above
    #[value(name = "all")]
    All,
}

impl TargetArg {
    pub fn target_types(&self) -> TargetTypeSet {
        match self {
            TargetArg::Volumes => TargetTypeSet::new([TargetType::Volumes]),
            TargetArg::MaskedVolumes => TargetTypeSet::new([TargetType::MaskedVolumes]),
            TargetArg::Layers => TargetTypeSet::new([TargetType::Layers]),
            TargetArg::All => TargetTypeSet::all(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "tiff-converter",
    about = "Convert TIFF volume and layer folders to JPEG or PNG in parallel",
    long_about = "
TIFF Converter

Walks a directory tree, finds folders named volumes, masked_volumes or layers,
and converts the TIFF files inside them to JPEG or PNG using one worker per CPU.
Converted files land in a sibling folder suffixed _jpg or _png. Source files are
never modified.

Example Usage:
  # Convert every layers folder under the current directory to JPG (quality 95)
  tiff-converter

  # Convert all volume subfolders to PNG, replacing earlier outputs
  tiff-converter /data/scroll1 volumes png true

  # JPG at quality 85, only every 5th slice (00000.tif, 00005.tif, ...)
  tiff-converter /data/scroll1 all jpg false 85 5

  # Show what would be converted without writing anything
  tiff-converter /data/scroll1 all --dry-run --verbose"
)]
pub struct Args {
    /// Root directory to search for target folders
    #[arg(value_name = "ROOT", default_value = "./")]
    pub root: PathBuf,

    /// Target data type: volumes, masked_volumes, layers or all
    #[arg(value_name = "TYPE", value_enum, default_value_t = TargetArg::Layers)]
    pub target: TargetArg,

    /// Output format: jpg or png
    #[arg(value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Jpg)]
    pub format: OutputFormat,

    /// Overwrite existing outputs ("true" in any case enables it)
    #[arg(value_name = "OVERWRITE", default_value = "false")]
    pub overwrite: String,

    /// JPEG quality (0-100)
    #[arg(
        value_name = "QUALITY",
        default_value_t = 95,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub quality: u8,

    /// Only convert files whose numeric name is divisible by this value
    #[arg(value_name = "MODULO")]
    pub mod_value: Option<String>,

    /// Write every folder's output to DIR_jpg / DIR_png instead of next to the source
    #[arg(short = 'o', long = "output-path", value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output with per-file details
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// List what would be converted without creating any folder or file
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Args {
    pub fn overwrite(&self) -> bool {
        self.overwrite.eq_ignore_ascii_case("true")
    }

    /// Build the run configuration; the worker count follows the host's CPUs
    pub fn to_config(&self) -> ConversionConfig {
        ConversionConfig {
            root: self.root.clone(),
            target_types: self.target.target_types(),
            output_format: self.format,
            quality: self.quality,
            overwrite: self.overwrite(),
            mod_value: self.mod_value.clone(),
            output_path: self.output_path.clone(),
            parallel_jobs: num_cpus::get(),
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }
}
