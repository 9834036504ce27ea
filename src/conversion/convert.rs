use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, LumaA, Pixel, Rgb, Rgba};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::ConversionError;
use crate::cli::OutputFormat;
use crate::utils::warn_println;

/// Largest decode buffer accepted for one slice (4 GiB). A header claiming
/// more is reported as a decode error instead of being allocated.
pub const MAX_DECODE_ALLOC: u64 = 4 * 1024 * 1024 * 1024;

/// One source file to convert, consumed by exactly one worker
#[derive(Debug, Clone)]
pub struct ConversionJob<'a> {
    pub source: &'a Path,
    pub dest_folder: &'a Path,
    pub format: OutputFormat,
    pub quality: u8,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl ConversionJob<'_> {
    /// `{dest_folder}/{source stem}.{jpg|png}`
    pub fn destination_path(&self) -> PathBuf {
        destination_path(self.source, self.dest_folder, self.format)
    }
}

pub fn destination_path(source: &Path, dest_folder: &Path, format: OutputFormat) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format.extension());
    dest_folder.join(name)
}

/// Keep one source per destination file.
///
/// Sources sharing a stem (`1.tif`, `1.tiff`) map to the same output. The
/// first in `files` order keeps it; every later one comes back paired with a
/// `DestinationCollision` error and must not be dispatched.
pub fn split_destination_collisions(
    files: Vec<PathBuf>,
    dest_folder: &Path,
    format: OutputFormat,
) -> (Vec<PathBuf>, Vec<(PathBuf, ConversionError)>) {
    let mut claimed: HashMap<PathBuf, usize> = HashMap::new();
    let mut unique: Vec<PathBuf> = Vec::with_capacity(files.len());
    let mut collisions = Vec::new();

    for source in files {
        let destination = destination_path(&source, dest_folder, format);
        match claimed.get(&destination) {
            Some(&index) => {
                let first = unique[index].clone();
                collisions.push((
                    source,
                    ConversionError::DestinationCollision { destination, first },
                ));
            }
            None => {
                claimed.insert(destination, unique.len());
                unique.push(source);
            }
        }
    }

    (unique, collisions)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Destination written
    Converted(PathBuf),
    /// Destination already existed and overwrite is off
    Skipped(PathBuf),
    /// Dry run: destination would be written
    Planned(PathBuf),
}

/// Convert a single TIFF into the job's destination folder.
///
/// Produces at most one output file. When encoding fails the partially
/// written destination is removed.
pub fn convert_single(job: &ConversionJob) -> Result<ConversionOutcome, ConversionError> {
    let dest_path = job.destination_path();

    if !job.overwrite && dest_path.exists() {
        return Ok(ConversionOutcome::Skipped(dest_path));
    }
    if job.dry_run {
        return Ok(ConversionOutcome::Planned(dest_path));
    }

    let img = normalize_depth(decode(job.source)?);

    if let Err(e) = write_image(&img, &dest_path, job.format, job.quality) {
        if dest_path.exists() {
            if let Err(cleanup) = fs::remove_file(&dest_path) {
                warn_println(&format!(
                    "Could not remove partial output {}: {}",
                    dest_path.display(),
                    cleanup
                ));
            }
        }
        return Err(e);
    }

    Ok(ConversionOutcome::Converted(dest_path))
}

fn decode(path: &Path) -> Result<DynamicImage, ConversionError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    // Real slices exceed the 512 MiB default
    let mut limits = image::Limits::default();
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);
    reader.decode().map_err(ConversionError::Decode)
}

/// Bring any decoded image down to 8 bits per channel.
///
/// 8-bit layouts pass through untouched. 16-bit samples are divided by 256
/// and truncated (65535 -> 255, 511 -> 1, 255 -> 0), never rounded. Float
/// samples are divided by 256 and saturate into 0..=255.
pub fn normalize_depth(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img,
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma8(truncate_u16::<_, Luma<u8>>(&buf))
        }
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA8(truncate_u16::<_, LumaA<u8>>(&buf))
        }
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb8(truncate_u16::<_, Rgb<u8>>(&buf)),
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba8(truncate_u16::<_, Rgba<u8>>(&buf))
        }
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb8(truncate_f32::<_, Rgb<u8>>(&buf)),
        DynamicImage::ImageRgba32F(buf) => {
            DynamicImage::ImageRgba8(truncate_f32::<_, Rgba<u8>>(&buf))
        }
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    }
}

fn truncate_u16<P, Q>(buf: &ImageBuffer<P, Vec<u16>>) -> ImageBuffer<Q, Vec<u8>>
where
    P: Pixel<Subpixel = u16>,
    Q: Pixel<Subpixel = u8>,
{
    let (width, height) = buf.dimensions();
    let mut out = ImageBuffer::<Q, Vec<u8>>::new(width, height);
    for (dst, src) in out.iter_mut().zip(buf.iter()) {
        *dst = (*src / 256) as u8;
    }
    out
}

fn truncate_f32<P, Q>(buf: &ImageBuffer<P, Vec<f32>>) -> ImageBuffer<Q, Vec<u8>>
where
    P: Pixel<Subpixel = f32>,
    Q: Pixel<Subpixel = u8>,
{
    let (width, height) = buf.dimensions();
    let mut out = ImageBuffer::<Q, Vec<u8>>::new(width, height);
    for (dst, src) in out.iter_mut().zip(buf.iter()) {
        *dst = (*src / 256.0) as u8;
    }
    out
}

fn write_image(
    img: &DynamicImage,
    dest_path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<(), ConversionError> {
    let mut writer = BufWriter::new(File::create(dest_path)?);

    match format {
        OutputFormat::Jpg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            without_alpha(img)
                .write_with_encoder(encoder)
                .map_err(ConversionError::Encode)?;
        }
        OutputFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut writer))
                .map_err(ConversionError::Encode)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// JPEG has no alpha channel
fn without_alpha(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageLumaA8(_) => Cow::Owned(DynamicImage::ImageLuma8(img.to_luma8())),
        DynamicImage::ImageRgba8(_) => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
        _ => Cow::Borrowed(img),
    }
}
