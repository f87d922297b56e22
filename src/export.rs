//! Export of every band of a cube as a grayscale TIFF file.
//!
//! Files are written to a `<stem> bands` directory next to the `.raw` file and
//! named `NN_<wavelength><units>.tif`, with `NN` the 1-based band number.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};
use ndarray::{Array3, ArrayView2, Axis};
use tiff::encoder::{TiffEncoder, colortype};

use crate::constants::{EXPORT_DIR_SUFFIX, EXPORT_EXTENSION};
use crate::data::{Cube, EnviImage, SpectralMetadata};
use crate::error::{EnviError, Result};

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Directory the bands were written to
    pub directory: PathBuf,
    /// Written files in band order
    pub files: Vec<PathBuf>,
}

/// Directory that receives the bands of `raw_path`: `<stem> bands` beside it.
pub fn export_dir_for(raw_path: &Path) -> PathBuf {
    let stem = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    raw_path.with_file_name(format!("{}{}", stem, EXPORT_DIR_SUFFIX))
}

/// File name of band `index` (0-based).
///
/// The wavelength is truncated toward zero.
pub fn band_file_name(index: usize, wavelength: f64, units: &str) -> String {
    format!(
        "{:0>2}_{}{}.{}",
        index + 1,
        wavelength.trunc() as i64,
        units,
        EXPORT_EXTENSION
    )
}

/// Writes the bands of a decoded cube as TIFF files.
pub struct BandExporter<'a> {
    cube: &'a Cube,
    spectral: SpectralMetadata,
}

impl<'a> BandExporter<'a> {
    /// Prepare an export. Fails before touching the disk if the wavelength
    /// list does not cover every band.
    pub fn new(image: &'a EnviImage) -> Result<Self> {
        Ok(Self {
            cube: image.cube(),
            spectral: image.spectral()?,
        })
    }

    /// Prepare an export from separately obtained parts.
    pub fn from_parts(cube: &'a Cube, spectral: SpectralMetadata) -> Result<Self> {
        if spectral.num_bands() < cube.bands() {
            return Err(EnviError::metadata_mismatch(
                crate::constants::keys::WAVELENGTH,
                format!("{} entries for {} bands", spectral.num_bands(), cube.bands()),
            ));
        }
        Ok(Self { cube, spectral })
    }

    /// Write every band into `directory`, creating it if needed.
    pub fn export_to(&self, directory: &Path) -> Result<ExportReport> {
        std::fs::create_dir_all(directory)?;

        let files: Vec<PathBuf> = (0..self.cube.bands())
            .map(|index| {
                directory.join(band_file_name(
                    index,
                    self.spectral.wavelengths[index],
                    &self.spectral.units,
                ))
            })
            .collect();

        match self.cube {
            Cube::U8(cube) => write_bands(cube, &files, save_luma::<u8>)?,
            Cube::U16(cube) => write_bands(cube, &files, save_luma::<u16>)?,
            Cube::U32(cube) => write_bands(cube, &files, save_gray32)?,
        }

        log::info!("Exported {} bands to {:?}", files.len(), directory);
        Ok(ExportReport {
            directory: directory.to_path_buf(),
            files,
        })
    }
}

fn write_bands<T, F>(cube: &Array3<T>, files: &[PathBuf], save: F) -> Result<()>
where
    T: Copy,
    F: Fn(ArrayView2<'_, T>, &Path) -> Result<()>,
{
    for (band, path) in cube.axis_iter(Axis(0)).zip(files) {
        log::debug!("Writing {:?}", path);
        save(band, path)?;
    }
    Ok(())
}

/// Band as (width, height, row-major pixels).
fn band_pixels<T: Copy>(band: ArrayView2<'_, T>) -> Result<(u32, u32, Vec<T>)> {
    let (lines, samples) = band.dim();
    let width = u32::try_from(samples)
        .map_err(|_| EnviError::invalid_value(crate::constants::keys::SAMPLES, samples))?;
    let height = u32::try_from(lines)
        .map_err(|_| EnviError::invalid_value(crate::constants::keys::LINES, lines))?;
    Ok((width, height, band.iter().copied().collect()))
}

/// 8 and 16 bit bands go through `image`.
fn save_luma<T>(band: ArrayView2<'_, T>, path: &Path) -> Result<()>
where
    T: image::Primitive,
    Luma<T>: image::Pixel<Subpixel = T> + image::PixelWithColorType,
    [T]: image::EncodableLayout,
{
    let (width, height, pixels) = band_pixels(band)?;
    let buffer: ImageBuffer<Luma<T>, Vec<T>> = ImageBuffer::from_raw(width, height, pixels)
        .ok_or_else(|| EnviError::invalid_value("band", format!("{}x{} buffer", width, height)))?;
    buffer.save_with_format(path, image::ImageFormat::Tiff)?;
    Ok(())
}

/// `image` has no 32 bit integer grayscale color type, so u32 bands are
/// encoded with `tiff` directly.
fn save_gray32(band: ArrayView2<'_, u32>, path: &Path) -> Result<()> {
    let (width, height, pixels) = band_pixels(band)?;
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    encoder.write_image::<colortype::Gray32>(width, height, &pixels)?;
    Ok(())
}
