//! Preview image generation for the viewer.
//!
//! When the header gives wavelengths in nanometres and three distinct bands
//! lie closest to red, green and blue, the preview is a (very approximate)
//! true-colour composite. Otherwise band 0 is shown in grayscale.

use image::{Rgb, RgbImage};
use ndarray::Array2;

use crate::data::{Cube, SpectralMetadata};

/// Band selection for an RGB composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSelection {
    /// Band index for red channel (0-based)
    pub red: usize,
    /// Band index for green channel (0-based)
    pub green: usize,
    /// Band index for blue channel (0-based)
    pub blue: usize,
}

impl BandSelection {
    pub fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }

    /// Whether all three channels use different bands.
    pub fn is_distinct(&self) -> bool {
        self.red != self.green && self.green != self.blue && self.red != self.blue
    }

    /// Pick the bands nearest to the given red, green and blue wavelengths.
    ///
    /// Returns `None` unless the units are nanometres and the three picks are
    /// distinct bands.
    pub fn nearest(spectral: &SpectralMetadata, targets: [f64; 3]) -> Option<Self> {
        if !spectral.is_nanometers() {
            log::debug!("Wavelength units {:?} are not nm, using grayscale", spectral.units);
            return None;
        }
        let selection = Self::new(
            spectral.nearest_band(targets[0])?,
            spectral.nearest_band(targets[1])?,
            spectral.nearest_band(targets[2])?,
        );
        if selection.is_distinct() {
            Some(selection)
        } else {
            log::info!(
                "Bands nearest to RGB collide ({:?}), using grayscale",
                selection
            );
            None
        }
    }
}

/// How the preview was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// False-colour composite of three bands
    Rgb(BandSelection),
    /// Single band shown in grayscale
    Gray { band: usize },
}

/// Display-only 8-bit rendering of the cube.
#[derive(Debug, Clone)]
pub struct Preview {
    pub mode: PreviewMode,
    pub image: RgbImage,
}

impl Preview {
    /// Build the preview for a cube.
    pub fn build(cube: &Cube, spectral: &SpectralMetadata, rgb_targets: [f64; 3]) -> Self {
        match BandSelection::nearest(spectral, rgb_targets) {
            Some(selection) => Self::rgb(cube, selection),
            None => Self::gray(cube, 0),
        }
    }

    /// Composite of three bands, scaled by the largest value of the three.
    pub fn rgb(cube: &Cube, selection: BandSelection) -> Self {
        let channels = [selection.red, selection.green, selection.blue]
            .map(|band| cube.band_f64(band).unwrap_or_else(|| empty_band(cube)));
        let max = channels
            .iter()
            .flat_map(|c| c.iter().copied())
            .fold(0.0, f64::max);

        let image = RgbImage::from_fn(width(cube), height(cube), |x, y| {
            let index = [y as usize, x as usize];
            Rgb(channels.each_ref().map(|c| to_u8(c[index], 0.0, max)))
        });

        Self {
            mode: PreviewMode::Rgb(selection),
            image,
        }
    }

    /// One band stretched between its minimum and maximum.
    pub fn gray(cube: &Cube, band: usize) -> Self {
        let data = cube.band_f64(band).unwrap_or_else(|| empty_band(cube));
        let (min, max) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let image = RgbImage::from_fn(width(cube), height(cube), |x, y| {
            let v = to_u8(data[[y as usize, x as usize]], min, max);
            Rgb([v, v, v])
        });

        Self {
            mode: PreviewMode::Gray { band },
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

fn width(cube: &Cube) -> u32 {
    u32::try_from(cube.samples()).unwrap_or(u32::MAX)
}

fn height(cube: &Cube) -> u32 {
    u32::try_from(cube.lines()).unwrap_or(u32::MAX)
}

fn empty_band(cube: &Cube) -> Array2<f64> {
    Array2::zeros((cube.lines(), cube.samples()))
}

fn to_u8(value: f64, min: f64, max: f64) -> u8 {
    if max <= min {
        return 0;
    }
    (((value - min) / (max - min)).clamp(0.0, 1.0) * 255.0).round() as u8
}
