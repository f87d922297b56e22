//! Selection and radiance state of the spectral viewer.
//!
//! This is the toolkit-independent half of the viewer: the rendering layer
//! forwards clicks (in image coordinates) to [`ViewerState::handle_click`] and
//! redraws the bars it returns.

use crate::constants::{CLICK_EDGE_MARGIN, NEIGHBOURHOOD_RADIUS};
use crate::data::{Cube, SpectralMetadata};
use crate::error::{EnviError, Result};

/// One bar of the radiance chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Centre of the bar on the wavelength axis
    pub wavelength: f64,
    /// Relative radiance, 0.0 to 1.0
    pub height: f64,
    /// Bar width on the wavelength axis (FWHM)
    pub width: f64,
}

/// Current pixel selection and the radiance spectrum under it.
#[derive(Debug, Clone)]
pub struct ViewerState {
    cube: Cube,
    spectral: SpectralMetadata,
    bar_widths: Vec<f64>,
    /// (x, y) = (sample, line)
    selection: (usize, usize),
    heights: Vec<f64>,
}

impl ViewerState {
    /// Start with the selection at the image centre.
    pub fn new(cube: Cube, spectral: SpectralMetadata) -> Result<Self> {
        if spectral.num_bands() < cube.bands() {
            return Err(EnviError::metadata_mismatch(
                crate::constants::keys::WAVELENGTH,
                format!("{} entries for {} bands", spectral.num_bands(), cube.bands()),
            ));
        }

        let selection = (cube.samples() / 2, cube.lines() / 2);
        let bar_widths = spectral.bar_widths();
        let mut state = Self {
            cube,
            spectral,
            bar_widths,
            selection,
            heights: Vec::new(),
        };
        state.heights = state.radiance_at(selection.0, selection.1);
        Ok(state)
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn spectral(&self) -> &SpectralMetadata {
        &self.spectral
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.cube.samples()
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.cube.lines()
    }

    /// Selected pixel as (x, y).
    pub fn selection(&self) -> (usize, usize) {
        self.selection
    }

    /// Current normalised bar heights, one per band.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Relative radiance around pixel (x, y).
    ///
    /// Each band is averaged over the 5x5 window centred on the pixel, then
    /// the spectrum is divided by its maximum. A spectrum without any
    /// positive value is returned as is.
    pub fn radiance_at(&self, x: usize, y: usize) -> Vec<f64> {
        let r = NEIGHBOURHOOD_RADIUS;
        let mut means = self.cube.window_means(
            y.saturating_sub(r)..y + r + 1,
            x.saturating_sub(r)..x + r + 1,
        );

        let max = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max > 0.0 {
            means.iter_mut().for_each(|m| *m /= max);
        }
        means
    }

    /// Move the selection to a clicked image position.
    ///
    /// Clicks within 4 pixels of an edge are ignored and return `None`.
    /// Otherwise the selection moves to the truncated coordinates and the new
    /// bar heights are returned.
    pub fn handle_click(&mut self, x: f64, y: f64) -> Option<Vec<f64>> {
        if !self.accepts_click(x, y) {
            log::debug!("Ignoring click at ({:.1}, {:.1}) near the image edge", x, y);
            return None;
        }

        self.selection = (x as usize, y as usize);
        self.heights = self.radiance_at(self.selection.0, self.selection.1);
        log::debug!("Selected pixel {:?}", self.selection);
        Some(self.heights.clone())
    }

    /// Whether a click lands far enough from every edge for a full window.
    pub fn accepts_click(&self, x: f64, y: f64) -> bool {
        let width = self.width() as f64;
        let height = self.height() as f64;
        !(x.is_nan()
            || y.is_nan()
            || x < CLICK_EDGE_MARGIN
            || y < CLICK_EDGE_MARGIN
            || x > width - CLICK_EDGE_MARGIN
            || y > height - CLICK_EDGE_MARGIN)
    }

    /// Bars of the radiance chart in band order.
    pub fn bars(&self) -> Vec<Bar> {
        self.spectral
            .wavelengths
            .iter()
            .zip(&self.heights)
            .zip(&self.bar_widths)
            .map(|((&wavelength, &height), &width)| Bar {
                wavelength,
                height,
                width,
            })
            .collect()
    }

    /// Wavelength range covered by the bars, including their widths.
    pub fn wavelength_range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for (wavelength, width) in self.spectral.wavelengths.iter().zip(&self.bar_widths) {
            lo = lo.min(wavelength - width / 2.0);
            hi = hi.max(wavelength + width / 2.0);
        }
        if lo.is_finite() && hi > lo {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    }
}
