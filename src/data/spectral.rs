//! Per-band spectral metadata (`wavelength`, `wavelength units`, `fwhm`).

use crate::constants::keys;
use crate::data::header::HeaderMapping;
use crate::error::{EnviError, Result};

/// Wavelength metadata checked to cover every band of a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralMetadata {
    /// Centre wavelength of each band, one entry per band
    pub wavelengths: Vec<f64>,
    /// Unit string as written in the header (e.g. "nm", "Nanometers")
    pub units: String,
    /// Full width at half maximum of each band, if the header has it
    pub fwhm: Option<Vec<f64>>,
}

impl SpectralMetadata {
    /// Read spectral metadata for a cube with `bands` bands.
    ///
    /// Lists longer than `bands` are truncated; shorter ones are an error.
    pub fn from_header(header: &HeaderMapping, bands: usize) -> Result<Self> {
        let wavelengths = per_band_list(header, keys::WAVELENGTH, bands)?
            .ok_or_else(|| EnviError::metadata_mismatch(keys::WAVELENGTH, "entry is missing"))?;

        let units = match header.get(keys::WAVELENGTH_UNITS) {
            Some(value) => value.to_string().trim().to_string(),
            None => {
                log::warn!("Header has no '{}' entry", keys::WAVELENGTH_UNITS);
                String::new()
            }
        };

        let fwhm = per_band_list(header, keys::FWHM, bands)?;
        if fwhm.is_none() {
            log::debug!("Header has no '{}' entry, bar widths from band spacing", keys::FWHM);
        }

        Ok(Self {
            wavelengths,
            units,
            fwhm,
        })
    }

    pub fn num_bands(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether the wavelengths are expressed in nanometres.
    pub fn is_nanometers(&self) -> bool {
        matches!(
            self.units.to_ascii_lowercase().as_str(),
            "nm" | "nanometer" | "nanometers"
        )
    }

    /// Index of the band whose wavelength is closest to `target`.
    ///
    /// The lowest index wins ties.
    pub fn nearest_band(&self, target: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &wavelength) in self.wavelengths.iter().enumerate() {
            let distance = (wavelength - target).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Width of each bar in the radiance chart.
    ///
    /// Uses the FWHM when present, otherwise the smallest positive spacing
    /// between wavelengths (1.0 when there is none).
    pub fn bar_widths(&self) -> Vec<f64> {
        if let Some(fwhm) = &self.fwhm {
            return fwhm.clone();
        }

        let mut sorted = self.wavelengths.clone();
        sorted.sort_by(f64::total_cmp);
        let spacing = sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);
        let width = if spacing.is_finite() { spacing } else { 1.0 };
        vec![width; self.wavelengths.len()]
    }
}

/// Read a numeric list with at least `bands` entries, truncated to `bands`.
///
/// Returns `Ok(None)` if the key is absent.
fn per_band_list(header: &HeaderMapping, key: &str, bands: usize) -> Result<Option<Vec<f64>>> {
    let Some(value) = header.get(key) else {
        return Ok(None);
    };
    let mut list = value
        .as_number_list()
        .ok_or_else(|| EnviError::metadata_mismatch(key, format!("not a list of numbers: {}", value)))?;

    if list.len() < bands {
        return Err(EnviError::metadata_mismatch(
            key,
            format!("{} entries for {} bands", list.len(), bands),
        ));
    }
    if list.len() > bands {
        log::warn!(
            "'{}' has {} entries for {} bands, ignoring the rest",
            key,
            list.len(),
            bands
        );
        list.truncate(bands);
    }
    Ok(Some(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(text: &str, bands: usize) -> Result<SpectralMetadata> {
        SpectralMetadata::from_header(&HeaderMapping::parse(text), bands)
    }

    #[test]
    fn test_reads_all_fields() {
        let meta = metadata(
            "wavelength = {450.0, 900.0}\nwavelength units = nm\nfwhm = {5, 6.5}\n",
            2,
        )
        .expect("complete metadata");
        assert_eq!(meta.wavelengths, vec![450.0, 900.0]);
        assert_eq!(meta.units, "nm");
        assert_eq!(meta.fwhm, Some(vec![5.0, 6.5]));
        assert!(meta.is_nanometers());
    }

    #[test]
    fn test_short_wavelength_list_rejected() {
        let err = metadata("wavelength = {450.0}\nwavelength units = nm\n", 2).unwrap_err();
        assert!(
            matches!(err, EnviError::SpectralMetadataMismatch { ref key, .. } if key == "wavelength")
        );
    }

    #[test]
    fn test_missing_wavelength_rejected() {
        let err = metadata("wavelength units = nm\n", 1).unwrap_err();
        assert!(matches!(err, EnviError::SpectralMetadataMismatch { .. }));
    }

    #[test]
    fn test_short_fwhm_rejected() {
        let err = metadata("wavelength = {1, 2, 3}\nfwhm = {1, 1}\n", 3).unwrap_err();
        assert!(matches!(err, EnviError::SpectralMetadataMismatch { ref key, .. } if key == "fwhm"));
    }

    #[test]
    fn test_non_numeric_list_rejected() {
        let err = metadata("wavelength = {'a', 'b'}\n", 2).unwrap_err();
        assert!(matches!(err, EnviError::SpectralMetadataMismatch { .. }));
    }

    #[test]
    fn test_long_lists_truncated() {
        let meta = metadata("wavelength = {1, 2, 3}\nwavelength units = nm\n", 2).expect("long list");
        assert_eq!(meta.wavelengths, vec![1.0, 2.0]);
        assert_eq!(meta.num_bands(), 2);
    }

    #[test]
    fn test_missing_units_is_empty() {
        let meta = metadata("wavelength = {1}\n", 1).expect("units optional");
        assert_eq!(meta.units, "");
        assert!(!meta.is_nanometers());
    }

    #[test]
    fn test_units_recognised() {
        for (units, nm) in [("nm", true), ("Nanometers", true), ("Micrometers", false), ("um", false)] {
            let meta = metadata(&format!("wavelength = {{1}}\nwavelength units = {}\n", units), 1)
                .expect("metadata");
            assert_eq!(meta.is_nanometers(), nm, "units {}", units);
        }
    }

    #[test]
    fn test_nearest_band_first_index_wins() {
        let meta = metadata("wavelength = {470, 470, 470}\nwavelength units = nm\n", 3).expect("metadata");
        assert_eq!(meta.nearest_band(660.0), Some(0));
        assert_eq!(meta.nearest_band(460.0), Some(0));

        let meta = metadata("wavelength = {400, 500, 600, 700}\n", 4).expect("metadata");
        assert_eq!(meta.nearest_band(660.0), Some(3));
        // Ties go to the lower index
        assert_eq!(meta.nearest_band(550.0), Some(1));
        assert_eq!(meta.nearest_band(650.0), Some(2));
        assert_eq!(meta.nearest_band(10_000.0), Some(3));
    }

    #[test]
    fn test_bar_widths_fall_back_to_spacing() {
        let meta = metadata("wavelength = {400, 410, 430}\n", 3).expect("metadata");
        assert_eq!(meta.bar_widths(), vec![10.0, 10.0, 10.0]);

        let meta = metadata("wavelength = {400}\n", 1).expect("metadata");
        assert_eq!(meta.bar_widths(), vec![1.0]);

        let meta = metadata("wavelength = {400, 410}\nfwhm = {3, 4}\n", 2).expect("metadata");
        assert_eq!(meta.bar_widths(), vec![3.0, 4.0]);
    }
}
