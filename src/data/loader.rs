//! Loading of an ENVI image from its `.raw` path.
//!
//! The loader locates the `.hdr` sidecar, parses it, validates the layout and
//! decodes the cube:
//!
//! ```rust,ignore
//! use envi_view::data::EnviLoader;
//!
//! let image = EnviLoader::new().open("scene.raw".as_ref())?;
//! println!("{:?}", image.cube().shape());
//! ```

use std::path::{Path, PathBuf};

use crate::constants::HEADER_EXTENSION;
use crate::data::cube::Cube;
use crate::data::header::HeaderMapping;
use crate::data::layout::LayoutDescriptor;
use crate::data::spectral::SpectralMetadata;
use crate::error::{EnviError, Result};

/// Path of the header sidecar belonging to a `.raw` file.
pub fn header_path_for(raw_path: &Path) -> PathBuf {
    raw_path.with_extension(HEADER_EXTENSION)
}

/// A decoded ENVI image: the parsed header and its cube.
#[derive(Debug, Clone)]
pub struct EnviImage {
    path: PathBuf,
    header: HeaderMapping,
    layout: LayoutDescriptor,
    cube: Cube,
}

impl EnviImage {
    /// Path of the `.raw` file the image was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &HeaderMapping {
        &self.header
    }

    pub fn layout(&self) -> &LayoutDescriptor {
        &self.layout
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    /// Hand the header and cube over to a consumer.
    pub fn into_parts(self) -> (HeaderMapping, Cube) {
        (self.header, self.cube)
    }

    /// Wavelength metadata checked against the cube's band count.
    pub fn spectral(&self) -> Result<SpectralMetadata> {
        SpectralMetadata::from_header(&self.header, self.cube.bands())
    }
}

/// Loader for ENVI band-sequential images.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnviLoader;

impl EnviLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load the image stored at `raw_path` and its sidecar header.
    pub fn open(&self, raw_path: &Path) -> Result<EnviImage> {
        let header_path = header_path_for(raw_path);
        if !header_path.is_file() {
            return Err(EnviError::MissingHeaderSidecar { path: header_path });
        }

        log::info!("Reading header {:?}", header_path);
        let text = std::fs::read_to_string(&header_path)?;
        self.load(raw_path, &text)
    }

    /// Decode `raw_path` using already-read header text.
    pub fn load(&self, raw_path: &Path, header_text: &str) -> Result<EnviImage> {
        let header = HeaderMapping::parse(header_text);
        let layout = LayoutDescriptor::from_header(&header)?;

        log::info!("Reading image {:?}", raw_path);
        let cube = Cube::read(raw_path, &layout)?;

        Ok(EnviImage {
            path: raw_path.to_path_buf(),
            header,
            layout,
            cube,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ENVI\nsamples = 2\nlines = 2\nbands = 2\nheader offset = 0\n\
                          data type = 1\ninterleave = bsq\nwavelength = {450.0, 900.0}\n\
                          wavelength units = nm\n";

    #[test]
    fn test_header_path_replaces_extension() {
        assert_eq!(
            header_path_for(Path::new("/data/scene one.raw")),
            PathBuf::from("/data/scene one.hdr")
        );
    }

    #[test]
    fn test_missing_sidecar_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let raw = dir.path().join("scene.raw");
        std::fs::write(&raw, [0u8; 8]).expect("write raw");

        let err = EnviLoader::new().open(&raw).unwrap_err();
        assert!(
            matches!(err, EnviError::MissingHeaderSidecar { ref path } if *path == dir.path().join("scene.hdr"))
        );
    }

    #[test]
    fn test_open_decodes_cube_and_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        let raw = dir.path().join("scene.raw");
        std::fs::write(&raw, [1u8, 2, 3, 4, 5, 6, 7, 8]).expect("write raw");
        std::fs::write(dir.path().join("scene.hdr"), HEADER).expect("write hdr");

        let image = EnviLoader::new().open(&raw).expect("image loads");
        assert_eq!(image.cube().shape(), (2, 2, 2));
        assert_eq!(image.cube().value(1, 1, 1), Some(8.0));
        assert_eq!(image.path(), raw.as_path());

        let spectral = image.spectral().expect("metadata covers both bands");
        assert_eq!(spectral.wavelengths, vec![450.0, 900.0]);
    }

    #[test]
    fn test_unreadable_raw_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let raw = dir.path().join("absent.raw");
        let err = EnviLoader::new().load(&raw, HEADER).unwrap_err();
        assert!(matches!(err, EnviError::Io(_)));
    }

    #[test]
    fn test_layout_rejected_before_reading() {
        // The raw file does not exist: a layout error proves decoding was never attempted
        let raw = Path::new("never-read.raw");
        let err = EnviLoader::new()
            .load(raw, &HEADER.replace("bsq", "bil"))
            .unwrap_err();
        assert!(matches!(err, EnviError::UnsupportedInterleave { .. }));
    }
}
