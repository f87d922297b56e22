//! Global constants for envi-view

/// Separator between key and value on an ENVI header line.
pub const HEADER_SEPARATOR: &str = " = ";

/// Extension of the binary cube accepted on the command line.
pub const RAW_EXTENSION: &str = "raw";

/// Extension of the text header sidecar.
pub const HEADER_EXTENSION: &str = "hdr";

/// Suffix appended to the cube's stem to name the export directory.
pub const EXPORT_DIR_SUFFIX: &str = " bands";

/// Extension of exported band images.
pub const EXPORT_EXTENSION: &str = "tif";

/// Header keys consumed by the layout validator.
pub mod keys {
    pub const INTERLEAVE: &str = "interleave";
    pub const DATA_TYPE: &str = "data type";
    pub const HEADER_OFFSET: &str = "header offset";
    pub const BANDS: &str = "bands";
    pub const LINES: &str = "lines";
    pub const SAMPLES: &str = "samples";
    pub const BYTE_ORDER: &str = "byte order";
    pub const WAVELENGTH: &str = "wavelength";
    pub const WAVELENGTH_UNITS: &str = "wavelength units";
    pub const FWHM: &str = "fwhm";
}

/// Radius of the square neighbourhood averaged per band (5x5 window).
pub const NEIGHBOURHOOD_RADIUS: usize = 2;

/// Clicks closer than this to any image edge are ignored by the viewer.
pub const CLICK_EDGE_MARGIN: f64 = 4.0;

/// Default wavelengths (nm) picked for the red, green and blue preview channels.
pub const DEFAULT_RGB_WAVELENGTHS: [f64; 3] = [660.0, 550.0, 460.0];

/// Default viewer window size in logical pixels.
pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [1500.0, 800.0];
