//! Error types for loading, exporting and viewing ENVI cubes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while handling an ENVI image.
///
/// Every variant is a terminal condition for the current run. The caller
/// decides how to present it (console prompt, dialog, log).
#[derive(Error, Debug)]
pub enum EnviError {
    /// No file was given on the command line
    #[error("No input detected. Please drag a .raw file onto the program.")]
    MissingInput,

    /// The command line could not be parsed, or help/version was requested
    #[error("{0}")]
    Arguments(#[from] clap::Error),

    /// More than one file was given on the command line
    #[error("Too many files ({count}). Please drag one at a time onto the program.")]
    TooManyInputs {
        /// Number of arguments received
        count: usize,
    },

    /// The input does not end in `.raw`
    #[error("Input not recognised: {path:?}. Please drag a .raw file onto the program.")]
    WrongExtension {
        /// The rejected path
        path: PathBuf,
    },

    /// The `.hdr` sidecar next to the cube does not exist
    #[error(
        "No header file detected at {path:?}.\nPlease ensure the .raw file has an accompanying \
         .hdr file in the same folder with the same filename, except the extension."
    )]
    MissingHeaderSidecar {
        /// Where the header was expected
        path: PathBuf,
    },

    /// A key required to interpret the cube is absent from the header
    #[error("The header has no '{key}' entry.")]
    MissingHeaderKey {
        /// Name of the missing key
        key: String,
    },

    /// A header value has the wrong type or an impossible value
    #[error("The header value for '{key}' is invalid: {value}")]
    InvalidHeaderValue {
        /// Name of the offending key
        key: String,
        /// The value as written in the header
        value: String,
    },

    /// The cube is not stored band-sequentially
    #[error(
        "This image is stored in an unsupported interleaved format ({found}).\n\
         Only \"BSQ\" band sequential images are currently supported."
    )]
    UnsupportedInterleave {
        /// The interleave value found in the header
        found: String,
    },

    /// The element type is not an unsigned 8, 16 or 32 bit integer
    #[error(
        "This image is stored in an unsupported colour depth (data type {found}).\n\
         Only 8, 16 or 32 BPC images are currently supported."
    )]
    UnsupportedDepth {
        /// The data type value found in the header
        found: String,
    },

    /// The payload size disagrees with the dimensions declared in the header
    #[error(
        "The information in the .hdr file does not match the image.\n\
         Expected {expected_elements} elements of {element_size} byte(s), \
         found {available_bytes} bytes after the header offset."
    )]
    DimensionMismatch {
        /// bands x lines x samples (saturating)
        expected_elements: u128,
        /// Size of one element in bytes
        element_size: usize,
        /// Bytes available after skipping the header offset
        available_bytes: usize,
    },

    /// Spectral metadata does not cover every band
    #[error("The '{key}' entry does not describe every band: {message}")]
    SpectralMetadataMismatch {
        /// The header key at fault
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// The menu answer was neither of the offered options
    #[error("Unexpected input {input:?}, please try again.")]
    InvalidMenuChoice {
        /// What the user typed
        input: String,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error during band export
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// TIFF encoding error during band export
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The interactive viewer could not be started
    #[error("Viewer error: {0}")]
    Viewer(String),
}

impl EnviError {
    /// Create a missing header key error.
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingHeaderKey { key: key.into() }
    }

    /// Create an invalid header value error.
    pub fn invalid_value(key: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidHeaderValue {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Create a spectral metadata mismatch error.
    pub fn metadata_mismatch(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpectralMetadataMismatch {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error stems from user input or the data itself, as
    /// opposed to an I/O or encoder failure.
    pub fn is_user_input(&self) -> bool {
        !matches!(
            self,
            Self::Io(_) | Self::Image(_) | Self::Tiff(_) | Self::Viewer(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnviError>;
