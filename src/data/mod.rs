//! Data structures and loaders for ENVI hyperspectral images.
//!
//! This module provides:
//! - `HeaderMapping`: the typed key/value contents of a `.hdr` file
//! - `LayoutDescriptor`: the validated binary layout of the cube
//! - `Cube`: the decoded band/line/sample array
//! - `EnviLoader`: locating, parsing, validating and decoding in one step
//! - `SpectralMetadata`: per-band wavelength information
//!
//! The pipeline runs header parsing, then layout validation, then decoding.
//! Layout problems are reported before any byte of the cube is read.

mod cube;
mod header;
mod layout;
mod loader;
mod spectral;

pub use cube::{Cube, Element};
pub use header::{HeaderMapping, HeaderValue, parse_line, parse_value};
pub use layout::{ElementType, Interleave, LayoutDescriptor};
pub use loader::{EnviImage, EnviLoader, header_path_for};
pub use spectral::SpectralMetadata;
