//! envi-view - ENVI hyperspectral cube decoder and spectral viewer
//!
//! Reads a band-sequential ENVI image (a `.raw` cube with its `.hdr` text
//! header), then exports every band as a TIFF file or opens a viewer that
//! plots the radiance spectrum of a clicked pixel.

pub mod cli;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod export;
pub mod viewer;

pub use data::{Cube, EnviImage, EnviLoader, HeaderMapping, HeaderValue, LayoutDescriptor};
pub use error::{EnviError, Result};
