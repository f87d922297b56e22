//! Interactive spectral viewer.
//!
//! The preview image and the radiance chart are computed by [`ViewerState`]
//! and [`Preview`], which do not depend on any GUI toolkit. The eframe window
//! in `app` only draws them and forwards clicks.

#[cfg(feature = "viewer")]
mod app;
mod preview;
mod state;

pub use preview::{BandSelection, Preview, PreviewMode};
pub use state::{Bar, ViewerState};

use crate::config::ViewerConfig;
use crate::data::{Cube, SpectralMetadata};
use crate::error::Result;

/// Open the viewer window and block until it is closed.
#[cfg(feature = "viewer")]
pub fn run_viewer(cube: Cube, spectral: SpectralMetadata, config: &ViewerConfig) -> Result<()> {
    use crate::error::EnviError;

    let preview = Preview::build(&cube, &spectral, config.rgb_wavelengths);
    log::info!("Preview mode: {:?}", preview.mode);
    let state = ViewerState::new(cube, spectral)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title("ENVI spectral viewer"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "envi-view",
        options,
        Box::new(move |_cc| Ok(Box::new(app::SpectralViewerApp::new(state, preview)))),
    )
    .map_err(|e| EnviError::Viewer(e.to_string()))
}

/// Built without the `viewer` feature: report instead of opening a window.
#[cfg(not(feature = "viewer"))]
pub fn run_viewer(cube: Cube, spectral: SpectralMetadata, _config: &ViewerConfig) -> Result<()> {
    // Still validates the metadata so the error matches a GUI build
    ViewerState::new(cube, spectral)?;
    Err(crate::error::EnviError::Viewer(
        "this build does not include the interactive viewer".to_string(),
    ))
}
