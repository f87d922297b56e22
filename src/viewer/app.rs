//! eframe window showing the preview image and the radiance bar chart.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2, pos2};

use crate::viewer::preview::Preview;
use crate::viewer::state::ViewerState;

const MARKER_RADIUS: f32 = 6.0;
const MARKER_COLOR: Color32 = Color32::from_rgba_premultiplied(204, 204, 0, 204);
const BAR_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const AXIS_COLOR: Color32 = Color32::from_gray(160);
const CHART_MARGIN: f32 = 48.0;

/// The viewer window. Owns the cube through its [`ViewerState`].
pub struct SpectralViewerApp {
    state: ViewerState,
    preview: Preview,
    texture: Option<TextureHandle>,
    /// Fixed at start-up; clicks only change bar heights
    x_range: (f64, f64),
}

impl SpectralViewerApp {
    pub fn new(state: ViewerState, preview: Preview) -> Self {
        let x_range = state.wavelength_range();
        Self {
            state,
            preview,
            texture: None,
            x_range,
        }
    }

    fn texture(&mut self, ctx: &egui::Context) -> &TextureHandle {
        self.texture.get_or_insert_with(|| {
            let size = [self.preview.width() as usize, self.preview.height() as usize];
            let image = egui::ColorImage::from_rgb(size, self.preview.image.as_raw());
            ctx.load_texture("envi-preview", image, egui::TextureOptions::NEAREST)
        })
    }

    fn image_panel(&mut self, ui: &mut egui::Ui) {
        let image_size = Vec2::new(self.state.width() as f32, self.state.height() as f32);
        let Some(scale) = fit_scale(image_size, ui.available_size()) else {
            return;
        };

        let texture_id = self.texture(ui.ctx()).id();
        let (rect, response) = ui.allocate_exact_size(image_size * scale, Sense::click());

        let painter = ui.painter_at(rect);
        painter.image(
            texture_id,
            rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let x = f64::from((pointer.x - rect.min.x) / scale);
                let y = f64::from((pointer.y - rect.min.y) / scale);
                self.state.handle_click(x, y);
            }
        }

        let (sel_x, sel_y) = self.state.selection();
        let marker = pos2(
            rect.min.x + (sel_x as f32 + 0.5) * scale,
            rect.min.y + (sel_y as f32 + 0.5) * scale,
        );
        painter.circle_filled(marker, MARKER_RADIUS, MARKER_COLOR);
    }

    fn chart_panel(&self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();

        let plot = Rect::from_min_max(
            pos2(rect.min.x + CHART_MARGIN, rect.min.y + CHART_MARGIN),
            pos2(rect.max.x - CHART_MARGIN / 2.0, rect.max.y - CHART_MARGIN),
        );
        if plot.width() <= 0.0 || plot.height() <= 0.0 {
            return;
        }

        let (x_lo, x_hi) = self.x_range;
        let to_screen = |wavelength: f64, height: f64| -> Pos2 {
            let fx = ((wavelength - x_lo) / (x_hi - x_lo)) as f32;
            pos2(
                plot.min.x + fx * plot.width(),
                plot.max.y - height.clamp(0.0, 1.0) as f32 * plot.height(),
            )
        };

        for bar in self.state.bars() {
            let top_left = to_screen(bar.wavelength - bar.width / 2.0, bar.height);
            let bottom_right = to_screen(bar.wavelength + bar.width / 2.0, 0.0);
            painter.rect_filled(Rect::from_two_pos(top_left, bottom_right), 0.0, BAR_COLOR);
        }

        let axis = Stroke::new(1.0, AXIS_COLOR);
        painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis);
        painter.line_segment([plot.left_bottom(), plot.left_top()], axis);

        let small = FontId::proportional(12.0);
        for tick in [0.0, 0.5, 1.0] {
            let p = to_screen(x_lo, tick);
            painter.line_segment([p, p - Vec2::new(4.0, 0.0)], axis);
            painter.text(
                p - Vec2::new(6.0, 0.0),
                Align2::RIGHT_CENTER,
                format!("{:.1}", tick),
                small.clone(),
                text_color,
            );
        }
        for wavelength in [x_lo, (x_lo + x_hi) / 2.0, x_hi] {
            let p = to_screen(wavelength, 0.0);
            painter.line_segment([p, p + Vec2::new(0.0, 4.0)], axis);
            painter.text(
                p + Vec2::new(0.0, 6.0),
                Align2::CENTER_TOP,
                format!("{:.0}", wavelength),
                small.clone(),
                text_color,
            );
        }

        let label = FontId::proportional(14.0);
        painter.text(
            pos2(plot.center().x, rect.min.y + CHART_MARGIN / 2.0),
            Align2::CENTER_CENTER,
            "Relative spectral radiance",
            FontId::proportional(16.0),
            text_color,
        );
        painter.text(
            pos2(plot.center().x, rect.max.y - CHART_MARGIN / 3.0),
            Align2::CENTER_CENTER,
            format!("Wavelength ({})", self.state.spectral().units),
            label.clone(),
            text_color,
        );
        painter.text(
            pos2(plot.min.x, plot.min.y - 6.0),
            Align2::LEFT_BOTTOM,
            "Relative radiance",
            label,
            text_color,
        );
    }
}

/// Largest scale at which `image` fits into `available`; None for an empty
/// image or no room.
fn fit_scale(image: Vec2, available: Vec2) -> Option<f32> {
    if image.x <= 0.0 || image.y <= 0.0 {
        return None;
    }
    let scale = (available.x / image.x).min(available.y / image.y);
    (scale.is_finite() && scale > 0.0).then_some(scale)
}

impl eframe::App for SpectralViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let (x, y) = self.state.selection();
            ui.label(format!(
                "Pixel ({}, {}) of {} x {}. Click the image to select another pixel.",
                x,
                y,
                self.state.width(),
                self.state.height()
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.image_panel(&mut columns[0]);
                self.chart_panel(&mut columns[1]);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_scale_keeps_aspect() {
        let scale = fit_scale(Vec2::new(200.0, 100.0), Vec2::new(400.0, 400.0));
        assert_eq!(scale, Some(2.0));
        let scale = fit_scale(Vec2::new(100.0, 400.0), Vec2::new(400.0, 200.0));
        assert_eq!(scale, Some(0.5));
    }

    #[test]
    fn test_fit_scale_empty_image() {
        assert_eq!(fit_scale(Vec2::new(5.0, 0.0), Vec2::new(400.0, 400.0)), None);
        assert_eq!(fit_scale(Vec2::new(0.0, 0.0), Vec2::new(400.0, 400.0)), None);
        assert_eq!(fit_scale(Vec2::new(5.0, 5.0), Vec2::new(0.0, 400.0)), None);
    }
}
