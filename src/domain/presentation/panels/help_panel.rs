use bevy_egui::egui;

use crate::domain::presentation::TourSettings;

pub fn show_help_panel(ctx: &mut egui::Context, settings: &TourSettings) {
    if settings.show_help {
        egui::Window::new("Help").show(ctx, |ui| {
            ui.label("Left Mouse: Orbit (drag)");
            ui.label("Mouse Wheel: Zoom");
            ui.label("Click a marker: Visit the site");
            ui.label("Esc / Back: Previous view");
            ui.label("R: Reset the view");
            ui.label("H: Toggle Help");
            ui.label("F3: Toggle Diagnostics");
        });
    }
}
