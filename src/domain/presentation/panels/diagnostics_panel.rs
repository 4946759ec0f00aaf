use bevy::diagnostic::{
    DiagnosticsStore, EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin,
};
use bevy_egui::egui;

use crate::domain::navigation::Navigation;
use crate::domain::presentation::TourSettings;

pub fn show_diagnostics_panel(
    ctx: &mut egui::Context,
    settings: &TourSettings,
    diagnostics: &DiagnosticsStore,
    nav: &Navigation,
) {
    if !settings.show_diagnostics {
        return;
    }
    egui::Window::new("Diagnostics").show(ctx, |ui| {
        ui.label(format!("View: {}", nav.active.title()));
        if let Some(previous) = nav.previous {
            ui.label(format!("Came from: {}", previous.title()));
        }
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                ui.label(format!("FPS: {:.1}", value));
            }
        }
        if let Some(entities) = diagnostics.get(&EntityCountDiagnosticsPlugin::ENTITY_COUNT) {
            if let Some(value) = entities.value() {
                ui.label(format!("Entities: {}", value));
            }
        }
    });
}
