mod domain;

use bevy::diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::pbr::DirectionalLightShadowMap;
use bevy::prelude::*;

use domain::{InputPlugin, MarkersPlugin, NavigationPlugin, TourPhase, UiPlugin, WorldsPlugin};

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .insert_resource(Msaa::Sample4)
        .insert_resource(DirectionalLightShadowMap { size: 4096 })
        .init_state::<TourPhase>()
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(EntityCountDiagnosticsPlugin)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "vtour-rs — MKE 3D city tour".into(),
                resolution: (1400., 900.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((WorldsPlugin, NavigationPlugin, MarkersPlugin, InputPlugin, UiPlugin))
        .run();
}
