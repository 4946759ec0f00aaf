//! HUD and panels: the full-screen fade overlay node, the back button, the
//! per-site marker anchors, and the egui panel layer. Everything here reads
//! navigation state and mirrors it into UI; the anchors are dumb handles the
//! projector drags around the screen.

pub mod panels;

use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use bevy::ui::TargetCamera;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, EguiPlugin};

use crate::domain::markers::{self, PointOfInterest, ViewportSize};
use crate::domain::navigation::{Navigation, Overlay, SceneChangeRequest, ShowBackButton};
use crate::domain::worlds::scenery::{StreetSpotlight, SPOT_INTENSITY};
use crate::domain::worlds::{self, ExploreViewSelected, WorldId, Worlds};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<TourSettings>()
            .add_systems(Startup, setup_hud.after(worlds::setup_worlds))
            .add_systems(
                Update,
                (mirror_viewport_size, sync_overlay, sync_marker_anchors, sync_back_button)
                    .after(markers::project_points),
            )
            .add_systems(
                Update,
                (marker_clicks, marker_hover, back_button_clicks, draw_panels),
            );
    }
}

/// Runtime toggles for the panel layer.
#[derive(Resource)]
pub struct TourSettings {
    pub show_help: bool,
    pub show_diagnostics: bool,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            show_help: true,
            show_diagnostics: false,
        }
    }
}

const ANCHOR_SIZE: f32 = 26.0;

/// 2D anchor for one point of interest; `point` is the entity whose derived
/// visibility and offset this node mirrors.
#[derive(Component)]
pub struct MarkerAnchor {
    pub point: Entity,
}

#[derive(Component)]
pub struct BackButtonNode;

#[derive(Component)]
pub struct OverlayNode;

/// Top-left corner for an anchor whose centre should sit at screen-centre
/// plus the projected offset.
fn anchor_corner(viewport: Vec2, offset: Vec2) -> Vec2 {
    Vec2::new(
        viewport.x * 0.5 + offset.x - ANCHOR_SIZE * 0.5,
        viewport.y * 0.5 + offset.y - ANCHOR_SIZE * 0.5,
    )
}

fn setup_hud(
    mut commands: Commands,
    worlds: Res<Worlds>,
    overlay: Res<Overlay>,
    points: Query<&PointOfInterest>,
) {
    let map_camera = worlds.get(WorldId::Map).camera;

    // Fade overlay, owned by one world's camera at a time.
    commands.spawn((
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            background_color: Color::BLACK.into(),
            z_index: ZIndex::Global(50),
            ..default()
        },
        OverlayNode,
        TargetCamera(worlds.get(overlay.owner).camera),
    ));

    commands
        .spawn((
            ButtonBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Px(16.0),
                    top: Val::Px(16.0),
                    padding: UiRect::axes(Val::Px(14.0), Val::Px(8.0)),
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.55).into(),
                visibility: Visibility::Hidden,
                z_index: ZIndex::Global(30),
                ..default()
            },
            BackButtonNode,
            TargetCamera(map_camera),
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Back",
                TextStyle {
                    font_size: 18.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));
        });

    // Title card, map view only. A font-mesh pipeline would replace this.
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "MKE 3D",
                TextStyle {
                    font_size: 44.0,
                    color: Color::srgb(0.95, 0.92, 0.85),
                    ..default()
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                right: Val::Px(24.0),
                top: Val::Px(18.0),
                ..default()
            },
            ..default()
        },
        TargetCamera(map_camera),
    ));

    for id in WorldId::ALL {
        let world = worlds.get(id);
        for &point_entity in &world.points {
            let Ok(point) = points.get(point_entity) else {
                continue;
            };
            commands
                .spawn((
                    ButtonBundle {
                        style: Style {
                            position_type: PositionType::Absolute,
                            width: Val::Px(ANCHOR_SIZE),
                            height: Val::Px(ANCHOR_SIZE),
                            ..default()
                        },
                        background_color: Color::srgba(0.12, 0.42, 0.85, 0.9).into(),
                        visibility: Visibility::Hidden,
                        z_index: ZIndex::Global(20),
                        ..default()
                    },
                    MarkerAnchor {
                        point: point_entity,
                    },
                    TargetCamera(world.camera),
                ))
                .with_children(|parent| {
                    parent.spawn(TextBundle {
                        text: Text::from_section(
                            point.label,
                            TextStyle {
                                font_size: 14.0,
                                color: Color::WHITE,
                                ..default()
                            },
                        ),
                        style: Style {
                            position_type: PositionType::Absolute,
                            left: Val::Px(ANCHOR_SIZE + 6.0),
                            top: Val::Px(4.0),
                            ..default()
                        },
                        ..default()
                    });
                });
        }
    }
}

fn mirror_viewport_size(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    if let Ok(window) = windows.get_single() {
        viewport.0 = Vec2::new(window.width(), window.height());
    }
}

fn sync_overlay(
    overlay: Res<Overlay>,
    worlds: Res<Worlds>,
    mut nodes: Query<(&mut BackgroundColor, &mut TargetCamera), With<OverlayNode>>,
) {
    for (mut color, mut target) in &mut nodes {
        *color = Color::srgba(0.0, 0.0, 0.0, overlay.alpha).into();
        target.0 = worlds.get(overlay.owner).camera;
    }
}

fn sync_back_button(
    show: Res<ShowBackButton>,
    nav: Res<Navigation>,
    worlds: Res<Worlds>,
    mut buttons: Query<(&mut Visibility, &mut TargetCamera), With<BackButtonNode>>,
) {
    for (mut visibility, mut target) in &mut buttons {
        *visibility = if show.0 {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        target.0 = worlds.get(nav.active).camera;
    }
}

/// Drags each anchor to screen-centre + projected offset and mirrors the
/// point's derived visibility. An anchor whose point entity is gone is
/// skipped; one broken marker never takes the pass down.
fn sync_marker_anchors(
    viewport: Res<ViewportSize>,
    points: Query<&PointOfInterest>,
    mut anchors: Query<(&MarkerAnchor, &mut Style, &mut Visibility)>,
) {
    for (anchor, mut style, mut visibility) in &mut anchors {
        let Ok(point) = points.get(anchor.point) else {
            continue;
        };
        if point.visible {
            let corner = anchor_corner(viewport.0, point.screen_offset);
            style.left = Val::Px(corner.x);
            style.top = Val::Px(corner.y);
            *visibility = Visibility::Visible;
        } else {
            *visibility = Visibility::Hidden;
        }
    }
}

/// Dispatches marker clicks by point entity, never by UI-node identity.
/// Unwired markers swallow the click; wired ones request the scene change
/// (and stage the dome preset when entering a 360° view).
fn marker_clicks(
    nav: Res<Navigation>,
    anchors: Query<(&Interaction, &MarkerAnchor), (Changed<Interaction>, With<Button>)>,
    points: Query<&PointOfInterest>,
    mut requests: EventWriter<SceneChangeRequest>,
    mut explore_views: EventWriter<ExploreViewSelected>,
) {
    for (interaction, anchor) in &anchors {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Ok(point) = points.get(anchor.point) else {
            continue;
        };
        let Some(destination) = point.destination else {
            debug!("marker {:?} is not wired to a destination", point.id);
            continue;
        };
        if let Some(view) = point.explore_view {
            explore_views.send(ExploreViewSelected(view));
        }
        requests.send(SceneChangeRequest {
            from: nav.active,
            to: destination,
        });
    }
}

/// Street sites swing the hover spotlight onto themselves; leaving drops it
/// back to dark.
fn marker_hover(
    anchors: Query<(&Interaction, &MarkerAnchor), Changed<Interaction>>,
    points: Query<&PointOfInterest>,
    mut spotlights: Query<(&mut SpotLight, &mut Transform), With<StreetSpotlight>>,
) {
    for (interaction, anchor) in &anchors {
        let Ok(point) = points.get(anchor.point) else {
            continue;
        };
        let Some(aim) = point.spotlight_aim else {
            continue;
        };
        let Ok((mut light, mut transform)) = spotlights.get_single_mut() else {
            continue;
        };
        match interaction {
            Interaction::Hovered => {
                light.intensity = SPOT_INTENSITY;
                transform.look_at(aim, Vec3::Y);
            }
            Interaction::None => {
                light.intensity = 0.0;
            }
            Interaction::Pressed => {}
        }
    }
}

fn back_button_clicks(
    nav: Res<Navigation>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<BackButtonNode>)>,
    mut requests: EventWriter<SceneChangeRequest>,
) {
    for interaction in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if let Some(target) = nav.active.back_target() {
            requests.send(SceneChangeRequest {
                from: nav.active,
                to: target,
            });
        }
    }
}

fn draw_panels(
    mut contexts: EguiContexts,
    settings: Res<TourSettings>,
    nav: Res<Navigation>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let ctx = contexts.ctx_mut();
    panels::help_panel::show_help_panel(ctx, &settings);
    panels::diagnostics_panel::show_diagnostics_panel(ctx, &settings, &diagnostics, &nav);
}
