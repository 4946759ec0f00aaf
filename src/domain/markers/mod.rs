//! Screen-space projection of points of interest. Every frame the active
//! world's points are reprojected from their fixed 3D positions through the
//! active camera; the presentation layer then drags the 2D anchors along.
//! Projection is stateless, so a dropped frame self-corrects on the next one.

use bevy::prelude::*;
use bevy::render::camera::CameraProjection;

use crate::domain::navigation::{self, Navigation, TourPhase};
use crate::domain::worlds::{ExploreView, WorldId, Worlds};

pub struct MarkersPlugin;
impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>()
            .add_systems(Update, project_points.after(navigation::drive_overlay_fade));
    }
}

/// Stable identity for a point: its world plus its position in that world's
/// construction order. All click and hover dispatch keys off this (or the
/// point entity), never off UI-node identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointId(pub WorldId, pub u8);

/// A clickable site tied to a fixed 3D location. `visible` and
/// `screen_offset` are derived state, rewritten by the projector; everything
/// else is fixed at construction.
#[derive(Component, Debug)]
pub struct PointOfInterest {
    pub id: PointId,
    pub position: Vec3,
    pub label: &'static str,
    /// World a click navigates to; `None` for informational markers.
    pub destination: Option<WorldId>,
    /// Street sites swing the scene spotlight here while hovered.
    pub spotlight_aim: Option<Vec3>,
    /// Dome preset applied when this site is entered.
    pub explore_view: Option<ExploreView>,
    pub visible: bool,
    /// Offset from screen centre in pixels, +y downward.
    pub screen_offset: Vec2,
}

impl PointOfInterest {
    pub fn new(id: PointId, position: Vec3, label: &'static str) -> Self {
        Self {
            id,
            position,
            label,
            destination: None,
            spotlight_aim: None,
            explore_view: None,
            visible: false,
            screen_offset: Vec2::ZERO,
        }
    }
}

/// Current drawable size in logical pixels. The presentation layer mirrors
/// the primary window into this every frame; projection itself never touches
/// windowing, which keeps it runnable headless.
#[derive(Resource, Clone, Copy)]
pub struct ViewportSize(pub Vec2);

impl Default for ViewportSize {
    fn default() -> Self {
        Self(Vec2::new(1280.0, 720.0))
    }
}

/// Maps a world position through the camera to a pixel offset from screen
/// centre, +y downward (projected y grows upward, screen y grows downward).
/// Returns `None` for degenerate projections at or behind the camera plane.
pub fn screen_offset(
    clip_from_view: Mat4,
    camera_transform: &GlobalTransform,
    position: Vec3,
    viewport: Vec2,
) -> Option<Vec2> {
    let view_from_world = camera_transform.compute_matrix().inverse();
    let clip = clip_from_view * view_from_world * position.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        ndc.x * viewport.x * 0.5,
        -ndc.y * viewport.y * 0.5,
    ))
}

/// Reprojects every point of the active world. No-op while a scene change is
/// pending or applying: the coordinator owns marker visibility during fades.
/// The pending-transition check matters because the phase state itself only
/// lands on the next tick after a request is accepted.
pub fn project_points(
    nav: Res<Navigation>,
    phase: Res<State<TourPhase>>,
    worlds: Res<Worlds>,
    viewport: Res<ViewportSize>,
    cameras: Query<(&Projection, &GlobalTransform)>,
    mut points: Query<&mut PointOfInterest>,
) {
    if *phase.get() != TourPhase::Ready || nav.transition.is_some() {
        return;
    }
    let world = worlds.get(nav.active);
    if world.points.is_empty() {
        return;
    }
    let Ok((projection, camera_transform)) = cameras.get(world.camera) else {
        return;
    };
    let clip_from_view = projection.get_clip_from_view();
    for &entity in &world.points {
        let Ok(mut point) = points.get_mut(entity) else {
            continue;
        };
        let Some(offset) = screen_offset(clip_from_view, camera_transform, point.position, viewport.0)
        else {
            continue;
        };
        point.visible = true;
        point.screen_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 800.0);

    fn clip_matrix() -> Mat4 {
        PerspectiveProjection {
            fov: FRAC_PI_2,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 100.0,
        }
        .get_clip_from_view()
    }

    fn camera_at(eye: Vec3, target: Vec3) -> GlobalTransform {
        GlobalTransform::from(Transform::from_translation(eye).looking_at(target, Vec3::Y))
    }

    #[test]
    fn look_at_centre_projects_to_screen_centre() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let offset = screen_offset(clip_matrix(), &camera, Vec3::ZERO, VIEWPORT).unwrap();
        assert!(offset.length() < 1e-3, "expected centre, got {offset:?}");
    }

    #[test]
    fn off_axis_point_matches_direct_clip_math() {
        // Camera on +z looking down -z: view x = world x, view depth = 10.
        // With a 90° fov and square aspect, ndc.x = x / depth.
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let offset = screen_offset(clip_matrix(), &camera, Vec3::new(1.0, 0.0, 0.0), VIEWPORT)
            .unwrap();
        let expected_x = (1.0 / 10.0) * VIEWPORT.x * 0.5;
        assert!((offset.x - expected_x).abs() < 1e-3, "got {offset:?}");
        assert!(offset.y.abs() < 1e-3);
    }

    #[test]
    fn world_up_maps_to_negative_screen_y() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let offset = screen_offset(clip_matrix(), &camera, Vec3::new(0.0, 2.0, 0.0), VIEWPORT)
            .unwrap();
        let expected_y = -(2.0 / 10.0) * VIEWPORT.y * 0.5;
        assert!((offset.y - expected_y).abs() < 1e-3, "got {offset:?}");
    }

    #[test]
    fn point_behind_the_camera_is_skipped() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(screen_offset(clip_matrix(), &camera, Vec3::new(0.0, 0.0, 25.0), VIEWPORT).is_none());
    }

    #[test]
    fn projection_is_stateless_across_camera_moves() {
        let near = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let far = camera_at(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        let point = Vec3::new(1.0, 0.0, 0.0);
        let at_near = screen_offset(clip_matrix(), &near, point, VIEWPORT).unwrap();
        let at_far = screen_offset(clip_matrix(), &far, point, VIEWPORT).unwrap();
        let again = screen_offset(clip_matrix(), &near, point, VIEWPORT).unwrap();
        assert!(at_far.x < at_near.x);
        assert_eq!(at_near, again);
    }
}
