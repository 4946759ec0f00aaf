//! Orbit-camera controls and the input bindings around them. Each world's
//! camera carries its own [`OrbitControls`] with a home pose saved at
//! construction; entering a world resets to that pose. Damped motion keeps
//! integrating every frame for the active camera, even mid-fade — only *new*
//! input is gated by the enabled flag.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use crate::domain::navigation::{Navigation, SceneChangeRequest};
use crate::domain::presentation::TourSettings;
use crate::domain::worlds::Worlds;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Keybinds>().add_systems(
            Update,
            (
                (orbit_input, orbit_update).chain(),
                back_nav_key,
                view_reset_key,
                help_toggle,
                diagnostics_toggle,
            ),
        );
    }
}

#[derive(Resource)]
pub struct Keybinds {
    pub back: KeyCode,
    pub reset_view: KeyCode,
    pub help: KeyCode,
    pub diagnostics: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            back: KeyCode::Escape,
            reset_view: KeyCode::KeyR,
            help: KeyCode::KeyH,
            diagnostics: KeyCode::F3,
        }
    }
}

const ROTATE_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.08;
const DAMPING_RATE: f32 = 8.0;
// Keeps the orbit off the poles.
const PITCH_LIMIT: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPose {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

/// Damped orbit around a target point. Input lands in pending deltas; the
/// per-frame integration moves a blend of them onto the pose and decays the
/// rest, so motion eases out instead of stopping dead.
#[derive(Component, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    min_distance: f32,
    max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    home: OrbitPose,
}

impl OrbitControls {
    /// Derives yaw/pitch/distance from an eye and target and saves the
    /// result as the home pose.
    pub fn new(target: Vec3, eye: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(1e-4);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        let home = OrbitPose {
            target,
            yaw,
            pitch,
            distance,
        };
        Self {
            enabled: false,
            target,
            yaw,
            pitch,
            distance,
            min_distance: distance * 0.2,
            max_distance: distance * 3.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            home,
        }
    }

    pub fn with_distance_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn pose(&self) -> OrbitPose {
        OrbitPose {
            target: self.target,
            yaw: self.yaw,
            pitch: self.pitch,
            distance: self.distance,
        }
    }

    /// Restores the pose saved at construction and drops in-flight motion.
    pub fn reset(&mut self) {
        let home = self.home;
        self.target = home.target;
        self.yaw = home.yaw;
        self.pitch = home.pitch;
        self.distance = home.distance;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
    }

    pub fn apply_input(&mut self, drag: Vec2, scroll: f32) {
        self.pending_yaw -= drag.x * ROTATE_SENSITIVITY;
        self.pending_pitch += drag.y * ROTATE_SENSITIVITY;
        self.pending_zoom -= scroll * ZOOM_SENSITIVITY;
    }

    pub fn integrate(&mut self, dt: f32) {
        let blend = (1.0 - (-DAMPING_RATE * dt).exp()).clamp(0.0, 1.0);
        self.yaw += self.pending_yaw * blend;
        self.pitch = (self.pitch + self.pending_pitch * blend).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let zoom_factor = (1.0 + self.pending_zoom * blend).max(0.05);
        self.distance = (self.distance * zoom_factor).clamp(self.min_distance, self.max_distance);
        self.pending_yaw *= 1.0 - blend;
        self.pending_pitch *= 1.0 - blend;
        self.pending_zoom *= 1.0 - blend;
    }

    /// Camera pose for the current orbit state: offset back from the target
    /// along the yaw/pitch direction, looking at the target.
    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch);
        let eye = self.target + rotation * Vec3::new(0.0, 0.0, self.distance);
        Transform::from_translation(eye).looking_at(self.target, Vec3::Y)
    }
}

/// Feeds mouse drag and wheel into the active, enabled controls. Events are
/// drained every frame either way so stale motion never bursts in later.
pub fn orbit_input(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut orbits: Query<(&mut OrbitControls, &Camera)>,
) {
    let mut drag = Vec2::ZERO;
    for event in motion.read() {
        if buttons.pressed(MouseButton::Left) {
            drag += event.delta;
        }
    }
    let scroll: f32 = wheel.read().map(|event| event.y).sum();
    if drag == Vec2::ZERO && scroll == 0.0 {
        return;
    }
    for (mut orbit, camera) in &mut orbits {
        if camera.is_active && orbit.enabled {
            orbit.apply_input(drag, scroll);
        }
    }
}

/// Integrates the active camera's damped motion and writes its transform.
/// Runs every frame regardless of transition phase so eased motion settles
/// smoothly through fades.
pub fn orbit_update(
    time: Res<Time>,
    mut orbits: Query<(&mut Transform, &mut OrbitControls, &Camera)>,
) {
    for (mut transform, mut orbit, camera) in &mut orbits {
        if !camera.is_active {
            continue;
        }
        orbit.integrate(time.delta_seconds());
        *transform = orbit.transform();
    }
}

fn back_nav_key(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    nav: Res<Navigation>,
    mut requests: EventWriter<SceneChangeRequest>,
) {
    if !keys.just_pressed(keybinds.back) {
        return;
    }
    if let Some(target) = nav.active.back_target() {
        requests.send(SceneChangeRequest {
            from: nav.active,
            to: target,
        });
    }
}

fn view_reset_key(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    nav: Res<Navigation>,
    worlds: Res<Worlds>,
    mut orbits: Query<&mut OrbitControls>,
) {
    if !keys.just_pressed(keybinds.reset_view) {
        return;
    }
    if let Ok(mut orbit) = orbits.get_mut(worlds.get(nav.active).camera) {
        if orbit.enabled {
            orbit.reset();
        }
    }
}

fn help_toggle(
    mut settings: ResMut<TourSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
) {
    if keys.just_pressed(keybinds.help) {
        settings.show_help = !settings.show_help;
    }
}

fn diagnostics_toggle(
    mut settings: ResMut<TourSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
) {
    if keys.just_pressed(keybinds.diagnostics) {
        settings.show_diagnostics = !settings.show_diagnostics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_recovers_the_eye_it_was_built_from() {
        let target = Vec3::new(0.0, 1.0, 0.0);
        let eye = Vec3::new(0.0, 205.0, 205.0);
        let orbit = OrbitControls::new(target, eye);
        let rebuilt = orbit.transform().translation;
        assert!((rebuilt - eye).length() < 0.05, "rebuilt {rebuilt:?}");
    }

    #[test]
    fn reset_restores_the_home_pose() {
        let mut orbit = OrbitControls::new(Vec3::ZERO, Vec3::new(0.0, 40.0, 140.0));
        let home = orbit.pose();
        orbit.apply_input(Vec2::new(120.0, -40.0), 3.0);
        orbit.integrate(0.016);
        orbit.integrate(0.016);
        assert_ne!(orbit.pose(), home);
        orbit.reset();
        assert_eq!(orbit.pose(), home);
    }

    #[test]
    fn damping_eases_pending_motion_out() {
        let mut orbit = OrbitControls::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0));
        orbit.apply_input(Vec2::new(200.0, 0.0), 0.0);
        let before = orbit.yaw;
        orbit.integrate(0.016);
        let first_step = orbit.yaw - before;
        orbit.integrate(0.016);
        let second_step = orbit.yaw - before - first_step;
        assert!(first_step.abs() > 0.0);
        assert!(second_step.abs() < first_step.abs());
        for _ in 0..600 {
            orbit.integrate(0.016);
        }
        assert!(orbit.pending_yaw.abs() < 1e-5);
    }

    #[test]
    fn zoom_stays_inside_the_distance_range() {
        let mut orbit =
            OrbitControls::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0)).with_distance_range(50.0, 150.0);
        orbit.apply_input(Vec2::ZERO, -200.0);
        for _ in 0..240 {
            orbit.integrate(0.016);
        }
        assert!(orbit.distance <= 150.0 + 1e-3);
        orbit.reset();
        orbit.apply_input(Vec2::ZERO, 200.0);
        for _ in 0..240 {
            orbit.integrate(0.016);
        }
        assert!(orbit.distance >= 50.0 - 1e-3);
    }

    #[test]
    fn transform_always_faces_the_target() {
        let mut orbit = OrbitControls::new(Vec3::new(3.0, 2.0, -5.0), Vec3::new(3.0, 30.0, 60.0));
        orbit.apply_input(Vec2::new(80.0, 25.0), 1.0);
        orbit.integrate(0.016);
        let transform = orbit.transform();
        let toward_target = (orbit.target - transform.translation).normalize();
        let forward = transform.forward();
        assert!(forward.dot(toward_target) > 0.999);
    }
}
