//! The scene-change state machine. One world is active at a time; moving
//! between worlds runs a fixed timed sequence: fade to black, swap cameras
//! and scene roots while the screen is fully covered, then fade back in.
//! Every step is a threshold check against the monotonic clock, evaluated
//! once per tick, so the whole sequence is deterministic under a test clock.


use bevy::prelude::*;

use crate::domain::controls::{self, OrbitControls};
use crate::domain::markers::PointOfInterest;
use crate::domain::worlds::{scenery, WorldId, Worlds};

pub struct NavigationPlugin;
impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Navigation>()
            .init_resource::<Overlay>()
            .init_resource::<ShowBackButton>()
            .init_resource::<AmbientLight>()
            .add_event::<SceneChangeRequest>()
            .add_systems(
                Update,
                (handle_scene_change_requests, advance_transition, drive_overlay_fade)
                    .chain()
                    .after(controls::orbit_update),
            )
            // Swapping lasts exactly one state tick.
            .add_systems(
                OnEnter(TourPhase::Swapping),
                |mut next_phase: ResMut<NextState<TourPhase>>| {
                    next_phase.set(TourPhase::FadingIn);
                },
            );
    }
}

/// Timings of the scene-change sequence, in seconds from the accepted
/// request. The swap has to land while the overlay is fully opaque; the
/// 0.1 s gap after the fade-out completes absorbs frame-timing jitter, and
/// `Ready` lands just after the fade-in starts so markers reappear while the
/// overlay is still faintly dimming.
pub const FADE_OUT_SECS: f32 = 1.0;
pub const SWAP_OFFSET_SECS: f32 = 1.1;
pub const FADE_IN_DELAY_SECS: f32 = 1.2;
pub const READY_OFFSET_SECS: f32 = 1.3;
pub const FADE_IN_SECS: f32 = 2.0;

/// How long the startup reveal holds black before fading the map in.
const STARTUP_HOLD_SECS: f32 = 0.5;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TourPhase {
    #[default]
    Ready,
    FadingOut,
    Swapping,
    FadingIn,
}

/// A scene change asked for by a marker click, the back button, or the back
/// key. `from` must still be the active world when the request is handled;
/// stale or mid-transition requests are dropped without touching any state.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneChangeRequest {
    pub from: WorldId,
    pub to: WorldId,
}

/// One in-flight scene change.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub from: WorldId,
    pub to: WorldId,
    pub started_at: f32,
    pub swapped: bool,
}

/// Which world the user is in, where they came from, and whether a change is
/// in flight. The single writer of this lives in this module.
#[derive(Resource)]
pub struct Navigation {
    pub active: WorldId,
    pub previous: Option<WorldId>,
    pub transition: Option<Transition>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            active: WorldId::Map,
            previous: None,
            transition: None,
        }
    }
}

/// An alpha ramp evaluated against the monotonic clock. `start` may lie in
/// the future; until then the ramp holds `from_alpha`.
#[derive(Clone, Copy, Debug)]
pub struct FadeRamp {
    pub start: f32,
    pub from_alpha: f32,
    pub to_alpha: f32,
    pub duration: f32,
}

impl FadeRamp {
    pub fn alpha_at(&self, now: f32) -> f32 {
        let t = ((now - self.start) / self.duration).clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        self.from_alpha + (self.to_alpha - self.from_alpha) * eased
    }

    pub fn finished(&self, now: f32) -> bool {
        now >= self.start + self.duration
    }
}

/// The full-screen fade plane. It is always owned by exactly one world —
/// `owner` — whose camera renders it; the swap transfers ownership, it never
/// copies the plane.
#[derive(Resource)]
pub struct Overlay {
    pub alpha: f32,
    pub owner: WorldId,
    pub ramp: Option<FadeRamp>,
}

impl Default for Overlay {
    fn default() -> Self {
        // Start opaque and reveal the map once the first frames settle;
        // the phase is already Ready underneath it.
        Self {
            alpha: 1.0,
            owner: WorldId::Map,
            ramp: Some(FadeRamp {
                start: STARTUP_HOLD_SECS,
                from_alpha: 1.0,
                to_alpha: 0.0,
                duration: FADE_IN_SECS,
            }),
        }
    }
}

/// Whether the back affordance is shown. Only the coordinator writes this:
/// hidden the moment a change is accepted, shown again at ready time unless
/// the map (the chain root) is what became active.
#[derive(Resource, Default)]
pub struct ShowBackButton(pub bool);

/// Validates and accepts scene-change requests. Anything invalid is dropped
/// with no state mutation so stray events and double-clicks cannot corrupt
/// navigation; the drop is only visible at debug log level.
pub fn handle_scene_change_requests(
    mut requests: EventReader<SceneChangeRequest>,
    time: Res<Time>,
    worlds: Res<Worlds>,
    phase: Res<State<TourPhase>>,
    mut nav: ResMut<Navigation>,
    mut overlay: ResMut<Overlay>,
    mut back_button: ResMut<ShowBackButton>,
    mut next_phase: ResMut<NextState<TourPhase>>,
    mut controls: Query<&mut OrbitControls>,
    mut points: Query<&mut PointOfInterest>,
) {
    for request in requests.read() {
        // The pending record also guards the same tick a previous request was
        // accepted on, since the phase state only applies next tick.
        if nav.transition.is_some() || *phase.get() != TourPhase::Ready {
            debug!("dropping scene change {:?} -> {:?}: change already in flight", request.from, request.to);
            continue;
        }
        if request.from != nav.active || request.to == request.from {
            debug!("dropping stale scene change {:?} -> {:?}", request.from, request.to);
            continue;
        }
        let from = worlds.get(request.from);
        worlds.get(request.to);

        // Hide the outgoing markers immediately, independent of the
        // per-frame projector.
        for &entity in &from.points {
            if let Ok(mut point) = points.get_mut(entity) {
                point.visible = false;
            }
        }
        back_button.0 = false;
        if let Ok(mut orbit) = controls.get_mut(from.camera) {
            orbit.enabled = false;
        }

        let now = time.elapsed_seconds();
        overlay.ramp = Some(FadeRamp {
            start: now,
            from_alpha: overlay.alpha,
            to_alpha: 1.0,
            duration: FADE_OUT_SECS,
        });
        nav.transition = Some(Transition {
            from: request.from,
            to: request.to,
            started_at: now,
            swapped: false,
        });
        next_phase.set(TourPhase::FadingOut);
        info!("scene change {:?} -> {:?}", request.from, request.to);
    }
}

/// Drives the timed steps of the in-flight scene change: the atomic swap once
/// the screen is covered, then the return to ready. Threshold checks against
/// one clock and one start time keep the steps ordered by construction.
pub fn advance_transition(
    time: Res<Time>,
    worlds: Res<Worlds>,
    mut nav: ResMut<Navigation>,
    mut overlay: ResMut<Overlay>,
    mut back_button: ResMut<ShowBackButton>,
    mut ambient: ResMut<AmbientLight>,
    mut next_phase: ResMut<NextState<TourPhase>>,
    mut cameras: Query<&mut Camera>,
    mut controls: Query<&mut OrbitControls>,
    mut visibility: Query<&mut Visibility>,
) {
    let Some(mut transition) = nav.transition else {
        return;
    };
    let t = time.elapsed_seconds() - transition.started_at;

    if !transition.swapped && t >= SWAP_OFFSET_SECS {
        let from = worlds.get(transition.from);
        let to = worlds.get(transition.to);

        if let Ok(mut camera) = cameras.get_mut(from.camera) {
            camera.is_active = false;
        }
        if let Ok(mut camera) = cameras.get_mut(to.camera) {
            camera.is_active = true;
        }
        if let Ok(mut root) = visibility.get_mut(from.root) {
            *root = Visibility::Hidden;
        }
        if let Ok(mut root) = visibility.get_mut(to.root) {
            *root = Visibility::Visible;
        }
        if let Ok(mut orbit) = controls.get_mut(to.camera) {
            orbit.reset();
            orbit.enabled = true;
        }

        overlay.owner = transition.to;
        overlay.ramp = Some(FadeRamp {
            start: transition.started_at + FADE_IN_DELAY_SECS,
            from_alpha: 1.0,
            to_alpha: 0.0,
            duration: FADE_IN_SECS,
        });
        *ambient = scenery::ambient_for(transition.to);

        nav.previous = Some(transition.from);
        nav.active = transition.to;
        transition.swapped = true;
        next_phase.set(TourPhase::Swapping);
        info!("entered {:?}", transition.to);
    }

    if transition.swapped && t >= READY_OFFSET_SECS {
        back_button.0 = nav.active.back_target().is_some();
        nav.transition = None;
        next_phase.set(TourPhase::Ready);
    } else {
        nav.transition = Some(transition);
    }
}

/// Evaluates the overlay's active ramp, if any. The ramp outlives the
/// transition record: ready lands while the fade-in is still dimming.
pub fn drive_overlay_fade(time: Res<Time>, mut overlay: ResMut<Overlay>) {
    let Some(ramp) = overlay.ramp else {
        return;
    };
    let now = time.elapsed_seconds();
    overlay.alpha = ramp.alpha_at(now);
    if ramp.finished(now) {
        overlay.ramp = None;
    }
}
