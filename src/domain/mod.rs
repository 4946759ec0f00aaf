//! Domain modules split by discipline so teams can work independently.
//! - `controls`: orbit-camera input, keybinds, and runtime toggles.
//! - `markers`: point-of-interest projection onto the screen.
//! - `navigation`: the scene-change state machine and fade overlay.
//! - `presentation`: HUD anchors, fade overlay node, and egui panels.
//! - `worlds`: the fixed set of tour worlds and their static scenery.

pub mod controls;
pub mod markers;
pub mod navigation;
pub mod presentation;
pub mod worlds;

pub use controls::InputPlugin;
pub use markers::MarkersPlugin;
pub use navigation::{NavigationPlugin, TourPhase};
pub use presentation::UiPlugin;
pub use worlds::WorldsPlugin;
