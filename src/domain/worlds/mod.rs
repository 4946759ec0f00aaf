//! The fixed set of tour worlds: the city map, the street level, and the
//! 360° explore dome. Every world bundles one camera, one scene root, and an
//! ordered list of point-of-interest entities; all three are wired once at
//! startup and live for the whole session.

pub mod scenery;

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;

use crate::domain::controls::OrbitControls;
use crate::domain::markers::{PointId, PointOfInterest};

pub struct WorldsPlugin;
impl Plugin for WorldsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Worlds>()
            .add_event::<ExploreViewSelected>()
            .add_systems(Startup, (setup_worlds, scenery::setup_scenery).chain())
            .add_systems(Update, scenery::apply_explore_view);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldId {
    Map,
    Street,
    Explore,
}

impl WorldId {
    pub const ALL: [WorldId; 3] = [WorldId::Map, WorldId::Street, WorldId::Explore];

    /// The world the single back affordance leads to: the one directly
    /// preceding this world in the map → street → explore chain.
    pub fn back_target(self) -> Option<WorldId> {
        match self {
            WorldId::Map => None,
            WorldId::Street => Some(WorldId::Map),
            WorldId::Explore => Some(WorldId::Street),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WorldId::Map => "City Map",
            WorldId::Street => "Old World Third",
            WorldId::Explore => "Explore",
        }
    }

    fn index(self) -> usize {
        match self {
            WorldId::Map => 0,
            WorldId::Street => 1,
            WorldId::Explore => 2,
        }
    }

    /// Each world's content renders only on its own layer, so the per-world
    /// cameras never see each other's scenes.
    pub fn render_layers(self) -> RenderLayers {
        RenderLayers::layer(self.index())
    }
}

/// ECS handles for one world. `points` keeps construction order; the
/// projector walks it every frame for the active world.
pub struct WorldHandles {
    pub id: WorldId,
    pub camera: Entity,
    pub root: Entity,
    pub points: Vec<Entity>,
}

/// Lookup table over the fixed world enumeration. Populated once by
/// [`setup_worlds`]; there is no mutation API beyond that.
#[derive(Resource, Default)]
pub struct Worlds {
    entries: [Option<WorldHandles>; WorldId::ALL.len()],
}

impl Worlds {
    pub fn insert(&mut self, handles: WorldHandles) {
        let idx = handles.id.index();
        self.entries[idx] = Some(handles);
    }

    /// Panics when `id` was never registered: that is a wiring bug, not a
    /// runtime condition anything should recover from.
    pub fn get(&self, id: WorldId) -> &WorldHandles {
        self.entries[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("world {id:?} is not registered; all worlds must be wired at startup"))
    }

    pub fn is_registered(&self, id: WorldId) -> bool {
        self.entries[id.index()].is_some()
    }
}

/// Dome preset for one street site: where the panorama faces and the stand-in
/// tint applied while the real pano texture pipeline lives outside this core.
#[derive(Clone, Copy, Debug)]
pub struct ExploreView {
    pub yaw: f32,
    pub tint: Color,
}

/// Emitted when a street marker with a dome preset is clicked, just before
/// the scene change request goes out.
#[derive(Event)]
pub struct ExploreViewSelected(pub ExploreView);

struct WorldSpec {
    eye: Vec3,
    target: Vec3,
    far: f32,
    tonemapping: Tonemapping,
    zoom_range: (f32, f32),
}

impl WorldSpec {
    fn for_world(id: WorldId) -> Self {
        match id {
            WorldId::Map => Self {
                eye: Vec3::new(0.0, 205.0, 205.0),
                target: Vec3::new(0.0, 1.0, 0.0),
                far: 700.0,
                // The map reads best without filmic tonemapping.
                tonemapping: Tonemapping::None,
                zoom_range: (60.0, 550.0),
            },
            WorldId::Street => Self {
                eye: Vec3::new(0.0, 40.0, 140.0),
                target: Vec3::ZERO,
                far: 400.0,
                tonemapping: Tonemapping::TonyMcMapface,
                zoom_range: (30.0, 320.0),
            },
            WorldId::Explore => Self {
                eye: Vec3::new(0.0, 0.0, 0.1),
                target: Vec3::ZERO,
                far: 1000.0,
                tonemapping: Tonemapping::TonyMcMapface,
                // Pinned at the dome centre; orbiting looks around, never out.
                zoom_range: (0.1, 0.1),
            },
        }
    }
}

fn points_for(id: WorldId) -> Vec<PointOfInterest> {
    match id {
        WorldId::Map => vec![
            PointOfInterest {
                destination: Some(WorldId::Street),
                ..PointOfInterest::new(PointId(id, 0), Vec3::new(-166.0, 12.0, 90.0), "Old World Third")
            },
            // Brady St and Bradford Beach are still under construction and
            // do not navigate anywhere yet.
            PointOfInterest::new(PointId(id, 1), Vec3::new(-25.0, 17.0, -20.0), "Brady St"),
            PointOfInterest::new(PointId(id, 2), Vec3::new(184.3, 16.8, -108.9), "Bradford Beach"),
        ],
        WorldId::Street => vec![
            PointOfInterest {
                destination: Some(WorldId::Explore),
                spotlight_aim: Some(Vec3::new(-48.97, -19.47, -34.22)),
                explore_view: Some(ExploreView {
                    yaw: 0.05,
                    tint: Color::srgb(0.82, 0.62, 0.45),
                }),
                ..PointOfInterest::new(PointId(id, 0), Vec3::new(-58.0, 4.7, -54.0), "Brat House")
            },
            PointOfInterest {
                destination: Some(WorldId::Explore),
                spotlight_aim: Some(Vec3::new(11.5, -19.47, -34.22)),
                explore_view: Some(ExploreView {
                    yaw: 1.804,
                    tint: Color::srgb(0.55, 0.63, 0.78),
                }),
                ..PointOfInterest::new(PointId(id, 1), Vec3::new(19.3, 12.5, -54.0), "Who's On Third")
            },
            PointOfInterest {
                destination: Some(WorldId::Explore),
                spotlight_aim: Some(Vec3::new(83.77, -19.47, -34.22)),
                explore_view: Some(ExploreView {
                    yaw: -5.4,
                    tint: Color::srgb(0.72, 0.5, 0.38),
                }),
                ..PointOfInterest::new(PointId(id, 2), Vec3::new(114.6, 4.7, -54.0), "Mader's")
            },
        ],
        // The dome is looked around, not clicked through.
        WorldId::Explore => Vec::new(),
    }
}

/// Spawns one camera + orbit controls + scene root per world, plus the point
/// entities, and registers the handles. Only the map starts active.
pub fn setup_worlds(mut commands: Commands, mut worlds: ResMut<Worlds>) {
    for id in WorldId::ALL {
        let spec = WorldSpec::for_world(id);
        let starts_active = id == WorldId::Map;

        let mut controls = OrbitControls::new(spec.target, spec.eye)
            .with_distance_range(spec.zoom_range.0, spec.zoom_range.1);
        controls.enabled = starts_active;

        let camera = commands
            .spawn((
                Camera3dBundle {
                    camera: Camera {
                        is_active: starts_active,
                        ..default()
                    },
                    projection: Projection::Perspective(PerspectiveProjection {
                        fov: 75f32.to_radians(),
                        near: 0.1,
                        far: spec.far,
                        ..default()
                    }),
                    tonemapping: spec.tonemapping,
                    transform: Transform::from_translation(spec.eye).looking_at(spec.target, Vec3::Y),
                    ..default()
                },
                controls,
                id.render_layers(),
            ))
            .id();

        let root = commands
            .spawn(SpatialBundle {
                visibility: if starts_active {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                },
                ..default()
            })
            .id();

        let points = points_for(id)
            .into_iter()
            .map(|point| commands.spawn(point).id())
            .collect();

        worlds.insert(WorldHandles {
            id,
            camera,
            root,
            points,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_chain_walks_explore_street_map() {
        assert_eq!(WorldId::Explore.back_target(), Some(WorldId::Street));
        assert_eq!(WorldId::Street.back_target(), Some(WorldId::Map));
        assert_eq!(WorldId::Map.back_target(), None);
    }

    #[test]
    fn render_layers_are_distinct_per_world() {
        let layers: Vec<_> = WorldId::ALL.iter().map(|id| id.render_layers()).collect();
        assert_ne!(layers[0], layers[1]);
        assert_ne!(layers[1], layers[2]);
        assert_ne!(layers[0], layers[2]);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn unregistered_world_is_a_wiring_bug() {
        Worlds::default().get(WorldId::Street);
    }

    #[test]
    fn setup_registers_every_world_with_map_active() {
        let mut app = App::new();
        app.init_resource::<Worlds>();
        app.add_systems(Startup, setup_worlds);
        app.update();

        let worlds = app.world().resource::<Worlds>();
        for id in WorldId::ALL {
            assert!(worlds.is_registered(id));
        }
        let map_camera = worlds.get(WorldId::Map).camera;
        let street_camera = worlds.get(WorldId::Street).camera;

        let camera = app.world().get::<Camera>(map_camera).unwrap();
        assert!(camera.is_active);
        let camera = app.world().get::<Camera>(street_camera).unwrap();
        assert!(!camera.is_active);

        assert_eq!(worlds.get(WorldId::Map).points.len(), 3);
        assert_eq!(worlds.get(WorldId::Street).points.len(), 3);
        assert!(worlds.get(WorldId::Explore).points.is_empty());
    }

    #[test]
    fn only_wired_markers_navigate() {
        let map_points = points_for(WorldId::Map);
        assert_eq!(map_points[0].destination, Some(WorldId::Street));
        assert_eq!(map_points[1].destination, None);
        assert_eq!(map_points[2].destination, None);

        for point in points_for(WorldId::Street) {
            assert_eq!(point.destination, Some(WorldId::Explore));
            assert!(point.spotlight_aim.is_some());
            assert!(point.explore_view.is_some());
        }
    }
}
