//! Static stand-in scenery for the three worlds plus the lighting presets.
//! Nothing in here makes decisions: it builds content once at startup and
//! applies the per-site dome preset when asked. The production asset
//! pipeline (gltf city model, pano textures) lives outside this core.

use bevy::prelude::*;

use super::{ExploreViewSelected, WorldId, Worlds};

/// Lumens while a street site is spotlit on hover; zero otherwise.
pub const SPOT_INTENSITY: f32 = 8_000_000.0;

/// Tags the street scene's aimable spotlight.
#[derive(Component)]
pub struct StreetSpotlight;

/// The inverted sphere the 360° views are shown on.
#[derive(Resource)]
pub struct ExploreDome {
    pub mesh: Entity,
    pub material: Handle<StandardMaterial>,
}

/// Ambient preset per world: the map reads bright and flat, the street sits
/// in a dim warm dusk, the dome is unlit and only needs a floor value.
pub fn ambient_for(world: WorldId) -> AmbientLight {
    match world {
        WorldId::Map => AmbientLight {
            color: Color::WHITE,
            brightness: 900.0,
        },
        WorldId::Street => AmbientLight {
            color: Color::srgb(1.0, 0.87, 0.73),
            brightness: 110.0,
        },
        WorldId::Explore => AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
        },
    }
}

pub fn setup_scenery(
    mut commands: Commands,
    worlds: Res<Worlds>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ambient_for(WorldId::Map));

    spawn_map(&mut commands, &worlds, meshes.as_mut(), materials.as_mut());
    spawn_street(&mut commands, &worlds, meshes.as_mut(), materials.as_mut());
    spawn_explore(&mut commands, &worlds, meshes.as_mut(), materials.as_mut());
}

fn spawn_map(
    commands: &mut Commands,
    worlds: &Worlds,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let layers = WorldId::Map.render_layers();
    let root = worlds.get(WorldId::Map).root;

    let ground = meshes.add(Plane3d::default().mesh().size(620.0, 420.0));
    let block = meshes.add(Cuboid::new(26.0, 1.0, 26.0));
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.36, 0.44, 0.33),
        perceptual_roughness: 0.95,
        ..default()
    });
    let block_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.52, 0.47),
        perceptual_roughness: 0.8,
        ..default()
    });
    let water_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.16, 0.3, 0.45),
        perceptual_roughness: 0.2,
        ..default()
    });

    commands.entity(root).with_children(|parent| {
        parent.spawn((
            PbrBundle {
                mesh: ground.clone(),
                material: ground_material,
                transform: Transform::from_xyz(55.0, 0.0, 0.0),
                ..default()
            },
            layers.clone(),
        ));
        // Lake Michigan edge, east of the city grid.
        parent.spawn((
            PbrBundle {
                mesh: meshes.add(Plane3d::default().mesh().size(160.0, 420.0)),
                material: water_material,
                transform: Transform::from_xyz(290.0, 0.4, 0.0),
                ..default()
            },
            layers.clone(),
        ));
        // Low risers under each mapped site.
        for position in [
            Vec3::new(-166.0, 5.0, 90.0),
            Vec3::new(-25.0, 8.0, -20.0),
            Vec3::new(184.3, 7.5, -108.9),
        ] {
            parent.spawn((
                PbrBundle {
                    mesh: block.clone(),
                    material: block_material.clone(),
                    transform: Transform::from_translation(position)
                        .with_scale(Vec3::new(1.0, position.y, 1.0)),
                    ..default()
                },
                layers.clone(),
            ));
        }
    });
}

fn spawn_street(
    commands: &mut Commands,
    worlds: &Worlds,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let layers = WorldId::Street.render_layers();
    let root = worlds.get(WorldId::Street).root;

    let ground = meshes.add(Plane3d::default().mesh().size(700.0, 300.0));
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.32, 0.3, 0.28),
        perceptual_roughness: 0.9,
        ..default()
    });
    let facade_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.5, 0.36, 0.28),
        perceptual_roughness: 0.75,
        ..default()
    });

    commands.entity(root).with_children(|parent| {
        parent.spawn((
            PbrBundle {
                mesh: ground,
                material: ground_material,
                transform: Transform::from_xyz(0.0, -20.0, 0.0),
                ..default()
            },
            layers.clone(),
        ));
        // Facade row behind the three sites.
        for (x, width, height) in [
            (-58.0, 52.0, 44.0),
            (19.3, 46.0, 58.0),
            (114.6, 60.0, 40.0),
        ] {
            parent.spawn((
                PbrBundle {
                    mesh: meshes.add(Cuboid::new(width, height, 24.0)),
                    material: facade_material.clone(),
                    transform: Transform::from_xyz(x, height * 0.5 - 20.0, -78.0),
                    ..default()
                },
                layers.clone(),
            ));
        }
        // Low-sun directional light, warm and shadow-casting.
        parent.spawn((
            DirectionalLightBundle {
                directional_light: DirectionalLight {
                    color: Color::srgb(0.85, 0.55, 0.13),
                    illuminance: 8_000.0,
                    shadows_enabled: true,
                    ..default()
                },
                transform: Transform::from_xyz(0.0, 120.0, -80.0).looking_at(Vec3::ZERO, Vec3::Y),
                ..default()
            },
            layers.clone(),
        ));
        // Hover spotlight; markers aim it and raise the intensity.
        parent.spawn((
            SpotLightBundle {
                spot_light: SpotLight {
                    color: Color::srgb(0.98, 0.72, 0.02),
                    intensity: 0.0,
                    range: 600.0,
                    inner_angle: 0.09,
                    outer_angle: 0.18,
                    shadows_enabled: true,
                    ..default()
                },
                transform: Transform::from_xyz(0.0, 50.0, 50.0).looking_at(Vec3::ZERO, Vec3::Y),
                ..default()
            },
            StreetSpotlight,
            layers.clone(),
        ));
    });
}

fn spawn_explore(
    commands: &mut Commands,
    worlds: &Worlds,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let layers = WorldId::Explore.render_layers();
    let root = worlds.get(WorldId::Explore).root;

    // Flat tint stands in for the pano texture; the preset system is what
    // matters here.
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.82, 0.62, 0.45),
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let mut dome = Entity::PLACEHOLDER;
    commands.entity(root).with_children(|parent| {
        dome = parent
            .spawn((
                PbrBundle {
                    mesh: meshes.add(Sphere::new(500.0).mesh().uv(60, 40)),
                    material: material.clone(),
                    ..default()
                },
                layers.clone(),
            ))
            .id();
    });
    commands.insert_resource(ExploreDome {
        mesh: dome,
        material,
    });
}

/// Applies a street site's dome preset: face the panorama the right way and
/// swap the stand-in tint.
pub fn apply_explore_view(
    mut events: EventReader<ExploreViewSelected>,
    dome: Option<Res<ExploreDome>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(dome) = dome else {
        return;
    };
    for ExploreViewSelected(view) in events.read() {
        if let Ok(mut transform) = transforms.get_mut(dome.mesh) {
            transform.rotation = Quat::from_rotation_y(view.yaw);
        }
        if let Some(material) = materials.get_mut(&dome.material) {
            material.base_color = view.tint;
        }
    }
}
