//! Level domain: static sandbox arena and camera follow.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{GameLayer, Ground, Player, Wall};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_camera, spawn_arena))
            .add_systems(PostUpdate, camera_follow_player);
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn ground_slab(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Ground,
        Sprite {
            color: Color::srgb(0.25, 0.3, 0.35),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::Ground, [GameLayer::Player]),
    ));
}

fn wall_slab(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Wall,
        Sprite {
            color: Color::srgb(0.3, 0.26, 0.32),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::Wall, [GameLayer::Player]),
    ));
}

/// A long floor, a chasm with high anchor beams over it, two side walls, and
/// a few floating platforms to grapple between.
fn spawn_arena(mut commands: Commands) {
    // Floor segments with a chasm between them
    ground_slab(&mut commands, Vec2::new(-700.0, -40.0), Vec2::new(1200.0, 80.0));
    ground_slab(&mut commands, Vec2::new(900.0, -40.0), Vec2::new(1000.0, 80.0));

    // Overhead beams spanning the chasm (grapple anchors)
    ground_slab(&mut commands, Vec2::new(0.0, 420.0), Vec2::new(360.0, 40.0));
    ground_slab(&mut commands, Vec2::new(420.0, 520.0), Vec2::new(280.0, 40.0));

    // Floating platforms
    ground_slab(&mut commands, Vec2::new(-300.0, 160.0), Vec2::new(200.0, 30.0));
    ground_slab(&mut commands, Vec2::new(620.0, 220.0), Vec2::new(200.0, 30.0));

    // Arena walls
    wall_slab(&mut commands, Vec2::new(-1340.0, 400.0), Vec2::new(80.0, 1000.0));
    wall_slab(&mut commands, Vec2::new(1440.0, 400.0), Vec2::new(80.0, 1000.0));
}

fn camera_follow_player(
    time: Res<Time>,
    player: Query<&Transform, With<Player>>,
    mut camera: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(target) = player.single() else {
        return;
    };
    let Ok(mut cam) = camera.single_mut() else {
        return;
    };

    let follow = 1.0 - (-8.0 * time.delta_secs()).exp();
    cam.translation.x += (target.translation.x - cam.translation.x) * follow;
    cam.translation.y += (target.translation.y + 60.0 - cam.translation.y) * follow;
}
