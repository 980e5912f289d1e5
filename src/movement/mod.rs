//! Movement domain: side-scroller locomotion and the player body.
//!
//! This is the motion controller the grapple ability drives: it owns the
//! player's velocity-based locomotion (steering, jumps, gravity) and the
//! per-frame contact snapshot. Abilities that take exclusive authority over
//! the body insert [`MotionOverride`], which makes every locomotion system
//! here skip the player.

mod components;
mod resources;
mod systems;

pub use components::{
    Facing, GameLayer, Ground, MotionOverride, MovementState, Player, Wall, WallContact,
};
pub use resources::{MovementInput, MovementTuning};

use avian2d::prelude::*;
use bevy::prelude::*;

/// Frame phases shared across player-facing plugins. Configured as a chain so
/// ability systems always see this frame's input and contact snapshot, and
/// post-locomotion systems may overwrite what locomotion wrote.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSystems {
    Input,
    Detection,
    Locomotion,
    Abilities,
    Feedback,
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementTuning>()
            .init_resource::<MovementInput>()
            .configure_sets(
                Update,
                (
                    PlayerSystems::Input,
                    PlayerSystems::Detection,
                    PlayerSystems::Locomotion,
                    PlayerSystems::Abilities,
                    PlayerSystems::Feedback,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_player)
            .add_systems(Update, systems::read_input.in_set(PlayerSystems::Input))
            .add_systems(
                Update,
                (
                    systems::detect_ground,
                    systems::detect_walls,
                    systems::detect_ceiling,
                )
                    .in_set(PlayerSystems::Detection),
            )
            .add_systems(
                Update,
                (
                    systems::update_timers,
                    systems::apply_horizontal_movement,
                    systems::apply_jump,
                    systems::apply_gravity,
                    systems::update_facing,
                )
                    .chain()
                    .in_set(PlayerSystems::Locomotion),
            );
    }
}

pub const PLAYER_WIDTH: f32 = 24.0;
pub const PLAYER_HEIGHT: f32 = 48.0;

fn spawn_player(mut commands: Commands, tuning: Res<MovementTuning>) {
    commands.spawn((
        Player,
        MovementState {
            air_jumps_remaining: tuning.max_air_jumps,
            ..default()
        },
        Sprite {
            color: Color::srgb(0.9, 0.9, 0.9),
            custom_size: Some(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(0.0, 100.0, 0.0),
        (
            RigidBody::Dynamic,
            Collider::rectangle(PLAYER_WIDTH, PLAYER_HEIGHT),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            GravityScale(0.0), // Gravity is applied manually for more control
            Friction::new(0.0),
            CollisionLayers::new(GameLayer::Player, [GameLayer::Ground, GameLayer::Wall]),
        ),
    ));
}
