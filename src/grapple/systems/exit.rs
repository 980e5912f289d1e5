//! Grapple domain: post-release momentum blending.
//!
//! For a short window after release the player cannot instantly override the
//! swing-out trajectory: horizontal velocity is a blend of the decaying
//! captured exit momentum, whatever the controller is currently doing, and
//! live steering whose weight grows as the momentum weight decays.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::grapple::components::ExitState;
use crate::grapple::sim;
use crate::movement::{MovementInput, MovementState, MovementTuning, Player};

pub(crate) fn blend_exit_momentum(
    mut commands: Commands,
    time: Res<Time>,
    move_input: Res<MovementInput>,
    move_tuning: Res<MovementTuning>,
    mut query: Query<
        (Entity, &mut ExitState, &mut LinearVelocity, &MovementState),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();

    for (entity, mut exit, mut velocity, movement) in &mut query {
        exit.elapsed += dt;

        // Window elapsed or touched down: full control returns immediately
        if exit.elapsed >= exit.blend_window || movement.on_ground {
            commands.entity(entity).remove::<ExitState>();
            continue;
        }

        let steer_vx = move_input.axis.x * move_tuning.max_speed;
        velocity.x = sim::exit_blend_horizontal(
            exit.velocity.x,
            exit.momentum_weight(),
            velocity.x,
            steer_vx,
        );
    }
}
