//! Movement domain: locomotion systems for timers and physics.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{
    Facing, MotionOverride, MovementInput, MovementState, MovementTuning, Player,
};

pub(crate) fn update_timers(
    time: Res<Time>,
    mut query: Query<&mut MovementState, With<Player>>,
) {
    let dt = time.delta_secs();

    for mut state in &mut query {
        // Coyote time: starts counting when leaving ground
        if !state.on_ground {
            state.coyote_timer += dt;
        }

        // Jump buffer: counts down after pressing jump
        if state.jump_buffer_timer > 0.0 {
            state.jump_buffer_timer -= dt;
        }
    }
}

pub(crate) fn apply_horizontal_movement(
    time: Res<Time>,
    input: Res<MovementInput>,
    tuning: Res<MovementTuning>,
    mut query: Query<&mut LinearVelocity, (With<Player>, Without<MotionOverride>)>,
) {
    let dt = time.delta_secs();

    for mut velocity in &mut query {
        let target_vx = input.axis.x * tuning.max_speed;

        if input.axis.x.abs() > 0.1 {
            // Accelerate toward target
            let accel = tuning.accel * dt;
            if velocity.x < target_vx {
                velocity.x = (velocity.x + accel).min(target_vx);
            } else {
                velocity.x = (velocity.x - accel).max(target_vx);
            }
        } else {
            // Decelerate to zero
            let decel = tuning.decel * dt;
            if velocity.x > 0.0 {
                velocity.x = (velocity.x - decel).max(0.0);
            } else {
                velocity.x = (velocity.x + decel).min(0.0);
            }
        }
    }
}

pub(crate) fn apply_jump(
    input: Res<MovementInput>,
    tuning: Res<MovementTuning>,
    mut query: Query<
        (&mut MovementState, &mut LinearVelocity),
        (With<Player>, Without<MotionOverride>),
    >,
) {
    for (mut state, mut velocity) in &mut query {
        // Buffer jump input
        if input.jump_just_pressed {
            state.jump_buffer_timer = tuning.jump_buffer_time;
        }

        let wants_jump = state.jump_buffer_timer > 0.0;
        let can_ground_jump = state.on_ground || state.coyote_timer < tuning.coyote_time;
        let can_air_jump = !state.on_ground && state.air_jumps_remaining > 0;

        if wants_jump {
            if can_ground_jump {
                velocity.y = tuning.jump_velocity;
                state.jump_buffer_timer = 0.0;
                state.coyote_timer = tuning.coyote_time; // Consume coyote time
                debug!(
                    "Ground jump: air_jumps_remaining={}",
                    state.air_jumps_remaining
                );
            } else if can_air_jump {
                velocity.y = tuning.jump_velocity;
                state.jump_buffer_timer = 0.0;
                state.air_jumps_remaining -= 1;
                debug!(
                    "Air jump: air_jumps_remaining now {}",
                    state.air_jumps_remaining
                );
            }
        }

        // Variable jump height - cut velocity when releasing jump
        if !input.jump_held && velocity.y > 0.0 && !state.on_ground {
            velocity.y *= 0.5;
        }
    }
}

pub(crate) fn apply_gravity(
    time: Res<Time>,
    tuning: Res<MovementTuning>,
    mut query: Query<&mut LinearVelocity, (With<Player>, Without<MotionOverride>)>,
) {
    let dt = time.delta_secs();

    for mut velocity in &mut query {
        velocity.y -= tuning.gravity * dt;
    }
}

pub(crate) fn update_facing(
    input: Res<MovementInput>,
    mut query: Query<&mut MovementState, (With<Player>, Without<MotionOverride>)>,
) {
    for mut state in &mut query {
        if input.axis.x > 0.1 {
            state.facing = Facing::Right;
        } else if input.axis.x < -0.1 {
            state.facing = Facing::Left;
        }
    }
}
