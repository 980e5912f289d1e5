//! Grapple domain: pull-in, the swing itself, release, and forced stop.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::grapple::components::{
    AbilityLease, Afterimage, ExitState, GrapplePhase, GrappleState,
};
use crate::grapple::events::{GrappleForceStopEvent, GrappleImpulseEvent, GrappleReleasedEvent};
use crate::grapple::probe::SpatialProbe;
use crate::grapple::resources::{GrappleInput, GrappleTuning};
use crate::grapple::sim::{self, PullOutcome, SwingCommand};
use crate::grapple::systems::end_grapple;
use crate::grapple::systems::hook::grapple_filter;
use crate::movement::{MovementInput, MovementState, Player};

pub(crate) fn drive_pull(
    time: Res<Time>,
    tuning: Res<GrappleTuning>,
    mut query: Query<
        (
            &mut Transform,
            &mut GrappleState,
            &mut CollisionLayers,
            Option<&AbilityLease>,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();

    for (mut transform, mut state, mut layers, lease) in &mut query {
        let GrapplePhase::Pulling {
            anchor,
            velocity_on_hook,
        } = state.phase
        else {
            continue;
        };

        let position = transform.translation.truncate();
        match sim::pull_step(position, anchor, dt, &tuning) {
            PullOutcome::Moving(new_pos) => {
                transform.translation.x = new_pos.x;
                transform.translation.y = new_pos.y;
            }
            PullOutcome::WithinRange(new_pos) => {
                transform.translation.x = new_pos.x;
                transform.translation.y = new_pos.y;

                // Back within swing radius: collision resolution comes back on.
                if let Some(lease) = lease {
                    *layers = lease.prior_layers;
                }
                let swing = sim::swing_setup(new_pos, anchor, velocity_on_hook, &tuning);
                debug!("Pull-in complete, swinging: rope={:.1}", swing.rope_length);
                state.phase = GrapplePhase::Swinging(swing);
            }
        }
    }
}

pub(crate) fn drive_swing(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<GrappleTuning>,
    input: Res<GrappleInput>,
    move_input: Res<MovementInput>,
    spatial_query: SpatialQuery,
    mut query: Query<
        (
            &mut Transform,
            &Sprite,
            &Collider,
            &mut GrappleState,
            &mut LinearVelocity,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    let probe = SpatialProbe::new(&spatial_query, grapple_filter());

    for (mut transform, sprite, collider, mut state, mut velocity) in &mut query {
        let GrapplePhase::Swinging(ref mut swing) = state.phase else {
            continue;
        };

        let half_extents = match collider.shape_scaled().as_cuboid() {
            Some(c) => Vec2::new(c.half_extents.x, c.half_extents.y),
            None => Vec2::new(12.0, 24.0),
        };
        let command = SwingCommand {
            steer_x: move_input.axis.x,
            boost_held: input.boost_held,
            retract_held: input.retract_held,
        };

        let result = sim::swing_step(&probe, swing, command, half_extents, dt, &tuning);

        // The integrator is the sole authority over position while swinging.
        transform.translation.x = result.position.x;
        transform.translation.y = result.position.y;
        velocity.0 = Vec2::ZERO;

        if result.boost_fired {
            spawn_boost_ghost(&mut commands, sprite, result.position);
        }
    }
}

fn spawn_boost_ghost(commands: &mut Commands, sprite: &Sprite, position: Vec2) {
    commands.spawn((
        Afterimage {
            life: 0.25,
            max_life: 0.25,
        },
        Sprite {
            color: sprite.color.with_alpha(0.5),
            custom_size: sprite.custom_size,
            ..default()
        },
        Transform::from_translation(position.extend(-1.0)),
    ));
}

pub(crate) fn handle_release(
    mut commands: Commands,
    input: Res<GrappleInput>,
    tuning: Res<GrappleTuning>,
    mut released: MessageWriter<GrappleReleasedEvent>,
    mut query: Query<
        (
            Entity,
            &Transform,
            &mut GrappleState,
            &mut MovementState,
            &mut LinearVelocity,
            &mut CollisionLayers,
            Option<&AbilityLease>,
        ),
        With<Player>,
    >,
) {
    if input.fire_held {
        return;
    }

    for (entity, transform, mut state, mut movement, mut velocity, mut layers, lease) in &mut query
    {
        if state.is_idle() {
            continue;
        }

        let position = transform.translation.truncate();
        match state.phase {
            GrapplePhase::Swinging(swing) => {
                let exit = sim::release_velocity(&swing, position, &tuning);
                end_grapple(
                    &mut commands,
                    entity,
                    &mut state,
                    &mut movement,
                    lease,
                    &mut layers,
                );
                velocity.0 = exit;
                commands
                    .entity(entity)
                    .insert(ExitState::new(exit, tuning.exit_blend_window()));
                debug!("Released swing: exit velocity {:?}", exit);
                released.write(GrappleReleasedEvent { exit_velocity: exit });
            }
            GrapplePhase::Pulling { anchor, .. } => {
                let exit = sim::pull_release_velocity(position, anchor, &tuning);
                end_grapple(
                    &mut commands,
                    entity,
                    &mut state,
                    &mut movement,
                    lease,
                    &mut layers,
                );
                velocity.0 = exit;
                commands
                    .entity(entity)
                    .insert(ExitState::new(exit, tuning.exit_blend_window()));
                debug!("Released during pull-in: exit velocity {:?}", exit);
                released.write(GrappleReleasedEvent { exit_velocity: exit });
            }
            GrapplePhase::Firing(flight) => {
                // Mid-flight cancel: no swing velocity imparted, just keep
                // the momentum the character already had.
                end_grapple(
                    &mut commands,
                    entity,
                    &mut state,
                    &mut movement,
                    lease,
                    &mut layers,
                );
                velocity.0 = flight.velocity_on_hook;
                released.write(GrappleReleasedEvent {
                    exit_velocity: flight.velocity_on_hook,
                });
            }
            GrapplePhase::Retracting {
                velocity_on_hook, ..
            } => {
                end_grapple(
                    &mut commands,
                    entity,
                    &mut state,
                    &mut movement,
                    lease,
                    &mut layers,
                );
                velocity.0 = velocity_on_hook;
                released.write(GrappleReleasedEvent {
                    exit_velocity: velocity_on_hook,
                });
            }
            GrapplePhase::Idle => {}
        }
    }
}

/// Unconditional stop from any phase. Safe to fire redundantly: the second
/// pass finds an idle state with no lease and does nothing.
pub(crate) fn handle_force_stop(
    mut commands: Commands,
    mut stops: MessageReader<GrappleForceStopEvent>,
    mut query: Query<
        (
            Entity,
            &mut GrappleState,
            &mut MovementState,
            &mut CollisionLayers,
            Option<&AbilityLease>,
        ),
        With<Player>,
    >,
) {
    if stops.is_empty() {
        return;
    }
    stops.clear();

    for (entity, mut state, mut movement, mut layers, lease) in &mut query {
        end_grapple(
            &mut commands,
            entity,
            &mut state,
            &mut movement,
            lease,
            &mut layers,
        );
        commands.entity(entity).remove::<ExitState>();
    }
}

pub(crate) fn apply_external_impulses(
    tuning: Res<GrappleTuning>,
    mut impulses: MessageReader<GrappleImpulseEvent>,
    mut query: Query<&mut GrappleState, With<Player>>,
) {
    for event in impulses.read() {
        for mut state in &mut query {
            if !state.apply_external_impulse(event.impulse, event.origin, &tuning) {
                debug!("External impulse ignored: not swinging");
            }
        }
    }
}
