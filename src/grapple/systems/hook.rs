//! Grapple domain: firing, hook flight, and retraction.

use avian2d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::grapple::components::{
    AbilityLease, ExitState, GrapplePhase, GrappleState, HookVisual,
};
use crate::grapple::events::{HookAttachedEvent, HookFiredEvent, HookMissedEvent};
use crate::grapple::probe::SpatialProbe;
use crate::grapple::resources::{GrappleInput, GrappleTuning};
use crate::grapple::sim::{self, FlightOutcome, FlightState};
use crate::grapple::systems::end_grapple;
use crate::movement::{GameLayer, MotionOverride, MovementInput, MovementState, Player};

/// Layers a hook can attach to and a swing collides with.
pub(crate) fn grapple_filter() -> SpatialQueryFilter {
    SpatialQueryFilter::from_mask([GameLayer::Ground, GameLayer::Wall])
}

pub(crate) fn fire_hook(
    mut commands: Commands,
    input: Res<GrappleInput>,
    move_input: Res<MovementInput>,
    tuning: Res<GrappleTuning>,
    spatial_query: SpatialQuery,
    mut fired: MessageWriter<HookFiredEvent>,
    mut query: Query<
        (
            Entity,
            &Transform,
            &LinearVelocity,
            &MovementState,
            &RigidBody,
            &CollisionLayers,
            &mut GrappleState,
        ),
        With<Player>,
    >,
) {
    if !input.fire_just_pressed {
        return;
    }

    for (entity, transform, velocity, movement, body, layers, mut state) in &mut query {
        if !state.is_idle() {
            continue;
        }

        let origin = transform.translation.truncate();
        let aim = if move_input.axis.length_squared() > 0.01 {
            move_input.axis.normalize()
        } else {
            // No aim input: 45 degrees up toward facing
            Vec2::new(movement.facing.sign(), 1.0).normalize()
        };

        let probe = SpatialProbe::new(&spatial_query, grapple_filter());
        let anchor = sim::find_anchor(&probe, origin, aim, &tuning);
        let target = anchor.unwrap_or(origin + aim * tuning.max_grapple_distance);

        state.phase = GrapplePhase::Firing(FlightState {
            hook_pos: origin,
            hook_target: target,
            has_valid_target: anchor.is_some(),
            velocity_on_hook: velocity.0,
        });

        // Claim the body: locomotion backs off until the lease is released.
        // A re-fire inside the previous release's blend window also drops the
        // stale exit state, so the old momentum blend cannot touch this hook's
        // captured velocity.
        commands
            .entity(entity)
            .insert((
                MotionOverride,
                AbilityLease {
                    prior_body: *body,
                    prior_layers: *layers,
                },
            ))
            .remove::<ExitState>();

        commands.spawn((
            HookVisual,
            Sprite {
                color: Color::srgb(1.0, 0.85, 0.3),
                custom_size: Some(Vec2::splat(8.0)),
                ..default()
            },
            Transform::from_translation(origin.extend(5.0)),
        ));

        debug!("Hook fired: aim={:?}, target={:?}, valid={}", aim, target, anchor.is_some());
        fired.write(HookFiredEvent {
            origin,
            aim,
            had_target: anchor.is_some(),
        });
    }
}

pub(crate) fn drive_hook_flight(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<GrappleTuning>,
    spatial_query: SpatialQuery,
    mut attached: MessageWriter<HookAttachedEvent>,
    mut query: Query<
        (Entity, &Transform, &mut GrappleState, &mut LinearVelocity),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    let probe = SpatialProbe::new(&spatial_query, grapple_filter());

    for (entity, transform, mut state, mut velocity) in &mut query {
        let GrapplePhase::Firing(mut flight) = state.phase else {
            continue;
        };

        // Re-assert the captured momentum every frame so nothing else can
        // zero it out mid-flight.
        velocity.0 = flight.velocity_on_hook;

        match sim::advance_hook(&probe, &mut flight, dt, &tuning) {
            FlightOutcome::InFlight => {
                state.phase = GrapplePhase::Firing(flight);
            }
            FlightOutcome::Arrived { valid: false } => {
                state.phase = GrapplePhase::Retracting {
                    hook_pos: flight.hook_pos,
                    velocity_on_hook: flight.velocity_on_hook,
                };
            }
            FlightOutcome::Arrived { valid: true } => {
                let anchor = flight.hook_target;
                let position = transform.translation.truncate();
                attached.write(HookAttachedEvent { anchor });

                // The grapple is position-authoritative from here on. Applied
                // through commands: SpatialQuery already borrows the collider
                // component set this touches.
                commands.entity(entity).insert(RigidBody::Kinematic);
                velocity.0 = Vec2::ZERO;

                if position.distance(anchor) > tuning.max_swing_rope_length {
                    // Too far to swing: close the distance first, with the
                    // controller's collision resolution suspended.
                    commands.entity(entity).insert(CollisionLayers::NONE);
                    state.phase = GrapplePhase::Pulling {
                        anchor,
                        velocity_on_hook: flight.velocity_on_hook,
                    };
                    debug!("Hook attached at {:?}, pulling in", anchor);
                } else {
                    let swing =
                        sim::swing_setup(position, anchor, flight.velocity_on_hook, &tuning);
                    debug!(
                        "Hook attached at {:?}, swinging: rope={:.1}, omega={:.2}",
                        anchor, swing.rope_length, swing.angular_velocity
                    );
                    state.phase = GrapplePhase::Swinging(swing);
                }
            }
        }
    }
}

pub(crate) fn drive_hook_retract(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<GrappleTuning>,
    mut missed: MessageWriter<HookMissedEvent>,
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
    let dt = time.delta_secs();

    for (entity, transform, mut state, mut movement, mut velocity, mut layers, lease) in &mut query
    {
        let GrapplePhase::Retracting {
            mut hook_pos,
            velocity_on_hook,
        } = state.phase
        else {
            continue;
        };

        velocity.0 = velocity_on_hook;

        let character = transform.translation.truncate();
        if sim::retract_hook(&mut hook_pos, character, dt, &tuning) {
            debug!("Hook retracted without a target");
            missed.write(HookMissedEvent);
            end_grapple(
                &mut commands,
                entity,
                &mut state,
                &mut movement,
                lease,
                &mut layers,
            );
        } else {
            state.phase = GrapplePhase::Retracting {
                hook_pos,
                velocity_on_hook,
            };
        }
    }
}
