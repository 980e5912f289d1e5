//! Grapple domain: system modules driving the simulation core.

pub(crate) mod exit;
pub(crate) mod feedback;
pub(crate) mod hook;
pub(crate) mod input;
pub(crate) mod swing;

pub(crate) use exit::blend_exit_momentum;
pub(crate) use feedback::{
    spawn_impact_bursts, update_afterimages, update_burst_particles, update_hook_visual,
};
pub(crate) use hook::{drive_hook_flight, drive_hook_retract, fire_hook};
pub(crate) use input::read_grapple_input;
pub(crate) use swing::{
    apply_external_impulses, drive_pull, drive_swing, handle_force_stop, handle_release,
};

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::grapple::components::{AbilityLease, GrapplePhase, GrappleState};
use crate::movement::{MotionOverride, MovementState};

/// The one path every grapple teardown goes through: release, miss, forced
/// stop. Restores the leased motion-controller state exactly once (the lease
/// component is removed, so a second stop finds nothing to undo) and grants
/// the post-grapple air jump.
pub(crate) fn end_grapple(
    commands: &mut Commands,
    entity: Entity,
    state: &mut GrappleState,
    movement: &mut MovementState,
    lease: Option<&AbilityLease>,
    layers: &mut CollisionLayers,
) {
    if state.is_idle() && lease.is_none() {
        return;
    }

    if let Some(lease) = lease {
        *layers = lease.prior_layers;
        // RigidBody is an immutable component; the restore goes through
        // commands like the insert that took it.
        commands
            .entity(entity)
            .insert(lease.prior_body)
            .remove::<(AbilityLease, MotionOverride)>();
    }

    if !state.is_idle() {
        // Grappling always grants at least one air jump back
        movement.air_jumps_remaining = movement.air_jumps_remaining.max(1);
        debug!("Grapple ended from {:?}", std::mem::discriminant(&state.phase));
    }
    state.phase = GrapplePhase::Idle;
}
