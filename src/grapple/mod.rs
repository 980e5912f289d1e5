//! Grapple domain: the swing ability.
//!
//! Fire a hook, attach to a surface, swing as a point mass on a rigid rope,
//! optionally boost or quick-retract, release with a computed exit velocity
//! that blends into free-fall control. While any phase other than Idle is
//! active the ability holds exclusive authority over the player body via
//! [`crate::movement::MotionOverride`] and an [`AbilityLease`] that is
//! restored exactly once on every exit path.

mod components;
mod events;
mod probe;
mod resources;
mod sim;
mod systems;

#[cfg(test)]
mod tests;

pub use components::{AbilityLease, ExitState, GrapplePhase, GrappleState};
pub use events::{
    GrappleForceStopEvent, GrappleImpulseEvent, GrappleReleasedEvent, HookAttachedEvent,
    HookFiredEvent, HookMissedEvent,
};
pub use probe::{CollisionProbe, ProbeHit};
pub use resources::{FeedbackRng, GrappleInput, GrappleTuning};

use bevy::prelude::*;

use crate::movement::{Player, PlayerSystems};
use systems::feedback::AfterimageTimer;

pub struct GrapplePlugin;

impl Plugin for GrapplePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GrappleTuning>()
            .init_resource::<GrappleInput>()
            .init_resource::<FeedbackRng>()
            .init_resource::<AfterimageTimer>()
            .add_message::<HookFiredEvent>()
            .add_message::<HookAttachedEvent>()
            .add_message::<HookMissedEvent>()
            .add_message::<GrappleReleasedEvent>()
            .add_message::<GrappleImpulseEvent>()
            .add_message::<GrappleForceStopEvent>()
            .add_systems(
                Update,
                systems::read_grapple_input.in_set(PlayerSystems::Input),
            )
            .add_systems(
                Update,
                (
                    attach_grapple_ability,
                    systems::handle_force_stop,
                    systems::handle_release,
                    systems::apply_external_impulses,
                    systems::fire_hook,
                    systems::drive_hook_flight,
                    systems::drive_hook_retract,
                    systems::drive_pull,
                    systems::drive_swing,
                    systems::blend_exit_momentum,
                )
                    .chain()
                    .in_set(PlayerSystems::Abilities),
            )
            .add_systems(
                Update,
                (
                    systems::update_hook_visual,
                    systems::spawn_impact_bursts,
                    systems::update_afterimages,
                    systems::update_burst_particles,
                )
                    .in_set(PlayerSystems::Feedback),
            );
    }
}

/// Give the ability to any player body that doesn't carry it yet.
fn attach_grapple_ability(
    mut commands: Commands,
    query: Query<Entity, (With<Player>, Without<GrappleState>)>,
) {
    for entity in &query {
        commands.entity(entity).insert(GrappleState::default());
    }
}
