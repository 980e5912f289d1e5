//! Grapple domain: components.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::resources::GrappleTuning;
use super::sim::{FlightState, SwingState};

/// Mutually exclusive grapple phases. Exactly one is active; transitions are
/// explicit assignments in the phase-driver systems, never implicit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GrapplePhase {
    #[default]
    Idle,
    Firing(FlightState),
    Retracting {
        hook_pos: Vec2,
        velocity_on_hook: Vec2,
    },
    Pulling {
        anchor: Vec2,
        velocity_on_hook: Vec2,
    },
    Swinging(SwingState),
}

/// The grapple ability, one per character.
#[derive(Component, Debug, Default)]
pub struct GrappleState {
    pub phase: GrapplePhase,
}

impl GrappleState {
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, GrapplePhase::Idle)
    }

    pub fn is_firing(&self) -> bool {
        matches!(self.phase, GrapplePhase::Firing(_))
    }

    pub fn is_retracting(&self) -> bool {
        matches!(self.phase, GrapplePhase::Retracting { .. })
    }

    pub fn is_pulling(&self) -> bool {
        matches!(self.phase, GrapplePhase::Pulling { .. })
    }

    pub fn is_swinging(&self) -> bool {
        matches!(self.phase, GrapplePhase::Swinging(_))
    }

    /// The anchor the rope is attached to, while one exists.
    pub fn anchor(&self) -> Option<Vec2> {
        match &self.phase {
            GrapplePhase::Pulling { anchor, .. } => Some(*anchor),
            GrapplePhase::Swinging(swing) => Some(swing.anchor),
            _ => None,
        }
    }

    /// Convert an external impulse (knockback, explosion) into an angular
    /// velocity change so it bends the pendulum instead of fighting the
    /// position-authoritative swing. Returns false when not swinging, which
    /// callers must treat as a normal outcome.
    pub fn apply_external_impulse(
        &mut self,
        impulse: Vec2,
        _origin: Vec2,
        tuning: &GrappleTuning,
    ) -> bool {
        let GrapplePhase::Swinging(swing) = &mut self.phase else {
            return false;
        };
        let delta = impulse.dot(swing.tangent()) / swing.rope_length;
        swing.angular_velocity = (swing.angular_velocity + delta)
            .clamp(-tuning.max_angular_velocity, tuning.max_angular_velocity);
        true
    }
}

/// Trailing post-release state: captured exit momentum blended with live
/// steering over a bounded window. May coexist only with the Idle phase.
#[derive(Component, Debug, Clone, Copy)]
pub struct ExitState {
    pub velocity: Vec2,
    pub elapsed: f32,
    pub blend_window: f32,
}

impl ExitState {
    pub fn new(velocity: Vec2, blend_window: f32) -> Self {
        Self {
            velocity,
            elapsed: 0.0,
            blend_window,
        }
    }

    /// Weight of the captured momentum, 1 at release decaying to 0.
    pub fn momentum_weight(&self) -> f32 {
        if self.blend_window <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed / self.blend_window).clamp(0.0, 1.0)
    }
}

/// Records the motion-controller state the grapple suspends so every exit
/// path (release, miss, forced stop) restores it exactly once. The lease is
/// removed from the entity on restore; a second stop finds nothing to undo.
#[derive(Component, Debug)]
pub struct AbilityLease {
    pub prior_body: RigidBody,
    pub prior_layers: CollisionLayers,
}

/// Marker for the hook-tip sprite.
#[derive(Component, Debug)]
pub struct HookVisual;

/// Fading ghost sprite left behind by fast swings and boosts.
#[derive(Component, Debug)]
pub struct Afterimage {
    pub life: f32,
    pub max_life: f32,
}

/// Short-lived impact-feedback particle.
#[derive(Component, Debug)]
pub struct BurstParticle {
    pub velocity: Vec2,
    pub life: f32,
}
