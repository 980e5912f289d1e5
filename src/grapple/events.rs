//! Grapple domain: messages for collaborators (animation, audio, damage).

use bevy::ecs::message::Message;
use bevy::prelude::*;

/// The hook left the character
#[derive(Debug)]
pub struct HookFiredEvent {
    pub origin: Vec2,
    pub aim: Vec2,
    pub had_target: bool,
}

impl Message for HookFiredEvent {}

/// The hook latched onto a surface
#[derive(Debug)]
pub struct HookAttachedEvent {
    pub anchor: Vec2,
}

impl Message for HookAttachedEvent {}

/// The hook came back without hitting anything
#[derive(Debug)]
pub struct HookMissedEvent;

impl Message for HookMissedEvent {}

/// The grapple ended and control is returning to the player
#[derive(Debug)]
pub struct GrappleReleasedEvent {
    pub exit_velocity: Vec2,
}

impl Message for GrappleReleasedEvent {}

/// External systems (knockback, explosions) inject impulses here; they only
/// take effect while swinging.
#[derive(Debug)]
pub struct GrappleImpulseEvent {
    pub impulse: Vec2,
    pub origin: Vec2,
}

impl Message for GrappleImpulseEvent {}

/// Unconditional, idempotent stop from any phase (death, ability disabled).
#[derive(Debug)]
pub struct GrappleForceStopEvent;

impl Message for GrappleForceStopEvent {}
