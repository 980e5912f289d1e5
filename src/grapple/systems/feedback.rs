//! Grapple domain: hook-tip visual, afterimage trail, impact bursts.

use std::f32::consts::TAU;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use rand::Rng;

use crate::grapple::components::{Afterimage, BurstParticle, GrapplePhase, GrappleState, HookVisual};
use crate::grapple::events::{HookAttachedEvent, HookMissedEvent};
use crate::grapple::resources::FeedbackRng;
use crate::movement::Player;

/// Tangential speed above which the swing leaves a ghost trail.
const TRAIL_SPEED_THRESHOLD: f32 = 400.0;
const TRAIL_INTERVAL: f32 = 0.06;

#[derive(Resource, Debug, Default)]
pub struct AfterimageTimer(pub f32);

pub(crate) fn update_hook_visual(
    mut commands: Commands,
    player: Query<&GrappleState, With<Player>>,
    mut visuals: Query<(Entity, &mut Transform), With<HookVisual>>,
) {
    let Ok(state) = player.single() else {
        return;
    };

    let tip = match &state.phase {
        GrapplePhase::Firing(flight) => Some(flight.hook_pos),
        GrapplePhase::Retracting { hook_pos, .. } => Some(*hook_pos),
        GrapplePhase::Pulling { anchor, .. } => Some(*anchor),
        GrapplePhase::Swinging(swing) => Some(swing.anchor),
        GrapplePhase::Idle => None,
    };

    for (entity, mut transform) in &mut visuals {
        match tip {
            Some(pos) => {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
            }
            None => commands.entity(entity).despawn(),
        }
    }
}

pub(crate) fn update_afterimages(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: ResMut<AfterimageTimer>,
    player: Query<(&GrappleState, &Transform, &Sprite), With<Player>>,
    mut ghosts: Query<(Entity, &mut Afterimage, &mut Sprite), Without<Player>>,
) {
    let dt = time.delta_secs();

    // Trail while swinging fast
    if let Ok((state, transform, sprite)) = player.single() {
        let fast = match &state.phase {
            GrapplePhase::Swinging(swing) => {
                (swing.angular_velocity * swing.rope_length).abs() > TRAIL_SPEED_THRESHOLD
            }
            _ => false,
        };
        if fast {
            timer.0 -= dt;
            if timer.0 <= 0.0 {
                timer.0 = TRAIL_INTERVAL;
                commands.spawn((
                    Afterimage {
                        life: 0.25,
                        max_life: 0.25,
                    },
                    Sprite {
                        color: sprite.color.with_alpha(0.4),
                        custom_size: sprite.custom_size,
                        ..default()
                    },
                    Transform::from_translation(
                        transform.translation.truncate().extend(-1.0),
                    ),
                ));
            }
        } else {
            timer.0 = 0.0;
        }
    }

    for (entity, mut ghost, mut sprite) in &mut ghosts {
        ghost.life -= dt;
        if ghost.life <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        let alpha = 0.4 * (ghost.life / ghost.max_life);
        sprite.color = sprite.color.with_alpha(alpha);
    }
}

pub(crate) fn spawn_impact_bursts(
    mut commands: Commands,
    mut rng: ResMut<FeedbackRng>,
    mut attached: MessageReader<HookAttachedEvent>,
    mut missed: MessageReader<HookMissedEvent>,
    player: Query<&Transform, With<Player>>,
) {
    let mut bursts: Vec<(Vec2, Color)> = Vec::new();

    for event in attached.read() {
        bursts.push((event.anchor, Color::srgb(1.0, 0.85, 0.3)));
    }
    // Miss feedback pops at the character, where the hook just came back
    if !missed.is_empty() {
        missed.clear();
        if let Ok(transform) = player.single() {
            bursts.push((transform.translation.truncate(), Color::srgb(0.6, 0.6, 0.7)));
        }
    }

    for (origin, color) in bursts {
        for _ in 0..12 {
            let angle = rng.0.random_range(0.0..TAU);
            let speed = rng.0.random_range(120.0..320.0);
            commands.spawn((
                BurstParticle {
                    velocity: Vec2::from_angle(angle) * speed,
                    life: 0.35,
                },
                Sprite {
                    color,
                    custom_size: Some(Vec2::splat(3.0)),
                    ..default()
                },
                Transform::from_translation(origin.extend(6.0)),
            ));
        }
    }
}

pub(crate) fn update_burst_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut BurstParticle, &mut Transform, &mut Sprite)>,
) {
    let dt = time.delta_secs();

    for (entity, mut particle, mut transform, mut sprite) in &mut particles {
        particle.life -= dt;
        if particle.life <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        particle.velocity.y -= 600.0 * dt;
        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;
        sprite.color = sprite.color.with_alpha(particle.life / 0.35);
    }
}
