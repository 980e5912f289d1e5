//! Debug overlay for fast iteration (dev-tools feature).
//!
//! F3 toggles a readout of the grapple phase, rope length, angular velocity,
//! and contact flags. F4 fires a force-stop, which doubles as a manual check
//! that every exit path restores the controller.

use avian2d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::grapple::{ExitState, GrapplePhase, GrappleForceStopEvent, GrappleState};
use crate::movement::{MovementState, Player};

/// Marker for the debug overlay text
#[derive(Component, Debug)]
pub struct DebugOverlay;

#[derive(Resource, Debug, Default)]
pub struct DebugVisible(pub bool);

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugVisible>()
            .add_systems(Startup, spawn_overlay)
            .add_systems(Update, (toggle_overlay, debug_force_stop, update_overlay));
    }
}

fn spawn_overlay(mut commands: Commands) {
    commands.spawn((
        DebugOverlay,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(12.0),
            ..default()
        },
        Visibility::Hidden,
        ZIndex(500),
    ));
}

fn toggle_overlay(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut visible: ResMut<DebugVisible>,
    mut overlay: Query<&mut Visibility, With<DebugOverlay>>,
) {
    if keyboard.just_pressed(KeyCode::F3) {
        visible.0 = !visible.0;
        for mut vis in &mut overlay {
            *vis = if visible.0 {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
    }
}

fn debug_force_stop(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut stops: MessageWriter<GrappleForceStopEvent>,
) {
    if keyboard.just_pressed(KeyCode::F4) {
        info!("Debug: force-stopping grapple");
        stops.write(GrappleForceStopEvent);
    }
}

fn update_overlay(
    visible: Res<DebugVisible>,
    player: Query<
        (
            &Transform,
            &LinearVelocity,
            &MovementState,
            &GrappleState,
            Option<&ExitState>,
        ),
        With<Player>,
    >,
    mut overlay: Query<&mut Text, With<DebugOverlay>>,
) {
    if !visible.0 {
        return;
    }
    let Ok((transform, velocity, movement, grapple, exit)) = player.single() else {
        return;
    };
    let Ok(mut text) = overlay.single_mut() else {
        return;
    };

    let phase = match &grapple.phase {
        GrapplePhase::Idle => "Idle".to_string(),
        GrapplePhase::Firing(f) => format!(
            "Firing (tip={:.0},{:.0} valid={})",
            f.hook_pos.x, f.hook_pos.y, f.has_valid_target
        ),
        GrapplePhase::Retracting { hook_pos, .. } => {
            format!("Retracting (tip={:.0},{:.0})", hook_pos.x, hook_pos.y)
        }
        GrapplePhase::Pulling { anchor, .. } => {
            format!("Pulling (anchor={:.0},{:.0})", anchor.x, anchor.y)
        }
        GrapplePhase::Swinging(s) => format!(
            "Swinging (rope={:.1} angle={:.2} omega={:.2} retract_bank={:.0})",
            s.rope_length, s.angle, s.angular_velocity, s.quick_retract_speed
        ),
    };

    text.0 = format!(
        "pos: {:.0},{:.0}\nvel: {:.0},{:.0}\nphase: {}\nexiting: {}\nground: {} wall: {:?} air_jumps: {}",
        transform.translation.x,
        transform.translation.y,
        velocity.x,
        velocity.y,
        phase,
        exit.is_some(),
        movement.on_ground,
        movement.on_wall,
        movement.air_jumps_remaining,
    );
}
