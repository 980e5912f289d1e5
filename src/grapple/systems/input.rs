//! Grapple domain: input sampling.
//!
//! Hold-to-grapple: the hook stays out while the fire button is held and
//! releases the moment it isn't. Boost shares the jump button (jumping is
//! suspended while grappling anyway) and quick-retract is "up".

use bevy::prelude::*;

use crate::grapple::resources::GrappleInput;

pub(crate) fn read_grapple_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut input: ResMut<GrappleInput>,
) {
    input.fire_just_pressed =
        keyboard.just_pressed(KeyCode::KeyL) || mouse.just_pressed(MouseButton::Right);
    input.fire_held = keyboard.pressed(KeyCode::KeyL) || mouse.pressed(MouseButton::Right);
    input.boost_held = keyboard.pressed(KeyCode::Space) || keyboard.pressed(KeyCode::KeyK);
    input.retract_held = keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp);
}
