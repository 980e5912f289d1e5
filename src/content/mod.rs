//! Content domain: RON tuning overrides loaded at startup.

mod loader;

pub use loader::{ContentLoadError, load_tuning_file};

use bevy::prelude::*;
use std::path::Path;

use crate::grapple::GrappleTuning;
use crate::movement::MovementTuning;

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_tuning_overrides);
    }
}

/// Overwrite the built-in tuning defaults with whatever RON files are
/// present under assets/data. Missing or malformed files keep the defaults.
fn load_tuning_overrides(
    mut grapple: ResMut<GrappleTuning>,
    mut movement: ResMut<MovementTuning>,
) {
    match load_tuning_file::<GrappleTuning>(Path::new("assets/data/grapple_tuning.ron")) {
        Ok(tuning) => {
            info!("Loaded grapple tuning overrides");
            *grapple = tuning;
        }
        Err(e) => warn!("{e}; using default grapple tuning"),
    }

    match load_tuning_file::<MovementTuning>(Path::new("assets/data/movement_tuning.ron")) {
        Ok(tuning) => {
            info!("Loaded movement tuning overrides");
            *movement = tuning;
        }
        Err(e) => warn!("{e}; using default movement tuning"),
    }
}
