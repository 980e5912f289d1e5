//! Grapple domain: tuning and input resources.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use serde::{Deserialize, Serialize};

/// Every knob of the grapple ability. Defaults are hand-tuned for the
/// sandbox's pixel scale (player is 24x48 units); `assets/data/
/// grapple_tuning.ron` can override the whole set.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GrappleTuning {
    // Targeting
    pub max_grapple_distance: f32,
    /// Half-angle of the search cone, radians
    pub search_half_angle: f32,
    /// Number of rays across the cone; forced odd so one ray is dead-center
    pub search_ray_count: u32,
    pub angle_score_weight: f32,
    pub distance_score_weight: f32,

    // Hook flight
    pub hook_travel_speed: f32,
    pub hook_retract_speed: f32,
    /// Extra distance past this frame's travel for the in-flight re-cast
    pub flight_recast_margin: f32,

    // Pull-in
    pub pull_speed: f32,
    pub pull_exit_multiplier: f32,

    // Swing
    pub max_swing_rope_length: f32,
    pub min_rope_length: f32,
    pub gravity_strength: f32,
    /// Exponential damping coefficient on angular velocity, per second
    pub damping: f32,
    pub max_angular_velocity: f32,
    /// Fraction of inherited speed under which the tangential projection is
    /// considered "dead" and the horizontal substitution kicks in
    pub tangential_fraction_threshold: f32,
    /// Fraction of horizontal speed substituted as the tangential estimate
    pub horizontal_substitution_factor: f32,
    /// Horizontal speed below which no substitution happens
    pub horizontal_substitution_threshold: f32,
    /// Angle-dependent kick added at setup so extreme anchor offsets still swing
    pub distance_boost_factor: f32,

    // Boost
    pub boost_impulse: f32,
    pub boost_cooldown: f32,
    pub boost_deadzone: f32,

    // Quick retract
    pub quick_retract_speed: f32,
    pub quick_retract_min_length: f32,
    /// Exponential decay of accumulated retract speed when not retracting
    pub quick_retract_decay: f32,
    pub retract_release_multiplier: f32,
    pub retract_up_boost: f32,
    /// Accumulated retract speed below this counts as "no retract inertia"
    pub retract_negligible_speed: f32,

    // Collision resolution
    pub collision_margin: f32,
    pub slide_factor: f32,
    /// Dot of travel direction and surface normal below which an impact is
    /// head-on (reverse and halve) instead of glancing (damp)
    pub head_on_dot: f32,
    pub glancing_damp: f32,

    // Automatic rope shortening
    pub min_ground_clearance: f32,
    pub ground_lookahead: f32,
    /// Max rope shortening per second when holding ground clearance
    pub rope_shorten_rate: f32,

    // Release / exit
    pub exit_multiplier: f32,
    pub min_exit_up_boost: f32,
    pub max_exit_speed: f32,
    pub exit_duration: f32,
    /// Fraction of exit_duration during which momentum blending applies
    pub exit_blend_fraction: f32,
}

impl Default for GrappleTuning {
    fn default() -> Self {
        Self {
            max_grapple_distance: 520.0,
            search_half_angle: 0.6,
            search_ray_count: 7,
            angle_score_weight: 0.4,
            distance_score_weight: 0.6,

            hook_travel_speed: 1800.0,
            hook_retract_speed: 2400.0,
            flight_recast_margin: 8.0,

            pull_speed: 900.0,
            pull_exit_multiplier: 1.1,

            max_swing_rope_length: 300.0,
            min_rope_length: 60.0,
            gravity_strength: 1800.0,
            damping: 0.35,
            max_angular_velocity: 6.0,
            tangential_fraction_threshold: 0.3,
            horizontal_substitution_factor: 0.7,
            horizontal_substitution_threshold: 40.0,
            distance_boost_factor: 0.6,

            boost_impulse: 520.0,
            boost_cooldown: 0.25,
            boost_deadzone: 0.1,

            quick_retract_speed: 420.0,
            quick_retract_min_length: 80.0,
            quick_retract_decay: 3.0,
            retract_release_multiplier: 0.8,
            retract_up_boost: 220.0,
            retract_negligible_speed: 10.0,

            collision_margin: 2.0,
            slide_factor: 0.8,
            head_on_dot: -0.5,
            glancing_damp: 0.7,

            min_ground_clearance: 6.0,
            ground_lookahead: 10.0,
            rope_shorten_rate: 600.0,

            exit_multiplier: 1.15,
            min_exit_up_boost: 260.0,
            max_exit_speed: 1400.0,
            exit_duration: 0.5,
            exit_blend_fraction: 0.8,
        }
    }
}

impl GrappleTuning {
    /// Length of the post-release momentum-blend window.
    pub fn exit_blend_window(&self) -> f32 {
        self.exit_duration * self.exit_blend_fraction
    }
}

#[derive(Resource, Debug, Default)]
pub struct GrappleInput {
    pub fire_just_pressed: bool,
    pub fire_held: bool,
    pub boost_held: bool,
    pub retract_held: bool,
}

/// Seeded RNG for cosmetic feedback (impact bursts), kept as a resource so
/// visuals are reproducible run to run.
#[derive(Resource)]
pub struct FeedbackRng(pub ChaCha8Rng);

impl Default for FeedbackRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(0x5EED))
    }
}
