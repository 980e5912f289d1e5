//! Grapple domain: the headless swing simulation.
//!
//! Everything here is plain math over [`CollisionProbe`]: hook targeting and
//! flight, the pull-in closer, the pendulum integrator with swept collision
//! resolution and ground-clearance rope shortening, and the release model.
//! The ECS systems in `super::systems` are thin drivers over these functions.
//!
//! Angle convention: measured from the anchor, 0 = straight down, increasing
//! counter-clockwise. Position on the rope is
//! `anchor + rope_length * (sin a, -cos a)`; the tangent of increasing angle
//! is `(cos a, sin a)`, so positive angular velocity moves the character
//! rightward through the bottom of the arc.

use bevy::prelude::*;

use super::probe::CollisionProbe;
use super::resources::GrappleTuning;

/// Displacements below this are not worth collision-resolving.
const DISPLACEMENT_EPSILON: f32 = 1e-4;
/// Guard against normalizing near-zero vectors.
const DIRECTION_EPSILON: f32 = 1e-6;

// ---------------------------------------------------------------------------
// Hook targeting
// ---------------------------------------------------------------------------

/// Score for a single targeting ray hit; lower is better. Distance is
/// weighted slightly over alignment on purpose: a close anchor off to the
/// side beats a distant one dead ahead.
pub fn target_score(
    angle_offset: f32,
    half_angle: f32,
    distance: f32,
    max_range: f32,
    tuning: &GrappleTuning,
) -> f32 {
    tuning.angle_score_weight * (angle_offset.abs() / half_angle.max(DIRECTION_EPSILON))
        + tuning.distance_score_weight * (distance / max_range.max(DIRECTION_EPSILON))
}

/// Fan of rays across the search cone around `aim`; best-scoring hit wins.
/// Returns `None` when nothing in the cone is collidable.
pub fn find_anchor(
    probe: &impl CollisionProbe,
    origin: Vec2,
    aim: Vec2,
    tuning: &GrappleTuning,
) -> Option<Vec2> {
    if aim.length_squared() < DIRECTION_EPSILON {
        return None;
    }
    let aim = aim.normalize();
    let count = tuning.search_ray_count.max(1) | 1; // force odd

    let mut best: Option<(f32, Vec2)> = None;
    for i in 0..count {
        let t = if count == 1 {
            0.0
        } else {
            (i as f32 / (count - 1) as f32) * 2.0 - 1.0
        };
        let offset = t * tuning.search_half_angle;
        let dir = Vec2::from_angle(offset).rotate(aim);

        if let Some(hit) = probe.ray_cast(origin, dir, tuning.max_grapple_distance) {
            let score = target_score(
                offset,
                tuning.search_half_angle,
                hit.distance,
                tuning.max_grapple_distance,
                tuning,
            );
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, hit.point));
            }
        }
    }
    best.map(|(_, point)| point)
}

// ---------------------------------------------------------------------------
// Hook flight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub hook_pos: Vec2,
    pub hook_target: Vec2,
    pub has_valid_target: bool,
    /// Character velocity captured at fire time, re-applied every flight
    /// frame and consumed by swing setup.
    pub velocity_on_hook: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightOutcome {
    InFlight,
    Arrived { valid: bool },
}

/// Advance the hook tip one frame. A provisional (max-range) target keeps
/// being re-tested with a short ray every frame until something is hit.
pub fn advance_hook(
    probe: &impl CollisionProbe,
    flight: &mut FlightState,
    dt: f32,
    tuning: &GrappleTuning,
) -> FlightOutcome {
    let travel = tuning.hook_travel_speed * dt;

    if !flight.has_valid_target {
        let to_target = flight.hook_target - flight.hook_pos;
        if to_target.length_squared() > DIRECTION_EPSILON {
            if let Some(hit) = probe.ray_cast(
                flight.hook_pos,
                to_target,
                travel + tuning.flight_recast_margin,
            ) {
                flight.hook_target = hit.point;
                flight.has_valid_target = true;
            }
        }
    }

    let to_target = flight.hook_target - flight.hook_pos;
    let dist = to_target.length();
    if travel >= dist {
        flight.hook_pos = flight.hook_target;
        FlightOutcome::Arrived {
            valid: flight.has_valid_target,
        }
    } else {
        flight.hook_pos += to_target / dist * travel;
        FlightOutcome::InFlight
    }
}

/// Run the hook back toward the character. Returns true on arrival.
pub fn retract_hook(hook_pos: &mut Vec2, character: Vec2, dt: f32, tuning: &GrappleTuning) -> bool {
    let to_char = character - *hook_pos;
    let dist = to_char.length();
    let travel = tuning.hook_retract_speed * dt;
    if travel >= dist {
        *hook_pos = character;
        true
    } else {
        *hook_pos += to_char / dist * travel;
        false
    }
}

// ---------------------------------------------------------------------------
// Pull-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PullOutcome {
    Moving(Vec2),
    /// Close enough to the swing radius; swing setup should run from here.
    WithinRange(Vec2),
}

/// Linear draw toward the anchor until within `max_swing_rope_length`.
pub fn pull_step(position: Vec2, anchor: Vec2, dt: f32, tuning: &GrappleTuning) -> PullOutcome {
    let delta = anchor - position;
    let dist = delta.length();
    if dist < DIRECTION_EPSILON {
        return PullOutcome::WithinRange(position);
    }
    let dir = delta / dist;
    let remaining = dist - tuning.max_swing_rope_length;
    let travel = tuning.pull_speed * dt;

    if remaining <= travel.max(DISPLACEMENT_EPSILON) {
        PullOutcome::WithinRange(position + dir * remaining.max(0.0))
    } else {
        PullOutcome::Moving(position + dir * travel)
    }
}

// ---------------------------------------------------------------------------
// Swing state and setup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingState {
    /// Fixed for the lifetime of the swing; a new anchor needs a re-fire.
    pub anchor: Vec2,
    pub rope_length: f32,
    /// Radians from straight-down
    pub angle: f32,
    /// Radians per second, clamped to `max_angular_velocity`
    pub angular_velocity: f32,
    /// Radial speed banked by quick-retract, spent at release
    pub quick_retract_speed: f32,
    pub boost_cooldown: f32,
}

impl SwingState {
    pub fn position(&self) -> Vec2 {
        self.anchor + self.rope_length * Vec2::new(self.angle.sin(), -self.angle.cos())
    }

    pub fn tangent(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }
}

/// Build the swing from the character's position and the velocity inherited
/// at fire time.
///
/// The inherited velocity is projected onto the tangent; when that projection
/// is weak but the character was moving horizontally, a fraction of the
/// horizontal speed substitutes for it so near-radial fires still arc
/// instead of hanging dead. The substitution is game feel, not physics.
pub fn swing_setup(
    position: Vec2,
    anchor: Vec2,
    inherited: Vec2,
    tuning: &GrappleTuning,
) -> SwingState {
    let delta = position - anchor;
    let rope_length = delta
        .length()
        .clamp(DIRECTION_EPSILON, tuning.max_swing_rope_length);
    let angle = delta.x.atan2(-delta.y);
    let tangent = Vec2::new(angle.cos(), angle.sin());

    let speed = inherited.length();
    let mut tangential = inherited.dot(tangent);
    if tangential.abs() < tuning.tangential_fraction_threshold * speed
        && inherited.x.abs() > tuning.horizontal_substitution_threshold
    {
        tangential = inherited.x * tuning.horizontal_substitution_factor;
    }

    let mut angular_velocity = tangential / rope_length;
    angular_velocity += -angle.sin() * tuning.distance_boost_factor;
    angular_velocity =
        angular_velocity.clamp(-tuning.max_angular_velocity, tuning.max_angular_velocity);

    SwingState {
        anchor,
        rope_length,
        angle,
        angular_velocity,
        quick_retract_speed: 0.0,
        boost_cooldown: 0.0,
    }
}

// ---------------------------------------------------------------------------
// Swing integration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SwingCommand {
    /// Signed horizontal input for boost direction, [-1, 1]
    pub steer_x: f32,
    pub boost_held: bool,
    pub retract_held: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SwingStepResult {
    pub position: Vec2,
    /// A boost impulse fired this frame (feedback hook)
    pub boost_fired: bool,
}

/// One frame of the pendulum: gravity torque, boost, quick-retract, damped
/// integration, swept collision resolution, ground-clearance rope control.
pub fn swing_step(
    probe: &impl CollisionProbe,
    state: &mut SwingState,
    command: SwingCommand,
    half_extents: Vec2,
    dt: f32,
    tuning: &GrappleTuning,
) -> SwingStepResult {
    let angular_accel = -(tuning.gravity_strength / state.rope_length) * state.angle.sin();

    // Player boost: set angular speed to at least the impulse in the input's
    // sign, never reducing speed already going that way.
    let mut boost_fired = false;
    if state.boost_cooldown > 0.0 {
        state.boost_cooldown -= dt;
    }
    if command.boost_held
        && state.boost_cooldown <= 0.0
        && command.steer_x.abs() > tuning.boost_deadzone
    {
        let sign = command.steer_x.signum();
        let target = tuning.boost_impulse / state.rope_length;
        if state.angular_velocity * sign < target {
            state.angular_velocity = sign * target;
        }
        state.boost_cooldown = tuning.boost_cooldown;
        boost_fired = true;
    }

    // Quick-retract: shrink the rope and bank radial speed for release.
    // Shortening is monotonic for the session.
    let retracting = command.retract_held && state.rope_length > tuning.quick_retract_min_length;
    if retracting {
        let shrink =
            (tuning.quick_retract_speed * dt).min(state.rope_length - tuning.quick_retract_min_length);
        state.rope_length -= shrink;
        state.quick_retract_speed = tuning.quick_retract_speed;
    } else {
        state.quick_retract_speed *= (1.0 - tuning.quick_retract_decay * dt).max(0.0);
    }

    state.angular_velocity += angular_accel * dt;
    state.angular_velocity *= (1.0 - tuning.damping * dt).max(0.0);
    state.angular_velocity = state
        .angular_velocity
        .clamp(-tuning.max_angular_velocity, tuning.max_angular_velocity);

    let current_pos = state.position();
    let mut new_angle = state.angle + state.angular_velocity * dt;
    let mut new_pos =
        state.anchor + state.rope_length * Vec2::new(new_angle.sin(), -new_angle.cos());

    new_pos = resolve_collision(
        probe,
        current_pos,
        new_pos,
        half_extents,
        state,
        &mut new_angle,
        tuning,
    );

    if !retracting {
        new_pos = shorten_for_ground(probe, state, new_pos, &mut new_angle, half_extents, dt, tuning);
    }

    state.angle = new_angle;
    SwingStepResult {
        position: new_pos,
        boost_fired,
    }
}

/// Sweep the character's box along the proposed displacement; on impact clip
/// to a safe distance, try sliding the remainder along the surface, and damp
/// or reflect the angular velocity depending on how head-on the hit was.
fn resolve_collision(
    probe: &impl CollisionProbe,
    from: Vec2,
    to: Vec2,
    half_extents: Vec2,
    state: &mut SwingState,
    new_angle: &mut f32,
    tuning: &GrappleTuning,
) -> Vec2 {
    let disp = to - from;
    let len = disp.length();
    if len <= DISPLACEMENT_EPSILON {
        return to;
    }
    let dir = disp / len;

    let Some(hit) = probe.sweep_box(from, half_extents, dir, len + tuning.collision_margin) else {
        return to;
    };
    if hit.distance >= len {
        return to;
    }

    let safe = (hit.distance - tuning.collision_margin).max(0.0);
    let mut corrected = from + dir * safe;

    // Slide the leftover motion along the surface if that path is clear.
    let leftover = len - safe;
    let perp = Vec2::new(-hit.normal.y, hit.normal.x);
    let slide = dir.dot(perp) * leftover;
    if slide.abs() > DISPLACEMENT_EPSILON {
        let slide_dir = perp * slide.signum();
        if probe
            .sweep_box(
                corrected,
                half_extents,
                slide_dir,
                slide.abs() + tuning.collision_margin,
            )
            .is_none()
        {
            corrected += slide_dir * slide.abs() * tuning.slide_factor;
        }
    }

    let delta = corrected - state.anchor;
    if delta.length_squared() > DIRECTION_EPSILON {
        *new_angle = delta.x.atan2(-delta.y);
    }

    if dir.dot(hit.normal) < tuning.head_on_dot {
        state.angular_velocity = -state.angular_velocity * 0.5;
    } else {
        state.angular_velocity *= tuning.glancing_damp;
    }

    corrected
}

/// Keep the swinging body clear of the ground by shortening the rope instead
/// of letting the arc drag through terrain. Shortened length persists; the
/// rope never re-lengthens on its own.
fn shorten_for_ground(
    probe: &impl CollisionProbe,
    state: &mut SwingState,
    candidate: Vec2,
    new_angle: &mut f32,
    half_extents: Vec2,
    dt: f32,
    tuning: &GrappleTuning,
) -> Vec2 {
    let depth = half_extents.y + tuning.ground_lookahead;

    // Probe under the candidate and slightly ahead along the travel
    // direction; a rising floor ahead matters as much as the one below.
    let ahead =
        candidate + state.tangent() * state.angular_velocity.signum() * tuning.ground_lookahead;
    let below = probe.ray_cast(candidate, Vec2::NEG_Y, depth);
    let below_ahead = probe.ray_cast(ahead, Vec2::NEG_Y, depth);

    let ground_y = match (below, below_ahead) {
        (Some(a), Some(b)) => Some(a.point.y.max(b.point.y)),
        (Some(a), None) => Some(a.point.y),
        (None, Some(b)) => Some(b.point.y),
        (None, None) => None,
    };
    let Some(ground_y) = ground_y else {
        return candidate;
    };

    let min_y = ground_y + half_extents.y + tuning.min_ground_clearance;
    if candidate.y - min_y >= tuning.collision_margin {
        return candidate;
    }

    // Rope length that holds the character exactly at minimum clearance at
    // the current angle. Only ever shortens, and never instantaneously.
    let cos_a = new_angle.cos();
    if cos_a > DIRECTION_EPSILON && state.anchor.y > min_y {
        // The hard-clamp below may already have taken the rope under the
        // configured minimum; the floor must not exceed the current length.
        let floor = tuning.min_rope_length.min(state.rope_length);
        let required = ((state.anchor.y - min_y) / cos_a).clamp(floor, state.rope_length);
        let step = (state.rope_length - required).min(tuning.rope_shorten_rate * dt);
        state.rope_length -= step.max(0.0);
    }

    let mut pos =
        state.anchor + state.rope_length * Vec2::new(new_angle.sin(), -new_angle.cos());

    // Rate-limited shortening may still leave us low; hard-clamp and
    // re-derive angle and rope from the corrected position.
    if pos.y < min_y {
        pos.y = min_y;
        let delta = pos - state.anchor;
        if delta.length_squared() > DIRECTION_EPSILON {
            *new_angle = delta.x.atan2(-delta.y);
            state.rope_length = delta.length().max(DIRECTION_EPSILON);
        }
    }
    pos
}

// ---------------------------------------------------------------------------
// Release / exit model
// ---------------------------------------------------------------------------

/// Exit velocity for a release mid-swing: tangential swing speed plus banked
/// quick-retract inertia, floored upward when hanging below the anchor,
/// capped at the configured maximum.
pub fn release_velocity(state: &SwingState, position: Vec2, tuning: &GrappleTuning) -> Vec2 {
    let swing_vel = state.tangent() * (state.angular_velocity * state.rope_length);

    let to_anchor = state.anchor - position;
    let anchor_above = state.anchor.y > position.y;
    let has_retract = state.quick_retract_speed > tuning.retract_negligible_speed;

    let mut retract_vel = Vec2::ZERO;
    if has_retract && to_anchor.length_squared() > DIRECTION_EPSILON {
        retract_vel =
            to_anchor.normalize() * state.quick_retract_speed * tuning.retract_release_multiplier;
        if anchor_above {
            retract_vel.y += tuning.retract_up_boost;
        }
    }

    let mut combined = swing_vel * tuning.exit_multiplier + retract_vel;
    if anchor_above && !has_retract {
        combined.y = combined.y.max(tuning.min_exit_up_boost);
    }

    cap_speed(combined, tuning.max_exit_speed)
}

/// Exit velocity for a release while still being pulled toward the anchor.
pub fn pull_release_velocity(position: Vec2, anchor: Vec2, tuning: &GrappleTuning) -> Vec2 {
    let delta = anchor - position;
    let dir = if delta.length_squared() > DIRECTION_EPSILON {
        delta.normalize()
    } else {
        Vec2::Y
    };
    let mut v = dir * tuning.pull_speed * tuning.pull_exit_multiplier;
    v.y = v.y.max(tuning.min_exit_up_boost);
    cap_speed(v, tuning.max_exit_speed)
}

fn cap_speed(v: Vec2, max_speed: f32) -> Vec2 {
    let speed = v.length();
    if speed > max_speed {
        v * (max_speed / speed)
    } else {
        v
    }
}

/// Horizontal velocity during the post-release window: the captured exit
/// momentum decays while live steering (and whatever the controller is
/// already doing) is weighted in. `momentum_weight` runs 1 → 0 across the
/// window.
pub fn exit_blend_horizontal(
    exit_vx: f32,
    momentum_weight: f32,
    body_vx: f32,
    steer_vx: f32,
) -> f32 {
    let w = momentum_weight.clamp(0.0, 1.0);
    w * exit_vx + (1.0 - w) * 0.5 * (body_vx + steer_vx)
}
