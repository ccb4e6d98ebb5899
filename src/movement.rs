//! Target seeking for the player and NPCs.
//!
//! Algorithm: "try, then slide"
//! 1. Rough seas push moving SAFE NPCs up and down the deck (drift), clamped
//!    to the walkable band.
//! 2. Step straight towards the target, capped at `speed * dt` and never past it.
//! 3. If the step would overlap an obstacle, try the x-only and then the
//!    y-only part of the step.
//! 4. If nothing works the mover is stuck: NPCs drop their target, the
//!    player just waits out the tick.

use crate::catalog::{ARRIVAL_EPSILON, DECK_HEIGHT, DRIFT_BOUND, DRIFT_PER_ROCKING_LEVEL};
use crate::entities::{Body, HazardState, MoverKind};
use crate::geometry::{circle_hits_rect, Rect, Vec2};

/// World conditions a single movement step depends on.
#[derive(Clone, Copy, Debug)]
pub struct Environment<'a> {
    pub obstacles: &'a [Rect],
    /// 0 = calm, 1 = moderate, 2 = severe.
    pub rocking: u8,
    /// Seconds since the run started; phases the drift.
    pub total_time: f64,
    pub deck_height: f64,
}

impl<'a> Environment<'a> {
    pub fn calm(obstacles: &'a [Rect]) -> Self {
        Environment {
            obstacles,
            rocking: 0,
            total_time: 0.0,
            deck_height: DECK_HEIGHT,
        }
    }
}

/// Move `body` one tick towards its target. Returns `true` once the body has
/// no target left (it arrived, or was idle to begin with).
pub fn advance(body: &mut Body, kind: MoverKind, dt: f64, env: &Environment) -> bool {
    let Some(target) = body.target else {
        return true;
    };

    if matches!(kind, MoverKind::Npc { state: HazardState::Safe }) && env.rocking > 0 {
        drift(body, dt, env);
    }

    let dx = target.x - body.pos.x;
    let dy = target.y - body.pos.y;
    if dx != 0.0 || dy != 0.0 {
        body.facing = dy.atan2(dx);
    }

    let dist = dx.hypot(dy);
    if dist <= ARRIVAL_EPSILON {
        body.target = None;
        return true;
    }

    let step = (body.speed * dt).min(dist);
    if step <= 0.0 {
        return false;
    }
    let desired = Vec2::new(
        body.pos.x + dx / dist * step,
        body.pos.y + dy / dist * step,
    );

    match slide(body.pos, desired, body.radius, env.obstacles) {
        Some(pos) => body.pos = pos,
        None => {
            if matches!(kind, MoverKind::Npc { .. }) {
                body.target = None;
            }
            return false;
        }
    }

    if body.pos.distance(target) <= ARRIVAL_EPSILON {
        body.target = None;
        return true;
    }
    false
}

/// Full step, then x-only, then y-only. `None` when every option is blocked
/// or would leave the mover where it is.
fn slide(from: Vec2, to: Vec2, radius: f64, obstacles: &[Rect]) -> Option<Vec2> {
    [to, Vec2::new(to.x, from.y), Vec2::new(from.x, to.y)]
        .into_iter()
        .filter(|c| *c != from)
        .find(|c| !blocked(from, *c, radius, obstacles))
}

/// Obstacles the mover already overlaps are ignored so it can walk out of them.
fn blocked(from: Vec2, to: Vec2, radius: f64, obstacles: &[Rect]) -> bool {
    obstacles
        .iter()
        .filter(|r| !circle_hits_rect(from, radius, r))
        .any(|r| circle_hits_rect(to, radius, r))
}

fn drift(body: &mut Body, dt: f64, env: &Environment) {
    let power = env.rocking as f64 * DRIFT_PER_ROCKING_LEVEL;
    let shifted = Vec2::new(
        body.pos.x,
        body.pos.y + (env.total_time * 2.0).sin() * power * dt,
    );
    if !blocked(body.pos, shifted, body.radius, env.obstacles) {
        body.pos = shifted;
    }
    body.pos.y = body
        .pos
        .y
        .clamp(DRIFT_BOUND, env.deck_height - DRIFT_BOUND);
}
