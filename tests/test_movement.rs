use std::f64::consts::FRAC_PI_4;

use safe_voyage::entities::{Body, HazardState, MoverKind};
use safe_voyage::geometry::{Rect, Vec2};
use safe_voyage::movement::{advance, Environment};

const NPC: MoverKind = MoverKind::Npc {
    state: HazardState::Safe,
};

fn body_at(x: f64, y: f64, target: Option<Vec2>, speed: f64) -> Body {
    Body {
        pos: Vec2::new(x, y),
        radius: 15.0,
        speed,
        target,
        facing: 0.0,
    }
}

/// Wall spanning x 100..120, y -50..50.
fn wall() -> Vec<Rect> {
    vec![Rect::new(100.0, -50.0, 20.0, 100.0)]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Seeking ───────────────────────────────────────────────────────────────────

#[test]
fn idle_body_has_arrived() {
    let mut b = body_at(10.0, 10.0, None, 50.0);
    assert!(advance(&mut b, MoverKind::Player, 1.0, &Environment::calm(&[])));
    assert_eq!(b.pos, Vec2::new(10.0, 10.0));
}

#[test]
fn step_is_capped_by_speed() {
    let mut b = body_at(0.0, 0.0, Some(Vec2::new(100.0, 0.0)), 50.0);
    let arrived = advance(&mut b, MoverKind::Player, 1.0, &Environment::calm(&[]));
    assert!(!arrived);
    assert!(approx(b.pos.x, 50.0));
    assert!(approx(b.pos.y, 0.0));
    assert_eq!(b.facing, 0.0);
    assert!(b.target.is_some());
}

#[test]
fn facing_follows_heading() {
    let mut b = body_at(0.0, 0.0, Some(Vec2::new(0.0, 100.0)), 10.0);
    advance(&mut b, MoverKind::Player, 0.1, &Environment::calm(&[]));
    assert!(approx(b.facing, std::f64::consts::FRAC_PI_2));
}

#[test]
fn never_overshoots_the_target() {
    let mut b = body_at(0.0, 0.0, Some(Vec2::new(30.0, 40.0)), 250.0);
    let arrived = advance(&mut b, NPC, 10.0, &Environment::calm(&[]));
    assert!(arrived);
    assert!(approx(b.pos.x, 30.0));
    assert!(approx(b.pos.y, 40.0));
    assert!(b.target.is_none());
}

#[test]
fn within_epsilon_counts_as_arrived() {
    let mut b = body_at(0.0, 0.0, Some(Vec2::new(3.0, 4.0)), 50.0);
    assert!(advance(&mut b, NPC, 0.01, &Environment::calm(&[])));
    assert!(b.target.is_none());
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[test]
fn blocked_diagonal_slides_along_the_wall() {
    let obstacles = wall();
    let mut b = body_at(80.0, 0.0, Some(Vec2::new(150.0, 40.0)), 10.0);
    let arrived = advance(&mut b, MoverKind::Player, 1.0, &Environment::calm(&obstacles));
    assert!(!arrived);
    assert_eq!(b.pos.x, 80.0, "x motion blocked by the wall");
    assert!(b.pos.y > 0.0, "y motion still applied");
}

#[test]
fn stuck_npc_drops_its_target() {
    let obstacles = wall();
    let mut b = body_at(80.0, 0.0, Some(Vec2::new(150.0, 0.0)), 10.0);
    let arrived = advance(&mut b, NPC, 1.0, &Environment::calm(&obstacles));
    assert!(!arrived);
    assert_eq!(b.pos, Vec2::new(80.0, 0.0));
    assert!(b.target.is_none());
}

#[test]
fn stuck_player_keeps_its_target() {
    let obstacles = wall();
    let target = Vec2::new(150.0, 0.0);
    let mut b = body_at(80.0, 0.0, Some(target), 10.0);
    let arrived = advance(&mut b, MoverKind::Player, 1.0, &Environment::calm(&obstacles));
    assert!(!arrived);
    assert_eq!(b.pos, Vec2::new(80.0, 0.0));
    assert_eq!(b.target, Some(target));
}

#[test]
fn body_inside_an_obstacle_can_walk_out() {
    let obstacles = wall();
    let mut b = body_at(110.0, 0.0, Some(Vec2::new(300.0, 0.0)), 10.0);
    advance(&mut b, NPC, 1.0, &Environment::calm(&obstacles));
    assert!(approx(b.pos.x, 120.0));
}

// ── Drift ─────────────────────────────────────────────────────────────────────

fn rough(obstacles: &[Rect]) -> Environment<'_> {
    Environment {
        obstacles,
        rocking: 2,
        // sin(2t) == 1
        total_time: FRAC_PI_4,
        deck_height: 600.0,
    }
}

/// Body walking in place: drift is the only thing that can move it.
fn treading(x: f64, y: f64) -> Body {
    body_at(x, y, Some(Vec2::new(x + 100.0, y)), 0.0)
}

#[test]
fn rocking_drifts_moving_safe_npcs() {
    let mut b = treading(300.0, 300.0);
    advance(&mut b, NPC, 0.5, &rough(&[]));
    assert!(approx(b.pos.y, 330.0));
    assert_eq!(b.pos.x, 300.0);
    assert!(b.target.is_some());
}

#[test]
fn idle_npcs_do_not_drift() {
    let mut b = body_at(300.0, 300.0, None, 50.0);
    assert!(advance(&mut b, NPC, 0.5, &rough(&[])));
    assert_eq!(b.pos, Vec2::new(300.0, 300.0));
}

#[test]
fn drift_is_clamped_to_the_deck_band() {
    let mut b = treading(300.0, 520.0);
    advance(&mut b, NPC, 0.5, &rough(&[]));
    assert_eq!(b.pos.y, 530.0);
}

#[test]
fn hazardous_npcs_and_player_do_not_drift() {
    let hazardous = MoverKind::Npc {
        state: HazardState::Yellow,
    };
    let mut npc = treading(300.0, 300.0);
    advance(&mut npc, hazardous, 0.5, &rough(&[]));
    assert_eq!(npc.pos.y, 300.0);

    let mut player = treading(300.0, 300.0);
    advance(&mut player, MoverKind::Player, 0.5, &rough(&[]));
    assert_eq!(player.pos.y, 300.0);
}

#[test]
fn drift_respects_obstacles() {
    let obstacles = vec![Rect::new(250.0, 320.0, 100.0, 20.0)];
    let mut b = treading(300.0, 300.0);
    advance(&mut b, NPC, 0.5, &rough(&obstacles));
    assert_eq!(b.pos.y, 300.0);
}

// ── Zero-length ticks ─────────────────────────────────────────────────────────

#[test]
fn zero_dt_is_not_stuck() {
    let target = Vec2::new(150.0, 0.0);
    let mut b = body_at(0.0, 0.0, Some(target), 50.0);
    let arrived = advance(&mut b, NPC, 0.0, &Environment::calm(&[]));
    assert!(!arrived);
    assert_eq!(b.pos, Vec2::new(0.0, 0.0));
    assert_eq!(b.target, Some(target));
}

#[test]
fn zero_dt_next_to_a_wall_keeps_the_target() {
    let obstacles = wall();
    let target = Vec2::new(150.0, 0.0);
    let mut b = body_at(84.0, 0.0, Some(target), 50.0);
    advance(&mut b, NPC, 0.0, &Environment::calm(&obstacles));
    assert_eq!(b.target, Some(target));
}
