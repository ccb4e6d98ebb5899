use safe_voyage::catalog::{self, BehaviorType, DECK_HEIGHT, DECK_WIDTH};
use safe_voyage::entities::*;
use safe_voyage::geometry::Vec2;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[test]
fn hazard_tiers_escalate_in_order() {
    assert_eq!(HazardState::Yellow.next_tier(), Some(HazardState::Orange));
    assert_eq!(HazardState::Orange.next_tier(), Some(HazardState::Red));
    assert_eq!(HazardState::Red.next_tier(), Some(HazardState::Accident));
    assert_eq!(HazardState::Accident.next_tier(), None);
    assert_eq!(HazardState::Safe.next_tier(), None);

    assert!(HazardState::Orange.is_hazard());
    assert!(!HazardState::Safe.is_hazard());
    assert!(!HazardState::Accident.is_hazard());
}

#[test]
fn only_vips_and_party_guests_are_defiant() {
    let defiant: Vec<NpcType> = ALL_NPC_TYPES
        .iter()
        .copied()
        .filter(|k| k.is_defiant())
        .collect();
    assert_eq!(defiant, vec![NpcType::PartyGuest, NpcType::Vip]);
}

#[test]
fn player_speed_scales_with_upgrade() {
    let base = Player::new(0);
    assert_eq!(base.body.speed, 250.0);
    assert_eq!(base.body.radius, 15.0);
    assert_eq!(base.body.pos, Vec2::new(DECK_WIDTH / 2.0, DECK_HEIGHT / 2.0));
    assert!(base.body.target.is_none());

    let fast = Player::new(2);
    assert!((fast.body.speed - 350.0).abs() < 1e-9);
}

#[test]
fn spawned_npcs_start_safe_and_wandering() {
    let mut rng = seeded_rng();
    let obstacles = catalog::obstacle_rects();
    for id in 0..50 {
        let npc = Npc::spawn(id, &obstacles, &mut rng);
        assert_eq!(npc.id, id);
        assert_eq!(npc.state, HazardState::Safe);
        assert!(npc.current_behavior.is_none());
        assert!(npc.is_idle());
        assert_eq!(npc.body.speed, 50.0);
        assert!(npc.body.pos.x >= 150.0 && npc.body.pos.x <= DECK_WIDTH - 150.0);
        assert!(npc.body.pos.y >= 100.0 && npc.body.pos.y <= DECK_HEIGHT - 100.0);

        let target = npc.body.target.expect("wander target");
        assert!(target.x >= 120.0 && target.x <= DECK_WIDTH - 120.0);
        assert!(target.y >= 70.0 && target.y <= DECK_HEIGHT - 70.0);
    }
}

#[test]
fn non_edge_behavior_goes_yellow_immediately() {
    let mut rng = seeded_rng();
    let mut npc = Npc::new(0, NpcType::Trendy, Vec2::new(300.0, 300.0));
    npc.body.target = Some(Vec2::new(400.0, 300.0));

    npc.begin_behavior(BehaviorType::TakeOffLifejacket, 0, &mut rng);

    assert_eq!(npc.state, HazardState::Yellow);
    assert_eq!(npc.current_behavior, Some(BehaviorType::TakeOffLifejacket));
    assert_eq!(npc.state_timer, 5000.0);
    assert_eq!(npc.max_state_timer, 5000.0);
    assert!(npc.body.target.is_none(), "hazardous NPCs stand still");
}

#[test]
fn edge_behavior_walks_to_an_edge_first() {
    let mut rng = seeded_rng();
    for _ in 0..20 {
        let mut npc = Npc::new(0, NpcType::PhotoJunkie, Vec2::new(300.0, 300.0));
        npc.begin_behavior(BehaviorType::SelfieRail, 0, &mut rng);

        assert_eq!(npc.state, HazardState::Safe);
        assert!(npc.current_behavior.is_none());
        assert_eq!(npc.pending_behavior, Some(BehaviorType::SelfieRail));
        assert!(npc.is_seeking_edge());
        assert!(!npc.is_idle());

        let t = npc.body.target.expect("edge target");
        let on_edge = t.y == 70.0
            || t.y == DECK_HEIGHT - 70.0
            || t.x == 120.0
            || t.x == DECK_WIDTH - 120.0;
        assert!(on_edge, "target {t:?} is not on an edge");

        npc.arrive_at_edge(0);
        assert_eq!(npc.state, HazardState::Yellow);
        assert_eq!(npc.current_behavior, Some(BehaviorType::SelfieRail));
        assert!(npc.pending_behavior.is_none());
        assert_eq!(npc.state_timer, 3000.0);
    }
}

#[test]
fn rocking_compresses_tier_timers() {
    let mut npc = Npc::new(0, NpcType::Curious, Vec2::new(300.0, 300.0));
    npc.current_behavior = Some(BehaviorType::LeaningRail);

    npc.escalate_to(HazardState::Yellow, 1);
    assert!((npc.state_timer - 3200.0).abs() < 1e-9);

    npc.escalate_to(HazardState::Orange, 2);
    assert!((npc.state_timer - 1800.0).abs() < 1e-9);
    assert_eq!(npc.max_state_timer, npc.state_timer);

    npc.escalate_to(HazardState::Red, 0);
    assert_eq!(npc.state_timer, 1500.0);
}

#[test]
fn start_hazard_is_ignored_unless_safe() {
    let mut rng = seeded_rng();
    let mut npc = Npc::new(0, NpcType::Family, Vec2::new(300.0, 300.0));
    npc.current_behavior = Some(BehaviorType::KidsRunning);
    npc.escalate_to(HazardState::Orange, 0);

    npc.start_hazard_behavior(0, &mut rng);
    assert_eq!(npc.state, HazardState::Orange);
    assert_eq!(npc.current_behavior, Some(BehaviorType::KidsRunning));
}

#[test]
fn return_to_safe_clears_the_incident() {
    let mut rng = seeded_rng();
    let mut npc = Npc::new(0, NpcType::Vip, Vec2::new(300.0, 300.0));
    npc.current_behavior = Some(BehaviorType::DrinkingNearEdge);
    npc.escalate_to(HazardState::Red, 0);
    npc.stun_timer = 1.0;

    npc.return_to_safe(&mut rng);

    assert_eq!(npc.state, HazardState::Safe);
    assert!(npc.current_behavior.is_none());
    assert_eq!(npc.state_timer, 0.0);
    assert_eq!(npc.max_state_timer, 0.0);
    assert!(!npc.is_stunned());
    assert!(npc.body.target.is_some(), "wanders off after calming down");
}

#[test]
fn behavior_choice_follows_passenger_type() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let b = catalog::pick_behavior(NpcType::PhotoJunkie, &mut rng);
        assert!(matches!(b, BehaviorType::SelfieRail | BehaviorType::TakeOffLifejacket));

        let b = catalog::pick_behavior(NpcType::Family, &mut rng);
        assert!(matches!(b, BehaviorType::KidsRunning | BehaviorType::LeaningRail));

        let b = catalog::pick_behavior(NpcType::PartyGuest, &mut rng);
        assert!(matches!(b, BehaviorType::DrinkingNearEdge | BehaviorType::SelfieRail));

        let b = catalog::pick_behavior(NpcType::Trendy, &mut rng);
        assert!(matches!(b, BehaviorType::TakeOffLifejacket | BehaviorType::SelfieRail));
    }
}

#[test]
fn upgrade_levels_by_id() {
    let mut upgrades = Upgrades::default();
    *upgrades.level_mut(catalog::UpgradeId::Whistle) = 2;
    assert_eq!(upgrades.whistle, 2);
    assert_eq!(upgrades.level(catalog::UpgradeId::Whistle), 2);
    assert_eq!(upgrades.level(catalog::UpgradeId::Speed), 0);
}
