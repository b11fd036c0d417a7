//! Whole-team scenarios: planner, ledger and executors working together.

use proptest::prelude::*;

use crate::infra::{Connectivity, Direction, Position, ReservationLedger, TuningConfig};
use crate::planners::{
    Action, BattleInfo, BattleOrders, MatchSettings, PlanStep, ReactiveExecutor,
    ScriptedExecutor, TeamPlanner,
};
use crate::state::{GridSnapshot, build_world_view};

fn orders(info: BattleInfo) -> BattleOrders {
    match info {
        BattleInfo::Orders(orders) => orders,
        BattleInfo::Unrecognized => panic!("planner must always produce orders"),
    }
}

fn planner(board: &GridSnapshot) -> TeamPlanner {
    TeamPlanner::new(
        MatchSettings::new(board.width(), board.height(), 1),
        TuningConfig::default(),
    )
}

/// Cell reached after walking the travel steps of `orders` from `from`.
fn first_hop(orders: &BattleOrders, from: Position, width: i32, height: i32) -> Position {
    let (dx, dy) = orders.plan.steps()[0].heading.delta();
    Position::new((from.x + dx).rem_euclid(width), (from.y + dy).rem_euclid(height))
}

#[test]
fn test_two_units_split_without_clean_shot() {
    let board: GridSnapshot = "\
............
............
..1.........
.........2..
..1.........
............
............"
        .parse()
        .unwrap();
    let a = Position::new(2, 2);
    let b = Position::new(2, 4);
    let mut planner = planner(&board);

    let a_orders = orders(planner.plan_for(0, &board.viewed_by(a, 1)));
    let b_orders = orders(planner.plan_for(1, &board.viewed_by(b, 1)));

    assert!(!a_orders.plan.is_empty());
    assert!(!a_orders.plan.fires(), "no clean line to (9,3) from (2,2)");
    let a_hop = first_hop(&a_orders, a, 12, 7);
    assert_eq!(planner.state().ledger.is_reserved(a_hop), Some(0));

    assert!(!b_orders.plan.is_empty());
    assert!(!b_orders.plan.fires());
    let b_hop = first_hop(&b_orders, b, 12, 7);
    assert_ne!(a_hop, b_hop);
    assert_eq!(planner.state().ledger.is_reserved(b_hop), Some(1));
}

#[test]
fn test_shared_first_hop_goes_to_first_planner() {
    let board: GridSnapshot = "\
1.1.........
............
............
.......2....
............
............
............"
        .parse()
        .unwrap();
    let a = Position::new(2, 0);
    let b = Position::new(0, 0);
    let mut planner = planner(&board);
    planner.begin_tick();

    let a_orders = orders(planner.plan_for(0, &board.viewed_by(a, 1)));
    assert!(!a_orders.plan.is_empty());
    assert!(!a_orders.plan.fires());
    let a_hop = a_orders.waypoint;
    assert_eq!(planner.state().ledger.is_reserved(a_hop), Some(0));

    let b_orders = orders(planner.plan_for(1, &board.viewed_by(b, 1)));
    assert_ne!(b_orders.waypoint, a_hop, "the later planner routes around the claim");
    assert_eq!(planner.state().ledger.is_reserved(a_hop), Some(0));
}

#[test]
fn test_shot_across_the_edge() {
    let board: GridSnapshot = "\
..........
%........2
.........."
        .parse()
        .unwrap();
    let mut planner = planner(&board);
    let orders = orders(planner.plan_for(0, &board));
    assert!(orders.plan.fires());
    assert_eq!(orders.plan.steps()[0].heading, Direction::West);
}

#[test]
fn test_friend_in_lane_forces_the_long_way() {
    let board: GridSnapshot = "\
..........
.%..1..2..
.........."
        .parse()
        .unwrap();
    let mut planner = planner(&board);
    let orders = orders(planner.plan_for(0, &board));
    // East is shadowed by the friend at (4,1); west wraps onto (7,1).
    assert_eq!(orders.plan.steps(), &[PlanStep::fire(Direction::West)]);
}

#[test]
fn test_walled_in_unit_rotates_and_breaches() {
    let mut board: GridSnapshot = "\
....................
.###................
.#%#................
.###................
..........2........."
        .parse()
        .unwrap();
    let me = Position::new(2, 2);
    let mut planner = planner(&board);
    let mut exec = ScriptedExecutor::new(Direction::North);

    exec.update_battle_info(planner.plan_for(0, &board));
    let mut actions = Vec::new();
    loop {
        let action = exec.get_action();
        if action == Action::GetBattleInfo {
            break;
        }
        actions.push(action);
    }
    assert_eq!(actions.last(), Some(&Action::Shoot));
    assert!(actions[..actions.len() - 1].iter().all(|a| a.is_rotation()));

    // Knock out the wall that was shot; the unit is free next cycle.
    let (dx, dy) = exec.facing().delta();
    board.set(Position::new(me.x + dx, me.y + dy), crate::state::Symbol::Empty);
    let (view, _) = build_world_view(&board, 20, 5, 1);
    assert!(view.any_passable_neighbor(me, Connectivity::Eight));
}

#[test]
fn test_mined_in_unit_never_shoots() {
    let board: GridSnapshot = "\
....................
.@@@................
.@%@......2.........
.@@@................
...................."
        .parse()
        .unwrap();
    let me = Position::new(2, 2);
    let mut planner = planner(&board);
    let mut scripted = ScriptedExecutor::new(Direction::South);
    let reactive = ReactiveExecutor::default();

    for cycle in 0..5 {
        let info = planner.plan_for(0, &board);
        let orders = orders(info.clone());
        assert!(!orders.plan.fires(), "cycle {cycle}: a mine sits in every lane");

        let (view, _) = build_world_view(&board, 20, 5, 1);
        let action = reactive.decide(&orders, &view, &planner.state().ledger, 0, me, scripted.facing());
        assert_ne!(action, Action::Shoot);

        scripted.update_battle_info(info);
        for _ in 0..8 {
            let action = scripted.get_action();
            assert_ne!(action, Action::Shoot);
            if action == Action::GetBattleInfo {
                break;
            }
        }
    }
    assert_eq!(scripted.facing(), Direction::East, "ends facing the enemy");
}

#[test]
fn test_replay_is_deterministic() {
    let board: GridSnapshot = "\
..............
..1...#.......
......#...2...
..1...#.......
..........@...
....2........."
        .parse()
        .unwrap();
    let units = board.units_of(1);

    let run = || {
        let mut planner = planner(&board);
        let mut log = Vec::new();
        for _ in 0..3 {
            for (key, pos) in units.iter().enumerate() {
                log.push(orders(planner.plan_for(key as u64, &board.viewed_by(*pos, 1))));
            }
        }
        log
    };
    assert_eq!(run(), run());
}

#[test]
fn test_reservation_lives_exactly_its_ttl() {
    let mut ledger = ReservationLedger::new(6, 6);
    let cell = Position::new(3, 3);
    assert!(ledger.reserve_move(cell, 2, 5));
    for tick in 1..5 {
        ledger.age();
        assert_eq!(ledger.is_reserved(cell), Some(2), "still held after {tick} ticks");
        assert!(!ledger.reserve_move(cell, 3, 1), "higher id cannot steal");
    }
    ledger.age();
    assert_eq!(ledger.is_reserved(cell), None);
    assert!(ledger.reserve_move(cell, 3, 1));
}

fn symbol(roll: u8) -> char {
    match roll {
        0 => '#',
        1 => '@',
        2 => '2',
        3 => '1',
        _ => '.',
    }
}

proptest! {
    #[test]
    fn prop_plans_only_walk_open_cells(
        rolls in prop::collection::vec(0u8..12, 48),
        me in 0usize..48,
    ) {
        let mut text = String::new();
        for (i, roll) in rolls.iter().enumerate() {
            if i > 0 && i % 8 == 0 {
                text.push('\n');
            }
            text.push(if i == me { '%' } else { symbol(*roll) });
        }
        let board: GridSnapshot = text.parse().unwrap();
        let (view, start) = build_world_view(&board, 8, 6, 1);
        let mut planner = planner(&board);
        let orders = orders(planner.plan_for(0, &board));

        prop_assert!(orders.plan.len() <= planner.config().plan_steps);
        if orders.plan.fires() {
            prop_assert_eq!(orders.plan.len(), 1);
        } else {
            let mut pos = start;
            for step in orders.plan.steps() {
                pos = view.step(pos, step.heading);
                prop_assert!(!view.is_blocked(pos));
                prop_assert!(!view.has_friend(pos));
            }
            if !orders.plan.is_empty() {
                prop_assert_eq!(orders.waypoint, view.step(start, orders.plan.steps()[0].heading));
            }
        }
    }
}
