use std::fmt;

use crate::infra::{Position, UnitId};
use crate::state::WorldView;

/// Behavioural mode driving target selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleTag {
    /// Close in on the nearest enemy.
    Aggressor,
    /// Hold the middle of the map.
    Anchor,
    /// Work around the nearest enemy's side.
    Flanker,
    /// Keep away from enemies and danger.
    Survivor,
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleTag::Aggressor => "Aggressor",
            RoleTag::Anchor => "Anchor",
            RoleTag::Flanker => "Flanker",
            RoleTag::Survivor => "Survivor",
        };
        f.write_str(name)
    }
}

/// First role for a unit id.
pub fn initial_role(id: UnitId) -> RoleTag {
    match id % 4 {
        0 => RoleTag::Aggressor,
        1 => RoleTag::Flanker,
        2 => RoleTag::Anchor,
        _ => RoleTag::Survivor,
    }
}

// ============================================================================
// Target selection
// ============================================================================

/// Flanking candidates around the nearest enemy, scanned in this order.
const FLANK_RING: [(i32, i32); 12] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (2, 0),
    (-2, 0),
    (0, 2),
    (0, -2),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Passable cell with the lowest score; ties go to the lower row, then column.
fn argmin_passable<F>(view: &WorldView, mut score: F) -> Option<Position>
where
    F: FnMut(Position) -> Option<i64>,
{
    view.cells()
        .filter(|pos| !view.is_blocked(*pos))
        .filter_map(|pos| score(pos).map(|s| (s, pos.row_major(), pos)))
        .min_by_key(|(s, key, _)| (*s, *key))
        .map(|(_, _, pos)| pos)
}

fn danger(view: &WorldView, pos: Position) -> i64 {
    i64::from(view.danger(pos))
}

fn aggressor_score(view: &WorldView, me: Position, enemy: Position, pos: Position) -> Option<i64> {
    if pos == enemy {
        return None;
    }
    let d_enemy = i64::from(view.manhattan(pos, enemy));
    let d_me = i64::from(view.manhattan(me, pos));
    Some(8 * d_enemy + 4 * danger(view, pos) + d_me)
}

pub fn target_for_anchor(view: &WorldView) -> Option<Position> {
    let center = Position::new(view.width() / 2, view.height() / 2);
    argmin_passable(view, |pos| {
        Some(i64::from(view.manhattan(pos, center)) + danger(view, pos))
    })
}

pub fn target_for_aggressor(view: &WorldView, me: Position) -> Option<Position> {
    let Some(enemy) = view.nearest_enemy(me) else {
        return target_for_anchor(view);
    };
    argmin_passable(view, |pos| aggressor_score(view, me, enemy, pos))
}

pub fn target_for_flanker(view: &WorldView, me: Position) -> Option<Position> {
    let Some(enemy) = view.nearest_enemy(me) else {
        return target_for_anchor(view);
    };

    let ring_best = FLANK_RING
        .iter()
        .map(|&(dx, dy)| view.wrap(Position::new(enemy.x + dx, enemy.y + dy)))
        .filter(|pos| !view.is_blocked(*pos))
        .map(|pos| {
            let d_enemy = i64::from(view.manhattan(pos, enemy));
            let ring_penalty = match d_enemy {
                1 | 2 => 0,
                0 => 8,
                d => (d - 2) * 8,
            };
            let score = ring_penalty + 4 * danger(view, pos) + i64::from(view.manhattan(me, pos));
            (score, pos.row_major(), pos)
        })
        .min_by_key(|(score, key, _)| (*score, *key))
        .map(|(_, _, pos)| pos);

    ring_best.or_else(|| argmin_passable(view, |pos| aggressor_score(view, me, enemy, pos)))
}

pub fn target_for_survivor(view: &WorldView, me: Position) -> Option<Position> {
    let enemies: Vec<Position> = view.enemies().collect();
    if enemies.is_empty() {
        return target_for_anchor(view);
    }
    // Maximising is minimising the negated score.
    argmin_passable(view, |pos| {
        let d_enemy = enemies
            .iter()
            .map(|enemy| i64::from(view.manhattan(pos, *enemy)))
            .min()
            .unwrap_or(0);
        let d_me = i64::from(view.manhattan(me, pos));
        Some(-(8 * d_enemy - 4 * danger(view, pos) - d_me))
    })
}

/// Destination for `role`. `None` only when the board has no passable cell.
pub fn target_for_role(role: RoleTag, view: &WorldView, me: Position) -> Option<Position> {
    match role {
        RoleTag::Aggressor => target_for_aggressor(view, me),
        RoleTag::Anchor => target_for_anchor(view),
        RoleTag::Flanker => target_for_flanker(view, me),
        RoleTag::Survivor => target_for_survivor(view, me),
    }
}

// ============================================================================
// Adaptive re-evaluation
// ============================================================================

/// What a unit knows about its situation this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSignals {
    /// A shell is predicted to reach the unit's cell.
    pub in_red_zone: bool,
    pub nearest_enemy: Option<i32>,
    pub clean_los: bool,
    /// No wall among the 8 neighbours.
    pub in_open: bool,
    pub ammo_left: u32,
}

impl RoleSignals {
    pub fn threatened(&self, threat_distance: i32) -> bool {
        self.in_red_zone || self.nearest_enemy.is_some_and(|d| d <= threat_distance)
    }
}

/// Hysteresis: does `role` still fit the situation?
pub fn keep_role(role: RoleTag, signals: &RoleSignals, threat_distance: i32) -> bool {
    let threatened = signals.threatened(threat_distance);
    let distance = signals.nearest_enemy.unwrap_or(i32::MAX);
    match role {
        RoleTag::Survivor => threatened,
        _ if threatened => false,
        RoleTag::Anchor => signals.clean_los && distance >= 3 && signals.ammo_left > 0,
        RoleTag::Flanker => signals.in_open && distance > 2,
        RoleTag::Aggressor => !signals.clean_los,
    }
}

/// Fresh role for a unit whose previous role no longer fits.
pub fn assign_role(signals: &RoleSignals, threat_distance: i32) -> RoleTag {
    if signals.threatened(threat_distance) {
        RoleTag::Survivor
    } else if signals.clean_los && signals.ammo_left > 0 {
        RoleTag::Anchor
    } else if signals.in_open {
        RoleTag::Flanker
    } else {
        RoleTag::Aggressor
    }
}

pub fn next_role(current: RoleTag, signals: &RoleSignals, threat_distance: i32) -> RoleTag {
    if keep_role(current, signals, threat_distance) {
        current
    } else {
        assign_role(signals, threat_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cell;

    fn board_with_enemy(w: i32, h: i32, enemy: Position) -> WorldView {
        let mut view = WorldView::new(w, h);
        view.set_mask(enemy, cell::ENEMY);
        view
    }

    #[test]
    fn test_initial_roles_cycle() {
        assert_eq!(initial_role(0), RoleTag::Aggressor);
        assert_eq!(initial_role(1), RoleTag::Flanker);
        assert_eq!(initial_role(2), RoleTag::Anchor);
        assert_eq!(initial_role(3), RoleTag::Survivor);
        assert_eq!(initial_role(4), RoleTag::Aggressor);
    }

    #[test]
    fn test_anchor_picks_center() {
        let view = WorldView::new(12, 7);
        assert_eq!(target_for_anchor(&view), Some(Position::new(6, 3)));
    }

    #[test]
    fn test_anchor_avoids_blocked_center() {
        let mut view = WorldView::new(5, 5);
        view.set_mask(Position::new(2, 2), cell::WALL);
        // four cells at distance 1; (2,1) is first in row-major order
        assert_eq!(target_for_anchor(&view), Some(Position::new(2, 1)));
    }

    #[test]
    fn test_every_role_falls_back_to_anchor_without_enemies() {
        let view = WorldView::new(9, 9);
        let me = Position::new(0, 0);
        let anchor = target_for_anchor(&view);
        for role in [RoleTag::Aggressor, RoleTag::Flanker, RoleTag::Survivor] {
            assert_eq!(target_for_role(role, &view, me), anchor, "{role} should fall back");
        }
    }

    #[test]
    fn test_aggressor_approaches_but_never_targets_enemy_cell() {
        let enemy = Position::new(8, 3);
        let view = board_with_enemy(12, 7, enemy);
        let me = Position::new(2, 3);
        // adjacent on the near side: 8*1 + 0 + 5
        assert_eq!(target_for_aggressor(&view, me), Some(Position::new(7, 3)));
    }

    #[test]
    fn test_flanker_prefers_ring_cell_closest_to_me() {
        let enemy = Position::new(8, 3);
        let view = board_with_enemy(12, 7, enemy);
        let me = Position::new(2, 3);
        // ring penalty is 0 on the whole ring, so distance from me decides
        assert_eq!(target_for_flanker(&view, me), Some(Position::new(6, 3)));
    }

    #[test]
    fn test_flanker_falls_back_when_ring_blocked() {
        let enemy = Position::new(4, 4);
        let mut view = board_with_enemy(9, 9, enemy);
        for (dx, dy) in FLANK_RING {
            view.set_mask(Position::new(4 + dx, 4 + dy), cell::WALL);
        }
        let me = Position::new(0, 4);
        let target = target_for_flanker(&view, me).unwrap();
        assert!(!view.is_blocked(target));
        assert_eq!(target, target_for_aggressor(&view, me).unwrap());
    }

    #[test]
    fn test_survivor_runs_far() {
        let enemy = Position::new(0, 0);
        let view = board_with_enemy(10, 10, enemy);
        let me = Position::new(5, 5);
        assert_eq!(target_for_survivor(&view, me), Some(Position::new(5, 5)));
    }

    #[test]
    fn test_no_passable_cell_yields_none() {
        let mut view = WorldView::new(2, 2);
        for pos in view.cells().collect::<Vec<_>>() {
            view.set_mask(pos, cell::MINE);
        }
        assert_eq!(target_for_anchor(&view), None);
    }

    fn calm() -> RoleSignals {
        RoleSignals {
            in_red_zone: false,
            nearest_enemy: Some(8),
            clean_los: false,
            in_open: true,
            ammo_left: 10,
        }
    }

    #[test]
    fn test_threat_forces_survivor() {
        let signals = RoleSignals {
            nearest_enemy: Some(4),
            ..calm()
        };
        assert_eq!(next_role(RoleTag::Anchor, &signals, 5), RoleTag::Survivor);
        assert_eq!(next_role(RoleTag::Survivor, &signals, 5), RoleTag::Survivor);

        let red = RoleSignals {
            in_red_zone: true,
            ..calm()
        };
        assert_eq!(next_role(RoleTag::Flanker, &red, 5), RoleTag::Survivor);
    }

    #[test]
    fn test_survivor_relaxes_once_safe() {
        assert_eq!(next_role(RoleTag::Survivor, &calm(), 5), RoleTag::Flanker);
    }

    #[test]
    fn test_anchor_needs_los_and_ammo() {
        let sighted = RoleSignals {
            clean_los: true,
            ..calm()
        };
        assert_eq!(next_role(RoleTag::Anchor, &sighted, 5), RoleTag::Anchor);
        let dry = RoleSignals {
            ammo_left: 0,
            ..sighted
        };
        assert_eq!(next_role(RoleTag::Anchor, &dry, 5), RoleTag::Flanker);
    }

    #[test]
    fn test_aggressor_hands_over_on_clean_los() {
        assert_eq!(next_role(RoleTag::Aggressor, &calm(), 5), RoleTag::Aggressor);
        let sighted = RoleSignals {
            clean_los: true,
            ..calm()
        };
        assert_eq!(next_role(RoleTag::Aggressor, &sighted, 5), RoleTag::Anchor);
    }

    #[test]
    fn test_flanker_leaves_cover() {
        let covered = RoleSignals {
            in_open: false,
            ..calm()
        };
        assert_eq!(next_role(RoleTag::Flanker, &covered, 5), RoleTag::Aggressor);
    }
}
