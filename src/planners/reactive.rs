use crate::infra::{
    Connectivity, Direction, HitKind, Position, ReservationLedger, UnitId, first_hit_is_enemy,
    heading_toward, next_step_blocked, raycast_first_hit,
};
use crate::planners::{Action, BattleOrders};
use crate::state::WorldView;

/// Picks one action per tick from the live view, using the orders only for
/// their waypoint.
#[derive(Debug, Clone, Copy)]
pub struct ReactiveExecutor {
    connectivity: Connectivity,
}

impl Default for ReactiveExecutor {
    fn default() -> Self {
        Self::new(Connectivity::Eight)
    }
}

impl ReactiveExecutor {
    /// `connectivity` decides which neighbours count when checking for a trap.
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// Order of checks: trapped (walls first, else mines), shot on the
    /// current facing, then turn or step toward the waypoint.
    pub fn decide(
        &self,
        orders: &BattleOrders,
        view: &WorldView,
        ledger: &ReservationLedger,
        me: UnitId,
        pos: Position,
        facing: Direction,
    ) -> Action {
        if view.is_empty() {
            return Action::DoNothing;
        }

        if !view.any_passable_neighbor(pos, self.connectivity) {
            let walled = view.neighbors(pos, self.connectivity).any(|(_, n)| view.is_wall(n));
            return if walled {
                self.wall_trapped(view, pos, facing)
            } else {
                Self::mine_trapped(view, ledger, me, pos, facing)
            };
        }

        if first_hit_is_enemy(view, ledger, me, pos, facing) {
            return Action::Shoot;
        }

        let waypoint = view.wrap(orders.waypoint);
        let Some(desired) = heading_toward(pos, waypoint, view.width(), view.height()) else {
            return Action::DoNothing;
        };
        if let Some(turn) = facing.turn_toward(desired) {
            return Action::rotation(turn);
        }

        let next = view.step(pos, facing);
        if next_step_blocked(view, pos, facing) || ledger.is_reserved_by_other(next, me) {
            tracing::trace!(x = next.x, y = next.y, "Step ahead blocked");
            return Action::RotateLeft45;
        }
        Action::MoveForward
    }

    fn mine_trapped(
        view: &WorldView,
        ledger: &ReservationLedger,
        me: UnitId,
        pos: Position,
        facing: Direction,
    ) -> Action {
        let Some(enemy) = view.nearest_enemy(pos) else {
            return Action::RotateLeft45;
        };
        let Some(desired) = heading_toward(pos, enemy, view.width(), view.height()) else {
            return Action::RotateLeft45;
        };
        if let Some(turn) = facing.turn_toward(desired) {
            return Action::rotation(turn);
        }
        if first_hit_is_enemy(view, ledger, me, pos, facing) {
            Action::Shoot
        } else {
            Action::RotateLeft45
        }
    }

    /// Cardinal walls first, then the lowest row and column.
    fn wall_trapped(&self, view: &WorldView, pos: Position, facing: Direction) -> Action {
        let wall = view
            .neighbors(pos, self.connectivity)
            .filter(|(_, n)| view.is_wall(*n))
            .min_by_key(|(dir, n)| (dir.is_diagonal(), n.row_major()));
        let Some((desired, _)) = wall else {
            return Action::RotateLeft45;
        };
        if let Some(turn) = facing.turn_toward(desired) {
            return Action::rotation(turn);
        }
        if raycast_first_hit(view, pos, facing, 1).kind == HitKind::Wall {
            Action::Shoot
        } else {
            Action::RotateLeft45
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::{FallbackOrder, Plan, RoleTag};
    use crate::state::cell;

    fn toward(waypoint: Position) -> BattleOrders {
        BattleOrders {
            role: RoleTag::Aggressor,
            waypoint,
            plan: Plan::default(),
            fallback: FallbackOrder::idle(),
        }
    }

    fn board() -> (WorldView, ReservationLedger) {
        (WorldView::new(20, 9), ReservationLedger::new(20, 9))
    }

    #[test]
    fn test_moves_when_aligned_and_clear() {
        let (view, ledger) = board();
        let pos = Position::new(3, 3);
        let action = ReactiveExecutor::default().decide(&toward(Position::new(4, 3)), &view, &ledger, 0, pos, Direction::East);
        assert_eq!(action, Action::MoveForward);
    }

    #[test]
    fn test_rotates_toward_waypoint() {
        let (view, ledger) = board();
        let pos = Position::new(3, 3);
        let action = ReactiveExecutor::default().decide(&toward(Position::new(3, 4)), &view, &ledger, 0, pos, Direction::East);
        assert_eq!(action, Action::RotateRight45);
    }

    #[test]
    fn test_teammate_reservation_blocks_step() {
        let (view, mut ledger) = board();
        ledger.reserve_move(Position::new(4, 3), 1, 3);
        let pos = Position::new(3, 3);
        let orders = toward(Position::new(4, 3));
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 2, pos, Direction::East),
            Action::RotateLeft45
        );
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 1, pos, Direction::East),
            Action::MoveForward
        );
    }

    #[test]
    fn test_shoots_enemy_on_facing_before_moving() {
        let (mut view, ledger) = board();
        view.set_mask(Position::new(3, 7), cell::ENEMY);
        let pos = Position::new(3, 3);
        let action = ReactiveExecutor::default().decide(&toward(Position::new(4, 3)), &view, &ledger, 0, pos, Direction::South);
        assert_eq!(action, Action::Shoot);
    }

    #[test]
    fn test_holds_on_waypoint() {
        let (view, ledger) = board();
        let pos = Position::new(3, 3);
        assert_eq!(
            ReactiveExecutor::default().decide(&toward(pos), &view, &ledger, 0, pos, Direction::East),
            Action::DoNothing
        );
    }

    #[test]
    fn test_wall_trapped_turns_then_breaches() {
        let (mut view, ledger) = board();
        let pos = Position::new(5, 5);
        let ring: Vec<_> = view.neighbors(pos, Connectivity::Eight).collect();
        for (_, n) in ring {
            view.set_mask(n, cell::WALL);
        }
        let orders = toward(Position::new(10, 5));
        // North is the cardinal wall with the lowest row.
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 0, pos, Direction::East),
            Action::RotateLeft45
        );
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 0, pos, Direction::North),
            Action::Shoot
        );
    }

    #[test]
    fn test_mine_trapped_never_fires_through_mines() {
        let (mut view, ledger) = board();
        let pos = Position::new(5, 5);
        let ring: Vec<_> = view.neighbors(pos, Connectivity::Eight).collect();
        for (_, n) in ring {
            view.set_mask(n, cell::MINE);
        }
        view.set_mask(Position::new(12, 5), cell::ENEMY);
        let orders = toward(Position::new(12, 5));
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 0, pos, Direction::North),
            Action::RotateRight45
        );
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 0, pos, Direction::East),
            Action::RotateLeft45,
            "aligned but the mine ahead blocks the shot"
        );
    }

    #[test]
    fn test_four_way_unit_is_trapped_by_cardinal_walls() {
        let (mut view, ledger) = board();
        let pos = Position::new(5, 5);
        for (_, n) in view.neighbors(pos, Connectivity::Four).collect::<Vec<_>>() {
            view.set_mask(n, cell::WALL);
        }
        let orders = toward(Position::new(6, 4));
        let four = ReactiveExecutor::new(Connectivity::Four);
        assert_eq!(four.decide(&orders, &view, &ledger, 0, pos, Direction::North), Action::Shoot);
        // Eight-way movement still has the open diagonals.
        assert_eq!(
            ReactiveExecutor::default().decide(&orders, &view, &ledger, 0, pos, Direction::North),
            Action::RotateRight45
        );
    }
}
