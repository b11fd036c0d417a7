use crate::infra::Direction;
use crate::planners::{Action, BattleInfo, BattleOrders};

/// Turns delivered orders into one primitive action per tick.
///
/// Tracks its own facing; every rotation it emits is assumed to take effect.
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    facing: Direction,
    orders: Option<BattleOrders>,
    fallback_used: bool,
    pending_unrecognized: bool,
}

impl ScriptedExecutor {
    pub fn new(facing: Direction) -> Self {
        Self {
            facing,
            orders: None,
            fallback_used: false,
            pending_unrecognized: false,
        }
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn orders(&self) -> Option<&BattleOrders> {
        self.orders.as_ref()
    }

    pub fn update_battle_info(&mut self, info: BattleInfo) {
        match info {
            BattleInfo::Orders(orders) => {
                self.orders = Some(orders);
                self.fallback_used = false;
                self.pending_unrecognized = false;
            }
            BattleInfo::Unrecognized => {
                tracing::warn!("Unrecognized battle info, rotating once");
                self.orders = None;
                self.pending_unrecognized = true;
            }
        }
    }

    /// Next action. Asks for fresh orders once the current ones are spent.
    pub fn get_action(&mut self) -> Action {
        if self.pending_unrecognized {
            self.pending_unrecognized = false;
            return self.rotate(Action::RotateLeft45);
        }
        let Some(orders) = self.orders.as_mut() else {
            return Action::GetBattleInfo;
        };

        if let Some(step) = orders.plan.current().copied() {
            if let Some(turn) = self.facing.turn_toward(step.heading) {
                return self.rotate(Action::rotation(turn));
            }
            tracing::trace!(cursor = orders.plan.cursor(), fire = step.fire, "Script step");
            orders.plan.advance();
            let exhausted = orders.plan.is_exhausted();
            // Script finished: the fallback is only for orders without a script.
            if exhausted {
                self.orders = None;
            }
            return if step.fire { Action::Shoot } else { Action::MoveForward };
        }

        if self.fallback_used {
            self.orders = None;
            return Action::GetBattleInfo;
        }

        let fallback = orders.fallback;
        let Some(heading) = fallback.heading else {
            self.finish_fallback();
            return self.rotate(Action::RotateLeft45);
        };
        if let Some(turn) = self.facing.turn_toward(heading) {
            return self.rotate(Action::rotation(turn));
        }
        self.finish_fallback();
        if fallback.fire {
            Action::Shoot
        } else if fallback.advance {
            Action::MoveForward
        } else {
            Action::DoNothing
        }
    }

    fn finish_fallback(&mut self) {
        self.fallback_used = true;
        self.orders = None;
    }

    fn rotate(&mut self, action: Action) -> Action {
        match action {
            Action::RotateLeft45 => self.facing = self.facing.rotate_left(),
            Action::RotateRight45 => self.facing = self.facing.rotate_right(),
            _ => {}
        }
        action
    }
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new(Direction::East)
    }
}
