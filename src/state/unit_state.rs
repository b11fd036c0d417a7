use crate::infra::{Position, UnitId};
use crate::planners::{RoleTag, initial_role};

/// Per-unit record kept by the team controller for the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitState {
    pub id: UnitId,
    pub role: RoleTag,
    /// Fire plans issued so far; counts against the ammo budget.
    pub shots_fired: u32,
    pub last_position: Option<Position>,
    pub cycles_planned: u64,
}

impl UnitState {
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            role: initial_role(id),
            shots_fired: 0,
            last_position: None,
            cycles_planned: 0,
        }
    }

    pub fn ammo_left(&self, budget: u32) -> u32 {
        budget.saturating_sub(self.shots_fired)
    }
}
