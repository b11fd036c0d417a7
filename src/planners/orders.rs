use std::fmt;

use crate::infra::{Direction, Position, Turn};
use crate::planners::RoleTag;

/// One primitive command per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RotateLeft45,
    RotateRight45,
    MoveForward,
    MoveBackward,
    Shoot,
    GetBattleInfo,
    DoNothing,
}

impl Action {
    pub fn rotation(turn: Turn) -> Action {
        match turn {
            Turn::Left => Action::RotateLeft45,
            Turn::Right => Action::RotateRight45,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Action::RotateLeft45 | Action::RotateRight45)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::RotateLeft45 => "RotateLeft45",
            Action::RotateRight45 => "RotateRight45",
            Action::MoveForward => "MoveForward",
            Action::MoveBackward => "MoveBackward",
            Action::Shoot => "Shoot",
            Action::GetBattleInfo => "GetBattleInfo",
            Action::DoNothing => "DoNothing",
        };
        f.write_str(name)
    }
}

/// A heading to face, then either move one cell along it or fire along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub heading: Direction,
    pub fire: bool,
}

impl PlanStep {
    pub fn travel(heading: Direction) -> Self {
        Self { heading, fire: false }
    }

    pub fn fire(heading: Direction) -> Self {
        Self { heading, fire: true }
    }
}

/// Bounded step script with a cursor. Only executing a step advances the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
    cursor: usize,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps, cursor: 0 }
    }

    pub fn single(step: PlanStep) -> Self {
        Self::new(vec![step])
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&PlanStep> {
        self.steps.get(self.cursor)
    }

    pub fn advance(&mut self) {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn fires(&self) -> bool {
        self.steps.iter().any(|step| step.fire)
    }
}

/// Single-step instruction for when no script step is pending.
///
/// `heading == None` means idle: rotate once in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallbackOrder {
    pub heading: Option<Direction>,
    /// Shoot once aligned.
    pub fire: bool,
    /// Move forward once aligned (ignored when `fire` is set).
    pub advance: bool,
}

impl FallbackOrder {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn hold(heading: Direction) -> Self {
        Self {
            heading: Some(heading),
            fire: false,
            advance: false,
        }
    }
}

/// Everything the planner hands a unit for the next few ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOrders {
    pub role: RoleTag,
    /// Next cell the unit should occupy; its own cell when holding.
    pub waypoint: Position,
    pub plan: Plan,
    pub fallback: FallbackOrder,
}

/// Payload delivered to an executor. Unrecognized payloads are a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleInfo {
    Orders(BattleOrders),
    Unrecognized,
}
