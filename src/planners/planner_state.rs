use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::infra::{ReservationLedger, UnitId};
use crate::state::UnitState;

/// Opaque handle the game loop uses to name one of our units.
pub type UnitKey = u64;

/// State the team controller carries across planning cycles.
///
/// Passed by `&mut` into each planning call, one unit at a time.
#[derive(Debug, Clone, Default)]
pub struct TeamState {
    pub ledger: ReservationLedger,
    ids: HashMap<UnitKey, UnitId>,
    next_id: UnitId,
    units: BTreeMap<UnitId, UnitState>,
    tick: u64,
    planned_this_tick: BTreeSet<UnitId>,
}

impl TeamState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            ledger: ReservationLedger::new(width, height),
            ..Self::default()
        }
    }

    /// Stable id for `key`, handed out in order of first appearance.
    pub fn unit_id(&mut self, key: UnitKey) -> UnitId {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(key, id);
        self.units.insert(id, UnitState::new(id));
        tracing::debug!(key, id, role = %self.units[&id].role, "Registered unit");
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    /// Record for `id`, created on first use.
    pub fn unit_mut(&mut self, id: UnitId) -> &mut UnitState {
        self.units.entry(id).or_insert_with(|| UnitState::new(id))
    }

    /// Units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Team ticks started so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Open a new team tick: one ledger age, and every unit may plan again.
    pub fn start_tick(&mut self) {
        self.ledger.age();
        self.planned_this_tick.clear();
        self.tick += 1;
    }

    /// Record that `id` planned in the current tick. False if it already did.
    pub fn mark_planned(&mut self, id: UnitId) -> bool {
        self.planned_this_tick.insert(id)
    }

    /// Forget every unit and reservation, keeping the board size.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.ids.clear();
        self.units.clear();
        self.next_id = 0;
        self.tick = 0;
        self.planned_this_tick.clear();
    }
}
