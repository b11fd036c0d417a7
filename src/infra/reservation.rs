use crate::infra::Position;

/// Deterministic per-unit identifier. Lower ids win reservation conflicts.
pub type UnitId = u32;

/// Team-wide movement reservations and announced fire lanes.
///
/// Owned by the team controller and handed by `&mut` into each planning call,
/// so there is never more than one writer. Both layers are TTL counters that
/// `age` decrements once per planning call.
#[derive(Debug, Clone, Default)]
pub struct ReservationLedger {
    width: i32,
    height: i32,
    move_owner: Vec<Option<UnitId>>,
    move_ttl: Vec<u8>,
    shot_ttl: Vec<u8>,
}

impl ReservationLedger {
    pub fn new(width: i32, height: i32) -> Self {
        let mut ledger = Self::default();
        ledger.reset(width, height);
        ledger
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Resize to the board, clearing everything only if the dimensions changed.
    pub fn ensure(&mut self, width: i32, height: i32) {
        if self.width == width && self.height == height {
            return;
        }
        tracing::debug!(width, height, "Resizing reservation ledger");
        self.reset(width, height);
    }

    pub fn reset(&mut self, width: i32, height: i32) {
        let width = width.max(0);
        let height = height.max(0);
        let cells = (width * height) as usize;
        self.width = width;
        self.height = height;
        self.move_owner = vec![None; cells];
        self.move_ttl = vec![0; cells];
        self.shot_ttl = vec![0; cells];
    }

    /// Drop every reservation and lane without resizing.
    pub fn clear(&mut self) {
        self.move_owner.fill(None);
        self.move_ttl.fill(0);
        self.shot_ttl.fill(0);
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(
            pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height,
            "{pos:?} outside ledger {}x{}",
            self.width,
            self.height
        );
        (pos.y * self.width + pos.x) as usize
    }

    /// One tick passes: every live TTL drops by one and expired cells lose their owner.
    pub fn age(&mut self) {
        for ttl in self.move_ttl.iter_mut().chain(self.shot_ttl.iter_mut()) {
            *ttl = ttl.saturating_sub(1);
        }
        for (owner, ttl) in self.move_owner.iter_mut().zip(&self.move_ttl) {
            if *ttl == 0 {
                *owner = None;
            }
        }
    }

    /// Claim `pos` for `id` for `ttl` ticks.
    ///
    /// Succeeds on a free cell, on a cell the requester already owns (refreshing
    /// the TTL), or when the requester's id is lower than the current owner's.
    pub fn reserve_move(&mut self, pos: Position, id: UnitId, ttl: u8) -> bool {
        let i = self.index(pos);
        let ttl = ttl.max(1);
        let granted = match self.move_owner[i] {
            _ if self.move_ttl[i] == 0 => true,
            Some(owner) => id <= owner,
            None => true,
        };
        if granted {
            self.move_owner[i] = Some(id);
            self.move_ttl[i] = ttl;
        }
        tracing::trace!(x = pos.x, y = pos.y, id, ttl, granted, "reserve_move");
        granted
    }

    /// The live owner of `pos`, if any.
    pub fn is_reserved(&self, pos: Position) -> Option<UnitId> {
        let i = self.index(pos);
        if self.move_ttl[i] == 0 {
            None
        } else {
            self.move_owner[i]
        }
    }

    /// Reserved by a unit other than `id`.
    pub fn is_reserved_by_other(&self, pos: Position, id: UnitId) -> bool {
        self.is_reserved(pos).is_some_and(|owner| owner != id)
    }

    pub fn remaining_ttl(&self, pos: Position) -> u8 {
        self.move_ttl[self.index(pos)]
    }

    pub fn mark_shot(&mut self, pos: Position, ttl: u8) {
        let i = self.index(pos);
        self.shot_ttl[i] = ttl.max(1);
    }

    pub fn has_shot(&self, pos: Position) -> bool {
        self.shot_ttl[self.index(pos)] != 0
    }

    pub fn live_reservations(&self) -> usize {
        self.move_ttl.iter().filter(|ttl| **ttl != 0).count()
    }
}
