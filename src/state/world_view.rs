use crate::infra::{Connectivity, Direction, Position, axis_distance, wrap};

/// Occupancy bits. Several may be set on one cell (a shell over a mine).
pub mod cell {
    pub const EMPTY: u8 = 0;
    pub const WALL: u8 = 1 << 0;
    pub const MINE: u8 = 1 << 1;
    pub const FRIEND: u8 = 1 << 2;
    pub const ENEMY: u8 = 1 << 3;
    pub const SHELL: u8 = 1 << 4;
}

/// Dense per-cell model of the battlefield for one planning cycle.
///
/// Rebuilt from the snapshot every cycle and owned by exactly one planning
/// call. Coordinates passed in must lie inside the board; wrapping is applied
/// only by the stepping helpers.
#[derive(Clone, Debug)]
pub struct WorldView {
    width: i32,
    height: i32,
    mask: Vec<u8>,
    danger: Vec<u32>,
    shell_eta: Vec<Option<u16>>,
}

impl WorldView {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = (width * height) as usize;
        Self {
            width,
            height,
            mask: vec![cell::EMPTY; cells],
            danger: vec![0; cells],
            shell_eta: vec![None; cells],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "{pos:?} outside {}x{}", self.width, self.height);
        (pos.y * self.width + pos.x) as usize
    }

    pub fn position(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.width, index / self.width)
    }

    pub fn cell_count(&self) -> usize {
        self.mask.len()
    }

    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(wrap(pos.x, self.width), wrap(pos.y, self.height))
    }

    /// The neighbouring cell along `dir`, across the wrap edge if needed.
    pub fn step(&self, pos: Position, dir: Direction) -> Position {
        self.wrap(pos.offset(dir))
    }

    /// The cell `distance` steps along `dir`.
    pub fn step_n(&self, pos: Position, dir: Direction, distance: i32) -> Position {
        let (dx, dy) = dir.delta();
        self.wrap(Position::new(pos.x + dx * distance, pos.y + dy * distance))
    }

    // --- Mask operations ---

    pub fn mask(&self, pos: Position) -> u8 {
        self.mask[self.index(pos)]
    }

    pub fn set_mask(&mut self, pos: Position, bits: u8) {
        let i = self.index(pos);
        self.mask[i] |= bits;
    }

    pub fn clear_mask(&mut self, pos: Position, bits: u8) {
        let i = self.index(pos);
        self.mask[i] &= !bits;
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.mask(pos) & cell::WALL != 0
    }

    pub fn is_mine(&self, pos: Position) -> bool {
        self.mask(pos) & cell::MINE != 0
    }

    pub fn has_friend(&self, pos: Position) -> bool {
        self.mask(pos) & cell::FRIEND != 0
    }

    pub fn has_enemy(&self, pos: Position) -> bool {
        self.mask(pos) & cell::ENEMY != 0
    }

    pub fn has_shell(&self, pos: Position) -> bool {
        self.mask(pos) & cell::SHELL != 0
    }

    /// Walls and mines are impassable.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.mask(pos) & (cell::WALL | cell::MINE) != 0
    }

    // --- Danger & shell ETA ---

    pub fn add_danger(&mut self, pos: Position, amount: u32) {
        let i = self.index(pos);
        self.danger[i] = self.danger[i].saturating_add(amount);
    }

    pub fn danger(&self, pos: Position) -> u32 {
        self.danger[self.index(pos)]
    }

    /// Keeps the earliest predicted arrival.
    pub fn record_shell_eta(&mut self, pos: Position, ticks: u16) {
        let i = self.index(pos);
        self.shell_eta[i] = Some(self.shell_eta[i].map_or(ticks, |eta| eta.min(ticks)));
    }

    pub fn shell_eta(&self, pos: Position) -> Option<u16> {
        self.shell_eta[self.index(pos)]
    }

    // --- Iteration ---

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn enemies(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells().filter(move |pos| self.has_enemy(*pos))
    }

    pub fn friends(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells().filter(move |pos| self.has_friend(*pos))
    }

    pub fn shells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells().filter(move |pos| self.has_shell(*pos))
    }

    /// Wrapped neighbours in the fixed enumeration order of `connectivity`.
    pub fn neighbors(
        &self,
        pos: Position,
        connectivity: Connectivity,
    ) -> impl Iterator<Item = (Direction, Position)> + '_ {
        let dirs: &'static [Direction] = match connectivity {
            Connectivity::Four => &Direction::CARDINAL,
            Connectivity::Eight => &Direction::ALL,
        };
        dirs.iter().map(move |&dir| (dir, self.step(pos, dir)))
    }

    /// Trapped means this is false: no neighbour under `connectivity` can be entered.
    pub fn any_passable_neighbor(&self, pos: Position, connectivity: Connectivity) -> bool {
        self.neighbors(pos, connectivity)
            .any(|(_, n)| !self.is_blocked(n))
    }

    // --- Toroidal distances ---

    pub fn dx(&self, a: Position, b: Position) -> i32 {
        axis_distance(a.x, b.x, self.width)
    }

    pub fn dy(&self, a: Position, b: Position) -> i32 {
        axis_distance(a.y, b.y, self.height)
    }

    pub fn manhattan(&self, a: Position, b: Position) -> i32 {
        self.dx(a, b) + self.dy(a, b)
    }

    /// Nearest enemy by toroidal Manhattan distance; ties go to the lower row, then column.
    pub fn nearest_enemy(&self, from: Position) -> Option<Position> {
        self.enemies()
            .min_by_key(|enemy| (self.manhattan(from, *enemy), enemy.row_major()))
    }

    pub fn nearest_enemy_distance(&self, from: Position) -> Option<i32> {
        self.enemies().map(|enemy| self.manhattan(from, enemy)).min()
    }
}
