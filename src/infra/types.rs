#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one step away along `dir`, without wrapping.
    pub fn offset(&self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Row-major ordering key used by every deterministic tie-break.
    pub fn row_major(&self) -> (i32, i32) {
        (self.y, self.x)
    }
}

/// `((v mod m) + m) mod m`
pub fn wrap(v: i32, m: i32) -> i32 {
    ((v % m) + m) % m
}

/// Minimal distance between two coordinates on one wrapping axis.
pub fn axis_distance(a: i32, b: i32, m: i32) -> i32 {
    let d = (a - b).abs();
    d.min(m - d)
}

/// Signed unit step from `a` toward `b` on a wrapping axis, taking the shorter way round.
/// An exact half-turn tie goes the positive way.
pub fn axis_step_toward(a: i32, b: i32, m: i32) -> i32 {
    if a == b {
        return 0;
    }
    let forward = wrap(b - a, m);
    let backward = wrap(a - b, m);
    if forward <= backward { 1 } else { -1 }
}

/// Collapse a raw delta between two toroidally adjacent cells back to `{-1, 0, 1}`.
pub fn unwrap_unit_delta(raw: i32) -> i32 {
    if raw > 1 {
        -1
    } else if raw < -1 {
        1
    } else {
        raw.signum()
    }
}

/// Unit facing, quantized to 45 degrees. Screen coordinates: y grows downward,
/// so `rotate_right` is clockwise on screen. Discriminants are the facing angle / 45.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    #[default]
    East = 0,
    SouthEast = 1,
    South = 2,
    SouthWest = 3,
    West = 4,
    NorthWest = 5,
    North = 6,
    NorthEast = 7,
}

/// Rotation toward a target facing, one 45 degree increment per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

impl Direction {
    /// Fixed enumeration order for every 8-way scan.
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    /// Fixed enumeration order for every 4-way scan: right, left, down, up.
    pub const CARDINAL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % 8]
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
        }
    }

    /// Direction for a unit delta. Components are clamped to their sign;
    /// `(0, 0)` has no direction.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        let (dx, dy) = (dx.signum(), dy.signum());
        Self::ALL.into_iter().find(|dir| dir.delta() == (dx, dy))
    }

    /// Snap an arbitrary angle in degrees to the nearest 45 degree facing.
    pub fn from_degrees(deg: i32) -> Direction {
        let a = deg.rem_euclid(360);
        Self::from_index((((a + 22) / 45) % 8) as usize)
    }

    pub fn degrees(self) -> i32 {
        self.index() as i32 * 45
    }

    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    pub fn rotate_left(self) -> Direction {
        Self::from_index(self.index() + 7)
    }

    pub fn rotate_right(self) -> Direction {
        Self::from_index(self.index() + 1)
    }

    pub fn rotated(self, turn: Turn) -> Direction {
        match turn {
            Turn::Left => self.rotate_left(),
            Turn::Right => self.rotate_right(),
        }
    }

    /// One 45 degree step toward `target` along the shorter arc; a 180 degree
    /// tie turns left. `None` when already aligned.
    pub fn turn_toward(self, target: Direction) -> Option<Turn> {
        if self == target {
            return None;
        }
        let cw = (target.index() + 8 - self.index()) % 8;
        let ccw = (self.index() + 8 - target.index()) % 8;
        if ccw <= cw {
            Some(Turn::Left)
        } else {
            Some(Turn::Right)
        }
    }
}
