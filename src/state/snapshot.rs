use std::str::FromStr;

use thiserror::Error;

use crate::infra::Position;
use crate::state::{WorldView, cell};

/// Read-only sensory view of the board as the game loop hands it over.
pub trait SensorySnapshot {
    /// Symbol at `(x, y)`; `' '` for empty.
    fn object_at(&self, x: i32, y: i32) -> char;
}

/// Board symbols understood by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Empty,
    Wall,
    Mine,
    Shell,
    /// The unit that asked for this snapshot.
    SelfUnit,
    Unit { team: u8 },
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            ' ' | '.' => Some(Symbol::Empty),
            '#' => Some(Symbol::Wall),
            '@' => Some(Symbol::Mine),
            '*' => Some(Symbol::Shell),
            '%' => Some(Symbol::SelfUnit),
            '1' => Some(Symbol::Unit { team: 1 }),
            '2' => Some(Symbol::Unit { team: 2 }),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Symbol::Empty => ' ',
            Symbol::Wall => '#',
            Symbol::Mine => '@',
            Symbol::Shell => '*',
            Symbol::SelfUnit => '%',
            Symbol::Unit { team } => char::from_digit(u32::from(team), 10).unwrap_or('?'),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("board is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
}

/// A rectangular character board, used by tests and the demo binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    width: i32,
    height: i32,
    rows: Vec<Vec<char>>,
}

impl GridSnapshot {
    pub fn empty(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            rows: vec![vec![' '; width as usize]; height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, pos: Position, symbol: Symbol) {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return;
        }
        self.rows[pos.y as usize][pos.x as usize] = symbol.to_char();
    }

    /// Same board with every `%` marker replaced by a plain unit of `team`,
    /// then `%` placed at `me`.
    pub fn viewed_by(&self, me: Position, team: u8) -> GridSnapshot {
        let mut snapshot = self.clone();
        for row in &mut snapshot.rows {
            for c in row.iter_mut() {
                if *c == '%' {
                    *c = Symbol::Unit { team }.to_char();
                }
            }
        }
        snapshot.set(me, Symbol::SelfUnit);
        snapshot
    }

    /// Positions of units belonging to `team` (including a `%` marker), row-major.
    pub fn units_of(&self, team: u8) -> Vec<Position> {
        let own = Symbol::Unit { team }.to_char();
        let mut units = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                if *c == own || *c == '%' {
                    units.push(Position::new(x as i32, y as i32));
                }
            }
        }
        units
    }

    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SensorySnapshot for GridSnapshot {
    fn object_at(&self, x: i32, y: i32) -> char {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return ' ';
        }
        self.rows[y as usize][x as usize]
    }
}

impl FromStr for GridSnapshot {
    type Err = SnapshotError;

    /// One line per row; blank leading and trailing lines are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let lines: Vec<&str> = match lines.iter().rposition(|line| !line.trim().is_empty()) {
            Some(last) => lines[..=last].to_vec(),
            None => return Err(SnapshotError::Empty),
        };

        let expected = lines[0].chars().count();
        let mut rows = Vec::with_capacity(lines.len());
        for (y, line) in lines.iter().enumerate() {
            let row: Vec<char> = line.chars().collect();
            if row.len() != expected {
                return Err(SnapshotError::RaggedRow {
                    row: y,
                    expected,
                    found: row.len(),
                });
            }
            if let Some((x, &symbol)) = row
                .iter()
                .enumerate()
                .find(|(_, c)| Symbol::from_char(**c).is_none())
            {
                return Err(SnapshotError::UnknownSymbol { symbol, x, y });
            }
            rows.push(row);
        }

        Ok(GridSnapshot {
            width: expected as i32,
            height: rows.len() as i32,
            rows,
        })
    }
}

/// Scan a snapshot once into a fresh [`WorldView`].
///
/// Returns the view and the requesting unit's position: the `%` marker, else
/// the first friend in row-major order, else the origin.
pub fn build_world_view<S: SensorySnapshot + ?Sized>(
    snapshot: &S,
    width: i32,
    height: i32,
    team: u8,
) -> (WorldView, Position) {
    let mut view = WorldView::new(width, height);
    let mut me = None;

    for y in 0..view.height() {
        for x in 0..view.width() {
            let pos = Position::new(x, y);
            match Symbol::from_char(snapshot.object_at(x, y)) {
                Some(Symbol::Wall) => view.set_mask(pos, cell::WALL),
                Some(Symbol::Mine) => view.set_mask(pos, cell::MINE),
                Some(Symbol::Shell) => view.set_mask(pos, cell::SHELL),
                Some(Symbol::SelfUnit) => {
                    view.set_mask(pos, cell::FRIEND);
                    me.get_or_insert(pos);
                }
                Some(Symbol::Unit { team: owner }) if owner == team => {
                    view.set_mask(pos, cell::FRIEND)
                }
                Some(Symbol::Unit { .. }) => view.set_mask(pos, cell::ENEMY),
                Some(Symbol::Empty) | None => {}
            }
        }
    }

    let me = me
        .or_else(|| view.friends().next())
        .unwrap_or(Position::new(0, 0));
    (view, me)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_build() {
        let snapshot: GridSnapshot = "\
#....
.%.2.
..@*1"
            .parse()
            .unwrap();
        assert_eq!((snapshot.width(), snapshot.height()), (5, 3));

        let (view, me) = build_world_view(&snapshot, 5, 3, 1);
        assert_eq!(me, Position::new(1, 1));
        assert!(view.is_wall(Position::new(0, 0)));
        assert!(view.has_friend(Position::new(1, 1)));
        assert!(view.has_enemy(Position::new(3, 1)));
        assert!(view.is_mine(Position::new(2, 2)));
        assert!(view.has_shell(Position::new(3, 2)));
        assert!(view.has_friend(Position::new(4, 2)));
    }

    #[test]
    fn test_team_two_sees_team_one_as_enemy() {
        let snapshot: GridSnapshot = "1..2".parse().unwrap();
        let (view, me) = build_world_view(&snapshot, 4, 1, 2);
        assert!(view.has_enemy(Position::new(0, 0)));
        assert!(view.has_friend(Position::new(3, 0)));
        assert_eq!(me, Position::new(3, 0), "without % the first friend is the requester");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("\n\n".parse::<GridSnapshot>(), Err(SnapshotError::Empty));
        assert_eq!(
            "...\n..".parse::<GridSnapshot>(),
            Err(SnapshotError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            "..x".parse::<GridSnapshot>(),
            Err(SnapshotError::UnknownSymbol {
                symbol: 'x',
                x: 2,
                y: 0
            })
        );
    }

    struct Garbage;

    impl SensorySnapshot for Garbage {
        fn object_at(&self, x: i32, _y: i32) -> char {
            if x == 0 { '?' } else { '#' }
        }
    }

    #[test]
    fn test_builder_treats_unknown_symbols_as_empty() {
        let (view, me) = build_world_view(&Garbage, 3, 2, 1);
        assert_eq!(view.mask(Position::new(0, 1)), cell::EMPTY);
        assert!(view.is_wall(Position::new(2, 1)));
        assert_eq!(me, Position::new(0, 0));
    }

    #[test]
    fn test_viewed_by_moves_marker() {
        let snapshot: GridSnapshot = "%.1".parse().unwrap();
        let moved = snapshot.viewed_by(Position::new(2, 0), 1);
        assert_eq!(moved.render(), "1.%");
        assert_eq!(moved.units_of(1), vec![Position::new(0, 0), Position::new(2, 0)]);
    }
}
