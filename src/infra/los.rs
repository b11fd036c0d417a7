use crate::infra::{Direction, Position, ReservationLedger, UnitId};
use crate::state::WorldView;

/// What a ray ran into first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitKind {
    #[default]
    None,
    Wall,
    Friend,
    Enemy,
    Shell,
    Mine,
    /// A cell a teammate has reserved; only reported by the reservation-aware cast.
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RayHit {
    pub kind: HitKind,
    pub pos: Position,
    /// Steps from the origin to `pos`.
    pub steps: usize,
}

impl RayHit {
    pub fn is_enemy(&self) -> bool {
        self.kind == HitKind::Enemy
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Steps before a ray along `dir` revisits its origin on the torus.
pub fn full_cycle(width: i32, height: i32, dir: Direction) -> usize {
    let (dx, dy) = dir.delta();
    let px = if dx == 0 { 1 } else { width.max(1) as usize };
    let py = if dy == 0 { 1 } else { height.max(1) as usize };
    px / gcd(px, py) * py
}

/// Classify a single cell in fixed precedence: wall, friend, enemy, shell, mine.
fn classify(view: &WorldView, pos: Position) -> HitKind {
    if view.is_wall(pos) {
        HitKind::Wall
    } else if view.has_friend(pos) {
        HitKind::Friend
    } else if view.has_enemy(pos) {
        HitKind::Enemy
    } else if view.has_shell(pos) {
        HitKind::Shell
    } else if view.is_mine(pos) {
        HitKind::Mine
    } else {
        HitKind::None
    }
}

fn march<F>(view: &WorldView, from: Position, dir: Direction, max_steps: usize, mut probe: F) -> RayHit
where
    F: FnMut(Position) -> HitKind,
{
    if view.is_empty() {
        return RayHit::default();
    }
    let cycle = full_cycle(view.width(), view.height(), dir);
    let limit = if max_steps == 0 { cycle } else { max_steps.min(cycle) };

    let mut cur = from;
    for steps in 1..=limit {
        cur = view.step(cur, dir);
        if cur == from {
            break;
        }
        let kind = probe(cur);
        if kind != HitKind::None {
            tracing::trace!(x = cur.x, y = cur.y, steps, ?kind, "Ray hit");
            return RayHit { kind, pos: cur, steps };
        }
    }
    RayHit::default()
}

/// March from `from` along `dir` and report the first non-empty cell.
///
/// `max_steps == 0` covers one full toroidal cycle. Returning to the origin
/// ends the march with no hit.
pub fn raycast_first_hit(view: &WorldView, from: Position, dir: Direction, max_steps: usize) -> RayHit {
    march(view, from, dir, max_steps, |pos| classify(view, pos))
}

/// Like [`raycast_first_hit`], but a cell reserved by any unit other than
/// `me` blocks before anything else is checked.
pub fn raycast_with_reservations(
    view: &WorldView,
    ledger: &ReservationLedger,
    me: UnitId,
    from: Position,
    dir: Direction,
    max_steps: usize,
) -> RayHit {
    march(view, from, dir, max_steps, |pos| {
        if ledger.is_reserved_by_other(pos, me) {
            HitKind::Reserved
        } else {
            classify(view, pos)
        }
    })
}

/// Would a shot fired from `from` along `facing` hit an enemy first?
pub fn first_hit_is_enemy(
    view: &WorldView,
    ledger: &ReservationLedger,
    me: UnitId,
    from: Position,
    facing: Direction,
) -> bool {
    raycast_with_reservations(view, ledger, me, from, facing, 0).is_enemy()
}

/// Cells a ray crosses, origin excluded, for `steps` steps.
pub fn ray_cells(view: &WorldView, from: Position, dir: Direction, steps: usize) -> Vec<Position> {
    (1..=steps as i32).map(|s| view.step_n(from, dir, s)).collect()
}

/// The cell straight ahead is a wall, a mine, or holds a friend.
pub fn next_step_blocked(view: &WorldView, from: Position, facing: Direction) -> bool {
    let next = view.step(from, facing);
    view.is_blocked(next) || view.has_friend(next)
}
