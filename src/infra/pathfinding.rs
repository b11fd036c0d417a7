use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::infra::{Connectivity, Direction, Position};
use crate::state::WorldView;

type Cost = u32;

const CARDINAL_COST_4: Cost = 1;
const CARDINAL_COST_8: Cost = 10;
const DIAGONAL_COST_8: Cost = 14;

#[derive(Clone, Eq, PartialEq)]
struct Node {
    pos: Position,
    f_score: Cost,
    g_score: Cost,
    h_score: Cost,
    seq: u64,
}

impl Node {
    fn key(&self) -> (Cost, Cost, Cost, i32, i32, u64) {
        (self.f_score, self.g_score, self.h_score, self.pos.y, self.pos.x, self.seq)
    }
}

impl Ord for Node {
    // Reversed: BinaryHeap is a max-heap and we want the smallest key on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStar;

impl AStar {
    /// Risk-weighted shortest path over the torus, start and goal inclusive.
    ///
    /// Entering a cell costs the move's base cost plus that cell's danger.
    /// Walls and mines are never entered. Empty when either end is off the
    /// board or the goal is unreachable; `[start]` when `start == goal`.
    pub fn find_path(
        view: &WorldView,
        start: Position,
        goal: Position,
        connectivity: Connectivity,
    ) -> Vec<Position> {
        if view.is_empty() || !view.contains(start) || !view.contains(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let cells = view.cell_count();
        let mut best_g: Vec<Cost> = vec![Cost::MAX; cells];
        let mut came_from: Vec<Option<usize>> = vec![None; cells];
        let mut open_set = BinaryHeap::new();
        let mut seq: u64 = 0;

        let start_i = view.index(start);
        let goal_i = view.index(goal);
        let h0 = heuristic(view, start, goal, connectivity);
        best_g[start_i] = 0;
        open_set.push(Node {
            pos: start,
            f_score: h0,
            g_score: 0,
            h_score: h0,
            seq,
        });

        let mut expansions = 0usize;
        while let Some(node) = open_set.pop() {
            let current_i = view.index(node.pos);
            if node.g_score != best_g[current_i] {
                continue; // stale
            }
            if current_i == goal_i {
                let path = reconstruct_path(view, &came_from, goal_i);
                tracing::trace!(expansions, len = path.len(), cost = node.g_score, "A* reached goal");
                return path;
            }
            expansions += 1;

            for (dir, neighbor) in view.neighbors(node.pos, connectivity) {
                if view.is_blocked(neighbor) {
                    continue;
                }
                let tentative_g = node
                    .g_score
                    .saturating_add(step_cost(dir, connectivity))
                    .saturating_add(view.danger(neighbor));
                let neighbor_i = view.index(neighbor);
                if tentative_g < best_g[neighbor_i] {
                    best_g[neighbor_i] = tentative_g;
                    came_from[neighbor_i] = Some(current_i);
                    let h = heuristic(view, neighbor, goal, connectivity);
                    seq += 1;
                    open_set.push(Node {
                        pos: neighbor,
                        f_score: tentative_g.saturating_add(h),
                        g_score: tentative_g,
                        h_score: h,
                        seq,
                    });
                }
            }
        }

        tracing::trace!(expansions, ?start, ?goal, "A* exhausted open set");
        Vec::new()
    }

    /// Summed entry cost of a path as the search sees it.
    pub fn path_cost(view: &WorldView, path: &[Position], connectivity: Connectivity) -> Cost {
        path.windows(2)
            .filter_map(|pair| {
                let dx = crate::infra::unwrap_unit_delta(pair[1].x - pair[0].x);
                let dy = crate::infra::unwrap_unit_delta(pair[1].y - pair[0].y);
                Direction::from_delta(dx, dy)
                    .map(|dir| step_cost(dir, connectivity).saturating_add(view.danger(pair[1])))
            })
            .fold(0, Cost::saturating_add)
    }
}

fn step_cost(dir: Direction, connectivity: Connectivity) -> Cost {
    match connectivity {
        Connectivity::Four => CARDINAL_COST_4,
        Connectivity::Eight if dir.is_diagonal() => DIAGONAL_COST_8,
        Connectivity::Eight => CARDINAL_COST_8,
    }
}

/// Toroidal Manhattan for 4-way, toroidal octile (10/14 scale) for 8-way.
fn heuristic(view: &WorldView, a: Position, b: Position, connectivity: Connectivity) -> Cost {
    let dx = view.dx(a, b) as Cost;
    let dy = view.dy(a, b) as Cost;
    match connectivity {
        Connectivity::Four => dx + dy,
        Connectivity::Eight => {
            CARDINAL_COST_8 * (dx + dy) - (2 * CARDINAL_COST_8 - DIAGONAL_COST_8) * dx.min(dy)
        }
    }
}

fn reconstruct_path(view: &WorldView, came_from: &[Option<usize>], goal_i: usize) -> Vec<Position> {
    let mut path = vec![view.position(goal_i)];
    let mut current = goal_i;
    while let Some(prev) = came_from[current] {
        path.push(view.position(prev));
        current = prev;
    }
    path.reverse();
    path
}
