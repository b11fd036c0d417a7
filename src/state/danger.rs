//! Additive risk seeding. Every pass only adds, so the passes can run in any order.

use crate::infra::{DangerConfig, Direction, Position, full_cycle};
use crate::state::WorldView;

/// `base - decay * (step - 1)`, floored at zero.
fn decayed(base: u32, decay: u32, step: u32) -> u32 {
    base.saturating_sub(decay.saturating_mul(step.saturating_sub(1)))
}

fn sightline_dirs(include_diagonals: bool) -> &'static [Direction] {
    const ORTHOGONAL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];
    if include_diagonals {
        &Direction::ALL
    } else {
        &ORTHOGONAL
    }
}

/// Paint one decaying ray. Stops at a wall, at `max_range`, or when the contribution reaches zero.
fn add_decaying_ray(
    view: &mut WorldView,
    from: Position,
    dir: Direction,
    base: u32,
    decay: u32,
    max_range: usize,
) {
    let full = full_cycle(view.width(), view.height(), dir).saturating_sub(1);
    let limit = if max_range == 0 { full } else { full.min(max_range) };

    let mut cur = from;
    for step in 1..=limit as u32 {
        cur = view.step(cur, dir);
        if view.is_wall(cur) {
            break;
        }
        let add = decayed(base, decay, step);
        if add == 0 {
            break;
        }
        view.add_danger(cur, add);
    }
}

/// Decaying threat along every visible enemy's firing lines.
pub fn seed_enemy_sightlines(view: &mut WorldView, config: &DangerConfig) {
    if view.is_empty() || config.enemy_los_base == 0 {
        return;
    }
    let enemies: Vec<Position> = view.enemies().collect();
    for enemy in &enemies {
        for &dir in sightline_dirs(config.enemy_los_diagonals) {
            add_decaying_ray(
                view,
                *enemy,
                dir,
                config.enemy_los_base,
                config.enemy_los_decay,
                config.enemy_los_range,
            );
        }
    }
    tracing::trace!(enemies = enemies.len(), "Seeded enemy sightlines");
}

/// Flat danger on every cell a shell occupies right now.
pub fn seed_shell_immediate(view: &mut WorldView, config: &DangerConfig) {
    let shells: Vec<Position> = view.shells().collect();
    for shell in shells {
        view.add_danger(shell, config.shell_base);
        view.record_shell_eta(shell, 0);
    }
}

/// Shells fly two cells per tick with unknown heading: mark where each one could be
/// after `t` ticks in every direction, and optionally the cell it passes on the way.
pub fn seed_shell_predictive(view: &mut WorldView, config: &DangerConfig) {
    let shells: Vec<Position> = view.shells().collect();
    for shell in &shells {
        for dir in Direction::ALL {
            let mut walled = false;
            for t in 1..=config.shell_horizon {
                let add = decayed(config.shell_base, config.shell_decay, u32::from(t));
                if add == 0 {
                    break;
                }
                let landing = 2 * i32::from(t);
                let first = if config.shell_mark_passing { landing - 1 } else { landing };
                for distance in first..=landing {
                    let pos = view.step_n(*shell, dir, distance);
                    if view.is_wall(pos) {
                        walled = true;
                        break;
                    }
                    if distance == landing || config.shell_mark_passing {
                        view.add_danger(pos, add);
                        view.record_shell_eta(pos, t);
                    }
                }
                if walled {
                    break;
                }
            }
        }
    }
    tracing::trace!(shells = shells.len(), "Seeded predicted shell danger");
}

/// Flat penalty on open cells that have a wall within `radius` along either axis.
pub fn seed_wall_proximity(view: &mut WorldView, penalty: u32, radius: i32) {
    if radius <= 0 || penalty == 0 {
        return;
    }
    let near: Vec<Position> = view
        .cells()
        .filter(|pos| !view.is_wall(*pos))
        .filter(|pos| {
            (1..=radius).any(|r| {
                Direction::CARDINAL
                    .iter()
                    .any(|dir| view.is_wall(view.step_n(*pos, *dir, r)))
            })
        })
        .collect();
    for pos in near {
        view.add_danger(pos, penalty);
    }
}

/// Run every pass with the configured coefficients.
pub fn seed_all(view: &mut WorldView, config: &DangerConfig) {
    seed_enemy_sightlines(view, config);
    seed_shell_immediate(view, config);
    seed_shell_predictive(view, config);
    seed_wall_proximity(view, config.wall_proximity, config.wall_proximity_radius);
}
