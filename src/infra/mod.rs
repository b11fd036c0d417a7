mod config;
mod los;
mod pathfinding;
mod reservation;
mod types;

pub use config::{ConfigError, Connectivity, DangerConfig, RoleMode, TuningConfig};
pub use los::{
    HitKind, RayHit, first_hit_is_enemy, full_cycle, next_step_blocked, ray_cells,
    raycast_first_hit, raycast_with_reservations,
};
pub use pathfinding::AStar;
pub use reservation::{ReservationLedger, UnitId};
pub use types::{Direction, Position, Turn, axis_distance, axis_step_toward, unwrap_unit_delta, wrap};

// ============================================================================
// Helper functions
// ============================================================================

/// Heading of the step between two toroidally adjacent cells.
pub fn step_direction(from: Position, to: Position) -> Option<Direction> {
    Direction::from_delta(unwrap_unit_delta(to.x - from.x), unwrap_unit_delta(to.y - from.y))
}

/// Shortest toroidal heading from `from` toward `to`, one step per axis.
pub fn heading_toward(from: Position, to: Position, width: i32, height: i32) -> Option<Direction> {
    Direction::from_delta(
        axis_step_toward(from.x, to.x, width),
        axis_step_toward(from.y, to.y, height),
    )
}
