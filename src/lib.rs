pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use infra::{AStar, Direction, Position, ReservationLedger, TuningConfig};
pub use planners::{Action, BattleInfo, MatchSettings, ScriptedExecutor, TeamPlanner};
pub use state::{GridSnapshot, WorldView};
