pub mod danger;
mod snapshot;
mod unit_state;
mod world_view;

pub use snapshot::{GridSnapshot, SensorySnapshot, SnapshotError, Symbol, build_world_view};
pub use unit_state::UnitState;
pub use world_view::{WorldView, cell};
