mod executor;
mod orders;
mod planner;
mod planner_state;
mod reactive;
mod roles;

#[cfg(test)]
mod scenarios;

pub use executor::ScriptedExecutor;
pub use orders::{Action, BattleInfo, BattleOrders, FallbackOrder, Plan, PlanStep};
pub use planner::{MatchSettings, TeamPlanner, pick_breach_wall};
pub use planner_state::{TeamState, UnitKey};
pub use reactive::ReactiveExecutor;
pub use roles::{
    RoleSignals, RoleTag, assign_role, initial_role, keep_role, next_role, target_for_aggressor,
    target_for_anchor, target_for_flanker, target_for_role, target_for_survivor,
};
