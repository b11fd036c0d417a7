use std::env;
use std::fs;

use dotenv::dotenv;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tankbot::infra::{HitKind, raycast_first_hit};
use tankbot::planners::UnitKey;
use tankbot::state::{SensorySnapshot, Symbol, build_world_view};
use tankbot::{
    Action, Direction, GridSnapshot, MatchSettings, Position, ScriptedExecutor, TeamPlanner,
    TuningConfig,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Upper bound on actions one set of orders may drive before re-planning.
const ACTIONS_PER_ORDER: usize = 8;

fn get_env_var_i32(key: &str) -> Option<i32> {
    env::var(key).ok().and_then(|val| val.parse::<i32>().ok())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tankbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

/// Scatter walls, mines and two small squads over an empty torus.
fn random_board(width: i32, height: i32, squad: usize, seed: u64) -> GridSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = GridSnapshot::empty(width, height);

    for y in 0..height {
        for x in 0..width {
            let roll: f64 = rng.random();
            let symbol = if roll < 0.10 {
                Symbol::Wall
            } else if roll < 0.13 {
                Symbol::Mine
            } else {
                continue;
            };
            board.set(Position::new(x, y), symbol);
        }
    }

    for team in [1u8, 2] {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < squad && attempts < 10_000 {
            attempts += 1;
            let pos = Position::new(rng.random_range(0..width), rng.random_range(0..height));
            if board.object_at(pos.x, pos.y) == ' ' {
                board.set(pos, Symbol::Unit { team });
                placed += 1;
            }
        }
    }
    board
}

struct Tank {
    key: UnitKey,
    pos: Position,
    executor: ScriptedExecutor,
}

/// Apply one action to the board. Enemies stand still; shells hit instantly.
fn apply(board: &mut GridSnapshot, team: u8, tank: &mut Tank, action: Action) {
    let (width, height) = (board.width(), board.height());
    let facing = tank.executor.facing();
    match action {
        Action::MoveForward => {
            let (dx, dy) = facing.delta();
            let next = Position::new((tank.pos.x + dx).rem_euclid(width), (tank.pos.y + dy).rem_euclid(height));
            if board.object_at(next.x, next.y) == ' ' {
                board.set(tank.pos, Symbol::Empty);
                board.set(next, Symbol::Unit { team });
                tank.pos = next;
            } else {
                tracing::debug!(key = tank.key, ?facing, "Bumped");
            }
        }
        Action::Shoot => {
            let (view, _) = build_world_view(board, width, height, team);
            let hit = raycast_first_hit(&view, tank.pos, facing, 0);
            match hit.kind {
                HitKind::Enemy | HitKind::Wall => {
                    tracing::info!(key = tank.key, ?facing, kind = ?hit.kind, x = hit.pos.x, y = hit.pos.y, "Hit");
                    board.set(hit.pos, Symbol::Empty);
                }
                kind => tracing::debug!(key = tank.key, ?facing, ?kind, "Shot wasted"),
            }
        }
        _ => {}
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = TuningConfig::from_env()?;
    let team = get_env_var_i32("TANKBOT_TEAM").unwrap_or(1).clamp(1, 2) as u8;
    let rounds = get_env_var_i32("TANKBOT_ROUNDS").unwrap_or(40).max(1);

    let mut board = match env::var("TANKBOT_MAP") {
        Ok(path) => {
            tracing::info!("Loading board from {}", path);
            fs::read_to_string(&path)?.parse::<GridSnapshot>()?
        }
        Err(_) => {
            let width = get_env_var_i32("TANKBOT_WIDTH").unwrap_or(24).max(3);
            let height = get_env_var_i32("TANKBOT_HEIGHT").unwrap_or(13).max(3);
            let seed = get_env_var_i32("TANKBOT_SEED").unwrap_or(1) as u64;
            tracing::info!(width, height, seed, "Generating board");
            random_board(width, height, 3, seed)
        }
    };

    let mut settings = MatchSettings::new(board.width(), board.height(), team);
    settings.max_steps = rounds as u32;
    let mut planner = TeamPlanner::new(settings, config);

    let mut tanks: Vec<Tank> = board
        .units_of(team)
        .into_iter()
        .enumerate()
        .map(|(key, pos)| Tank {
            key: key as UnitKey,
            pos,
            executor: ScriptedExecutor::new(Direction::East),
        })
        .collect();
    tracing::info!("{} units on team {}\n{}", tanks.len(), team, board.render());

    let enemy_team = if team == 1 { 2 } else { 1 };
    for round in 0..rounds {
        planner.begin_tick();
        for tank in &mut tanks {
            let snapshot = board.viewed_by(tank.pos, team);
            let info = planner.plan_for(tank.key, &snapshot);
            tank.executor.update_battle_info(info);

            for _ in 0..ACTIONS_PER_ORDER {
                let action = tank.executor.get_action();
                if action == Action::GetBattleInfo {
                    break;
                }
                tracing::debug!(round, key = tank.key, %action, "Act");
                apply(&mut board, team, tank, action);
            }
        }

        let enemies_left = board.units_of(enemy_team).len();
        if enemies_left == 0 {
            tracing::info!(round, "All enemies destroyed");
            break;
        }
        tracing::info!(round, enemies_left, "Round finished");
    }

    tracing::info!("Final board\n{}", board.render());
    Ok(())
}
