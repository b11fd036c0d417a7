use crate::infra::{
    AStar, Connectivity, Direction, Position, RayHit, RoleMode, TuningConfig, UnitId,
    heading_toward, ray_cells, raycast_with_reservations, step_direction,
};
use crate::planners::{
    BattleInfo, BattleOrders, FallbackOrder, Plan, PlanStep, RoleSignals, RoleTag, TeamState,
    UnitKey, next_role, target_for_role,
};
use crate::state::{SensorySnapshot, WorldView, build_world_view, danger};

/// Match parameters handed over by the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub width: i32,
    pub height: i32,
    /// Our team number as it appears in the snapshot (`1` or `2`).
    pub team: u8,
    pub max_steps: u32,
    pub ammo_budget: u32,
}

impl MatchSettings {
    pub fn new(width: i32, height: i32, team: u8) -> Self {
        Self {
            width,
            height,
            team,
            max_steps: 1000,
            ammo_budget: 16,
        }
    }
}

/// Which branch produced a set of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    CleanShot,
    Breach,
    SniperShot,
    SniperHold,
    Idle,
    Route,
    Hold,
}

/// Plans for every unit of one team, one unit at a time, sharing a single ledger.
#[derive(Debug, Clone)]
pub struct TeamPlanner {
    config: TuningConfig,
    settings: MatchSettings,
    state: TeamState,
}

impl TeamPlanner {
    pub fn new(settings: MatchSettings, config: TuningConfig) -> Self {
        Self {
            config,
            settings,
            state: TeamState::new(settings.width, settings.height),
        }
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn state(&self) -> &TeamState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TeamState {
        &mut self.state
    }

    /// Start a team tick: age the ledger once, before any unit of the tick plans.
    ///
    /// Planning a unit twice without calling this starts the next tick
    /// implicitly.
    pub fn begin_tick(&mut self) {
        let MatchSettings { width, height, .. } = self.settings;
        self.state.ledger.ensure(width, height);
        self.state.start_tick();
        tracing::debug!(
            tick = self.state.tick(),
            reservations = self.state.ledger.live_reservations(),
            "Tick started"
        );
    }

    /// Run one planning cycle for `unit` against a fresh snapshot.
    ///
    /// Precedence: clean shot, trapped handling, idle when no enemy is
    /// visible, then the role route. Always yields orders.
    #[tracing::instrument(level = "debug", skip(self, snapshot), fields(team = self.settings.team))]
    pub fn plan_for<S: SensorySnapshot + ?Sized>(&mut self, unit: UnitKey, snapshot: &S) -> BattleInfo {
        let MatchSettings { width, height, team, .. } = self.settings;
        let (mut view, me) = build_world_view(snapshot, width, height, team);
        if view.is_empty() {
            tracing::warn!("Empty board, idling");
            return BattleInfo::Orders(BattleOrders {
                role: RoleTag::Anchor,
                waypoint: me,
                plan: Plan::default(),
                fallback: FallbackOrder::idle(),
            });
        }

        self.state.ledger.ensure(width, height);
        let id = self.state.unit_id(unit);
        if !self.state.mark_planned(id) {
            self.begin_tick();
            self.state.mark_planned(id);
        }

        danger::seed_all(&mut view, &self.config.danger);
        self.apply_team_penalties(&mut view, id);

        let aim = self.find_clean_aim(&view, id, me);
        let role = self.resolve_role(id, &view, me, aim.is_some());
        let ttl_base = reservation_ttl_base(&view);

        let (decision, orders) = if let Some((dir, hit)) = aim {
            let orders = self.fire_orders(&view, id, me, role, dir, hit.steps, ttl_base);
            (Decision::CleanShot, orders)
        } else if !view.any_passable_neighbor(me, self.config.connectivity) {
            self.trapped_orders(&view, id, me, role, ttl_base)
        } else if view.nearest_enemy(me).is_none() {
            (Decision::Idle, self.idle_orders(id, me, role, ttl_base))
        } else {
            self.route_orders(&view, id, me, role, ttl_base)
        };

        let unit_state = self.state.unit_mut(id);
        if unit_state.last_position == Some(me) && !orders.plan.fires() {
            tracing::debug!(id, cycles = unit_state.cycles_planned, "Unit has not moved since last plan");
        }
        unit_state.last_position = Some(me);
        unit_state.cycles_planned += 1;
        if orders.plan.fires() {
            unit_state.shots_fired += 1;
        }

        tracing::debug!(
            id,
            ?decision,
            %role,
            x = me.x,
            y = me.y,
            steps = orders.plan.len(),
            waypoint_x = orders.waypoint.x,
            waypoint_y = orders.waypoint.y,
            "Planned"
        );
        BattleInfo::Orders(orders)
    }

    // ========================================================================
    // Cost shaping & role
    // ========================================================================

    /// Bias the search away from teammates, their claims and their fire lanes.
    fn apply_team_penalties(&self, view: &mut WorldView, id: UnitId) {
        let ledger = &self.state.ledger;
        let cells: Vec<Position> = view.cells().collect();
        for pos in cells {
            if ledger.is_reserved_by_other(pos, id) {
                view.add_danger(pos, self.config.reservation_penalty);
            }
            if ledger.has_shot(pos) {
                view.add_danger(pos, self.config.shot_lane_penalty);
            }
            if view.has_friend(pos) {
                view.add_danger(pos, self.config.friend_penalty);
            }
        }
    }

    fn resolve_role(&mut self, id: UnitId, view: &WorldView, me: Position, clean_los: bool) -> RoleTag {
        let unit = self.state.unit_mut(id);
        if self.config.role_mode == RoleMode::Sticky {
            return unit.role;
        }

        let signals = RoleSignals {
            in_red_zone: view.shell_eta(me).is_some(),
            nearest_enemy: view.nearest_enemy_distance(me),
            clean_los,
            in_open: !view
                .neighbors(me, Connectivity::Eight)
                .any(|(_, n)| view.is_wall(n)),
            ammo_left: unit.ammo_left(self.settings.ammo_budget),
        };
        let next = next_role(unit.role, &signals, self.config.threat_distance);
        if next != unit.role {
            tracing::info!(id, from = %unit.role, to = %next, ?signals, "Role switch");
            unit.role = next;
        }
        next
    }

    fn aim_range(&self, view: &WorldView) -> usize {
        match self.config.aim_range {
            0 => view.width().max(view.height()) as usize,
            range => range,
        }
    }

    /// Closest enemy on a clean ray from `me`, over all 8 headings.
    fn find_clean_aim(&self, view: &WorldView, id: UnitId, me: Position) -> Option<(Direction, RayHit)> {
        let range = self.aim_range(view);
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                let hit = raycast_with_reservations(view, &self.state.ledger, id, me, dir, range);
                hit.is_enemy().then_some((dir, hit))
            })
            .min_by_key(|(dir, hit)| (hit.steps, dir.index()))
    }

    // ========================================================================
    // Order builders
    // ========================================================================

    /// Stand still and fire along `dir`, announcing the lane to teammates.
    #[allow(clippy::too_many_arguments)]
    fn fire_orders(
        &mut self,
        view: &WorldView,
        id: UnitId,
        me: Position,
        role: RoleTag,
        dir: Direction,
        lane_len: usize,
        ttl_base: u8,
    ) -> BattleOrders {
        self.mark_lane(view, me, dir, lane_len);
        self.state.ledger.reserve_move(me, id, ttl_base);
        BattleOrders {
            role,
            waypoint: me,
            plan: Plan::single(PlanStep::fire(dir)),
            fallback: FallbackOrder {
                heading: Some(dir),
                fire: true,
                advance: false,
            },
        }
    }

    fn mark_lane(&mut self, view: &WorldView, me: Position, dir: Direction, lane_len: usize) {
        let ttl = self.config.shot_lane_ttl;
        for pos in ray_cells(view, me, dir, lane_len.max(1)) {
            self.state.ledger.mark_shot(pos, ttl);
        }
    }

    fn idle_orders(&mut self, id: UnitId, me: Position, role: RoleTag, ttl_base: u8) -> BattleOrders {
        self.state.ledger.reserve_move(me, id, ttl_base);
        BattleOrders {
            role,
            waypoint: me,
            plan: Plan::default(),
            fallback: FallbackOrder::idle(),
        }
    }

    /// No passable neighbour: breach an adjacent wall, or snipe from a mine ring.
    fn trapped_orders(
        &mut self,
        view: &WorldView,
        id: UnitId,
        me: Position,
        role: RoleTag,
        ttl_base: u8,
    ) -> (Decision, BattleOrders) {
        let enemy = view.nearest_enemy(me);

        if let Some(dir) = pick_breach_wall(view, me, enemy, self.config.connectivity) {
            tracing::debug!(id, ?dir, "Trapped by walls, breaching");
            return (Decision::Breach, self.fire_orders(view, id, me, role, dir, 1, ttl_base));
        }

        let Some(enemy) = enemy else {
            return (Decision::Idle, self.idle_orders(id, me, role, ttl_base));
        };
        let Some(heading) = heading_toward(me, enemy, view.width(), view.height()) else {
            return (Decision::Idle, self.idle_orders(id, me, role, ttl_base));
        };

        let hit = raycast_with_reservations(view, &self.state.ledger, id, me, heading, self.aim_range(view));
        if hit.is_enemy() {
            tracing::debug!(id, ?heading, "Trapped by mines, clear shot");
            return (
                Decision::SniperShot,
                self.fire_orders(view, id, me, role, heading, hit.steps, ttl_base),
            );
        }

        tracing::debug!(id, ?heading, blocker = ?hit.kind, "Trapped by mines, holding");
        self.state.ledger.reserve_move(me, id, ttl_base);
        (
            Decision::SniperHold,
            BattleOrders {
                role,
                waypoint: me,
                plan: Plan::default(),
                fallback: FallbackOrder::hold(heading),
            },
        )
    }

    /// Path to the role target and compile up to K guarded steps.
    fn route_orders(
        &mut self,
        view: &WorldView,
        id: UnitId,
        me: Position,
        role: RoleTag,
        ttl_base: u8,
    ) -> (Decision, BattleOrders) {
        let Some(target) = target_for_role(role, view, me) else {
            tracing::warn!(id, %role, "No passable target");
            return (Decision::Hold, self.idle_orders(id, me, role, ttl_base));
        };
        let path = AStar::find_path(view, me, target, self.config.connectivity);
        if path.len() < 2 {
            if path.is_empty() {
                tracing::warn!(id, target_x = target.x, target_y = target.y, "No path to target");
            }
            return (Decision::Hold, self.idle_orders(id, me, role, ttl_base));
        }

        let ledger = &self.state.ledger;
        let mut steps = Vec::with_capacity(self.config.plan_steps);
        for pair in path.windows(2).take(self.config.plan_steps) {
            let dest = pair[1];
            if view.has_friend(dest) || ledger.is_reserved_by_other(dest, id) {
                break;
            }
            let Some(heading) = step_direction(pair[0], dest) else {
                break;
            };
            steps.push(PlanStep::travel(heading));
        }

        let waypoint = path[1];
        let first_heading = step_direction(me, waypoint);

        // Already lined up on an enemy: shoot instead of stepping.
        if let Some(heading) = first_heading {
            let hit = raycast_with_reservations(view, ledger, id, me, heading, self.aim_range(view));
            if hit.is_enemy() {
                tracing::debug!(id, ?heading, "Opportunistic shot on first hop");
                return (
                    Decision::CleanShot,
                    self.fire_orders(view, id, me, role, heading, hit.steps, ttl_base),
                );
            }
        }

        if steps.is_empty() {
            tracing::debug!(id, waypoint_x = waypoint.x, waypoint_y = waypoint.y, "First hop taken");
            self.state.ledger.reserve_move(me, id, ttl_base);
            let fallback = first_heading.map_or_else(FallbackOrder::idle, FallbackOrder::hold);
            return (
                Decision::Hold,
                BattleOrders {
                    role,
                    waypoint: me,
                    plan: Plan::default(),
                    fallback,
                },
            );
        }

        for (i, dest) in path[1..=steps.len()].iter().enumerate() {
            let ttl = ttl_base.saturating_add(i as u8);
            self.state.ledger.reserve_move(*dest, id, ttl);
        }

        tracing::debug!(
            id,
            target_x = target.x,
            target_y = target.y,
            path_len = path.len(),
            path_cost = AStar::path_cost(view, &path, self.config.connectivity),
            steps = steps.len(),
            "Routing"
        );
        (
            Decision::Route,
            BattleOrders {
                role,
                waypoint,
                plan: Plan::new(steps),
                fallback: FallbackOrder {
                    heading: first_heading,
                    fire: false,
                    advance: true,
                },
            },
        )
    }
}

/// `max(1, friends_visible - 1)`: each teammate gets a tick to react.
fn reservation_ttl_base(view: &WorldView) -> u8 {
    let friends = view.friends().count();
    friends.saturating_sub(1).clamp(1, usize::from(u8::MAX)) as u8
}

/// Adjacent wall to shoot through: closest to `enemy`, then cardinal before
/// diagonal, then lowest row and column. Only neighbours under `connectivity`
/// are candidates.
pub fn pick_breach_wall(
    view: &WorldView,
    me: Position,
    enemy: Option<Position>,
    connectivity: Connectivity,
) -> Option<Direction> {
    view.neighbors(me, connectivity)
        .filter(|(_, pos)| view.is_wall(*pos))
        .min_by_key(|(dir, pos)| {
            let distance = enemy.map_or(0, |enemy| view.manhattan(*pos, enemy));
            (distance, dir.is_diagonal(), pos.row_major())
        })
        .map(|(dir, _)| dir)
}
