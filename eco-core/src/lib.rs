use eco_types::{
    AgentId, AgentKind, AgentState, FrameCell, MetricsSnapshot, ModelConfig, PatchState,
    PopulationCounts, TickDelta, WorldSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

mod behavior;
mod collector;
mod grid;
mod portrayal;
mod regrowth;
mod spawn;
mod turn;

#[cfg(test)]
mod tests;

pub use collector::DataCollector;
pub use grid::Grid;
pub use portrayal::{portrayal, EntityRef};

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("no resource patch at cell ({x}, {y})")]
    MissingResource { x: u32, y: u32 },
}

/// Everything an agent can observe or touch during its turn.
#[derive(Debug, Clone)]
pub(crate) struct World {
    pub(crate) grid: Grid,
    pub(crate) agents: BTreeMap<AgentId, AgentState>,
    pub(crate) occupancy: Vec<Vec<AgentId>>,
    pub(crate) patches: Vec<Option<PatchState>>,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: ModelConfig,
    tick: u64,
    seed: u64,
    rng: ChaCha8Rng,
    next_agent_id: u64,
    world: World,
    regrowth: regrowth::RegrowthQueue,
    metrics: MetricsSnapshot,
    collector: DataCollector,
}

impl Simulation {
    pub fn new(config: ModelConfig, seed: u64) -> Result<Self, SimError> {
        validate_config(&config)?;

        let grid = Grid::new(config.width, config.height);
        let mut sim = Self {
            world: World::new(grid),
            config,
            tick: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_agent_id: 0,
            regrowth: regrowth::RegrowthQueue::default(),
            metrics: MetricsSnapshot::default(),
            collector: DataCollector::default(),
        };

        sim.populate();
        debug!(
            seed,
            bots = sim.metrics.bots,
            humans = sim.metrics.humans,
            ready_patches = sim.metrics.ready_patches,
            "initialized simulation"
        );
        Ok(sim)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.world.grid
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            rng_seed: self.seed,
            config: self.config.clone(),
            agents: self.world.agents.values().cloned().collect(),
            patches: self.world.patches.iter().flatten().copied().collect(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn reset(&mut self, seed: Option<u64>) {
        self.seed = seed.unwrap_or(self.seed);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.tick = 0;
        self.next_agent_id = 0;
        self.world = World::new(self.world.grid.clone());
        self.regrowth = regrowth::RegrowthQueue::default();
        self.metrics = MetricsSnapshot::default();
        self.collector.clear();
        self.populate();
        debug!(seed = self.seed, "reset simulation");
    }

    pub fn step(&mut self) -> Result<TickDelta, SimError> {
        self.tick()
    }

    /// Runs `count` ticks without keeping their deltas.
    pub fn advance(&mut self, count: u32) -> Result<(), SimError> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(())
    }

    pub fn step_n(&mut self, count: u32) -> Result<Vec<TickDelta>, SimError> {
        let mut deltas = Vec::with_capacity(count as usize);
        for _ in 0..count {
            deltas.push(self.tick()?);
        }
        Ok(deltas)
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.world.agents.get(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentState> {
        self.world.agents.values()
    }

    pub fn patch_at(&self, x: u32, y: u32) -> Option<&PatchState> {
        let idx = self.world.grid.cell_index(x, y)?;
        self.world.patches[idx].as_ref()
    }

    /// Live counts per variant plus ready patches. Pure read.
    pub fn population(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for agent in self.world.agents.values() {
            match agent.kind {
                AgentKind::Bot => counts.bots += 1,
                AgentKind::Human => counts.humans += 1,
            }
        }
        counts.ready_patches = self
            .world
            .patches
            .iter()
            .flatten()
            .filter(|patch| patch.ready)
            .count() as u32;
        counts
    }

    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }

    pub fn pending_regrowths(&self) -> usize {
        self.regrowth.len()
    }

    pub fn next_regrowth_tick(&self) -> Option<u64> {
        self.regrowth.next_due()
    }

    /// Portrayal layers for the current state: patches first, then agents in id order.
    pub fn frame(&self) -> Vec<FrameCell> {
        let patches = self.world.patches.iter().flatten().map(|patch| FrameCell {
            x: patch.x,
            y: patch.y,
            portrayal: portrayal(EntityRef::Patch(patch)),
        });
        let agents = self.world.agents.values().map(|agent| FrameCell {
            x: agent.x,
            y: agent.y,
            portrayal: portrayal(EntityRef::Agent(agent)),
        });
        patches.chain(agents).collect()
    }

    pub fn export_trace_jsonl(&mut self, ticks: u32) -> Result<Vec<String>, SimError> {
        let mut lines = Vec::with_capacity(ticks as usize + 1);
        lines.push(
            serde_json::to_string(&self.snapshot())
                .expect("serialize initial snapshot for trace export"),
        );

        for _ in 0..ticks {
            self.tick()?;
            lines.push(
                serde_json::to_string(&self.snapshot())
                    .expect("serialize tick snapshot for trace export"),
            );
        }
        Ok(lines)
    }

    fn refresh_population_metrics(&mut self) {
        let counts = self.population();
        self.metrics.ticks = self.tick;
        self.metrics.bots = counts.bots;
        self.metrics.humans = counts.humans;
        self.metrics.ready_patches = counts.ready_patches;
        self.collector.collect(self.tick, counts);
    }

    fn debug_assert_consistent_state(&self) {
        if cfg!(debug_assertions) {
            debug_assert_eq!(
                self.world.agents.len(),
                self.world.occupancy.iter().map(Vec::len).sum::<usize>(),
                "occupancy lists should hold every live agent exactly once",
            );
            for agent in self.world.agents.values() {
                let idx = self
                    .world
                    .grid
                    .cell_index(agent.x, agent.y)
                    .expect("agent position must remain in bounds");
                debug_assert!(
                    self.world.occupancy[idx].contains(&agent.id),
                    "occupancy must list the agent at its cell",
                );
            }
            let growing = self
                .world
                .patches
                .iter()
                .flatten()
                .filter(|patch| !patch.ready)
                .count();
            debug_assert_eq!(
                growing,
                self.regrowth.len(),
                "every growing patch has exactly one pending regrowth",
            );
        }
    }

    fn alloc_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }
}

impl World {
    fn new(grid: Grid) -> Self {
        let cells = grid.cell_count();
        Self {
            grid,
            agents: BTreeMap::new(),
            occupancy: vec![Vec::new(); cells],
            patches: vec![None; cells],
        }
    }

    pub(crate) fn has_kind_at(&self, cell: usize, kind: AgentKind) -> bool {
        self.occupancy[cell]
            .iter()
            .any(|id| self.agents.get(id).is_some_and(|agent| agent.kind == kind))
    }

    pub(crate) fn kind_at(&self, cell: usize, kind: AgentKind) -> Vec<AgentId> {
        self.occupancy[cell]
            .iter()
            .copied()
            .filter(|id| self.agents.get(id).is_some_and(|agent| agent.kind == kind))
            .collect()
    }

    pub(crate) fn patch_ready(&self, cell: usize) -> bool {
        self.patches[cell].is_some_and(|patch| patch.ready)
    }

    pub(crate) fn insert_agent(&mut self, agent: AgentState) -> bool {
        let Some(idx) = self.grid.cell_index(agent.x, agent.y) else {
            return false;
        };
        self.occupancy[idx].push(agent.id);
        self.agents.insert(agent.id, agent);
        true
    }

    pub(crate) fn remove_agent(&mut self, id: AgentId) -> Option<AgentState> {
        let agent = self.agents.remove(&id)?;
        if let Some(idx) = self.grid.cell_index(agent.x, agent.y) {
            self.occupancy[idx].retain(|occupant| *occupant != id);
        }
        Some(agent)
    }

    /// Reassigns the agent's cell and keeps both occupancy lists in sync.
    pub(crate) fn move_agent(&mut self, id: AgentId, to: usize) -> Option<(usize, usize)> {
        let (to_x, to_y) = self.grid.coords(to);
        let agent = self.agents.get_mut(&id)?;
        let from = self.grid.cell_index(agent.x, agent.y)?;
        if from == to {
            return None;
        }
        agent.x = to_x;
        agent.y = to_y;
        self.occupancy[from].retain(|occupant| *occupant != id);
        self.occupancy[to].push(id);
        Some((from, to))
    }
}

fn validate_config(config: &ModelConfig) -> Result<(), SimError> {
    if config.width == 0 || config.height == 0 {
        return Err(SimError::InvalidParameter(
            "width and height must be greater than zero".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&config.bot_reproduce) {
        return Err(SimError::InvalidParameter(
            "bot_reproduce must be within [0, 1]".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&config.human_reproduce) {
        return Err(SimError::InvalidParameter(
            "human_reproduce must be within [0, 1]".to_owned(),
        ));
    }
    if !config.bot_gain_from_food.is_finite() || config.bot_gain_from_food < 0.0 {
        return Err(SimError::InvalidParameter(
            "bot_gain_from_food must be finite and >= 0".to_owned(),
        ));
    }
    if !config.human_gain_from_food.is_finite() || config.human_gain_from_food < 0.0 {
        return Err(SimError::InvalidParameter(
            "human_gain_from_food must be finite and >= 0".to_owned(),
        ));
    }
    if config.regrowth_time < 1 {
        return Err(SimError::InvalidParameter(
            "regrowth_time must be >= 1".to_owned(),
        ));
    }
    Ok(())
}

pub fn compare_snapshots(a: &WorldSnapshot, b: &WorldSnapshot) -> Ordering {
    let snapshot_a = serde_json::to_string(a).expect("serialize snapshot A");
    let snapshot_b = serde_json::to_string(b).expect("serialize snapshot B");
    snapshot_a.cmp(&snapshot_b)
}
