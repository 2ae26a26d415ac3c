use super::*;

/// Due tick for patches a test wants to keep growing for the whole run.
pub(super) const HELD: u64 = u64::MAX;

pub(super) fn stable_test_config() -> ModelConfig {
    ModelConfig {
        width: 5,
        height: 5,
        initial_bots: 0,
        initial_humans: 0,
        bot_reproduce: 0.0,
        human_reproduce: 0.0,
        bot_gain_from_food: 4.0,
        human_gain_from_food: 20.0,
        resource_patches: true,
        regrowth_time: 5,
    }
}

pub(super) fn test_config(width: u32, height: u32) -> ModelConfig {
    let mut config = stable_test_config();
    config.width = width;
    config.height = height;
    config
}

pub(super) fn make_agent(
    id: u64,
    kind: AgentKind,
    x: u32,
    y: u32,
    energy: f64,
    reproduce_probability: f64,
    energy_from_food: f64,
) -> AgentState {
    AgentState {
        id: AgentId(id),
        kind,
        x,
        y,
        energy,
        reproduce_probability,
        energy_from_food,
        age_ticks: 0,
    }
}

pub(super) fn bot(id: u64, x: u32, y: u32, energy: f64) -> AgentState {
    make_agent(id, AgentKind::Bot, x, y, energy, 0.0, 4.0)
}

pub(super) fn human(id: u64, x: u32, y: u32, energy: f64) -> AgentState {
    make_agent(id, AgentKind::Human, x, y, energy, 0.0, 20.0)
}

/// Replaces the world with `agents`. Patches (when enabled) are ready on
/// `ready` cells and held growing everywhere else.
pub(super) fn configure_sim(sim: &mut Simulation, agents: Vec<AgentState>, ready: &[(u32, u32)]) {
    sim.world = World::new(sim.world.grid.clone());
    sim.regrowth = crate::regrowth::RegrowthQueue::default();

    if sim.config.resource_patches {
        let regrowth_time = sim.config.regrowth_time as u64;
        for cell in 0..sim.world.grid.cell_count() {
            let (x, y) = sim.world.grid.coords(cell);
            let is_ready = ready.contains(&(x, y));
            sim.world.patches[cell] = Some(PatchState {
                x,
                y,
                ready: is_ready,
                regrowth_time,
            });
            if !is_ready {
                sim.regrowth.schedule(HELD, cell, &mut sim.rng);
            }
        }
    }

    sim.next_agent_id = agents.iter().map(|agent| agent.id.0 + 1).max().unwrap_or(0);
    for agent in agents {
        assert!(sim.world.insert_agent(agent), "test agent must be in bounds");
    }
    sim.collector.clear();
    sim.refresh_population_metrics();
}

pub(super) fn empty_sim(config: ModelConfig, seed: u64) -> Simulation {
    let mut sim = Simulation::new(config, seed).expect("simulation should initialize");
    configure_sim(&mut sim, Vec::new(), &[]);
    sim
}

pub(super) fn tick_once(sim: &mut Simulation) -> TickDelta {
    sim.step().expect("tick should succeed")
}

pub(super) fn cell(sim: &Simulation, x: u32, y: u32) -> usize {
    sim.world.grid.cell_index(x, y).expect("cell should be in bounds")
}

pub(super) fn position(sim: &Simulation, id: u64) -> Option<(u32, u32)> {
    sim.agent(AgentId(id)).map(|agent| (agent.x, agent.y))
}

pub(super) fn energy(sim: &Simulation, id: u64) -> f64 {
    sim.agent(AgentId(id))
        .map(|agent| agent.energy)
        .expect("agent should be alive")
}

pub(super) fn patch_ready(sim: &Simulation, x: u32, y: u32) -> bool {
    sim.patch_at(x, y).expect("patch should exist").ready
}
