use crate::Simulation;
use eco_types::{AgentId, AgentKind, AgentState, PatchState};
use rand::Rng;

impl Simulation {
    /// Builds the initial population: bots, then humans, then one patch per
    /// cell when patches are enabled.
    pub(crate) fn populate(&mut self) {
        for kind in AgentKind::ALL {
            self.spawn_initial_agents(kind);
        }
        if self.config.resource_patches {
            self.spawn_initial_patches();
        }
        self.refresh_population_metrics();
        self.debug_assert_consistent_state();
    }

    fn spawn_initial_agents(&mut self, kind: AgentKind) {
        let count = self.config.initial_count(kind) as usize;
        let gain = self.config.gain_from_food(kind);
        let reproduce_probability = self.config.reproduce_probability(kind);
        let cell_count = self.world.grid.cell_count();

        let energies: Vec<f64> = (0..count)
            .map(|_| self.rng.random::<f64>() * 2.0 * gain)
            .collect();
        let cells: Vec<usize> = (0..count)
            .map(|_| self.rng.random_range(0..cell_count))
            .collect();

        for (energy, cell) in energies.into_iter().zip(cells) {
            let (x, y) = self.world.grid.coords(cell);
            let agent = AgentState {
                id: self.alloc_agent_id(),
                kind,
                x,
                y,
                energy,
                reproduce_probability,
                energy_from_food: gain,
                age_ticks: 0,
            };
            let added = self.world.insert_agent(agent);
            debug_assert!(added);
        }
    }

    fn spawn_initial_patches(&mut self) {
        let regrowth_time = self.config.regrowth_time as u64;
        for cell in 0..self.world.grid.cell_count() {
            let fully_grown = self.rng.random_bool(0.5);
            let countdown = if fully_grown {
                0
            } else {
                self.rng.random_range(0..regrowth_time)
            };
            let (x, y) = self.world.grid.coords(cell);
            self.world.patches[cell] = Some(PatchState {
                x,
                y,
                ready: countdown == 0,
                regrowth_time,
            });
            if countdown > 0 {
                self.regrowth
                    .schedule(self.tick + countdown, cell, &mut self.rng);
            }
        }
    }

    /// Splits the parent's energy in half and places a clone of it on the
    /// same cell. The offspring first acts on the next tick.
    pub(crate) fn spawn_offspring(&mut self, parent: AgentId) -> Option<AgentState> {
        let parent = self.world.agents.get_mut(&parent)?;
        parent.energy /= 2.0;
        let mut child = parent.clone();
        child.id = self.alloc_agent_id();
        child.age_ticks = 0;
        if self.world.insert_agent(child.clone()) {
            Some(child)
        } else {
            None
        }
    }
}
