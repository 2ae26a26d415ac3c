use crate::behavior::{behavior_for, FeedOutcome};
use crate::{SimError, Simulation};
use eco_types::{
    AgentId, AgentKind, AgentMove, PatchChange, RemovalCause, RemovedAgent, TickDelta,
};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{trace, warn};

const UPKEEP_PER_TICK: f64 = 1.0;

#[derive(Default)]
struct TickCounters {
    births: u64,
    starvations: u64,
    predations: u64,
    grazings: u64,
    regrowths: u64,
}

impl Simulation {
    pub(crate) fn tick(&mut self) -> Result<TickDelta, SimError> {
        self.tick = self.tick.saturating_add(1);
        let mut delta = TickDelta {
            tick: self.tick,
            ..TickDelta::default()
        };
        let mut counters = TickCounters::default();

        for kind in AgentKind::ALL {
            if let Err(err) = self.activation_phase(kind, &mut delta, &mut counters) {
                warn!(tick = self.tick, %err, "tick aborted");
                return Err(err);
            }
        }
        self.regrowth_phase(&mut delta, &mut counters);

        self.debug_assert_consistent_state();

        self.metrics.births_last_tick = counters.births;
        self.metrics.starvations_last_tick = counters.starvations;
        self.metrics.predations_last_tick = counters.predations;
        self.metrics.grazings_last_tick = counters.grazings;
        self.metrics.regrowths_last_tick = counters.regrowths;
        self.metrics.total_births += counters.births;
        self.metrics.total_deaths += counters.starvations + counters.predations;
        self.refresh_population_metrics();
        delta.metrics = self.metrics.clone();

        trace!(
            tick = self.tick,
            bots = self.metrics.bots,
            humans = self.metrics.humans,
            ready_patches = self.metrics.ready_patches,
            "tick complete"
        );
        Ok(delta)
    }

    /// Every agent of `kind` alive at the start of the phase acts once, in
    /// shuffled order. Offspring born during the phase wait for the next tick.
    fn activation_phase(
        &mut self,
        kind: AgentKind,
        delta: &mut TickDelta,
        counters: &mut TickCounters,
    ) -> Result<(), SimError> {
        let mut order: Vec<AgentId> = self
            .world
            .agents
            .values()
            .filter(|agent| agent.kind == kind)
            .map(|agent| agent.id)
            .collect();
        order.shuffle(&mut self.rng);

        for id in order {
            self.agent_turn(id, delta, counters)?;
        }
        Ok(())
    }

    fn agent_turn(
        &mut self,
        id: AgentId,
        delta: &mut TickDelta,
        counters: &mut TickCounters,
    ) -> Result<(), SimError> {
        // Eaten earlier this tick.
        let Some(agent) = self.world.agents.get(&id) else {
            return Ok(());
        };
        let behavior = behavior_for(agent.kind);
        let Some(from) = self.world.grid.cell_index(agent.x, agent.y) else {
            return Ok(());
        };

        let target = behavior.choose_target(&self.world, from, &mut self.rng);
        if let Some((from, to)) = self.world.move_agent(id, target) {
            delta.moves.push(AgentMove {
                id,
                from: self.world.grid.coords(from),
                to: self.world.grid.coords(to),
            });
        }

        if let Some(agent) = self.world.agents.get_mut(&id) {
            agent.energy -= UPKEEP_PER_TICK;
        }

        match behavior.feed(&self.world, id, &mut self.rng)? {
            FeedOutcome::Nothing => {}
            FeedOutcome::Grazed { cell } => {
                if let Some(agent) = self.world.agents.get_mut(&id) {
                    agent.energy += agent.energy_from_food;
                }
                self.consume_patch(cell, delta);
                counters.grazings += 1;
            }
            FeedOutcome::Predated { prey } => {
                if let Some(prey) = self.world.remove_agent(prey) {
                    if let Some(agent) = self.world.agents.get_mut(&id) {
                        agent.energy += prey.energy_from_food;
                    }
                    delta.removed.push(RemovedAgent {
                        id: prey.id,
                        kind: prey.kind,
                        x: prey.x,
                        y: prey.y,
                        cause: RemovalCause::Predation,
                    });
                    counters.predations += 1;
                }
            }
        }

        let Some(agent) = self.world.agents.get(&id) else {
            return Ok(());
        };
        if agent.energy < 0.0 {
            if let Some(dead) = self.world.remove_agent(id) {
                delta.removed.push(RemovedAgent {
                    id,
                    kind: dead.kind,
                    x: dead.x,
                    y: dead.y,
                    cause: RemovalCause::Starvation,
                });
                counters.starvations += 1;
            }
            return Ok(());
        }

        let reproduce_probability = agent.reproduce_probability;
        if self.rng.random::<f64>() < reproduce_probability {
            if let Some(child) = self.spawn_offspring(id) {
                delta.spawned.push(child);
                counters.births += 1;
            }
        }
        if let Some(agent) = self.world.agents.get_mut(&id) {
            agent.age_ticks += 1;
        }
        Ok(())
    }

    /// Ready -> growing. Regrowth lands `regrowth_time` ticks from now.
    fn consume_patch(&mut self, cell: usize, delta: &mut TickDelta) {
        let Some(patch) = self.world.patches[cell].as_mut() else {
            return;
        };
        if !patch.ready {
            return;
        }
        patch.ready = false;
        delta.patch_changes.push(PatchChange {
            x: patch.x,
            y: patch.y,
            ready: false,
        });
        let due = self.tick.saturating_add(patch.regrowth_time);
        self.regrowth.schedule(due, cell, &mut self.rng);
    }

    fn regrowth_phase(&mut self, delta: &mut TickDelta, counters: &mut TickCounters) {
        while let Some(event) = self.regrowth.pop_due(self.tick) {
            let Some(patch) = self.world.patches[event.cell].as_mut() else {
                continue;
            };
            patch.ready = true;
            delta.patch_changes.push(PatchChange {
                x: patch.x,
                y: patch.y,
                ready: true,
            });
            counters.regrowths += 1;
        }
    }
}
