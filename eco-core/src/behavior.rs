use crate::{SimError, World};
use eco_types::{AgentId, AgentKind};
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedOutcome {
    Nothing,
    Grazed { cell: usize },
    Predated { prey: AgentId },
}

/// Per-variant movement and feeding policy. Both policies only read the
/// world; the tick loop applies whatever they decide.
pub(crate) trait Behavior {
    fn choose_target(&self, world: &World, from: usize, rng: &mut ChaCha8Rng) -> usize;

    fn feed(
        &self,
        world: &World,
        agent: AgentId,
        rng: &mut ChaCha8Rng,
    ) -> Result<FeedOutcome, SimError>;
}

pub(crate) struct BotBehavior;

pub(crate) struct HumanBehavior;

pub(crate) fn behavior_for(kind: AgentKind) -> &'static dyn Behavior {
    match kind {
        AgentKind::Bot => &BotBehavior,
        AgentKind::Human => &HumanBehavior,
    }
}

impl Behavior for BotBehavior {
    fn choose_target(&self, world: &World, from: usize, rng: &mut ChaCha8Rng) -> usize {
        let safe: Vec<usize> = world
            .grid
            .neighbors(from)
            .iter()
            .copied()
            .filter(|&cell| !world.has_kind_at(cell, AgentKind::Human))
            .collect();
        if safe.is_empty() {
            return from;
        }

        let grazing: Vec<usize> = safe
            .iter()
            .copied()
            .filter(|&cell| world.patch_ready(cell))
            .collect();
        let targets = if grazing.is_empty() { &safe } else { &grazing };
        targets.choose(rng).copied().unwrap_or(from)
    }

    fn feed(
        &self,
        world: &World,
        agent: AgentId,
        _rng: &mut ChaCha8Rng,
    ) -> Result<FeedOutcome, SimError> {
        let Some(state) = world.agents.get(&agent) else {
            return Ok(FeedOutcome::Nothing);
        };
        let cell = world
            .grid
            .cell_index(state.x, state.y)
            .ok_or(SimError::MissingResource {
                x: state.x,
                y: state.y,
            })?;
        match world.patches[cell] {
            None => Err(SimError::MissingResource {
                x: state.x,
                y: state.y,
            }),
            Some(patch) if patch.ready => Ok(FeedOutcome::Grazed { cell }),
            Some(_) => Ok(FeedOutcome::Nothing),
        }
    }
}

impl Behavior for HumanBehavior {
    fn choose_target(&self, world: &World, from: usize, rng: &mut ChaCha8Rng) -> usize {
        let neighbors = world.grid.neighbors(from);
        let hunting: Vec<usize> = neighbors
            .iter()
            .copied()
            .filter(|&cell| world.has_kind_at(cell, AgentKind::Bot))
            .collect();
        let targets = if hunting.is_empty() {
            neighbors
        } else {
            hunting.as_slice()
        };
        targets.choose(rng).copied().unwrap_or(from)
    }

    fn feed(
        &self,
        world: &World,
        agent: AgentId,
        rng: &mut ChaCha8Rng,
    ) -> Result<FeedOutcome, SimError> {
        let Some(cell) = world
            .agents
            .get(&agent)
            .and_then(|state| world.grid.cell_index(state.x, state.y))
        else {
            return Ok(FeedOutcome::Nothing);
        };
        let prey = world.kind_at(cell, AgentKind::Bot);
        Ok(prey
            .choose(rng)
            .map_or(FeedOutcome::Nothing, |&prey| FeedOutcome::Predated { prey }))
    }
}
