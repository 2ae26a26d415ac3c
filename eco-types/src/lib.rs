use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    Bot,
    Human,
}

impl AgentKind {
    /// Activation order within a tick: every bot acts before any human.
    pub const ALL: [AgentKind; 2] = [AgentKind::Bot, AgentKind::Human];
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelConfig {
    pub width: u32,
    pub height: u32,
    pub initial_bots: u32,
    pub initial_humans: u32,
    pub bot_reproduce: f64,
    pub human_reproduce: f64,
    pub bot_gain_from_food: f64,
    pub human_gain_from_food: f64,
    pub resource_patches: bool,
    pub regrowth_time: i64,
}

/// Accepts both the current field names and the parameter names used by the
/// ad-post parameter files, so older configs keep loading.
#[derive(Debug, Clone, Deserialize)]
struct ModelConfigDeserialize {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default = "default_initial_bots", alias = "initial_adbot")]
    initial_bots: u32,
    #[serde(default = "default_initial_humans", alias = "initial_user")]
    initial_humans: u32,
    #[serde(default = "default_bot_reproduce", alias = "adbot_rep")]
    bot_reproduce: f64,
    #[serde(default = "default_human_reproduce", alias = "user_rep")]
    human_reproduce: f64,
    #[serde(default = "default_bot_gain_from_food", alias = "adbot_gain_from_adpost")]
    bot_gain_from_food: f64,
    #[serde(default = "default_human_gain_from_food", alias = "user_pay_from_ad")]
    human_gain_from_food: f64,
    #[serde(default = "default_resource_patches", alias = "ad_post")]
    resource_patches: bool,
    #[serde(default = "default_regrowth_time", alias = "adpost_regrowth_time")]
    regrowth_time: i64,
}

impl<'de> Deserialize<'de> for ModelConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = ModelConfigDeserialize::deserialize(deserializer)?;
        Ok(Self {
            width: raw.width,
            height: raw.height,
            initial_bots: raw.initial_bots,
            initial_humans: raw.initial_humans,
            bot_reproduce: raw.bot_reproduce,
            human_reproduce: raw.human_reproduce,
            bot_gain_from_food: raw.bot_gain_from_food,
            human_gain_from_food: raw.human_gain_from_food,
            resource_patches: raw.resource_patches,
            regrowth_time: raw.regrowth_time,
        })
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            initial_bots: default_initial_bots(),
            initial_humans: default_initial_humans(),
            bot_reproduce: default_bot_reproduce(),
            human_reproduce: default_human_reproduce(),
            bot_gain_from_food: default_bot_gain_from_food(),
            human_gain_from_food: default_human_gain_from_food(),
            resource_patches: default_resource_patches(),
            regrowth_time: default_regrowth_time(),
        }
    }
}

impl ModelConfig {
    pub fn reproduce_probability(&self, kind: AgentKind) -> f64 {
        match kind {
            AgentKind::Bot => self.bot_reproduce,
            AgentKind::Human => self.human_reproduce,
        }
    }

    pub fn gain_from_food(&self, kind: AgentKind) -> f64 {
        match kind {
            AgentKind::Bot => self.bot_gain_from_food,
            AgentKind::Human => self.human_gain_from_food,
        }
    }

    pub fn initial_count(&self, kind: AgentKind) -> u32 {
        match kind {
            AgentKind::Bot => self.initial_bots,
            AgentKind::Human => self.initial_humans,
        }
    }
}

fn default_width() -> u32 {
    40
}

fn default_height() -> u32 {
    40
}

fn default_initial_bots() -> u32 {
    30
}

fn default_initial_humans() -> u32 {
    50
}

fn default_bot_reproduce() -> f64 {
    0.04
}

fn default_human_reproduce() -> f64 {
    0.05
}

fn default_bot_gain_from_food() -> f64 {
    4.0
}

fn default_human_gain_from_food() -> f64 {
    20.0
}

fn default_resource_patches() -> bool {
    true
}

fn default_regrowth_time() -> i64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    pub id: AgentId,
    pub kind: AgentKind,
    pub x: u32,
    pub y: u32,
    pub energy: f64,
    pub reproduce_probability: f64,
    pub energy_from_food: f64,
    pub age_ticks: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchState {
    pub x: u32,
    pub y: u32,
    pub ready: bool,
    pub regrowth_time: u64,
}

/// Aggregate counts sampled by the data collector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PopulationCounts {
    pub bots: u32,
    pub humans: u32,
    pub ready_patches: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopulationSample {
    pub tick: u64,
    #[serde(flatten)]
    pub counts: PopulationCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub bots: u32,
    pub humans: u32,
    pub ready_patches: u32,
    pub births_last_tick: u64,
    pub starvations_last_tick: u64,
    pub predations_last_tick: u64,
    pub grazings_last_tick: u64,
    pub regrowths_last_tick: u64,
    pub total_births: u64,
    pub total_deaths: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub rng_seed: u64,
    pub config: ModelConfig,
    pub agents: Vec<AgentState>,
    pub patches: Vec<PatchState>,
    pub metrics: MetricsSnapshot,
}

impl WorldSnapshot {
    /// Population counts as the data collector would have sampled them.
    pub fn population_sample(&self) -> PopulationSample {
        PopulationSample {
            tick: self.tick,
            counts: PopulationCounts {
                bots: self.metrics.bots,
                humans: self.metrics.humans,
                ready_patches: self.metrics.ready_patches,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentMove {
    pub id: AgentId,
    pub from: (u32, u32),
    pub to: (u32, u32),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovalCause {
    Starvation,
    Predation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovedAgent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub x: u32,
    pub y: u32,
    pub cause: RemovalCause,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchChange {
    pub x: u32,
    pub y: u32,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TickDelta {
    pub tick: u64,
    pub moves: Vec<AgentMove>,
    pub removed: Vec<RemovedAgent>,
    pub spawned: Vec<AgentState>,
    pub patch_changes: Vec<PatchChange>,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Marker {
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "^")]
    Triangle,
    #[serde(rename = "s")]
    Square,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PortrayalColor {
    #[serde(rename = "tab:yellow")]
    Yellow,
    #[serde(rename = "tab:green")]
    Green,
    #[serde(rename = "tab:blue")]
    Blue,
    #[serde(rename = "tab:red")]
    Red,
}

/// Display descriptor handed to an external renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Portrayal {
    pub marker: Marker,
    pub color: PortrayalColor,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zorder: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameCell {
    pub x: u32,
    pub y: u32,
    pub portrayal: Portrayal,
}
