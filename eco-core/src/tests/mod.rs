pub(super) use super::*;
pub(super) use crate::behavior::{behavior_for, FeedOutcome};
pub(super) use eco_types::{PatchChange, RemovalCause, TickDelta};
pub(super) use rand::SeedableRng;
pub(super) use std::collections::HashSet;

mod config_and_seed;
mod support;
