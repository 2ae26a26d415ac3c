use eco_config::default_model_config;
use eco_core::{Simulation, SimError};
use eco_types::{AgentKind, Marker, WorldSnapshot};

#[test]
fn default_model_is_reproducible_for_a_seed() {
    let run = |seed: u64| {
        let mut sim =
            Simulation::new(default_model_config(), seed).expect("simulation init");
        sim.step_n(25).expect("default model ticks");
        serde_json::to_string(&sim.snapshot()).expect("serialize snapshot")
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn trace_export_holds_initial_state_plus_one_line_per_tick() {
    let mut sim = Simulation::new(default_model_config(), 42).expect("simulation init");
    let lines = sim.export_trace_jsonl(6).expect("trace export");
    assert_eq!(lines.len(), 7);

    let snapshots: Vec<WorldSnapshot> = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("line is a snapshot"))
        .collect();
    let ticks: Vec<u64> = snapshots.iter().map(|snapshot| snapshot.tick).collect();
    assert_eq!(ticks, vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(snapshots.last(), Some(&sim.snapshot()));
}

#[test]
fn snapshot_json_preserves_agent_energy_bits() {
    let sim = Simulation::new(default_model_config(), 42).expect("simulation init");
    let snapshot = sim.snapshot();
    let text = serde_json::to_string(&snapshot).expect("serialize snapshot");
    let parsed: WorldSnapshot = serde_json::from_str(&text).expect("parse snapshot");

    assert_eq!(parsed.agents.len(), snapshot.agents.len());
    for (before, after) in snapshot.agents.iter().zip(&parsed.agents) {
        assert_eq!(
            before.energy.to_bits(),
            after.energy.to_bits(),
            "energy of {:?} changed: {} -> {}",
            before.id,
            before.energy,
            after.energy
        );
    }
    assert_eq!(parsed, snapshot);
}

#[test]
fn frame_portrays_every_patch_and_agent() {
    let mut sim = Simulation::new(default_model_config(), 7).expect("simulation init");
    sim.step_n(3).expect("default model ticks");

    let frame = sim.frame();
    let snapshot = sim.snapshot();
    assert_eq!(frame.len(), snapshot.patches.len() + snapshot.agents.len());

    let squares = frame
        .iter()
        .filter(|cell| cell.portrayal.marker == Marker::Square)
        .count();
    assert_eq!(squares, snapshot.patches.len());

    let triangles = frame
        .iter()
        .filter(|cell| cell.portrayal.marker == Marker::Triangle)
        .count();
    let bots = snapshot
        .agents
        .iter()
        .filter(|agent| agent.kind == AgentKind::Bot)
        .count();
    assert_eq!(triangles, bots);
}

#[test]
fn invalid_parameters_surface_to_the_caller() {
    let mut config = default_model_config();
    config.regrowth_time = -1;
    let err = Simulation::new(config, 1).expect_err("negative regrowth must be rejected");
    assert!(matches!(err, SimError::InvalidParameter(_)));
}
