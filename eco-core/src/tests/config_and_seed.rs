use super::support::*;
use super::*;

fn rejection(config: ModelConfig) -> String {
    match Simulation::new(config, 1) {
        Err(SimError::InvalidParameter(message)) => message,
        Err(other) => panic!("expected an invalid parameter error, got {other}"),
        Ok(_) => panic!("config should be rejected"),
    }
}

#[test]
fn config_validation_rejects_reproduction_probability_outside_unit_range() {
    let mut cfg = stable_test_config();
    cfg.bot_reproduce = 1.5;
    assert!(rejection(cfg).contains("bot_reproduce"));

    let mut cfg = stable_test_config();
    cfg.human_reproduce = -0.1;
    assert!(rejection(cfg).contains("human_reproduce"));

    let mut cfg = stable_test_config();
    cfg.human_reproduce = f64::NAN;
    assert!(rejection(cfg).contains("human_reproduce"));
}

#[test]
fn config_validation_rejects_non_positive_regrowth_time() {
    let mut cfg = stable_test_config();
    cfg.regrowth_time = 0;
    assert!(rejection(cfg).contains("regrowth_time"));

    let mut cfg = stable_test_config();
    cfg.regrowth_time = -4;
    assert!(rejection(cfg).contains("regrowth_time"));
}

#[test]
fn config_validation_rejects_empty_grid_and_bad_gains() {
    let mut cfg = stable_test_config();
    cfg.height = 0;
    assert!(rejection(cfg).contains("height"));

    let mut cfg = stable_test_config();
    cfg.bot_gain_from_food = -1.0;
    assert!(rejection(cfg).contains("bot_gain_from_food"));

    let mut cfg = stable_test_config();
    cfg.human_gain_from_food = f64::INFINITY;
    assert!(rejection(cfg).contains("human_gain_from_food"));
}

#[test]
fn probability_bounds_are_inclusive() {
    let mut cfg = stable_test_config();
    cfg.bot_reproduce = 0.0;
    cfg.human_reproduce = 1.0;
    assert!(Simulation::new(cfg, 1).is_ok());
}

#[test]
fn initial_population_follows_config() {
    let mut cfg = stable_test_config();
    cfg.width = 7;
    cfg.height = 4;
    cfg.initial_bots = 15;
    cfg.initial_humans = 9;
    let sim = Simulation::new(cfg, 5).expect("simulation should initialize");

    let counts = sim.population();
    assert_eq!(counts.bots, 15);
    assert_eq!(counts.humans, 9);
    assert_eq!(sim.snapshot().patches.len(), 28);
    assert_eq!(sim.metrics().bots, 15);
    assert_eq!(sim.metrics().humans, 9);

    for agent in sim.agents() {
        let gain = match agent.kind {
            AgentKind::Bot => 4.0,
            AgentKind::Human => 20.0,
        };
        assert!((0.0..2.0 * gain).contains(&agent.energy));
        assert_eq!(agent.energy_from_food, gain);
        assert!(agent.x < 7 && agent.y < 4);
    }
    let ids: Vec<u64> = sim.agents().map(|agent| agent.id.0).collect();
    assert_eq!(ids, (0..24).collect::<Vec<_>>());
    assert!(sim
        .agents()
        .take(15)
        .all(|agent| agent.kind == AgentKind::Bot));
}

#[test]
fn disabled_patches_leave_every_cell_empty() {
    let mut cfg = stable_test_config();
    cfg.resource_patches = false;
    let sim = Simulation::new(cfg, 5).expect("simulation should initialize");
    assert!(sim.patch_at(0, 0).is_none());
    assert_eq!(sim.pending_regrowths(), 0);
    assert_eq!(sim.population().ready_patches, 0);
}

#[test]
fn same_seed_produces_identical_runs() {
    let mut cfg = stable_test_config();
    cfg.width = 12;
    cfg.height = 12;
    cfg.initial_bots = 30;
    cfg.initial_humans = 10;
    cfg.bot_reproduce = 0.1;
    cfg.human_reproduce = 0.05;

    let mut a = Simulation::new(cfg.clone(), 77).expect("simulation should initialize");
    let mut b = Simulation::new(cfg.clone(), 77).expect("simulation should initialize");
    let deltas_a = a.step_n(40).expect("ticks should succeed");
    let deltas_b = b.step_n(40).expect("ticks should succeed");

    assert_eq!(deltas_a, deltas_b);
    assert_eq!(compare_snapshots(&a.snapshot(), &b.snapshot()), Ordering::Equal);
    assert_eq!(a.collector(), b.collector());

    let mut c = Simulation::new(cfg, 78).expect("simulation should initialize");
    c.step_n(40).expect("ticks should succeed");
    assert_ne!(
        compare_snapshots(&a.snapshot(), &c.snapshot()),
        Ordering::Equal
    );
}

#[test]
fn advance_matches_step_n_without_keeping_deltas() {
    let mut cfg = stable_test_config();
    cfg.initial_bots = 10;
    cfg.initial_humans = 3;
    cfg.bot_reproduce = 0.2;

    let mut stepped = Simulation::new(cfg.clone(), 90).expect("simulation should initialize");
    let mut advanced = Simulation::new(cfg, 90).expect("simulation should initialize");
    stepped.step_n(15).expect("ticks should succeed");
    advanced.advance(15).expect("ticks should succeed");

    assert_eq!(advanced.current_tick(), 15);
    assert_eq!(advanced.snapshot(), stepped.snapshot());
    assert_eq!(advanced.collector(), stepped.collector());
}

#[test]
fn reset_rebuilds_the_initial_world() {
    let mut cfg = stable_test_config();
    cfg.initial_bots = 8;
    cfg.initial_humans = 4;
    let mut sim = Simulation::new(cfg, 31).expect("simulation should initialize");
    let initial = sim.snapshot();

    sim.step_n(10).expect("ticks should succeed");
    assert_eq!(sim.current_tick(), 10);

    sim.reset(None);
    assert_eq!(sim.current_tick(), 0);
    assert_eq!(sim.snapshot(), initial);
    assert_eq!(sim.collector().len(), 1);

    sim.reset(Some(32));
    assert_eq!(sim.seed(), 32);
    assert_ne!(sim.snapshot(), initial);
}
