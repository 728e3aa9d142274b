use divsim_core::{RngHandle, Scenario};
use divsim_world::{
    NeighborTopology, SchellingFactory, SchellingWorld, WorldConfig, WorldFactory, WorldModel,
    WorldParams,
};
use proptest::prelude::*;

fn small_config() -> WorldConfig {
    WorldConfig {
        grid_rows: 20,
        grid_cols: 20,
        neighborhood_rows: 4,
        neighborhood_cols: 4,
        vacancy_fraction: 0.25,
        population_size: None,
        neighbor_topology: NeighborTopology::Queen,
    }
}

fn params(proportions: &[f64], tolerance: f64, max_iterations: u64) -> WorldParams {
    WorldParams {
        config: small_config(),
        tolerance,
        group_proportions: proportions.to_vec(),
        max_iterations,
    }
}

#[test]
fn zero_step_cap_never_converges() {
    let params = params(&[0.5, 0.5], 0.3, 0);
    let mut world = SchellingFactory.build(&params).unwrap();
    let mut rng = RngHandle::from_seed(11);
    world.setup(&mut rng).unwrap();
    world.run(&mut rng, params.max_iterations).unwrap();
    assert!(!world.converged());
    assert_eq!(world.steps_taken(), 0);
    assert_eq!(world.export().unwrap().n_groups(), 2);
}

#[test]
fn zero_tolerance_converges_without_moving() {
    let params = params(&[0.6, 0.4], 0.0, 50);
    let mut world = SchellingFactory.build(&params).unwrap();
    let mut rng = RngHandle::from_seed(3);
    world.setup(&mut rng).unwrap();
    world.run(&mut rng, params.max_iterations).unwrap();
    assert!(world.converged());
    assert_eq!(world.steps_taken(), 0);
}

#[test]
fn export_preserves_population() {
    let params = params(&[0.7, 0.2, 0.1], 0.4, 30);
    let world = SchellingWorld::new(params.clone()).unwrap();
    assert_eq!(world.group_sizes(), &[210, 60, 30]);

    let mut world: Box<dyn WorldModel> = Box::new(world);
    let mut rng = RngHandle::from_seed(5);
    world.setup(&mut rng).unwrap();
    world.run(&mut rng, params.max_iterations).unwrap();
    let table = world.export().unwrap();
    assert_eq!(table.n_rows(), 16);
    assert_eq!(table.column_totals(), vec![210, 60, 30]);
    assert_eq!(table.rows()[0], "n0");
    assert_eq!(table.groups()[2], "g2");
}

#[test]
fn steps_before_setup_fail() {
    let mut world = SchellingFactory.build(&params(&[0.5, 0.5], 0.3, 5)).unwrap();
    let mut rng = RngHandle::from_seed(1);
    let err = world.step(&mut rng).unwrap_err();
    assert_eq!(err.info().code, "world-not-setup");
}

#[test]
fn invalid_lattice_is_rejected() {
    let mut params = params(&[0.5, 0.5], 0.3, 5);
    params.config.neighborhood_rows = 3;
    let err = SchellingFactory.build(&params).err().unwrap();
    assert_eq!(err.info().code, "world-neighborhood-divisibility");

    params.config.neighborhood_rows = 4;
    params.config.population_size = Some(401);
    let err = SchellingFactory.build(&params).err().unwrap();
    assert_eq!(err.info().code, "world-population");

    params.config.population_size = None;
    params.tolerance = 1.5;
    let err = SchellingFactory.build(&params).err().unwrap();
    assert_eq!(err.info().code, "world-tolerance");
}

#[test]
fn config_defaults_follow_the_reference_experiment() {
    let config: WorldConfig = serde_yaml::from_str("neighbor_topology: rook\n").unwrap();
    assert_eq!(config.grid_rows, 100);
    assert_eq!(config.neighborhoods(), 100);
    assert_eq!(config.population(), 7500);
    assert_eq!(config.neighbor_topology, NeighborTopology::Rook);
    config.validate().unwrap();
}

fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    proptest::collection::vec(1u32..10, 2..6).prop_map(|weights| {
        let total: u32 = weights.iter().sum();
        let shares: Vec<f64> = weights.iter().map(|w| *w as f64 / total as f64).collect();
        Scenario::new(&shares).expect("normalised shares")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn exported_columns_match_group_count(
        scenario in scenario_strategy(),
        tolerance in 0.0f64..0.8,
        seed in any::<u64>(),
    ) {
        let params = WorldParams {
            config: small_config(),
            tolerance,
            group_proportions: scenario.proportions().to_vec(),
            max_iterations: 5,
        };
        let mut world = SchellingFactory.build(&params).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        world.setup(&mut rng).unwrap();
        world.run(&mut rng, params.max_iterations).unwrap();
        let table = world.export().unwrap();
        prop_assert_eq!(table.n_groups(), scenario.group_count());
        prop_assert_eq!(table.total(), 300);
    }
}
