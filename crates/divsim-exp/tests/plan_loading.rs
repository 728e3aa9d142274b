use std::fs;
use std::path::PathBuf;

use divsim_exp::{
    from_json_slice, from_yaml_slice, load_plan, run_sweep, write_report, EarlyStop,
    SweepPlan, SweepReport, TauGrid, WorldWorker,
};
use divsim_world::{NeighborTopology, SchellingFactory};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

#[test]
fn smoke_plan_loads_with_labels_and_linspace() {
    let plan = load_plan(fixture_path("plans/smoke.yaml")).expect("plan loads");
    let taus = plan.tau_values();
    assert_eq!(taus.len(), 4);
    assert_eq!(taus[0], 0.0);
    assert_eq!(taus[3], 0.6);
    assert!((taus[1] - 0.2).abs() < 1e-12);

    let scenarios = plan.build_scenarios().unwrap();
    let keys: Vec<_> = scenarios.iter().map(|s| s.key().to_string()).collect();
    assert_eq!(keys, vec!["0.5_0.5", "0.7_0.2_0.1", "0.4_0.4_0.1_0.1"]);
    assert_eq!(scenarios[1].label(), Some("Single minority"));
    assert_eq!(plan.world.neighbor_topology, NeighborTopology::Queen);
    assert_eq!(plan.early_stop, EarlyStop::AllFailed);
    assert!(plan.scheduler.parallel);
}

#[test]
fn reference_plan_uses_experiment_defaults() {
    let plan = load_plan(fixture_path("plans/reference.yaml")).expect("plan loads");
    assert_eq!(plan.world.grid_rows, 100);
    assert_eq!(plan.world.neighborhoods(), 100);
    assert_eq!(plan.world.population(), 7500);
    assert_eq!(plan.max_iter, 1000);
    assert_eq!(plan.tau_values().len(), 30);
    assert!(plan.keep_maps);
    assert_eq!(plan.scenarios.len(), 6);
}

#[test]
fn plan_yaml_roundtrip_is_stable() {
    let plan = load_plan(fixture_path("plans/smoke.yaml")).unwrap();
    let yaml = plan.to_yaml_string().unwrap();
    let reparsed: SweepPlan = from_yaml_slice(yaml.as_bytes()).unwrap();
    assert_eq!(reparsed, plan);
    assert_eq!(reparsed.plan_hash().unwrap(), plan.plan_hash().unwrap());
}

#[test]
fn explicit_tau_lists_keep_their_order() {
    let plan: SweepPlan = from_yaml_slice(
        b"taus: [0.3, 0.1, 0.2]\nscenarios:\n  - proportions: [0.6]\nearly_stop: never\n",
    )
    .unwrap();
    assert_eq!(plan.taus, TauGrid::Values(vec![0.3, 0.1, 0.2]));
    assert_eq!(plan.early_stop, EarlyStop::Never);
    assert_eq!(plan.replications, 100);
}

#[test]
fn invalid_plans_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cases: &[(&str, &str)] = &[
        ("taus: []\nscenarios:\n  - proportions: [0.5]\n", "plan-taus-empty"),
        ("taus: [0.1]\nscenarios: []\n", "plan-scenarios-empty"),
        ("taus: [0.5, 1.5]\nscenarios:\n  - proportions: [0.5]\n", "plan-tau"),
        ("taus: [-0.1]\nscenarios:\n  - proportions: [0.5]\n", "plan-tau"),
        ("taus: [0.1]\nscenarios:\n  - proportions: [0.8, 0.4]\n", "scenario-sum"),
        (
            "taus: [0.1]\nscenarios:\n  - proportions: [0.5]\nworld:\n  grid_rows: 30\n  neighborhood_rows: 7\n",
            "world-neighborhood-divisibility",
        ),
        (
            "taus: [0.1]\nscenarios:\n  - proportions: [0.5]\nworld:\n  vacancy_fraction: 1.0\n",
            "world-vacancy",
        ),
    ];
    for (idx, (yaml, code)) in cases.iter().enumerate() {
        let path = dir.path().join(format!("plan_{idx}.yaml"));
        fs::write(&path, yaml).unwrap();
        let err = load_plan(&path).unwrap_err();
        assert_eq!(err.info().code, *code, "case {idx}");
    }

    let err = load_plan(dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.info().code, "plan_read");
    fs::write(dir.path().join("broken.yaml"), "taus: [0.1\n").unwrap();
    let err = load_plan(dir.path().join("broken.yaml")).unwrap_err();
    assert_eq!(err.info().code, "yaml_deserialize");
}

#[test]
fn report_records_cells_and_skips() {
    let mut plan = load_plan(fixture_path("plans/smoke.yaml")).unwrap();
    plan.max_iter = 0;
    plan.replications = 2;
    let outcome = run_sweep(&plan, &WorldWorker::new(SchellingFactory)).unwrap();
    let report = SweepReport::new(&plan, &outcome).unwrap();
    assert_eq!(report.cells.len(), 3);
    assert_eq!(report.skipped.len(), 9);
    assert_eq!(report.converged(), 0);
    assert_eq!(report.plan_hash, plan.plan_hash().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep_report.json");
    write_report(&path, &report).unwrap();
    let restored: SweepReport = from_json_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(restored.plan_hash, report.plan_hash);
    assert_eq!(restored.created_at, report.created_at);
    assert_eq!(restored.cells.len(), 3);
    for (left, right) in restored.skipped.iter().zip(&report.skipped) {
        assert_eq!(left.prop_mix, right.prop_mix);
        assert!((left.tau - right.tau).abs() < 1e-12);
    }
}
