use divsim_agg::{reduce_by_job, write_results, JobTable};
use divsim_core::DivError;

const JOBS: &str = "\
job,city,vacr,tau,prop_mix,rep_id,neighborhood,ticks,g0,g1
a,lyon,0.1,0.2,0.6_0.4,0,n0,12,5,1
b,oslo,0.3,0.2,0.6_0.4,0,n0,40,,
a,lyon,0.1,0.2,0.6_0.4,0,n1,12,2,4
b,oslo,0.3,0.2,0.6_0.4,0,n1,40,,
a,lyon,0.1,0.4,0.6_0.4,0,n0,9,3,3
a,lyon,0.1,0.4,0.6_0.4,0,n1,9,1,5
";

#[test]
fn partitions_follow_first_seen_order_and_carry_job_meta() {
    let table = JobTable::from_reader(JOBS.as_bytes()).unwrap();
    assert_eq!(table.len(), 6);
    let results = reduce_by_job(&table).unwrap();

    assert_eq!(results.global.len(), 3);
    let jobs: Vec<(&str, f64)> = results
        .global
        .rows
        .iter()
        .map(|record| {
            let meta = record.job.as_ref().unwrap();
            (meta.job.as_str(), record.tau)
        })
        .collect();
    assert_eq!(jobs, vec![("a", 0.2), ("b", 0.2), ("a", 0.4)]);

    let oslo = &results.global.rows[1];
    let meta = oslo.job.as_ref().unwrap();
    assert_eq!(meta.city, "oslo");
    assert_eq!(meta.vacr, 0.3);
    assert_eq!(oslo.ticks, 40);
    assert!(oslo.is_missing());

    assert_eq!(results.spatial.len(), 6);
    assert!(results.spatial.rows.iter().all(|record| record.job.is_some()));
    assert_eq!(results.global.value(0, "abundance"), Some(2.0));
}

#[test]
fn job_results_write_meta_columns() {
    let table = JobTable::from_reader(JOBS.as_bytes()).unwrap();
    let results = reduce_by_job(&table).unwrap();
    let mut buffer = Vec::new();
    write_results(&mut buffer, &results.global).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();
    assert!(lines
        .next()
        .unwrap()
        .starts_with("tau,prop_mix,rep_id,vacr,city,job,ticks,abundance,"));
    let missing = lines.nth(1).unwrap();
    assert!(missing.starts_with("0.2,0.6_0.4,0,0.3,oslo,b,40,,"));
}

#[test]
fn job_columns_are_required() {
    let csv = "tau,prop_mix,rep_id,neighborhood,ticks,g0,g1\n0.2,0.6_0.4,0,n0,3,1,1\n";
    let err = JobTable::from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, DivError::Table(_)));
    assert_eq!(err.info().code, "map-missing-column");
}

#[test]
fn inconsistent_partition_is_rejected() {
    let csv = "\
job,city,vacr,tau,prop_mix,rep_id,neighborhood,ticks,g0,g1
a,lyon,0.1,0.2,0.6_0.4,0,n0,12,5,1
a,rome,0.1,0.2,0.6_0.4,0,n1,12,2,4
";
    let table = JobTable::from_reader(csv.as_bytes()).unwrap();
    let err = reduce_by_job(&table).unwrap_err();
    assert!(err.is_integrity());
    assert_eq!(err.info().code, "partition-inconsistent");
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("job"));
}

#[test]
fn counts_outside_the_scenario_are_rejected() {
    let csv = "\
job,city,vacr,tau,prop_mix,rep_id,neighborhood,ticks,g0,g1,g2
a,lyon,0.1,0.2,0.6_0.4,0,n0,12,5,1,3
";
    let table = JobTable::from_reader(csv.as_bytes()).unwrap();
    let err = reduce_by_job(&table).unwrap_err();
    assert_eq!(err.info().code, "unknown-group");
}
