use divsim_core::{
    DivError, FrequencyTable, IndexRecord, MergedResults, RecordLevel, ReplicationKey,
    ReplicationMap, ResultTable,
};

fn sample() -> FrequencyTable {
    FrequencyTable::from_rows(&[vec![3, 1], vec![0, 4], vec![2, 2]]).expect("table")
}

#[test]
fn totals_follow_rows_and_columns() {
    let table = sample();
    assert_eq!(table.rows(), ["n0", "n1", "n2"]);
    assert_eq!(table.groups(), ["g0", "g1"]);
    assert_eq!(table.row_totals(), vec![4, 4, 4]);
    assert_eq!(table.column_totals(), vec![5, 7]);
    assert_eq!(table.total(), 12);
    assert_eq!(table.column(1).collect::<Vec<_>>(), vec![1, 4, 2]);
}

#[test]
fn malformed_tables_are_rejected() {
    assert!(matches!(
        FrequencyTable::from_rows(&[vec![1, 2], vec![3]]),
        Err(DivError::Table(_))
    ));
    assert!(matches!(
        FrequencyTable::new(vec!["a".into(), "a".into()], vec!["g0".into()], vec![1, 2]),
        Err(DivError::Table(_))
    ));
    assert!(matches!(
        FrequencyTable::with_default_ids(2, 2, vec![1, 2, 3]),
        Err(DivError::Table(_))
    ));
}

#[test]
fn non_converged_maps_keep_shape_but_drop_counts() {
    let key = ReplicationKey::new(0.3, "0.5_0.5", 7);
    let map = ReplicationMap::from_outcome(key.clone(), 1000, sample(), false);
    assert!(!map.is_converged());
    assert_eq!(map.ticks, 1000);
    assert_eq!(map.neighborhoods.len(), 3);
    assert_eq!(map.group_count, 2);
    assert!(map.key.same_as(&key));

    let kept = ReplicationMap::from_outcome(key, 12, sample(), true);
    assert_eq!(kept.table, Some(sample()));
}

fn record(tau: f64, rep_id: u32, group: &str) -> IndexRecord {
    IndexRecord {
        tau,
        prop_mix: "0.5_0.5".into(),
        rep_id,
        group: Some(group.into()),
        ticks: 4,
        job: None,
        values: vec![Some(0.5)],
    }
}

#[test]
fn result_tables_enforce_schema_and_sort_by_key() {
    let mut table = ResultTable::new(RecordLevel::Spatial, vec!["segregation_gsg".into()]);
    table.push(record(0.2, 1, "g0-0.50")).expect("push");
    table.push(record(0.1, 1, "g1-0.50")).expect("push");
    table.push(record(0.1, 0, "g0-0.50")).expect("push");
    table.push(record(0.1, 1, "g0-0.50")).expect("push");

    let mut wide = record(0.1, 0, "g0-0.50");
    wide.values.push(None);
    assert!(matches!(table.push(wide), Err(DivError::Table(_))));

    let mut global = record(0.1, 0, "g0-0.50");
    global.group = None;
    assert!(matches!(table.push(global), Err(DivError::Table(_))));

    table.sort_canonical();
    let keys: Vec<_> = table
        .rows
        .iter()
        .map(|row| (row.tau, row.rep_id, row.group.clone().unwrap_or_default()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (0.1, 0, "g0-0.50".to_string()),
            (0.1, 1, "g0-0.50".to_string()),
            (0.1, 1, "g1-0.50".to_string()),
            (0.2, 1, "g0-0.50".to_string()),
        ]
    );
    assert_eq!(table.value(0, "segregation_gsg"), Some(0.5));
}

#[test]
fn merged_results_only_append_matching_schemas() {
    let mut merged = MergedResults::new(vec!["a".into()], vec!["b".into()]);
    let other = MergedResults::new(vec!["a".into()], vec!["b".into()]);
    merged.append(other).expect("append");
    let mismatched = MergedResults::new(vec!["c".into()], vec!["b".into()]);
    assert!(merged.append(mismatched).is_err());
}
