use divsim_core::FrequencyTable;
use divsim_index::{global_indices, spatial_indices, GLOBAL_INDICES, SPATIAL_INDICES};
use proptest::prelude::*;

#[test]
fn absent_group_yields_zero_everywhere() {
    let table = FrequencyTable::from_rows(&[vec![3, 0, 2], vec![4, 0, 1], vec![0, 0, 5]]).unwrap();
    let records = spatial_indices(&table);
    let absent = &records[1];
    assert_eq!(absent.group, "g1");
    for (index, value) in SPATIAL_INDICES.iter().zip(&absent.values) {
        assert_eq!(*value, 0.0, "{} should be zero for an absent group", index.name);
    }
}

#[test]
fn empty_population_is_defined() {
    let table = FrequencyTable::from_rows(&[vec![0, 0], vec![0, 0]]).unwrap();
    for record in spatial_indices(&table) {
        assert!(record.values.iter().all(|value| *value == 0.0));
    }
    for (index, value) in GLOBAL_INDICES.iter().zip(global_indices(&table)) {
        assert_eq!(value, 0.0, "{} should be zero on an empty table", index.name);
    }
}

#[test]
fn single_group_population_is_defined() {
    let table = FrequencyTable::from_rows(&[vec![4, 0], vec![6, 0]]).unwrap();
    let records = spatial_indices(&table);
    assert_eq!(records[0].values[0], 0.0);
    assert!(records
        .iter()
        .flat_map(|record| record.values.iter())
        .all(|value| value.is_finite()));
    assert!(global_indices(&table).iter().all(|value| value.is_finite()));
}

#[test]
fn table_without_neighbourhoods_is_defined() {
    let table = FrequencyTable::with_default_ids(0, 3, Vec::new()).unwrap();
    let records = spatial_indices(&table);
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .flat_map(|record| record.values.iter())
        .all(|value| *value == 0.0));
    assert!(global_indices(&table).iter().all(|value| *value == 0.0));
}

fn table_strategy() -> impl Strategy<Value = FrequencyTable> {
    (0usize..6, 1usize..5).prop_flat_map(|(rows, groups)| {
        proptest::collection::vec(0u64..20, rows * groups).prop_map(move |counts| {
            FrequencyTable::with_default_ids(rows, groups, counts).expect("valid shape")
        })
    })
}

proptest! {
    #[test]
    fn indices_are_finite_and_shaped(table in table_strategy()) {
        let records = spatial_indices(&table);
        prop_assert_eq!(records.len(), table.n_groups());
        for record in &records {
            prop_assert_eq!(record.values.len(), SPATIAL_INDICES.len());
            prop_assert!(record.values.iter().all(|value| value.is_finite()));
        }
        let scalars = global_indices(&table);
        prop_assert_eq!(scalars.len(), GLOBAL_INDICES.len());
        prop_assert!(scalars.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn dissimilarity_stays_in_unit_interval(table in table_strategy()) {
        for record in spatial_indices(&table) {
            prop_assert!(record.values[0] >= 0.0);
            prop_assert!(record.values[0] <= 1.0 + 1e-9);
        }
    }
}
