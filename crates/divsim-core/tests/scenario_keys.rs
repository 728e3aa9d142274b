use divsim_core::{DivError, Scenario};

#[test]
fn implicit_remainder_is_part_of_the_key() {
    let scenario = Scenario::new(&[0.5]).expect("scenario");
    assert_eq!(scenario.key(), "0.5_0.5");
    assert_eq!(scenario.group_count(), 2);

    let ladder = Scenario::new(&[0.4, 0.3, 0.2]).expect("scenario");
    assert_eq!(ladder.key(), "0.4_0.3_0.2_0.1");
}

#[test]
fn full_proportion_lists_are_kept() {
    let scenario = Scenario::new(&[0.7, 0.2, 0.1]).expect("scenario");
    assert_eq!(scenario.key(), "0.7_0.2_0.1");
    assert_eq!(scenario.group_ids(), vec!["g0", "g1", "g2"]);
}

#[test]
fn group_labels_carry_padded_proportions() {
    let scenario = Scenario::new(&[0.7, 0.2, 0.1]).expect("scenario");
    assert_eq!(scenario.annotate("g1").as_deref(), Some("g1-0.20"));
    assert_eq!(scenario.annotate("g0").as_deref(), Some("g0-0.70"));
    assert_eq!(scenario.annotate("g3"), None);
    assert_eq!(scenario.annotate("n1"), None);
}

#[test]
fn keys_round_trip_through_parsing() {
    let scenario = Scenario::new(&[0.2, 0.2, 0.2, 0.2]).expect("scenario");
    let parsed = Scenario::from_key(scenario.key()).expect("parse");
    assert_eq!(parsed.key(), scenario.key());
    assert_eq!(parsed.group_label(4), scenario.group_label(4));
}

#[test]
fn noisy_stored_keys_keep_their_tokens() {
    let parsed = Scenario::from_key("0.7_0.1_0.1_0.09999999999999992").expect("parse");
    assert_eq!(parsed.group_label(3).as_deref(), Some("g3-0.09999999999999992"));
}

#[test]
fn invalid_scenarios_are_rejected() {
    assert!(matches!(Scenario::new(&[]), Err(DivError::Scenario(_))));
    assert!(matches!(Scenario::new(&[1.0]), Err(DivError::Scenario(_))));
    assert!(matches!(Scenario::new(&[0.8, 0.4]), Err(DivError::Scenario(_))));
    assert!(matches!(Scenario::new(&[0.5, -0.1]), Err(DivError::Scenario(_))));
    assert!(matches!(Scenario::from_key("0.5_x"), Err(DivError::Scenario(_))));
    assert!(matches!(Scenario::from_key("0.5_0.3"), Err(DivError::Scenario(_))));
}

#[test]
fn labels_are_optional_metadata() {
    let scenario = Scenario::new(&[0.7]).expect("scenario").with_label("Single minority");
    assert_eq!(scenario.label(), Some("Single minority"));
    assert_eq!(scenario.key(), "0.7_0.3");
}
