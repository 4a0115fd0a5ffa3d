use rstest::rstest;
use surface_core::config::{CalibrationTable, NotifierCfg, SamplingCfg};
use surface_core::error::BuildError;
use surface_core::mocks::{NullBuzzer, NullDisplay, SeqSensor};
use surface_core::Scanner;

#[rstest]
fn builder_missing_sensor_yields_typed_build_error() {
    let err = Scanner::builder()
        // missing with_sensor()
        .with_display(NullDisplay)
        .with_buzzer(NullBuzzer)
        .try_build()
        .expect_err("should fail with MissingSensor");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingSensor) => {}
        other => panic!("expected MissingSensor, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_display_yields_typed_build_error() {
    let err = Scanner::builder()
        .with_sensor(SeqSensor::new([10.0]))
        .with_buzzer(NullBuzzer)
        .try_build()
        .expect_err("should fail with MissingDisplay");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingDisplay)
    ));
}

#[rstest]
fn builder_missing_buzzer_yields_typed_build_error() {
    let err = Scanner::builder()
        .with_sensor(SeqSensor::new([10.0]))
        .with_display(NullDisplay)
        .try_build()
        .expect_err("should fail with MissingBuzzer");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingBuzzer)
    ));
}

#[rstest]
#[case::inverted_bands(CalibrationTable { flat_max_sigma: 0.3, slightly_curved_max_sigma: 0.2, absorption_threshold: 0.096 })]
#[case::equal_bands(CalibrationTable { flat_max_sigma: 0.2, slightly_curved_max_sigma: 0.2, absorption_threshold: 0.096 })]
#[case::zero_absorption(CalibrationTable { flat_max_sigma: 0.175, slightly_curved_max_sigma: 0.204, absorption_threshold: 0.0 })]
#[case::nan_flat(CalibrationTable { flat_max_sigma: f64::NAN, slightly_curved_max_sigma: 0.204, absorption_threshold: 0.096 })]
fn builder_rejects_bad_calibration(#[case] table: CalibrationTable) {
    let err = Scanner::builder()
        .with_sensor(SeqSensor::new([10.0]))
        .with_display(NullDisplay)
        .with_buzzer(NullBuzzer)
        .with_calibration(table)
        .build()
        .expect_err("invalid table");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn builder_rejects_zero_batch_size() {
    let err = Scanner::builder()
        .with_sensor(SeqSensor::new([10.0]))
        .with_display(NullDisplay)
        .with_buzzer(NullBuzzer)
        .with_sampling(SamplingCfg {
            batch_size: 0,
            ..SamplingCfg::default()
        })
        .build()
        .expect_err("zero batch");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => assert!(msg.contains("batch_size")),
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[test]
fn builder_rejects_zero_queue_capacity() {
    let err = Scanner::builder()
        .with_sensor(SeqSensor::new([10.0]))
        .with_display(NullDisplay)
        .with_buzzer(NullBuzzer)
        .with_notifier(NotifierCfg {
            queue_capacity: 0,
            ..NotifierCfg::default()
        })
        .build()
        .expect_err("zero capacity");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn scanner_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Scanner>();
}
