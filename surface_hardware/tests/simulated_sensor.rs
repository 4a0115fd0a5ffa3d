use rstest::rstest;
use surface_hardware::SimulatedRangeSensor;
use surface_traits::RangeSensor;

#[rstest]
#[case(0.0)]
#[case(0.25)]
#[case(0.75)]
fn dropout_ratio_is_roughly_honoured(#[case] ratio: f64) {
    let mut s = SimulatedRangeSensor::new(20.0).with_dropout(ratio).with_seed(42);
    let n = 4000;
    let misses = (0..n).filter(|_| s.read_once().unwrap() <= 0.0).count();
    let observed = misses as f64 / n as f64;
    assert!(
        (observed - ratio).abs() < 0.05,
        "ratio {ratio}, observed {observed}"
    );
}

#[test]
fn same_seed_same_sequence() {
    let mut a = SimulatedRangeSensor::new(20.0).with_noise(0.2).with_seed(3);
    let mut b = SimulatedRangeSensor::new(20.0).with_noise(0.2).with_seed(3);
    for _ in 0..50 {
        assert_eq!(a.read_once().unwrap(), b.read_once().unwrap());
    }
}
