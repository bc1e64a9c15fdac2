//! Tests for pan/tilt actuation


use proptest::prelude::*;
use ptz_face_tracker::{
    actuation::{exceeds_hysteresis, PanTiltActuator},
    constants::{PAN_CONTROL, PAN_SPEC, TILT_CONTROL},
    values::CurrentValues,
};
use test_helpers::RecordingGateway;

fn values(pan: i32, tilt: i32) -> CurrentValues {
    let mut values = CurrentValues::new();
    values.insert(PAN_CONTROL, pan);
    values.insert(TILT_CONTROL, tilt);
    values
}

#[test]
fn test_hysteresis_threshold() {
    let actuator = PanTiltActuator::default();
    assert!(actuator.plan(&values(0, 0), (100, 0)).is_none());
    assert!(actuator.plan(&values(0, 0), (0, -100)).is_none());
    assert_eq!(actuator.plan(&values(0, 0), (101, 0)).unwrap().pan, 101);
    assert_eq!(actuator.plan(&values(0, 0), (0, -101)).unwrap().tilt, -101);
}

#[test]
fn test_missing_positions_start_at_zero() {
    let actuator = PanTiltActuator::default();
    let target = actuator.plan(&CurrentValues::new(), (-9_113, 500)).unwrap();
    assert_eq!(target.pan, -9_113);
    assert_eq!(target.tilt, 500);
    assert_eq!(target.delta, (-9_113, 500));
}

#[test]
fn test_commit_writes_pan_then_tilt() {
    let actuator = PanTiltActuator::default();
    let mut gateway = RecordingGateway::new();
    let mut cache = values(3_600, 0);

    let target = actuator.plan(&cache, (-7_200, 3_600)).unwrap();
    let result = actuator.commit(&mut gateway, &mut cache, &target);

    assert!(result.all_ok());
    assert_eq!(
        gateway.sets,
        vec![(PAN_CONTROL.to_string(), -3_600), (TILT_CONTROL.to_string(), 3_600)]
    );
    assert_eq!(cache.get(PAN_CONTROL), Some(-3_600));
    assert_eq!(cache.get(TILT_CONTROL), Some(3_600));
}

#[test]
fn test_commit_failure_is_optimistic() {
    let actuator = PanTiltActuator::default();
    let mut gateway = RecordingGateway::new().failing_on(TILT_CONTROL);
    let mut cache = values(0, 0);

    let target = actuator.plan(&cache, (0, 5_000)).unwrap();
    let result = actuator.commit(&mut gateway, &mut cache, &target);

    assert!(result.pan_ok);
    assert!(!result.tilt_ok);
    assert_eq!(cache.get(TILT_CONTROL), Some(5_000));
}

proptest! {
    #[test]
    fn test_plan_stays_in_hardware_range(
        pan in PAN_SPEC.min..=PAN_SPEC.max,
        tilt in PAN_SPEC.min..=PAN_SPEC.max,
        dx in any::<i32>(),
        dy in any::<i32>(),
    ) {
        let actuator = PanTiltActuator::default();
        match actuator.plan(&values(pan, tilt), (dx, dy)) {
            Some(target) => {
                prop_assert!(exceeds_hysteresis((dx, dy)));
                prop_assert!((PAN_SPEC.min..=PAN_SPEC.max).contains(&target.pan));
                prop_assert!((PAN_SPEC.min..=PAN_SPEC.max).contains(&target.tilt));
                let expected = (i64::from(pan) + i64::from(dx))
                    .clamp(i64::from(PAN_SPEC.min), i64::from(PAN_SPEC.max));
                prop_assert_eq!(i64::from(target.pan), expected);
            }
            None => prop_assert!(!exceeds_hysteresis((dx, dy))),
        }
    }
}
