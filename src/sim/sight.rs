//! Line-of-sight test for the directional sensor.
//!
//! An object is visible when one of the cone's two edge tangents falls
//! strictly inside the open slope interval spanned by the object's two
//! extreme visible corners. A sensor standing strictly inside an object's
//! horizontal extent inverts the raw result: the object cannot be seen
//! through from directly above or below it.

use log::debug;

use crate::schema::{Condition, SensorConfig};

use super::runner::Snapshot;
use super::scenario::{ObjectExtent, Scenario};

/// Slopes from the sensor position to the object's two extreme visible
/// corners. Corner selection depends on which side of the extent the sensor
/// stands on.
fn corner_slopes(obj: &ObjectExtent, position: f32) -> (f32, f32) {
    let (near_x, near_y, far_x, far_y) = if position < obj.start_x {
        // sensor on the left
        (obj.end_x, obj.start_y, obj.start_x, obj.end_y)
    } else if position <= obj.end_x {
        // sensor under the object
        (obj.start_x, obj.start_y, obj.end_x, obj.start_y)
    } else {
        // sensor on the right
        (obj.end_x, obj.end_y, obj.start_x, obj.start_y)
    };
    (near_y / (near_x - position), far_y / (far_x - position))
}

/// Raw cone test against one object, including the inside-extent inversion.
fn object_in_sight(obj: &ObjectExtent, snap: &Snapshot, cone_half_angle: f32) -> bool {
    let tan_left = (snap.angle + cone_half_angle).tan();
    let tan_right = (snap.angle - cone_half_angle).tan();
    let (near, far) = corner_slopes(obj, snap.position);

    let mut seen = (tan_left > near && tan_left < far) || (tan_right > near && tan_right < far);
    if obj.contains_x(snap.position) {
        seen = !seen;
    }
    seen
}

/// Evaluate `condition` against the scenario at the snapshot's sensor state,
/// updating the snapshot's detection status.
///
/// Object 1 is checked first and short-circuits: a detected object satisfies
/// `Object` immediately and fails `NonObject` immediately, so a nearer object
/// is never "seen through". `NonObject` succeeds only when neither object is
/// in sight.
///
/// The status field is only written on the paths above: when `NonObject`
/// fails because object 2 alone is in sight, the snapshot keeps its seeded
/// status of 0.
pub(crate) fn verify_condition(
    scenario: &Scenario,
    condition: Condition,
    snap: &mut Snapshot,
    cfg: &SensorConfig,
) -> bool {
    let found_obj1 = object_in_sight(&scenario.object1, snap, cfg.cone_half_angle);

    if condition == Condition::Object && found_obj1 {
        debug!("condition verified, object 1 in sight");
        snap.status = 1.0;
        return true;
    }
    if condition == Condition::NonObject && found_obj1 {
        debug!("condition failed, object 1 in sight");
        snap.status = 1.0;
        return false;
    }

    let found_obj2 = object_in_sight(&scenario.object2, snap, cfg.cone_half_angle);

    if condition == Condition::Object && found_obj2 {
        debug!("condition verified, object 2 in sight");
        snap.status = 1.0;
        return true;
    }
    if condition == Condition::NonObject && !found_obj1 && !found_obj2 {
        snap.status = 0.0;
        return true;
    }

    if !found_obj1 && !found_obj2 {
        snap.status = 0.0;
    }
    false
}
