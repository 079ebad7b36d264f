//! Scenario generation: two objects on a 1-D track plus the sensor state.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::schema::SensorConfig;

/// Axis-aligned object: a horizontal extent on the track and a depth extent
/// along the viewing axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExtent {
    pub start_x: f32,
    pub end_x: f32,
    pub start_y: f32,
    pub end_y: f32,
}

impl ObjectExtent {
    /// Half of the horizontal extent.
    pub fn half_width(&self) -> f32 {
        (self.end_x - self.start_x) / 2.0
    }

    /// Whether `x` lies strictly inside the horizontal extent.
    pub fn contains_x(&self, x: f32) -> bool {
        x > self.start_x && x < self.end_x
    }
}

/// The sensor: a position on the `[0, 1]` rail and a viewing angle in
/// radians, `pi/2` being straight up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorState {
    pub position: f32,
    pub angle: f32,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            position: 0.0,
            angle: FRAC_PI_2,
        }
    }
}

/// One randomly generated environment instance, consumed by a single
/// simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Object in the left half of the track, extent within `[0.05, 0.45]`.
    pub object1: ObjectExtent,
    /// Object in the right half of the track, extent within `[0.55, 0.95]`.
    pub object2: ObjectExtent,
    /// Persisted sensor state, updated as a strategy executes.
    pub sensor: SensorState,
    /// Regression label: half-width of the horizontal extent of whichever
    /// object was placed nearer.
    pub nearest_half_width: f32,
}

/// Generate a fresh scenario from the random stream.
///
/// Object 1's extent is drawn inside `[0.05, 0.45]`, object 2's inside
/// `[0.55, 0.95]`, so the two can never overlap. A coin flip decides which
/// object sits at the shallow depth; that object defines the label.
pub fn generate_scenario<R: Rng>(rng: &mut R, cfg: &SensorConfig) -> Scenario {
    let (a, b) = (span_draw(rng, 0.05), span_draw(rng, 0.05));
    let (obj1_start, obj1_end) = (a.min(b), a.max(b));

    let (a, b) = (span_draw(rng, 0.55), span_draw(rng, 0.55));
    let (obj2_start, obj2_end) = (a.min(b), a.max(b));

    let near_depth = span_draw(rng, 0.05);
    let far_depth = span_draw(rng, 0.55);

    let (obj1_depth, obj2_depth, nearest_half_width) = if rng.next_u32() % 2 == 0 {
        // first object is closer
        (near_depth, far_depth, (obj1_end - obj1_start) / 2.0)
    } else {
        (far_depth, near_depth, (obj2_end - obj2_start) / 2.0)
    };

    Scenario {
        object1: ObjectExtent {
            start_x: obj1_start,
            end_x: obj1_end,
            start_y: obj1_depth,
            end_y: obj1_depth + cfg.object_depth,
        },
        object2: ObjectExtent {
            start_x: obj2_start,
            end_x: obj2_end,
            start_y: obj2_depth,
            end_y: obj2_depth + cfg.object_depth,
        },
        sensor: SensorState::default(),
        nearest_half_width,
    }
}

/// Uniform draw in `[base, base + 0.4)`.
fn span_draw<R: Rng>(rng: &mut R, base: f32) -> f32 {
    rng.r#gen::<f32>() * 0.4 + base
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_extents_stay_in_their_halves() {
        let cfg = SensorConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let s = generate_scenario(&mut rng, &cfg);
            assert!(s.object1.start_x >= 0.05 && s.object1.end_x <= 0.45);
            assert!(s.object2.start_x >= 0.55 && s.object2.end_x <= 0.95);
            assert!(s.object1.start_x <= s.object1.end_x);
            assert!(s.object2.start_x <= s.object2.end_x);
            // disjoint by construction
            assert!(s.object1.end_x < s.object2.start_x);
        }
    }

    #[test]
    fn test_exactly_one_object_is_nearer() {
        let cfg = SensorConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let s = generate_scenario(&mut rng, &cfg);
            assert_ne!(s.object1.start_y, s.object2.start_y);
            let nearer = if s.object1.start_y < s.object2.start_y {
                &s.object1
            } else {
                &s.object2
            };
            assert!((s.nearest_half_width - nearer.half_width()).abs() < 1e-6);
            assert!((s.object1.end_y - s.object1.start_y - cfg.object_depth).abs() < 1e-6);
            assert!((s.object2.end_y - s.object2.start_y - cfg.object_depth).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sensor_starts_vertical_at_origin() {
        let cfg = SensorConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let s = generate_scenario(&mut rng, &cfg);
        assert_eq!(s.sensor.position, 0.0);
        assert!((s.sensor.angle - FRAC_PI_2).abs() < 1e-6);
    }
}
