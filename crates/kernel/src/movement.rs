use crate::config::NavConfig;
use glam::Vec3;
use serde::Serialize;
use walkthrough_input::{Action, ActionSet};

/// Horizontal world-space displacement for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Displacement {
    pub dx: f32,
    pub dz: f32,
}

impl Displacement {
    pub const ZERO: Self = Self { dx: 0.0, dz: 0.0 };

    pub fn new(dx: f32, dz: f32) -> Self {
        Self { dx, dz }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dz == 0.0
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.dx, 0.0, self.dz)
    }
}

/// Integrator output: the committed yaw and the proposed displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub yaw: f32,
    pub displacement: Displacement,
}

/// Camera-frame velocity `(x, z)`. Left is +x, back is +z.
pub fn local_velocity(actions: &ActionSet, speed: f32) -> (f32, f32) {
    (
        speed * actions.axis(Action::Left, Action::Right),
        speed * actions.axis(Action::Back, Action::Forward),
    )
}

/// Turn, then rotate the local velocity into world space with the new yaw.
pub fn integrate(actions: &ActionSet, yaw: f32, config: &NavConfig) -> Motion {
    let yaw = yaw + config.turn_rate() * actions.axis(Action::TurnLeft, Action::TurnRight);

    let (local_x, local_z) = local_velocity(actions, config.speed);
    let (sin, cos) = yaw.sin_cos();
    let displacement = Displacement {
        dx: local_x * -cos + local_z * sin,
        dz: local_x * sin + local_z * cos,
    };

    Motion { yaw, displacement }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-6;

    fn held(actions: &[Action]) -> ActionSet {
        let mut set = ActionSet::new();
        for a in actions {
            set.set(*a, true);
        }
        set
    }

    #[test]
    fn no_input_is_still() {
        let motion = integrate(&ActionSet::new(), 1.25, &NavConfig::default());
        assert_eq!(motion.yaw, 1.25);
        assert!(motion.displacement.is_zero());
    }

    #[test]
    fn forward_at_zero_yaw_moves_down_negative_z() {
        let motion = integrate(&held(&[Action::Forward]), 0.0, &NavConfig::default());
        assert!(motion.displacement.dx.abs() < EPS);
        assert!((motion.displacement.dz + 0.1).abs() < EPS);
    }

    #[test]
    fn left_and_forward_at_zero_yaw() {
        let motion = integrate(
            &held(&[Action::Left, Action::Forward]),
            0.0,
            &NavConfig::default(),
        );
        assert!((motion.displacement.dx + 0.1).abs() < EPS);
        assert!((motion.displacement.dz + 0.1).abs() < EPS);
    }

    #[test]
    fn opposing_inputs_cancel_at_any_yaw() {
        let actions = held(&[Action::Forward, Action::Back]);
        assert_eq!(local_velocity(&actions, 0.1), (0.0, 0.0));
        for yaw in [0.0, 0.3, FRAC_PI_2, PI, -2.0, 17.5] {
            let motion = integrate(&actions, yaw, &NavConfig::default());
            assert!(motion.displacement.is_zero(), "yaw {yaw}");
        }

        let sideways = held(&[Action::Left, Action::Right]);
        assert!(integrate(&sideways, 0.7, &NavConfig::default()).displacement.is_zero());
    }

    #[test]
    fn turning_both_ways_nets_zero() {
        let actions = held(&[Action::TurnLeft, Action::TurnRight]);
        assert_eq!(integrate(&actions, 0.5, &NavConfig::default()).yaw, 0.5);
    }

    #[test]
    fn turn_left_increases_yaw_by_turn_rate() {
        let config = NavConfig::default();
        let motion = integrate(&held(&[Action::TurnLeft]), 0.0, &config);
        assert_eq!(motion.yaw, config.turn_rate());

        let motion = integrate(&held(&[Action::TurnRight]), 0.0, &config);
        assert_eq!(motion.yaw, -config.turn_rate());
    }

    #[test]
    fn rotation_uses_the_updated_yaw() {
        // A quarter turn in one frame, then forward follows the new heading (-X).
        let config = NavConfig::default().with_turn_rate(FRAC_PI_2);
        let motion = integrate(&held(&[Action::TurnLeft, Action::Forward]), 0.0, &config);
        assert!((motion.displacement.dx + 0.1).abs() < EPS);
        assert!(motion.displacement.dz.abs() < EPS);
    }

    #[test]
    fn forward_follows_pose_forward() {
        let config = NavConfig::default();
        for yaw in [0.0_f32, 0.4, 2.0, -1.1] {
            let motion = integrate(&held(&[Action::Forward]), yaw, &config);
            let expected = walkthrough_common::Pose::new(Vec3::ZERO, yaw).forward() * config.speed;
            assert!((motion.displacement.as_vec3() - expected).length() < EPS);
        }
    }

    #[test]
    fn speed_scales_displacement() {
        let config = NavConfig::default().with_speed(0.5);
        let motion = integrate(&held(&[Action::Back]), 0.0, &config);
        assert!((motion.displacement.dz - 0.5).abs() < EPS);
    }
}
