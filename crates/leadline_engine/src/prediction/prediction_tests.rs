//! Tests for the lead predictor.

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use crate::prediction::{
        estimate_acceleration, LeadPredictor, PredictorParams, ShotError, ShotInput, WeaponBallistics,
    };
    use crate::snapshot::{EntityHandle, Player, Roster, Weapon, WeaponKind};

    fn shooter_at_origin() -> Player {
        Player::new(EntityHandle(1), 0, Vec3::ZERO).with_weapon(Weapon::Disc, WeaponKind::LinearProjectile)
    }

    fn input<'a>(
        shooter: &'a Player,
        target: &'a Player,
        kind: WeaponKind,
        ballistics: WeaponBallistics,
    ) -> ShotInput<'a> {
        ShotInput {
            shooter,
            target,
            muzzle_offset: Vec3::ZERO,
            weapon_kind: kind,
            ballistics,
            target_acceleration: Vec3::ZERO,
        }
    }

    #[test]
    fn test_hitscan_returns_current_position() {
        let shooter = shooter_at_origin().with_velocity(Vec3::new(30.0, -4.0, 2.0));
        let target = Player::new(EntityHandle(2), 1, Vec3::new(12.0, 80.0, 3.0))
            .with_velocity(Vec3::new(50.0, 20.0, -10.0));

        let mut shot = input(&shooter, &target, WeaponKind::Hitscan, WeaponBallistics::projectile(95.0, 0.75));
        shot.target_acceleration = Vec3::new(100.0, 0.0, 0.0);
        shot.ballistics.latency_ms = 250.0;

        let solution = LeadPredictor::default().predict(&shot).unwrap();
        assert_eq!(solution.point, target.position());
        assert_eq!(solution.iterations(), 0);
    }

    #[test]
    fn test_arching_is_never_a_shot() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 10.0, 0.0));
        for speed in [0.0, 30.0, 95.0] {
            let shot = input(
                &shooter,
                &target,
                WeaponKind::ArchingProjectile,
                WeaponBallistics::projectile(speed, 0.75),
            );
            assert_eq!(LeadPredictor::default().predict(&shot), Err(ShotError::ArchingUnsupported));
        }
    }

    #[test]
    fn test_stationary_target_converges_in_two_iterations() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(40.0, 150.0, -7.0));

        for speed in [1.0, 55.0, 95.0, 425.0, 10_000.0] {
            let shot = input(
                &shooter,
                &target,
                WeaponKind::LinearProjectile,
                WeaponBallistics::projectile(speed, 0.75),
            );
            let solution = LeadPredictor::default().predict(&shot).unwrap();
            assert_eq!(solution.iterations(), 2, "speed {speed}");
            assert_eq!(solution.point, target.position(), "speed {speed}");
        }
    }

    #[test]
    fn test_receding_target_flight_time_is_monotonic_and_bounded() {
        let shooter = shooter_at_origin();
        let target_speed = 30.0;
        let projectile_speed = 95.0;
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 100.0, 0.0))
            .with_velocity(Vec3::new(0.0, target_speed, 0.0));

        let shot = input(
            &shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(projectile_speed, 0.75),
        );
        let params = PredictorParams::default();
        let solution = LeadPredictor::new(params).predict(&shot).unwrap();

        let bound = 100.0 / (projectile_speed - target_speed);
        for pair in solution.flight_times.windows(2) {
            assert!(pair[1] >= pair[0], "flight times must not decrease: {:?}", solution.flight_times);
        }
        for &t in &solution.flight_times {
            assert!(t <= bound + params.epsilon, "t = {t} exceeds bound {bound}");
        }
        // Prediction lies further along the target's path
        assert!(solution.point.y > target.position().y);
    }

    #[test]
    fn test_disc_lead_follows_target_velocity() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 200.0, 0.0))
            .with_velocity(Vec3::new(10.0, 0.0, 0.0));

        let shot = input(
            &shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(95.0, 0.75),
        );
        let solution = LeadPredictor::default().predict(&shot).unwrap();
        assert!(solution.iterations() <= 20);
        let offset = solution.point.x - target.position().x;
        assert!(offset > 0.0, "lead must be in the direction of travel, got {offset}");

        // Mirror: moving left leads left
        let target = target.with_velocity(Vec3::new(-10.0, 0.0, 0.0));
        let shot = input(
            &shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(95.0, 0.75),
        );
        let solution = LeadPredictor::default().predict(&shot).unwrap();
        assert!(solution.point.x < target.position().x);
    }

    #[test]
    fn test_shooter_velocity_inheritance_is_subtracted() {
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 200.0, 0.0));
        let moving_shooter = shooter_at_origin().with_velocity(Vec3::new(20.0, 0.0, 0.0));

        let shot = input(
            &moving_shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(95.0, 0.5),
        );
        let solution = LeadPredictor::default().predict(&shot).unwrap();
        // Shot carries +X momentum, so aim compensates towards -X
        assert!(solution.point.x < 0.0);
    }

    #[test]
    fn test_latency_extends_final_flight_time() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 100.0, 0.0))
            .with_velocity(Vec3::new(10.0, 0.0, 0.0));

        let mut ballistics = WeaponBallistics::projectile(95.0, 0.75);
        let base = LeadPredictor::default()
            .predict(&input(&shooter, &target, WeaponKind::LinearProjectile, ballistics))
            .unwrap();

        ballistics.latency_ms = 100.0;
        let delayed = LeadPredictor::default()
            .predict(&input(&shooter, &target, WeaponKind::LinearProjectile, ballistics))
            .unwrap();

        assert!((delayed.time_of_flight - base.time_of_flight - 0.1).abs() < 1.0e-4);
        assert!((delayed.point.x - base.point.x - 1.0).abs() < 1.0e-3);
    }

    #[test]
    fn test_latency_weight_moves_start_position() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 100.0, 0.0))
            .with_velocity(Vec3::new(10.0, 0.0, 0.0));
        let mut ballistics = WeaponBallistics::projectile(95.0, 0.75);
        ballistics.latency_ms = 200.0;

        let unweighted = LeadPredictor::default()
            .predict(&input(&shooter, &target, WeaponKind::LinearProjectile, ballistics))
            .unwrap();
        let weighted = LeadPredictor::new(PredictorParams {
            latency_weight: 1.0,
            ..PredictorParams::default()
        })
        .predict(&input(&shooter, &target, WeaponKind::LinearProjectile, ballistics))
        .unwrap();

        // Weighted start already moved 10 * 0.2 = 2 units along X
        assert!(weighted.point.x > unweighted.point.x + 1.5);
    }

    #[test]
    fn test_target_faster_than_projectile_does_not_converge() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 100.0, 0.0))
            .with_velocity(Vec3::new(0.0, 200.0, 0.0));
        let shot = input(
            &shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(95.0, 0.75),
        );
        assert_eq!(
            LeadPredictor::default().predict(&shot),
            Err(ShotError::NotConverged { iterations: 20 })
        );
    }

    #[test]
    fn test_zero_speed_linear_is_invalid() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(0.0, 100.0, 0.0));
        for speed in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let shot = input(
                &shooter,
                &target,
                WeaponKind::LinearProjectile,
                WeaponBallistics::projectile(speed, 0.75),
            );
            assert!(matches!(
                LeadPredictor::default().predict(&shot),
                Err(ShotError::InvalidBallistics { .. })
            ));
        }
    }

    #[test]
    fn test_non_finite_target_is_degenerate() {
        let shooter = shooter_at_origin();
        let target = Player::new(EntityHandle(2), 1, Vec3::new(f32::NAN, 100.0, 0.0));
        let shot = input(
            &shooter,
            &target,
            WeaponKind::LinearProjectile,
            WeaponBallistics::projectile(95.0, 0.75),
        );
        assert_eq!(LeadPredictor::default().predict(&shot), Err(ShotError::Degenerate));
    }

    #[test]
    fn test_acceleration_from_shadow_roster() {
        let before = Player::new(EntityHandle(5), 1, Vec3::ZERO).with_velocity(Vec3::new(0.0, 10.0, 0.0));
        let now = before.clone().with_velocity(Vec3::new(0.0, 12.0, 0.0));
        let shadow = Roster::new(Player::invalid(EntityHandle(1)), vec![before]);

        let acceleration = estimate_acceleration(&now, Some(&shadow), 0.5);
        assert_eq!(acceleration, Vec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn test_acceleration_defaults_to_zero() {
        let now = Player::new(EntityHandle(5), 1, Vec3::ZERO).with_velocity(Vec3::new(0.0, 12.0, 0.0));
        let stranger = Player::new(EntityHandle(6), 1, Vec3::ZERO);
        let shadow = Roster::new(Player::invalid(EntityHandle(1)), vec![stranger]);

        assert_eq!(estimate_acceleration(&now, None, 0.5), Vec3::ZERO);
        assert_eq!(estimate_acceleration(&now, Some(&shadow), 0.5), Vec3::ZERO);
        assert_eq!(estimate_acceleration(&now, Some(&shadow), 0.0), Vec3::ZERO);
    }
}
