//! End-to-end targeting scenarios через публичный API движка
//!
//! Проверяем:
//! - выбор цели ближе к прицелу (enemyA vs enemyB)
//! - disc: скорость 95, наследование 0.75, упреждение в сторону движения
//! - friendly fire выключен → союзники не выбираются
//! - стена между игроками → цели нет

use std::f32::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use bevy::math::Vec3;
use leadline_engine::*;

fn camera() -> CameraProjection {
    CameraProjection::first_person(Vec3::ZERO, Vec3::Y, FRAC_PI_2, Viewport::new(1280.0, 720.0))
}

fn shooter(resource: &str) -> Player {
    Player::new(EntityHandle(1), 0, Vec3::ZERO)
        .with_forward(Vec3::Y)
        .with_weapon_resource(resource)
        .with_name("local")
}

fn engine() -> TargetingEngine {
    let engine = TargetingEngine::default();
    engine.update_camera(camera());
    engine
}

#[test]
fn test_crosshair_prefers_enemy_on_center() {
    let engine = engine();
    let enemy_a = Player::new(EntityHandle(10), 1, Vec3::new(0.0, 100.0, 0.0)).with_name("enemyA");
    let enemy_b = Player::new(EntityHandle(11), 1, Vec3::new(50.0, 100.0, 0.0)).with_name("enemyB");
    engine.submit_snapshot(shooter("weapon_sniper.dts"), vec![enemy_b, enemy_a]);

    let report = engine.producer_tick(Instant::now(), &OpenFieldOracle, ControlState::default());

    assert_eq!(report.lock_event, Some(LockEvent::Acquired));
    assert_eq!(engine.lock().identity(), Some(EntityHandle(10)));
    let frame = engine.latest_frame();
    assert_eq!(frame.aim.primary().map(|r| r.target), Some(EntityHandle(10)));
}

#[test]
fn test_disc_scenario_lead_and_inheritance() {
    let engine = engine();
    let start = Instant::now();

    // Цель бежит вправо, стрелок бежит вперёд
    let local = shooter("weapon_disc.dts").with_velocity(Vec3::new(0.0, 20.0, 0.0));
    let target = Player::new(EntityHandle(10), 1, Vec3::new(0.0, 100.0, 0.0)).with_velocity(Vec3::new(15.0, 0.0, 0.0));
    engine.submit_snapshot(local, vec![target]);
    engine.producer_tick(start, &OpenFieldOracle, ControlState::default());

    let frame = engine.latest_frame();
    assert_eq!(frame.aim.status, AimStatus::Solved);
    let point = frame.aim.primary().unwrap().predicted_world_point;

    // Упреждение вправо, а наследование скорости (0.75·20) тянет точку к стрелку
    assert!(point.x > 10.0, "{point:?}");
    assert!(point.y < 100.0, "{point:?}");
    assert!(frame.is_finite());

    // Та же цель, стрелок стоит → точка дальше по y
    let still = shooter("weapon_disc.dts");
    let target = Player::new(EntityHandle(10), 1, Vec3::new(0.0, 100.0, 0.0)).with_velocity(Vec3::new(15.0, 0.0, 0.0));
    engine.submit_snapshot(still, vec![target]);
    engine.producer_tick(start + Duration::from_millis(20), &OpenFieldOracle, ControlState::default());
    let still_point = engine.latest_frame().aim.primary().unwrap().predicted_world_point;
    assert_eq!(still_point.y, 100.0);
}

#[test]
fn test_friendly_fire_exclusion() {
    let engine = engine();
    let friend = Player::new(EntityHandle(10), 0, Vec3::new(0.0, 100.0, 0.0));
    engine.submit_snapshot(shooter("weapon_disc.dts"), vec![friend]);
    engine.producer_tick(Instant::now(), &OpenFieldOracle, ControlState::default());

    assert_eq!(engine.latest_frame().aim.status, AimStatus::NoTarget);

    let mut config = TargetingConfig::default();
    config.aim.friendly_fire = true;
    engine.update_config(config).unwrap();
    engine.producer_tick(Instant::now() + Duration::from_millis(20), &OpenFieldOracle, ControlState::default());
    assert_eq!(engine.latest_frame().aim.status, AimStatus::Solved);
}

#[test]
fn test_wall_blocks_acquisition() {
    let engine = engine();
    engine.submit_snapshot(
        shooter("weapon_disc.dts"),
        vec![Player::new(EntityHandle(10), 1, Vec3::new(0.0, 100.0, 0.0))],
    );

    // Стена на y = 50
    let wall = |from: Vec3, to: Vec3, _: RayMask| {
        if (from.y < 50.0) != (to.y < 50.0) {
            RayHit::Hit(ObjectCategory::Terrain)
        } else {
            RayHit::Hit(ObjectCategory::Player)
        }
    };
    engine.producer_tick(Instant::now(), &wall, ControlState::default());
    assert_eq!(engine.latest_frame().aim.status, AimStatus::NoTarget);
    // Радар и оверлей стены не видят
    assert_eq!(engine.latest_frame().radar.len(), 1);
}

#[test]
fn test_closest_distance_mode_ignores_crosshair() {
    let mut config = TargetingConfig::default();
    config.aim.mode = AcquisitionMode::ClosestDistance;
    let engine = TargetingEngine::new(config).unwrap();
    engine.update_camera(camera());

    engine.submit_snapshot(
        shooter("weapon_sniper.dts"),
        vec![
            Player::new(EntityHandle(10), 1, Vec3::new(0.0, 200.0, 0.0)),
            Player::new(EntityHandle(11), 1, Vec3::new(60.0, 60.0, 0.0)),
        ],
    );
    engine.producer_tick(Instant::now(), &OpenFieldOracle, ControlState::default());
    assert_eq!(engine.lock().identity(), Some(EntityHandle(11)));
}
