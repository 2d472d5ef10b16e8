//! Randomized арены (ChaCha8Rng, фиксированный seed)
//!
//! Инварианты на каждом тике:
//! - FrameOutput всегда конечен (никаких NaN/Inf)
//! - новый захват (Acquired/Switched) никогда не союзник
//! - одинаковый seed → одинаковая последовательность захватов

use std::f32::consts::FRAC_PI_3;
use std::time::{Duration, Instant};

use bevy::math::Vec3;
use leadline_engine::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TICKS: u32 = 500;

fn random_vec(rng: &mut ChaCha8Rng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent * 0.1..extent * 0.1),
    )
}

fn random_player(rng: &mut ChaCha8Rng, id: u64) -> Player {
    let mut player = Player::new(EntityHandle(id), rng.gen_range(0..3), random_vec(rng, 300.0))
        .with_velocity(random_vec(rng, 40.0))
        .with_eye_height(rng.gen_range(0.0..3.0));
    // Иногда вырожденные данные
    if rng.gen_bool(0.05) {
        player.actor.velocity = Vec3::splat(rng.gen_range(1.0e6..1.0e9));
    }
    if rng.gen_bool(0.05) {
        player.valid = false;
    }
    player
}

fn random_local(rng: &mut ChaCha8Rng) -> Player {
    const WEAPONS: [&str; 8] = [
        "weapon_disc.dts",
        "weapon_chaingun.dts",
        "weapon_plasma.dts",
        "weapon_energy.dts",
        "weapon_sniper.dts",
        "weapon_shocklance.dts",
        "weapon_grenade_launcher.dts",
        "weapon_repair.dts",
    ];
    let weapon = WEAPONS[rng.gen_range(0..WEAPONS.len())];
    Player::new(EntityHandle(1), 0, random_vec(rng, 20.0))
        .with_forward(random_vec(rng, 1.0))
        .with_velocity(random_vec(rng, 30.0))
        .with_eye_height(1.8)
        .with_weapon_resource(weapon)
}

/// Прогоняет арену, возвращает последовательность захваченных целей
fn run_arena(seed: u64) -> Vec<Option<EntityHandle>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut config = TargetingConfig::default();
    config.aim.acceleration.enabled = true;
    config.aim.auto_relock = true;
    config.aim.triggerbot = true;
    let engine = TargetingEngine::new(config).unwrap();
    engine.set_muzzle_offset(Vec3::new(0.3, 0.5, 1.5));

    let start = Instant::now();
    let mut locks = Vec::new();

    for tick in 0..TICKS {
        let local = random_local(&mut rng);
        let eye = local.eye_position;
        let forward = local.forward();
        engine.update_camera(CameraProjection::first_person(
            eye,
            forward,
            FRAC_PI_3,
            Viewport::new(1280.0, 720.0),
        ));

        let others: Vec<Player> = (0..rng.gen_range(0..12)).map(|i| random_player(&mut rng, 10 + i)).collect();
        engine.submit_snapshot(local.clone(), others.clone());

        let blocked = rng.gen_bool(0.2);
        let oracle = move |_: Vec3, _: Vec3, _: RayMask| {
            if blocked {
                RayHit::Hit(ObjectCategory::Static)
            } else {
                RayHit::Hit(ObjectCategory::Player)
            }
        };
        let report = engine.producer_tick(start + Duration::from_millis(17) * tick, &oracle, ControlState::default());

        let frame = engine.latest_frame();
        assert!(frame.is_finite(), "seed {seed} tick {tick}: {frame:?}");

        // Held re-resolves by identity only, so just fresh picks are checked
        let lock = engine.lock();
        if matches!(report.lock_event, Some(LockEvent::Acquired | LockEvent::Switched)) {
            let target = lock.target.as_ref().expect("fresh pick has a target");
            assert!(!local.is_same_team(target), "seed {seed} tick {tick}: locked onto a teammate");
        }
        locks.push(lock.identity());
    }

    locks
}

#[test]
fn test_random_arenas_stay_finite() {
    for seed in [1, 7, 42, 1337, 9001] {
        run_arena(seed);
    }
}

#[test]
fn test_same_seed_same_locks() {
    assert_eq!(run_arena(42), run_arena(42));
}
