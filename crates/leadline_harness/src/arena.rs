//! Synthetic arena: bots wander on a flat map, the local player turns in
//! place and cycles weapons. Seeded, so two runs with the same seed feed the
//! engine the same snapshots.

use bevy::math::{Vec2, Vec3};
use bevy::prelude::*;
use leadline_engine::{
    CameraProjection, EntityHandle, Player, SharedTargetingEngine, SubmitSnapshot, Viewport,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::oracle::{Wall, WallOracle};

pub const ARENA_HALF_SIZE: f32 = 250.0;
const BOT_COUNT: usize = 12;
const EYE_HEIGHT: f32 = 1.8;
/// Ticks between weapon switches of the local player.
const WEAPON_SWITCH_TICKS: u64 = 240;
const LOADOUT: [&str; 5] = [
    "weapon_disc.dts",
    "weapon_chaingun.dts",
    "weapon_plasma.dts",
    "weapon_energy.dts",
    "weapon_sniper.dts",
];

#[derive(Debug, Clone)]
struct Bot {
    identity: EntityHandle,
    team_id: i32,
    name: String,
    position: Vec3,
    velocity: Vec3,
    alive: bool,
}

#[derive(Resource)]
pub struct Arena {
    rng: ChaCha8Rng,
    bots: Vec<Bot>,
    heading: f32,
    pub tick: u64,
    pub seed: u64,
}

impl Arena {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let bots = (0..BOT_COUNT)
            .map(|i| Bot {
                identity: EntityHandle(100 + i as u64),
                team_id: (i % 2) as i32,
                name: format!("bot_{:02}", i),
                position: Vec3::new(
                    rng.gen_range(-ARENA_HALF_SIZE..ARENA_HALF_SIZE),
                    rng.gen_range(-ARENA_HALF_SIZE..ARENA_HALF_SIZE),
                    0.0,
                ),
                velocity: Vec3::ZERO,
                alive: true,
            })
            .collect();

        Self {
            rng,
            bots,
            heading: 0.0,
            tick: 0,
            seed,
        }
    }

    /// Fixed wall layout (a cross of cover in the middle plus four pillars).
    pub fn walls() -> WallOracle {
        let wall = |cx: f32, cy: f32, hx: f32, hy: f32| Wall {
            min: Vec2::new(cx - hx, cy - hy),
            max: Vec2::new(cx + hx, cy + hy),
            height: 6.0,
        };
        WallOracle {
            walls: vec![
                wall(0.0, 60.0, 40.0, 2.0),
                wall(0.0, -60.0, 40.0, 2.0),
                wall(60.0, 0.0, 2.0, 40.0),
                wall(-60.0, 0.0, 2.0, 40.0),
                wall(150.0, 150.0, 8.0, 8.0),
                wall(-150.0, 150.0, 8.0, 8.0),
                wall(150.0, -150.0, 8.0, 8.0),
                wall(-150.0, -150.0, 8.0, 8.0),
            ],
        }
    }

    pub fn local_forward(&self) -> Vec3 {
        Vec3::new(self.heading.sin(), self.heading.cos(), 0.0)
    }

    fn local_player(&self) -> Player {
        let weapon = LOADOUT[(self.tick / WEAPON_SWITCH_TICKS) as usize % LOADOUT.len()];
        Player::new(EntityHandle(1), 0, Vec3::ZERO)
            .with_forward(self.local_forward())
            .with_eye_height(EYE_HEIGHT)
            .with_weapon_resource(weapon)
            .with_name("local")
    }

    /// One game tick of wandering: random steering, bounce off the edges,
    /// occasional death and respawn.
    pub fn step(&mut self, dt: f32) {
        self.tick += 1;
        self.heading = (self.heading + 0.4 * dt) % std::f32::consts::TAU;

        for bot in &mut self.bots {
            if !bot.alive {
                if self.rng.gen_bool(0.02) {
                    bot.alive = true;
                    bot.position = Vec3::new(
                        self.rng.gen_range(-ARENA_HALF_SIZE..ARENA_HALF_SIZE),
                        self.rng.gen_range(-ARENA_HALF_SIZE..ARENA_HALF_SIZE),
                        0.0,
                    );
                }
                continue;
            }
            if self.rng.gen_bool(0.002) {
                bot.alive = false;
                continue;
            }

            let steer = Vec3::new(self.rng.gen_range(-1.0..1.0), self.rng.gen_range(-1.0..1.0), 0.0) * 60.0;
            bot.velocity = (bot.velocity + steer * dt).clamp_length_max(30.0);
            bot.position += bot.velocity * dt;

            for axis in 0..2 {
                if bot.position[axis].abs() > ARENA_HALF_SIZE {
                    bot.position[axis] = bot.position[axis].clamp(-ARENA_HALF_SIZE, ARENA_HALF_SIZE);
                    bot.velocity[axis] = -bot.velocity[axis];
                }
            }
        }
    }

    pub fn snapshot(&self) -> SubmitSnapshot {
        let others = self
            .bots
            .iter()
            .map(|bot| {
                let mut player = Player::new(bot.identity, bot.team_id, bot.position)
                    .with_velocity(bot.velocity)
                    .with_eye_height(EYE_HEIGHT)
                    .with_name(bot.name.clone());
                player.valid = bot.alive;
                player
            })
            .collect();

        SubmitSnapshot {
            local: self.local_player(),
            others,
        }
    }
}

/// Advance the arena one fixed tick, push the camera and the snapshot.
pub fn advance_arena(
    mut arena: ResMut<Arena>,
    time: Res<Time<Fixed>>,
    engine: Res<SharedTargetingEngine>,
    mut snapshots: EventWriter<SubmitSnapshot>,
) {
    arena.step(time.delta_secs());

    let snapshot = arena.snapshot();
    engine.0.update_camera(CameraProjection::first_person(
        snapshot.local.eye_position,
        snapshot.local.forward(),
        std::f32::consts::FRAC_PI_3,
        Viewport::new(1920.0, 1080.0),
    ));
    snapshots.write(snapshot);
}
