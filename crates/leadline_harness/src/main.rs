//! Headless хост для Leadline
//!
//! Гоняет синтетическую арену через TargetingPlugin (game tick = FixedUpdate)
//! и отдельный render-поток, который читает кадры из общего engine.
//!
//! Usage: leadline_harness [seed] [ticks] [config.json]

mod arena;
mod oracle;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bevy::prelude::*;
use leadline_engine::logger::{self, set_log_level, set_logger, LogLevel, LogPrinter};
use leadline_engine::{
    create_headless_app, AimStatus, FrameOutput, SharedTargetingEngine, TargetingConfig, TargetingEngine,
    TargetingOracle, TargetingPlugin, TargetingSystems,
};

use crate::arena::{advance_arena, Arena};

/// Printer с префиксом потока, чтобы отличать game tick от render
struct HarnessLogger;

impl LogPrinter for HarnessLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let thread = thread::current();
        let name = thread.name().unwrap_or("main");
        println!("[harness:{}] [{}] {}", name, level.as_str(), message);
    }
}

struct Args {
    seed: u64,
    ticks: u64,
    config: TargetingConfig,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);

    let seed = match args.next() {
        Some(raw) => raw.parse().map_err(|e| format!("bad seed {:?}: {}", raw, e))?,
        None => 42,
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse().map_err(|e| format!("bad tick count {:?}: {}", raw, e))?,
        None => 600,
    };
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path, e))?;
            let config: TargetingConfig =
                serde_json::from_str(&text).map_err(|e| format!("cannot parse {}: {}", path, e))?;
            config.validate().map_err(|e| format!("invalid config {}: {}", path, e))?;
            config
        }
        None => TargetingConfig::default(),
    };

    Ok(Args { seed, ticks, config })
}

fn describe(frame: &FrameOutput) -> String {
    let aim = match (&frame.aim.status, frame.aim.primary()) {
        (AimStatus::Solved, Some(result)) => format!(
            "target {:?} at {:.1}u → ({:.0}, {:.0})",
            result.target, result.distance, result.screen_projection.point.x, result.screen_projection.point.y
        ),
        (status, _) => format!("{:?}", status),
    };
    format!(
        "seq {} | aim: {} | overlay {} | radar {}{}",
        frame.sequence,
        aim,
        frame.overlay.len(),
        frame.radar.len(),
        if frame.fire_request { " | FIRE" } else { "" }
    )
}

/// Render-поток: ~120 Hz, неблокирующее чтение
fn spawn_render_thread(
    engine: Arc<TargetingEngine>,
    stop: Arc<AtomicBool>,
) -> std::io::Result<thread::JoinHandle<(u64, u64)>> {
    thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let mut frames = 0u64;
            let mut contended = 0u64;
            let mut last_logged = 0u64;

            while !stop.load(Ordering::Acquire) {
                match engine.try_latest_frame() {
                    Some(frame) => {
                        frames += 1;
                        if frame.sequence >= last_logged + 300 {
                            last_logged = frame.sequence;
                            logger::log_info(&describe(&frame));
                        }
                    }
                    None => contended += 1,
                }
                thread::sleep(Duration::from_millis(8));
            }
            (frames, contended)
        })
}

fn main() {
    set_logger(Box::new(HarnessLogger));
    set_log_level(LogLevel::Info);

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            logger::log_error(&message);
            std::process::exit(2);
        }
    };

    match serde_json::to_string(&args.config) {
        Ok(json) => logger::log(&format!("config: {}", json)),
        Err(e) => logger::log_warning(&format!("config not serializable: {}", e)),
    }
    logger::log_info(&format!(
        "Starting Leadline harness (seed: {}, ticks: {})",
        args.seed, args.ticks
    ));

    let engine = match TargetingEngine::new(args.config.clone()) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            logger::log_error(&format!("invalid config: {}", e));
            std::process::exit(2);
        }
    };

    let mut app = create_headless_app();
    app.insert_resource(SharedTargetingEngine(Arc::clone(&engine)))
        .insert_resource(TargetingOracle(Box::new(Arena::walls())))
        .insert_resource(Arena::new(args.seed))
        .add_plugins(TargetingPlugin { config: args.config })
        .add_systems(FixedUpdate, advance_arena.before(TargetingSystems));

    let stop = Arc::new(AtomicBool::new(false));
    let render = match spawn_render_thread(Arc::clone(&engine), Arc::clone(&stop)) {
        Ok(handle) => handle,
        Err(e) => {
            logger::log_error(&format!("cannot spawn render thread: {}", e));
            std::process::exit(1);
        }
    };

    // Game loop: app.update() ~60 раз в секунду, FixedUpdate догоняет реальное время
    while app.world().resource::<Arena>().tick < args.ticks {
        app.update();
        thread::sleep(Duration::from_millis(16));
    }

    stop.store(true, Ordering::Release);
    let (frames, contended) = render.join().unwrap_or_else(|_| {
        logger::log_error("render thread panicked");
        (0, 0)
    });

    let last = engine.latest_frame();
    logger::log_info(&describe(&last));
    logger::log_info(&format!(
        "Harness complete: {} ticks, {} render frames ({} skipped under contention)",
        app.world().resource::<Arena>().tick,
        frames,
        contended
    ));
}
