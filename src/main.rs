//! Headless driver: builds the demo grove, runs a scripted session with
//! synthesized audio features, and prints what happened. Useful for
//! eyeballing the physics without a renderer and for comparing the two
//! index implementations on the same world.

use canopy_physics::{AudioFeatures, ContactEvent};
use canopy_world::{IndexKind, RawInput, Session, SessionConfig, World, WorldSpec};

const SEED: u32 = 7;
const TICKS: u64 = 1800;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let world = match World::build(WorldSpec::demo_grove(SEED)) {
        Ok(world) => world,
        Err(err) => {
            log::error!("world build failed: {err}");
            std::process::exit(1);
        }
    };

    for (label, stats) in world.index_stats() {
        log::info!(
            "index[{label}]: {} objects over {} cells ({:.1} avg)",
            stats.objects,
            stats.cells,
            stats.avg_per_cell
        );
    }

    let mut session = Session::new(world, SessionConfig::default());

    for tick in 0..TICKS {
        let input = scripted_input(tick);
        let audio = synthesized_audio(tick);
        let report = session.tick(&input, audio);

        for event in session.drain_events() {
            describe(session.elapsed_secs(), &event);
        }

        if tick % 300 == 0 {
            let snap = session.snapshot();
            log::info!(
                "t={:6.2}s pos=({:7.2}, {:6.2}, {:7.2}) grounded={} gravity_scale={:.2} candidates={}",
                session.elapsed_secs(),
                snap.position.x,
                snap.position.y,
                snap.position.z,
                snap.grounded,
                snap.gravity_scale,
                report.resolve.candidates,
            );
        }
    }

    compare_indices();
}

/// Wander the grove: run forward while the yaw slowly sweeps, hop every
/// two seconds so trampolines and vines get a chance to trigger.
fn scripted_input(tick: u64) -> RawInput {
    RawInput {
        forward: true,
        right: (tick / 240) % 2 == 0,
        jump_held: tick % 120 < 6,
        yaw: tick as f32 * 0.005,
        ..Default::default()
    }
}

/// A fake track: tempo ramps from 100 to 170 BPM while the groove swells
/// and fades on a long cycle.
fn synthesized_audio(tick: u64) -> AudioFeatures {
    let t = tick as f32 / 60.0;
    let bpm = 100.0 + 70.0 * (t / 30.0).min(1.0);
    let beat_phase = (t * bpm / 60.0).fract();
    AudioFeatures {
        groove: 0.5 + 0.5 * (t * 0.2).sin(),
        bpm,
        beat_phase,
        kick: if beat_phase < 0.1 { 1.0 } else { 0.0 },
    }
}

fn describe(time: f32, event: &ContactEvent) {
    match event {
        ContactEvent::Bounce { velocity, .. } => {
            log::info!("t={time:6.2}s boing! launched at {velocity:.1} u/s");
        }
        ContactEvent::PushBack { force, .. } => {
            log::debug!("t={time:6.2}s flooded gate push {force:?}");
        }
        ContactEvent::CloudLanding { surface, .. } => {
            log::info!("t={time:6.2}s landed on a cloud at y={surface:.1}");
        }
        ContactEvent::VineAttached { vine, .. } => {
            log::info!("t={time:6.2}s grabbed vine {vine:?}");
        }
        ContactEvent::VineDetached { velocity, .. } => {
            log::info!("t={time:6.2}s released vine at {:.1} u/s", velocity.length());
        }
    }
}

/// Probe both index implementations along a sweep across the world and
/// report how many candidates each hands the resolver per query.
fn compare_indices() {
    let grid = World::build(WorldSpec::demo_grove(SEED)).expect("demo spec is valid");
    let mut linear_spec = WorldSpec::demo_grove(SEED);
    linear_spec.index_kind = IndexKind::Linear;
    let linear = World::build(linear_spec).expect("demo spec is valid");

    let probes = 200;
    let (mut grid_total, mut linear_total) = (0usize, 0usize);
    for i in 0..probes {
        let t = i as f32 / probes as f32;
        let x = -100.0 + 200.0 * t;
        let z = 80.0 * (t * std::f32::consts::TAU).sin();
        grid_total += grid.probe_candidates(x, z);
        linear_total += linear.probe_candidates(x, z);
    }

    log::info!(
        "index sweep over {} probes: grid avg {:.1} candidates/query, linear avg {:.1}",
        probes,
        grid_total as f32 / probes as f32,
        linear_total as f32 / probes as f32,
    );
}
