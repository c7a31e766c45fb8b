//! Benchmarks for per-frame engine updates

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cosmos_motion_core::config::{MarqueeConfig, MotionConfig, ProfileTiltConfig};
use cosmos_motion_core::frame::{FrameDriver, FrameTask, FrameTime};
use cosmos_motion_core::particles::{ParticleSystem, Starfield};
use cosmos_motion_core::pointer::PointerSnapshot;
use cosmos_motion_core::render::{RecordingSurface, SurfaceSize};
use cosmos_motion_core::rng::SeededRandom;
use cosmos_motion_core::{LoopMarquee, TiltEngine};

const DT: f64 = 1.0 / 60.0;

fn bench_starfield_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("starfield_frame");

    for count in [80usize, 200, 800].iter() {
        let mut config = MotionConfig::default();
        config.starfield.count = *count;

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            let system = ParticleSystem::new(&config, SeededRandom::new(42));
            let mut field = Starfield::new(system, RecordingSurface::new(1920.0, 1080.0));
            let input = PointerSnapshot::default();
            let mut time = FrameTime::fixed(0, 0.0, 0.0);
            b.iter(|| {
                time = time.next(DT);
                black_box(field.update(black_box(&time), &input).ok())
            });
        });
    }

    group.finish();
}

fn bench_particle_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_advance");

    // saturate transient collections
    let mut system = ParticleSystem::new(&MotionConfig::default(), SeededRandom::new(7));
    system.resize(1920.0, 1080.0).ok();

    group.bench_function("full_capacity", |b| {
        b.iter(|| {
            while system.spawn_shooting_star() {}
            while system.spawn_rocket() {}
            system.advance(black_box(1.0));
            black_box(system.transient_count())
        });
    });

    group.finish();
}

fn bench_driver_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_dispatch");

    group.bench_function("tilt_and_marquee", |b| {
        let mut driver = FrameDriver::new();
        let marquee = Rc::new(RefCell::new(LoopMarquee::new(MarqueeConfig::default())));
        marquee.borrow_mut().measure(400.0, 1920.0);
        driver.register(marquee);
        let tilt = Rc::new(RefCell::new(TiltEngine::new(
            ProfileTiltConfig::default(),
            SurfaceSize::new(320.0, 440.0),
        )));
        driver.register(tilt);

        let mut ms = 0.0;
        b.iter(|| {
            ms += 16.0;
            black_box(driver.frame(black_box(ms)))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_starfield_frame,
    bench_particle_advance,
    bench_driver_dispatch,
);

criterion_main!(benches);
