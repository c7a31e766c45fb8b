//! Cosmos Motion Headless Runner
//!
//! Drives the animation engine at a fixed frame rate without a browser, for
//! tuning settings and smoke-testing changes.
//!
//! # Usage
//!
//! ```bash
//! # Ten simulated seconds of the starfield at 60 fps
//! cosmos-motion simulate --seconds 10
//!
//! # Same, with custom settings and a JSON summary
//! cosmos-motion --config motion.json simulate --snapshot run.json
//!
//! # Marquee copy planning and hover slow-down
//! cosmos-motion marquee --sequence-width 400 --container-width 900
//!
//! # Profile card glide and settle timing
//! cosmos-motion tilt --width 320 --height 440
//!
//! # Hover circle geometry for a pill button
//! cosmos-motion pill --width 120 --height 40
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cosmos_motion_core::config::{MotionConfig, MotionPolicy};
use cosmos_motion_core::frame::{FrameDriver, FrameTask, FrameTime};
use cosmos_motion_core::geometry::PillCircle;
use cosmos_motion_core::marquee::LoopMarquee;
use cosmos_motion_core::particles::{ParticleSystem, Starfield};
use cosmos_motion_core::pointer::{PointerSnapshot, Viewport};
use cosmos_motion_core::render::{RecordingSurface, SurfaceSize};
use cosmos_motion_core::rng::SeededRandom;
use cosmos_motion_core::tilt::TiltEngine;

/// Cosmos Motion headless runner
#[derive(Parser, Debug)]
#[command(name = "cosmos-motion")]
#[command(author, version, about = "Headless runner for the cosmos-motion animation engine", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON settings file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the starfield, shooting stars and rockets
    Simulate {
        /// Simulated duration in seconds
        #[arg(short, long, default_value = "10")]
        seconds: f64,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Viewport width
        #[arg(long, default_value = "1280")]
        width: f64,

        /// Viewport height
        #[arg(long, default_value = "720")]
        height: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Behave as if the user prefers reduced motion
        #[arg(long)]
        reduced_motion: bool,

        /// Write a JSON summary to this file
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Plan marquee copies and run its velocity through a hover
    Marquee {
        /// Width of one content sequence (px)
        #[arg(long, default_value = "400")]
        sequence_width: f64,

        /// Container width (px)
        #[arg(long, default_value = "900")]
        container_width: f64,

        /// Simulated duration in seconds
        #[arg(short, long, default_value = "4")]
        seconds: f64,

        /// Hover the track from this time (seconds)
        #[arg(long)]
        hover_at: Option<f64>,
    },

    /// Time the profile card's entry glide and leave settle
    Tilt {
        /// Card width (px)
        #[arg(long, default_value = "320")]
        width: f64,

        /// Card height (px)
        #[arg(long, default_value = "440")]
        height: f64,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: f64,
    },

    /// Hover circle geometry for a pill of the given size
    Pill {
        /// Pill width (px)
        #[arg(long)]
        width: f64,

        /// Pill height (px)
        #[arg(long)]
        height: f64,
    },
}

/// Result of a `simulate` run.
#[derive(Debug, Serialize)]
struct SimulationSummary {
    frames: u64,
    seconds: f64,
    policy: MotionPolicy,
    stars: usize,
    peak_shooting_stars: usize,
    peak_rockets: usize,
    peak_transients: usize,
    last_frame_circles: usize,
    last_frame_lines: usize,
    failed_tasks: usize,
    config: MotionConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Cosmos Motion v{}", cosmos_motion_core::VERSION);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            seconds,
            fps,
            width,
            height,
            seed,
            reduced_motion,
            snapshot,
        } => {
            let policy = MotionPolicy::from_viewport(width, reduced_motion);
            let summary = run_simulation(config, policy, seconds, fps, Viewport::new(width, height), seed)?;
            print_summary(&summary);
            if let Some(path) = snapshot {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?;
                info!("Snapshot written to {}", path.display());
            }
        }
        Commands::Marquee {
            sequence_width,
            container_width,
            seconds,
            hover_at,
        } => run_marquee(&config, sequence_width, container_width, seconds, hover_at)?,
        Commands::Tilt { width, height, fps } => run_tilt(&config, width, height, fps)?,
        Commands::Pill { width, height } => match PillCircle::for_pill(width, height) {
            Some(circle) => {
                println!("radius:        {:.3}px", circle.radius);
                println!("diameter:      {}px", circle.diameter);
                println!("bottom offset: -{}px", circle.bottom_offset);
            }
            None => anyhow::bail!("a pill needs a positive height, got {height}"),
        },
    }

    Ok(())
}

/// Read and validate the settings file, or use defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<MotionConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config = MotionConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?;
            info!("Loaded settings from {}", path.display());
            config
        }
        None => MotionConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn frame_interval_ms(fps: f64) -> anyhow::Result<f64> {
    if !(fps > 0.0 && fps.is_finite()) {
        anyhow::bail!("fps must be positive, got {fps}");
    }
    Ok(1000.0 / fps)
}

/// Run the particle system with a pointer wandering over the viewport and
/// the page slowly scrolling.
fn run_simulation(
    config: MotionConfig,
    policy: MotionPolicy,
    seconds: f64,
    fps: f64,
    viewport: Viewport,
    seed: u64,
) -> anyhow::Result<SimulationSummary> {
    let interval_ms = frame_interval_ms(fps)?;
    let frames = (seconds.max(0.0) * fps).round() as u64;

    let mut system = ParticleSystem::new(&config, SeededRandom::new(seed));
    system.set_policy(policy);
    let surface = RecordingSurface::new(viewport.width, viewport.height);
    let starfield = Rc::new(RefCell::new(Starfield::new(system, surface)));

    let mut driver = FrameDriver::with_viewport(viewport);
    driver.register(Rc::clone(&starfield));

    info!(
        frames,
        fps,
        width = viewport.width,
        height = viewport.height,
        "Starting simulation"
    );

    let (cx, cy) = viewport.center();
    let mut peak_shooting_stars = 0;
    let mut peak_rockets = 0;
    let mut peak_transients = 0;
    let mut failed_tasks = 0;

    for frame in 0..frames {
        let t = frame as f64 * interval_ms / 1000.0;
        let pointer = driver.pointer_mut();
        pointer.set_pointer(cx + cx * 0.8 * (t * 0.7).sin(), cy + cy * 0.6 * (t * 1.1).cos());
        pointer.set_scroll(t * 40.0);

        let report = driver.frame(frame as f64 * interval_ms);
        failed_tasks += report.failed;

        let field = starfield.borrow();
        let system = field.system();
        peak_shooting_stars = peak_shooting_stars.max(system.shooting_stars().len());
        peak_rockets = peak_rockets.max(system.rockets().len());
        peak_transients = peak_transients.max(system.transient_count());
    }

    if failed_tasks > 0 {
        warn!(failed_tasks, "Some frame tasks failed");
    }

    let field = starfield.borrow();
    Ok(SimulationSummary {
        frames,
        seconds,
        policy,
        stars: field.system().stars().len(),
        peak_shooting_stars,
        peak_rockets,
        peak_transients,
        last_frame_circles: field.surface().circle_count(),
        last_frame_lines: field.surface().line_count(),
        failed_tasks,
        config,
    })
}

fn print_summary(summary: &SimulationSummary) {
    println!("frames:              {}", summary.frames);
    println!("simulated seconds:   {}", summary.seconds);
    println!("reduced motion:      {}", summary.policy.reduced_motion);
    println!("narrow viewport:     {}", summary.policy.narrow_viewport);
    println!("stars:               {}", summary.stars);
    println!("peak shooting stars: {}", summary.peak_shooting_stars);
    println!("peak rockets:        {}", summary.peak_rockets);
    println!("peak transients:     {}", summary.peak_transients);
    println!("last frame circles:  {}", summary.last_frame_circles);
    println!("last frame lines:    {}", summary.last_frame_lines);
    println!("failed tasks:        {}", summary.failed_tasks);
}

fn run_marquee(
    config: &MotionConfig,
    sequence_width: f64,
    container_width: f64,
    seconds: f64,
    hover_at: Option<f64>,
) -> anyhow::Result<()> {
    let mut marquee = LoopMarquee::new(config.marquee.clone());
    let plan = marquee
        .measure(sequence_width, container_width)
        .context("sequence has no width; nothing to tile")?;
    println!(
        "copies: {} ({} clones), sequence width {}px",
        plan.copies,
        plan.clones(),
        marquee.sequence_width()
    );

    let dt = 1.0 / 60.0;
    let frames = (seconds.max(0.0) / dt).round() as u64;
    for frame in 0..frames {
        let t = frame as f64 * dt;
        if let Some(at) = hover_at {
            if !marquee.is_hovered() && t >= at {
                debug!(t, "hovering marquee");
                marquee.set_hovered(true);
            }
        }
        marquee.advance(dt);
        if frame % 30 == 0 {
            println!(
                "t={:>5.2}s velocity={:>7.2}px/s offset={:>7.2}px",
                t,
                marquee.velocity(),
                marquee.offset()
            );
        }
    }
    Ok(())
}

/// Step a profile card until its task would sleep; returns frames taken.
fn settle(
    engine: &mut TiltEngine,
    time: &mut FrameTime,
    input: &PointerSnapshot,
    dt: f64,
) -> anyhow::Result<u64> {
    const MAX_FRAMES: u64 = 100_000;
    for frame in 1..=MAX_FRAMES {
        *time = time.next(dt);
        if engine.update(time, input)? != cosmos_motion_core::TaskStatus::Continue {
            return Ok(frame);
        }
    }
    anyhow::bail!("tilt did not settle within {MAX_FRAMES} frames")
}

fn run_tilt(config: &MotionConfig, width: f64, height: f64, fps: f64) -> anyhow::Result<()> {
    let dt = frame_interval_ms(fps)? / 1000.0;
    let input = PointerSnapshot::default();
    let mut engine = TiltEngine::new(config.profile_tilt.clone(), SurfaceSize::new(width, height));
    let mut time = FrameTime::fixed(0, 0.0, 0.0);

    let glide = settle(&mut engine, &mut time, &input, dt)?;
    println!(
        "entry glide: {} frames ({:.2}s), phase {:?}",
        glide,
        glide as f64 * dt,
        engine.phase()
    );

    engine.pointer_enter(width * 0.85, height * 0.15);
    for _ in 0..30 {
        time = time.next(dt);
        engine.update(&time, &input)?;
    }
    let (x, y) = engine.position();
    println!("after 30 tracking frames: position ({x:.1}, {y:.1})");
    for (name, value) in engine.output().css_properties() {
        println!("  {name}: {value}");
    }

    engine.pointer_leave();
    let leave = settle(&mut engine, &mut time, &input, dt)?;
    println!(
        "leave settle: {} frames ({:.2}s), phase {:?}",
        leave,
        leave as f64 * dt,
        engine.phase()
    );
    Ok(())
}
