//! rigcheck command-line checker.
//!
//! Provides three modes of operation:
//! - `check`: Validate a URDF once, optionally after posing joints and
//!   rescaling links, and print the report
//! - `watch`: Keep validating a URDF on the configured cadence for a while
//! - `info`: Print workspace crate versions and the default configuration

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rigcheck_core::config::ValidatorConfig;
use rigcheck_core::time::SystemClock;
use rigcheck_urdf::UrdfSource;
use rigcheck_validate::{ReportBuilder, ValidationEngine};

type AppResult<T> = Result<T, Box<dyn Error>>;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Geometric validation of robot models.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a URDF once and print the report.
    Check {
        /// URDF file to validate.
        urdf: PathBuf,

        /// TOML validator configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pose a joint before checking, in degrees (e.g. `elbow=45`).
        #[arg(short, long = "joint", value_parser = parse_joint_override)]
        joints: Vec<JointOverride>,

        /// Rescale a link before checking (`hand=2` or `hand=1,2,1`).
        #[arg(short, long = "scale", value_parser = parse_scale_override)]
        scales: Vec<ScaleOverride>,

        /// Also sweep every movable joint through its range.
        #[arg(long)]
        sweep: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Exit with a failure status when any error-severity defect is found.
        #[arg(long)]
        strict: bool,
    },

    /// Validate a URDF continuously and print every pass.
    Watch {
        /// URDF file to validate. It may appear after the watch starts.
        urdf: PathBuf,

        /// TOML validator configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// How long to keep watching, in seconds.
        #[arg(short, long, default_value_t = 10.0)]
        duration: f64,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct JointOverride {
    name: String,
    angle: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct ScaleOverride {
    name: String,
    scale: [f32; 3],
}

fn split_assignment(arg: &str) -> Result<(&str, &str), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{arg}'"));
    }
    Ok((name, value.trim()))
}

fn parse_number(value: &str) -> Result<f32, String> {
    let v: f32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{value}' is not finite"))
    }
}

fn parse_joint_override(arg: &str) -> Result<JointOverride, String> {
    let (name, value) = split_assignment(arg)?;
    Ok(JointOverride {
        name: name.to_string(),
        angle: parse_number(value)?,
    })
}

fn parse_scale_override(arg: &str) -> Result<ScaleOverride, String> {
    let (name, value) = split_assignment(arg)?;
    let parts = value
        .split(',')
        .map(|p| parse_number(p.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    let scale = match parts.as_slice() {
        [s] => [*s; 3],
        [x, y, z] => [*x, *y, *z],
        _ => return Err(format!("expected one or three scale factors, got '{value}'")),
    };
    Ok(ScaleOverride {
        name: name.to_string(),
        scale,
    })
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> AppResult<ValidatorConfig> {
    let config = match path {
        Some(path) => ValidatorConfig::from_file(path)?,
        None => ValidatorConfig::default(),
    };
    Ok(config)
}

fn run_check(
    urdf: &Path,
    config: Option<&Path>,
    joints: &[JointOverride],
    scales: &[ScaleOverride],
    sweep: bool,
    json: bool,
) -> AppResult<usize> {
    let mut config = load_config(config)?;
    config.continuous = false;

    let mut engine = ValidationEngine::new(UrdfSource::from_path(urdf), config)?;
    engine.discover_now(&mut SystemClock::new())?;

    for JointOverride { name, angle } in joints {
        let applied = engine.set_joint_angle(name, *angle)?;
        info!(joint = %name, requested = *angle, applied, "joint posed");
    }
    for ScaleOverride { name, scale } in scales {
        let [x, y, z] = *scale;
        engine.set_link_scale(name, x, y, z)?;
        info!(link = %name, x, y, z, "link rescaled");
    }

    engine.run_pass()?;
    let mut builder = ReportBuilder::from_engine(&engine)?;
    if sweep {
        builder = builder.extend_defects(engine.sweep_all_joints()?);
    }
    let report = builder.build();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(report.error_count)
}

fn run_watch(urdf: &Path, config: Option<&Path>, duration: f64) -> AppResult<()> {
    let mut config = load_config(config)?;
    config.continuous = true;
    let frame = config.discovery.poll_interval().min(config.validation_interval());
    let duration = Duration::try_from_secs_f64(duration.max(0.0))?;

    let mut engine = ValidationEngine::new(UrdfSource::from_path(urdf), config)?;
    engine.on_pass(|outcome| {
        println!(
            "pass {} at {:.2}s: errors={}, warnings={}, infos={}",
            outcome.index,
            outcome.timestamp.secs_f64(),
            outcome.error_count(),
            outcome.warning_count(),
            outcome.info_count()
        );
        for defect in &*outcome.defects {
            println!("  {defect}");
        }
    });

    let started = Instant::now();
    let mut last = started;
    while started.elapsed() < duration {
        std::thread::sleep(frame);
        let now = Instant::now();
        engine.tick(now - last);
        last = now;
        if let Some(reason) = engine.failure() {
            return Err(reason.into());
        }
    }
    println!(
        "watched for {:.1}s: state={}, passes={}",
        started.elapsed().as_secs_f64(),
        engine.state(),
        engine.pass_count()
    );
    Ok(())
}

fn run_info() {
    println!("rigcheck v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  rigcheck-core     {}", env!("CARGO_PKG_VERSION"));
    println!("  rigcheck-spatial  {}", env!("CARGO_PKG_VERSION"));
    println!("  rigcheck-model    {}", env!("CARGO_PKG_VERSION"));
    println!("  rigcheck-urdf     {}", env!("CARGO_PKG_VERSION"));
    println!("  rigcheck-validate {}", env!("CARGO_PKG_VERSION"));
    println!("  rigcheck-bevy     {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("default configuration:");
    println!("{:#?}", ValidatorConfig::default());
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            urdf,
            config,
            joints,
            scales,
            sweep,
            json,
            strict,
        } => run_check(&urdf, config.as_deref(), &joints, &scales, sweep, json).map(|errors| {
            if strict && errors > 0 {
                eprintln!("{errors} error(s) found");
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }),
        Commands::Watch {
            urdf,
            config,
            duration,
        } => run_watch(&urdf, config.as_deref(), duration).map(|()| ExitCode::SUCCESS),
        Commands::Info => {
            run_info();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rigcheck: {e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
