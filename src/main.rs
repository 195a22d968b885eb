//! Runs a compiled layout program against an in-memory output tree.
//!
//! Usage: `arbor run <program.json> [--event EVENT@XID[=VALUE]]...`

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
    thread,
    time::{Duration, Instant},
};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use arbor::{
    Program, Runtime, RuntimeConfig, Surface, VirtualTree,
    runtime::{SchedulerState, config::DEFAULT_STORM_QUOTA},
    surface::XID_ATTRIBUTE,
};

#[derive(Parser, Debug)]
#[command(name = "arbor", version)]
#[command(about = "Execute compiled layout programs and print the rendered tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a program, deliver scripted events and print the settled tree
    Run(RunArgs),
    /// Load and validate a program without running it
    Check {
        /// Path to the compiled program (JSON)
        program: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the compiled program (JSON)
    program: PathBuf,

    /// Disable diagnostics and the re-render storm guard
    #[arg(long = "unsafe")]
    unsafe_mode: bool,

    /// Re-renders renderable code may request per second
    #[arg(long, default_value_t = DEFAULT_STORM_QUOTA)]
    quota: u32,

    /// Delay before a requested re-render runs, in milliseconds
    #[arg(long = "settle-ms", default_value = "100")]
    settle_ms: u64,

    /// Stop waiting for the tree to settle after this many deferred renders
    #[arg(long, default_value = "50")]
    max_cycles: usize,

    /// Event to fire once the first render settled, e.g. `click@elem-4` or
    /// `input@elem-2=hello`. Repeatable; fired in order.
    #[arg(long = "event", value_name = "EVENT@XID[=VALUE]")]
    events: Vec<EventSpec>,
}

/// Scripted event: `name` fired on the node tagged `xid`, optionally after
/// setting its input value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EventSpec {
    name: String,
    xid: String,
    value: Option<String>,
}

impl FromStr for EventSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, target) = s
            .split_once('@')
            .ok_or_else(|| format!("expected EVENT@XID[=VALUE], got `{}`", s))?;
        let (xid, value) = match target.split_once('=') {
            Some((xid, value)) => (xid, Some(value.to_string())),
            None => (target, None),
        };
        if name.is_empty() || xid.is_empty() {
            return Err(format!("expected EVENT@XID[=VALUE], got `{}`", s));
        }
        Ok(EventSpec {
            name: name.to_string(),
            xid: xid.to_string(),
            value,
        })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arbor=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Check { program } => check(program),
    }
}

fn load(path: &Path) -> Option<Program> {
    let program = match Program::load(path) {
        Ok(program) => program,
        Err(e) => {
            error!("{}", e);
            return None;
        }
    };
    match program.validate() {
        Ok(warnings) => {
            for warning in warnings {
                warn!("{}", warning);
            }
            Some(program)
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

fn check(path: PathBuf) -> ExitCode {
    match load(&path) {
        Some(program) => {
            info!(sections = program.sections.len(), "{} is valid", path.display());
            ExitCode::SUCCESS
        }
        None => ExitCode::from(2),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let Some(program) = load(&args.program) else {
        return ExitCode::from(2);
    };

    let config = RuntimeConfig::default()
        .with_unsafe_mode(args.unsafe_mode)
        .with_storm_quota(args.quota)
        .with_settle_delay(Duration::from_millis(args.settle_ms));
    let mut runtime = Runtime::new(VirtualTree::new(), config);
    runtime.load_program(&program);

    let mount = runtime.mount();
    runtime.bootstrap(mount);
    settle(&mut runtime, args.max_cycles);

    for event in &args.events {
        let Some(target) = runtime
            .surface()
            .find_by_attribute(XID_ATTRIBUTE, &event.xid)
        else {
            warn!(xid = %event.xid, "no node for scripted event");
            continue;
        };
        if let Some(value) = &event.value {
            if let Err(e) = runtime.surface_mut().set_input_value(target, value) {
                warn!(xid = %event.xid, "cannot set input value: {}", e);
            }
        }
        let handled = runtime.dispatch_event(target, &event.name);
        info!(event = %event.name, xid = %event.xid, handled, "event delivered");
        settle(&mut runtime, args.max_cycles);
    }

    let tree = runtime.surface();
    println!("{}", tree.to_markup(tree.root()));

    match runtime.state() {
        SchedulerState::Error => ExitCode::FAILURE,
        SchedulerState::Idle | SchedulerState::Rendering => ExitCode::SUCCESS,
    }
}

/// Sleeps until each deferred render is due and runs it, until none is
/// armed or `max_cycles` renders ran.
fn settle(runtime: &mut Runtime<VirtualTree>, max_cycles: usize) -> usize {
    let mut cycles = 0;
    while let Some(deadline) = runtime.next_deadline() {
        if cycles >= max_cycles {
            warn!(max_cycles, "output did not settle");
            break;
        }
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        if runtime.poll() {
            cycles += 1;
        }
    }
    cycles
}
