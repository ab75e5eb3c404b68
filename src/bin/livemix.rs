use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "livemix", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile and validate a script.
    Check(CheckArgs),
    /// Run a script against a recording collaborator with synthetic clocks.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Script file.
    script: PathBuf,

    /// Print the compiled program as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Script file.
    script: PathBuf,

    /// Runtime config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated media duration in seconds; every clock reports `end` afterwards.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Clock step between progress reports, in seconds. Reports are normalized by `--duration`.
    #[arg(long, default_value_t = 0.1)]
    step: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn read_program(path: &Path) -> anyhow::Result<livemix::Program> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("read script '{}'", path.display()))?;
    let program =
        livemix::compile(&src).with_context(|| format!("compile '{}'", path.display()))?;
    Ok(program)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let program = read_program(&args.script)?;
    let mut templates = livemix::TemplateRegistry::with_prelude()?;
    templates.extend_from(&program)?;
    livemix::validate(&program, &templates)
        .with_context(|| format!("validate '{}'", args.script.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&program).context("serialize program")?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{}: ok ({} templates, {} instances, {} statements, {} triggers)",
        args.script.display(),
        program.templates.len(),
        program.instances().count(),
        program.statements.len(),
        program.triggers.len()
    );
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    if !(args.step > 0.0 && args.step.is_finite()) {
        anyhow::bail!("--step must be a positive number of seconds");
    }
    if !(args.duration >= 0.0 && args.duration.is_finite()) {
        anyhow::bail!("--duration must be a non-negative number of seconds");
    }

    let config = match &args.config {
        Some(path) => livemix::RuntimeConfig::load(path)?,
        None => livemix::RuntimeConfig::default(),
    };
    let program = read_program(&args.script)?;
    let clocks = referenced_clocks(&program);

    let collaborator = livemix::RecordingCollaborator::new();
    let log = collaborator.log();
    let runtime = livemix::Runtime::build(program, collaborator, config)
        .with_context(|| format!("build '{}'", args.script.display()))?;

    let handles = clocks
        .iter()
        .map(|name| {
            runtime
                .handle_of(name)
                .with_context(|| format!("clock '{name}' has no node"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let tx = runtime.signals();
    let (step, duration) = (args.step, args.duration);

    let producer = thread::spawn(move || {
        let mut t: f64 = 0.0;
        loop {
            let now = t.min(duration);
            let value = if duration > 0.0 { now / duration } else { 1.0 };
            for &h in &handles {
                if tx.progress(h, value).is_err() {
                    return;
                }
            }
            if now >= duration {
                break;
            }
            t += step;
            thread::sleep(Duration::from_millis(1));
        }
        for &h in &handles {
            if tx.callback(h, livemix::script::program::TERMINAL_EVENT).is_err() {
                return;
            }
        }
    });

    let report = runtime.run()?;
    if producer.join().is_err() {
        anyhow::bail!("signal producer panicked");
    }

    for cmd in log.snapshot() {
        println!("{cmd}");
    }
    eprintln!(
        "run ended ({:?}): {} groups dispatched, {} actions applied, {} skipped",
        report.end,
        report.dispatched.len(),
        report.applied,
        report.skipped
    );
    Ok(())
}

/// Every instance a script listens to or times a move on.
fn referenced_clocks(program: &livemix::Program) -> BTreeSet<String> {
    use livemix::{Action, Trigger};

    let mut clocks = BTreeSet::new();
    for binding in &program.triggers {
        match &binding.trigger {
            Trigger::Progress { clock, .. } => {
                clocks.insert(clock.clone());
            }
            Trigger::Callback { instance, .. } => {
                clocks.insert(instance.clone());
            }
            Trigger::Pre => {}
        }
        for action in &binding.group.actions {
            if let Action::WindowMove { spec, .. } = action {
                clocks.insert(spec.clock.clone());
            }
        }
    }
    clocks
}
