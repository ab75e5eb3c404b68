pub mod executor;
pub mod scheduler;
pub mod signal;

use crossbeam_channel::Receiver;

use crate::animation::engine::InterpolationEngine;
use crate::config::RuntimeConfig;
use crate::foundation::core::NodeHandle;
use crate::foundation::error::LiveMixResult;
use crate::graph::collaborator::Collaborator;
use crate::graph::manager::GraphManager;
use crate::graph::template::TemplateRegistry;
use crate::runtime::scheduler::{Dispatch, EndReason, RunState, Scheduler};
use crate::runtime::signal::{Signal, SignalSender};
use crate::script::program::{Program, Statement};
use crate::script::validate::validate;

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunReport {
    pub end: Option<EndReason>,
    pub dispatched: Vec<Dispatch>,
    pub applied: usize,
    pub skipped: usize,
    pub signals: usize,
    pub ticks: usize,
}

/// A built graph plus the loop that drives it.
///
/// [`Runtime::run`] owns the loop; [`Runtime::start`], [`Runtime::handle_signal`] and
/// [`Runtime::tick`] expose the same steps for callers that drive time themselves.
#[derive(Debug)]
pub struct Runtime {
    graph: GraphManager,
    engine: InterpolationEngine,
    scheduler: Scheduler,
    config: RuntimeConfig,
    tx: Option<SignalSender>,
    rx: Receiver<Signal>,
    signals: usize,
    ticks: usize,
}

impl Runtime {
    /// Validate `program`, create every node and apply the initial plugs.
    #[tracing::instrument(
        skip_all,
        fields(
            templates = program.templates.len(),
            statements = program.statements.len(),
            triggers = program.triggers.len()
        )
    )]
    pub fn build(
        program: Program,
        collaborator: impl Collaborator + 'static,
        config: RuntimeConfig,
    ) -> LiveMixResult<Self> {
        config.validate()?;
        let mut templates = if config.load_prelude {
            TemplateRegistry::with_prelude()?
        } else {
            TemplateRegistry::new()
        };
        templates.extend_from(&program)?;
        validate(&program, &templates)?;

        let mut graph = GraphManager::new(Box::new(collaborator), templates, config.rewire);
        for stmt in &program.statements {
            match stmt {
                Statement::New {
                    template,
                    instance,
                    args,
                    ..
                } => {
                    graph.instantiate(template, instance, args)?;
                }
                Statement::Plug { src, dst, .. } => graph.plug(src, dst)?,
                Statement::Unplug { dst, .. } => graph.unplug(dst)?,
            }
        }
        tracing::info!("graph built");

        let (tx, rx) = signal::channel();
        Ok(Self {
            graph,
            engine: InterpolationEngine::new(),
            scheduler: Scheduler::new(program.triggers),
            config,
            tx: Some(tx),
            rx,
            signals: 0,
            ticks: 0,
        })
    }

    /// Compile, validate and build in one step.
    pub fn from_script(
        src: &str,
        collaborator: impl Collaborator + 'static,
        config: RuntimeConfig,
    ) -> LiveMixResult<Self> {
        let program = crate::script::compiler::compile(src)?;
        Self::build(program, collaborator, config)
    }

    /// A new producer handle for the signal channel.
    ///
    /// Handles must be taken before [`Runtime::run`]; the run ends once all of them are dropped.
    pub fn signals(&self) -> SignalSender {
        // `tx` is only taken by `run`, which consumes the runtime.
        self.tx.clone().unwrap_or_else(|| signal::channel().0)
    }

    pub fn handle_of(&self, instance: &str) -> Option<NodeHandle> {
        self.graph.handle_of(instance)
    }

    pub fn graph(&self) -> &GraphManager {
        &self.graph
    }

    pub fn engine(&self) -> &InterpolationEngine {
        &self.engine
    }

    pub fn state(&self) -> RunState {
        self.scheduler.state()
    }

    pub fn dispatched(&self) -> &[Dispatch] {
        self.scheduler.dispatched()
    }

    pub fn start(&mut self) -> LiveMixResult<()> {
        self.scheduler.start(&mut self.graph, &mut self.engine)
    }

    pub fn handle_signal(&mut self, signal: Signal) -> LiveMixResult<()> {
        self.signals += 1;
        self.scheduler
            .handle_signal(&signal, &mut self.graph, &mut self.engine)
    }

    pub fn tick(&mut self) -> usize {
        self.ticks += 1;
        self.scheduler.tick(&mut self.graph, &mut self.engine)
    }

    /// Run until `terminate`, until nothing is pending, or until every producer is gone.
    pub fn run(mut self) -> LiveMixResult<RunReport> {
        self.tx = None;
        self.start()?;

        let rx = self.rx.clone();
        let ticker = crossbeam_channel::tick(self.config.tick_interval());
        while !self.scheduler.is_finished() {
            crossbeam_channel::select! {
                recv(rx) -> msg => match msg {
                    Ok(signal) => self.handle_signal(signal)?,
                    Err(_) => self.scheduler.disconnect(&mut self.engine),
                },
                recv(ticker) -> _ => {
                    self.tick();
                }
            }
        }
        Ok(self.report())
    }

    pub fn report(&self) -> RunReport {
        let totals = self.scheduler.totals();
        RunReport {
            end: self.scheduler.end_reason(),
            dispatched: self.scheduler.dispatched().to_vec(),
            applied: totals.applied,
            skipped: totals.skipped,
            signals: self.signals,
            ticks: self.ticks,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/mod.rs"]
mod tests;
