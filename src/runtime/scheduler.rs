use std::collections::BTreeMap;

use crate::animation::engine::InterpolationEngine;
use crate::foundation::error::LiveMixResult;
use crate::graph::manager::GraphManager;
use crate::runtime::executor::{self, GroupOutcome};
use crate::runtime::signal::Signal;
use crate::script::program::{Trigger, TriggerBinding};

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// `terminate` fired; animations are being cancelled.
    Draining,
    Terminated,
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A `terminate` action fired.
    Terminate,
    /// No trigger or animation could still produce work.
    Idle,
    /// Every signal producer went away.
    Disconnected,
}

/// One fired trigger binding.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Dispatch {
    pub order: usize,
    pub line: usize,
    pub trigger: Trigger,
}

#[derive(Debug, Default)]
struct ProgressCursor {
    /// Binding indices sorted by `(threshold, order)`.
    queue: Vec<usize>,
    next: usize,
}

/// Decides which trigger bindings fire, and when.
///
/// All dispatch happens on the caller's thread, one signal at a time. `pre` bindings fire in
/// [`Scheduler::start`] before any signal is looked at. Progress values are normalized to
/// `0..=1`; progress bindings fire at most once per run, in threshold order per clock.
/// Callback bindings fire on every matching event, except the terminal `end` which fires once.
#[derive(Debug)]
pub struct Scheduler {
    bindings: Vec<TriggerBinding>,
    fired: Vec<bool>,
    progress: BTreeMap<String, ProgressCursor>,
    state: RunState,
    end: Option<EndReason>,
    dispatched: Vec<Dispatch>,
    totals: GroupOutcome,
}

impl Scheduler {
    pub fn new(bindings: Vec<TriggerBinding>) -> Self {
        let mut progress: BTreeMap<String, ProgressCursor> = BTreeMap::new();
        for (i, b) in bindings.iter().enumerate() {
            if let Trigger::Progress { clock, .. } = &b.trigger {
                progress.entry(clock.clone()).or_default().queue.push(i);
            }
        }
        for cursor in progress.values_mut() {
            cursor.queue.sort_by(|&a, &b| {
                threshold(&bindings[a])
                    .total_cmp(&threshold(&bindings[b]))
                    .then(bindings[a].order.cmp(&bindings[b].order))
            });
        }

        Self {
            fired: vec![false; bindings.len()],
            bindings,
            progress,
            state: RunState::Idle,
            end: None,
            dispatched: Vec::new(),
            totals: GroupOutcome::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Terminated
    }

    /// Fired bindings in dispatch order.
    pub fn dispatched(&self) -> &[Dispatch] {
        &self.dispatched
    }

    /// Applied and skipped action counts summed over every group so far.
    pub fn totals(&self) -> GroupOutcome {
        self.totals
    }

    /// Enter `Running` and fire every `pre` binding in declaration order.
    pub fn start(
        &mut self,
        graph: &mut GraphManager,
        engine: &mut InterpolationEngine,
    ) -> LiveMixResult<()> {
        if self.state != RunState::Idle {
            return Ok(());
        }
        self.state = RunState::Running;
        tracing::info!(bindings = self.bindings.len(), "run started");

        let pre: Vec<usize> = (0..self.bindings.len())
            .filter(|&i| self.bindings[i].trigger == Trigger::Pre)
            .collect();
        for i in pre {
            if self.state != RunState::Running {
                break;
            }
            self.fire(i, graph, engine)?;
        }
        self.settle(engine);
        Ok(())
    }

    /// Dispatch one inbound signal.
    pub fn handle_signal(
        &mut self,
        signal: &Signal,
        graph: &mut GraphManager,
        engine: &mut InterpolationEngine,
    ) -> LiveMixResult<()> {
        if self.state != RunState::Running {
            tracing::debug!(?signal, state = ?self.state, "signal ignored");
            return Ok(());
        }

        match signal {
            Signal::Progress { node, value } => {
                let Some(clock) = graph.instance_of(*node).map(str::to_owned) else {
                    tracing::warn!(node = node.0, "progress from an unknown node");
                    return Ok(());
                };
                if !value.is_finite() || *value < 0.0 {
                    tracing::warn!(clock = %clock, value, "progress value dropped");
                    return Ok(());
                }
                let value = if *value > 1.0 {
                    tracing::warn!(clock = %clock, value, "progress above 1 clamped");
                    1.0
                } else {
                    *value
                };
                graph.record_progress(&clock, value);
                self.on_progress(&clock, value, graph, engine)?;
            }
            Signal::Callback { node, event } => {
                let Some(instance) = graph.instance_of(*node).map(str::to_owned) else {
                    tracing::warn!(node = node.0, event = %event, "callback from an unknown node");
                    return Ok(());
                };
                graph.record_event(&instance, event);
                self.on_callback(&instance, event, graph, engine)?;
            }
        }
        self.settle(engine);
        Ok(())
    }

    /// Advance animations; returns the number of window positions pushed.
    pub fn tick(&mut self, graph: &mut GraphManager, engine: &mut InterpolationEngine) -> usize {
        if self.state != RunState::Running {
            return 0;
        }
        let pushed = engine.advance(graph);
        self.settle(engine);
        pushed
    }

    /// Stop because no producer is left.
    pub fn disconnect(&mut self, engine: &mut InterpolationEngine) {
        if self.state == RunState::Terminated {
            return;
        }
        tracing::info!("all signal producers disconnected");
        self.finish(EndReason::Disconnected, engine);
    }

    /// Return `true` while some binding or animation can still produce work.
    pub fn is_pending(&self, engine: &InterpolationEngine) -> bool {
        if !engine.is_idle() {
            return true;
        }
        self.bindings.iter().zip(&self.fired).any(|(b, fired)| {
            !fired && (matches!(b.trigger, Trigger::Progress { .. }) || b.trigger.is_terminal_callback())
        })
    }

    fn on_progress(
        &mut self,
        clock: &str,
        value: f64,
        graph: &mut GraphManager,
        engine: &mut InterpolationEngine,
    ) -> LiveMixResult<()> {
        loop {
            let Some(cursor) = self.progress.get_mut(clock) else {
                return Ok(());
            };
            let Some(&i) = cursor.queue.get(cursor.next) else {
                return Ok(());
            };
            if threshold(&self.bindings[i]) > value {
                return Ok(());
            }
            cursor.next += 1;
            self.fire(i, graph, engine)?;
            if self.state != RunState::Running {
                return Ok(());
            }
        }
    }

    fn on_callback(
        &mut self,
        instance: &str,
        event: &str,
        graph: &mut GraphManager,
        engine: &mut InterpolationEngine,
    ) -> LiveMixResult<()> {
        let matching: Vec<usize> = (0..self.bindings.len())
            .filter(|&i| match &self.bindings[i].trigger {
                Trigger::Callback {
                    instance: inst,
                    event: ev,
                } => inst == instance && ev == event,
                _ => false,
            })
            // Terminal events fire their bindings once per run.
            .filter(|&i| !(self.fired[i] && self.bindings[i].trigger.is_terminal_callback()))
            .collect();
        for i in matching {
            if self.state != RunState::Running {
                break;
            }
            self.fire(i, graph, engine)?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, graph, engine))]
    fn fire(
        &mut self,
        i: usize,
        graph: &mut GraphManager,
        engine: &mut InterpolationEngine,
    ) -> LiveMixResult<()> {
        let binding = &self.bindings[i];
        self.fired[i] = true;
        self.dispatched.push(Dispatch {
            order: binding.order,
            line: binding.line,
            trigger: binding.trigger.clone(),
        });
        tracing::debug!(line = binding.line, trigger = ?binding.trigger, "dispatching group");

        let outcome = executor::execute(&binding.group, graph, engine)?;
        self.totals.applied += outcome.applied;
        self.totals.skipped += outcome.skipped;
        if outcome.terminate {
            self.state = RunState::Draining;
            self.finish(EndReason::Terminate, engine);
        }
        Ok(())
    }

    fn settle(&mut self, engine: &mut InterpolationEngine) {
        if self.state == RunState::Running && !self.is_pending(engine) {
            tracing::info!("nothing left to schedule");
            self.finish(EndReason::Idle, engine);
        }
    }

    fn finish(&mut self, reason: EndReason, engine: &mut InterpolationEngine) {
        let cancelled = engine.cancel_all();
        self.state = RunState::Terminated;
        self.end = Some(reason);
        tracing::info!(?reason, cancelled, "run terminated");
    }
}

fn threshold(b: &TriggerBinding) -> f64 {
    match b.trigger {
        Trigger::Progress { threshold, .. } => threshold,
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
