use std::collections::BTreeMap;

use crate::animation::ease::{interpolate, normalize};
use crate::foundation::core::Point;
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::graph::manager::GraphManager;
use crate::script::program::MoveSpec;

/// One window move in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTask {
    pub instance: String,
    pub spec: MoveSpec,
    last: Option<Point>,
}

impl AnimationTask {
    pub fn new(instance: impl Into<String>, spec: MoveSpec) -> Self {
        Self {
            instance: instance.into(),
            spec,
            last: None,
        }
    }

    /// Position at clock time `t`. Exact at both keyframes.
    pub fn sample(&self, t: f64) -> Point {
        let s = &self.spec;
        let u = normalize(t, s.t0, s.t1);
        Point::new(
            interpolate(s.from.x, s.to.x, u, s.ease_x),
            interpolate(s.from.y, s.to.y, u, s.ease_y),
        )
    }

    /// Last position pushed to the graph.
    pub fn last_pushed(&self) -> Option<Point> {
        self.last
    }
}

/// Active window moves, at most one per instance.
#[derive(Debug, Default)]
pub struct InterpolationEngine {
    tasks: BTreeMap<String, AnimationTask>,
}

impl InterpolationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a move for `instance`.
    ///
    /// An active task on the same instance is superseded: the new move starts from where the
    /// old one currently is on its own clock.
    pub fn start(&mut self, instance: &str, mut spec: MoveSpec, graph: &GraphManager) {
        if let Some(prior) = self.tasks.get(instance) {
            let now = graph
                .clock_position(&prior.spec.clock)
                .unwrap_or(prior.spec.t0);
            let from = prior.sample(now);
            tracing::debug!(
                instance,
                x = from.x,
                y = from.y,
                "superseding window move from current position"
            );
            spec.from = from;
        }
        self.tasks
            .insert(instance.to_owned(), AnimationTask::new(instance, spec));
    }

    /// Interpolated position of `instance`'s active move at clock time `t`.
    pub fn position(&self, instance: &str, t: f64) -> LiveMixResult<Point> {
        self.tasks
            .get(instance)
            .map(|task| task.sample(t))
            .ok_or_else(|| LiveMixError::NoActiveTask(instance.to_owned()))
    }

    pub fn task(&self, instance: &str) -> Option<&AnimationTask> {
        self.tasks.get(instance)
    }

    /// Push fresh positions for every task whose clock has reached its start.
    ///
    /// Tasks whose clock has passed `t1` push their end point and retire. Returns the number of
    /// positions pushed.
    pub fn advance(&mut self, graph: &mut GraphManager) -> usize {
        let mut pushed = 0;
        self.tasks.retain(|instance, task| {
            let Some(now) = graph.clock_position(&task.spec.clock) else {
                return true;
            };
            if now < task.spec.t0 {
                return true;
            }
            let finished = now >= task.spec.t1;
            let point = task.sample(now);
            if task.last != Some(point) {
                if let Err(err) = graph.move_window(instance, point) {
                    tracing::warn!(instance = %instance, error = %err, "window move dropped");
                    return false;
                }
                task.last = Some(point);
                pushed += 1;
            }
            if finished {
                tracing::debug!(instance = %instance, "window move finished");
            }
            !finished
        });
        pushed
    }

    /// Drop every task; returns how many were active.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
