use std::collections::BTreeMap;

use crate::animation::engine::InterpolationEngine;
use crate::foundation::core::TransportOp;
use crate::foundation::error::LiveMixResult;
use crate::graph::manager::GraphManager;
use crate::script::program::{Action, ActionGroup, GroupMode};

/// What applying one group did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupOutcome {
    pub applied: usize,
    pub skipped: usize,
    /// The group contained `terminate`.
    pub terminate: bool,
}

/// Apply `group` to the graph.
///
/// Recoverable failures skip the offending action and are logged; anything else aborts the
/// group and is returned. `terminate` is reported, never acted on here.
pub fn execute(
    group: &ActionGroup,
    graph: &mut GraphManager,
    engine: &mut InterpolationEngine,
) -> LiveMixResult<GroupOutcome> {
    let actions: Vec<&Action> = match group.mode {
        GroupMode::Sequential => group.actions.iter().collect(),
        GroupMode::Parallel => collapse(&group.actions),
    };

    let mut outcome = GroupOutcome::default();
    for action in actions {
        if matches!(action, Action::Terminate) {
            outcome.terminate = true;
            continue;
        }
        match apply(action, graph, engine) {
            Ok(()) => outcome.applied += 1,
            Err(err) if err.is_recoverable() => {
                tracing::warn!(instance = ?action.target(), error = %err, "action skipped");
                outcome.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(outcome)
}

fn apply(
    action: &Action,
    graph: &mut GraphManager,
    engine: &mut InterpolationEngine,
) -> LiveMixResult<()> {
    match action {
        Action::Transport { target, op } => graph.set_transport(target, *op),
        Action::SetProperty {
            target,
            element,
            name,
            ty,
            text,
        } => graph.set_property(target, element, name, *ty, text),
        Action::WindowShow { target } => graph.show_window(target),
        Action::WindowMove { target, spec } => {
            graph.window(target)?;
            engine.start(target, spec.clone(), graph);
            Ok(())
        }
        Action::Terminate => Ok(()),
    }
}

/// Keep only the last action per `(target, field)`, in script order.
fn collapse(actions: &[Action]) -> Vec<&Action> {
    let mut last: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (i, action) in actions.iter().enumerate() {
        if let Some(key) = conflict_key(action) {
            last.insert(key, i);
        }
    }
    actions
        .iter()
        .enumerate()
        .filter(|(i, action)| match conflict_key(action) {
            Some(key) => last.get(&key) == Some(i),
            None => true,
        })
        .map(|(_, action)| action)
        .collect()
}

fn conflict_key(action: &Action) -> Option<(String, String)> {
    let field = match action {
        Action::Transport {
            op: TransportOp::Seek { .. },
            ..
        } => "seek".to_owned(),
        Action::Transport { .. } => "transport".to_owned(),
        Action::SetProperty { element, name, .. } => format!("prop:{element}.{name}"),
        Action::WindowShow { .. } => "window.show".to_owned(),
        Action::WindowMove { .. } => "window.position".to_owned(),
        Action::Terminate => return None,
    };
    Some((action.target()?.to_owned(), field))
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/executor.rs"]
mod tests;
