use std::collections::BTreeMap;

use crate::foundation::core::Direction;
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::graph::pipeline::PortSpec;
use crate::graph::template::{Template, TemplateRegistry};
use crate::script::program::{Action, PortRef, Program, Statement, Trigger};

/// Check every cross-reference of `program` before any node is created.
///
/// `registry` must already hold the program's own templates. Graph statements are checked in
/// script order, so a `plug` may only name instances declared above it. Trigger and action
/// references may name any instance of the script.
#[tracing::instrument(skip_all)]
pub fn validate(program: &Program, registry: &TemplateRegistry) -> LiveMixResult<()> {
    let mut declared: BTreeMap<&str, &Template> = BTreeMap::new();

    for stmt in &program.statements {
        match stmt {
            Statement::New {
                template,
                instance,
                args,
                ..
            } => {
                if declared.contains_key(instance.as_str()) {
                    return Err(LiveMixError::DuplicateInstance(instance.clone()));
                }
                let tpl = registry.get(template)?;
                tpl.expand(args)?;
                declared.insert(instance.as_str(), tpl);
            }
            Statement::Plug { src, dst, line } => {
                let out = port(&declared, src, *line)?;
                let input = port(&declared, dst, *line)?;
                if out.direction != Direction::Out {
                    return Err(LiveMixError::port_mismatch(format!(
                        "{src} is not an output (line {line})"
                    )));
                }
                if input.direction != Direction::In {
                    return Err(LiveMixError::port_mismatch(format!(
                        "{dst} is not an input (line {line})"
                    )));
                }
                if !out.medium.compatible(input.medium) {
                    return Err(LiveMixError::port_mismatch(format!(
                        "{src} carries {:?} but {dst} expects {:?} (line {line})",
                        out.medium, input.medium
                    )));
                }
            }
            Statement::Unplug { dst, line } => {
                if port(&declared, dst, *line)?.direction != Direction::In {
                    return Err(LiveMixError::port_mismatch(format!(
                        "{dst} is not an input (line {line})"
                    )));
                }
            }
        }
    }

    for binding in &program.triggers {
        let line = binding.line;
        match &binding.trigger {
            Trigger::Pre => {}
            Trigger::Progress { clock, .. } => {
                instance(&declared, clock, line)?;
            }
            Trigger::Callback { instance: name, .. } => {
                instance(&declared, name, line)?;
            }
        }

        for action in &binding.group.actions {
            let Some(target) = action.target() else {
                continue;
            };
            let tpl = instance(&declared, target, line)?;
            match action {
                Action::SetProperty { element, .. } if !tpl.has_element(element) => {
                    return Err(LiveMixError::UnknownElement {
                        instance: target.to_owned(),
                        element: element.clone(),
                    });
                }
                Action::WindowMove { spec, .. } => {
                    instance(&declared, &spec.clock, line)?;
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn instance<'a>(
    declared: &BTreeMap<&str, &'a Template>,
    name: &str,
    line: usize,
) -> LiveMixResult<&'a Template> {
    declared.get(name).copied().ok_or_else(|| {
        LiveMixError::dangling(format!("instance '{name}' is not declared (line {line})"))
    })
}

fn port<'a>(
    declared: &BTreeMap<&str, &'a Template>,
    r: &PortRef,
    line: usize,
) -> LiveMixResult<&'a PortSpec> {
    instance(declared, &r.instance, line)?
        .port(&r.port)
        .ok_or_else(|| LiveMixError::UnknownPort {
            instance: r.instance.clone(),
            port: r.port.clone(),
        })
}

#[cfg(test)]
#[path = "../../tests/unit/script/validate.rs"]
mod tests;
