use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::foundation::core::Geometry;
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::graph::pipeline::{PipelineSpec, PortSpec};
use crate::script::program::{BindingDef, BindingSource, HOST_ELEMENT, Program, TemplateDef};
use crate::script::value::PropValue;

/// Host attribute that marks an instance as window-bearing.
pub const WINDOW_TAG: (&str, &str) = ("gtktag", "window");

/// A checked `raw` definition ready to be instantiated.
#[derive(Clone, Debug)]
pub struct Template {
    pub name: String,
    pub param_count: usize,
    pub pipeline: PipelineSpec,
    pub bindings: Vec<BindingDef>,
    ports: Vec<PortSpec>,
    min_args: usize,
}

/// Result of binding a template to concrete arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    /// `(element, property, value)` for every sub-element binding, in template order.
    pub properties: Vec<(String, String, PropValue)>,
    /// Host attributes bound on element `raw`.
    pub attributes: BTreeMap<String, PropValue>,
}

impl Expansion {
    /// Return `true` when the instance exposes a window.
    pub fn has_window(&self) -> bool {
        self.attributes.get(WINDOW_TAG.0).and_then(PropValue::as_str) == Some(WINDOW_TAG.1)
    }

    /// Initial window placement from the `x`, `y`, `width` and `height` attributes.
    ///
    /// Missing attributes default to zero.
    pub fn geometry(&self) -> LiveMixResult<Option<Geometry>> {
        if !self.has_window() {
            return Ok(None);
        }
        let num = |key: &str| {
            self.attributes
                .get(key)
                .and_then(PropValue::as_f64)
                .unwrap_or(0.0)
        };
        Geometry::new(num("x"), num("y"), num("width"), num("height")).map(Some)
    }
}

impl Template {
    pub fn from_def(def: &TemplateDef) -> LiveMixResult<Self> {
        for b in &def.bindings {
            if b.element != HOST_ELEMENT && def.pipeline.element(&b.element).is_none() {
                return Err(LiveMixError::UnknownElement {
                    instance: def.name.clone(),
                    element: b.element.clone(),
                });
            }
        }

        let min_args = def
            .bindings
            .iter()
            .filter_map(|b| match &b.source {
                BindingSource::Arg {
                    index,
                    default: None,
                } => Some(*index),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        Ok(Self {
            name: def.name.clone(),
            param_count: def.param_count,
            pipeline: def.pipeline.clone(),
            bindings: def.bindings.clone(),
            ports: def.pipeline.ports(),
            min_args,
        })
    }

    /// Accepted `new` argument counts.
    pub fn arity(&self) -> RangeInclusive<usize> {
        self.min_args..=self.param_count
    }

    pub fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    pub fn port(&self, name: &str) -> Option<&PortSpec> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.pipeline.element(name).is_some()
    }

    /// Return `true` when instances of this template expose a window.
    pub fn has_window(&self) -> bool {
        self.bindings.iter().any(|b| {
            b.element == HOST_ELEMENT
                && b.property == WINDOW_TAG.0
                && b.source == BindingSource::Literal(WINDOW_TAG.1.to_owned())
        })
    }

    /// Substitute `args` into every binding and coerce the results.
    pub fn expand(&self, args: &[String]) -> LiveMixResult<Expansion> {
        let arity = self.arity();
        if !arity.contains(&args.len()) {
            return Err(self.arity_error(args.len()));
        }

        let mut out = Expansion::default();
        for b in &self.bindings {
            let text = match &b.source {
                BindingSource::Literal(s) => s.as_str(),
                BindingSource::Arg { index, default } => index
                    .checked_sub(1)
                    .and_then(|i| args.get(i))
                    .map(String::as_str)
                    .or(default.as_deref())
                    .ok_or_else(|| self.arity_error(args.len()))?,
            };
            let value = b.ty.coerce(text).map_err(|e| {
                LiveMixError::value(format!(
                    "{}.{} of template '{}': {e}",
                    b.element, b.property, self.name
                ))
            })?;
            if b.element == HOST_ELEMENT {
                out.attributes.insert(b.property.clone(), value);
            } else {
                out.properties
                    .push((b.element.clone(), b.property.clone(), value));
            }
        }
        Ok(out)
    }

    fn arity_error(&self, got: usize) -> LiveMixError {
        LiveMixError::Arity {
            template: self.name.clone(),
            min: self.min_args,
            max: self.param_count,
            got,
        }
    }
}

/// Templates available to `new`, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in IO templates.
    pub fn with_prelude() -> LiveMixResult<Self> {
        let mut reg = Self::new();
        reg.extend_from(&crate::script::prelude::program()?)?;
        Ok(reg)
    }

    /// Add or replace a template.
    pub fn define(&mut self, def: &TemplateDef) -> LiveMixResult<()> {
        let template = Template::from_def(def)?;
        if self.templates.insert(def.name.clone(), template).is_some() {
            tracing::debug!(template = %def.name, "template overridden");
        }
        Ok(())
    }

    /// Register every template a program defines, in script order.
    pub fn extend_from(&mut self, program: &Program) -> LiveMixResult<()> {
        for def in &program.templates {
            self.define(def)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> LiveMixResult<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| LiveMixError::UnknownTemplate(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/template.rs"]
mod tests;
