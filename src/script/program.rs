use crate::animation::ease::Ease;
use crate::foundation::core::{Point, TransportOp};
use crate::graph::pipeline::PipelineSpec;
use crate::script::value::PropType;

/// Compiled script: template definitions, graph statements and trigger bindings.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Program {
    /// `raw ... war` definitions, in script order.
    pub templates: Vec<TemplateDef>,
    /// `new`, `plug` and `unplug` statements, in script order.
    pub statements: Vec<Statement>,
    /// `on ...` bindings, in declaration order.
    pub triggers: Vec<TriggerBinding>,
}

impl Program {
    /// Names declared by `new` statements, in order.
    pub fn instances(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|s| match s {
            Statement::New { instance, .. } => Some(instance.as_str()),
            _ => None,
        })
    }
}

/// `raw <name> <param-count> <pipeline...>` plus its binding lines.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TemplateDef {
    pub name: String,
    /// Declared parameter count; the upper bound on `new` arguments.
    pub param_count: usize,
    pub pipeline: PipelineSpec,
    pub bindings: Vec<BindingDef>,
    pub line: usize,
}

/// `<element> <property> <type> <value>` inside a template.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BindingDef {
    /// Named pipeline element, or [`HOST_ELEMENT`] for instance attributes.
    pub element: String,
    pub property: String,
    pub ty: PropType,
    pub source: BindingSource,
}

/// Element name that addresses the instance itself rather than a sub-element.
pub const HOST_ELEMENT: &str = "raw";

/// Where a binding takes its value from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// Literal text from the template.
    Literal(String),
    /// `$n` or `$n=default`, 1-based.
    Arg {
        index: usize,
        default: Option<String>,
    },
}

/// Graph-construction statement.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// `new <template> <instance> <args...>`
    New {
        template: String,
        instance: String,
        args: Vec<String>,
        line: usize,
    },
    /// `plug <srcPort> <srcInst> <dstPort> <dstInst>`
    Plug {
        src: PortRef,
        dst: PortRef,
        line: usize,
    },
    /// `unplug <dstPort> <dstInst>`
    Unplug { dst: PortRef, line: usize },
}

/// `(instance, port)` pair.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PortRef {
    pub instance: String,
    pub port: String,
}

impl PortRef {
    pub fn new(instance: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            port: port.into(),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.instance, self.port)
    }
}

/// Predicate that releases an action group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Fires once when the run starts.
    Pre,
    /// Fires once when `clock` reaches `threshold`.
    Progress { clock: String, threshold: f64 },
    /// Fires when `instance` reports `event`.
    Callback { instance: String, event: String },
}

/// Callback event after which a node emits nothing further.
pub const TERMINAL_EVENT: &str = "end";

impl Trigger {
    /// Return `true` for callback triggers on a terminal event.
    pub fn is_terminal_callback(&self) -> bool {
        matches!(self, Self::Callback { event, .. } if event == TERMINAL_EVENT)
    }
}

/// A trigger, its action group, and its position in the script.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TriggerBinding {
    pub trigger: Trigger,
    pub group: ActionGroup,
    /// 0-based declaration index among all bindings.
    pub order: usize,
    pub line: usize,
}

/// How the actions of a group relate to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Each action commits before the next.
    #[default]
    Sequential,
    /// `wrap` ... `parw`: all actions issued at the same instant.
    Parallel,
}

/// Ordered batch of actions released by one trigger.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ActionGroup {
    pub mode: GroupMode,
    pub actions: Vec<Action>,
}

/// One effect applied by the executor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// `act <inst> play <op>` / `act <inst> seek <from> <to>`
    Transport { target: String, op: TransportOp },
    /// `act <inst> prop <element> <name> <type> <value...>`
    SetProperty {
        target: String,
        element: String,
        name: String,
        ty: PropType,
        text: String,
    },
    /// `act <inst> window show`
    WindowShow { target: String },
    /// `act <inst> window move <clock> <t0> <x0> <y0> <t1> <x1> <y1> <ex> <ey>`
    WindowMove { target: String, spec: MoveSpec },
    /// `terminate`
    Terminate,
}

impl Action {
    /// Instance the action applies to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Transport { target, .. }
            | Self::SetProperty { target, .. }
            | Self::WindowShow { target }
            | Self::WindowMove { target, .. } => Some(target),
            Self::Terminate => None,
        }
    }
}

/// Keyframe pair of a window move, timed on `clock`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MoveSpec {
    pub clock: String,
    pub t0: f64,
    pub from: Point,
    pub t1: f64,
    pub to: Point,
    pub ease_x: Ease,
    pub ease_y: Ease,
}
