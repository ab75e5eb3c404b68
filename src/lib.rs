//! livemix runs timeline scripts that drive a live audio/video node graph.
//!
//! A script declares node templates (`raw ... war`), instantiates and wires them (`new`,
//! `plug`), and binds action groups to triggers (`on pre|progress|callback ...`). The public
//! surface follows that flow:
//!
//! - [`compile`] script text into a [`Program`]
//! - [`Runtime::build`] the graph against a [`Collaborator`]
//! - feed [`Signal`]s through a [`SignalSender`] while [`Runtime::run`] dispatches them
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod config;
pub mod graph;
pub mod runtime;
pub mod script;

pub use crate::foundation::core::{
    Direction, Geometry, Medium, NodeHandle, Point, TransportOp, TransportState,
};
pub use crate::foundation::error::{LiveMixError, LiveMixResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::engine::{AnimationTask, InterpolationEngine};
pub use crate::config::{RewirePolicy, RuntimeConfig};
pub use crate::graph::collaborator::{
    Collaborator, Command, CommandLog, NodeSpec, RecordingCollaborator,
};
pub use crate::graph::manager::{GraphManager, NodeInstance, WindowState};
pub use crate::graph::template::{Template, TemplateRegistry};
pub use crate::runtime::scheduler::{Dispatch, EndReason, RunState};
pub use crate::runtime::signal::{Signal, SignalSender};
pub use crate::runtime::{RunReport, Runtime};
pub use crate::script::compiler::compile;
pub use crate::script::program::{Action, ActionGroup, PortRef, Program, Trigger};
pub use crate::script::validate::validate;
pub use crate::script::value::{PropType, PropValue};
