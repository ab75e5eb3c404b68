use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::core::{NodeHandle, Point, TransportOp};
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::script::program::PortRef;
use crate::script::value::PropValue;

/// Everything the media layer needs to build one node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSpec {
    pub instance: String,
    pub template: String,
    /// Rendered primitive pipeline description.
    pub pipeline: String,
    /// Arguments exactly as written after `new <template> <instance>`.
    pub args: Vec<String>,
    /// `(element, property, value)` bound by the template.
    pub properties: Vec<(String, String, PropValue)>,
    /// Host attributes bound on element `raw`.
    pub attributes: BTreeMap<String, PropValue>,
}

/// Outbound command surface of the media layer.
///
/// Commands are fire-and-forget: an `Ok` return means the command was accepted, not that its
/// effect is visible yet. Completion is reported back through signals.
pub trait Collaborator: Send {
    fn create(&mut self, spec: &NodeSpec) -> LiveMixResult<NodeHandle>;

    fn connect(
        &mut self,
        src: NodeHandle,
        src_port: &str,
        dst: NodeHandle,
        dst_port: &str,
    ) -> LiveMixResult<()>;

    fn disconnect(&mut self, dst: NodeHandle, dst_port: &str) -> LiveMixResult<()>;

    fn set_property(
        &mut self,
        node: NodeHandle,
        element: &str,
        name: &str,
        value: &PropValue,
    ) -> LiveMixResult<()>;

    fn transport(&mut self, node: NodeHandle, op: TransportOp) -> LiveMixResult<()>;

    fn window_show(&mut self, node: NodeHandle) -> LiveMixResult<()>;

    fn window_move(&mut self, node: NodeHandle, to: Point) -> LiveMixResult<()>;
}

impl<C: Collaborator + ?Sized> Collaborator for Box<C> {
    fn create(&mut self, spec: &NodeSpec) -> LiveMixResult<NodeHandle> {
        (**self).create(spec)
    }

    fn connect(
        &mut self,
        src: NodeHandle,
        src_port: &str,
        dst: NodeHandle,
        dst_port: &str,
    ) -> LiveMixResult<()> {
        (**self).connect(src, src_port, dst, dst_port)
    }

    fn disconnect(&mut self, dst: NodeHandle, dst_port: &str) -> LiveMixResult<()> {
        (**self).disconnect(dst, dst_port)
    }

    fn set_property(
        &mut self,
        node: NodeHandle,
        element: &str,
        name: &str,
        value: &PropValue,
    ) -> LiveMixResult<()> {
        (**self).set_property(node, element, name, value)
    }

    fn transport(&mut self, node: NodeHandle, op: TransportOp) -> LiveMixResult<()> {
        (**self).transport(node, op)
    }

    fn window_show(&mut self, node: NodeHandle) -> LiveMixResult<()> {
        (**self).window_show(node)
    }

    fn window_move(&mut self, node: NodeHandle, to: Point) -> LiveMixResult<()> {
        (**self).window_move(node, to)
    }
}

/// One command as seen by [`RecordingCollaborator`], with handles resolved to instance names.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Create {
        instance: String,
        template: String,
        pipeline: String,
        args: Vec<String>,
    },
    Connect {
        src: PortRef,
        dst: PortRef,
    },
    Disconnect {
        dst: PortRef,
    },
    SetProperty {
        instance: String,
        element: String,
        name: String,
        value: PropValue,
    },
    Transport {
        instance: String,
        op: TransportOp,
    },
    WindowShow {
        instance: String,
    },
    WindowMove {
        instance: String,
        to: Point,
    },
}

impl Command {
    /// Instance the command is addressed to; the destination for connections.
    pub fn instance(&self) -> &str {
        match self {
            Self::Create { instance, .. }
            | Self::SetProperty { instance, .. }
            | Self::Transport { instance, .. }
            | Self::WindowShow { instance }
            | Self::WindowMove { instance, .. } => instance,
            Self::Connect { dst, .. } | Self::Disconnect { dst } => &dst.instance,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create {
                instance,
                template,
                args,
                ..
            } => write!(f, "create {instance} ({template} {})", args.join(" ")),
            Self::Connect { src, dst } => write!(f, "connect {src} -> {dst}"),
            Self::Disconnect { dst } => write!(f, "disconnect {dst}"),
            Self::SetProperty {
                instance,
                element,
                name,
                value,
            } => write!(f, "set {instance}.{element}.{name} = {value}"),
            Self::Transport { instance, op } => write!(f, "transport {instance} {op:?}"),
            Self::WindowShow { instance } => write!(f, "show {instance}"),
            Self::WindowMove { instance, to } => {
                write!(f, "move {instance} to ({:.2}, {:.2})", to.x, to.y)
            }
        }
    }
}

/// Shared, clonable view of the commands a [`RecordingCollaborator`] received.
#[derive(Clone, Debug, Default)]
pub struct CommandLog(Arc<Mutex<Vec<Command>>>);

impl CommandLog {
    fn push(&self, cmd: Command) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cmd);
    }

    /// Copy of every command recorded so far, in issue order.
    pub fn snapshot(&self) -> Vec<Command> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory collaborator that accepts every command and records it.
#[derive(Debug, Default)]
pub struct RecordingCollaborator {
    log: CommandLog,
    names: BTreeMap<NodeHandle, String>,
    refuse: Option<String>,
}

impl RecordingCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every command addressed to `instance` after it has been created.
    pub fn refusing(mut self, instance: impl Into<String>) -> Self {
        self.refuse = Some(instance.into());
        self
    }

    /// Handle to the command log; stays valid after the collaborator moves into a runtime.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    fn name(&self, node: NodeHandle) -> LiveMixResult<String> {
        let name = self
            .names
            .get(&node)
            .cloned()
            .ok_or_else(|| LiveMixError::collaborator(format!("unknown node handle {}", node.0)))?;
        if self.refuse.as_deref() == Some(name.as_str()) {
            return Err(LiveMixError::collaborator(format!(
                "node '{name}' refused the command"
            )));
        }
        Ok(name)
    }
}

impl Collaborator for RecordingCollaborator {
    fn create(&mut self, spec: &NodeSpec) -> LiveMixResult<NodeHandle> {
        let handle = NodeHandle(self.names.len() as u64 + 1);
        self.names.insert(handle, spec.instance.clone());
        self.log.push(Command::Create {
            instance: spec.instance.clone(),
            template: spec.template.clone(),
            pipeline: spec.pipeline.clone(),
            args: spec.args.clone(),
        });
        Ok(handle)
    }

    fn connect(
        &mut self,
        src: NodeHandle,
        src_port: &str,
        dst: NodeHandle,
        dst_port: &str,
    ) -> LiveMixResult<()> {
        let cmd = Command::Connect {
            src: PortRef::new(self.name(src)?, src_port),
            dst: PortRef::new(self.name(dst)?, dst_port),
        };
        self.log.push(cmd);
        Ok(())
    }

    fn disconnect(&mut self, dst: NodeHandle, dst_port: &str) -> LiveMixResult<()> {
        let cmd = Command::Disconnect {
            dst: PortRef::new(self.name(dst)?, dst_port),
        };
        self.log.push(cmd);
        Ok(())
    }

    fn set_property(
        &mut self,
        node: NodeHandle,
        element: &str,
        name: &str,
        value: &PropValue,
    ) -> LiveMixResult<()> {
        let cmd = Command::SetProperty {
            instance: self.name(node)?,
            element: element.to_owned(),
            name: name.to_owned(),
            value: value.clone(),
        };
        self.log.push(cmd);
        Ok(())
    }

    fn transport(&mut self, node: NodeHandle, op: TransportOp) -> LiveMixResult<()> {
        let cmd = Command::Transport {
            instance: self.name(node)?,
            op,
        };
        self.log.push(cmd);
        Ok(())
    }

    fn window_show(&mut self, node: NodeHandle) -> LiveMixResult<()> {
        let cmd = Command::WindowShow {
            instance: self.name(node)?,
        };
        self.log.push(cmd);
        Ok(())
    }

    fn window_move(&mut self, node: NodeHandle, to: Point) -> LiveMixResult<()> {
        let cmd = Command::WindowMove {
            instance: self.name(node)?,
            to,
        };
        self.log.push(cmd);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/collaborator.rs"]
mod tests;
