use std::collections::BTreeMap;

use crate::config::RewirePolicy;
use crate::foundation::core::{Direction, Geometry, NodeHandle, Point, TransportOp, TransportState};
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::graph::collaborator::{Collaborator, NodeSpec};
use crate::graph::pipeline::PortSpec;
use crate::graph::template::{Template, TemplateRegistry};
use crate::script::program::PortRef;
use crate::script::value::{PropType, PropValue};

/// Window state of a window-bearing instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowState {
    pub geometry: Geometry,
    pub visible: bool,
}

/// A live node created from a template.
#[derive(Clone, Debug)]
pub struct NodeInstance {
    pub name: String,
    pub template: String,
    pub args: Vec<String>,
    pub handle: NodeHandle,
    pub transport: TransportState,
    /// Current value per `(element, property)`.
    pub properties: BTreeMap<(String, String), PropValue>,
    pub window: Option<WindowState>,
}

/// Progress and callback history reported for one instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockState {
    /// Latest normalized progress value.
    pub position: Option<f64>,
    /// Callback events in arrival order.
    pub events: Vec<String>,
}

/// Owner of the live graph: instances, plugs and per-clock progress.
///
/// Every structural change goes through here and is forwarded to the [`Collaborator`].
pub struct GraphManager {
    collaborator: Box<dyn Collaborator>,
    templates: TemplateRegistry,
    policy: RewirePolicy,
    instances: BTreeMap<String, NodeInstance>,
    handles: BTreeMap<NodeHandle, String>,
    /// Active source of each connected input, keyed by destination.
    plugs: BTreeMap<PortRef, PortRef>,
    clocks: BTreeMap<String, ClockState>,
}

impl std::fmt::Debug for GraphManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphManager")
            .field("instances", &self.instances.keys().collect::<Vec<_>>())
            .field("plugs", &self.plugs)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl GraphManager {
    pub fn new(
        collaborator: Box<dyn Collaborator>,
        templates: TemplateRegistry,
        policy: RewirePolicy,
    ) -> Self {
        Self {
            collaborator,
            templates,
            policy,
            instances: BTreeMap::new(),
            handles: BTreeMap::new(),
            plugs: BTreeMap::new(),
            clocks: BTreeMap::new(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Expand `template` with `args`, create the node and return its ports.
    pub fn instantiate(
        &mut self,
        template: &str,
        instance: &str,
        args: &[String],
    ) -> LiveMixResult<Vec<PortSpec>> {
        if self.instances.contains_key(instance) {
            return Err(LiveMixError::DuplicateInstance(instance.to_owned()));
        }
        let tpl = self.templates.get(template)?;
        let expansion = tpl.expand(args)?;
        let window = expansion.geometry()?.map(|geometry| WindowState {
            geometry,
            visible: false,
        });
        let ports = tpl.ports().to_vec();

        let spec = NodeSpec {
            instance: instance.to_owned(),
            template: template.to_owned(),
            pipeline: tpl.pipeline.text.clone(),
            args: args.to_vec(),
            properties: expansion.properties.clone(),
            attributes: expansion.attributes,
        };
        let handle = self.collaborator.create(&spec)?;

        let properties = expansion
            .properties
            .into_iter()
            .map(|(element, name, value)| ((element, name), value))
            .collect();
        self.instances.insert(
            instance.to_owned(),
            NodeInstance {
                name: instance.to_owned(),
                template: template.to_owned(),
                args: args.to_vec(),
                handle,
                transport: TransportState::default(),
                properties,
                window,
            },
        );
        self.handles.insert(handle, instance.to_owned());
        tracing::info!(instance, template, handle = handle.0, "node created");
        Ok(ports)
    }

    /// Connect `src` (an output) to `dst` (an input).
    pub fn plug(&mut self, src: &PortRef, dst: &PortRef) -> LiveMixResult<()> {
        let out = self.port(src)?;
        let input = self.port(dst)?;
        if out.direction != Direction::Out || input.direction != Direction::In {
            return Err(LiveMixError::port_mismatch(format!(
                "{src} -> {dst} must connect an output to an input"
            )));
        }
        if !out.medium.compatible(input.medium) {
            return Err(LiveMixError::port_mismatch(format!(
                "{src} carries {:?} but {dst} expects {:?}",
                out.medium, input.medium
            )));
        }

        match self.plugs.get(dst) {
            Some(current) if current == src => {
                tracing::debug!(%src, %dst, "plug already in place");
                return Ok(());
            }
            Some(current) => match self.policy {
                RewirePolicy::Reject => {
                    return Err(LiveMixError::Rewire(format!(
                        "{dst} is already fed by {current}"
                    )));
                }
                RewirePolicy::Rewire => {
                    tracing::info!(%dst, old = %current, new = %src, "rewiring input");
                    let dst_handle = self.handle(&dst.instance)?;
                    self.collaborator.disconnect(dst_handle, &dst.port)?;
                    self.plugs.remove(dst);
                }
            },
            None => {}
        }

        let src_handle = self.handle(&src.instance)?;
        let dst_handle = self.handle(&dst.instance)?;
        self.collaborator
            .connect(src_handle, &src.port, dst_handle, &dst.port)?;
        self.plugs.insert(dst.clone(), src.clone());
        tracing::debug!(%src, %dst, "plugged");
        Ok(())
    }

    /// Drop the active source of `dst`. Unplugging an unconnected input does nothing.
    pub fn unplug(&mut self, dst: &PortRef) -> LiveMixResult<()> {
        if self.port(dst)?.direction != Direction::In {
            return Err(LiveMixError::port_mismatch(format!("{dst} is not an input")));
        }
        if !self.plugs.contains_key(dst) {
            return Ok(());
        }
        let dst_handle = self.handle(&dst.instance)?;
        self.collaborator.disconnect(dst_handle, &dst.port)?;
        if let Some(src) = self.plugs.remove(dst) {
            tracing::debug!(%src, %dst, "unplugged");
        }
        Ok(())
    }

    /// Source currently feeding `dst`.
    pub fn source_of(&self, dst: &PortRef) -> Option<&PortRef> {
        self.plugs.get(dst)
    }

    pub fn set_transport(&mut self, instance: &str, op: TransportOp) -> LiveMixResult<()> {
        let node = self.node(instance)?;
        let handle = node.handle;
        let next = op.resulting_state(node.transport);
        self.collaborator.transport(handle, op)?;
        if let Some(node) = self.instances.get_mut(instance) {
            node.transport = next;
        }
        Ok(())
    }

    /// Coerce `text` to `ty` and assign it to `element.name` of `instance`.
    pub fn set_property(
        &mut self,
        instance: &str,
        element: &str,
        name: &str,
        ty: PropType,
        text: &str,
    ) -> LiveMixResult<()> {
        let node = self.node(instance)?;
        if !self.templates.get(&node.template)?.has_element(element) {
            return Err(LiveMixError::UnknownElement {
                instance: instance.to_owned(),
                element: element.to_owned(),
            });
        }
        let value = ty.coerce(text)?;
        let key = (element.to_owned(), name.to_owned());
        if let Some(current) = node.properties.get(&key)
            && current.ty() != ty
        {
            return Err(LiveMixError::type_mismatch(format!(
                "{instance}.{element}.{name} is {} but was given {ty}",
                current.ty()
            )));
        }

        let handle = node.handle;
        self.collaborator.set_property(handle, element, name, &value)?;
        if let Some(node) = self.instances.get_mut(instance) {
            node.properties.insert(key, value);
        }
        Ok(())
    }

    pub fn show_window(&mut self, instance: &str) -> LiveMixResult<()> {
        let handle = self.window_handle(instance)?;
        self.collaborator.window_show(handle)?;
        if let Some(w) = self.window_mut(instance) {
            w.visible = true;
        }
        Ok(())
    }

    pub fn move_window(&mut self, instance: &str, to: Point) -> LiveMixResult<()> {
        let handle = self.window_handle(instance)?;
        self.collaborator.window_move(handle, to)?;
        if let Some(w) = self.window_mut(instance) {
            w.geometry = w.geometry.moved_to(to);
        }
        Ok(())
    }

    pub fn window(&self, instance: &str) -> LiveMixResult<WindowState> {
        self.node(instance)?
            .window
            .ok_or_else(|| LiveMixError::NoWindow(instance.to_owned()))
    }

    pub fn instance(&self, name: &str) -> Option<&NodeInstance> {
        self.instances.get(name)
    }

    pub fn instances(&self) -> impl Iterator<Item = &NodeInstance> {
        self.instances.values()
    }

    /// Instance a collaborator handle belongs to.
    pub fn instance_of(&self, handle: NodeHandle) -> Option<&str> {
        self.handles.get(&handle).map(String::as_str)
    }

    pub fn handle_of(&self, instance: &str) -> Option<NodeHandle> {
        self.instances.get(instance).map(|n| n.handle)
    }

    pub fn record_progress(&mut self, instance: &str, value: f64) {
        self.clocks.entry(instance.to_owned()).or_default().position = Some(value);
    }

    pub fn record_event(&mut self, instance: &str, event: &str) {
        self.clocks
            .entry(instance.to_owned())
            .or_default()
            .events
            .push(event.to_owned());
    }

    /// Latest progress reported by `instance`.
    pub fn clock_position(&self, instance: &str) -> Option<f64> {
        self.clocks.get(instance).and_then(|c| c.position)
    }

    pub fn clock(&self, instance: &str) -> Option<&ClockState> {
        self.clocks.get(instance)
    }

    fn node(&self, instance: &str) -> LiveMixResult<&NodeInstance> {
        self.instances
            .get(instance)
            .ok_or_else(|| LiveMixError::UnknownInstance(instance.to_owned()))
    }

    fn handle(&self, instance: &str) -> LiveMixResult<NodeHandle> {
        self.node(instance).map(|n| n.handle)
    }

    fn window_handle(&self, instance: &str) -> LiveMixResult<NodeHandle> {
        let node = self.node(instance)?;
        if node.window.is_none() {
            return Err(LiveMixError::NoWindow(instance.to_owned()));
        }
        Ok(node.handle)
    }

    fn window_mut(&mut self, instance: &str) -> Option<&mut WindowState> {
        self.instances.get_mut(instance)?.window.as_mut()
    }

    fn template_of(&self, instance: &str) -> LiveMixResult<&Template> {
        let node = self.instances.get(instance).ok_or_else(|| {
            LiveMixError::dangling(format!("instance '{instance}' does not exist"))
        })?;
        self.templates.get(&node.template)
    }

    fn port(&self, r: &PortRef) -> LiveMixResult<PortSpec> {
        self.template_of(&r.instance)?
            .port(&r.port)
            .cloned()
            .ok_or_else(|| LiveMixError::UnknownPort {
                instance: r.instance.clone(),
                port: r.port.clone(),
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/manager.rs"]
mod tests;
