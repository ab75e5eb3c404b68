use crossbeam_channel::{Receiver, Sender};

use crate::foundation::core::NodeHandle;
use crate::foundation::error::{LiveMixError, LiveMixResult};

/// Inbound notification from the media layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// The node's normalized playback position reached `value` (`0..=1`).
    Progress { node: NodeHandle, value: f64 },
    /// The node reported a named event such as `end`.
    Callback { node: NodeHandle, event: String },
}

/// Producer side of the signal channel. Clone one per producer thread.
#[derive(Clone, Debug)]
pub struct SignalSender(Sender<Signal>);

impl SignalSender {
    pub fn send(&self, signal: Signal) -> LiveMixResult<()> {
        self.0
            .send(signal)
            .map_err(|_| LiveMixError::Other(anyhow::anyhow!("runtime is no longer receiving")))
    }

    pub fn progress(&self, node: NodeHandle, value: f64) -> LiveMixResult<()> {
        self.send(Signal::Progress { node, value })
    }

    pub fn callback(&self, node: NodeHandle, event: impl Into<String>) -> LiveMixResult<()> {
        self.send(Signal::Callback {
            node,
            event: event.into(),
        })
    }
}

pub(crate) fn channel() -> (SignalSender, Receiver<Signal>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (SignalSender(tx), rx)
}
