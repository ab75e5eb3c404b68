use crate::foundation::error::{LiveMixError, LiveMixResult};

pub use kurbo::Point;

/// Opaque handle the collaborator assigns to a created node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeHandle(pub u64);

/// Stream medium carried by a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    /// Audio samples.
    Audio,
    /// Video frames.
    Video,
    /// Medium could not be inferred; compatible with either.
    Any,
}

impl Medium {
    /// Return `true` when a stream of `self` may flow into a port of `other`.
    pub fn compatible(self, other: Medium) -> bool {
        self == other || self == Medium::Any || other == Medium::Any
    }
}

/// Port direction as seen from outside the instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Accepts a stream (a `proxysrc` element inside the template).
    In,
    /// Produces a stream (a `proxysink` element inside the template).
    Out,
}

/// Playback state of a node instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// Not playing; initial state.
    #[default]
    Stopped,
    /// Clock running.
    Playing,
    /// Clock held.
    Paused,
}

/// Transport command issued to a node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportOp {
    /// `play start`
    Start,
    /// `play pause`
    Pause,
    /// `play stop`
    Stop,
    /// `seek <from> <to>` in clock seconds.
    Seek {
        /// Position to seek from.
        from: f64,
        /// Position to seek to.
        to: f64,
    },
}

impl TransportOp {
    /// Parse the argument of a `play` verb.
    pub fn parse_play(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "pause" => Some(Self::Pause),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    /// State the node is in once the command has been applied.
    ///
    /// Seeking keeps the current state.
    pub fn resulting_state(self, current: TransportState) -> TransportState {
        match self {
            Self::Start => TransportState::Playing,
            Self::Pause => TransportState::Paused,
            Self::Stop => TransportState::Stopped,
            Self::Seek { .. } => current,
        }
    }
}

/// Window placement in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, must be >= 0.
    pub width: f64,
    /// Height, must be >= 0.
    pub height: f64,
}

impl Geometry {
    /// Create a validated geometry.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> LiveMixResult<Self> {
        if !(width >= 0.0 && height >= 0.0) {
            return Err(LiveMixError::value(format!(
                "window size must be non-negative, got {width}x{height}"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Top-left corner.
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, new top-left corner.
    pub fn moved_to(self, p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            ..self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
