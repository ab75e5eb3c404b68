/// Convenience result type used across livemix.
pub type LiveMixResult<T> = Result<T, LiveMixError>;

/// Error taxonomy for compiling, building and running a timeline script.
///
/// Variants fall into four groups:
///
/// - compile-time (`Syntax`, `Arity`, `UnbalancedBlock`): fatal, raised before any node exists
/// - structural (`DuplicateInstance`, `DanglingReference`, `UnknownPort`, `PortMismatch`,
///   `UnknownElement`, `UnknownTemplate`, `Rewire`): fatal, the script is inconsistent
/// - per-action (`Value`, `TypeMismatch`, `UnknownInstance`, `NoWindow`, `Collaborator`):
///   recoverable, the executor skips the offending action
/// - everything else (`NoActiveTask`, `Config`, `Other`)
#[derive(thiserror::Error, Debug)]
pub enum LiveMixError {
    /// Unknown keyword, bad argument count or malformed literal.
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based script line.
        line: usize,
        /// Human readable cause.
        message: String,
    },

    /// `new` was given an argument count the template does not accept.
    #[error("arity error: template '{template}' accepts {min}..={max} arguments, got {got}")]
    Arity {
        /// Template name.
        template: String,
        /// Smallest accepted argument count.
        min: usize,
        /// Declared parameter count.
        max: usize,
        /// Supplied argument count.
        got: usize,
    },

    /// `wrap`/`parw` or `raw`/`war` are not properly paired.
    #[error("unbalanced block at line {line}: {message}")]
    UnbalancedBlock {
        /// 1-based script line.
        line: usize,
        /// Human readable cause.
        message: String,
    },

    /// `new` reused an instance name.
    #[error("duplicate instance '{0}'")]
    DuplicateInstance(String),

    /// A statement refers to an instance that is never declared.
    #[error("dangling reference: {0}")]
    DanglingReference(String),

    /// `new` names a template that is not defined.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// A plug names a port the instance does not expose.
    #[error("unknown port '{port}' on instance '{instance}'")]
    UnknownPort {
        /// Instance name.
        instance: String,
        /// Port name.
        port: String,
    },

    /// A plug connects ports of incompatible medium or direction.
    #[error("port mismatch: {0}")]
    PortMismatch(String),

    /// A plug targets an already connected input under the `reject` policy.
    #[error("rewire rejected: {0}")]
    Rewire(String),

    /// A property binding or action addresses a sub-element the template does not name.
    #[error("unknown element '{element}' in instance '{instance}'")]
    UnknownElement {
        /// Instance or template name.
        instance: String,
        /// Element name.
        element: String,
    },

    /// A value could not be coerced to its declared type.
    #[error("value error: {0}")]
    Value(String),

    /// A property was assigned a type different from its current one.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An action targets an instance that is not live.
    #[error("unknown instance '{0}'")]
    UnknownInstance(String),

    /// A window action targets an instance that exposes no window.
    #[error("instance '{0}' has no window")]
    NoWindow(String),

    /// The instance has no active animation task.
    #[error("no active task for instance '{0}'")]
    NoActiveTask(String),

    /// The external collaborator refused a command.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Invalid runtime configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LiveMixError {
    /// Build a [`LiveMixError::Syntax`] value.
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: msg.into(),
        }
    }

    /// Build a [`LiveMixError::UnbalancedBlock`] value.
    pub fn unbalanced(line: usize, msg: impl Into<String>) -> Self {
        Self::UnbalancedBlock {
            line,
            message: msg.into(),
        }
    }

    /// Build a [`LiveMixError::DanglingReference`] value.
    pub fn dangling(msg: impl Into<String>) -> Self {
        Self::DanglingReference(msg.into())
    }

    /// Build a [`LiveMixError::PortMismatch`] value.
    pub fn port_mismatch(msg: impl Into<String>) -> Self {
        Self::PortMismatch(msg.into())
    }

    /// Build a [`LiveMixError::Value`] value.
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    /// Build a [`LiveMixError::TypeMismatch`] value.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Build a [`LiveMixError::Collaborator`] value.
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// Build a [`LiveMixError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Return `true` for per-action failures that skip one action and let the run continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Value(_)
                | Self::TypeMismatch(_)
                | Self::UnknownInstance(_)
                | Self::NoWindow(_)
                | Self::Collaborator(_)
        )
    }

    /// Return `true` for errors raised while compiling script text.
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::Arity { .. } | Self::UnbalancedBlock { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
