use thiserror::Error;
use viewbind_core_types::{RequestId, TraceId};

/// Result type alias using ViewError
pub type Result<T> = std::result::Result<T, ViewError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Listener vetoes are never errors and have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Stream
    MalformedStream,

    // Template matching
    UnknownProperty,
    TypeMismatch,

    // Collaborators
    UnresolvedReference,
    Conversion,
    Accessor,
    Splice,

    // Setup
    Configuration,

    // Integration
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedStream => "ERR_MALFORMED_STREAM",
            ExErrorKind::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::Conversion => "ERR_CONVERSION",
            ExErrorKind::Accessor => "ERR_ACCESSOR",
            ExErrorKind::Splice => "ERR_SPLICE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the traversal path at which the failure
/// happened, for programmatic handling and diagnostics.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    property: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
    candidates: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            property: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
            candidates: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the traversal path (node names from the root)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !path.is_empty() {
            self.path = Some(path);
        }
        self
    }

    /// Add the offending property name
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add candidate names (the known children of a container on UnknownProperty)
    pub fn with_candidates(mut self, names: Vec<String>) -> Self {
        self.candidates = Some(names);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for view generation and application
///
/// Every traversal variant carries the node path at which it occurred.
/// Collaborators (accessors, converters, strategies) usually build errors
/// through the constructor helpers, which leave the path empty; the engine
/// fills it in via [`ViewError::at`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// Unmatched or misnested begin/end, orphaned value, truncated view
    #[error("Malformed stream at '{path}': {reason}")]
    MalformedStream { path: String, reason: String },

    /// No child node matches an incoming property (strict mode)
    #[error("No such property '{property}' in {container} at '{path}'")]
    UnknownProperty {
        path: String,
        container: String,
        property: String,
        known: Vec<String>,
    },

    /// Scalar where a structure was required, or the reverse
    #[error("Type mismatch at '{path}': {reason}")]
    TypeMismatch { path: String, reason: String },

    /// The reference resolver found no target
    #[error("Unresolved reference to {type_name} {keys} at '{path}'")]
    UnresolvedReference {
        path: String,
        type_name: String,
        keys: String,
    },

    /// A value converter rejected a value
    #[error("Conversion failed at '{path}': {reason}")]
    Conversion { path: String, reason: String },

    /// The template or configuration is inconsistent
    #[error("Configuration error at '{path}': {reason}")]
    Configuration { path: String, reason: String },

    /// A property accessor failed to read or write
    #[error("Accessor for '{property}' failed at '{path}': {reason}")]
    Accessor {
        path: String,
        property: String,
        reason: String,
    },

    /// A splice handler failed
    #[error("Splice failed at '{path}': {reason}")]
    Splice { path: String, reason: String },

    /// Configuration or payload (de)serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ViewError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ViewError::MalformedStream {
            path: String::new(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        ViewError::TypeMismatch {
            path: String::new(),
            reason: reason.into(),
        }
    }

    pub fn conversion(reason: impl Into<String>) -> Self {
        ViewError::Conversion {
            path: String::new(),
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        ViewError::Configuration {
            path: String::new(),
            reason: reason.into(),
        }
    }

    pub fn accessor(property: impl Into<String>, reason: impl Into<String>) -> Self {
        ViewError::Accessor {
            path: String::new(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    pub fn splice(reason: impl Into<String>) -> Self {
        ViewError::Splice {
            path: String::new(),
            reason: reason.into(),
        }
    }

    /// Attach the traversal path unless the error already carries one
    pub fn at(mut self, at: &str) -> Self {
        let slot = match &mut self {
            ViewError::MalformedStream { path, .. }
            | ViewError::UnknownProperty { path, .. }
            | ViewError::TypeMismatch { path, .. }
            | ViewError::UnresolvedReference { path, .. }
            | ViewError::Conversion { path, .. }
            | ViewError::Configuration { path, .. }
            | ViewError::Accessor { path, .. }
            | ViewError::Splice { path, .. } => Some(path),
            ViewError::Serialization { .. } | ViewError::Internal { .. } => None,
        };
        if let Some(path) = slot {
            if path.is_empty() {
                *path = at.to_string();
            }
        }
        self
    }

    /// The traversal path, if this variant carries one and it has been set
    pub fn path(&self) -> Option<&str> {
        let path = match self {
            ViewError::MalformedStream { path, .. }
            | ViewError::UnknownProperty { path, .. }
            | ViewError::TypeMismatch { path, .. }
            | ViewError::UnresolvedReference { path, .. }
            | ViewError::Conversion { path, .. }
            | ViewError::Configuration { path, .. }
            | ViewError::Accessor { path, .. }
            | ViewError::Splice { path, .. } => path,
            ViewError::Serialization { .. } | ViewError::Internal { .. } => return None,
        };
        (!path.is_empty()).then_some(path.as_str())
    }

    /// Shorthand for `ExError::from(self.clone()).kind()`
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ViewError::MalformedStream { .. } => ExErrorKind::MalformedStream,
            ViewError::UnknownProperty { .. } => ExErrorKind::UnknownProperty,
            ViewError::TypeMismatch { .. } => ExErrorKind::TypeMismatch,
            ViewError::UnresolvedReference { .. } => ExErrorKind::UnresolvedReference,
            ViewError::Conversion { .. } => ExErrorKind::Conversion,
            ViewError::Configuration { .. } => ExErrorKind::Configuration,
            ViewError::Accessor { .. } => ExErrorKind::Accessor,
            ViewError::Splice { .. } => ExErrorKind::Splice,
            ViewError::Serialization { .. } => ExErrorKind::Serialization,
            ViewError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from ViewError to ExError
impl From<ViewError> for ExError {
    fn from(err: ViewError) -> Self {
        let kind = err.kind();
        match err {
            ViewError::MalformedStream { path, reason } => ExError::new(kind)
                .with_path(path)
                .with_message(reason),

            ViewError::UnknownProperty {
                path,
                container,
                property,
                known,
            } => ExError::new(kind)
                .with_path(path)
                .with_property(property)
                .with_candidates(known)
                .with_message(format!("No such property in {}", container)),

            ViewError::TypeMismatch { path, reason } => ExError::new(kind)
                .with_path(path)
                .with_message(reason),

            ViewError::UnresolvedReference {
                path,
                type_name,
                keys,
            } => ExError::new(kind)
                .with_path(path)
                .with_message(format!("No {} matches {}", type_name, keys)),

            ViewError::Conversion { path, reason } => ExError::new(kind)
                .with_path(path)
                .with_message(reason),

            ViewError::Configuration { path, reason } => ExError::new(kind)
                .with_path(path)
                .with_message(reason),

            ViewError::Accessor {
                path,
                property,
                reason,
            } => ExError::new(kind)
                .with_path(path)
                .with_property(property)
                .with_message(reason),

            ViewError::Splice { path, reason } => ExError::new(kind)
                .with_path(path)
                .with_message(reason),

            ViewError::Serialization { message } | ViewError::Internal { message } => {
                ExError::new(kind).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ViewError
impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Serialization {
            message: err.to_string(),
        }
    }
}
