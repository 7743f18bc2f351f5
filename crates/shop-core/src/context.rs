//! Operation context with correlation identifiers.

use crate::lifecycle::TimingContext;

/// Unique identifier correlating the log lines of one store operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let id = format!(
            "{:x}-{:08x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            rand::random::<u32>()
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through a single cart or settings operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Correlation ID for this operation.
    pub request_id: RequestId,
    /// Operation name (e.g., "add_item").
    pub operation: &'static str,
    /// Timing marks for the operation.
    pub timing: TimingContext,
}

impl OperationContext {
    /// Start a new operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            request_id: RequestId::generate(),
            operation,
            timing: TimingContext::new(),
        }
    }
}
