//! Error types for memory allocation and address-map editing.

/// The result type for memory-model operations.
pub type MemResult<T> = Result<T, MemError>;

/// Errors raised by [`MemoryModel`](crate::MemoryModel) and
/// [`MemoryManager`](crate::MemoryManager) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemError {
    /// An allocation would exceed the storage capacity.
    #[error("out of memory: need {needed} addresses, capacity {capacity}")]
    OutOfMemory {
        /// Addresses the allocation would occupy, end inclusive bound.
        needed: u64,
        /// The model's total address capacity.
        capacity: u64,
    },

    /// An address range falls outside the model's extent.
    #[error("invalid range {start}..{stop} (extent 0..{max_address})")]
    InvalidRange {
        /// Range start (inclusive).
        start: u64,
        /// Range stop (exclusive).
        stop: u64,
        /// The model's exclusive upper address bound.
        max_address: u64,
    },

    /// A storage component lacks a numeric argument the manager needs.
    #[error("storage component '{component}' has no numeric '{argument}' argument")]
    MissingArgument {
        /// The storage component name.
        component: String,
        /// The missing argument name.
        argument: String,
    },
}
