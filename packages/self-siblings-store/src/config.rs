//! Store configuration.

/// In-memory store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Initial row capacity per table
    pub initial_capacity: usize,
    /// Reject pivot rows whose endpoints are not saved entities
    pub enforce_foreign_keys: bool,
    /// Yield to the scheduler before each async operation, so concurrent
    /// callers interleave the way they would against a remote database
    pub yield_on_io: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            enforce_foreign_keys: true,
            yield_on_io: true,
        }
    }
}
