/// Error kinds surfaced by the archipelago core.
///
/// All variants are reported synchronously as fatal failures to the
/// caller; none are ever swallowed internally.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchipelagoError {
    /// Incompatible problem on `push_back`, topology vertex-count mismatch
    /// on `set_topology`, or a migration rate outside its valid range.
    Configuration(String),

    /// A mutating operation was invoked while `busy()` was true.
    State(String),

    /// An island already attached to another archipelago was pushed.
    Ownership(String),

    /// An invalid island index was passed to an inspector.
    Precondition(String),

    /// One or more island workers failed (panicked or returned an error)
    /// during `evolve`/`evolve_t`; surfaced when `join()` is called.
    Worker(String),
}

impl std::fmt::Display for ArchipelagoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchipelagoError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            ArchipelagoError::State(msg) => write!(f, "state error: {}", msg),
            ArchipelagoError::Ownership(msg) => write!(f, "ownership error: {}", msg),
            ArchipelagoError::Precondition(msg) => write!(f, "precondition error: {}", msg),
            ArchipelagoError::Worker(msg) => write!(f, "worker error: {}", msg),
        }
    }
}

impl std::error::Error for ArchipelagoError {}
