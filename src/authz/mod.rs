//! Authorization core.
//!
//! A pure evaluator over the session's role table plus a render-time guard.
//! Permission checks are never an error path: denial is a `false`, and the
//! HTTP layer turns it into a 403.

mod evaluator;
mod guard;

pub use evaluator::evaluate;
pub use guard::{AccessSnapshot, SessionPhase};

/// Well-known role names.
pub mod role_names {
    /// Legacy business carve-out: a role with this name grants everything
    /// regardless of its grant table, case-insensitively.
    pub const LEGACY_ADMIN: &str = "administrador";

    /// Safe default assigned to auto-provisioned profiles when present.
    pub const DEFAULT_MEMBER: &str = "colaborador";
}
