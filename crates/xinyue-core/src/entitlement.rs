//! License/entitlement precondition.

use crate::error::Result;

/// Yes/no gate checked before any search or transfer work.
pub trait EntitlementGate: Send + Sync {
    /// `Ok(())` when the service may run, `Err(XinyueError::Entitlement)`
    /// otherwise.
    fn check(&self) -> Result<()>;
}
