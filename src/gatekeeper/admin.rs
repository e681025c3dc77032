//! Admin allow-list.
//!
//! Gates configuration changes (`configure`, `remove_configuration`).
//! The ledger only asks two questions of it: is this principal an admin,
//! and who are the admins.

use crate::collections::OrderedSet;
use crate::primitives::Address;

/// Capability that authorizes administrator operations.
///
/// Implementations must be cheap and side-effect free; the ledger calls
/// `is_admin` at the start of every admin-gated operation.
pub trait AdminList: Send + Sync {
    /// Whether `principal` may configure call types.
    fn is_admin(&self, principal: &Address) -> bool;

    /// All admins, in a stable order.
    fn admins(&self) -> Vec<Address>;
}

/// Fixed allow-list built at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminList {
    admins: OrderedSet<Address>,
}

impl StaticAdminList {
    pub fn new<I: IntoIterator<Item = Address>>(admins: I) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Add an admin. Returns `true` if newly added.
    pub fn grant(&mut self, admin: Address) -> bool {
        self.admins.add(admin)
    }

    /// Remove an admin. Returns `true` if it was present.
    pub fn revoke(&mut self, admin: &Address) -> bool {
        self.admins.remove(admin)
    }
}

impl AdminList for StaticAdminList {
    fn is_admin(&self, principal: &Address) -> bool {
        self.admins.contains(principal)
    }

    fn admins(&self) -> Vec<Address> {
        self.admins.elements()
    }
}
