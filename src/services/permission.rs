//! Permission resolution
//!
//! Classifies an actor into an [`ActorRole`] from the configured Owner and an
//! explicitly owned [`PermissionStore`]. The store is loaded from the role
//! tables at startup and kept in step with them by the grant/revoke helpers.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use crate::database::{RoleRepository, RoleTable};
use crate::models::{ActorRole, RoleMember};
use crate::utils::errors::{RelayError, Result};

/// In-memory controller and broadcaster sets
#[derive(Debug, Default)]
pub struct PermissionStore {
    controllers: RwLock<HashSet<i64>>,
    broadcasters: RwLock<HashSet<i64>>,
}

impl PermissionStore {
    pub fn new(controllers: impl IntoIterator<Item = i64>, broadcasters: impl IntoIterator<Item = i64>) -> Self {
        Self {
            controllers: RwLock::new(controllers.into_iter().collect()),
            broadcasters: RwLock::new(broadcasters.into_iter().collect()),
        }
    }

    /// Load both sets from the role tables
    pub async fn load(roles: &RoleRepository) -> Result<Self> {
        let controllers = roles.list_ids(RoleTable::Controllers).await?;
        let broadcasters = roles.list_ids(RoleTable::Broadcasters).await?;
        info!(
            controllers = controllers.len(),
            broadcasters = broadcasters.len(),
            "Permission store loaded"
        );
        Ok(Self::new(controllers, broadcasters))
    }

    fn set(&self, table: RoleTable) -> &RwLock<HashSet<i64>> {
        match table {
            RoleTable::Controllers => &self.controllers,
            RoleTable::Broadcasters => &self.broadcasters,
        }
    }

    pub fn contains(&self, table: RoleTable, user_id: i64) -> bool {
        self.set(table)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }

    pub fn insert(&self, table: RoleTable, user_id: i64) {
        self.set(table)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id);
    }

    pub fn remove(&self, table: RoleTable, user_id: i64) -> bool {
        self.set(table)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id)
    }
}

/// Maps an actor to its role
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    owner_id: Option<i64>,
    store: Arc<PermissionStore>,
}

impl PermissionResolver {
    pub fn new(owner_id: Option<i64>, store: Arc<PermissionStore>) -> Self {
        Self { owner_id, store }
    }

    pub fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }

    /// Highest role the actor holds
    pub fn resolve(&self, actor: i64) -> ActorRole {
        if self.owner_id == Some(actor) {
            ActorRole::Owner
        } else if self.store.contains(RoleTable::Controllers, actor) {
            ActorRole::Controller
        } else if self.store.contains(RoleTable::Broadcasters, actor) {
            ActorRole::Broadcaster
        } else {
            ActorRole::None
        }
    }

    /// Resolve and fail with `PermissionDenied` below `minimum`
    pub fn require(&self, actor: i64, minimum: ActorRole) -> Result<ActorRole> {
        let role = self.resolve(actor);
        if role < minimum {
            debug!(actor, %role, required = %minimum, "Permission denied");
            return Err(RelayError::PermissionDenied(format!(
                "user {} has role {}, {} required",
                actor, role, minimum
            )));
        }
        Ok(role)
    }

    /// Persist a grant and make it visible to `resolve`
    pub async fn grant(
        &self,
        roles: &RoleRepository,
        table: RoleTable,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<RoleMember> {
        let member = roles.grant(table, user_id, username).await?;
        self.store.insert(table, user_id);
        Ok(member)
    }

    /// Persist a revocation; false when the user held no such role
    pub async fn revoke(&self, roles: &RoleRepository, table: RoleTable, user_id: i64) -> Result<bool> {
        let removed = roles.revoke(table, user_id).await?;
        self.store.remove(table, user_id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PermissionResolver {
        let store = PermissionStore::new([20], [30, 20]);
        PermissionResolver::new(Some(10), Arc::new(store))
    }

    #[test]
    fn test_resolve_roles() {
        let resolver = resolver();
        assert_eq!(resolver.resolve(10), ActorRole::Owner);
        assert_eq!(resolver.resolve(20), ActorRole::Controller);
        assert_eq!(resolver.resolve(30), ActorRole::Broadcaster);
        assert_eq!(resolver.resolve(40), ActorRole::None);
    }

    #[test]
    fn test_no_owner_configured() {
        let resolver = PermissionResolver::new(None, Arc::new(PermissionStore::default()));
        assert_eq!(resolver.resolve(10), ActorRole::None);
    }

    #[test]
    fn test_require() {
        let resolver = resolver();
        assert!(resolver.require(10, ActorRole::Controller).is_ok());
        assert!(resolver.require(30, ActorRole::Broadcaster).is_ok());
        assert!(matches!(
            resolver.require(30, ActorRole::Controller),
            Err(RelayError::PermissionDenied(_))
        ));
        assert!(resolver.require(40, ActorRole::Broadcaster).is_err());
    }

    #[test]
    fn test_store_updates_are_visible() {
        let store = Arc::new(PermissionStore::default());
        let resolver = PermissionResolver::new(None, store.clone());

        store.insert(RoleTable::Broadcasters, 50);
        assert_eq!(resolver.resolve(50), ActorRole::Broadcaster);
        assert!(store.remove(RoleTable::Broadcasters, 50));
        assert_eq!(resolver.resolve(50), ActorRole::None);
    }
}
