//! Role use cases.

use std::sync::Arc;

use crate::domain::Role;
use crate::errors::AppResult;
use crate::ports::RoleRepository;

pub struct CreateRoleUseCase {
    roles: Arc<dyn RoleRepository>,
}

impl CreateRoleUseCase {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Normalize and validate `name`, then persist.
    ///
    /// A taken name surfaces as `CONSTRAINT_VIOLATION` from the store.
    pub async fn execute(&self, name: &str) -> AppResult<Role> {
        let role = Role::new(name)?;
        self.roles.create(role).await
    }
}

pub struct ListRolesUseCase {
    roles: Arc<dyn RoleRepository>,
}

impl ListRolesUseCase {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    pub async fn execute(&self) -> AppResult<Vec<Role>> {
        self.roles.get_all().await
    }
}
