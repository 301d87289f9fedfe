//! Business logic services

pub mod audit;
pub mod borrows;
pub mod catalog;
pub mod credentials;
pub mod notifications;
pub mod stats;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
    pub notifications: notifications::NotificationsService,
    pub audit: audit::AuditService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone()),
            notifications: notifications::NotificationsService::new(repository.clone()),
            audit: audit::AuditService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
