//! Shared application state handed to every handler.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::admin::AdminSite;
use crate::auth::AuthManager;
use crate::catalog::Catalog;
use crate::session::SessionStore;

pub struct AppState {
    pub catalog: Catalog,
    pub auth: AuthManager,
    pub sessions: SessionStore,
    pub admin: AdminSite,
}

impl AppState {
    pub fn with_db(db: Arc<DatabaseConnection>) -> Self {
        let auth = AuthManager::new(db.clone());
        Self {
            catalog: Catalog::new(db),
            admin: AdminSite::new(auth.clone()),
            auth,
            sessions: SessionStore::new(),
        }
    }
}
