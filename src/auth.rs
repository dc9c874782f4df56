//! Authentication and authorization.
//!
//! Users live in the database with salted password hashes, staff/superuser
//! flags and a list of named permissions.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::db::entities::user;
use crate::error::{CatalogError, FieldErrors, Result};
use crate::forms::INVALID_CHOICE;

/// Permission needed to renew loans and see everything on loan.
pub const CAN_MARK_RETURNED: &str = "catalog.can_mark_returned";

/// Grantable permissions with their display names
pub const PERMISSIONS: &[(&str, &str)] = &[(CAN_MARK_RETURNED, "Set vegetable as returned")];

const USERNAME_MAX_LENGTH: usize = 150;

/// Hash a password with salt
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"vegetable-catalog-salt:");
    hasher.update(password.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn verify_password(user: &user::Model, password: &str) -> bool {
    hash_password(password) == user.password_hash
}

/// Flags and permissions for a new account
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewUser {
    pub is_staff: bool,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
}

impl NewUser {
    pub fn superuser() -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
            permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, perm: &str) -> Self {
        self.permissions.push(perm.to_string());
        self
    }
}

/// Account fields edited through the admin console. A blank password
/// keeps the current one on change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserInput {
    pub username: String,
    pub password: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
}

impl UserInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if username.chars().count() > USERNAME_MAX_LENGTH {
            errors.add("username", "Ensure this value has at most 150 characters.");
        } else if !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        if self
            .permissions
            .iter()
            .any(|p| !PERMISSIONS.iter().any(|(code, _)| code == p))
        {
            errors.add("permissions", INVALID_CHOICE);
        }
        errors
    }

    fn flags(&self) -> NewUser {
        self.permissions.iter().fold(
            NewUser {
                is_staff: self.is_staff,
                is_superuser: self.is_superuser,
                permissions: Vec::new(),
            },
            |flags, perm| flags.with_permission(perm),
        )
    }
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    db: Arc<DatabaseConnection>,
}

impl AuthManager {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn register_user(&self, username: &str, password: &str, flags: NewUser) -> Result<user::Model> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CatalogError::invalid("username", "This field is required."));
        }
        if self.get_user_by_name(username).await?.is_some() {
            return Err(CatalogError::invalid(
                "username",
                "A user with that username already exists.",
            ));
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let model = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)),
            is_staff: Set(flags.is_staff),
            is_superuser: Set(flags.is_superuser),
            permissions: Set(flags.permissions.join(",")),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        tracing::info!("Registered user {}", model.username);
        Ok(model)
    }

    /// Create the bootstrap superuser unless that username already exists.
    pub async fn ensure_admin_user(&self, username: &str, password: &str) -> Result<user::Model> {
        if let Some(existing) = self.get_user_by_name(username).await? {
            return Ok(existing);
        }
        let admin = self.register_user(username, password, NewUser::superuser()).await?;
        tracing::info!("Created admin user '{}'", admin.username);
        Ok(admin)
    }

    /// Check username/password, returning the account on success
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<user::Model> {
        let user = self
            .get_user_by_name(username)
            .await?
            .ok_or(CatalogError::AuthFailed)?;

        if !verify_password(&user, password) {
            tracing::warn!("Failed login for '{}'", username);
            return Err(CatalogError::AuthFailed);
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(self.db.as_ref()).await?)
    }

    pub async fn get_user_by_name(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?)
    }

    /// Create an account from the admin console; a password is required here.
    pub async fn create_user(&self, input: UserInput) -> Result<user::Model> {
        input.validate().into_result()?;
        let password = match input.password.as_deref() {
            Some(password) if !password.is_empty() => password,
            _ => return Err(CatalogError::invalid("password", "This field is required.")),
        };
        self.register_user(&input.username, password, input.flags()).await
    }

    /// Change account fields, flags and permissions.
    pub async fn update_user(&self, id: i32, input: UserInput) -> Result<user::Model> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("User {}", id)))?;
        input.validate().into_result()?;

        let username = input.username.trim();
        if let Some(other) = self.get_user_by_name(username).await? {
            if other.id != id {
                return Err(CatalogError::invalid(
                    "username",
                    "A user with that username already exists.",
                ));
            }
        }

        let flags = input.flags();
        let mut active: user::ActiveModel = existing.into();
        active.username = Set(username.to_string());
        active.is_staff = Set(flags.is_staff);
        active.is_superuser = Set(flags.is_superuser);
        active.permissions = Set(flags.permissions.join(","));
        if let Some(password) = input.password.as_deref().filter(|p| !p.is_empty()) {
            active.password_hash = Set(hash_password(password));
        }
        let model = active.update(self.db.as_ref()).await?;

        tracing::info!("Updated user {}", model.username);
        Ok(model)
    }
}

/// Fail unless someone is logged in.
pub fn require_login(user: Option<user::Model>) -> Result<user::Model> {
    user.ok_or(CatalogError::AuthRequired)
}

/// Fail unless the logged-in user holds `perm`.
pub fn require_perm(user: Option<user::Model>, perm: &str) -> Result<user::Model> {
    let user = require_login(user)?;
    if user.has_perm(perm) {
        Ok(user)
    } else {
        tracing::warn!("User '{}' lacks permission {}", user.username, perm);
        Err(CatalogError::PermissionDenied)
    }
}

/// Fail unless the logged-in user may use the admin console.
pub fn require_staff(user: Option<user::Model>) -> Result<user::Model> {
    let user = require_login(user)?;
    if user.is_staff || user.is_superuser {
        Ok(user)
    } else {
        Err(CatalogError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn test_auth() -> (TempDir, AuthManager) {
        let temp_dir = TempDir::new().unwrap();
        let db = init_database(&temp_dir.path().join("auth.db")).await.unwrap();
        (temp_dir, AuthManager::new(Arc::new(db)))
    }

    #[test]
    fn test_password_hash() {
        let hash1 = hash_password("test123");
        let hash2 = hash_password("test123");
        let hash3 = hash_password("different");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[tokio::test]
    async fn test_authentication() {
        let (_dir, auth) = test_auth().await;
        auth.register_user("gardener", "password123", NewUser::default())
            .await
            .unwrap();

        let user = auth.authenticate("gardener", "password123").await.unwrap();
        assert_eq!(user.username, "gardener");
        assert!(!user.is_staff);

        assert!(matches!(
            auth.authenticate("gardener", "wrong").await,
            Err(CatalogError::AuthFailed)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "pass").await,
            Err(CatalogError::AuthFailed)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (_dir, auth) = test_auth().await;
        auth.register_user("dup", "a", NewUser::default()).await.unwrap();
        assert!(matches!(
            auth.register_user("dup", "b", NewUser::default()).await,
            Err(CatalogError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let (_dir, auth) = test_auth().await;
        let first = auth.ensure_admin_user("admin", "admin").await.unwrap();
        let second = auth.ensure_admin_user("admin", "other").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_superuser && first.is_staff);
        assert!(first.has_perm(CAN_MARK_RETURNED));
    }

    #[tokio::test]
    async fn test_permission_checks() {
        let (_dir, auth) = test_auth().await;
        let plain = auth.register_user("plain", "pw", NewUser::default()).await.unwrap();
        let librarian = auth
            .register_user("librarian", "pw", NewUser::default().with_permission(CAN_MARK_RETURNED))
            .await
            .unwrap();

        assert!(matches!(require_perm(None, CAN_MARK_RETURNED), Err(CatalogError::AuthRequired)));
        assert!(matches!(
            require_perm(Some(plain.clone()), CAN_MARK_RETURNED),
            Err(CatalogError::PermissionDenied)
        ));
        assert!(require_perm(Some(librarian.clone()), CAN_MARK_RETURNED).is_ok());
        assert!(matches!(require_staff(Some(librarian)), Err(CatalogError::PermissionDenied)));

        let granted = auth
            .update_user(
                plain.id,
                UserInput {
                    username: "plain".into(),
                    permissions: vec![CAN_MARK_RETURNED.into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(granted.has_perm(CAN_MARK_RETURNED));
        assert!(!granted.has_perm("catalog.other"));
        // blank password leaves the old one in place
        assert!(auth.authenticate("plain", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_user_input_rules() {
        let (_dir, auth) = test_auth().await;

        let missing_password = UserInput { username: "keeper".into(), ..Default::default() };
        match auth.create_user(missing_password).await {
            Err(CatalogError::Invalid(errors)) => {
                assert_eq!(errors.get("password"), &["This field is required.".to_string()]);
            }
            other => panic!("expected password error, got {:?}", other.map(|u| u.username)),
        }

        let bad = UserInput {
            username: "no spaces".into(),
            password: Some("pw".into()),
            permissions: vec!["catalog.launch_rockets".into()],
            ..Default::default()
        };
        let errors = bad.validate();
        assert_eq!(errors.get("username").len(), 1);
        assert_eq!(errors.get("permissions"), &[INVALID_CHOICE.to_string()]);

        let keeper = auth
            .create_user(UserInput {
                username: "keeper".into(),
                password: Some("pw".into()),
                is_staff: true,
                ..Default::default()
            })
            .await
            .unwrap();
        auth.register_user("other", "pw", NewUser::default()).await.unwrap();

        let renamed = UserInput {
            username: "other".into(),
            is_staff: true,
            ..Default::default()
        };
        assert!(matches!(auth.update_user(keeper.id, renamed).await, Err(CatalogError::Invalid(_))));

        let rehashed = UserInput {
            username: "keeper".into(),
            password: Some("fresh".into()),
            ..Default::default()
        };
        let updated = auth.update_user(keeper.id, rehashed).await.unwrap();
        assert!(!updated.is_staff);
        assert!(auth.authenticate("keeper", "fresh").await.is_ok());
        assert!(matches!(
            auth.update_user(9999, UserInput { username: "x".into(), ..Default::default() }).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
