//! Authentication and user management service

use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        user::{RegisterUser, Role, UpdateUser, User, UserClaims},
    },
    repository::Repository,
    services::credentials,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT token and
    /// the user. Audits the login.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !credentials::verify_password(password, &user.password_hash)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;

        self.repository
            .audit
            .record(
                AuditAction::Login,
                &format!("User {} logged in", user.username),
                Some(user.id),
            )
            .await?;

        Ok((token, user))
    }

    /// Issue a JWT capability token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Student self-registration. Role is always `student`; username and
    /// student_id must both be unused.
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Conflict(format!(
                "Username {} already exists",
                request.username
            )));
        }
        if self.repository.users.student_id_exists(&request.student_id).await? {
            return Err(AppError::Conflict(format!(
                "Student id {} already exists",
                request.student_id
            )));
        }

        let password_hash = credentials::hash_password(&request.password)?;

        let user = self
            .repository
            .users
            .create(
                &request.username,
                &password_hash,
                Role::Student,
                &request.full_name,
                request.email.as_deref(),
                Some(&request.student_id),
            )
            .await?;

        self.repository
            .audit
            .record(
                AuditAction::Register,
                &format!("Registered student {}", user.username),
                Some(user.id),
            )
            .await?;

        Ok(user)
    }

    /// Audit a logout; token discard is client-side
    pub async fn logout(&self, actor: &UserClaims) -> AppResult<()> {
        self.repository
            .audit
            .record(
                AuditAction::Logout,
                &format!("User {} logged out", actor.sub),
                Some(actor.user_id),
            )
            .await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Edit profile / role (librarian only, checked at the handler)
    pub async fn update(&self, id: i32, update: UpdateUser, actor: &UserClaims) -> AppResult<User> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self
            .repository
            .users
            .update(id, update.full_name.as_deref(), update.role)
            .await?;

        self.repository
            .audit
            .record(
                AuditAction::UserMgmt,
                &format!("Edited user: {} (Role: {})", user.username, user.role),
                Some(actor.user_id),
            )
            .await?;

        Ok(user)
    }

    /// Delete a user. Self-deletion is forbidden, and users referenced by
    /// borrow history are rejected with Conflict so the history is never
    /// orphaned.
    pub async fn delete(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        if actor.user_id == id {
            return Err(AppError::Validation(
                "You cannot delete yourself".to_string(),
            ));
        }

        let user = self.repository.users.get_by_id(id).await?;

        if self.repository.users.has_borrow_history(id).await? {
            return Err(AppError::Conflict(format!(
                "User {} has borrow history and cannot be deleted",
                user.username
            )));
        }

        self.repository.users.delete(id).await?;

        self.repository
            .audit
            .record(
                AuditAction::UserMgmt,
                &format!("Deleted user: {}", user.username),
                Some(actor.user_id),
            )
            .await?;

        Ok(())
    }

    /// Ensure the seed librarian account exists (startup, original behavior)
    pub async fn ensure_default_librarian(&self) -> AppResult<()> {
        let username = self.config.default_librarian_username.clone();

        if self.repository.users.username_exists(&username).await? {
            return Ok(());
        }

        let password_hash = credentials::hash_password(&self.config.default_librarian_password)?;
        self.repository
            .users
            .create(&username, &password_hash, Role::Librarian, "Jane Doe", None, None)
            .await?;

        tracing::info!(username = %username, "seeded default librarian account");
        Ok(())
    }
}
