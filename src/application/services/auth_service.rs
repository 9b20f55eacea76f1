//! Account management and password authentication.

use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};

use crate::domain::entities::{Permission, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::signer::Signer;
use crate::utils::token::generate_salt;

/// Letters, digits and `@ . + - _`, up to 150 characters.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("valid username regex"));

/// Shortest password accepted when creating a user.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Service for creating users and checking their credentials.
///
/// Passwords are stored as `salt$mac`, where `mac` is the hex HMAC-SHA256 of
/// `salt || password` keyed by the server secret.
///
/// A single MAC is cheap to compute. Stored hashes resist offline guessing
/// only while the secret stays private; anyone holding both the `users`
/// table and the secret can test passwords at MAC speed.
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    signer: Signer,
}

impl<U: UserRepository> AuthService<U> {
    /// Creates a new authentication service.
    pub fn new(users: Arc<U>, signer: Signer) -> Self {
        Self { users, signer }
    }

    /// Hashes a password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if no salt could be generated.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = generate_salt()?;
        let mac = self
            .signer
            .sign_hex(&[salt.as_bytes(), password.as_bytes()]);
        Ok(format!("{salt}${mac}"))
    }

    /// Checks a password against a stored `salt$mac` hash.
    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        let Some((salt, mac)) = stored.split_once('$') else {
            return false;
        };
        self.signer
            .verify_hex(&[salt.as_bytes(), password.as_bytes()], mac)
    }

    /// Authenticates a user by username and password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown user, a wrong
    /// password or an inactive account, without saying which.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.users.find_by_username(username.trim()).await?;

        match user {
            Some(user) if user.is_active && self.verify_password(password, &user.password_hash) => {
                Ok(user)
            }
            _ => {
                tracing::info!(username = %username, "Failed login attempt");
                Err(AppError::unauthorized(
                    "Please enter a correct username and password.",
                    json!({}),
                ))
            }
        }
    }

    /// Creates an active user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed username or short password.
    /// Returns [`AppError::Conflict`] if the username is taken.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        if !USERNAME_RE.is_match(username) {
            return Err(AppError::field(
                "username",
                "Username may contain only letters, digits and @/./+/-/_ (max 150).",
            ));
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::field(
                "password",
                "Password must be at least 8 characters.",
            ));
        }

        let hash = self.hash_password(password)?;
        let user = self.users.create(username, &hash).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User created");

        Ok(user)
    }

    /// Lists all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    async fn require_user(&self, username: &str) -> Result<User, AppError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))
    }

    /// Grants a permission to a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn grant(&self, username: &str, permission: Permission) -> Result<(), AppError> {
        let user = self.require_user(username).await?;
        self.users.grant_permission(user.id, permission).await?;
        tracing::info!(username = %username, permission = %permission, "Permission granted");
        Ok(())
    }

    /// Revokes a permission. Returns `false` if the user did not have it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn revoke(&self, username: &str, permission: Permission) -> Result<bool, AppError> {
        let user = self.require_user(username).await?;
        self.users.revoke_permission(user.id, permission).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserRepository;
    use chrono::Utc;

    fn signer() -> Signer {
        Signer::new("test-signing-secret").unwrap()
    }

    fn user_with_hash(hash: String, is_active: bool) -> User {
        User {
            id: 1,
            username: "reader".into(),
            password_hash: hash,
            is_active,
            permissions: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hash_password_is_salted() {
        let svc = AuthService::new(Arc::new(MockUserRepository::new()), signer());

        let a = svc.hash_password("correct horse").unwrap();
        let b = svc.hash_password("correct horse").unwrap();

        assert_ne!(a, b);
        assert!(svc.verify_password("correct horse", &a));
        assert!(svc.verify_password("correct horse", &b));
        assert!(!svc.verify_password("wrong horse", &a));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let svc = AuthService::new(Arc::new(MockUserRepository::new()), signer());
        assert!(!svc.verify_password("anything", "no-separator"));
        assert!(!svc.verify_password("anything", ""));
    }

    #[test]
    fn test_hash_depends_on_secret() {
        let a = AuthService::new(Arc::new(MockUserRepository::new()), signer());
        let b = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Signer::new("other-secret").unwrap(),
        );

        let hash = a.hash_password("password1").unwrap();
        assert!(!b.verify_password("password1", &hash));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let hash = AuthService::new(Arc::new(MockUserRepository::new()), signer())
            .hash_password("password1")
            .unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "reader")
            .times(1)
            .returning(move |_| Ok(Some(user_with_hash(hash.clone(), true))));

        let svc = AuthService::new(Arc::new(users), signer());
        let user = svc.authenticate("reader", "password1").await.unwrap();

        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let hash = AuthService::new(Arc::new(MockUserRepository::new()), signer())
            .hash_password("password1")
            .unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user_with_hash(hash.clone(), true))));

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc.authenticate("reader", "password2").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_inactive_user() {
        let hash = AuthService::new(Arc::new(MockUserRepository::new()), signer())
            .hash_password("password1")
            .unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user_with_hash(hash.clone(), false))));

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc.authenticate("reader", "password1").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc.authenticate("ghost", "password1").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_create_user_validates_username() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc.create_user("bad name!", "password1").await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_user_validates_password_length() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc.create_user("reader", "short").await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_user_stores_hash() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|name, hash| name == "reader@example.com" && hash.contains('$'))
            .times(1)
            .returning(|name, hash| {
                let mut u = user_with_hash(hash.to_string(), true);
                u.username = name.to_string();
                Ok(u)
            });

        let svc = AuthService::new(Arc::new(users), signer());
        let user = svc
            .create_user(" reader@example.com ", "password1")
            .await
            .unwrap();

        assert_eq!(user.username, "reader@example.com");
        assert!(svc.verify_password("password1", &user.password_hash));
    }

    #[tokio::test]
    async fn test_grant_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users.expect_grant_permission().never();

        let svc = AuthService::new(Arc::new(users), signer());
        let err = svc
            .grant("ghost", Permission::CanMarkReturned)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_revoke() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user_with_hash(String::new(), true))));
        users
            .expect_revoke_permission()
            .withf(|id, p| *id == 1 && *p == Permission::DeleteBook)
            .returning(|_, _| Ok(true));

        let svc = AuthService::new(Arc::new(users), signer());
        assert!(svc.revoke("reader", Permission::DeleteBook).await.unwrap());
    }
}
