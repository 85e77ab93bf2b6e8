//! Parent accounts: registration, login and profile management.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use shared::{RegisterParentRequest, UpdateParentRequest};
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::parent::{NewParent, Parent};
use crate::domain::validation::{
    sanitize_text, validate_email, validate_name, validate_parent_age, MIN_PASSWORD_LEN, PARENT_NAME_MAX,
};
use crate::storage::ParentRepository;

const EMAIL_TAKEN: &str = "Email already registered.";

/// Hash a password into an Argon2 PHC string
pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string. Unparsable hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// Lower-case and trim an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Service for parent accounts
#[derive(Clone)]
pub struct AuthService {
    parents: ParentRepository,
}

impl AuthService {
    pub fn new(parents: ParentRepository) -> Self {
        Self { parents }
    }

    /// Register a new parent. All field problems are reported together; a
    /// taken email on an otherwise valid form is a conflict.
    pub async fn register(&self, request: &RegisterParentRequest) -> DomainResult<Parent> {
        let name = sanitize_text(&request.name, PARENT_NAME_MAX);
        let email = normalize_email(&request.email);
        info!("Registering parent: {}", email);

        let mut errors = validate_name(&name, "Name", PARENT_NAME_MAX);
        let email_errors = validate_email(&email);
        let email_valid = email_errors.is_empty();
        errors.extend(email_errors);
        let age = validate_parent_age(&request.age, &mut errors);
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!("Password must be at least {} characters.", MIN_PASSWORD_LEN));
        }

        let taken = email_valid && self.parents.find_by_email(&email).await?.is_some();
        if taken {
            if errors.is_empty() {
                warn!("Registration rejected, email already registered: {}", email);
                return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()));
            }
            errors.push(EMAIL_TAKEN.to_string());
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let new_parent = NewParent {
            name,
            age,
            email,
            password_hash: hash_password(&request.password)?,
        };

        match self.parents.store_parent(&new_parent).await {
            Ok(parent) => {
                info!("Registered parent {} with ID: {}", parent.email, parent.id);
                Ok(parent)
            }
            // A concurrent registration can still win the unique index
            Err(e) if is_unique_violation(&e) => Err(DomainError::Conflict(EMAIL_TAKEN.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate by email and password
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<Parent> {
        let email = normalize_email(email);
        info!("Login attempt for {}", email);

        match self.parents.find_by_email(&email).await? {
            Some(parent) if verify_password(password, &parent.password_hash) => {
                info!("Parent {} logged in", parent.id);
                Ok(parent)
            }
            _ => {
                warn!("Invalid credentials for {}", email);
                Err(DomainError::InvalidCredentials)
            }
        }
    }

    pub async fn get_profile(&self, parent_id: i64) -> DomainResult<Parent> {
        self.parents
            .get_parent(parent_id)
            .await?
            .ok_or(DomainError::NotFound("Parent"))
    }

    /// Update name and age with the same rules as registration
    pub async fn update_profile(&self, parent_id: i64, request: &UpdateParentRequest) -> DomainResult<Parent> {
        info!("Updating profile of parent {}", parent_id);
        let mut parent = self.get_profile(parent_id).await?;

        let name = sanitize_text(&request.name, PARENT_NAME_MAX);
        let mut errors = validate_name(&name, "Name", PARENT_NAME_MAX);
        let age = validate_parent_age(&request.age, &mut errors);
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        self.parents.update_profile(parent_id, &name, age).await?;
        parent.name = name;
        parent.age = age;
        Ok(parent)
    }

    /// Delete the account with all children and vaccinations
    pub async fn delete_account(&self, parent_id: i64) -> DomainResult<()> {
        info!("Deleting account of parent {}", parent_id);
        if self.parents.delete_parent(parent_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Parent"))
        }
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn setup_test() -> AuthService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AuthService::new(ParentRepository::new(db))
    }

    fn register_request(email: &str) -> RegisterParentRequest {
        RegisterParentRequest {
            name: "Priya Sharma".to_string(),
            email: email.to_string(),
            age: "32".to_string(),
            password: "secret123".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("secret123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_hashes() {
        let service = setup_test().await;

        let parent = service.register(&register_request("  Priya@Example.COM ")).await.unwrap();

        assert_eq!(parent.email, "priya@example.com");
        assert_eq!(parent.age, Some(32));
        assert_ne!(parent.password_hash, "secret123");
    }

    #[tokio::test]
    async fn test_register_collects_errors() {
        let service = setup_test().await;
        let request = RegisterParentRequest {
            name: "".to_string(),
            email: "nope".to_string(),
            age: "17".to_string(),
            password: "123".to_string(),
        };

        match service.register(&request).await {
            Err(DomainError::Validation(errors)) => assert_eq!(
                errors,
                vec![
                    "Name is required.",
                    "Invalid email format.",
                    "Parent must be at least 18 years old.",
                    "Password must be at least 6 characters.",
                ]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = setup_test().await;
        service.register(&register_request("dup@example.com")).await.unwrap();

        let second = service.register(&register_request("DUP@example.com")).await;
        assert!(matches!(second, Err(DomainError::Conflict(ref m)) if m == "Email already registered."));

        let mut invalid = register_request("dup@example.com");
        invalid.age = "abc".to_string();
        match service.register(&invalid).await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.contains(&"Email already registered.".to_string()));
                assert!(errors.contains(&"Age must be a number.".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login() {
        let service = setup_test().await;
        let parent = service.register(&register_request("login@example.com")).await.unwrap();

        let logged_in = service.login(" LOGIN@example.com", "secret123").await.unwrap();
        assert_eq!(logged_in.id, parent.id);

        assert!(matches!(
            service.login("login@example.com", "wrong").await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("missing@example.com", "secret123").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = setup_test().await;
        let parent = service.register(&register_request("edit@example.com")).await.unwrap();

        let updated = service
            .update_profile(
                parent.id,
                &UpdateParentRequest {
                    name: "Priya S".to_string(),
                    age: "40".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Priya S");
        assert_eq!(updated.age, Some(40));

        let rejected = service
            .update_profile(
                parent.id,
                &UpdateParentRequest {
                    name: "Priya".to_string(),
                    age: "12".to_string(),
                },
            )
            .await;
        assert!(matches!(rejected, Err(DomainError::Validation(_))));
        assert_eq!(service.get_profile(parent.id).await.unwrap().age, Some(40));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let service = setup_test().await;
        let parent = service.register(&register_request("gone@example.com")).await.unwrap();

        service.delete_account(parent.id).await.unwrap();

        assert!(matches!(service.get_profile(parent.id).await, Err(DomainError::NotFound("Parent"))));
        assert!(matches!(service.delete_account(parent.id).await, Err(DomainError::NotFound(_))));
        assert!(service.login("gone@example.com", "secret123").await.is_err());
    }
}
