use crate::auth::{hash_password, verify_password};
use crate::db::{Store, User};
use crate::error::{AppError, AuthError};
use std::sync::Arc;
use tracing::{info, warn};

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::ValidationError("Email must not be empty".into()));
    }
    if password.is_empty() {
        return Err(AppError::ValidationError("Password must not be empty".into()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<Store>,
}

impl UserService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn create(&self, email: &str, password: &str) -> Result<User, AppError> {
        validate_credentials(email, password)?;

        // Hashing stays outside the write lock
        let password_hash = hash_password(password)?;

        let user = self.store.update(|snapshot| {
            if snapshot.user_by_email(email).is_some() {
                return Err(AppError::Conflict(format!("User with email {} already exists", email)));
            }

            let id = snapshot.next_user_id();
            let user = User {
                id,
                email: email.to_string(),
                password_hash,
            };
            snapshot.users.insert(id, user.clone());
            Ok(user)
        })?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    /// Checks an email/password pair and returns the matching user id.
    pub fn authorize(&self, email: &str, password: &str) -> Result<u64, AppError> {
        validate_credentials(email, password)?;

        let user = self
            .store
            .load()?
            .user_by_email(email)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No user with email {}", email)))?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user.id)
    }

    /// Overwrites email and password. The new email is not checked against
    /// other accounts.
    pub fn update(&self, id: u64, email: &str, password: &str) -> Result<User, AppError> {
        validate_credentials(email, password)?;
        let password_hash = hash_password(password)?;

        let user = self.store.update(|snapshot| {
            let user = snapshot
                .users
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

            user.email = email.to_string();
            user.password_hash = password_hash;
            Ok::<_, AppError>(user.clone())
        })?;

        info!("Updated user {}", id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, UserService) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path().join("database.json")).unwrap());
        (dir, UserService::new(store))
    }

    #[test]
    fn test_create_and_authorize() {
        let (_dir, service) = setup();
        let user = service.create("a@b.com", "pw").unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@b.com");
        assert_ne!(user.password_hash, "pw");

        assert_eq!(service.authorize("a@b.com", "pw").unwrap(), 1);
        assert!(matches!(
            service.authorize("a@b.com", "wrong"),
            Err(AppError::AuthError(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            service.authorize("nobody@b.com", "pw"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_email() {
        let (_dir, service) = setup();
        service.create("a@b.com", "pw").unwrap();
        assert!(matches!(service.create("a@b.com", "other"), Err(AppError::Conflict(_))));

        let second = service.create("c@d.com", "pw").unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_empty_credentials() {
        let (_dir, service) = setup();
        assert!(matches!(service.create("", "pw"), Err(AppError::ValidationError(_))));
        assert!(matches!(service.create("a@b.com", ""), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_update() {
        let (_dir, service) = setup();
        let user = service.create("a@b.com", "pw").unwrap();

        let updated = service.update(user.id, "new@b.com", "newpw").unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, "new@b.com");

        assert_eq!(service.authorize("new@b.com", "newpw").unwrap(), user.id);
        assert!(service.authorize("new@b.com", "pw").is_err());
        assert!(matches!(service.authorize("a@b.com", "pw"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_unknown_user() {
        let (_dir, service) = setup();
        assert!(matches!(
            service.update(99, "x@y.z", "pw"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_does_not_recheck_email() {
        let (_dir, service) = setup();
        service.create("a@b.com", "pw").unwrap();
        let second = service.create("c@d.com", "pw").unwrap();

        // Taking another account's email is currently allowed
        assert!(service.update(second.id, "a@b.com", "pw").is_ok());
    }
}
