//! In-memory credential directory.
//!
//! The directory is the black-box credential issuer behind the API: it
//! registers accounts, verifies logins, and tracks revoked tokens. Accounts
//! are deliberately not part of the persisted sales schema.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use thiserror::Error;

use salesdesk_auth::{hash_password, verify_password, Role, UserAccount};
use salesdesk_core::UserId;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("validation failed: {field}: {message}")]
    Invalid { field: String, message: String },
}

impl DirectoryError {
    fn invalid(field: &str, message: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, UserAccount>>,
    revoked_tokens: RwLock<HashSet<String>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account. Emails are unique case-insensitively.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserAccount, DirectoryError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(DirectoryError::invalid("name", "name cannot be empty"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(DirectoryError::invalid("email", "email is not a valid address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DirectoryError::invalid(
                "password",
                "password must be at least 8 characters",
            ));
        }

        let mut users = self.users.write().unwrap();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(DirectoryError::DuplicateEmail);
        }

        let account = UserAccount::new(
            name.to_string(),
            email.to_string(),
            role,
            hash_password(password),
        );
        users.insert(account.id, account.clone());
        Ok(account)
    }

    /// Verify a login. The same error covers unknown emails and wrong
    /// passwords, so callers cannot probe which emails exist.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserAccount, DirectoryError> {
        let users = self.users.read().unwrap();
        users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .filter(|u| verify_password(password, &u.password_hash))
            .cloned()
            .ok_or(DirectoryError::InvalidCredentials)
    }

    pub fn get(&self, id: UserId) -> Option<UserAccount> {
        self.users.read().unwrap().get(&id).cloned()
    }

    /// Emails of every manager account, sorted for deterministic batches.
    pub fn manager_emails(&self) -> Vec<String> {
        let users = self.users.read().unwrap();
        let mut emails: Vec<String> = users
            .values()
            .filter(|u| u.role.is_manager())
            .map(|u| u.email.clone())
            .collect();
        emails.sort();
        emails
    }

    /// Invalidate a presented bearer token (logout).
    pub fn revoke_token(&self, token: &str) {
        self.revoked_tokens.write().unwrap().insert(token.to_string());
    }

    pub fn is_token_revoked(&self, token: &str) -> bool {
        self.revoked_tokens.read().unwrap().contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_authenticate_round_trips() {
        let directory = UserDirectory::new();
        let account = directory
            .register("Maria", "maria@example.com", "s3cret-pass", Role::Seller)
            .unwrap();

        let found = directory
            .authenticate("maria@example.com", "s3cret-pass")
            .unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(found.role, Role::Seller);
    }

    #[test]
    fn wrong_password_and_unknown_email_fail_the_same_way() {
        let directory = UserDirectory::new();
        directory
            .register("Maria", "maria@example.com", "s3cret-pass", Role::Seller)
            .unwrap();

        assert_eq!(
            directory.authenticate("maria@example.com", "wrong-pass"),
            Err(DirectoryError::InvalidCredentials)
        );
        assert_eq!(
            directory.authenticate("ghost@example.com", "s3cret-pass"),
            Err(DirectoryError::InvalidCredentials)
        );
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let directory = UserDirectory::new();
        directory
            .register("Maria", "maria@example.com", "s3cret-pass", Role::Seller)
            .unwrap();

        assert_eq!(
            directory.register("Other", "MARIA@example.com", "whatever-pass", Role::Seller),
            Err(DirectoryError::DuplicateEmail)
        );
    }

    #[test]
    fn short_password_is_rejected() {
        let directory = UserDirectory::new();
        assert!(matches!(
            directory.register("Maria", "maria@example.com", "short", Role::Seller),
            Err(DirectoryError::Invalid { ref field, .. }) if field == "password"
        ));
    }

    #[test]
    fn manager_emails_lists_only_managers_sorted() {
        let directory = UserDirectory::new();
        directory
            .register("Zoe", "zoe@example.com", "manager-pass", Role::Manager)
            .unwrap();
        directory
            .register("Ana", "ana@example.com", "manager-pass", Role::Manager)
            .unwrap();
        directory
            .register("Maria", "maria@example.com", "seller-pass", Role::Seller)
            .unwrap();

        assert_eq!(
            directory.manager_emails(),
            vec!["ana@example.com".to_string(), "zoe@example.com".to_string()]
        );
    }

    #[test]
    fn revoked_tokens_stay_revoked() {
        let directory = UserDirectory::new();
        assert!(!directory.is_token_revoked("tok"));
        directory.revoke_token("tok");
        assert!(directory.is_token_revoked("tok"));
    }
}
