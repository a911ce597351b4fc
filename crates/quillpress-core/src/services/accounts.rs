//! Author and administrator accounts: registration, login, profile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Administrator, Author, Principal, PrincipalKind, Role};
use crate::error::{DomainError, RepoError, ValidationErrors};
use crate::ports::{
    AdminRepository, AuthError, AuthorRepository, PasswordService, TokenService, TokenSubject,
};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_FIELD_LEN: usize = 255;

/// Account failures: either a credential problem or an ordinary domain error.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepoError> for AccountError {
    fn from(err: RepoError) -> Self {
        AccountError::Domain(err.into())
    }
}

/// Public profile of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub kind: PrincipalKind,
    pub created_at: DateTime<Utc>,
}

impl From<&Author> for Account {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.name.clone(),
            email: author.email.clone(),
            kind: PrincipalKind::Author,
            created_at: author.created_at,
        }
    }
}

impl From<&Administrator> for Account {
    fn from(admin: &Administrator) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
            kind: PrincipalKind::Admin,
            created_at: admin.created_at,
        }
    }
}

/// An issued bearer token and who it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub account: Account,
}

/// Registration input.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct AccountService {
    authors: Arc<dyn AuthorRepository>,
    admins: Arc<dyn AdminRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        admins: Arc<dyn AdminRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            authors,
            admins,
            passwords,
            tokens,
        }
    }

    /// Create a writer account and sign it in.
    pub async fn register(&self, input: Registration) -> Result<Session, AccountError> {
        let mut errors = ValidationErrors::new();
        let name = input.name.trim();
        let email = input.email.trim();

        if name.is_empty() {
            errors.add("name", "The name field is required.");
        } else if name.chars().count() > MAX_FIELD_LEN {
            errors.add("name", format!("The name may not be greater than {MAX_FIELD_LEN} characters."));
        }
        if email.is_empty() || !email.contains('@') || email.chars().count() > MAX_FIELD_LEN {
            errors.add("email", "The email must be a valid email address.");
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        errors.into_result()?;

        if self.authors.find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()).into());
        }

        let hash = self.passwords.hash(&input.password)?;
        let author = self
            .authors
            .insert(Author::new(name.to_string(), email.to_string(), hash))
            .await?;

        tracing::info!(author_id = %author.id, "Author registered");
        self.session(Account::from(&author), Role::Writer)
    }

    /// Sign in an author.
    pub async fn login_author(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let Some(author) = self.authors.find_by_email(email.trim()).await? else {
            self.passwords.verify_dummy(password);
            return Err(AuthError::InvalidCredentials.into());
        };
        self.check_password(password, &author.password_hash)?;

        self.session(Account::from(&author), Role::Writer)
    }

    /// Sign in an administrator.
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let Some(admin) = self.admins.find_by_email(email.trim()).await? else {
            self.passwords.verify_dummy(password);
            return Err(AuthError::InvalidCredentials.into());
        };
        self.check_password(password, &admin.password_hash)?;

        tracing::info!(admin_id = %admin.id, "Administrator signed in");
        self.session(Account::from(&admin), Role::Admin)
    }

    /// Profile of the signed-in principal.
    pub async fn me(&self, principal: &Principal) -> Result<Account, AccountError> {
        let id = principal.id();
        let account = match principal {
            Principal::Author(_) => self.authors.find_by_id(id).await?.map(|a| Account::from(&a)),
            Principal::Administrator(_) => self.admins.find_by_id(id).await?.map(|a| Account::from(&a)),
        };
        account.ok_or_else(|| AccountError::Auth(AuthError::InvalidToken("account no longer exists".to_string())))
    }

    /// Create the administrator account unless one already uses `email`.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_administrator(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, AccountError> {
        if self.admins.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        let hash = self.passwords.hash(password)?;
        let admin = self
            .admins
            .insert(Administrator::new(name.to_string(), email.to_string(), hash))
            .await?;
        tracing::info!(admin_id = %admin.id, "Bootstrap administrator created");
        Ok(true)
    }

    fn check_password(&self, password: &str, hash: &str) -> Result<(), AccountError> {
        if self.passwords.verify(password, hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    fn session(&self, account: Account, role: Role) -> Result<Session, AccountError> {
        let token = self.tokens.generate_token(&TokenSubject {
            user_id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            kind: account.kind,
            role,
        })?;

        Ok(Session {
            token,
            expires_in: self.tokens.expiration_seconds(),
            account,
        })
    }
}
