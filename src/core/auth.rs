//! Authentication and account business logic.
//!
//! Registration, login, and token sessions. Passwords are stored as SHA-256
//! digests; sessions are random UUID tokens handed to the client and resolved
//! back to an [`Identity`] on every authenticated request. Core operations
//! never look at ambient request state, they take the resolved identity's
//! user id explicitly.

use crate::{
    entities::{Session, User, UserRole, session, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A resolved login: who is making this request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The authenticated user
    pub user_id: i64,
    /// Their login name
    pub username: String,
    /// Shopper or administrator
    pub role: UserRole,
}

impl Identity {
    /// True for administrators
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Account data safe to hand out; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    /// Account id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Shopper or administrator
    pub role: UserRole,
}

impl From<user::Model> for UserView {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            email: model.email,
            role: model.role,
        }
    }
}

/// The token and identity handed back by a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// Session token for the client to present on later requests
    pub token: String,
    /// Who just logged in
    pub identity: Identity,
}

/// Creates a new shopper account.
///
/// Email and password are required; a blank username falls back to the email
/// address. New accounts always start as plain shoppers.
pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    name: &str,
    email: &str,
) -> Result<UserView> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Error::Validation {
            message: "Email and password are required".to_string(),
        });
    }

    let username = {
        let trimmed = username.trim();
        if trimmed.is_empty() { email } else { trimmed }
    };

    let taken = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::UsernameTaken {
            username: username.to_string(),
        });
    }

    let account = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)),
        name: Set(name.trim().to_string()),
        email: Set(email.to_string()),
        role: Set(UserRole::User),
        ..Default::default()
    };

    match account.insert(db).await {
        Ok(model) => Ok(model.into()),
        // The unique username column catches registrations racing the pre-check
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(Error::UsernameTaken {
                username: username.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Verifies credentials and opens a new session.
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller; both come back as `InvalidCredentials`.
pub async fn login(db: &DatabaseConnection, username: &str, password: &str) -> Result<LoginSession> {
    let account = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if account.password_hash != hash_password(password) {
        return Err(Error::InvalidCredentials);
    }

    let token = Uuid::new_v4().to_string();
    let new_session = session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(account.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_session.insert(db).await?;

    Ok(LoginSession {
        token,
        identity: Identity {
            user_id: account.id,
            username: account.username,
            role: account.role,
        },
    })
}

/// Ends the session behind a token. Unknown tokens are silently ignored.
pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// Resolves a session token to the identity it authenticates.
pub async fn resolve_session(db: &DatabaseConnection, token: &str) -> Result<Identity> {
    let found = Session::find()
        .filter(session::Column::Token.eq(token))
        .find_also_related(User)
        .one(db)
        .await?;

    match found {
        Some((_, Some(account))) => Ok(Identity {
            user_id: account.id,
            username: account.username,
            role: account.role,
        }),
        _ => Err(Error::AuthRequired),
    }
}

/// Lists every account for the admin user screen, oldest first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserView>> {
    let accounts = User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    Ok(accounts.into_iter().map(Into::into).collect())
}

/// Grants an account the administrator role.
pub async fn promote_user(db: &DatabaseConnection, user_id: i64) -> Result<UserView> {
    let account = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;

    let mut active: user::ActiveModel = account.into();
    active.role = Set(UserRole::Admin);
    let updated = active.update(db).await?;
    Ok(updated.into())
}

/// Hex-encoded SHA-256 digest of the password
fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
