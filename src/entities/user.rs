//! User entity - Represents a registered shopper or administrator.
//!
//! Passwords are stored as hex-encoded SHA-256 digests, never in plain text.
//! The `role` column decides access to the admin surface.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level attached to a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Regular shopper
    #[sea_orm(string_value = "User")]
    User,
    /// Store administrator
    #[sea_orm(string_value = "Admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the store
    #[sea_orm(unique)]
    pub username: String,
    /// Hex-encoded SHA-256 digest of the password
    pub password_hash: String,
    /// Display name shown on reports
    pub name: String,
    /// Contact email address
    pub email: String,
    /// Shopper or administrator
    pub role: UserRole,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many cart entries
    #[sea_orm(has_many = "super::cart_entry::Entity")]
    CartEntries,
    /// One user has many committed bills
    #[sea_orm(has_many = "super::bill::Entity")]
    Bills,
    /// One user has many login sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::cart_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartEntries.def()
    }
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
