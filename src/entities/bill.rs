//! Bill entity - The committed record of one checkout.
//!
//! A bill snapshots everything priced at commit time: the subtotal, the tax
//! rate in force, the chosen shipping cost, and the grand total, plus the
//! delivery address. The `idempotency_token` is unique so a retried payment
//! submission lands on the already committed bill instead of creating a
//! second one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bill database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    /// Unique identifier for the bill
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Shopper who placed the order
    pub user_id: i64,
    /// Calendar date of the sale
    pub sales_date: Date,
    /// Wall-clock time of the sale
    pub sales_time: Time,
    /// Tax rate applied at commit time (e.g., 0.06)
    #[sea_orm(column_type = "Decimal(Some((8, 4)))")]
    pub tax_rate: Decimal,
    /// Sum of the line item prices at commit time
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub subtotal: Decimal,
    /// Flat cost of the chosen shipping option at commit time
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub shipping_cost: Decimal,
    /// Grand total: subtotal + rounded tax + shipping
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total: Decimal,
    /// Delivery street address
    pub street: String,
    /// Delivery city
    pub city: String,
    /// Delivery state
    pub state: String,
    /// Delivery postal code
    pub zip: String,
    /// Chosen shipping option
    pub shipping_id: i64,
    /// Token issued at address entry; unique so payment retries are replays
    #[sea_orm(unique)]
    pub idempotency_token: String,
}

/// Defines relationships between Bill and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each bill belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each bill references one shipping option
    #[sea_orm(
        belongs_to = "super::shipping_option::Entity",
        from = "Column::ShippingId",
        to = "super::shipping_option::Column::Id"
    )]
    ShippingOption,
    /// One bill has many line items
    #[sea_orm(has_many = "super::bill_line_item::Entity")]
    BillLineItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::shipping_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingOption.def()
    }
}

impl Related<super::bill_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
