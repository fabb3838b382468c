//! Confirmation reader - Renders a committed bill back to its owner.
//!
//! Reads are snapshot-faithful: totals, tax rate, and the address come
//! straight off the bill row, so the page looks the same no matter how often
//! or how late it is reloaded. Only the owning shopper can read a bill;
//! anyone else gets the same answer as for a bill that does not exist.

use crate::{
    core::{checkout, pricing},
    entities::{Bill, BillLineItem, InventoryItem, bill, bill_line_item},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;

/// One potion on a committed bill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasedItem {
    /// Item name
    pub name: String,
    /// Item flavor text
    pub description: String,
    /// Item price
    pub price: Decimal,
}

/// Everything the confirmation page shows about one order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillView {
    /// The committed bill
    pub bill_id: i64,
    /// Calendar date of the sale
    pub sales_date: NaiveDate,
    /// Wall-clock time of the sale
    pub sales_time: NaiveTime,
    /// Snapshotted sum of the line prices
    pub subtotal: Decimal,
    /// Tax rate in force at commit time
    pub tax_rate: Decimal,
    /// Tax amount derived from the snapshotted subtotal and rate
    pub tax: Decimal,
    /// Snapshotted shipping cost
    pub shipping_cost: Decimal,
    /// Name of the shipping method, when it still exists
    pub shipping_type: Option<String>,
    /// Snapshotted grand total
    pub total: Decimal,
    /// Delivery street address
    pub street: String,
    /// Delivery city
    pub city: String,
    /// Delivery state
    pub state: String,
    /// Delivery postal code
    pub zip: String,
    /// The potions this order bought
    pub items: Vec<PurchasedItem>,
}

/// Loads the confirmation view for one of the shopper's own bills.
///
/// Fails with `BillNotFound` when the bill does not exist or belongs to a
/// different shopper; the two cases are deliberately indistinguishable.
pub async fn get_confirmation(
    db: &DatabaseConnection,
    user_id: i64,
    bill_id: i64,
) -> Result<BillView> {
    let bill = Bill::find_by_id(bill_id)
        .filter(bill::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::BillNotFound { bill_id })?;

    let shipping_type = checkout::shipping_option_by_id(db, bill.shipping_id)
        .await?
        .map(|option| option.ship_type);

    let rows = BillLineItem::find()
        .filter(bill_line_item::Column::BillId.eq(bill.id))
        .find_also_related(InventoryItem)
        .order_by_asc(bill_line_item::Column::Id)
        .all(db)
        .await?;

    let items: Vec<PurchasedItem> = rows
        .into_iter()
        .filter_map(|(_, item)| {
            item.map(|item| PurchasedItem {
                name: item.name,
                description: item.description,
                price: item.cost,
            })
        })
        .collect();

    let tax = pricing::round2(bill.subtotal * bill.tax_rate);

    Ok(BillView {
        bill_id: bill.id,
        sales_date: bill.sales_date,
        sales_time: bill.sales_time,
        subtotal: bill.subtotal,
        tax_rate: bill.tax_rate,
        tax,
        shipping_cost: bill.shipping_cost,
        shipping_type,
        total: bill.total,
        street: bill.street,
        city: bill.city,
        state: bill.state,
        zip: bill.zip,
        items,
    })
}
