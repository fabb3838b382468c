//! Sales reporting business logic.
//!
//! Dashboard totals, the per-bill sales report, and its CSV export. All
//! functions are framework-agnostic and return structured data that the
//! web layer formats. Tax shown per bill is derived from the snapshotted
//! subtotal and rate with the shared rounding rule, so report, confirmation,
//! and checkout always agree to the cent.

use crate::{
    core::pricing,
    entities::{Bill, BillLineItem, User, bill},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;

/// Store-wide totals for the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Number of committed bills
    pub order_count: u64,
    /// Sum of every bill's grand total
    pub total_revenue: Decimal,
    /// Number of potions sold across all bills
    pub items_sold: u64,
}

/// One bill in the sales report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReportRow {
    /// The committed bill
    pub bill_id: i64,
    /// Calendar date of the sale
    pub sales_date: NaiveDate,
    /// Wall-clock time of the sale
    pub sales_time: NaiveTime,
    /// Login name of the buyer
    pub username: String,
    /// Display name of the buyer
    pub name: String,
    /// Number of potions on the bill
    pub item_count: u64,
    /// Snapshotted subtotal
    pub subtotal: Decimal,
    /// Tax derived from the snapshotted subtotal and rate
    pub tax: Decimal,
    /// Snapshotted shipping cost
    pub shipping_cost: Decimal,
    /// Snapshotted grand total
    pub total: Decimal,
}

/// Computes the dashboard totals across every committed order.
pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardStats> {
    let order_count = Bill::find().count(db).await?;
    let bills = Bill::find().all(db).await?;
    let total_revenue: Decimal = bills.iter().map(|b| b.total).sum();
    let items_sold = BillLineItem::find().count(db).await?;

    Ok(DashboardStats {
        order_count,
        total_revenue,
        items_sold,
    })
}

/// Builds the sales report, newest bill first.
pub async fn sales_report(db: &DatabaseConnection) -> Result<Vec<SalesReportRow>> {
    let bills = Bill::find()
        .find_also_related(User)
        .order_by_desc(bill::Column::SalesDate)
        .order_by_desc(bill::Column::SalesTime)
        .all(db)
        .await?;

    let mut line_counts: HashMap<i64, u64> = HashMap::new();
    for line in BillLineItem::find().all(db).await? {
        *line_counts.entry(line.bill_id).or_insert(0) += 1;
    }

    let rows = bills
        .into_iter()
        .map(|(record, buyer)| {
            let (username, name) = buyer.map_or_else(
                || ("unknown".to_string(), String::new()),
                |account| (account.username, account.name),
            );
            SalesReportRow {
                bill_id: record.id,
                sales_date: record.sales_date,
                sales_time: record.sales_time,
                username,
                name,
                item_count: line_counts.get(&record.id).copied().unwrap_or(0),
                subtotal: record.subtotal,
                tax: pricing::round2(record.subtotal * record.tax_rate),
                shipping_cost: record.shipping_cost,
                total: record.total,
            }
        })
        .collect();

    Ok(rows)
}

/// Renders the sales report as CSV with a header row.
pub async fn sales_report_csv(db: &DatabaseConnection) -> Result<String> {
    let rows = sales_report(db).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "BillID", "Date", "Time", "Username", "Name", "Items", "Subtotal", "Tax", "Shipping",
            "Total",
        ])
        .map_err(csv_error)?;
    for row in &rows {
        writer
            .write_record([
                row.bill_id.to_string(),
                row.sales_date.to_string(),
                row.sales_time.format("%H:%M:%S").to_string(),
                row.username.clone(),
                row.name.clone(),
                row.item_count.to_string(),
                row.subtotal.to_string(),
                row.tax.to_string(),
                row.shipping_cost.to_string(),
                row.total.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Export {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::Export {
        message: e.to_string(),
    })
}

fn csv_error(e: csv::Error) -> Error {
    Error::Export {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_dashboard_empty_store() -> Result<()> {
        let db = setup_test_db().await?;

        let stats = dashboard(&db).await?;
        assert_eq!(
            stats,
            DashboardStats {
                order_count: 0,
                total_revenue: Decimal::ZERO,
                items_sold: 0,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_totals_after_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_user(&db, "ryn").await?;
        let second = create_test_user(&db, "mara").await?;
        let shipping = create_test_shipping_option(&db, "Standard", 499).await?;
        let elixir = create_test_item(&db, "Amber Elixir", 1999).await?;
        let tonic = create_test_item(&db, "Moonlit Tonic", 500).await?;
        let philter = create_test_item(&db, "Gloom Philter", 800).await?;

        crate::core::cart::add_to_cart(&db, first.id, elixir.id).await?;
        crate::core::cart::add_to_cart(&db, first.id, tonic.id).await?;
        commit_test_order(&db, first.id, shipping.id).await?;

        crate::core::cart::add_to_cart(&db, second.id, philter.id).await?;
        commit_test_order(&db, second.id, shipping.id).await?;

        let stats = dashboard(&db).await?;
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.items_sold, 3);
        // 31.48 for the first order, 13.47 for the second
        assert_eq!(stats.total_revenue, Decimal::new(4495, 2));

        Ok(())
    }

    #[tokio::test]
    async fn test_sales_report_rows_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_user(&db, "ryn").await?;
        let second = create_test_user(&db, "mara").await?;
        let shipping = create_test_shipping_option(&db, "Standard", 499).await?;
        let elixir = create_test_item(&db, "Amber Elixir", 1999).await?;
        let tonic = create_test_item(&db, "Moonlit Tonic", 500).await?;
        let philter = create_test_item(&db, "Gloom Philter", 800).await?;

        crate::core::cart::add_to_cart(&db, first.id, elixir.id).await?;
        crate::core::cart::add_to_cart(&db, first.id, tonic.id).await?;
        commit_test_order(&db, first.id, shipping.id).await?;

        crate::core::cart::add_to_cart(&db, second.id, philter.id).await?;
        commit_test_order(&db, second.id, shipping.id).await?;

        let rows = sales_report(&db).await?;
        assert_eq!(rows.len(), 2);

        // The later order leads
        assert_eq!(rows[0].username, "mara");
        assert_eq!(rows[0].item_count, 1);
        assert_eq!(rows[0].subtotal, Decimal::new(800, 2));
        assert_eq!(rows[0].tax, Decimal::new(48, 2));
        assert_eq!(rows[0].shipping_cost, Decimal::new(499, 2));
        assert_eq!(rows[0].total, Decimal::new(1347, 2));

        assert_eq!(rows[1].username, "ryn");
        assert_eq!(rows[1].item_count, 2);
        assert_eq!(rows[1].total, Decimal::new(3148, 2));

        Ok(())
    }

    #[tokio::test]
    async fn test_sales_report_csv_shape() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ryn").await?;
        let shipping = create_test_shipping_option(&db, "Standard", 499).await?;
        let elixir = create_test_item(&db, "Amber Elixir", 1999).await?;
        crate::core::cart::add_to_cart(&db, user.id, elixir.id).await?;
        let bill_id = commit_test_order(&db, user.id, shipping.id).await?;

        let csv_text = sales_report_csv(&db).await?;
        let lines: Vec<&str> = csv_text.trim_end().lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "BillID,Date,Time,Username,Name,Items,Subtotal,Tax,Shipping,Total"
        );
        assert!(lines[1].starts_with(&format!("{bill_id},")));
        assert!(lines[1].ends_with(",19.99,1.20,4.99,26.18"));

        Ok(())
    }

    #[tokio::test]
    async fn test_sales_report_csv_empty_store() -> Result<()> {
        let db = setup_test_db().await?;

        let csv_text = sales_report_csv(&db).await?;
        let lines: Vec<&str> = csv_text.trim_end().lines().collect();
        assert_eq!(lines.len(), 1);

        Ok(())
    }
}
