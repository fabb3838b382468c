//! Catalog business logic - The storefront's view of the inventory.
//!
//! Shoppers only ever see unsold potions; admin listings include sold ones so
//! past sales stay visible. Search matches name or description as a
//! case-insensitive substring and composes with the category filter. All
//! functions are async and return Result types for error handling.

use crate::{
    entities::{CartEntry, InventoryItem, cart_entry, inventory_item},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Retrieves all unsold potions, optionally narrowed by a search term and a
/// category, ordered alphabetically by name.
///
/// A blank or whitespace-only term or category is treated the same as an
/// absent one, so the storefront can pass raw query input straight through.
pub async fn list_available(
    db: &DatabaseConnection,
    search: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<inventory_item::Model>> {
    let mut query = InventoryItem::find().filter(inventory_item::Column::IsSold.eq(false));

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(inventory_item::Column::Name.contains(term))
                .add(inventory_item::Column::Description.contains(term)),
        );
    }

    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        query = query.filter(inventory_item::Column::Category.eq(category));
    }

    query
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the categories that currently have unsold potions, sorted and
/// deduplicated, for the storefront's filter control.
pub async fn distinct_categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    InventoryItem::find()
        .select_only()
        .column(inventory_item::Column::Category)
        .filter(inventory_item::Column::IsSold.eq(false))
        .distinct()
        .order_by_asc(inventory_item::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a potion by its unique ID, sold or not, returning None if it does
/// not exist.
pub async fn get_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<Option<inventory_item::Model>> {
    InventoryItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every potion including sold ones, ordered alphabetically by
/// name. Used by the admin inventory screen.
pub async fn list_all_items(db: &DatabaseConnection) -> Result<Vec<inventory_item::Model>> {
    InventoryItem::find()
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a new potion to the inventory, performing input validation.
///
/// The name must be non-empty after trimming and the cost strictly positive.
/// New potions always start unsold.
pub async fn add_item(
    db: &DatabaseConnection,
    name: String,
    category: String,
    description: String,
    cost: Decimal,
    photo: String,
) -> Result<inventory_item::Model> {
    if name.trim().is_empty() || cost <= Decimal::ZERO {
        return Err(Error::Validation {
            message: "A name and a positive cost are required".to_string(),
        });
    }

    let item = inventory_item::ActiveModel {
        name: Set(name.trim().to_string()),
        category: Set(category.trim().to_string()),
        description: Set(description),
        cost: Set(cost),
        photo: Set(photo),
        is_sold: Set(false),
        ..Default::default()
    };

    let result = item.insert(db).await?;
    Ok(result)
}

/// Deletes an unsold potion and pulls it out of any cart holding it.
///
/// Sold potions cannot be deleted: their bill line still references them and
/// removing the row would leave the order history dangling.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let item = InventoryItem::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?;

    if item.is_sold {
        return Err(Error::ItemAlreadySold { name: item.name });
    }

    CartEntry::delete_many()
        .filter(cart_entry::Column::ItemId.eq(item_id))
        .exec(&txn)
        .await?;

    item.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_list_available_orders_by_name() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_item(&db, "Witchbane Draught", 1299).await?;
        create_test_item(&db, "Amber Elixir", 1999).await?;
        create_test_item(&db, "Moonlit Tonic", 550).await?;

        let items = list_available(&db, None, None).await?;
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Amber Elixir", "Moonlit Tonic", "Witchbane Draught"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_excludes_sold() -> Result<()> {
        let db = setup_test_db().await?;

        let kept = create_test_item(&db, "Amber Elixir", 1999).await?;
        let sold = create_test_item(&db, "Moonlit Tonic", 550).await?;
        mark_sold_directly(&db, sold.id).await?;

        let items = list_available(&db, None, None).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, kept.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_search_matches_name_or_description() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_item(&db, "Dragonfire Tonic", 2500).await?;
        add_item(
            &db,
            "Quiet Draught".to_string(),
            "Calming".to_string(),
            "Dregs of a dragon's dream".to_string(),
            Decimal::new(900, 2),
            "quiet.png".to_string(),
        )
        .await?;
        create_test_item(&db, "Amber Elixir", 1999).await?;

        // Matches the first by name and the second by description, case-insensitively
        let items = list_available(&db, Some("dragon"), None).await?;
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Dragonfire Tonic", "Quiet Draught"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_category_filter_composes_with_search() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_item_in_category(&db, "Amber Elixir", 1999, "Healing").await?;
        create_test_item_in_category(&db, "Amber Tonic", 1500, "Strength").await?;
        create_test_item_in_category(&db, "Moonlit Tonic", 550, "Strength").await?;

        let items = list_available(&db, Some("amber"), Some("Strength")).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Amber Tonic");

        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_blank_filters_are_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_item(&db, "Amber Elixir", 1999).await?;

        let items = list_available(&db, Some("   "), Some("")).await?;
        assert_eq!(items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_distinct_categories_sorted_and_deduped() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_item_in_category(&db, "Amber Elixir", 1999, "Healing").await?;
        create_test_item_in_category(&db, "Moonlit Tonic", 550, "Strength").await?;
        create_test_item_in_category(&db, "Witchbane Draught", 1299, "Healing").await?;
        let sold = create_test_item_in_category(&db, "Gloom Philter", 800, "Cursed").await?;
        mark_sold_directly(&db, sold.id).await?;

        let categories = distinct_categories(&db).await?;
        assert_eq!(categories, vec!["Healing", "Strength"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "Amber Elixir", 1999).await?;

        let found = get_item(&db, item.id).await?;
        assert_eq!(found, Some(item));

        let missing = get_item(&db, 999).await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_all_items_includes_sold() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_item(&db, "Amber Elixir", 1999).await?;
        let sold = create_test_item(&db, "Moonlit Tonic", 550).await?;
        mark_sold_directly(&db, sold.id).await?;

        let items = list_all_items(&db).await?;
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.is_sold));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = add_item(
            &db,
            "   ".to_string(),
            "Healing".to_string(),
            String::new(),
            Decimal::new(1999, 2),
            String::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = add_item(
            &db,
            "Amber Elixir".to_string(),
            "Healing".to_string(),
            String::new(),
            Decimal::ZERO,
            String::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = add_item(
            &db,
            "Amber Elixir".to_string(),
            "Healing".to_string(),
            String::new(),
            Decimal::new(-100, 2),
            String::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_trims_name() -> Result<()> {
        let db = setup_test_db().await?;

        let item = add_item(
            &db,
            "  Amber Elixir  ".to_string(),
            "Healing".to_string(),
            "Restores vigor".to_string(),
            Decimal::new(1999, 2),
            "amber.png".to_string(),
        )
        .await?;

        assert_eq!(item.name, "Amber Elixir");
        assert_eq!(item.cost, Decimal::new(1999, 2));
        assert!(!item.is_sold);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_item_also_clears_carts() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ryn").await?;
        let item = create_test_item(&db, "Amber Elixir", 1999).await?;
        let other = create_test_item(&db, "Moonlit Tonic", 550).await?;
        crate::core::cart::add_to_cart(&db, user.id, item.id).await?;
        crate::core::cart::add_to_cart(&db, user.id, other.id).await?;

        delete_item(&db, item.id).await?;

        assert!(get_item(&db, item.id).await?.is_none());
        let cart = crate::core::cart::get_cart(&db, user.id).await?;
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].item_id, other.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_item_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_item(&db, 42).await;
        assert!(matches!(
            result,
            Err(Error::ItemNotFound { item_id: 42 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_item_sold_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "Amber Elixir", 1999).await?;
        mark_sold_directly(&db, item.id).await?;

        let result = delete_item(&db, item.id).await;
        assert!(matches!(result, Err(Error::ItemAlreadySold { .. })));
        assert!(get_item(&db, item.id).await?.is_some());

        Ok(())
    }
}
