//! Checkout business logic - Carries a cart through review, address entry,
//! and the atomic order commit.
//!
//! The flow is three steps. Review shows the cart priced with the first
//! shipping option. Address entry validates the destination and hands back a
//! `PaymentPrompt` holding the priced order plus a fresh idempotency token.
//! Payment submission checks the card fields are present (nothing more; no
//! card data is ever stored) and then commits.
//!
//! The commit itself runs inside one database transaction: re-read the cart,
//! price it, insert the bill and its line items, flip each potion to sold,
//! and clear the cart. Selling uses a compare-and-set update so a potion
//! carted by two shoppers is sold exactly once; the loser's whole commit
//! rolls back. A per-shopper [`CommitGate`] plus the unique idempotency
//! token turn a double submission into a replay of the first bill instead
//! of a second charge.

use crate::{
    core::{cart, cart::CartView, pricing},
    entities::{
        Bill, CartEntry, InventoryItem, ShippingOption, bill, bill_line_item, cart_entry,
        inventory_item, shipping_option,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;
use uuid::Uuid;

/// Serializes order commits per shopper.
///
/// The commit transaction already guarantees storage consistency; the gate
/// keeps two in-flight submissions from the same shopper ordered, so the
/// second lands on the idempotency check instead of racing the first.
#[derive(Debug, Default)]
pub struct CommitGate {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl CommitGate {
    /// Creates an empty gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the per-shopper lock, creating it on first use
    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Raw address step input; blank fields are validation errors, not absences
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    /// Delivery street address
    pub street: String,
    /// Delivery city
    pub city: String,
    /// Delivery state
    pub state: String,
    /// Delivery postal code
    pub zip: String,
    /// Chosen shipping option id, still unparsed
    pub shipping_id: String,
}

/// Raw payment step input, echoing the address fields plus the token the
/// address step issued
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    /// Delivery street address
    pub street: String,
    /// Delivery city
    pub city: String,
    /// Delivery state
    pub state: String,
    /// Delivery postal code
    pub zip: String,
    /// Chosen shipping option id, still unparsed
    pub shipping_id: String,
    /// Token issued by the address step
    pub idempotency_token: String,
    /// Card number; checked for presence only, never stored
    pub card_number: String,
    /// Card expiry; checked for presence only, never stored
    pub exp_date: String,
    /// Card verification code; checked for presence only, never stored
    pub cvv: String,
}

/// A validated, trimmed delivery address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    /// Delivery street address
    pub street: String,
    /// Delivery city
    pub city: String,
    /// Delivery state
    pub state: String,
    /// Delivery postal code
    pub zip: String,
}

/// The review step: the cart priced with the first shipping option
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReview {
    /// The cart being checked out
    pub cart: CartView,
    /// Every delivery method on offer
    pub shipping_options: Vec<shipping_option::Model>,
    /// Option preselected for the preview, if any exist
    pub default_shipping_id: Option<i64>,
    /// Tax on the cart subtotal
    pub tax: Decimal,
    /// Grand total under the preselected option
    pub preview_total: Decimal,
}

/// The payment step: a fully priced order waiting for card entry
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPrompt {
    /// The cart being checked out
    pub cart: CartView,
    /// Tax on the cart subtotal
    pub tax: Decimal,
    /// Cost of the chosen shipping option
    pub shipping_cost: Decimal,
    /// Grand total the shopper will be charged
    pub total: Decimal,
    /// Validated delivery address
    pub address: ShippingAddress,
    /// Chosen shipping option
    pub shipping_id: i64,
    /// Token that makes the payment submission replayable
    pub idempotency_token: String,
}

/// What a payment submission came to
#[derive(Debug)]
pub enum PaymentOutcome {
    /// The order committed, or an earlier submission with this token already
    /// had
    Committed {
        /// The committed bill
        bill_id: i64,
    },
    /// Card fields were missing; retry from this prompt, same token
    Incomplete {
        /// Priced order state to re-render
        prompt: PaymentPrompt,
    },
}

/// Lists every shipping option, cheapest-seeded first.
pub async fn shipping_options(db: &DatabaseConnection) -> Result<Vec<shipping_option::Model>> {
    ShippingOption::find()
        .order_by_asc(shipping_option::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a shipping option by id on a connection or inside a transaction.
pub async fn shipping_option_by_id<C>(
    db: &C,
    shipping_id: i64,
) -> Result<Option<shipping_option::Model>>
where
    C: ConnectionTrait,
{
    ShippingOption::find_by_id(shipping_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Builds the review step for a shopper's cart.
///
/// The preview is priced with the first shipping option so the shopper sees
/// a realistic total before picking one. Fails with `EmptyCart` when there
/// is nothing to check out.
pub async fn review(
    db: &DatabaseConnection,
    user_id: i64,
    tax_rate: Decimal,
) -> Result<CheckoutReview> {
    let cart = cart::get_cart(db, user_id).await?;
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let options = shipping_options(db).await?;
    let preview_shipping = options.first().map_or(Decimal::ZERO, |option| option.cost);
    let default_shipping_id = options.first().map(|option| option.id);
    let totals = pricing::compute_totals(cart.subtotal, preview_shipping, tax_rate);

    Ok(CheckoutReview {
        cart,
        shipping_options: options,
        default_shipping_id,
        tax: totals.tax,
        preview_total: totals.total,
    })
}

/// Validates the address step and prices the order under the chosen
/// shipping option.
///
/// On success the returned prompt carries a freshly minted idempotency
/// token; the payment step must echo it back.
pub async fn enter_address(
    db: &DatabaseConnection,
    user_id: i64,
    form: &AddressForm,
    tax_rate: Decimal,
) -> Result<PaymentPrompt> {
    let cart = cart::get_cart(db, user_id).await?;
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let (address, shipping_id) = validate_address_form(
        &form.street,
        &form.city,
        &form.state,
        &form.zip,
        &form.shipping_id,
    )?;
    let shipping = shipping_option_by_id(db, shipping_id)
        .await?
        .ok_or(Error::ShippingOptionNotFound { shipping_id })?;

    let totals = pricing::compute_totals(cart.subtotal, shipping.cost, tax_rate);

    Ok(PaymentPrompt {
        cart,
        tax: totals.tax,
        shipping_cost: shipping.cost,
        total: totals.total,
        address,
        shipping_id: shipping.id,
        idempotency_token: Uuid::new_v4().to_string(),
    })
}

/// Handles a payment submission end to end.
///
/// Replays of an already committed token return `Committed` with the
/// original bill before anything else is looked at, so retrying a timed-out
/// submission is always safe. Missing card fields produce `Incomplete` with
/// the prompt re-priced from the current cart and the same token.
pub async fn submit_payment(
    db: &DatabaseConnection,
    gate: &CommitGate,
    user_id: i64,
    form: &PaymentForm,
    tax_rate: Decimal,
) -> Result<PaymentOutcome> {
    let (address, shipping_id) = validate_address_form(
        &form.street,
        &form.city,
        &form.state,
        &form.zip,
        &form.shipping_id,
    )?;

    let token = form.idempotency_token.trim();
    if token.is_empty() {
        return Err(Error::Validation {
            message: "Missing checkout token, please start checkout again".to_string(),
        });
    }

    if let Some(bill) = find_bill_by_token(db, user_id, token).await? {
        return Ok(PaymentOutcome::Committed { bill_id: bill.id });
    }

    let cart = cart::get_cart(db, user_id).await?;
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let shipping = shipping_option_by_id(db, shipping_id)
        .await?
        .ok_or(Error::ShippingOptionNotFound { shipping_id })?;
    let totals = pricing::compute_totals(cart.subtotal, shipping.cost, tax_rate);

    let card_missing = form.card_number.trim().is_empty()
        || form.exp_date.trim().is_empty()
        || form.cvv.trim().is_empty();
    if card_missing {
        return Ok(PaymentOutcome::Incomplete {
            prompt: PaymentPrompt {
                cart,
                tax: totals.tax,
                shipping_cost: shipping.cost,
                total: totals.total,
                address,
                shipping_id: shipping.id,
                idempotency_token: token.to_string(),
            },
        });
    }

    let bill_id = commit_order(db, gate, user_id, &address, shipping.id, token, tax_rate).await?;
    Ok(PaymentOutcome::Committed { bill_id })
}

/// Commits one order atomically and returns the bill id.
///
/// Under the shopper's gate lock, and inside a single transaction: the cart
/// is re-read, the bill and its line items inserted, every potion flipped to
/// sold via compare-and-set, and the cart cleared. Any failure rolls the
/// whole commit back, leaving the cart and inventory untouched.
///
/// # Errors
/// * `CartEmptiedConcurrently` when the re-read finds nothing to sell
/// * `ItemAlreadySold` when another order got one of the potions first
/// * `ShippingOptionNotFound` when the chosen option vanished
pub async fn commit_order(
    db: &DatabaseConnection,
    gate: &CommitGate,
    user_id: i64,
    address: &ShippingAddress,
    shipping_id: i64,
    idempotency_token: &str,
    tax_rate: Decimal,
) -> Result<i64> {
    let _guard = gate.acquire(user_id).await;

    // Re-checked here because only the gate holder can trust the answer
    if let Some(bill) = find_bill_by_token(db, user_id, idempotency_token).await? {
        info!(
            bill_id = bill.id,
            user_id, "replayed checkout token, returning committed bill"
        );
        return Ok(bill.id);
    }

    let txn = db.begin().await?;

    let cart = cart::get_cart(&txn, user_id).await?;
    if cart.is_empty() {
        return Err(Error::CartEmptiedConcurrently);
    }

    let shipping = shipping_option_by_id(&txn, shipping_id)
        .await?
        .ok_or(Error::ShippingOptionNotFound { shipping_id })?;
    let totals = pricing::compute_totals(cart.subtotal, shipping.cost, tax_rate);

    let now = Utc::now().naive_utc();
    let bill = bill::ActiveModel {
        user_id: Set(user_id),
        sales_date: Set(now.date()),
        sales_time: Set(now.time()),
        tax_rate: Set(tax_rate),
        subtotal: Set(cart.subtotal),
        shipping_cost: Set(shipping.cost),
        total: Set(totals.total),
        street: Set(address.street.clone()),
        city: Set(address.city.clone()),
        state: Set(address.state.clone()),
        zip: Set(address.zip.clone()),
        shipping_id: Set(shipping.id),
        idempotency_token: Set(idempotency_token.to_string()),
        ..Default::default()
    };

    let bill = match bill.insert(&txn).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // The token is already on a committed bill; surface that bill if
            // it belongs to this shopper
            drop(txn);
            return match find_bill_by_token(db, user_id, idempotency_token).await? {
                Some(existing) => Ok(existing.id),
                None => Err(Error::Validation {
                    message: "Checkout token was already used".to_string(),
                }),
            };
        }
        Err(e) => return Err(e.into()),
    };

    for line in &cart.lines {
        mark_item_sold(&txn, line.item_id, &line.name).await?;

        let line_item = bill_line_item::ActiveModel {
            bill_id: Set(bill.id),
            item_id: Set(line.item_id),
            ..Default::default()
        };
        line_item.insert(&txn).await.map_err(|e| match e.sql_err() {
            // Unique item_id is the storage-level guarantee of one sale per potion
            Some(SqlErr::UniqueConstraintViolation(_)) => Error::ItemAlreadySold {
                name: line.name.clone(),
            },
            _ => Error::Database(e),
        })?;
    }

    CartEntry::delete_many()
        .filter(cart_entry::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        bill_id = bill.id,
        user_id,
        items = cart.lines.len(),
        total = %bill.total,
        "order committed"
    );
    Ok(bill.id)
}

/// Finds the bill a (shopper, token) pair already committed, if any.
async fn find_bill_by_token(
    db: &DatabaseConnection,
    user_id: i64,
    token: &str,
) -> Result<Option<bill::Model>> {
    Bill::find()
        .filter(bill::Column::UserId.eq(user_id))
        .filter(bill::Column::IdempotencyToken.eq(token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Trims and checks the address fields, and parses the shipping id.
fn validate_address_form(
    street: &str,
    city: &str,
    state: &str,
    zip: &str,
    shipping_id: &str,
) -> Result<(ShippingAddress, i64)> {
    let street = street.trim();
    let city = city.trim();
    let state = state.trim();
    let zip = zip.trim();
    let shipping_id = shipping_id.trim();

    if street.is_empty()
        || city.is_empty()
        || state.is_empty()
        || zip.is_empty()
        || shipping_id.is_empty()
    {
        return Err(Error::Validation {
            message: "Please fill out all address and shipping fields".to_string(),
        });
    }

    let shipping_id: i64 = shipping_id.parse().map_err(|_| Error::Validation {
        message: "Invalid shipping option".to_string(),
    })?;

    Ok((
        ShippingAddress {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: zip.to_string(),
        },
        shipping_id,
    ))
}

/// Flips `is_sold` only while it is still false; zero rows updated means a
/// concurrent order got the potion first.
async fn mark_item_sold<C>(db: &C, item_id: i64, name: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = InventoryItem::update_many()
        .col_expr(inventory_item::Column::IsSold, Expr::value(true))
        .filter(inventory_item::Column::Id.eq(item_id))
        .filter(inventory_item::Column::IsSold.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        return Err(Error::ItemAlreadySold {
            name: name.to_string(),
        });
    }
    Ok(())
}
