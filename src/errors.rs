//! Error types shared across the crate.
//!
//! Storefront operations return [`Error`] for every failure a caller can act
//! on. Messages on user-facing variants are written to be shown verbatim to
//! shoppers; storage and export failures carry their source instead and are
//! summarized before leaving the API boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment was unusable.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Caller-supplied input failed validation.
    #[error("{message}")]
    Validation { message: String },

    /// The operation requires a logged-in user.
    #[error("Please log in to continue")]
    AuthRequired,

    /// The operation requires an administrator.
    #[error("Admin access required")]
    Forbidden,

    /// Username/password pair did not match a stored user.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Registration collided with an existing username.
    #[error("The username '{username}' is already taken")]
    UsernameTaken { username: String },

    /// The referenced potion does not exist.
    #[error("That potion no longer exists")]
    ItemNotFound { item_id: i64 },

    /// The potion was sold, either before this operation or by a
    /// concurrently committed order.
    #[error("'{name}' has already been sold and is no longer available")]
    ItemAlreadySold { name: String },

    /// The potion is already in the shopper's cart.
    #[error("'{name}' is already in your cart")]
    DuplicateCartEntry { name: String },

    /// The referenced shipping option does not exist.
    #[error("Invalid shipping option")]
    ShippingOptionNotFound { shipping_id: i64 },

    /// No bill with this id is visible to the caller.
    #[error("Order not found")]
    BillNotFound { bill_id: i64 },

    /// The referenced user does not exist.
    #[error("User not found")]
    UserNotFound { user_id: i64 },

    /// Checkout was entered with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The cart was emptied between entering checkout and committing
    /// the order.
    #[error("Your cart was emptied before payment completed")]
    CartEmptiedConcurrently,

    /// Report rows could not be rendered as CSV.
    #[error("Report export failed: {message}")]
    Export { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
