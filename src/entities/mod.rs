//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod bill;
pub mod bill_line_item;
pub mod cart_entry;
pub mod inventory_item;
pub mod session;
pub mod shipping_option;
pub mod user;

// Re-export specific types to avoid conflicts
pub use bill::{Column as BillColumn, Entity as Bill, Model as BillModel};
pub use bill_line_item::{
    Column as BillLineItemColumn, Entity as BillLineItem, Model as BillLineItemModel,
};
pub use cart_entry::{Column as CartEntryColumn, Entity as CartEntry, Model as CartEntryModel};
pub use inventory_item::{
    Column as InventoryItemColumn, Entity as InventoryItem, Model as InventoryItemModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use shipping_option::{
    Column as ShippingOptionColumn, Entity as ShippingOption, Model as ShippingOptionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
