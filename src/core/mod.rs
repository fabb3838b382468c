pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod confirmation;
pub mod pricing;
pub mod report;
