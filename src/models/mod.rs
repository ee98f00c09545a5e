//! Data models for the merchant console.
//!
//! This module contains the data structures shared between the session
//! coordinator and the console views:
//!
//! - `Identity`: the resolved seller account profile
//! - `Merchant`: the tenant/store record, with tax and shipping rates
//! - `Category`, `Product`, `Discount`: catalog records
//! - `Customer`: storefront customer records
//! - `Order`, `OrderItem`, `OrderStatus`: order review data

pub mod catalog;
pub mod customer;
pub mod identity;
pub mod merchant;
pub mod order;

pub use catalog::{Category, Discount, Product};
pub use customer::Customer;
pub use identity::Identity;
pub use merchant::{Merchant, ShippingRate, TaxRate};
pub use order::{Order, OrderItem, OrderStatus, ShippingDetails};
