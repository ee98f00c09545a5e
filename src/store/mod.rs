//! Shared view state for the console screens.
//!
//! Every screen reads and writes the same store: the Categories,
//! Products, Discounts, Customers and Orders lists each keep their
//! records plus an independent 1-based page cursor, and the Order
//! Detail screen keeps the currently selected order. The store does no
//! fetching and no validation - screens own their data loading and
//! simply park the results here so navigation keeps state.
//!
//! Cursors live only for the process lifetime; nothing here is
//! persisted.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{Category, Customer, Discount, Order, Product, ShippingRate, TaxRate};

/// Rows per page across the console's list screens.
pub const ITEMS_PER_PAGE: usize = 10;

#[derive(Debug)]
struct StoreState {
    categories: Vec<Category>,
    category_page: u32,
    products: Vec<Product>,
    product_page: u32,
    discounts: Vec<Discount>,
    discount_page: u32,
    customers: Vec<Customer>,
    customer_page: u32,
    orders: Vec<Order>,
    order_page: u32,
    order_detail: Option<Order>,
    tax_rates: Vec<TaxRate>,
    shipping_rates: Vec<ShippingRate>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            category_page: 1,
            products: Vec::new(),
            product_page: 1,
            discounts: Vec::new(),
            discount_page: 1,
            customers: Vec::new(),
            customer_page: 1,
            orders: Vec::new(),
            order_page: 1,
            order_detail: None,
            tax_rates: Vec::new(),
            shipping_rates: Vec::new(),
        }
    }
}

/// Named mutable slots shared by the console screens.
#[derive(Debug, Default)]
pub struct SharedStore {
    state: RwLock<StoreState>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Categories =====

    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        self.write().categories = categories;
    }

    pub fn category_page(&self) -> u32 {
        self.read().category_page
    }

    pub fn set_category_page(&self, page: u32) {
        self.write().category_page = page;
    }

    // ===== Products =====

    pub fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    pub fn set_products(&self, products: Vec<Product>) {
        self.write().products = products;
    }

    pub fn product_page(&self) -> u32 {
        self.read().product_page
    }

    pub fn set_product_page(&self, page: u32) {
        self.write().product_page = page;
    }

    // ===== Discounts =====

    pub fn discounts(&self) -> Vec<Discount> {
        self.read().discounts.clone()
    }

    pub fn set_discounts(&self, discounts: Vec<Discount>) {
        self.write().discounts = discounts;
    }

    pub fn discount_page(&self) -> u32 {
        self.read().discount_page
    }

    pub fn set_discount_page(&self, page: u32) {
        self.write().discount_page = page;
    }

    // ===== Customers =====

    pub fn customers(&self) -> Vec<Customer> {
        self.read().customers.clone()
    }

    pub fn set_customers(&self, customers: Vec<Customer>) {
        self.write().customers = customers;
    }

    pub fn customer_page(&self) -> u32 {
        self.read().customer_page
    }

    pub fn set_customer_page(&self, page: u32) {
        self.write().customer_page = page;
    }

    // ===== Orders =====

    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        self.write().orders = orders;
    }

    pub fn order_page(&self) -> u32 {
        self.read().order_page
    }

    pub fn set_order_page(&self, page: u32) {
        self.write().order_page = page;
    }

    // ===== Selected order =====

    pub fn order_detail(&self) -> Option<Order> {
        self.read().order_detail.clone()
    }

    pub fn set_order_detail(&self, order: Option<Order>) {
        self.write().order_detail = order;
    }

    // ===== Store settings =====

    pub fn tax_rates(&self) -> Vec<TaxRate> {
        self.read().tax_rates.clone()
    }

    pub fn set_tax_rates(&self, rates: Vec<TaxRate>) {
        self.write().tax_rates = rates;
    }

    pub fn shipping_rates(&self) -> Vec<ShippingRate> {
        self.read().shipping_rates.clone()
    }

    pub fn set_shipping_rates(&self, rates: Vec<ShippingRate>) {
        self.write().shipping_rates = rates;
    }
}
