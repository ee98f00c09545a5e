//! Core library for the Selldesk merchant console.
//!
//! Every screen in the console - Categories, Products, Discounts,
//! Customers, Orders - hangs off one shared session, and this crate
//! owns it. It validates the access token's expiry claim, silently
//! refreshes it on a schedule, resolves the identity and merchant
//! records behind it, and exposes the shared view state the screens
//! read and write.
//!
//! A console shell wires the pieces together at startup:
//!
//! ```no_run
//! # async fn wire() -> anyhow::Result<()> {
//! use selldesk_core::{api::ApiClient, Config, ProfileStore, SessionCoordinator};
//!
//! let config = Config::load()?;
//! let profile = ProfileStore::open(&config.profile_dir()?)?;
//! let gateway = ApiClient::new(&config)?;
//!
//! let session = SessionCoordinator::new(gateway, profile);
//! session.start().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod models;
pub mod notify;
pub mod persist;
pub mod store;

pub use config::Config;
pub use coordinator::SessionCoordinator;
pub use notify::{Notice, Noticeboard};
pub use persist::ProfileStore;
pub use store::{SharedStore, ITEMS_PER_PAGE};
