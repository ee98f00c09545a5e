//! Account-service client for the Teem platform.
//!
//! The session coordinator talks to the platform through the
//! [`AuthGateway`] trait; [`ApiClient`] is the reqwest-backed
//! implementation used by the console shells. Catalog and order CRUD
//! live in their own service clients owned by the screens - this module
//! only covers identity, merchant and token-refresh lookups.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::{AuthGateway, RefreshCredential, TokenGrant};
