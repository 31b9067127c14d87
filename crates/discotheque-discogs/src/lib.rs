// SPDX-License-Identifier: GPL-3.0-or-later

//! Discogs catalog client.
//!
//! Read-only access to artist search, artist and release lookups and an
//! artist's release listing. Every request carries the product user agent and,
//! when configured, the personal access token.

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;

pub use client::{CatalogApi, DiscogsClient, DiscogsClientBuilder};
pub use error::{DiscogsError, FailureKind, Result};
pub use reqwest::StatusCode;
