// SPDX-License-Identifier: GPL-3.0-or-later

//! Incremental paging over catalog listings.
//!
//! A [`PagingSource`] fetches single pages. A [`Pager`] accumulates them into
//! one observable list with refresh and append load states. A
//! [`PagingSwitcher`] rebuilds the pager whenever its parameters change and
//! guarantees that results for superseded parameters never surface.

pub mod pager;
pub mod source;
pub mod switcher;

pub use pager::{LoadOutcome, Pager, PagingSnapshot};
pub use source::{ArtistSearchSource, Page, PagingSource, PagingState, ReleasesSource};
pub use switcher::PagingSwitcher;
