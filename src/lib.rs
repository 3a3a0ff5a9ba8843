//! Client-side inventory search and pagination.
//!
//! [`search::SearchEngine`] ranks and filters a [`model::Catalog`] with a
//! fuzzy subsequence scorer, [`pagination::Pagination`] keeps a clamped page
//! window over any ordered list, and [`debounce`] coalesces query input
//! before it reaches the engine. [`state::AppState`] ties the three together
//! for one session.

pub mod config;
pub mod debounce;
pub mod error;
pub mod matcher;
pub mod model;
pub mod pagination;
pub mod search;
pub mod sources;
pub mod state;
pub mod ui;

pub use error::{Error, Result};
