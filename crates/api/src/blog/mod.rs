//! Demo blog service built on `ApiView`.
//!
//! A small but complete use of the library: a [`models::BlogPost`] model, an
//! in-memory [`store::PostStore`], and list/detail views.

pub mod models;
pub mod slug;
pub mod store;
pub mod views;
