//! Core types, storage traits and services for the Sage assistant.
//!
//! This crate knows nothing about HTTP or any particular database. Storage
//! backends implement the traits in [`store`]; the API layer drives the
//! services ([`conversation`], [`guestbook`], [`curation`], [`auth`]).

// Store traits spell out `Send` futures; backends implement them with `async fn`.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod auth;
pub mod conversation;
pub mod curation;
pub mod error;
pub mod guestbook;
pub mod interaction;
pub mod knowledge;
pub mod matcher;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
