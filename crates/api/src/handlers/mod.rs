//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `cargoscreen_db` and the
//! engine in [`crate::engine`], mapping errors via
//! [`crate::error::AppError`].

pub mod feacn;
pub mod key_words;
pub mod parcels;
pub mod registers;
pub mod stop_words;
