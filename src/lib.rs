//! Bookstore catalog API
//!
//! Authors and books with filtered, paginated listings. Book lookups are
//! served through a short-lived read-through cache.

pub mod modules;
pub mod server;

pub use modules::{register_all, Catalog};
