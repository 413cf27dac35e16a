//! shelfcheck: library catalog availability lookup.
//!
//! The server side scrapes a library catalog search page and reports a
//! simplified availability status; the client side is a form handler that
//! calls it and renders the outcome.

pub mod app;
pub mod client;
pub mod modules;
