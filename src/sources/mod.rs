//! Source implementations.
//!
//! # Available Sources
//!
//! - [`KomgaSource`] - A self-hosted Komga server, reached through its REST API

pub mod komga;

pub use komga::KomgaSource;
