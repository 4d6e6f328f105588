//! Core types and trait definitions for the Personas service.
//!
//! Holds the person and error-log records, the searchable fields, and the
//! [`store::PersonStore`] trait. No HTTP or SQL lives here.

// `PersonStore` spells out `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod error;
pub mod person;
pub mod search;
pub mod store;

pub use error::{Error, Result};
