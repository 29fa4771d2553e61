//! Test utilities for the colpage crates.
//!
//! This crate provides:
//! - Page builders that encode values with each supported page encoding
//! - Random data and validity bitmap generation
//!
//! # Usage
//!
//! This crate is intended for use as a dev-dependency of the colpage crates.

pub mod data_gen;
pub mod page_gen;
