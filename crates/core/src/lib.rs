//! Domain rules for the review platform.
//!
//! Everything here is free of I/O so it can be shared by the storage and
//! HTTP layers and tested in isolation.

pub mod accounts;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod permissions;
pub mod review;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
