//! Core business logic for Stayra.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `reconcile` - City ledger invoice reconciliation
//! - `voucher` - Settlement voucher construction

pub mod reconcile;
pub mod voucher;
