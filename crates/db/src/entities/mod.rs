//! `SeaORM` entity definitions.

pub mod accounts;
pub mod customers;
pub mod folios;
pub mod invoice_discounts;
pub mod invoice_folios;
pub mod invoice_payment_entries;
pub mod invoice_payments;
pub mod invoices;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod ledger_settings;
pub mod payment_entries;
pub mod payment_modes;
pub mod sea_orm_active_enums;
