//! Initial schema: master data, vouchers, invoices and their child rows.

use sea_orm_migration::prelude::*;

/// Initial schema migration.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ===== PART 1: ENUMS =====
        db.execute_unprepared(CREATE_ENUMS_SQL).await?;

        // ===== PART 2: MASTER DATA =====
        db.execute_unprepared(CREATE_MASTER_SQL).await?;

        // ===== PART 3: VOUCHERS =====
        db.execute_unprepared(CREATE_VOUCHER_SQL).await?;

        // ===== PART 4: INVOICES AND CHILD ROWS =====
        db.execute_unprepared(CREATE_INVOICE_SQL).await?;

        // ===== PART 5: INDEXES =====
        db.execute_unprepared(CREATE_INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const CREATE_ENUMS_SQL: &str = r"
CREATE TYPE invoice_status AS ENUM ('draft', 'unpaid', 'paid', 'cancelled');
CREATE TYPE payment_entry_status AS ENUM ('draft', 'submitted', 'cancelled');
CREATE TYPE voucher_status AS ENUM ('submitted', 'cancelled');
CREATE TYPE account_kind AS ENUM ('asset', 'liability', 'income', 'expense', 'receivable');
";

const CREATE_MASTER_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    kind account_kind NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE payment_modes (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    is_city_ledger BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE ledger_settings (
    id SMALLINT PRIMARY KEY CHECK (id = 1),
    receivable_account_id UUID NOT NULL REFERENCES accounts(id),
    discount_account_id UUID NOT NULL REFERENCES accounts(id),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE folios (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id),
    open_date DATE NOT NULL,
    close_date DATE,
    balance NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    settled BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CREATE_VOUCHER_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    posting_date DATE NOT NULL,
    remark TEXT NOT NULL,
    status voucher_status NOT NULL DEFAULT 'submitted',
    total_debit NUMERIC(14, 2) NOT NULL CHECK (total_debit >= 0),
    total_credit NUMERIC(14, 2) NOT NULL CHECK (total_credit >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (total_debit = total_credit)
);

CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    party_customer_id UUID REFERENCES customers(id),
    position INTEGER NOT NULL
);

CREATE TABLE payment_entries (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id),
    posting_date DATE NOT NULL,
    paid_amount NUMERIC(14, 2) NOT NULL CHECK (paid_amount > 0),
    reference_no VARCHAR(140),
    status payment_entry_status NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CREATE_INVOICE_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id),
    status invoice_status NOT NULL DEFAULT 'draft',
    issued_date DATE NOT NULL,
    due_date DATE NOT NULL,
    total_amount NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (total_amount >= 0),
    total_paid NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (total_paid >= 0),
    total_discount NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (total_discount >= 0),
    outstanding NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (outstanding >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE invoice_folios (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    folio_id UUID NOT NULL REFERENCES folios(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    position INTEGER NOT NULL,
    UNIQUE (invoice_id, folio_id)
);

CREATE TABLE invoice_payments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    payment_date DATE NOT NULL,
    payment_mode_id UUID NOT NULL REFERENCES payment_modes(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    reference_no VARCHAR(140),
    paid BOOLEAN NOT NULL DEFAULT FALSE,
    journal_entry_id UUID REFERENCES journal_entries(id),
    position INTEGER NOT NULL
);

CREATE TABLE invoice_payment_entries (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    payment_entry_id UUID NOT NULL REFERENCES payment_entries(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    position INTEGER NOT NULL
);

CREATE TABLE invoice_discounts (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    description VARCHAR(255) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    journal_entry_id UUID REFERENCES journal_entries(id),
    position INTEGER NOT NULL
);
";

const CREATE_INDEXES_SQL: &str = r"
CREATE INDEX idx_folios_customer ON folios(customer_id);
CREATE INDEX idx_invoices_customer_status ON invoices(customer_id, status);
CREATE INDEX idx_invoice_folios_invoice ON invoice_folios(invoice_id);
CREATE INDEX idx_invoice_folios_folio ON invoice_folios(folio_id);
CREATE INDEX idx_invoice_payments_invoice ON invoice_payments(invoice_id);
CREATE INDEX idx_invoice_payments_voucher ON invoice_payments(journal_entry_id)
    WHERE journal_entry_id IS NOT NULL;
CREATE INDEX idx_invoice_payment_entries_invoice ON invoice_payment_entries(invoice_id);
CREATE INDEX idx_invoice_payment_entries_entry ON invoice_payment_entries(payment_entry_id);
CREATE INDEX idx_invoice_discounts_invoice ON invoice_discounts(invoice_id);
CREATE INDEX idx_invoice_discounts_voucher ON invoice_discounts(journal_entry_id)
    WHERE journal_entry_id IS NOT NULL;
CREATE INDEX idx_journal_entry_lines_entry ON journal_entry_lines(journal_entry_id);
CREATE INDEX idx_payment_entries_customer ON payment_entries(customer_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_discounts;
DROP TABLE IF EXISTS invoice_payment_entries;
DROP TABLE IF EXISTS invoice_payments;
DROP TABLE IF EXISTS invoice_folios;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS payment_entries;
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS folios;
DROP TABLE IF EXISTS customers;
DROP TABLE IF EXISTS ledger_settings;
DROP TABLE IF EXISTS payment_modes;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS account_kind;
DROP TYPE IF EXISTS voucher_status;
DROP TYPE IF EXISTS payment_entry_status;
DROP TYPE IF EXISTS invoice_status;
";
