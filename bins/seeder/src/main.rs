//! Database seeder for Stayra development and testing.
//!
//! Seeds the chart of accounts, payment modes, the ledger settings row,
//! and demo customers with closed folios for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use stayra_db::{
    AccountRepository, CustomerRepository, FolioRepository, PaymentModeRepository,
    SettingsRepository,
    entities::sea_orm_active_enums::AccountKind,
    repositories::{
        CreateAccountInput, CreateCustomerInput, CreateFolioInput, CreatePaymentModeInput,
        SettingsError,
    },
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = stayra_db::connect(&database_url, 5, 1)
        .await
        .expect("Failed to connect to database");

    println!("Seeding chart of accounts...");
    let accounts = seed_accounts(&db).await;

    println!("Seeding payment modes...");
    seed_payment_modes(&db, &accounts).await;

    println!("Seeding ledger settings...");
    seed_settings(&db, &accounts).await;

    println!("Seeding demo customers...");
    seed_demo_customers(&db).await;

    println!("Seeding complete!");
}

/// Account IDs the later seed steps reference.
struct SeededAccounts {
    cash: Uuid,
    bank: Uuid,
    receivable: Uuid,
    discount: Uuid,
}

/// Finds an account by code or creates it.
async fn ensure_account(
    repo: &AccountRepository,
    code: &str,
    name: &str,
    kind: AccountKind,
) -> Uuid {
    let existing = repo
        .find_account_by_code(code)
        .await
        .expect("Failed to query accounts");

    if let Some(account) = existing {
        println!("  Account {code} already exists, skipping...");
        return account.id;
    }

    let account = repo
        .create_account(CreateAccountInput {
            code: code.to_string(),
            name: name.to_string(),
            kind,
        })
        .await
        .expect("Failed to insert account");
    println!("  Created account {}: {}", account.code, account.name);
    account.id
}

/// Seeds the chart of accounts backing settlement vouchers.
async fn seed_accounts(db: &DatabaseConnection) -> SeededAccounts {
    let repo = AccountRepository::new(db.clone());

    SeededAccounts {
        cash: ensure_account(&repo, "1000", "Cash on Hand", AccountKind::Asset).await,
        bank: ensure_account(&repo, "1100", "Bank", AccountKind::Asset).await,
        receivable: ensure_account(
            &repo,
            "1310",
            "City Ledger Receivable",
            AccountKind::Receivable,
        )
        .await,
        discount: ensure_account(&repo, "5210", "Discount Allowed", AccountKind::Expense).await,
    }
}

/// Finds a payment mode by name or creates it.
async fn ensure_payment_mode(
    repo: &PaymentModeRepository,
    name: &str,
    account_id: Uuid,
    is_city_ledger: bool,
) {
    let existing = repo
        .find_payment_mode_by_name(name)
        .await
        .expect("Failed to query payment modes");

    if existing.is_some() {
        println!("  Payment mode {name} already exists, skipping...");
        return;
    }

    repo.create_payment_mode(CreatePaymentModeInput {
        name: name.to_string(),
        account_id,
        is_city_ledger,
    })
    .await
    .expect("Failed to insert payment mode");
    println!("  Created payment mode {name}");
}

/// Seeds the payment modes. Only the City Ledger mode carries the
/// city ledger flag; the others settle invoices.
async fn seed_payment_modes(db: &DatabaseConnection, accounts: &SeededAccounts) {
    let repo = PaymentModeRepository::new(db.clone());

    ensure_payment_mode(&repo, "Cash", accounts.cash, false).await;
    ensure_payment_mode(&repo, "Bank Transfer", accounts.bank, false).await;
    ensure_payment_mode(&repo, "Card", accounts.bank, false).await;
    ensure_payment_mode(&repo, "City Ledger", accounts.receivable, true).await;
}

/// Seeds the ledger settings row naming the receivable and discount accounts.
async fn seed_settings(db: &DatabaseConnection, accounts: &SeededAccounts) {
    let repo = SettingsRepository::new(db.clone());

    match repo.get_settings().await {
        Ok(_) => println!("  Ledger settings already configured, skipping..."),
        Err(SettingsError::NotConfigured) => {
            repo.save_settings(accounts.receivable, accounts.discount)
                .await
                .expect("Failed to save ledger settings");
            println!("  Configured receivable and discount accounts");
        }
        Err(e) => eprintln!("Failed to read ledger settings: {e}"),
    }
}

/// Seeds demo customers, each with closed folios carrying a balance.
async fn seed_demo_customers(db: &DatabaseConnection) {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    use stayra_db::entities::customers;

    let customer_repo = CustomerRepository::new(db.clone());
    let folio_repo = FolioRepository::new(db.clone());
    let today = Utc::now().date_naive();

    let demo: [(&str, &[(i64, i64, Decimal)]); 2] = [
        (
            "Arunika Tours & Travel",
            &[(60, 56, dec!(1250.00)), (24, 20, dec!(830.50))],
        ),
        ("Mahakarya Logistics", &[(12, 8, dec!(410.00))]),
    ];

    for (name, folios) in demo {
        let existing = customers::Entity::find()
            .filter(customers::Column::Name.eq(name))
            .one(db)
            .await
            .expect("Failed to query customers");

        if existing.is_some() {
            println!("  Customer {name} already exists, skipping...");
            continue;
        }

        let customer = customer_repo
            .create_customer(CreateCustomerInput {
                name: name.to_string(),
            })
            .await
            .expect("Failed to insert customer");

        for (open_days_ago, close_days_ago, balance) in folios {
            folio_repo
                .create_folio(CreateFolioInput {
                    customer_id: customer.id,
                    open_date: today - Duration::days(*open_days_ago),
                    close_date: Some(today - Duration::days(*close_days_ago)),
                    balance: *balance,
                })
                .await
                .expect("Failed to insert folio");
        }

        println!(
            "  Created customer {} with {} folios",
            customer.name,
            folios.len()
        );
    }
}
