//! Durable state for Lesson Forge.
//!
//! Two concerns live here: the credit ledger, which is the only code allowed to
//! change an account balance, and the append-only generation history. Both
//! have a Postgres implementation (diesel over an r2d2 pool, with blocking
//! calls moved onto the blocking thread pool) and an in-memory one.
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_database::{establish_pool, run_migrations, CreditLedger, PostgresCreditLedger};
//!
//! # async fn example(account: forge_core::AccountId) -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool(&std::env::var("DATABASE_URL")?, 10)?;
//! run_migrations(&pool)?;
//! let ledger = PostgresCreditLedger::new(pool);
//! if ledger.try_charge(account, 2).await?.is_charged() {
//!     // deliver
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod connection;
mod ledger;
mod memory_ledger;
mod models;
mod postgres_ledger;
mod records;

pub mod schema;

pub use connection::{PgPool, establish_pool, run_migrations};
pub use ledger::{ChargeOutcome, CreditLedger};
pub use memory_ledger::InMemoryCreditLedger;
pub use models::{GenerationRow, NewGenerationRow};
pub use postgres_ledger::PostgresCreditLedger;
pub use records::{GenerationRecordStore, InMemoryRecordStore, PostgresRecordStore};

use forge_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
