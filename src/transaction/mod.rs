//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The installment expander that splits a purchase over several months
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod installments;

pub use core::{
    EntityType, Transaction, TransactionBuilder, TransactionUpdate, count_transactions,
    create_transaction, create_transaction_table, get_transactions_in_period,
    has_matching_transaction, map_transaction_row,
};
pub(crate) use core::insert_transaction;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::{edit_transaction_endpoint, set_paid_endpoint};
pub use installments::{InstallmentPlan, create_installments, expand_installments};

#[cfg(test)]
pub use core::{delete_transaction, get_transaction, set_paid, update_transaction};
