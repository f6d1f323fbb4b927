//! Category management and per-category budgets.

mod baseline;
mod budget;
mod create;
mod db;
mod domain;

pub use baseline::ensure_baseline_categories;
pub use budget::set_budget_endpoint;
pub use create::{create_category_endpoint, get_categories_endpoint};
pub use db::{
    create_category, create_category_table, get_all_categories, get_category,
    set_category_budget, validate_category,
};
pub use domain::{Category, CategoryId, CategoryName, normalize_name};
