//! Transaction data aggregation for the monthly summary.
//!
//! Everything in the summary is derived from one list of transactions in a
//! single pass, so the totals, the category stats and the daily series always
//! agree with each other.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::{Category, CategoryId},
    kind::Kind,
    ledger_date::LedgerDate,
    money::round_to_cents,
    period::MonthPeriod,
    transaction::{EntityType, Transaction},
};

/// A category's spending in the month compared to its budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    /// The category ID.
    pub id: CategoryId,
    /// The category name.
    pub name: String,
    /// The sum of expenses in the category.
    pub spent: Decimal,
    /// The monthly budget, zero when none is set.
    pub budget: Decimal,
    /// `spent` as a percentage of `budget`, `None` when there is no budget.
    pub budget_used_percent: Option<Decimal>,
}

/// Income and expense totals for one day with activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    /// The date.
    pub date: LedgerDate,
    /// The day of the month.
    pub day: u8,
    /// Money earned on the day.
    pub income: Decimal,
    /// Money spent on the day.
    pub expense: Decimal,
}

/// Everything shown for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Total income.
    pub income: Decimal,
    /// Total expenses.
    pub expense: Decimal,
    /// Income minus expenses.
    pub balance: Decimal,
    /// Recurring bills, newest first.
    pub fixed_expenses: Vec<Transaction>,
    /// Everything that is not a recurring bill, including all income, newest first.
    pub variable_transactions: Vec<Transaction>,
    /// Categories with spending or a budget, biggest spend first.
    pub category_stats: Vec<CategoryStat>,
    /// One entry per day with activity, in date order.
    pub daily_data: Vec<DailyTotals>,
}

impl Summary {
    /// The number of transactions the summary was built from.
    pub fn transaction_count(&self) -> usize {
        self.fixed_expenses.len() + self.variable_transactions.len()
    }
}

/// Aggregates a month of transactions into a [Summary].
///
/// # Arguments
/// * `transactions` - The tenant's transactions, newest first
/// * `categories` - All of the tenant's categories
/// * `period` - The month being summarised, rows outside it are ignored
/// * `entity_type` - If given, rows for the other entity type are ignored
///
/// # Returns
/// The totals, the transactions split into fixed and variable lists (keeping
/// the input order), category stats sorted by spend then name, and the daily
/// series sorted by date.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a total does not fit in a [Decimal].
pub fn summarize(
    transactions: &[Transaction],
    categories: &[Category],
    period: MonthPeriod,
    entity_type: Option<EntityType>,
) -> Result<Summary, Error> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut fixed_expenses = Vec::new();
    let mut variable_transactions = Vec::new();
    let mut spent_by_category: HashMap<CategoryId, Decimal> = HashMap::new();
    let mut daily: BTreeMap<LedgerDate, (Decimal, Decimal)> = BTreeMap::new();

    let in_scope = transactions.iter().filter(|transaction| {
        period.contains(transaction.date)
            && entity_type.is_none_or(|entity_type| transaction.entity_type == entity_type)
    });

    for transaction in in_scope {
        let day = daily
            .entry(transaction.date)
            .or_insert((Decimal::ZERO, Decimal::ZERO));

        match transaction.kind {
            Kind::Income => {
                add_to(&mut income, transaction.amount)?;
                add_to(&mut day.0, transaction.amount)?;
            }
            Kind::Expense => {
                add_to(&mut expense, transaction.amount)?;
                add_to(&mut day.1, transaction.amount)?;

                if let Some(category_id) = transaction.category_id {
                    add_to(
                        spent_by_category.entry(category_id).or_default(),
                        transaction.amount,
                    )?;
                }
            }
        }

        if transaction.is_fixed && transaction.kind == Kind::Expense {
            fixed_expenses.push(transaction.clone());
        } else {
            variable_transactions.push(transaction.clone());
        }
    }

    Ok(Summary {
        income,
        expense,
        balance: income.checked_sub(expense).ok_or(Error::AmountOverflow)?,
        fixed_expenses,
        variable_transactions,
        category_stats: build_category_stats(categories, &spent_by_category)?,
        daily_data: daily
            .into_iter()
            .filter(|(_, (income, expense))| !income.is_zero() || !expense.is_zero())
            .map(|(date, (income, expense))| DailyTotals {
                date,
                day: date.day(),
                income,
                expense,
            })
            .collect(),
    })
}

fn add_to(total: &mut Decimal, amount: Decimal) -> Result<(), Error> {
    *total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;
    Ok(())
}

/// `spent` as a percentage of a nonzero `budget`, rounded to cents.
fn percent_of(spent: Decimal, budget: Decimal) -> Result<Decimal, Error> {
    spent
        .checked_div(budget)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_to_cents)
        .ok_or(Error::AmountOverflow)
}

fn build_category_stats(
    categories: &[Category],
    spent_by_category: &HashMap<CategoryId, Decimal>,
) -> Result<Vec<CategoryStat>, Error> {
    let mut stats = Vec::new();

    for category in categories {
        let spent = spent_by_category
            .get(&category.id)
            .copied()
            .unwrap_or(Decimal::ZERO);

        if spent.is_zero() && category.budget.is_zero() {
            continue;
        }

        let budget_used_percent = if category.budget.is_zero() {
            None
        } else {
            Some(percent_of(spent, category.budget)?)
        };

        stats.push(CategoryStat {
            id: category.id,
            name: category.name.to_string(),
            spent,
            budget: category.budget,
            budget_used_percent,
        });
    }

    stats.sort_by(|a, b| b.spent.cmp(&a.spent).then_with(|| a.name.cmp(&b.name)));
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        category::{Category, CategoryName},
        kind::Kind,
        ledger_date::LedgerDate,
        period::MonthPeriod,
        transaction::{EntityType, Transaction},
    };

    use super::{CategoryStat, summarize};

    fn ymd(year: i32, month: u8, day: u8) -> LedgerDate {
        LedgerDate::new(year, month, day).unwrap()
    }

    fn transaction(id: i64, amount: i64, date: LedgerDate, kind: Kind) -> Transaction {
        Transaction {
            id,
            description: format!("#{id}"),
            amount: Decimal::from(amount),
            date,
            kind,
            category_id: None,
            is_fixed: false,
            is_paid: true,
            entity_type: EntityType::Personal,
            tags: Vec::new(),
        }
    }

    fn category(id: i64, name: &str, budget: i64) -> Category {
        Category {
            id,
            name: CategoryName::new_unchecked(name),
            kind: Kind::Expense,
            budget: Decimal::from(budget),
        }
    }

    fn march() -> MonthPeriod {
        MonthPeriod::new(2024, 3).unwrap()
    }

    #[test]
    fn empty_month_is_all_zero() {
        let summary = summarize(&[], &[category(1, "Food", 0)], march(), None).unwrap();

        assert!(summary.income.is_zero());
        assert!(summary.expense.is_zero());
        assert!(summary.balance.is_zero());
        assert!(summary.category_stats.is_empty());
        assert!(summary.daily_data.is_empty());
        assert_eq!(summary.transaction_count(), 0);
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let transactions = [
            transaction(3, 40, ymd(2024, 3, 20), Kind::Expense),
            transaction(2, 1000, ymd(2024, 3, 5), Kind::Income),
            transaction(1, 300, ymd(2024, 3, 1), Kind::Expense),
        ];

        let summary = summarize(&transactions, &[], march(), None).unwrap();

        assert_eq!(summary.income, Decimal::from(1000));
        assert_eq!(summary.expense, Decimal::from(340));
        assert_eq!(summary.balance, Decimal::from(660));
    }

    #[test]
    fn splits_fixed_expenses_from_variable_transactions() {
        let mut rent = transaction(1, 1200, ymd(2024, 3, 5), Kind::Expense);
        rent.is_fixed = true;
        let mut salary = transaction(2, 5000, ymd(2024, 3, 1), Kind::Income);
        salary.is_fixed = true;
        let lunch = transaction(3, 30, ymd(2024, 3, 2), Kind::Expense);

        let summary = summarize(&[rent, salary, lunch], &[], march(), None).unwrap();

        let fixed: Vec<_> = summary.fixed_expenses.iter().map(|t| t.id).collect();
        let variable: Vec<_> = summary.variable_transactions.iter().map(|t| t.id).collect();
        assert_eq!(fixed, vec![1]);
        assert_eq!(variable, vec![2, 3]);
    }

    #[test]
    fn category_stats_compare_spend_with_budget() {
        let mut groceries = transaction(1, 600, ymd(2024, 3, 5), Kind::Expense);
        groceries.category_id = Some(1);
        let mut bonus = transaction(2, 100, ymd(2024, 3, 6), Kind::Income);
        bonus.category_id = Some(1);
        let categories = [
            category(1, "Groceries", 500),
            category(2, "Travel", 0),
            category(3, "Health", 200),
        ];

        let summary = summarize(&[groceries, bonus], &categories, march(), None).unwrap();

        assert_eq!(
            summary.category_stats,
            vec![
                CategoryStat {
                    id: 1,
                    name: "Groceries".to_owned(),
                    spent: Decimal::from(600),
                    budget: Decimal::from(500),
                    budget_used_percent: Some(Decimal::from(120)),
                },
                CategoryStat {
                    id: 3,
                    name: "Health".to_owned(),
                    spent: Decimal::ZERO,
                    budget: Decimal::from(200),
                    budget_used_percent: Some(Decimal::ZERO),
                },
            ]
        );
    }

    #[test]
    fn category_stats_break_ties_by_name() {
        let mut first = transaction(1, 50, ymd(2024, 3, 5), Kind::Expense);
        first.category_id = Some(1);
        let mut second = transaction(2, 50, ymd(2024, 3, 6), Kind::Expense);
        second.category_id = Some(2);
        let categories = [category(1, "Zoo", 0), category(2, "Apps", 0)];

        let summary = summarize(&[first, second], &categories, march(), None).unwrap();

        let names: Vec<_> = summary.category_stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Apps", "Zoo"]);
        assert!(summary.category_stats.iter().all(|s| s.budget_used_percent.is_none()));
    }

    #[test]
    fn daily_data_is_sparse_and_ascending() {
        let transactions = [
            transaction(4, 10, ymd(2024, 3, 31), Kind::Expense),
            transaction(3, 5, ymd(2024, 3, 10), Kind::Expense),
            transaction(2, 100, ymd(2024, 3, 10), Kind::Income),
            transaction(1, 20, ymd(2024, 3, 2), Kind::Expense),
        ];

        let summary = summarize(&transactions, &[], march(), None).unwrap();

        let days: Vec<_> = summary
            .daily_data
            .iter()
            .map(|d| (d.day, d.income, d.expense))
            .collect();
        assert_eq!(
            days,
            vec![
                (2, Decimal::ZERO, Decimal::from(20)),
                (10, Decimal::from(100), Decimal::from(5)),
                (31, Decimal::ZERO, Decimal::from(10)),
            ]
        );
    }

    #[test]
    fn nominal_dates_count_towards_their_month() {
        let transactions = [transaction(1, 75, ymd(2024, 2, 31), Kind::Expense)];

        let summary = summarize(
            &transactions,
            &[],
            MonthPeriod::new(2024, 2).unwrap(),
            None,
        )
        .unwrap();

        assert_eq!(summary.expense, Decimal::from(75));
        assert_eq!(summary.daily_data[0].day, 31);
    }

    #[test]
    fn ignores_rows_outside_period_and_entity_filter() {
        let mut business = transaction(2, 70, ymd(2024, 3, 3), Kind::Expense);
        business.entity_type = EntityType::Business;
        let transactions = [
            transaction(3, 999, ymd(2024, 4, 1), Kind::Expense),
            business,
            transaction(1, 30, ymd(2024, 3, 2), Kind::Expense),
        ];

        let summary = summarize(&transactions, &[], march(), Some(EntityType::Business)).unwrap();

        assert_eq!(summary.expense, Decimal::from(70));
        assert_eq!(summary.transaction_count(), 1);
    }

    #[test]
    fn totals_do_not_depend_on_order() {
        let transactions = vec![
            transaction(1, 1, ymd(2024, 3, 1), Kind::Expense),
            transaction(2, 2, ymd(2024, 3, 2), Kind::Income),
            transaction(3, 3, ymd(2024, 3, 3), Kind::Expense),
        ];
        let mut reversed = transactions.clone();
        reversed.reverse();

        let forward = summarize(&transactions, &[], march(), None).unwrap();
        let backward = summarize(&reversed, &[], march(), None).unwrap();

        assert_eq!(forward.balance, backward.balance);
        assert_eq!(forward.daily_data, backward.daily_data);
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let huge_expense = |id| {
            let mut expense = transaction(id, 0, ymd(2024, 3, 5), Kind::Expense);
            expense.amount = Decimal::MAX;
            expense
        };

        let result = summarize(&[huge_expense(1), huge_expense(2)], &[], march(), None);

        assert_eq!(result, Err(Error::AmountOverflow));
    }

    #[test]
    fn overflowing_budget_percentage_is_an_error() {
        let mut expense = transaction(1, 0, ymd(2024, 3, 5), Kind::Expense);
        expense.amount = Decimal::MAX;
        expense.category_id = Some(1);
        let mut tiny_budget = category(1, "Yachts", 0);
        tiny_budget.budget = Decimal::new(1, 2);

        let result = summarize(&[expense], &[tiny_budget], march(), None);

        assert_eq!(result, Err(Error::AmountOverflow));
    }
}
