//! Prompt construction and reply parsing for the advisor.
//!
//! Nothing in here talks to the network, the handlers feed the results to
//! [super::LanguageModelClient].

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    Error,
    kind::Kind,
    period::MonthPeriod,
    summary::Summary,
    transaction::Transaction,
};

/// Sampling temperature for the monthly commentary.
pub const REPORT_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for entry extraction.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// How many of the largest expenses are listed in the report prompt.
const TOP_EXPENSE_COUNT: usize = 5;

/// The system instruction for the monthly commentary.
pub const REPORT_SYSTEM_PROMPT: &str = "You are a virtual CFO. Analyse the figures and give \
concise business insights in at most three paragraphs.";

/// The user message describing a month for the commentary.
///
/// Lists the period, the totals and the five largest expenses, each as
/// `"{description} ({PF|PJ}: {amount})"`.
pub fn build_report_prompt(period: MonthPeriod, summary: &Summary) -> String {
    let mut expenses: Vec<&Transaction> = summary
        .fixed_expenses
        .iter()
        .chain(&summary.variable_transactions)
        .filter(|transaction| transaction.kind == Kind::Expense)
        .collect();

    // Ties go to the most recent entry so the order does not depend on which list it came from.
    expenses.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.id.cmp(&a.id))
    });

    let top_expenses = expenses
        .iter()
        .take(TOP_EXPENSE_COUNT)
        .map(|transaction| {
            format!(
                "{} ({}: {})",
                transaction.description,
                transaction.entity_type.label(),
                transaction.amount
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Period: {}\nIncome: {}\nExpenses: {}\nResult: {}\nTop expenses: {top_expenses}",
        period.label(),
        summary.income,
        summary.expense,
        summary.balance,
    )
}

/// The system instruction for turning free text into a transaction.
pub fn build_extraction_system_prompt(category_names: &[&str]) -> String {
    format!(
        "You are a personal finance assistant. \
Extract the transaction described in the user's sentence.

Available categories: {}.

Rules:
1. If no category is mentioned, deduce it from the context (e.g. \"gas station\" -> Transport).
2. Use type \"expense\" for spending and \"income\" for earnings such as salary.
3. Reply with a single valid JSON object only, without Markdown.

Required output format:
{{
  \"description\": \"short, clear description\",
  \"amount\": number (digits only, e.g. 50.50),
  \"categoryName\": \"exact category name\",
  \"type\": \"income\" or \"expense\"
}}",
        category_names.join(", ")
    )
}

/// The transaction fields the model extracted from free text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedEntry {
    /// A short description.
    pub description: String,
    /// The amount, always positive.
    pub amount: Decimal,
    /// The category name as written by the model, if any.
    #[serde(default, rename = "categoryName")]
    pub category_name: Option<String>,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: Kind,
}

/// Remove Markdown code fences such as "```json" from a model reply.
pub fn strip_code_fences(reply: &str) -> String {
    reply.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Parse a model reply into an [ExtractedEntry].
///
/// # Errors
/// Returns [Error::AiResponseInvalid] if the reply, with any code fences
/// removed, is not the expected JSON object.
pub fn parse_entry_reply(reply: &str) -> Result<ExtractedEntry, Error> {
    let cleaned = strip_code_fences(reply);

    serde_json::from_str(&cleaned)
        .map_err(|error| Error::AiResponseInvalid(format!("{error} in {cleaned:?}")))
}
