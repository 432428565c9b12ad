//! Income and expense totals derived from a user's records.

use serde::{Deserialize, Serialize};

use crate::record::{FinancialRecord, INCOME_CATEGORIES};

/// Whether a record brought money in or sent it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent.
    Expense,
}

/// Classify a record by its category.
///
/// A record is income iff its category is exactly one of [INCOME_CATEGORIES].
pub fn classify(category: &str) -> Flow {
    if INCOME_CATEGORIES.contains(&category) {
        Flow::Income
    } else {
        Flow::Expense
    }
}

/// The summary totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// The sum of the amounts of all income records.
    pub income: f64,
    /// The sum of the amounts of all expense records.
    pub expense: f64,
    /// Income minus expense.
    pub net: f64,
}

/// Add up `records` into income and expense totals in a single pass.
pub fn summarize(records: &[FinancialRecord]) -> Totals {
    let (income, expense) = records.iter().fold((0.0, 0.0), |(income, expense), record| {
        match classify(&record.category) {
            Flow::Income => (income + record.amount, expense),
            Flow::Expense => (income, expense + record.amount),
        }
    });

    Totals {
        income,
        expense,
        net: income - expense,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        auth::UserId,
        dashboard::aggregation::{Flow, Totals, classify, summarize},
        record::FinancialRecord,
    };

    fn record(id: i64, amount: f64, category: &str) -> FinancialRecord {
        FinancialRecord {
            id,
            user_id: UserId::new("u1"),
            date: datetime!(2025-03-01 09:30 UTC),
            description: "test".to_owned(),
            amount,
            category: category.to_owned(),
            payment_method: "bank".to_owned(),
            currency: None,
        }
    }

    #[test]
    fn income_categories_are_income() {
        assert_eq!(classify("Salary"), Flow::Income);
        assert_eq!(classify("Part Time Job"), Flow::Income);
    }

    #[test]
    fn classification_is_exact_match() {
        assert_eq!(classify("salary"), Flow::Expense);
        assert_eq!(classify("Salary "), Flow::Expense);
        assert_eq!(classify("Food"), Flow::Expense);
        assert_eq!(classify(""), Flow::Expense);
    }

    #[test]
    fn no_records_sum_to_zero() {
        assert_eq!(summarize(&[]), Totals::default());
    }

    #[test]
    fn single_salary_record() {
        let totals = summarize(&[record(1, 1000.0, "Salary")]);

        assert_eq!(
            totals,
            Totals {
                income: 1000.0,
                expense: 0.0,
                net: 1000.0
            }
        );
    }

    #[test]
    fn income_and_expense() {
        let totals = summarize(&[record(1, 500.0, "Salary"), record(2, 200.0, "Food")]);

        assert_eq!(
            totals,
            Totals {
                income: 500.0,
                expense: 200.0,
                net: 300.0
            }
        );
    }

    #[test]
    fn every_record_is_counted_once() {
        let records = [
            record(1, 500.0, "Salary"),
            record(2, 250.0, "Part Time Job"),
            record(3, 200.0, "Food"),
            record(4, -30.0, "Refund"),
            record(5, 12.5, "Transport"),
        ];
        let total: f64 = records.iter().map(|record| record.amount).sum();

        let totals = summarize(&records);

        assert_eq!(totals.income + totals.expense, total);
        assert_eq!(totals.net, totals.income - totals.expense);
    }

    #[test]
    fn net_is_negative_when_spending_exceeds_income() {
        let totals = summarize(&[record(1, 100.0, "Salary"), record(2, 150.0, "Rent")]);

        assert_eq!(totals.net, -50.0);
    }
}
