//! Pure aggregation over transaction lists.
//!
//! Nothing in here reads a clock or touches shared state: every function that
//! needs "now" takes it as an argument, so results are reproducible.
//!
//! Sums saturate instead of overflowing. A corrupt amount from the remote
//! ledger must not be able to panic the client.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::Serialize;

use crate::{Category, LedgerError, Money, Transaction};

/// Balance, income and expenses over a set of transactions.
///
/// `balance == income - expenses` always holds; `income` and `expenses` are
/// never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub balance: Money,
    pub income: Money,
    pub expenses: Money,
}

impl Summary {
    /// Folds one amount into the summary.
    pub fn apply(&mut self, amount: Money) {
        if amount.is_positive() {
            self.income = self.income.saturating_add(amount);
        } else if amount.is_negative() {
            self.expenses = self.expenses.saturating_add(amount.abs());
        }
        self.balance = self.income.saturating_sub(self.expenses);
    }
}

/// Single pass over `transactions`. An empty input yields the zero summary.
pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = Summary::default();
    for tx in transactions {
        summary.apply(tx.amount);
    }
    summary
}

/// Whether category buckets hold signed sums or only spending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryView {
    #[default]
    Signed,
    /// Absolute sum of negative amounts; categories without spending are left
    /// out.
    ExpensesOnly,
}

/// Signed sum per category, one entry per category present in the input.
pub fn bucket_by_category<'a, I>(transactions: I) -> BTreeMap<Category, Money>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    bucket_by_category_with(transactions, CategoryView::Signed)
}

pub fn bucket_by_category_with<'a, I>(
    transactions: I,
    view: CategoryView,
) -> BTreeMap<Category, Money>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buckets = BTreeMap::new();
    for tx in transactions {
        let amount = match view {
            CategoryView::Signed => tx.amount,
            CategoryView::ExpensesOnly if tx.is_expense() => tx.amount.abs(),
            CategoryView::ExpensesOnly => continue,
        };
        let total = buckets.entry(tx.category).or_insert(Money::ZERO);
        *total = total.saturating_add(amount);
    }
    buckets
}

/// Analytics window ending at "now".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
}

impl Timeframe {
    /// Inclusive lower bound of the window ending at `now`.
    ///
    /// Months and years are calendar based, so "a month before March 31" is
    /// the last day of February.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self {
            Self::Week => now.checked_sub_signed(TimeDelta::days(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::Year => now.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(LedgerError::UnknownTimeframe(other.to_string())),
        }
    }
}

/// Transactions with `created_at` in `[timeframe.start(now), now]`, in input
/// order.
pub fn filter_by_timeframe<'a, I>(
    transactions: I,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let start = timeframe.start(now);
    transactions
        .into_iter()
        .filter(|tx| tx.created_at >= start && tx.created_at <= now)
        .collect()
}

/// Totals shown on the analytics screen for one timeframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimeframeStats {
    pub income: Money,
    pub expenses: Money,
    pub transaction_count: usize,
}

pub fn timeframe_stats<'a, I>(
    transactions: I,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> TimeframeStats
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let window = filter_by_timeframe(transactions, timeframe, now);
    let summary = summarize(window.iter().copied());
    TimeframeStats {
        income: summary.income,
        expenses: summary.expenses,
        transaction_count: window.len(),
    }
}

/// One slice of the income/expense chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Share {
    pub label: &'static str,
    pub amount: Money,
    /// Percentage of the chart total in tenths of a percent (`667` = 66.7%).
    pub per_mille: u16,
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}.{}%)",
            self.label,
            self.amount,
            self.per_mille / 10,
            self.per_mille % 10
        )
    }
}

/// Income and expense slices of `income + expenses`, rounded to 0.1%.
pub fn income_expense_split(summary: &Summary) -> Vec<Share> {
    let total = i128::from(summary.income.cents()) + i128::from(summary.expenses.cents());
    let share = |amount: Money| -> u16 {
        if total <= 0 {
            return 0;
        }
        let scaled = (i128::from(amount.cents()) * 1000 * 2 + total) / (total * 2);
        u16::try_from(scaled.clamp(0, 1000)).unwrap_or(1000)
    };
    vec![
        Share {
            label: "Income",
            amount: summary.income,
            per_mille: share(summary.income),
        },
        Share {
            label: "Expenses",
            amount: summary.expenses,
            per_mille: share(summary.expenses),
        },
    ]
}
