//! Mapping between the REST shapes in `api_types` and ledger types.
//!
//! Records are decoded leniently. A record with an amount that cannot be read
//! still shows up (with a zero amount) and a record with an unknown category
//! lands in `Other`; both are logged as data-integrity defects rather than
//! failing the whole load.

use api_types::{
    RawAmount,
    summary::SummaryResponse,
    transaction::{TransactionNew, TransactionRecord},
};
use ledger::{Category, Money, Summary, Transaction, TransactionId, UserId};

use crate::NewTransaction;

fn decode_amount(raw: Option<&RawAmount>) -> Option<Money> {
    match raw? {
        RawAmount::Number(value) => Money::from_major(*value),
        RawAmount::Text(text) => text.parse::<Money>().ok().or_else(|| {
            text.trim()
                .parse::<f64>()
                .ok()
                .and_then(Money::from_major)
        }),
    }
}

/// Reads an amount, falling back to zero when it is missing or malformed.
fn amount_or_zero(raw: Option<&RawAmount>, field: &str, record: &str) -> Money {
    match decode_amount(raw) {
        Some(amount) => amount,
        None => {
            let shown = raw.map_or_else(|| "<missing>".to_string(), ToString::to_string);
            tracing::warn!(
                record,
                field,
                raw = %shown,
                "unreadable amount from remote ledger, counting it as zero"
            );
            Money::ZERO
        }
    }
}

pub(crate) fn transaction_from_record(record: TransactionRecord) -> Transaction {
    let id = record.id.to_string();
    let amount = amount_or_zero(record.amount.as_ref(), "amount", &id);
    let category = record.category.parse::<Category>().unwrap_or_else(|_| {
        tracing::warn!(
            record = %id,
            category = %record.category,
            "unknown category from remote ledger, filing under Other"
        );
        Category::Other
    });

    Transaction {
        id: TransactionId::new(id),
        user_id: UserId::new(record.user_id),
        title: record.title,
        amount,
        category,
        created_at: record.created_at,
    }
}

pub(crate) fn summary_from_response(response: &SummaryResponse, user: &UserId) -> Summary {
    let user = user.as_str();
    let income = amount_or_zero(response.income.as_ref(), "income", user);
    let expenses = amount_or_zero(response.expenses.as_ref(), "expenses", user).abs();
    let balance = amount_or_zero(response.balance.as_ref(), "balance", user);

    let derived = income.saturating_sub(expenses);
    if balance != derived {
        tracing::warn!(
            user,
            balance = %balance,
            derived = %derived,
            "remote summary balance is not income minus expenses"
        );
    }

    Summary {
        balance,
        income,
        expenses,
    }
}

pub(crate) fn new_transaction_body(new: &NewTransaction) -> TransactionNew {
    TransactionNew {
        user_id: new.user_id.to_string(),
        title: new.draft.title().to_string(),
        amount: new.draft.amount().to_major(),
        category: new.draft.category().name().to_string(),
    }
}
