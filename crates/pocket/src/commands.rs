use std::{collections::BTreeMap, fmt::Write as _};

use chrono::{DateTime, Utc};
use clap::Subcommand;
use ledger::{
    Category, CategoryView, LedgerSnapshot, Money, Share, Summary, Timeframe, TimeframeStats,
    Transaction, TransactionDraft, TransactionId, bucket_by_category_with, filter_by_timeframe,
    income_expense_split, summarize, timeframe_stats,
};
use ledger_sync::{
    LedgerEvent, LoadOutcome, RemoteLedger, SessionProvider, SyncCoordinator, WriteOutcome,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast;

use crate::error::{AppError, Result};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List transactions, newest first.
    List {
        /// Only show the last week, month or year.
        #[arg(long)]
        timeframe: Option<Timeframe>,
    },
    /// Balance, income and expenses.
    Summary,
    /// Totals, spending per category and the income/expense split.
    Stats {
        #[arg(long, default_value_t = Timeframe::Month)]
        timeframe: Timeframe,
        /// Bucket spending only, as positive amounts.
        #[arg(long)]
        expenses_only: bool,
    },
    /// Create a transaction.
    Add {
        #[arg(long)]
        title: String,
        /// Amount in major units, e.g. -12.50 or 12,50.
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Category name or short id, see `categories`.
        #[arg(long)]
        category: String,
        /// Record the amount as income whatever its sign.
        #[arg(long, conflicts_with = "expense")]
        income: bool,
        /// Record the amount as an expense whatever its sign.
        #[arg(long)]
        expense: bool,
    },
    /// Delete a transaction by id.
    Delete { id: String },
    /// Categories accepted by `add`.
    Categories,
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    summary: Summary,
    remote_summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct StatsReport<'a> {
    timeframe: &'static str,
    stats: TimeframeStats,
    categories: BTreeMap<&'static str, Money>,
    split: &'a [Share],
}

#[derive(Debug, Serialize)]
struct WriteReport<'a, T: Serialize> {
    result: &'a T,
    notices: &'a [String],
}

/// Runs one command and returns what should be printed.
pub async fn run<R, S>(
    coordinator: &SyncCoordinator<R, S>,
    command: Command,
    json: bool,
    now: DateTime<Utc>,
) -> Result<String>
where
    R: RemoteLedger,
    S: SessionProvider,
{
    match command {
        Command::List { timeframe } => {
            let snapshot = load(coordinator).await?;
            let shown: Vec<&Transaction> = match timeframe {
                Some(timeframe) => filter_by_timeframe(&snapshot.transactions, timeframe, now),
                None => snapshot.transactions.iter().collect(),
            };
            if json {
                return Ok(serde_json::to_string_pretty(&shown)?);
            }
            Ok(render_list(&shown))
        }
        Command::Summary => {
            let snapshot = load(coordinator).await?;
            if json {
                let report = SummaryReport {
                    summary: snapshot.summary,
                    remote_summary: snapshot.remote_summary,
                };
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            Ok(render_summary(&snapshot.summary))
        }
        Command::Stats {
            timeframe,
            expenses_only,
        } => {
            let snapshot = load(coordinator).await?;
            let view = if expenses_only {
                CategoryView::ExpensesOnly
            } else {
                CategoryView::Signed
            };
            let window = filter_by_timeframe(&snapshot.transactions, timeframe, now);
            let stats = timeframe_stats(window.iter().copied(), timeframe, now);
            let buckets = bucket_by_category_with(window.iter().copied(), view);
            let split = income_expense_split(&summarize(window.iter().copied()));
            if json {
                let report = StatsReport {
                    timeframe: timeframe.as_str(),
                    stats,
                    categories: buckets
                        .iter()
                        .map(|(category, amount)| (category.name(), *amount))
                        .collect(),
                    split: &split,
                };
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            Ok(render_stats(timeframe, &stats, &buckets, &split))
        }
        Command::Add {
            title,
            amount,
            category,
            income,
            expense,
        } => {
            let draft = if income {
                TransactionDraft::income(title, amount, category)
            } else if expense {
                TransactionDraft::expense(title, amount, category)
            } else {
                TransactionDraft::new(title, amount, category)
            };

            let mut events = coordinator.subscribe();
            let outcome = coordinator.create(&draft).await?;
            let notices = drain_notices(&mut events);
            let WriteOutcome::Confirmed(created) = outcome else {
                return Err(AppError::SignedOut);
            };
            if json {
                let report = WriteReport {
                    result: &created,
                    notices: &notices,
                };
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            let mut out = render_notices(&notices);
            out.push_str(&render_list(&[&created]));
            Ok(out)
        }
        Command::Delete { id } => {
            let id = TransactionId::new(id);
            let mut events = coordinator.subscribe();
            let outcome = coordinator.delete(&id).await?;
            let notices = drain_notices(&mut events);
            let WriteOutcome::Confirmed(deleted) = outcome else {
                return Err(AppError::SignedOut);
            };
            if let Err(err) = &deleted.reload {
                tracing::warn!(id = %deleted.id, error = %err, "reload after delete failed");
            }
            if json {
                let report = WriteReport {
                    result: &deleted.id,
                    notices: &notices,
                };
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            let mut out = render_notices(&notices);
            if matches!(deleted.reload, Ok(LoadOutcome::Applied { .. })) {
                out.push_str(&render_summary(&coordinator.store().summary()));
            }
            Ok(out)
        }
        Command::Categories => {
            if json {
                let categories: Vec<_> = Category::ALL
                    .iter()
                    .map(|category| json!({ "id": category.id(), "name": category.name() }))
                    .collect();
                return Ok(serde_json::to_string_pretty(&categories)?);
            }
            Ok(render_categories())
        }
    }
}

async fn load<R, S>(coordinator: &SyncCoordinator<R, S>) -> Result<LedgerSnapshot>
where
    R: RemoteLedger,
    S: SessionProvider,
{
    match coordinator.refresh().await? {
        LoadOutcome::NoSession => Err(AppError::SignedOut),
        LoadOutcome::Applied { .. } | LoadOutcome::StaleResponseDiscarded => {
            Ok(coordinator.store().snapshot())
        }
    }
}

fn drain_notices(events: &mut broadcast::Receiver<LedgerEvent>) -> Vec<String> {
    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Some(notice) = event.notice() {
            notices.push(notice);
        }
    }
    notices
}

fn render_notices(notices: &[String]) -> String {
    notices.iter().map(|notice| format!("{notice}\n")).collect()
}

pub fn render_list(transactions: &[&Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions yet.\n".to_string();
    }
    let mut out = String::new();
    for tx in transactions {
        let _ = writeln!(
            out,
            "{:>6}  {}  {:<24} {:<14} {:>12}",
            tx.id.as_str(),
            tx.created_at.format("%Y-%m-%d"),
            tx.title,
            tx.category.name(),
            tx.amount.to_string(),
        );
    }
    out
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Balance:  {}\nIncome:   {}\nExpenses: {}\n",
        summary.balance, summary.income, summary.expenses
    )
}

pub fn render_stats(
    timeframe: Timeframe,
    stats: &TimeframeStats,
    buckets: &BTreeMap<Category, Money>,
    split: &[Share],
) -> String {
    let mut out = format!(
        "Last {timeframe}: {} transactions\nIncome:   {}\nExpenses: {}\n",
        stats.transaction_count, stats.income, stats.expenses
    );
    if !buckets.is_empty() {
        out.push_str("\nBy category\n");
        for (category, amount) in buckets {
            let _ = writeln!(out, "  {:<14} {:>12}", category.name(), amount.to_string());
        }
    }
    out.push('\n');
    for share in split {
        let _ = writeln!(out, "{share}");
    }
    out
}

pub fn render_categories() -> String {
    Category::ALL
        .iter()
        .map(|category| format!("{:<15} {}\n", category.id(), category.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use clap::Parser;
    use ledger::UserId;
    use ledger_sync::{NewTransaction, RemoteError, SharedSession};

    use super::*;
    use crate::config::Cli;

    type RemoteResult<T> = std::result::Result<T, RemoteError>;

    #[derive(Clone, Default)]
    struct MemoryLedger {
        rows: Arc<Mutex<Vec<Transaction>>>,
    }

    impl RemoteLedger for MemoryLedger {
        async fn fetch_transactions(&self, user: &UserId) -> RemoteResult<Vec<Transaction>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|tx| &tx.user_id == user).cloned().collect())
        }

        async fn fetch_summary(&self, user: &UserId) -> RemoteResult<Summary> {
            let rows = self.rows.lock().unwrap();
            Ok(summarize(rows.iter().filter(|tx| &tx.user_id == user)))
        }

        async fn create(&self, new: &NewTransaction) -> RemoteResult<Transaction> {
            let mut rows = self.rows.lock().unwrap();
            let created = Transaction {
                id: TransactionId::new((rows.len() + 1).to_string()),
                user_id: new.user_id.clone(),
                title: new.draft.title().to_string(),
                amount: new.draft.amount(),
                category: new.draft.category(),
                created_at: now(),
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn delete(&self, id: &TransactionId) -> RemoteResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|tx| &tx.id != id);
            if rows.len() == before {
                return Err(RemoteError::Rejected {
                    status: 404,
                    reason: "Transaction not found".to_string(),
                });
            }
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn tx(id: &str, cents: i64, category: Category, days_ago: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            user_id: UserId::new("user_1"),
            title: format!("tx {id}"),
            amount: Money::new(cents),
            category,
            created_at: now() - chrono::TimeDelta::days(days_ago),
        }
    }

    fn seeded(session: SharedSession) -> SyncCoordinator<MemoryLedger, SharedSession> {
        let remote = MemoryLedger::default();
        *remote.rows.lock().unwrap() = vec![
            tx("1", 5000, Category::Income, 2),
            tx("2", -2000, Category::FoodAndDrinks, 1),
            tx("3", -500, Category::Transportation, 40),
        ];
        SyncCoordinator::new(remote, session, ledger::LedgerStore::new())
    }

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["pocket"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn add_accepts_negative_amounts_and_exclusive_sign_flags() {
        let parsed = command(&["add", "--title", "Pizza", "--amount", "-20", "--category", "food"]);
        assert!(matches!(parsed, Command::Add { ref amount, .. } if amount == "-20"));

        let argv = [
            "pocket", "add", "--title", "x", "--amount", "1", "--category", "food", "--income",
            "--expense",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn unknown_timeframe_is_a_usage_error() {
        assert!(Cli::try_parse_from(["pocket", "list", "--timeframe", "decade"]).is_err());
        assert!(matches!(
            command(&["stats"]),
            Command::Stats {
                timeframe: Timeframe::Month,
                expenses_only: false
            }
        ));
    }

    #[test]
    fn summary_renders_expenses_as_magnitudes() {
        let summary = Summary {
            balance: Money::new(-1500),
            income: Money::new(500),
            expenses: Money::new(2000),
        };
        assert_eq!(
            render_summary(&summary),
            "Balance:  -$15.00\nIncome:   $5.00\nExpenses: $20.00\n"
        );
    }

    #[test]
    fn empty_list_has_a_placeholder() {
        assert_eq!(render_list(&[]), "No transactions yet.\n");
    }

    #[test]
    fn categories_list_ids_and_names() {
        let rendered = render_categories();
        assert_eq!(rendered.lines().count(), Category::ALL.len());
        assert!(rendered.starts_with("food            Food & Drinks\n"));
    }

    #[tokio::test]
    async fn list_filters_by_timeframe() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let all = run(&coordinator, command(&["list"]), false, now()).await.unwrap();
        assert_eq!(all.lines().count(), 3);

        let week = run(&coordinator, command(&["list", "--timeframe", "week"]), false, now())
            .await
            .unwrap();
        assert_eq!(week.lines().count(), 2);
        assert!(!week.contains("tx 3"));
    }

    #[tokio::test]
    async fn stats_split_and_buckets_cover_the_window() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let out = run(&coordinator, command(&["stats", "--expenses-only"]), false, now())
            .await
            .unwrap();

        assert!(out.starts_with("Last month: 2 transactions\n"));
        assert!(out.contains("  Food & Drinks        $20.00\n"));
        assert!(!out.contains("Transportation"));
        assert!(out.contains("Income: $50.00 (71.4%)\n"));
        assert!(out.contains("Expenses: $20.00 (28.6%)\n"));
    }

    #[tokio::test]
    async fn add_reports_the_notice_and_the_row() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let out = run(
            &coordinator,
            command(&[
                "add",
                "--title",
                "Bus",
                "--amount",
                "2.5",
                "--category",
                "transportation",
                "--expense",
            ]),
            false,
            now(),
        )
        .await
        .unwrap();

        assert!(out.starts_with("Transaction created successfully\n"));
        assert!(out.contains("-$2.50"));
        assert_eq!(coordinator.store().summary().expenses, Money::new(250));
    }

    #[tokio::test]
    async fn delete_reloads_and_prints_the_new_summary() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let out = run(&coordinator, command(&["delete", "2"]), false, now())
            .await
            .unwrap();

        assert_eq!(
            out,
            "Transaction deleted successfully\nBalance:  $45.00\nIncome:   $50.00\nExpenses: $5.00\n"
        );
    }

    #[tokio::test]
    async fn rejected_delete_surfaces_the_server_reason() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let err = run(&coordinator, command(&["delete", "99"]), false, now())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Transaction not found");
    }

    #[tokio::test]
    async fn signed_out_commands_fail_without_touching_the_remote() {
        let coordinator = seeded(SharedSession::default());

        let err = run(&coordinator, command(&["summary"]), false, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SignedOut));
        assert!(coordinator.store().is_empty());
    }

    #[tokio::test]
    async fn json_summary_includes_the_remote_copy() {
        let coordinator = seeded(SharedSession::signed_in("user_1"));

        let out = run(&coordinator, command(&["summary"]), true, now()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["summary"]["balance"], 2500);
        assert_eq!(value["summary"], value["remote_summary"]);
    }
}
