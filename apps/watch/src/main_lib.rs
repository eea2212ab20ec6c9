use std::sync::Arc;

use anyhow::Context;
use fintrack_client::{HttpGateway, WebSocketEventSource};
use fintrack_core::charts::{build_series_today, top_expense_categories, ChartWindow};
use fintrack_core::notifications::{Notification, NotificationLevel, NotificationSink};
use fintrack_core::sync::{FieldState, Snapshot, Subscription, ViewSynchronizer};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Surfaces user notifications as log lines.
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(target: "notifications", "{}", notification.message)
            }
            NotificationLevel::Error => {
                tracing::warn!(target: "notifications", "{}", notification.message)
            }
        }
    }
}

pub struct AppState {
    pub gateway: Arc<HttpGateway>,
    pub source: Arc<WebSocketEventSource>,
    pub synchronizer: ViewSynchronizer,
    subscription: Subscription,
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let gateway = Arc::new(HttpGateway::new(&config.api_url, config.api_token.clone())?);
    if !gateway.has_token() {
        tracing::warn!("FT_API_TOKEN is not set, requests will be unauthenticated");
    }

    let user = gateway
        .fetch_current_user()
        .await
        .context("Failed to load the current user")?;
    tracing::info!("Signed in as user {}", user.id);

    let synchronizer = ViewSynchronizer::new(
        gateway.clone(),
        Arc::new(TracingNotificationSink),
        config.sync_config(),
    );
    synchronizer.initialize(None, None);

    let source = Arc::new(WebSocketEventSource::new(&config.ws_url));
    let subscription = Subscription::subscribe(source.clone(), &synchronizer);
    source.connect(user.id);

    Ok(AppState {
        gateway,
        source,
        synchronizer,
        subscription,
    })
}

impl AppState {
    pub fn shutdown(mut self) {
        self.subscription.unsubscribe();
        self.source.disconnect();
        self.synchronizer.teardown();
    }
}

/// Logs a one-line summary after every published snapshot change.
pub fn spawn_snapshot_logger(synchronizer: &ViewSynchronizer) -> JoinHandle<()> {
    let mut changes = synchronizer.subscribe_changes();
    let token = synchronizer.lifecycle_token();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let line = describe_snapshot(&changes.borrow_and_update());
                    tracing::info!("{}", line);
                }
                _ = token.cancelled() => break,
            }
        }
    })
}

pub fn describe_snapshot(snapshot: &Snapshot) -> String {
    let stats = snapshot.stats();
    let freshness = snapshot.freshness();
    let stale = [
        freshness.wallets,
        freshness.total_balance,
        freshness.total_spending,
        freshness.total_saved,
    ]
    .contains(&FieldState::Stale);

    format!(
        "{} wallet(s), balance {} {}, spent {} {}, saved {} {}{}",
        snapshot.wallets().len(),
        stats.total_balance,
        stats.default_currency,
        stats.total_spending,
        stats.default_currency,
        stats.total_saved,
        stats.default_currency,
        if stale { " (refreshing)" } else { "" }
    )
}

/// One-off overview of recent activity and the monthly budget.
pub async fn log_overview(gateway: &HttpGateway) {
    match gateway.fetch_transactions().await {
        Ok(transactions) => {
            let week = build_series_today(&transactions, ChartWindow::Week);
            let income = week
                .iter()
                .fold(Decimal::ZERO, |total, b| total.saturating_add(b.income));
            let expense = week
                .iter()
                .fold(Decimal::ZERO, |total, b| total.saturating_add(b.expense));
            tracing::info!("Last 7 days: income {}, expenses {}", income, expense);

            for category in top_expense_categories(&transactions, 3) {
                tracing::info!(
                    "Top expense: {} {} ({}%, {} transaction(s))",
                    category.category_name,
                    category.total,
                    category.share,
                    category.count
                );
            }
        }
        Err(e) => tracing::warn!("Could not load transactions: {}", e),
    }

    match gateway.fetch_current_budget().await {
        Ok(Some(budget)) => tracing::info!(
            "Budget {}/{}: {} of {} spent, {} left{}",
            budget.month,
            budget.year,
            budget.monthly_spent,
            budget.monthly_limit,
            budget.remaining(),
            if budget.is_exceeded() { " (exceeded)" } else { "" }
        ),
        Ok(None) => tracing::info!("No budget set for the current month"),
        Err(e) => tracing::warn!("Could not load budget: {}", e),
    }
}
