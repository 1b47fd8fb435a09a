use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use tablewatch::config::Config;
use tablewatch::error::{Error, TablewatchErrorTrait};
use tablewatch::models::RestaurantSummary;
use tablewatch::monitor::{Monitor, MonitorError, WatchTarget};
use tablewatch::notifications::{Notification, NotificationManager, WatchContext};
use tablewatch::opentable::OpenTableClient;
use tablewatch::utils::{parse_date, parse_time};

/// Arguments of the `watch` subcommand
#[derive(Debug, Clone)]
pub struct WatchParams {
    pub restaurant: String,
    pub date: String,
    pub time: String,
    pub party: u32,
    pub name: Option<String>,
}

impl WatchParams {
    /// Validate arguments into a monitor target
    pub fn target(&self) -> Result<WatchTarget> {
        let restaurant = self.restaurant.trim();
        if restaurant.is_empty() || restaurant.parse::<i64>().is_err() {
            anyhow::bail!("Restaurant id must be numeric, got {:?}", self.restaurant);
        }

        let date = parse_date(&self.date)
            .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", self.date))?;
        let time = parse_time(&self.time)
            .with_context(|| format!("Invalid time {:?}, expected HH:MM", self.time))?;

        if self.party == 0 {
            anyhow::bail!("Party size must be at least 1");
        }

        Ok(WatchTarget::new(restaurant, date, time, self.party))
    }
}

/// Fill in restaurant details from search, falling back to a bare label
async fn resolve_restaurant(
    client: &OpenTableClient,
    id: &str,
    name: Option<&str>,
) -> RestaurantSummary {
    let Some(name) = name else {
        return RestaurantSummary::from_id(id);
    };

    match client.autocomplete(name).await {
        Ok(results) => {
            if let Some(found) = results.into_iter().find(|r| r.id == id) {
                return found;
            }
            tracing::debug!(id, name, "Restaurant not among search results");
        }
        Err(e) => tracing::warn!(error = %e, "Restaurant lookup failed"),
    }

    RestaurantSummary {
        name: name.to_string(),
        ..RestaurantSummary::from_id(id)
    }
}

/// Queue a notification for the notifier task
///
/// Returns false, after logging, when the notifier is gone.
fn forward(tx: &mpsc::UnboundedSender<Notification>, notification: Notification) -> bool {
    let kind = notification.kind;
    if tx.send(notification).is_err() {
        tracing::warn!(%kind, "Notifier stopped, notification dropped");
        return false;
    }
    true
}

/// Log a classified failure before it is returned
fn log_failure(err: &Error, message: &str) {
    tracing::error!(
        category = %err.category(),
        recoverable = err.is_recoverable(),
        error = %err,
        "{message}"
    );
}

pub async fn watch(config: &Config, params: WatchParams) -> Result<()> {
    let target = params.target()?;

    let manager = NotificationManager::from_config(&config.notifications)
        .map_err(Error::from)
        .context("Invalid notification settings")?;

    let client = match OpenTableClient::connect(&config.opentable).await {
        Ok(client) => client,
        Err(e) => {
            let err = Error::from(e);
            log_failure(&err, "OpenTable session not started");
            return Err(err).context("Failed to start OpenTable session");
        }
    };

    let restaurant =
        resolve_restaurant(&client, &target.restaurant_id, params.name.as_deref()).await;
    let context = WatchContext::new(restaurant, target.clone());

    println!("\n✅  Monitoring: {} ({})", context.restaurant.name, context.restaurant.id);
    println!("   Preferred date : {}", target.date);
    println!("   Preferred time : {}", target.preferred_time_label());
    println!("   Party size     : {}", target.party_size);
    println!("   Channels       : {}\n", manager.channel_names().join(", "));

    manager.notify(&Notification::started(&context)).await;

    // Deliveries run on their own task so slow webhooks never delay a poll
    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    let notifier = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            manager.notify(&notification).await;
        }
        manager
    });

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping monitor");
            ctrl_c.cancel();
        }
    });

    let monitor = Monitor::new(client).with_poll_interval(config.poll_interval());
    let result = monitor
        .run(target, &cancel, |event| {
            forward(&tx, Notification::from_event(&context, &event));
        })
        .await;

    let (reason, failure) = match result {
        Ok(slot) => (format!("Preferred time {} found", slot.time_label()), None),
        Err(MonitorError::Cancelled) => ("Cancelled by user".to_string(), None),
        Err(e) => {
            let err = Error::from(e);
            log_failure(&err, "Monitor stopped");
            forward(&tx, Notification::error(&context, err.user_message()));
            ("Stopped after an error".to_string(), Some(err))
        }
    };

    drop(tx);
    let manager = notifier.await.context("Notifier task failed")?;
    manager.notify(&Notification::stopped(&context, reason)).await;

    match failure {
        Some(err) => Err(err).context("Monitoring failed"),
        None => Ok(()),
    }
}
