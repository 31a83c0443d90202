//! Fire-and-forget event delivery to the (external) catalog client.

use crate::model::GroupSyncResult;
use async_trait::async_trait;
use feedsync_common::Error;
use serde::Serialize;

/// The three sync-lifecycle events a feed emits while syncing a group.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum FeedEvent {
    FeedGroupSyncStarted { feed: String, group: String },
    FeedGroupSyncCompleted { feed: String, group: String, result: GroupSyncResult },
    FeedGroupSyncFailed { feed: String, group: String, error: String },
}

/// The catalog client boundary. Implementations may fail; failures are
/// logged at warning and never propagated (events are best-effort).
#[async_trait]
pub trait EventClient: Send + Sync {
    async fn add_event(&self, event: FeedEvent) -> Result<(), Error>;
}

/// Submit `event` via `client` if present; any delivery error is swallowed
/// and logged. With no client, log the event's JSON at info.
pub async fn notify(event: FeedEvent, client: Option<&dyn EventClient>) {
    match client {
        Some(client) => {
            if let Err(err) = client.add_event(event).await {
                log::warn!("Error delivering feed sync event: {err}");
            }
        }
        None => match serde_json::to_string(&event) {
            Ok(json) => log::info!("Event: {json}"),
            Err(err) => log::warn!("Error serializing feed sync event for logging: {err}"),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingClient {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventClient for CountingClient {
        async fn add_event(&self, _event: FeedEvent) -> Result<(), Error> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl EventClient for FailingClient {
        async fn add_event(&self, _event: FeedEvent) -> Result<(), Error> {
            Err(Error::EventDelivery(anyhow::anyhow!("catalog unreachable")))
        }
    }

    #[tokio::test]
    async fn delivers_to_client() {
        let count = Arc::new(AtomicUsize::new(0));
        let client = CountingClient {
            count: count.clone(),
        };
        notify(
            FeedEvent::FeedGroupSyncStarted {
                feed: "vulnerabilities".into(),
                group: "debian:10".into(),
            },
            Some(&client),
        )
        .await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_errors_are_swallowed() {
        notify(
            FeedEvent::FeedGroupSyncFailed {
                feed: "vulnerabilities".into(),
                group: "debian:10".into(),
                error: "boom".into(),
            },
            Some(&FailingClient),
        )
        .await;
        // no panic == success
    }

    #[tokio::test]
    async fn no_client_logs_instead_of_panicking() {
        notify(
            FeedEvent::FeedGroupSyncStarted {
                feed: "vulnerabilities".into(),
                group: "debian:10".into(),
            },
            None,
        )
        .await;
    }
}
