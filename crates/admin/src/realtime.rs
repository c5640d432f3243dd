//! Live order list.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rojarhat_backend::{ChangeFeed, ChangeHub, ChangeKind, StoreBackend};
use rojarhat_core::{Order, OrderId};

use crate::error::AdminError;
use crate::orders::OrderReader;

/// Table whose changes trigger a refresh.
pub const ORDERS_TABLE: &str = "orders";

/// Re-read the order list on every change to the orders table.
///
/// Sends one result per change to `sink`. Returns when the feed closes or
/// the receiver is dropped; the subscription is released on return.
pub async fn watch_orders<F>(
    reader: &OrderReader,
    feed: &F,
    sink: mpsc::Sender<Result<Vec<Order>, AdminError>>,
) where
    F: ChangeFeed + ?Sized,
{
    let mut subscription = feed.subscribe(ORDERS_TABLE);
    info!(table = ORDERS_TABLE, "Watching for order changes");

    while let Some(event) = subscription.next().await {
        debug!(kind = %event.kind, "Order change received");
        let result = reader.list_orders(None).await;
        if let Err(e) = &result {
            warn!(error = %e, "Refresh after order change failed");
        }
        if sink.send(result).await.is_err() {
            debug!("Order watcher receiver dropped");
            break;
        }
    }

    info!(table = ORDERS_TABLE, "Stopped watching order changes");
}

/// Publish `orders` changes on `hub` by polling `backend` every `interval`.
///
/// For backends without a push transport. A change is any difference in the
/// set of order IDs or their statuses; the first successful poll only
/// records a baseline. The first failure of a run of failed polls is sent to
/// `sink` as [`AdminError::Backend`] and polling continues. Returns when the
/// receiver is dropped.
pub async fn poll_order_changes(
    backend: &dyn StoreBackend,
    hub: &ChangeHub,
    interval: Duration,
    sink: mpsc::Sender<Result<Vec<Order>, AdminError>>,
) {
    let mut previous: Option<BTreeMap<OrderId, Option<String>>> = None;
    let mut failing = false;
    let mut ticker = tokio::time::interval(interval);

    while !sink.is_closed() {
        ticker.tick().await;
        let current: BTreeMap<_, _> = match backend.list_orders().await {
            Ok(records) => records
                .into_iter()
                .map(|record| (record.id, record.status))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Order poll failed");
                if !failing && sink.send(Err(AdminError::Backend(e))).await.is_err() {
                    break;
                }
                failing = true;
                continue;
            }
        };
        failing = false;

        let kind = match &previous {
            None => None,
            Some(prev) if prev.len() < current.len() => Some(ChangeKind::Insert),
            Some(prev) if prev.len() > current.len() => Some(ChangeKind::Delete),
            Some(prev) if prev != &current => Some(ChangeKind::Update),
            Some(_) => None,
        };
        if let Some(kind) = kind {
            debug!(%kind, orders = current.len(), "Order poll found a change");
            hub.publish(ORDERS_TABLE, kind);
        }
        previous = Some(current);
    }

    debug!("Order poller receiver dropped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rojarhat_backend::memory::{BackendCall, MemoryBackend};
    use rojarhat_backend::{BackendError, MemoryStorage};
    use rojarhat_core::{CustomerInfo, NewOrder, OrderStatus};
    use rust_decimal::Decimal;
    use tokio::time::timeout;

    use super::*;

    fn order() -> NewOrder {
        NewOrder {
            order_code: "RH-261019-0007".to_string(),
            customer: CustomerInfo {
                name: "রহিম".to_string(),
                phone: "01700000000".to_string(),
                address: "ঢাকা".to_string(),
                customer_id: None,
            },
            total_price: Decimal::from(500),
            status: OrderStatus::Pending,
            items: vec![],
        }
    }

    #[tokio::test]
    async fn test_refreshes_on_insert() {
        let backend = Arc::new(MemoryBackend::new());
        let reader = OrderReader::new(backend.clone(), Arc::new(MemoryStorage::new()));
        let (tx, mut rx) = mpsc::channel(4);

        let watcher = {
            let backend = backend.clone();
            tokio::spawn(async move { watch_orders(&reader, backend.as_ref(), tx).await })
        };

        // Wait for the watcher to subscribe before writing
        while backend.feed().subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        backend.insert_order(&order()).await.unwrap();

        let orders = rx.recv().await.unwrap().unwrap();
        assert_eq!(orders.len(), 1);

        drop(rx);
        backend.insert_order(&order()).await.unwrap();
        watcher.await.unwrap();
        assert_eq!(backend.feed().subscriber_count(), 0);
    }

    fn polls(backend: &MemoryBackend) -> usize {
        backend
            .calls()
            .iter()
            .filter(|call| **call == BackendCall::ListOrders)
            .count()
    }

    #[tokio::test]
    async fn test_poll_reports_failure_once_then_publishes_changes() {
        let backend = Arc::new(MemoryBackend::new());
        backend.update_faults(|f| f.flat_read = true);
        let hub = ChangeHub::default();
        let mut subscription = hub.subscribe(ORDERS_TABLE);
        let (tx, mut rx) = mpsc::channel(4);

        let poller = {
            let backend = backend.clone();
            let hub = hub.clone();
            tokio::spawn(async move {
                poll_order_changes(backend.as_ref(), &hub, Duration::from_millis(5), tx).await;
            })
        };

        let failure = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(
            failure,
            Err(AdminError::Backend(BackendError::Unavailable(_)))
        ));

        // Still failing: no second report
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());

        backend.update_faults(|f| f.flat_read = false);
        // Two more polls guarantee one full successful poll as the baseline
        let baseline = polls(&backend) + 2;
        while polls(&backend) < baseline {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        backend.insert_order(&order()).await.unwrap();
        let event = timeout(Duration::from_secs(5), subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);

        drop(rx);
        timeout(Duration::from_secs(5), poller).await.unwrap().unwrap();
    }
}
