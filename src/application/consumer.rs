//! Consumer loop: subscribe, receive, process, resolve.
//!
//! One loop instance processes deliveries strictly sequentially; at most one
//! delivery is in flight at a time. Cancellation is cooperative and observed
//! only between deliveries, so an in-flight delivery always runs to completion
//! and gets its resolution.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::services::RefreshService;
use crate::domain::entities::LinkNotification;
use crate::domain::messaging::{DeliveryStream, MessageConsumer, Resolution};
use crate::domain::repositories::LinkRepository;
use crate::domain::scraper::Scraper;
use crate::error::AppError;

/// Consumes refresh notifications from a queue and dispatches them to a
/// [`RefreshService`].
pub struct ConsumerLoop<R: LinkRepository, S: Scraper> {
    consumer: Arc<dyn MessageConsumer>,
    service: Arc<RefreshService<R, S>>,
    queue: String,
}

impl<R, S> ConsumerLoop<R, S>
where
    R: LinkRepository + 'static,
    S: Scraper + 'static,
{
    /// Creates a new consumer loop bound to `queue`.
    pub fn new(
        consumer: Arc<dyn MessageConsumer>,
        service: Arc<RefreshService<R, S>>,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            consumer,
            service,
            queue: queue.into(),
        }
    }

    /// Subscribes to the queue and spawns the processing loop.
    ///
    /// The caller does not block; the returned handle completes once the loop
    /// has stopped (cancellation observed or stream closed by the broker).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Subscribe`] if the subscription cannot be
    /// established; in that case nothing is left running.
    pub async fn start(&self, cancel: CancellationToken) -> Result<JoinHandle<()>, AppError> {
        let stream = self.consumer.subscribe(&self.queue).await?;
        info!(queue = %self.queue, "subscribed");

        let service = Arc::clone(&self.service);
        Ok(tokio::spawn(run(stream, service, cancel)))
    }
}

async fn run<R, S>(
    mut stream: Box<dyn DeliveryStream>,
    service: Arc<RefreshService<R, S>>,
    cancel: CancellationToken,
) where
    R: LinkRepository,
    S: Scraper,
{
    loop {
        // Cancellation wins when both are ready, so nothing delivered after
        // the signal is handled.
        let delivery = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("cancellation observed, stopping");
                break;
            }
            delivery = stream.next() => match delivery {
                Some(delivery) => delivery,
                None => {
                    warn!("delivery stream closed by broker, stopping");
                    break;
                }
            },
        };

        let resolution = match process(&service, delivery.payload()).await {
            Ok(()) => Resolution::Acknowledge,
            Err(err) => {
                // No retry or dead-letter path: the message is dropped.
                warn!(error = %err, "refresh failed, dropping message");
                Resolution::Reject
            }
        };

        if let Err(err) = delivery.resolve(resolution).await {
            warn!(error = %err, "failed to resolve delivery");
        }
    }
}

async fn process<R, S>(
    service: &RefreshService<R, S>,
    payload: &[u8],
) -> Result<(), AppError>
where
    R: LinkRepository,
    S: Scraper,
{
    let notification = LinkNotification::decode(payload)?;
    let record = service.refresh(&notification).await?;
    info!(id = %record.id, title = %record.title, "link refreshed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LinkId, LinkRecord};
    use crate::domain::messaging::Delivery;
    use crate::domain::repositories::MockLinkRepository;
    use crate::domain::scraper::{MockScraper, ScrapeResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct TestDelivery {
        payload: Vec<u8>,
        resolutions: Arc<Mutex<Vec<Resolution>>>,
    }

    #[async_trait]
    impl Delivery for TestDelivery {
        fn payload(&self) -> &[u8] {
            &self.payload
        }

        async fn resolve(self: Box<Self>, resolution: Resolution) -> Result<(), AppError> {
            self.resolutions.lock().unwrap().push(resolution);
            Ok(())
        }
    }

    struct TestStream {
        rx: mpsc::Receiver<Box<dyn Delivery>>,
    }

    #[async_trait]
    impl DeliveryStream for TestStream {
        async fn next(&mut self) -> Option<Box<dyn Delivery>> {
            self.rx.recv().await
        }
    }

    struct TestConsumer {
        stream: Mutex<Option<Box<dyn DeliveryStream>>>,
        fail_subscribe: bool,
    }

    #[async_trait]
    impl MessageConsumer for TestConsumer {
        async fn subscribe(&self, _queue: &str) -> Result<Box<dyn DeliveryStream>, AppError> {
            if self.fail_subscribe {
                return Err(AppError::subscribe("queue unreachable"));
            }
            Ok(self.stream.lock().unwrap().take().expect("stream taken twice"))
        }
    }

    fn test_record(id: LinkId) -> LinkRecord {
        LinkRecord {
            id,
            url: "https://example.com".to_string(),
            title: "Title".to_string(),
            tags: ["go"].into_iter().map(String::from).collect(),
            images: vec![],
            user_id: "u-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Harness {
        tx: mpsc::Sender<Box<dyn Delivery>>,
        resolutions: Arc<Mutex<Vec<Resolution>>>,
        consumer_loop: ConsumerLoop<MockLinkRepository, MockScraper>,
    }

    fn harness(repo: MockLinkRepository, scraper: MockScraper) -> Harness {
        let (tx, rx) = mpsc::channel(16);
        let consumer = Arc::new(TestConsumer {
            stream: Mutex::new(Some(Box::new(TestStream { rx }) as Box<dyn DeliveryStream>)),
            fail_subscribe: false,
        });
        let service = Arc::new(RefreshService::new(Arc::new(repo), Arc::new(scraper)));
        Harness {
            tx,
            resolutions: Arc::new(Mutex::new(Vec::new())),
            consumer_loop: ConsumerLoop::new(consumer, service, "links.refresh"),
        }
    }

    impl Harness {
        async fn deliver(&self, payload: &[u8]) {
            // A stopped loop drops its stream; sending then is a no-op.
            self.tx
                .send(Box::new(TestDelivery {
                    payload: payload.to_vec(),
                    resolutions: Arc::clone(&self.resolutions),
                }))
                .await
                .ok();
        }
    }

    #[tokio::test]
    async fn test_successful_delivery_is_acknowledged() {
        let mut repo = MockLinkRepository::new();
        let mut scraper = MockScraper::new();
        let id: LinkId = "507f1f77bcf86cd799439011".parse().unwrap();

        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(test_record(id))));
        scraper
            .expect_parse()
            .returning(|_| Ok(ScrapeResult::default()));
        repo.expect_update()
            .returning(move |_| Ok(test_record(id)));

        let h = harness(repo, scraper);
        let cancel = CancellationToken::new();
        let handle = h.consumer_loop.start(cancel.clone()).await.unwrap();

        h.deliver(br#"{"id":"507f1f77bcf86cd799439011"}"#).await;

        drop(h.tx);
        handle.await.unwrap();

        assert_eq!(*h.resolutions.lock().unwrap(), [Resolution::Acknowledge]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected_without_touching_store() {
        // No expectations set: any repository call would panic the test.
        let repo = MockLinkRepository::new();
        let scraper = MockScraper::new();

        let h = harness(repo, scraper);
        let handle = h
            .consumer_loop
            .start(CancellationToken::new())
            .await
            .unwrap();

        h.deliver(br#"{"id":"not-a-valid-id"}"#).await;
        h.deliver(b"not json at all").await;

        drop(h.tx);
        handle.await.unwrap();

        assert_eq!(
            *h.resolutions.lock().unwrap(),
            [Resolution::Reject, Resolution::Reject]
        );
    }

    #[tokio::test]
    async fn test_missing_record_is_rejected() {
        let mut repo = MockLinkRepository::new();
        let scraper = MockScraper::new();

        repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let h = harness(repo, scraper);
        let handle = h
            .consumer_loop
            .start(CancellationToken::new())
            .await
            .unwrap();

        h.deliver(br#"{"id":"507f1f77bcf86cd799439011"}"#).await;

        drop(h.tx);
        handle.await.unwrap();

        assert_eq!(*h.resolutions.lock().unwrap(), [Resolution::Reject]);
    }

    #[tokio::test]
    async fn test_loop_survives_failures_and_keeps_order() {
        let mut repo = MockLinkRepository::new();
        let mut scraper = MockScraper::new();

        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(test_record(id))));
        scraper
            .expect_parse()
            .returning(|_| Ok(ScrapeResult::default()));
        repo.expect_update()
            .returning(move |update| Ok(test_record(update.id)));

        let h = harness(repo, scraper);
        let handle = h
            .consumer_loop
            .start(CancellationToken::new())
            .await
            .unwrap();

        h.deliver(br#"{"id":"507f1f77bcf86cd799439011"}"#).await;
        h.deliver(b"broken").await;
        h.deliver(br#"{"id":"507f1f77bcf86cd799439012"}"#).await;

        drop(h.tx);
        handle.await.unwrap();

        // Processed sequentially in receipt order; the failure in the middle
        // did not stop the loop.
        assert_eq!(
            *h.resolutions.lock().unwrap(),
            [
                Resolution::Acknowledge,
                Resolution::Reject,
                Resolution::Acknowledge
            ]
        );
    }

    #[tokio::test]
    async fn test_subscription_failure_aborts_start() {
        let consumer = Arc::new(TestConsumer {
            stream: Mutex::new(None),
            fail_subscribe: true,
        });
        let service = Arc::new(RefreshService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockScraper::new()),
        ));
        let consumer_loop = ConsumerLoop::new(consumer, service, "links.refresh");

        let err = consumer_loop
            .start(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Subscribe { .. }));
    }

    struct StaticRepo;

    #[async_trait]
    impl LinkRepository for StaticRepo {
        async fn find_by_id(&self, id: LinkId) -> Result<Option<LinkRecord>, AppError> {
            Ok(Some(test_record(id)))
        }

        async fn update(
            &self,
            update: crate::domain::entities::LinkUpdate,
        ) -> Result<LinkRecord, AppError> {
            Ok(test_record(update.id))
        }
    }

    struct BlockingScraper {
        started: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl Scraper for BlockingScraper {
        async fn parse(&self, _url: &str) -> Result<ScrapeResult, AppError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(ScrapeResult::default())
        }
    }

    #[tokio::test]
    async fn test_cancellation_completes_in_flight_delivery() {
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());

        let (tx, rx) = mpsc::channel(16);
        let consumer = Arc::new(TestConsumer {
            stream: Mutex::new(Some(Box::new(TestStream { rx }) as Box<dyn DeliveryStream>)),
            fail_subscribe: false,
        });
        let service = Arc::new(RefreshService::new(
            Arc::new(StaticRepo),
            Arc::new(BlockingScraper {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
        ));
        let consumer_loop = ConsumerLoop::new(consumer, service, "links.refresh");

        let cancel = CancellationToken::new();
        let handle = consumer_loop.start(cancel.clone()).await.unwrap();

        let resolutions = Arc::new(Mutex::new(Vec::new()));
        tx.send(Box::new(TestDelivery {
            payload: br#"{"id":"507f1f77bcf86cd799439011"}"#.to_vec(),
            resolutions: Arc::clone(&resolutions),
        }) as Box<dyn Delivery>)
            .await
            .unwrap();

        // Cancel while the delivery is mid-scrape, then let it finish.
        started.notified().await;
        cancel.cancel();
        release.notify_one();
        handle.await.unwrap();

        // The in-flight delivery ran to completion and was still acknowledged.
        assert_eq!(*resolutions.lock().unwrap(), [Resolution::Acknowledge]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_before_next_delivery() {
        let repo = MockLinkRepository::new();
        let scraper = MockScraper::new();

        let h = harness(repo, scraper);
        let cancel = CancellationToken::new();
        let handle = h.consumer_loop.start(cancel.clone()).await.unwrap();

        cancel.cancel();
        handle.await.unwrap();

        // Delivered only after the loop stopped: never handled, never resolved.
        h.deliver(br#"{"id":"507f1f77bcf86cd799439011"}"#).await;
        assert!(h.resolutions.lock().unwrap().is_empty());
    }
}
