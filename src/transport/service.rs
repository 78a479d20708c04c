//! Queue-fed dispatch service.
//!
//! # Responsibilities
//! - Accept request envelopes from any number of `DispatchHandle`s
//! - Run each dispatch as its own task and reply exactly once
//! - Bound in-flight dispatches with a semaphore
//! - Drain in-flight work on shutdown, up to a deadline
//!
//! # Design Decisions
//! - Permit acquired before the next request is taken (backpressure)
//! - `DispatchHandle::reserve` lets a reader wait for queue room before it
//!   reads its next request
//! - Replies travel over a `oneshot`, so correlation is implicit
//! - Dispatch tasks are never aborted; after the drain deadline the service
//!   returns and leaves stragglers running detached

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::ipc::{Dispatcher, RequestEnvelope, ResponseEnvelope};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Errors seen by a `DispatchHandle` caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service stopped accepting requests.
    #[error("dispatch service is closed")]
    Closed,

    /// The service accepted the request but dropped it without replying.
    #[error("dispatch service dropped the request")]
    Dropped,
}

/// One queued request and where to send its reply.
#[derive(Debug)]
pub struct DispatchRequest {
    pub envelope: RequestEnvelope,
    pub reply: oneshot::Sender<ResponseEnvelope>,
}

/// Client side of the service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<DispatchRequest>,
}

impl DispatchHandle {
    /// Queue `envelope` and wait for its response.
    pub async fn request(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, ServiceError> {
        self.reserve().await?.request(envelope).await
    }

    /// Wait for a free slot in the request queue.
    ///
    /// Callers that read requests from an unbounded source reserve before
    /// reading the next one, so a full queue pushes back on the source.
    pub async fn reserve(&self) -> Result<DispatchPermit, ServiceError> {
        let permit = self
            .tx
            .clone()
            .reserve_owned()
            .await
            .map_err(|_| ServiceError::Closed)?;
        Ok(DispatchPermit { permit })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A reserved slot in the service queue.
pub struct DispatchPermit {
    permit: mpsc::OwnedPermit<DispatchRequest>,
}

impl DispatchPermit {
    /// Send `envelope` through the reserved slot and wait for its response.
    pub async fn request(self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.permit.send(DispatchRequest { envelope, reply });
        rx.await.map_err(|_| ServiceError::Dropped)
    }
}

/// Serving loop that owns the request queue.
#[derive(Debug)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
    rx: mpsc::Receiver<DispatchRequest>,
    limit: Arc<Semaphore>,
    max_in_flight: usize,
    drain_timeout: Duration,
}

impl DispatchService {
    /// Create the service and its first handle.
    pub fn new(dispatcher: Arc<Dispatcher>, config: &WorkerConfig) -> (Self, DispatchHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let max_in_flight = config.max_in_flight.max(1);

        let service = Self {
            dispatcher,
            rx,
            limit: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            drain_timeout: Duration::from_secs(config.drain_timeout_secs),
        };
        (service, DispatchHandle { tx })
    }

    /// Dispatches currently running.
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.limit.available_permits()
    }

    /// Serve until shutdown is triggered or every handle is dropped, then drain.
    pub async fn run(mut self, shutdown: Shutdown) {
        tracing::info!(
            max_in_flight = self.max_in_flight,
            drain_timeout_secs = self.drain_timeout.as_secs(),
            "Dispatch service started"
        );

        loop {
            // Acquire permit first (backpressure)
            let permit = tokio::select! {
                _ = shutdown.wait() => break,
                permit = self.limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let request = tokio::select! {
                _ = shutdown.wait() => break,
                request = self.rx.recv() => request,
            };

            match request {
                Some(request) => self.spawn_dispatch(request, permit),
                None => {
                    tracing::debug!("All dispatch handles dropped");
                    break;
                }
            }
        }

        // Requests still queued are dropped; their callers see `Dropped`.
        self.rx.close();
        self.drain().await;
        tracing::info!("Dispatch service stopped");
    }

    fn spawn_dispatch(&self, request: DispatchRequest, permit: OwnedSemaphorePermit) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let limit = Arc::clone(&self.limit);
        let max_in_flight = self.max_in_flight;

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            %request_id,
            route = request.envelope.route.as_deref().unwrap_or_default(),
        );
        metrics::record_in_flight(self.in_flight());

        tokio::spawn(
            async move {
                let response = dispatcher.dispatch(request.envelope).await;
                if request.reply.send(response).is_err() {
                    tracing::debug!("Requester went away before the reply");
                }
                drop(permit);
                metrics::record_in_flight(max_in_flight - limit.available_permits());
            }
            .instrument(span),
        );
    }

    /// Wait for every permit to come back, or for the drain deadline.
    async fn drain(&self) {
        let in_flight = self.in_flight();
        if in_flight == 0 {
            return;
        }
        tracing::info!(in_flight, "Draining in-flight dispatches");

        let all = u32::try_from(self.max_in_flight).unwrap_or(u32::MAX);
        match tokio::time::timeout(self.drain_timeout, self.limit.acquire_many(all)).await {
            Ok(_) => tracing::info!("In-flight dispatches finished"),
            Err(_) => tracing::warn!(
                remaining = self.in_flight(),
                "Drain deadline reached, leaving dispatches running"
            ),
        }
    }
}

/// Spawn the service on the runtime and return a handle to it.
pub fn spawn(
    dispatcher: Arc<Dispatcher>,
    config: &WorkerConfig,
    shutdown: Shutdown,
) -> (DispatchHandle, tokio::task::JoinHandle<()>) {
    let (service, handle) = DispatchService::new(dispatcher, config);
    let task = tokio::spawn(service.run(shutdown));
    (handle, task)
}
