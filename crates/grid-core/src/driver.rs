//! Async driver pairing a [`TableController`] with a [`QueryAdapter`]
//!
//! Fetches run as tokio tasks. Their outcomes travel back over a channel
//! and are only applied from [`TableDriver::pump`] (called once per UI
//! frame) or [`TableDriver::next_completion`], so all table state stays
//! owned by one thread. The controller's generation check drops any
//! completion that belongs to a superseded request.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::adapter::QueryAdapter;
use crate::error::Result;
use crate::response::Connection;
use crate::table::{
    FetchRequest, Resolution, RowRenderer, TableAction, TableController, TableFrame, TableRow,
};

type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Outcome of one spawned fetch
struct Completion<R> {
    generation: u64,
    outcome: Result<Connection<R>>,
}

/// Runs a table's fetches on a tokio runtime
pub struct TableDriver<R> {
    controller: TableController<R>,
    adapter: Arc<dyn QueryAdapter>,
    runtime: Handle,
    tx: UnboundedSender<Completion<R>>,
    rx: UnboundedReceiver<Completion<R>>,
    notifier: Option<Notifier>,
    in_flight: usize,
}

impl<R> TableDriver<R>
where
    R: TableRow + DeserializeOwned + Send + 'static,
{
    pub fn new(controller: TableController<R>, adapter: Arc<dyn QueryAdapter>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            adapter,
            runtime,
            tx,
            rx,
            notifier: None,
            in_flight: 0,
        }
    }

    /// Called from the fetch task once its outcome is queued (e.g. to request a repaint)
    pub fn with_notifier(mut self, notifier: impl Fn() + Send + Sync + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    pub fn controller(&self) -> &TableController<R> {
        &self.controller
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.source_name()
    }

    /// Number of spawned fetches whose outcome has not been received yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Issue the initial fetch
    pub fn start(&mut self) {
        if let Some(request) = self.controller.start() {
            self.spawn(request);
        }
    }

    /// Apply a UI action and spawn the fetch it implies
    pub fn dispatch(&mut self, action: TableAction) -> Result<()> {
        if let Some(request) = self.controller.dispatch(action)? {
            self.spawn(request);
        }
        Ok(())
    }

    /// Apply every completion that has arrived. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            handled += 1;
        }
        handled
    }

    /// Wait for the next completion and apply it
    pub async fn next_completion(&mut self) -> Option<Resolution> {
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    pub fn render(&self, renderer: &impl RowRenderer<R>) -> TableFrame {
        self.controller.render(renderer)
    }

    fn apply(&mut self, completion: Completion<R>) -> Resolution {
        self.in_flight = self.in_flight.saturating_sub(1);
        let resolution = self.controller.resolve(completion.generation, completion.outcome);
        if let Resolution::Refetch(request) = &resolution {
            self.spawn(request.clone());
        }
        resolution
    }

    fn spawn(&mut self, request: FetchRequest) {
        let adapter = Arc::clone(&self.adapter);
        let tx = self.tx.clone();
        let notifier = self.notifier.clone();
        let object_name = self.controller.config().queried_object_name.clone();
        let table = self.controller.id();

        debug!(
            %table,
            source = adapter.source_name(),
            generation = request.generation,
            "Spawning fetch"
        );

        self.in_flight += 1;
        self.runtime.spawn(async move {
            let outcome = match adapter.fetch(&request.variables).await {
                Ok(response) => Connection::from_response(&response, &object_name),
                Err(e) => Err(e),
            };

            if tx
                .send(Completion {
                    generation: request.generation,
                    outcome,
                })
                .is_err()
            {
                debug!(%table, generation = request.generation, "Table dropped before fetch completed");
                return;
            }

            if let Some(notify) = notifier {
                notify();
            }
        });
    }
}
