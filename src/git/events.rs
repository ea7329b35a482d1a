//! Host document notifications.
//!
//! The editor reports documents being closed or edited; either one makes the
//! cached blame for that file stale.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::git::source::BlameSource;
use crate::git::store::BlameStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    DocumentClosed(String),
    DocumentChanged(String),
}

impl HostEvent {
    pub fn file(&self) -> &str {
        match self {
            HostEvent::DocumentClosed(file) | HostEvent::DocumentChanged(file) => file,
        }
    }
}

impl<S: BlameSource + 'static> BlameStore<S> {
    pub fn handle_event(&self, event: &HostEvent) {
        tracing::debug!("Host event: {:?}", event);
        self.invalidate(event.file());
    }
}

/// Apply events until every sender is dropped. Returns how many were handled.
pub async fn watch_events<S>(
    store: Arc<BlameStore<S>>,
    mut events: mpsc::Receiver<HostEvent>,
) -> usize
where
    S: BlameSource + 'static,
{
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        store.handle_event(&event);
        handled += 1;
    }
    tracing::debug!("Host event channel closed after {} events", handled);
    handled
}
