//! Owned subscription to a video element's media events.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::platform::MediaEvent;

/// Forwards media events to a handler until dropped.
///
/// Dropping the subscription stops the listener, so a released session
/// leaves no listener behind.
#[derive(Debug)]
pub(crate) struct MediaSubscription {
    task: JoinHandle<()>,
}

impl MediaSubscription {
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(mut events: broadcast::Receiver<MediaEvent>, mut on_event: F) -> Self
    where
        F: FnMut(MediaEvent) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => on_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Media event listener lagged, {} event(s) dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { task }
    }
}

impl Drop for MediaSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_forwards_events_until_dropped() {
        let (tx, rx) = broadcast::channel(8);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = MediaSubscription::spawn(rx, move |e| sink.lock().unwrap().push(e));

        tx.send(MediaEvent::Play).unwrap();
        tx.send(MediaEvent::Pause).unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(*seen.lock().unwrap(), vec![MediaEvent::Play, MediaEvent::Pause]);

        drop(subscription);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert_eq!(tx.receiver_count(), 0);
    }
}
