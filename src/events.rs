// events.rs - Typed publish/subscribe channel between the backend and the UI

use futures::stream::{self, Stream};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Named topics a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    DownloadStart,
    DownloadProgress,
    DownloadFinished,
    Launching,
}

impl Topic {
    pub const fn name(self) -> &'static str {
        match self {
            Topic::DownloadStart => "downloadStart",
            Topic::DownloadProgress => "downloadProgress",
            Topic::DownloadFinished => "downloadFinished",
            Topic::Launching => "launching",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend lifecycle signal with its payload.
///
/// Progress fields are optional: a signal that arrives without them is
/// delivered as-is and left for the consumer to ignore.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    DownloadStart { total: u64 },
    DownloadProgress { progress: Option<u64>, remaining: Option<u64> },
    DownloadFinished,
    Launching { id: String },
}

impl BackendEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BackendEvent::DownloadStart { .. } => Topic::DownloadStart,
            BackendEvent::DownloadProgress { .. } => Topic::DownloadProgress,
            BackendEvent::DownloadFinished => Topic::DownloadFinished,
            BackendEvent::Launching { .. } => Topic::Launching,
        }
    }

    pub fn progress(progress: u64, remaining: u64) -> Self {
        BackendEvent::DownloadProgress {
            progress: Some(progress),
            remaining: Some(remaining),
        }
    }
}

struct Subscriber {
    id: u64,
    topics: Vec<Topic>,
    sender: mpsc::UnboundedSender<BackendEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Process-wide broadcast bus. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a listener for `topics`. The registration lives as long as
    /// the returned [`Listener`].
    pub fn subscribe(&self, topics: &[Topic]) -> Listener {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push(Subscriber {
            id,
            topics: topics.to_vec(),
            sender,
        });
        log::debug!("listener #{id} subscribed to {topics:?}");

        Listener {
            id,
            receiver,
            bus: self.clone(),
        }
    }

    /// Delivers `event` to every listener of its topic, in emission order.
    /// Returns how many listeners received it.
    pub fn emit(&self, event: BackendEvent) -> usize {
        let topic = event.topic();
        let mut registry = self.registry();
        registry.subscribers.retain(|s| !s.sender.is_closed());

        let mut delivered = 0;
        for subscriber in registry.subscribers.iter().filter(|s| s.topics.contains(&topic)) {
            if subscriber.sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        log::trace!("{topic} delivered to {delivered} listener(s)");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    fn unsubscribe(&self, id: u64) {
        self.registry().subscribers.retain(|s| s.id != id);
        log::debug!("listener #{id} unsubscribed");
    }

    /// Stream of events for `topics`. Nothing is registered until the stream
    /// is first polled, and the registration is dropped with the stream.
    pub fn watch(&self, topics: &'static [Topic]) -> impl Stream<Item = BackendEvent> + Send + 'static {
        let bus = self.clone();
        stream::unfold(None, move |listener: Option<Listener>| {
            let bus = bus.clone();
            async move {
                let mut listener = listener.unwrap_or_else(|| bus.subscribe(topics));
                let event = listener.recv().await?;
                Some((event, Some(listener)))
            }
        })
    }
}

pub struct Listener {
    id: u64,
    receiver: mpsc::UnboundedReceiver<BackendEvent>,
    bus: EventBus,
}

impl Listener {
    pub async fn recv(&mut self) -> Option<BackendEvent> {
        self.receiver.recv().await
    }

    #[cfg(test)]
    pub fn try_recv(&mut self) -> Option<BackendEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn listener_only_sees_its_topics() {
        let bus = EventBus::new();
        let mut progress = bus.subscribe(&[Topic::DownloadStart, Topic::DownloadProgress]);
        let mut launch = bus.subscribe(&[Topic::Launching]);

        bus.emit(BackendEvent::DownloadStart { total: 3 });
        bus.emit(BackendEvent::Launching { id: "1.20.1".into() });
        bus.emit(BackendEvent::progress(1, 2));

        assert_eq!(progress.try_recv(), Some(BackendEvent::DownloadStart { total: 3 }));
        assert_eq!(progress.try_recv(), Some(BackendEvent::progress(1, 2)));
        assert_eq!(progress.try_recv(), None);

        assert_eq!(launch.try_recv(), Some(BackendEvent::Launching { id: "1.20.1".into() }));
        assert_eq!(launch.try_recv(), None);
    }

    #[test]
    fn dropping_listener_unsubscribes() {
        let bus = EventBus::new();
        let listener = bus.subscribe(&[Topic::DownloadFinished]);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.emit(BackendEvent::DownloadFinished), 1);

        drop(listener);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.emit(BackendEvent::DownloadFinished), 0);
    }

    #[tokio::test]
    async fn watch_subscribes_lazily_and_once() {
        let bus = EventBus::new();
        let mut stream = Box::pin(bus.watch(&[Topic::DownloadProgress]));
        assert_eq!(bus.subscriber_count(), 0);

        let emitter = bus.clone();
        let producer = tokio::spawn(async move {
            while emitter.subscriber_count() == 0 {
                tokio::task::yield_now().await;
            }
            for done in 1..=3 {
                emitter.emit(BackendEvent::progress(done, 3 - done));
            }
        });

        for done in 1..=3 {
            assert_eq!(stream.next().await, Some(BackendEvent::progress(done, 3 - done)));
        }
        producer.await.unwrap();
        assert_eq!(bus.subscriber_count(), 1);

        drop(stream);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn topic_names_match_wire_names() {
        assert_eq!(Topic::DownloadStart.to_string(), "downloadStart");
        assert_eq!(BackendEvent::DownloadFinished.topic().name(), "downloadFinished");
        assert_eq!(BackendEvent::Launching { id: String::new() }.topic(), Topic::Launching);
    }
}
