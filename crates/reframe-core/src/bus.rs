//! An in-process transport.
//!
//! [`LocalBus`] delivers synchronously on the publishing thread. Values are
//! routed by topic name and checked against the subscriber's message type;
//! a value of the wrong type is dropped with a warning. It backs the
//! integration tests and lets the relay run without a middleware.

use crate::{
    engine::Message,
    transport::{Publication, SubscriptionHandle, Transport},
    types::DeliveryConfig,
};
use eyre::{Result, ensure, eyre};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::{
    any::Any,
    marker::PhantomData,
    sync::{Arc, Weak},
};
use tracing::{debug, trace, warn};

type Deliver = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct Subscriber {
    id: u64,
    deliver: Deliver,
}

#[derive(Default)]
struct Topics {
    next_id: u64,
    subscribers: IndexMap<String, Vec<Subscriber>>,
}

/// In-process publish/subscribe bus. Cloning yields another handle to the
/// same bus.
#[derive(Clone, Default)]
pub struct LocalBus {
    topics: Arc<Mutex<Topics>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `value` on `topic` and return the number of subscribers it
    /// was handed to.
    pub fn publish<M>(&self, topic: &str, value: M) -> usize
    where
        M: Message,
    {
        deliver(&self.topics, topic, value)
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .subscribers
            .get(topic)
            .map_or(0, |subscribers| subscribers.len())
    }

    /// Subscribe to `topic` and collect every value published there into a
    /// channel. Dropping the handle ends the subscription.
    pub fn tap<M>(&self, topic: &str) -> Result<(SubscriptionHandle, flume::Receiver<M>)>
    where
        M: Message,
    {
        let (tx, rx) = flume::unbounded();
        let topic_owned = topic.to_string();

        let handle = Transport::<M>::subscribe(
            self,
            topic,
            &DeliveryConfig::default(),
            move |value: M| {
                if tx.send(value).is_err() {
                    trace!(topic = %topic_owned, "Tap receiver dropped");
                }
            },
        )?;

        Ok((handle, rx))
    }

    fn add_subscriber(&self, topic: &str, deliver: Deliver) -> u64 {
        let mut topics = self.topics.lock();
        let id = topics.next_id;
        topics.next_id += 1;
        topics
            .subscribers
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { id, deliver });
        id
    }
}

fn deliver<M>(topics: &Mutex<Topics>, topic: &str, value: M) -> usize
where
    M: Message,
{
    // Callbacks run outside the lock so that they can publish themselves.
    let targets: Vec<Deliver> = {
        let topics = topics.lock();
        match topics.subscribers.get(topic) {
            Some(subscribers) => subscribers.iter().map(|s| s.deliver.clone()).collect(),
            None => Vec::new(),
        }
    };

    trace!(
        topic = %topic,
        msg_type = %M::KIND,
        num_subscribers = targets.len(),
        "Delivering message"
    );

    for target in &targets {
        target(&value as &dyn Any);
    }

    targets.len()
}

/// Removes its subscriber from the bus when dropped.
struct LocalSubscription {
    topics: Weak<Mutex<Topics>>,
    topic: String,
    id: u64,
}

impl Drop for LocalSubscription {
    fn drop(&mut self) {
        let Some(topics) = self.topics.upgrade() else {
            return;
        };

        let mut topics = topics.lock();
        if let Some(subscribers) = topics.subscribers.get_mut(&self.topic) {
            subscribers.retain(|s| s.id != self.id);
            if subscribers.is_empty() {
                topics.subscribers.shift_remove(&self.topic);
            }
        }

        debug!(topic = %self.topic, "Released local subscription");
    }
}

/// A publication on a [`LocalBus`] topic.
pub struct LocalPublication<M> {
    topics: Weak<Mutex<Topics>>,
    topic: String,
    _marker: PhantomData<fn(M)>,
}

impl<M> LocalPublication<M> {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<M> Publication<M> for LocalPublication<M>
where
    M: Message,
{
    fn publish(&self, value: M) -> Result<()> {
        let topics = self
            .topics
            .upgrade()
            .ok_or_else(|| eyre!("Bus for topic '{}' has shut down", self.topic))?;
        deliver(&topics, &self.topic, value);
        Ok(())
    }
}

impl<M> Transport<M> for LocalBus
where
    M: Message,
{
    type Publication = LocalPublication<M>;

    fn create_publication(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
    ) -> Result<Self::Publication> {
        ensure!(!topic.is_empty(), "Topic name cannot be empty");

        debug!(
            topic = %topic,
            msg_type = %M::KIND,
            delivery = ?delivery,
            "Created local publication"
        );

        Ok(LocalPublication {
            topics: Arc::downgrade(&self.topics),
            topic: topic.to_string(),
            _marker: PhantomData,
        })
    }

    fn subscribe<F>(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
        callback: F,
    ) -> Result<SubscriptionHandle>
    where
        F: Fn(M) + Send + Sync + 'static,
    {
        ensure!(!topic.is_empty(), "Topic name cannot be empty");

        let topic_owned = topic.to_string();
        let deliver: Deliver = Arc::new(move |value: &dyn Any| {
            match value.downcast_ref::<M>() {
                Some(value) => callback(value.clone()),
                None => warn!(
                    topic = %topic_owned,
                    expected = %M::KIND,
                    "Dropped message of unexpected type"
                ),
            }
        });

        let id = self.add_subscriber(topic, deliver);

        debug!(
            topic = %topic,
            msg_type = %M::KIND,
            delivery = ?delivery,
            "Created local subscription"
        );

        let guard = LocalSubscription {
            topics: Arc::downgrade(&self.topics),
            topic: topic.to_string(),
            id,
        };
        Ok(SubscriptionHandle::new(topic, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::{Pose, Twist, Vector3};

    #[test]
    fn test_tap_receives_published_values() {
        let bus = LocalBus::new();
        let (_handle, rx) = bus.tap::<Twist>("/cmd_vel").unwrap();

        let twist = Twist {
            linear: Vector3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        assert_eq!(bus.publish("/cmd_vel", twist), 1);
        assert_eq!(rx.try_recv().unwrap(), twist);
    }

    #[test]
    fn test_wrong_type_is_dropped() {
        let bus = LocalBus::new();
        let (_handle, rx) = bus.tap::<Twist>("/cmd_vel").unwrap();

        bus.publish("/cmd_vel", Pose::default());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropping_handle_unsubscribes() {
        let bus = LocalBus::new();
        let (handle, _rx) = bus.tap::<Twist>("/cmd_vel").unwrap();
        assert_eq!(bus.subscriber_count("/cmd_vel"), 1);

        drop(handle);
        assert_eq!(bus.subscriber_count("/cmd_vel"), 0);
        assert_eq!(bus.publish("/cmd_vel", Twist::default()), 0);
    }

    #[test]
    fn test_publication_fails_after_bus_is_dropped() {
        let bus = LocalBus::new();
        let publication =
            Transport::<Twist>::create_publication(&bus, "/out", &DeliveryConfig::default())
                .unwrap();
        drop(bus);

        assert!(publication.publish(Twist::default()).is_err());
    }

    #[test]
    fn test_empty_topic_is_rejected() {
        let bus = LocalBus::new();
        assert!(bus.tap::<Twist>("").is_err());
    }
}
