//! [`Transport`] implementation on typed `rclrs` publishers and
//! subscriptions.

use crate::convert::RosMessage;
use eyre::{Result, WrapErr, eyre};
use rclrs::{
    Node, Publisher, PublisherOptions, QoSDurabilityPolicy, QoSHistoryPolicy, QoSProfile,
    QoSReliabilityPolicy, SubscriptionOptions,
};
use reframe_core::{
    DeliveryConfig, Durability, History, Publication, Reliability, SubscriptionHandle, Transport,
};
use tracing::{debug, info};

/// Carries relay messages over a ROS2 node.
#[derive(Clone)]
pub struct RosTransport {
    node: Node,
}

impl RosTransport {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

/// A typed publisher for one output topic.
pub struct RosPublication<M>
where
    M: RosMessage,
{
    publisher: Publisher<M::Ros>,
    topic: String,
}

impl<M> Publication<M> for RosPublication<M>
where
    M: RosMessage,
{
    fn publish(&self, value: M) -> Result<()> {
        self.publisher
            .publish(value.into_ros())
            .map_err(|e| eyre!("Failed to publish on '{}': {}", self.topic, e))
    }
}

impl<M> Transport<M> for RosTransport
where
    M: RosMessage,
{
    type Publication = RosPublication<M>;

    fn create_publication(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
    ) -> Result<Self::Publication> {
        let mut options = PublisherOptions::new(topic);
        options.qos = qos_profile(delivery);

        let publisher = self
            .node
            .create_publisher::<M::Ros>(options)
            .wrap_err_with(|| format!("Failed to create publisher for topic: {}", topic))?;

        info!(topic = %topic, msg_type = %M::KIND, "Created publisher");

        Ok(RosPublication {
            publisher,
            topic: topic.to_string(),
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
        let mut options = SubscriptionOptions::new(topic);
        options.qos = qos_profile(delivery);

        let subscription = self
            .node
            .create_subscription::<M::Ros, _>(options, move |msg: M::Ros| {
                callback(M::from_ros(msg));
            })
            .wrap_err_with(|| format!("Failed to create subscription for topic: {}", topic))?;

        info!(topic = %topic, msg_type = %M::KIND, "Created subscription");
        debug!(topic = %topic, delivery = ?delivery, "Subscription QoS");

        Ok(SubscriptionHandle::new(topic, subscription))
    }
}

/// Build a QoS profile from delivery options.
pub fn qos_profile(delivery: &DeliveryConfig) -> QoSProfile {
    let mut qos = QoSProfile::default();

    qos.history = match delivery.history {
        History::KeepLast => QoSHistoryPolicy::KeepLast {
            depth: delivery.depth,
        },
        History::KeepAll => QoSHistoryPolicy::KeepAll,
    };

    qos.reliability = match delivery.reliability {
        Reliability::Reliable => QoSReliabilityPolicy::Reliable,
        Reliability::BestEffort => QoSReliabilityPolicy::BestEffort,
    };

    qos.durability = match delivery.durability {
        Durability::Volatile => QoSDurabilityPolicy::Volatile,
        Durability::TransientLocal => QoSDurabilityPolicy::TransientLocal,
    };

    qos
}
