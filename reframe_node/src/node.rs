//! ReframeNode implementation.

use eyre::{Result, ensure};
use rclrs::Node;
use reframe_ros2::{
    RosTransport,
    reframe_core::{Config, Pipeline, RegistrationFailure, bring_up},
};
use tracing::{info, warn};

/// The frame-convention relay node.
///
/// Holds the live relays; dropping the node releases every subscription and
/// publisher it created.
pub struct ReframeNode {
    pipeline: Pipeline,
    failures: Vec<RegistrationFailure>,
}

impl ReframeNode {
    /// Register every configured transform on `node`.
    ///
    /// Transforms that cannot be registered are logged and skipped. Fails
    /// only when none could be registered.
    pub fn new(node: &Node, config: &Config) -> Result<Self> {
        let transform = config.frame_transform()?;

        info!(
            convention = ?config.convention,
            invert = config.invert,
            num_transforms = config.transforms.len(),
            "Creating ReframeNode"
        );

        let (pipeline, failures) = bring_up(
            RosTransport::new(node.clone()),
            transform,
            &config.specs(),
        );

        for failure in &failures {
            warn!(
                index = failure.index,
                msg_type = %failure.spec.message_type,
                input_topic = %failure.spec.input_topic,
                error = %failure.error,
                "Transform not registered"
            );
        }

        ensure!(
            !pipeline.is_empty(),
            "None of the {} configured transforms could be registered",
            config.transforms.len()
        );

        Ok(Self { pipeline, failures })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The transforms that were skipped at start-up.
    pub fn failures(&self) -> &[RegistrationFailure] {
        &self.failures
    }
}
