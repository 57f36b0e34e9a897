//! ROS2 transport for the reframe message relay.
//!
//! [`RosTransport`] implements [`reframe_core::Transport`] for every relay
//! message type by converting to and from the generated `geometry_msgs` and
//! `nav_msgs` types. Pass it to [`reframe_core::bring_up`] to relay topics
//! on a live node.
//!
//! ```ignore
//! use reframe_core::{Config, bring_up};
//! use reframe_ros2::RosTransport;
//!
//! let config = Config::load(path)?;
//! let (pipeline, failures) = bring_up(
//!     RosTransport::new(node.clone()),
//!     config.frame_transform()?,
//!     &config.specs(),
//! );
//! ```

pub mod convert;
pub mod transport;

pub use convert::RosMessage;
pub use transport::{RosPublication, RosTransport, qos_profile};

// Re-export reframe-core for convenience
pub use reframe_core;
