//! reframe-node - ROS2 node relaying messages between frame conventions.
//!
//! The node reads a YAML configuration naming the frame convention change
//! and the topics to relay. For every configured transform it subscribes to
//! the input topic, maps each message into the target convention, rewrites
//! its frame identifiers and publishes it on the output topic.
//!
//! See the `config/example.yaml` file for a complete example.
//!
//! # Usage
//!
//! ```bash
//! ros2 run reframe_node reframe_node --ros-args -p config_file:=/path/to/config.yaml
//! ```

pub mod node;

pub use node::ReframeNode;
pub use reframe_ros2::reframe_core::Config;
