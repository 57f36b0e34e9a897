//! reframe node entry point.

use eyre::{Result, bail};
use rclrs::{Context, CreateBasicExecutor, RclrsErrorFilter, SpinOptions};
use reframe_node::{Config, ReframeNode};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize ROS2 context and executor
    let context = Context::default_from_env()
        .map_err(|e| eyre::eyre!("Failed to create ROS2 context: {}", e))?;
    let mut executor = context.create_basic_executor();

    let node = executor
        .create_node("reframe_node")
        .map_err(|e| eyre::eyre!("Failed to create ROS2 node: {}", e))?;

    // Get config file path from parameter
    let config_file: Arc<str> = node
        .declare_parameter::<Arc<str>>("config_file")
        .mandatory()
        .map_err(|e| eyre::eyre!("Missing required parameter 'config_file': {}", e))?
        .get();

    if config_file.is_empty() {
        bail!(
            "Parameter 'config_file' is required.\n\
             Usage: ros2 run reframe_node reframe_node --ros-args -p config_file:=/path/to/config.yaml"
        );
    }

    info!(config_file = %config_file, "Loading configuration");
    let config = Config::load(config_file.as_ref())?;

    let reframe_node = ReframeNode::new(&node, &config)?;

    info!(
        num_bindings = reframe_node.pipeline().len(),
        num_skipped = reframe_node.failures().len(),
        "reframe node started, spinning..."
    );

    // Callbacks run on the executor; the relays stay alive while it spins.
    executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(|e| eyre::eyre!("Error while spinning: {}", e))?;

    drop(reframe_node);
    info!("reframe node stopped");

    Ok(())
}
