//! asg-nic-manager: attach a management network interface to a launching instance
//!
//! Reads one EventBridge lifecycle hook event (file or stdin), handles it,
//! and exits non-zero if the instance was not allowed to proceed.

use anyhow::{Context, Result};
use asg_nic_common::TargetConfig;
use asg_nic_manager::{AwsContext, AwsGateway, LifecycleHandler};
use clap::Parser;
use std::io::Read;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "asg-nic-manager")]
#[command(about = "Attach a management network interface to instances launched by an Auto Scaling group")]
struct Args {
    /// Path to the lifecycle event JSON ("-" reads stdin)
    #[arg(long, default_value = "-")]
    event: String,

    /// AWS region (defaults to the SDK's region resolution)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting asg-nic-manager");

    // Configuration errors are fatal before any event is touched
    let config = TargetConfig::from_env().context("Invalid configuration")?;
    info!(
        subnets = %config.subnets,
        security_group_id = %config.security_group_id,
        "Configuration loaded"
    );

    let raw = read_event(&args.event)?;

    let aws = AwsContext::load(args.region.as_deref()).await;
    let handler = LifecycleHandler::new(AwsGateway::from_context(&aws), config);

    match handler.handle_raw(&raw).await {
        Ok(handled) => {
            info!(
                interface_id = %handled.interface.interface_id,
                attachment_id = ?handled.interface.attachment_id,
                decision = %handled.decision,
                "Lifecycle event handled"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to process lifecycle event");
            Err(e.into())
        }
    }
}

fn read_event(path: &str) -> Result<serde_json::Value> {
    let text = if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read event from stdin")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read event file '{path}'"))?
    };

    serde_json::from_str(&text).context("Event is not valid JSON")
}
