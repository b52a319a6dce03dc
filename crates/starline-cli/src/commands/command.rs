//! Device command execution

use anyhow::{bail, Context, Result};
use serde_json::Value;
use starline_client::{DeviceCommand, LoginParams, StarlineClient};

use crate::commands::authenticate;
use crate::output::OutputContext;

/// Send an arbitrary `set_param` command
pub async fn exec(
    client: &StarlineClient,
    extra: &LoginParams,
    device_id: &str,
    command_type: &str,
    params: &[String],
    ctx: &OutputContext,
) -> Result<()> {
    let mut command = DeviceCommand::new(command_type);
    for param in params {
        let (name, value) = parse_param(param)?;
        command = command.param(name, value);
    }
    send(client, extra, device_id, command, ctx).await
}

/// Arm or disarm a device
pub async fn arm(
    client: &StarlineClient,
    extra: &LoginParams,
    device_id: &str,
    off: bool,
    ctx: &OutputContext,
) -> Result<()> {
    send(client, extra, device_id, DeviceCommand::arm(!off), ctx).await
}

async fn send(
    client: &StarlineClient,
    extra: &LoginParams,
    device_id: &str,
    command: DeviceCommand,
    ctx: &OutputContext,
) -> Result<()> {
    let auth = authenticate(client, extra).await?;

    let body = command.into_value();
    ctx.info(&format!("Sending {} to device {}...", body, device_id));

    let result = client
        .run_query(&auth.session.slnet_token, device_id, &body)
        .await
        .context("Failed to send device command")?;
    if result.is_empty() {
        bail!("Device {} rejected the command", device_id);
    }

    ctx.success("Command accepted");
    ctx.print_response(&result);
    Ok(())
}

/// Parse `name=value`; the value is taken as JSON when it parses, as a
/// string otherwise
fn parse_param(param: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = param.split_once('=') else {
        bail!("Invalid parameter '{}', expected name=value", param);
    };
    if name.is_empty() {
        bail!("Invalid parameter '{}', empty name", param);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
