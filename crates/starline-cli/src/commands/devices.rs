//! Devices command - list the user's devices

use anyhow::{bail, Result};
use starline_client::{DeviceSummary, LoginParams, StarlineClient};

use crate::commands::authenticate;
use crate::output::{DeviceRow, OutputContext, OutputFormat};

/// List every device of the authenticated user
pub async fn devices(
    client: &StarlineClient,
    extra: &LoginParams,
    ctx: &OutputContext,
) -> Result<()> {
    let auth = authenticate(client, extra).await?;

    let info = client
        .fetch_devices_info(
            &auth.session.slnet_token,
            &auth.user_token,
            auth.session.numeric_user_id(),
        )
        .await?;
    if info.is_empty() {
        bail!("Failed to fetch device data");
    }

    // Raw JSON keeps every field the server sent
    if ctx.format == OutputFormat::Json {
        ctx.print_response(&info);
        return Ok(());
    }

    let rows: Vec<DeviceRow> = DeviceSummary::from_devices_info(&info)
        .into_iter()
        .map(|d| DeviceRow {
            device_id: d.device_id,
            alias: d.alias,
        })
        .collect();

    ctx.print(&rows);
    Ok(())
}
