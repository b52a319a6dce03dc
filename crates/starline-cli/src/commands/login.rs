//! Login command - run the SLID/SLNET handshake

use anyhow::{bail, Context, Result};
use starline_client::{LoginParams, SlnetSession, StarlineClient};
use tracing::debug;

use crate::output::OutputContext;

/// Result of a completed handshake
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_token: String,
    pub session: SlnetSession,
}

/// Run application code -> application token -> user login -> SLNET
///
/// Stops at the first step that comes back empty.
pub async fn authenticate(client: &StarlineClient, extra: &LoginParams) -> Result<AuthSession> {
    let code = client
        .fetch_code()
        .await
        .context("Failed to request application code")?;
    if code.is_empty() {
        bail!("Application code was not issued (check app_id and secret)");
    }
    debug!("Application code received");

    let token = client
        .fetch_token(&code)
        .await
        .context("Failed to request application token")?;
    if token.is_empty() {
        bail!("Application token was not issued");
    }
    debug!("Application token received");

    let user_token = client
        .fetch_user_token(&token, extra)
        .await
        .context("Failed to send login request")?;
    if user_token.is_empty() {
        bail!("User login failed (check login and password)");
    }
    debug!("User token received");

    let session = client
        .fetch_slnet_token(&user_token)
        .await
        .context("Failed to request SLNET session")?
        .context("SLNET authentication failed")?;
    debug!("SLNET session opened for user {}", session.user_id);

    Ok(AuthSession {
        user_token,
        session,
    })
}

/// Authenticate and print the session
pub async fn login(client: &StarlineClient, extra: &LoginParams, ctx: &OutputContext) -> Result<()> {
    let auth = authenticate(client, extra).await?;

    ctx.success("Authenticated");
    ctx.print_kv(&[
        ("slnet_token", auth.session.slnet_token),
        ("user_id", auth.session.user_id),
        ("user_token", auth.user_token),
    ]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use starline_client::testing::MockTransport;
    use starline_client::transport::HttpResponse;
    use starline_client::Config;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> StarlineClient {
        let config = Config::new()
            .with_login("login")
            .with_password("password")
            .with_app_id("app id")
            .with_secret("secret key");
        StarlineClient::with_transport(config, transport).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_runs_all_steps() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"desc": {"code": "C1"}}))
            .push_json(200, json!({"desc": {"token": "T1"}}))
            .push_json(200, json!({"state": 1, "desc": {"user_token": "UT1"}}))
            .push_response(
                HttpResponse::new(200, json!({"code": 200, "user_id": "42"}).to_string())
                    .with_header("Set-Cookie", "slnet=SN1; Path=/"),
            );

        let auth = authenticate(&client(transport.clone()), &LoginParams::new())
            .await
            .unwrap();
        assert_eq!(auth.user_token, "UT1");
        assert_eq!(auth.session.slnet_token, "SN1");
        assert_eq!(auth.session.numeric_user_id(), 42);
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn test_authenticate_stops_at_failed_step() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"desc": {"code": "C1"}}))
            .push_json(200, json!({"desc": {"token": "T1"}}))
            .push_json(200, json!({"state": 0, "desc": {"message": "Wrong password"}}));

        let err = authenticate(&client(transport.clone()), &LoginParams::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("User login failed"));
        assert_eq!(transport.request_count(), 3);
    }
}
