//! StarLine HTTP client implementation

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::digest;
use crate::error::{Result, StarlineError};
use crate::json;
use crate::logger::ErrorLogger;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, RequestBody, Transport};
use crate::types::{LoginParams, SlnetSession};

/// SLID identity host (application and user authentication)
pub const ID_BASE_URL: &str = "https://id.starline.ru";
/// Developer API host (SLNET session, device data and commands)
pub const DEVELOPER_BASE_URL: &str = "https://developer.starline.ru";

/// StarLine REST API client
///
/// Every operation is one HTTP round trip. Expected failures (rejected
/// credentials, non-200 status, empty or malformed body, missing fields)
/// are logged through the attached [`ErrorLogger`] and come back as an
/// empty value: `""`, `None` or an empty map. `Err` is reserved for
/// transport faults and for [`fetch_devices_info`](Self::fetch_devices_info)
/// input validation.
#[derive(Clone)]
pub struct StarlineClient {
    config: Config,
    transport: Arc<dyn Transport>,
    logger: Option<Arc<dyn ErrorLogger>>,
    id_base: Url,
    developer_base: Url,
}

impl StarlineClient {
    /// Create a client using [`ReqwestTransport`] with default options
    pub fn new(config: Config) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::default()))
    }

    /// Create a client sending through a custom transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            config,
            transport,
            logger: None,
            id_base: Url::parse(ID_BASE_URL)?,
            developer_base: Url::parse(DEVELOPER_BASE_URL)?,
        })
    }

    /// Point both hosts somewhere else, e.g. a local test server.
    ///
    /// Endpoint paths are unchanged.
    pub fn with_base_urls(mut self, id_base: &str, developer_base: &str) -> Result<Self> {
        self.id_base = Url::parse(id_base)?;
        self.developer_base = Url::parse(developer_base)?;
        Ok(self)
    }

    /// Attach an error logger
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn set_logger(&mut self, logger: Arc<dyn ErrorLogger>) -> &mut Self {
        self.logger = Some(logger);
        self
    }

    pub fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // SLID - Application Authentication
    // =========================================================================

    /// Request an application code
    ///
    /// Returns `desc.code`, or `""` when the response carries no string
    /// there.
    #[instrument(skip(self))]
    pub async fn fetch_code(&self) -> Result<String> {
        const METHOD: &str = "StarlineClient::fetch_code";

        let url = self.id_base.join("/apiV3/application/getCode")?;
        let request = HttpRequest::get(url)
            .with_query("appId", self.config.app_id())
            .with_query("secret", digest::app_code_secret(self.config.secret()));

        let response = self.send(request).await?;
        let Some(object) = self.decode(&response, METHOD) else {
            return Ok(String::new());
        };

        match json::str_at(&object, &["desc", "code"]) {
            Some(code) => Ok(code.to_string()),
            None => {
                self.log_error(
                    "Code not found in response.",
                    json!({"method": METHOD, "response_object": object}),
                );
                Ok(String::new())
            }
        }
    }

    /// Exchange an application code for an application token
    ///
    /// An empty code (`""` or `"0"`) returns `""` without sending anything.
    #[instrument(skip(self))]
    pub async fn fetch_token(&self, code: &str) -> Result<String> {
        const METHOD: &str = "StarlineClient::fetch_token";

        if json::is_blank(code) {
            return Ok(String::new());
        }

        let url = self.id_base.join("/apiV3/application/getToken")?;
        let request = HttpRequest::get(url)
            .with_query("appId", self.config.app_id())
            .with_query(
                "secret",
                digest::app_token_secret(self.config.secret(), code),
            );

        let response = self.send(request).await?;
        let Some(object) = self.decode(&response, METHOD) else {
            return Ok(String::new());
        };

        match json::str_at(&object, &["desc", "token"]) {
            Some(token) => Ok(token.to_string()),
            None => {
                self.log_error(
                    "Token not found in response api",
                    json!({"method": METHOD, "response_object": object}),
                );
                Ok(String::new())
            }
        }
    }

    // =========================================================================
    // SLID - User Authentication
    // =========================================================================

    /// Log the configured user in, authorized by an application token
    ///
    /// `extra` is merged over the `login`/`pass` form fields. Succeeds only
    /// when `state` is the integer 1; returns `desc.user_token`.
    #[instrument(skip(self, token, extra))]
    pub async fn fetch_user_token(&self, token: &str, extra: &LoginParams) -> Result<String> {
        const METHOD: &str = "StarlineClient::fetch_user_token";

        let form = extra.merge_into(vec![
            ("login".to_string(), self.config.login().to_string()),
            (
                "pass".to_string(),
                digest::password_digest(self.config.password()),
            ),
        ]);

        let url = self.id_base.join("/apiV3/user/login")?;
        let request = HttpRequest::post(url, RequestBody::Form(form)).with_header("token", token);

        let response = self.send(request).await?;
        let Some(object) = self.decode(&response, METHOD) else {
            return Ok(String::new());
        };

        if !json::is_int(json::lookup(&object, &["state"]), 1) {
            self.log_error(
                "User login error response",
                json!({"method": METHOD, "response_object": object}),
            );
            return Ok(String::new());
        }

        Ok(json::text_at(&object, &["desc", "user_token"]).unwrap_or_default())
    }

    // =========================================================================
    // SLNET Authentication
    // =========================================================================

    /// Open an SLNET session for a SLID user token
    ///
    /// The body must carry `code == 200` and a user id; the session id
    /// comes from the `slnet` cookie in the first `Set-Cookie` header.
    /// Both sources have to check out, otherwise `None`.
    #[instrument(skip(self, user_token))]
    pub async fn fetch_slnet_token(&self, user_token: &str) -> Result<Option<SlnetSession>> {
        const METHOD: &str = "StarlineClient::fetch_slnet_token";

        let url = self.developer_base.join("/json/v2/auth.slid")?;
        let request = HttpRequest::post(
            url,
            RequestBody::Json(json!({ "slid_token": user_token })),
        );

        let response = self.send(request).await?;
        let Some(object) = self.decode(&response, METHOD) else {
            return Ok(None);
        };

        let code = json::lookup(&object, &["code"]).and_then(json::as_loose_int);
        let user_id = json::text_at(&object, &["user_id"]).unwrap_or_default();

        if code != Some(200) || json::is_blank(&user_id) {
            self.log_error(
                "Error response",
                json!({"method": METHOD, "response_object": object}),
            );
            return Ok(None);
        }

        match slnet_cookie(&response) {
            Some(slnet_token) => Ok(Some(SlnetSession {
                slnet_token,
                user_id,
            })),
            None => {
                self.log_error(
                    "SLNET not found in response cookies",
                    json!({"method": METHOD, "headers_object": response.headers_json()}),
                );
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Device Operations
    // =========================================================================

    /// Fetch the data of every device the user owns
    ///
    /// Rejects an empty session id, an empty user token or a zero user id
    /// before sending anything. On success the decoded body is returned
    /// as-is; a body without a non-empty `code` yields an empty map.
    #[instrument(skip(self, slnet_token, user_token))]
    pub async fn fetch_devices_info(
        &self,
        slnet_token: &str,
        user_token: &str,
        user_id: u64,
    ) -> Result<Map<String, Value>> {
        const METHOD: &str = "StarlineClient::fetch_devices_info";

        if json::is_blank(slnet_token) || json::is_blank(user_token) || user_id == 0 {
            return Err(StarlineError::InvalidParams(
                "Incorrect param values.".to_string(),
            ));
        }

        let user_id = user_id.to_string();
        let url = self.developer_url(&["json", "v3", "user", &user_id, "data"])?;
        let request = HttpRequest::get(url).with_header("Cookie", slnet_header(slnet_token));

        let response = self.send(request).await?;
        Ok(self.coded_object(&response, METHOD))
    }

    /// Send a command to a device, e.g. `{"type": "arm", "arm": 1}`
    ///
    /// See [`DeviceCommand`](crate::DeviceCommand) for a builder. Same
    /// success rule as [`fetch_devices_info`](Self::fetch_devices_info).
    #[instrument(skip(self, slnet_token, params))]
    pub async fn run_query(
        &self,
        slnet_token: &str,
        device_id: &str,
        params: &Value,
    ) -> Result<Map<String, Value>> {
        const METHOD: &str = "StarlineClient::run_query";

        let url = self.developer_url(&["json", "v1", "device", device_id, "set_param"])?;
        let request = HttpRequest::post(url, RequestBody::Json(params.clone()))
            .with_header("Cookie", slnet_header(slnet_token));

        let response = self.send(request).await?;
        Ok(self.coded_object(&response, METHOD))
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Developer host URL with `segments` as the path, each one
    /// percent-encoded on its own
    fn developer_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.developer_base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .clear()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("Sending {} {}", request.method.as_str(), request.url);
        self.transport.send(request).await
    }

    /// Status must be 200 and the body non-empty
    fn check_response(&self, response: &HttpResponse, method: &str) -> bool {
        if response.status != 200 {
            self.log_error(
                &format!("Respond status code: {}", response.status),
                json!({"method": method}),
            );
            return false;
        }
        if json::is_blank(&response.body) {
            self.log_error(
                &format!("Response is empty: {}", response.body),
                json!({"method": method, "content": response.body}),
            );
            return false;
        }
        true
    }

    /// Check the response and decode its body
    fn decode(&self, response: &HttpResponse, method: &str) -> Option<Value> {
        if !self.check_response(response, method) {
            return None;
        }
        match serde_json::from_str(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log_error(
                    "Malformed JSON response",
                    json!({"method": method, "error": e.to_string()}),
                );
                None
            }
        }
    }

    /// Decoded body of a device call, or an empty map unless it carries a
    /// non-empty `code`
    fn coded_object(&self, response: &HttpResponse, method: &str) -> Map<String, Value> {
        let Some(object) = self.decode(response, method) else {
            return Map::new();
        };

        let code = json::text_at(&object, &["code"]).unwrap_or_default();
        match object {
            Value::Object(map) if !json::is_blank(&code) => map,
            other => {
                self.log_error(
                    "Error response",
                    json!({"method": method, "response_object": other}),
                );
                Map::new()
            }
        }
    }

    fn log_error(&self, message: &str, context: Value) {
        if let Some(logger) = &self.logger {
            logger.log_error(message, &context);
        }
    }
}

impl fmt::Debug for StarlineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StarlineClient")
            .field("config", &self.config)
            .field("id_base", &self.id_base.as_str())
            .field("developer_base", &self.developer_base.as_str())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

fn slnet_header(slnet_token: &str) -> String {
    format!("slnet={}", slnet_token)
}

/// Session id from the first `Set-Cookie` header: first `; ` segment, must
/// mention `slnet`, value after the first `=`.
fn slnet_cookie(response: &HttpResponse) -> Option<String> {
    let cookies = response.header_values("Set-Cookie");
    let first_cookie = cookies.first()?.split("; ").next().unwrap_or_default();
    if !first_cookie.contains("slnet") {
        return None;
    }
    let value = first_cookie.split('=').nth(1).unwrap_or_default();
    if json::is_blank(value) {
        return None;
    }
    Some(value.to_string())
}
