//! Request and response types for the StarLine client

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json;

// =============================================================================
// Session Types
// =============================================================================

/// SLNET session returned by `auth.slid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlnetSession {
    /// Value of the `slnet` cookie
    pub slnet_token: String,
    /// StarLine user id, as the server spelled it
    pub user_id: String,
}

impl SlnetSession {
    /// User id as a number for the device endpoints, 0 when it is not one
    pub fn numeric_user_id(&self) -> u64 {
        self.user_id.trim().parse().unwrap_or(0)
    }
}

// =============================================================================
// Login Types
// =============================================================================

/// Extra form fields for `user/login`
///
/// StarLine asks for a captcha after repeated failed logins; the captcha id
/// and the solved code then travel with the next attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginParams {
    fields: Vec<(String, String)>,
}

impl LoginParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the end user the login is made for
    pub fn user_ip(self, ip: impl Into<String>) -> Self {
        self.field("user_ip", ip)
    }

    /// Captcha id and solution
    pub fn captcha(self, sid: impl Into<String>, code: impl Into<String>) -> Self {
        self.field("captchaSid", sid).field("captchaCode", code)
    }

    /// Any other field. A later value replaces an earlier one with the same
    /// name.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Merge these fields over `base`: matching names are overwritten in
    /// place, new names are appended.
    pub fn merge_into(&self, mut base: Vec<(String, String)>) -> Vec<(String, String)> {
        for (name, value) in &self.fields {
            match base.iter_mut().find(|(k, _)| k == name) {
                Some(existing) => existing.1 = value.clone(),
                None => base.push((name.clone(), value.clone())),
            }
        }
        base
    }
}

// =============================================================================
// Device Types
// =============================================================================

/// One entry of `user_data.devices` in the device info body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub device_id: String,
    pub alias: String,
}

impl DeviceSummary {
    /// Collect the devices listed in a `fetch_devices_info` result
    ///
    /// Entries without a `device_id` are skipped.
    pub fn from_devices_info(info: &Map<String, Value>) -> Vec<Self> {
        let Some(Value::Array(devices)) = info
            .get("user_data")
            .and_then(|data| json::lookup(data, &["devices"]))
        else {
            return Vec::new();
        };

        devices
            .iter()
            .filter_map(|device| {
                let device_id = json::text_at(device, &["device_id"])?;
                if device_id.is_empty() {
                    return None;
                }
                Some(Self {
                    device_id,
                    alias: json::text_at(device, &["alias"]).unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Body for `set_param`
///
/// ```
/// use starline_client::DeviceCommand;
///
/// let body = DeviceCommand::new("arm").param("arm", 1).into_value();
/// assert_eq!(body["type"], "arm");
/// assert_eq!(body["arm"], 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCommand {
    params: Map<String, Value>,
}

impl DeviceCommand {
    pub fn new(command_type: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("type".to_string(), Value::String(command_type.into()));
        Self { params }
    }

    /// Arm or disarm the security system
    pub fn arm(on: bool) -> Self {
        Self::new("arm").param("arm", i64::from(on))
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.params)
    }
}
