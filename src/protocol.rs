/// Messages exchanged with the browser, the native host and the popup
use crate::error::{ExtensionError, Result};
use crate::settings::NOTIFICATION_ICON;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `webNavigation.onBeforeNavigate` details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDetails {
    pub url: String,
    pub frame_id: i64,
}

impl NavigationDetails {
    pub fn new(url: &str, frame_id: i64) -> NavigationDetails {
        NavigationDetails {
            url: url.to_string(),
            frame_id,
        }
    }

    /// Only the main frame (frame 0) triggers launches
    pub fn is_top_level(&self) -> bool {
        self.frame_id == 0
    }
}

/// Flattened `storage.onChanged` event
///
/// `domains_changed` tells a removed key (`domains: None`) apart from an
/// unrelated change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    pub namespace: String,
    #[serde(default)]
    pub domains_changed: bool,
    #[serde(default)]
    pub domains: Option<Vec<String>>,
}

/// Request sent to the native host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub action: String,
    pub domain: String,
    pub config_path: String,
}

impl LaunchRequest {
    pub fn new(domain: &str, config_path: &str) -> LaunchRequest {
        LaunchRequest {
            action: "launch".to_string(),
            domain: domain.to_string(),
            config_path: config_path.to_string(),
        }
    }
}

/// Native host reply: `{success, message}` or `{success: false, error}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaunchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl LaunchResponse {
    pub fn launched(message: &str) -> LaunchResponse {
        LaunchResponse {
            success: true,
            message: Some(message.to_string()),
            error: None,
            pid: None,
        }
    }

    pub fn rejected(error: &str) -> LaunchResponse {
        LaunchResponse {
            success: false,
            message: None,
            error: Some(error.to_string()),
            pid: None,
        }
    }

    /// Turn a `success: false` reply into an error
    pub fn into_result(self) -> Result<LaunchResponse> {
        if self.success {
            Ok(self)
        } else {
            Err(ExtensionError::HelperRejected(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

/// Popup → background requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UiRequest {
    GetDomains,
    UpdateDomains { domains: Vec<String> },
    GetStatus,
    TestConnection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainsResponse {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub active_connections: Vec<String>,
    pub monitored_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Background → popup responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UiResponse {
    Domains(DomainsResponse),
    Status(StatusResponse),
    Ack(AckResponse),
}

impl UiResponse {
    pub fn ok() -> UiResponse {
        UiResponse::Ack(AckResponse {
            success: true,
            error: None,
        })
    }

    pub fn failure(error: impl Into<String>) -> UiResponse {
        UiResponse::Ack(AckResponse {
            success: false,
            error: Some(error.into()),
        })
    }
}

/// `chrome.notifications.create` options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub icon_url: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub options: NotificationOptions,
}

impl Notification {
    pub fn new(title: &str, message: &str) -> Notification {
        Notification {
            id: Uuid::new_v4().to_string(),
            options: NotificationOptions {
                kind: "basic".to_string(),
                icon_url: NOTIFICATION_ICON.to_string(),
                title: title.to_string(),
                message: message.to_string(),
            },
        }
    }

    pub fn launched(domain: &str) -> Notification {
        Notification::new(
            "Wiresock launched",
            &format!("Connection activated for {}", domain),
        )
    }

    pub fn launch_failed(domain: &str, error: &ExtensionError) -> Notification {
        Notification::new(
            "Wiresock error",
            &format!("Failed to launch wiresock for {}: {}", domain, error),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_launch_request_wire_format() {
        let request = LaunchRequest::new("sub.mail.ru", r"C:\vpn\mail.conf");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "action": "launch",
                "domain": "sub.mail.ru",
                "configPath": r"C:\vpn\mail.conf"
            })
        );
    }

    #[test]
    fn test_launch_response_success() {
        let response: LaunchResponse = serde_json::from_value(json!({
            "success": true,
            "message": "started",
            "pid": 4242
        }))
        .unwrap();

        let response = response.into_result().unwrap();
        assert_eq!(response.message.as_deref(), Some("started"));
        assert_eq!(response.pid, Some(4242));
    }

    #[test]
    fn test_launch_response_failure() {
        let response: LaunchResponse = serde_json::from_value(json!({
            "success": false,
            "error": "config not found"
        }))
        .unwrap();

        assert_eq!(
            response.into_result(),
            Err(ExtensionError::HelperRejected("config not found".to_string()))
        );
    }

    #[test]
    fn test_launch_response_failure_without_error_text() {
        let response: LaunchResponse = serde_json::from_value(json!({ "success": false })).unwrap();

        assert_eq!(
            response.into_result(),
            Err(ExtensionError::HelperRejected("Unknown error".to_string()))
        );
    }

    #[test]
    fn test_ui_request_actions() {
        let get: UiRequest = serde_json::from_value(json!({ "action": "getDomains" })).unwrap();
        assert_eq!(get, UiRequest::GetDomains);

        let update: UiRequest = serde_json::from_value(json!({
            "action": "updateDomains",
            "domains": ["mail.ru"]
        }))
        .unwrap();
        assert_eq!(
            update,
            UiRequest::UpdateDomains {
                domains: vec!["mail.ru".to_string()]
            }
        );

        let test: UiRequest = serde_json::from_value(json!({ "action": "testConnection" })).unwrap();
        assert_eq!(test, UiRequest::TestConnection);
    }

    #[test]
    fn test_ui_request_unknown_action() {
        let result = serde_json::from_value::<UiRequest>(json!({ "action": "reboot" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_response_wire_format() {
        let response = UiResponse::Status(StatusResponse {
            active_connections: vec!["sub.mail.ru".to_string()],
            monitored_domains: vec!["mail.ru".to_string()],
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "activeConnections": ["sub.mail.ru"],
                "monitoredDomains": ["mail.ru"]
            })
        );
    }

    #[test]
    fn test_ack_wire_format() {
        assert_eq!(serde_json::to_value(UiResponse::ok()).unwrap(), json!({ "success": true }));
        assert_eq!(
            serde_json::to_value(UiResponse::failure("boom")).unwrap(),
            json!({ "success": false, "error": "boom" })
        );
    }

    #[test]
    fn test_navigation_details() {
        let details: NavigationDetails = serde_json::from_value(json!({
            "url": "https://mail.ru/",
            "frameId": 0,
            "tabId": 7
        }))
        .unwrap();

        assert!(details.is_top_level());
        assert_eq!(details, NavigationDetails::new("https://mail.ru/", 0));
        assert!(!NavigationDetails::new("https://mail.ru/", 3).is_top_level());
    }

    #[test]
    fn test_notification_options() {
        let a = Notification::launched("sub.mail.ru");
        let b = Notification::launched("sub.mail.ru");

        assert_ne!(a.id, b.id);
        assert_eq!(a.options.message, "Connection activated for sub.mail.ru");

        let value = serde_json::to_value(&a.options).unwrap();
        assert_eq!(value["type"], "basic");
        assert_eq!(value["iconUrl"], NOTIFICATION_ICON);
    }
}
