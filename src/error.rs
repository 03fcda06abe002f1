// Error types for Wiresock Auto Launcher

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtensionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Native host error: {0}")]
    Helper(String),

    #[error("Native host refused launch: {0}")]
    HelperRejected(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl ExtensionError {
    /// Wrap a rejected JS promise value
    pub fn storage(value: JsValue) -> Self {
        ExtensionError::Storage(format!("{:?}", value))
    }

    pub fn helper(value: JsValue) -> Self {
        ExtensionError::Helper(format!("{:?}", value))
    }

    pub fn notification(value: JsValue) -> Self {
        ExtensionError::Notification(format!("{:?}", value))
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
