/// Chrome extension APIs behind the `Platform` trait, plus listener wiring
use crate::background::{BackgroundService, Platform};
use crate::error::{self, ExtensionError};
use crate::protocol::{
    LaunchRequest, LaunchResponse, NavigationDetails, Notification, StorageChange, UiRequest,
    UiResponse,
};
use crate::settings::{NATIVE_HOST_NAME, STORAGE_KEY_CONFIG_PATH, STORAGE_KEY_DOMAINS, Settings};
use log::{info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendNativeMessage(host: &str, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createNotification(id: &str, options: JsValue) -> Result<(), JsValue>;

    fn addNavigationListener(callback: &js_sys::Function);

    fn addMessageListener(callback: &js_sys::Function);

    fn addStorageChangeListener(callback: &js_sys::Function);

    fn addInstalledListener(callback: &js_sys::Function);

    fn addStartupListener(callback: &js_sys::Function);
}

/// `Platform` backed by `chrome.storage.sync`, native messaging and
/// `chrome.notifications`
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromePlatform;

impl Platform for ChromePlatform {
    async fn load_settings(&self) -> error::Result<Settings> {
        let keys = serde_wasm_bindgen::to_value(&[STORAGE_KEY_DOMAINS, STORAGE_KEY_CONFIG_PATH])?;
        let items = getSyncStorage(keys).await.map_err(ExtensionError::storage)?;

        if items.is_null() || items.is_undefined() {
            return Ok(Settings::default());
        }
        Ok(serde_wasm_bindgen::from_value(items)?)
    }

    async fn save_domains(&self, domains: &[String]) -> error::Result<()> {
        let items = serde_wasm_bindgen::to_value(&Settings::with_domains(domains))?;
        setSyncStorage(items).await.map_err(ExtensionError::storage)
    }

    async fn send_native_message(&self, request: &LaunchRequest) -> error::Result<LaunchResponse> {
        let message = serde_wasm_bindgen::to_value(request)?;
        let reply = sendNativeMessage(NATIVE_HOST_NAME, message)
            .await
            .map_err(ExtensionError::helper)?;

        if reply.is_null() || reply.is_undefined() {
            return Err(ExtensionError::Helper("empty reply from native host".to_string()));
        }
        Ok(serde_wasm_bindgen::from_value(reply)?)
    }

    async fn notify(&self, notification: &Notification) -> error::Result<()> {
        let options = serde_wasm_bindgen::to_value(&notification.options)?;
        createNotification(&notification.id, options)
            .await
            .map_err(ExtensionError::notification)
    }
}

/// Create the background service and hook it to the browser's events
pub fn start() {
    let service = Rc::new(BackgroundService::new(ChromePlatform));

    // The worker can be woken without onStartup/onInstalled firing
    {
        let service = service.clone();
        spawn_local(async move { service.on_startup().await });
    }

    let on_installed = {
        let service = service.clone();
        Closure::wrap(Box::new(move || {
            let service = service.clone();
            spawn_local(async move { service.on_installed().await });
        }) as Box<dyn Fn()>)
    };
    addInstalledListener(on_installed.as_ref().unchecked_ref());
    on_installed.forget();

    let on_startup = {
        let service = service.clone();
        Closure::wrap(Box::new(move || {
            let service = service.clone();
            spawn_local(async move { service.on_startup().await });
        }) as Box<dyn Fn()>)
    };
    addStartupListener(on_startup.as_ref().unchecked_ref());
    on_startup.forget();

    let on_navigation = {
        let service = service.clone();
        Closure::wrap(Box::new(move |details: JsValue| {
            match serde_wasm_bindgen::from_value::<NavigationDetails>(details) {
                Ok(details) => {
                    let service = service.clone();
                    spawn_local(async move { service.on_navigation(details).await });
                }
                Err(e) => warn!("Unreadable navigation event: {}", e),
            }
        }) as Box<dyn Fn(JsValue)>)
    };
    addNavigationListener(on_navigation.as_ref().unchecked_ref());
    on_navigation.forget();

    // Resolves with the response object handed to `sendResponse`
    let on_message = {
        let service = service.clone();
        Closure::wrap(Box::new(move |request: JsValue| -> js_sys::Promise {
            let service = service.clone();
            future_to_promise(async move {
                let response = match serde_wasm_bindgen::from_value::<UiRequest>(request) {
                    Ok(request) => service.on_message(request).await,
                    Err(e) => {
                        warn!("Unknown popup request: {}", e);
                        UiResponse::failure(ExtensionError::InvalidMessage(e.to_string()).to_string())
                    }
                };
                Ok(serde_wasm_bindgen::to_value(&response)?)
            })
        }) as Box<dyn Fn(JsValue) -> js_sys::Promise>)
    };
    addMessageListener(on_message.as_ref().unchecked_ref());
    on_message.forget();

    let on_storage_changed = {
        let service = service.clone();
        Closure::wrap(Box::new(move |change: JsValue| {
            match serde_wasm_bindgen::from_value::<StorageChange>(change) {
                Ok(change) => service.on_storage_changed(change),
                Err(e) => warn!("Unreadable storage change: {}", e),
            }
        }) as Box<dyn Fn(JsValue)>)
    };
    addStorageChangeListener(on_storage_changed.as_ref().unchecked_ref());
    on_storage_changed.forget();

    info!("Background script loaded");
}
