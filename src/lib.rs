/// Wiresock Auto Launcher - Chrome Extension that starts a tunnel for monitored domains
/// Built with Rust + WASM + Yew

pub mod background;
pub mod chrome;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod protocol;
pub mod settings;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the domain predicate for JavaScript access
#[wasm_bindgen]
pub fn is_domain_monitored(url: &str, domains: JsValue) -> bool {
    match serde_wasm_bindgen::from_value::<Vec<String>>(domains) {
        Ok(domains) => matcher::is_domain_monitored(url, domains.as_slice()),
        Err(e) => {
            log::warn!("Invalid domain list: {}", e);
            false
        }
    }
}

// Register the background service worker's listeners
#[wasm_bindgen]
pub fn start_background() {
    chrome::start();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
