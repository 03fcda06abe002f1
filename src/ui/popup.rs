/// Popup UI for Wiresock Auto Launcher

use crate::error::{ExtensionError, Result};
use crate::protocol::{AckResponse, DomainsResponse, StatusResponse, UiRequest};
use crate::settings::{
    DomainList, MESSAGE_TIMEOUT_MS, STORAGE_KEY_CONFIG_PATH, Settings, validate_config_path,
};
use crate::ui::components::{
    ActiveConnections, DomainItem, MessageKind, StatusMessage, domain_item_key,
};
use log::error;
use patternfly_yew::prelude::*;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(items: JsValue) -> std::result::Result<(), JsValue>;
}

/// Shows a message and clears it after a delay unless a newer one replaced it
#[derive(Clone)]
struct Messenger {
    message: UseStateHandle<Option<(String, MessageKind)>>,
    generation: Rc<RefCell<u32>>,
}

impl Messenger {
    fn show(&self, text: impl Into<String>, kind: MessageKind) {
        let generation = {
            let mut current = self.generation.borrow_mut();
            *current = current.wrapping_add(1);
            *current
        };
        self.message.set(Some((text.into(), kind)));

        let message = self.message.clone();
        let latest = self.generation.clone();
        spawn_local(async move {
            yew::platform::time::sleep(Duration::from_millis(MESSAGE_TIMEOUT_MS)).await;
            if *latest.borrow() == generation {
                message.set(None);
            }
        });
    }

    fn success(&self, text: impl Into<String>) {
        self.show(text, MessageKind::Success);
    }

    fn error(&self, text: impl Into<String>) {
        self.show(text, MessageKind::Error);
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let domains = use_state(DomainList::default);
    let new_domain = use_state(String::new);
    let config_path = use_state(String::new);
    let active = use_state(Vec::<String>::new);
    let testing = use_state(|| false);
    let messenger = Messenger {
        message: use_state(|| None::<(String, MessageKind)>),
        generation: use_mut_ref(|| 0u32),
    };

    // Load domains, config path and status on mount
    {
        let domains = domains.clone();
        let config_path = config_path.clone();
        let active = active.clone();
        let messenger = messenger.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_domains().await {
                    Ok(list) => domains.set(DomainList::new(list)),
                    Err(e) => {
                        error!("Failed to load domains: {}", e);
                        messenger.error("Failed to load domains");
                    }
                }

                match load_config_path().await {
                    Ok(path) => config_path.set(path),
                    Err(e) => error!("Failed to load configuration: {}", e),
                }

                refresh_status(&active).await;
            });
            || ()
        });
    }

    let on_new_domain_input = {
        let new_domain = new_domain.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_domain.set(input.value());
            }
        })
    };

    let add_domain = {
        let domains = domains.clone();
        let new_domain = new_domain.clone();
        let messenger = messenger.clone();

        Callback::from(move |_: ()| {
            let mut list = (*domains).clone();
            match list.add(&new_domain) {
                Ok(_) => {
                    domains.set(list.clone());
                    new_domain.set(String::new());

                    let messenger = messenger.clone();
                    spawn_local(async move {
                        match update_domains(list.domains).await {
                            Ok(()) => messenger.success("Domain added"),
                            Err(e) => {
                                error!("Failed to save domains: {}", e);
                                messenger.error("Failed to save domains");
                            }
                        }
                    });
                }
                Err(e) => messenger.error(e.to_string()),
            }
        })
    };

    let on_add_click = add_domain.reform(|_: MouseEvent| ());

    let on_new_domain_keypress = {
        let add_domain = add_domain.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                add_domain.emit(());
            }
        })
    };

    let on_remove = {
        let domains = domains.clone();
        let messenger = messenger.clone();

        Callback::from(move |index: usize| {
            let mut list = (*domains).clone();
            if list.remove(index).is_none() {
                return;
            }
            domains.set(list.clone());

            let messenger = messenger.clone();
            spawn_local(async move {
                match update_domains(list.domains).await {
                    Ok(()) => messenger.success("Domain removed"),
                    Err(e) => {
                        error!("Failed to save domains: {}", e);
                        messenger.error("Failed to save domains");
                    }
                }
            });
        })
    };

    let on_config_input = {
        let config_path = config_path.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                config_path.set(input.value());
            }
        })
    };

    let on_save_config = {
        let config_path = config_path.clone();
        let messenger = messenger.clone();

        Callback::from(move |_: MouseEvent| {
            let path = match validate_config_path(&config_path) {
                Ok(path) => path,
                Err(e) => {
                    messenger.error(e.to_string());
                    return;
                }
            };

            let messenger = messenger.clone();
            spawn_local(async move {
                match save_config_path(&path).await {
                    Ok(()) => messenger.success("Configuration path saved"),
                    Err(e) => {
                        error!("Failed to save configuration: {}", e);
                        messenger.error("Failed to save");
                    }
                }
            });
        })
    };

    let on_test = {
        let testing = testing.clone();
        let active = active.clone();
        let messenger = messenger.clone();

        Callback::from(move |_: MouseEvent| {
            let testing = testing.clone();
            let active = active.clone();
            let messenger = messenger.clone();
            testing.set(true);

            spawn_local(async move {
                match send_request::<AckResponse>(&UiRequest::TestConnection).await {
                    Ok(ack) if ack.success => messenger.success("Test connection succeeded"),
                    Ok(ack) => messenger.error(format!(
                        "Error: {}",
                        ack.error.unwrap_or_else(|| "unknown error".to_string())
                    )),
                    Err(e) => messenger.error(format!("Test failed: {}", e)),
                }
                testing.set(false);
                refresh_status(&active).await;
            });
        })
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Wiresock Auto Launcher"}</h1>

            if let Some((text, kind)) = (*messenger.message).clone() {
                <StatusMessage {text} {kind} />
            }

            <div class="section">
                <p class="section-title">{"Monitored domains"}</p>
                if domains.is_empty() {
                    <div class="empty-list">{"No monitored domains"}</div>
                } else {
                    {for domains.domains.iter().enumerate().map(|(index, domain)| html! {
                        <DomainItem
                            key={domain_item_key(index, domain)}
                            domain={domain.clone()}
                            {index}
                            on_remove={on_remove.clone()}
                        />
                    })}
                }
                <div class="input-row">
                    <input
                        type="text"
                        class="text-input"
                        placeholder="example.com or *.example.org"
                        value={(*new_domain).clone()}
                        oninput={on_new_domain_input}
                        onkeypress={on_new_domain_keypress}
                    />
                    <Button onclick={on_add_click} variant={ButtonVariant::Primary}>
                        {"Add"}
                    </Button>
                </div>
            </div>

            <div class="section">
                <p class="section-title">{"Configuration file"}</p>
                <div class="input-row">
                    <input
                        type="text"
                        class="text-input"
                        placeholder={r"C:\path\to\config.conf"}
                        value={(*config_path).clone()}
                        oninput={on_config_input}
                    />
                    <Button onclick={on_save_config} variant={ButtonVariant::Secondary}>
                        {"Save"}
                    </Button>
                </div>
            </div>

            <div class="section">
                <ActiveConnections hostnames={(*active).clone()} />
            </div>

            <div class="section">
                <Button onclick={on_test} disabled={*testing} variant={ButtonVariant::Secondary} block={true}>
                    {if *testing { "Testing..." } else { "Test connection" }}
                </Button>
            </div>

            <p class="footer-popup">
                {"Wiresock Auto Launcher v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn send_request<T: DeserializeOwned>(request: &UiRequest) -> Result<T> {
    let message = serde_wasm_bindgen::to_value(request)?;
    let response = sendRuntimeMessage(message)
        .await
        .map_err(|e| ExtensionError::InvalidMessage(format!("{:?}", e)))?;

    if response.is_null() || response.is_undefined() {
        return Err(ExtensionError::InvalidMessage(
            "no response from background".to_string(),
        ));
    }
    Ok(serde_wasm_bindgen::from_value(response)?)
}

async fn load_domains() -> Result<Vec<String>> {
    let response: DomainsResponse = send_request(&UiRequest::GetDomains).await?;
    Ok(response.domains)
}

async fn update_domains(domains: Vec<String>) -> Result<()> {
    let ack: AckResponse = send_request(&UiRequest::UpdateDomains { domains }).await?;
    if ack.success {
        Ok(())
    } else {
        Err(ExtensionError::Storage(
            ack.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

async fn refresh_status(active: &UseStateHandle<Vec<String>>) {
    match send_request::<StatusResponse>(&UiRequest::GetStatus).await {
        Ok(status) => active.set(status.active_connections),
        Err(e) => error!("Failed to load status: {}", e),
    }
}

async fn load_config_path() -> Result<String> {
    let keys = serde_wasm_bindgen::to_value(&[STORAGE_KEY_CONFIG_PATH])?;
    let items = getSyncStorage(keys).await.map_err(ExtensionError::storage)?;
    if items.is_null() || items.is_undefined() {
        return Ok(String::new());
    }

    let settings: Settings = serde_wasm_bindgen::from_value(items)?;
    Ok(settings.config_path.unwrap_or_default())
}

async fn save_config_path(path: &str) -> Result<()> {
    let items = serde_wasm_bindgen::to_value(&Settings::with_config_path(path))?;
    setSyncStorage(items).await.map_err(ExtensionError::storage)
}
