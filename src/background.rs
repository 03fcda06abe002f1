/// Background service: reacts to navigation, popup messages and storage changes
use crate::error::Result;
use crate::gate::{LaunchGate, NavigationDecision};
use crate::protocol::{
    DomainsResponse, LaunchRequest, LaunchResponse, NavigationDetails, Notification,
    StatusResponse, StorageChange, UiRequest, UiResponse,
};
use crate::settings::{Settings, TEST_DOMAIN, default_domains};
use log::{debug, error, info, warn};
use std::cell::{Cell, Ref, RefCell};

/// Browser APIs the background service depends on
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Read `domains` and `configPath` from the settings store
    async fn load_settings(&self) -> Result<Settings>;

    async fn save_domains(&self, domains: &[String]) -> Result<()>;

    /// Round-trip one request through the native host
    async fn send_native_message(&self, request: &LaunchRequest) -> Result<LaunchResponse>;

    async fn notify(&self, notification: &Notification) -> Result<()>;
}

pub struct BackgroundService<P: Platform> {
    platform: P,
    gate: RefCell<LaunchGate>,
    // Set once a domain list has been applied, from any source
    loaded: Cell<bool>,
}

impl<P: Platform> BackgroundService<P> {
    pub fn new(platform: P) -> Self {
        BackgroundService {
            platform,
            gate: RefCell::new(LaunchGate::default()),
            loaded: Cell::new(false),
        }
    }

    pub fn gate(&self) -> Ref<'_, LaunchGate> {
        self.gate.borrow()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn replace_domains(&self, domains: Vec<String>) {
        self.gate.borrow_mut().set_domains(domains);
        self.loaded.set(true);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    async fn load_domains(&self) -> Result<()> {
        let settings = self.platform.load_settings().await?;
        self.replace_domains(settings.domains.unwrap_or_default());
        Ok(())
    }

    /// Load the stored list unless one is already applied
    ///
    /// A woken worker can receive events before its startup load finishes.
    async fn ensure_loaded(&self) {
        if self.is_loaded() {
            return;
        }
        if let Err(e) = self.load_domains().await {
            error!("Failed to load settings: {}", e);
        }
    }

    /// First install (or update): load the list, seeding defaults if absent
    pub async fn on_installed(&self) {
        info!("Wiresock Auto Launcher installed");

        let settings = match self.platform.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                return;
            }
        };

        match settings.domains {
            Some(domains) => self.replace_domains(domains),
            None => {
                let defaults = default_domains();
                self.replace_domains(defaults.clone());
                if let Err(e) = self.platform.save_domains(&defaults).await {
                    error!("Failed to store default domains: {}", e);
                }
            }
        }

        info!("Loaded domains: {:?}", self.gate().domains());
    }

    /// Browser start or worker wake-up: load the stored list
    pub async fn on_startup(&self) {
        match self.load_domains().await {
            Ok(()) => info!("Extension started, domains: {:?}", self.gate().domains()),
            Err(e) => error!("Failed to load settings: {}", e),
        }
    }

    pub async fn on_navigation(&self, details: NavigationDetails) {
        self.ensure_loaded().await;
        let decision = self.gate.borrow_mut().admit(&details);

        match decision {
            NavigationDecision::Launch(hostname) => {
                info!("Navigation to monitored domain: {}", hostname);
                // Failures are already logged and notified
                let _ = self.run_launch(&hostname).await;
            }
            NavigationDecision::AlreadyActive(hostname) => {
                info!("Connection for {} already active", hostname);
            }
            NavigationDecision::InFlight(hostname) => {
                debug!("Launch for {} already pending", hostname);
            }
            NavigationDecision::SubFrame
            | NavigationDecision::Unparseable
            | NavigationDecision::NotMonitored(_) => {}
        }
    }

    pub async fn on_message(&self, request: UiRequest) -> UiResponse {
        if matches!(request, UiRequest::GetDomains | UiRequest::GetStatus) {
            self.ensure_loaded().await;
        }

        match request {
            UiRequest::GetDomains => UiResponse::Domains(DomainsResponse {
                domains: self.gate().domains().to_vec(),
            }),
            UiRequest::UpdateDomains { domains } => {
                self.replace_domains(domains.clone());
                info!("Domain list updated: {:?}", domains);
                match self.platform.save_domains(&domains).await {
                    Ok(()) => UiResponse::ok(),
                    Err(e) => {
                        error!("Failed to save domains: {}", e);
                        UiResponse::failure(e.to_string())
                    }
                }
            }
            UiRequest::GetStatus => {
                let gate = self.gate();
                UiResponse::Status(StatusResponse {
                    active_connections: gate.active_connections(),
                    monitored_domains: gate.domains().to_vec(),
                })
            }
            UiRequest::TestConnection => match self.launch(TEST_DOMAIN).await {
                Ok(_) => UiResponse::ok(),
                Err(e) => UiResponse::failure(e.to_string()),
            },
        }
    }

    pub fn on_storage_changed(&self, change: StorageChange) {
        if change.namespace != "sync" || !change.domains_changed {
            return;
        }

        self.replace_domains(change.domains.unwrap_or_default());
        info!("Domain list reloaded from storage: {:?}", self.gate().domains());
    }

    /// Launch for a hostname regardless of its connection state
    pub async fn launch(&self, hostname: &str) -> Result<LaunchResponse> {
        self.gate.borrow_mut().begin_launch(hostname);
        self.run_launch(hostname).await
    }

    // Expects `hostname` to be marked in flight already
    async fn run_launch(&self, hostname: &str) -> Result<LaunchResponse> {
        info!("Launching wiresock for {}", hostname);

        let outcome = self.request_launch(hostname).await;
        self.gate
            .borrow_mut()
            .complete_launch(hostname, outcome.is_ok());

        let notification = match &outcome {
            Ok(response) => {
                info!(
                    "Wiresock launched: {}",
                    response.message.as_deref().unwrap_or("no message")
                );
                Notification::launched(hostname)
            }
            Err(e) => {
                error!("Failed to launch wiresock for {}: {}", hostname, e);
                Notification::launch_failed(hostname, e)
            }
        };

        if let Err(e) = self.platform.notify(&notification).await {
            warn!("Failed to show notification: {}", e);
        }

        outcome
    }

    async fn request_launch(&self, hostname: &str) -> Result<LaunchResponse> {
        let settings = self.platform.load_settings().await?;
        let request = LaunchRequest::new(hostname, &settings.config_path_or_default());

        self.platform
            .send_native_message(&request)
            .await?
            .into_result()
    }
}
