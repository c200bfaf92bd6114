//! Mini-App
//!
//! The composition root. `MiniApp` owns the session, the router, every view
//! controller and the host bridge, and exposes one method per user action.
//!
//! # Data flow
//!
//! ```text
//! user action ──▶ MiniApp ──▶ ViewRouter::navigate ──▶ spawned view loader
//!                    │                                      │
//!                    │                                      ▼
//!                    │                            ApiClient ──▶ view state
//!                    ▼                                      │
//!             WizardController                              ▼
//!                    │                         SurfaceMessage::ViewUpdated
//!                    └──▶ HostBridge::emit
//! ```
//!
//! Loaders hold a [`ViewTicket`] and only publish results while it is still
//! current. Leaving the create view discards the wizard session.
//!
//! Methods that spawn work (`navigate`) must be called inside a tokio runtime.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::api::{
    ApiClient, ApiTransport, Application, ApplicationId, Choice, HttpTransport, StatusFilter,
};
use crate::bridge::{Haptic, HostBridge};
use crate::config::MiniAppConfig;
use crate::error::{ApiError, ControllerError};
use crate::messages::{Notifier, NotifyLevel, SurfaceMessage};
use crate::notifications::NotificationSync;
use crate::pagination::LoadOutcome;
use crate::router::{ViewId, ViewLoader, ViewRouter, ViewTicket};
use crate::session::Session;
use crate::views::{ApplicationsView, HomeView, ProfileView};
use crate::wizard::{WizardController, WizardSession, WizardStep};

const SHARE_URL: &str = "https://t.me/share/url";

/// What happened to a link the user asked to open
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The host opened it
    Opened,
    /// No host; the user was told to copy or visit this text instead
    Fallback(String),
}

struct Inner {
    config: MiniAppConfig,
    api: ApiClient,
    host: Arc<dyn HostBridge>,
    session: Session,
    router: ViewRouter,
    notifier: Notifier,
    home: HomeView,
    applications: ApplicationsView,
    profile: ProfileView,
    notifications: NotificationSync,
    wizard: Mutex<WizardController>,
}

/// Client-side controller of the mini-app
#[derive(Clone)]
pub struct MiniApp {
    inner: Arc<Inner>,
}

impl MiniApp {
    /// Assemble over an existing transport
    pub fn new(
        config: MiniAppConfig,
        host: Arc<dyn HostBridge>,
        transport: Arc<dyn ApiTransport>,
        surface: mpsc::Sender<SurfaceMessage>,
    ) -> Self {
        let session = Session::capture(host.as_ref());
        Self::assemble(config, host, session, transport, surface)
    }

    fn assemble(
        config: MiniAppConfig,
        host: Arc<dyn HostBridge>,
        session: Session,
        transport: Arc<dyn ApiTransport>,
        surface: mpsc::Sender<SurfaceMessage>,
    ) -> Self {
        let api = ApiClient::new(transport);
        let notifier = Notifier::new(surface, host.clone());

        let inner = Inner {
            applications: ApplicationsView::new(api.clone(), config.page_size),
            notifications: NotificationSync::new(
                api.clone(),
                notifier.clone(),
                config.notifications_limit,
            ),
            wizard: Mutex::new(WizardController::new(
                api.clone(),
                host.clone(),
                session.clone(),
            )),
            home: HomeView::new(),
            profile: ProfileView::new(),
            router: ViewRouter::new(),
            config,
            api,
            host,
            session,
            notifier,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Assemble over HTTP using the configured API origin
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn connect(
        config: MiniAppConfig,
        host: Arc<dyn HostBridge>,
        surface: mpsc::Sender<SurfaceMessage>,
    ) -> Result<Self, ApiError> {
        let session = Session::capture(host.as_ref());
        let transport = HttpTransport::new(&config, &session)?;
        tracing::info!(api = %config.api_base_url, present = host.is_present(), "Mini-app connected");
        Ok(Self::assemble(config, host, session, Arc::new(transport), surface))
    }

    // ========================================================================
    // Startup & Navigation
    // ========================================================================

    /// Initial load: stats and unread count, concurrently
    pub async fn start(&self) {
        let ticket = self.inner.router.current_ticket();
        let badge = async {
            // Logged inside; the badge keeps its last value
            let _ = self.inner.notifications.refresh_unread_count().await;
        };
        tokio::join!(self.inner.load_home(ticket), badge);
    }

    /// Switch view and start its loader
    ///
    /// Returns the loader task, or `None` if `target` was already active.
    pub fn navigate(&self, target: ViewId) -> Option<JoinHandle<()>> {
        let leaving = self.inner.router.active();
        let handle = self.inner.router.navigate(target, &self.inner)?;

        if leaving == ViewId::Create {
            match self.inner.wizard.try_lock() {
                Ok(mut wizard) => wizard.discard(),
                Err(_) => tracing::debug!("Wizard busy, leaving session to the create loader"),
            }
        }
        self.inner.host.pulse(Haptic::Medium);
        Some(handle)
    }

    /// Active view
    #[must_use]
    pub fn active_view(&self) -> ViewId {
        self.inner.router.active()
    }

    /// Router, for ticket checks
    #[must_use]
    pub fn router(&self) -> &ViewRouter {
        &self.inner.router
    }

    // ========================================================================
    // Applications
    // ========================================================================

    /// Change the applications filter and reload page 1
    ///
    /// # Errors
    ///
    /// Returns the API error after toasting it.
    pub async fn select_filter(&self, filter: StatusFilter) -> Result<LoadOutcome, ApiError> {
        self.inner.host.pulse(Haptic::Selection);
        let outcome = self.inner.applications.select_filter(filter).await;
        self.inner.after_list_load(outcome).await
    }

    /// Append the next applications page
    ///
    /// # Errors
    ///
    /// Returns the API error after toasting it.
    pub async fn load_more(&self) -> Result<LoadOutcome, ApiError> {
        let outcome = self.inner.applications.load_more().await;
        self.inner.after_list_load(outcome).await
    }

    /// Open the detail modal for one application
    ///
    /// # Errors
    ///
    /// Returns the API error after toasting it.
    pub async fn show_application(&self, id: ApplicationId) -> Result<Application, ApiError> {
        self.inner.host.pulse(Haptic::Medium);
        match self.inner.api.application(id).await {
            Ok(application) => {
                self.inner.applications.show_details(application.clone());
                self.inner.view_updated(ViewId::Applications).await;
                Ok(application)
            }
            Err(e) => {
                tracing::warn!(id, "Failed to load application: {}", e);
                self.inner
                    .notifier
                    .toast(NotifyLevel::Error, "Failed to load application details")
                    .await;
                Err(e)
            }
        }
    }

    /// Close the detail modal
    pub fn close_details(&self) {
        self.inner.applications.close_details();
    }

    /// Applications view state
    #[must_use]
    pub fn applications(&self) -> &ApplicationsView {
        &self.inner.applications
    }

    // ========================================================================
    // Create Wizard
    // ========================================================================

    /// Start the wizard over
    ///
    /// # Errors
    ///
    /// Returns the error if countries could not be loaded.
    pub async fn reset_wizard(&self) -> Result<(), ControllerError> {
        let result = self.inner.wizard.lock().await.reset().await;
        if result.is_err() {
            self.inner
                .notifier
                .toast(NotifyLevel::Error, "Failed to load countries")
                .await;
        }
        self.inner.view_updated(ViewId::Create).await;
        result
    }

    /// Choose a country
    ///
    /// # Errors
    ///
    /// See [`WizardController::select_country`].
    pub async fn select_country(&self, id: i64, label: &str) -> Result<(), ControllerError> {
        let result = self.inner.wizard.lock().await.select_country(id, label).await;
        if let Err(ControllerError::Api(_)) = &result {
            self.inner
                .notifier
                .toast(NotifyLevel::Error, "Failed to load banks")
                .await;
        }
        self.inner.view_updated(ViewId::Create).await;
        result
    }

    /// Choose a bank
    ///
    /// # Errors
    ///
    /// See [`WizardController::select_bank`].
    pub async fn select_bank(&self, id: i64, label: &str) -> Result<(), ControllerError> {
        let result = self.inner.wizard.lock().await.select_bank(id, label);
        self.inner.view_updated(ViewId::Create).await;
        result
    }

    /// Submit the amount the user typed
    ///
    /// # Errors
    ///
    /// See [`WizardController::submit_input`]. Validation failures are
    /// toasted.
    pub async fn submit_amount(&self, input: &str) -> Result<WizardStep, ControllerError> {
        let ticket = self.inner.router.current_ticket();
        let mut wizard = self.inner.wizard.lock().await;
        let result = wizard.submit_input(input).await;
        let session = self.inner.settle_wizard(&mut wizard, &ticket);
        drop(wizard);
        self.inner.after_submit(result, &session).await
    }

    /// Submit a numeric amount
    ///
    /// # Errors
    ///
    /// See [`WizardController::submit`].
    pub async fn submit(&self, amount: f64) -> Result<WizardStep, ControllerError> {
        let ticket = self.inner.router.current_ticket();
        let mut wizard = self.inner.wizard.lock().await;
        let result = wizard.submit(amount).await;
        let session = self.inner.settle_wizard(&mut wizard, &ticket);
        drop(wizard);
        self.inner.after_submit(result, &session).await
    }

    /// Snapshot of the wizard session
    pub async fn wizard_session(&self) -> WizardSession {
        self.inner.wizard.lock().await.session().clone()
    }

    /// Country options
    pub async fn countries(&self) -> Vec<Choice> {
        self.inner.wizard.lock().await.countries().to_vec()
    }

    /// Bank options for the chosen country
    pub async fn banks(&self) -> Vec<Choice> {
        self.inner.wizard.lock().await.banks().to_vec()
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Mark a notification read
    ///
    /// # Errors
    ///
    /// Returns the API error; list and badge are unchanged.
    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.inner.notifications.mark_read(id).await?;
        self.inner.view_updated(ViewId::Notifications).await;
        Ok(())
    }

    /// Notification list and badge
    #[must_use]
    pub fn notifications(&self) -> &NotificationSync {
        &self.inner.notifications
    }

    // ========================================================================
    // Home & Profile
    // ========================================================================

    /// Home view state
    #[must_use]
    pub fn home(&self) -> &HomeView {
        &self.inner.home
    }

    /// Profile view state
    #[must_use]
    pub fn profile(&self) -> &ProfileView {
        &self.inner.profile
    }

    /// Share the referral link through the host
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] if the profile (and with it
    /// the link) is not loaded.
    pub async fn share_referral(&self) -> Result<LinkOutcome, ControllerError> {
        let link = self.inner.profile.referral_link().ok_or_else(|| {
            ControllerError::Validation("referral link not loaded".to_string())
        })?;

        let text = format!("Join NightLab! {link}");
        let url = Url::parse_with_params(
            SHARE_URL,
            &[("url", link.as_str()), ("text", text.as_str())],
        )
        .map_err(|e| ControllerError::Validation(format!("bad referral link: {e}")))?;

        if self.inner.host.open_external(url.as_str()) {
            return Ok(LinkOutcome::Opened);
        }
        self.inner.host.pulse(Haptic::Light);
        self.inner
            .notifier
            .toast(NotifyLevel::Success, "Link ready to copy")
            .await;
        Ok(LinkOutcome::Fallback(link))
    }

    /// Open the support chat
    pub async fn open_support(&self) -> LinkOutcome {
        let handle = &self.inner.config.support_handle;
        if self.inner.host.open_external(&format!("https://t.me/{handle}")) {
            return LinkOutcome::Opened;
        }
        let hint = format!("Contact support: @{handle}");
        self.inner
            .notifier
            .toast(NotifyLevel::Info, hint.clone())
            .await;
        LinkOutcome::Fallback(hint)
    }

    /// Identity context
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }
}

impl ViewLoader for Arc<Inner> {
    type Handle = JoinHandle<()>;

    fn load(&self, ticket: ViewTicket) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.load_view(ticket).await })
    }
}

impl Inner {
    async fn load_view(&self, ticket: ViewTicket) {
        self.notifier
            .send(SurfaceMessage::ViewActivated { view: ticket.view })
            .await;

        match ticket.view {
            ViewId::Home => self.load_home(ticket).await,
            ViewId::Applications => self.load_applications(ticket).await,
            ViewId::Create => self.load_create(ticket).await,
            ViewId::Notifications => self.load_notifications(ticket).await,
            ViewId::Profile => self.load_profile(ticket).await,
        }
    }

    async fn load_home(&self, ticket: ViewTicket) {
        let result = self.api.stats().await;
        if !self.still_wanted(&ticket) {
            return;
        }
        self.home.apply(result);
        self.view_updated(ViewId::Home).await;
    }

    async fn load_applications(&self, ticket: ViewTicket) {
        let outcome = self.applications.reload().await;
        if !self.still_wanted(&ticket) {
            return;
        }
        let _ = self.after_list_load(outcome).await;
    }

    async fn load_create(&self, ticket: ViewTicket) {
        let result = self.wizard.lock().await.reset().await;
        if !self.still_wanted(&ticket) {
            return;
        }
        if result.is_err() {
            self.notifier
                .toast(NotifyLevel::Error, "Failed to load countries")
                .await;
        }
        self.view_updated(ViewId::Create).await;
    }

    async fn load_notifications(&self, ticket: ViewTicket) {
        let result = self.notifications.refresh_list().await;
        if !self.still_wanted(&ticket) {
            return;
        }
        if result.is_err() {
            self.notifier
                .toast(NotifyLevel::Error, "Failed to load notifications")
                .await;
        }
        self.view_updated(ViewId::Notifications).await;
    }

    async fn load_profile(&self, ticket: ViewTicket) {
        let result = ProfileView::fetch(&self.api).await;
        if !self.still_wanted(&ticket) {
            return;
        }
        self.profile.apply(&result);
        if let Err(e) = result {
            tracing::warn!("Failed to load profile: {}", e);
            self.notifier
                .toast(NotifyLevel::Error, "Failed to load profile")
                .await;
        }
        self.view_updated(ViewId::Profile).await;
    }

    /// Snapshot the wizard, dropping it if the user navigated off `create`
    /// while it was busy
    fn settle_wizard(&self, wizard: &mut WizardController, ticket: &ViewTicket) -> WizardSession {
        let session = wizard.session().clone();
        if !self.router.is_current(ticket) && self.router.active() != ViewId::Create {
            tracing::debug!("Create view left during submit, discarding wizard");
            wizard.discard();
        }
        session
    }

    fn still_wanted(&self, ticket: &ViewTicket) -> bool {
        let current = self.router.is_current(ticket);
        if !current {
            tracing::debug!(view = %ticket.view, generation = ticket.generation, "View left, dropping result");
        }
        current
    }

    async fn after_list_load(
        &self,
        outcome: Result<LoadOutcome, ApiError>,
    ) -> Result<LoadOutcome, ApiError> {
        match &outcome {
            Ok(LoadOutcome::Loaded { .. }) => self.view_updated(ViewId::Applications).await,
            Ok(_) => {}
            Err(_) => {
                self.notifier
                    .toast(NotifyLevel::Error, "Failed to load applications")
                    .await;
                self.view_updated(ViewId::Applications).await;
            }
        }
        outcome
    }

    async fn after_submit(
        &self,
        result: Result<WizardStep, ControllerError>,
        session: &WizardSession,
    ) -> Result<WizardStep, ControllerError> {
        match &result {
            Ok(WizardStep::Success) => {
                if let Some(app_id) = session.result.as_ref().and_then(|r| r.app_id) {
                    self.notifier
                        .send(SurfaceMessage::ApplicationCreated { app_id })
                        .await;
                }
            }
            Ok(_) => {
                let message = session
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed to create application".to_string());
                self.notifier.toast(NotifyLevel::Error, message).await;
            }
            Err(ControllerError::Validation(_)) => {
                self.notifier
                    .toast(NotifyLevel::Error, "Enter a valid amount")
                    .await;
            }
            Err(_) => {}
        }
        self.view_updated(ViewId::Create).await;
        result
    }

    async fn view_updated(&self, view: ViewId) {
        self.notifier.send(SurfaceMessage::ViewUpdated { view }).await;
    }
}
