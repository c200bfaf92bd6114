//! Creation Wizard
//!
//! State machine behind the create view:
//!
//! ```text
//! country ──select_country──▶ bank ──select_bank──▶ amount ──submit──▶ submitting
//!    ▲                                                                   │
//!    └──────────────────────────── reset ◀──── success | error ◀─────────┘
//! ```
//!
//! Each operation is valid in exactly one step; calling it anywhere else is a
//! [`ControllerError::State`] and changes nothing. Bad input to `submit` is a
//! [`ControllerError::Validation`] and also changes nothing.
//!
//! A successful submission relays exactly one [`OutboundMessage`] to the
//! host: `app_created` when the server issued requisites, otherwise
//! `new_app_merchant` so an operator picks the application up.

use std::fmt;
use std::sync::Arc;

use crate::api::{ApiClient, ApplicationId, Choice, CreateApplication, CreateApplicationResponse};
use crate::bridge::{Haptic, HostBridge, OutboundMessage};
use crate::error::ControllerError;
use crate::session::Session;

/// Wizard step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// Choosing a country
    #[default]
    Country,
    /// Choosing a bank
    Bank,
    /// Entering the amount
    Amount,
    /// Create request in flight
    Submitting,
    /// Application created
    Success,
    /// Creation failed
    Error,
}

impl WizardStep {
    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Bank => "bank",
            Self::Amount => "amount",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A picked option
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Server identifier
    pub id: i64,
    /// Label shown to the user
    pub label: String,
}

impl Selection {
    /// Build a selection
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl From<&Choice> for Selection {
    fn from(choice: &Choice) -> Self {
        Self::new(choice.id, choice.name.clone())
    }
}

/// Outcome of the create call
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionResult {
    /// Whether the server created the application
    pub success: bool,
    /// Identifier of the new application
    pub app_id: Option<ApplicationId>,
    /// Requisites issued right away
    pub requisites: Option<String>,
    /// Message for the user
    pub message: Option<String>,
}

impl SubmissionResult {
    fn from_response(response: &CreateApplicationResponse) -> Self {
        Self {
            success: response.success,
            app_id: response.app_id,
            requisites: response
                .requisites
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            message: response.message.clone(),
        }
    }

    /// Whether requisites were issued
    #[must_use]
    pub fn has_requisites(&self) -> bool {
        self.requisites.is_some()
    }
}

/// In-progress creation flow
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WizardSession {
    /// Current step
    pub step: WizardStep,
    /// Chosen country
    pub country: Option<Selection>,
    /// Chosen bank
    pub bank: Option<Selection>,
    /// Submitted amount
    pub amount: Option<f64>,
    /// Result of the last submission
    pub result: Option<SubmissionResult>,
    /// Inline error for the current step
    pub error: Option<String>,
}

/// Drives one [`WizardSession`]
pub struct WizardController {
    api: ApiClient,
    host: Arc<dyn HostBridge>,
    session: Session,
    state: WizardSession,
    countries: Vec<Choice>,
    banks: Vec<Choice>,
}

impl WizardController {
    /// Create a controller in the `country` step with no options loaded
    pub fn new(api: ApiClient, host: Arc<dyn HostBridge>, session: Session) -> Self {
        Self {
            api,
            host,
            session,
            state: WizardSession::default(),
            countries: Vec::new(),
            banks: Vec::new(),
        }
    }

    /// Current step
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    /// Snapshot of the session
    #[must_use]
    pub fn session(&self) -> &WizardSession {
        &self.state
    }

    /// Country options
    #[must_use]
    pub fn countries(&self) -> &[Choice] {
        &self.countries
    }

    /// Bank options for the chosen country
    #[must_use]
    pub fn banks(&self) -> &[Choice] {
        &self.banks
    }

    /// Drop the session without fetching anything
    pub fn discard(&mut self) {
        if self.state != WizardSession::default() {
            tracing::debug!(step = %self.state.step, "Wizard session discarded");
        }
        self.state = WizardSession::default();
        self.banks.clear();
    }

    /// Start over from `country` and re-fetch country options
    ///
    /// Valid in every step. A failed fetch leaves an inline error on the
    /// `country` step.
    ///
    /// # Errors
    ///
    /// Returns the API error if the countries could not be loaded.
    pub async fn reset(&mut self) -> Result<(), ControllerError> {
        self.discard();
        self.countries.clear();

        match self.api.countries().await {
            Ok(countries) => {
                tracing::debug!(count = countries.len(), "Countries loaded");
                self.countries = countries;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load countries: {}", e);
                self.state.error = Some("Failed to load countries".to_string());
                Err(e.into())
            }
        }
    }

    /// Choose a country and load its banks
    ///
    /// # Errors
    ///
    /// - [`ControllerError::State`] outside the `country` step
    /// - [`ControllerError::Api`] if banks could not be loaded; the step stays
    ///   `country` with an inline error
    pub async fn select_country(
        &mut self,
        id: i64,
        label: impl Into<String>,
    ) -> Result<(), ControllerError> {
        self.require(WizardStep::Country, "select_country")?;

        match self.api.banks(id).await {
            Ok(banks) => {
                let selection = Selection::new(id, label);
                tracing::debug!(country = %selection.label, banks = banks.len(), "Country selected");
                self.host.pulse(Haptic::Selection);
                self.banks = banks;
                self.state.country = Some(selection);
                self.state.error = None;
                self.state.step = WizardStep::Bank;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(country_id = id, "Failed to load banks: {}", e);
                self.state.error = Some("Failed to load banks".to_string());
                Err(e.into())
            }
        }
    }

    /// Choose a bank
    ///
    /// # Errors
    ///
    /// - [`ControllerError::State`] outside the `bank` step
    /// - [`ControllerError::Validation`] if no country is set
    pub fn select_bank(&mut self, id: i64, label: impl Into<String>) -> Result<(), ControllerError> {
        self.require(WizardStep::Bank, "select_bank")?;
        if self.state.country.is_none() {
            return Err(ControllerError::Validation(
                "bank selected without a country".to_string(),
            ));
        }
        self.host.pulse(Haptic::Selection);

        self.state.bank = Some(Selection::new(id, label));
        self.state.error = None;
        self.state.step = WizardStep::Amount;
        Ok(())
    }

    /// Parse user input and submit it
    ///
    /// Accepts a comma as decimal separator.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit); unparseable input is a validation error.
    pub async fn submit_input(&mut self, input: &str) -> Result<WizardStep, ControllerError> {
        self.require(WizardStep::Amount, "submit")?;
        let amount = parse_amount(input).ok_or_else(|| {
            ControllerError::Validation(format!("amount is not a number: {input:?}"))
        })?;
        self.submit(amount).await
    }

    /// Create the application
    ///
    /// Returns the step the wizard ended in: `success`, or `error` when the
    /// server refused or the request failed.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::State`] outside the `amount` step
    /// - [`ControllerError::Validation`] if the amount is not a positive
    ///   finite number or a selection is missing; the step stays `amount`
    pub async fn submit(&mut self, amount: f64) -> Result<WizardStep, ControllerError> {
        self.require(WizardStep::Amount, "submit")?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ControllerError::Validation(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        let (Some(country), Some(bank)) = (self.state.country.clone(), self.state.bank.clone())
        else {
            return Err(ControllerError::Validation(
                "country and bank must be selected".to_string(),
            ));
        };

        self.state.amount = Some(amount);
        self.state.error = None;
        self.state.step = WizardStep::Submitting;

        let request = CreateApplication {
            init_data: self.session.identity_token().to_string(),
            country_id: country.id,
            bank_id: bank.id,
            amount_uah: amount,
        };

        let response = match self.api.create_application(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Create request failed: {}", e);
                return Ok(self.fail("Failed to create application".to_string()));
            }
        };

        let result = SubmissionResult::from_response(&response);
        let app_id = match (result.success, result.app_id) {
            (true, Some(app_id)) => app_id,
            (true, None) => {
                tracing::error!("Server reported success without an application id");
                return Ok(self.fail("Server did not return an application id".to_string()));
            }
            (false, _) => {
                let message = result
                    .message
                    .clone()
                    .unwrap_or_else(|| "Failed to create application".to_string());
                tracing::info!("Server refused application: {}", message);
                self.state.result = Some(result);
                return Ok(self.fail(message));
            }
        };

        let message = if result.has_requisites() {
            OutboundMessage::AppCreated { app_id }
        } else {
            OutboundMessage::NewAppMerchant {
                app_id,
                bank_name: response.bank_name.clone().unwrap_or(bank.label),
                amount: response.amount.unwrap_or(amount),
                country_name: response.country_name.clone().unwrap_or(country.label),
            }
        };
        tracing::info!(app_id, action = message.action(), "Application created");
        self.host.emit(&message);
        self.host.pulse(Haptic::Success);

        self.state.result = Some(result);
        self.state.step = WizardStep::Success;
        Ok(WizardStep::Success)
    }

    fn fail(&mut self, message: String) -> WizardStep {
        self.state.error = Some(message);
        self.state.step = WizardStep::Error;
        WizardStep::Error
    }

    fn require(&self, step: WizardStep, operation: &'static str) -> Result<(), ControllerError> {
        if self.state.step == step {
            Ok(())
        } else {
            Err(ControllerError::State {
                operation,
                step: self.state.step,
            })
        }
    }
}

/// Parse an amount typed by the user
fn parse_amount(input: &str) -> Option<f64> {
    input.trim().replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::AbsentHost;
    use crate::error::ApiError;
    use crate::test_utils::MockTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn setup() -> (MockTransport, Arc<AbsentHost>, WizardController) {
        let transport = MockTransport::new();
        transport.respond("/api/countries", json!([{"id": 1, "name": "Ukraine"}]));
        transport.respond(
            "/api/banks?country_id=1",
            json!([{"id": 5, "name": "BankX"}]),
        );
        let host = Arc::new(AbsentHost::new());
        let session = Session::capture(host.as_ref());
        let wizard = WizardController::new(ApiClient::new(transport.shared()), host.clone(), session);
        (transport, host, wizard)
    }

    async fn at_amount(wizard: &mut WizardController) {
        wizard.select_country(1, "Ukraine").await.unwrap();
        wizard.select_bank(5, "BankX").unwrap();
        assert_eq!(wizard.step(), WizardStep::Amount);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(WizardStep::Submitting.to_string(), "submitting");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 150,5 "), Some(150.5));
        assert_eq!(parse_amount("100"), Some(100.0));
        assert_eq!(parse_amount("abc"), None);
    }

    #[tokio::test]
    async fn test_select_bank_before_country_is_state_error() {
        let (_, _, mut wizard) = setup();

        let err = wizard.select_bank(5, "BankX").unwrap_err();

        assert_eq!(
            err,
            ControllerError::State {
                operation: "select_bank",
                step: WizardStep::Country
            }
        );
        assert_eq!(wizard.step(), WizardStep::Country);
    }

    #[tokio::test]
    async fn test_bank_fetch_failure_stays_on_country() {
        let (transport, _, mut wizard) = setup();
        transport.fail_once("/api/banks?country_id=1", ApiError::Status { code: 500 });

        let err = wizard.select_country(1, "Ukraine").await.unwrap_err();

        assert!(matches!(err, ControllerError::Api(_)));
        assert_eq!(wizard.step(), WizardStep::Country);
        assert!(wizard.session().error.is_some());
        assert_eq!(wizard.session().country, None);
    }

    #[tokio::test]
    async fn test_invalid_amounts_keep_amount_step() {
        let (transport, _, mut wizard) = setup();
        at_amount(&mut wizard).await;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = wizard.submit(amount).await.unwrap_err();
            assert!(err.is_validation(), "{amount} accepted");
        }
        assert!(wizard.submit_input("lots").await.unwrap_err().is_validation());

        assert_eq!(wizard.step(), WizardStep::Amount);
        assert_eq!(transport.call_count("/api/applications/create"), 0);
    }

    #[tokio::test]
    async fn test_success_without_requisites_emits_merchant_message() {
        let (transport, host, mut wizard) = setup();
        transport.respond(
            "/api/applications/create",
            json!({"success": true, "app_id": 42}),
        );
        at_amount(&mut wizard).await;

        let step = wizard.submit(100.0).await.unwrap();

        assert_eq!(step, WizardStep::Success);
        assert_eq!(
            host.emitted(),
            vec![OutboundMessage::NewAppMerchant {
                app_id: 42,
                bank_name: "BankX".into(),
                amount: 100.0,
                country_name: "Ukraine".into(),
            }]
        );

        let body = transport.calls().last().unwrap().body.clone().unwrap();
        assert_eq!(body["init_data"], "test_mode");
        assert_eq!(body["bank_id"], 5);
    }

    #[tokio::test]
    async fn test_success_with_requisites_emits_created() {
        let (transport, host, mut wizard) = setup();
        transport.respond(
            "/api/applications/create",
            json!({"success": true, "app_id": 43, "requisites": "4441 1111 2222 3333"}),
        );
        at_amount(&mut wizard).await;

        wizard.submit(250.0).await.unwrap();

        assert_eq!(host.emitted(), vec![OutboundMessage::AppCreated { app_id: 43 }]);
    }

    #[tokio::test]
    async fn test_blank_requisites_count_as_absent() {
        let (transport, host, mut wizard) = setup();
        transport.respond(
            "/api/applications/create",
            json!({"success": true, "app_id": 44, "requisites": "  "}),
        );
        at_amount(&mut wizard).await;

        wizard.submit(10.0).await.unwrap();

        assert_eq!(host.emitted()[0].action(), "new_app_merchant");
    }

    #[tokio::test]
    async fn test_request_failure_goes_to_error_without_emit() {
        let (transport, host, mut wizard) = setup();
        transport.fail("/api/applications/create", ApiError::Status { code: 500 });
        at_amount(&mut wizard).await;

        let step = wizard.submit(100.0).await.unwrap();

        assert_eq!(step, WizardStep::Error);
        assert!(host.emitted().is_empty());
        assert_eq!(transport.call_count("/api/applications/create"), 1);
    }

    #[tokio::test]
    async fn test_refusal_keeps_server_message() {
        let (transport, host, mut wizard) = setup();
        transport.respond(
            "/api/applications/create",
            json!({"success": false, "message": "Limit reached"}),
        );
        at_amount(&mut wizard).await;

        wizard.submit(100.0).await.unwrap();

        assert_eq!(wizard.step(), WizardStep::Error);
        assert_eq!(wizard.session().error.as_deref(), Some("Limit reached"));
        assert!(host.emitted().is_empty());
    }

    #[tokio::test]
    async fn test_reset_from_error_refetches_countries() {
        let (transport, _, mut wizard) = setup();
        transport.fail("/api/applications/create", ApiError::Network("offline".into()));
        at_amount(&mut wizard).await;
        wizard.submit(100.0).await.unwrap();

        wizard.reset().await.unwrap();

        assert_eq!(wizard.session(), &WizardSession::default());
        assert_eq!(wizard.countries().len(), 1);
        assert_eq!(transport.call_count("/api/countries"), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_amount_is_state_error() {
        let (_, _, mut wizard) = setup();
        let err = wizard.submit(100.0).await.unwrap_err();
        assert!(err.is_state());
        assert_eq!(err.to_string(), "submit is not allowed in step country");
    }
}
