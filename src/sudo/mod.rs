//! Client-side sudo elevation.
//!
//! The workflow walks `Closed -> Open -> Submitting -> Elevated | Denied`.
//! Only a top-tier principal acting below that tier may open it. A rejected
//! password always shows the same field error; the server's own text is
//! never used for it.

pub mod session;

use chrono::Utc;
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

use crate::api::ApiClient;
use crate::config::SudoConfig;
use crate::transport::Transport;

pub use session::{
    is_eligible, Identity, Role, SessionError, SessionHandle, SessionRole, SudoSession,
};

pub const INVALID_PASSWORD_MESSAGE: &str = "Invalid password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    Closed,
    Open,
    Submitting,
    Elevated,
    Denied,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Elevation is not available for this account")]
    NotEligible,

    #[error("Could not record elevation: {0}")]
    Session(#[from] SessionError),

    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        from: WorkflowState,
        action: &'static str,
    },
}

/// Interaction-local fields, reset whenever the interaction closes
#[derive(Debug, Clone)]
struct ElevationForm {
    state: WorkflowState,
    password: String,
    field_error: Option<String>,
    loading: bool,
}

impl Default for ElevationForm {
    fn default() -> Self {
        Self {
            state: WorkflowState::Closed,
            password: String::new(),
            field_error: None,
            loading: false,
        }
    }
}

/// Holds the loading flag for one submission. Dropping it clears the flag,
/// and a submission abandoned mid-flight falls back to `Open`.
struct SubmitGuard<'a> {
    form: &'a mut ElevationForm,
}

impl<'a> SubmitGuard<'a> {
    fn begin(form: &'a mut ElevationForm) -> Self {
        form.state = WorkflowState::Submitting;
        form.field_error = None;
        form.loading = true;
        Self { form }
    }
}

impl Deref for SubmitGuard<'_> {
    type Target = ElevationForm;

    fn deref(&self) -> &ElevationForm {
        self.form
    }
}

impl DerefMut for SubmitGuard<'_> {
    fn deref_mut(&mut self) -> &mut ElevationForm {
        self.form
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.form.loading = false;
        if self.form.state == WorkflowState::Submitting {
            self.form.state = WorkflowState::Open;
        }
    }
}

pub struct SudoWorkflow<T: Transport> {
    client: ApiClient<T>,
    config: SudoConfig,
    identity: Identity,
    session: SessionHandle,
    form: ElevationForm,
}

impl<T: Transport> SudoWorkflow<T> {
    pub fn new(
        client: ApiClient<T>,
        config: SudoConfig,
        identity: Identity,
        session: SessionHandle,
    ) -> Self {
        Self {
            client,
            config,
            identity,
            session,
            form: ElevationForm::default(),
        }
    }

    /// Whether the elevation control should be shown at all
    pub fn is_offered(&self) -> bool {
        is_eligible(&self.identity)
    }

    pub fn state(&self) -> WorkflowState {
        self.form.state
    }

    pub fn is_loading(&self) -> bool {
        self.form.loading
    }

    pub fn field_error(&self) -> Option<&str> {
        self.form.field_error.as_deref()
    }

    pub fn password(&self) -> &str {
        &self.form.password
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn open(&mut self) -> Result<(), WorkflowError> {
        if !self.is_offered() {
            return Err(WorkflowError::NotEligible);
        }
        self.expect_state(&[WorkflowState::Closed], "open")?;
        self.form.state = WorkflowState::Open;
        tracing::debug!("Sudo interaction opened");
        Ok(())
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> Result<(), WorkflowError> {
        self.expect_state(&[WorkflowState::Open, WorkflowState::Denied], "edit password")?;
        self.form.password = password.into();
        Ok(())
    }

    /// Submit the current password and return the state reached.
    ///
    /// `&mut self` keeps a second submission out while one is in flight. If
    /// the accepted elevation cannot be recorded the interaction goes back
    /// to `Open` with the session unchanged.
    pub async fn submit(&mut self) -> Result<WorkflowState, WorkflowError> {
        self.expect_state(&[WorkflowState::Open, WorkflowState::Denied], "submit")?;

        let mut form = SubmitGuard::begin(&mut self.form);
        let result = self
            .client
            .sudo(&self.config.path, &form.password, !self.config.notify_on_failure)
            .await;

        match result {
            Ok(_) => {
                let ttl = self.config.ttl();
                if let Err(err) = self.session.elevate(Utc::now(), ttl) {
                    tracing::error!("Sudo elevation accepted but not recorded: {}", err);
                    return Err(err.into());
                }
                form.password.clear();
                form.state = WorkflowState::Elevated;
                tracing::info!("Sudo elevation granted for {}s", ttl.num_seconds());
            }
            Err(err) => {
                form.field_error = Some(INVALID_PASSWORD_MESSAGE.to_string());
                form.state = WorkflowState::Denied;
                tracing::info!("Sudo elevation denied (status {:?})", err.status_code);
            }
        }

        Ok(form.state)
    }

    /// Close the interaction without submitting. The session is untouched.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.expect_state(&[WorkflowState::Open, WorkflowState::Denied], "cancel")?;
        self.form = ElevationForm::default();
        tracing::debug!("Sudo interaction cancelled");
        Ok(())
    }

    /// Take in a fresh identity from the session provider. Once the session
    /// store has dropped the elevation, the workflow is back to `Closed`.
    pub fn observe(&mut self, identity: Identity) {
        self.identity = identity;
        if self.form.state == WorkflowState::Elevated && !self.session.is_active_at(Utc::now()) {
            self.form = ElevationForm::default();
        }
    }

    fn expect_state(
        &self,
        allowed: &[WorkflowState],
        action: &'static str,
    ) -> Result<(), WorkflowError> {
        if allowed.contains(&self.form.state) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                from: self.form.state,
                action,
            })
        }
    }
}
