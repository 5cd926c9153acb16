//! The fieldwork mesh fitting step.
//!
//! `FittingStep` owns the configuration, the data received on its input
//! ports and the outcome of the last successful fit. It drives:
//!
//! - configuration through a `ConfigEditor` session
//! - execution, either headless or handed over to an interactive host
//! - fitting through an external `SurfaceFitter`
//! - reset / abort for interactive sessions
//! - persistence of the configuration as JSON

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::config::persist;
use crate::config::{defaults, gui_enabled, translate};
use crate::domain::{Configuration, ConfigKey, FitOutcome, NodalParams, PointCloud};
use crate::editor::{ConfigEditor, ConfigForm, DialogOutcome, FieldForm, IdentifierRegistry, ValidationPolicy};
use crate::error::StepError;
use crate::fit::{AbortSignal, ProgressSink, SurfaceFitter};

pub mod host;
pub mod ports;

pub use host::*;
pub use ports::*;

pub const STEP_NAME: &str = "Fieldwork Mesh Fitting";
pub const STEP_CATEGORY: &str = "Fitting";

/// How `execute` proceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The host presents the fit to the operator and drives `fit`, `reset`,
    /// `abort` and `finish` itself.
    Interactive,
    /// The fit ran to completion and the host was told execution is done.
    Headless,
}

pub struct FittingStep<M> {
    config: Configuration,
    policy: ValidationPolicy,
    configured: bool,

    points: Option<PointCloud>,
    weights: Option<DVector<f64>>,
    /// Working model; becomes the fitted model after each fit.
    model: Option<M>,
    /// Model as received, restored by `reset`.
    unfitted: Option<M>,

    outcome: Option<FitOutcome<M>>,
    abort: AbortSignal,
}

impl<M: Clone> Default for FittingStep<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone> FittingStep<M> {
    pub fn new() -> Self {
        Self::with_policy(ValidationPolicy::default())
    }

    pub fn with_policy(policy: ValidationPolicy) -> Self {
        debug!(name = STEP_NAME, category = STEP_CATEGORY, policy = ?policy, "creating step");
        Self {
            config: defaults(),
            policy,
            configured: false,
            points: None,
            weights: None,
            model: None,
            unfitted: None,
            outcome: None,
            abort: AbortSignal::new(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Whether the last configuration check passed; a step only runs once
    /// configured.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn identifier(&self) -> &str {
        self.config.identifier()
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.config.set(ConfigKey::Identifier, identifier);
    }

    // ----- ports -----

    pub fn set_port_data(&mut self, index: usize, data: PortData<M>) -> Result<(), StepError> {
        let port = Port::from_index(index).ok_or(StepError::UnknownPort(index))?;
        match (port, data) {
            (Port::PointCloud, PortData::Points(points)) => {
                debug!(points = points.len(), "received point cloud");
                self.points = Some(points);
            }
            (Port::UnfittedModel, PortData::Model(model)) => {
                self.unfitted = Some(model.clone());
                self.model = Some(model);
            }
            (Port::Weights, PortData::Array(weights)) => {
                debug!(weights = weights.len(), "received data weights");
                self.weights = Some(weights);
            }
            (port, data) if port.is_input() => {
                return Err(StepError::PortPayload {
                    port,
                    expected: expected_payload(port),
                    found: data.kind(),
                });
            }
            (port, _) => return Err(StepError::ReadOnlyPort { port }),
        }
        Ok(())
    }

    /// Current data on a port; `None` until it has been set or computed.
    pub fn port_data(&self, index: usize) -> Result<Option<PortData<M>>, StepError> {
        let port = Port::from_index(index).ok_or(StepError::UnknownPort(index))?;
        let outcome = self.outcome.as_ref();
        Ok(match port {
            Port::PointCloud => self.points.clone().map(PortData::Points),
            Port::UnfittedModel => self.unfitted.clone().map(PortData::Model),
            Port::Weights => self.weights.clone().map(PortData::Array),
            Port::FittedModel => outcome.map(|o| PortData::Model(o.model.clone())),
            Port::FittedParameters => outcome.map(|o| PortData::Parameters(o.params.clone())),
            Port::RmsError => outcome.map(|o| PortData::Scalar(o.rms)),
            Port::Residuals => outcome.map(|o| PortData::Array(o.residuals.clone())),
        })
    }

    pub fn outcome(&self) -> Option<&FitOutcome<M>> {
        self.outcome.as_ref()
    }

    pub fn fitted_model(&self) -> Option<&M> {
        self.outcome.as_ref().map(|o| &o.model)
    }

    pub fn fitted_params(&self) -> Option<&NodalParams> {
        self.outcome.as_ref().map(|o| &o.params)
    }

    pub fn rms_error(&self) -> Option<f64> {
        self.outcome.as_ref().map(|o| o.rms)
    }

    pub fn residuals(&self) -> Option<&DVector<f64>> {
        self.outcome.as_ref().map(|o| &o.residuals)
    }

    // ----- configuration -----

    /// Run one editing session.
    ///
    /// `interact` receives the loaded and validated editor and reports how the
    /// session ended. An accepted session replaces the configuration; either
    /// way the configured flag is recomputed and the host notified.
    pub fn configure<H, F>(
        &mut self,
        host: &H,
        form: F,
        interact: impl FnOnce(&mut ConfigEditor<F, &H>) -> DialogOutcome,
    ) -> DialogOutcome
    where
        H: WorkflowHost,
        F: ConfigForm,
    {
        let mut editor = ConfigEditor::with_policy(form, host, self.policy);
        editor.load(&self.config);
        editor.validate();

        let outcome = interact(&mut editor);
        if outcome == DialogOutcome::Accepted {
            self.config = editor.read();
        }

        self.configured = editor.validate();
        info!(
            identifier = %self.identifier(),
            configured = self.configured,
            outcome = ?outcome,
            "configuration session finished"
        );
        host.step_configured(self.identifier(), self.configured);
        outcome
    }

    // ----- execution -----

    /// Start execution according to the `GUI` flag.
    pub fn execute<H, S>(&mut self, host: &H, fitter: &mut S) -> Result<ExecutionMode, StepError>
    where
        H: WorkflowHost,
        S: SurfaceFitter<Model = M>,
    {
        if gui_enabled(&self.config)? {
            info!(identifier = %self.identifier(), "handing fit over to interactive host");
            return Ok(ExecutionMode::Interactive);
        }

        self.fit(fitter, None)?;
        host.done_execution(self.identifier());
        Ok(ExecutionMode::Headless)
    }

    /// Translate the configuration, run the fitting routine and store its
    /// outcome.
    ///
    /// Configuration errors are reported before the routine is called. If an
    /// abort is pending when the routine starts or returns, the fit fails with
    /// `UserAbort` and the previous outcome is kept. The abort stays latched
    /// until `reset`.
    pub fn fit<S>(
        &mut self,
        fitter: &mut S,
        progress: Option<ProgressSink<'_>>,
    ) -> Result<&FitOutcome<M>, StepError>
    where
        S: SurfaceFitter<Model = M>,
    {
        let points = self
            .points
            .as_deref()
            .ok_or(StepError::MissingInput(Port::PointCloud))?;
        let model = self
            .model
            .as_ref()
            .ok_or(StepError::MissingInput(Port::UnfittedModel))?;

        let mut args = translate(&self.config, model, points, self.weights.as_ref())?
            .with_abort(self.abort.clone());
        if let Some(sink) = progress {
            args = args.with_progress(sink);
        }

        if self.abort.is_requested() {
            warn!("abort pending, fit not started");
            return Err(StepError::UserAbort);
        }

        info!(
            identifier = %self.config.identifier(),
            points = points.len(),
            "starting mesh fit"
        );
        let result = fitter.fit(args);

        if self.abort.is_requested() {
            warn!("mesh fit aborted by operator");
            return Err(StepError::UserAbort);
        }
        let raw = result.map_err(StepError::Fit)?;
        let outcome = raw.into_outcome();

        if outcome.residuals.len() != points.len() {
            warn!(
                residuals = outcome.residuals.len(),
                points = points.len(),
                "fitting routine returned a residual count different from the point count"
            );
        }
        info!(rms = outcome.rms, "mesh fit finished");

        self.model = Some(outcome.model.clone());
        Ok(self.outcome.insert(outcome))
    }

    /// Handle for cancelling a running fit from elsewhere.
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    pub fn abort(&self) {
        self.abort.request();
    }

    /// Drop the outcome and start over from the model as received.
    pub fn reset(&mut self) {
        self.outcome = None;
        self.model = self.unfitted.clone();
        self.abort.clear();
        info!("fit reset");
    }

    /// Interactive session accepted; outputs are final.
    pub fn finish<H: WorkflowHost>(&self, host: &H) {
        host.done_execution(self.identifier());
    }

    // ----- persistence -----

    pub fn serialize(&self) -> Result<String, StepError> {
        Ok(persist::to_json(&self.config)?)
    }

    /// Overlay a stored configuration and recompute the configured flag.
    pub fn deserialize<R: IdentifierRegistry>(&mut self, text: &str, registry: R) -> Result<(), StepError> {
        persist::overlay_json(&mut self.config, text)?;

        let mut editor = ConfigEditor::with_policy(FieldForm::new(), registry, self.policy);
        editor.load(&self.config);
        self.configured = editor.validate();
        debug!(identifier = %self.identifier(), configured = self.configured, "configuration restored");
        Ok(())
    }
}

fn expected_payload(port: Port) -> &'static str {
    match port {
        Port::PointCloud => "a point cloud",
        Port::UnfittedModel | Port::FittedModel => "a model",
        Port::Weights | Port::Residuals => "a 1-D array",
        Port::FittedParameters => "nodal parameters",
        Port::RmsError => "a scalar",
    }
}
