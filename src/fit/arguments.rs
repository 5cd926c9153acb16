//! Typed argument record handed to the external fitting routine.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::{DVector, Point3};

use crate::config::literal::Literal;
use crate::domain::{Discretisation, NodalParams, PenaltyWeights};
use crate::fit::AbortSignal;

/// One intermediate result reported by the fitting routine.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub rms: f64,
    pub params: NodalParams,
}

/// Progress sink invoked synchronously from inside the fitting call.
pub type ProgressSink<'a> = &'a mut dyn FnMut(&IterationReport);

/// Everything one fitting call needs.
///
/// Built fresh from the current configuration for every fit and consumed by a
/// single call; never persisted.
pub struct FitArguments<'a, M> {
    pub model: &'a M,
    pub points: &'a [Point3<f64>],
    pub weights: Option<&'a DVector<f64>>,

    pub mesh_discretisation: Discretisation,
    pub sobelov_discretisation: Discretisation,
    pub sobelov_weight: PenaltyWeights,
    pub normal_discretisation: Discretisation,
    pub normal_weight: f64,

    pub max_sub_iterations: usize,
    pub xtol: f64,
    pub max_iterations: usize,
    /// Objective variant; passed through untouched.
    pub fit_mode: String,
    pub n_closest_points: usize,
    /// Extra nearest-neighbour search options, forwarded verbatim.
    pub kdtree_args: BTreeMap<String, Literal>,
    pub verbose: bool,
    pub fixed_nodes: Vec<i64>,

    /// Always set: the step exposes per-point residuals.
    pub full_errors: bool,

    pub progress: Option<ProgressSink<'a>>,
    pub abort: AbortSignal,
}

impl<'a, M> FitArguments<'a, M> {
    pub fn with_progress(mut self, sink: ProgressSink<'a>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Forward an intermediate result to the sink, if any.
    pub fn report(&mut self, report: &IterationReport) {
        if let Some(sink) = self.progress.as_deref_mut() {
            sink(report);
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for FitArguments<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitArguments")
            .field("model", &self.model)
            .field("points", &self.points.len())
            .field("weights", &self.weights.map(|w| w.len()))
            .field("mesh_discretisation", &self.mesh_discretisation)
            .field("sobelov_discretisation", &self.sobelov_discretisation)
            .field("sobelov_weight", &self.sobelov_weight)
            .field("normal_discretisation", &self.normal_discretisation)
            .field("normal_weight", &self.normal_weight)
            .field("max_sub_iterations", &self.max_sub_iterations)
            .field("xtol", &self.xtol)
            .field("max_iterations", &self.max_iterations)
            .field("fit_mode", &self.fit_mode)
            .field("n_closest_points", &self.n_closest_points)
            .field("kdtree_args", &self.kdtree_args)
            .field("verbose", &self.verbose)
            .field("fixed_nodes", &self.fixed_nodes)
            .field("full_errors", &self.full_errors)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
