//! Boundary with the external surface-fitting routine.
//!
//! The optimizer itself (closest-point search, Sobolev and normal penalties,
//! nonlinear least squares) lives outside this crate. This module defines:
//!
//! - the typed argument record (`FitArguments`)
//! - the routine's contract (`SurfaceFitter`) and its raw return value
//! - the abort signal shared between a host UI and a running fit

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::DVector;

use crate::domain::{FitOutcome, NodalParams};

pub mod arguments;

pub use arguments::*;

/// Failure raised by the fitting routine, passed through as-is.
pub type FitFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What the routine returns: fitted model, parameters, RMS error and the
/// squared error of every data point.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFit<M> {
    pub model: M,
    pub params: NodalParams,
    pub rms: f64,
    pub squared_errors: DVector<f64>,
}

impl<M> RawFit<M> {
    /// Convert to the exposed outcome: per-point errors become distances.
    pub fn into_outcome(self) -> FitOutcome<M> {
        FitOutcome {
            model: self.model,
            params: self.params,
            rms: self.rms,
            residuals: self.squared_errors.map(f64::sqrt),
        }
    }
}

/// An external surface-fitting routine.
///
/// Implementations should call `args.report(..)` after every iteration and
/// stop early (returning an error) once `args.abort.is_requested()`.
pub trait SurfaceFitter {
    type Model: Clone;

    fn fit(&mut self, args: FitArguments<'_, Self::Model>) -> Result<RawFit<Self::Model>, FitFailure>;
}

/// Cloneable cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_takes_square_roots() {
        let raw = RawFit {
            model: (),
            params: NodalParams { components: vec![] },
            rms: 2.5,
            squared_errors: DVector::from_vec(vec![4.0, 9.0]),
        };
        let outcome = raw.into_outcome();
        assert_eq!(outcome.residuals.as_slice(), &[2.0, 3.0]);
        assert_eq!(outcome.rms, 2.5);
    }

    #[test]
    fn abort_signal_is_shared_between_clones() {
        let signal = AbortSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_requested());
        handle.request();
        assert!(signal.is_requested());
        signal.clear();
        assert!(!handle.is_requested());
    }
}
