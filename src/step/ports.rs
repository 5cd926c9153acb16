//! Port table and port payloads.
//!
//! Indices are fixed by the host's port contract: inputs first, then outputs.

use std::fmt;

use nalgebra::DVector;

use crate::domain::{NodalParams, PointCloud};

const PORT: &str = "http://physiomeproject.org/workflow/1.0/rdf-schema#port";
const USES: &str = "http://physiomeproject.org/workflow/1.0/rdf-schema#uses";
const PROVIDES: &str = "http://physiomeproject.org/workflow/1.0/rdf-schema#provides";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    PointCloud,
    UnfittedModel,
    Weights,
    FittedModel,
    FittedParameters,
    RmsError,
    Residuals,
}

impl Port {
    pub const ALL: [Port; 7] = [
        Port::PointCloud,
        Port::UnfittedModel,
        Port::Weights,
        Port::FittedModel,
        Port::FittedParameters,
        Port::RmsError,
        Port::Residuals,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Port> {
        Port::ALL.get(index).copied()
    }

    pub fn is_input(self) -> bool {
        matches!(self, Port::PointCloud | Port::UnfittedModel | Port::Weights)
    }

    /// `(port, uses|provides, type)` triple announced to the host.
    pub fn descriptor(self) -> (&'static str, &'static str, &'static str) {
        let relation = if self.is_input() { USES } else { PROVIDES };
        let data_type = match self {
            Port::PointCloud => "http://physiomeproject.org/workflow/1.0/rdf-schema#pointcloud",
            Port::UnfittedModel | Port::FittedModel => "ju#fieldworkmodel",
            Port::Weights | Port::Residuals => "numpy#array1d",
            Port::FittedParameters => "ju#fieldworkmodelparameters",
            Port::RmsError => "python#float",
        };
        (PORT, relation, data_type)
    }

    pub fn name(self) -> &'static str {
        match self {
            Port::PointCloud => "point cloud",
            Port::UnfittedModel => "unfitted model",
            Port::Weights => "weights",
            Port::FittedModel => "fitted model",
            Port::FittedParameters => "fitted parameters",
            Port::RmsError => "RMS error",
            Port::Residuals => "residuals",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

/// Data carried by a port.
#[derive(Debug, Clone, PartialEq)]
pub enum PortData<M> {
    Points(PointCloud),
    Model(M),
    Array(DVector<f64>),
    Parameters(NodalParams),
    Scalar(f64),
}

impl<M> PortData<M> {
    pub fn kind(&self) -> &'static str {
        match self {
            PortData::Points(_) => "a point cloud",
            PortData::Model(_) => "a model",
            PortData::Array(_) => "a 1-D array",
            PortData::Parameters(_) => "nodal parameters",
            PortData::Scalar(_) => "a scalar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_port_table() {
        for (i, port) in Port::ALL.iter().enumerate() {
            assert_eq!(port.index(), i);
            assert_eq!(Port::from_index(i), Some(*port));
        }
        assert_eq!(Port::from_index(7), None);
    }

    #[test]
    fn inputs_use_outputs_provide() {
        assert_eq!(Port::Weights.descriptor().1, USES);
        assert_eq!(Port::Residuals.descriptor().1, PROVIDES);
        assert_eq!(Port::RmsError.descriptor().2, "python#float");
    }
}
