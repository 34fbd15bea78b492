//! Weight conversion and polarity checks
//!
//! Weights are given in biological units and scaled by [`WEIGHT_SCALE`]
//! before they reach the simulator. Inhibitory synapses carry non-positive
//! weights, excitatory synapses non-negative ones.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConnectError, Result},
    WEIGHT_SCALE,
};

/// Synapse polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynapseType {
    /// Non-negative weights
    #[default]
    Excitatory,
    /// Non-positive weights
    Inhibitory,
}

impl fmt::Display for SynapseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excitatory => write!(f, "excitatory"),
            Self::Inhibitory => write!(f, "inhibitory"),
        }
    }
}

impl FromStr for SynapseType {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "excitatory" => Ok(Self::Excitatory),
            "inhibitory" => Ok(Self::Inhibitory),
            other => Err(ConnectError::invalid_parameter(
                "synapse_type",
                other,
                "excitatory or inhibitory",
            )),
        }
    }
}

/// A single weight or a batch of weights
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    /// One value
    Scalar(f64),
    /// Homogeneous batch
    Batch(Vec<f64>),
}

impl Weights {
    /// Flatten into a vector
    pub fn into_vec(self) -> Vec<f64> {
        match self {
            Self::Scalar(w) => vec![w],
            Self::Batch(ws) => ws,
        }
    }
}

impl From<f64> for Weights {
    fn from(w: f64) -> Self {
        Self::Scalar(w)
    }
}

impl From<Vec<f64>> for Weights {
    fn from(ws: Vec<f64>) -> Self {
        Self::Batch(ws)
    }
}

/// Scale weights to internal units and enforce the polarity of `synapse_type`
pub fn convert_weight(weight: Weights, synapse_type: SynapseType) -> Result<Weights> {
    match weight {
        Weights::Scalar(w) => convert_scalar(w, synapse_type).map(Weights::Scalar),
        Weights::Batch(ws) => convert_batch(ws, synapse_type).map(Weights::Batch),
    }
}

/// Scalar form of [`convert_weight`]
pub fn convert_scalar(w: f64, synapse_type: SynapseType) -> Result<f64> {
    if w.is_nan() {
        return Err(ConnectError::WeightType {
            found: w.to_string(),
        });
    }

    let weight = w * WEIGHT_SCALE;
    match synapse_type {
        SynapseType::Inhibitory if weight > 0.0 => Ok(-weight),
        SynapseType::Excitatory if weight < 0.0 => Err(ConnectError::invalid_weight(format!(
            "Weight must be positive for excitatory synapses. Actual value {}",
            weight
        ))),
        _ => Ok(weight),
    }
}

/// Batch form of [`convert_weight`]
pub fn convert_batch(ws: Vec<f64>, synapse_type: SynapseType) -> Result<Vec<f64>> {
    if let Some(w) = ws.iter().find(|w| w.is_nan()) {
        return Err(ConnectError::WeightType {
            found: w.to_string(),
        });
    }

    let mut weights: Vec<f64> = ws.into_iter().map(|w| w * WEIGHT_SCALE).collect();
    let all_negative = weights.iter().all(|&w| w <= 0.0);
    let all_positive = weights.iter().all(|&w| w >= 0.0);

    if !(all_negative || all_positive) {
        return Err(ConnectError::invalid_weight(
            "Weights must be either all positive or all negative",
        ));
    }

    match synapse_type {
        SynapseType::Inhibitory if all_positive => {
            weights.iter_mut().for_each(|w| *w = -*w);
        }
        SynapseType::Excitatory if !all_positive => {
            return Err(ConnectError::invalid_weight(
                "Weights must be positive for excitatory synapses",
            ));
        }
        _ => {}
    }
    Ok(weights)
}
