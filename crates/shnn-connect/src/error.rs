//! Error types for connection generation

use thiserror::Error;

use crate::NeuronId;

/// Result type for connection operations
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors that can occur while generating connections
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Weight sign does not agree with the synapse polarity
    #[error("Invalid weight: {reason}")]
    InvalidWeight {
        /// Reason the weight was rejected
        reason: String,
    },

    /// Weight value is not a usable number
    #[error("Weight must be a number, got {found}")]
    WeightType {
        /// Textual form of the offending value
        found: String,
    },

    /// Populations have incompatible shapes for a pairwise connector
    #[error("Dimension mismatch: {connector} requires equal shapes, got {pre:?} and {post:?}")]
    DimensionMismatch {
        /// Connector that required matching shapes
        connector: &'static str,
        /// Presynaptic shape
        pre: Vec<usize>,
        /// Postsynaptic shape
        post: Vec<usize>,
    },

    /// Backend registered different targets than requested
    #[error("Connection mismatch for source {neuron}: {actual:?} != {expected:?}")]
    ConnectionMismatch {
        /// Source neuron that was checked
        neuron: NeuronId,
        /// Targets the connector asked for
        expected: Vec<NeuronId>,
        /// Trailing targets the backend reports
        actual: Vec<NeuronId>,
    },

    /// Backend has no connection record for a source neuron
    #[error("Problem getting connections for {neuron} ({model})")]
    MissingConnectionRecord {
        /// Source neuron that was queried
        neuron: NeuronId,
        /// Synapse model tag used for the query
        model: String,
    },

    /// Malformed line in a connection file
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Reason for the parse failure
        reason: String,
    },

    /// Distance expression could not be parsed
    #[error("Invalid expression '{expression}': {reason}")]
    Expression {
        /// Source text of the expression
        expression: String,
        /// Reason the expression was rejected
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Coordinate does not address a neuron in the population
    #[error("Coordinate {coordinate:?} out of range for population '{population}' with shape {shape:?}")]
    CoordinateOutOfRange {
        /// Population label
        population: String,
        /// Requested coordinate
        coordinate: Vec<usize>,
        /// Population shape
        shape: Vec<usize>,
    },

    /// Backend rejected a connect call
    #[error("Backend error: {reason}")]
    Backend {
        /// Reason reported by the backend
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("Serialization error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConnectError {
    /// Create an invalid weight error
    pub fn invalid_weight(reason: impl Into<String>) -> Self {
        Self::InvalidWeight {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a parse error for a file line
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Create an expression error
    pub fn expression(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a backend error
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
