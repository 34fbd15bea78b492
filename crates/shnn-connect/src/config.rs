//! TOML configuration for a connection run

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    connectors::{
        default_delays, default_weights, AllToAllConnector, ConnectOptions, Connector,
        DistanceDependentProbabilityConnector, DistanceValue, FixedNumberPostConnector,
        FixedNumberPreConnector, FixedProbabilityConnector, FromFileConnector,
        FromListConnector, ListConnection, OneToOneConnector,
    },
    distance::{DistanceMetric, PeriodicBoundaries},
    error::{ConnectError, Result},
    expression::Expression,
    population::Population,
    projection::Projection,
    rng::RandomSource,
    values::{CountSpec, ValueGenerator},
    weights::SynapseType,
    DEFAULT_SYNAPSE_MODEL,
};

/// Settings for one projection and the connector that fills it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Verify each batch against the backend
    #[serde(default = "default_true")]
    pub check_connections: bool,

    /// Seed for the projection's generator; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Ask for the simulator's native generator
    #[serde(default)]
    pub native_rng: bool,

    /// Synapse polarity
    #[serde(default)]
    pub synapse_type: SynapseType,

    /// Synapse model tag used for backend queries
    #[serde(default = "default_synapse_model")]
    pub synapse_model: String,

    /// Connection rule
    pub connector: ConnectorConfig,
}

/// Connection rule and its parameters, tagged by `rule`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConnectorConfig {
    /// Every source to every local target
    AllToAll {
        /// Keep self pairs
        #[serde(default = "default_true")]
        allow_self_connections: bool,
        /// Weights
        #[serde(default = "default_weights")]
        weights: ValueGenerator,
        /// Delays
        #[serde(default = "default_delays")]
        delays: ValueGenerator,
    },
    /// Index-wise pairs
    OneToOne {
        /// Weights
        #[serde(default = "default_weights")]
        weights: ValueGenerator,
        /// Delays
        #[serde(default = "default_delays")]
        delays: ValueGenerator,
    },
    /// Independent coin flip per pair
    FixedProbability {
        /// Connection probability
        p_connect: f64,
        /// Keep self pairs
        #[serde(default = "default_true")]
        allow_self_connections: bool,
        /// Weights
        #[serde(default = "default_weights")]
        weights: ValueGenerator,
        /// Delays
        #[serde(default = "default_delays")]
        delays: ValueGenerator,
    },
    /// Probability as a function of distance
    DistanceDependentProbability {
        /// Probability expression in `d`
        d_expression: String,
        /// Keep self pairs
        #[serde(default = "default_true")]
        allow_self_connections: bool,
        /// Weights, as a generator or an expression in `d`
        #[serde(default = "default_distance_weights")]
        weights: DistanceValueConfig,
        /// Delays, as a generator or an expression in `d`
        #[serde(default = "default_distance_delays")]
        delays: DistanceValueConfig,
        /// `true` wraps on the target population extent, an array gives it
        #[serde(default)]
        periodic_boundaries: PeriodicBoundariesConfig,
        /// Axes used for distances
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mask: Option<Vec<usize>>,
        /// Distance multiplier
        #[serde(default = "default_scale_factor")]
        scale_factor: f64,
        /// Distance offset
        #[serde(default)]
        offset: f64,
    },
    /// Fixed fan-out
    FixedNumberPost {
        /// Targets per source
        n: CountSpec,
        /// Keep self pairs
        #[serde(default = "default_true")]
        allow_self_connections: bool,
        /// Weights
        #[serde(default = "default_weights")]
        weights: ValueGenerator,
        /// Delays
        #[serde(default = "default_delays")]
        delays: ValueGenerator,
    },
    /// Fixed fan-in
    FixedNumberPre {
        /// Sources per target
        n: CountSpec,
        /// Keep self pairs
        #[serde(default = "default_true")]
        allow_self_connections: bool,
        /// Weights
        #[serde(default = "default_weights")]
        weights: ValueGenerator,
        /// Delays
        #[serde(default = "default_delays")]
        delays: ValueGenerator,
    },
    /// Literal connection list
    FromList {
        /// Entries
        #[serde(default)]
        connections: Vec<ListConnection>,
    },
    /// Connection file
    FromFile {
        /// File location
        path: PathBuf,
    },
}

/// Weight or delay setting of the distance-dependent rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistanceValueConfig {
    /// Expression in `d`
    Expression(String),
    /// Distance-independent generator
    Generated(ValueGenerator),
}

/// Periodic boundary setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodicBoundariesConfig {
    /// Off, or on with the target population extent
    Flag(bool),
    /// Explicit extent per axis
    Extent([f64; 3]),
}

impl Default for PeriodicBoundariesConfig {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl From<PeriodicBoundariesConfig> for PeriodicBoundaries {
    fn from(config: PeriodicBoundariesConfig) -> Self {
        match config {
            PeriodicBoundariesConfig::Flag(false) => Self::None,
            PeriodicBoundariesConfig::Flag(true) => Self::Population,
            PeriodicBoundariesConfig::Extent(extent) => Self::Explicit(extent),
        }
    }
}

impl DistanceValueConfig {
    fn build(&self) -> Result<DistanceValue> {
        Ok(match self {
            Self::Expression(source) => DistanceValue::Expression(Expression::parse(source)?),
            Self::Generated(generator) => DistanceValue::Generated(generator.clone()),
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_synapse_model() -> String {
    DEFAULT_SYNAPSE_MODEL.to_string()
}

fn default_distance_weights() -> DistanceValueConfig {
    DistanceValueConfig::Generated(default_weights())
}

fn default_distance_delays() -> DistanceValueConfig {
    DistanceValueConfig::Generated(default_delays())
}

fn default_scale_factor() -> f64 {
    1.0
}

impl ConnectorConfig {
    /// Build the configured connector
    pub fn build(&self) -> Result<Box<dyn Connector>> {
        let connector: Box<dyn Connector> = match self {
            Self::AllToAll {
                allow_self_connections,
                weights,
                delays,
            } => Box::new(
                AllToAllConnector::new(*allow_self_connections)
                    .with_weights(weights.clone())
                    .with_delays(delays.clone()),
            ),
            Self::OneToOne { weights, delays } => Box::new(
                OneToOneConnector::new()
                    .with_weights(weights.clone())
                    .with_delays(delays.clone()),
            ),
            Self::FixedProbability {
                p_connect,
                allow_self_connections,
                weights,
                delays,
            } => Box::new(
                FixedProbabilityConnector::new(*p_connect, *allow_self_connections)?
                    .with_weights(weights.clone())
                    .with_delays(delays.clone()),
            ),
            Self::DistanceDependentProbability {
                d_expression,
                allow_self_connections,
                weights,
                delays,
                periodic_boundaries,
                mask,
                scale_factor,
                offset,
            } => {
                let metric = DistanceMetric {
                    mask: mask.clone(),
                    scale_factor: *scale_factor,
                    offset: *offset,
                    periodic_boundaries: (*periodic_boundaries).into(),
                };
                metric.validate()?;
                Box::new(
                    DistanceDependentProbabilityConnector::new(d_expression, *allow_self_connections)?
                        .with_weights(weights.build()?)
                        .with_delays(delays.build()?)
                        .with_metric(metric),
                )
            }
            Self::FixedNumberPost {
                n,
                allow_self_connections,
                weights,
                delays,
            } => Box::new(
                FixedNumberPostConnector::new(*n, *allow_self_connections)?
                    .with_weights(weights.clone())
                    .with_delays(delays.clone()),
            ),
            Self::FixedNumberPre {
                n,
                allow_self_connections,
                weights,
                delays,
            } => Box::new(
                FixedNumberPreConnector::new(*n, *allow_self_connections)?
                    .with_weights(weights.clone())
                    .with_delays(delays.clone()),
            ),
            Self::FromList { connections } => Box::new(FromListConnector::new(connections.clone())),
            Self::FromFile { path } => Box::new(FromFileConnector::new(path.clone())),
        };
        Ok(connector)
    }
}

impl ConnectionConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConnectError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConnectError::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the configured connector
    pub fn build_connector(&self) -> Result<Box<dyn Connector>> {
        self.connector.build()
    }

    /// Per-call options
    pub fn options(&self) -> ConnectOptions {
        ConnectOptions {
            check_connections: self.check_connections,
        }
    }

    /// Random source for the projection, if the config pins one
    pub fn random_source(&self) -> Option<RandomSource> {
        match (self.native_rng, self.seed) {
            (true, seed) => Some(RandomSource::native(seed)),
            (false, Some(seed)) => Some(RandomSource::seeded(seed)),
            (false, None) => None,
        }
    }

    /// Empty projection between `pre` and `post` carrying these settings
    pub fn projection<'a>(&self, pre: &'a Population, post: &'a Population) -> Projection<'a> {
        let projection = Projection::new(pre, post, self.synapse_type)
            .with_synapse_model(self.synapse_model.clone());
        match self.random_source() {
            Some(rng) => projection.with_rng(rng),
            None => projection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_MIN_DELAY;

    #[test]
    fn test_defaults_applied() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            [connector]
            rule = "all_to_all"
            "#,
        )
        .unwrap();

        assert!(config.check_connections);
        assert_eq!(config.synapse_type, SynapseType::Excitatory);
        assert_eq!(config.synapse_model, DEFAULT_SYNAPSE_MODEL);
        assert!(config.random_source().is_none());
        assert_eq!(
            config.connector,
            ConnectorConfig::AllToAll {
                allow_self_connections: true,
                weights: ValueGenerator::Constant(0.0),
                delays: ValueGenerator::Constant(DEFAULT_MIN_DELAY),
            }
        );
    }

    #[test]
    fn test_count_distribution_rule() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            [connector]
            rule = "fixed_number_pre"
            n = { mean = 2.5 }
            "#,
        )
        .unwrap();

        match &config.connector {
            ConnectorConfig::FixedNumberPre { n, weights, delays, .. } => {
                assert_eq!(*n, CountSpec::Poisson { mean: 2.5 });
                assert_eq!(weights, &default_weights());
                assert_eq!(delays, &default_delays());
            }
            other => panic!("unexpected rule {:?}", other),
        }
        assert_eq!(config.build_connector().unwrap().name(), "FixedNumberPreConnector");
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let err = ConnectionConfig::from_toml_str(
            r#"
            [connector]
            rule = "small_world"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConnectError::Toml(_)));
    }

    #[test]
    fn test_distance_rule_fields() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            seed = 42
            synapse_type = "inhibitory"

            [connector]
            rule = "distance_dependent_probability"
            d_expression = "exp(-d)"
            weights = "0.1 * d"
            delays = { low = 0.5, high = 1.5 }
            periodic_boundaries = true
            mask = [0]
            "#,
        )
        .unwrap();

        assert!(config.random_source().is_some());
        match &config.connector {
            ConnectorConfig::DistanceDependentProbability {
                weights,
                delays,
                periodic_boundaries,
                ..
            } => {
                assert_eq!(weights, &DistanceValueConfig::Expression("0.1 * d".to_string()));
                assert_eq!(
                    delays,
                    &DistanceValueConfig::Generated(ValueGenerator::Uniform { low: 0.5, high: 1.5 })
                );
                assert_eq!(
                    PeriodicBoundaries::from(*periodic_boundaries),
                    PeriodicBoundaries::Population
                );
            }
            other => panic!("unexpected rule {:?}", other),
        }
        assert_eq!(
            config.build_connector().unwrap().name(),
            "DistanceDependentProbabilityConnector"
        );
    }

    #[test]
    fn test_invalid_parameters_surface_on_build() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            [connector]
            rule = "fixed_probability"
            p_connect = 1.5
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_connector().unwrap_err(),
            ConnectError::InvalidParameter { .. }
        ));
    }
}
