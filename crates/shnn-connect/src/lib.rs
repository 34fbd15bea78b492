//! Connection-generation strategies for spiking neural network populations
//!
//! A [`Connector`] decides which neuron pairs between a presynaptic and a
//! postsynaptic [`Population`] become synapses, and with what weight and
//! delay. Realized pairs are appended to a [`Projection`] and forwarded to a
//! simulator through the [`ConnectionBackend`] trait.
//!
//! ```
//! use shnn_connect::{
//!     AllToAllConnector, ConnectOptions, Connector, MemoryBackend, Population,
//!     Projection, SynapseType,
//! };
//!
//! let pop = Population::new("exc", 1, &[4]).unwrap();
//! let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);
//! let mut backend = MemoryBackend::new();
//!
//! let connector = AllToAllConnector::new(false).with_weights(0.5);
//! let count = connector
//!     .connect(&mut projection, &mut backend, &ConnectOptions::default())
//!     .unwrap();
//! assert_eq!(count, 12);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod population;
pub mod projection;
pub mod weights;
pub mod values;
pub mod rng;
pub mod backend;
pub mod validate;
pub mod expression;
pub mod distance;
pub mod connectors;
pub mod config;

// Re-export essential types
pub use error::{ConnectError, Result};
pub use ids::NeuronId;
pub use population::{Coordinate, Population};
pub use projection::{ConnectionList, Projection};
pub use weights::{convert_batch, convert_scalar, convert_weight, SynapseType, Weights};
pub use values::{CountSpec, ValueGenerator};
pub use rng::{NativeRng, RandomSource};
pub use backend::{ConnectionBackend, ConnectionRecord, MemoryBackend};
pub use validate::verify_connections;
pub use expression::Expression;
pub use distance::{DistanceMetric, PeriodicBoundaries};
pub use connectors::{
    parse_connection_file, write_connection_file, AllToAllConnector, ConnectOptions, Connector,
    DistanceDependentProbabilityConnector, DistanceValue, FixedNumberPostConnector,
    FixedNumberPreConnector, FixedProbabilityConnector, FromFileConnector, FromListConnector,
    ListConnection, OneToOneConnector,
};
pub use config::{
    ConnectionConfig, ConnectorConfig, DistanceValueConfig, PeriodicBoundariesConfig,
};

/// Factor converting biological weight units to the simulator's internal scale
pub const WEIGHT_SCALE: f64 = 1000.0;

/// Default synaptic delay in milliseconds, the simulator's minimum delay
pub const DEFAULT_MIN_DELAY: f64 = 0.1;

/// Synapse model tag used when a projection does not name one
pub const DEFAULT_SYNAPSE_MODEL: &str = "static_synapse";
