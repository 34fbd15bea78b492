//! Connection strategies
//!
//! Every connector walks the presynaptic population, decides the targets of
//! each source (or the sources of each target for the convergent rule), draws
//! weights and delays, and emits the batch to a [`ConnectionBackend`]. The
//! realized pairs are appended to the projection in emission order.

use std::fmt;

use log::debug;
use rand::rngs::StdRng;

use crate::{
    backend::ConnectionBackend,
    error::Result,
    projection::Projection,
    validate::verify_connections,
    values::ValueGenerator,
    weights::convert_batch,
    NeuronId,
};

mod all_to_all;
mod distance_dependent;
mod fixed_number;
mod fixed_probability;
mod from_list;
mod one_to_one;

pub use all_to_all::AllToAllConnector;
pub use distance_dependent::{DistanceDependentProbabilityConnector, DistanceValue};
pub use fixed_number::{FixedNumberPostConnector, FixedNumberPreConnector};
pub use fixed_probability::FixedProbabilityConnector;
pub use from_list::{
    parse_connection_file, write_connection_file, FromFileConnector, FromListConnector,
    ListConnection,
};
pub use one_to_one::OneToOneConnector;

/// Per-call settings shared by every connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Ask the backend after each divergent or convergent batch whether it
    /// registered exactly the requested targets
    pub check_connections: bool,
}

impl ConnectOptions {
    /// Options with post-hoc verification turned off
    pub fn unchecked() -> Self {
        Self {
            check_connections: false,
        }
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            check_connections: true,
        }
    }
}

/// A rule deciding which neurons of a projection get connected
pub trait Connector: fmt::Debug {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Realize connections on `projection`, forwarding them to `backend`.
    ///
    /// Returns the number of connections created. On error the pairs emitted
    /// before the failing batch stay on the projection.
    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize>;
}

impl<C: Connector + ?Sized> Connector for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize> {
        (**self).connect(projection, backend, options)
    }
}

/// Weight and delay builders for connectors holding `weights` and `delays`
/// generators
macro_rules! synapse_value_builders {
    ($connector:ty) => {
        impl $connector {
            /// Set the weight generator, in biological units
            pub fn with_weights(mut self, weights: impl Into<$crate::ValueGenerator>) -> Self {
                self.weights = weights.into();
                self
            }

            /// Set the delay generator, in milliseconds
            pub fn with_delays(mut self, delays: impl Into<$crate::ValueGenerator>) -> Self {
                self.delays = delays.into();
                self
            }
        }
    };
}
pub(crate) use synapse_value_builders;

pub(crate) fn default_weights() -> ValueGenerator {
    ValueGenerator::Constant(0.0)
}

pub(crate) fn default_delays() -> ValueGenerator {
    ValueGenerator::Constant(crate::DEFAULT_MIN_DELAY)
}

/// Draw `n` weights then `n` delays
pub(crate) fn draw_values(
    weights: &ValueGenerator,
    delays: &ValueGenerator,
    n: usize,
    rng: &mut StdRng,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let weights = weights.sample(n, rng)?;
    let delays = delays.sample(n, rng)?;
    Ok((weights, delays))
}

/// Remove the first occurrence of `id` from `ids`
pub(crate) fn remove_first(ids: &mut Vec<NeuronId>, id: NeuronId) {
    if let Some(pos) = ids.iter().position(|&other| other == id) {
        ids.remove(pos);
    }
}

/// One source onto many targets, with raw weights in biological units
pub(crate) fn emit_divergent(
    projection: &mut Projection<'_>,
    backend: &mut dyn ConnectionBackend,
    options: &ConnectOptions,
    source: NeuronId,
    targets: &[NeuronId],
    weights: Vec<f64>,
    delays: &[f64],
) -> Result<()> {
    let weights = convert_batch(weights, projection.synapse_type)?;
    projection.connections.push_divergent(source, targets);
    debug!("{} -> {} targets", source, targets.len());

    backend.divergent_connect(source, targets, &weights, delays)?;
    if options.check_connections {
        verify_connections(&*backend, projection, source, targets)?;
    }
    Ok(())
}

/// Many sources onto one target, with raw weights in biological units
pub(crate) fn emit_convergent(
    projection: &mut Projection<'_>,
    backend: &mut dyn ConnectionBackend,
    options: &ConnectOptions,
    sources: &[NeuronId],
    target: NeuronId,
    weights: Vec<f64>,
    delays: &[f64],
) -> Result<()> {
    let weights = convert_batch(weights, projection.synapse_type)?;
    projection.connections.push_convergent(sources, target);
    debug!("{} sources -> {}", sources.len(), target);

    backend.convergent_connect(sources, target, &weights, delays)?;
    if options.check_connections {
        for &source in sources {
            verify_connections(&*backend, projection, source, &[target])?;
        }
    }
    Ok(())
}

/// Aligned pairs with weights already in internal units
pub(crate) fn emit_pairs(
    projection: &mut Projection<'_>,
    backend: &mut dyn ConnectionBackend,
    sources: &[NeuronId],
    targets: &[NeuronId],
    weights: &[f64],
    delays: &[f64],
) -> Result<()> {
    projection.connections.extend_pairs(sources, targets);
    debug!("{} pairs", sources.len());
    backend.connect(sources, targets, weights, delays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectError, MemoryBackend, Population, SynapseType};

    #[test]
    fn test_default_options_check() {
        assert!(ConnectOptions::default().check_connections);
        assert!(!ConnectOptions::unchecked().check_connections);
    }

    #[test]
    fn test_emit_divergent_converts_and_records() {
        let pop = Population::new("p", 0, &[3]).unwrap();
        let mut projection = Projection::new(&pop, &pop, SynapseType::Inhibitory);
        let mut backend = MemoryBackend::new();
        let targets = [NeuronId::new(1), NeuronId::new(2)];

        emit_divergent(
            &mut projection,
            &mut backend,
            &ConnectOptions::default(),
            NeuronId::new(0),
            &targets,
            vec![0.5, 0.25],
            &[0.1, 0.1],
        )
        .unwrap();

        assert_eq!(projection.targets(), &targets);
        assert_eq!(backend.weights_of(NeuronId::new(0)), vec![-500.0, -250.0]);
    }

    #[test]
    fn test_emit_rejects_mixed_signs() {
        let pop = Population::new("p", 0, &[3]).unwrap();
        let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);
        let mut backend = MemoryBackend::new();

        let err = emit_convergent(
            &mut projection,
            &mut backend,
            &ConnectOptions::default(),
            &[NeuronId::new(0), NeuronId::new(1)],
            NeuronId::new(2),
            vec![1.0, -1.0],
            &[0.1, 0.1],
        )
        .unwrap_err();

        assert!(matches!(err, ConnectError::InvalidWeight { .. }));
        assert!(projection.is_empty());
        assert_eq!(backend.synapse_count(), 0);
    }

    #[test]
    fn test_remove_first() {
        let mut ids = vec![NeuronId::new(1), NeuronId::new(2), NeuronId::new(3)];
        remove_first(&mut ids, NeuronId::new(2));
        remove_first(&mut ids, NeuronId::new(9));
        assert_eq!(ids, vec![NeuronId::new(1), NeuronId::new(3)]);
    }
}
