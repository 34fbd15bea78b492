use log::info;

use super::{
    default_delays, default_weights, draw_values, emit_pairs, synapse_value_builders,
    ConnectOptions, Connector,
};
use crate::{
    backend::ConnectionBackend,
    error::{ConnectError, Result},
    projection::Projection,
    rng,
    weights::convert_batch,
    NeuronId, ValueGenerator,
};

/// Connect the i-th presynaptic neuron to the i-th postsynaptic neuron.
///
/// Both populations must have the same shape. The whole projection goes to
/// the backend as a single batch of aligned pairs, and no per-source check is
/// made.
#[derive(Debug, Clone, PartialEq)]
pub struct OneToOneConnector {
    /// Weight generator
    pub weights: ValueGenerator,
    /// Delay generator
    pub delays: ValueGenerator,
}

impl OneToOneConnector {
    /// Create the connector with zero weights and minimum delays
    pub fn new() -> Self {
        Self {
            weights: default_weights(),
            delays: default_delays(),
        }
    }
}

impl Default for OneToOneConnector {
    fn default() -> Self {
        Self::new()
    }
}

synapse_value_builders!(OneToOneConnector);

impl Connector for OneToOneConnector {
    fn name(&self) -> &'static str {
        "OneToOneConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        _options: &ConnectOptions,
    ) -> Result<usize> {
        let (pre, post) = (projection.pre, projection.post);
        if pre.shape() != post.shape() {
            return Err(ConnectError::DimensionMismatch {
                connector: self.name(),
                pre: pre.shape().to_vec(),
                post: post.shape().to_vec(),
            });
        }
        info!("Connecting {} -> {} one-to-one", pre.label(), post.label());

        let sources: Vec<NeuronId> = pre.ids().collect();
        let targets: Vec<NeuronId> = post.ids().collect();

        rng::prepare(&mut projection.rng);
        let rng = rng::draw_rng(&mut projection.rng);
        let (weights, delays) = draw_values(&self.weights, &self.delays, sources.len(), rng)?;
        let weights = convert_batch(weights, projection.synapse_type)?;

        emit_pairs(projection, backend, &sources, &targets, &weights, &delays)?;
        Ok(pre.size())
    }
}
