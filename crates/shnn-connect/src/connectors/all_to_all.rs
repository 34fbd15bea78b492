use log::info;

use super::{
    default_delays, default_weights, draw_values, emit_divergent, remove_first,
    synapse_value_builders, ConnectOptions, Connector,
};
use crate::{
    backend::ConnectionBackend, error::Result, projection::Projection, rng, NeuronId,
    ValueGenerator,
};

/// Connect every presynaptic neuron to every local postsynaptic neuron
#[derive(Debug, Clone, PartialEq)]
pub struct AllToAllConnector {
    /// Keep `pre == post` pairs when the populations overlap
    pub allow_self_connections: bool,
    /// Weight generator
    pub weights: ValueGenerator,
    /// Delay generator
    pub delays: ValueGenerator,
}

impl AllToAllConnector {
    /// Create the connector with zero weights and minimum delays
    pub fn new(allow_self_connections: bool) -> Self {
        Self {
            allow_self_connections,
            weights: default_weights(),
            delays: default_delays(),
        }
    }
}

synapse_value_builders!(AllToAllConnector);

impl Connector for AllToAllConnector {
    fn name(&self) -> &'static str {
        "AllToAllConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize> {
        let (pre, post) = (projection.pre, projection.post);
        let local_post = post.local_ids();
        info!(
            "Connecting {} -> {} all-to-all ({} local targets)",
            pre.label(),
            post.label(),
            local_post.len()
        );
        rng::prepare(&mut projection.rng);

        for source in pre.ids() {
            let mut targets: Vec<NeuronId> = local_post.clone();
            if !self.allow_self_connections {
                remove_first(&mut targets, source);
            }
            let rng = rng::draw_rng(&mut projection.rng);
            let (weights, delays) = draw_values(&self.weights, &self.delays, targets.len(), rng)?;
            emit_divergent(projection, backend, options, source, &targets, weights, &delays)?;
        }

        Ok(projection.len())
    }
}
