use log::info;
use rand::Rng;

use super::{
    default_delays, default_weights, draw_values, emit_divergent, remove_first,
    synapse_value_builders, ConnectOptions, Connector,
};
use crate::{
    backend::ConnectionBackend,
    error::{ConnectError, Result},
    projection::Projection,
    rng, NeuronId, ValueGenerator,
};

/// Connect each pair independently with a fixed probability.
///
/// One uniform draw is made per (source, local target) pair, in target order,
/// and the pair is kept when the draw falls below `p_connect`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedProbabilityConnector {
    p_connect: f64,
    /// Keep `pre == post` pairs when the populations overlap
    pub allow_self_connections: bool,
    /// Weight generator
    pub weights: ValueGenerator,
    /// Delay generator
    pub delays: ValueGenerator,
}

impl FixedProbabilityConnector {
    /// Create the connector; `p_connect` must lie in `[0, 1]`
    pub fn new(p_connect: f64, allow_self_connections: bool) -> Result<Self> {
        if !(0.0..=1.0).contains(&p_connect) {
            return Err(ConnectError::invalid_parameter(
                "p_connect",
                p_connect.to_string(),
                "0 <= p <= 1",
            ));
        }
        Ok(Self {
            p_connect,
            allow_self_connections,
            weights: default_weights(),
            delays: default_delays(),
        })
    }

    /// Connection probability
    pub fn p_connect(&self) -> f64 {
        self.p_connect
    }
}

synapse_value_builders!(FixedProbabilityConnector);

impl Connector for FixedProbabilityConnector {
    fn name(&self) -> &'static str {
        "FixedProbabilityConnector"
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
            "Connecting {} -> {} with probability {}",
            pre.label(),
            post.label(),
            self.p_connect
        );
        rng::prepare(&mut projection.rng);

        for source in pre.ids() {
            let rng = rng::draw_rng(&mut projection.rng);
            let draws: Vec<f64> = (0..local_post.len()).map(|_| rng.gen::<f64>()).collect();
            let mut targets: Vec<NeuronId> = local_post
                .iter()
                .zip(&draws)
                .filter(|&(_, &r)| r < self.p_connect)
                .map(|(&target, _)| target)
                .collect();
            if !self.allow_self_connections {
                remove_first(&mut targets, source);
            }

            let (weights, delays) = draw_values(&self.weights, &self.delays, targets.len(), rng)?;
            emit_divergent(projection, backend, options, source, &targets, weights, &delays)?;
        }

        Ok(projection.len())
    }
}
