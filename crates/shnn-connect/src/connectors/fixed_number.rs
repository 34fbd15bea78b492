//! Fixed fan-out and fan-in connectors
//!
//! Partners are sampled without replacement from the whole opposite
//! population by shuffling the candidate pool and keeping its head. When the
//! requested count exceeds the pool, every candidate is used.

use log::info;
use rand::seq::SliceRandom;

use super::{
    default_delays, default_weights, draw_values, emit_convergent, emit_divergent,
    synapse_value_builders, ConnectOptions, Connector,
};
use crate::{
    backend::ConnectionBackend,
    error::Result,
    projection::Projection,
    rng,
    values::CountSpec,
    NeuronId, ValueGenerator,
};

/// Candidate pool for `neuron`, minus the neuron itself when excluded
fn candidates(all: &[NeuronId], neuron: NeuronId, exclude_self: bool) -> Vec<NeuronId> {
    if exclude_self {
        all.iter().copied().filter(|&other| other != neuron).collect()
    } else {
        all.to_vec()
    }
}

/// Connect each presynaptic neuron to `n` randomly chosen postsynaptic ones
#[derive(Debug, Clone, PartialEq)]
pub struct FixedNumberPostConnector {
    n: CountSpec,
    /// Keep `pre == post` pairs on a recurrent projection
    pub allow_self_connections: bool,
    /// Weight generator
    pub weights: ValueGenerator,
    /// Delay generator
    pub delays: ValueGenerator,
}

impl FixedNumberPostConnector {
    /// Create the connector; a fixed `n` must be positive
    pub fn new(n: impl Into<CountSpec>, allow_self_connections: bool) -> Result<Self> {
        let n = n.into();
        n.validate()?;
        Ok(Self {
            n,
            allow_self_connections,
            weights: default_weights(),
            delays: default_delays(),
        })
    }

    /// Targets per source
    pub fn n(&self) -> CountSpec {
        self.n
    }
}

synapse_value_builders!(FixedNumberPostConnector);

impl Connector for FixedNumberPostConnector {
    fn name(&self) -> &'static str {
        "FixedNumberPostConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize> {
        let (pre, post) = (projection.pre, projection.post);
        info!(
            "Connecting {} -> {} with {:?} targets per source",
            pre.label(),
            post.label(),
            self.n
        );

        let post_ids: Vec<NeuronId> = post.ids().collect();
        let exclude_self = !self.allow_self_connections && projection.is_recurrent();
        rng::prepare(&mut projection.rng);

        for source in pre.ids() {
            let rng = rng::draw_rng(&mut projection.rng);
            let n = self.n.sample(rng)?;
            let mut targets = candidates(&post_ids, source, exclude_self);
            targets.shuffle(rng);
            targets.truncate(n);

            let (weights, delays) = draw_values(&self.weights, &self.delays, targets.len(), rng)?;
            emit_divergent(projection, backend, options, source, &targets, weights, &delays)?;
        }

        Ok(projection.len())
    }
}

/// Connect each postsynaptic neuron from `n` randomly chosen presynaptic ones
#[derive(Debug, Clone, PartialEq)]
pub struct FixedNumberPreConnector {
    n: CountSpec,
    /// Keep `pre == post` pairs on a recurrent projection
    pub allow_self_connections: bool,
    /// Weight generator
    pub weights: ValueGenerator,
    /// Delay generator
    pub delays: ValueGenerator,
}

impl FixedNumberPreConnector {
    /// Create the connector; a fixed `n` must be positive
    pub fn new(n: impl Into<CountSpec>, allow_self_connections: bool) -> Result<Self> {
        let n = n.into();
        n.validate()?;
        Ok(Self {
            n,
            allow_self_connections,
            weights: default_weights(),
            delays: default_delays(),
        })
    }

    /// Sources per target
    pub fn n(&self) -> CountSpec {
        self.n
    }
}

synapse_value_builders!(FixedNumberPreConnector);

impl Connector for FixedNumberPreConnector {
    fn name(&self) -> &'static str {
        "FixedNumberPreConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize> {
        let (pre, post) = (projection.pre, projection.post);
        info!(
            "Connecting {} -> {} with {:?} sources per target",
            pre.label(),
            post.label(),
            self.n
        );

        let pre_ids: Vec<NeuronId> = pre.ids().collect();
        let exclude_self = !self.allow_self_connections && projection.is_recurrent();
        rng::prepare(&mut projection.rng);

        for target in post.ids() {
            let rng = rng::draw_rng(&mut projection.rng);
            let n = self.n.sample(rng)?;
            let mut sources = candidates(&pre_ids, target, exclude_self);
            sources.shuffle(rng);
            sources.truncate(n);

            let (weights, delays) = draw_values(&self.weights, &self.delays, sources.len(), rng)?;
            emit_convergent(projection, backend, options, &sources, target, weights, &delays)?;
        }

        Ok(projection.len())
    }
}
