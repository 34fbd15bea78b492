//! Simulator-facing connect primitives
//!
//! Connectors never mutate simulator state themselves. They hand parallel
//! arrays of sources, targets, weights and delays to a [`ConnectionBackend`].

use std::collections::BTreeMap;

use crate::{
    error::{ConnectError, Result},
    NeuronId, DEFAULT_SYNAPSE_MODEL,
};

/// Outgoing connections of one source neuron as recorded by a backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionRecord {
    /// Targets in the order they were connected
    pub targets: Vec<NeuronId>,
    /// Weights aligned with `targets`
    pub weights: Vec<f64>,
    /// Delays aligned with `targets`
    pub delays: Vec<f64>,
}

impl ConnectionRecord {
    fn append(&mut self, target: NeuronId, weight: f64, delay: f64) {
        self.targets.push(target);
        self.weights.push(weight);
        self.delays.push(delay);
    }
}

/// Bulk connection interface of the host simulator
pub trait ConnectionBackend {
    /// Connect one source to many targets
    fn divergent_connect(
        &mut self,
        source: NeuronId,
        targets: &[NeuronId],
        weights: &[f64],
        delays: &[f64],
    ) -> Result<()>;

    /// Connect many sources to one target
    fn convergent_connect(
        &mut self,
        sources: &[NeuronId],
        target: NeuronId,
        weights: &[f64],
        delays: &[f64],
    ) -> Result<()> {
        check_aligned(sources.len(), weights.len(), delays.len())?;
        for ((&source, &weight), &delay) in sources.iter().zip(weights).zip(delays) {
            self.divergent_connect(source, &[target], &[weight], &[delay])?;
        }
        Ok(())
    }

    /// Connect aligned pairs
    fn connect(
        &mut self,
        sources: &[NeuronId],
        targets: &[NeuronId],
        weights: &[f64],
        delays: &[f64],
    ) -> Result<()> {
        check_aligned(sources.len(), targets.len(), weights.len())?;
        check_aligned(sources.len(), delays.len(), delays.len())?;
        for (i, &source) in sources.iter().enumerate() {
            self.divergent_connect(source, &targets[i..=i], &weights[i..=i], &delays[i..=i])?;
        }
        Ok(())
    }

    /// Current connection record of `source` for `synapse_model`
    fn get_connections(&self, source: NeuronId, synapse_model: &str) -> Option<ConnectionRecord>;
}

fn check_aligned(a: usize, b: usize, c: usize) -> Result<()> {
    if a == b && b == c {
        Ok(())
    } else {
        Err(ConnectError::backend(format!(
            "misaligned connection arrays ({}, {}, {})",
            a, b, c
        )))
    }
}

/// In-memory backend recording every connection per source neuron
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    model: String,
    records: BTreeMap<NeuronId, ConnectionRecord>,
}

impl MemoryBackend {
    /// Create an empty backend using the default synapse model
    pub fn new() -> Self {
        Self::with_model(DEFAULT_SYNAPSE_MODEL)
    }

    /// Create an empty backend recording under `model`
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            records: BTreeMap::new(),
        }
    }

    /// Synapse model connections are recorded under
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Total number of synapses created
    pub fn synapse_count(&self) -> usize {
        self.records.values().map(|r| r.targets.len()).sum()
    }

    /// Record of `source`, if any connect call touched it
    pub fn record(&self, source: NeuronId) -> Option<&ConnectionRecord> {
        self.records.get(&source)
    }

    /// Targets of `source`
    pub fn targets_of(&self, source: NeuronId) -> Vec<NeuronId> {
        self.record(source).map(|r| r.targets.clone()).unwrap_or_default()
    }

    /// Weights of the synapses leaving `source`
    pub fn weights_of(&self, source: NeuronId) -> Vec<f64> {
        self.record(source).map(|r| r.weights.clone()).unwrap_or_default()
    }

    /// Delays of the synapses leaving `source`
    pub fn delays_of(&self, source: NeuronId) -> Vec<f64> {
        self.record(source).map(|r| r.delays.clone()).unwrap_or_default()
    }

    /// Iterate `(source, target, weight, delay)` over every synapse
    pub fn synapses(&self) -> impl Iterator<Item = (NeuronId, NeuronId, f64, f64)> + '_ {
        self.records.iter().flat_map(|(&source, record)| {
            record
                .targets
                .iter()
                .zip(&record.weights)
                .zip(&record.delays)
                .map(move |((&target, &weight), &delay)| (source, target, weight, delay))
        })
    }

    /// Remove every recorded connection
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionBackend for MemoryBackend {
    fn divergent_connect(
        &mut self,
        source: NeuronId,
        targets: &[NeuronId],
        weights: &[f64],
        delays: &[f64],
    ) -> Result<()> {
        check_aligned(targets.len(), weights.len(), delays.len())?;
        if let Some(delay) = delays.iter().find(|&&d| d < 0.0) {
            return Err(ConnectError::invalid_parameter("delay", delay.to_string(), ">= 0.0"));
        }

        let record = self.records.entry(source).or_default();
        for ((&target, &weight), &delay) in targets.iter().zip(weights).zip(delays) {
            record.append(target, weight, delay);
        }
        Ok(())
    }

    fn get_connections(&self, source: NeuronId, synapse_model: &str) -> Option<ConnectionRecord> {
        if synapse_model != self.model {
            return None;
        }
        self.records.get(&source).cloned()
    }
}
