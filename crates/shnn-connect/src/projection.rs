//! Projections: the connectivity realized between two populations

use crate::{
    population::Population,
    rng::RandomSource,
    weights::SynapseType,
    NeuronId, DEFAULT_SYNAPSE_MODEL,
};

/// Index-aligned source/target sequences
///
/// Position `i` of `sources` pairs with position `i` of `targets`. Pairs can
/// only be appended, so the two sequences never drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionList {
    sources: Vec<NeuronId>,
    targets: Vec<NeuronId>,
}

impl ConnectionList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single pair
    pub fn push(&mut self, source: NeuronId, target: NeuronId) {
        self.sources.push(source);
        self.targets.push(target);
    }

    /// Append one source fanning out to many targets
    pub fn push_divergent(&mut self, source: NeuronId, targets: &[NeuronId]) {
        self.sources.extend(std::iter::repeat(source).take(targets.len()));
        self.targets.extend_from_slice(targets);
    }

    /// Append many sources converging on one target
    pub fn push_convergent(&mut self, sources: &[NeuronId], target: NeuronId) {
        self.sources.extend_from_slice(sources);
        self.targets.extend(std::iter::repeat(target).take(sources.len()));
    }

    /// Append aligned pairs
    pub fn extend_pairs(&mut self, sources: &[NeuronId], targets: &[NeuronId]) {
        debug_assert_eq!(sources.len(), targets.len());
        for (&source, &target) in sources.iter().zip(targets) {
            self.push(source, target);
        }
    }

    /// Realized source identifiers
    pub fn sources(&self) -> &[NeuronId] {
        &self.sources
    }

    /// Realized target identifiers
    pub fn targets(&self) -> &[NeuronId] {
        &self.targets
    }

    /// Number of realized pairs
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no pair has been realized
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate over `(source, target)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (NeuronId, NeuronId)> + '_ {
        self.sources.iter().copied().zip(self.targets.iter().copied())
    }
}

/// Connectivity between a presynaptic and a postsynaptic population
///
/// Created empty by the caller and populated by one connector invocation.
#[derive(Debug)]
pub struct Projection<'a> {
    pub(crate) pre: &'a Population,
    pub(crate) post: &'a Population,
    pub(crate) synapse_type: SynapseType,
    pub(crate) synapse_model: String,
    pub(crate) rng: Option<RandomSource>,
    pub(crate) connections: ConnectionList,
}

impl<'a> Projection<'a> {
    /// Create an empty projection
    pub fn new(pre: &'a Population, post: &'a Population, synapse_type: SynapseType) -> Self {
        Self {
            pre,
            post,
            synapse_type,
            synapse_model: DEFAULT_SYNAPSE_MODEL.to_string(),
            rng: None,
            connections: ConnectionList::new(),
        }
    }

    /// Use `rng` for every random decision of the connector
    pub fn with_rng(mut self, rng: RandomSource) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Set the synapse model tag used for backend queries
    pub fn with_synapse_model(mut self, model: impl Into<String>) -> Self {
        self.synapse_model = model.into();
        self
    }

    /// Presynaptic population
    pub fn pre(&self) -> &'a Population {
        self.pre
    }

    /// Postsynaptic population
    pub fn post(&self) -> &'a Population {
        self.post
    }

    /// Synapse polarity
    pub fn synapse_type(&self) -> SynapseType {
        self.synapse_type
    }

    /// Synapse model tag
    pub fn synapse_model(&self) -> &str {
        &self.synapse_model
    }

    /// Configured random source, if any
    pub fn rng(&self) -> Option<&RandomSource> {
        self.rng.as_ref()
    }

    /// Whether pre and post are the very same population object
    pub fn is_recurrent(&self) -> bool {
        std::ptr::eq(self.pre, self.post)
    }

    /// Realized connections
    pub fn connections(&self) -> &ConnectionList {
        &self.connections
    }

    /// Realized source identifiers
    pub fn sources(&self) -> &[NeuronId] {
        self.connections.sources()
    }

    /// Realized target identifiers
    pub fn targets(&self) -> &[NeuronId] {
        self.connections.targets()
    }

    /// Number of realized pairs
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no pair has been realized
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_stay_aligned() {
        let mut list = ConnectionList::new();
        list.push_divergent(NeuronId::new(0), &[NeuronId::new(1), NeuronId::new(2)]);
        list.push_convergent(&[NeuronId::new(3), NeuronId::new(4)], NeuronId::new(5));
        list.push(NeuronId::new(6), NeuronId::new(7));

        assert_eq!(list.len(), 5);
        assert_eq!(list.sources().len(), list.targets().len());

        let pairs: Vec<(u32, u32)> = list.pairs().map(|(s, t)| (s.raw(), t.raw())).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (3, 5), (4, 5), (6, 7)]);
    }

    #[test]
    fn test_recurrent_is_identity() {
        let a = Population::new("a", 0, &[3]).unwrap();
        let b = a.clone();

        assert!(Projection::new(&a, &a, SynapseType::Excitatory).is_recurrent());
        assert!(!Projection::new(&a, &b, SynapseType::Excitatory).is_recurrent());
    }

    #[test]
    fn test_defaults() {
        let a = Population::new("a", 0, &[3]).unwrap();
        let projection = Projection::new(&a, &a, SynapseType::Inhibitory);
        assert!(projection.is_empty());
        assert!(projection.rng().is_none());
        assert_eq!(projection.synapse_model(), DEFAULT_SYNAPSE_MODEL);
    }
}
