use log::info;
use rand::{rngs::StdRng, Rng};

use super::{default_delays, default_weights, emit_divergent, ConnectOptions, Connector};
use crate::{
    backend::ConnectionBackend,
    distance::{DistanceMetric, PeriodicBoundaries},
    error::Result,
    expression::Expression,
    projection::Projection,
    rng, NeuronId, ValueGenerator,
};

/// Weight or delay source for [`DistanceDependentProbabilityConnector`]
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceValue {
    /// Drawn independently of distance
    Generated(ValueGenerator),
    /// Evaluated on the distance of each selected connection
    Expression(Expression),
}

impl DistanceValue {
    /// Values for connections at `distances`
    fn values(&self, distances: &[f64], rng: &mut StdRng) -> Result<Vec<f64>> {
        match self {
            Self::Generated(generator) => generator.sample(distances.len(), rng),
            Self::Expression(expression) => Ok(expression.eval_all(distances)),
        }
    }
}

impl From<f64> for DistanceValue {
    fn from(v: f64) -> Self {
        Self::Generated(ValueGenerator::Constant(v))
    }
}

impl From<ValueGenerator> for DistanceValue {
    fn from(generator: ValueGenerator) -> Self {
        Self::Generated(generator)
    }
}

impl From<Expression> for DistanceValue {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

/// Connect pairs with a probability given by an expression of their distance.
///
/// For each source, one uniform draw is made per postsynaptic neuron.
/// Probabilities of at least one always connect; probabilities in `(0, 1)`
/// connect when the draw is at most the probability, and anything else never
/// connects. Targets span the whole postsynaptic population.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceDependentProbabilityConnector {
    d_expression: Expression,
    /// Keep `pre == post` pairs when the populations overlap
    pub allow_self_connections: bool,
    /// Weight source
    pub weights: DistanceValue,
    /// Delay source
    pub delays: DistanceValue,
    /// Distance measurement
    pub metric: DistanceMetric,
}

impl DistanceDependentProbabilityConnector {
    /// Create the connector from a probability expression in `d`
    pub fn new(d_expression: &str, allow_self_connections: bool) -> Result<Self> {
        Ok(Self {
            d_expression: Expression::parse(d_expression)?,
            allow_self_connections,
            weights: DistanceValue::Generated(default_weights()),
            delays: DistanceValue::Generated(default_delays()),
            metric: DistanceMetric::default(),
        })
    }

    /// Probability expression
    pub fn d_expression(&self) -> &Expression {
        &self.d_expression
    }

    /// Set the weight source
    pub fn with_weights(mut self, weights: impl Into<DistanceValue>) -> Self {
        self.weights = weights.into();
        self
    }

    /// Set the delay source
    pub fn with_delays(mut self, delays: impl Into<DistanceValue>) -> Self {
        self.delays = delays.into();
        self
    }

    /// Set the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the periodic boundaries of the distance metric
    pub fn with_periodic_boundaries(mut self, boundaries: PeriodicBoundaries) -> Self {
        self.metric.periodic_boundaries = boundaries;
        self
    }

    /// Whether a target at probability `p` is kept for the draw `r`
    fn accepts(p: f64, r: f64) -> bool {
        p >= 1.0 || (0.0 < p && p < 1.0 && r <= p)
    }
}

impl Connector for DistanceDependentProbabilityConnector {
    fn name(&self) -> &'static str {
        "DistanceDependentProbabilityConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        options: &ConnectOptions,
    ) -> Result<usize> {
        self.metric.validate()?;
        let (pre, post) = (projection.pre, projection.post);
        info!(
            "Connecting {} -> {} with probability {}",
            pre.label(),
            post.label(),
            self.d_expression
        );

        let boundaries = self.metric.periodic_boundaries.resolve(post);
        let post_ids: Vec<NeuronId> = post.ids().collect();
        rng::prepare(&mut projection.rng);

        for (index, source) in pre.ids().enumerate() {
            let distances = self.metric.distances_from(pre.position(index), post, boundaries);
            let proba = self.d_expression.eval_all(&distances);

            let rng = rng::draw_rng(&mut projection.rng);
            let draws: Vec<f64> = (0..post_ids.len()).map(|_| rng.gen::<f64>()).collect();
            let selected: Vec<usize> = (0..post_ids.len())
                .filter(|&i| Self::accepts(proba[i], draws[i]))
                .filter(|&i| self.allow_self_connections || post_ids[i] != source)
                .collect();

            let targets: Vec<NeuronId> = selected.iter().map(|&i| post_ids[i]).collect();
            let selected_distances: Vec<f64> = selected.iter().map(|&i| distances[i]).collect();
            let weights = self.weights.values(&selected_distances, rng)?;
            let delays = self.delays.values(&selected_distances, rng)?;

            emit_divergent(projection, backend, options, source, &targets, weights, &delays)?;
        }

        Ok(projection.len())
    }
}
