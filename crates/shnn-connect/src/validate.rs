//! Post-hoc check that the backend registered what a connector asked for

use crate::{
    backend::ConnectionBackend,
    error::{ConnectError, Result},
    projection::Projection,
    NeuronId,
};

/// Verify that the last `intended.len()` targets the backend recorded for
/// `source` are exactly `intended`
pub fn verify_connections(
    backend: &dyn ConnectionBackend,
    projection: &Projection<'_>,
    source: NeuronId,
    intended: &[NeuronId],
) -> Result<()> {
    let record = backend
        .get_connections(source, projection.synapse_model())
        .ok_or_else(|| ConnectError::MissingConnectionRecord {
            neuron: source,
            model: projection.synapse_model().to_string(),
        })?;

    let n = intended.len();
    let recorded = &record.targets;
    let actual = &recorded[recorded.len().saturating_sub(n)..];

    if actual != intended {
        return Err(ConnectError::ConnectionMismatch {
            neuron: source,
            expected: intended.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}
