//! Post-hoc verification against backends that misbehave

use shnn_connect::{
    AllToAllConnector, ConnectError, ConnectOptions, ConnectionBackend, ConnectionRecord,
    Connector, FixedNumberPreConnector, MemoryBackend, NeuronId, Population, Projection,
    RandomSource, Result, SynapseType,
};

/// Backend that silently keeps only the first target of every divergent call
#[derive(Default)]
struct DroppingBackend {
    inner: MemoryBackend,
}

impl ConnectionBackend for DroppingBackend {
    fn divergent_connect(
        &mut self,
        source: NeuronId,
        targets: &[NeuronId],
        weights: &[f64],
        delays: &[f64],
    ) -> Result<()> {
        let keep = targets.len().min(1);
        self.inner
            .divergent_connect(source, &targets[..keep], &weights[..keep], &delays[..keep])
    }

    fn get_connections(&self, source: NeuronId, synapse_model: &str) -> Option<ConnectionRecord> {
        self.inner.get_connections(source, synapse_model)
    }
}

/// Backend that forgets everything it was asked to record
#[derive(Default)]
struct AmnesicBackend;

impl ConnectionBackend for AmnesicBackend {
    fn divergent_connect(&mut self, _: NeuronId, _: &[NeuronId], _: &[f64], _: &[f64]) -> Result<()> {
        Ok(())
    }

    fn get_connections(&self, _: NeuronId, _: &str) -> Option<ConnectionRecord> {
        None
    }
}

#[test]
fn dropped_connections_are_detected() {
    let pop = Population::new("pop", 0, &[4]).unwrap();
    let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);
    let mut backend = DroppingBackend::default();

    let err = AllToAllConnector::new(false)
        .connect(&mut projection, &mut backend, &ConnectOptions::default())
        .unwrap_err();

    assert!(matches!(err, ConnectError::ConnectionMismatch { .. }));
    // the failing batch was already appended
    assert_eq!(projection.len(), 3);
}

#[test]
fn unchecked_run_trusts_the_backend() {
    let pop = Population::new("pop", 0, &[4]).unwrap();
    let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);
    let mut backend = DroppingBackend::default();

    let count = AllToAllConnector::new(false)
        .connect(&mut projection, &mut backend, &ConnectOptions::unchecked())
        .unwrap();

    assert_eq!(count, 12);
    assert_eq!(backend.inner.synapse_count(), 4);
}

#[test]
fn missing_record_is_reported() {
    let pop = Population::new("pop", 0, &[3]).unwrap();
    let mut projection =
        Projection::new(&pop, &pop, SynapseType::Excitatory).with_rng(RandomSource::seeded(3));
    let mut backend = AmnesicBackend;

    let err = FixedNumberPreConnector::new(2usize, false)
        .unwrap()
        .connect(&mut projection, &mut backend, &ConnectOptions::default())
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("static_synapse"), "unexpected error: {}", msg);
}

#[test]
fn synapse_model_mismatch_is_reported() {
    let pop = Population::new("pop", 0, &[3]).unwrap();
    let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory)
        .with_synapse_model("stdp_synapse");
    let mut backend = MemoryBackend::new();

    let err = AllToAllConnector::new(true)
        .connect(&mut projection, &mut backend, &ConnectOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConnectError::MissingConnectionRecord { .. }));
}
