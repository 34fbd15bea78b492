//! Connection files and TOML configs on disk

use std::fs;

use shnn_connect::{
    write_connection_file, ConnectError, ConnectOptions, ConnectionConfig, Connector,
    FromFileConnector, FromListConnector, ListConnection, MemoryBackend, NeuronId, Population,
    Projection, SynapseType,
};
use tempfile::TempDir;

fn synapses(connector: &dyn Connector, pre: &Population, post: &Population) -> Vec<(u32, u32, f64, f64)> {
    let mut projection = Projection::new(pre, post, SynapseType::Excitatory);
    let mut backend = MemoryBackend::new();
    connector
        .connect(&mut projection, &mut backend, &ConnectOptions::default())
        .unwrap();
    backend
        .synapses()
        .map(|(s, t, w, d)| (s.raw(), t.raw(), w, d))
        .collect()
}

#[test]
fn file_matches_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conn.txt");
    fs::write(&path, "[0]\t[1]\t0.5\t1.0\n").unwrap();

    let pre = Population::new("pre", 0, &[3]).unwrap();
    let post = Population::new("post", 3, &[3]).unwrap();

    let from_file = synapses(&FromFileConnector::new(&path), &pre, &post);
    let from_list = synapses(
        &FromListConnector::new(vec![ListConnection::new(&[0], &[1], 0.5, 1.0)]),
        &pre,
        &post,
    );

    assert_eq!(from_file, vec![(0, 4, 500.0, 1.0)]);
    assert_eq!(from_file, from_list);
}

#[test]
fn written_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.conn");
    let entries = vec![
        ListConnection::new(&[0, 1], &[1, 0], 0.25, 0.5),
        ListConnection::new(&[1, 1], &[0, 0], 1.0, 2.0),
    ];
    write_connection_file(&path, &entries).unwrap();

    let pre = Population::new("pre", 0, &[2, 2]).unwrap();
    let post = Population::new("post", 4, &[2, 2]).unwrap();
    let realized = synapses(&FromFileConnector::new(&path), &pre, &post);

    assert_eq!(realized, vec![(1, 6, 250.0, 0.5), (3, 4, 1000.0, 2.0)]);
}

#[test]
fn malformed_line_reports_line_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "# comment\n[0]\t[1]\t0.5\t1.0\n[1]\t[2]\t0.5\n").unwrap();

    let pop = Population::new("pop", 0, &[3]).unwrap();
    let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);
    let mut backend = MemoryBackend::new();

    let err = FromFileConnector::new(&path)
        .connect(&mut projection, &mut backend, &ConnectOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConnectError::Parse { line: 3, .. }));
    assert!(projection.is_empty());
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let pop = Population::new("pop", 0, &[3]).unwrap();
    let mut projection = Projection::new(&pop, &pop, SynapseType::Excitatory);

    let err = FromFileConnector::new(dir.path().join("absent.txt"))
        .connect(&mut projection, &mut MemoryBackend::new(), &ConnectOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConnectError::Io(_)));
}

#[test]
fn config_file_drives_a_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projection.toml");
    fs::write(
        &path,
        r#"
check_connections = true
seed = 17
synapse_type = "inhibitory"

[connector]
rule = "fixed_number_post"
n = 2
allow_self_connections = false
weights = { low = 0.1, high = 0.2 }
"#,
    )
    .unwrap();

    let config = ConnectionConfig::load_from_file(&path).unwrap();
    let pop = Population::new("pop", 0, &[6]).unwrap();
    let mut projection = config.projection(&pop, &pop);
    let mut backend = MemoryBackend::new();

    let count = config
        .build_connector()
        .unwrap()
        .connect(&mut projection, &mut backend, &config.options())
        .unwrap();

    assert_eq!(count, 12);
    assert!(backend.synapses().all(|(s, t, w, _)| s != t && w < 0.0));
    assert_eq!(backend.targets_of(NeuronId::new(5)).len(), 2);
}

#[test]
fn config_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("list.toml");
    let config = ConnectionConfig::from_toml_str(
        r#"
[connector]
rule = "from_list"

[[connector.connections]]
source = [0]
target = [2]
weight = 0.5
delay = 1.0
"#,
    )
    .unwrap();

    config.save_to_file(&path).unwrap();
    let reloaded = ConnectionConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn missing_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = ConnectionConfig::load_from_file(&dir.path().join("none.toml")).unwrap_err();
    assert!(matches!(err, ConnectError::Config(_)));
}
