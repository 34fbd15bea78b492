//! Explicit connection lists, in memory or in a tab-separated file
//!
//! A connection file holds one connection per line:
//!
//! ```text
//! [0, 3]	[1, 0]	0.5	1.0
//! ```
//!
//! with tab-separated source coordinate, target coordinate, weight and delay.
//!
//! The reader is lenient where a strict four-field reader would fail: blank
//! lines and lines starting with `#` are skipped instead of being reported as
//! malformed, and any text before the first `[` of a coordinate field is
//! ignored. Every other line must hold exactly four fields.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use super::{emit_pairs, ConnectOptions, Connector};
use crate::{
    backend::ConnectionBackend,
    error::{ConnectError, Result},
    population::Coordinate,
    projection::Projection,
    weights::convert_scalar,
    NeuronId,
};

/// One explicit connection between grid coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConnection {
    /// Coordinate in the presynaptic population
    pub source: Coordinate,
    /// Coordinate in the postsynaptic population
    pub target: Coordinate,
    /// Weight in biological units
    pub weight: f64,
    /// Delay in milliseconds
    pub delay: f64,
}

impl ListConnection {
    /// Create a connection entry
    pub fn new(source: &[usize], target: &[usize], weight: f64, delay: f64) -> Self {
        Self {
            source: Coordinate::from_slice(source),
            target: Coordinate::from_slice(target),
            weight,
            delay,
        }
    }
}

/// Connect exactly the listed pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromListConnector {
    connections: Vec<ListConnection>,
}

impl FromListConnector {
    /// Create the connector from explicit entries
    pub fn new(connections: Vec<ListConnection>) -> Self {
        Self { connections }
    }

    /// Listed entries
    pub fn connections(&self) -> &[ListConnection] {
        &self.connections
    }
}

impl Connector for FromListConnector {
    fn name(&self) -> &'static str {
        "FromListConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        _options: &ConnectOptions,
    ) -> Result<usize> {
        connect_list(&self.connections, projection, backend)
    }
}

/// Connect the pairs listed in a connection file
#[derive(Debug, Clone, PartialEq)]
pub struct FromFileConnector {
    path: PathBuf,
}

impl FromFileConnector {
    /// Create the connector for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Connection file location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Connector for FromFileConnector {
    fn name(&self) -> &'static str {
        "FromFileConnector"
    }

    fn connect(
        &self,
        projection: &mut Projection<'_>,
        backend: &mut dyn ConnectionBackend,
        _options: &ConnectOptions,
    ) -> Result<usize> {
        info!("Reading connections from {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        let connections = parse_connection_file(&content)?;
        connect_list(&connections, projection, backend)
    }
}

/// Resolve, convert and emit every entry as one aligned batch
fn connect_list(
    connections: &[ListConnection],
    projection: &mut Projection<'_>,
    backend: &mut dyn ConnectionBackend,
) -> Result<usize> {
    let (pre, post) = (projection.pre, projection.post);
    let mut sources: Vec<NeuronId> = Vec::with_capacity(connections.len());
    let mut targets: Vec<NeuronId> = Vec::with_capacity(connections.len());
    let mut weights = Vec::with_capacity(connections.len());
    let mut delays = Vec::with_capacity(connections.len());

    for connection in connections {
        sources.push(pre.id_at(&connection.source)?);
        targets.push(post.id_at(&connection.target)?);
        weights.push(convert_scalar(connection.weight, projection.synapse_type)?);
        delays.push(connection.delay);
    }

    info!(
        "Connecting {} -> {} from {} listed pairs",
        pre.label(),
        post.label(),
        sources.len()
    );
    emit_pairs(projection, backend, &sources, &targets, &weights, &delays)?;
    Ok(sources.len())
}

/// Parse the content of a connection file
pub fn parse_connection_file(content: &str) -> Result<Vec<ListConnection>> {
    let mut connections = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        connections.push(parse_line(line, index + 1)?);
    }
    Ok(connections)
}

fn parse_line(line: &str, line_no: usize) -> Result<ListConnection> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 4 {
        return Err(ConnectError::parse(
            line_no,
            format!("expected 4 tab-separated fields, found {}", fields.len()),
        ));
    }

    let source = parse_coordinate(fields[0], line_no)?;
    let target = parse_coordinate(fields[1], line_no)?;
    let weight = parse_number(fields[2], "weight", line_no)?;
    let delay = parse_number(fields[3], "delay", line_no)?;

    Ok(ListConnection {
        source,
        target,
        weight,
        delay,
    })
}

fn parse_coordinate(field: &str, line_no: usize) -> Result<Coordinate> {
    let start = field
        .find('[')
        .ok_or_else(|| ConnectError::parse(line_no, format!("missing '[' in {:?}", field)))?;
    let inner = field[start + 1..]
        .trim_end()
        .strip_suffix(']')
        .ok_or_else(|| ConnectError::parse(line_no, format!("missing ']' in {:?}", field)))?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let mut coordinate = Coordinate::new();
    for (i, part) in parts.iter().enumerate() {
        // trailing comma, as in "[0,]"
        if part.is_empty() && i + 1 == parts.len() && i > 0 {
            continue;
        }
        let value = part.parse::<usize>().map_err(|_| {
            ConnectError::parse(line_no, format!("invalid coordinate component {:?}", part))
        })?;
        coordinate.push(value);
    }
    Ok(coordinate)
}

fn parse_number(field: &str, what: &str, line_no: usize) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| ConnectError::parse(line_no, format!("invalid {} {:?}", what, field.trim())))
}

fn format_coordinate(coordinate: &[usize]) -> String {
    let parts: Vec<String> = coordinate.iter().map(usize::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Write `connections` in the connection file format
pub fn write_connection_file(path: impl AsRef<Path>, connections: &[ListConnection]) -> Result<()> {
    let mut content = String::new();
    for connection in connections {
        content.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            format_coordinate(&connection.source),
            format_coordinate(&connection.target),
            connection.weight,
            connection.delay
        ));
    }
    fs::write(path, content)?;
    Ok(())
}
