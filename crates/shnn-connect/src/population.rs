//! Neuron populations as seen by connectors
//!
//! A population is a grid of neurons with contiguous identifiers. Each neuron
//! carries a 3-D position (the grid coordinate by default) and a locality
//! flag telling whether it lives on the invoking process.

use smallvec::SmallVec;

use crate::{
    error::{ConnectError, Result},
    NeuronId,
};

/// Grid coordinate addressing one neuron of a population
pub type Coordinate = SmallVec<[usize; 3]>;

/// An ordered, multi-dimensional collection of neurons
#[derive(Debug, Clone)]
pub struct Population {
    label: String,
    first_id: u32,
    shape: Vec<usize>,
    positions: Vec<[f64; 3]>,
    local: Vec<bool>,
}

impl Population {
    /// Create a population of `shape` neurons numbered from `first_id`.
    ///
    /// Positions default to the grid coordinates (unit spacing, row-major),
    /// padded with zeros up to three axes. Every neuron is local. Fails when
    /// the identifier range would run past `u32::MAX`.
    pub fn new(label: impl Into<String>, first_id: u32, shape: &[usize]) -> Result<Self> {
        let size: usize = shape.iter().product();
        if first_id as u64 + size as u64 > u32::MAX as u64 + 1 {
            return Err(ConnectError::invalid_parameter(
                "first_id",
                format!("{} + {} neurons", first_id, size),
                "identifiers within u32",
            ));
        }
        let positions = (0..size).map(|index| grid_position(shape, index)).collect();

        Ok(Self {
            label: label.into(),
            first_id,
            shape: shape.to_vec(),
            positions,
            local: vec![true; size],
        })
    }

    /// Replace the neuron positions
    pub fn with_positions(mut self, positions: Vec<[f64; 3]>) -> Result<Self> {
        if positions.len() != self.size() {
            return Err(ConnectError::invalid_parameter(
                "positions",
                positions.len().to_string(),
                format!("one position per neuron ({})", self.size()),
            ));
        }
        self.positions = positions;
        Ok(self)
    }

    /// Replace the locality mask
    pub fn with_local_mask(mut self, local: Vec<bool>) -> Result<Self> {
        if local.len() != self.size() {
            return Err(ConnectError::invalid_parameter(
                "local",
                local.len().to_string(),
                format!("one flag per neuron ({})", self.size()),
            ));
        }
        self.local = local;
        Ok(self)
    }

    /// Mark neurons local according to a predicate on their identifier
    pub fn with_locality<F>(mut self, is_local: F) -> Self
    where
        F: Fn(NeuronId) -> bool,
    {
        self.local = self.ids().map(is_local).collect();
        self
    }

    /// Distribute neurons round-robin over `num_processes`, keeping the
    /// ones owned by `rank`
    pub fn with_round_robin_locality(self, rank: u32, num_processes: u32) -> Result<Self> {
        if num_processes == 0 || rank >= num_processes {
            return Err(ConnectError::invalid_parameter(
                "rank",
                format!("{}/{}", rank, num_processes),
                "rank < num_processes",
            ));
        }
        Ok(self.with_locality(|id| id.raw() % num_processes == rank))
    }

    /// Population label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Grid shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of neurons
    pub fn size(&self) -> usize {
        self.positions.len()
    }

    /// Whether the population holds no neurons
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// All neuron identifiers in flattened order
    pub fn ids(&self) -> impl Iterator<Item = NeuronId> + '_ {
        (0..self.size()).map(move |index| self.id_of_index(index))
    }

    /// Identifiers of the neurons local to this process
    pub fn local_ids(&self) -> Vec<NeuronId> {
        self.ids()
            .zip(&self.local)
            .filter_map(|(id, &local)| local.then_some(id))
            .collect()
    }

    /// Identifier of the neuron at flattened `index`
    pub fn id_of_index(&self, index: usize) -> NeuronId {
        NeuronId::new(self.first_id + index as u32)
    }

    /// Flattened index of `id`, if it belongs to this population
    pub fn index_of(&self, id: NeuronId) -> Option<usize> {
        let index = id.raw().checked_sub(self.first_id)? as usize;
        (index < self.size()).then_some(index)
    }

    /// Whether `id` belongs to this population
    pub fn contains(&self, id: NeuronId) -> bool {
        self.index_of(id).is_some()
    }

    /// Resolve a grid coordinate to a neuron identifier
    pub fn id_at(&self, coordinate: &[usize]) -> Result<NeuronId> {
        let out_of_range = || ConnectError::CoordinateOutOfRange {
            population: self.label.clone(),
            coordinate: coordinate.to_vec(),
            shape: self.shape.clone(),
        };

        if coordinate.len() != self.shape.len() {
            return Err(out_of_range());
        }

        let mut index = 0;
        for (&c, &extent) in coordinate.iter().zip(&self.shape) {
            if c >= extent {
                return Err(out_of_range());
            }
            index = index * extent + c;
        }
        Ok(self.id_of_index(index))
    }

    /// Grid coordinate of the neuron at flattened `index`
    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        let mut coordinate: Coordinate = SmallVec::from_elem(0, self.shape.len());
        let mut rest = index;
        for (axis, &extent) in self.shape.iter().enumerate().rev() {
            coordinate[axis] = rest % extent.max(1);
            rest /= extent.max(1);
        }
        coordinate
    }

    /// Position of the neuron at flattened `index`
    pub fn position(&self, index: usize) -> [f64; 3] {
        self.positions[index]
    }

    /// All neuron positions in flattened order
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Spatial extent: the grid shape padded with zeros to three axes
    pub fn extent(&self) -> [f64; 3] {
        let mut extent = [0.0; 3];
        for (slot, &dim) in extent.iter_mut().zip(&self.shape) {
            *slot = dim as f64;
        }
        extent
    }
}

fn grid_position(shape: &[usize], index: usize) -> [f64; 3] {
    let mut position = [0.0; 3];
    let mut rest = index;
    for (axis, &extent) in shape.iter().enumerate().rev() {
        if axis < 3 {
            position[axis] = (rest % extent.max(1)) as f64;
        }
        rest /= extent.max(1);
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_positions() {
        let pop = Population::new("grid", 10, &[2, 3]).unwrap();
        assert_eq!(pop.size(), 6);
        assert_eq!(pop.position(0), [0.0, 0.0, 0.0]);
        assert_eq!(pop.position(4), [1.0, 1.0, 0.0]);
        assert_eq!(pop.extent(), [2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_coordinate_indexing() {
        let pop = Population::new("grid", 10, &[2, 3]).unwrap();
        assert_eq!(pop.id_at(&[0, 0]).unwrap(), NeuronId::new(10));
        assert_eq!(pop.id_at(&[1, 2]).unwrap(), NeuronId::new(15));
        assert_eq!(pop.coordinate_of(5).as_slice(), &[1, 2]);

        assert!(matches!(
            pop.id_at(&[2, 0]),
            Err(ConnectError::CoordinateOutOfRange { .. })
        ));
        assert!(pop.id_at(&[0]).is_err());
    }

    #[test]
    fn test_index_of() {
        let pop = Population::new("line", 5, &[3]).unwrap();
        assert_eq!(pop.index_of(NeuronId::new(4)), None);
        assert_eq!(pop.index_of(NeuronId::new(6)), Some(1));
        assert_eq!(pop.index_of(NeuronId::new(8)), None);
        assert!(pop.contains(NeuronId::new(7)));
    }

    #[test]
    fn test_round_robin_locality() {
        let pop = Population::new("line", 0, &[6])
            .unwrap()
            .with_round_robin_locality(1, 2)
            .unwrap();
        let local: Vec<u32> = pop.local_ids().iter().map(|id| id.raw()).collect();
        assert_eq!(local, vec![1, 3, 5]);

        assert!(Population::new("line", 0, &[6]).unwrap().with_round_robin_locality(2, 2).is_err());
    }

    #[test]
    fn test_id_range_must_fit() {
        assert!(matches!(
            Population::new("p", u32::MAX, &[2]),
            Err(ConnectError::InvalidParameter { .. })
        ));
        let last = Population::new("p", u32::MAX - 1, &[2]).unwrap();
        assert_eq!(last.ids().last(), Some(NeuronId::new(u32::MAX)));
    }

    #[test]
    fn test_mask_length_checked() {
        let pop = Population::new("line", 0, &[3]).unwrap();
        assert!(pop.clone().with_local_mask(vec![true, false]).is_err());
        assert!(pop.with_positions(vec![[0.0; 3]; 4]).is_err());
    }
}
