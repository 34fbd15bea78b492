//! Distances between neurons, with optional periodic boundaries

use log::info;

use crate::{
    error::{ConnectError, Result},
    population::Population,
};

const ALL_AXES: [usize; 3] = [0, 1, 2];

/// Periodic boundary setting
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PeriodicBoundaries {
    /// Plain Euclidean distance
    #[default]
    None,
    /// Wrap using the postsynaptic population's extent
    Population,
    /// Wrap using an explicit extent per axis; `0` disables an axis
    Explicit([f64; 3]),
}

impl PeriodicBoundaries {
    /// Extent per axis used for wrapping, if any
    pub fn resolve(&self, post: &Population) -> Option<[f64; 3]> {
        let extent = match *self {
            Self::None => return None,
            Self::Population => post.extent(),
            Self::Explicit(extent) => extent,
        };
        info!("Periodic boundaries activated and set to size {:?}", extent);
        Some(extent)
    }
}

/// How the distance between two neurons is measured
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMetric {
    /// Axes taken into account (default: all three)
    pub mask: Option<Vec<usize>>,
    /// Multiplier applied to the Euclidean distance
    pub scale_factor: f64,
    /// Added after scaling
    pub offset: f64,
    /// Periodic boundary conditions
    pub periodic_boundaries: PeriodicBoundaries,
}

impl Default for DistanceMetric {
    fn default() -> Self {
        Self {
            mask: None,
            scale_factor: 1.0,
            offset: 0.0,
            periodic_boundaries: PeriodicBoundaries::None,
        }
    }
}

impl DistanceMetric {
    /// Check the metric parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(axis) = self.mask.iter().flatten().find(|&&axis| axis >= 3) {
            return Err(ConnectError::invalid_parameter("mask", axis.to_string(), "axis < 3"));
        }
        if let PeriodicBoundaries::Explicit(extent) = self.periodic_boundaries {
            if extent.iter().any(|&l| l < 0.0 || !l.is_finite()) {
                return Err(ConnectError::invalid_parameter(
                    "periodic_boundaries",
                    format!("{:?}", extent),
                    "non-negative finite extents",
                ));
            }
        }
        Ok(())
    }

    /// Distance between two positions
    pub fn distance(&self, a: [f64; 3], b: [f64; 3], boundaries: Option<[f64; 3]>) -> f64 {
        let mut sum = 0.0;
        for &axis in self.mask.as_deref().unwrap_or(&ALL_AXES) {
            let mut diff = (a[axis] - b[axis]).abs();
            if let Some(extent) = boundaries {
                let l = extent[axis];
                if l > 0.0 {
                    diff = diff.min(l - diff);
                }
            }
            sum += diff * diff;
        }
        self.scale_factor * sum.sqrt() + self.offset
    }

    /// Distances from `origin` to every neuron of `post`, in flattened order
    pub fn distances_from(
        &self,
        origin: [f64; 3],
        post: &Population,
        boundaries: Option<[f64; 3]>,
    ) -> Vec<f64> {
        #[cfg(feature = "parallel")]
        let distances: Vec<f64> = {
            use rayon::prelude::*;
            post.positions()
                .par_iter()
                .map(|&p| self.distance(origin, p, boundaries))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let distances: Vec<f64> = post
            .positions()
            .iter()
            .map(|&p| self.distance(origin, p, boundaries))
            .collect();

        distances
    }
}
