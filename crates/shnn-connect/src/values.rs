//! Weight, delay and fan-count generators

use rand::Rng;
use rand_distr::{Binomial, Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectError, Result};

/// Source of per-connection values such as weights or delays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueGenerator {
    /// Same value for every connection
    Constant(f64),
    /// Uniform on `[low, high)`
    Uniform {
        /// Lower bound
        low: f64,
        /// Upper bound
        high: f64,
    },
    /// Normal distribution
    Normal {
        /// Mean
        mean: f64,
        /// Standard deviation
        std: f64,
    },
}

impl ValueGenerator {
    /// Check the generator parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Constant(_) => Ok(()),
            Self::Uniform { low, high } => {
                if low.is_finite() && high.is_finite() && low <= high {
                    Ok(())
                } else {
                    Err(ConnectError::invalid_parameter(
                        "uniform",
                        format!("[{}, {})", low, high),
                        "finite bounds with low <= high",
                    ))
                }
            }
            Self::Normal { std, .. } => {
                if std >= 0.0 && std.is_finite() {
                    Ok(())
                } else {
                    Err(ConnectError::invalid_parameter("std", std.to_string(), ">= 0.0"))
                }
            }
        }
    }

    /// Draw `n` values
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        self.validate()?;
        let values = match *self {
            Self::Constant(v) => vec![v; n],
            Self::Uniform { low, high } if low == high => vec![low; n],
            Self::Uniform { low, high } => (0..n).map(|_| rng.gen_range(low..high)).collect(),
            Self::Normal { mean, std } => {
                let normal = Normal::new(mean, std)
                    .map_err(|e| ConnectError::invalid_parameter("normal", e.to_string(), "valid distribution"))?;
                (0..n).map(|_| normal.sample(rng)).collect()
            }
        };
        Ok(values)
    }
}

impl From<f64> for ValueGenerator {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

/// Number of partners picked per neuron by the fixed-number connectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountSpec {
    /// Fixed count, must be positive
    Fixed(usize),
    /// Uniform on `[low, high]`, drawn per neuron
    Uniform {
        /// Smallest count
        low: usize,
        /// Largest count
        high: usize,
    },
    /// Poisson with the given mean, drawn per neuron
    Poisson {
        /// Expected count
        mean: f64,
    },
    /// Binomial over `trials` with success probability `p`, drawn per neuron
    Binomial {
        /// Number of trials
        trials: u64,
        /// Success probability
        p: f64,
    },
}

impl CountSpec {
    /// Check the count parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Fixed(0) => Err(ConnectError::invalid_parameter("n", "0", "> 0")),
            Self::Fixed(_) => Ok(()),
            Self::Uniform { low, high } if low > high => Err(ConnectError::invalid_parameter(
                "n",
                format!("[{}, {}]", low, high),
                "low <= high",
            )),
            Self::Uniform { .. } => Ok(()),
            Self::Poisson { mean } if !(mean > 0.0 && mean.is_finite()) => {
                Err(ConnectError::invalid_parameter("mean", mean.to_string(), "finite and > 0.0"))
            }
            Self::Poisson { .. } => Ok(()),
            Self::Binomial { p, .. } if !(0.0..=1.0).contains(&p) => {
                Err(ConnectError::invalid_parameter("p", p.to_string(), "in [0, 1]"))
            }
            Self::Binomial { .. } => Ok(()),
        }
    }

    /// Draw the count for one neuron
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        self.validate()?;
        Ok(match *self {
            Self::Fixed(n) => n,
            Self::Uniform { low, high } => rng.gen_range(low..=high),
            Self::Poisson { mean } => {
                let poisson = Poisson::new(mean)
                    .map_err(|e| ConnectError::invalid_parameter("poisson", e.to_string(), "valid distribution"))?;
                poisson.sample(rng) as usize
            }
            Self::Binomial { trials, p } => {
                let binomial = Binomial::new(trials, p)
                    .map_err(|e| ConnectError::invalid_parameter("binomial", e.to_string(), "valid distribution"))?;
                binomial.sample(rng) as usize
            }
        })
    }
}

impl From<usize> for CountSpec {
    fn from(n: usize) -> Self {
        Self::Fixed(n)
    }
}
