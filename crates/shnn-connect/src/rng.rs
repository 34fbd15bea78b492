//! Random sources for connectors
//!
//! Connectors draw from a host generator. A projection may instead name the
//! simulator's native generator, which cannot be driven from here; such a
//! source falls back to a host generator and logs a warning.

use log::warn;
use rand::{rngs::StdRng, SeedableRng};

/// Simulator-provided generator handle
#[derive(Debug, Clone)]
pub struct NativeRng {
    seed: Option<u64>,
    fallback: StdRng,
}

impl NativeRng {
    /// Create a handle for the simulator generator seeded with `seed`
    pub fn new(seed: Option<u64>) -> Self {
        let fallback = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { seed, fallback }
    }

    /// Seed handed to the simulator generator
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Random number source attached to a projection
#[derive(Debug, Clone)]
pub enum RandomSource {
    /// Generator owned by this crate
    Host(StdRng),
    /// Generator owned by the simulator
    Native(NativeRng),
}

impl RandomSource {
    /// Host generator with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::Host(StdRng::seed_from_u64(seed))
    }

    /// Host generator seeded from system entropy
    pub fn from_entropy() -> Self {
        Self::Host(StdRng::from_entropy())
    }

    /// Simulator generator
    pub fn native(seed: Option<u64>) -> Self {
        Self::Native(NativeRng::new(seed))
    }

    /// Whether this source names the simulator generator
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// Generator connectors actually draw from
    pub fn host_rng(&mut self) -> &mut StdRng {
        match self {
            Self::Host(rng) => rng,
            Self::Native(native) => &mut native.fallback,
        }
    }
}

/// Make sure a projection has a usable generator before a connector runs.
///
/// An empty slot gets an entropy-seeded host generator. A native source is
/// kept but announced, since draws will come from its host fallback.
pub(crate) fn prepare(slot: &mut Option<RandomSource>) {
    match slot {
        None => *slot = Some(RandomSource::from_entropy()),
        Some(RandomSource::Native(_)) => {
            warn!("use of native RNG not implemented, using host RNG");
        }
        Some(RandomSource::Host(_)) => {}
    }
}

/// Generator to draw from, for a slot already passed through [`prepare`]
pub(crate) fn draw_rng(slot: &mut Option<RandomSource>) -> &mut StdRng {
    slot.get_or_insert_with(RandomSource::from_entropy).host_rng()
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomSource::seeded(7);
        let mut b = RandomSource::seeded(7);
        let xs: Vec<f64> = (0..5).map(|_| a.host_rng().gen()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.host_rng().gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_prepare_fills_empty_slot() {
        let mut slot = None;
        prepare(&mut slot);
        assert!(matches!(slot, Some(RandomSource::Host(_))));

        let mut slot = Some(RandomSource::native(None));
        prepare(&mut slot);
        assert!(slot.as_ref().map_or(false, RandomSource::is_native));
    }

    #[test]
    fn test_native_falls_back_to_seeded_host() {
        let mut native = RandomSource::native(Some(7));
        let mut host = RandomSource::seeded(7);
        assert!(native.is_native());

        let x: f64 = native.host_rng().gen();
        let y: f64 = host.host_rng().gen();
        assert_eq!(x, y);
    }
}
