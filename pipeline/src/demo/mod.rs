mod data;

pub use data::{demo_advice, demo_advice_for, demo_predictions};

use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Simulated prediction latency in milliseconds.
pub const PREDICTION_DELAY_MS: Range<u64> = 1500..3500;
/// Simulated advice latency in milliseconds.
pub const ADVICE_DELAY_MS: Range<u64> = 1000..2500;

/// Source of the random choices demo mode makes.
pub trait Entropy: Send {
    /// Index in `0..len`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
    fn delay_ms(&mut self, range: Range<u64>) -> u64;
}

pub struct RngEntropy<R>(R);

impl RngEntropy<StdRng> {
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> Entropy for RngEntropy<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }

    fn delay_ms(&mut self, range: Range<u64>) -> u64 {
        self.0.random_range(range)
    }
}

pub type SharedEntropy = Arc<Mutex<Box<dyn Entropy>>>;

pub fn shared_entropy(entropy: impl Entropy + 'static) -> SharedEntropy {
    Arc::new(Mutex::new(Box::new(entropy)))
}

fn with_entropy<T>(entropy: &SharedEntropy, f: impl FnOnce(&mut dyn Entropy) -> T) -> T {
    let mut guard = entropy.lock().unwrap_or_else(PoisonError::into_inner);
    f(guard.as_mut())
}

pub(crate) fn pick_index(entropy: &SharedEntropy, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    with_entropy(entropy, |e| e.pick(len)).min(len - 1)
}

/// Sleeps for a random duration drawn from `range` and returns it.
pub(crate) async fn simulate_latency(entropy: &SharedEntropy, range: Range<u64>) -> Duration {
    let delay = Duration::from_millis(with_entropy(entropy, |e| e.delay_ms(range)));
    tokio::time::sleep(delay).await;
    delay
}
