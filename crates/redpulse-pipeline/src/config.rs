//! Pipeline tuning knobs.

use rand::Rng;

use redpulse_core::TimeWindow;
use redpulse_scraper::FallbackMix;

/// Inclusive jitter bounds in milliseconds for a pacing delay.
///
/// Tests set both bounds to zero so runs complete instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange { min_ms: 0, max_ms: 0 };

    pub(crate) fn sample(self, rng: &mut impl Rng) -> u64 {
        if self.max_ms <= self.min_ms {
            self.min_ms
        } else {
            rng.random_range(self.min_ms..=self.max_ms)
        }
    }
}

/// Configuration for a collection run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Posts requested per keyword, 1..=50.
    pub max_posts_per_keyword: u32,
    pub time_window: TimeWindow,
    /// Jitter before every keyword except the first of the session.
    pub keyword_delay: DelayRange,
    /// Extra jitter after a keyword that yielded more than one post.
    pub post_delay: DelayRange,
    /// Checkpoints older than this are abandoned instead of resumed.
    pub session_window_secs: i64,
    /// Posts per concurrent write batch.
    pub batch_size: usize,
    /// Total attempts per post write, including the first.
    pub write_max_attempts: u32,
    /// Linear backoff base for post-write retries (`base × attempt`).
    pub write_retry_base_ms: u64,
    /// Substitute synthetic posts when a keyword's fetch fails.
    pub fallback_enabled: bool,
    pub fallback_mix: FallbackMix,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_posts_per_keyword: 20,
            time_window: TimeWindow::default(),
            keyword_delay: DelayRange {
                min_ms: 10_000,
                max_ms: 25_000,
            },
            post_delay: DelayRange {
                min_ms: 2_000,
                max_ms: 5_000,
            },
            session_window_secs: 3_600,
            batch_size: 10,
            write_max_attempts: 3,
            write_retry_base_ms: 1_000,
            fallback_enabled: true,
            fallback_mix: FallbackMix::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with all pacing delays and write backoff zeroed, for tests.
    #[must_use]
    pub fn instant() -> Self {
        PipelineConfig {
            keyword_delay: DelayRange::ZERO,
            post_delay: DelayRange::ZERO,
            write_retry_base_ms: 0,
            ..PipelineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn sample_stays_within_bounds() {
        let range = DelayRange {
            min_ms: 10,
            max_ms: 20,
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let v = range.sample(&mut rng);
            assert!((10..=20).contains(&v), "sampled {v}");
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(DelayRange::ZERO.sample(&mut rng), 0);
        let inverted = DelayRange {
            min_ms: 50,
            max_ms: 10,
        };
        assert_eq!(inverted.sample(&mut rng), 50);
    }
}
