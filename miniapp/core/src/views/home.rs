//! Home view: platform stats with count-up counters.

use parking_lot::Mutex;

use super::Loaded;
use crate::animation::CounterAnimation;
use crate::api::PlatformStats;
use crate::error::ApiError;

/// Which stat a counter shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatCounter {
    /// Applications ever created
    TotalApplications,
    /// Turnover in UAH
    Turnover,
    /// Registered users
    TotalUsers,
    /// Applications created today
    TodayApplications,
}

/// Home view state
#[derive(Default)]
pub struct HomeView {
    stats: Mutex<Loaded<PlatformStats>>,
}

impl HomeView {
    /// Create with nothing loaded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the result of a stats fetch
    ///
    /// A failed refresh keeps stats already shown.
    pub fn apply(&self, result: Result<PlatformStats, ApiError>) {
        let mut stats = self.stats.lock();
        match result {
            Ok(fresh) => *stats = Loaded::Ready(fresh),
            Err(e) => {
                tracing::warn!("Failed to load stats: {}", e);
                if stats.data().is_none() {
                    *stats = Loaded::Failed(e.to_string());
                }
            }
        }
    }

    /// Last loaded stats
    #[must_use]
    pub fn stats(&self) -> Loaded<PlatformStats> {
        self.stats.lock().clone()
    }

    /// One count-up animation per stat, empty until stats are loaded
    #[must_use]
    pub fn counters(&self) -> Vec<(StatCounter, CounterAnimation)> {
        let Some(stats) = self.stats.lock().data().cloned() else {
            return Vec::new();
        };
        #[allow(clippy::cast_precision_loss)]
        let counters = vec![
            (
                StatCounter::TotalApplications,
                CounterAnimation::new(stats.total_applications as f64),
            ),
            (StatCounter::Turnover, CounterAnimation::new(stats.turnover)),
            (
                StatCounter::TotalUsers,
                CounterAnimation::new(stats.total_users as f64),
            ),
            (
                StatCounter::TodayApplications,
                CounterAnimation::new(stats.today_applications as f64),
            ),
        ];
        counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PlatformStats {
        PlatformStats {
            total_applications: 120,
            turnover: 45_000.5,
            total_users: 80,
            today_applications: 4,
        }
    }

    #[test]
    fn test_counters_end_on_stats() {
        let view = HomeView::new();
        assert!(view.counters().is_empty());

        view.apply(Ok(stats()));

        let finals: Vec<f64> = view
            .counters()
            .into_iter()
            .map(|(_, animation)| animation.target())
            .collect();
        assert_eq!(finals, vec![120.0, 45_000.5, 80.0, 4.0]);
    }

    #[test]
    fn test_failed_refresh_keeps_stats() {
        let view = HomeView::new();
        view.apply(Ok(stats()));
        view.apply(Err(ApiError::Status { code: 503 }));
        assert_eq!(view.stats(), Loaded::Ready(stats()));
    }

    #[test]
    fn test_first_failure_is_visible() {
        let view = HomeView::new();
        view.apply(Err(ApiError::Network("offline".into())));
        assert!(view.stats().is_failed());
    }
}
