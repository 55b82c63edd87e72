use std::sync::Arc;
use std::time::Duration;

use engine::{AnalysisResult, SearchBackend};
use tokio::runtime::Handle;

use super::JobSlot;

/// Runs position analysis in the background, one search at a time.
///
/// Requests arriving while a search is running are dropped rather than
/// queued, so the result shown may lag the board by a move until the next
/// accepted request.
pub struct AnalysisCoordinator {
    backend: Arc<dyn SearchBackend>,
    runtime: Handle,
    budget: Duration,
    slot: JobSlot<Option<AnalysisResult>>,
    latest: Option<AnalysisResult>,
}

impl AnalysisCoordinator {
    pub fn new(backend: Arc<dyn SearchBackend>, runtime: Handle, budget: Duration) -> Self {
        Self {
            backend,
            runtime,
            budget,
            slot: JobSlot::new(),
            latest: None,
        }
    }

    /// Start analysing `fen`. Returns `false` if a search was already running
    /// and the request was dropped.
    ///
    /// An accepted request clears the cached result.
    pub fn request(&mut self, fen: String) -> bool {
        let backend = Arc::clone(&self.backend);
        let budget = self.budget;
        let accepted = self.slot.spawn(&self.runtime, async move {
            match backend.analyze(&fen, budget).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Analysis of {} failed: {}", fen, e);
                    None
                }
            }
        });

        if accepted {
            self.latest = None;
        } else {
            tracing::debug!("Analysis already running, request dropped");
        }
        accepted
    }

    /// Pick up a finished search and return the cached result.
    ///
    /// The result stays cached until the next accepted request.
    pub fn poll(&mut self) -> Option<&AnalysisResult> {
        if let Some(Some(result)) = self.slot.take() {
            self.latest = Some(result);
        }
        self.latest.as_ref()
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.latest.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn jobs_spawned(&self) -> usize {
        self.slot.spawned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use chess::PlayerSide;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    async fn poll_until_done(coordinator: &mut AnalysisCoordinator) -> Option<AnalysisResult> {
        for _ in 0..200 {
            let busy = coordinator.is_busy();
            if let Some(result) = coordinator.poll() {
                return Some(result.clone());
            }
            if !busy {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("analysis never finished");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_of_requests_spawns_one_job() {
        let (backend, gate) = MockBackend::new().gated();
        let backend = Arc::new(backend);
        let mut coordinator =
            AnalysisCoordinator::new(backend.clone(), Handle::current(), Duration::from_millis(10));

        assert!(coordinator.request(START.to_string()));
        for _ in 0..20 {
            assert!(!coordinator.request(AFTER_E4.to_string()));
        }
        assert_eq!(coordinator.jobs_spawned(), 1);

        gate.add_permits(1);
        let result = poll_until_done(&mut coordinator).await.unwrap();
        assert_eq!(result.side_to_move, PlayerSide::White);
        assert_eq!(backend.analyze_calls(), 1);
        assert_eq!(backend.peak_concurrent_analyses(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_result_stays_cached_until_next_request() {
        let backend = Arc::new(MockBackend::new());
        let mut coordinator =
            AnalysisCoordinator::new(backend, Handle::current(), Duration::from_millis(10));

        assert!(coordinator.poll().is_none());
        coordinator.request(START.to_string());
        poll_until_done(&mut coordinator).await.unwrap();
        assert!(coordinator.poll().is_some());
        assert!(coordinator.poll().is_some());

        assert!(coordinator.request(AFTER_E4.to_string()));
        assert!(coordinator.latest().is_none());
        let result = poll_until_done(&mut coordinator).await.unwrap();
        assert_eq!(result.side_to_move, PlayerSide::Black);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unavailable_backend_yields_nothing() {
        let backend = Arc::new(MockBackend::unavailable());
        let mut coordinator =
            AnalysisCoordinator::new(backend, Handle::current(), Duration::from_millis(10));

        assert!(coordinator.request(START.to_string()));
        assert!(poll_until_done(&mut coordinator).await.is_none());
        assert!(coordinator.poll().is_none());
    }
}
