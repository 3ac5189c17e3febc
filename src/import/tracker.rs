use crate::import::progress::ImportProgress;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct TrackerState {
    running: bool,
    latest: Option<ImportProgress>,
}

/// Shared record of the import in flight, managed as Rocket state.
///
/// Only one import may run at a time; the latest progress snapshot survives
/// the run so clients can read how it ended.
#[derive(Debug, Default)]
pub struct ImportTracker {
    state: Mutex<TrackerState>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the tracker for a new run. Returns `None` while another run holds it.
    pub fn try_begin(&self, total: usize) -> Option<ImportRun<'_>> {
        let mut state = self.state.lock();
        if state.running {
            return None;
        }

        state.running = true;
        state.latest = Some(ImportProgress::new(total));
        Some(ImportRun { tracker: self })
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn latest(&self) -> Option<ImportProgress> {
        self.state.lock().latest.clone()
    }

    fn update(&self, progress: &ImportProgress) {
        self.state.lock().latest = Some(progress.clone());
    }

    fn release(&self) {
        self.state.lock().running = false;
    }
}

/// Claim on the tracker for one run; released on drop.
pub struct ImportRun<'a> {
    tracker: &'a ImportTracker,
}

impl ImportRun<'_> {
    pub fn report(&self, progress: &ImportProgress) {
        self.tracker.update(progress);
    }
}

impl Drop for ImportRun<'_> {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::progress::ImportPhase;

    #[test]
    fn only_one_run_at_a_time() {
        let tracker = ImportTracker::new();

        let run = tracker.try_begin(10).expect("first run");
        assert!(tracker.is_running());
        assert!(tracker.try_begin(5).is_none());

        drop(run);
        assert!(!tracker.is_running());
        assert!(tracker.try_begin(5).is_some());
    }

    #[test]
    fn latest_progress_outlives_run() {
        let tracker = ImportTracker::new();
        assert!(tracker.latest().is_none());

        {
            let run = tracker.try_begin(3).expect("run");
            let mut progress = ImportProgress::new(3);
            progress.phase = ImportPhase::Done;
            progress.current = 3;
            run.report(&progress);
        }

        let latest = tracker.latest().expect("snapshot");
        assert_eq!(latest.phase, ImportPhase::Done);
        assert_eq!(latest.current, 3);
    }
}
