// src/scanner.rs
use log::{info, warn};

use crate::analysis::error::ClassifyError;
use crate::analysis::types::WasteClassification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    AwaitingResult,
    Displaying,
    Failed,
}

/// Explicit state container for one scan session: the current phase, the
/// single classification slot, and a generation counter that orphans
/// in-flight requests superseded by a reset or a newer scan.
///
/// Invariants: at most one analysis in flight; the slot is written only by
/// a current-generation completion or cleared by reset; a failure never
/// clears a previously displayed result.
pub struct Scanner {
    phase: Phase,
    current: Option<WasteClassification>,
    error: Option<String>,
    generation: u64,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            error: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::AwaitingResult
    }

    pub fn classification(&self) -> Option<&WasteClassification> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Advisory capture errors (camera offline, unreadable file) leave the
    /// session usable; the user can still pick another source.
    pub fn note_capture_error(&mut self, message: String) {
        warn!("Capture error: {}", message);
        self.error = Some(message);
    }

    /// Move into Capturing. Rejected while a request is in flight so a
    /// second capture cannot race the first.
    pub fn begin_capture(&mut self) -> bool {
        if self.is_analyzing() {
            warn!("Capture ignored: analysis already in flight");
            return false;
        }
        self.phase = Phase::Capturing;
        self.error = None;
        true
    }

    /// Start an analysis and hand back its generation token, or None while
    /// another request is in flight.
    pub fn begin_analysis(&mut self) -> Option<u64> {
        if self.is_analyzing() {
            warn!("Analysis ignored: another request is in flight");
            return None;
        }
        self.generation += 1;
        self.phase = Phase::AwaitingResult;
        self.error = None;
        info!("Analysis started (generation {})", self.generation);
        Some(self.generation)
    }

    /// Apply a completed request. Completions carrying a stale generation
    /// are dropped so an abandoned call never overwrites newer state.
    /// Returns whether the result was applied.
    pub fn apply_result(
        &mut self,
        generation: u64,
        result: Result<WasteClassification, ClassifyError>,
    ) -> bool {
        if generation != self.generation {
            info!(
                "Dropping stale analysis result (generation {} != {})",
                generation, self.generation
            );
            return false;
        }

        match result {
            Ok(classification) => {
                info!("Classified item: {}", classification.item_name);
                self.current = Some(classification);
                self.error = None;
                self.phase = Phase::Displaying;
            }
            Err(e) => {
                warn!("Analysis failed: {}", e);
                // Keep whatever was on screen; only the message changes.
                self.error = Some(e.to_string());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Back to Idle. Bumps the generation so any in-flight completion is
    /// orphaned rather than resurrecting the cleared state.
    pub fn reset(&mut self) {
        info!("Scanner reset");
        self.generation += 1;
        self.phase = Phase::Idle;
        self.current = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::testing::pet_bottle;

    #[test]
    fn test_init() {
        let scanner = Scanner::new();
        assert_eq!(scanner.phase(), Phase::Idle);
        assert!(scanner.classification().is_none());
        assert!(scanner.error().is_none());
    }

    #[test]
    fn test_successful_scan_flow() {
        let mut scanner = Scanner::new();

        assert!(scanner.begin_capture());
        assert_eq!(scanner.phase(), Phase::Capturing);

        let generation = scanner.begin_analysis().unwrap();
        assert_eq!(scanner.phase(), Phase::AwaitingResult);
        assert!(scanner.is_analyzing());

        assert!(scanner.apply_result(generation, Ok(pet_bottle())));
        assert_eq!(scanner.phase(), Phase::Displaying);
        assert_eq!(
            scanner.classification().unwrap().item_name,
            "PET Bottle"
        );
        assert!(scanner.error().is_none());
    }

    #[test]
    fn test_second_analysis_rejected_while_in_flight() {
        let mut scanner = Scanner::new();
        let generation = scanner.begin_analysis().unwrap();

        assert!(scanner.begin_analysis().is_none());
        assert!(!scanner.begin_capture());

        // First request still completes normally
        assert!(scanner.apply_result(generation, Ok(pet_bottle())));
        assert_eq!(scanner.phase(), Phase::Displaying);
    }

    #[test]
    fn test_failure_keeps_previous_classification() {
        let mut scanner = Scanner::new();
        let generation = scanner.begin_analysis().unwrap();
        scanner.apply_result(generation, Ok(pet_bottle()));

        let generation = scanner.begin_analysis().unwrap();
        scanner.apply_result(
            generation,
            Err(ClassifyError::InvalidFormat("truncated".to_string())),
        );

        assert_eq!(scanner.phase(), Phase::Failed);
        assert!(!scanner.error().unwrap().is_empty());
        // Previously displayed result is untouched
        assert_eq!(scanner.classification().unwrap().item_name, "PET Bottle");
    }

    #[test]
    fn test_reset_orphans_in_flight_request() {
        let mut scanner = Scanner::new();
        let generation = scanner.begin_analysis().unwrap();

        scanner.reset();
        assert_eq!(scanner.phase(), Phase::Idle);

        // Stale completion must not resurrect state
        assert!(!scanner.apply_result(generation, Ok(pet_bottle())));
        assert_eq!(scanner.phase(), Phase::Idle);
        assert!(scanner.classification().is_none());
    }

    #[test]
    fn test_reset_clears_result_and_error() {
        let mut scanner = Scanner::new();
        let generation = scanner.begin_analysis().unwrap();
        scanner.apply_result(generation, Ok(pet_bottle()));

        scanner.reset();
        assert!(scanner.classification().is_none());
        assert!(scanner.error().is_none());

        // Session stays usable after reset
        assert!(scanner.begin_analysis().is_some());
    }

    #[test]
    fn test_capture_error_is_advisory() {
        let mut scanner = Scanner::new();
        scanner.note_capture_error("Optic sensor offline. Camera access denied.".to_string());

        assert_eq!(scanner.phase(), Phase::Idle);
        assert!(scanner.error().is_some());
        // Upload path still works
        assert!(scanner.begin_capture());
        assert!(scanner.error().is_none());
    }
}
