//! Frame analysis: turns captured frames into discrete detection events.
//!
//! Frames arrive through the latest-value-wins channel fed by the capture
//! thread.  [`run_analysis`] drains it, hands each frame to a
//! [`FrameAnalyzer`], then discards the payload.  What happens with a
//! detection depends on the [`DetectionSink`]:
//!
//! - In `timer` tick mode the sink is [`DetectionSink::Ignore`]: analysis runs
//!   but never touches the counter.
//! - In `frames` tick mode the sink is [`DetectionSink::Count`]: every
//!   detection is one `on_detection_tick`.

use std::sync::Arc;

use shot_core::{Frame, FrameInfo};
use tracing::{debug, warn};

use super::count_shots::CountShotsUseCase;
use crate::infrastructure::camera::latest::LatestReceiver;

/// "Object detected" event produced by a [`FrameAnalyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// The frame the detection was made on.
    pub frame: FrameInfo,
}

/// Per-frame analysis.
///
/// Implementations may keep state across frames; analysis runs on a single
/// task, one frame at a time.
#[cfg_attr(test, mockall::automock)]
pub trait FrameAnalyzer: Send {
    /// Inspects one frame and reports a detection, if any.
    fn analyze(&mut self, frame: &Frame) -> Option<Detection>;
}

/// No-op analyzer: never detects anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardingAnalyzer;

impl FrameAnalyzer for DiscardingAnalyzer {
    fn analyze(&mut self, _frame: &Frame) -> Option<Detection> {
        None
    }
}

/// Placeholder detector that reports one detection every N analysed frames.
///
/// It does not look at pixel content; it only gives `frames` tick mode a
/// steady, predictable event stream until a real detection model exists.
#[derive(Debug, Clone)]
pub struct CadenceDetector {
    frames_per_detection: u64,
    seen: u64,
}

impl CadenceDetector {
    /// A zero cadence is treated as one (every frame is a detection).
    pub fn new(frames_per_detection: u64) -> Self {
        Self {
            frames_per_detection: frames_per_detection.max(1),
            seen: 0,
        }
    }
}

impl FrameAnalyzer for CadenceDetector {
    fn analyze(&mut self, frame: &Frame) -> Option<Detection> {
        self.seen += 1;
        if self.seen % self.frames_per_detection == 0 {
            Some(Detection { frame: frame.info() })
        } else {
            None
        }
    }
}

/// Where detections go.
#[derive(Clone)]
pub enum DetectionSink {
    /// Detections are logged and otherwise ignored.
    Ignore,
    /// Every detection advances the shot counter by one tick.
    Count(Arc<CountShotsUseCase>),
}

/// Totals reported when an analysis loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Frames handed to the analyzer.
    pub analysed: u64,
    /// Detections the analyzer reported.
    pub detections: u64,
    /// Frames superseded in the channel before analysis could take them.
    pub dropped: u64,
}

/// Drains `frames` until the capture side closes the channel.
pub async fn run_analysis(
    mut frames: LatestReceiver<Frame>,
    mut analyzer: Box<dyn FrameAnalyzer>,
    sink: DetectionSink,
) -> AnalysisSummary {
    let mut summary = AnalysisSummary::default();

    while let Some(frame) = frames.recv().await {
        summary.analysed += 1;
        let detection = analyzer.analyze(&frame);
        let info = frame.discard();

        if let Some(detection) = detection {
            summary.detections += 1;
            debug!(sequence = detection.frame.sequence, "object detected");
            if let DetectionSink::Count(counter) = &sink {
                counter.on_detection_tick();
            }
        }

        let dropped = frames.dropped();
        if dropped > summary.dropped {
            debug!(
                sequence = info.sequence,
                dropped, "analysis lagging; superseded frames dropped"
            );
            summary.dropped = dropped;
        }
    }

    summary.dropped = frames.dropped();
    if summary.analysed == 0 {
        warn!("frame analysis ended without receiving any frame");
    }
    summary
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::camera::latest::latest_channel;
    use std::time::Duration;

    fn blank(sequence: u64) -> Frame {
        Frame::blank(sequence, Duration::from_millis(sequence * 33), 2, 2)
    }

    #[test]
    fn test_discarding_analyzer_never_detects() {
        let mut analyzer = DiscardingAnalyzer;
        assert!((1..=100).all(|n| analyzer.analyze(&blank(n)).is_none()));
    }

    #[test]
    fn test_cadence_detector_fires_every_nth_frame() {
        // Arrange
        let mut detector = CadenceDetector::new(3);

        // Act
        let hits: Vec<u64> = (1..=9)
            .filter_map(|n| detector.analyze(&blank(n)))
            .map(|d| d.frame.sequence)
            .collect();

        // Assert
        assert_eq!(hits, vec![3, 6, 9]);
    }

    #[test]
    fn test_cadence_detector_zero_means_every_frame() {
        let mut detector = CadenceDetector::new(0);
        assert!(detector.analyze(&blank(1)).is_some());
        assert!(detector.analyze(&blank(2)).is_some());
    }

    #[tokio::test]
    async fn test_run_analysis_counts_detections_when_sink_counts() {
        // Arrange
        let (tx, rx) = latest_channel();
        let counter = Arc::new(CountShotsUseCase::new());
        let mut analyzer = MockFrameAnalyzer::new();
        analyzer
            .expect_analyze()
            .times(2)
            .returning(|frame| Some(Detection { frame: frame.info() }));

        // Act
        let task = tokio::spawn(run_analysis(
            rx,
            Box::new(analyzer),
            DetectionSink::Count(Arc::clone(&counter)),
        ));
        tx.publish(blank(1));
        tokio::task::yield_now().await;
        while counter.stats().shots < 1 {
            tokio::task::yield_now().await;
        }
        tx.publish(blank(2));
        drop(tx);
        let summary = task.await.expect("analysis task");

        // Assert
        assert_eq!(summary.analysed, 2);
        assert_eq!(summary.detections, 2);
        assert_eq!(counter.stats().shots, 2);
        assert_eq!(counter.stats().makes, 1);
    }

    #[tokio::test]
    async fn test_run_analysis_ignores_detections_when_sink_ignores() {
        // Arrange
        let (tx, rx) = latest_channel();
        let mut analyzer = MockFrameAnalyzer::new();
        analyzer
            .expect_analyze()
            .returning(|frame| Some(Detection { frame: frame.info() }));

        // Act
        tx.publish(blank(1));
        drop(tx);
        let summary = run_analysis(rx, Box::new(analyzer), DetectionSink::Ignore).await;

        // Assert
        assert_eq!(summary.detections, 1);
    }

    #[tokio::test]
    async fn test_run_analysis_only_sees_latest_frame_when_lagging() {
        // Arrange – three frames arrive before analysis gets to run
        let (tx, rx) = latest_channel();
        let mut analyzer = MockFrameAnalyzer::new();
        analyzer
            .expect_analyze()
            .withf(|frame: &Frame| frame.sequence() == 3)
            .times(1)
            .returning(|_| None);
        tx.publish(blank(1));
        tx.publish(blank(2));
        tx.publish(blank(3));
        drop(tx);

        // Act
        let summary = run_analysis(rx, Box::new(analyzer), DetectionSink::Ignore).await;

        // Assert
        assert_eq!(summary.analysed, 1);
        assert_eq!(summary.dropped, 2);
    }

    #[tokio::test]
    async fn test_run_analysis_ends_when_channel_closes() {
        let (tx, rx) = latest_channel::<Frame>();
        drop(tx);
        let summary = run_analysis(rx, Box::new(DiscardingAnalyzer), DetectionSink::Ignore).await;
        assert_eq!(summary, AnalysisSummary::default());
    }
}
