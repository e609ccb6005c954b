//! Frame diagnostics: timing and counts for one annotation pass.
//!
//! The core crate has no clock of its own. Callers supply one through
//! the [`Clock`] trait, so native tools can use `std::time::Instant`
//! while the browser worker uses `performance.now()` or nothing at all.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::annotate::{FrameAnnotation, FrameContext, Suppression, annotate_records};
use crate::feature::FeatureRecord;

/// Source of timestamps for measuring a frame.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A clock that never advances; every duration is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Counts and timing for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    /// Features in the input.
    pub feature_count: usize,
    /// Total vertices across every input feature.
    pub vertex_count: usize,
    /// Features that produced a tick set.
    pub annotated: usize,
    /// Features hidden because the tick layer was off or out of zoom.
    pub layer_hidden: usize,
    /// Features whose classification is not on the tick layer.
    pub not_on_tick_layer: usize,
    /// Features decluttered at this resolution.
    pub decluttered: usize,
    /// Features that failed and were skipped.
    pub skipped: usize,
    /// Visible ticks emitted.
    pub tick_count: usize,
    /// Visible major ticks emitted.
    pub major_tick_count: usize,
    /// Wall-clock duration of the pass (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl FrameDiagnostics {
    /// Tally the counts of an annotated frame.
    #[must_use]
    pub fn from_frame(
        records: &[FeatureRecord],
        frame: &FrameAnnotation,
        duration: Duration,
    ) -> Self {
        let count = |reason: Suppression| {
            frame
                .suppressed
                .iter()
                .filter(|(_, r)| *r == reason)
                .count()
        };
        Self {
            feature_count: records.len(),
            vertex_count: records.iter().map(|r| r.vertices.len()).sum(),
            annotated: frame.annotated.len(),
            layer_hidden: count(Suppression::LayerHidden),
            not_on_tick_layer: count(Suppression::NotOnTickLayer),
            decluttered: count(Suppression::Decluttered),
            skipped: frame.skipped.len(),
            tick_count: frame.tick_count(),
            major_tick_count: frame.major_tick_count(),
            duration,
        }
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let rows = [
            ("Features", self.feature_count),
            ("Vertices", self.vertex_count),
            ("Annotated", self.annotated),
            ("Layer hidden", self.layer_hidden),
            ("Not on tick layer", self.not_on_tick_layer),
            ("Decluttered", self.decluttered),
            ("Skipped", self.skipped),
            ("Ticks", self.tick_count),
            ("Major ticks", self.major_tick_count),
        ];

        let mut lines = vec![format!("Frame Diagnostics Report\n{}", "=".repeat(40))];
        lines.push(format!(
            "Duration: {:.3}ms",
            self.duration.as_secs_f64() * 1000.0
        ));
        lines.push(String::new());
        for (name, value) in rows {
            lines.push(format!("{name:<24} {value:>10}"));
        }
        lines.join("\n")
    }
}

/// Annotate a frame of host records and collect diagnostics for it.
#[must_use]
pub fn annotate_frame_with_diagnostics<C: Clock>(
    records: &[FeatureRecord],
    ctx: &FrameContext,
    clock: &C,
) -> (FrameAnnotation, FrameDiagnostics) {
    let start = clock.now();
    let frame = annotate_records(records, ctx);
    let duration = clock.elapsed(&start);
    let diagnostics = FrameDiagnostics::from_frame(records, &frame, duration);
    (frame, diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::settings::RoadSettings;
    use crate::types::Viewport;

    /// Advances by a fixed step on every reading.
    struct StepClock {
        ticks: Cell<u64>,
    }

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let now = self.ticks.get();
            self.ticks.set(now + 5);
            now
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn records() -> Vec<FeatureRecord> {
        serde_json::from_str(
            r#"[
                {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 2,
                 "NETWORK_TYPE": "State Road"},
                {"vertices": [[0, 50], [500, 50], [1000, 50]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Main Roads Controlled Path"},
                {"vertices": [[0, 10], [1000, 10]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Local Road"},
                {"vertices": [], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "State Road"}
            ]"#,
        )
        .unwrap()
    }

    fn ctx(resolution: f64) -> FrameContext {
        FrameContext {
            resolution,
            viewport: Viewport::new(1000.0, 200.0),
            settings: RoadSettings::default(),
        }
    }

    #[test]
    fn counts_every_outcome() {
        let clock = StepClock {
            ticks: Cell::new(0),
        };
        let (frame, diag) = annotate_frame_with_diagnostics(&records(), &ctx(2.0), &clock);
        assert_eq!(diag.feature_count, 4);
        assert_eq!(diag.vertex_count, 7);
        assert_eq!(diag.annotated, 2);
        assert_eq!(diag.not_on_tick_layer, 1);
        assert_eq!(diag.skipped, 1);
        assert_eq!(diag.tick_count, frame.tick_count());
        // 20 ticks on the 2 km road plus 10 on the 1 km path.
        assert_eq!(diag.tick_count, 30);
        assert_eq!(diag.major_tick_count, 3);
        assert_eq!(diag.duration, Duration::from_millis(5));
    }

    #[test]
    fn declutter_is_counted_separately() {
        let (_, diag) = annotate_frame_with_diagnostics(&records(), &ctx(5.0), &NoClock);
        assert_eq!(diag.decluttered, 1);
        assert_eq!(diag.annotated, 1);
        assert_eq!(diag.duration, Duration::ZERO);
    }

    #[test]
    fn report_lists_counts() {
        let (_, diag) = annotate_frame_with_diagnostics(&records(), &ctx(2.0), &NoClock);
        let report = diag.report();
        assert!(report.starts_with("Frame Diagnostics Report"));
        assert!(report.contains("Ticks"));
        assert!(report.contains("30"));
    }

    #[test]
    fn duration_serializes_as_seconds() {
        let diag = FrameDiagnostics {
            duration: Duration::from_millis(1500),
            ..FrameDiagnostics::default()
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert!((json["duration"].as_f64().unwrap() - 1.5).abs() < 1e-12);
        let back: FrameDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diag);
    }
}
