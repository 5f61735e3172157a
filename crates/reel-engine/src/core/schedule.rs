//! Stage schedule: maps elapsed time to (stage, progress).
//!
//! Stages are numbered from 1. Stage 0 is the reset marker a show uses to
//! re-establish its initial pose before the timeline loops.

use crate::error::{ReelError, Result};

/// One named, fixed-duration phase of a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub name: String,
    pub duration: f32,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Resolved position inside a schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageFrame {
    /// 1-based stage index, or 0 for the reset marker.
    pub stage: usize,
    /// Normalized position within the stage, in [0, 1).
    pub progress: f32,
}

impl StageFrame {
    pub const RESET: StageFrame = StageFrame {
        stage: 0,
        progress: 0.0,
    };

    pub fn is_reset(&self) -> bool {
        self.stage == 0
    }
}

/// A [`StageFrame`] together with the number of completed loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagePoint {
    pub lap: u64,
    pub frame: StageFrame,
}

/// Ordered list of stages with precomputed boundaries.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    stages: Vec<StageSpec>,
    /// Cumulative end time of each stage (prefix sums of durations).
    ends: Vec<f32>,
    total: f32,
}

impl StageSchedule {
    /// Build a schedule. Fails on an empty list or any duration that is not
    /// finite and strictly positive.
    pub fn new(stages: Vec<StageSpec>) -> Result<Self> {
        if stages.is_empty() {
            return Err(ReelError::EmptySchedule);
        }
        let mut ends = Vec::with_capacity(stages.len());
        let mut sum = 0.0_f32;
        for spec in &stages {
            if !spec.duration.is_finite() || spec.duration <= 0.0 {
                return Err(ReelError::InvalidDuration {
                    stage: spec.name.clone(),
                    duration: spec.duration,
                });
            }
            sum += spec.duration;
            ends.push(sum);
        }
        Ok(Self {
            stages,
            ends,
            total: sum,
        })
    }

    /// Convenience constructor from `(name, seconds)` pairs.
    pub fn from_pairs(pairs: &[(&str, f32)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, duration)| StageSpec::new(*name, *duration))
                .collect(),
        )
    }

    /// Sum of all stage durations.
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Number of real stages (excluding the reset marker).
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Name of a 1-based stage; `None` for the reset marker or out of range.
    pub fn name(&self, stage: usize) -> Option<&str> {
        stage
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .map(|s| s.name.as_str())
    }

    pub fn duration(&self, stage: usize) -> Option<f32> {
        stage
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .map(|s| s.duration)
    }

    /// Loop-relative start time of a 1-based stage.
    pub fn start_of(&self, stage: usize) -> Option<f32> {
        let i = stage.checked_sub(1)?;
        let end = *self.ends.get(i)?;
        Some(end - self.stages[i].duration)
    }

    /// Resolve `elapsed` to the active stage and its progress.
    ///
    /// Pure: depends only on `elapsed` and the schedule.
    pub fn resolve(&self, elapsed: f32) -> StageFrame {
        self.locate(elapsed).frame
    }

    /// Loop-relative end time of a 1-based stage.
    pub fn end_of(&self, stage: usize) -> Option<f32> {
        stage.checked_sub(1).and_then(|i| self.ends.get(i)).copied()
    }

    /// Like [`resolve`](Self::resolve), also reporting how many full loops
    /// have completed.
    pub fn locate(&self, elapsed: f32) -> StagePoint {
        self.locate_at(f64::from(elapsed))
    }

    /// [`locate`](Self::locate) for a double-precision clock. The loop is
    /// reduced in `f64` and only the lap-local time is narrowed.
    pub fn locate_at(&self, elapsed: f64) -> StagePoint {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        let total = f64::from(self.total);
        let wrapped = elapsed % total;
        let lap = ((elapsed - wrapped) / total).round() as u64;

        // Landing exactly on a loop boundary is the one-tick reset.
        if lap > 0 && wrapped == 0.0 {
            return StagePoint {
                lap,
                frame: StageFrame::RESET,
            };
        }

        let local = wrapped as f32;
        let mut start = 0.0;
        for (i, end) in self.ends.iter().enumerate() {
            if local < *end {
                let duration = self.stages[i].duration;
                return StagePoint {
                    lap,
                    frame: StageFrame {
                        stage: i + 1,
                        progress: ((local - start) / duration).clamp(0.0, 1.0),
                    },
                };
            }
            start = *end;
        }

        // Rounding pushed `local` onto the final boundary.
        StagePoint {
            lap,
            frame: StageFrame {
                stage: self.stages.len(),
                progress: 1.0,
            },
        }
    }

    /// Seconds into the lap for a resolved frame; the reset marker is 0.
    pub fn lap_time(&self, frame: StageFrame) -> f32 {
        match (self.start_of(frame.stage), self.duration(frame.stage)) {
            (Some(start), Some(duration)) => start + frame.progress * duration,
            _ => 0.0,
        }
    }
}
