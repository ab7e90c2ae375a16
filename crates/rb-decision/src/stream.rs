//! Cursored decision sequences.
//!
//! A [`Sequence`] is a finite, pre-sampled list of values read front to back.
//! The cursor only moves forward; [`Sequence::reset`] is the only way back to
//! the start.  Reading past the end is a [`DecisionError::Exhausted`].

use std::fmt;

use crate::{DecisionError, DecisionResult};

/// Which of an agent's four sequences a value came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    FollowNavigation,
    ReportIfObstruction,
    ReportIfClear,
    TimeLag,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamKind::FollowNavigation    => "follow-navigation",
            StreamKind::ReportIfObstruction => "report-if-obstruction",
            StreamKind::ReportIfClear       => "report-if-clear",
            StreamKind::TimeLag             => "time-lag",
        };
        f.write_str(s)
    }
}

// ── Sequence ──────────────────────────────────────────────────────────────────

/// A finite sequence with a private forward-only cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence<T> {
    kind: StreamKind,
    values: Vec<T>,
    cursor: usize,
}

impl<T: Copy> Sequence<T> {
    pub fn new(kind: StreamKind, values: Vec<T>) -> Self {
        Self { kind, values, cursor: 0 }
    }

    /// Consume the next value.
    pub fn next_value(&mut self) -> DecisionResult<T> {
        let v = self
            .values
            .get(self.cursor)
            .copied()
            .ok_or(DecisionError::Exhausted { kind: self.kind, len: self.values.len() })?;
        self.cursor += 1;
        Ok(v)
    }

    /// The value `next_value` would return, without consuming it.
    pub fn peek(&self) -> Option<T> {
        self.values.get(self.cursor).copied()
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Values consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Rewind to the first value.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

// ── DecisionStream ────────────────────────────────────────────────────────────

/// One agent's four independent decision sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionStream {
    follow_navigation: Sequence<bool>,
    report_if_obstruction: Sequence<bool>,
    report_if_clear: Sequence<bool>,
    time_lag_secs: Sequence<f64>,
}

impl DecisionStream {
    pub fn new(
        follow_navigation: Vec<bool>,
        report_if_obstruction: Vec<bool>,
        report_if_clear: Vec<bool>,
        time_lag_secs: Vec<f64>,
    ) -> Self {
        Self {
            follow_navigation:     Sequence::new(StreamKind::FollowNavigation, follow_navigation),
            report_if_obstruction: Sequence::new(StreamKind::ReportIfObstruction, report_if_obstruction),
            report_if_clear:       Sequence::new(StreamKind::ReportIfClear, report_if_clear),
            time_lag_secs:         Sequence::new(StreamKind::TimeLag, time_lag_secs),
        }
    }

    /// Every sequence repeats a single value `len` times.  Handy for
    /// hand-written scenarios.
    pub fn constant(
        len: usize,
        follow_navigation: bool,
        report_if_obstruction: bool,
        report_if_clear: bool,
        time_lag_secs: f64,
    ) -> Self {
        Self::new(
            vec![follow_navigation; len],
            vec![report_if_obstruction; len],
            vec![report_if_clear; len],
            vec![time_lag_secs; len],
        )
    }

    pub fn next_follow_navigation(&mut self) -> DecisionResult<bool> {
        self.follow_navigation.next_value()
    }

    pub fn next_report_if_obstruction(&mut self) -> DecisionResult<bool> {
        self.report_if_obstruction.next_value()
    }

    pub fn next_report_if_clear(&mut self) -> DecisionResult<bool> {
        self.report_if_clear.next_value()
    }

    pub fn next_time_lag(&mut self) -> DecisionResult<f64> {
        self.time_lag_secs.next_value()
    }

    pub fn follow_navigation(&self) -> &Sequence<bool> {
        &self.follow_navigation
    }

    pub fn report_if_obstruction(&self) -> &Sequence<bool> {
        &self.report_if_obstruction
    }

    pub fn report_if_clear(&self) -> &Sequence<bool> {
        &self.report_if_clear
    }

    pub fn time_lag(&self) -> &Sequence<f64> {
        &self.time_lag_secs
    }

    /// Rewind all four cursors (scenario reset).
    pub fn reset(&mut self) {
        self.follow_navigation.reset();
        self.report_if_obstruction.reset();
        self.report_if_clear.reset();
        self.time_lag_secs.reset();
    }
}
