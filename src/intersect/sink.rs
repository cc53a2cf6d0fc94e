// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Result sinks receiving positive verdicts from concurrent workers

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Receives intersecting facet pairs. `Break` cancels the scan.
pub(crate) trait ResultSink<T>: Sync {
    fn record(&self, first: usize, second: usize, triangles: (T, T)) -> ControlFlow<()>;

    /// Whether the answer is already known, so a failure racing with the
    /// cancellation can be dropped
    fn settled(&self) -> bool {
        false
    }
}

/// Collects every intersecting triangle pair
pub(crate) struct TrianglePairs<T> {
    pairs: Mutex<Vec<(T, T)>>,
}

impl<T> TrianglePairs<T> {
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(Vec::new()),
        }
    }

    pub fn into_pairs(self) -> Vec<(T, T)> {
        self.pairs.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send> ResultSink<T> for TrianglePairs<T> {
    fn record(&self, _first: usize, _second: usize, triangles: (T, T)) -> ControlFlow<()> {
        self.pairs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(triangles);
        ControlFlow::Continue(())
    }
}

/// Collects the facet indices of every intersecting pair
pub(crate) struct FacetPairs {
    pairs: Mutex<Vec<(usize, usize)>>,
}

impl FacetPairs {
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(Vec::new()),
        }
    }

    pub fn into_pairs(self) -> Vec<(usize, usize)> {
        self.pairs.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> ResultSink<T> for FacetPairs {
    fn record(&self, first: usize, second: usize, _triangles: (T, T)) -> ControlFlow<()> {
        self.pairs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((first, second));
        ControlFlow::Continue(())
    }
}

/// Stops at the first intersection
pub(crate) struct Existence {
    found: AtomicBool,
}

impl Existence {
    pub fn new() -> Self {
        Self {
            found: AtomicBool::new(false),
        }
    }

    pub fn found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }
}

impl<T> ResultSink<T> for Existence {
    fn record(&self, _first: usize, _second: usize, _triangles: (T, T)) -> ControlFlow<()> {
        self.found.store(true, Ordering::Release);
        ControlFlow::Break(())
    }

    fn settled(&self) -> bool {
        self.found()
    }
}
