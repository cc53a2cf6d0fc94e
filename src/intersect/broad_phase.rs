// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Broad phase: enumerate overlapping facet boxes
//!
//! A broad phase visits every unordered pair of boxes whose closed extents
//! overlap exactly once and never pairs a box with itself. The visitor
//! returns [`ControlFlow`]; a `Break` stops pair generation and is handed
//! back to the caller.

use super::boxes::FacetBox;
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default box count from which [`SweepAndPrune`] switches to rayon
pub const DEFAULT_CUTOFF: usize = 2000;

/// Pairwise box-overlap enumeration
pub trait BroadPhase: Sync {
    fn self_intersect<B, F>(&self, boxes: &[&FacetBox], cutoff: usize, visit: F) -> ControlFlow<B>
    where
        B: Send,
        F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B> + Sync;
}

impl<T: BroadPhase> BroadPhase for &T {
    fn self_intersect<B, F>(&self, boxes: &[&FacetBox], cutoff: usize, visit: F) -> ControlFlow<B>
    where
        B: Send,
        F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B> + Sync,
    {
        (**self).self_intersect(boxes, cutoff, visit)
    }
}

/// Sort boxes by their lower x bound and sweep along x.
///
/// Runs sequentially below `cutoff` boxes, otherwise each sweep start is a
/// rayon task. Workers poll a shared flag before every visit, so a `Break`
/// from any worker stops the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepAndPrune;

impl BroadPhase for SweepAndPrune {
    fn self_intersect<B, F>(&self, boxes: &[&FacetBox], cutoff: usize, visit: F) -> ControlFlow<B>
    where
        B: Send,
        F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B> + Sync,
    {
        let mut sorted = boxes.to_vec();
        sorted.sort_by(|a, b| a.bbox.min.x.total_cmp(&b.bbox.min.x));

        let halted = AtomicBool::new(false);
        let sweep = |start: usize| sweep_from(&sorted, start, &halted, &visit);

        let outcome = if sorted.len() < cutoff {
            (0..sorted.len()).try_for_each(sweep)
        } else {
            (0..sorted.len()).into_par_iter().try_for_each(sweep)
        };

        match outcome {
            Ok(()) => ControlFlow::Continue(()),
            Err(halt) => ControlFlow::Break(halt),
        }
    }
}

fn sweep_from<B, F>(sorted: &[&FacetBox], start: usize, halted: &AtomicBool, visit: &F) -> Result<(), B>
where
    F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B>,
{
    let current = sorted[start];
    for &other in &sorted[start + 1..] {
        if other.bbox.min.x > current.bbox.max.x {
            break;
        }
        if halted.load(Ordering::Acquire) {
            return Ok(());
        }
        if !(current.bbox.overlaps_on_axis(&other.bbox, 1) && current.bbox.overlaps_on_axis(&other.bbox, 2)) {
            continue;
        }
        if let ControlFlow::Break(halt) = visit(current, other) {
            halted.store(true, Ordering::Release);
            return Err(halt);
        }
    }
    Ok(())
}

/// Exhaustive quadratic enumeration, the reference for other broad phases
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn self_intersect<B, F>(&self, boxes: &[&FacetBox], _cutoff: usize, visit: F) -> ControlFlow<B>
    where
        B: Send,
        F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B> + Sync,
    {
        for (i, first) in boxes.iter().enumerate() {
            for second in &boxes[i + 1..] {
                if first.overlaps(second) {
                    visit(*first, *second)?;
                }
            }
        }
        ControlFlow::Continue(())
    }
}
