// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Robust geometric predicates
//! Orientation tests with a static floating-point filter and an exact
//! expansion-arithmetic fallback (Shewchuk-style error-free transformations)

use nalgebra::{Point2, Point3};
use std::fmt::Debug;

/// Half an ulp of 1.0, the unit roundoff of f64
const EPSILON: f64 = f64::EPSILON * 0.5;

/// Relative error bound of the filtered orient2d determinant
const ORIENT2D_BOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;

/// Relative error bound of the filtered orient3d determinant
const ORIENT3D_BOUND: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

/// Sign of an orientation determinant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }

    pub fn negate(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

/// Orientation predicates a Cartesian kernel is built on.
///
/// `orient3d(a, b, c, d)` is the sign of `((b - a) x (c - a)) . (d - a)`,
/// positive when `d` lies on the side the normal of `(a, b, c)` points to.
/// `orient2d(a, b, c)` is the sign of `(b - a) x (c - a)`, positive for a
/// counter-clockwise turn. Inputs are assumed finite.
pub trait Orientation: Debug + Send + Sync + 'static {
    fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Sign;

    fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Sign;
}

/// Exact orientation: a static-bound filter in f64 backed by exact expansions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilteredExact;

/// Plain f64 evaluation, fast but unreliable near degeneracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Floating;

impl Orientation for Floating {
    fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Sign {
        let ab = b - a;
        let ac = c - a;
        Sign::of(ab.x * ac.y - ab.y * ac.x)
    }

    fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Sign {
        let ab = b - a;
        let ac = c - a;
        let ad = d - a;
        Sign::of(ab.dot(&ac.cross(&ad)))
    }
}

impl Orientation for FilteredExact {
    fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Sign {
        let ab = b - a;
        let ac = c - a;

        let left = ab.x * ac.y;
        let right = ab.y * ac.x;
        let det = left - right;
        let permanent = left.abs() + right.abs();

        if det.abs() > ORIENT2D_BOUND * permanent {
            return Sign::of(det);
        }
        orient2d_exact(a, b, c)
    }

    fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Sign {
        let u = b - a;
        let v = c - a;
        let w = d - a;

        let m1 = v.y * w.z - v.z * w.y;
        let m2 = v.z * w.x - v.x * w.z;
        let m3 = v.x * w.y - v.y * w.x;
        let det = u.x * m1 + u.y * m2 + u.z * m3;

        let permanent = ((v.y * w.z).abs() + (v.z * w.y).abs()) * u.x.abs()
            + ((v.z * w.x).abs() + (v.x * w.z).abs()) * u.y.abs()
            + ((v.x * w.y).abs() + (v.y * w.x).abs()) * u.z.abs();

        if det.abs() > ORIENT3D_BOUND * permanent {
            return Sign::of(det);
        }
        orient3d_exact(a, b, c, d)
    }
}

fn orient2d_exact(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Sign {
    let ux = Expansion::difference(b.x, a.x);
    let uy = Expansion::difference(b.y, a.y);
    let vx = Expansion::difference(c.x, a.x);
    let vy = Expansion::difference(c.y, a.y);

    ux.mul(&vy).sub(&uy.mul(&vx)).sign()
}

fn orient3d_exact(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Sign {
    let ux = Expansion::difference(b.x, a.x);
    let uy = Expansion::difference(b.y, a.y);
    let uz = Expansion::difference(b.z, a.z);
    let vx = Expansion::difference(c.x, a.x);
    let vy = Expansion::difference(c.y, a.y);
    let vz = Expansion::difference(c.z, a.z);
    let wx = Expansion::difference(d.x, a.x);
    let wy = Expansion::difference(d.y, a.y);
    let wz = Expansion::difference(d.z, a.z);

    let m1 = vy.mul(&wz).sub(&vz.mul(&wy));
    let m2 = vz.mul(&wx).sub(&vx.mul(&wz));
    let m3 = vx.mul(&wy).sub(&vy.mul(&wx));

    ux.mul(&m1).add(&uy.mul(&m2)).add(&uz.mul(&m3)).sign()
}

/// Error-free sum: `a + b == sum + err` exactly
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let b_virtual = sum - a;
    let a_virtual = sum - b_virtual;
    let err = (a - a_virtual) + (b - b_virtual);
    (sum, err)
}

/// Error-free product: `a * b == product + err` exactly (barring underflow)
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let product = a * b;
    (product, a.mul_add(b, -product))
}

/// Exact real number as a sum of non-overlapping doubles, ordered by
/// increasing magnitude, zero components removed
#[derive(Debug, Clone, Default, PartialEq)]
struct Expansion(Vec<f64>);

impl Expansion {
    fn difference(a: f64, b: f64) -> Self {
        let (sum, err) = two_sum(a, -b);
        let mut components = Vec::with_capacity(2);
        if err != 0.0 {
            components.push(err);
        }
        if sum != 0.0 {
            components.push(sum);
        }
        Expansion(components)
    }

    /// Adds a single double, keeping the expansion invariants
    fn grow(&mut self, value: f64) {
        let mut carry = value;
        let mut components = Vec::with_capacity(self.0.len() + 1);
        for &component in &self.0 {
            let (sum, err) = two_sum(carry, component);
            if err != 0.0 {
                components.push(err);
            }
            carry = sum;
        }
        if carry != 0.0 {
            components.push(carry);
        }
        self.0 = components;
    }

    fn add(&self, other: &Expansion) -> Expansion {
        let mut result = self.clone();
        for &component in &other.0 {
            result.grow(component);
        }
        result
    }

    fn sub(&self, other: &Expansion) -> Expansion {
        let mut result = self.clone();
        for &component in &other.0 {
            result.grow(-component);
        }
        result
    }

    fn scale(&self, factor: f64) -> Expansion {
        let mut result = Expansion::default();
        for &component in &self.0 {
            let (product, err) = two_product(component, factor);
            result.grow(err);
            result.grow(product);
        }
        result
    }

    fn mul(&self, other: &Expansion) -> Expansion {
        let mut result = Expansion::default();
        for &factor in &other.0 {
            result = result.add(&self.scale(factor));
        }
        result
    }

    /// The largest component carries the sign of the whole sum
    fn sign(&self) -> Sign {
        self.0.last().map_or(Sign::Zero, |&largest| Sign::of(largest))
    }
}
