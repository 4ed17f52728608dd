// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bezier geometry for links.
//!
//! Evaluation, closest-point refinement and hover testing for cubic curves,
//! plus the control-point shaping used for every link in the editor.

use crate::pin::AttributeKind;
use egui::{Pos2, Rect, Vec2};

/// Segments evaluated per refinement iteration
const CLOSEST_POINT_SEGMENTS: usize = 5;

/// Refinement iterations per unit of control polygon length
const ITERATIONS_PER_LENGTH: f32 = 0.01;

/// Iteration bounds for the closest-point search
const MIN_ITERATIONS: f32 = 2.0;
const MAX_ITERATIONS: f32 = 8.0;

/// A cubic bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Control points, first and last are the endpoints
    pub points: [Pos2; 4],
}

/// Best point found by one closest-point refinement iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Curve parameter of the best point so far
    pub t: f32,
    /// Squared distance from the query to the best point so far
    pub distance_sq: f32,
}

impl CubicBezier {
    /// Create a curve from its four control points
    pub fn new(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2) -> Self {
        Self {
            points: [p0, p1, p2, p3],
        }
    }

    /// Evaluate the curve at `t` in `[0, 1]`
    pub fn eval(&self, t: f32) -> Pos2 {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Pos2::new(
            b0 * p0.x + b1 * p1.x + b2 * p2.x + b3 * p3.x,
            b0 * p0.y + b1 * p1.y + b2 * p2.y + b3 * p3.y,
        )
    }

    /// Length of the polyline through the four control points
    pub fn control_polygon_length(&self) -> f32 {
        let [p0, p1, p2, p3] = self.points;
        p0.distance(p1) + p1.distance(p2) + p2.distance(p3)
    }

    /// Number of refinement iterations spent on this curve.
    ///
    /// Grows with the control polygon length, clamped to `[2, 8]`.
    pub fn refinement_iterations(&self) -> usize {
        let iterations = self.control_polygon_length() * ITERATIONS_PER_LENGTH;
        if iterations.is_nan() {
            return MIN_ITERATIONS as usize;
        }
        iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS) as usize
    }

    /// Iterative closest-point search towards `query`.
    ///
    /// Yields the running best after every iteration.
    pub fn closest_point_search(&self, query: Pos2) -> ClosestPointSearch {
        ClosestPointSearch {
            curve: *self,
            query,
            remaining: self.refinement_iterations(),
            t_start: 0.0,
            t_end: 1.0,
            best: ClosestPoint {
                t: 0.5,
                distance_sq: f32::MAX,
            },
        }
    }

    /// Parameter of the point on the curve closest to `query`
    pub fn closest_t(&self, query: Pos2) -> f32 {
        self.closest_point_search(query)
            .last()
            .map_or(0.5, |best| best.t)
    }

    /// Distance from `query` to the closest point on the curve
    pub fn distance_to(&self, query: Pos2) -> f32 {
        self.eval(self.closest_t(query)).distance(query)
    }

    /// Box spanned by the two endpoints only
    pub fn endpoint_bounds(&self) -> Rect {
        Rect::from_two_pos(self.points[0], self.points[3])
    }

    /// Whether `query` is within `threshold` pixels of the curve.
    ///
    /// The distance search only runs when the query lies inside the
    /// endpoint bounding box; points outside it are never near.
    pub fn is_near(&self, query: Pos2, threshold: f32) -> bool {
        if !self.endpoint_bounds().contains(query) {
            return false;
        }
        self.distance_to(query) < threshold
    }
}

/// Iterator over the refinement steps of a closest-point search
#[derive(Debug, Clone)]
pub struct ClosestPointSearch {
    curve: CubicBezier,
    query: Pos2,
    remaining: usize,
    t_start: f32,
    t_end: f32,
    best: ClosestPoint,
}

impl Iterator for ClosestPointSearch {
    type Item = ClosestPoint;

    fn next(&mut self) -> Option<ClosestPoint> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let dt = (self.t_end - self.t_start) / CLOSEST_POINT_SEGMENTS as f32;
        for segment in 0..CLOSEST_POINT_SEGMENTS {
            let t_mid = self.t_start + dt * (segment as f32 + 0.5);
            let distance_sq = (self.curve.eval(t_mid) - self.query).length_sq();
            if distance_sq < self.best.distance_sq {
                self.best = ClosestPoint { t: t_mid, distance_sq };
            }
        }

        // Center the next range on the best segment
        self.t_start = self.best.t - 0.5 * dt;
        self.t_end = self.best.t + 0.5 * dt;

        Some(self.best)
    }
}

/// Curve used to render and hit-test a link between two pins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurve {
    /// Curve from the output side to the input side
    pub bezier: CubicBezier,
    /// Line segments used when rendering
    pub segments: usize,
}

impl LinkCurve {
    /// Shape a link between two anchors.
    ///
    /// `start_kind` is the attribute kind of `start`; when it is an input the
    /// anchors are swapped so the curve always leaves the output rightwards.
    pub fn new(start: Pos2, end: Pos2, start_kind: AttributeKind, segments_per_length: f32) -> Self {
        let (start, end) = match start_kind {
            AttributeKind::Input => (end, start),
            AttributeKind::Output => (start, end),
        };
        let length = start.distance(end);
        let offset = Vec2::new(0.25 * length, 0.0);
        Self {
            bezier: CubicBezier::new(start, start + offset, end - offset, end),
            segments: segment_count(length, segments_per_length),
        }
    }
}

/// Render segments for a curve spanning `length` pixels, at least one
pub fn segment_count(length: f32, segments_per_length: f32) -> usize {
    ((length * segments_per_length) as usize).max(1)
}
