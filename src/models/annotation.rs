// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding boxes stored in label files and the
//! pixel-space points and rectangles the drawing tools work with.

use serde::{Deserialize, Serialize};

/// A 2D point. Pixel coordinates in display space unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle spanned by two corner points in display pixels.
///
/// The corners are kept as drawn; `start` is where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub start: Point,
    pub end: Point,
}

impl PixelRect {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn min(&self) -> Point {
        Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y))
    }

    pub fn max(&self) -> Point {
        Point::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y))
    }

    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }

    /// A rectangle with no width or no height encloses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// A class-tagged bounding box with coordinates normalized to the frame
/// (YOLO layout: center, then size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub class_index: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(class_index: usize, center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            class_index,
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Left, top, right, bottom edges in normalized coordinates.
    pub fn edges(&self) -> (f64, f64, f64, f64) {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        (
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    /// True when every edge lies within the unit square.
    pub fn is_within_frame(&self) -> bool {
        const EPS: f64 = 1e-9;
        let (left, top, right, bottom) = self.edges();
        left >= -EPS && top >= -EPS && right <= 1.0 + EPS && bottom <= 1.0 + EPS
    }

    /// Format the box as one label-file line.
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_index, self.center_x, self.center_y, self.width, self.height
        )
    }
}
