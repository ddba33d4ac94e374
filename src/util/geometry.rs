// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides utilities for coordinate transformations between
//! display pixel coordinates and normalized frame coordinates.

use crate::models::annotation::{BoundingBox, PixelRect, Point};

/// Size of the area a frame is displayed in, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }

    /// Whether a point falls inside the display area.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }
}

/// Convert pixel coordinates to normalized coordinates (0.0 to 1.0).
pub fn normalize_coordinates(pixel_x: f64, pixel_y: f64, size: DisplaySize) -> Point {
    Point {
        x: pixel_x / size.width,
        y: pixel_y / size.height,
    }
}

/// Convert normalized coordinates to pixel coordinates.
pub fn denormalize_coordinates(point: &Point, size: DisplaySize) -> (f64, f64) {
    (point.x * size.width, point.y * size.height)
}

/// Clamp a point to `[0, width-1] x [0, height-1]`.
pub fn clamp_to_display(point: Point, size: DisplaySize) -> Point {
    Point {
        x: point.x.clamp(0.0, (size.width - 1.0).max(0.0)),
        y: point.y.clamp(0.0, (size.height - 1.0).max(0.0)),
    }
}

/// Convert a drawn pixel rectangle into a normalized bounding box.
pub fn normalize_rect(rect: &PixelRect, size: DisplaySize, class_index: usize) -> BoundingBox {
    let center = normalize_coordinates(
        (rect.start.x + rect.end.x) / 2.0,
        (rect.start.y + rect.end.y) / 2.0,
        size,
    );
    BoundingBox {
        class_index,
        center_x: center.x,
        center_y: center.y,
        width: rect.width() / size.width,
        height: rect.height() / size.height,
    }
}

/// Convert a normalized bounding box back to a pixel rectangle (top-left to bottom-right).
pub fn denormalize_box(bbox: &BoundingBox, size: DisplaySize) -> PixelRect {
    let (left, top, right, bottom) = bbox.edges();
    let (x0, y0) = denormalize_coordinates(&Point::new(left, top), size);
    let (x1, y1) = denormalize_coordinates(&Point::new(right, bottom), size);
    PixelRect::new(Point::new(x0, y0), Point::new(x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let size = DisplaySize::new(1920.0, 1080.0);
        let pixel_x = 960.0;
        let pixel_y = 540.0;

        let normalized = normalize_coordinates(pixel_x, pixel_y, size);
        let (denorm_x, denorm_y) = denormalize_coordinates(&normalized, size);

        assert!((denorm_x - pixel_x).abs() < 0.0001);
        assert!((denorm_y - pixel_y).abs() < 0.0001);
    }

    #[test]
    fn test_normalize_corners() {
        let size = DisplaySize::new(1920.0, 1080.0);

        // Top-left corner
        let tl = normalize_coordinates(0.0, 0.0, size);
        assert_eq!(tl.x, 0.0);
        assert_eq!(tl.y, 0.0);

        // Bottom-right corner
        let br = normalize_coordinates(1920.0, 1080.0, size);
        assert_eq!(br.x, 1.0);
        assert_eq!(br.y, 1.0);
    }

    #[test]
    fn test_rect_to_box_and_back() {
        let size = DisplaySize::new(200.0, 100.0);
        let rect = PixelRect::new(Point::new(10.0, 10.0), Point::new(110.0, 60.0));

        let bbox = normalize_rect(&rect, size, 0);
        assert!((bbox.center_x - 0.30).abs() < EPS);
        assert!((bbox.center_y - 0.35).abs() < EPS);
        assert!((bbox.width - 0.50).abs() < EPS);
        assert!((bbox.height - 0.50).abs() < EPS);

        let back = denormalize_box(&bbox, size);
        assert!((back.start.x - 10.0).abs() < EPS);
        assert!((back.start.y - 10.0).abs() < EPS);
        assert!((back.end.x - 110.0).abs() < EPS);
        assert!((back.end.y - 60.0).abs() < EPS);
    }

    #[test]
    fn test_reversed_drag_gives_same_box() {
        let size = DisplaySize::new(200.0, 100.0);
        let forward = PixelRect::new(Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let backward = PixelRect::new(Point::new(110.0, 60.0), Point::new(10.0, 10.0));
        assert_eq!(normalize_rect(&forward, size, 2), normalize_rect(&backward, size, 2));
    }

    #[test]
    fn test_clamp_to_display() {
        let size = DisplaySize::new(200.0, 100.0);
        assert_eq!(clamp_to_display(Point::new(-5.0, 500.0), size), Point::new(0.0, 99.0));
        assert_eq!(clamp_to_display(Point::new(50.0, 20.0), size), Point::new(50.0, 20.0));
    }
}
