// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer gestures to rectangles.
//!
//! Exactly one tool is active at a time. The box tool turns a
//! press-drag-release gesture into a rectangle in display pixels; the drag
//! tool turns it into pan offsets.

use crate::models::annotation::{PixelRect, Point};
use crate::util::geometry::{clamp_to_display, DisplaySize};

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    None,
    Box,
    Polygon,
    Drag,
}

/// Where the pointer gesture currently is. The display size seen at press
/// is kept for the whole gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Pressed { start: Point, display: DisplaySize },
    Dragging { start: Point, current: Point, display: DisplaySize },
}

/// What a pointer event produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolEvent {
    None,
    /// Rubber band to draw while the pointer is down.
    Preview(PixelRect),
    /// A finished rectangle ready to become a box, with the display size it
    /// was drawn in.
    BoxDrawn { rect: PixelRect, display: DisplaySize },
    /// The gesture ended without enclosing any area.
    Discarded,
    /// Offset from the press point. Points are local to the panned frame,
    /// so applying this keeps the frame under the pointer.
    Pan { dx: f64, dy: f64 },
}

#[derive(Debug, Clone)]
pub struct BoxTool {
    tool: Tool,
    gesture: Gesture,
}

impl Default for BoxTool {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxTool {
    pub fn new() -> Self {
        Self {
            tool: Tool::None,
            gesture: Gesture::Idle,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Any gesture in progress is abandoned.
    pub fn select(&mut self, tool: Tool) {
        if tool != self.tool {
            log::debug!("Tool {:?} -> {:?}", self.tool, tool);
        }
        self.gesture = Gesture::Idle;
        self.tool = tool;
    }

    /// Toolbar behaviour: clicking the active tool turns it off.
    pub fn toggle(&mut self, tool: Tool) {
        if self.tool == tool {
            self.select(Tool::None);
        } else {
            self.select(tool);
        }
    }

    /// True while the pointer is held down with a tool that tracks it.
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Rubber band of a box being drawn.
    pub fn preview(&self) -> Option<PixelRect> {
        match (self.tool, self.gesture) {
            (Tool::Box, Gesture::Pressed { start, .. }) => Some(PixelRect::new(start, start)),
            (Tool::Box, Gesture::Dragging { start, current, .. }) => Some(PixelRect::new(start, current)),
            _ => None,
        }
    }

    pub fn press(&mut self, point: Point, display: DisplaySize) -> ToolEvent {
        if display.is_empty() || !display.contains(point) {
            return ToolEvent::None;
        }
        match self.tool {
            Tool::Box => {
                self.gesture = Gesture::Pressed { start: point, display };
                ToolEvent::Preview(PixelRect::new(point, point))
            }
            Tool::Drag => {
                self.gesture = Gesture::Pressed { start: point, display };
                ToolEvent::None
            }
            Tool::None | Tool::Polygon => ToolEvent::None,
        }
    }

    pub fn drag_to(&mut self, point: Point) -> ToolEvent {
        let (start, display) = match self.gesture {
            Gesture::Idle => return ToolEvent::None,
            Gesture::Pressed { start, display } | Gesture::Dragging { start, display, .. } => (start, display),
        };

        match self.tool {
            Tool::Box => {
                let current = clamp_to_display(point, display);
                self.gesture = Gesture::Dragging { start, current, display };
                ToolEvent::Preview(PixelRect::new(start, current))
            }
            // The press point stays the anchor: the frame moves with the pointer
            Tool::Drag => ToolEvent::Pan {
                dx: point.x - start.x,
                dy: point.y - start.y,
            },
            Tool::None | Tool::Polygon => ToolEvent::None,
        }
    }

    pub fn release(&mut self) -> ToolEvent {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        if self.tool != Tool::Box {
            return ToolEvent::None;
        }
        match gesture {
            Gesture::Idle => ToolEvent::None,
            Gesture::Pressed { .. } => ToolEvent::Discarded,
            Gesture::Dragging { start, current, display } => {
                let rect = PixelRect::new(start, current);
                if rect.is_degenerate() {
                    ToolEvent::Discarded
                } else {
                    ToolEvent::BoxDrawn { rect, display }
                }
            }
        }
    }

    /// Abandon the current gesture without producing anything.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: DisplaySize = DisplaySize { width: 200.0, height: 100.0 };

    fn box_tool() -> BoxTool {
        let mut tool = BoxTool::new();
        tool.select(Tool::Box);
        tool
    }

    #[test]
    fn test_press_drag_release_yields_rect() {
        let mut tool = box_tool();
        tool.press(Point::new(10.0, 10.0), DISPLAY);
        tool.drag_to(Point::new(60.0, 30.0));
        tool.drag_to(Point::new(110.0, 60.0));

        let expected = PixelRect::new(Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        assert_eq!(tool.preview(), Some(expected));
        assert_eq!(tool.release(), ToolEvent::BoxDrawn { rect: expected, display: DISPLAY });
        assert!(!tool.is_active());
    }

    #[test]
    fn test_drag_outside_is_clamped() {
        let mut tool = box_tool();
        tool.press(Point::new(50.0, 50.0), DISPLAY);
        let event = tool.drag_to(Point::new(-5.0, 500.0));
        assert_eq!(
            event,
            ToolEvent::Preview(PixelRect::new(Point::new(50.0, 50.0), Point::new(0.0, 99.0)))
        );
    }

    #[test]
    fn test_click_without_drag_is_discarded() {
        let mut tool = box_tool();
        tool.press(Point::new(10.0, 10.0), DISPLAY);
        assert_eq!(tool.release(), ToolEvent::Discarded);

        tool.press(Point::new(10.0, 10.0), DISPLAY);
        tool.drag_to(Point::new(80.0, 10.0));
        assert_eq!(tool.release(), ToolEvent::Discarded);
    }

    #[test]
    fn test_press_outside_display_is_ignored() {
        let mut tool = box_tool();
        assert_eq!(tool.press(Point::new(250.0, 10.0), DISPLAY), ToolEvent::None);
        assert!(!tool.is_active());
        assert_eq!(tool.drag_to(Point::new(20.0, 20.0)), ToolEvent::None);
        assert_eq!(tool.release(), ToolEvent::None);
    }

    #[test]
    fn test_only_one_tool_is_active() {
        let mut tool = box_tool();
        tool.press(Point::new(10.0, 10.0), DISPLAY);
        tool.select(Tool::Drag);
        assert_eq!(tool.tool(), Tool::Drag);
        assert!(!tool.is_active());

        tool.toggle(Tool::Drag);
        assert_eq!(tool.tool(), Tool::None);
        tool.toggle(Tool::Polygon);
        assert_eq!(tool.tool(), Tool::Polygon);
        assert_eq!(tool.press(Point::new(10.0, 10.0), DISPLAY), ToolEvent::None);
    }

    #[test]
    fn test_pan_follows_pointer() {
        // The canvas reports points relative to the panned frame, so every
        // applied pan shifts the next local point back by the same amount.
        let mut tool = BoxTool::new();
        tool.select(Tool::Drag);
        let mut pan = 0.0;
        tool.press(Point::new(10.0, 10.0), DISPLAY);
        for screen_x in [20.0, 30.0, 40.0, 50.0] {
            let ToolEvent::Pan { dx, dy } = tool.drag_to(Point::new(screen_x - pan, 10.0)) else {
                panic!("expected a pan event");
            };
            assert_eq!(dy, 0.0);
            pan += dx;
            assert_eq!(pan, screen_x - 10.0);
        }
        assert_eq!(pan, 40.0);
        assert_eq!(tool.release(), ToolEvent::None);
        assert!(tool.preview().is_none());
    }

    #[test]
    fn test_box_keeps_display_size_of_press() {
        let mut tool = box_tool();
        tool.press(Point::new(10.0, 10.0), DISPLAY);
        // Dragging past the edge clamps to the display seen at press
        tool.drag_to(Point::new(400.0, 60.0));
        let expected = PixelRect::new(Point::new(10.0, 10.0), Point::new(199.0, 60.0));
        assert_eq!(tool.release(), ToolEvent::BoxDrawn { rect: expected, display: DISPLAY });
    }
}
