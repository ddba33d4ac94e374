// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo for the boxes of the visible frame.

use crate::models::annotation::BoundingBox;

/// One reversible change to the box list.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxEdit {
    Add { index: usize, bbox: BoundingBox },
    Remove { index: usize, bbox: BoundingBox },
    Clear { boxes: Vec<BoundingBox> },
}

impl BoxEdit {
    fn apply(&self, boxes: &mut Vec<BoundingBox>) {
        match self {
            BoxEdit::Add { index, bbox } => boxes.insert((*index).min(boxes.len()), *bbox),
            BoxEdit::Remove { index, .. } => {
                if *index < boxes.len() {
                    boxes.remove(*index);
                }
            }
            BoxEdit::Clear { .. } => boxes.clear(),
        }
    }

    fn revert(&self, boxes: &mut Vec<BoundingBox>) {
        match self {
            BoxEdit::Add { index, .. } => {
                if *index < boxes.len() {
                    boxes.remove(*index);
                }
            }
            BoxEdit::Remove { index, bbox } => boxes.insert((*index).min(boxes.len()), *bbox),
            BoxEdit::Clear { boxes: cleared } => *boxes = cleared.clone(),
        }
    }
}

/// History system for undo/redo functionality.
pub struct History {
    /// Undo stack (applied edits, most recent last)
    undo_stack: Vec<BoxEdit>,
    /// Redo stack (edits taken back by undo)
    redo_stack: Vec<BoxEdit>,
    /// Maximum history size
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50,
        }
    }

    /// Apply an edit and record it.
    pub fn apply(&mut self, edit: BoxEdit, boxes: &mut Vec<BoundingBox>) {
        edit.apply(boxes);
        self.undo_stack.push(edit);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new edit invalidates anything that was undone
        self.redo_stack.clear();
    }

    /// Take back the most recent edit.
    pub fn undo(&mut self, boxes: &mut Vec<BoundingBox>) -> bool {
        match self.undo_stack.pop() {
            Some(edit) => {
                edit.revert(boxes);
                self.redo_stack.push(edit);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self, boxes: &mut Vec<BoundingBox>) -> bool {
        match self.redo_stack.pop() {
            Some(edit) => {
                edit.apply(boxes);
                self.undo_stack.push(edit);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(class_index: usize) -> BoundingBox {
        BoundingBox::new(class_index, 0.5, 0.5, 0.1, 0.1)
    }

    #[test]
    fn test_undo_pops_last_and_redo_repushes() {
        let mut boxes = Vec::new();
        let mut history = History::new();
        history.apply(BoxEdit::Add { index: 0, bbox: bbox(0) }, &mut boxes);
        history.apply(BoxEdit::Add { index: 1, bbox: bbox(1) }, &mut boxes);

        assert!(history.undo(&mut boxes));
        assert_eq!(boxes, vec![bbox(0)]);
        assert!(history.redo(&mut boxes));
        assert_eq!(boxes, vec![bbox(0), bbox(1)]);
        assert!(!history.redo(&mut boxes));
    }

    #[test]
    fn test_remove_and_clear_are_reversible() {
        let mut boxes = vec![bbox(0), bbox(1), bbox(2)];
        let mut history = History::new();

        history.apply(BoxEdit::Remove { index: 1, bbox: bbox(1) }, &mut boxes);
        assert_eq!(boxes, vec![bbox(0), bbox(2)]);
        history.apply(BoxEdit::Clear { boxes: boxes.clone() }, &mut boxes);
        assert!(boxes.is_empty());

        history.undo(&mut boxes);
        assert_eq!(boxes, vec![bbox(0), bbox(2)]);
        history.undo(&mut boxes);
        assert_eq!(boxes, vec![bbox(0), bbox(1), bbox(2)]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut boxes = Vec::new();
        let mut history = History::new();
        history.apply(BoxEdit::Add { index: 0, bbox: bbox(0) }, &mut boxes);
        history.undo(&mut boxes);
        assert!(history.can_redo());

        history.apply(BoxEdit::Add { index: 0, bbox: bbox(1) }, &mut boxes);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut boxes = Vec::new();
        let mut history = History::new();
        for i in 0..60 {
            history.apply(BoxEdit::Add { index: i, bbox: bbox(0) }, &mut boxes);
        }
        let mut undone = 0;
        while history.undo(&mut boxes) {
            undone += 1;
        }
        assert_eq!(undone, 50);
        assert_eq!(boxes.len(), 10);
    }
}
