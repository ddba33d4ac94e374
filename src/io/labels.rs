// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label files.
//!
//! One line per box: `<class_index> <center_x> <center_y> <width> <height>`,
//! all four floats normalized to the frame. Empty files mean "no boxes".

use crate::error::{AnnotatorError, Result};
use crate::models::annotation::BoundingBox;
use std::fs;
use std::path::Path;

/// Create an empty label file, failing if one already exists.
pub fn create_empty(path: &Path) -> Result<()> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

/// Read every box stored in a label file. A missing file reads as no boxes.
pub fn read_labels(path: &Path) -> Result<Vec<BoundingBox>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    parse_labels(&text, path)
}

/// Parse label-file contents; `path` is only used in error messages.
pub fn parse_labels(text: &str, path: &Path) -> Result<Vec<BoundingBox>> {
    let mut boxes = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: String| AnnotatorError::MalformedLabel {
            path: path.to_path_buf(),
            line: i + 1,
            reason,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(malformed(format!("expected 5 fields, found {}", tokens.len())));
        }
        let class_index = tokens[0]
            .parse::<usize>()
            .map_err(|_| malformed(format!("invalid class index '{}'", tokens[0])))?;
        let mut values = [0.0f64; 4];
        for (value, token) in values.iter_mut().zip(&tokens[1..]) {
            *value = token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(format!("invalid coordinate '{}'", token)))?;
        }

        let bbox = BoundingBox::new(class_index, values[0], values[1], values[2], values[3]);
        if !bbox.is_within_frame() {
            log::warn!("{}:{}: box extends outside the frame", path.display(), i + 1);
        }
        boxes.push(bbox);
    }
    Ok(boxes)
}

/// Overwrite a label file with the given boxes, in order.
pub fn write_labels(path: &Path, boxes: &[BoundingBox]) -> Result<()> {
    let mut text = String::new();
    for bbox in boxes {
        text.push_str(&bbox.to_label_line());
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_000000.txt");
        let boxes = vec![
            BoundingBox::new(1, 0.3, 0.35, 0.5, 0.5),
            BoundingBox::new(0, 0.75, 0.25, 0.1, 0.2),
        ];

        write_labels(&path, &boxes).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "1 0.300000 0.350000 0.500000 0.500000\n0 0.750000 0.250000 0.100000 0.200000\n"
        );
        assert_eq!(read_labels(&path).unwrap(), boxes);
    }

    #[test]
    fn test_empty_and_missing_files_have_no_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_000001.txt");
        assert!(read_labels(&path).unwrap().is_empty());

        create_empty(&path).unwrap();
        assert!(read_labels(&path).unwrap().is_empty());
        assert!(create_empty(&path).is_err());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let boxes = parse_labels("\n0 0.5 0.5 0.2 0.2\n\n", Path::new("x.txt")).unwrap();
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        let path = Path::new("labels/image_000002.txt");
        match parse_labels("0 0.5 0.5 0.2 0.2\n0 0.5 0.5 0.2\n", path) {
            Err(AnnotatorError::MalformedLabel { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedLabel, got {:?}", other),
        }
        assert!(parse_labels("-1 0.5 0.5 0.2 0.2", path).is_err());
        assert!(parse_labels("0 0.5 NaN 0.2 0.2", path).is_err());
    }
}
