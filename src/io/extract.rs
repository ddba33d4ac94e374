// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame extraction.
//!
//! Every `stride`-th native frame of the source becomes one sequentially
//! numbered frame: a full-resolution PNG in `frames/`, an empty label file in
//! `labels/` and a square resize in `resized/`.

use crate::error::Result;
use crate::io::labels;
use crate::io::media::VideoStream;
use crate::io::store::FrameLayout;
use image::imageops::{self, FilterType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Edge length of the square copies written to `resized/`.
pub const RESIZED_EDGE: u32 = 416;

/// Shared flag used to stop an extraction between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress after each written frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionProgress {
    /// Frames written so far.
    pub extracted: usize,
    /// Next native frame index to read.
    pub position: u64,
    /// Native frame count reported by the source (may be 0 if unknown).
    pub total: u64,
}

impl ExtractionProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.position as f64 / self.total as f64).min(1.0) as f32
    }
}

/// How an extraction ended. A cancelled run keeps what it wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub extracted: usize,
    pub cancelled: bool,
}

pub struct FrameExtractor {
    stride: u32,
    resize_edge: u32,
}

impl FrameExtractor {
    pub fn new(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
            resize_edge: RESIZED_EDGE,
        }
    }

    pub fn with_resize_edge(mut self, edge: u32) -> Self {
        self.resize_edge = edge.max(1);
        self
    }

    /// Write frames until the source runs out or `cancel` is tripped.
    pub fn extract(
        &self,
        stream: &mut dyn VideoStream,
        layout: &FrameLayout,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(ExtractionProgress),
    ) -> Result<ExtractionOutcome> {
        let total = stream.properties().frame_count;
        let stride = u64::from(self.stride);
        let mut position: u64 = 0;
        let mut extracted = 0usize;

        loop {
            if cancel.is_cancelled() {
                log::warn!("Frame extraction cancelled after {} frames", extracted);
                return Ok(ExtractionOutcome {
                    extracted,
                    cancelled: true,
                });
            }

            // Sequential reads already sit on the next frame when stride is 1.
            if stride > 1 && position > 0 {
                stream.seek(position)?;
            }
            let Some(frame) = stream.read_frame()? else {
                break;
            };

            frame.save(layout.frame_path(extracted))?;
            labels::create_empty(&layout.label_path(extracted))?;
            let resized = imageops::resize(&frame, self.resize_edge, self.resize_edge, FilterType::Triangle);
            resized.save(layout.resized_path(extracted))?;
            log::debug!("Extracted native frame {} as #{}", position, extracted);

            extracted += 1;
            position += stride;
            on_progress(ExtractionProgress {
                extracted,
                position,
                total,
            });
        }

        log::info!("Extracted {} frames (stride {})", extracted, self.stride);
        Ok(ExtractionOutcome {
            extracted,
            cancelled: false,
        })
    }
}
