// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module opens source videos behind the [`VideoStream`] trait and loads
//! extracted frames back from disk for display. Animated GIFs are decoded with
//! the `image` crate; every other container needs the `video-opencv` feature.

use crate::error::{AnnotatorError, Result};
use crate::models::project::VideoProperties;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A decoded video that can be read frame by frame.
pub trait VideoStream {
    /// Properties read when the stream was opened.
    fn properties(&self) -> VideoProperties;

    /// Position the stream so the next read returns native frame `index`.
    fn seek(&mut self, index: u64) -> Result<()>;

    /// Read the frame at the current position and advance by one.
    /// Returns `None` past the end of the stream.
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;
}

fn cannot_open(path: &Path, reason: impl Into<String>) -> AnnotatorError {
    AnnotatorError::CannotOpenVideo {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// Open a video file with the decoder matching its container.
pub fn open_video(path: &Path) -> Result<Box<dyn VideoStream>> {
    if is_gif(path) {
        return Ok(Box::new(GifVideo::open(path)?));
    }

    #[cfg(feature = "video-opencv")]
    {
        Ok(Box::new(opencv_backend::OpenCvVideo::open(path)?))
    }

    #[cfg(not(feature = "video-opencv"))]
    {
        Err(cannot_open(
            path,
            "no decoder for this container (build with the `video-opencv` feature)",
        ))
    }
}

/// Read the properties of a video and release the decoder before returning.
pub fn probe(path: &Path) -> Result<VideoProperties> {
    let stream = open_video(path)?;
    let properties = stream.properties();
    log::info!(
        "Probed {}: {}x{}, {} frames at {:.2} fps",
        path.display(),
        properties.width,
        properties.height,
        properties.frame_count,
        properties.fps
    );
    Ok(properties)
}

/// Animated GIF decoded fully into memory.
pub struct GifVideo {
    frames: Vec<RgbImage>,
    properties: VideoProperties,
    position: usize,
}

impl GifVideo {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| cannot_open(path, e.to_string()))?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| cannot_open(path, e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| cannot_open(path, e.to_string()))?;

        if frames.is_empty() {
            return Err(cannot_open(path, "animation has no frames"));
        }

        let total_delay_ms: f64 = frames
            .iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                numer as f64 / denom.max(1) as f64
            })
            .sum();
        let fps = if total_delay_ms > 0.0 {
            frames.len() as f64 * 1000.0 / total_delay_ms
        } else {
            0.0
        };

        let frames: Vec<RgbImage> = frames
            .into_iter()
            .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8())
            .collect();
        let (width, height) = frames[0].dimensions();

        Ok(Self {
            properties: VideoProperties {
                width,
                height,
                frame_count: frames.len() as u64,
                fps,
            },
            frames,
            position: 0,
        })
    }
}

impl VideoStream for GifVideo {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.position = usize::try_from(index).unwrap_or(usize::MAX);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let frame = self.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}

#[cfg(feature = "video-opencv")]
mod opencv_backend {
    use super::{cannot_open, VideoStream};
    use crate::error::{AnnotatorError, Result};
    use crate::models::project::VideoProperties;
    use image::RgbImage;
    use opencv::{core::Mat, imgproc, prelude::*, videoio};
    use std::path::Path;

    /// Any container OpenCV's videoio can open.
    pub struct OpenCvVideo {
        capture: videoio::VideoCapture,
        properties: VideoProperties,
    }

    impl OpenCvVideo {
        pub fn open(path: &Path) -> Result<Self> {
            let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
                .map_err(|e| cannot_open(path, e.to_string()))?;
            if !capture.is_opened().unwrap_or(false) {
                return Err(cannot_open(path, "decoder could not open the container or codec"));
            }

            let properties = VideoProperties {
                width: capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
                height: capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
                frame_count: capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64,
                fps: capture.get(videoio::CAP_PROP_FPS)?,
            };

            Ok(Self { capture, properties })
        }
    }

    impl VideoStream for OpenCvVideo {
        fn properties(&self) -> VideoProperties {
            self.properties
        }

        fn seek(&mut self, index: u64) -> Result<()> {
            self.capture.set(videoio::CAP_PROP_POS_FRAMES, index as f64)?;
            Ok(())
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            let mut frame = Mat::default();
            if !self.capture.read(&mut frame)? || frame.empty() {
                return Ok(None);
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color(&frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
            let size = rgb.size()?;
            let data = rgb.data_bytes()?.to_vec();

            RgbImage::from_raw(size.width as u32, size.height as u32, data)
                .map(Some)
                .ok_or_else(|| AnnotatorError::VideoBackend("decoded frame has an unexpected layout".to_string()))
        }
    }
}

/// Loaded image data ready for display.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row major.
    pub pixels: Vec<u8>,
}

/// Load an extracted frame image from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
pub mod testing {
    //! Fixtures shared by the extraction and workflow tests.

    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};
    use std::fs::File;
    use std::path::Path;

    /// Write an animated GIF with `frames` distinct solid-color frames.
    pub fn write_gif(path: &Path, frames: usize, width: u32, height: u32, fps: u32) {
        let file = File::create(path).expect("create gif");
        let mut encoder = GifEncoder::new(file);
        let delay = Delay::from_numer_denom_ms(1000, fps);
        let frames = (0..frames).map(|i| {
            let shade = (i * 255 / frames.max(1)) as u8;
            let image = RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, (i % 2) as u8 * 200, 255]));
            Frame::from_parts(image, 0, 0, delay)
        });
        encoder.encode_frames(frames).expect("encode gif");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        testing::write_gif(&path, 30, 32, 24, 2);

        let properties = probe(&path).unwrap();
        assert_eq!(properties.width, 32);
        assert_eq!(properties.height, 24);
        assert_eq!(properties.frame_count, 30);
        assert!((properties.fps - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_gif_seek_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        testing::write_gif(&path, 4, 8, 8, 10);

        let mut stream = open_video(&path).unwrap();
        stream.seek(3).unwrap();
        assert!(stream.read_frame().unwrap().is_some());
        assert!(stream.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_unreadable_video_reports_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"definitely not a gif").unwrap();

        match probe(&path) {
            Err(AnnotatorError::CannotOpenVideo { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected CannotOpenVideo, got {:?}", other),
        }
    }
}
