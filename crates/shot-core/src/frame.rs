//! Camera frame types.
//!
//! A [`Frame`] is one captured image plus the metadata describing it.  Frame
//! analysis is allowed to look at the pixels, but nothing downstream keeps
//! them: once a frame has been analysed its payload is discarded with
//! [`Frame::discard`] and only the [`FrameInfo`] survives.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing a [`Frame`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("pixel buffer is {actual} bytes, expected {expected} for {width}x{height} {format:?}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },
}

/// Pixel layout of a frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit red, green, blue; 3 bytes per pixel.
    Rgb8,
    /// 8-bit luminance; 1 byte per pixel.
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Which way the selected camera faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensFacing {
    /// Faces away from the user.  The default selector.
    #[default]
    Back,
    /// Faces the user.
    Front,
    /// A camera that is neither (USB webcams, capture cards).
    External,
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LensFacing::Back => "back",
            LensFacing::Front => "front",
            LensFacing::External => "external",
        };
        f.write_str(s)
    }
}

impl FromStr for LensFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(LensFacing::Back),
            "front" => Ok(LensFacing::Front),
            "external" => Ok(LensFacing::External),
            other => Err(format!("unknown lens facing '{other}' (expected back, front or external)")),
        }
    }
}

/// Frame metadata without the pixel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// 1-based position of the frame within its capture run.
    pub sequence: u64,
    /// Time since the frame source started.
    pub captured_at: Duration,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// One captured camera image.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    info: FrameInfo,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a pixel buffer, validating its length against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::EmptyDimensions`] for a zero width or height and
    /// [`FrameError::BufferSizeMismatch`] if `data` has the wrong length.
    pub fn new(
        sequence: u64,
        captured_at: Duration,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(FrameError::BufferSizeMismatch {
                width,
                height,
                format,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            info: FrameInfo {
                sequence,
                captured_at,
                width,
                height,
                format,
            },
            data,
        })
    }

    /// A black grayscale frame, used by synthetic sources and tests.
    ///
    /// Zero dimensions are clamped to one pixel.
    pub fn blank(sequence: u64, captured_at: Duration, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            info: FrameInfo {
                sequence,
                captured_at,
                width,
                height,
                format: PixelFormat::Gray8,
            },
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn info(&self) -> FrameInfo {
        self.info
    }

    pub fn sequence(&self) -> u64 {
        self.info.sequence
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Drops the pixel payload and returns the metadata.
    pub fn discard(self) -> FrameInfo {
        self.info
    }
}

// Payloads are large; print only the metadata.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("info", &self.info)
            .field("bytes", &self.data.len())
            .finish()
    }
}
