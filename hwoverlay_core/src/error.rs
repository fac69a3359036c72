// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Errors are plain status values returned to the immediate caller. The core
//! keeps no error queue and never retries; retry policy belongs to the
//! driver.

use core::fmt;

/// The GPU buffer swap failed.
///
/// Fatal for the current frame: no overlay work is attempted after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapError;

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GPU buffer swap failed")
    }
}

impl core::error::Error for SwapError {}

/// Errors reported by overlay hardware calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwError {
    /// Resource allocation failed.
    CreateFailed(i32),
    /// Writing pixel data into a resource failed with the given status.
    WriteFailed(i32),
    /// Positioning a resource on the output failed with the given status.
    PlaceFailed(i32),
    /// The display with the given index could not be opened.
    DisplayOpenFailed(u32),
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed(code) => write!(f, "resource creation failed ({code})"),
            Self::WriteFailed(code) => write!(f, "resource write failed ({code})"),
            Self::PlaceFailed(code) => write!(f, "resource placement failed ({code})"),
            Self::DisplayOpenFailed(index) => write!(f, "could not open display {index}"),
        }
    }
}

impl core::error::Error for HwError {}

/// Why a single layer's overlay transfer was skipped.
///
/// Transfer errors never abort the frame; the remaining layers are still
/// processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// The display frame covers no pixels.
    EmptyDestination,
    /// A hardware call failed.
    Hardware(HwError),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDestination => f.write_str("display frame is empty"),
            Self::Hardware(e) => write!(f, "overlay transfer failed: {e}"),
        }
    }
}

impl core::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::EmptyDestination => None,
            Self::Hardware(e) => Some(e),
        }
    }
}

impl From<HwError> for TransferError {
    fn from(e: HwError) -> Self {
        Self::Hardware(e)
    }
}

/// Errors returned to the driver by the [`Composer`](crate::composer::Composer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposeError {
    /// The GPU swap failed; the frame was not presented.
    Swap(SwapError),
    /// Device bring-up failed.
    Open(HwError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swap(e) => write!(f, "EGL error: {e}"),
            Self::Open(e) => write!(f, "device open failed: {e}"),
        }
    }
}

impl core::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Swap(e) => Some(e),
            Self::Open(e) => Some(e),
        }
    }
}

impl From<SwapError> for ComposeError {
    fn from(e: SwapError) -> Self {
        Self::Swap(e)
    }
}
