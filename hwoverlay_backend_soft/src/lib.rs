// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software backend for hwoverlay.
//!
//! This crate emulates the hardware a [`Composer`](hwoverlay_core::composer::Composer)
//! drives, entirely in host memory:
//!
//! - [`SoftOverlay`] keeps overlay resources with real pixel storage and
//!   pitch-aware writes, and composes placed elements in stacking order
//!   (clipped to the screen with `kurbo`)
//! - [`SoftGpu`] is a GPU swap that can be scripted to fail
//! - [`SoftSubsystem`] does idempotent bring-up with a fixed set of displays
//! - [`now`] and [`timebase`] give a monotonic nanosecond host clock
//!
//! It backs the integration tests and the frame demo, and is a reference for
//! what a driver binding has to provide.

mod gpu;
mod overlay;
mod time;

pub use gpu::{SoftGpu, SoftSubsystem};
pub use overlay::{
    Rgba, STATUS_BAD_RECT, STATUS_INJECTED, STATUS_NO_MEMORY, STATUS_NO_RESOURCE,
    STATUS_SHORT_SOURCE, Screen, SoftOverlay,
};
pub use time::{now, timebase};
