// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Emulated GPU swap and subsystem bring-up.

use hwoverlay_core::error::{HwError, SwapError};
use hwoverlay_core::hardware::{GpuPresenter, HwSubsystem};
use hwoverlay_core::output::{DisplayHandle, GpuDisplay, GpuSurface};

/// A [`GpuPresenter`] that counts swaps and can be told to fail them.
#[derive(Clone, Debug, Default)]
pub struct SoftGpu {
    swaps: u64,
    failing: bool,
    last_target: Option<(GpuDisplay, GpuSurface)>,
}

impl SoftGpu {
    /// Creates a presenter whose swaps succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent swaps fail (`true`) or succeed (`false`).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Number of swaps attempted, successful or not.
    #[must_use]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Display and surface of the most recent swap attempt.
    #[must_use]
    pub fn last_target(&self) -> Option<(GpuDisplay, GpuSurface)> {
        self.last_target
    }
}

impl GpuPresenter for SoftGpu {
    fn swap_buffers(&mut self, display: GpuDisplay, surface: GpuSurface) -> Result<(), SwapError> {
        self.swaps += 1;
        self.last_target = Some((display, surface));
        if self.failing { Err(SwapError) } else { Ok(()) }
    }
}

/// An [`HwSubsystem`] exposing a fixed number of displays.
#[derive(Clone, Debug)]
pub struct SoftSubsystem {
    displays: u32,
    init_calls: u32,
    initialized: bool,
}

impl SoftSubsystem {
    /// Creates a subsystem with `displays` displays, numbered from 0.
    #[must_use]
    pub fn new(displays: u32) -> Self {
        Self {
            displays,
            init_calls: 0,
            initialized: false,
        }
    }

    /// Number of times [`init`](HwSubsystem::init) was called.
    #[must_use]
    pub fn init_calls(&self) -> u32 {
        self.init_calls
    }

    /// Whether the subsystem has been initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for SoftSubsystem {
    fn default() -> Self {
        Self::new(1)
    }
}

impl HwSubsystem for SoftSubsystem {
    fn init(&mut self) {
        self.init_calls += 1;
        self.initialized = true;
    }

    fn open_display(&mut self, index: u32) -> Result<DisplayHandle, HwError> {
        if !self.initialized || index >= self.displays {
            return Err(HwError::DisplayOpenFailed(index));
        }
        Ok(DisplayHandle(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_swaps_still_count() {
        let mut gpu = SoftGpu::new();
        assert_eq!(gpu.swap_buffers(GpuDisplay(1), GpuSurface(2)), Ok(()));
        gpu.set_failing(true);
        assert_eq!(gpu.swap_buffers(GpuDisplay(1), GpuSurface(3)), Err(SwapError));
        assert_eq!(gpu.swaps(), 2);
        assert_eq!(gpu.last_target(), Some((GpuDisplay(1), GpuSurface(3))));
    }

    #[test]
    fn display_requires_init() {
        let mut sys = SoftSubsystem::new(2);
        assert_eq!(sys.open_display(0), Err(HwError::DisplayOpenFailed(0)));
        sys.init();
        sys.init();
        assert_eq!(sys.init_calls(), 2);
        assert_eq!(sys.open_display(1), Ok(DisplayHandle(1)));
        assert_eq!(sys.open_display(2), Err(HwError::DisplayOpenFailed(2)));
    }
}
