// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording test doubles for the collaborator traits.

use alloc::vec::Vec;

use crate::error::{HwError, SwapError};
use crate::format::HwImageType;
use crate::hardware::{GpuPresenter, HwSubsystem, OverlayAlpha, OverlayHardware};
use crate::layer::{BufferRef, PixelRect};
use crate::output::{DisplayHandle, GpuDisplay, GpuSurface, ResourceHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HwCall {
    Create {
        image_type: HwImageType,
        width: u32,
        height: u32,
    },
    Write {
        resource: ResourceHandle,
        pitch: u32,
        rect: PixelRect,
        len: usize,
    },
    Place {
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
    },
    Release {
        resource: ResourceHandle,
    },
}

/// Records every hardware call. Writes fail when `fail_writes` is set or
/// when the zero-based write attempt index is listed in `fail_write_attempts`.
///
/// Frame brackets are counted rather than recorded in `calls`; placements and
/// releases made outside a bracket are counted in `unbatched`.
#[derive(Debug, Default)]
pub(crate) struct RecordingHardware {
    pub(crate) calls: Vec<HwCall>,
    pub(crate) fail_writes: bool,
    pub(crate) fail_creates: bool,
    pub(crate) fail_write_attempts: Vec<usize>,
    pub(crate) writes: usize,
    pub(crate) next: u32,
    pub(crate) live: Vec<ResourceHandle>,
    pub(crate) frames_begun: usize,
    pub(crate) frames_ended: usize,
    pub(crate) in_frame: bool,
    pub(crate) unbatched: usize,
}

impl RecordingHardware {
    pub(crate) fn created_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Create { .. }))
            .count()
    }

    /// Destination rectangles of placed resources, in call order.
    pub(crate) fn placements(&self) -> Vec<PixelRect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Place { dest, .. } => Some(*dest),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn write_attempts(&self) -> usize {
        self.writes
    }

    pub(crate) fn live(&self) -> Vec<ResourceHandle> {
        self.live.clone()
    }

    /// Stacking positions of placed resources, in call order.
    pub(crate) fn stacking(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Place { z, .. } => Some(*z),
                _ => None,
            })
            .collect()
    }

    fn note_output_change(&mut self) {
        if !self.in_frame {
            self.unbatched += 1;
        }
    }
}

impl OverlayHardware for RecordingHardware {
    fn begin_frame(&mut self) {
        assert!(!self.in_frame, "frames must not nest");
        self.frames_begun += 1;
        self.in_frame = true;
    }

    fn end_frame(&mut self) {
        assert!(self.in_frame, "end_frame without begin_frame");
        self.frames_ended += 1;
        self.in_frame = false;
    }

    fn create_resource(
        &mut self,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<ResourceHandle, HwError> {
        self.calls.push(HwCall::Create {
            image_type,
            width,
            height,
        });
        if self.fail_creates {
            return Err(HwError::CreateFailed(-1));
        }
        self.next += 1;
        let handle = ResourceHandle(self.next);
        self.live.push(handle);
        Ok(handle)
    }

    fn write_resource(
        &mut self,
        resource: ResourceHandle,
        _image_type: HwImageType,
        pitch: u32,
        src: BufferRef<'_>,
        rect: PixelRect,
    ) -> Result<(), HwError> {
        self.calls.push(HwCall::Write {
            resource,
            pitch,
            rect,
            len: src.len(),
        });
        let attempt = self.writes;
        self.writes += 1;
        if self.fail_writes || self.fail_write_attempts.contains(&attempt) {
            return Err(HwError::WriteFailed(-2));
        }
        Ok(())
    }

    fn place_resource(
        &mut self,
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
        _alpha: OverlayAlpha,
    ) -> Result<(), HwError> {
        self.note_output_change();
        self.calls.push(HwCall::Place { resource, dest, z });
        Ok(())
    }

    fn release_resource(&mut self, resource: ResourceHandle) {
        self.note_output_change();
        self.calls.push(HwCall::Release { resource });
        self.live.retain(|&r| r != resource);
    }
}

/// Counts swaps; fails them while `fail` is set.
#[derive(Debug, Default)]
pub(crate) struct ScriptedGpu {
    pub(crate) swaps: usize,
    pub(crate) fail: bool,
}

impl GpuPresenter for ScriptedGpu {
    fn swap_buffers(&mut self, _display: GpuDisplay, _surface: GpuSurface) -> Result<(), SwapError> {
        self.swaps += 1;
        if self.fail { Err(SwapError) } else { Ok(()) }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeSubsystem {
    pub(crate) inits: usize,
    pub(crate) opened: Vec<u32>,
    pub(crate) fail_open: bool,
}

impl HwSubsystem for FakeSubsystem {
    fn init(&mut self) {
        self.inits += 1;
    }

    fn open_display(&mut self, index: u32) -> Result<DisplayHandle, HwError> {
        if self.fail_open {
            return Err(HwError::DisplayOpenFailed(index));
        }
        self.opened.push(index);
        Ok(DisplayHandle(index + 100))
    }
}
