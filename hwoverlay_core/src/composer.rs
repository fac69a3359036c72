// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame orchestration: the `prepare` and `present` entry points.
//!
//! The [`Composer`] is constructed once at device-open time and handed to the
//! display server integration, which drives it once per displayed frame:
//!
//! ```rust,ignore
//! fn on_vsync(list: &mut LayerList<'_>) -> Result<(), ComposeError> {
//!     // Decide which layers the overlay engine takes.
//!     composer.prepare(Some(list));
//!
//!     // ... render every FRAMEBUFFER layer with the GPU ...
//!
//!     // Swap the GPU framebuffer, then transfer every OVERLAY layer.
//!     let report = composer.present(Some(egl_display), Some(egl_surface), Some(list))?;
//!     for failed in report.failures() {
//!         // The layer keeps whatever was on screen last frame.
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # State machine
//!
//! ```text
//!            prepare(list, geometry_changed)          present(..)
//!   IDLE ───────────────────────────────► CLASSIFYING ──► IDLE ───────► PRESENTING ──► IDLE
//! ```
//!
//! Both calls are synchronous, so the composer is observably [`Idle`] between
//! calls. There is no terminal state.
//!
//! [`Idle`]: ComposerState::Idle

use alloc::vec::Vec;
use core::fmt;

use crate::config::ComposerConfig;
use crate::error::{ComposeError, SwapError, TransferError};
use crate::format::{self, classify};
use crate::geometry;
use crate::hardware::{GpuPresenter, HwSubsystem, OverlayHardware};
use crate::layer::{CompositionType, LayerList};
use crate::output::{DisplayHandle, GpuDisplay, GpuSurface, ResourceHandle};
use crate::trace::{
    ClassifyEvent, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PrepareEvent,
    SwapEvent, TransferEvent, Tracer,
};
use crate::transfer::{TransferEngine, TransferPlan, Transferred};

#[cfg(feature = "trace-rich")]
use crate::trace::{ResourceAction, ResourceEvent};

/// Where the composer is in its per-frame cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ComposerState {
    /// Waiting for the next call.
    #[default]
    Idle,
    /// Tagging layers during `prepare`.
    Classifying,
    /// Swapping and transferring during `present`.
    Presenting,
}

/// Outcome of one overlay layer's transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerTransfer {
    /// Position of the layer in the list.
    pub layer_index: usize,
    /// What the transfer engine returned.
    pub result: Result<Transferred, TransferError>,
}

/// What happened during one successful `present` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter of the presented frame.
    pub frame_index: u64,
    /// Whether the GPU framebuffer was swapped.
    pub swapped: bool,
    /// Every overlay transfer attempted, in list order.
    pub transfers: Vec<LayerTransfer>,
    /// Pooled resources released because their layer left the overlay path.
    pub released: Vec<ResourceHandle>,
}

impl FrameReport {
    /// Indices of the layers that received a transfer attempt, in order.
    #[must_use]
    pub fn attempted_layers(&self) -> Vec<usize> {
        self.transfers.iter().map(|t| t.layer_index).collect()
    }

    /// Transfers that failed.
    pub fn failures(&self) -> impl Iterator<Item = &LayerTransfer> {
        self.transfers.iter().filter(|t| t.result.is_err())
    }
}

/// The overlay composer: owns the GPU presenter, the overlay hardware, and
/// the transfer engine's resource pool.
///
/// Pooled resources are released when the composer is dropped.
pub struct Composer<G: GpuPresenter, H: OverlayHardware> {
    gpu: G,
    hardware: H,
    display: DisplayHandle,
    config: ComposerConfig,
    engine: TransferEngine,
    state: ComposerState,
    frame_index: u64,
}

impl<G: GpuPresenter, H: OverlayHardware> fmt::Debug for Composer<G, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("display", &self.display)
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("state", &self.state)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl<G: GpuPresenter, H: OverlayHardware> Composer<G, H> {
    /// Brings up the hardware subsystem and opens the configured display.
    ///
    /// `init` is called before `open_display`; subsystems must tolerate
    /// repeated initialization.
    pub fn open<S>(
        subsystem: &mut S,
        gpu: G,
        hardware: H,
        config: ComposerConfig,
    ) -> Result<Self, ComposeError>
    where
        S: HwSubsystem + ?Sized,
    {
        subsystem.init();
        let display = subsystem
            .open_display(config.display_index)
            .map_err(ComposeError::Open)?;
        Ok(Self::new(display, gpu, hardware, config))
    }

    /// Creates a composer for an already opened display.
    #[must_use]
    pub fn new(display: DisplayHandle, gpu: G, hardware: H, config: ComposerConfig) -> Self {
        Self {
            gpu,
            hardware,
            display,
            engine: TransferEngine::new(config.resource_policy, config.alpha),
            config,
            state: ComposerState::Idle,
            frame_index: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Number of `present` calls so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The display opened at construction.
    #[must_use]
    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// The GPU presenter.
    #[must_use]
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    /// Mutable access to the GPU presenter.
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// The overlay hardware.
    #[must_use]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Mutable access to the overlay hardware.
    ///
    /// Resources held by the transfer engine's pool must not be released
    /// through this reference.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// The transfer engine and its resource pool.
    #[must_use]
    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    /// Classifies every layer when the list's geometry changed.
    ///
    /// An absent or empty list, or one whose geometry did not change, is left
    /// untouched: the previous frame's tags stay authoritative.
    pub fn prepare(&mut self, list: Option<&mut LayerList<'_>>) {
        self.prepare_traced(list, &mut Tracer::none());
    }

    /// [`prepare`](Self::prepare) with trace instrumentation.
    pub fn prepare_traced(&mut self, list: Option<&mut LayerList<'_>>, tracer: &mut Tracer<'_>) {
        let Some(list) = list else {
            return;
        };
        if list.is_empty() {
            return;
        }

        let frame_index = self.frame_index;
        tracer.prepare(&PrepareEvent {
            frame_index,
            layer_count: index_u32(list.len()),
            geometry_changed: list.geometry_changed,
        });
        if !list.geometry_changed {
            return;
        }

        self.state = ComposerState::Classifying;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Classify,
            timestamp: (self.config.clock)(),
        });

        for (i, layer) in list.layers.iter_mut().enumerate() {
            layer.composition = if classify(layer.format) {
                CompositionType::Overlay
            } else {
                CompositionType::Framebuffer
            };
            tracer.classify(&ClassifyEvent {
                frame_index,
                layer_index: index_u32(i),
                format: layer.format,
                composition: layer.composition,
            });
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Classify,
            timestamp: (self.config.clock)(),
        });
        self.state = ComposerState::Idle;
    }

    /// Swaps the GPU framebuffer, then transfers every overlay-tagged layer in
    /// list order.
    ///
    /// Without a list, overlay composition is disabled for this frame: with
    /// both handles present only the swap is performed, and with either
    /// handle absent (screen power-down) nothing happens.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Swap`] if the swap fails, in which case no
    /// overlay transfer is attempted and the overlay hardware is not touched.
    /// Otherwise every placement and release of the frame happens inside one
    /// [`begin_frame`](OverlayHardware::begin_frame) /
    /// [`end_frame`](OverlayHardware::end_frame) bracket. Per-layer transfer failures are not
    /// errors; they are listed in the returned [`FrameReport`].
    pub fn present(
        &mut self,
        display: Option<GpuDisplay>,
        surface: Option<GpuSurface>,
        list: Option<&LayerList<'_>>,
    ) -> Result<FrameReport, ComposeError> {
        self.present_traced(display, surface, list, &mut Tracer::none())
    }

    /// [`present`](Self::present) with trace instrumentation.
    pub fn present_traced(
        &mut self,
        display: Option<GpuDisplay>,
        surface: Option<GpuSurface>,
        list: Option<&LayerList<'_>>,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameReport, ComposeError> {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut report = FrameReport {
            frame_index,
            ..FrameReport::default()
        };

        let Some(list) = list else {
            if let (Some(display), Some(surface)) = (display, surface) {
                self.state = ComposerState::Presenting;
                let swapped = self.swap(frame_index, display, surface, tracer);
                self.state = ComposerState::Idle;
                swapped?;
                report.swapped = true;
            }
            return Ok(report);
        };

        self.state = ComposerState::Presenting;
        let mut summary =
            FrameSummaryBuilder::new(frame_index, self.display, (self.config.clock)());
        summary.set_layers(
            index_u32(list.len()),
            index_u32(list.layers.iter().filter(|l| l.is_overlay()).count()),
        );

        let t0 = (self.config.clock)();
        summary.phase_begin(PhaseKind::Swap, t0);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Swap,
            timestamp: t0,
        });
        let swapped = match (display, surface) {
            (Some(display), Some(surface)) => self.swap(frame_index, display, surface, tracer),
            _ => {
                tracer.swap(&SwapEvent {
                    frame_index,
                    succeeded: false,
                });
                Err(SwapError)
            }
        };
        let t1 = (self.config.clock)();
        summary.phase_end(PhaseKind::Swap, t1);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Swap,
            timestamp: t1,
        });

        if let Err(e) = swapped {
            summary.set_swap_failed(true);
            tracer.frame_summary(&summary.finish());
            self.state = ComposerState::Idle;
            return Err(e.into());
        }
        report.swapped = true;

        self.hardware.begin_frame();
        summary.phase_begin(PhaseKind::Overlay, t1);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Overlay,
            timestamp: t1,
        });

        for (i, layer) in list.layers.iter().enumerate() {
            if !layer.is_overlay() {
                continue;
            }
            let geometry = geometry::plan(layer.source_crop, layer.display_frame);
            let image_type = format::to_hardware_format(layer.format);
            let plan = TransferPlan {
                geometry,
                image_type,
                row_pitch: geometry.row_pitch(image_type, self.config.pitch_alignment),
            };
            let slot = index_u32(i);
            let result = self
                .engine
                .transfer(&mut self.hardware, slot, layer.buffer, &plan);

            summary.record_transfer(result.is_ok());
            tracer.transfer(&TransferEvent {
                frame_index,
                layer_index: slot,
                image_type,
                row_pitch: plan.row_pitch,
                placement: geometry.placement(),
                error: result.err(),
            });
            #[cfg(feature = "trace-rich")]
            if let Ok(done) = &result {
                emit_acquire(tracer, frame_index, slot, done, &geometry);
            }

            report.transfers.push(LayerTransfer {
                layer_index: i,
                result,
            });
        }

        let released = self.engine.sweep(&mut self.hardware, |slot| {
            list.layers
                .get(slot as usize)
                .is_some_and(|l| l.is_overlay())
        });
        #[cfg(feature = "trace-rich")]
        for &(slot, resource) in &released {
            tracer.resource(&ResourceEvent {
                frame_index,
                layer_index: slot,
                resource,
                action: ResourceAction::Released,
                width: 0,
                height: 0,
            });
        }
        report.released = released.into_iter().map(|(_, r)| r).collect();
        self.hardware.end_frame();

        let t2 = (self.config.clock)();
        summary.phase_end(PhaseKind::Overlay, t2);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Overlay,
            timestamp: t2,
        });
        tracer.frame_summary(&summary.finish());

        self.state = ComposerState::Idle;
        Ok(report)
    }

    fn swap(
        &mut self,
        frame_index: u64,
        display: GpuDisplay,
        surface: GpuSurface,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SwapError> {
        let result = self.gpu.swap_buffers(display, surface);
        tracer.swap(&SwapEvent {
            frame_index,
            succeeded: result.is_ok(),
        });
        result
    }
}

impl<G: GpuPresenter, H: OverlayHardware> Drop for Composer<G, H> {
    fn drop(&mut self) {
        if self.engine.pooled() == 0 {
            return;
        }
        self.hardware.begin_frame();
        self.engine.release_all(&mut self.hardware);
        self.hardware.end_frame();
    }
}

#[cfg(feature = "trace-rich")]
fn emit_acquire(
    tracer: &mut Tracer<'_>,
    frame_index: u64,
    slot: u32,
    done: &Transferred,
    geometry: &geometry::Geometry,
) {
    if let Some(old) = done.released {
        tracer.resource(&ResourceEvent {
            frame_index,
            layer_index: slot,
            resource: old,
            action: ResourceAction::Released,
            width: 0,
            height: 0,
        });
    }
    tracer.resource(&ResourceEvent {
        frame_index,
        layer_index: slot,
        resource: done.resource,
        action: if done.created {
            ResourceAction::Created
        } else {
            ResourceAction::Reused
        },
        width: geometry.dest_width,
        height: geometry.dest_height,
    });
}

fn index_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::error::HwError;
    use crate::format::PixelFormat;
    use crate::layer::{BufferRef, Layer, PixelRect};
    use crate::testing::{FakeSubsystem, HwCall, RecordingHardware, ScriptedGpu};

    const DPY: Option<GpuDisplay> = Some(GpuDisplay(0x10));
    const SUR: Option<GpuSurface> = Some(GpuSurface(0x20));

    type TestComposer = Composer<ScriptedGpu, RecordingHardware>;

    fn composer() -> TestComposer {
        Composer::new(
            DisplayHandle(0),
            ScriptedGpu::default(),
            RecordingHardware::default(),
            ComposerConfig::new(),
        )
    }

    fn layer(format: PixelFormat, x: i32) -> Layer<'static> {
        Layer::new(format, BufferRef::EMPTY)
            .with_source_crop(PixelRect::new(0, 0, 16, 16))
            .with_display_frame(PixelRect::new(x, 0, x + 16, 16))
    }

    fn scenario_list() -> LayerList<'static> {
        LayerList::new(
            vec![
                layer(PixelFormat::Rgb565, 0),
                layer(PixelFormat::Other(0x7f), 100),
                layer(PixelFormat::Rgba8888, 200),
            ],
            true,
        )
    }

    const TAGS: [CompositionType; 3] = [
        CompositionType::Overlay,
        CompositionType::Framebuffer,
        CompositionType::Overlay,
    ];

    #[test]
    fn open_initializes_and_opens_configured_display() {
        let mut subsystem = FakeSubsystem::default();
        let config = ComposerConfig {
            display_index: 2,
            ..ComposerConfig::new()
        };
        let c = Composer::open(
            &mut subsystem,
            ScriptedGpu::default(),
            RecordingHardware::default(),
            config,
        )
        .unwrap();
        assert_eq!(subsystem.inits, 1);
        assert_eq!(subsystem.opened, vec![2]);
        assert_eq!(c.display(), DisplayHandle(102));
        assert_eq!(c.state(), ComposerState::Idle);
    }

    #[test]
    fn open_reports_display_failure() {
        let mut subsystem = FakeSubsystem {
            fail_open: true,
            ..FakeSubsystem::default()
        };
        let err = Composer::open(
            &mut subsystem,
            ScriptedGpu::default(),
            RecordingHardware::default(),
            ComposerConfig::new(),
        )
        .unwrap_err();
        assert_eq!(err, ComposeError::Open(HwError::DisplayOpenFailed(0)));
    }

    #[test]
    fn prepare_tags_supported_formats_as_overlay() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        assert_eq!(list.compositions(), TAGS);
        assert_eq!(c.state(), ComposerState::Idle);
    }

    #[test]
    fn prepare_without_geometry_change_keeps_tags() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));

        // Second frame: caller reuses the list, flips the flag off, and
        // scribbles a tag that must survive.
        list.geometry_changed = false;
        list.layers[1].format = PixelFormat::Rgb565;
        c.prepare(Some(&mut list));
        c.prepare(Some(&mut list));
        assert_eq!(list.compositions(), TAGS);
    }

    #[test]
    fn prepare_ignores_absent_and_empty_lists() {
        let mut c = composer();
        c.prepare(None);
        let mut empty = LayerList::new(Vec::new(), true);
        c.prepare(Some(&mut empty));
        assert!(empty.is_empty());
        assert_eq!(c.state(), ComposerState::Idle);
    }

    #[test]
    fn present_transfers_overlay_layers_in_order() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));

        let report = c.present(DPY, SUR, Some(&list)).unwrap();
        assert!(report.swapped);
        assert_eq!(c.gpu().swaps, 1);
        assert_eq!(report.attempted_layers(), vec![0, 2]);
        assert_eq!(
            c.hardware().placements(),
            vec![PixelRect::new(0, 0, 16, 16), PixelRect::new(200, 0, 216, 16)]
        );
        assert_eq!(c.state(), ComposerState::Idle);
    }

    #[test]
    fn framebuffer_layers_never_reach_the_engine() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        list.layers.iter_mut().for_each(|l| {
            l.composition = CompositionType::Framebuffer;
        });

        let report = c.present(DPY, SUR, Some(&list)).unwrap();
        assert!(report.transfers.is_empty());
        assert!(c.hardware().calls.is_empty());
    }

    #[test]
    fn transfer_failure_does_not_stop_later_layers() {
        let mut c = Composer::new(
            DisplayHandle(0),
            ScriptedGpu::default(),
            RecordingHardware {
                fail_write_attempts: vec![0],
                ..RecordingHardware::default()
            },
            ComposerConfig::new(),
        );
        let mut list = LayerList::new(
            (0..4).map(|i| layer(PixelFormat::Rgbx8888, i * 20)).collect(),
            true,
        );
        c.prepare(Some(&mut list));

        let report = c.present(DPY, SUR, Some(&list)).unwrap();
        assert_eq!(report.attempted_layers(), vec![0, 1, 2, 3]);
        assert_eq!(report.failures().count(), 1);
        assert!(report.transfers[0].result.is_err());
        assert_eq!(c.hardware().write_attempts(), 4);
        assert_eq!(c.hardware().placements().len(), 3);
    }

    #[test]
    fn swap_failure_short_circuits_overlay_work() {
        let mut c = Composer::new(
            DisplayHandle(0),
            ScriptedGpu {
                fail: true,
                ..ScriptedGpu::default()
            },
            RecordingHardware::default(),
            ComposerConfig::new(),
        );
        let mut list = scenario_list();
        c.prepare(Some(&mut list));

        let err = c.present(DPY, SUR, Some(&list)).unwrap_err();
        assert_eq!(err, ComposeError::Swap(SwapError));
        assert!(c.hardware().calls.is_empty(), "no transfer after a failed swap");
        assert_eq!(c.hardware().frames_begun, 0, "no output update is opened");
        assert_eq!(c.state(), ComposerState::Idle);
    }

    #[test]
    fn missing_handles_with_list_is_a_swap_error() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        let err = c.present(None, SUR, Some(&list)).unwrap_err();
        assert_eq!(err, ComposeError::Swap(SwapError));
        assert_eq!(c.gpu().swaps, 0);
        assert!(c.hardware().calls.is_empty());
    }

    #[test]
    fn null_list_with_handles_only_swaps() {
        let mut c = composer();
        let report = c.present(DPY, SUR, None).unwrap();
        assert!(report.swapped);
        assert_eq!(c.gpu().swaps, 1);
        assert!(c.hardware().calls.is_empty());
    }

    #[test]
    fn null_list_returns_the_swap_result() {
        let mut c = Composer::new(
            DisplayHandle(0),
            ScriptedGpu {
                fail: true,
                ..ScriptedGpu::default()
            },
            RecordingHardware::default(),
            ComposerConfig::new(),
        );
        assert_eq!(
            c.present(DPY, SUR, None).unwrap_err(),
            ComposeError::Swap(SwapError)
        );
        assert_eq!(c.gpu().swaps, 1);
    }

    #[test]
    fn power_down_frame_is_a_no_op() {
        let mut c = composer();
        let report = c.present(None, None, None).unwrap();
        assert!(!report.swapped);
        assert_eq!(c.gpu().swaps, 0);
        let report = c.present(DPY, None, None).unwrap();
        assert!(!report.swapped);
        assert_eq!(c.gpu().swaps, 0);
    }

    #[test]
    fn steady_frames_reuse_resources() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        c.present(DPY, SUR, Some(&list)).unwrap();

        list.geometry_changed = false;
        c.prepare(Some(&mut list));
        let report = c.present(DPY, SUR, Some(&list)).unwrap();

        assert_eq!(list.compositions(), TAGS);
        assert_eq!(report.attempted_layers(), vec![0, 2]);
        assert_eq!(c.hardware().created_count(), 2);
        assert_eq!(c.engine().pooled(), 2);
        assert_eq!(c.frame_index(), 2);
    }

    #[test]
    fn layers_leaving_the_overlay_path_release_resources() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        c.present(DPY, SUR, Some(&list)).unwrap();
        let dropped = c.engine().resource_for(2).unwrap();

        // Layer 2 is removed from the list.
        list.layers.truncate(2);
        list.geometry_changed = true;
        c.prepare(Some(&mut list));
        let report = c.present(DPY, SUR, Some(&list)).unwrap();

        assert_eq!(report.released, vec![dropped]);
        assert!(
            c.hardware()
                .calls
                .contains(&HwCall::Release { resource: dropped })
        );
        assert_eq!(c.engine().pooled(), 1);
    }

    #[test]
    fn drop_releases_every_pooled_resource() {
        let mut hw = RecordingHardware::default();
        {
            let mut c = Composer::new(
                DisplayHandle(0),
                ScriptedGpu::default(),
                &mut hw,
                ComposerConfig::new(),
            );
            let mut list = scenario_list();
            c.prepare(Some(&mut list));
            c.present(DPY, SUR, Some(&list)).unwrap();
            assert_eq!(c.hardware().live().len(), 2);
        }
        assert!(hw.live().is_empty(), "device close releases the pool");
        assert_eq!(hw.unbatched, 0, "close releases inside one update");
        assert_eq!((hw.frames_begun, hw.frames_ended), (2, 2));
    }

    #[test]
    fn frame_changes_form_one_output_update() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        c.present(DPY, SUR, Some(&list)).unwrap();
        assert_eq!(c.hardware().frames_begun, 1);
        assert_eq!(c.hardware().frames_ended, 1);

        // Reallocate layer 0 and drop layer 2 in the same frame.
        list.layers[0].display_frame = PixelRect::new(0, 0, 32, 32);
        list.layers.truncate(2);
        list.geometry_changed = true;
        c.prepare(Some(&mut list));
        let report = c.present(DPY, SUR, Some(&list)).unwrap();

        assert_eq!(report.released.len(), 1);
        assert_eq!(c.hardware().frames_begun, 2);
        assert_eq!(c.hardware().frames_ended, 2);
        assert!(!c.hardware().in_frame);
        assert_eq!(
            c.hardware().unbatched, 0,
            "placements and releases stay inside the frame bracket"
        );
    }

    #[test]
    fn null_list_frames_leave_overlay_hardware_alone() {
        let mut c = composer();
        c.present(DPY, SUR, None).unwrap();
        c.present(None, None, None).unwrap();
        assert_eq!(c.hardware().frames_begun, 0);
    }

    #[test]
    fn stacking_follows_list_position() {
        let mut c = composer();
        let mut list = scenario_list();
        c.prepare(Some(&mut list));
        c.present(DPY, SUR, Some(&list)).unwrap();
        assert_eq!(c.hardware().stacking(), vec![0, 2]);

        // Stacking does not drift with the number of frames presented.
        list.geometry_changed = false;
        for _ in 0..5 {
            c.present(DPY, SUR, Some(&list)).unwrap();
        }
        assert_eq!(c.hardware().stacking()[10..], [0, 2]);
    }

    #[test]
    fn row_pitch_follows_translated_format() {
        let mut c = composer();
        let mut list = LayerList::new(
            vec![
                Layer::new(PixelFormat::Rgba8888, BufferRef::EMPTY)
                    .with_source_crop(PixelRect::new(0, 0, 10, 10))
                    .with_display_frame(PixelRect::new(0, 0, 10, 10)),
            ],
            true,
        );
        c.prepare(Some(&mut list));
        c.present(DPY, SUR, Some(&list)).unwrap();
        assert!(c.hardware().calls.iter().any(|call| matches!(
            call,
            HwCall::Write { pitch: 64, .. }
        )));
    }
}
