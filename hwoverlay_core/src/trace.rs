// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the composition cycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Composer`](crate::composer::Composer) calls at each stage of `prepare`
//! and `present`. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects phase timestamps and transfer outcomes
//! during a frame and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ResourceEvent`] and the
//!   corresponding `TraceSink` method.

use crate::error::TransferError;
use crate::format::{HwImageType, PixelFormat};
use crate::layer::{CompositionType, PixelRect};
use crate::output::DisplayHandle;
use crate::time::HostTime;

#[cfg(feature = "trace-rich")]
use crate::output::ResourceHandle;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the composition cycle is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Layer classification during `prepare`.
    Classify,
    /// GPU buffer swap during `present`.
    Swap,
    /// Overlay transfers during `present`.
    Overlay,
}

/// What happened to a pooled hardware resource.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    /// A new resource was allocated.
    Created,
    /// The existing resource was reused.
    Reused,
    /// The resource was released.
    Released,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when `prepare` is called with a layer list.
#[derive(Clone, Copy, Debug)]
pub struct PrepareEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of layers in the list.
    pub layer_count: u32,
    /// Whether the list's geometry changed, i.e. whether it is reclassified.
    pub geometry_changed: bool,
}

/// Emitted for every layer tagged during classification.
#[derive(Clone, Copy, Debug)]
pub struct ClassifyEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Position of the layer in the list.
    pub layer_index: u32,
    /// The layer's pixel format.
    pub format: PixelFormat,
    /// The tag written to the layer.
    pub composition: CompositionType,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after the GPU buffer swap returns.
#[derive(Clone, Copy, Debug)]
pub struct SwapEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether the swap succeeded.
    pub succeeded: bool,
}

/// Emitted after each overlay transfer attempt.
#[derive(Clone, Copy, Debug)]
pub struct TransferEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Position of the layer in the list.
    pub layer_index: u32,
    /// Native image type the layer was translated to.
    pub image_type: HwImageType,
    /// Row pitch used for the write, in bytes.
    pub row_pitch: u32,
    /// On-screen placement rectangle.
    pub placement: PixelRect,
    /// Why the transfer was skipped, if it was.
    pub error: Option<TransferError>,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Overlay display the frame targeted.
    pub display: DisplayHandle,
    /// Host time when `present` started.
    pub started_at: HostTime,
    /// Number of layers in the list.
    pub layer_count: u32,
    /// Number of layers tagged for the overlay path.
    pub overlay_layers: u32,
    /// Number of overlay transfers attempted.
    pub transfers_attempted: u32,
    /// Number of overlay transfers that failed.
    pub transfers_failed: u32,
    /// Swap phase duration in ticks (0 if not measured).
    pub swap_ticks: u64,
    /// Overlay phase duration in ticks (0 if not measured).
    pub overlay_ticks: u64,
    /// Whether the GPU swap failed.
    pub swap_failed: bool,
}

/// A pooled resource lifecycle record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ResourceEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Layer slot the resource belongs to.
    pub layer_index: u32,
    /// The resource.
    pub resource: ResourceHandle,
    /// What happened to it.
    pub action: ResourceAction,
    /// Resource width.
    pub width: u32,
    /// Resource height.
    pub height: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the composition cycle.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when `prepare` receives a layer list.
    fn on_prepare(&mut self, e: &PrepareEvent) {
        _ = e;
    }

    /// Called for each classified layer.
    fn on_classify(&mut self, e: &ClassifyEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after the GPU swap.
    fn on_swap(&mut self, e: &SwapEvent) {
        _ = e;
    }

    /// Called after each overlay transfer attempt.
    fn on_transfer(&mut self, e: &TransferEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called for pooled resource lifecycle changes (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_resource(&mut self, e: &ResourceEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PrepareEvent`].
    #[inline]
    pub fn prepare(&mut self, e: &PrepareEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_prepare(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClassifyEvent`].
    #[inline]
    pub fn classify(&mut self, e: &ClassifyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_classify(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SwapEvent`].
    #[inline]
    pub fn swap(&mut self, e: &SwapEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_swap(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransferEvent`].
    #[inline]
    pub fn transfer(&mut self, e: &TransferEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transfer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`ResourceEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn resource(&mut self, e: &ResourceEvent) {
        if let Some(s) = &mut self.sink {
            s.on_resource(e);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps and transfer outcomes during a frame and
/// produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    display: DisplayHandle,
    started_at: HostTime,
    layer_count: u32,
    overlay_layers: u32,
    transfers_attempted: u32,
    transfers_failed: u32,
    phase_starts: [Option<HostTime>; 3],
    phase_ends: [Option<HostTime>; 3],
    swap_failed: bool,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(frame_index: u64, display: DisplayHandle, started_at: HostTime) -> Self {
        Self {
            frame_index,
            display,
            started_at,
            layer_count: 0,
            overlay_layers: 0,
            transfers_attempted: 0,
            transfers_failed: 0,
            phase_starts: [None; 3],
            phase_ends: [None; 3],
            swap_failed: false,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Records the layer counts of the frame's list.
    pub fn set_layers(&mut self, layer_count: u32, overlay_layers: u32) {
        self.layer_count = layer_count;
        self.overlay_layers = overlay_layers;
    }

    /// Records one transfer attempt.
    pub fn record_transfer(&mut self, succeeded: bool) {
        self.transfers_attempted += 1;
        if !succeeded {
            self.transfers_failed += 1;
        }
    }

    /// Sets whether the GPU swap failed.
    pub fn set_swap_failed(&mut self, failed: bool) {
        self.swap_failed = failed;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame_index,
            display: self.display,
            started_at: self.started_at,
            layer_count: self.layer_count,
            overlay_layers: self.overlay_layers,
            transfers_attempted: self.transfers_attempted,
            transfers_failed: self.transfers_failed,
            swap_ticks: self.phase_duration(PhaseKind::Swap),
            overlay_ticks: self.phase_duration(PhaseKind::Overlay),
            swap_failed: self.swap_failed,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Classify => 0,
        PhaseKind::Swap => 1,
        PhaseKind::Overlay => 2,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transfer() -> TransferEvent {
        TransferEvent {
            frame_index: 42,
            layer_index: 2,
            image_type: HwImageType::Rgba32,
            row_pitch: 2560,
            placement: PixelRect::new(0, 0, 640, 480),
            error: None,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_prepare(&PrepareEvent {
            frame_index: 0,
            layer_count: 3,
            geometry_changed: true,
        });
        sink.on_transfer(&sample_transfer());
        sink.on_frame_summary(&FrameSummaryBuilder::new(0, DisplayHandle(0), HostTime(0)).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.swap(&SwapEvent {
            frame_index: 1,
            succeeded: true,
        });
        tracer.transfer(&sample_transfer());
    }

    #[test]
    fn summary_builder_computes_durations_and_counts() {
        let mut builder = FrameSummaryBuilder::new(42, DisplayHandle(3), HostTime(1_000_000));
        builder.set_layers(3, 2);
        builder.phase_begin(PhaseKind::Swap, HostTime(1_000_000));
        builder.phase_end(PhaseKind::Swap, HostTime(1_000_400));
        builder.phase_begin(PhaseKind::Overlay, HostTime(1_000_400));
        builder.record_transfer(false);
        builder.record_transfer(true);
        builder.phase_end(PhaseKind::Overlay, HostTime(1_002_000));

        let summary = builder.finish();
        assert_eq!(summary.swap_ticks, 400);
        assert_eq!(summary.overlay_ticks, 1600);
        assert_eq!(summary.transfers_attempted, 2);
        assert_eq!(summary.transfers_failed, 1);
        assert_eq!(summary.overlay_layers, 2);
        assert_eq!(summary.display, DisplayHandle(3));
        assert!(!summary.swap_failed);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(7, DisplayHandle(0), HostTime(5)).finish();
        assert_eq!(summary.swap_ticks, 0);
        assert_eq!(summary.overlay_ticks, 0);
        assert_eq!(summary.transfers_attempted, 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            layers: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_transfer(&mut self, e: &TransferEvent) {
                self.layers.push(e.layer_index);
            }
        }

        let mut sink = RecordingSink { layers: Vec::new() };
        {
            let mut tracer = Tracer::new(&mut sink);
            tracer.transfer(&sample_transfer());
        }
        assert_eq!(sink.layers, &[2]);
    }
}
