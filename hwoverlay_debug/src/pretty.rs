// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use hwoverlay_core::time::{HostTime, Timebase};
use hwoverlay_core::trace::{
    ClassifyEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PrepareEvent,
    ResourceAction, ResourceEvent, SwapEvent, TraceSink, TransferEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn phase_name(p: PhaseKind) -> &'static str {
    match p {
        PhaseKind::Classify => "classify",
        PhaseKind::Swap => "swap",
        PhaseKind::Overlay => "overlay",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        let _ = writeln!(
            self.writer,
            "[prepare] frame={} layers={} geometry_changed={}",
            e.frame_index, e.layer_count, e.geometry_changed,
        );
    }

    fn on_classify(&mut self, e: &ClassifyEvent) {
        let _ = writeln!(
            self.writer,
            "[classify] frame={} layer={} format={:?} -> {:?}",
            e.frame_index, e.layer_index, e.format, e.composition,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[{}:begin] frame={} at {:.1}µs",
            phase_name(e.phase),
            e.frame_index,
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[{}:end] frame={} at {:.1}µs",
            phase_name(e.phase),
            e.frame_index,
            self.host_us(e.timestamp),
        );
    }

    fn on_swap(&mut self, e: &SwapEvent) {
        let status = if e.succeeded { "ok" } else { "FAILED" };
        let _ = writeln!(self.writer, "[swap] frame={} {status}", e.frame_index);
    }

    fn on_transfer(&mut self, e: &TransferEvent) {
        let p = e.placement;
        let status = match e.error {
            None => "ok".to_owned(),
            Some(err) => format!("skipped: {err}"),
        };
        let _ = writeln!(
            self.writer,
            "[transfer] frame={} layer={} type={} pitch={} at {{{},{},{},{}}} {status}",
            e.frame_index, e.layer_index, e.image_type, e.row_pitch, p.left, p.top, p.right, p.bottom,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let swap = if s.swap_failed { "FAILED" } else { "ok" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} display={:?} layers={} overlays={} transfers={}/{} \
             swap={:.1}µs overlay={:.1}µs swap_status={swap}",
            s.frame_index,
            s.display,
            s.layer_count,
            s.overlay_layers,
            s.transfers_attempted - s.transfers_failed.min(s.transfers_attempted),
            s.transfers_attempted,
            self.ticks_to_us(s.swap_ticks),
            self.ticks_to_us(s.overlay_ticks),
        );
    }

    fn on_resource(&mut self, e: &ResourceEvent) {
        let action = match e.action {
            ResourceAction::Created => "created",
            ResourceAction::Reused => "reused",
            ResourceAction::Released => "released",
        };
        let _ = writeln!(
            self.writer,
            "[resource] frame={} layer={} {:?} {action} {}x{}",
            e.frame_index, e.layer_index, e.resource, e.width, e.height,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwoverlay_core::error::{HwError, TransferError};
    use hwoverlay_core::format::HwImageType;
    use hwoverlay_core::layer::PixelRect;
    use hwoverlay_core::output::DisplayHandle;

    fn sink() -> PrettyPrintSink<Vec<u8>> {
        PrettyPrintSink::with_writer(Vec::new(), Timebase::NANOS)
    }

    #[test]
    fn pretty_print_swap_failure() {
        let mut sink = sink();
        sink.on_swap(&SwapEvent {
            frame_index: 4,
            succeeded: false,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[swap] frame=4 FAILED\n");
    }

    #[test]
    fn pretty_print_transfer_reports_reason() {
        let mut sink = sink();
        sink.on_transfer(&TransferEvent {
            frame_index: 1,
            layer_index: 2,
            image_type: HwImageType::Rgb565,
            row_pitch: 224,
            placement: PixelRect::new(10, 20, 110, 70),
            error: Some(TransferError::Hardware(HwError::WriteFailed(-2))),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("layer=2"), "got: {output}");
        assert!(output.contains("pitch=224"), "got: {output}");
        assert!(output.contains("{10,20,110,70}"), "got: {output}");
        assert!(output.contains("skipped: overlay transfer failed"), "got: {output}");
    }

    #[test]
    fn pretty_print_summary_counts_successes() {
        let mut sink = sink();
        sink.on_frame_summary(&FrameSummary {
            frame_index: 3,
            display: DisplayHandle(0),
            started_at: HostTime(0),
            layer_count: 4,
            overlay_layers: 3,
            transfers_attempted: 3,
            transfers_failed: 1,
            swap_ticks: 1_500,
            overlay_ticks: 0,
            swap_failed: false,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("transfers=2/3"), "got: {output}");
        assert!(output.contains("swap=1.5µs"), "got: {output}");
    }
}
