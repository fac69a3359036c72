// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][trace-format] JSON to the given writer.
//!
//! Phases become duration (`B`/`E`) events. Swap, transfer, and summary
//! records become instant events stamped with the most recent phase
//! timestamp, since they carry no time of their own.
//!
//! [trace-format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use hwoverlay_core::time::Timebase;
use hwoverlay_core::trace::PhaseKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Prepare and classify records are not exported.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0_f64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Prepare(_) | RecordedEvent::Classify(_) => {}
            RecordedEvent::PhaseBegin(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "B",
                    "name": phase_name(e.phase),
                    "cat": "Composer",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "frame_index": e.frame_index }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "E",
                    "name": phase_name(e.phase),
                    "cat": "Composer",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "frame_index": e.frame_index }
                }));
            }
            RecordedEvent::Swap(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Swap",
                    "cat": "Gpu",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "succeeded": e.succeeded,
                    }
                }));
            }
            RecordedEvent::Transfer(e) => {
                let p = e.placement;
                events.push(json!({
                    "ph": "i",
                    "name": "Transfer",
                    "cat": "Overlay",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "layer_index": e.layer_index,
                        "image_type": e.image_type.to_string(),
                        "row_pitch": e.row_pitch,
                        "placement": [p.left, p.top, p.right, p.bottom],
                        "error": e.error.map(|err| err.to_string()),
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Composer",
                    "ts": ticks_to_us(s.started_at.ticks(), timebase),
                    "pid": s.display.0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "layer_count": s.layer_count,
                        "overlay_layers": s.overlay_layers,
                        "transfers_attempted": s.transfers_attempted,
                        "transfers_failed": s.transfers_failed,
                        "swap_us": ticks_to_us(s.swap_ticks, timebase),
                        "overlay_us": ticks_to_us(s.overlay_ticks, timebase),
                        "swap_failed": s.swap_failed,
                    }
                }));
            }
            RecordedEvent::Resource(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Resource{:?}", e.action),
                    "cat": "Rich",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "layer_index": e.layer_index,
                        "resource": e.resource.0,
                        "width": e.width,
                        "height": e.height,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn phase_name(p: PhaseKind) -> &'static str {
    match p {
        PhaseKind::Classify => "Classify",
        PhaseKind::Swap => "Swap",
        PhaseKind::Overlay => "Overlay",
    }
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
