// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Transfer errors are stored as a kind byte plus the driver status code, so
//! a decoded [`TransferEvent`] compares equal to the one that was recorded.

use hwoverlay_core::error::{HwError, TransferError};
use hwoverlay_core::format::{HwImageType, PixelFormat};
use hwoverlay_core::layer::{CompositionType, PixelRect};
use hwoverlay_core::output::{DisplayHandle, ResourceHandle};
use hwoverlay_core::time::HostTime;
use hwoverlay_core::trace::{
    ClassifyEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PrepareEvent,
    ResourceAction, ResourceEvent, SwapEvent, TraceSink, TransferEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PREPARE: u8 = 1;
const TAG_CLASSIFY: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_SWAP: u8 = 5;
const TAG_TRANSFER: u8 = 6;
const TAG_FRAME_SUMMARY: u8 = 7;
const TAG_RESOURCE: u8 = 8;

const ERR_NONE: u8 = 0;
const ERR_EMPTY_DESTINATION: u8 = 1;
const ERR_CREATE: u8 = 2;
const ERR_WRITE: u8 = 3;
const ERR_PLACE: u8 = 4;
const ERR_DISPLAY_OPEN: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_rect(&mut self, r: PixelRect) {
        self.write_i32(r.left);
        self.write_i32(r.top);
        self.write_i32(r.right);
        self.write_i32(r.bottom);
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Classify => 0,
            PhaseKind::Swap => 1,
            PhaseKind::Overlay => 2,
        });
    }

    fn write_image_type(&mut self, t: HwImageType) {
        self.write_u8(match t {
            HwImageType::Rgb565 => 0,
            HwImageType::Rgbx8888 => 1,
            HwImageType::Rgba32 => 2,
        });
    }

    fn write_composition(&mut self, c: CompositionType) {
        self.write_u8(match c {
            CompositionType::Framebuffer => 0,
            CompositionType::Overlay => 1,
        });
    }

    fn write_transfer_error(&mut self, e: Option<TransferError>) {
        let (kind, code) = match e {
            None => (ERR_NONE, 0),
            Some(TransferError::EmptyDestination) => (ERR_EMPTY_DESTINATION, 0),
            Some(TransferError::Hardware(HwError::CreateFailed(c))) => (ERR_CREATE, c),
            Some(TransferError::Hardware(HwError::WriteFailed(c))) => (ERR_WRITE, c),
            Some(TransferError::Hardware(HwError::PlaceFailed(c))) => (ERR_PLACE, c),
            Some(TransferError::Hardware(HwError::DisplayOpenFailed(index))) => {
                (ERR_DISPLAY_OPEN, index.cast_signed())
            }
        };
        self.write_u8(kind);
        self.write_i32(code);
    }
}

impl TraceSink for RecorderSink {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.write_u8(TAG_PREPARE);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_count);
        self.write_bool(e.geometry_changed);
    }

    fn on_classify(&mut self, e: &ClassifyEvent) {
        self.write_u8(TAG_CLASSIFY);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_u32(e.format.to_hal());
        self.write_composition(e.composition);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_swap(&mut self, e: &SwapEvent) {
        self.write_u8(TAG_SWAP);
        self.write_u64(e.frame_index);
        self.write_bool(e.succeeded);
    }

    fn on_transfer(&mut self, e: &TransferEvent) {
        self.write_u8(TAG_TRANSFER);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_image_type(e.image_type);
        self.write_u32(e.row_pitch);
        self.write_rect(e.placement);
        self.write_transfer_error(e.error);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.display.0);
        self.write_u64(s.started_at.ticks());
        self.write_u32(s.layer_count);
        self.write_u32(s.overlay_layers);
        self.write_u32(s.transfers_attempted);
        self.write_u32(s.transfers_failed);
        self.write_u64(s.swap_ticks);
        self.write_u64(s.overlay_ticks);
        self.write_bool(s.swap_failed);
    }

    fn on_resource(&mut self, e: &ResourceEvent) {
        self.write_u8(TAG_RESOURCE);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_u32(e.resource.0);
        self.write_u8(match e.action {
            ResourceAction::Created => 0,
            ResourceAction::Reused => 1,
            ResourceAction::Released => 2,
        });
        self.write_u32(e.width);
        self.write_u32(e.height);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PrepareEvent`].
    Prepare(PrepareEvent),
    /// A [`ClassifyEvent`].
    Classify(ClassifyEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`SwapEvent`].
    Swap(SwapEvent),
    /// A [`TransferEvent`].
    Transfer(TransferEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// A [`ResourceEvent`].
    Resource(ResourceEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes: [u8; N] = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_rect(&mut self) -> Option<PixelRect> {
        Some(PixelRect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Classify,
            1 => PhaseKind::Swap,
            _ => PhaseKind::Overlay,
        })
    }

    fn read_image_type(&mut self) -> Option<HwImageType> {
        Some(match self.read_u8()? {
            0 => HwImageType::Rgb565,
            1 => HwImageType::Rgbx8888,
            _ => HwImageType::Rgba32,
        })
    }

    fn read_composition(&mut self) -> Option<CompositionType> {
        Some(match self.read_u8()? {
            0 => CompositionType::Framebuffer,
            _ => CompositionType::Overlay,
        })
    }

    fn read_transfer_error(&mut self) -> Option<Option<TransferError>> {
        let kind = self.read_u8()?;
        let code = self.read_i32()?;
        Some(match kind {
            ERR_NONE => None,
            ERR_EMPTY_DESTINATION => Some(TransferError::EmptyDestination),
            ERR_CREATE => Some(HwError::CreateFailed(code).into()),
            ERR_WRITE => Some(HwError::WriteFailed(code).into()),
            ERR_PLACE => Some(HwError::PlaceFailed(code).into()),
            ERR_DISPLAY_OPEN => Some(HwError::DisplayOpenFailed(code.cast_unsigned()).into()),
            _ => return None,
        })
    }

    fn decode_prepare(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Prepare(PrepareEvent {
            frame_index: self.read_u64()?,
            layer_count: self.read_u32()?,
            geometry_changed: self.read_bool()?,
        }))
    }

    fn decode_classify(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Classify(ClassifyEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            format: PixelFormat::from_hal(self.read_u32()?),
            composition: self.read_composition()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_swap(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Swap(SwapEvent {
            frame_index: self.read_u64()?,
            succeeded: self.read_bool()?,
        }))
    }

    fn decode_transfer(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Transfer(TransferEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            image_type: self.read_image_type()?,
            row_pitch: self.read_u32()?,
            placement: self.read_rect()?,
            error: self.read_transfer_error()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            display: DisplayHandle(self.read_u32()?),
            started_at: HostTime(self.read_u64()?),
            layer_count: self.read_u32()?,
            overlay_layers: self.read_u32()?,
            transfers_attempted: self.read_u32()?,
            transfers_failed: self.read_u32()?,
            swap_ticks: self.read_u64()?,
            overlay_ticks: self.read_u64()?,
            swap_failed: self.read_bool()?,
        }))
    }

    fn decode_resource(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Resource(ResourceEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            resource: ResourceHandle(self.read_u32()?),
            action: match self.read_u8()? {
                0 => ResourceAction::Created,
                1 => ResourceAction::Reused,
                _ => ResourceAction::Released,
            },
            width: self.read_u32()?,
            height: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PREPARE => self.decode_prepare(),
            TAG_CLASSIFY => self.decode_classify(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_SWAP => self.decode_swap(),
            TAG_TRANSFER => self.decode_transfer(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_RESOURCE => self.decode_resource(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 7,
            display: DisplayHandle(3),
            started_at: HostTime(1_000_000),
            layer_count: 4,
            overlay_layers: 2,
            transfers_attempted: 2,
            transfers_failed: 1,
            swap_ticks: 900,
            overlay_ticks: 2_400,
            swap_failed: false,
        }
    }

    #[test]
    fn classify_keeps_unknown_formats() {
        let mut rec = RecorderSink::new();
        rec.on_classify(&ClassifyEvent {
            frame_index: 2,
            layer_index: 1,
            format: PixelFormat::Other(0x7f),
            composition: CompositionType::Framebuffer,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::Classify(e) => {
                assert_eq!(e.layer_index, 1);
                assert_eq!(e.format, PixelFormat::Other(0x7f));
                assert_eq!(e.composition, CompositionType::Framebuffer);
            }
            other => panic!("expected Classify, got {other:?}"),
        }
    }

    #[test]
    fn classify_with_supported_code_in_other_reads_back_equal() {
        let mut rec = RecorderSink::new();
        rec.on_classify(&ClassifyEvent {
            frame_index: 0,
            layer_index: 0,
            format: PixelFormat::Other(4),
            composition: CompositionType::Overlay,
        });

        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::Classify(e)) => {
                assert_eq!(e.format, PixelFormat::Other(4));
                assert!(matches!(e.format, PixelFormat::Rgb565));
            }
            other => panic!("expected Classify, got {other:?}"),
        }
    }

    #[test]
    fn transfer_error_codes_survive_recording() {
        let mut rec = RecorderSink::new();
        let placement = PixelRect::new(10, 20, 110, 70);
        for error in [
            None,
            Some(TransferError::EmptyDestination),
            Some(TransferError::Hardware(HwError::WriteFailed(-7))),
            Some(TransferError::Hardware(HwError::CreateFailed(3))),
        ] {
            rec.on_transfer(&TransferEvent {
                frame_index: 9,
                layer_index: 2,
                image_type: HwImageType::Rgba32,
                row_pitch: 416,
                placement,
                error,
            });
        }

        let errors: Vec<_> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::Transfer(t) => {
                    assert_eq!(t.placement, placement);
                    assert_eq!(t.row_pitch, 416);
                    assert_eq!(t.image_type, HwImageType::Rgba32);
                    t.error
                }
                other => panic!("expected Transfer, got {other:?}"),
            })
            .collect();
        assert_eq!(
            errors,
            [
                None,
                Some(TransferError::EmptyDestination),
                Some(TransferError::Hardware(HwError::WriteFailed(-7))),
                Some(TransferError::Hardware(HwError::CreateFailed(3))),
            ]
        );
    }

    #[test]
    fn frame_summary_fields_decode() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::FrameSummary(s)] => {
                assert_eq!(s.display, DisplayHandle(3));
                assert_eq!(s.started_at, HostTime(1_000_000));
                assert_eq!(s.transfers_failed, 1);
                assert_eq!(s.overlay_ticks, 2_400);
                assert!(!s.swap_failed);
            }
            other => panic!("expected one FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn frame_sequence_keeps_order() {
        let mut rec = RecorderSink::new();
        rec.on_prepare(&PrepareEvent {
            frame_index: 7,
            layer_count: 4,
            geometry_changed: true,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 7,
            phase: PhaseKind::Swap,
            timestamp: HostTime(1000),
        });
        rec.on_swap(&SwapEvent {
            frame_index: 7,
            succeeded: false,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 7,
            phase: PhaseKind::Swap,
            timestamp: HostTime(1900),
        });
        rec.on_resource(&ResourceEvent {
            frame_index: 7,
            layer_index: 0,
            resource: ResourceHandle(12),
            action: ResourceAction::Released,
            width: 64,
            height: 32,
        });
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], RecordedEvent::Prepare(p) if p.geometry_changed));
        assert!(matches!(events[1], RecordedEvent::PhaseBegin(_)));
        assert!(matches!(events[2], RecordedEvent::Swap(s) if !s.succeeded));
        assert!(matches!(events[3], RecordedEvent::PhaseEnd(_)));
        assert!(matches!(
            events[4],
            RecordedEvent::Resource(r) if r.action == ResourceAction::Released && r.width == 64
        ));
        assert!(matches!(events[5], RecordedEvent::FrameSummary(_)));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_swap(&SwapEvent {
            frame_index: 1,
            succeeded: true,
        });
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RecordedEvent::Swap(_)));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
