// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated vsync loop that drives the composer on the software backend.
//!
//! Runs 60 frames of a three-layer scene (an RGB565 background, a moving
//! RGBA sprite, and a layer in a format the overlay engine cannot scan out),
//! adds and removes a layer part-way through, injects a failed write and a
//! failed swap, and blanks the screen for a few frames. Events go to both a
//! [`PrettyPrintSink`] and a [`RecorderSink`]; the recording is exported as a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use hwoverlay_backend_soft::{SoftGpu, SoftOverlay, SoftSubsystem, now, timebase};
use hwoverlay_core::composer::Composer;
use hwoverlay_core::config::ComposerConfig;
use hwoverlay_core::format::PixelFormat;
use hwoverlay_core::layer::{BufferRef, Layer, LayerList, PixelRect};
use hwoverlay_core::output::{GpuDisplay, GpuSurface};
use hwoverlay_core::trace::{
    ClassifyEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PrepareEvent, ResourceEvent,
    SwapEvent, TraceSink, TransferEvent, Tracer,
};

use hwoverlay_debug::dump::dump_list;
use hwoverlay_debug::pretty::PrettyPrintSink;
use hwoverlay_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 60;
const SCREEN_W: u32 = 320;
const SCREEN_H: u32 = 240;
const SPRITE: u32 = 32;

/// Frames at which the layer list changes shape.
const ADD_BADGE_AT: u64 = 20;
const REMOVE_BADGE_AT: u64 = 40;
const FAIL_WRITE_AT: u64 = 30;
const FAIL_SWAP_AT: u64 = 45;
const BLANK_FRAMES: core::ops::Range<u64> = 50..53;

/// Fans events out to a pretty printer and a recorder.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.pretty.on_prepare(e);
        self.recorder.on_prepare(e);
    }

    fn on_classify(&mut self, e: &ClassifyEvent) {
        self.pretty.on_classify(e);
        self.recorder.on_classify(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_swap(&mut self, e: &SwapEvent) {
        self.pretty.on_swap(e);
        self.recorder.on_swap(e);
    }

    fn on_transfer(&mut self, e: &TransferEvent) {
        self.pretty.on_transfer(e);
        self.recorder.on_transfer(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.recorder.on_frame_summary(s);
    }

    fn on_resource(&mut self, e: &ResourceEvent) {
        self.pretty.on_resource(e);
        self.recorder.on_resource(e);
    }
}

/// Builds a `width × height` image with rows padded to 32 bytes.
fn image(width: u32, height: u32, bpp: usize, px: impl Fn(u32, u32) -> Vec<u8>) -> Vec<u8> {
    let pitch = (width as usize * bpp).next_multiple_of(32);
    let mut out = vec![0; pitch * height as usize];
    for (y, row) in (0..height).zip(out.chunks_mut(pitch)) {
        for (x, p) in (0..width).zip(row.chunks_mut(bpp)) {
            p.copy_from_slice(&px(x, y));
        }
    }
    out
}

fn rgb565(r: u8, g: u8, b: u8) -> Vec<u8> {
    let v = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
    v.to_le_bytes().to_vec()
}

fn sprite_frame(frame_index: u64) -> PixelRect {
    let span = u64::from(SCREEN_W - SPRITE);
    let travel = frame_index * 5 % (2 * span);
    let x = if travel < span { travel } else { 2 * span - travel };
    let x = i32::try_from(x).unwrap_or(0);
    PixelRect::from_origin_size(x, 100, SPRITE, SPRITE)
}

fn full(width: u32, height: u32) -> PixelRect {
    PixelRect::from_origin_size(0, 0, width, height)
}

fn main() {
    let timebase = timebase();

    let background = image(SCREEN_W, SCREEN_H, 2, |x, y| {
        let r = u8::try_from(x * 255 / SCREEN_W).unwrap_or(u8::MAX);
        let g = u8::try_from(y * 255 / SCREEN_H).unwrap_or(u8::MAX);
        rgb565(r, g, 96)
    });
    let sprite = image(SPRITE, SPRITE, 4, |x, y| {
        let inside = x.abs_diff(16).pow(2) + y.abs_diff(16).pow(2) < 14 * 14;
        if inside { vec![255, 200, 0, 255] } else { vec![0, 0, 0, 0] }
    });
    let badge = image(48, 16, 4, |_, _| vec![0, 120, 255, 255]);
    let video = vec![0x80; 160 * 120 * 3 / 2];

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), timebase);
    let mut recorder = RecorderSink::new();

    // -- composer ----------------------------------------------------------
    let mut subsystem = SoftSubsystem::default();
    let mut composer = Composer::open(
        &mut subsystem,
        SoftGpu::new(),
        SoftOverlay::new(SCREEN_W, SCREEN_H),
        ComposerConfig::videocore(now),
    )
    .expect("failed to open the software display");

    let mut list = LayerList::new(
        vec![
            Layer::new(PixelFormat::Rgb565, BufferRef::new(&background))
                .with_source_crop(full(SCREEN_W, SCREEN_H))
                .with_display_frame(full(SCREEN_W, SCREEN_H)),
            Layer::new(PixelFormat::Rgba8888, BufferRef::new(&sprite))
                .with_source_crop(full(SPRITE, SPRITE))
                .with_display_frame(sprite_frame(0)),
            // NV12-style video: left to the GPU.
            Layer::new(PixelFormat::from_hal(0x11), BufferRef::new(&video))
                .with_source_crop(full(160, 120))
                .with_display_frame(PixelRect::from_origin_size(150, 10, 160, 120)),
        ],
        true,
    );

    let dpy = GpuDisplay(1);
    let sur = GpuSurface(1);

    // -- simulated loop ----------------------------------------------------
    for frame_index in 0..FRAME_COUNT {
        list.geometry_changed = frame_index == 0;
        match frame_index {
            ADD_BADGE_AT => {
                list.layers.push(
                    Layer::new(PixelFormat::Rgba8888, BufferRef::new(&badge))
                        .with_source_crop(full(48, 16))
                        .with_display_frame(PixelRect::from_origin_size(8, 8, 48, 16)),
                );
                list.geometry_changed = true;
            }
            REMOVE_BADGE_AT => {
                list.layers.pop();
                list.geometry_changed = true;
            }
            FAIL_WRITE_AT => {
                let next = composer.hardware().writes_attempted();
                composer.hardware_mut().fail_write_attempt(next);
            }
            FAIL_SWAP_AT => composer.gpu_mut().set_failing(true),
            _ => {}
        }
        list.layers[1].display_frame = sprite_frame(frame_index);

        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);

        composer.prepare_traced(Some(&mut list), &mut tracer);
        if list.geometry_changed {
            dump_list(&list, &mut std::io::stdout()).expect("failed to dump layers");
        }

        let result = if BLANK_FRAMES.contains(&frame_index) {
            composer.present_traced(None, None, None, &mut tracer)
        } else {
            composer.present_traced(Some(dpy), Some(sur), Some(&list), &mut tracer)
        };
        match result {
            Ok(report) => {
                for failed in report.failures() {
                    println!("frame {frame_index}: layer {} skipped", failed.layer_index);
                }
            }
            Err(e) => println!("frame {frame_index}: {e}"),
        }

        if frame_index == FAIL_SWAP_AT {
            composer.gpu_mut().set_failing(false);
        }
    }

    // -- results -----------------------------------------------------------
    let screen = composer.hardware().scanout();
    let lit = (0..SCREEN_H)
        .flat_map(|y| (0..SCREEN_W).map(move |x| (x, y)))
        .filter(|&(x, y)| screen.pixel(x, y).is_some_and(|p| p[3] != 0))
        .count();
    println!(
        "{} swaps, {} resources created, {} live, {lit} lit pixels",
        composer.gpu().swaps(),
        composer.hardware().created_total(),
        composer.hardware().live_resources(),
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    hwoverlay_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames)");
}
