// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame overlay decision and transfer core for fixed-function display
//! engines.
//!
//! `hwoverlay_core` sits between a windowing stack and a hardware
//! overlay/scaler engine. Each frame it receives the ordered list of visible
//! layers, decides which of them the overlay engine can scan out directly, and
//! moves the pixels of those layers into hardware resources. Everything else
//! is left for the GPU to composite into the framebuffer. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Display server
//!       │  LayerList (geometry_changed?)
//!       ▼
//!   Composer::prepare() ──► classify × N ──► CompositionType tags
//!       │
//!       ▼  (server renders FRAMEBUFFER layers with the GPU)
//!   Composer::present()
//!       │
//!       ├─► GpuPresenter::swap_buffers()      (aborts the frame on failure)
//!       │
//!       └─► for each OVERLAY layer, in list order:
//!             geometry::plan() ──► format::to_hardware_format()
//!                 ──► TransferEngine::transfer() ──► OverlayHardware
//! ```
//!
//! **[`layer`]** — Per-frame layer descriptors, the layer list, and the
//! composition tag written during classification.
//!
//! **[`format`]** — Capability classifier and pixel-format translator.
//!
//! **[`geometry`]** — Crop/destination rectangle planning and row pitch.
//!
//! **[`transfer`]** — The hardware transfer engine and its per-layer
//! resource pool.
//!
//! **[`composer`]** — The frame orchestrator exposing `prepare` and
//! `present`.
//!
//! **[`hardware`]** — Collaborator traits implemented by backend crates
//! (GPU swap, overlay resources, subsystem bring-up).
//!
//! **[`config`]** — [`ComposerConfig`](config::ComposerConfig) presets.
//!
//! **[`error`]** — Error types surfaced to the driver.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Threading
//!
//! The core is single-threaded and synchronous. `prepare` and `present` are
//! called on the compositor's callback thread once per frame, in that order.
//! Hardware calls are blocking; a stuck driver call blocks the frame. There
//! is no internal locking; hosts that dispatch frames from several threads
//! must serialize access to the [`Composer`](composer::Composer) themselves.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-resource
//!   lifecycle events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod composer;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod hardware;
pub mod layer;
pub mod output;
pub mod time;
pub mod trace;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;
