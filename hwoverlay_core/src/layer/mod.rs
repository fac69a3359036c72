// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame layer data model.
//!
//! A *layer* is one visible surface: a pixel buffer, the crop window into that
//! buffer, and the rectangle on screen where it should appear. The windowing
//! server hands the core a fresh, ordered [`LayerList`] every frame; the core
//! never keeps layers across frames.
//!
//! - [`Layer`] carries the per-surface attributes. The only field the core
//!   writes is [`Layer::composition`], set during classification.
//! - [`LayerList`] preserves the server's order. Overlay transfers happen in
//!   list order, so a later layer overdraws an earlier one at the same screen
//!   location.
//! - [`BufferRef`] borrows the producer's pixel memory without taking
//!   ownership.

mod buffer;
mod descriptor;
mod rect;

pub use buffer::BufferRef;
pub use descriptor::{CompositionType, Layer, LayerList};
pub use rect::PixelRect;
