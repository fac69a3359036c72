// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for hwoverlay
//! diagnostics.
//!
//! This crate provides [`TraceSink`](hwoverlay_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] prints human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] keeps a compact binary recording, read back
//!   with [`recorder::decode`].
//! - [`chrome::export`] writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! [`dump::LayerDump`] formats individual layers for log output.

pub mod chrome;
pub mod dump;
pub mod pretty;
pub mod recorder;
