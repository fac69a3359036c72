// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `VideoCore` dispmanx backend for hwoverlay.
//!
//! This crate binds the collaborator traits of `hwoverlay_core` to a
//! Raspberry Pi class display stack:
//!
//! - [`BcmHost`] calls `bcm_host_init` and `vc_dispmanx_display_open`
//! - [`DispmanxOverlay`] manages dispmanx resources and elements, batching
//!   each frame's changes into one update
//! - [`EglPresenter`] wraps `eglSwapBuffers`
//! - [`now`] and [`timebase`] read `CLOCK_MONOTONIC`
//!
//! It links against `libbcm_host` and `libEGL`. The library directory
//! defaults to `/opt/vc/lib` and can be overridden with `VC_LIB_DIR` at build
//! time. The crate is not a default workspace member; build it with
//! `cargo build -p hwoverlay_backend_dispmanx`.

#![expect(
    unsafe_code,
    reason = "dispmanx backend requires FFI to the VideoCore host libraries"
)]

mod egl;
mod ffi;
mod host;
mod overlay;
mod time;

pub use egl::EglPresenter;
pub use host::BcmHost;
pub use overlay::{
    DispmanxOverlay, STATUS_NULL_HANDLE, STATUS_SHORT_SOURCE, STATUS_UNKNOWN_RESOURCE,
};
pub use time::{now, timebase};

use hwoverlay_core::composer::Composer;
use hwoverlay_core::config::ComposerConfig;
use hwoverlay_core::error::ComposeError;
use hwoverlay_core::hardware::HwSubsystem;

/// Initializes the host interface, opens `config.display_index`, and returns
/// a composer driving it.
///
/// The overlay engine needs the display handle before the composer exists,
/// so this replaces [`Composer::open`] for this backend.
pub fn open_composer(
    host: &mut BcmHost,
    config: ComposerConfig,
) -> Result<Composer<EglPresenter, DispmanxOverlay>, ComposeError> {
    host.init();
    let display = host
        .open_display(config.display_index)
        .map_err(ComposeError::Open)?;
    Ok(Composer::new(
        display,
        EglPresenter,
        DispmanxOverlay::new(display),
        config,
    ))
}
