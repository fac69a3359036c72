// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-line layer dumps.
//!
//! [`LayerDump`] formats a [`Layer`] as
//!
//! ```text
//! type=1, flags=00000000, handle=0x55d0c8a1b2c0, tr=00, blend=0100, {0,0,64,32}, {10,20,74,52}
//! ```
//!
//! listing the composition tag, the opaque hints, the buffer address, the
//! source crop, and the display frame.

use std::fmt;
use std::io::{self, Write};

use hwoverlay_core::layer::{CompositionType, Layer, LayerList, PixelRect};

/// [`Display`](fmt::Display) adapter for a single layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerDump<'l, 'a>(pub &'l Layer<'a>);

impl fmt::Display for LayerDump<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = self.0;
        let kind = match l.composition {
            CompositionType::Framebuffer => 0,
            CompositionType::Overlay => 1,
        };
        write!(
            f,
            "type={kind}, flags={:08x}, handle={:p}, tr={:02x}, blend={:04x}, ",
            l.flags,
            l.buffer.as_bytes().as_ptr(),
            l.transform,
            l.blending,
        )?;
        write_rect(f, l.source_crop)?;
        f.write_str(", ")?;
        write_rect(f, l.display_frame)
    }
}

fn write_rect(f: &mut fmt::Formatter<'_>, r: PixelRect) -> fmt::Result {
    write!(f, "{{{},{},{},{}}}", r.left, r.top, r.right, r.bottom)
}

/// Writes one tab-indented dump line per layer of `list`.
pub fn dump_list(list: &LayerList<'_>, writer: &mut dyn Write) -> io::Result<()> {
    for layer in &list.layers {
        writeln!(writer, "\t{}", LayerDump(layer))?;
    }
    Ok(())
}
