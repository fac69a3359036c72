// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Borrowed pixel buffers.

use core::fmt;

/// A non-owning view of a layer's pixel memory.
///
/// The buffer producer owns the memory and controls its lifetime; the core
/// only reads from it during a single `present` call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferRef<'a> {
    bytes: &'a [u8],
}

impl<'a> BufferRef<'a> {
    /// Wraps a borrowed byte slice.
    #[inline]
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the borrowed bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the buffer in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl BufferRef<'static> {
    /// An empty buffer, for layers whose content is not yet available.
    pub const EMPTY: Self = Self { bytes: &[] };
}

impl fmt::Debug for BufferRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferRef({:p}, {} bytes)", self.bytes.as_ptr(), self.bytes.len())
    }
}
