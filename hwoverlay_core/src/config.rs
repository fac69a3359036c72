// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composer configuration.

use crate::geometry::DEFAULT_PITCH_ALIGNMENT;
use crate::hardware::OverlayAlpha;
use crate::time::HostTime;

/// Controls how the [`TransferEngine`](crate::transfer::TransferEngine)
/// manages hardware resources across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourcePolicy {
    /// Keep one resource per overlay layer and reuse it while the layer's
    /// image type and destination size stay the same.
    #[default]
    Reuse,
    /// Release and re-create every overlay resource on every transfer.
    Recreate,
}

/// Configuration for the [`Composer`](crate::composer::Composer).
#[derive(Clone, Copy, Debug)]
pub struct ComposerConfig {
    /// Index of the display opened at device-open time.
    pub display_index: u32,
    /// Row pitch alignment in bytes.
    pub pitch_alignment: u32,
    /// Resource lifecycle policy.
    pub resource_policy: ResourcePolicy,
    /// Alpha applied to every overlay placement.
    pub alpha: OverlayAlpha,
    /// Clock used to timestamp trace phases. Backends export a matching
    /// `now()` function.
    pub clock: fn() -> HostTime,
}

impl ComposerConfig {
    /// Defaults: display 0, 32-byte pitch alignment, reused resources,
    /// source alpha at opacity 120, and a clock that always reads zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            display_index: 0,
            pitch_alignment: DEFAULT_PITCH_ALIGNMENT,
            resource_policy: ResourcePolicy::Reuse,
            alpha: OverlayAlpha {
                from_source: true,
                opacity: 120,
            },
            clock: zero_clock,
        }
    }

    /// Configuration for `VideoCore` dispmanx hardware with the given clock.
    #[must_use]
    pub const fn videocore(clock: fn() -> HostTime) -> Self {
        Self {
            clock,
            ..Self::new()
        }
    }

    /// Returns this configuration with a different resource policy.
    #[must_use]
    pub const fn with_resource_policy(mut self, policy: ResourcePolicy) -> Self {
        self.resource_policy = policy;
        self
    }

    /// Returns this configuration with a different clock.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> HostTime) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn zero_clock() -> HostTime {
    HostTime(0)
}
