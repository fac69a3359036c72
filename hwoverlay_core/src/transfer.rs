// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware transfer engine.
//!
//! [`TransferEngine`] moves one overlay layer's pixels into a hardware
//! resource and positions that resource on the output:
//!
//! 1. Acquire a resource sized to the destination rectangle in the layer's
//!    native image type, reusing the layer's pooled resource when possible.
//! 2. Write the layer buffer into the resource through the rectangle
//!    `(0, 0)`–`(src_width, src_height)`, using the planned row pitch as the
//!    source stride.
//! 3. Place the resource at the display frame origin with the destination
//!    size, stacked by the layer's position in the list.
//!
//! A failure at any step skips the layer for this frame and is returned to
//! the caller; nothing is retried.
//!
//! # Resource pool
//!
//! The engine owns every handle it creates. Pooled resources are keyed by
//! layer slot (the layer's position in the list). A slot keeps its resource
//! while the image type and destination size stay the same and gets a fresh
//! one otherwise. [`sweep`](TransferEngine::sweep) releases resources of
//! slots that left the overlay path; [`release_all`](TransferEngine::release_all)
//! empties the pool at device close.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::config::ResourcePolicy;
use crate::error::TransferError;
use crate::format::HwImageType;
use crate::geometry::Geometry;
use crate::hardware::{OverlayAlpha, OverlayHardware};
use crate::layer::{BufferRef, PixelRect};
use crate::output::ResourceHandle;

/// Everything the engine needs to transfer one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    /// Source and destination sizes.
    pub geometry: Geometry,
    /// Native image type of the resource.
    pub image_type: HwImageType,
    /// Source stride in bytes.
    pub row_pitch: u32,
}

/// Result of a successful transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transferred {
    /// The resource now holding the layer's pixels.
    pub resource: ResourceHandle,
    /// Where the resource was placed on the output.
    pub placement: PixelRect,
    /// Whether the resource was allocated by this transfer.
    pub created: bool,
    /// A previously pooled resource released to make room, if any.
    pub released: Option<ResourceHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PoolEntry {
    resource: ResourceHandle,
    image_type: HwImageType,
    width: u32,
    height: u32,
}

impl PoolEntry {
    fn fits(&self, image_type: HwImageType, width: u32, height: u32) -> bool {
        self.image_type == image_type && self.width == width && self.height == height
    }
}

/// Transfers overlay layers into pooled hardware resources.
#[derive(Debug)]
pub struct TransferEngine {
    policy: ResourcePolicy,
    alpha: OverlayAlpha,
    pool: HashMap<u32, PoolEntry>,
}

impl TransferEngine {
    /// Creates an engine with an empty pool.
    #[must_use]
    pub fn new(policy: ResourcePolicy, alpha: OverlayAlpha) -> Self {
        Self {
            policy,
            alpha,
            pool: HashMap::new(),
        }
    }

    /// Number of pooled resources.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Returns the resource currently pooled for `slot`, if any.
    #[must_use]
    pub fn resource_for(&self, slot: u32) -> Option<ResourceHandle> {
        self.pool.get(&slot).map(|e| e.resource)
    }

    /// Transfers `buffer` into the resource for `slot` and places it.
    ///
    /// The slot doubles as the stacking position, so a later layer in the
    /// list is shown above an earlier one where they overlap.
    pub fn transfer<H>(
        &mut self,
        hw: &mut H,
        slot: u32,
        buffer: BufferRef<'_>,
        plan: &TransferPlan,
    ) -> Result<Transferred, TransferError>
    where
        H: OverlayHardware + ?Sized,
    {
        let geometry = &plan.geometry;
        if geometry.is_degenerate() {
            return Err(TransferError::EmptyDestination);
        }

        let (resource, created, released) =
            self.acquire(hw, slot, plan.image_type, geometry.dest_width, geometry.dest_height)?;

        hw.write_resource(
            resource,
            plan.image_type,
            plan.row_pitch,
            buffer,
            geometry.source_rect(),
        )?;

        let placement = geometry.placement();
        hw.place_resource(resource, placement, slot, self.alpha)?;

        Ok(Transferred {
            resource,
            placement,
            created,
            released,
        })
    }

    fn acquire<H>(
        &mut self,
        hw: &mut H,
        slot: u32,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<(ResourceHandle, bool, Option<ResourceHandle>), TransferError>
    where
        H: OverlayHardware + ?Sized,
    {
        let mut released = None;
        if let Some(entry) = self.pool.get(&slot).copied() {
            if self.policy == ResourcePolicy::Reuse && entry.fits(image_type, width, height) {
                return Ok((entry.resource, false, None));
            }
            self.pool.remove(&slot);
            hw.release_resource(entry.resource);
            released = Some(entry.resource);
        }

        let resource = hw.create_resource(image_type, width, height)?;
        self.pool.insert(
            slot,
            PoolEntry {
                resource,
                image_type,
                width,
                height,
            },
        );
        Ok((resource, true, released))
    }

    /// Releases every pooled resource whose slot fails `keep`.
    ///
    /// Returns the released `(slot, resource)` pairs in slot order.
    pub fn sweep<H, F>(&mut self, hw: &mut H, mut keep: F) -> Vec<(u32, ResourceHandle)>
    where
        H: OverlayHardware + ?Sized,
        F: FnMut(u32) -> bool,
    {
        let mut stale: Vec<u32> = self.pool.keys().copied().filter(|&s| !keep(s)).collect();
        stale.sort_unstable();
        let mut released = Vec::with_capacity(stale.len());
        for slot in stale {
            if let Some(entry) = self.pool.remove(&slot) {
                hw.release_resource(entry.resource);
                released.push((slot, entry.resource));
            }
        }
        released
    }

    /// Releases every pooled resource.
    pub fn release_all<H>(&mut self, hw: &mut H) -> Vec<(u32, ResourceHandle)>
    where
        H: OverlayHardware + ?Sized,
    {
        self.sweep(hw, |_| false)
    }
}
