// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software overlay engine.
//!
//! [`SoftOverlay`] stores resource pixels in host memory, copies them in with
//! the caller's row pitch, and keeps a list of placed elements. [`scanout`]
//! composes the placed elements, bottom to top by stacking position, into a
//! [`Screen`].
//!
//! [`scanout`]: SoftOverlay::scanout

use hashbrown::{HashMap, HashSet};
use hwoverlay_core::error::HwError;
use hwoverlay_core::format::HwImageType;
use hwoverlay_core::hardware::{OverlayAlpha, OverlayHardware};
use hwoverlay_core::layer::{BufferRef, PixelRect};
use hwoverlay_core::output::ResourceHandle;
use kurbo::Rect;

/// Status reported when a handle does not name a live resource.
pub const STATUS_NO_RESOURCE: i32 = -1;
/// Status reported when the source buffer is shorter than the write needs.
pub const STATUS_SHORT_SOURCE: i32 = -2;
/// Status reported for a zero-sized allocation or an exhausted resource limit.
pub const STATUS_NO_MEMORY: i32 = -3;
/// Status reported when the write rectangle starts outside the resource.
pub const STATUS_BAD_RECT: i32 = -4;
/// Status reported for an injected write fault.
pub const STATUS_INJECTED: i32 = -5;

/// An RGBA pixel.
pub type Rgba = [u8; 4];

/// The composed output of a [`SoftOverlay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Screen {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; width as usize * height as usize],
        }
    }

    /// Screen width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Screen height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel at `(x, y)`, or `None` outside the screen.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba, alpha: OverlayAlpha) {
        let index = y as usize * self.width as usize + x as usize;
        let Some(dst) = self.pixels.get_mut(index) else {
            return;
        };
        let a = if alpha.from_source {
            u32::from(src[3]) * u32::from(alpha.opacity) / 255
        } else {
            u32::from(alpha.opacity)
        };
        for c in 0..3 {
            let mixed = (u32::from(src[c]) * a + u32::from(dst[c]) * (255 - a) + 127) / 255;
            dst[c] = u8::try_from(mixed).unwrap_or(u8::MAX);
        }
        dst[3] = u8::try_from(a + u32::from(dst[3]) * (255 - a) / 255).unwrap_or(u8::MAX);
    }
}

#[derive(Clone, Debug)]
struct Resource {
    image_type: HwImageType,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Resource {
    fn stride(&self) -> usize {
        self.width as usize * self.image_type.bytes_per_pixel() as usize
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let bpp = self.image_type.bytes_per_pixel() as usize;
        let at = y as usize * self.stride() + x as usize * bpp;
        let Some(px) = self.data.get(at..at + bpp) else {
            return [0, 0, 0, 0];
        };
        decode_pixel(self.image_type, px)
    }
}

/// Expands one stored pixel to RGBA.
fn decode_pixel(image_type: HwImageType, px: &[u8]) -> Rgba {
    match (image_type, px) {
        (HwImageType::Rgb565, &[lo, hi]) => {
            let r = hi >> 3;
            let g = ((hi & 0x07) << 3) | (lo >> 5);
            let b = lo & 0x1f;
            [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255]
        }
        (HwImageType::Rgbx8888, &[r, g, b, _]) => [r, g, b, 255],
        (HwImageType::Rgba32, &[r, g, b, a]) => [r, g, b, a],
        _ => [0, 0, 0, 0],
    }
}

#[derive(Clone, Copy, Debug)]
struct Element {
    resource: ResourceHandle,
    dest: PixelRect,
    z: u32,
    alpha: OverlayAlpha,
}

/// A software [`OverlayHardware`] implementation with real pixel storage.
///
/// Elements are stacked by their `z`. Among equal `z` values the most
/// recently placed element is on top.
#[derive(Debug)]
pub struct SoftOverlay {
    width: u32,
    height: u32,
    resources: HashMap<u32, Resource>,
    elements: Vec<Element>,
    next_handle: u32,
    resource_limit: Option<usize>,
    write_faults: HashSet<u64>,
    writes_attempted: u64,
    created_total: u64,
    released_total: u64,
}

impl SoftOverlay {
    /// Creates an overlay engine driving a `width × height` screen.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resources: HashMap::new(),
            elements: Vec::new(),
            next_handle: 0,
            resource_limit: None,
            write_faults: HashSet::new(),
            writes_attempted: 0,
            created_total: 0,
            released_total: 0,
        }
    }

    /// Limits the number of simultaneously live resources.
    #[must_use]
    pub fn with_resource_limit(mut self, limit: usize) -> Self {
        self.resource_limit = Some(limit);
        self
    }

    /// Makes the write with zero-based attempt number `attempt` fail.
    pub fn fail_write_attempt(&mut self, attempt: u64) {
        self.write_faults.insert(attempt);
    }

    /// Number of writes attempted so far.
    #[must_use]
    pub fn writes_attempted(&self) -> u64 {
        self.writes_attempted
    }

    /// Number of resources created over the engine's lifetime.
    #[must_use]
    pub fn created_total(&self) -> u64 {
        self.created_total
    }

    /// Number of resources released over the engine's lifetime.
    #[must_use]
    pub fn released_total(&self) -> u64 {
        self.released_total
    }

    /// Number of live resources.
    #[must_use]
    pub fn live_resources(&self) -> usize {
        self.resources.len()
    }

    /// Placed elements' destinations, bottom to top.
    #[must_use]
    pub fn placements(&self) -> Vec<(ResourceHandle, PixelRect)> {
        self.elements.iter().map(|e| (e.resource, e.dest)).collect()
    }

    /// Composes every placed element onto a cleared screen.
    #[must_use]
    pub fn scanout(&self) -> Screen {
        let mut screen = Screen::new(self.width, self.height);
        let bounds = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        for element in &self.elements {
            let Some(resource) = self.resources.get(&element.resource.0) else {
                continue;
            };
            let dest = element.dest.normalized();
            let visible = element.dest.to_kurbo().intersect(bounds);
            if visible.is_zero_area() {
                continue;
            }
            let (x0, y0, x1, y1) = pixel_bounds(visible);
            for y in y0..y1 {
                let ry = y.abs_diff(dest.top);
                if ry >= resource.height {
                    break;
                }
                for x in x0..x1 {
                    let rx = x.abs_diff(dest.left);
                    if rx >= resource.width {
                        break;
                    }
                    screen.blend(
                        x.unsigned_abs(),
                        y.unsigned_abs(),
                        resource.pixel(rx, ry),
                        element.alpha,
                    );
                }
            }
        }
        screen
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "edges come from i32 rectangles clipped to a u32-sized screen"
)]
fn pixel_bounds(r: Rect) -> (i32, i32, i32, i32) {
    (r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
}

impl OverlayHardware for SoftOverlay {
    fn create_resource(
        &mut self,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<ResourceHandle, HwError> {
        if width == 0 || height == 0 {
            return Err(HwError::CreateFailed(STATUS_NO_MEMORY));
        }
        if self
            .resource_limit
            .is_some_and(|limit| self.resources.len() >= limit)
        {
            return Err(HwError::CreateFailed(STATUS_NO_MEMORY));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(image_type.bytes_per_pixel() as usize))
            .ok_or(HwError::CreateFailed(STATUS_NO_MEMORY))?;
        self.next_handle += 1;
        self.created_total += 1;
        let handle = ResourceHandle(self.next_handle);
        self.resources.insert(
            handle.0,
            Resource {
                image_type,
                width,
                height,
                data: vec![0; len],
            },
        );
        Ok(handle)
    }

    fn write_resource(
        &mut self,
        resource: ResourceHandle,
        image_type: HwImageType,
        pitch: u32,
        src: BufferRef<'_>,
        rect: PixelRect,
    ) -> Result<(), HwError> {
        let attempt = self.writes_attempted;
        self.writes_attempted += 1;
        if self.write_faults.remove(&attempt) {
            return Err(HwError::WriteFailed(STATUS_INJECTED));
        }
        let res = self
            .resources
            .get_mut(&resource.0)
            .ok_or(HwError::WriteFailed(STATUS_NO_RESOURCE))?;
        let rect = rect.normalized();
        let (Ok(left), Ok(top)) = (u32::try_from(rect.left), u32::try_from(rect.top)) else {
            return Err(HwError::WriteFailed(STATUS_BAD_RECT));
        };
        if left >= res.width || top >= res.height {
            return Err(HwError::WriteFailed(STATUS_BAD_RECT));
        }
        // The source is read as `image_type` pixels; the resource keeps its own.
        let bpp = image_type
            .bytes_per_pixel()
            .min(res.image_type.bytes_per_pixel()) as usize;
        let rows = rect.height().min(res.height - top) as usize;
        let row_bytes = rect.width().min(res.width - left) as usize * bpp;
        if rows == 0 || row_bytes == 0 {
            return Ok(());
        }
        let pitch = pitch as usize;
        let needed = (rows - 1)
            .checked_mul(pitch)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(HwError::WriteFailed(STATUS_SHORT_SOURCE))?;
        let bytes = src.as_bytes();
        if bytes.len() < needed {
            return Err(HwError::WriteFailed(STATUS_SHORT_SOURCE));
        }
        let stride = res.stride();
        let column = left as usize * bpp;
        for row in 0..rows {
            let from = row * pitch;
            let to = (top as usize + row) * stride + column;
            res.data[to..to + row_bytes].copy_from_slice(&bytes[from..from + row_bytes]);
        }
        Ok(())
    }

    fn place_resource(
        &mut self,
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
        alpha: OverlayAlpha,
    ) -> Result<(), HwError> {
        if !self.resources.contains_key(&resource.0) {
            return Err(HwError::PlaceFailed(STATUS_NO_RESOURCE));
        }
        self.elements.retain(|e| e.resource != resource);
        let at = self.elements.partition_point(|e| e.z <= z);
        self.elements.insert(
            at,
            Element {
                resource,
                dest,
                z,
                alpha,
            },
        );
        Ok(())
    }

    fn release_resource(&mut self, resource: ResourceHandle) {
        if self.resources.remove(&resource.0).is_some() {
            self.released_total += 1;
        }
        self.elements.retain(|e| e.resource != resource);
    }
}
