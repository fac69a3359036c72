// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel formats, the overlay capability classifier, and the translation to
//! the hardware engine's native image types.

use core::fmt;
use core::hash::{Hash, Hasher};

/// HAL pixel format code for 32-bit RGBA.
pub const HAL_PIXEL_FORMAT_RGBA_8888: u32 = 1;
/// HAL pixel format code for 32-bit RGB with an ignored alpha byte.
pub const HAL_PIXEL_FORMAT_RGBX_8888: u32 = 2;
/// HAL pixel format code for 16-bit RGB 5:6:5.
pub const HAL_PIXEL_FORMAT_RGB_565: u32 = 4;

/// Pixel format of a layer's source buffer.
///
/// Formats compare by HAL code, so `Other(4)` equals `Rgb565` and is
/// classified and translated like it.
#[derive(Clone, Copy, Debug)]
pub enum PixelFormat {
    /// 16-bit RGB 5:6:5.
    Rgb565,
    /// 32-bit RGB, alpha byte ignored.
    Rgbx8888,
    /// 32-bit RGBA.
    Rgba8888,
    /// Any other format, carrying the raw HAL code.
    Other(u32),
}

impl PartialEq for PixelFormat {
    fn eq(&self, other: &Self) -> bool {
        self.to_hal() == other.to_hal()
    }
}

impl Eq for PixelFormat {}

impl Hash for PixelFormat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_hal().hash(state);
    }
}

impl PixelFormat {
    /// Maps a raw HAL pixel format code to a [`PixelFormat`].
    ///
    /// Unrecognized codes are preserved in [`PixelFormat::Other`].
    #[must_use]
    pub const fn from_hal(code: u32) -> Self {
        match code {
            HAL_PIXEL_FORMAT_RGBA_8888 => Self::Rgba8888,
            HAL_PIXEL_FORMAT_RGBX_8888 => Self::Rgbx8888,
            HAL_PIXEL_FORMAT_RGB_565 => Self::Rgb565,
            other => Self::Other(other),
        }
    }

    /// Returns the raw HAL code for this format.
    #[must_use]
    pub const fn to_hal(self) -> u32 {
        match self {
            Self::Rgba8888 => HAL_PIXEL_FORMAT_RGBA_8888,
            Self::Rgbx8888 => HAL_PIXEL_FORMAT_RGBX_8888,
            Self::Rgb565 => HAL_PIXEL_FORMAT_RGB_565,
            Self::Other(code) => code,
        }
    }

    /// Returns the named variant for a supported code held in `Other`.
    #[must_use]
    pub const fn canonical(self) -> Self {
        Self::from_hal(self.to_hal())
    }
}

/// Native image types understood by the overlay engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HwImageType {
    /// 16-bit RGB 5:6:5.
    #[default]
    Rgb565,
    /// 32-bit RGBX.
    Rgbx8888,
    /// 32-bit RGBA.
    Rgba32,
}

impl HwImageType {
    /// Bytes occupied by one pixel of this image type.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgb565 => 2,
            Self::Rgbx8888 | Self::Rgba32 => 4,
        }
    }
}

impl fmt::Display for HwImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgb565 => "RGB565",
            Self::Rgbx8888 => "RGBX8888",
            Self::Rgba32 => "RGBA32",
        })
    }
}

/// Returns `true` if the overlay engine can consume buffers in `format`.
///
/// An unsupported format is not an error: the layer is simply composited by
/// the GPU instead.
#[must_use]
pub const fn classify(format: PixelFormat) -> bool {
    matches!(
        format.canonical(),
        PixelFormat::Rgb565 | PixelFormat::Rgbx8888 | PixelFormat::Rgba8888
    )
}

/// Maps a pixel format to the engine's native image type.
///
/// Total over all inputs: formats the engine cannot consume map to
/// [`HwImageType::Rgb565`]. Only called for layers already classified as
/// overlay-eligible.
#[must_use]
pub const fn to_hardware_format(format: PixelFormat) -> HwImageType {
    match format.canonical() {
        PixelFormat::Rgb565 | PixelFormat::Other(_) => HwImageType::Rgb565,
        PixelFormat::Rgbx8888 => HwImageType::Rgbx8888,
        PixelFormat::Rgba8888 => HwImageType::Rgba32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_formats_classify_as_overlay() {
        assert!(classify(PixelFormat::Rgb565), "RGB565 is supported");
        assert!(classify(PixelFormat::Rgbx8888), "RGBX8888 is supported");
        assert!(classify(PixelFormat::Rgba8888), "RGBA8888 is supported");
    }

    #[test]
    fn other_formats_do_not_classify() {
        // BGRA_8888, YV12, and a vendor-extended code.
        for code in [5_u32, 0x3231_5659, 0x100, 0] {
            assert!(
                !classify(PixelFormat::from_hal(code)),
                "code {code:#x} must fall back to the framebuffer"
            );
        }
    }

    #[test]
    fn translation_is_total() {
        assert_eq!(to_hardware_format(PixelFormat::Rgb565), HwImageType::Rgb565);
        assert_eq!(
            to_hardware_format(PixelFormat::Rgbx8888),
            HwImageType::Rgbx8888
        );
        assert_eq!(
            to_hardware_format(PixelFormat::Rgba8888),
            HwImageType::Rgba32
        );
        assert_eq!(
            to_hardware_format(PixelFormat::Other(0xdead)),
            HwImageType::Rgb565,
            "unknown formats use the permissive default"
        );
    }

    #[test]
    fn hal_codes_map_both_ways() {
        assert_eq!(PixelFormat::from_hal(4), PixelFormat::Rgb565);
        assert_eq!(PixelFormat::from_hal(2), PixelFormat::Rgbx8888);
        assert_eq!(PixelFormat::from_hal(1), PixelFormat::Rgba8888);
        assert_eq!(PixelFormat::Other(77).to_hal(), 77);
        assert_eq!(PixelFormat::Rgb565.to_hal(), HAL_PIXEL_FORMAT_RGB_565);
    }

    #[test]
    fn other_with_a_supported_code_acts_as_that_format() {
        assert!(classify(PixelFormat::Other(HAL_PIXEL_FORMAT_RGB_565)));
        assert!(classify(PixelFormat::Other(HAL_PIXEL_FORMAT_RGBA_8888)));
        assert_eq!(
            to_hardware_format(PixelFormat::Other(HAL_PIXEL_FORMAT_RGBA_8888)),
            HwImageType::Rgba32
        );
        assert_eq!(
            to_hardware_format(PixelFormat::Other(HAL_PIXEL_FORMAT_RGBX_8888)),
            HwImageType::Rgbx8888
        );
        assert_eq!(PixelFormat::Other(4), PixelFormat::Rgb565);
        assert_eq!(PixelFormat::Other(4).canonical(), PixelFormat::Rgb565);
        assert!(matches!(
            PixelFormat::Other(4).canonical(),
            PixelFormat::Rgb565
        ));
        assert_ne!(PixelFormat::Other(5), PixelFormat::Rgb565);
    }

    #[test]
    fn bytes_per_pixel_matches_layout() {
        assert_eq!(HwImageType::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(HwImageType::Rgbx8888.bytes_per_pixel(), 4);
        assert_eq!(HwImageType::Rgba32.bytes_per_pixel(), 4);
    }
}
