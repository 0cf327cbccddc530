use std::path::Path;

use ndarray::ArrayView2;
use num::ToPrimitive;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::{
    error::Error,
    stats::{normalize, Levels},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colormap {
    #[default]
    Gray,
    /// Blue for low values through to red for high ones.
    Heat,
}

impl Colormap {
    pub const ALL: [Colormap; 2] = [Colormap::Gray, Colormap::Heat];

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::Heat => "heat",
        }
    }

    /// `t` is expected in `[0, 1]`. NaN is fully transparent.
    pub fn color(self, t: f64) -> [u8; 4] {
        if t.is_nan() {
            return [0, 0, 0, 0];
        }

        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                [v, v, v, 255]
            }
            Colormap::Heat => {
                let (r, g, b) = HSLColor(240.0 / 360.0 - 240.0 / 360.0 * t, 0.9, 0.5)
                    .to_backend_color()
                    .rgb;
                [r, g, b, 255]
            }
        }
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colormap::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown colormap {s:?}, expected gray or heat"))
    }
}

/// Unmultiplied RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    /// Shrinks the image by a whole factor until neither side exceeds
    /// `max_side`, keeping every `factor`-th pixel.
    pub fn fit_within(self, max_side: usize) -> RgbaImage {
        let longest = self.width.max(self.height);
        if max_side == 0 || longest <= max_side {
            return self;
        }

        let factor = (longest + max_side - 1) / max_side;
        let width = (self.width + factor - 1) / factor;
        let height = (self.height + factor - 1) / factor;
        trace!(factor, width, height, "Downsampling image");

        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                let i = (y * factor * self.width + x * factor) * 4;
                pixels.extend_from_slice(&self.pixels[i..i + 4]);
            }
        }

        RgbaImage {
            width,
            height,
            pixels,
        }
    }

    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn write_png(&self, path: impl AsRef<Path> + std::fmt::Debug) -> Result<(), Error> {
        let root = BitMapBackend::new(path.as_ref(), (self.width as u32, self.height as u32))
            .into_drawing_area();

        for y in 0..self.height {
            for x in 0..self.width {
                let i = (y * self.width + x) * 4;
                let [r, g, b, a] = [
                    self.pixels[i],
                    self.pixels[i + 1],
                    self.pixels[i + 2],
                    self.pixels[i + 3],
                ];
                if a == 0 {
                    continue;
                }
                root.draw_pixel((x as i32, y as i32), &RGBColor(r, g, b))
                    .map_err(|e| Error::Image(e.to_string()))?;
            }
        }

        root.present().map_err(|e| Error::Image(e.to_string()))?;
        debug!("Wrote image");
        Ok(())
    }
}

/// Colours the displayed slice. Image row `y` is slice row `y`.
pub fn render_slice<A: ToPrimitive + Clone>(
    slice: &ArrayView2<'_, A>,
    levels: &Levels,
    colormap: Colormap,
) -> RgbaImage {
    let (height, width) = slice.dim();
    let range = levels.resolve(slice);

    let mut pixels = Vec::with_capacity(width * height * 4);
    for value in slice.iter() {
        let t = value.to_f64().map_or(f64::NAN, |v| normalize(&range, v));
        pixels.extend_from_slice(&colormap.color(t));
    }

    RgbaImage {
        width,
        height,
        pixels,
    }
}
