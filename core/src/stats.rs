use std::ops::{Div, Sub};

use ndarray::ArrayView2;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeIncl<N> {
    pub min: N,
    pub max: N,
}

impl<N> RangeIncl<N> {
    pub fn new(min: N, max: N) -> Self {
        Self { min, max }
    }
}

impl<N: Default> Default for RangeIncl<N> {
    fn default() -> Self {
        Self {
            min: N::default(),
            max: N::default(),
        }
    }
}

impl<N: Sub<Output = N> + Div<Output = N> + Copy> RangeIncl<N> {
    pub fn width(&self) -> N {
        self.max - self.min
    }

    /// Where `value` lies in the range, 0 at `min` and 1 at `max`.
    pub fn map(&self, value: N) -> N {
        (value - self.min) / self.width()
    }
}

impl<N: PartialOrd + Copy> RangeIncl<N> {
    pub fn expand(&self, new: N) -> Self {
        Self::new(
            if self.min < new { self.min } else { new },
            if self.max > new { self.max } else { new },
        )
    }
}

/// Summary of the values in an array, NaNs skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayStats {
    pub range: RangeIncl<f64>,
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl ArrayStats {
    /// `None` if there is not a single value that is not NaN.
    pub fn new<N: ToPrimitive>(data: impl IntoIterator<Item = N>) -> Option<Self> {
        let mut values = data
            .into_iter()
            .filter_map(|x| x.to_f64())
            .filter(|x| !x.is_nan());

        let first = values.next()?;
        let mut range = RangeIncl::new(first, first);
        let mut sum = first;
        let mut sum_sq = first * first;
        let mut count = 1usize;
        for value in values {
            range = range.expand(value);
            sum += value;
            sum_sq += value * value;
            count += 1;
        }

        let mean = sum / count as f64;
        // Rounding can push this slightly below zero for constant data
        let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
        Some(Self {
            range,
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// The value range that is spread over the colormap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Levels {
    /// Minimum and maximum of the slice on screen.
    #[default]
    Auto,
    Fixed(RangeIncl<f64>),
}

impl Levels {
    /// The concrete range for `slice`. A fixed range given as `max, min` is
    /// put back in order.
    pub fn resolve<A: ToPrimitive + Clone>(&self, slice: &ArrayView2<'_, A>) -> RangeIncl<f64> {
        match self {
            Levels::Fixed(range) if range.min > range.max => {
                RangeIncl::new(range.max, range.min)
            }
            Levels::Fixed(range) => *range,
            Levels::Auto => ArrayStats::new(slice.iter().cloned())
                .map(|stats| stats.range)
                .unwrap_or_default(),
        }
    }
}

/// Maps `value` onto `[0, 1]`, clamping outside of `range`. NaN stays NaN.
pub fn normalize(range: &RangeIncl<f64>, value: f64) -> f64 {
    if value.is_nan() {
        return f64::NAN;
    }
    if range.width() <= 0.0 {
        return 0.0;
    }
    range.map(value).clamp(0.0, 1.0)
}
