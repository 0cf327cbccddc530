use std::fmt::Debug;

use ndarray::{ArrayBase, ArrayView2, Axis, Data, Dimension, Ix2, IxDyn};
use tracing::{debug, instrument, trace};

use crate::error::Error;


/// Selects the 2D slice of an N-dimensional array that is currently shown.
///
/// The last two axes form the image, every axis before them (the leading
/// axes) is fixed to one position of the index vector. The array itself is
/// never modified; pass a view or an `ArcArray` to keep ownership with the
/// caller.
pub struct SliceNavigator<S: Data> {
    array: ArrayBase<S, IxDyn>,
    index: Vec<usize>,
}

impl<S: Data> Debug for SliceNavigator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceNavigator")
            .field("shape", &self.array.shape())
            .field("index", &self.index)
            .finish()
    }
}

impl<S: Data> SliceNavigator<S> {
    /// # Errors
    ///
    /// Errors with [`Error::InvalidShape`] if the array has fewer than 2 dimensions
    /// and with [`Error::EmptyDimension`] if a leading dimension has no elements.
    #[instrument(skip(array), fields(shape = ?array.shape()))]
    pub fn new<D: Dimension>(array: ArrayBase<S, D>) -> Result<Self, Error> {
        let array = array.into_dyn();
        if array.ndim() < 2 {
            return Err(Error::InvalidShape {
                shape: array.shape().to_vec(),
            });
        }

        let leading = array.ndim() - 2;
        if let Some(dimension) = array.shape()[..leading].iter().position(|&len| len == 0) {
            return Err(Error::EmptyDimension { dimension });
        }

        let index = vec![0; leading];
        debug!("Navigating {} leading dimensions", index.len());
        Ok(Self { array, index })
    }

    pub fn array(&self) -> &ArrayBase<S, IxDyn> {
        &self.array
    }

    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    pub fn ndim(&self) -> usize {
        self.array.ndim()
    }

    /// Extents of the dimensions that are navigated by index.
    pub fn leading_shape(&self) -> &[usize] {
        &self.array.shape()[..self.index.len()]
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Largest valid index of a leading dimension, what a slider would use as its maximum.
    pub fn slider_max(&self, dimension: usize) -> Result<usize, Error> {
        Ok(self.extent(dimension)? - 1)
    }

    fn extent(&self, dimension: usize) -> Result<usize, Error> {
        self.leading_shape()
            .get(dimension)
            .copied()
            .ok_or(Error::DimensionOutOfRange {
                dimension,
                leading: self.index.len(),
            })
    }

    /// # Errors
    ///
    /// Rejects values outside of `0..shape[dimension]` and dimensions that
    /// are not leading ones. The index vector is left untouched in that case.
    pub fn set_index(&mut self, dimension: usize, value: usize) -> Result<(), Error> {
        let extent = self.extent(dimension)?;
        if value >= extent {
            return Err(Error::IndexOutOfRange {
                dimension,
                value,
                extent,
            });
        }

        trace!(dimension, value, "Set index");
        self.index[dimension] = value;
        Ok(())
    }

    /// Replaces the whole index vector. Either all values are taken or none.
    pub fn set_indices(&mut self, indices: &[usize]) -> Result<(), Error> {
        if indices.len() != self.index.len() {
            return Err(Error::IndexCount {
                expected: self.index.len(),
                found: indices.len(),
            });
        }

        for (dimension, (&value, &extent)) in indices.iter().zip(self.leading_shape()).enumerate() {
            if value >= extent {
                return Err(Error::IndexOutOfRange {
                    dimension,
                    value,
                    extent,
                });
            }
        }

        self.index.copy_from_slice(indices);
        Ok(())
    }

    /// Moves the index of `dimension` by `delta`, stopping at either end.
    ///
    /// Returns whether the index changed.
    pub fn step(&mut self, dimension: usize, delta: isize) -> Result<bool, Error> {
        let max = self.slider_max(dimension)?;
        let current = self.index[dimension];
        let next = current.saturating_add_signed(delta).min(max);

        self.index[dimension] = next;
        Ok(next != current)
    }

    /// The slice selected by the index vector, transposed for display.
    ///
    /// The leading axes are removed one at a time, always along the first
    /// remaining axis, in index vector order.
    pub fn current_slice(&self) -> Result<ArrayView2<'_, S::Elem>, Error> {
        let mut view = self.array.view();
        for &i in &self.index {
            view = view.index_axis_move(Axis(0), i);
        }

        Ok(view.into_dimensionality::<Ix2>()?.reversed_axes())
    }

    pub fn current_index_label(&self) -> String {
        let parts = self
            .index
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>();
        format!("[{}]", parts.join(","))
    }
}
