use std::path::PathBuf;

use miette::Diagnostic;
use ndarray::ShapeError;
use ndarray_npy::ReadNpyError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Array of shape {shape:?} has fewer than 2 dimensions")]
    #[diagnostic(
        code(ndview::invalid_shape),
        help("The last two dimensions are shown as an image, so at least two are required")
    )]
    InvalidShape { shape: Vec<usize> },

    #[error("Leading dimension {dimension} is empty")]
    #[diagnostic(code(ndview::empty_dimension))]
    EmptyDimension { dimension: usize },

    #[error("Index {value} is out of range for dimension {dimension} of extent {extent}")]
    #[diagnostic(code(ndview::index_out_of_range))]
    IndexOutOfRange {
        dimension: usize,
        value: usize,
        extent: usize,
    },

    #[error("Dimension {dimension} is not a leading dimension, there are {leading} of those")]
    #[diagnostic(code(ndview::dimension_out_of_range))]
    DimensionOutOfRange { dimension: usize, leading: usize },

    #[error("Expected {expected} indices, got {found}")]
    #[diagnostic(
        code(ndview::index_count),
        help("Give one index per leading dimension")
    )]
    IndexCount { expected: usize, found: usize },

    #[error("Row {row} has {found} elements, expected {expected}")]
    #[diagnostic(code(ndview::ragged_rows))]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported element type in {path:?}")]
    #[diagnostic(
        code(ndview::unsupported_dtype),
        help("Supported are little-endian integer and floating point arrays")
    )]
    UnsupportedDtype { path: PathBuf },

    #[error("Failed to read .npy file: {0}")]
    Npy(#[from] ReadNpyError),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Failed to write image: {0}")]
    Image(String),
}
