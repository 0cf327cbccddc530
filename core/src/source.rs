use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayBase, ArrayD, Data, Dimension};
use ndarray_npy::{read_npy, ReadNpyError, ReadableElement};
use num::ToPrimitive;
use tracing::{debug, instrument};

use crate::error::Error;

/// Anything that can be turned into a dense array for viewing.
///
/// Conversion happens once, before a viewer is created.
pub trait ArraySource<A> {
    fn into_array(self) -> Result<ArrayD<A>, Error>;
}

impl<A: Clone, S: Data<Elem = A>, D: Dimension> ArraySource<A> for ArrayBase<S, D> {
    fn into_array(self) -> Result<ArrayD<A>, Error> {
        Ok(self.into_owned().into_dyn())
    }
}

impl<'a, A: Clone, S: Data<Elem = A>, D: Dimension> ArraySource<A> for &'a ArrayBase<S, D> {
    fn into_array(self) -> Result<ArrayD<A>, Error> {
        Ok(self.to_owned().into_dyn())
    }
}

/// Rows of a 2D array.
impl<A> ArraySource<A> for Vec<Vec<A>> {
    fn into_array(self) -> Result<ArrayD<A>, Error> {
        let rows = self.len();
        let cols = self.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(rows * cols);
        for (row, values) in self.into_iter().enumerate() {
            if values.len() != cols {
                return Err(Error::RaggedRows {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            data.extend(values);
        }

        Ok(Array2::from_shape_vec((rows, cols), data)?.into_dyn())
    }
}

/// A `.npy` file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NpyFile(pub PathBuf);

impl NpyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Reads the file with its exact element type.
    pub fn read<A: ReadableElement>(&self) -> Result<ArrayD<A>, Error> {
        Ok(read_npy(&self.0)?)
    }
}

/// Any integer or float array, widened to `f64`.
impl ArraySource<f64> for NpyFile {
    #[instrument]
    fn into_array(self) -> Result<ArrayD<f64>, Error> {
        macro_rules! try_read {
            ($path:expr; $($t:ty),*) => {
                $(
                    if let Some(arr) = read_widened::<$t>($path)? {
                        debug!(dtype = stringify!($t), shape = ?arr.shape(), "Loaded array");
                        return Ok(arr);
                    }
                )*
            };
        }

        try_read!(&self.0; f64, f32, i8, i16, i32, i64, u8, u16, u32, u64);

        Err(Error::UnsupportedDtype { path: self.0 })
    }
}

/// `None` if the file holds a different element type.
fn read_widened<T: ReadableElement + ToPrimitive + Clone>(
    path: &Path,
) -> Result<Option<ArrayD<f64>>, Error> {
    match read_npy::<_, ArrayD<T>>(path) {
        Ok(arr) => Ok(Some(arr.mapv(|x| x.to_f64().unwrap_or(f64::NAN)))),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
