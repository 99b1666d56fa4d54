use log::*;
use ndarray::{Array2, Array3, ArrayView2};
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::projection::GridProjection;

/// File name of the dense tensor for image `index` inside a tensor
/// directory. Indices are zero-padded so lexicographic and numeric order
/// agree.
pub fn tensor_file_name(index: usize) -> String {
    format!("{index:05}.npy")
}

fn read_npy_2d(path: &Path) -> Result<Array2<f32>> {
    let file = File::open(path)?;
    Array2::read_npy(file).map_err(|source| Error::ArrayRead {
        path: path.to_owned(),
        source,
    })
}

fn read_npy_3d(path: &Path) -> Result<Array3<f32>> {
    let file = File::open(path)?;
    Array3::read_npy(file).map_err(|source| Error::ArrayRead {
        path: path.to_owned(),
        source,
    })
}

/// All reference-side data for one run, immutable after construction.
///
/// This is handed by shared reference into every re-ranking call, including
/// concurrent ones; nothing here is ever mutated after load, so workers
/// need no locking.
pub struct ReferenceData {
    globals: Array2<f32>,
    dense: Vec<Array2<f32>>,
    depths: Array3<f32>,
    projection: GridProjection,
    channels: usize,
}

impl ReferenceData {
    /// Builds the reference context from already-loaded arrays, validating
    /// every shape invariant so scoring can assume consistency.
    pub fn from_parts(
        globals: Array2<f32>,
        dense: Vec<Array2<f32>>,
        depths: Array3<f32>,
        grid: (usize, usize),
    ) -> Result<Self> {
        let count = dense.len();
        if count == 0 {
            return Err(Error::EmptyDataset("reference"));
        }
        if globals.nrows() != count {
            return Err(Error::CountMismatch {
                kind: "reference global descriptor",
                expected: count,
                found: globals.nrows(),
            });
        }
        if depths.dim().0 != count {
            return Err(Error::CountMismatch {
                kind: "reference depth map",
                expected: count,
                found: depths.dim().0,
            });
        }
        let cells = grid.0 * grid.1;
        if dense[0].nrows() != cells {
            return Err(Error::GridShapeMismatch {
                rows: grid.0,
                cols: grid.1,
                cells: dense[0].nrows(),
            });
        }
        let channels = dense[0].ncols();
        for (index, tensor) in dense.iter().enumerate() {
            if tensor.dim() != (cells, channels) {
                return Err(Error::DenseShapeMismatch {
                    index,
                    expected: (cells, channels),
                    found: tensor.dim(),
                });
            }
        }
        let full = (depths.dim().1, depths.dim().2);
        if full.0 % grid.0 != 0 || full.1 % grid.1 != 0 {
            return Err(Error::DepthResolutionMismatch { full, grid });
        }
        let projection = GridProjection::new(grid, full);
        info!(
            "reference set ready: {} images, {} channels over a {}x{} grid, depth {}x{}",
            count, channels, grid.0, grid.1, full.0, full.1
        );
        Ok(Self {
            globals,
            dense,
            depths,
            projection,
            channels,
        })
    }

    /// Loads the reference set from disk: one global-descriptor matrix, one
    /// dense tensor per image in `dense_dir`, and a stacked depth array.
    pub fn load(
        globals_path: &Path,
        dense_dir: &Path,
        depths_path: &Path,
        grid: (usize, usize),
    ) -> Result<Self> {
        let globals = read_npy_2d(globals_path)?;
        let depths = read_npy_3d(depths_path)?;
        let count = globals.nrows();
        debug!("loading {} reference dense tensors from {:?}", count, dense_dir);
        let dense = (0..count)
            .map(|index| read_npy_2d(&dense_dir.join(tensor_file_name(index))))
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(globals, dense, depths, grid)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn spatial_cells(&self) -> usize {
        self.projection.grid_rows() * self.projection.grid_cols()
    }

    pub fn globals(&self) -> ArrayView2<f32> {
        self.globals.view()
    }

    pub fn dense_tensor(&self, index: usize) -> ArrayView2<f32> {
        self.dense[index].view()
    }

    pub fn depth_map(&self, index: usize) -> ArrayView2<f32> {
        self.depths.index_axis(ndarray::Axis(0), index)
    }

    pub fn projection(&self) -> GridProjection {
        self.projection
    }
}

enum QueryTensors {
    /// Tensors read from numbered files on demand, one query at a time.
    Directory(PathBuf),
    /// Tensors held in memory, used by tests and small runs.
    Memory(Vec<Array2<f32>>),
}

/// The query side of a run: global descriptors up front, dense tensors
/// fetched per query when it is scored.
pub struct QuerySet {
    globals: Array2<f32>,
    tensors: QueryTensors,
}

impl QuerySet {
    pub fn load(globals_path: &Path, dense_dir: &Path) -> Result<Self> {
        let globals = read_npy_2d(globals_path)?;
        if globals.nrows() == 0 {
            return Err(Error::EmptyDataset("query"));
        }
        Ok(Self {
            globals,
            tensors: QueryTensors::Directory(dense_dir.to_owned()),
        })
    }

    pub fn in_memory(globals: Array2<f32>, tensors: Vec<Array2<f32>>) -> Result<Self> {
        if globals.nrows() == 0 {
            return Err(Error::EmptyDataset("query"));
        }
        if tensors.len() != globals.nrows() {
            return Err(Error::CountMismatch {
                kind: "query dense tensor",
                expected: globals.nrows(),
                found: tensors.len(),
            });
        }
        Ok(Self {
            globals,
            tensors: QueryTensors::Memory(tensors),
        })
    }

    pub fn len(&self) -> usize {
        self.globals.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.nrows() == 0
    }

    pub fn globals(&self) -> ArrayView2<f32> {
        self.globals.view()
    }

    fn dense_tensor(&self, index: usize) -> Result<Array2<f32>> {
        match &self.tensors {
            QueryTensors::Directory(dir) => read_npy_2d(&dir.join(tensor_file_name(index))),
            QueryTensors::Memory(tensors) => Ok(tensors[index].clone()),
        }
    }
}

/// Both image collections plus the validated cross-set invariants.
pub struct Dataset {
    pub reference: ReferenceData,
    pub queries: QuerySet,
}

impl Dataset {
    pub fn new(reference: ReferenceData, queries: QuerySet) -> Result<Self> {
        if reference.globals.ncols() != queries.globals.ncols() {
            return Err(Error::DescriptorDimensionMismatch {
                reference: reference.globals.ncols(),
                query: queries.globals.ncols(),
            });
        }
        Ok(Self { reference, queries })
    }

    /// Fetches one query's dense tensor and checks it against the reference
    /// grid and channel count. Query tensors arrive on demand, so this is
    /// the point where their shape invariant is enforced.
    pub fn query_dense(&self, index: usize) -> Result<Array2<f32>> {
        let tensor = self.queries.dense_tensor(index)?;
        let expected = (self.reference.spatial_cells(), self.reference.channels());
        if tensor.dim() != expected {
            return Err(Error::DenseShapeMismatch {
                index,
                expected,
                found: tensor.dim(),
            });
        }
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn small_reference() -> (Array2<f32>, Vec<Array2<f32>>, Array3<f32>) {
        let globals = Array2::zeros((2, 4));
        let dense = vec![Array2::zeros((6, 3)), Array2::zeros((6, 3))];
        let depths = Array3::zeros((2, 4, 6));
        (globals, dense, depths)
    }

    #[test]
    fn consistent_shapes_load() {
        let (globals, dense, depths) = small_reference();
        let reference = ReferenceData::from_parts(globals, dense, depths, (2, 3)).unwrap();
        assert_eq!(reference.len(), 2);
        assert_eq!(reference.channels(), 3);
        assert_eq!(reference.spatial_cells(), 6);
    }

    #[test]
    fn grid_cell_mismatch_is_fatal() {
        let (globals, dense, depths) = small_reference();
        assert!(matches!(
            ReferenceData::from_parts(globals, dense, depths, (2, 2)),
            Err(Error::GridShapeMismatch { .. })
        ));
    }

    #[test]
    fn non_multiple_depth_resolution_is_fatal() {
        let (globals, dense, _) = small_reference();
        let depths = Array3::zeros((2, 5, 6));
        assert!(matches!(
            ReferenceData::from_parts(globals, dense, depths, (2, 3)),
            Err(Error::DepthResolutionMismatch { .. })
        ));
    }

    #[test]
    fn uneven_channel_counts_are_fatal() {
        let (globals, mut dense, depths) = small_reference();
        dense[1] = Array2::zeros((6, 5));
        assert!(matches!(
            ReferenceData::from_parts(globals, dense, depths, (2, 3)),
            Err(Error::DenseShapeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn query_tensor_shape_is_checked_on_fetch() {
        let (globals, dense, depths) = small_reference();
        let reference = ReferenceData::from_parts(globals, dense, depths, (2, 3)).unwrap();
        let queries =
            QuerySet::in_memory(Array2::zeros((1, 4)), vec![Array2::zeros((6, 2))]).unwrap();
        let dataset = Dataset::new(reference, queries).unwrap();
        assert!(matches!(
            dataset.query_dense(0),
            Err(Error::DenseShapeMismatch { .. })
        ));
    }

    #[test]
    fn global_dimensionality_mismatch_is_fatal() {
        let (globals, dense, depths) = small_reference();
        let reference = ReferenceData::from_parts(globals, dense, depths, (2, 3)).unwrap();
        let queries =
            QuerySet::in_memory(Array2::zeros((1, 5)), vec![Array2::zeros((6, 3))]).unwrap();
        assert!(matches!(
            Dataset::new(reference, queries),
            Err(Error::DescriptorDimensionMismatch { .. })
        ));
    }
}
