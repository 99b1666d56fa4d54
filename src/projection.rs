/// Maps flat indices in the reduced-resolution feature grid to pixel
/// coordinates in the full-resolution depth map.
///
/// The per-axis scale factors are computed once when the reference data is
/// loaded and reused for every projection. The depth-map resolution is
/// validated to be an integer multiple of the grid resolution at load time,
/// so the truncating multiply below always lands inside the depth map.
#[derive(Debug, Clone, Copy)]
pub struct GridProjection {
    grid_rows: usize,
    grid_cols: usize,
    scale_row: f32,
    scale_col: f32,
}

impl GridProjection {
    pub fn new(grid: (usize, usize), full: (usize, usize)) -> Self {
        Self {
            grid_rows: grid.0,
            grid_cols: grid.1,
            scale_row: full.0 as f32 / grid.0 as f32,
            scale_col: full.1 as f32 / grid.1 as f32,
        }
    }

    pub fn grid_rows(&self) -> usize {
        self.grid_rows
    }

    pub fn grid_cols(&self) -> usize {
        self.grid_cols
    }

    /// Projects a flat grid index to full-resolution pixel coordinates.
    ///
    /// The flat index is unraveled row-major into (row, col), each axis is
    /// scaled and truncated, and the result is returned axis-swapped as
    /// (x, y) so that `x` runs along columns and `y` along rows.
    pub fn pixel(&self, flat_index: usize) -> (usize, usize) {
        let row = flat_index / self.grid_cols;
        let col = flat_index % self.grid_cols;
        let x = (col as f32 * self.scale_col) as usize;
        let y = (row as f32 * self.scale_row) as usize;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unravels_row_major() {
        // 2x3 grid at full resolution: identity scale.
        let proj = GridProjection::new((2, 3), (2, 3));
        assert_eq!(proj.pixel(0), (0, 0));
        assert_eq!(proj.pixel(2), (2, 0));
        assert_eq!(proj.pixel(3), (0, 1));
        assert_eq!(proj.pixel(5), (2, 1));
    }

    #[test]
    fn scales_each_axis_independently() {
        // 20x31 feature grid over a 240x620 depth map: 12x vertical, 20x horizontal.
        let proj = GridProjection::new((20, 31), (240, 620));
        assert_eq!(proj.pixel(0), (0, 0));
        assert_eq!(proj.pixel(31), (0, 12));
        assert_eq!(proj.pixel(31 + 5), (100, 12));
        assert_eq!(proj.pixel(20 * 31 - 1), (600, 228));
    }

    #[test]
    fn projected_corner_stays_inside_depth_extent() {
        let proj = GridProjection::new((4, 4), (16, 16));
        let (x, y) = proj.pixel(15);
        assert!(x < 16 && y < 16);
    }
}
