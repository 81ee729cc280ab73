// SPDX-License-Identifier: MIT OR Apache-2.0
//! Grid snapping for node placement.

/// Default grid cell size in canvas units
pub const DEFAULT_GRID_SIZE: f32 = 20.0;

/// Snap a single coordinate to the nearest grid line.
///
/// Half-cells round toward positive infinity, so `-10` snaps to `0` on a
/// 20 unit grid.
pub fn snap(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap a position to the grid
pub fn snap_position(pos: [f32; 2], grid_size: f32) -> [f32; 2] {
    [snap(pos[0], grid_size), snap(pos[1], grid_size)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest_cell() {
        assert_eq!(snap(0.0, 20.0), 0.0);
        assert_eq!(snap(9.9, 20.0), 0.0);
        assert_eq!(snap(10.0, 20.0), 20.0);
        assert_eq!(snap(33.0, 20.0), 40.0);
        assert_eq!(snap(-31.0, 20.0), -40.0);
        assert_eq!(snap_position([107.0, 251.0], DEFAULT_GRID_SIZE), [100.0, 260.0]);
    }

    #[test]
    fn test_half_cells_round_up() {
        assert_eq!(snap(-10.0, 20.0), 0.0);
        assert_eq!(snap(-30.0, 20.0), -20.0);
        assert_eq!(snap(-50.0, 20.0), -40.0);
        assert_eq!(snap(30.0, 20.0), 40.0);
        assert_eq!(snap_position([-10.0, -30.0], DEFAULT_GRID_SIZE), [0.0, -20.0]);
    }

    #[test]
    fn test_snap_is_idempotent() {
        for raw in [-1234.5_f32, -10.0, -0.4, 0.0, 3.3, 19.99, 250.0, 98765.4] {
            for grid in [1.0_f32, 8.0, 20.0, 25.5] {
                let once = snap(raw, grid);
                assert_eq!(snap(once, grid), once, "raw {raw} grid {grid}");
            }
        }
    }

    #[test]
    fn test_degenerate_grid_leaves_value() {
        assert_eq!(snap(13.7, 0.0), 13.7);
        assert_eq!(snap(13.7, -5.0), 13.7);
    }
}
