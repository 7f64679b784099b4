//! Wheel scrolling.

use super::Grid;
use crate::render::Surface;

/// Wheel delta (pixels) per row or column step.
pub const WHEEL_STEP_PX: f64 = 12.0;

/// Minimum time between two applied wheel events.
pub const WHEEL_MIN_INTERVAL_MS: f64 = 50.0;

/// Whole steps for a wheel delta: positive deltas round up, negative down.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn wheel_steps(delta: f64) -> i64 {
    if !delta.is_finite() {
        return 0;
    }
    let steps = delta / WHEEL_STEP_PX;
    let rounded = if steps > 0.0 {
        steps.ceil()
    } else {
        steps.floor()
    };
    rounded as i64
}

impl<S: Surface> Grid<S> {
    /// Scroll by a wheel delta. Events closer than [`WHEEL_MIN_INTERVAL_MS`]
    /// to the last applied one are dropped. Returns whether the event was
    /// applied.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, now_ms: f64) -> bool {
        if let Some(last) = self.last_wheel_ms {
            if now_ms - last < WHEEL_MIN_INTERVAL_MS {
                return false;
            }
        }
        self.viewport
            .scroll_by(wheel_steps(delta_x), wheel_steps(delta_y));
        self.last_wheel_ms = Some(now_ms);
        self.dirty = true;
        true
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use crate::render::TextStyle;
    use crate::types::{GridId, GridOptions};
    use test_case::test_case;

    struct NullSurface;

    impl Surface for NullSurface {
        type Image = ();
        fn set_size(&mut self, _: u32, _: u32) {}
        fn clear_rect(&mut self, _: Rect) {}
        fn fill_rect(&mut self, _: Rect, _: &str) {}
        fn stroke_path(&mut self, _: &[(f64, f64)], _: &str, _: f64) {}
        fn set_font(&mut self, _: &str) {}
        fn measure_text(&mut self, _: &str) -> f64 {
            0.0
        }
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: TextStyle<'_>) {}
        fn draw_image(&mut self, _: &(), _: Rect) {}
    }

    #[test_case(0.0, 0 ; "zero")]
    #[test_case(1.0, 1 ; "small positive rounds up")]
    #[test_case(12.0, 1 ; "one step")]
    #[test_case(100.0, 9 ; "many steps")]
    #[test_case(-1.0, -1 ; "small negative rounds down")]
    #[test_case(-100.0, -9 ; "many steps back")]
    #[test_case(f64::NAN, 0 ; "nan")]
    fn steps(delta: f64, expected: i64) {
        assert_eq!(wheel_steps(delta), expected);
    }

    #[test]
    fn rate_limited_and_clamped() {
        let mut grid: Grid<NullSurface> = Grid::new(GridId(1), GridOptions::default());
        grid.set_size(100, 10);

        assert!(grid.wheel(0.0, 100.0, 1000.0));
        assert_eq!(grid.viewport().origin_row, 9);
        assert!(!grid.wheel(0.0, 100.0, 1020.0));
        assert_eq!(grid.viewport().origin_row, 9);
        assert!(grid.wheel(0.0, -240.0, 1050.0));
        assert_eq!(grid.viewport().origin_row, 0);

        assert!(grid.wheel(5000.0, 0.0, 2000.0));
        assert_eq!(grid.viewport().origin_col, 10);
    }
}
