//! Pixel-space viewport dimensions.

/// The drawable area in device-independent pixels.
///
/// One pixel column per terminal cell, two pixel rows per terminal row
/// (half-block rendering doubles the vertical resolution). Dimensions are
/// floored to a single cell: hosts report zero-sized terminals (minimized
/// windows), and an empty viewport would give effects nothing to sample
/// positions from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(2.0),
        }
    }

    /// Build a viewport from a terminal size in cells.
    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as f32, rows as f32 * 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Cramped terminals get reduced particle densities and distances.
    pub fn is_narrow(&self) -> bool {
        self.width < 100.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_height_is_doubled() {
        let vp = Viewport::from_cells(120, 40);
        assert_eq!(vp.width, 120.0);
        assert_eq!(vp.height, 80.0);
        assert_eq!(vp.area(), 9600.0);
        assert!(!vp.is_narrow());
    }

    #[test]
    fn small_terminal_is_narrow() {
        assert!(Viewport::from_cells(80, 24).is_narrow());
    }

    #[test]
    fn zero_sized_terminals_floor_to_one_cell() {
        assert_eq!(Viewport::from_cells(0, 40), Viewport::new(1.0, 80.0));
        assert_eq!(Viewport::from_cells(120, 0), Viewport::new(120.0, 2.0));
        let vp = Viewport::new(0.0, 0.0);
        assert_eq!((vp.width, vp.height), (1.0, 2.0));
    }
}
