use std::collections::HashMap;

use foundation::math::Vec2;

/// Uniform bucket grid for neighbour lookups.
///
/// With a cell size of at least the largest interaction distance, every
/// interacting pair lies in the same or an adjacent cell. Lookups visit the
/// 3x3 block in a fixed order and each bucket keeps insertion order, so the
/// candidate sequence is deterministic.
#[derive(Debug)]
pub(crate) struct CellGrid {
    cell_px: f64,
    cells: HashMap<u64, Vec<usize>>,
}

impl CellGrid {
    pub(crate) fn build<I>(points: I, cell_px: f64) -> Self
    where
        I: IntoIterator<Item = (usize, Vec2)>,
    {
        let cell_px = if cell_px.is_finite() && cell_px > 0.0 {
            cell_px
        } else {
            1.0
        };
        let mut cells: HashMap<u64, Vec<usize>> = HashMap::new();
        for (idx, p) in points {
            let (cx, cy) = cell_of(p, cell_px);
            cells.entry(cell_key(cx, cy)).or_default().push(idx);
        }
        Self { cell_px, cells }
    }

    /// Indices bucketed in the cell of `p` or any of its eight neighbours.
    pub(crate) fn neighbours(&self, p: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = cell_of(p, self.cell_px);
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| cell_key(cx + dx, cy + dy)))
            .filter_map(|key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }
}

fn cell_of(p: Vec2, cell_px: f64) -> (i32, i32) {
    (
        (p.x / cell_px).floor() as i32,
        (p.y / cell_px).floor() as i32,
    )
}

fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | (cy as u32 as u64)
}
