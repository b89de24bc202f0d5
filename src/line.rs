//! Bresenham cell line, used to fill the gaps between pointer samples when a
//! drag skips cells.

/// Lazy 8-connected path between two `(row, col)` cells, endpoints included.
/// Clone it before consuming to walk the same path again.
#[derive(Clone, Debug)]
pub struct CellLine {
    row: i64,
    col: i64,
    end_row: i64,
    end_col: i64,
    d_col: i64,
    d_row: i64,
    step_col: i64,
    step_row: i64,
    err: i64,
    remaining: usize,
}

impl CellLine {
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        let (row, col) = (start.0 as i64, start.1 as i64);
        let (end_row, end_col) = (end.0 as i64, end.1 as i64);
        let d_col = (end_col - col).abs();
        let d_row = -(end_row - row).abs();
        Self {
            row,
            col,
            end_row,
            end_col,
            d_col,
            d_row,
            step_col: if col < end_col { 1 } else { -1 },
            step_row: if row < end_row { 1 } else { -1 },
            err: d_col + d_row,
            remaining: d_col.max(-d_row) as usize + 1,
        }
    }
}

impl Iterator for CellLine {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = (self.row as usize, self.col as usize);

        if self.remaining > 0 {
            let e2 = 2 * self.err;
            if e2 >= self.d_row && self.col != self.end_col {
                self.err += self.d_row;
                self.col += self.step_col;
            }
            if e2 <= self.d_col && self.row != self.end_row {
                self.err += self.d_col;
                self.row += self.step_row;
            }
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CellLine {}

impl std::iter::FusedIterator for CellLine {}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
        CellLine::new(a, b).collect()
    }

    #[test]
    fn single_cell() {
        assert_eq!(line((3, 3), (3, 3)), vec![(3, 3)]);
    }

    #[test]
    fn horizontal_and_vertical() {
        assert_eq!(line((0, 0), (0, 3)), vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(line((3, 1), (0, 1)), vec![(3, 1), (2, 1), (1, 1), (0, 1)]);
    }

    #[test]
    fn diagonal() {
        assert_eq!(line((0, 0), (3, 3)), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(line((3, 0), (0, 3)), vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn endpoints_and_connectivity_hold_everywhere() {
        for sr in 0..6 {
            for sc in 0..6 {
                for er in 0..6 {
                    for ec in 0..6 {
                        let pts = line((sr, sc), (er, ec));
                        assert_eq!(pts.first(), Some(&(sr, sc)));
                        assert_eq!(pts.last(), Some(&(er, ec)));
                        for w in pts.windows(2) {
                            let dr = (w[0].0 as i64 - w[1].0 as i64).abs();
                            let dc = (w[0].1 as i64 - w[1].1 as i64).abs();
                            assert!(dr <= 1 && dc <= 1 && (dr + dc) > 0, "{:?}", pts);
                        }
                        let expected = (sr as i64 - er as i64).abs().max((sc as i64 - ec as i64).abs()) + 1;
                        assert_eq!(pts.len() as i64, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn size_hint_is_exact() {
        let it = CellLine::new((0, 0), (2, 7));
        assert_eq!(it.len(), 8);
        assert_eq!(it.clone().count(), 8);
    }
}
