//! Labelled samples and datasets.
//!
//! Samples are fixed-shape records validated once, when a [`Dataset`] is
//! built, so the model code never has to re-check label domains or ragged
//! rows.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::loss::ensure_pm1;
use crate::{Error, Result};

/// One input vector with its bipolar label.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub x: Vec<f64>,
    pub y: i32,
}

impl Sample {
    pub fn new(x: Vec<f64>, y: i32) -> Self {
        Self { x, y }
    }
}

/// A non-empty, finite, indexable sequence of samples sharing one dimension.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
    dim: usize,
}

impl Dataset {
    /// Validate and wrap `samples`.
    ///
    /// Fails if the list is empty, a row has a different length than the
    /// first, a row is empty, or a label is not -1/+1.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        let dim = samples
            .first()
            .map(|s| s.x.len())
            .ok_or_else(|| Error::Domain("dataset must not be empty".to_owned()))?;
        if dim == 0 {
            return Err(Error::Dimension("input dim must be > 0".to_owned()));
        }

        for (i, s) in samples.iter().enumerate() {
            if s.x.len() != dim {
                return Err(Error::dimension(&format!("sample {i}"), dim, s.x.len()));
            }
            ensure_pm1(s.y)
                .map_err(|_| Error::Domain(format!("sample {i} label must be -1 or +1, got {}", s.y)))?;
        }

        Ok(Self { samples, dim })
    }

    /// Build from `(x, y)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<f64>, i32)>,
    {
        Self::new(pairs.into_iter().map(|(x, y)| Sample::new(x, y)).collect())
    }

    /// OR over bipolar inputs: positive if any input is +1.
    pub fn or() -> Self {
        Self::builtin([-1, 1, 1, 1])
    }

    /// AND over bipolar inputs: positive only if both inputs are +1.
    pub fn and() -> Self {
        Self::builtin([-1, -1, -1, 1])
    }

    /// XOR over bipolar inputs: positive if exactly one input is +1.
    pub fn xor() -> Self {
        Self::builtin([-1, 1, 1, -1])
    }

    /// The four corners of `{-1, +1}^2` in the order
    /// `(-1,-1), (-1,1), (1,-1), (1,1)` with the given labels.
    fn builtin(labels: [i32; 4]) -> Self {
        const CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]];
        let samples = CORNERS
            .iter()
            .zip(labels)
            .map(|(x, y)| Sample::new(x.to_vec(), y))
            .collect();
        Self { samples, dim: 2 }
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    /// Always false for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    /// Returns the `idx`-th sample.
    ///
    /// Panics if `idx >= len`.
    pub fn sample(&self, idx: usize) -> &Sample {
        &self.samples[idx]
    }
}

/// One placement of a shape on a board.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Board cells: +1 where the shape is, -1 elsewhere.
    pub grid: Vec<Vec<f64>>,
    /// (top, left) offset of the shape.
    pub pos: (usize, usize),
}

/// Every translation of `mask` that fits on a `board_h x board_w` board.
///
/// Mask cells `> 0` belong to the shape. Placements are ordered by top,
/// then left.
pub fn generate_translations(mask: &[Vec<i32>], board_h: usize, board_w: usize) -> Result<Vec<Placement>> {
    let shape_h = mask.len();
    let shape_w = mask.first().map(Vec::len).unwrap_or(0);
    if shape_h == 0 || shape_w == 0 {
        return Err(Error::Domain("shape mask must be non-empty".to_owned()));
    }
    if mask.iter().any(|row| row.len() != shape_w) {
        return Err(Error::Dimension("shape mask rows must have equal length".to_owned()));
    }
    if board_h < shape_h || board_w < shape_w {
        return Err(Error::Domain(format!(
            "board {board_h}x{board_w} is smaller than shape {shape_h}x{shape_w}"
        )));
    }

    let mut placements = Vec::with_capacity((board_h - shape_h + 1) * (board_w - shape_w + 1));
    for top in 0..=board_h - shape_h {
        for left in 0..=board_w - shape_w {
            let mut grid = vec![vec![-1.0; board_w]; board_h];
            for (r, row) in mask.iter().enumerate() {
                for (c, &cell) in row.iter().enumerate() {
                    if cell > 0 {
                        grid[top + r][left + c] = 1.0;
                    }
                }
            }
            placements.push(Placement {
                grid,
                pos: (top, left),
            });
        }
    }
    Ok(placements)
}

/// Good (+1) vs bad (-1) shapes on a board, flattened row-major.
///
/// With `translations`, every placement of each mask is included; without,
/// each mask must already be board-sized and is used as is.
pub fn make_shape_dataset(
    good: &[Vec<i32>],
    bad: &[Vec<i32>],
    board: (usize, usize),
    translations: bool,
) -> Result<Dataset> {
    let (board_h, board_w) = board;
    let mut samples = Vec::new();

    for (mask, label) in [(good, 1), (bad, -1)] {
        if translations {
            for placement in generate_translations(mask, board_h, board_w)? {
                samples.push(Sample::new(placement.grid.concat(), label));
            }
        } else {
            if mask.len() != board_h || mask.iter().any(|row| row.len() != board_w) {
                return Err(Error::Dimension(format!(
                    "mask must be {board_h}x{board_w} when translations are disabled"
                )));
            }
            let x = mask
                .iter()
                .flatten()
                .map(|&cell| if cell > 0 { 1.0 } else { -1.0 })
                .collect();
            samples.push(Sample::new(x, label));
        }
    }

    Dataset::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_validates_rows_and_labels() {
        assert!(Dataset::new(vec![]).is_err());
        assert!(matches!(
            Dataset::from_pairs([(vec![1.0, 2.0], 1), (vec![1.0], -1)]),
            Err(Error::Dimension(_))
        ));
        assert!(matches!(
            Dataset::from_pairs([(vec![1.0, 2.0], 0)]),
            Err(Error::Domain(_))
        ));

        let ok = Dataset::from_pairs([(vec![1.0, 2.0], 1), (vec![0.0, 1.0], -1)]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.dim(), 2);
    }

    #[test]
    fn builtin_truth_tables() {
        let labels = |d: Dataset| d.samples().iter().map(|s| s.y).collect::<Vec<_>>();
        assert_eq!(labels(Dataset::or()), vec![-1, 1, 1, 1]);
        assert_eq!(labels(Dataset::and()), vec![-1, -1, -1, 1]);
        assert_eq!(labels(Dataset::xor()), vec![-1, 1, 1, -1]);
        assert_eq!(Dataset::xor().sample(1).x, vec![-1.0, 1.0]);
    }

    #[test]
    fn translations_cover_every_offset() {
        let mask = vec![vec![1, 1]];
        let placements = generate_translations(&mask, 2, 3).unwrap();
        assert_eq!(placements.len(), 4);
        assert_eq!(placements[0].pos, (0, 0));
        assert_eq!(placements[3].pos, (1, 1));
        assert_eq!(
            placements[3].grid,
            vec![vec![-1.0, -1.0, -1.0], vec![-1.0, 1.0, 1.0]]
        );

        assert!(generate_translations(&[], 2, 2).is_err());
        assert!(generate_translations(&mask, 1, 1).is_err());
    }

    #[test]
    fn shape_dataset_labels_good_and_bad() {
        let good = vec![vec![1, 1]];
        let bad = vec![vec![1], vec![1]];
        let data = make_shape_dataset(&good, &bad, (2, 2), true).unwrap();
        // 2 horizontal placements + 2 vertical placements.
        assert_eq!(data.len(), 4);
        assert_eq!(data.dim(), 4);
        assert_eq!(data.samples().iter().filter(|s| s.y == 1).count(), 2);

        let fixed = make_shape_dataset(
            &[vec![1, 0], vec![0, 1]],
            &[vec![0, 1], vec![1, 0]],
            (2, 2),
            false,
        )
        .unwrap();
        assert_eq!(fixed.sample(0).x, vec![1.0, -1.0, -1.0, 1.0]);
        assert!(make_shape_dataset(&good, &bad, (2, 2), false).is_err());
    }
}
