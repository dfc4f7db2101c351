//! Sector labels and row-major sector tables.

use std::cmp::Ordering;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::errors::SymError;

/// A single integer component of a sector label.
pub type Charge = i64;

/// Owned sector label. Rows compare lexicographically.
pub type Sector = Vec<Charge>;

/// Ordered table of sectors sharing one width.
///
/// Conceptually a 2D integer array with axes `[s, q]`: rows are sectors, columns the charge
/// components needed to label one sector. Storage is a single flat buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSectorArray", into = "RawSectorArray")]
pub struct SectorArray {
    width: usize,
    data: Vec<Charge>,
}

#[derive(Serialize, Deserialize)]
struct RawSectorArray {
    width: usize,
    rows: Vec<Sector>,
}

impl TryFrom<RawSectorArray> for SectorArray {
    type Error = SymError;

    fn try_from(raw: RawSectorArray) -> Result<Self, Self::Error> {
        SectorArray::from_rows(raw.width, raw.rows)
    }
}

impl From<SectorArray> for RawSectorArray {
    fn from(array: SectorArray) -> Self {
        RawSectorArray {
            width: array.width,
            rows: array.to_rows(),
        }
    }
}

fn width_error(expected: usize, found: usize) -> SymError {
    SymError::validation("row-width-mismatch", "sector row has the wrong number of charges")
        .with_context("expected", expected)
        .with_context("found", found)
}

impl SectorArray {
    /// Creates an empty table whose rows will have `width` charges.
    pub fn empty(width: usize) -> Self {
        Self {
            width,
            data: Vec::new(),
        }
    }

    /// Creates an empty table with room for `rows` sectors.
    pub fn with_capacity(width: usize, rows: usize) -> Self {
        Self {
            width,
            data: Vec::with_capacity(width * rows),
        }
    }

    /// Builds a table from individual rows, checking that each row has `width` charges.
    pub fn from_rows<I, R>(width: usize, rows: I) -> Result<Self, SymError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Charge]>,
    {
        if width == 0 {
            return Err(SymError::validation(
                "zero-width",
                "sector tables need at least one charge per row",
            ));
        }
        let mut array = Self::empty(width);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(width_error(width, row.len()));
            }
            array.data.extend_from_slice(row);
        }
        Ok(array)
    }

    /// Builds a table from a flat row-major buffer.
    pub fn from_flat(width: usize, data: Vec<Charge>) -> Result<Self, SymError> {
        if width == 0 || data.len() % width != 0 {
            return Err(SymError::validation(
                "flat-length-mismatch",
                "flat buffer length is not a multiple of the row width",
            )
            .with_context("width", width)
            .with_context("len", data.len()));
        }
        Ok(Self { width, data })
    }

    /// Builds a one-row table holding `sector`.
    pub fn single(sector: &[Charge]) -> Self {
        Self {
            width: sector.len(),
            data: sector.to_vec(),
        }
    }

    /// Number of charges per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len().checked_div(self.width).unwrap_or(0)
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns row `idx`; panics when out of bounds.
    pub fn row(&self, idx: usize) -> &[Charge] {
        &self.data[idx * self.width..(idx + 1) * self.width]
    }

    /// Returns row `idx` if it exists.
    pub fn get(&self, idx: usize) -> Option<&[Charge]> {
        (idx < self.len()).then(|| self.row(idx))
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Charge> {
        self.data.chunks_exact(self.width.max(1))
    }

    /// Appends a row of `width` charges.
    pub fn push(&mut self, sector: &[Charge]) -> Result<(), SymError> {
        if sector.len() != self.width {
            return Err(width_error(self.width, sector.len()));
        }
        self.data.extend_from_slice(sector);
        Ok(())
    }

    /// Appends all rows of a table with the same width.
    pub fn extend_from(&mut self, other: &SectorArray) -> Result<(), SymError> {
        if other.width != self.width {
            return Err(width_error(self.width, other.width));
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Applies `f` to every charge, keeping the shape.
    pub fn map_charges(&self, f: impl Fn(Charge) -> Charge) -> SectorArray {
        Self {
            width: self.width,
            data: self.data.iter().map(|&c| f(c)).collect(),
        }
    }

    /// Flat row-major view of the charges.
    pub fn as_flat(&self) -> &[Charge] {
        &self.data
    }

    /// Copies the rows into owned sectors.
    pub fn to_rows(&self) -> Vec<Sector> {
        self.rows().map(<[Charge]>::to_vec).collect()
    }

    /// Returns the table with rows reordered so that `out[k] == self[perm[k]]`.
    pub fn permuted(&self, perm: &[usize]) -> SectorArray {
        let mut out = Self::with_capacity(self.width, perm.len());
        for &idx in perm {
            out.data.extend_from_slice(self.row(idx));
        }
        out
    }

    /// Returns the columns `start..end` of every row as a new table.
    pub fn columns(&self, start: usize, end: usize) -> SectorArray {
        let mut out = Self::with_capacity(end - start, self.len());
        for row in self.rows() {
            out.data.extend_from_slice(&row[start..end]);
        }
        out
    }

    /// Concatenates tables with equal row counts along the charge axis.
    pub fn hstack(parts: &[SectorArray]) -> SectorArray {
        let width = parts.iter().map(|part| part.width).sum();
        let len = parts.first().map_or(0, SectorArray::len);
        let mut out = Self::with_capacity(width, len);
        for idx in 0..len {
            for part in parts {
                out.data.extend_from_slice(part.row(idx));
            }
        }
        out
    }

    /// Stable permutation that sorts the rows lexicographically.
    pub fn lexsort_permutation(&self) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..self.len()).collect();
        perm.sort_by(|&a, &b| self.row(a).cmp(self.row(b)));
        perm
    }

    /// Index of the first row that is not strictly greater than its predecessor.
    pub fn first_unsorted_row(&self) -> Option<usize> {
        (1..self.len()).find(|&idx| self.row(idx - 1).cmp(self.row(idx)) != Ordering::Less)
    }

    /// Whether rows are strictly increasing (sorted and pairwise distinct).
    pub fn is_strictly_sorted(&self) -> bool {
        self.first_unsorted_row().is_none()
    }

    /// Binary search over a strictly sorted table.
    pub fn binary_search(&self, sector: &[Charge]) -> Result<usize, usize> {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.row(mid).cmp(sector) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }
}

impl Index<usize> for SectorArray {
    type Output = [Charge];

    fn index(&self, idx: usize) -> &Self::Output {
        self.row(idx)
    }
}

/// Inverse of a permutation: `inv[perm[k]] == k`.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (k, &p) in perm.iter().enumerate() {
        inv[p] = k;
    }
    inv
}

/// Whether `perm` contains every index `0..perm.len()` exactly once.
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &p in perm {
        match seen.get_mut(p) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Reorders `values` so that `out[k] == values[perm[k]]`.
pub fn permute<T: Clone>(values: &[T], perm: &[usize]) -> Vec<T> {
    perm.iter().map(|&idx| values[idx].clone()).collect()
}
