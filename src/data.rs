//! Data
//!
//! Dense containers handed to the learners. Feature data is stored column-major so
//! that binning and histogram construction can slice whole columns.

/// Contiguous Column Major Matrix data container.
///
/// Holds a borrowed slice of `rows * cols` values, where column `j` occupies
/// `data[j * rows..(j + 1) * rows]`.
#[derive(Debug)]
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Indices into the data row-wise.
    pub index: Vec<usize>,
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new column major Matrix.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Matrix {
            data,
            index: (0..rows).collect(),
            rows,
            cols,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[j * self.rows + i]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        (0..self.cols).map(|j| *self.get(row, j)).collect()
    }

    /// Copy the selected rows into a new column major buffer.
    ///
    /// The returned buffer has `rows.len()` rows and the same number of columns,
    /// ready to be wrapped in a new `Matrix`.
    pub fn take_rows(&self, rows: &[usize]) -> Vec<T> {
        let mut out = Vec::with_capacity(rows.len() * self.cols);
        for col in 0..self.cols {
            let col_data = self.get_col(col);
            out.extend(rows.iter().map(|&i| col_data[i]));
        }
        out
    }
}

/// A lightweight row major matrix whose rows have different lengths.
///
/// Used to hold the cut points of each feature after binning.
#[derive(Debug, Clone, PartialEq)]
pub struct JaggedMatrix<T> {
    /// The contents of the matrix.
    pub data: Vec<T>,
    /// The end index's of the matrix.
    pub ends: Vec<usize>,
}

impl<T> JaggedMatrix<T> {
    /// Create a new jagged matrix.
    pub fn new() -> Self {
        JaggedMatrix {
            data: Vec::new(),
            ends: Vec::new(),
        }
    }

    /// Append a column.
    pub fn push_col<I: IntoIterator<Item = T>>(&mut self, col: I) {
        self.data.extend(col);
        self.ends.push(self.data.len());
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.ends.len()
    }

    /// Get the column of a jagged array.
    pub fn get_col(&self, col: usize) -> &[T] {
        assert!(col < self.ends.len());
        let start = if col == 0 { 0 } else { self.ends[col - 1] };
        &self.data[start..self.ends[col]]
    }
}

impl<T> Default for JaggedMatrix<T> {
    fn default() -> Self {
        Self::new()
    }
}
