/// Dense `[node][node][channel]` matrix sized to the actual network.
///
/// Rows and columns are the dense node indices handed out by the
/// [`NetworkModel`](crate::domain::network::network_model::NetworkModel), never raw node ids.
/// Every access is bounds-checked; out-of-range lookups return `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatrix<T> {
    num_nodes: usize,
    num_channels: usize,
    data: Vec<T>,
}

impl<T: Copy> NodeMatrix<T> {
    pub fn new(num_nodes: usize, num_channels: usize, initial: T) -> Self {
        Self { num_nodes, num_channels, data: vec![initial; num_nodes * num_nodes * num_channels] }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn offset(&self, row: usize, col: usize, channel: usize) -> Option<usize> {
        if row >= self.num_nodes || col >= self.num_nodes || channel >= self.num_channels {
            return None;
        }
        Some((row * self.num_nodes + col) * self.num_channels + channel)
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        self.offset(row, col, channel).map(|offset| self.data[offset])
    }

    /// Writes a cell. Returns `false` (and leaves the matrix untouched) when out of range.
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: T) -> bool {
        match self.offset(row, col, channel) {
            Some(offset) => {
                self.data[offset] = value;
                true
            }
            None => false,
        }
    }
}

impl NodeMatrix<bool> {
    /// `true` if the cell is set; out-of-range cells read as `false`.
    pub fn is_set(&self, row: usize, col: usize, channel: usize) -> bool {
        self.get(row, col, channel).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_access_is_rejected() {
        let mut matrix = NodeMatrix::new(3, 2, 0.0_f64);

        assert!(matrix.set(2, 1, 1, 4.5));
        assert_eq!(matrix.get(2, 1, 1), Some(4.5));

        assert!(!matrix.set(3, 0, 0, 1.0));
        assert_eq!(matrix.get(0, 3, 0), None);
        assert_eq!(matrix.get(0, 0, 2), None);
    }

    #[test]
    fn test_cells_are_independent_per_channel() {
        let mut matrix = NodeMatrix::new(2, 4, false);
        matrix.set(0, 1, 3, true);

        assert!(matrix.is_set(0, 1, 3));
        assert!(!matrix.is_set(0, 1, 2));
        assert!(!matrix.is_set(1, 0, 3));
        assert!(!matrix.is_set(9, 9, 9));
    }
}
