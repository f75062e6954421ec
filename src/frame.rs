use crate::schema::ColumnKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Cell::Missing, Cell::Number)
    }

    /// Equality for dedup and mode counting. Floats compare bitwise.
    pub fn same_as(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Missing, Cell::Missing) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

/// Column-major table with declared column kinds. Stages consume one and return a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<Column>,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row(&self, idx: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[idx]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count()).map(|idx| self.row(idx))
    }

    pub fn names_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn select_rows(&self, keep: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                cells: keep.iter().map(|&i| c.cells[i].clone()).collect(),
            })
            .collect();
        Frame { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rows_keeps_order() {
        let frame = Frame::new(vec![Column {
            name: "x".to_string(),
            kind: ColumnKind::Numeric,
            cells: vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)],
        }]);
        let picked = frame.select_rows(&[2, 0]);
        assert_eq!(picked.row_count(), 2);
        assert_eq!(picked.columns[0].cells[0], Cell::Number(3.0));
    }

    #[test]
    fn same_as_separates_kinds() {
        assert!(Cell::Missing.same_as(&Cell::Missing));
        assert!(!Cell::Number(1.0).same_as(&Cell::Text("1".to_string())));
        assert!(Cell::Text("MI".to_string()).same_as(&Cell::Text("MI".to_string())));
    }
}
