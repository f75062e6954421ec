//! Cleanup applied to the scored table before publishing.
//!
//! Steps run in a fixed order: median fill for numeric columns, mode fill for anything
//! still missing, exact-duplicate removal, label encoding of categorical columns, then
//! per-column standardization.

use crate::frame::{Cell, Column, Frame};
use crate::schema::{ColumnKind, is_identity_column};

const STDEV_EPSILON: f64 = 1e-12;

/// Runs every step and returns the cleaned frame. Unknown column names in either list are
/// ignored. Categorical columns that are not text are left as they are.
pub fn normalize(frame: &Frame, categorical_cols: &[String], numeric_cols: &[String]) -> Frame {
    let mut out = frame.clone();
    for column in &mut out.columns {
        if column.kind == ColumnKind::Numeric {
            fill_with_median(column);
        }
    }
    for column in &mut out.columns {
        fill_with_mode(column);
    }
    let mut out = drop_duplicate_rows(&out);
    for name in categorical_cols {
        if let Some(column) = out.column_mut(name)
            && column.kind == ColumnKind::Text
        {
            label_encode(column);
        }
    }
    for name in numeric_cols {
        if let Some(column) = out.column_mut(name)
            && column.kind == ColumnKind::Numeric
        {
            standardize(column);
        }
    }
    out
}

pub fn categorical_columns(frame: &Frame) -> Vec<String> {
    frame
        .names_of_kind(ColumnKind::Text)
        .into_iter()
        .filter(|name| !is_identity_column(name))
        .collect()
}

pub fn numeric_columns(frame: &Frame) -> Vec<String> {
    frame.names_of_kind(ColumnKind::Numeric)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn fill_with_median(column: &mut Column) {
    let present: Vec<f64> = column.cells.iter().filter_map(Cell::as_number).collect();
    let Some(m) = median(&present) else {
        return;
    };
    for cell in &mut column.cells {
        if cell.is_missing() {
            *cell = Cell::Number(m);
        }
    }
}

/// Most frequent present value; on ties the one seen first wins.
pub fn mode(cells: &[Cell]) -> Option<Cell> {
    let mut counts: Vec<(&Cell, usize)> = Vec::new();
    for cell in cells.iter().filter(|c| !c.is_missing()) {
        match counts.iter_mut().find(|(seen, _)| seen.same_as(cell)) {
            Some((_, n)) => *n += 1,
            None => counts.push((cell, 1)),
        }
    }
    let mut best: Option<(&Cell, usize)> = None;
    for (cell, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((cell, n));
        }
    }
    best.map(|(cell, _)| cell.clone())
}

fn fill_with_mode(column: &mut Column) {
    if !column.cells.iter().any(Cell::is_missing) {
        return;
    }
    let Some(m) = mode(&column.cells) else {
        return;
    };
    for cell in &mut column.cells {
        if cell.is_missing() {
            *cell = m.clone();
        }
    }
}

pub fn drop_duplicate_rows(frame: &Frame) -> Frame {
    let mut keep: Vec<usize> = Vec::new();
    for idx in 0..frame.row_count() {
        let row = frame.row(idx);
        let seen = keep.iter().any(|&k| {
            frame
                .row(k)
                .iter()
                .zip(&row)
                .all(|(a, b)| a.same_as(b))
        });
        if !seen {
            keep.push(idx);
        }
    }
    frame.select_rows(&keep)
}

/// Replaces each distinct value with its first-seen index. Missing stays missing.
pub fn label_encode(column: &mut Column) {
    let mut codes: Vec<Cell> = Vec::new();
    for cell in &mut column.cells {
        if cell.is_missing() {
            continue;
        }
        let code = match codes.iter().position(|c| c.same_as(cell)) {
            Some(code) => code,
            None => {
                codes.push(cell.clone());
                codes.len() - 1
            }
        };
        *cell = Cell::Number(code as f64);
    }
    column.kind = ColumnKind::Numeric;
}

/// `(x - mean) / std` with the population standard deviation. A column with no spread
/// becomes all zeros.
pub fn standardize(column: &mut Column) {
    let present: Vec<f64> = column.cells.iter().filter_map(Cell::as_number).collect();
    if present.is_empty() {
        return;
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let std = (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    for cell in &mut column.cells {
        if let Cell::Number(v) = cell {
            *v = if std < STDEV_EPSILON {
                0.0
            } else {
                (*v - mean) / std
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str, vals: &[Option<&str>]) -> Column {
        Column {
            name: name.to_string(),
            kind: ColumnKind::Text,
            cells: vals
                .iter()
                .map(|v| v.map_or(Cell::Missing, |s| Cell::Text(s.to_string())))
                .collect(),
        }
    }

    fn num(name: &str, vals: &[Option<f64>]) -> Column {
        Column {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
            cells: vals.iter().map(|v| Cell::from_option(*v)).collect(),
        }
    }

    fn numbers(column: &Column) -> Vec<f64> {
        column.cells.iter().filter_map(Cell::as_number).collect()
    }

    #[test]
    fn label_codes_follow_first_seen_order() {
        let mut col = text("Team", &[Some("B"), Some("A"), Some("B"), Some("C")]);
        label_encode(&mut col);
        assert_eq!(numbers(&col), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(col.kind, ColumnKind::Numeric);
    }

    #[test]
    fn median_fills_numeric_gaps_before_mode() {
        // mode of y is 2, median is 4
        let frame = Frame::new(vec![
            text("Name", &[Some("a"), Some("b"), Some("c"), Some("d")]),
            num("x", &[Some(2.0), Some(2.0), Some(9.0), Some(10.0)]),
            num("y", &[Some(2.0), Some(4.0), Some(9.0), None]),
        ]);
        let out = normalize(&frame, &[], &[]);
        assert_eq!(numbers(out.column("y").unwrap())[3], 4.0);
    }

    #[test]
    fn mode_fills_text_gaps_first_seen_wins() {
        let frame = Frame::new(vec![
            text("Name", &[Some("a"), Some("b"), Some("c"), Some("d"), Some("e")]),
            text("Team", &[Some("MI"), Some("CSK"), Some("CSK"), Some("MI"), None]),
        ]);
        let out = normalize(&frame, &[], &[]);
        assert_eq!(
            out.column("Team").unwrap().cells[4],
            Cell::Text("MI".to_string())
        );
    }

    #[test]
    fn exact_duplicates_are_removed() {
        let frame = Frame::new(vec![
            text("Name", &[Some("a"), Some("a"), Some("b")]),
            num("x", &[Some(1.0), Some(1.0), Some(1.0)]),
        ]);
        let out = drop_duplicate_rows(&frame);
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn standardized_columns_have_zero_mean_unit_std() {
        let mut col = num("x", &[Some(3.0), Some(8.0), Some(10.0), Some(21.0)]);
        standardize(&mut col);
        let vals = numbers(&col);
        let n = vals.len() as f64;
        let mean = vals.iter().sum::<f64>() / n;
        let std = (vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 1e-9);
        assert!((std - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_column_becomes_zeros() {
        let mut col = num("x", &[Some(4.0), Some(4.0), Some(4.0)]);
        standardize(&mut col);
        assert_eq!(numbers(&col), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn categorical_selection_skips_name() {
        let frame = Frame::new(vec![
            text("Name", &[Some("a")]),
            text("Team", &[Some("MI")]),
            num("x", &[Some(1.0)]),
        ]);
        assert_eq!(categorical_columns(&frame), vec!["Team"]);
        assert_eq!(numeric_columns(&frame), vec!["x"]);
    }

    #[test]
    fn all_missing_column_stays_missing() {
        let frame = Frame::new(vec![
            text("Name", &[Some("a"), Some("b")]),
            num("x", &[None, None]),
        ]);
        let out = normalize(&frame, &[], &["x".to_string()]);
        assert!(out.column("x").unwrap().cells.iter().all(Cell::is_missing));
    }
}
