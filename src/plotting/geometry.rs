//! Pure geometry for the report charts: pie slices, scaled bars and table
//! grids. Nothing here draws; the results are positioned primitives.

use super::canvas::Point;
use super::styles::PALETTE;
use crate::error::{ReportError, Result};

/// Label anchors sit at this fraction of the radius from the center.
pub const LABEL_RADIUS_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub label: String,
    pub value: f64,
    /// Share of the total basis, 0-100.
    pub percentage: f64,
    pub color_index: usize,
    pub label_anchor: Point,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle / 2.0
    }

    /// The label drawn on the slice, e.g. `AI-assisted (66.67%)`.
    pub fn caption(&self) -> String {
        format!("{} ({:.2}%)", self.label, self.percentage)
    }
}

/// Lay out consecutive pie slices starting at angle 0.
///
/// `total_basis` is either the sum of the values or 100 when the values are
/// already percentages.
pub fn layout_pie(
    entries: &[(String, f64)],
    total_basis: f64,
    center: Point,
    radius: f64,
) -> Result<Vec<PieSlice>> {
    if entries.is_empty() {
        return Err(ReportError::invalid_chart("pie chart has no entries"));
    }
    if entries.iter().any(|(_, v)| !v.is_finite() || *v < 0.0) {
        return Err(ReportError::invalid_chart("pie values must be finite and non-negative"));
    }
    if entries.iter().all(|(_, v)| *v == 0.0) {
        return Err(ReportError::invalid_chart("all pie values are zero"));
    }
    if !total_basis.is_finite() || total_basis <= 0.0 {
        return Err(ReportError::invalid_chart(format!(
            "pie basis must be positive, got {}",
            total_basis
        )));
    }

    let mut start_angle = 0.0;
    let slices: Vec<PieSlice> = entries
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let sweep_angle = 360.0 * value / total_basis;
            let mid = (start_angle + sweep_angle / 2.0_f64).to_radians();
            let slice = PieSlice {
                start_angle,
                sweep_angle,
                label: label.clone(),
                value: *value,
                percentage: value / total_basis * 100.0,
                color_index: i % PALETTE.len(),
                label_anchor: center.offset(
                    radius * LABEL_RADIUS_FACTOR * mid.cos(),
                    radius * LABEL_RADIUS_FACTOR * mid.sin(),
                ),
            };
            start_angle += sweep_angle;
            slice
        })
        .collect();

    let sum: f64 = entries.iter().map(|(_, v)| v).sum();
    if (sum - total_basis).abs() <= 1e-9 * total_basis {
        debug_assert!((start_angle - 360.0).abs() < 1e-6, "slices sweep {} degrees", start_angle);
    }

    Ok(slices)
}

/// Placement parameters for a horizontal bar list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    /// Top-left corner of the first bar.
    pub origin: Point,
    pub max_bar_width: f64,
    pub bar_height: f64,
    pub row_spacing: f64,
}

impl BarGeometry {
    pub fn row_pitch(&self) -> f64 {
        self.bar_height + self.row_spacing
    }

    /// Vertical extent of `rows` bars including their spacing.
    pub fn height_for(&self, rows: usize) -> f64 {
        rows as f64 * self.row_pitch()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub height: f64,
    pub label: String,
    pub value: usize,
}

/// Scale bars so the largest value spans `max_bar_width`.
pub fn layout_bars(entries: &[(String, usize)], geometry: &BarGeometry) -> Result<Vec<Bar>> {
    let max = entries
        .iter()
        .map(|(_, v)| *v)
        .max()
        .ok_or_else(|| ReportError::invalid_chart("bar chart has no entries"))?;
    if max == 0 {
        return Err(ReportError::invalid_chart("all bar values are zero"));
    }

    let scale = geometry.max_bar_width / max as f64;
    Ok(entries
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar {
            x: geometry.origin.x,
            y: geometry.origin.y + i as f64 * geometry.row_pitch(),
            length: *value as f64 * scale,
            height: geometry.bar_height,
            label: label.clone(),
            value: *value,
        })
        .collect())
}

/// Placement parameters for a table grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub origin: Point,
    pub column_width: f64,
    pub row_height: f64,
    /// Header texts; two columns (key, count) or three (key, count, share).
    pub headers: Vec<String>,
}

impl GridGeometry {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn width(&self) -> f64 {
        self.column_count() as f64 * self.column_width
    }

    /// Header row plus one row per entry.
    pub fn height_for(&self, rows: usize) -> f64 {
        (rows + 1) as f64 * self.row_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Row 0 is the header.
    pub row: usize,
    pub col: usize,
    /// Top-left corner of the cell.
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub cells: Vec<TableCell>,
    pub rows: usize,
    pub width: f64,
    pub height: f64,
}

/// Lay out a table with a header row. A third column, when present, holds
/// each entry's share of the value sum.
pub fn layout_table(entries: &[(String, usize)], grid: &GridGeometry) -> TableLayout {
    let columns = grid.column_count();
    let sum: usize = entries.iter().map(|(_, v)| v).sum();
    let cell = |row: usize, col: usize, text: String| TableCell {
        row,
        col,
        x: grid.origin.x + col as f64 * grid.column_width,
        y: grid.origin.y + row as f64 * grid.row_height,
        text,
    };

    let mut cells: Vec<TableCell> = grid
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| cell(0, col, header.clone()))
        .collect();

    for (i, (key, value)) in entries.iter().enumerate() {
        let row = i + 1;
        let share = if sum > 0 {
            *value as f64 / sum as f64 * 100.0
        } else {
            0.0
        };
        let texts = [key.clone(), value.to_string(), format!("{:.2}%", share)];
        cells.extend(
            texts
                .into_iter()
                .take(columns)
                .enumerate()
                .map(|(col, text)| cell(row, col, text)),
        );
    }

    TableLayout {
        cells,
        rows: entries.len() + 1,
        width: grid.width(),
        height: grid.height_for(entries.len()),
    }
}
