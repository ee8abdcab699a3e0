//! Report layout: places every section below the previous one and draws the
//! result onto a [`Canvas`].
//!
//! Layout and drawing are separate steps. [`ReportLayout::plan`] threads a
//! single vertical cursor through the configured sections and produces a
//! [`ReportPlan`] whose height depends on the data; [`render`] then only
//! replays the plan.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::canvas::{Canvas, Point};
use super::geometry::{
    layout_bars, layout_pie, layout_table, Bar, BarGeometry, GridGeometry, PieSlice, TableLayout,
};
use super::styles::{palette_color, LayoutMetrics, ReportTheme, TextStyle};
use crate::analysis::TagRule;
use crate::error::Result;
use crate::types::{FrequencyTable, ReportData};

/// Which frequency table a section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    Authors,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    Bars,
    Grid,
}

/// One entry of the configurable section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    /// Summary lines with the pie chart beside them.
    Summary,
    Table(TableSource, TableStyle),
    Legend,
}

impl SectionKind {
    pub fn default_order() -> Vec<SectionKind> {
        vec![
            SectionKind::Header,
            SectionKind::Summary,
            SectionKind::Table(TableSource::Authors, TableStyle::Bars),
            SectionKind::Table(TableSource::Tags, TableStyle::Grid),
            SectionKind::Legend,
        ]
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let (name, style) = match lowered.split_once(':') {
            Some((name, style)) => (name, Some(style)),
            None => (lowered.as_str(), None),
        };
        let table_style = |default: TableStyle| match style {
            None => Ok(default),
            Some("bars") => Ok(TableStyle::Bars),
            Some("grid") => Ok(TableStyle::Grid),
            Some(other) => Err(format!(
                "Invalid table style: {}. Valid options: bars, grid",
                other
            )),
        };
        match (name, style) {
            ("header", None) => Ok(SectionKind::Header),
            ("summary", None) => Ok(SectionKind::Summary),
            ("legend", None) => Ok(SectionKind::Legend),
            ("authors", _) => Ok(SectionKind::Table(
                TableSource::Authors,
                table_style(TableStyle::Bars)?,
            )),
            ("tags", _) => Ok(SectionKind::Table(
                TableSource::Tags,
                table_style(TableStyle::Grid)?,
            )),
            _ => Err(format!(
                "Invalid section: {}. Valid options: header, summary, \
                 authors[:bars|grid], tags[:bars|grid], legend",
                s
            )),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = |s: &TableStyle| match s {
            TableStyle::Bars => "bars",
            TableStyle::Grid => "grid",
        };
        match self {
            SectionKind::Header => write!(f, "header"),
            SectionKind::Summary => write!(f, "summary"),
            SectionKind::Table(TableSource::Authors, s) => write!(f, "authors:{}", style(s)),
            SectionKind::Table(TableSource::Tags, s) => write!(f, "tags:{}", style(s)),
            SectionKind::Legend => write!(f, "legend"),
        }
    }
}

/// What the pie chart in the summary band shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieSource {
    /// AI-tagged share against the rest, on a basis of 100.
    #[default]
    Ai,
    /// The tag table on its value sum.
    Tags,
    None,
}

impl FromStr for PieSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ai" => Ok(PieSource::Ai),
            "tags" => Ok(PieSource::Tags),
            "none" => Ok(PieSource::None),
            _ => Err(format!("Invalid pie source: {}. Valid options: ai, tags, none", s)),
        }
    }
}

/// Texts of the header block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub title: String,
    pub subtitle: String,
    pub period: String,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            title: "AI Usage Report".to_string(),
            subtitle: "Commit tags by author and category".to_string(),
            period: "Period: beginning to now".to_string(),
        }
    }
}

/// Configuration of the report: section order and visibility, pie source,
/// texts and dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub sections: Vec<SectionKind>,
    pub pie: PieSource,
    pub meta: ReportMeta,
    pub metrics: LayoutMetrics,
    /// Show table rows by descending count instead of first-seen order.
    pub sort_by_count: bool,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            sections: SectionKind::default_order(),
            pie: PieSource::default(),
            meta: ReportMeta::default(),
            metrics: LayoutMetrics::default(),
            sort_by_count: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub center: Point,
    pub radius: f64,
    /// `Err` carries the reason the chart could not be drawn.
    pub slices: std::result::Result<Vec<PieSlice>, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Header(ReportMeta),
    Summary {
        lines: Vec<String>,
        pie: Option<PieChart>,
    },
    Bars {
        title: String,
        bars: Vec<Bar>,
    },
    Grid {
        title: String,
        table: TableLayout,
    },
    Legend {
        title: String,
        lines: Vec<String>,
    },
    /// Stands in for a section whose chart input was empty or degenerate.
    Placeholder {
        title: String,
        message: String,
    },
}

/// A section with its vertical extent.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    pub kind: SectionKind,
    pub top: f64,
    pub height: f64,
    pub content: SectionContent,
}

impl PlacedSection {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A fully positioned report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub width: f64,
    pub height: f64,
    pub sections: Vec<PlacedSection>,
    pub metrics: LayoutMetrics,
}

impl ReportPlan {
    /// Document size in whole pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width.ceil() as u32, self.height.ceil() as u32)
    }
}

fn table_title(source: TableSource) -> &'static str {
    match source {
        TableSource::Authors => "Commits by author",
        TableSource::Tags => "Commits by tag",
    }
}

fn key_header(source: TableSource) -> &'static str {
    match source {
        TableSource::Authors => "Author",
        TableSource::Tags => "Tag",
    }
}

impl ReportLayout {
    /// Position every configured section.
    ///
    /// Each section starts at the previous section's start plus its height
    /// plus the fixed gap; the header starts at the top edge.
    pub fn plan(&self, data: &ReportData, legend: &[TagRule]) -> ReportPlan {
        let m = &self.metrics;
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut cursor = 0.0;

        for (i, kind) in self.sections.iter().enumerate() {
            if i > 0 {
                cursor += m.section_gap;
            }
            let (height, content) = match kind {
                SectionKind::Header => (m.header_height, SectionContent::Header(self.meta.clone())),
                SectionKind::Summary => self.summary_section(data, cursor),
                SectionKind::Table(source, style) => {
                    self.table_section(data, *source, *style, cursor)
                }
                SectionKind::Legend => self.legend_section(legend),
            };
            debug!("Section {} at y={:.1}, height {:.1}", kind, cursor, height);
            sections.push(PlacedSection {
                kind: *kind,
                top: cursor,
                height,
                content,
            });
            cursor += height;
        }

        ReportPlan {
            width: m.page_width,
            height: cursor + m.bottom_margin,
            sections,
            metrics: *m,
        }
    }

    fn summary_section(&self, data: &ReportData, top: f64) -> (f64, SectionContent) {
        let m = &self.metrics;
        let totals = &data.totals;
        let lines = vec![
            format!("Total commits: {}", totals.total_commits),
            format!("AI-tagged commits: {}", totals.tagged_commits),
            format!("AI usage: {:.2}%", totals.ai_percentage),
        ];
        let mut height = lines.len() as f64 * m.summary_line_height;

        let entries: Vec<(String, f64)> = match self.pie {
            PieSource::None => Vec::new(),
            // No commits means no share to show, not 100% traditional.
            PieSource::Ai if totals.total_commits == 0 => Vec::new(),
            PieSource::Ai => vec![
                ("AI-assisted".to_string(), totals.ai_percentage),
                ("Traditional".to_string(), 100.0 - totals.ai_percentage),
            ],
            PieSource::Tags => self
                .rows(&data.tags)
                .into_iter()
                .map(|(k, v)| (k, v as f64))
                .collect(),
        };
        let basis = match self.pie {
            PieSource::Tags => data.tags.sum() as f64,
            _ => 100.0,
        };

        let pie = (self.pie != PieSource::None).then(|| {
            let center = Point::new(m.page_width - m.pie_right_offset, top + m.pie_radius);
            height = height.max(2.0 * m.pie_radius);
            let slices = layout_pie(&entries, basis, center, m.pie_radius).map_err(|e| {
                warn!("Pie chart skipped: {}", e);
                "No data".to_string()
            });
            PieChart {
                center,
                radius: m.pie_radius,
                slices,
            }
        });

        (height, SectionContent::Summary { lines, pie })
    }

    fn table_section(
        &self,
        data: &ReportData,
        source: TableSource,
        style: TableStyle,
        top: f64,
    ) -> (f64, SectionContent) {
        let m = &self.metrics;
        let table = match source {
            TableSource::Authors => &data.authors,
            TableSource::Tags => &data.tags,
        };
        let rows = self.rows(table);
        let title = table_title(source).to_string();
        let body_top = top + m.section_title_height;

        match style {
            TableStyle::Bars => {
                let geometry = BarGeometry {
                    origin: Point::new(m.margin, body_top),
                    max_bar_width: m.max_bar_width,
                    bar_height: m.bar_height,
                    row_spacing: m.bar_spacing,
                };
                match layout_bars(&rows, &geometry) {
                    Ok(bars) => (
                        m.section_title_height + geometry.height_for(bars.len()),
                        SectionContent::Bars { title, bars },
                    ),
                    Err(e) => {
                        warn!("{} skipped: {}", title, e);
                        self.placeholder(title)
                    }
                }
            }
            TableStyle::Grid => {
                let grid = GridGeometry {
                    origin: Point::new(m.margin, body_top),
                    column_width: m.table_column_width,
                    row_height: m.table_row_height,
                    headers: vec![
                        key_header(source).to_string(),
                        "Commits".to_string(),
                        "Share".to_string(),
                    ],
                };
                let table = layout_table(&rows, &grid);
                (
                    m.section_title_height + table.height,
                    SectionContent::Grid { title, table },
                )
            }
        }
    }

    fn legend_section(&self, legend: &[TagRule]) -> (f64, SectionContent) {
        let m = &self.metrics;
        let lines: Vec<String> = legend
            .iter()
            .map(|rule| format!("{}: {}", rule.keyword, rule.description))
            .collect();
        (
            m.section_title_height + lines.len() as f64 * m.legend_line_height,
            SectionContent::Legend {
                title: "Tag legend".to_string(),
                lines,
            },
        )
    }

    fn placeholder(&self, title: String) -> (f64, SectionContent) {
        let m = &self.metrics;
        (
            m.section_title_height + m.placeholder_height,
            SectionContent::Placeholder {
                title,
                message: "No data".to_string(),
            },
        )
    }

    fn rows(&self, table: &FrequencyTable) -> Vec<(String, usize)> {
        if self.sort_by_count {
            table.sorted_by_count()
        } else {
            table.entries().to_vec()
        }
    }
}

/// Longest prefix of `text` (with an ellipsis) that fits `max_width`.
///
/// Falls back to the full text when the canvas cannot measure it.
fn fit_text<C: Canvas + ?Sized>(
    canvas: &C,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> String {
    let fits = |candidate: &str| match canvas.measure_text(candidate, style) {
        Ok((width, _)) => width <= max_width,
        Err(e) => {
            debug!("Cannot measure {:?}: {}", candidate, e);
            true
        }
    };
    if fits(text) {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (1..chars.len()).rev() {
        let candidate: String = chars[..keep].iter().chain(std::iter::once(&'…')).collect();
        if fits(&candidate) {
            return candidate;
        }
    }
    "…".to_string()
}

/// Draw a planned report.
pub fn render<C: Canvas + ?Sized>(
    plan: &ReportPlan,
    theme: &ReportTheme,
    canvas: &mut C,
) -> Result<()> {
    let m = &plan.metrics;
    for section in &plan.sections {
        match &section.content {
            SectionContent::Header(meta) => draw_header(canvas, theme, section, meta, plan.width)?,
            SectionContent::Summary { lines, pie } => {
                for (i, line) in lines.iter().enumerate() {
                    let at = Point::new(m.margin, section.top + i as f64 * m.summary_line_height);
                    canvas.text(line, at, &theme.body)?;
                }
                if let Some(pie) = pie {
                    draw_pie(canvas, theme, pie)?;
                }
            }
            SectionContent::Bars { title, bars } => {
                canvas.text(title, Point::new(m.margin, section.top), &theme.section_title)?;
                for bar in bars {
                    let at = Point::new(bar.x, bar.y);
                    canvas.fill_rect(at, bar.length, bar.height, theme.bar_fill)?;
                    let label = format!("{} ({})", bar.label, bar.value);
                    let at = Point::new(bar.x + bar.length + 10.0, bar.y + bar.height / 2.0);
                    canvas.text(&label, at, &theme.bar_label)?;
                }
            }
            SectionContent::Grid { title, table } => {
                canvas.text(title, Point::new(m.margin, section.top), &theme.section_title)?;
                draw_table(canvas, theme, table)?;
            }
            SectionContent::Legend { title, lines } => {
                canvas.text(title, Point::new(m.margin, section.top), &theme.section_title)?;
                let mut y = section.top + m.section_title_height;
                for line in lines {
                    canvas.text(line, Point::new(m.margin, y), &theme.legend)?;
                    y += m.legend_line_height;
                }
            }
            SectionContent::Placeholder { title, message } => {
                canvas.text(title, Point::new(m.margin, section.top), &theme.section_title)?;
                let at = Point::new(m.margin, section.top + m.section_title_height);
                canvas.text(message, at, &theme.placeholder)?;
            }
        }
    }
    Ok(())
}

fn draw_header<C: Canvas + ?Sized>(
    canvas: &mut C,
    theme: &ReportTheme,
    section: &PlacedSection,
    meta: &ReportMeta,
    width: f64,
) -> Result<()> {
    let top = section.top;
    let bottom = section.bottom();
    let center_x = width / 2.0;
    canvas.fill_rect(Point::new(0.0, top), width, section.height, theme.header_fill)?;
    canvas.line(Point::new(0.0, bottom), Point::new(width, bottom), &theme.header_divider)?;
    canvas.text(&meta.title, Point::new(center_x, top + section.height * 0.35), &theme.title)?;
    let subtitle_at = Point::new(center_x, top + section.height * 0.62);
    canvas.text(&meta.subtitle, subtitle_at, &theme.subtitle)?;
    canvas.text(&meta.period, Point::new(center_x, top + section.height * 0.85), &theme.period)?;
    Ok(())
}

fn draw_pie<C: Canvas + ?Sized>(canvas: &mut C, theme: &ReportTheme, pie: &PieChart) -> Result<()> {
    let slices = match &pie.slices {
        Ok(slices) => slices,
        Err(message) => {
            let style = theme.placeholder.anchored(theme.slice_label.anchor);
            return canvas.text(message, pie.center, &style);
        }
    };
    for slice in slices.iter().filter(|s| s.sweep_angle > 0.0) {
        canvas.sector(
            pie.center,
            pie.radius,
            slice.start_angle,
            slice.sweep_angle,
            palette_color(slice.color_index),
        )?;
    }
    let shadow = theme.slice_label.colored(theme.slice_shadow);
    for slice in slices.iter().filter(|s| s.sweep_angle > 0.0) {
        let caption = slice.caption();
        canvas.text(&caption, slice.label_anchor.offset(1.0, 1.0), &shadow)?;
        canvas.text(&caption, slice.label_anchor, &theme.slice_label)?;
    }
    Ok(())
}

fn draw_table<C: Canvas + ?Sized>(
    canvas: &mut C,
    theme: &ReportTheme,
    table: &TableLayout,
) -> Result<()> {
    let Some(first) = table.cells.first() else {
        return Ok(());
    };
    let origin = Point::new(first.x, first.y);
    let row_height = table.height / table.rows.max(1) as f64;
    let columns = table.cells.iter().filter(|c| c.row == 0).count().max(1);
    let column_width = table.width / columns as f64;

    canvas.fill_rect(origin, table.width, row_height, theme.table_header_fill)?;
    for row in 0..=table.rows {
        let y = origin.y + row as f64 * row_height;
        let (from, to) = (Point::new(origin.x, y), Point::new(origin.x + table.width, y));
        canvas.line(from, to, &theme.grid_line)?;
    }
    for cell in &table.cells {
        let style = if cell.row == 0 {
            &theme.table_header
        } else {
            &theme.table_body
        };
        let text = fit_text(canvas, &cell.text, style, column_width - 8.0);
        canvas.text(&text, Point::new(cell.x + 4.0, cell.y + row_height / 2.0), style)?;
    }
    Ok(())
}
