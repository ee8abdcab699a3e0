use plotters::style::RGBColor;

/// Slice colors, assigned by slice index modulo the palette length.
pub const PALETTE: [RGBColor; 6] = [
    RGBColor(100, 149, 237), // cornflower blue
    RGBColor(144, 238, 144), // light green
    RGBColor(135, 206, 235), // sky blue
    RGBColor(255, 215, 0),   // gold
    RGBColor(255, 69, 0),    // orange red
    RGBColor(147, 112, 219), // medium purple
];

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
    Italic,
}

/// Where the text position sits relative to the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    CenterLeft,
    Center,
}

/// Immutable text style handed to every text draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub family: &'static str,
    pub size: f64,
    pub weight: FontWeight,
    pub color: RGBColor,
    pub anchor: Anchor,
}

impl TextStyle {
    pub const fn new(size: f64, weight: FontWeight, color: RGBColor) -> Self {
        Self {
            family: "sans-serif",
            size,
            weight,
            color,
            anchor: Anchor::TopLeft,
        }
    }

    pub const fn anchored(self, anchor: Anchor) -> Self {
        Self { anchor, ..self }
    }

    pub const fn colored(self, color: RGBColor) -> Self {
        Self { color, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: RGBColor,
    pub width: u32,
}

/// Report theme configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportTheme {
    pub background: RGBColor,
    pub header_fill: RGBColor,
    pub header_divider: StrokeStyle,
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub period: TextStyle,
    pub body: TextStyle,
    pub section_title: TextStyle,
    pub slice_label: TextStyle,
    pub slice_shadow: RGBColor,
    pub bar_fill: RGBColor,
    pub bar_label: TextStyle,
    pub table_header_fill: RGBColor,
    pub table_header: TextStyle,
    pub table_body: TextStyle,
    pub grid_line: StrokeStyle,
    pub legend: TextStyle,
    pub placeholder: TextStyle,
}

const BLACK: RGBColor = RGBColor(0, 0, 0);
const WHITE: RGBColor = RGBColor(255, 255, 255);

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            background: WHITE,
            header_fill: RGBColor(72, 61, 139),
            header_divider: StrokeStyle {
                color: RGBColor(245, 245, 245),
                width: 2,
            },
            title: TextStyle::new(24.0, FontWeight::Bold, RGBColor(224, 255, 255))
                .anchored(Anchor::Center),
            subtitle: TextStyle::new(14.0, FontWeight::Italic, WHITE).anchored(Anchor::Center),
            period: TextStyle::new(12.0, FontWeight::Normal, RGBColor(176, 196, 222))
                .anchored(Anchor::Center),
            body: TextStyle::new(12.0, FontWeight::Normal, BLACK),
            section_title: TextStyle::new(14.0, FontWeight::Bold, RGBColor(72, 61, 139)),
            slice_label: TextStyle::new(10.0, FontWeight::Bold, BLACK).anchored(Anchor::Center),
            slice_shadow: RGBColor(211, 211, 211),
            bar_fill: RGBColor(173, 216, 230),
            bar_label: TextStyle::new(10.0, FontWeight::Normal, BLACK).anchored(Anchor::CenterLeft),
            table_header_fill: RGBColor(230, 230, 250),
            table_header: TextStyle::new(11.0, FontWeight::Bold, BLACK)
                .anchored(Anchor::CenterLeft),
            table_body: TextStyle::new(10.0, FontWeight::Normal, BLACK)
                .anchored(Anchor::CenterLeft),
            grid_line: StrokeStyle {
                color: RGBColor(200, 200, 200),
                width: 1,
            },
            legend: TextStyle::new(10.0, FontWeight::Normal, RGBColor(60, 60, 60)),
            placeholder: TextStyle::new(11.0, FontWeight::Italic, RGBColor(128, 128, 128)),
        }
    }
}

/// Fixed report dimensions, in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub page_width: f64,
    pub margin: f64,
    pub header_height: f64,
    pub section_gap: f64,
    pub section_title_height: f64,
    pub summary_line_height: f64,
    pub pie_radius: f64,
    /// Distance from the pie center to the right page edge.
    pub pie_right_offset: f64,
    pub max_bar_width: f64,
    pub bar_height: f64,
    pub bar_spacing: f64,
    pub table_row_height: f64,
    pub table_column_width: f64,
    pub legend_line_height: f64,
    pub placeholder_height: f64,
    pub bottom_margin: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            margin: 30.0,
            header_height: 100.0,
            section_gap: 30.0,
            section_title_height: 24.0,
            summary_line_height: 20.0,
            pie_radius: 100.0,
            pie_right_offset: 150.0,
            max_bar_width: 200.0,
            bar_height: 20.0,
            bar_spacing: 10.0,
            table_row_height: 20.0,
            table_column_width: 170.0,
            legend_line_height: 16.0,
            placeholder_height: 20.0,
            bottom_margin: 30.0,
        }
    }
}
