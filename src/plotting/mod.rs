pub mod canvas;
pub mod document;
pub mod geometry;
pub mod report;
pub mod styles;


pub use canvas::{Canvas, PlottersCanvas, Point};
pub use document::{render_svg, write_report, write_report_async, OutputFormat};
pub use geometry::{
    layout_bars, layout_pie, layout_table, Bar, BarGeometry, GridGeometry, PieSlice, TableCell,
    TableLayout,
};
pub use report::{
    render, PieSource, PlacedSection, ReportLayout, ReportMeta, ReportPlan, SectionContent,
    SectionKind, TableSource, TableStyle,
};
pub use styles::{LayoutMetrics, ReportTheme};
