use log::info;
use plotters::prelude::{BitMapBackend, IntoDrawingArea, SVGBackend};
use std::path::{Path, PathBuf};

use super::canvas::PlottersCanvas;
use super::report::{render, ReportPlan};
use super::styles::ReportTheme;
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    /// Pick the format from the file extension; anything but `.png` is SVG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => OutputFormat::Png,
            _ => OutputFormat::Svg,
        }
    }
}

fn drawing_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Drawing(e.to_string())
}

/// Render the plan into an SVG document.
pub fn render_svg(plan: &ReportPlan, theme: &ReportTheme) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, plan.size()).into_drawing_area();
        root.fill(&theme.background).map_err(drawing_err)?;
        render(plan, theme, &mut PlottersCanvas::new(&root))?;
        root.present().map_err(drawing_err)?;
    }
    Ok(svg)
}

/// Render the plan into a PNG file at `path`.
pub fn render_png(plan: &ReportPlan, theme: &ReportTheme, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, plan.size()).into_drawing_area();
    root.fill(&theme.background).map_err(drawing_err)?;
    render(plan, theme, &mut PlottersCanvas::new(&root))?;
    root.present().map_err(drawing_err)?;
    Ok(())
}

/// Render and persist the report, choosing the format from `path`.
pub fn write_report(plan: &ReportPlan, theme: &ReportTheme, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match OutputFormat::from_path(path) {
        OutputFormat::Svg => std::fs::write(path, render_svg(plan, theme)?)?,
        OutputFormat::Png => render_png(plan, theme, path)?,
    }
    info!("Report written to {}", path.display());
    Ok(())
}

/// [`write_report`] on the blocking pool; rasterizing is CPU bound.
pub async fn write_report_async(
    plan: ReportPlan,
    theme: ReportTheme,
    path: PathBuf,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || write_report(&plan, &theme, &path).map(|_| path))
        .await
        .map_err(|e| ReportError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}
