//! The drawing seam used by the report renderer.
//!
//! [`Canvas`] receives only absolute coordinates and explicit styles; it
//! owns no layout state. [`PlottersCanvas`] maps the calls onto a plotters
//! drawing area, so the same report can be drawn to SVG or to a bitmap.

use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind};
use plotters::element::{PathElement, Polygon, Rectangle, Text};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontDesc, FontFamily, FontStyle, RGBColor};
use plotters_backend::DrawingBackend;

use super::styles::{Anchor, FontWeight, StrokeStyle, TextStyle};
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Primitive 2-D drawing operations. Angles are in degrees, measured
/// clockwise from the positive x axis (the y axis points down).
pub trait Canvas {
    fn fill_rect(
        &mut self,
        top_left: Point,
        width: f64,
        height: f64,
        color: RGBColor,
    ) -> Result<()>;

    fn line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) -> Result<()>;

    fn text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<()>;

    fn sector(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
        fill: RGBColor,
    ) -> Result<()>;

    /// Width and height of `text` rendered with `style`.
    fn measure_text(&self, text: &str, style: &TextStyle) -> Result<(f64, f64)>;
}

/// Sector outlines are approximated with one vertex per this many degrees.
const ARC_STEP_DEGREES: f64 = 2.0;

/// Outline of a circular sector: the center followed by the arc vertices.
pub fn sector_outline(
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep_angle: f64,
) -> Vec<Point> {
    let steps = (sweep_angle.abs() / ARC_STEP_DEGREES).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = (start_angle + sweep_angle * i as f64 / steps as f64).to_radians();
        points.push(center.offset(radius * angle.cos(), radius * angle.sin()));
    }
    points
}

fn drawing_err<E>(e: DrawingAreaErrorKind<E>) -> ReportError
where
    E: std::error::Error + Send + Sync,
{
    ReportError::Drawing(e.to_string())
}

fn coord(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

fn font<'a>(style: &TextStyle) -> plotters::style::TextStyle<'a> {
    let font_style = match style.weight {
        FontWeight::Normal => FontStyle::Normal,
        FontWeight::Bold => FontStyle::Bold,
        FontWeight::Italic => FontStyle::Italic,
    };
    let pos = match style.anchor {
        Anchor::TopLeft => Pos::new(HPos::Left, VPos::Top),
        Anchor::CenterLeft => Pos::new(HPos::Left, VPos::Center),
        Anchor::Center => Pos::new(HPos::Center, VPos::Center),
    };
    FontDesc::new(FontFamily::Name(style.family), style.size, font_style)
        .color(&style.color)
        .pos(pos)
}

/// [`Canvas`] over a plotters drawing area.
pub struct PlottersCanvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
}

impl<'a, DB: DrawingBackend> PlottersCanvas<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        Self { area }
    }
}

impl<'a, DB: DrawingBackend> Canvas for PlottersCanvas<'a, DB> {
    fn fill_rect(
        &mut self,
        top_left: Point,
        width: f64,
        height: f64,
        color: RGBColor,
    ) -> Result<()> {
        let bottom_right = top_left.offset(width, height);
        self.area
            .draw(&Rectangle::new([coord(top_left), coord(bottom_right)], color.filled()))
            .map_err(drawing_err)
    }

    fn line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) -> Result<()> {
        self.area
            .draw(&PathElement::new(
                vec![coord(from), coord(to)],
                stroke.color.stroke_width(stroke.width),
            ))
            .map_err(drawing_err)
    }

    fn text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<()> {
        self.area
            .draw(&Text::new(text.to_string(), coord(at), font(style)))
            .map_err(drawing_err)
    }

    fn sector(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
        fill: RGBColor,
    ) -> Result<()> {
        let outline: Vec<_> = sector_outline(center, radius, start_angle, sweep_angle)
            .into_iter()
            .map(coord)
            .collect();
        self.area
            .draw(&Polygon::new(outline, fill.filled()))
            .map_err(drawing_err)
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> Result<(f64, f64)> {
        let (w, h) = self
            .area
            .estimate_text_size(text, &font(style))
            .map_err(drawing_err)?;
        Ok((w as f64, h as f64))
    }
}
