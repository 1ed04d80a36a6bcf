//! # Line/Area Chart
//!
//! Plots a numeric series as a polyline of glyphs inside an [`Area`].
//!
//! Sample `i` sits at column `col + i * width / len`. Its row is inverted
//! (`1 - v / max`) because terminal row numbers grow downward while chart
//! values grow upward; a value of zero lands on the last row of the area.
//! Consecutive samples are joined by walking `ceil(distance)` unit steps
//! along the segment, plotting one glyph per step, or a vertical run of
//! glyphs toward one edge when filling.

use std::io;

use serde::{Deserialize, Serialize};

use super::{Area, Color, Surface, cursor_to_sequence};

/// Which edge of the area a filled chart floods toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum FillDirection {
    /// `-1`
    #[default]
    Top,
    /// `1`
    Bottom,
}

impl TryFrom<i8> for FillDirection {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(FillDirection::Top),
            1 => Ok(FillDirection::Bottom),
            other => Err(format!("fillDir must be -1 or 1, got {other}")),
        }
    }
}

impl From<FillDirection> for i8 {
    fn from(dir: FillDirection) -> Self {
        match dir {
            FillDirection::Top => -1,
            FillDirection::Bottom => 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Color),
    Many(Vec<Color>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Color>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(color) => vec![color],
        OneOrMany::Many(colors) => colors,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
    /// One color, or top-to-bottom gradient bands.
    #[serde(deserialize_with = "one_or_many")]
    pub color: Vec<Color>,
    pub fill: bool,
    pub fill_dir: FillDirection,
    #[serde(rename = "char")]
    pub glyph: char,
    /// Scale by the series maximum. When false, values are taken as already
    /// in `[0, 1]`.
    pub normalized: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            color: vec![Color::WHITE],
            fill: false,
            fill_dir: FillDirection::Top,
            glyph: '*',
            normalized: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.to.x - self.from.x).hypot(self.to.y - self.from.y)
    }

    /// Unit-step points from `from` toward `to`, excluding `to`. A
    /// zero-length segment yields just its start.
    pub fn interpolate(&self) -> Vec<Point> {
        let length = self.length();
        if !(length > 0.0) {
            return vec![self.from];
        }
        let dx = (self.to.x - self.from.x) / length;
        let dy = (self.to.y - self.from.y) / length;
        let steps = length.ceil() as usize;
        (0..steps)
            .map(|j| Point {
                x: self.from.x + dx * j as f64,
                y: self.from.y + dy * j as f64,
            })
            .collect()
    }
}

/// Where each sample lands inside `area`.
pub fn plot_positions(series: &[f64], area: Area, normalized: bool) -> Vec<Point> {
    if series.is_empty() {
        return Vec::new();
    }
    let max = if normalized {
        series.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    } else {
        1.0
    };
    let x_step = f64::from(area.width) / series.len() as f64;
    let span = f64::from(area.height.saturating_sub(1));

    series
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let ratio = if max > 0.0 && max.is_finite() {
                (value / max).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Point {
                x: f64::from(area.col) + i as f64 * x_step,
                y: f64::from(area.row) + (1.0 - ratio) * span,
            }
        })
        .collect()
}

/// One segment per consecutive pair of samples.
pub fn segments(points: &[Point]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|pair| Segment { from: pair[0], to: pair[1] })
        .collect()
}

/// Gradient band for an absolute row.
///
/// Plain and filled plots share this mapping, so a glyph keeps its color
/// whether or not the column under it is filled.
fn band_index(row: u16, area: Area, bands: usize) -> usize {
    if area.height == 0 || bands == 0 {
        return 0;
    }
    let offset = f64::from(row.saturating_sub(area.row));
    let idx = (bands as f64 * offset / f64::from(area.height)).round() as usize;
    idx.min(bands - 1)
}

impl Surface {
    /// Render `series` into `area`.
    pub fn graph(&self, series: &[f64], area: Area, opts: &GraphOptions) -> io::Result<()> {
        if area.is_empty() {
            return Ok(());
        }
        let palette: &[Color] = if opts.color.is_empty() {
            &[Color::WHITE]
        } else {
            &opts.color
        };

        let points = plot_positions(series, area, opts.normalized);
        let plotted: Vec<Point> = match points.as_slice() {
            [] => return Ok(()),
            [single] => vec![*single],
            _ => segments(&points)
                .iter()
                .flat_map(Segment::interpolate)
                .collect(),
        };

        let mut out = String::new();
        for point in plotted {
            plot(&mut out, point, area, opts, palette);
        }
        self.print(&out)
    }
}

fn plot(out: &mut String, point: Point, area: Area, opts: &GraphOptions, palette: &[Color]) {
    let col = point.x.round() as u16;
    let row = point.y.round() as u16;
    let mut put = |r: u16| {
        out.push_str(&palette[band_index(r, area, palette.len())].sequence());
        out.push_str(&cursor_to_sequence(col, r));
        out.push(opts.glyph);
    };

    if !opts.fill {
        put(row);
        return;
    }
    match opts.fill_dir {
        FillDirection::Top => {
            for r in (area.row..=row).rev() {
                put(r);
            }
        }
        FillDirection::Bottom => {
            let bottom = area.row.saturating_add(area.height - 1);
            for r in (row..=bottom).rev() {
                put(r);
            }
        }
    }
}
