//! Static Chart Renderer
//! Renders chart descriptions to PNG images with plotters, for export.
//!
//! Tables have no static rendering; every other chart kind does. Animated
//! series render their active frame only.

use crate::charts::{
    AnimatedSpec, AnimationMode, BarChartSpec, BarsOrNoData, BarsOverMapSpec, ChartPlotter,
    ChartSpec, ChoroplethSpec, PieSpec, RateMapSpec, RegionDetailSpec, MISSING_COLOR,
};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const TITLE_FONT: (&str, i32) = ("sans-serif", 22);
const LABEL_FONT: (&str, i32) = ("sans-serif", 13);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No static rendering for {0} views")]
    Unsupported(&'static str),
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// One stacked bar group per label.
struct BarGroups<'s> {
    title: &'s str,
    x_label: &'s str,
    y_label: &'s str,
    labels: Vec<String>,
    series: Vec<(String, Vec<f64>)>,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    pub const WIDTH: u32 = 1200;
    pub const HEIGHT: u32 = 800;

    pub fn supports(spec: &ChartSpec) -> bool {
        !matches!(spec, ChartSpec::Table(_))
    }

    /// Render a chart into an RGB image of the given size.
    pub fn render(spec: &ChartSpec, width: u32, height: u32) -> Result<RgbImage, RenderError> {
        if let ChartSpec::Table(_) = spec {
            return Err(RenderError::Unsupported("table"));
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;

            match spec {
                ChartSpec::Pie(pie) => Self::draw_pie(&root, pie)?,
                ChartSpec::Choropleth(map) => Self::draw_choropleth(&root, map)?,
                ChartSpec::BarsOverMap(bars) => Self::draw_bars_over_map(&root, bars)?,
                ChartSpec::VictimAccused(spec) => {
                    let (upper, lower) = root.split_vertically((height / 2) as i32);
                    Self::draw_bars_or_message(&upper, &spec.victims)?;
                    Self::draw_bars_or_message(&lower, &spec.accused)?;
                }
                ChartSpec::RateMap(map) => Self::draw_rate_map(&root, map)?,
                ChartSpec::Animated(anim) => Self::draw_animated(&root, anim)?,
                ChartSpec::RegionDetail(detail) => Self::draw_region_detail(&root, detail)?,
                ChartSpec::Table(_) => {}
            }

            root.present().map_err(drawing)?;
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("pixel buffer size mismatch".to_string()))
    }

    /// Render at the default size and write a PNG file.
    pub fn save_png(spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        let image = Self::render(spec, Self::WIDTH, Self::HEIGHT)?;
        image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Padded `[x, y]` extent of a set of points.
    pub fn bounds<I>(points: I) -> Option<(Range<f64>, Range<f64>)>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in points.into_iter().filter(|p| p[0].is_finite() && p[1].is_finite()) {
            for axis in 0..2 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        if !min[0].is_finite() {
            return None;
        }

        let pad = |lo: f64, hi: f64| {
            let margin = ((hi - lo) * 0.05).max(0.5);
            (lo - margin)..(hi + margin)
        };
        Some((pad(min[0], max[0]), pad(min[1], max[1])))
    }

    fn color(index: usize) -> RGBColor {
        let c = ChartPlotter::series_color(index);
        RGBColor(c.r(), c.g(), c.b())
    }

    fn scale_color(position: Option<f64>) -> RGBColor {
        let c = position.map_or(MISSING_COLOR, ChartPlotter::gradient);
        RGBColor(c.r(), c.g(), c.b())
    }

    fn draw_legend(area: &Area<'_>, entries: &[(String, RGBColor)], x: i32) -> Result<(), RenderError> {
        for (i, (label, color)) in entries.iter().enumerate() {
            let y = 20 + i as i32 * 20;
            area.draw(&Rectangle::new([(x, y), (x + 12, y + 12)], color.filled()))
                .map_err(drawing)?;
            area.draw(&Text::new(label.clone(), (x + 18, y), LABEL_FONT))
                .map_err(drawing)?;
        }
        Ok(())
    }

    fn draw_message(area: &Area<'_>, message: &str) -> Result<(), RenderError> {
        area.draw(&Text::new(message.to_string(), (20, 40), TITLE_FONT))
            .map_err(drawing)
    }

    fn draw_pie(root: &Area<'_>, pie: &PieSpec) -> Result<(), RenderError> {
        let area = root.titled(&pie.title, TITLE_FONT).map_err(drawing)?;
        let (w, h) = area.dim_in_pixel();
        let radius = w.min(h) as f64 * 0.42;
        let center = (w as f64 * 0.38, h as f64 / 2.0);

        let mut start = 0.0;
        let mut legend = Vec::with_capacity(pie.slices.len());
        for (i, slice) in pie.slices.iter().enumerate() {
            let color = Self::color(i);
            let wedge: Vec<(i32, i32)> = ChartPlotter::pie_wedge(start, slice.share, radius)
                .into_iter()
                .map(|[x, y]| ((center.0 + x) as i32, (center.1 - y) as i32))
                .collect();
            area.draw(&Polygon::new(wedge, color.filled())).map_err(drawing)?;
            legend.push((
                format!("{}: {} ({:.1}%)", slice.label, slice.value, slice.share * 100.0),
                color,
            ));
            start += slice.share;
        }

        Self::draw_legend(&area, &legend, (w as f64 * 0.78) as i32)
    }

    fn draw_choropleth(root: &Area<'_>, map: &ChoroplethSpec) -> Result<(), RenderError> {
        let Some((x_range, y_range)) = Self::bounds(
            map.regions
                .iter()
                .flat_map(|r| r.rings.iter().flatten().copied()),
        ) else {
            return Self::draw_message(root, &map.title);
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&map.title, TITLE_FONT)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;
        chart.configure_mesh().disable_mesh().draw().map_err(drawing)?;

        let [min, max] = map.value_range;
        let span = max.saturating_sub(min);
        for region in &map.regions {
            let position = if span == 0 {
                1.0
            } else {
                (region.value - min) as f64 / span as f64
            };
            let fill = Self::scale_color(Some(position));
            for ring in &region.rings {
                let points: Vec<(f64, f64)> = ring.iter().map(|p| (p[0], p[1])).collect();
                chart
                    .draw_series(std::iter::once(Polygon::new(points.clone(), fill.filled())))
                    .map_err(drawing)?;
                chart
                    .draw_series(std::iter::once(PathElement::new(points, BLACK.stroke_width(1))))
                    .map_err(drawing)?;
            }
        }
        Ok(())
    }

    fn draw_bars_over_map(root: &Area<'_>, spec: &BarsOverMapSpec) -> Result<(), RenderError> {
        let tallest = spec.bars.iter().map(|b| b.height).max().unwrap_or(0).max(1) as f64;
        let tops: Vec<[f64; 2]> = spec
            .bars
            .iter()
            .map(|b| ChartPlotter::project(b.x, b.y, b.height as f64 / tallest))
            .collect();

        let extent = spec
            .outlines
            .iter()
            .flatten()
            .copied()
            .chain(spec.bars.iter().map(|b| [b.x, b.y]))
            .chain(tops.iter().copied());
        let Some((x_range, y_range)) = Self::bounds(extent) else {
            return Self::draw_message(root, &spec.title);
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, TITLE_FONT)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(spec.axis_labels[0].as_str())
            .y_desc(spec.axis_labels[1].as_str())
            .draw()
            .map_err(drawing)?;

        for outline in &spec.outlines {
            let points: Vec<(f64, f64)> = outline.iter().map(|p| (p[0], p[1])).collect();
            chart
                .draw_series(std::iter::once(PathElement::new(points, RGBColor(150, 150, 150))))
                .map_err(drawing)?;
        }

        for (bar, top) in spec.bars.iter().zip(&tops) {
            let color = Self::color(bar.category_index);
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(bar.x, bar.y), (top[0], top[1])],
                    color.stroke_width(5),
                )))
                .map_err(drawing)?;
        }

        let legend: Vec<(String, RGBColor)> = spec
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), Self::color(i)))
            .collect();
        let (w, _) = root.dim_in_pixel();
        Self::draw_legend(root, &legend, w as i32 - 260)
    }

    fn draw_bars_or_message(area: &Area<'_>, bars: &BarsOrNoData) -> Result<(), RenderError> {
        match bars {
            BarsOrNoData::Chart(chart) => Self::draw_bar_groups(area, &Self::stacked(chart)),
            BarsOrNoData::NoData { message } => Self::draw_message(area, message),
        }
    }

    fn stacked(spec: &BarChartSpec) -> BarGroups<'_> {
        let series = spec
            .series
            .iter()
            .map(|s| {
                let values = spec
                    .regions
                    .iter()
                    .map(|region| {
                        s.bars
                            .iter()
                            .find(|b| &b.region == region)
                            .map_or(0.0, |b| b.value as f64)
                    })
                    .collect();
                (s.name.clone(), values)
            })
            .collect();

        BarGroups {
            title: &spec.title,
            x_label: &spec.x_label,
            y_label: &spec.y_label,
            labels: spec.regions.iter().map(|r| r.to_string()).collect(),
            series,
        }
    }

    fn draw_bar_groups(area: &Area<'_>, groups: &BarGroups<'_>) -> Result<(), RenderError> {
        let n = groups.labels.len().max(1);
        let top = (0..n)
            .map(|i| {
                groups
                    .series
                    .iter()
                    .map(|(_, v)| v.get(i).copied().unwrap_or(0.0))
                    .sum::<f64>()
            })
            .fold(0.0_f64, f64::max);
        let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };

        let labels = &groups.labels;
        let mut chart = ChartBuilder::on(area)
            .caption(groups.title, TITLE_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                let idx = x.round();
                if idx < 0.0 || (x - idx).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .x_desc(groups.x_label)
            .y_desc(groups.y_label)
            .draw()
            .map_err(drawing)?;

        let mut base = vec![0.0; n];
        for (i, (name, values)) in groups.series.iter().enumerate() {
            let color = Self::color(i);
            let rects: Vec<Rectangle<(f64, f64)>> = values
                .iter()
                .enumerate()
                .map(|(x, v)| {
                    let lo = base[x];
                    base[x] += v;
                    Rectangle::new(
                        [(x as f64 - 0.35, lo), (x as f64 + 0.35, lo + v)],
                        color.filled(),
                    )
                })
                .collect();
            chart
                .draw_series(rects)
                .map_err(drawing)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if groups.series.len() > 1 {
            chart
                .configure_series_labels()
                .border_style(BLACK)
                .background_style(WHITE.mix(0.8))
                .draw()
                .map_err(drawing)?;
        }
        Ok(())
    }

    fn draw_rate_map(root: &Area<'_>, map: &RateMapSpec) -> Result<(), RenderError> {
        let Some((x_range, y_range)) = Self::bounds(map.points.iter().map(|p| [p.lon, p.lat]))
        else {
            return Self::draw_message(root, &map.title);
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&map.title, TITLE_FONT)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;
        chart.configure_mesh().disable_mesh().draw().map_err(drawing)?;

        chart
            .draw_series(map.points.iter().map(|p| {
                Circle::new(
                    (p.lon, p.lat),
                    9,
                    Self::scale_color(p.rate.position).filled(),
                )
            }))
            .map_err(drawing)?;
        chart
            .draw_series(map.points.iter().map(|p| {
                Text::new(p.code.to_string(), (p.lon, p.lat), LABEL_FONT)
            }))
            .map_err(drawing)?;
        Ok(())
    }

    fn draw_animated(root: &Area<'_>, spec: &AnimatedSpec) -> Result<(), RenderError> {
        let Some(frame) = spec.active_frame() else {
            return Self::draw_message(root, &spec.title);
        };
        let title = format!("{} ({}{})", spec.title, spec.year_prefix, frame.year);
        let labels: Vec<String> = frame.points.iter().map(|p| p.region.to_string()).collect();
        let n = labels.len().max(1);
        let [y_min, y_max] = spec.y_range;

        let mut chart = ChartBuilder::on(root)
            .caption(&title, TITLE_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                let idx = x.round();
                if idx < 0.0 || (x - idx).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(drawing)?;

        let values: Vec<(f64, f64)> = frame
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.facts as f64))
            .collect();
        let color = Self::color(0);

        match spec.mode {
            AnimationMode::Scatter => {
                chart
                    .draw_series(values.iter().map(|&(x, y)| {
                        let radius = 3.0 + 15.0 * (y / y_max.max(1.0)).sqrt();
                        Circle::new((x, y), radius as i32, color.mix(0.7).filled())
                    }))
                    .map_err(drawing)?;
            }
            AnimationMode::Bar => {
                chart
                    .draw_series(values.iter().map(|&(x, y)| {
                        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, y)], color.filled())
                    }))
                    .map_err(drawing)?;
            }
            AnimationMode::Line => {
                chart
                    .draw_series(LineSeries::new(values.clone(), color.stroke_width(2)))
                    .map_err(drawing)?;
                chart
                    .draw_series(values.iter().map(|&p| Circle::new(p, 4, color.filled())))
                    .map_err(drawing)?;
            }
        }
        Ok(())
    }

    fn draw_region_detail(root: &Area<'_>, detail: &RegionDetailSpec) -> Result<(), RenderError> {
        let groups = BarGroups {
            title: &detail.title,
            x_label: "",
            y_label: "",
            labels: detail.bars.iter().map(|b| b.category.clone()).collect(),
            series: vec![(
                detail.region.to_string(),
                detail.bars.iter().map(|b| b.facts as f64).collect(),
            )],
        };
        Self::draw_bar_groups(root, &groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{TableSpec, ViewOutcome};

    #[test]
    fn bounds_pad_the_extent() {
        let (x, y) =
            StaticChartRenderer::bounds(vec![[0.0, 40.0], [10.0, 50.0], [f64::NAN, 1.0]]).unwrap();
        assert!(x.start < 0.0 && x.end > 10.0);
        assert!(y.start < 40.0 && y.end > 50.0);
        assert!(StaticChartRenderer::bounds(Vec::<[f64; 2]>::new()).is_none());
    }

    #[test]
    fn tables_have_no_static_rendering() {
        let table = ChartSpec::Table(TableSpec {
            title: "t".to_string(),
            columns: vec![],
            rows: vec![],
            total_matches: 0,
        });
        assert!(!StaticChartRenderer::supports(&table));
        assert!(matches!(
            StaticChartRenderer::render(&table, 10, 10),
            Err(RenderError::Unsupported("table"))
        ));
        assert!(ViewOutcome::Chart(table).chart().is_some());
    }
}
