//! Chart Plotter Module
//! Draws chart descriptions interactively using egui_plot.

use crate::charts::{
    AnimatedSpec, AnimationMode, BarChartSpec, BarsOrNoData, BarsOverMapSpec, ChartSpec,
    ChoroplethSpec, PieSpec, RateMapSpec, RegionDetailSpec, TableSpec, ViewOutcome,
};
use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Series colors, cycled by index.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Fill for regions and points without a value.
pub const MISSING_COLOR: Color32 = Color32::from_rgb(170, 170, 170);

/// Sequential scale stops, light to dark.
const GRADIENT: [(u8, u8, u8); 3] = [(255, 237, 160), (253, 141, 60), (189, 0, 38)];

/// Map-degrees per unit of normalized bar height in the oblique view.
const BAR_ELEVATION: f64 = 2.5;
/// Direction bars rise in on screen.
const OBLIQUE: [f64; 2] = [0.35, 1.0];

/// Draws chart descriptions with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Color for a position in `[0, 1]` on the sequential scale.
    pub fn gradient(position: f64) -> Color32 {
        let t = if position.is_finite() {
            position.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scaled = t * (GRADIENT.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(GRADIENT.len() - 2);
        let frac = scaled - lower as f64;

        let (r0, g0, b0) = GRADIENT[lower];
        let (r1, g1, b1) = GRADIENT[lower + 1];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Color32::from_rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }

    /// Polygon for one pie wedge starting at `start` (fraction of a turn,
    /// clockwise from 12 o'clock) and covering `share` of the circle.
    pub fn pie_wedge(start: f64, share: f64, radius: f64) -> Vec<[f64; 2]> {
        let steps = ((share * 96.0).ceil() as usize).max(2);
        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for i in 0..=steps {
            let turn = start + share * i as f64 / steps as f64;
            let angle = FRAC_PI_2 - turn * TAU;
            points.push([radius * angle.cos(), radius * angle.sin()]);
        }
        points
    }

    /// Oblique projection of a point raised `height` (normalized) above the
    /// map plane.
    pub fn project(x: f64, y: f64, height: f64) -> [f64; 2] {
        let lift = height * BAR_ELEVATION;
        [x + OBLIQUE[0] * lift, y + OBLIQUE[1] * lift]
    }

    /// Draw a view outcome. Interactive state (the animation frame) is kept
    /// in the chart itself.
    pub fn draw(ui: &mut egui::Ui, outcome: &mut ViewOutcome, full_size: bool) {
        match outcome {
            ViewOutcome::NoData { message } => Self::draw_message(ui, message),
            ViewOutcome::Chart(spec) => {
                ui.heading(spec.title());
                ui.add_space(4.0);
                match spec {
                    ChartSpec::Pie(pie) => Self::draw_pie(ui, pie, full_size),
                    ChartSpec::Choropleth(map) => Self::draw_choropleth(ui, map, full_size),
                    ChartSpec::BarsOverMap(bars) => Self::draw_bars_over_map(ui, bars, full_size),
                    ChartSpec::VictimAccused(spec) => {
                        Self::draw_bars_or_message(ui, &spec.victims, "victims", full_size);
                        ui.add_space(8.0);
                        Self::draw_bars_or_message(ui, &spec.accused, "accused", full_size);
                    }
                    ChartSpec::RateMap(map) => Self::draw_rate_map(ui, map, full_size),
                    ChartSpec::Animated(anim) => Self::draw_animated(ui, anim, full_size),
                    ChartSpec::RegionDetail(detail) => Self::draw_region_detail(ui, detail),
                    ChartSpec::Table(table) => Self::draw_table(ui, table),
                }
            }
        }
    }

    fn draw_message(ui: &mut egui::Ui, message: &str) {
        ui.add_space(12.0);
        ui.label(
            RichText::new(message)
                .size(14.0)
                .color(Color32::from_rgb(220, 53, 69)),
        );
    }

    fn height(full_size: bool) -> f32 {
        if full_size {
            420.0
        } else {
            240.0
        }
    }

    fn draw_pie(ui: &mut egui::Ui, pie: &PieSpec, full_size: bool) {
        Plot::new("pie")
            .height(Self::height(full_size))
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut start = 0.0;
                for (i, slice) in pie.slices.iter().enumerate() {
                    let color = Self::series_color(i);
                    let wedge = Self::pie_wedge(start, slice.share, 1.0);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(format!(
                                "{} ({} / {:.1}%)",
                                slice.label,
                                slice.value,
                                slice.share * 100.0
                            )),
                    );
                    start += slice.share;
                }
            });
    }

    fn draw_choropleth(ui: &mut egui::Ui, map: &ChoroplethSpec, full_size: bool) {
        let [min, max] = map.value_range;
        let span = max.saturating_sub(min);

        Plot::new("choropleth")
            .height(Self::height(full_size))
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show(ui, |plot_ui| {
                for region in &map.regions {
                    let position = if span == 0 {
                        1.0
                    } else {
                        (region.value - min) as f64 / span as f64
                    };
                    let fill = Self::gradient(position);
                    let name = format!("{} ({}): {}", region.name, region.code, region.value);
                    for ring in &region.rings {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(ring.clone()))
                                .fill_color(fill)
                                .stroke(Stroke::new(0.5, Color32::DARK_GRAY))
                                .name(&name),
                        );
                    }
                }
            });

        ui.horizontal(|ui| {
            ui.label(RichText::new(min.to_string()).color(Self::gradient(0.0)).strong());
            ui.label("→");
            ui.label(RichText::new(max.to_string()).color(Self::gradient(1.0)).strong());
        });
        if !map.skipped.is_empty() {
            let codes: Vec<String> = map.skipped.iter().map(|c| c.to_string()).collect();
            ui.label(RichText::new(format!("⚠ {}", codes.join(", "))).weak());
        }
    }

    fn draw_bars_over_map(ui: &mut egui::Ui, spec: &BarsOverMapSpec, full_size: bool) {
        let tallest = spec.bars.iter().map(|b| b.height).max().unwrap_or(0).max(1) as f64;

        Plot::new("bars_over_map")
            .height(Self::height(full_size))
            .data_aspect(1.0)
            .x_axis_label(spec.axis_labels[0].as_str())
            .y_axis_label(spec.axis_labels[1].as_str())
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for outline in &spec.outlines {
                    plot_ui.line(
                        Line::new(PlotPoints::from(outline.clone()))
                            .color(Color32::GRAY)
                            .width(0.8),
                    );
                }

                for bar in &spec.bars {
                    let color = Self::series_color(bar.category_index);
                    let name = spec
                        .categories
                        .get(bar.category_index)
                        .cloned()
                        .unwrap_or_default();
                    let top = Self::project(bar.x, bar.y, bar.height as f64 / tallest);
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![[bar.x, bar.y], top]))
                            .color(color)
                            .width(5.0)
                            .name(&name),
                    );
                }
            });
    }

    fn draw_bars_or_message(
        ui: &mut egui::Ui,
        bars: &BarsOrNoData,
        id: &str,
        full_size: bool,
    ) {
        match bars {
            BarsOrNoData::Chart(chart) => Self::draw_stacked_bars(ui, chart, id, full_size),
            BarsOrNoData::NoData { message } => Self::draw_message(ui, message),
        }
    }

    fn draw_stacked_bars(ui: &mut egui::Ui, spec: &BarChartSpec, id: &str, full_size: bool) {
        ui.label(RichText::new(&spec.title).strong());
        let region_names: Vec<String> = spec.regions.iter().map(|r| r.to_string()).collect();

        Plot::new(format!("stacked_{}", id))
            .height(Self::height(full_size) * 0.75)
            .x_axis_label(spec.x_label.as_str())
            .y_axis_label(spec.y_label.as_str())
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                region_names.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::with_capacity(spec.series.len());
                for (i, series) in spec.series.iter().enumerate() {
                    let bars: Vec<Bar> = spec
                        .regions
                        .iter()
                        .enumerate()
                        .map(|(x, region)| {
                            let value = series
                                .bars
                                .iter()
                                .find(|b| &b.region == region)
                                .map_or(0, |b| b.value);
                            Bar::new(x as f64, value as f64)
                                .width(0.7)
                                .name(format!("{} / {}", region, series.name))
                        })
                        .collect();

                    let below: Vec<&BarChart> = charts.iter().collect();
                    let chart = BarChart::new(bars)
                        .name(&series.name)
                        .color(Self::series_color(i))
                        .stack_on(&below);
                    charts.push(chart);
                }
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    fn draw_rate_map(ui: &mut egui::Ui, map: &RateMapSpec, full_size: bool) {
        Plot::new("rate_map")
            .height(Self::height(full_size))
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                for point in &map.points {
                    let color = point
                        .rate
                        .position
                        .map_or(MISSING_COLOR, Self::gradient);
                    let rate = match point.rate.rate {
                        Some(rate) if point.rate.clamped => format!("{:.3} (> {:.3})", rate, map.scale.max),
                        Some(rate) => format!("{:.3}", rate),
                        None => "-".to_string(),
                    };
                    plot_ui.points(
                        Points::new(vec![[point.lon, point.lat]])
                            .radius(9.0)
                            .color(color)
                            .name(format!("{} ({}): {}", point.name, point.code, rate)),
                    );
                    plot_ui.text(Text::new(
                        PlotPoint::new(point.lon, point.lat - 0.3),
                        RichText::new(point.code.as_str()).size(10.0),
                    ));
                }
            });

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{:.2}", map.scale.min)).color(Self::gradient(0.0)));
            ui.label("→");
            ui.label(RichText::new(format!("{:.2}+", map.scale.max)).color(Self::gradient(1.0)));
        });
    }

    fn draw_animated(ui: &mut egui::Ui, spec: &mut AnimatedSpec, full_size: bool) {
        if spec.show_slider() {
            let years: Vec<i32> = spec.frames.iter().map(|f| f.year).collect();
            let mut index = spec.active;
            ui.horizontal(|ui| {
                ui.add(
                    egui::Slider::new(&mut index, 0..=years.len() - 1).show_value(false),
                );
                if let Some(year) = years.get(index) {
                    ui.label(format!("{}{}", spec.year_prefix, year));
                }
            });
            if let Some(&year) = years.get(index) {
                spec.select_year(year);
            }
        } else if let Some(frame) = spec.active_frame() {
            ui.label(format!("{}{}", spec.year_prefix, frame.year));
        }

        let Some(frame) = spec.active_frame() else {
            return;
        };
        let region_names: Vec<String> = frame.points.iter().map(|p| p.region.to_string()).collect();
        let mode = spec.mode;
        let [y_min, y_max] = spec.y_range;

        Plot::new("animated")
            .height(Self::height(full_size))
            .x_axis_label(spec.x_label.as_str())
            .y_axis_label(spec.y_label.as_str())
            .include_y(y_min)
            .include_y(y_max)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                region_names.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                let values: Vec<[f64; 2]> = frame
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| [i as f64, p.facts as f64])
                    .collect();
                let color = Self::series_color(0);

                match mode {
                    AnimationMode::Scatter => {
                        for (i, (point, value)) in frame.points.iter().zip(&values).enumerate() {
                            let radius = 3.0 + 12.0 * (value[1] / y_max.max(1.0)).sqrt();
                            plot_ui.points(
                                Points::new(vec![*value])
                                    .radius(radius as f32)
                                    .color(Self::series_color(i))
                                    .name(point.region.as_str()),
                            );
                        }
                    }
                    AnimationMode::Bar => {
                        let bars = values
                            .iter()
                            .zip(&frame.points)
                            .map(|(v, p)| Bar::new(v[0], v[1]).width(0.7).name(p.region.as_str()))
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).color(color));
                    }
                    AnimationMode::Line => {
                        plot_ui.line(Line::new(PlotPoints::from(values.clone())).color(color).width(2.0));
                        plot_ui.points(Points::new(values).radius(4.0).color(color));
                    }
                }
            });
    }

    fn draw_region_detail(ui: &mut egui::Ui, detail: &RegionDetailSpec) {
        let categories: Vec<String> = detail.bars.iter().map(|b| b.category.clone()).collect();

        Plot::new("region_detail")
            .height(260.0)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                categories.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                let bars = detail
                    .bars
                    .iter()
                    .enumerate()
                    .map(|(i, b)| {
                        Bar::new(i as f64, b.facts as f64)
                            .width(0.6)
                            .fill(Self::series_color(i))
                            .name(&b.category)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars));
            });

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Σ {}", detail.total_facts)).strong());
            if let Some(population) = detail.population {
                ui.separator();
                ui.label(format!("{:.0}", population));
            }
        });
    }

    fn draw_table(ui: &mut egui::Ui, table: &TableSpec) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("table_{}", table.title)))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for column in &table.columns {
                            ui.label(RichText::new(column).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in &table.rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
        ui.label(
            RichText::new(format!("{} / {}", table.rows.len(), table.total_matches))
                .weak()
                .size(10.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(ChartPlotter::gradient(0.0), Color32::from_rgb(255, 237, 160));
        assert_eq!(ChartPlotter::gradient(1.0), Color32::from_rgb(189, 0, 38));
        assert_eq!(ChartPlotter::gradient(5.0), ChartPlotter::gradient(1.0));
        assert_eq!(ChartPlotter::gradient(f64::NAN), ChartPlotter::gradient(0.0));
    }

    #[test]
    fn wedge_starts_at_center_and_stays_on_circle() {
        let wedge = ChartPlotter::pie_wedge(0.0, 0.25, 2.0);
        assert_eq!(wedge[0], [0.0, 0.0]);
        let first = wedge[1];
        assert!(first[0].abs() < 1e-9 && (first[1] - 2.0).abs() < 1e-9);
        let last = wedge[wedge.len() - 1];
        assert!((last[0] - 2.0).abs() < 1e-9 && last[1].abs() < 1e-9);
        for p in &wedge[1..] {
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn projection_keeps_base_in_place() {
        assert_eq!(ChartPlotter::project(2.0, 46.0, 0.0), [2.0, 46.0]);
        let top = ChartPlotter::project(2.0, 46.0, 1.0);
        assert!(top[1] > 46.0 && top[0] > 2.0);
    }
}
