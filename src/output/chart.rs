//! SVG charts.
//!
//! Charts are described as plain data ([`GroupedBarChart`], [`BoxplotChart`])
//! and rendered with `plotters`, so the layout decisions can be tested
//! without touching a drawing backend.

use crate::data::CacheState;
use crate::error::{Error, Result};
use crate::pipeline::{LatencyReport, ModeReport};
use crate::stats::{asymmetric_spread, Balance, PageLoadSummary, TierComparison};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Cold / first series colour.
pub const COLD_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Warm / second series colour.
pub const WARM_COLOR: RGBColor = RGBColor(255, 127, 14);

const GROUP_WIDTH: f64 = 0.8;
const HEIGHT: u32 = 560;

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::chart(e.to_string())
}

/// One bar of a series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bar {
    /// `None` draws a hatched placeholder instead of a bar
    pub value: Option<f64>,
    /// Lower and upper error-bar lengths
    pub spread: Option<(f64, f64)>,
    /// Text printed above the bar
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub color: RGBColor,
    pub bars: Vec<Bar>,
}

/// Bars grouped by category, one bar per series in each group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarChart {
    pub title: String,
    pub y_desc: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

impl GroupedBarChart {
    /// Upper bound of the y axis, with headroom for annotations.
    #[must_use]
    pub fn y_max(&self) -> f64 {
        let top = self
            .series
            .iter()
            .flat_map(|s| &s.bars)
            .filter_map(|b| Some(b.value? + b.spread.map_or(0.0, |(_, hi)| hi)))
            .fold(0.0_f64, f64::max);
        if top > 0.0 {
            top * 1.15
        } else {
            1.0
        }
    }

    fn bar_width(&self) -> f64 {
        GROUP_WIDTH / self.series.len().max(1) as f64
    }

    /// Left edge of bar `index` of series `series`.
    #[must_use]
    pub fn bar_left(&self, series: usize, index: usize) -> f64 {
        index as f64 - GROUP_WIDTH / 2.0 + self.bar_width() * series as f64
    }

    /// Render to an SVG file.
    ///
    /// # Errors
    ///
    /// Returns a chart error if drawing or writing fails.
    pub fn render(&self, path: &Path) -> Result<()> {
        let n = self.categories.len().max(1);
        let width = (n as u32 * 64).max(900);
        let root = SVGBackend::new(path, (width, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let y_max = self.y_max();
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(80)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(chart_err)?;

        let categories = &self.categories;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&|x| category_label(categories, *x))
            .y_desc(self.y_desc.as_str())
            .draw()
            .map_err(chart_err)?;

        let bw = self.bar_width() * 0.95;
        let placeholder = y_max * 0.04;
        let note_style = TextStyle::from(("sans-serif", 11).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));

        for (si, series) in self.series.iter().enumerate() {
            let color = series.color;
            let left = |i: usize| self.bar_left(si, i);

            chart
                .draw_series(series.bars.iter().enumerate().filter_map(|(i, bar)| {
                    let value = bar.value?;
                    Some(Rectangle::new(
                        [(left(i), 0.0), (left(i) + bw, value)],
                        color.filled(),
                    ))
                }))
                .map_err(chart_err)?
                .label(series.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

            // Missing data: outlined, hatched stub rather than nothing.
            for (i, _) in series.bars.iter().enumerate().filter(|(_, b)| b.value.is_none()) {
                let (x0, x1) = (left(i), left(i) + bw);
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x0, 0.0), (x1, placeholder)],
                        color.mix(0.6).stroke_width(1),
                    )))
                    .map_err(chart_err)?;
                chart
                    .draw_series(hatch_lines(x0, x1, placeholder).into_iter().map(|pts| {
                        PathElement::new(pts, color.mix(0.6).stroke_width(1))
                    }))
                    .map_err(chart_err)?;
            }

            chart
                .draw_series(series.bars.iter().enumerate().filter_map(|(i, bar)| {
                    let value = bar.value?;
                    let (lo, hi) = bar.spread?;
                    Some(ErrorBar::new_vertical(
                        left(i) + bw / 2.0,
                        value - lo,
                        value,
                        value + hi,
                        BLACK.stroke_width(1),
                        8,
                    ))
                }))
                .map_err(chart_err)?;

            chart
                .draw_series(series.bars.iter().enumerate().filter_map(|(i, bar)| {
                    let note = bar.note.as_ref()?;
                    let top = bar.value.map_or(placeholder, |v| {
                        v + bar.spread.map_or(0.0, |(_, hi)| hi)
                    });
                    Some(Text::new(
                        note.clone(),
                        (left(i) + bw / 2.0, top + y_max * 0.01),
                        note_style.clone(),
                    ))
                }))
                .map_err(chart_err)?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;
        root.present().map_err(chart_err)?;
        tracing::debug!("Rendered {}", path.display());
        Ok(())
    }
}

fn category_label(categories: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

fn hatch_lines(x0: f64, x1: f64, height: f64) -> Vec<Vec<(f64, f64)>> {
    const STRIPES: usize = 4;
    let step = (x1 - x0) / STRIPES as f64;
    (0..STRIPES)
        .map(|k| {
            let start = (k as f64).mul_add(step, x0);
            vec![(start, 0.0), (start + step, height)]
        })
        .collect()
}

/// Cold and warm latency distributions per category.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotChart {
    pub title: String,
    pub y_desc: String,
    /// `(category, cold samples, warm samples)`
    pub groups: Vec<(String, Vec<f64>, Vec<f64>)>,
}

impl BoxplotChart {
    /// Upper bound of the y axis: highest upper whisker plus headroom.
    #[must_use]
    pub fn y_max(&self) -> f32 {
        let top = self
            .groups
            .iter()
            .flat_map(|(_, cold, warm)| [cold, warm])
            .filter(|s| !s.is_empty())
            .map(|s| Quartiles::new(s).values()[4])
            .fold(0.0_f32, f32::max);
        if top > 0.0 {
            top * 1.1
        } else {
            1.0
        }
    }

    /// Render to an SVG file.
    ///
    /// # Errors
    ///
    /// Returns a chart error if drawing or writing fails.
    pub fn render(&self, path: &Path) -> Result<()> {
        let n = self.groups.len().max(1);
        let width = (n as u32 * 140).max(900);
        let root = SVGBackend::new(path, (width, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let categories: Vec<String> = self.groups.iter().map(|g| g.0.clone()).collect();
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f32..self.y_max())
            .map_err(chart_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&|x| category_label(&categories, *x))
            .y_desc(self.y_desc.as_str())
            .draw()
            .map_err(chart_err)?;

        for (state, offset, color) in [
            (CacheState::Cold, -0.18, COLD_COLOR),
            (CacheState::Warm, 0.18, WARM_COLOR),
        ] {
            let boxes = self.groups.iter().enumerate().filter_map(|(i, (_, cold, warm))| {
                let samples = match state {
                    CacheState::Cold => cold,
                    CacheState::Warm => warm,
                };
                if samples.is_empty() {
                    return None;
                }
                Some(
                    Boxplot::new_vertical(i as f64 + offset, &Quartiles::new(samples))
                        .width(24)
                        .whisker_width(0.6)
                        .style(color.stroke_width(2)),
                )
            });
            let label = match state {
                CacheState::Cold => "Cold",
                CacheState::Warm => "Warm",
            };
            chart
                .draw_series(boxes)
                .map_err(chart_err)?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;
        root.present().map_err(chart_err)?;
        tracing::debug!("Rendered {}", path.display());
        Ok(())
    }
}

fn count_note(n: usize) -> String {
    format!("n={n}")
}

/// Grouped cold/warm bars of every mode with data, with IQR error bars.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if a mode summary is malformed.
pub fn latency_overview(report: &LatencyReport) -> Result<GroupedBarChart> {
    let modes: Vec<&ModeReport> = report.modes_with_data().collect();
    let mut series = Vec::new();

    for (state, label, color) in [
        (CacheState::Cold, "Cold (median of site medians)", COLD_COLOR),
        (CacheState::Warm, "Warm (median of site medians)", WARM_COLOR),
    ] {
        let bars = modes
            .iter()
            .map(|m| {
                let summary = m.summary(state);
                Ok(Bar {
                    value: summary.median,
                    spread: asymmetric_spread(&m.mode, state, summary)?,
                    note: Some(count_note(summary.n_sites)),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        series.push(BarSeries {
            label: label.to_string(),
            color,
            bars,
        });
    }

    Ok(GroupedBarChart {
        title: "Median DNS Lookup Latency by Mode (cold vs warm)".to_string(),
        y_desc: "Latency (ms), median of per-site medians".to_string(),
        categories: modes.iter().map(|m| m.mode.label()).collect(),
        series,
    })
}

/// Per-site cold/warm medians of one mode in presentation order.
#[must_use]
pub fn per_site(mode: &ModeReport, popular_n: usize, unpopular_n: usize) -> GroupedBarChart {
    let bars = |state: CacheState| -> Vec<Bar> {
        mode.sites
            .iter()
            .map(|s| {
                let (value, n) = match state {
                    CacheState::Cold => (s.cold_median, s.cold_n),
                    CacheState::Warm => (s.warm_median, s.warm_n),
                };
                Bar {
                    value,
                    spread: None,
                    note: Some(count_note(n)),
                }
            })
            .collect()
    };

    GroupedBarChart {
        title: format!(
            "Per-site DNS lookup median, mode '{}' (popular top {}, then unpopular top {})",
            mode.mode, popular_n, unpopular_n
        ),
        y_desc: "Latency (ms), per-site median".to_string(),
        categories: mode.sites.iter().map(|s| s.site.clone()).collect(),
        series: vec![
            BarSeries {
                label: "Cold (per-site median)".to_string(),
                color: COLD_COLOR,
                bars: bars(CacheState::Cold),
            },
            BarSeries {
                label: "Warm (per-site median)".to_string(),
                color: WARM_COLOR,
                bars: bars(CacheState::Warm),
            },
        ],
    }
}

fn mean_bar(value: Option<f64>) -> Bar {
    Bar {
        value,
        spread: None,
        note: value.map(|v| format!("{v:.1}")),
    }
}

/// Mean lookup time of popular against unpopular sites per mode.
#[must_use]
pub fn tiers(rows: &[TierComparison]) -> GroupedBarChart {
    GroupedBarChart {
        title: "DNS Lookup Time: Popular vs Unpopular Sites".to_string(),
        y_desc: "Mean DNS lookup time (ms)".to_string(),
        categories: rows.iter().map(|r| r.mode.label()).collect(),
        series: vec![
            BarSeries {
                label: "Popular".to_string(),
                color: COLD_COLOR,
                bars: rows.iter().map(|r| mean_bar(r.popular_mean)).collect(),
            },
            BarSeries {
                label: "Unpopular".to_string(),
                color: WARM_COLOR,
                bars: rows.iter().map(|r| mean_bar(r.unpopular_mean)).collect(),
            },
        ],
    }
}

/// Mean page load, cold against warm, per mode.
#[must_use]
pub fn page_load(summaries: &[PageLoadSummary]) -> GroupedBarChart {
    let mut modes: Vec<_> = summaries.iter().map(|s| s.mode.clone()).collect();
    modes.dedup();
    let lookup = |state: CacheState| -> Vec<Bar> {
        modes
            .iter()
            .map(|mode| {
                let mean = summaries
                    .iter()
                    .find(|s| &s.mode == mode && s.cache_state == state)
                    .and_then(|s| s.load_mean);
                mean_bar(mean)
            })
            .collect()
    };

    GroupedBarChart {
        title: "Page Load Time: Cold vs Warm per Mode".to_string(),
        y_desc: "Mean page load time (ms)".to_string(),
        categories: modes.iter().map(|m| m.label()).collect(),
        series: vec![
            BarSeries {
                label: "Cold".to_string(),
                color: COLD_COLOR,
                bars: lookup(CacheState::Cold),
            },
            BarSeries {
                label: "Warm".to_string(),
                color: WARM_COLOR,
                bars: lookup(CacheState::Warm),
            },
        ],
    }
}

/// Mean DNS lookup against mean page load per mode.
#[must_use]
pub fn balance(rows: &[Balance]) -> GroupedBarChart {
    GroupedBarChart {
        title: "DNS Lookup & Page Load Time".to_string(),
        y_desc: "Average time (ms)".to_string(),
        categories: rows.iter().map(|r| r.mode.label()).collect(),
        series: vec![
            BarSeries {
                label: "DNS Lookup".to_string(),
                color: COLD_COLOR,
                bars: rows.iter().map(|r| mean_bar(r.dns_mean)).collect(),
            },
            BarSeries {
                label: "Page Load".to_string(),
                color: WARM_COLOR,
                bars: rows.iter().map(|r| mean_bar(r.page_load_mean)).collect(),
            },
        ],
    }
}
