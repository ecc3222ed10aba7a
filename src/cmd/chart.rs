//! Pie chart rendering
//!
//! Generates a self-contained HTML file with an inline SVG pie chart and legend.

use crate::utils::format_usd;
use chrono::Local;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::f64::consts::PI;
use std::path::Path;

const COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const RADIUS: f64 = 150.0;
const CENTER: f64 = 160.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: Decimal,
}

#[derive(Debug, Clone)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

impl PieChart {
    /// Build a chart from labelled values. Slices that are zero or negative
    /// cannot be drawn and are dropped.
    pub fn new<I, S>(title: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let slices = values
            .into_iter()
            .map(|(label, value)| Slice {
                label: label.into(),
                value,
            })
            .filter(|slice| {
                if slice.value < Decimal::ZERO {
                    log::warn!(
                        "Leaving negative slice '{}' ({}) out of the chart",
                        slice.label,
                        slice.value
                    );
                }
                slice.value > Decimal::ZERO
            })
            .collect();

        PieChart {
            title: title.to_string(),
            slices,
        }
    }

    pub fn total(&self) -> Decimal {
        self.slices
            .iter()
            .fold(Decimal::ZERO, |total, s| total.saturating_add(s.value))
    }

    /// Write the chart to `output`, or to a temp file opened in the browser.
    pub fn show(&self, output: Option<&Path>) -> anyhow::Result<()> {
        let html = render(self);

        if let Some(output_path) = output {
            std::fs::write(output_path, &html)?;
            println!("Chart written to: {}", output_path.display());
        } else {
            let temp_path = std::env::temp_dir().join(format!("fincalc-{}.html", slug(&self.title)));
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened chart in browser: {}", temp_path.display());
        }

        Ok(())
    }
}

/// Render the chart as an HTML document
pub fn render(chart: &PieChart) -> String {
    let total = chart.total().to_f64().unwrap_or(0.0);
    let mut paths = String::new();
    let mut legend = String::new();
    let mut angle = -PI / 2.0;

    for (i, slice) in chart.slices.iter().enumerate() {
        let color = COLORS[i % COLORS.len()];
        let share = if total > 0.0 {
            slice.value.to_f64().unwrap_or(0.0) / total
        } else {
            0.0
        };
        let label = escape(&slice.label);

        if chart.slices.len() == 1 {
            paths.push_str(&format!(
                "        <circle cx=\"{CENTER}\" cy=\"{CENTER}\" r=\"{RADIUS}\" fill=\"{color}\"><title>{label}</title></circle>\n"
            ));
        } else {
            let sweep = share * 2.0 * PI;
            let (x1, y1) = point(angle);
            let (x2, y2) = point(angle + sweep);
            let large_arc = if sweep > PI { 1 } else { 0 };
            paths.push_str(&format!(
                "        <path d=\"M {CENTER} {CENTER} L {x1:.3} {y1:.3} A {RADIUS} {RADIUS} 0 {large_arc} 1 {x2:.3} {y2:.3} Z\" fill=\"{color}\"><title>{label}</title></path>\n"
            ));
            angle += sweep;
        }

        legend.push_str(&format!(
            "            <tr><td><span class=\"swatch\" style=\"background: {color}\"></span>{label}</td><td class=\"number\">{}</td><td class=\"number\">{:.1}%</td></tr>\n",
            format_usd(slice.value),
            share * 100.0
        ));
    }

    let title = escape(&chart.title);
    let generated = Local::now().format("%Y-%m-%d %H:%M");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 2rem; color: #222; }}
        h1 {{ text-align: center; font-weight: 500; }}
        .chart {{ display: flex; gap: 2rem; justify-content: center; align-items: center; flex-wrap: wrap; }}
        table {{ border-collapse: collapse; }}
        td {{ padding: 0.3rem 0.8rem; border-bottom: 1px solid #eee; }}
        .number {{ text-align: right; font-variant-numeric: tabular-nums; }}
        .swatch {{ display: inline-block; width: 0.8rem; height: 0.8rem; margin-right: 0.5rem; border-radius: 2px; }}
        footer {{ text-align: center; color: #888; font-size: 0.8rem; margin-top: 2rem; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="chart">
        <svg width="{size}" height="{size}" viewBox="0 0 {size} {size}">
{paths}        </svg>
        <table>
{legend}            <tr><td><strong>Total</strong></td><td class="number"><strong>{total_usd}</strong></td><td></td></tr>
        </table>
    </div>
    <footer>Generated {generated}</footer>
</body>
</html>
"##,
        size = CENTER * 2.0,
        total_usd = format_usd(chart.total()),
    )
}

fn point(angle: f64) -> (f64, f64) {
    (CENTER + RADIUS * angle.cos(), CENTER + RADIUS * angle.sin())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}
