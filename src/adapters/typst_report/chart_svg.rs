//! SVG rendering of the equity curve.

use crate::domain::metrics::EquityPoint;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 240.0;
const PADDING: f64 = 36.0;

/// Polyline SVG of cumulative net P/L with a dashed zero baseline.
/// Returns an empty string when there is nothing to draw.
pub fn generate_equity_svg(curve: &[EquityPoint]) -> String {
    if curve.is_empty() {
        return String::new();
    }

    // Zero stays inside the plot so the baseline is always visible.
    let min = curve.iter().map(|p| p.equity).fold(0.0_f64, f64::min);
    let max = curve.iter().map(|p| p.equity).fold(0.0_f64, f64::max);
    let range = max - min;

    let plot_w = WIDTH - 2.0 * PADDING;
    let plot_h = HEIGHT - 2.0 * PADDING;
    let step_x = if curve.len() > 1 {
        plot_w / (curve.len() - 1) as f64
    } else {
        0.0
    };
    let y_of = |equity: f64| {
        if range > 0.0 {
            HEIGHT - PADDING - (equity - min) / range * plot_h
        } else {
            HEIGHT - PADDING
        }
    };

    let points: Vec<String> = curve
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", PADDING + i as f64 * step_x, y_of(p.equity)))
        .collect();

    let zero_y = y_of(0.0);
    let last = curve.last().map(|p| p.equity).unwrap_or_default();
    let stroke = if last >= 0.0 { "#16a34a" } else { "#dc2626" };

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH:.0}\" height=\"{HEIGHT:.0}\" viewBox=\"0 0 {WIDTH:.0} {HEIGHT:.0}\">"
    );
    svg.push_str(&format!(
        "<line x1=\"{PADDING:.1}\" y1=\"{zero_y:.1}\" x2=\"{:.1}\" y2=\"{zero_y:.1}\" stroke=\"#9ca3af\" stroke-dasharray=\"4 3\"/>",
        WIDTH - PADDING
    ));
    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\" points=\"{}\"/>",
        points.join(" ")
    ));
    if let (Some(first), Some(end)) = (curve.first(), curve.last()) {
        svg.push_str(&format!(
            "<text x=\"{PADDING:.1}\" y=\"{:.1}\" font-size=\"10\">{}</text>",
            HEIGHT - 8.0,
            first.date.format("%Y-%m-%d")
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{}</text>",
            WIDTH - PADDING,
            HEIGHT - 8.0,
            end.date.format("%Y-%m-%d")
        ));
    }
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, equity: f64) -> EquityPoint {
        EquityPoint {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            equity,
        }
    }

    #[test]
    fn empty_curve_renders_nothing() {
        assert!(generate_equity_svg(&[]).is_empty());
    }

    #[test]
    fn renders_one_vertex_per_point() {
        let svg = generate_equity_svg(&[point(1, 0.0), point(2, 100.0), point(3, 45.0)]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        let points = svg
            .split("points=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(points.split(' ').count(), 3);
        assert!(svg.contains("2024-05-01"));
        assert!(svg.contains("2024-05-03"));
    }

    #[test]
    fn losing_curve_is_drawn_red() {
        let svg = generate_equity_svg(&[point(1, 0.0), point(2, -20.0)]);
        assert!(svg.contains("#dc2626"));
    }

    #[test]
    fn flat_curve_does_not_divide_by_zero() {
        let svg = generate_equity_svg(&[point(1, 0.0)]);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }
}
