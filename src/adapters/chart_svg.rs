//! SVG chart rendering for signal reports.
//!
//! Three stacked panels over the complete rows of a series: close price with
//! both EMAs, RSI with its threshold gridlines, and MACD against its signal
//! line. Output is self-contained SVG markup with no external assets.

use crate::domain::series::IndicatorRow;
use crate::domain::signal::Thresholds;

const WIDTH: f64 = 640.0;
const PANEL_HEIGHT: f64 = 150.0;
const PADDING: f64 = 42.0;
const PANEL_GAP: f64 = 26.0;

struct Panel {
    top: f64,
    title: &'static str,
}

/// Render the chart for all complete rows. Returns an empty string when
/// there is nothing to plot; callers skip the artifact in that case.
pub fn render_chart(rows: &[IndicatorRow], symbol: &str, thresholds: &Thresholds) -> String {
    let complete: Vec<&IndicatorRow> = rows.iter().filter(|r| r.is_complete()).collect();
    if complete.is_empty() {
        return String::new();
    }

    let closes: Vec<f64> = complete.iter().map(|r| r.close).collect();
    let ema_fast: Vec<f64> = complete.iter().filter_map(|r| r.ema_fast).collect();
    let ema_slow: Vec<f64> = complete.iter().filter_map(|r| r.ema_slow).collect();
    let rsi: Vec<f64> = complete.iter().filter_map(|r| r.rsi).collect();
    let macd: Vec<f64> = complete.iter().filter_map(|r| r.macd).collect();
    let macd_sig: Vec<f64> = complete.iter().filter_map(|r| r.macd_signal).collect();

    let panels = [
        Panel {
            top: PADDING,
            title: "Close / EMA",
        },
        Panel {
            top: PADDING + PANEL_HEIGHT + PANEL_GAP,
            title: "RSI",
        },
        Panel {
            top: PADDING + 2.0 * (PANEL_HEIGHT + PANEL_GAP),
            title: "MACD",
        },
    ];
    let total_height = PADDING * 2.0 + 3.0 * PANEL_HEIGHT + 2.0 * PANEL_GAP;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{total_height}" viewBox="0 0 {WIDTH} {total_height}">"#
    ));
    svg.push_str(&format!(
        r#"<rect width="{WIDTH}" height="{total_height}" fill="white"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="24" font-family="sans-serif" font-size="16">{} daily signals</text>"#,
        PADDING, symbol
    ));

    // Price panel: shared scale across close and both EMAs.
    let price_bounds = bounds(&[&closes, &ema_fast, &ema_slow]);
    svg.push_str(&panel_frame(&panels[0]));
    svg.push_str(&polyline(&closes, price_bounds, panels[0].top, "#1f4e9c", 1.5));
    svg.push_str(&polyline(&ema_fast, price_bounds, panels[0].top, "#2a9d3f", 1.0));
    svg.push_str(&polyline(&ema_slow, price_bounds, panels[0].top, "#c03232", 1.0));

    // RSI panel: fixed 0-100 scale so the thresholds sit where they should.
    let rsi_bounds = (0.0, 100.0);
    svg.push_str(&panel_frame(&panels[1]));
    for level in [thresholds.rsi_low, thresholds.rsi_high] {
        let y = scale_y(level, rsi_bounds, panels[1].top);
        svg.push_str(&format!(
            r##"<line x1="{}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="#888888" stroke-dasharray="4 3" stroke-width="0.8"/>"##,
            PADDING,
            WIDTH - PADDING
        ));
    }
    svg.push_str(&polyline(&rsi, rsi_bounds, panels[1].top, "#6b2fa0", 1.2));

    // MACD panel: line vs. signal with a zero gridline.
    let macd_bounds = bounds(&[&macd, &macd_sig]);
    svg.push_str(&panel_frame(&panels[2]));
    if macd_bounds.0 < 0.0 && macd_bounds.1 > 0.0 {
        let y = scale_y(0.0, macd_bounds, panels[2].top);
        svg.push_str(&format!(
            r##"<line x1="{}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="#888888" stroke-dasharray="4 3" stroke-width="0.8"/>"##,
            PADDING,
            WIDTH - PADDING
        ));
    }
    svg.push_str(&polyline(&macd, macd_bounds, panels[2].top, "#1f4e9c", 1.2));
    svg.push_str(&polyline(&macd_sig, macd_bounds, panels[2].top, "#c03232", 1.2));

    svg.push_str("</svg>");
    svg
}

fn panel_frame(panel: &Panel) -> String {
    format!(
        r##"<rect x="{}" y="{}" width="{}" height="{PANEL_HEIGHT}" fill="none" stroke="#333333" stroke-width="0.8"/><text x="{}" y="{}" font-family="sans-serif" font-size="11" fill="#333333">{}</text>"##,
        PADDING,
        panel.top,
        WIDTH - 2.0 * PADDING,
        PADDING,
        panel.top - 6.0,
        panel.title
    )
}

fn bounds(series: &[&Vec<f64>]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for values in series {
        for &v in values.iter() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min == max {
        // Degenerate flat series: pad so the line lands mid-panel.
        min -= 1.0;
        max += 1.0;
    }
    (min, max)
}

fn scale_y(value: f64, (min, max): (f64, f64), top: f64) -> f64 {
    top + PANEL_HEIGHT - (value - min) / (max - min) * PANEL_HEIGHT
}

fn polyline(values: &[f64], bounds: (f64, f64), top: f64, color: &str, width: f64) -> String {
    let plot_width = WIDTH - 2.0 * PADDING;
    let step = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = PADDING + i as f64 * step;
            format!("{:.1},{:.1}", x, scale_y(v, bounds, top))
        })
        .collect();

    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="{}" points="{}"/>"#,
        color,
        width,
        points.join(" ")
    )
}
