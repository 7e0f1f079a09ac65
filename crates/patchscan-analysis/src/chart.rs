//! SVG bar chart of keyword additions versus deletions.

use std::path::Path;

use patchscan_core::{KeywordTally, PatchscanError};

use crate::output::write_with_retry;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 64.0;
const MARGIN_BOTTOM: f64 = 88.0;
const Y_TICKS: u64 = 5;

const ADDITIONS_COLOR: &str = "#2e7d32";
const DELETIONS_COLOR: &str = "#c62828";

/// Render `tally` as a grouped bar chart, one group per keyword in
/// canonical order, with "Additions" and "Deletions" series.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::chart::render_bar_chart;
/// use patchscan_core::{Keyword, KeywordTally, Polarity};
///
/// let mut tally = KeywordTally::new();
/// tally.increment(Keyword::If, Polarity::Added);
/// let svg = render_bar_chart(&tally, "Repository patch analysis");
/// assert!(svg.starts_with("<svg"));
/// assert!(svg.contains("Additions"));
/// assert!(svg.contains("else:"));
/// ```
pub fn render_bar_chart(tally: &KeywordTally, title: &str) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_h;

    let peak = tally
        .rows()
        .map(|(_, added, removed)| added.max(removed))
        .max()
        .unwrap_or(0)
        .max(1);
    let step = peak.div_ceil(Y_TICKS);
    let axis_max = (step * Y_TICKS) as f64;

    let rows: Vec<_> = tally.rows().collect();
    let group_w = plot_w / rows.len() as f64;
    let bar_w = group_w * 0.35;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="32" font-size="20" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape_xml(title)
    ));
    svg.push('\n');

    for tick in 0..=Y_TICKS {
        let value = step * tick;
        let y = baseline - (value as f64 / axis_max) * plot_h;
        svg.push_str(&format!(
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e0e0e0"/>"##,
            MARGIN_LEFT + plot_w
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{value}</text>"#,
            MARGIN_LEFT - 8.0,
            y + 4.0
        ));
        svg.push('\n');
    }

    for (i, (keyword, added, removed)) in rows.iter().enumerate() {
        let group_x = MARGIN_LEFT + i as f64 * group_w;
        let label = escape_xml(keyword.as_str());

        for (offset, count, color, series) in [
            (0.0, *added, ADDITIONS_COLOR, "additions"),
            (bar_w, *removed, DELETIONS_COLOR, "deletions"),
        ] {
            let h = (count as f64 / axis_max) * plot_h;
            let x = group_x + group_w * 0.15 + offset;
            svg.push_str(&format!(
                r#"<rect x="{x:.1}" y="{:.1}" width="{bar_w:.1}" height="{h:.1}" fill="{color}"><title>{label}: {count} {series}</title></rect>"#,
                baseline - h
            ));
        }

        let label_x = group_x + group_w / 2.0;
        let label_y = baseline + 16.0;
        svg.push_str(&format!(
            r#"<text x="{label_x:.1}" y="{label_y:.1}" font-size="12" text-anchor="end" transform="rotate(-35 {label_x:.1} {label_y:.1})">{label}</text>"#
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r##"<line x1="{MARGIN_LEFT}" y1="{baseline:.1}" x2="{:.1}" y2="{baseline:.1}" stroke="#333"/>"##,
        MARGIN_LEFT + plot_w
    ));
    svg.push('\n');

    let legend_x = WIDTH - MARGIN_RIGHT - 200.0;
    for (i, (name, color)) in [("Additions", ADDITIONS_COLOR), ("Deletions", DELETIONS_COLOR)]
        .into_iter()
        .enumerate()
    {
        let x = legend_x + i as f64 * 100.0;
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="42" width="12" height="12" fill="{color}"/><text x="{:.1}" y="53" font-size="13">{name}</text>"#,
            x + 18.0
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the chart to `path`, creating the parent directory if
/// the first write fails.
///
/// # Errors
///
/// Returns [`PatchscanError::Output`] if the file cannot be written.
pub fn write_chart(path: &Path, tally: &KeywordTally, title: &str) -> Result<(), PatchscanError> {
    write_with_retry(path, render_bar_chart(tally, title).as_bytes())
}

/// Whether a prompt answer asks for the chart: `y` or `yes`, any case.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::chart::wants_chart;
///
/// assert!(wants_chart(" Yes\n"));
/// assert!(!wants_chart("n"));
/// ```
pub fn wants_chart(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchscan_core::{Keyword, Polarity};

    #[test]
    fn one_bar_pair_per_keyword() {
        let svg = render_bar_chart(&KeywordTally::new(), "t");
        let bars = svg.matches("<rect x=").count();
        // two series per keyword plus two legend swatches
        assert_eq!(bars, Keyword::ALL.len() * 2 + 2);
        for keyword in Keyword::ALL {
            assert!(svg.contains(&format!(">{}</text>", keyword.as_str())));
        }
    }

    #[test]
    fn tallest_bar_fills_plot() {
        let mut tally = KeywordTally::new();
        for _ in 0..10 {
            tally.increment(Keyword::Def, Polarity::Removed);
        }
        let svg = render_bar_chart(&tally, "t");
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        assert!(svg.contains(&format!(r#"height="{plot_h:.1}" fill="{DELETIONS_COLOR}""#)));
        assert!(svg.contains("def: 10 deletions"));
    }

    #[test]
    fn chart_prompt_answers() {
        for yes in ["y", "Y", "yes", "YES", "  yEs  "] {
            assert!(wants_chart(yes), "{yes:?}");
        }
        for no in ["", "n", "no", "yep", "y e s", "sure"] {
            assert!(!wants_chart(no), "{no:?}");
        }
    }

    #[test]
    fn title_is_escaped() {
        let svg = render_bar_chart(&KeywordTally::new(), "a < b & \"c\"");
        assert!(svg.contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn write_chart_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts/analysis.svg");
        write_chart(&path, &KeywordTally::new(), "t").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("</svg>\n"));
    }
}
