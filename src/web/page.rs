use crate::models::{ChartKind, Interval};
use crate::services::SymbolCatalog;
use crate::utils::escape_html;

/// What the page shows: the current selections plus either a chart or a notice
#[derive(Debug, Default, Clone)]
pub struct PageView {
    pub symbol: Option<String>,
    pub interval: Interval,
    pub kind: ChartKind,
    pub start: String,
    pub end: String,
    /// Rendered SVG document, embedded as-is
    pub chart_svg: Option<String>,
    pub notice: Option<String>,
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

fn interval_label(interval: Interval) -> &'static str {
    match interval {
        Interval::Daily => "Daily",
        Interval::Weekly => "Weekly",
        Interval::Monthly => "Monthly",
    }
}

pub fn render_page(symbols: &SymbolCatalog, view: &PageView) -> String {
    let symbol_options: String = symbols
        .symbols()
        .iter()
        .map(|s| option(s, s, view.symbol.as_deref() == Some(s.as_str())))
        .collect();

    let interval_options: String = Interval::all()
        .iter()
        .map(|i| option(i.as_param(), interval_label(*i), *i == view.interval))
        .collect();

    let kind_options: String = [(ChartKind::Line, "Line"), (ChartKind::Bar, "Bar")]
        .iter()
        .map(|(k, label)| option(k.as_param(), label, *k == view.kind))
        .collect();

    let notice = view
        .notice
        .as_deref()
        .map(|n| format!("<p class=\"notice\">{}</p>", escape_html(n)))
        .unwrap_or_default();

    let chart = view
        .chart_svg
        .as_deref()
        .map(|svg| format!("<div class=\"chart\">{}</div>", svg))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Stock Data Visualizer</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
form {{ display: flex; flex-wrap: wrap; gap: 1rem; align-items: end; }}
label {{ display: flex; flex-direction: column; font-size: 0.9rem; }}
.notice {{ color: #a33; }}
.chart svg {{ max-width: 100%; height: auto; }}
</style>
</head>
<body>
<h1>Stock Data Visualizer</h1>
<form method="post" action="/">
<label>Symbol<select name="symbol" required>{symbol_options}</select></label>
<label>Time series<select name="series">{interval_options}</select></label>
<label>Chart type<select name="chart_type">{kind_options}</select></label>
<label>Start date<input type="date" name="start" value="{start}"></label>
<label>End date<input type="date" name="end" value="{end}"></label>
<button type="submit">Generate chart</button>
</form>
{notice}
{chart}
</body>
</html>
"#,
        start = escape_html(&view.start),
        end = escape_html(&view.end),
    )
}
