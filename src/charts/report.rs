//! HTML Report Module
//! Assembles rendered SVG layers and their chart descriptions into a single
//! self-contained HTML document.

use crate::charts::{PlotFrame, RenderError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const STYLE: &str = include_str!("assets/chart.css");
const SCRIPT: &str = include_str!("assets/chart.js");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// Data the page script needs for legends, tooltips and range linking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Lines {
        id: String,
        frame: PlotFrame,
        dates: Vec<String>,
        x: Vec<f64>,
        series: Vec<SeriesSpec>,
        category_label: String,
        value_label: String,
    },
    StackedBars {
        id: String,
        frame: PlotFrame,
        factors: Vec<(String, String)>,
        stacks: Vec<SeriesSpec>,
        factor_label: String,
        value_label: String,
    },
    LinkedScatter {
        id: String,
        detail: PlotFrame,
        overview: PlotFrame,
        dates: Vec<String>,
        x: Vec<f64>,
        tests: Vec<f64>,
        positives: Vec<f64>,
        rates: Vec<f64>,
    },
}

impl ChartSpec {
    pub fn id(&self) -> &str {
        match self {
            ChartSpec::Lines { id, .. }
            | ChartSpec::StackedBars { id, .. }
            | ChartSpec::LinkedScatter { id, .. } => id,
        }
    }
}

/// Markup of one chart plus its description.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub markup: String,
    pub spec: ChartSpec,
}

/// A titled page holding one or more charts.
pub struct HtmlReport {
    title: String,
    views: Vec<ChartView>,
}

impl HtmlReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            views: Vec::new(),
        }
    }

    pub fn push(&mut self, view: ChartView) {
        self.views.push(view);
    }

    pub fn render(&self) -> Result<String, RenderError> {
        let specs: Vec<&ChartSpec> = self.views.iter().map(|v| &v.spec).collect();
        // Keep the payload from terminating its own script element.
        let payload = serde_json::to_string(&specs)?.replace("</", "<\\/");
        let title = escape_html(&self.title);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{title}</title>\n<style>\n{STYLE}</style>\n"));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{title}</h1>\n"));
        for view in &self.views {
            html.push_str(&format!(
                "<section class=\"chart\" id=\"{}\">\n{}\n</section>\n",
                escape_html(view.spec.id()),
                view.markup
            ));
        }
        html.push_str("<div id=\"tooltip\" class=\"tooltip\" hidden></div>\n");
        html.push_str(&format!(
            "<script type=\"application/json\" id=\"chart-specs\">{payload}</script>\n"
        ));
        html.push_str(&format!("<script>\n{SCRIPT}</script>\n</body>\n</html>\n"));
        Ok(html)
    }

    /// Render and write the page. The file is closed before returning.
    pub fn write(&self, path: &Path) -> Result<(), RenderError> {
        let html = self.render()?;
        let io_err = |source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(html.as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        info!(path = %path.display(), bytes = html.len(), "wrote chart");
        Ok(())
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> PlotFrame {
        PlotFrame {
            width: 400,
            height: 300,
            left: 70,
            right: 385,
            top: 15,
            bottom: 235,
            x_min: 0.0,
            x_max: 2.0,
            y_min: 0.0,
            y_max: 10.0,
        }
    }

    fn view() -> ChartView {
        ChartView {
            markup: "<div class=\"chart-stage\"><svg></svg></div>".to_string(),
            spec: ChartSpec::Lines {
                id: "cases".to_string(),
                frame: frame(),
                dates: vec!["2020-03-01".into(), "2020-03-02".into(), "2020-03-03".into()],
                x: vec![0.0, 1.0, 2.0],
                series: vec![SeriesSpec {
                    name: "</script>".to_string(),
                    color: "#440154".to_string(),
                    values: vec![0.0, 0.0, 1.5],
                }],
                category_label: "Canton".to_string(),
                value_label: "Cases".to_string(),
            },
        }
    }

    fn payload(html: &str) -> serde_json::Value {
        let start = html.find("id=\"chart-specs\">").unwrap() + "id=\"chart-specs\">".len();
        let end = start + html[start..].find("</script>").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn page_embeds_markup_and_description() {
        let mut report = HtmlReport::new("Daily <New> Cases");
        report.push(view());
        let html = report.render().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Daily &lt;New&gt; Cases</title>"));
        assert!(html.contains("<section class=\"chart\" id=\"cases\">"));
        assert!(html.contains("<svg></svg>"));

        let specs = payload(&html);
        assert_eq!(specs[0]["kind"], "lines");
        assert_eq!(specs[0]["frame"]["left"], 70);
        assert_eq!(specs[0]["series"][0]["name"], "</script>");
        assert_eq!(specs[0]["series"][0]["values"][2], 1.5);
    }

    #[test]
    fn write_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.html");
        let mut report = HtmlReport::new("Cases");
        report.push(view());

        report.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.render().unwrap());
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.html");
        let result = HtmlReport::new("Cases").write(&path);
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("a & 'b' \"c\""), "a &amp; &#39;b&#39; &quot;c&quot;");
    }
}
