//! Chart parts: title, chart type and series data.
//!
//! Chart data is read from the workbook embedded in the package when there
//! is one. The copy cached inside the chart XML (`c:strCache`/`c:numCache`)
//! is used otherwise.

use crate::xml::XmlElement;
use calamine::{Data, Reader, Xlsx};
use slidekit_core::{Error, Grid, Result};
use std::io::Cursor;

/// Upper bound on points in one cached series, the worksheet row limit.
const MAX_CACHE_POINTS: usize = 1_048_576;

/// One data series of a chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<String>,
}

/// Data read from a chart part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// Chart title, `None` when the chart has no title text.
    pub title: Option<String>,
    /// Chart type name such as `COLUMN_CLUSTERED` or `PIE`.
    pub chart_type: String,
    pub series: Vec<Series>,
    /// Rows of the embedded workbook's first sheet, header row first.
    pub workbook: Option<Vec<Vec<String>>>,
}

impl ChartData {
    /// Parse a `c:chartSpace` part.
    pub fn parse(xml: &str) -> Result<ChartData> {
        Self::from_element(&XmlElement::parse(xml)?)
    }

    /// Read title, type and cached series from a parsed `c:chartSpace`.
    pub fn from_element(root: &XmlElement) -> Result<ChartData> {
        let chart = root.child("chart").unwrap_or(root);

        let title = chart.child("title").and_then(title_text);

        let plots: Vec<&XmlElement> = chart
            .child("plotArea")
            .map(|area| {
                area.children
                    .iter()
                    .filter(|c| c.name.ends_with("Chart"))
                    .collect()
            })
            .unwrap_or_default();

        let chart_type = plots
            .first()
            .map(|plot| chart_type_name(plot))
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let series: Vec<Series> = plots
            .iter()
            .flat_map(|plot| plot.children_named("ser"))
            .map(parse_series)
            .collect::<Result<_>>()?;

        Ok(ChartData {
            title,
            chart_type,
            series,
            workbook: None,
        })
    }

    /// Lay the data out as a grid, dropping rows and columns that are
    /// entirely empty.
    ///
    /// The workbook's first row is the header when a workbook was read.
    /// Otherwise the cached values give categories by series.
    pub fn to_grid(&self) -> Grid {
        if let Some((header, rows)) = self.workbook.as_ref().and_then(|w| w.split_first()) {
            let mut grid = Grid::with_header(header.clone());
            for row in rows {
                grid.add_row(row.clone());
            }
            return grid;
        }

        let categories = self
            .series
            .iter()
            .map(|s| &s.categories)
            .find(|c| !c.is_empty())
            .cloned()
            .unwrap_or_default();
        let len = self
            .series
            .iter()
            .map(|s| s.values.len())
            .chain(std::iter::once(categories.len()))
            .max()
            .unwrap_or(0);

        // Column 0 holds the categories, then one column per series.
        let mut columns: Vec<(String, Vec<String>)> = Vec::with_capacity(self.series.len() + 1);
        columns.push((String::new(), pad(&categories, len)));
        for s in &self.series {
            columns.push((s.name.clone(), pad(&s.values, len)));
        }

        columns.retain(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()));

        let mut grid = Grid::with_header(columns.iter().map(|(name, _)| name.clone()).collect());
        for i in 0..len {
            let row: Vec<String> = columns.iter().map(|(_, cells)| cells[i].clone()).collect();
            if row.iter().any(|c| !c.trim().is_empty()) {
                grid.add_row(row);
            }
        }
        grid
    }

    /// Title line, type line and data grid, as placed in a slide's text.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        if let Some(title) = &self.title {
            text.push_str(&format!("Chart Title : {}\n", title));
        }
        text.push_str(&format!("Chart Type : {}\n", self.chart_type));
        text.push_str(&self.to_grid().render());
        text
    }
}

fn pad(cells: &[String], len: usize) -> Vec<String> {
    let mut out = cells.to_vec();
    out.resize(len, String::new());
    out
}

/// Rich-text title paragraphs joined by newlines, or the cached title string.
fn title_text(title: &XmlElement) -> Option<String> {
    let tx = title.child("tx")?;
    let text = match tx.child("rich") {
        Some(rich) => rich
            .children_named("p")
            .map(|p| p.find_all("t").iter().map(|t| t.text()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n"),
        None => tx
            .find_all("v")
            .first()
            .map(|v| v.text().to_string())
            .unwrap_or_default(),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn chart_type_name(plot: &XmlElement) -> String {
    let value = |name: &str| plot.child(name).and_then(|e| e.attr("val"));
    let grouping_suffix = match value("grouping") {
        Some("stacked") => "_STACKED",
        Some("percentStacked") => "_STACKED_100",
        Some("clustered") => "_CLUSTERED",
        _ => "",
    };

    match plot.name.as_str() {
        "barChart" | "bar3DChart" => {
            let base = if value("barDir") == Some("bar") { "BAR" } else { "COLUMN" };
            let suffix = if grouping_suffix.is_empty() { "_CLUSTERED" } else { grouping_suffix };
            let prefix = if plot.name == "bar3DChart" { "THREE_D_" } else { "" };
            format!("{}{}{}", prefix, base, suffix)
        }
        "lineChart" => {
            let suffix = if grouping_suffix == "_CLUSTERED" { "" } else { grouping_suffix };
            format!("LINE{}", suffix)
        }
        "line3DChart" => "THREE_D_LINE".to_string(),
        "areaChart" => {
            let suffix = if grouping_suffix == "_CLUSTERED" { "" } else { grouping_suffix };
            format!("AREA{}", suffix)
        }
        "area3DChart" => "THREE_D_AREA".to_string(),
        "pieChart" => "PIE".to_string(),
        "pie3DChart" => "THREE_D_PIE".to_string(),
        "ofPieChart" => {
            if value("ofPieType") == Some("bar") {
                "BAR_OF_PIE".to_string()
            } else {
                "PIE_OF_PIE".to_string()
            }
        }
        "doughnutChart" => "DOUGHNUT".to_string(),
        "scatterChart" => "XY_SCATTER".to_string(),
        "bubbleChart" => "BUBBLE".to_string(),
        "radarChart" => "RADAR".to_string(),
        "stockChart" => "STOCK_HLC".to_string(),
        "surfaceChart" | "surface3DChart" => "SURFACE".to_string(),
        other => other.trim_end_matches("Chart").to_uppercase(),
    }
}

fn parse_series(ser: &XmlElement) -> Result<Series> {
    let name = ser
        .child("tx")
        .map(|tx| {
            tx.find_all("v")
                .first()
                .map(|v| v.text().to_string())
                .unwrap_or_else(|| tx.text().trim().to_string())
        })
        .unwrap_or_default();

    let categories = match ser.child("cat").or_else(|| ser.child("xVal")) {
        Some(data) => cached_points(data)?,
        None => Vec::new(),
    };
    let values = match ser.child("val").or_else(|| ser.child("yVal")) {
        Some(data) => cached_points(data)?,
        None => Vec::new(),
    };

    Ok(Series {
        name,
        categories,
        values,
    })
}

/// Values of a data reference's cache, placed by their `idx`.
///
/// Multi-level category caches contribute their innermost level only.
fn cached_points(data: &XmlElement) -> Result<Vec<String>> {
    let cache = data
        .find("strCache")
        .or_else(|| data.find("numCache"))
        .or_else(|| data.find("lvl"))
        .or_else(|| data.find("strLit"))
        .or_else(|| data.find("numLit"));
    let Some(cache) = cache else {
        return Ok(Vec::new());
    };

    let points: Vec<(usize, String)> = cache
        .children_named("pt")
        .filter_map(|pt| {
            let idx = pt.attr("idx")?.parse().ok()?;
            let value = pt.child("v").map(|v| v.text().to_string()).unwrap_or_default();
            Some((idx, value))
        })
        .collect();

    let count = cache
        .child("ptCount")
        .and_then(|c| c.attr("val"))
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
        .max(points.iter().map(|(i, _)| i.saturating_add(1)).max().unwrap_or(0));
    if count > MAX_CACHE_POINTS {
        return Err(Error::CorruptedFile(format!(
            "Chart cache declares {} points, more than the limit of {}",
            count, MAX_CACHE_POINTS
        )));
    }

    let mut out = vec![String::new(); count];
    for (idx, value) in points {
        out[idx] = value;
    }
    Ok(out)
}

/// Cell text of the first worksheet of an xlsx workbook, header row first.
///
/// Rows that are entirely empty are removed, then columns with no data
/// below the header. A sheet with a header and no data yields no rows.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| Error::CorruptedFile(format!("Failed to open chart workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| Error::CorruptedFile("Chart workbook has no worksheets".to_string()))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| Error::CorruptedFile(format!("Failed to read worksheet: {}", e)))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .filter(|row: &Vec<String>| row.iter().any(|c| !c.trim().is_empty()))
        .collect();
    if rows.len() < 2 {
        return Ok(Vec::new());
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<usize> = (0..width)
        .filter(|&col| {
            rows[1..]
                .iter()
                .any(|row| row.get(col).is_some_and(|c| !c.trim().is_empty()))
        })
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}
