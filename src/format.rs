use colored::Colorize;
use polity_types::{EntityRecord, TypedValue};

use crate::config::{COLUMN_WIDTH, LABEL_PADDING};
use crate::error::FormatError;

// ── Display configuration ───────────────────────────────────────────

/// One report row: the first key decides the winner, every key feeds the
/// `{}` slots of `template` in order.
#[derive(Debug)]
pub struct DisplayRow {
    pub label: &'static str,
    pub template: &'static str,
    pub keys: &'static [&'static str],
}

#[derive(Debug)]
pub struct DisplayGroup {
    pub name: &'static str,
    pub rows: &'static [DisplayRow],
}

const fn row(
    label: &'static str,
    template: &'static str,
    keys: &'static [&'static str],
) -> DisplayRow {
    DisplayRow {
        label,
        template,
        keys,
    }
}

/// Sections of the grouped report. Locale fields are left out.
pub const GROUPS: &[DisplayGroup] = &[
    DisplayGroup {
        name: "Area",
        rows: &[
            row("Total", "{} km² ({})", &["area_km2", "area_rank"]),
            row("Water (%)", "{}", &["percent_water"]),
        ],
    },
    DisplayGroup {
        name: "Population",
        rows: &[
            row(
                "Estimate",
                "{} ({})",
                &["population_estimate", "population_estimate_rank"],
            ),
            row("Census", "{}", &["population_census"]),
            row(
                "Density",
                "{}/km² ({})",
                &["population_density_km2", "population_density_rank"],
            ),
        ],
    },
    DisplayGroup {
        name: "GDP (PPP)",
        rows: &[
            row("Total", "${} ({})", &["GDP_PPP", "GDP_PPP_rank"]),
            row(
                "Per capita",
                "${} ({})",
                &["GDP_PPP_per_capita", "GDP_PPP_per_capita_rank"],
            ),
        ],
    },
    DisplayGroup {
        name: "GDP (nominal)",
        rows: &[
            row("Total", "${} ({})", &["GDP_nominal", "GDP_nominal_rank"]),
            row(
                "Per capita",
                "${} ({})",
                &["GDP_nominal_per_capita", "GDP_nominal_per_capita_rank"],
            ),
        ],
    },
    DisplayGroup {
        name: "GINI",
        rows: &[row("GINI", "{} ({})", &["Gini", "Gini_rank"])],
    },
    DisplayGroup {
        name: "HDI",
        rows: &[row("HDI", "{} ({})", &["HDI", "HDI_rank"])],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Sections from `GROUPS`.
    #[default]
    Grouped,
    /// One `key:` row per record field, in record order.
    Flat,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Color the winning cell of each row.
    pub highlight: bool,
    pub layout: Layout,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            highlight: true,
            layout: Layout::Grouped,
        }
    }
}

// ── Report model ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    /// Entity labels, one per column.
    Header(Vec<String>),
    /// Name of a section with more than one row.
    Title(String),
    Row {
        label: String,
        cells: Vec<String>,
        /// Column index of the winning entity.
        winner: usize,
    },
}

/// Laid-out comparison, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub label_width: usize,
    pub lines: Vec<ReportLine>,
}

impl Report {
    /// Lay out `records` under `labels`; index i of one belongs to index i
    /// of the other.
    pub fn build<S: AsRef<str>>(
        labels: &[S],
        records: &[EntityRecord],
        layout: Layout,
    ) -> Result<Self, FormatError> {
        if labels.len() != records.len() {
            return Err(FormatError::ArityMismatch {
                labels: labels.len(),
                records: records.len(),
            });
        }
        let labels: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
        check_key_sets(&labels, records)?;

        let mut lines = vec![ReportLine::Header(
            labels.iter().map(|l| l.to_string()).collect(),
        )];

        let label_width = match layout {
            Layout::Grouped => {
                for group in GROUPS {
                    let nested = group.rows.len() > 1;
                    if nested {
                        lines.push(ReportLine::Title(group.name.to_string()));
                    }
                    for row in group.rows {
                        let label = if nested {
                            format!("  {}", row.label)
                        } else {
                            row.label.to_string()
                        };
                        lines.push(layout_row(&labels, records, label, row.template, row.keys)?);
                    }
                }
                longest(GROUPS.iter().map(|g| g.name))
            }
            Layout::Flat => {
                let keys: Vec<&str> = records.first().map(|r| r.keys().collect()).unwrap_or_default();
                let mut width = 0;
                for key in keys {
                    let label = format!("{key}:");
                    width = width.max(label.chars().count());
                    lines.push(layout_row(&labels, records, label, "{}", &[key])?);
                }
                width
            }
        };

        Ok(Report {
            label_width: label_width + LABEL_PADDING,
            lines,
        })
    }

    /// Fixed-width text, one line per `ReportLine`.
    pub fn render(&self, highlight: bool) -> String {
        let width = self.label_width;
        let mut out = String::new();

        for line in &self.lines {
            match line {
                ReportLine::Header(labels) => {
                    out.push_str(&format!("{:<width$}", ""));
                    for label in labels {
                        out.push_str(&format!(" {label:>COLUMN_WIDTH$}"));
                    }
                }
                ReportLine::Title(name) => out.push_str(name),
                ReportLine::Row {
                    label,
                    cells,
                    winner,
                } => {
                    out.push_str(&format!("{label:<width$}"));
                    for (i, cell) in cells.iter().enumerate() {
                        // Pad before coloring so escape codes never count
                        // toward the column width.
                        let padded = format!("{cell:>COLUMN_WIDTH$}");
                        out.push(' ');
                        if highlight && i == *winner {
                            out.push_str(&padded.green().to_string());
                        } else {
                            out.push_str(&padded);
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Lay out and render in one step.
pub fn format_report<S: AsRef<str>>(
    labels: &[S],
    records: &[EntityRecord],
    options: FormatOptions,
) -> Result<String, FormatError> {
    Ok(Report::build(labels, records, options.layout)?.render(options.highlight))
}

// ── Helpers ─────────────────────────────────────────────────────────

fn layout_row(
    labels: &[&str],
    records: &[EntityRecord],
    label: String,
    template: &str,
    keys: &[&str],
) -> Result<ReportLine, FormatError> {
    let mut cells = Vec::with_capacity(records.len());
    let mut leading = Vec::with_capacity(records.len());

    for (entity, record) in labels.iter().zip(records) {
        let values = keys
            .iter()
            .map(|key| {
                record.get(key).ok_or_else(|| FormatError::MissingField {
                    entity: entity.to_string(),
                    key: key.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(first) = values.first() {
            leading.push(*first);
        }
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        cells.push(fill_template(template, &rendered));
    }

    Ok(ReportLine::Row {
        label,
        cells,
        winner: winner(&leading),
    })
}

/// Index of the greatest value. Strict `>` keeps the earliest of equals,
/// and index 0 stands when nothing compares greater.
pub fn winner(values: &[&TypedValue]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Substitute `values` into the `{}` slots of `template`, left to right.
fn fill_template(template: &str, values: &[String]) -> String {
    let mut parts = template.split("{}");
    let mut out = parts.next().unwrap_or_default().to_string();
    let mut values = values.iter();
    for part in parts {
        if let Some(value) = values.next() {
            out.push_str(value);
        }
        out.push_str(part);
    }
    out
}

/// Every record must carry the same keys, or columns would not line up.
fn check_key_sets(labels: &[&str], records: &[EntityRecord]) -> Result<(), FormatError> {
    for (i, record) in records.iter().enumerate() {
        for other in records.iter() {
            if let Some(key) = other.keys().find(|k| !record.contains_key(k)) {
                return Err(FormatError::MissingField {
                    entity: labels[i].to_string(),
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn longest<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0)
}
