//! What commands hand back for printing, and how each output format renders it.
use crate::format::cell_text;
use clap::ValueEnum;
use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Value,
}

/// A command result.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Rows under column headers.
    List {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Field/value pairs for one record. An empty field name is a separator.
    Show { fields: Vec<(String, Value)> },
    /// Plain message lines.
    Lines(Vec<String>),
}

impl Output {
    pub fn list<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<Value>>) -> Self {
        Output::List {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    pub fn show() -> ShowBuilder {
        ShowBuilder { fields: Vec::new() }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Output::Lines(vec![text.into()])
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match (self, format) {
            (Output::Lines(lines), _) => join_lines(lines),
            (Output::List { columns, rows }, OutputFormat::Table) => {
                let rows: Vec<Vec<String>> = rows
                    .iter()
                    .map(|row| row.iter().map(cell_text).collect())
                    .collect();
                render_table(columns, &rows)
            }
            (Output::List { columns, rows }, OutputFormat::Json) => {
                let objects: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let object: Map<String, Value> = columns
                            .iter()
                            .cloned()
                            .zip(row.iter().cloned())
                            .collect();
                        Value::Object(object)
                    })
                    .collect();
                pretty(&Value::Array(objects))
            }
            (Output::List { rows, .. }, OutputFormat::Value) => {
                let lines: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(cell_text)
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect();
                join_lines(&lines)
            }
            (Output::Show { fields }, OutputFormat::Table) => {
                let rows: Vec<Vec<String>> = fields
                    .iter()
                    .map(|(field, value)| {
                        let text = if field.is_empty() {
                            String::new()
                        } else {
                            cell_text(value)
                        };
                        vec![field.clone(), text]
                    })
                    .collect();
                render_table(&["Field".to_string(), "Value".to_string()], &rows)
            }
            (Output::Show { fields }, OutputFormat::Json) => {
                let object: Map<String, Value> = fields
                    .iter()
                    .filter(|(field, _)| !field.is_empty())
                    .cloned()
                    .collect();
                pretty(&Value::Object(object))
            }
            (Output::Show { fields }, OutputFormat::Value) => {
                let lines: Vec<String> = fields
                    .iter()
                    .filter(|(field, _)| !field.is_empty())
                    .map(|(_, value)| cell_text(value))
                    .collect();
                join_lines(&lines)
            }
        }
    }
}

/// Accumulates show fields in display order.
pub struct ShowBuilder {
    fields: Vec<(String, Value)>,
}

impl ShowBuilder {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn separator(mut self) -> Self {
        self.fields.push((String::new(), Value::Null));
        self
    }

    pub fn push_separator(&mut self) {
        self.fields.push((String::new(), Value::Null));
    }

    pub fn build(self) -> Output {
        Output::Show {
            fields: self.fields,
        }
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// ASCII box table; cells may span several lines.
fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let widest = cell.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(widest);
            }
        }
    }

    let border: String = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    push_row(&mut out, columns, &widths);
    out.push_str(&border);
    out.push('\n');
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    if !rows.is_empty() {
        out.push_str(&border);
        out.push('\n');
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let split: Vec<Vec<&str>> = cells
        .iter()
        .map(|cell| {
            let lines: Vec<&str> = cell.lines().collect();
            if lines.is_empty() {
                vec![""]
            } else {
                lines
            }
        })
        .collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(1);

    for line_index in 0..height {
        out.push('|');
        for (column, width) in widths.iter().enumerate() {
            let text = split
                .get(column)
                .and_then(|lines| lines.get(line_index))
                .copied()
                .unwrap_or("");
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(width.saturating_sub(text.width())));
            out.push_str(" |");
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_table_pads_to_widest_cell() {
        let output = Output::list(["ID", "Name"], vec![vec![json!(1), json!("prod")]]);
        assert_eq!(
            output.render(OutputFormat::Table),
            "+----+------+\n| ID | Name |\n+----+------+\n| 1  | prod |\n+----+------+\n"
        );
    }

    #[test]
    fn wide_characters_are_measured_by_display_width() {
        let output = Output::list(["Name"], vec![vec![json!("日本")]]);
        let rendered = output.render(OutputFormat::Table);
        assert!(rendered.contains("| 日本 |"), "{rendered}");
        assert!(rendered.starts_with("+------+"), "{rendered}");
    }

    #[test]
    fn show_json_keeps_field_order_and_skips_separators() {
        let output = Output::show()
            .field("id", 3)
            .separator()
            .field("name", "web")
            .build();
        assert_eq!(
            output.render(OutputFormat::Json),
            "{\n  \"id\": 3,\n  \"name\": \"web\"\n}\n"
        );
    }

    #[test]
    fn value_format_prints_bare_values() {
        let output = Output::list(
            ["ID", "Name"],
            vec![vec![json!(1), json!("a")], vec![json!(2), json!("b")]],
        );
        assert_eq!(output.render(OutputFormat::Value), "1 a\n2 b\n");
    }

    #[test]
    fn multiline_cells_grow_the_row() {
        let output = Output::show().field("variables", "a: 1\nb: 2").build();
        let rendered = output.render(OutputFormat::Table);
        assert!(rendered.contains("| variables | a: 1  |"), "{rendered}");
        assert!(rendered.contains("|           | b: 2  |"), "{rendered}");
    }
}
