//! Terminal rendering of pipeline output

use colored::*;
use reqsql_core::domain::cell::Cell;
use reqsql_core::domain::pipeline::{PipelineResult, PipelineStage};
use reqsql_core::domain::result::{DISPLAY_ROW_LIMIT, QueryResult};
use reqsql_pipeline::ProgressSink;

/// Prints a status line for every stage transition
pub struct StatusLines;

impl ProgressSink for StatusLines {
    fn on_transition(&self, from: PipelineStage, to: PipelineStage) {
        println!("{}", transition_line(from, to));
    }

    fn on_stage_complete(&self, stage: PipelineStage, items: usize) {
        let noun = match stage {
            PipelineStage::DerivingUseCases => "use case(s)",
            PipelineStage::SynthesizingQueries => "query(ies)",
            _ => "result(s)",
        };
        println!("      {} {} {}", "→".dimmed(), items, noun);
    }
}

fn transition_line(from: PipelineStage, to: PipelineStage) -> String {
    match (from, to) {
        (_, PipelineStage::Done) => format!("{} {}", "✓".green(), "Pipeline complete".bold()),
        // An empty document aborts before any stage starts
        (PipelineStage::Idle, PipelineStage::Aborted) => format!(
            "{} {}",
            "✗".red(),
            "Pipeline not started: empty document".bold()
        ),
        (from, PipelineStage::Aborted) => {
            format!("{} {}", "✗".red(), format!("Pipeline aborted during: {}", from).bold())
        }
        (_, stage) => {
            let number = stage.number().unwrap_or_default();
            format!(
                "{} {}",
                format!("[{}/3]", number).cyan(),
                format!("{}...", stage).dimmed()
            )
        }
    }
}

/// Flattens a cell into display text
///
/// Lists become comma-separated values, mappings become `key: value` pairs.
pub fn flatten_cell(cell: &Cell) -> String {
    match cell {
        Cell::Null => "NULL".to_string(),
        Cell::Bool(value) => value.to_string(),
        Cell::Integer(value) => value.to_string(),
        Cell::Float(value) => value.to_string(),
        Cell::Text(value) => value.clone(),
        Cell::List(items) => items.iter().map(flatten_cell).collect::<Vec<_>>().join(", "),
        Cell::Map(entries) => entries
            .iter()
            .map(|(key, value)| format!("{}: {}", key, flatten_cell(value)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub fn print_pipeline_result(result: &PipelineResult) {
    println!();
    println!("{}", "Pipeline Result:".bold());
    println!("  Run:    {}", result.run_id.to_string().cyan());
    println!("  Stage:  {}", colorize_stage(result.stage));
    if let Some(completed) = result.completed_at {
        let duration = completed.signed_duration_since(result.started_at);
        println!("  Time:   {:.1}s", duration.num_milliseconds() as f64 / 1000.0);
    }

    if result.has_errors() {
        println!("\n{}", "Errors:".red().bold());
        for error in &result.errors {
            println!("  - {}", error.red());
        }
    }

    match &result.use_cases {
        Some(use_cases) => {
            println!("\n{}", "1. Use Cases".bold());
            for (i, use_case) in use_cases.iter().enumerate() {
                println!("  {}. {}", i + 1, use_case);
            }
        }
        None => println!("\n{}", "No use cases were derived.".yellow()),
    }

    match &result.sql_queries {
        Some(queries) => {
            println!("\n{}", "2. SQL Queries".bold());
            for (i, query) in queries.iter().enumerate() {
                println!("  {}", format!("Query {}:", i + 1).bold());
                for line in query.as_str().lines() {
                    println!("    {}", line.cyan());
                }
            }
        }
        None if result.use_cases.is_some() => {
            println!("\n{}", "No SQL queries were generated.".yellow())
        }
        None => {}
    }

    match &result.execution_results {
        Some(results) => {
            println!(
                "\n{}",
                format!("3. Execution Results (max {} rows per query)", DISPLAY_ROW_LIMIT).bold()
            );
            for execution in results {
                println!();
                for line in execution.query.as_str().lines() {
                    println!("  {}", line.cyan());
                }
                print_query_result(&execution.result);
            }
        }
        None if result.sql_queries.is_some() => {
            println!("\n{}", "SQL queries were not executed.".yellow())
        }
        None => {}
    }
}

fn print_query_result(result: &QueryResult) {
    if let Some(message) = result.error_message() {
        println!("  {} {}", "✗".red(), message.red());
        return;
    }

    if result.rows.is_empty() {
        println!("  {}", "(no rows)".dimmed());
        return;
    }

    for line in format_table(&result.headers, &result.rows) {
        println!("  {}", line);
    }
    if result.truncated {
        println!("  {}", format!("(first {} rows shown)", DISPLAY_ROW_LIMIT).dimmed());
    }
}

/// Lays out a result as aligned text columns
pub fn format_table(headers: &[String], rows: &[Vec<Cell>]) -> Vec<String> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(flatten_cell).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            match widths.get_mut(i) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }

    let pad = |values: &[String]| {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", v, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(pad(headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(pad(row.as_slice()));
    }
    lines
}

fn colorize_stage(stage: PipelineStage) -> ColoredString {
    match stage {
        PipelineStage::Done => stage.to_string().green(),
        PipelineStage::Aborted => stage.to_string().red(),
        _ => stage.to_string().yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_abort_lines() {
        let empty = transition_line(PipelineStage::Idle, PipelineStage::Aborted);
        assert!(empty.contains("Pipeline not started: empty document"));
        assert!(!empty.contains("Idle"));

        let mid_run = transition_line(PipelineStage::SynthesizingQueries, PipelineStage::Aborted);
        assert!(mid_run.contains("Pipeline aborted during: "));
    }

    #[test]
    fn test_flatten_scalars() {
        assert_eq!(flatten_cell(&Cell::Null), "NULL");
        assert_eq!(flatten_cell(&Cell::Integer(42)), "42");
        assert_eq!(flatten_cell(&Cell::Bool(false)), "false");
        assert_eq!(flatten_cell(&Cell::text("Open")), "Open");
    }

    #[test]
    fn test_flatten_list() {
        let cell = Cell::List(vec![Cell::text("auto"), Cell::text("home"), Cell::Integer(3)]);
        assert_eq!(flatten_cell(&cell), "auto, home, 3");
    }

    #[test]
    fn test_flatten_map() {
        let mut entries = BTreeMap::new();
        entries.insert("limit".to_string(), Cell::Integer(50000));
        entries.insert("type".to_string(), Cell::text("Collision"));
        assert_eq!(flatten_cell(&Cell::Map(entries)), "limit: 50000, type: Collision");
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let headers = vec!["CLAIMID".to_string(), "N".to_string()];
        let rows = vec![
            vec![Cell::text("C-1"), Cell::Integer(12)],
            vec![Cell::text("C-1000"), Cell::Null],
        ];
        let lines = format_table(&headers, &rows);
        assert_eq!(
            lines,
            vec![
                "CLAIMID | N",
                "--------+-----",
                "C-1     | 12",
                "C-1000  | NULL",
            ]
        );
    }
}
