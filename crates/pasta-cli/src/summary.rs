use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pasta_cli::types::{CheckRun, TransformRun};
use pasta_ingest::format_file_size;

pub fn print_transform_summary(run: &TransformRun) {
    println!("Input: {}", run.input_dir.display());
    println!("Output: {}", run.output_dir.display());
    if run.dry_run {
        println!("Dry run: no CSV files written");
    }

    if !run.tables.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Table"),
            header_cell("Source"),
            header_cell("Size"),
            header_cell("Columns"),
            header_cell("Records"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        align_column(&mut table, 4, CellAlignment::Right);
        for summary in &run.tables {
            table.add_row(vec![
                name_cell(&summary.name),
                dim_cell(summary.source.display()),
                Cell::new(format_file_size(summary.size_bytes)),
                Cell::new(summary.columns),
                Cell::new(summary.records),
            ]);
        }
        println!("{table}");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Columns"),
        header_cell("Rules"),
        header_cell("Rows"),
        header_cell("CSV"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    for summary in &run.outputs {
        table.add_row(vec![
            name_cell(&summary.name),
            Cell::new(summary.columns),
            Cell::new(summary.rules),
            Cell::new(summary.rows),
            written_cell(summary.csv_path.is_some()),
            count_cell(summary.warnings.len(), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(run.total_rows()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(run.total_warnings(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if !run.errors.is_empty() {
        eprintln!("Errors:");
        for error in &run.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_check_summary(run: &CheckRun) {
    println!("Output: {}", run.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("Output"),
        header_cell("Headers"),
        header_cell("Rules"),
        header_cell("Problems"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in &run.entries {
        let problems = if entry.problems.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(entry.problems.join("\n")).fg(Color::Red)
        };
        table.add_row(vec![
            status_cell(entry.passed()),
            name_cell(&entry.name),
            optional_count_cell(entry.headers),
            optional_count_cell(entry.rules),
            problems,
        ]);
    }
    println!("{table}");
    println!(
        "{} passed, {} failed",
        run.passed_count(),
        run.failed_count()
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn name_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn status_cell(passed: bool) -> Cell {
    if passed {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn written_cell(written: bool) -> Cell {
    if written {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn optional_count_cell(count: Option<usize>) -> Cell {
    match count {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
