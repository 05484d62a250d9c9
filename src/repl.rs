use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use gridedit::config::parse_non_zero;
use gridedit::{ExportFormat, GridViewer, SortDirection, SortSpec};

const MAX_CELL_WIDTH: usize = 24;

const HELP: &str = "\
show                     print the current page
search <text>            search every cell (empty clears)
filter <column>=<text>   filter a column (empty text clears it)
filters clear            drop every filter
sort <column> [asc|desc] sort by a column
sort off                 clear sorting
page <n> | next | prev   move between pages
page-size <n>            rows per page
load <n>                 load another stored page (discards history;
                         a partial page cannot be saved)
edit <row> <column>      start editing a cell
type <value>             set the pending value
commit | cancel          finish the pending edit
add-row | rm-row <row>   add or remove rows
add-col <name> | rm-col <name>
undo | redo
save                     write the grid back to the store
export <path>            export the current grid (.csv or .xlsx)
status                   show history and save state
quit                     leave (quit! discards unsaved changes)";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run<R: BufRead, W: Write>(viewer: &mut GridViewer, input: R, mut out: W) -> Result<()> {
    print_page(viewer, &mut out)?;
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        match execute(viewer, line.trim(), &mut out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => writeln!(out, "error: {err:#}")?,
        }
        out.flush()?;
    }
    Ok(())
}

fn execute<W: Write>(viewer: &mut GridViewer, line: &str, out: &mut W) -> Result<Flow> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => return Ok(Flow::Continue),
        "help" => writeln!(out, "{HELP}")?,
        "show" => print_page(viewer, out)?,
        "search" => {
            viewer.set_search(rest);
            print_page(viewer, out)?;
        }
        "filter" => {
            let (column, pattern) = rest
                .split_once('=')
                .context("usage: filter <column>=<text>")?;
            viewer.set_filter(column.trim(), pattern.trim());
            print_page(viewer, out)?;
        }
        "filters" if rest == "clear" => {
            viewer.clear_filters();
            print_page(viewer, out)?;
        }
        "sort" => {
            viewer.set_sort(parse_sort(rest)?);
            print_page(viewer, out)?;
        }
        "page" => {
            let page: usize = rest.parse().context("usage: page <n>")?;
            viewer.set_page(page);
            print_page(viewer, out)?;
        }
        "next" => {
            viewer.set_page(viewer.page().page + 1);
            print_page(viewer, out)?;
        }
        "prev" => {
            viewer.set_page(viewer.page().page.saturating_sub(1));
            print_page(viewer, out)?;
        }
        "page-size" => {
            viewer.set_page_size(parse_non_zero(rest).context("usage: page-size <n>")?);
            print_page(viewer, out)?;
        }
        "load" => {
            let page: usize = rest.parse().context("usage: load <n>")?;
            viewer.load_page(page)?;
            print_page(viewer, out)?;
        }
        "edit" => {
            let (row, column) = rest
                .split_once(' ')
                .context("usage: edit <row> <column>")?;
            let row: usize = row.parse().context("row must be a number")?;
            viewer.start_edit(row, column.trim())?;
            if let Some(edit) = viewer.pending_edit() {
                writeln!(
                    out,
                    "editing #{} {}: {}",
                    edit.target.row_idx, edit.target.column, edit.pending_value
                )?;
            }
        }
        "type" => viewer.update_pending(rest),
        "commit" => {
            if viewer.commit_edit().is_some() {
                print_page(viewer, out)?;
            } else {
                writeln!(out, "nothing committed")?;
            }
        }
        "cancel" => viewer.cancel_edit(),
        "add-row" => {
            viewer.add_row();
            print_page(viewer, out)?;
        }
        "rm-row" => {
            let row: usize = rest.parse().context("usage: rm-row <row>")?;
            viewer.remove_row(row)?;
            print_page(viewer, out)?;
        }
        "add-col" => {
            viewer.add_column(rest)?;
            print_page(viewer, out)?;
        }
        "rm-col" => {
            viewer.remove_column(rest)?;
            print_page(viewer, out)?;
        }
        "undo" => {
            viewer.undo();
            print_page(viewer, out)?;
        }
        "redo" => {
            viewer.redo();
            print_page(viewer, out)?;
        }
        "save" => {
            let ack = viewer.save()?;
            writeln!(out, "saved {} rows at {}", ack.row_count, ack.saved_at.to_rfc3339())?;
        }
        "export" => export(viewer, rest, out)?,
        "status" => print_status(viewer, out)?,
        "quit" => {
            if viewer.has_unsaved_changes() {
                writeln!(out, "unsaved changes; save first or use quit!")?;
            } else {
                return Ok(Flow::Quit);
            }
        }
        "quit!" => return Ok(Flow::Quit),
        other => writeln!(out, "unknown command: {other} (try help)")?,
    }

    Ok(Flow::Continue)
}

fn parse_sort(rest: &str) -> Result<Option<SortSpec>> {
    if rest.is_empty() || rest == "off" {
        return Ok(None);
    }
    let (column, direction) = match rest.rsplit_once(' ') {
        Some((column, dir)) => match dir.parse::<SortDirection>() {
            Ok(direction) => (column.trim(), direction),
            Err(_) => (rest, SortDirection::Asc),
        },
        None => (rest, SortDirection::Asc),
    };
    Ok(Some(SortSpec {
        column: column.to_string(),
        direction,
    }))
}

fn export<W: Write>(viewer: &GridViewer, rest: &str, out: &mut W) -> Result<()> {
    let path = Path::new(rest);
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .context("export path must end in .csv or .xlsx")?;
    let bytes = viewer.export(format)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("failed to write export: {}", path.display()))?;
    writeln!(out, "exported {} bytes to {}", bytes.len(), path.display())?;
    Ok(())
}

fn print_status<W: Write>(viewer: &GridViewer, out: &mut W) -> Result<()> {
    let history = viewer.store().history();
    writeln!(
        out,
        "file {} | stored page {} ({} rows stored{}) | history {}/{} | undo {} redo {} | {}",
        viewer.file_id(),
        viewer.remote_page(),
        viewer.remote_total_rows(),
        if viewer.is_partial() {
            ", partial window: read-only"
        } else {
            ""
        },
        history.cursor() + 1,
        history.len(),
        viewer.can_undo(),
        viewer.can_redo(),
        if viewer.has_unsaved_changes() {
            "unsaved changes"
        } else {
            "saved"
        }
    )?;
    Ok(())
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let mut clipped: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}

fn print_page<W: Write>(viewer: &GridViewer, out: &mut W) -> Result<()> {
    let view = viewer.view();
    let snapshot = viewer.snapshot();
    let columns = snapshot.columns();

    let mut widths: Vec<usize> = columns.iter().map(|c| clip(c).chars().count()).collect();
    for row in &view.rows {
        for (width, value) in widths.iter_mut().zip(&row.values) {
            *width = (*width).max(clip(value).chars().count());
        }
    }

    write!(out, "{:>5} ", "#")?;
    for (column, width) in columns.iter().zip(&widths) {
        write!(out, "| {:<width$} ", clip(column), width = *width)?;
    }
    writeln!(out)?;

    for row in &view.rows {
        write!(out, "{:>5} ", row.original_index)?;
        for (value, width) in row.values.iter().zip(&widths) {
            write!(out, "| {:<width$} ", clip(value), width = *width)?;
        }
        writeln!(out)?;
    }

    let page = viewer.page();
    writeln!(
        out,
        "page {}/{} · {} matching of {} rows",
        page.page,
        view.page_count(page.page_size),
        view.total_matches,
        snapshot.row_count()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sort_reads_optional_direction() {
        assert_eq!(parse_sort("off").expect("parse"), None);
        assert_eq!(
            parse_sort("Amount desc").expect("parse"),
            Some(SortSpec::desc("Amount"))
        );
        assert_eq!(
            parse_sort("Due date").expect("parse"),
            Some(SortSpec::asc("Due date"))
        );
    }

    #[test]
    fn clip_shortens_long_values() {
        let long = "x".repeat(40);

        assert_eq!(clip("short"), "short");
        assert_eq!(clip(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(clip(&long).ends_with('…'));
    }
}
