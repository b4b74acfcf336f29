use anyhow::Result;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use crate::table::Table;

/// Splits a line on commas if the table is comma delimited, on whitespaces otherwise
fn split_cells(line: &str, comma: bool) -> Vec<&str> {
    if comma {
        let mut cells: Vec<&str> = line.split(',').map(|cell| cell.trim()).collect();
        // trailing delimiters
        while cells.last().map(|cell| cell.is_empty()).unwrap_or(false) {
            cells.pop();
        }
        cells
    } else {
        line.split_whitespace().collect()
    }
}

/// Reads a text table whose first row is the header
///
/// The table is comma delimited if the header contains a comma, whitespace
/// delimited otherwise. Empty lines and lines starting with `#` are ignored.
pub fn read_table<P: AsRef<Path>>(filename: P) -> Result<Table> {
    let file = File::open(filename)?;
    let lines = io::BufReader::new(file).lines();

    let mut opt_table: Option<Table> = None;
    let mut comma = false;
    for (ind_line, line_) in lines.enumerate() {
        let line = line_?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match opt_table {
            None => {
                comma = line.contains(',');
                let header = split_cells(line, comma);
                opt_table = Some(Table::new(&header));
            }
            Some(ref mut table) => {
                let row = split_cells(line, comma)
                    .iter()
                    .map(|cell| cell.parse::<f64>())
                    .collect::<Result<Vec<f64>, _>>()
                    .map_err(|err| {
                        anyhow::Error::msg(format!(
                            "read_table(): Line {}: {}",
                            ind_line + 1,
                            err
                        ))
                    })?;
                table.add_row(&row).map_err(|err| {
                    anyhow::Error::msg(format!("read_table(): Line {}: {}", ind_line + 1, err))
                })?;
            }
        }
    }

    opt_table.ok_or(anyhow::Error::msg("read_table(): Missing header"))
}

/// Saves a table as whitespace delimited text, columns right aligned
pub fn save_table<P: AsRef<Path>>(filename: P, table: &Table) -> Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    let nb_rows = table.get_nb_rows();
    let cells: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|col| col.iter().map(|val| format!("{}", val)).collect())
        .collect();
    let widths: Vec<usize> = table
        .header
        .iter()
        .zip(cells.iter())
        .map(|(name, col)| {
            col.iter()
                .map(|cell| cell.len())
                .fold(name.len(), |w, l| w.max(l))
        })
        .collect();

    let header: Vec<String> = table
        .header
        .iter()
        .zip(widths.iter())
        .map(|(name, &w)| format!("{:>w$}", name, w = w))
        .collect();
    writeln!(file, "{}", header.join(" "))?;

    for ind_row in 0..nb_rows {
        let row: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(col, &w)| format!("{:>w$}", col[ind_row], w = w))
            .collect();
        writeln!(file, "{}", row.join(" "))?;
    }

    Ok(())
}
