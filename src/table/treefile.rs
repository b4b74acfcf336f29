use anyhow::Result;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::table::Table;

/// Name of the column added to both tables of a tree file
pub const TREE_ID: &str = "tree_id";
/// Parent id of the base point of a tree in raycloud tree files
pub const BASE_PARENT: f64 = -1.0;

/// Content of a raycloud tree file
///
/// Both tables start with a `tree_id` column, numbering trees from 1 in file
/// order, so that a forest file keeps its trees apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Treefile {
    /// One row per tree, empty if the file has no tree attributes
    pub trees: Table,
    /// One row per segment, tree base points excluded
    pub segments: Table,
    nb_trees: usize,
}

impl Treefile {
    pub fn get_nb_trees(&self) -> usize {
        self.nb_trees
    }
}

/// Splits a row of a tree file into its comma separated cells
fn split_group(group: &str) -> Vec<&str> {
    group.split(',').map(|cell| cell.trim()).collect()
}

fn parse_group(group: &str, ind_line: usize) -> Result<Vec<f64>> {
    split_group(group)
        .iter()
        .map(|cell| cell.parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|err| anyhow::Error::msg(format!("read_treefile(): Line {}: {}", ind_line + 1, err)))
}

fn with_tree_id(header: &[&str]) -> Table {
    let mut names = vec![TREE_ID];
    names.extend_from_slice(header);
    Table::new(&names)
}

/// Adds a row to a table whose first column is the tree id
fn add_tree_row(table: &mut Table, tree_id: usize, values: &[f64], ind_line: usize) -> Result<()> {
    if values.len() + 1 != table.get_nb_columns() {
        return Err(anyhow::Error::msg(format!(
            "read_treefile(): Line {}: Expected {} values, got {}",
            ind_line + 1,
            table.get_nb_columns() - 1,
            values.len()
        )));
    }
    let mut row = Vec::with_capacity(values.len() + 1);
    row.push(tree_id as f64);
    row.extend_from_slice(values);
    table.add_row(&row)
}

/// Reads a raycloud tree file (or forest file)
///
/// The first non comment line is the header. Each following line is one
/// tree, made of groups separated by `", "`, each group being a comma
/// separated row. If the header has two groups, the first one names the
/// tree attributes and every tree line starts with its attribute values,
/// otherwise the file only holds segments. Remaining groups are segments.
///
/// Segments whose `parent_id` is -1 are the base points of the trees, they
/// are not kept. Empty lines and lines starting with `#` are ignored.
pub fn read_treefile<P: AsRef<Path>>(filename: P) -> Result<Treefile> {
    let file = File::open(filename)?;
    let lines = io::BufReader::new(file).lines();

    let mut opt_treefile: Option<Treefile> = None;
    let mut ind_parent = None;
    let mut has_tree_attributes = false;
    let mut nb_trees = 0;
    let mut nb_base = 0;
    for (ind_line, line_) in lines.enumerate() {
        let line = line_?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let groups: Vec<&str> = line.split(", ").map(|group| group.trim()).collect();
        match opt_treefile {
            None => {
                let (tree_header, segment_header) = match groups.as_slice() {
                    [segment_group] => (Vec::new(), split_group(segment_group)),
                    [tree_group, segment_group] => {
                        (split_group(tree_group), split_group(segment_group))
                    }
                    _ => {
                        return Err(anyhow::Error::msg(
                            "read_treefile(): Header should have one or two groups",
                        ))
                    }
                };
                has_tree_attributes = !tree_header.is_empty();
                let treefile = Treefile {
                    trees: with_tree_id(&tree_header),
                    segments: with_tree_id(&segment_header),
                    nb_trees: 0,
                };
                ind_parent = treefile.segments.column_index("parent_id");
                opt_treefile = Some(treefile);
            }
            Some(ref mut treefile) => {
                nb_trees = nb_trees + 1;
                let mut segment_groups = groups.iter();
                if has_tree_attributes {
                    let tree_group = segment_groups.next().ok_or(anyhow::Error::msg(format!(
                        "read_treefile(): Line {}: Missing tree attributes",
                        ind_line + 1
                    )))?;
                    let values = parse_group(tree_group, ind_line)?;
                    add_tree_row(&mut treefile.trees, nb_trees, &values, ind_line)?;
                }
                for segment_group in segment_groups {
                    let values = parse_group(segment_group, ind_line)?;
                    // column 0 of the table is the tree id
                    let is_base = ind_parent
                        .and_then(|ind| values.get(ind - 1))
                        .map(|&parent_id| parent_id == BASE_PARENT)
                        .unwrap_or(false);
                    if is_base {
                        nb_base = nb_base + 1;
                        continue;
                    }
                    add_tree_row(&mut treefile.segments, nb_trees, &values, ind_line)?;
                }
            }
        }
    }

    let mut treefile = opt_treefile.ok_or(anyhow::Error::msg("read_treefile(): Missing header"))?;
    treefile.nb_trees = nb_trees;
    log::info!(
        "Tree file: {} trees, {} segments, {} base points dropped",
        nb_trees,
        treefile.segments.get_nb_rows(),
        nb_base
    );
    Ok(treefile)
}
