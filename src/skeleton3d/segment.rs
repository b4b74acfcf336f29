use anyhow::Result;
use nalgebra::base::*;
use std::collections::BTreeMap;

use crate::table::{treefile, Table};

/// Section id marking an unassigned segment
pub const INVALID_SECTION: i64 = -1;
/// Parent id of a root segment
pub const ROOT_PARENT: i64 = 0;

/// One row of a tree segment table
///
/// The segment goes from the position of its parent to its own position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub section_id: i64,
    pub parent_id: i64,
    pub position: Vector3<f64>,
    pub radius: f64,
}

impl Segment {
    pub fn new(section_id: i64, parent_id: i64, position: Vector3<f64>, radius: f64) -> Segment {
        Segment {
            section_id,
            parent_id,
            position,
            radius,
        }
    }

    /// Root segments have no parent
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }

    pub fn is_invalid(&self) -> bool {
        self.section_id == INVALID_SECTION
    }
}

/// Ids are stored as floats in tables
fn id_from_value(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        INVALID_SECTION
    }
}

/// Reads segments from a table with columns `x y z radius parent_id section_id`
pub fn segments_from_table(table: &Table) -> Result<Vec<Segment>> {
    let positions = table.points("x", "y", "z")?;
    let radii = table.column("radius")?;
    let parent_ids = table.column("parent_id")?;
    let section_ids = table.column("section_id")?;

    let segments = positions
        .iter()
        .zip(radii.iter())
        .zip(parent_ids.iter().zip(section_ids.iter()))
        .map(|((&position, &radius), (&parent_id, &section_id))| {
            Segment::new(
                id_from_value(section_id),
                id_from_value(parent_id),
                position,
                radius,
            )
        })
        .collect();

    Ok(segments)
}

/// Segments grouped by tree, in increasing tree id order
///
/// Section ids are only unique within a tree, so forest tables are split on
/// their `tree_id` column. A table without this column is a single tree.
pub fn segments_by_tree(table: &Table) -> Result<Vec<(i64, Vec<Segment>)>> {
    let segments = segments_from_table(table)?;
    let tree_ids = match table.column_index(treefile::TREE_ID) {
        None => return Ok(vec![(1, segments)]),
        Some(_) => table.column(treefile::TREE_ID)?,
    };

    let mut trees: BTreeMap<i64, Vec<Segment>> = BTreeMap::new();
    for (segment, &tree_id) in segments.into_iter().zip(tree_ids.iter()) {
        trees.entry(id_from_value(tree_id)).or_default().push(segment);
    }
    Ok(trees.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_read_from_columns() -> Result<()> {
        let mut table = Table::new(&["x", "y", "z", "radius", "parent_id", "section_id"]);
        table.add_row(&[0.0, 0.0, 0.0, 0.2, 0.0, 1.0])?;
        table.add_row(&[0.0, 0.0, 2.0, 0.1, 1.0, 2.0])?;
        table.add_row(&[1.0, 0.0, 2.0, 0.1, 2.0, f64::NAN])?;

        let segments = segments_from_table(&table)?;
        assert_eq!(segments.len(), 3);
        assert!(segments[0].is_root());
        assert_eq!(segments[1].parent_id, 1);
        assert_eq!(segments[1].position, Vector3::new(0.0, 0.0, 2.0));
        assert!(segments[2].is_invalid());
        Ok(())
    }

    #[test]
    fn forest_is_split_by_tree() -> Result<()> {
        let mut table = Table::new(&["tree_id", "x", "y", "z", "radius", "parent_id", "section_id"]);
        table.add_row(&[2.0, 5.0, 5.0, 1.0, 0.2, 0.0, 1.0])?;
        table.add_row(&[1.0, 0.0, 0.0, 1.0, 0.2, 0.0, 1.0])?;
        table.add_row(&[1.0, 0.0, 0.0, 2.0, 0.1, 1.0, 2.0])?;

        let trees = segments_by_tree(&table)?;
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].0, 1);
        assert_eq!(trees[0].1.len(), 2);
        assert_eq!(trees[1].0, 2);
        assert_eq!(trees[1].1[0].position, Vector3::new(5.0, 5.0, 1.0));
        Ok(())
    }

    #[test]
    fn table_without_tree_id_is_one_tree() -> Result<()> {
        let mut table = Table::new(&["x", "y", "z", "radius", "parent_id", "section_id"]);
        table.add_row(&[0.0, 0.0, 0.0, 0.2, 0.0, 1.0])?;
        let trees = segments_by_tree(&table)?;
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].1.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_radius_is_an_error() -> Result<()> {
        let mut table = Table::new(&["x", "y", "z", "parent_id", "section_id"]);
        table.add_row(&[0.0, 0.0, 0.0, 0.0, 1.0])?;
        assert!(segments_from_table(&table).is_err());
        Ok(())
    }
}
