use anyhow::Result;
use nalgebra::base::*;

/// Column oriented table of floats, with named columns
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub(super) header: Vec<String>,
    pub(super) columns: Vec<Vec<f64>>,
}

impl Table {
    /// Empty table with given column names
    ///
    /// Names are trimmed, so that `" x"` and `"x"` designate the same column.
    pub fn new<S: AsRef<str>>(header: &[S]) -> Table {
        Table {
            header: header.iter().map(|name| name.as_ref().trim().to_string()).collect(),
            columns: vec![Vec::new(); header.len()],
        }
    }

    /// Table of points with columns `X Y Z`
    pub fn from_points(points: &[Vector3<f64>]) -> Table {
        let mut table = Table::new(&["X", "Y", "Z"]);
        for point in points.iter() {
            for i in 0..3 {
                table.columns[i].push(point[i]);
            }
        }
        table
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn get_nb_columns(&self) -> usize {
        self.header.len()
    }

    pub fn get_nb_rows(&self) -> usize {
        self.columns.first().map(|col| col.len()).unwrap_or(0)
    }

    /// Adds a row, which must have one value per column
    pub fn add_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(anyhow::Error::msg(format!(
                "add_row(): Expected {} values, got {}",
                self.header.len(),
                row.len()
            )));
        }
        for (col, &val) in self.columns.iter_mut().zip(row.iter()) {
            col.push(val);
        }
        Ok(())
    }

    /// Row getter
    pub fn get_row(&self, ind_row: usize) -> Result<Vec<f64>> {
        if ind_row >= self.get_nb_rows() {
            return Err(anyhow::Error::msg("get_row(): Index out of bounds"));
        }
        Ok(self.columns.iter().map(|col| col[ind_row]).collect())
    }

    /// Index of a column from its name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.header.iter().position(|col_name| col_name == name)
    }

    /// Column getter
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let ind_col = self.column_index(name).ok_or(anyhow::Error::msg(format!(
            "column(): No column named {}",
            name.trim()
        )))?;
        Ok(&self.columns[ind_col])
    }

    /// Points made of three columns
    pub fn points(&self, name_x: &str, name_y: &str, name_z: &str) -> Result<Vec<Vector3<f64>>> {
        let col_x = self.column(name_x)?;
        let col_y = self.column(name_y)?;
        let col_z = self.column(name_z)?;
        Ok(col_x
            .iter()
            .zip(col_y.iter())
            .zip(col_z.iter())
            .map(|((&x, &y), &z)| Vector3::new(x, y, z))
            .collect())
    }
}
