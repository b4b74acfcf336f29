use anyhow::Result;

use crate::table::Table;

/// Histogram of weights along a height axis
///
/// `edges[i]` is the lower edge of bin `i`, bins are `bin_size` wide and
/// contiguous, empty bins included.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightProfile {
    pub bin_size: f64,
    pub edges: Vec<f64>,
    pub weights: Vec<f64>,
}

impl HeightProfile {
    pub fn empty(bin_size: f64) -> HeightProfile {
        HeightProfile {
            bin_size,
            edges: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn get_nb_bins(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Lower edges followed by the upper edge of the last bin
    pub fn boundaries(&self) -> Vec<f64> {
        let mut boundaries = self.edges.clone();
        if let Some(&last) = self.edges.last() {
            boundaries.push(last + self.bin_size);
        }
        boundaries
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Table with columns `bin_edge weight`
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new(&["bin_edge", "weight"]);
        for (&edge, &weight) in self.edges.iter().zip(self.weights.iter()) {
            table.add_row(&[edge, weight])?;
        }
        Ok(table)
    }
}

/// Bins heights into contiguous `bin_size` wide bins
///
/// Bin `i` covers `[anchor + i * bin_size, anchor + (i + 1) * bin_size)`,
/// where `anchor = floor(min / bin_size) * bin_size` is the multiple of
/// `bin_size` just below the lowest height, so that bin indices are never
/// negative. Bins go from the one of the lowest height to the one of the
/// highest, and weigh their number of heights times `weight_per_sample`.
///
/// Indices always count from the anchor, whatever the sign of the lowest
/// height. Shifting only negative heights and counting from 0 would leave
/// leading empty bins below a positive minimum, and would misalign the edges
/// of a negative minimum that is not a multiple of `bin_size`.
///
/// Non finite heights are ignored. No height gives an empty profile.
pub fn aggregate(heights: &[f64], bin_size: f64, weight_per_sample: f64) -> Result<HeightProfile> {
    if !(bin_size.is_finite() && bin_size > 0.0) {
        return Err(anyhow::Error::msg("aggregate(): Bin size should be positive"));
    }
    if !(weight_per_sample.is_finite() && weight_per_sample >= 0.0) {
        return Err(anyhow::Error::msg(
            "aggregate(): Weight per sample should be non negative",
        ));
    }

    let nb_non_finite = heights.iter().filter(|h| !h.is_finite()).count();
    if nb_non_finite != 0 {
        log::warn!("aggregate(): {} non finite heights ignored", nb_non_finite);
    }

    let min = heights
        .iter()
        .filter(|h| h.is_finite())
        .fold(f64::INFINITY, |m, &h| m.min(h));
    if min == f64::INFINITY {
        return Ok(HeightProfile::empty(bin_size));
    }

    // index of the lowest bin, computed like the index of every height so
    // that the lowest height always falls in bin 0
    let base = (min / bin_size).floor();
    let anchor = base * bin_size;

    let mut counts: Vec<u64> = Vec::new();
    for &h in heights.iter().filter(|h| h.is_finite()) {
        let ind = ((h / bin_size).floor() - base) as usize;
        if ind >= counts.len() {
            counts.resize(ind + 1, 0);
        }
        counts[ind] = counts[ind] + 1;
    }

    let edges = (0..counts.len())
        .map(|i| (i as f64) * bin_size + anchor)
        .collect();
    let weights = counts
        .iter()
        .map(|&count| (count as f64) * weight_per_sample)
        .collect();

    Ok(HeightProfile {
        bin_size,
        edges,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_heights_keep_their_coordinates() -> Result<()> {
        let profile = aggregate(&[-2.0, -1.0, 0.5, 1.5], 1.0, 1.0)?;
        assert_eq!(profile.edges, vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(profile.weights, vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(profile.boundaries(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn empty_bins_are_kept() -> Result<()> {
        let heights = [0.1, 0.2, 3.7, 3.9, 3.95];
        let profile = aggregate(&heights, 1.0, 0.125)?;
        assert_eq!(profile.edges, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(profile.weights, vec![0.25, 0.0, 0.0, 0.375]);
        assert_eq!(profile.total_weight(), heights.len() as f64 * 0.125);
        Ok(())
    }

    #[test]
    fn bins_start_at_the_lowest_height() -> Result<()> {
        let profile = aggregate(&[5.2, 5.7, 7.1], 1.0, 1.0)?;
        assert_eq!(profile.edges, vec![5.0, 6.0, 7.0]);
        assert_eq!(profile.weights, vec![2.0, 0.0, 1.0]);

        let profile = aggregate(&[-2.5, -0.1], 1.0, 1.0)?;
        assert_eq!(profile.edges, vec![-3.0, -2.0, -1.0]);
        assert_eq!(profile.weights, vec![1.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn weights_sum_to_sample_count() -> Result<()> {
        let heights: Vec<f64> = (0..1000).map(|i| ((i * 37) % 101) as f64 * 0.173 - 4.2).collect();
        for bin_size in [0.05, 0.5, 1.0, 3.0, 100.0] {
            let profile = aggregate(&heights, bin_size, 1.0)?;
            assert_eq!(profile.total_weight(), heights.len() as f64);
            assert_eq!(profile.edges.len(), profile.weights.len());
            for i in 1..profile.edges.len() {
                assert!(profile.edges[i] > profile.edges[i - 1]);
            }
            // every bin edge is below its heights
            let lowest = heights.iter().fold(f64::INFINITY, |m, &h| m.min(h));
            assert!(profile.edges[0] <= lowest);
            assert!(profile.boundaries().last().unwrap() > &lowest);
        }
        Ok(())
    }

    #[test]
    fn tiny_negative_minimum_lands_in_first_bin() -> Result<()> {
        let profile = aggregate(&[-1e-17, 0.2], 0.5, 1.0)?;
        assert_eq!(profile.edges, vec![-0.5, 0.0]);
        assert_eq!(profile.weights, vec![1.0, 1.0]);

        let profile = aggregate(&[-1e-17], 0.5, 1.0)?;
        assert_eq!(profile.edges, vec![-0.5]);
        assert_eq!(profile.weights, vec![1.0]);
        Ok(())
    }

    #[test]
    fn lowest_bin_is_never_empty() -> Result<()> {
        for &min in [-1e-17, -1e-300, -0.5, -0.49999999999999994, 1e-17, 0.3, 7.5].iter() {
            let profile = aggregate(&[min, min + 1.3], 0.5, 1.0)?;
            assert!(profile.weights[0] > 0.0, "empty first bin for {}", min);
            assert!(profile.edges[0] <= min);
            assert!(min < profile.edges[0] + 0.5);
        }
        Ok(())
    }

    #[test]
    fn no_heights_no_bins() -> Result<()> {
        let profile = aggregate(&[], 0.5, 1.0)?;
        assert!(profile.is_empty());
        assert!(profile.edges.is_empty());
        assert!(profile.boundaries().is_empty());
        Ok(())
    }

    #[test]
    fn non_finite_heights_are_ignored() -> Result<()> {
        let profile = aggregate(&[f64::NAN, 1.5, f64::INFINITY], 1.0, 1.0)?;
        assert_eq!(profile.edges, vec![1.0]);
        assert_eq!(profile.weights, vec![1.0]);
        Ok(())
    }

    #[test]
    fn invalid_parameters() {
        assert!(aggregate(&[1.0], 0.0, 1.0).is_err());
        assert!(aggregate(&[1.0], -1.0, 1.0).is_err());
        assert!(aggregate(&[1.0], 1.0, -1.0).is_err());
    }

    #[test]
    fn profile_as_table() -> Result<()> {
        let profile = aggregate(&[0.2, 1.4], 1.0, 2.0)?;
        let table = profile.to_table()?;
        assert_eq!(table.column("bin_edge")?, &[0.0, 1.0]);
        assert_eq!(table.column("weight")?, &[2.0, 2.0]);
        Ok(())
    }
}
