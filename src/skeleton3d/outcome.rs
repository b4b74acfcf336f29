use derive_more::Display;

/// Why a segment geometry cannot be built
#[derive(Clone, Debug, Display, PartialEq)]
pub enum Degeneracy {
    #[display("zero length segment")]
    ZeroLength,
    #[display("invalid radius {_0}")]
    InvalidRadius(f64),
    #[display("non finite coordinates")]
    NonFinite,
}

/// Why a segment was left out of the skeleton
#[derive(Clone, Debug, Display, PartialEq)]
pub enum SkipReason {
    #[display("root segment")]
    Root,
    #[display("unassigned section")]
    InvalidSection,
    #[display("parent {parent_id} matches {matches} sections")]
    UnresolvedParent { parent_id: i64, matches: usize },
    #[display("degenerate geometry ({_0})")]
    DegenerateGeometry(Degeneracy),
    #[display("cylinder construction failed ({_0})")]
    Construction(String),
}

impl std::error::Error for SkipReason {}

/// Result of the processing of one segment
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentOutcome {
    Built { section_id: i64 },
    Skipped { section_id: i64, reason: SkipReason },
}

impl SegmentOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, SegmentOutcome::Built { .. })
    }

    pub fn section_id(&self) -> i64 {
        match self {
            SegmentOutcome::Built { section_id } => *section_id,
            SegmentOutcome::Skipped { section_id, .. } => *section_id,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            SegmentOutcome::Built { .. } => None,
            SegmentOutcome::Skipped { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_readable() {
        let reason = SkipReason::UnresolvedParent {
            parent_id: 12,
            matches: 0,
        };
        assert_eq!(reason.to_string(), "parent 12 matches 0 sections");
        let reason = SkipReason::DegenerateGeometry(Degeneracy::ZeroLength);
        assert_eq!(reason.to_string(), "degenerate geometry (zero length segment)");
    }
}
