use anyhow::Result;
use std::collections::HashMap;

use crate::mesh3d::{mesh_operations, GenericMesh3D};
use crate::skeleton3d::cylinder::{CylinderParams, CylinderPrimitive};
use crate::skeleton3d::outcome::{SegmentOutcome, SkipReason};
use crate::skeleton3d::segment::Segment;

/// Skeleton mesh, with the outcome of every input segment
pub struct SkeletonReport {
    pub mesh: GenericMesh3D,
    pub outcomes: Vec<SegmentOutcome>,
}

impl SkeletonReport {
    pub fn get_nb_built(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_built()).count()
    }

    pub fn get_nb_skipped(&self) -> usize {
        self.outcomes.len() - self.get_nb_built()
    }
}

fn build_segment(
    segment: &Segment,
    segments: &[Segment],
    sections: &HashMap<i64, Vec<usize>>,
    params: &CylinderParams,
) -> Result<GenericMesh3D, SkipReason> {
    if segment.is_root() {
        return Err(SkipReason::Root);
    }
    if segment.is_invalid() {
        return Err(SkipReason::InvalidSection);
    }

    let parents = sections
        .get(&segment.parent_id)
        .map(|inds| inds.as_slice())
        .unwrap_or(&[]);
    if parents.len() != 1 {
        return Err(SkipReason::UnresolvedParent {
            parent_id: segment.parent_id,
            matches: parents.len(),
        });
    }
    let parent = &segments[parents[0]];

    let cylinder = CylinderPrimitive::build(&parent.position, &segment.position, segment.radius)?;
    cylinder
        .to_mesh(params)
        .map_err(|err| SkipReason::Construction(err.to_string()))
}

/// Builds the skeleton mesh of a segment table
///
/// Each non root segment becomes a cylinder going from its parent position to
/// its own position. Segments that cannot be built are skipped and reported,
/// the others are still merged, so that the result is always a (possibly
/// empty) mesh. Cylinders are concatenated, overlaps are kept.
pub fn assemble(segments: &[Segment], params: &CylinderParams) -> Result<SkeletonReport> {
    if params.resolution < 3 || params.split < 1 {
        return Err(anyhow::Error::msg(
            "assemble(): Cylinder resolution should be at least 3 and split at least 1",
        ));
    }

    let mut sections: HashMap<i64, Vec<usize>> = HashMap::new();
    for (ind, segment) in segments.iter().enumerate() {
        sections.entry(segment.section_id).or_default().push(ind);
    }

    let mut mesh = GenericMesh3D::new();
    let mut outcomes = Vec::with_capacity(segments.len());
    for segment in segments.iter() {
        let section_id = segment.section_id;
        let outcome = match build_segment(segment, segments, &sections, params)
            .and_then(|cylinder| {
                mesh_operations::merge_into(&mut mesh, &cylinder, Some(section_id))
                    .map_err(|err| SkipReason::Construction(err.to_string()))
            }) {
            Ok(()) => SegmentOutcome::Built { section_id },
            Err(SkipReason::Root) => {
                log::debug!("Segment {}: root, skipped", section_id);
                SegmentOutcome::Skipped {
                    section_id,
                    reason: SkipReason::Root,
                }
            }
            Err(reason) => {
                log::warn!("Segment {}: {}, skipped", section_id, reason);
                SegmentOutcome::Skipped { section_id, reason }
            }
        };
        outcomes.push(outcome);
    }

    let report = SkeletonReport { mesh, outcomes };
    log::info!(
        "Skeleton: {} cylinders built, {} segments skipped",
        report.get_nb_built(),
        report.get_nb_skipped()
    );

    Ok(report)
}

/// Builds the skeleton mesh of several trees
///
/// Each tree is assembled on its own, so that parents are only looked up in
/// their tree, then meshes and outcomes are concatenated in tree order.
pub fn assemble_forest(
    trees: &[(i64, Vec<Segment>)],
    params: &CylinderParams,
) -> Result<SkeletonReport> {
    let mut mesh = GenericMesh3D::new();
    let mut outcomes = Vec::new();
    for (tree_id, segments) in trees.iter() {
        log::debug!("Tree {}: {} segments", tree_id, segments.len());
        let report = assemble(segments, params)?;
        mesh_operations::merge_into(&mut mesh, &report.mesh, None)?;
        outcomes.extend(report.outcomes);
    }
    Ok(SkeletonReport { mesh, outcomes })
}
