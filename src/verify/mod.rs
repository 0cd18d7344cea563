use crate::graph::Graph;
use crate::types::{MisError, MisFlag, VertexId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of checking a membership against a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub vertices: usize,
    pub members: usize,
    /// Vertices never decided; always zero for a boolean membership.
    pub undecided: usize,
    /// Members with at least one member neighbor.
    pub independence_violations: usize,
    /// Non-members with no member neighbor.
    pub maximality_violations: usize,
    pub valid: bool,
}

impl VerifyReport {
    /// Vertices whose neighborhood contradicts the membership.
    pub fn bad_vertices(&self) -> usize {
        self.independence_violations + self.maximality_violations
    }
}

/// Checks independence and maximality of `in_mis`.
pub fn verify_mis<G: Graph>(graph: &G, in_mis: &[bool]) -> Result<VerifyReport, MisError> {
    check_len(graph, in_mis.len())?;
    Ok(report(graph, |v| in_mis[v as usize], 0))
}

/// Like [`verify_mis`], also failing on any vertex left undecided.
pub fn verify_flags<G: Graph>(graph: &G, flags: &[MisFlag]) -> Result<VerifyReport, MisError> {
    check_len(graph, flags.len())?;
    let undecided = flags.par_iter().filter(|f| !f.is_decided()).count();
    Ok(report(graph, |v| flags[v as usize] == MisFlag::Chosen, undecided))
}

fn check_len<G: Graph>(graph: &G, len: usize) -> Result<(), MisError> {
    if len != graph.num_vertices() {
        return Err(MisError::InvalidGraph(format!(
            "membership covers {} vertices, graph has {}",
            len,
            graph.num_vertices()
        )));
    }
    Ok(())
}

fn report<G, M>(graph: &G, member: M, undecided: usize) -> VerifyReport
where
    G: Graph,
    M: Fn(VertexId) -> bool + Sync,
{
    let n = graph.num_vertices();
    let (members, independence_violations, maximality_violations) = (0..n)
        .into_par_iter()
        .map(|v| {
            let v = v as VertexId;
            let chosen_nghs = graph.count_out_ngh(v, |_, ngh| member(ngh));
            match (member(v), chosen_nghs) {
                (true, 0) => (1, 0, 0),
                (true, _) => (1, 1, 0),
                (false, 0) => (0, 0, 1),
                (false, _) => (0, 0, 0),
            }
        })
        .reduce(|| (0usize, 0usize, 0usize), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

    let report = VerifyReport {
        vertices: n,
        members,
        undecided,
        independence_violations,
        maximality_violations,
        valid: undecided == 0 && independence_violations == 0 && maximality_violations == 0,
    };
    if report.valid {
        info!("valid MIS of size {} over {} vertices", members, n);
    } else {
        warn!(
            "invalid MIS, {} vertices saw bad neighborhoods ({} undecided)",
            report.bad_vertices(),
            undecided
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;

    fn four_cycle() -> CsrGraph {
        CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap()
    }

    #[test]
    fn test_accepts_opposite_pairs() {
        let g = four_cycle();
        assert!(verify_mis(&g, &[true, false, true, false]).unwrap().valid);
        assert!(verify_mis(&g, &[false, true, false, true]).unwrap().valid);
    }

    #[test]
    fn test_rejects_adjacent_pair() {
        let report = verify_mis(&four_cycle(), &[true, true, false, false]).unwrap();
        assert!(!report.valid);
        assert_eq!(report.independence_violations, 2);
        // Vertices 2 and 3 each still see a member.
        assert_eq!(report.maximality_violations, 0);
    }

    #[test]
    fn test_rejects_non_maximal() {
        let report = verify_mis(&four_cycle(), &[true, false, false, false]).unwrap();
        assert!(!report.valid);
        assert_eq!(report.maximality_violations, 1);
        assert_eq!(report.bad_vertices(), 1);
    }

    #[test]
    fn test_star_accepts_center_or_leaves() {
        let g = CsrGraph::from_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        assert!(verify_mis(&g, &[true, false, false, false, false]).unwrap().valid);
        assert!(verify_mis(&g, &[false, true, true, true, true]).unwrap().valid);
        assert!(!verify_mis(&g, &[false, true, true, false, true]).unwrap().valid);
    }

    #[test]
    fn test_undecided_flags_fail() {
        let g = CsrGraph::empty(2);
        let report = verify_flags(&g, &[MisFlag::Chosen, MisFlag::Undecided]).unwrap();
        assert_eq!(report.undecided, 1);
        assert!(!report.valid);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(verify_mis(&four_cycle(), &[true]).is_err());
    }

    #[test]
    fn test_empty_graph_is_valid() {
        assert!(verify_mis(&CsrGraph::empty(0), &[]).unwrap().valid);
    }
}
