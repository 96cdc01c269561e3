// Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>

//! Spanning tree basis identification.

use super::FlowIndicator;
use crate::output::{Basis, VariableStatus};

/// Identify a basis from a flow by growing a spanning forest.
///
/// The arcs are scanned in the given `order`, normally the queue of
/// [`sorted_flows`](crate::crossover::NetworkManager::sorted_flows)
/// with the most interior flows first. An arc whose end nodes lie in
/// different components of the forest grown so far becomes basic.
/// Every other arc is pinned to a bound: arcs whose indicator says
/// the flow is at the capacity become non-basic at the upper bound,
/// all remaining arcs non-basic at the lower bound.
///
/// For a connected network on `k` nodes the basis has exactly `k - 1`
/// basic arcs, one less for every additional connected component.
/// Self-loops and repeated arcs are never accepted into the forest.
///
/// # Example
///
/// ```
/// use rs_crossover::crossover::{tree_basis, FlowIndicator};
/// use rs_crossover::VariableStatus;
///
/// // a cycle on four nodes, one arc carries no flow
/// let arcs = [(0, 1), (1, 2), (2, 3), (3, 0)];
/// let order = [0, 1, 3, 2];
/// let ind = [
///     FlowIndicator::Positive,
///     FlowIndicator::Positive,
///     FlowIndicator::AtZero,
///     FlowIndicator::Positive,
/// ];
///
/// let basis = tree_basis(4, &arcs, &order, &ind);
/// assert_eq!(basis.nr_basic(), 3);
/// assert_eq!(basis.status(2), VariableStatus::AtLower);
/// ```
pub fn tree_basis(
    nr_nodes: usize,
    arcs: &[(usize, usize)],
    order: &[usize],
    indicators: &[FlowIndicator],
) -> Basis {
    debug_assert_eq!(order.len(), arcs.len());
    debug_assert_eq!(indicators.len(), arcs.len());

    let mut comps = vec![Component::Root(0); nr_nodes];
    let mut statuses = vec![VariableStatus::AtLower; arcs.len()];
    let mut nr_tree = 0;

    for &j in order {
        let (u, v) = arcs[j];
        let mut accepted = false;
        // once the tree spans all nodes no arc can be accepted
        if nr_tree + 1 < nr_nodes {
            let (uroot, udepth) = find_root(&comps, u);
            let (vroot, vdepth) = find_root(&comps, v);
            if uroot != vroot {
                statuses[j] = VariableStatus::Basic;
                nr_tree += 1;
                accepted = true;
                if udepth < vdepth {
                    comps[uroot] = Component::Node(vroot);
                } else {
                    comps[vroot] = Component::Node(uroot);
                    if udepth == vdepth {
                        comps[uroot] = Component::Root(udepth + 1);
                    }
                }
            }
        }
        if !accepted && indicators[j] == FlowIndicator::AtUpper {
            statuses[j] = VariableStatus::AtUpper;
        }
    }

    Basis::new(statuses)
}

/// Union-Find data-structure for the forest components.
#[derive(Clone, Copy)]
enum Component {
    /// The root element with the tree's depth.
    Root(usize),
    /// An inner node with its parent node.
    Node(usize),
}

/// Return the root and depth of the component containing `u`.
fn find_root(comps: &[Component], mut u: usize) -> (usize, usize) {
    loop {
        match comps[u] {
            Component::Root(depth) => return (u, depth),
            Component::Node(parent) => u = parent,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::tree_basis;
    use crate::crossover::FlowIndicator;
    use crate::output::VariableStatus;

    #[test]
    fn test_cycle() {
        let arcs = [(0, 1), (1, 2), (2, 3), (3, 0)];
        let order = [0, 1, 3, 2];
        let ind = [FlowIndicator::Positive; 4];
        let basis = tree_basis(4, &arcs, &order, &ind);
        assert_eq!(
            basis.statuses(),
            &[
                VariableStatus::Basic,
                VariableStatus::Basic,
                VariableStatus::AtLower,
                VariableStatus::Basic,
            ]
        );
    }

    #[test]
    fn test_rejected_arcs_follow_their_indicator() {
        // two parallel arcs, the saturated one is rejected and pinned
        // to its upper bound
        let arcs = [(0, 1), (0, 1)];
        let order = [0, 1];
        let ind = [FlowIndicator::Positive, FlowIndicator::AtUpper];
        let basis = tree_basis(2, &arcs, &order, &ind);
        assert_eq!(basis.status(0), VariableStatus::Basic);
        assert_eq!(basis.status(1), VariableStatus::AtUpper);
    }

    #[test]
    fn test_self_loop_is_never_basic() {
        let arcs = [(0, 0), (0, 1)];
        let order = [0, 1];
        let ind = [FlowIndicator::Positive, FlowIndicator::Positive];
        let basis = tree_basis(2, &arcs, &order, &ind);
        assert_eq!(basis.status(0), VariableStatus::AtLower);
        assert_eq!(basis.status(1), VariableStatus::Basic);
    }

    #[test]
    fn test_disconnected_network() {
        let arcs = [(0, 1), (2, 3), (0, 1)];
        let order = [0, 1, 2];
        let ind = [FlowIndicator::Positive; 3];
        let basis = tree_basis(4, &arcs, &order, &ind);
        assert_eq!(basis.nr_basic(), 2);
        assert_eq!(basis.status(2), VariableStatus::AtLower);
    }
}
