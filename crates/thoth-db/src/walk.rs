use std::collections::{BTreeMap, HashSet, VecDeque};

use thoth_core::entities::Edge;
use thoth_core::views::{WalkNode, WalkResult};

use crate::GraphIndex;
use crate::error::IndexError;
use crate::read::{load_edges, load_resources};

impl GraphIndex {
    /// Breadth-first subgraph from `node`, following only `edge_types`
    /// (all types when empty) up to `depth` hops.
    ///
    /// Cycles are tolerated: every node is reported once, at the depth it is
    /// first reached. Neighbours are visited in `(dst, edge_type)` order.
    ///
    /// # Errors
    ///
    /// [`IndexError::UnknownResource`] when `node` is not indexed.
    pub async fn walk(
        &self,
        node: &str,
        edge_types: &[String],
        depth: u32,
    ) -> Result<WalkResult, IndexError> {
        let conn = self.read_snapshot().await?;
        let resources = load_resources(&conn).await?;
        let root = resources
            .get(node)
            .ok_or_else(|| IndexError::UnknownResource(node.to_string()))?;

        let mut outgoing: BTreeMap<&str, Vec<&Edge>> = BTreeMap::new();
        let edges = load_edges(&conn).await?;
        for edge in edges
            .iter()
            .filter(|e| edge_types.is_empty() || edge_types.contains(&e.edge_type))
        {
            outgoing.entry(edge.src.as_str()).or_default().push(edge);
        }

        let mut nodes = vec![WalkNode {
            id: root.id.clone(),
            depth: 0,
            severity: root.severity,
        }];
        let mut traversed = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([node]);
        let mut queue = VecDeque::from([(node, 0_u32)]);

        while let Some((current, level)) = queue.pop_front() {
            if level >= depth {
                continue;
            }
            for edge in outgoing.get(current).into_iter().flatten() {
                traversed.push((*edge).clone());
                if !visited.insert(edge.dst.as_str()) {
                    continue;
                }
                // Edges may point at ids that are no longer declared.
                let Some(target) = resources.get(&edge.dst) else {
                    continue;
                };
                nodes.push(WalkNode {
                    id: target.id.clone(),
                    depth: level + 1,
                    severity: target.severity,
                });
                queue.push_back((edge.dst.as_str(), level + 1));
            }
        }

        Ok(WalkResult {
            root: node.to_string(),
            depth,
            edge_types: edge_types.to_vec(),
            nodes,
            edges: traversed,
        })
    }
}
