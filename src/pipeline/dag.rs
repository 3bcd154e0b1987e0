// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! DAG (Directed Acyclic Graph) builder for artifact dependencies
//!
//! Edges run from the stage producing an artifact to every stage requiring
//! it. Building the graph checks that each requirement has a producer, that
//! the graph is acyclic and that the declared stage order respects it.

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::errors::QuillError;
use crate::pipeline::StageDefinition;

/// Builder for stage dependency DAGs
pub struct DagBuilder {
    graph: DiGraph<usize, String>,
    id_to_index: HashMap<String, NodeIndex>,
    index_to_id: HashMap<NodeIndex, String>,
}

impl DagBuilder {
    /// Build and validate the dependency graph for stages in declared order
    pub fn build(stages: &[StageDefinition]) -> Result<Self, QuillError> {
        let mut builder = Self {
            graph: DiGraph::new(),
            id_to_index: HashMap::new(),
            index_to_id: HashMap::new(),
        };

        for (idx, stage) in stages.iter().enumerate() {
            let node = builder.graph.add_node(idx);
            if builder.id_to_index.insert(stage.id.clone(), node).is_some() {
                return Err(QuillError::InvalidRegistry {
                    reason: format!("duplicate stage id '{}'", stage.id),
                });
            }
            builder.index_to_id.insert(node, stage.id.clone());
        }

        // Map each artifact to its single producer
        let mut producers: HashMap<String, usize> = HashMap::new();
        for (idx, stage) in stages.iter().enumerate() {
            let key = stage.produces.to_string();
            if let Some(other) = producers.insert(key.clone(), idx) {
                return Err(QuillError::InvalidRegistry {
                    reason: format!(
                        "artifact '{}' is produced by both '{}' and '{}'",
                        key, stages[other].id, stage.id
                    ),
                });
            }
        }

        for stage in stages {
            let consumer = builder.id_to_index[&stage.id];

            for required in &stage.requires {
                let key = required.to_string();
                let producer_idx =
                    *producers
                        .get(&key)
                        .ok_or_else(|| QuillError::UnknownArtifact {
                            stage: stage.id.clone(),
                            artifact: key.clone(),
                        })?;

                let producer = builder.id_to_index[&stages[producer_idx].id];
                if !builder.graph.contains_edge(producer, consumer) {
                    builder.graph.add_edge(producer, consumer, required.name.clone());
                }
            }
        }

        builder.validate_acyclic()?;
        builder.validate_declared_order(stages)?;

        Ok(builder)
    }

    /// Validate that the graph is acyclic
    fn validate_acyclic(&self) -> Result<(), QuillError> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(QuillError::CircularDependency {
                stages: self.find_cycle_members(cycle.node_id()),
            }),
        }
    }

    /// Every producer must be declared before each of its consumers
    fn validate_declared_order(&self, stages: &[StageDefinition]) -> Result<(), QuillError> {
        for edge in self.graph.edge_indices() {
            let Some((from, to)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let (producer, consumer) = (self.graph[from], self.graph[to]);
            if producer >= consumer {
                return Err(QuillError::InvalidRegistry {
                    reason: format!(
                        "stage '{}' is declared before '{}', whose artifact it requires",
                        stages[consumer].id, stages[producer].id
                    ),
                });
            }
        }
        Ok(())
    }

    /// Find all stages in the strongly connected component containing `start`
    fn find_cycle_members(&self, start: NodeIndex) -> Vec<String> {
        kosaraju_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&start))
            .map(|mut component| {
                component.sort_by_key(|n| self.graph[*n]);
                component
                    .into_iter()
                    .map(|n| self.index_to_id[&n].clone())
                    .collect()
            })
            .unwrap_or_else(|| vec![self.index_to_id[&start].clone()])
    }

    /// Get topologically sorted stage indices
    pub fn topological_order(&self) -> Result<Vec<usize>, QuillError> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| QuillError::CircularDependency {
                stages: self.find_cycle_members(cycle.node_id()),
            })
    }

    /// Get dependencies for a stage (stages that must run before it)
    pub fn dependencies(&self, stage_id: &str) -> Option<Vec<String>> {
        let node = self.id_to_index.get(stage_id)?;
        let mut deps: Vec<(usize, String)> = self
            .graph
            .neighbors_directed(*node, petgraph::Direction::Incoming)
            .map(|n| (self.graph[n], self.index_to_id[&n].clone()))
            .collect();
        deps.sort();
        Some(deps.into_iter().map(|(_, id)| id).collect())
    }

    /// Get dependents for a stage (stages that consume its artifact)
    pub fn dependents(&self, stage_id: &str) -> Option<Vec<String>> {
        let node = self.id_to_index.get(stage_id)?;
        let mut deps: Vec<(usize, String)> = self
            .graph
            .neighbors_directed(*node, petgraph::Direction::Outgoing)
            .map(|n| (self.graph[n], self.index_to_id[&n].clone()))
            .collect();
        deps.sort();
        Some(deps.into_iter().map(|(_, id)| id).collect())
    }

    /// Check if stage A depends (directly or transitively) on stage B
    pub fn depends_on(&self, stage_a: &str, stage_b: &str) -> bool {
        let Some(node_a) = self.id_to_index.get(stage_a) else {
            return false;
        };
        let Some(node_b) = self.id_to_index.get(stage_b) else {
            return false;
        };

        petgraph::algo::has_path_connecting(&self.graph, *node_b, *node_a, None)
    }

    /// Edges as (producer, consumer, artifact) in declared order
    fn sorted_edges(&self) -> Vec<(usize, usize, &str, &str, &str)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (from, to) = self.graph.edge_endpoints(edge)?;
                Some((
                    self.graph[from],
                    self.graph[to],
                    self.index_to_id[&from].as_str(),
                    self.index_to_id[&to].as_str(),
                    self.graph[edge].as_str(),
                ))
            })
            .collect();
        edges.sort_by_key(|(from, to, ..)| (*to, *from));
        edges
    }

    /// Generate Mermaid diagram of the DAG
    pub fn to_mermaid(&self, stages: &[StageDefinition]) -> String {
        let mut out = String::from("graph TD\n");

        for stage in stages {
            out.push_str(&format!("    {}[{}]\n", stage.id, stage.display_name));
        }

        for (_, _, from, to, artifact) in self.sorted_edges() {
            out.push_str(&format!("    {} -->|{}| {}\n", from, artifact, to));
        }

        out
    }

    /// Generate DOT diagram of the DAG
    pub fn to_dot(&self, stages: &[StageDefinition]) -> String {
        let mut out = String::from("digraph quillflow {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for stage in stages {
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\\n{}\"];\n",
                stage.id, stage.display_name, stage.phase
            ));
        }
        out.push('\n');

        for (_, _, from, to, artifact) in self.sorted_edges() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                from, to, artifact
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of execution order
    pub fn to_text(&self, stages: &[StageDefinition]) -> String {
        let mut out = String::new();

        for (i, stage) in stages.iter().enumerate() {
            let deps = self.dependencies(&stage.id).unwrap_or_default();

            out.push_str(&format!(
                "{:02}. #{:02} {} ({}) -> {}",
                i + 1,
                stage.sequence,
                stage.id,
                stage.phase,
                stage.produces
            ));

            if !deps.is_empty() {
                out.push_str(&format!(" [depends: {}]", deps.join(", ")));
            }
            if stage.fallback.is_eligible() {
                out.push_str(" [fallback]");
            }

            out.push('\n');
        }

        out
    }
}
