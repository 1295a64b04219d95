//! Graphviz DOT rendering of the annotated dependency graph

use crate::graph::DepGraph;
use crate::model::NodeId;
use std::collections::HashSet;
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct DotOptions {
    /// Emit `splines=polyline` as a graph attribute.
    pub polyline: bool,
    /// Restrict output to these nodes (and edges between them).
    pub subset: Option<HashSet<NodeId>>,
}

impl DotOptions {
    fn includes(&self, id: NodeId) -> bool {
        self.subset.as_ref().map_or(true, |s| s.contains(&id))
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render `graph` as a DOT digraph. Edge labels carry weights; critical
/// edges are drawn red.
pub fn render_dot(graph: &DepGraph, options: &DotOptions) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    if options.polyline {
        out.push_str("  splines=polyline;\n");
    }

    for node in graph.all_nodes() {
        if !options.includes(node.id) {
            continue;
        }
        let _ = writeln!(out, "  {} [label=\"{}\"];", node.id, escape_dot(&node.label));
    }

    for edge in graph.all_edges() {
        if !options.includes(edge.source) || !options.includes(edge.target) {
            continue;
        }
        let mut attrs = Vec::new();
        if let Some(weight) = edge.weight {
            attrs.push(format!("label=\"{weight}\""));
        }
        if edge.critical {
            attrs.push("color=\"red\"".to_string());
        }
        if attrs.is_empty() {
            let _ = writeln!(out, "  {} -> {};", edge.source, edge.target);
        } else {
            let _ = writeln!(
                out,
                "  {} -> {} [{}];",
                edge.source,
                edge.target,
                attrs.join(" ")
            );
        }
    }

    out.push_str("}\n");
    out
}
