//! DOT and Mermaid renderings for debugging.

use std::fmt::{self, Write as _};

use super::{Graph, StateData};

impl Graph {
    /// Graphviz rendering. Accepting states are filled green; a state's
    /// label lists its accept (`A`) and early (`E`) leaves.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph lexer {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=circle];\n");
        for id in self.states() {
            let data = self.get_state_data(id);
            write!(out, "    s{id} [label=\"{}\"", node_label(id, data)).unwrap();
            if data.state_type.leaf().is_some() {
                out.push_str(", style=filled, fillcolor=green");
            }
            if id == self.root {
                out.push_str(", shape=doublecircle");
            }
            out.push_str("];\n");
        }
        for id in self.states() {
            for (class, target) in &self.get_state_data(id).normal {
                let label = escape_dot(&class.to_string());
                writeln!(out, "    s{id} -> s{target} [label=\"{label}\"];").unwrap();
            }
        }
        out.push_str("}\n");
        out
    }

    /// Mermaid flowchart rendering.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("flowchart LR\n");
        for id in self.states() {
            let data = self.get_state_data(id);
            writeln!(out, "    s{id}((\"{}\"))", node_label(id, data)).unwrap();
        }
        for id in self.states() {
            for (class, target) in &self.get_state_data(id).normal {
                let label = class.to_string().replace('"', "#quot;");
                writeln!(out, "    s{id} -- \"{label}\" --> s{target}").unwrap();
            }
        }
        for id in self.states() {
            if self.get_state_data(id).state_type.leaf().is_some() {
                writeln!(out, "    style s{id} fill:#9f9").unwrap();
            }
        }
        out
    }
}

fn node_label(id: u32, data: &StateData) -> String {
    let mut label = id.to_string();
    if let Some(leaf) = data.state_type.accept {
        write!(label, " A{leaf}").unwrap();
    }
    if let Some(leaf) = data.state_type.early {
        write!(label, " E{leaf}").unwrap();
    }
    label
}

fn escape_dot(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// One line per state: leaves first, then edges.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.states() {
            let data = self.get_state_data(id);
            write!(f, "{id:02}:")?;
            if let Some(leaf) = data.state_type.accept {
                write!(f, " accept({leaf})")?;
            }
            if let Some(leaf) = data.state_type.early {
                write!(f, " early({leaf})")?;
            }
            for (i, (class, target)) in data.normal.iter().enumerate() {
                f.write_str(if i == 0 { " " } else { ", " })?;
                write!(f, "{class} => {target}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
