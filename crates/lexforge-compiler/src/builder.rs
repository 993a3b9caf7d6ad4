//! Pipeline driver: leaf specs in, optimized graph out.

use indexmap::IndexSet;
use lexforge_automata::hir::HirKind;
use lexforge_automata::{Span, dfa, nfa};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::Graph;
use crate::leaf::{Leaf, LeafId, LeafSpec};
use crate::{Error, Result};

/// Settings for every stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub nfa: nfa::Config,
    pub dfa: dfa::Config,
    /// Run graph optimization rounds after leaf resolution.
    pub optimize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nfa: nfa::Config::default(),
            dfa: dfa::Config::default(),
            optimize: true,
        }
    }
}

impl Config {
    pub fn with_nfa(mut self, nfa: nfa::Config) -> Self {
        self.nfa = nfa;
        self
    }

    pub fn with_dfa(mut self, dfa: dfa::Config) -> Self {
        self.dfa = dfa;
        self
    }

    pub fn with_optimize(mut self, yes: bool) -> Self {
        self.optimize = yes;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    specs: Vec<LeafSpec>,
    config: Config,
}

impl LexerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a leaf. Leaf ids follow insertion order.
    pub fn leaf(mut self, spec: LeafSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn leaves(mut self, specs: impl IntoIterator<Item = LeafSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Pattern errors and priority conflicts are all collected before
    /// failing with `Error::InvalidPatterns`.
    pub fn build(self) -> Result<Compiled> {
        let config = self.config;
        let leaves = translate(self.specs)?;

        let hirs: Vec<HirKind> = leaves.iter().map(|leaf| leaf.pattern.hir().clone()).collect();
        let nfa = nfa::Compiler::new().with_config(config.nfa).compile(&hirs)?;
        log::debug!("nfa: {} states for {} patterns", nfa.len(), nfa.pattern_len());

        let dfa = dfa::Determinizer::new().with_config(config.dfa).build(&nfa)?;
        log::debug!("dfa: {} states", dfa.len());

        let mut graph = Graph::from_dfa(leaves, dfa);
        if !graph.errors().is_empty() {
            let diagnostics = Diagnostics::from_graph_errors(graph.errors(), graph.leaves());
            return Err(Error::InvalidPatterns(diagnostics));
        }
        if config.optimize {
            graph.optimize();
        }

        let diagnostics = lint(&graph);
        log::debug!(
            "lexer: {} states, {} warnings",
            graph.len(),
            diagnostics.warning_count()
        );
        Ok(Compiled { graph, diagnostics })
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct Compiled {
    graph: Graph,
    /// Warnings only.
    diagnostics: Diagnostics,
}

impl Compiled {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Warnings rendered against the leaf patterns.
    pub fn render_diagnostics(&self, colored: bool) -> String {
        let sources = self.graph.leaves().iter().map(|leaf| leaf.pattern.text());
        self.diagnostics
            .printer()
            .sources(sources)
            .colored(colored)
            .render()
    }
}

fn translate(specs: Vec<LeafSpec>) -> Result<Vec<Leaf>> {
    let mut diagnostics = Diagnostics::new();
    let mut leaves = Vec::with_capacity(specs.len());
    for (id, spec) in (0..).zip(specs) {
        let text = spec.source.text().to_owned();
        match Leaf::from_spec(spec) {
            Ok(leaf) => leaves.push(leaf),
            Err(err) => diagnostics.report_regex_error(id, &text, &err),
        }
    }

    if diagnostics.has_errors() {
        return Err(Error::InvalidPatterns(diagnostics));
    }
    log::debug!("translated {} leaves", leaves.len());
    Ok(leaves)
}

/// Warnings about leaves that match the empty string or never win.
fn lint(graph: &Graph) -> Diagnostics {
    let whole = |leaf: LeafId| Span::new(0, graph.get_leaf(leaf).pattern.text().len());
    let mut diagnostics = Diagnostics::new();

    let dfa = graph.dfa();
    for &leaf in dfa.state(dfa.start()).matches() {
        diagnostics
            .report(DiagnosticKind::MatchesEmpty, leaf, whole(leaf))
            .emit();
    }

    let winners: IndexSet<LeafId> = graph
        .states()
        .flat_map(|state| {
            let state_type = graph.get_state_data(state).state_type;
            [state_type.accept, state_type.early]
        })
        .flatten()
        .collect();
    for leaf in (0..graph.leaves().len() as LeafId).filter(|leaf| !winners.contains(leaf)) {
        diagnostics
            .report(DiagnosticKind::ShadowedLeaf, leaf, whole(leaf))
            .emit();
    }
    diagnostics
}
