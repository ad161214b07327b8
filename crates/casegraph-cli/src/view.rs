//! [`CaseView`] for one-shot CLI commands.
//!
//! The manager refreshes the list after every mutation; only `casegraph list`
//! prints it. Success notices are held until the command knows which case was
//! touched, warnings print immediately, and errors are left to `main`, which
//! renders the returned [`casegraph_core::CaseError`] with its code.

use std::collections::BTreeMap;
use std::io::{self, Write};

use casegraph_core::graph::{GraphStats, Relationship};
use casegraph_core::model::{Case, CaseField, CaseId};
use casegraph_core::{CaseGraph, CaseView, Notice, NoticeLevel};
use serde::Serialize;

use crate::output::{
    OutputMode, Renderable, pretty_kv, pretty_rule, pretty_section, render, render_list,
    render_success, render_warning,
};

/// How `show_graph` hands the graph over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Adjacency report in the active output mode.
    Report,
    /// Graphviz DOT on stdout.
    Dot,
}

#[derive(Debug)]
pub struct CliView {
    mode: OutputMode,
    print_cases: bool,
    graph_format: GraphFormat,
    success: Option<String>,
}

impl CliView {
    /// View for mutating commands: the refreshed list is not printed.
    pub const fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            print_cases: false,
            graph_format: GraphFormat::Report,
            success: None,
        }
    }

    /// View for `casegraph list`.
    pub fn listing(mode: OutputMode) -> Self {
        Self {
            print_cases: true,
            ..Self::new(mode)
        }
    }

    /// View for `casegraph graph`.
    pub fn graph(mode: OutputMode, graph_format: GraphFormat) -> Self {
        Self {
            graph_format,
            ..Self::new(mode)
        }
    }

    /// Print the held success notice, if any, naming the affected case.
    pub fn finish(&mut self, id: Option<CaseId>) -> anyhow::Result<()> {
        if let Some(message) = self.success.take() {
            render_success(self.mode, &message, id)?;
        }
        Ok(())
    }
}

impl CaseView for CliView {
    fn show_cases(&mut self, cases: &[Case]) -> anyhow::Result<()> {
        if self.print_cases {
            if cases.is_empty() && !self.mode.is_json() {
                writeln!(io::stdout(), "No cases.")?;
                return Ok(());
            }
            render_list(cases, self.mode)?;
        }
        Ok(())
    }

    fn notify(&mut self, notice: &Notice) -> anyhow::Result<()> {
        match notice.level {
            NoticeLevel::Success => self.success = Some(notice.message.clone()),
            NoticeLevel::Warning => render_warning(self.mode, &notice.message)?,
            NoticeLevel::Error => {}
        }
        Ok(())
    }

    fn show_graph(&mut self, graph: &CaseGraph) -> anyhow::Result<()> {
        match self.graph_format {
            GraphFormat::Dot => {
                write!(io::stdout(), "{}", graph.to_dot())?;
                Ok(())
            }
            GraphFormat::Report => {
                let report = GraphReport::from(graph);
                let mode = self.mode;
                render(mode, &report, |report, w| match mode {
                    OutputMode::Pretty => report.write_pretty(w),
                    _ => report.write_text(w),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Case rendering
// ---------------------------------------------------------------------------

impl Renderable for Case {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("Case {}", self.id))?;
        for field in CaseField::ALL {
            pretty_kv(w, field.label(), display_value(self.fields.get(field)))?;
        }
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            self.id,
            display_value(&self.fields.username),
            display_value(&self.fields.hostname),
            display_value(&self.fields.staff_id),
            display_value(&self.fields.email),
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "username", "hostname", "staff_id", "email"]
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

// ---------------------------------------------------------------------------
// Graph report
// ---------------------------------------------------------------------------

/// Serializable snapshot of a [`CaseGraph`].
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub cases: Vec<CaseId>,
    pub edges: Vec<Relationship>,
    pub stats: GraphStats,
}

impl From<&CaseGraph> for GraphReport {
    fn from(graph: &CaseGraph) -> Self {
        Self {
            cases: graph.case_ids(),
            edges: graph.edges(),
            stats: graph.stats(),
        }
    }
}

impl GraphReport {
    /// Neighbours of each case with the shared attributes, in case order.
    fn adjacency(&self) -> BTreeMap<CaseId, Vec<(CaseId, String)>> {
        let mut adjacency: BTreeMap<CaseId, Vec<(CaseId, String)>> =
            self.cases.iter().map(|&id| (id, Vec::new())).collect();
        for edge in &self.edges {
            let shared = edge.shared.to_string();
            adjacency
                .entry(edge.a)
                .or_default()
                .push((edge.b, shared.clone()));
            adjacency.entry(edge.b).or_default().push((edge.a, shared));
        }
        for neighbours in adjacency.values_mut() {
            neighbours.sort_unstable();
        }
        adjacency
    }

    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        for (id, neighbours) in self.adjacency() {
            let rendered: Vec<String> = neighbours
                .iter()
                .map(|(other, shared)| format!("{other}({shared})"))
                .collect();
            writeln!(w, "{id}  {}", rendered.join(" "))?;
        }
        Ok(())
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, "Case graph")?;
        pretty_kv(w, "Cases", self.stats.node_count.to_string())?;
        pretty_kv(w, "Links", self.stats.edge_count.to_string())?;
        pretty_kv(w, "Groups", self.stats.component_count.to_string())?;
        pretty_kv(w, "Isolated", self.stats.isolated_count.to_string())?;
        pretty_kv(w, "Largest", self.stats.largest_component.to_string())?;
        pretty_rule(w)?;
        for (id, neighbours) in self.adjacency() {
            if neighbours.is_empty() {
                writeln!(w, "#{id:<6} (no shared values)")?;
                continue;
            }
            writeln!(w, "#{id}")?;
            for (other, shared) in neighbours {
                writeln!(w, "  ── #{other:<6} via {shared}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegraph_core::model::CaseFields;

    fn sample_graph() -> CaseGraph {
        CaseGraph::build(&[
            Case {
                id: 1,
                fields: CaseFields::new("a", "h1", "s1", "e1"),
            },
            Case {
                id: 2,
                fields: CaseFields::new("a", "h2", "s2", "e2"),
            },
            Case {
                id: 3,
                fields: CaseFields::new("b", "h3", "s3", "e3"),
            },
        ])
    }

    fn captured(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn report_text_lists_every_case_with_neighbours() {
        let report = GraphReport::from(&sample_graph());
        let out = captured(|w| report.write_text(w));
        assert_eq!(out, "1  2(username)\n2  1(username)\n3  \n");
    }

    #[test]
    fn report_pretty_marks_isolated_cases() {
        let report = GraphReport::from(&sample_graph());
        let out = captured(|w| report.write_pretty(w));
        assert!(out.contains("Links:       1"), "{out}");
        assert!(out.contains("#3      (no shared values)"), "{out}");
        assert!(out.contains("── #2"), "{out}");
    }

    #[test]
    fn report_json_shape() {
        let report = GraphReport::from(&sample_graph());
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["cases"], serde_json::json!([1, 2, 3]));
        assert_eq!(
            value["edges"],
            serde_json::json!([{ "a": 1, "b": 2, "shared": ["username"] }])
        );
        assert_eq!(value["stats"]["component_count"], 2);
    }

    #[test]
    fn constructors_pick_what_gets_printed() {
        let listing = CliView::listing(OutputMode::Text);
        assert!(listing.print_cases);
        assert_eq!(listing.graph_format, GraphFormat::Report);

        let graph = CliView::graph(OutputMode::Json, GraphFormat::Dot);
        assert!(!graph.print_cases);
        assert_eq!(graph.graph_format, GraphFormat::Dot);
        assert!(graph.success.is_none());
    }

    #[test]
    fn case_table_row_marks_empty_values() {
        let case = Case {
            id: 4,
            fields: CaseFields::new("alice", "", "007", ""),
        };
        let out = captured(|w| case.render_table(w));
        assert_eq!(out, "4  alice  -  007  -\n");
    }

    #[test]
    fn case_json_is_flat() {
        let case = Case {
            id: 4,
            fields: CaseFields::new("alice", "ws-01", "007", "a@corp.test"),
        };
        let out = captured(|w| case.render_json(w));
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["id"], 4);
        assert_eq!(value["staff_id"], "007");
    }

    #[test]
    fn success_is_held_and_warning_is_not() {
        let mut view = CliView::new(OutputMode::Text);
        view.notify(&Notice::success("Case added successfully!"))
            .expect("notify");
        assert_eq!(view.success.as_deref(), Some("Case added successfully!"));

        view.notify(&Notice::error("ignored")).expect("notify");
        assert_eq!(view.success.as_deref(), Some("Case added successfully!"));
    }
}
