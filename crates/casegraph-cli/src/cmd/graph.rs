//! `casegraph graph`: show which cases share an attribute value.

use casegraph_core::CaseManager;
use clap::Args;

use crate::output::OutputMode;
use crate::view::{CliView, GraphFormat};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Emit Graphviz DOT instead of an adjacency report.
    #[arg(long)]
    pub dot: bool,
}

pub fn run_graph(args: &GraphArgs, manager: &CaseManager, output: OutputMode) -> anyhow::Result<()> {
    let format = if args.dot {
        GraphFormat::Dot
    } else {
        GraphFormat::Report
    };
    let mut view = CliView::graph(output, format);
    let graph = manager.show_graph(&mut view)?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph rendered"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: GraphArgs,
    }

    #[test]
    fn dot_flag_parses() {
        assert!(Wrapper::parse_from(["test", "--dot"]).args.dot);
        assert!(!Wrapper::parse_from(["test"]).args.dot);
    }
}
