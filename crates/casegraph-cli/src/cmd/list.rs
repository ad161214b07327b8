//! `casegraph list`: print every case, oldest first.

use casegraph_core::CaseManager;

use crate::output::OutputMode;
use crate::view::CliView;

pub fn run_list(manager: &CaseManager, output: OutputMode) -> anyhow::Result<()> {
    let mut view = CliView::listing(output);
    let cases = manager.list(&mut view)?;
    tracing::debug!(count = cases.len(), "listed cases");
    Ok(())
}
