//! Terminal user interface (TUI) for casegraph.
//!
//! ## Entry points
//!
//! - [`run`]: home menu, then the interactive case table with add, edit,
//!   delete and graph actions.

pub mod app;
pub mod form;

use casegraph_core::CaseManager;

/// Take over the terminal until the user exits, restoring it afterwards even
/// when the session fails.
pub fn run(manager: &CaseManager) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = app::App::new(manager).run(&mut terminal);
    ratatui::restore();
    result
}
