//! `casegraph add`: record a new case.
//!
//! Every attribute is optional; a case with all four fields empty is valid
//! and simply never links to anything.

use casegraph_core::CaseManager;
use casegraph_core::model::CaseFields;
use clap::Args;

use crate::cmd::CaseFieldArgs;
use crate::output::OutputMode;
use crate::view::CliView;

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub fields: CaseFieldArgs,
}

pub fn run_add(args: &AddArgs, manager: &CaseManager, output: OutputMode) -> anyhow::Result<()> {
    let fields = args.fields.apply(CaseFields::default());
    let mut view = CliView::new(output);
    let id = manager.add(&mut view, &fields)?;
    view.finish(Some(id))
}
