//! `casegraph edit`: rewrite a case.
//!
//! The current values pre-fill the form: flags that are not given keep what
//! is stored, then all four attributes are written back. Without an ID there
//! is nothing selected, so the command warns and changes nothing.

use casegraph_core::CaseManager;
use casegraph_core::model::CaseId;
use clap::Args;

use crate::cmd::CaseFieldArgs;
use crate::output::OutputMode;
use crate::view::CliView;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// ID of the case to edit.
    pub id: Option<CaseId>,

    #[command(flatten)]
    pub fields: CaseFieldArgs,
}

pub fn run_edit(args: &EditArgs, manager: &CaseManager, output: OutputMode) -> anyhow::Result<()> {
    let current = match args.id {
        Some(id) => manager.case(id)?.map(|case| case.fields),
        None => None,
    };
    if let (Some(id), None) = (args.id, &current) {
        tracing::warn!(id, "editing a case that does not exist");
    }
    let fields = args.fields.apply(current.unwrap_or_default());

    let mut view = CliView::new(output);
    manager.edit(&mut view, args.id, &fields)?;
    view.finish(args.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegraph_core::CaseStore;
    use casegraph_core::model::CaseFields;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: EditArgs,
    }

    fn manager_with(fields: &CaseFields) -> (CaseManager, CaseId) {
        let store = CaseStore::open_in_memory().expect("store");
        let id = store.create(fields).expect("create");
        (CaseManager::new(store), id)
    }

    #[test]
    fn id_is_optional() {
        let w = Wrapper::parse_from(["test", "--username", "x"]);
        assert!(w.args.id.is_none());
        assert_eq!(w.args.fields.username.as_deref(), Some("x"));
    }

    #[test]
    fn edit_prefills_from_stored_case() {
        let (manager, id) = manager_with(&CaseFields::new("alice", "ws-01", "007", "a@corp.test"));
        let id_arg = id.to_string();
        let w = Wrapper::parse_from(["test", id_arg.as_str(), "--hostname", "ws-02"]);

        run_edit(&w.args, &manager, OutputMode::Json).expect("edit");

        let case = manager.case(id).expect("get").expect("exists");
        assert_eq!(
            case.fields,
            CaseFields::new("alice", "ws-02", "007", "a@corp.test")
        );
    }

    #[test]
    fn edit_without_id_changes_nothing() {
        let original = CaseFields::new("alice", "", "", "");
        let (manager, id) = manager_with(&original);
        let w = Wrapper::parse_from(["test", "--username", "mallory"]);

        run_edit(&w.args, &manager, OutputMode::Json).expect("edit must not fail");

        let case = manager.case(id).expect("get").expect("exists");
        assert_eq!(case.fields, original);
    }
}
