//! `casegraph delete`: remove a case.
//!
//! Deleting an ID that is already gone succeeds quietly. Without an ID the
//! command warns and exits zero.

use casegraph_core::CaseManager;
use casegraph_core::model::CaseId;
use clap::Args;

use crate::output::OutputMode;
use crate::view::CliView;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// ID of the case to delete.
    pub id: Option<CaseId>,
}

pub fn run_delete(
    args: &DeleteArgs,
    manager: &CaseManager,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut view = CliView::new(output);
    manager.remove(&mut view, args.id)?;
    view.finish(args.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegraph_core::CaseStore;
    use casegraph_core::model::CaseFields;

    #[test]
    fn delete_twice_succeeds() {
        let store = CaseStore::open_in_memory().expect("store");
        let keep = store.create(&CaseFields::new("keep", "", "", "")).expect("create");
        let gone = store.create(&CaseFields::new("gone", "", "", "")).expect("create");
        let manager = CaseManager::new(store);
        let args = DeleteArgs { id: Some(gone) };

        run_delete(&args, &manager, OutputMode::Json).expect("first delete");
        run_delete(&args, &manager, OutputMode::Json).expect("second delete");

        let ids: Vec<CaseId> = manager
            .store()
            .read_all()
            .expect("read")
            .into_iter()
            .map(|case| case.id)
            .collect();
        assert_eq!(ids, [keep]);
    }

    #[test]
    fn delete_without_id_keeps_everything() {
        let store = CaseStore::open_in_memory().expect("store");
        store.create(&CaseFields::default()).expect("create");
        let manager = CaseManager::new(store);

        run_delete(&DeleteArgs { id: None }, &manager, OutputMode::Json)
            .expect("must not fail");

        assert_eq!(manager.store().read_all().expect("read").len(), 1);
    }
}
