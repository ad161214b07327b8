pub mod add;
pub mod delete;
pub mod edit;
pub mod graph;
pub mod list;

use casegraph_core::model::CaseFields;
use clap::Args;

/// Case attribute flags shared by `add` and `edit`.
///
/// An omitted flag leaves the base value in place; `--email ""` clears it.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct CaseFieldArgs {
    /// Username associated with the case.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Hostname associated with the case.
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// Staff identifier (kept as text, leading zeros preserved).
    #[arg(short, long)]
    pub staff_id: Option<String>,

    /// Email address associated with the case.
    #[arg(short, long)]
    pub email: Option<String>,
}

impl CaseFieldArgs {
    /// Overlay the given flags on `base`.
    pub fn apply(&self, base: CaseFields) -> CaseFields {
        CaseFields {
            username: self.username.clone().unwrap_or(base.username),
            hostname: self.hostname.clone().unwrap_or(base.hostname),
            staff_id: self.staff_id.clone().unwrap_or(base.staff_id),
            email: self.email.clone().unwrap_or(base.email),
        }
    }
}
