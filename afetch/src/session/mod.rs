//! Interactive session: release and asset choice, then sequential downloads.
//!
//! ```text
//! ChoosingRelease ──select──► ChoosingAssets ──confirm──► Downloading ──► Finished
//!                                   ▲                          │
//!                                   └──────── interrupt ───────┘
//! ```
//!
//! `ChoosingRelease` is skipped when a mask or a release tag narrows the
//! listing up front. The [`Session`] is pure state; front ends feed it
//! [`Intent`]s and execute the [`Command`]s it returns, either with their own
//! loop or through [`run_transfers`].

mod driver;
mod list;
mod machine;

pub use driver::run_transfers;
pub use list::{ListItem, ListView, ASSET_TITLE, RELEASE_TITLE};
pub use machine::{
    Command, FailedTransfer, Intent, Outcome, Phase, Session, SessionResult, TransferJob,
    CANCELLED_NOTICE, PARTIAL_FAILURE_SUMMARY, SUCCESS_SUMMARY,
};
