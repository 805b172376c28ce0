//! Default publish steps.
//!
//! The standard publish procedure consists of:
//!
//! 1. **SwitchToPublish** - Check out the publish branch
//! 2. **MaterializeDocument** - Copy the document from the main branch
//! 3. **ConvertStep** - Turn the document into the page
//! 4. **RemoveDocument** - Delete the document copy
//! 5. **ResetIndex** - Unstage everything the single-file checkout staged
//! 6. **StageOutput** - Stage the page
//! 7. **CommitStep** - Commit with the fixed message
//! 8. **ReturnToMain** - Check out the main branch again
//!
//! **RestoreMain** is not part of the sequence; it runs after a failure when
//! the restore policy is set.

mod branch;
mod convert;
mod document;
mod index;

pub use branch::{RestoreMain, ReturnToMain, SwitchToPublish};
pub use convert::ConvertStep;
pub use document::{MaterializeDocument, RemoveDocument};
pub use index::{CommitStep, ResetIndex, StageOutput};
