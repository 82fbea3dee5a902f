#![forbid(unsafe_code)]

//! Schema interpreter and form-state engine for inspection forms.
//!
//! A form's structure arrives as a JSON [`Schema`](schema::Schema). A
//! [`FormSession`] owns the mutable state for one filling session, renders it
//! through the schema walker, and hands the raw state to a
//! [`SubmissionSink`](submit::SubmissionSink) on submit.

pub mod resolve;
pub mod schema;
pub mod session;
pub mod state;
pub mod submit;
pub mod walk;

pub use resolve::{CellResolution, Resolver, is_truthy};
pub use schema::{Schema, SchemaError};
pub use session::{FormSession, SessionPhase, SubmitError, SubmitReceipt};
pub use state::{FormState, StateStore};
pub use submit::{
    SubmissionPayload, SubmissionRecord, SubmissionSink, SubmissionStatus, assemble,
};
pub use walk::{SectionBody, SectionView, walk};
