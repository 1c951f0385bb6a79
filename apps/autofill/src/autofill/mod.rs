// Autofill engine: detects the ATS vendor, classifies every form field on the page,
// resolves a value or answer for it and writes it back through the fill executor.
// Fields are processed at most once per page lifetime; injected fields are picked up
// by the mutation watcher.

pub mod classifier;
pub mod context;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod knockout;
pub mod labels;
pub mod patterns;
pub mod platform;
pub mod profile;
pub mod profile_store;
pub mod resolver;
pub mod stats;
pub mod watcher;

pub use classifier::{classify, FieldTag};
pub use context::{build_context, FieldContext, WidgetType};
pub use engine::AutofillEngine;
pub use enumerator::{FieldId, ProcessedFieldSet};
pub use error::FieldError;
pub use platform::Platform;
pub use profile::{ApplicantProfile, CandidateProfile};
pub use profile_store::{ProfileStore, ProfileStoreError};
pub use stats::{FieldReport, FillOutcome, RunStats};
pub use watcher::{ObserverHandle, RescanRequest, DEFAULT_DEBOUNCE};
