//! The autofill engine: platform detection, enumeration, classification,
//! resolution and filling, with per-page idempotency and run counters.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::autofill::classifier::{classify, FieldTag};
use crate::autofill::context::{build_context, FieldContext, WidgetType};
use crate::autofill::enumerator::{candidate_fields, FieldId, ProcessedFieldSet};
use crate::autofill::error::FieldError;
use crate::autofill::executor::{apply, EventSequence, FillAction};
use crate::autofill::knockout::resolve_yes;
use crate::autofill::platform::{detect, Platform};
use crate::autofill::profile::ApplicantProfile;
use crate::autofill::profile_store::{load_profile, ProfileStore};
use crate::autofill::resolver::{match_option, resolve, OptionChoice, Resolution};
use crate::autofill::stats::{FieldReport, FillOutcome, RunStats};
use crate::autofill::watcher::{watch, ObserverHandle};
use crate::dom::{Document, NodeId};

/// One engine per page lifetime. Owns the processed set and the counters; nothing
/// here is shared, so a pass needs no locking.
#[derive(Debug)]
pub struct AutofillEngine {
    profile: ApplicantProfile,
    platform: Option<Platform>,
    processed: ProcessedFieldSet,
    stats: RunStats,
    reports: Vec<FieldReport>,
    deferred: Vec<NodeId>,
    events: EventSequence,
}

impl AutofillEngine {
    pub fn new(profile: ApplicantProfile) -> Self {
        Self {
            profile,
            platform: None,
            processed: ProcessedFieldSet::default(),
            stats: RunStats::default(),
            reports: Vec::new(),
            deferred: Vec::new(),
            events: EventSequence::default(),
        }
    }

    /// Awaits the profile load, then builds the engine. Store failures fall back
    /// to the safe defaults.
    pub async fn from_store(store: &dyn ProfileStore, user_id: &str) -> Self {
        Self::new(load_profile(store, user_id).await)
    }

    pub fn with_event_sequence(mut self, events: EventSequence) -> Self {
        self.events = events;
        self
    }

    /// Detects the platform on first call and caches it for the page lifetime.
    pub fn init(&mut self, document: &Document) -> Platform {
        if let Some(platform) = self.platform {
            return platform;
        }
        let platform = detect(document);
        info!(%platform, host = document.hostname(), "Platform detected");
        self.platform = Some(platform);
        platform
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn profile(&self) -> &ApplicantProfile {
        &self.profile
    }

    /// Scans every `<form>`, then the whole body to catch fields outside forms.
    pub fn process_all_forms(&mut self, document: &mut Document) -> RunStats {
        let platform = self.init(document);
        let before = self.stats;

        // A field that failed inside a form is not retried by the body scan of the
        // same call.
        let mut failed = Vec::new();
        for form in document.elements_by_tag(document.root(), "form") {
            self.scan_pass(document, form, &mut failed);
        }
        let page = document.body().unwrap_or_else(|| document.root());
        self.scan_pass(document, page, &mut failed);
        self.deferred = failed;

        let pass = self.stats.since(&before);
        info!(
            %platform,
            auto_filled = pass.auto_filled,
            review_needed = pass.review_needed,
            manual_required = pass.manual_required,
            knockouts_handled = pass.knockouts_handled,
            "Autofill pass complete"
        );
        self.stats
    }

    /// One enumerator pass over `root`. Fields already processed are skipped; a
    /// field that fails is logged and left eligible for the next pass.
    pub fn scan(&mut self, document: &mut Document, root: NodeId) {
        let mut failed = Vec::new();
        self.scan_pass(document, root, &mut failed);
        self.deferred = failed;
    }

    fn scan_pass(&mut self, document: &mut Document, root: NodeId, failed: &mut Vec<NodeId>) {
        let platform = self.init(document);
        for field in candidate_fields(document, root) {
            if self.processed.contains_node(document, field) || failed.contains(&field) {
                continue;
            }
            match self.process_field(document, field, platform) {
                Ok(report) => {
                    debug!(
                        field_id = %report.field_id,
                        label = %report.label,
                        tag = ?report.tag,
                        outcome = ?report.outcome,
                        "Field processed"
                    );
                    self.reports.push(report);
                }
                Err(e) => {
                    warn!(node = field.index(), "Skipping field: {e}");
                    failed.push(field);
                }
            }
        }
    }

    fn process_field(
        &mut self,
        document: &mut Document,
        field: NodeId,
        platform: Platform,
    ) -> Result<FieldReport, FieldError> {
        let ctx = build_context(document, field, platform)?;
        let tag = classify(&ctx);
        let field_id = FieldId::ensure(document, field)?;

        let outcome = self.fill(document, field, tag, &ctx)?;

        let members = match ctx.widget_type {
            WidgetType::Radio => document.radio_group(field),
            _ => vec![field],
        };
        for member in members {
            self.processed.insert(FieldId::ensure(document, member)?);
        }
        self.processed.insert(field_id.clone());
        self.stats.record(outcome);

        Ok(FieldReport {
            field_id,
            label: ctx.raw_label_text,
            tag,
            widget: ctx.widget_type,
            outcome,
        })
    }

    fn fill(
        &self,
        document: &mut Document,
        field: NodeId,
        tag: FieldTag,
        ctx: &FieldContext,
    ) -> Result<FillOutcome, FieldError> {
        match resolve(tag, ctx.widget_type, &self.profile) {
            Resolution::Affirm => {
                resolve_yes(document, field, ctx, &self.events)?;
                Ok(FillOutcome::KnockoutHandled)
            }
            Resolution::Value(value) => {
                apply(document, field, &FillAction::Text(value), &self.events)?;
                Ok(FillOutcome::AutoFilled)
            }
            Resolution::MatchOption {
                wanted,
                allow_safe_patterns,
            } => {
                let answered = already_answered(document, field, ctx);
                match match_option(&ctx.options, wanted.as_deref(), allow_safe_patterns, answered) {
                    OptionChoice::Matched(option) => {
                        apply(document, field, &option_action(ctx, option), &self.events)?;
                        Ok(FillOutcome::AutoFilled)
                    }
                    OptionChoice::Guessed(option) => {
                        apply(document, field, &option_action(ctx, option), &self.events)?;
                        Ok(FillOutcome::ReviewNeeded)
                    }
                    OptionChoice::Keep => Ok(FillOutcome::ReviewNeeded),
                    OptionChoice::Unavailable => Ok(FillOutcome::ManualRequired),
                }
            }
            Resolution::Skip(outcome) => Ok(outcome),
        }
    }

    pub fn get_stats(&self) -> RunStats {
        self.stats
    }

    /// Reports for every field processed since the last `reset`, in processing order.
    pub fn field_reports(&self) -> &[FieldReport] {
        &self.reports
    }

    /// Fields that failed during the latest pass and are left for the next one.
    pub fn deferred_fields(&self) -> &[NodeId] {
        &self.deferred
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Forgets processed fields and zeroes the counters. The platform stays cached.
    pub fn reset(&mut self) {
        self.processed.clear();
        self.stats = RunStats::default();
        self.reports.clear();
        self.deferred.clear();
    }

    pub fn setup_observer(&self, document: &mut Document, debounce: Duration) -> ObserverHandle {
        watch(document, debounce)
    }

    /// Waits for the next debounced rescan request and runs one pass for it.
    /// Returns `None` once the observer has stopped.
    pub async fn rescan_next(
        &mut self,
        document: &mut Document,
        observer: &mut ObserverHandle,
    ) -> Option<RunStats> {
        let request = observer.next_rescan().await?;
        debug!(coalesced = request.coalesced_records, "Running rescan");
        Some(self.process_all_forms(document))
    }
}

fn option_action(ctx: &FieldContext, option: NodeId) -> FillAction {
    match ctx.widget_type {
        WidgetType::Radio => FillAction::CheckRadio(option),
        _ => FillAction::SelectOption(option),
    }
}

fn already_answered(document: &Document, field: NodeId, ctx: &FieldContext) -> bool {
    match ctx.widget_type {
        WidgetType::Radio => ctx.options.iter().any(|o| document.checked(o.node)),
        _ => !document.value(field).trim().is_empty(),
    }
}
