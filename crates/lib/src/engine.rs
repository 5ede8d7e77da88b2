//! # Extraction Engine
//!
//! Runs a `Schema` (an ordered list of independent field extractors) against
//! one parsed document and collects every outcome into an `ExtractionResult`.
//!
//! The engine is the only place where field failures become data. Whatever a
//! field extractor does, returning a `FieldError` or panicking, the failure
//! is recorded under that field's name and the next field is attempted.
//! After every declared field has been tried, each field name appears in
//! exactly one of `fields` or `errors`.
//!
//! Conditional error suppression is not part of the field loop. A schema may
//! carry named `ErrorFilter`s, applied once by `apply_error_filters` after
//! extraction has finished.

use crate::config::ExtractorConfig;
use crate::errors::{DocumentError, ExtractionError, FieldError, FieldResult};
use crate::linked_data::LinkedData;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::cell::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};
use vidextract_html::Document;

/// Everything a field extractor may read: the document, the configuration
/// and the linked-data payload, located at most once per call.
pub struct FieldContext<'a> {
    document: &'a Document,
    config: &'a ExtractorConfig,
    linked_data: OnceCell<Option<LinkedData>>,
}

impl<'a> FieldContext<'a> {
    pub fn new(document: &'a Document, config: &'a ExtractorConfig) -> Self {
        Self {
            document,
            config,
            linked_data: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn config(&self) -> &'a ExtractorConfig {
        self.config
    }

    /// The memoized payload, or `None` when the document has none.
    pub fn linked_data_payload(&self) -> Option<&LinkedData> {
        self.linked_data
            .get_or_init(|| LinkedData::locate(self.document, &self.config.linked_data_selector))
            .as_ref()
    }

    /// The memoized payload for fields that cannot do without it.
    pub fn linked_data(&self) -> FieldResult<&LinkedData> {
        self.linked_data_payload()
            .ok_or_else(|| FieldError::missing("document carries no linked data payload"))
    }
}

type FieldFn = Box<dyn Fn(&FieldContext<'_>) -> FieldResult<Value>>;

struct FieldSpec {
    name: &'static str,
    extract: FieldFn,
}

/// A named post-extraction rule returning the errors that still apply given
/// the values already extracted.
#[derive(Clone, Copy)]
pub struct ErrorFilter {
    pub name: &'static str,
    pub apply: fn(&ExtractionResult) -> Vec<ExtractionError>,
}

impl std::fmt::Debug for ErrorFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFilter").field("name", &self.name).finish()
    }
}

/// The field schema of one document type.
pub struct Schema {
    document: &'static str,
    fields: Vec<FieldSpec>,
    identity: Option<&'static str>,
    filters: Vec<ErrorFilter>,
}

impl Schema {
    pub fn new(document: &'static str) -> Self {
        Self {
            document,
            fields: Vec::new(),
            identity: None,
            filters: Vec::new(),
        }
    }

    /// Declares a field. Declaration order is the order fields are extracted
    /// and errors reported. Re-declaring a name replaces the earlier
    /// extractor in place.
    pub fn field<T, F>(mut self, name: &'static str, extract: F) -> Self
    where
        T: Serialize,
        F: Fn(&FieldContext<'_>) -> FieldResult<T> + 'static,
    {
        let extract: FieldFn = Box::new(move |ctx: &FieldContext<'_>| {
            let value = extract(ctx)?;
            serde_json::to_value(value)
                .map_err(|e| FieldError::Unexpected(format!("value could not be serialized: {e}")))
        });

        match self.fields.iter_mut().find(|spec| spec.name == name) {
            Some(existing) => {
                warn!(document = self.document, field = name, "Field declared twice; keeping the last extractor");
                existing.extract = extract;
            }
            None => self.fields.push(FieldSpec { name, extract }),
        }
        self
    }

    /// Marks the field whose failure is a document-level failure.
    pub fn identity(mut self, name: &'static str) -> Self {
        self.identity = Some(name);
        self
    }

    pub fn error_filter(mut self, filter: ErrorFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn document(&self) -> &'static str {
        self.document
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }

    pub fn filters(&self) -> &[ErrorFilter] {
        &self.filters
    }
}

/// The partial result of one extraction: successfully extracted values by
/// field name, and the fields that failed, both in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: IndexMap<String, Value>,
    pub errors: Vec<ExtractionError>,
}

impl ExtractionResult {
    /// Reads a field back into its typed form. `None` when the field failed
    /// or does not have the requested shape.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.fields.get(name)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn error_for(&self, name: &str) -> Option<&ExtractionError> {
        self.errors.iter().find(|e| e.field == name)
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Runs every field of `schema` against `document`. Never fails; an
/// extraction in which every field failed is still a result.
///
/// A panicking extractor is recorded as `Unexpected`, but the process panic
/// hook still runs first and prints its message to stderr. Callers that want
/// silent isolation can install their own hook with `std::panic::set_hook`.
pub fn extract(
    document: &Document,
    schema: &Schema,
    config: &ExtractorConfig,
) -> ExtractionResult {
    let ctx = FieldContext::new(document, config);
    collect(schema, &ctx, None)
}

/// Parses `html` and extracts `schema` from it.
///
/// If the schema declares an identity field, that field runs first and a
/// failure is returned immediately as `DocumentError::Unidentifiable`. The
/// remaining fields then run in declaration order, and the schema's error
/// filters are applied to the finished result.
pub fn extract_document(
    html: &str,
    schema: &Schema,
    config: &ExtractorConfig,
) -> Result<ExtractionResult, DocumentError> {
    let document = Document::parse(html);
    let ctx = FieldContext::new(&document, config);

    if let Some(name) = schema.unresolved_identity() {
        warn!(document = schema.document, field = name, "Identity names an undeclared field; skipping the identifier check");
    }

    let identity = match schema.identity.and_then(|name| schema.spec(name)) {
        Some(spec) => match run_field(spec, &ctx) {
            Ok(value) => Some((spec.name, value)),
            Err(e) => {
                warn!(document = schema.document, field = spec.name, "Document has no identifier: {e}");
                return Err(DocumentError::Unidentifiable {
                    document: schema.document,
                    field: spec.name.to_string(),
                    kind: e.kind(),
                    message: e.message().to_string(),
                });
            }
        },
        None => None,
    };

    let result = apply_error_filters(collect(schema, &ctx, identity), schema);
    info!(
        document = schema.document,
        fields = result.fields.len(),
        errors = result.errors.len(),
        "Extraction finished"
    );
    Ok(result)
}

/// Applies the schema's named filters, in declaration order, to a finished
/// result. Only `errors` can change.
pub fn apply_error_filters(mut result: ExtractionResult, schema: &Schema) -> ExtractionResult {
    for filter in &schema.filters {
        let before = result.errors.len();
        result.errors = (filter.apply)(&result);
        let dropped = before.saturating_sub(result.errors.len());
        if dropped > 0 {
            debug!(document = schema.document, filter = filter.name, dropped, "Suppressed field errors");
        }
    }
    result
}

impl Schema {
    fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// The identity name when it matches no declared field.
    fn unresolved_identity(&self) -> Option<&'static str> {
        self.identity.filter(|name| self.spec(name).is_none())
    }
}

fn collect(
    schema: &Schema,
    ctx: &FieldContext<'_>,
    mut precomputed: Option<(&'static str, Value)>,
) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    for spec in &schema.fields {
        let outcome = match precomputed.take_if(|(name, _)| *name == spec.name) {
            Some((_, value)) => Ok(value),
            None => run_field(spec, ctx),
        };

        match outcome {
            Ok(value) => {
                result.fields.insert(spec.name.to_string(), value);
            }
            Err(e) => {
                debug!(document = schema.document, field = spec.name, "Field failed: {e}");
                result.errors.push(ExtractionError::new(spec.name, &e));
            }
        }
    }

    result
}

fn run_field(spec: &FieldSpec, ctx: &FieldContext<'_>) -> FieldResult<Value> {
    match panic::catch_unwind(AssertUnwindSafe(|| (spec.extract)(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(FieldError::Unexpected(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("field extractor panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("field extractor panicked: {s}")
    } else {
        "field extractor panicked".to_string()
    }
}
