//! Edit buffer, validation and submission of one form instance.
//!
//! A form moves `Editing → Submitting → Closed` on success and falls back
//! to `Editing` on any rejection so the user can try again.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{Api, ApiError, body_message};
use crate::domain::context::SharedContext;
use crate::forms::FormError;
use crate::forms::field::{
    Field, FieldType, datetime_input, part_text, same_value, value_text,
};

/// 400/409 are field errors, not failures.
pub const SUBMIT_EXPECTED: &[u16] = &[200, 201, 400, 409];

const VALIDATION_STATUSES: &[u16] = &[400, 409];

const REQUIRED: &str = "This field is required.";
const NOTHING_CHANGED: &str = "Nothing to save: no field was changed.";
const FIX_FIELDS: &str = "Please correct the highlighted fields.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Editing,
    Submitting,
    Closed,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Backend accepted the change; carries its response body.
    Saved(Value),
    /// Rejected locally or by the backend's validation; errors are on the form.
    Invalid,
    /// Anything else; the message is already in the shared error slot.
    Failed(ApiError),
}

type Hook<'a> = Box<dyn FnOnce(&Value) + 'a>;

/// Callbacks run after a successful submission, in declaration order.
#[derive(Default)]
pub struct SubmitHooks<'a> {
    changed: Option<Hook<'a>>,
    success_message: Option<String>,
    finished: Option<Hook<'a>>,
}

impl<'a> SubmitHooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data-changed notification, typically "refetch".
    pub fn on_changed(mut self, hook: impl FnOnce(&Value) + 'a) -> Self {
        self.changed = Some(Box::new(hook));
        self
    }

    pub fn success_message(mut self, message: Option<impl Into<String>>) -> Self {
        self.success_message = message.map(Into::into);
        self
    }

    /// Runs last, typically to close the dialog.
    pub fn on_finished(mut self, hook: impl FnOnce(&Value) + 'a) -> Self {
        self.finished = Some(Box::new(hook));
        self
    }
}

#[derive(Clone, Debug)]
pub struct FormEngine {
    fields: Vec<Field>,
    initial: Map<String, Value>,
    edited: Map<String, Value>,
    posted: Option<Vec<(String, String)>>,
    errors: BTreeMap<String, String>,
    summary: Option<String>,
    phase: FormPhase,
    allow_empty: bool,
    prefill: bool,
}

impl FormEngine {
    pub fn new(fields: Vec<Field>) -> Result<Self, FormError> {
        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self {
            fields,
            initial: Map::new(),
            edited: Map::new(),
            posted: None,
            errors: BTreeMap::new(),
            summary: None,
            phase: FormPhase::Editing,
            allow_empty: false,
            prefill: false,
        })
    }

    pub fn with_initial(mut self, initial: Map<String, Value>) -> Self {
        self.initial = initial;
        self
    }

    /// Lets a form with no changes submit, e.g. confirm-only forms.
    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Copies the initial values into the edit buffer so every field is
    /// submitted, changed or not.
    pub fn prefill(mut self) -> Self {
        self.prefill = true;
        for field in &self.fields {
            if let Some(value) = self.initial.get(&field.name) {
                self.edited.insert(field.name.clone(), value.clone());
            }
        }
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        if self.field(name).is_none() {
            return Err(FormError::UnknownField(name.to_string()));
        }
        self.edited.insert(name.to_string(), value);
        Ok(())
    }

    /// Edited value, else initial, else the declared default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.edited
            .get(name)
            .or_else(|| self.initial.get(name))
            .or_else(|| self.field(name).and_then(|field| field.default.as_ref()))
    }

    pub fn edited(&self) -> &Map<String, Value> {
        &self.edited
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Reads a posted HTML form into the edit buffer.
    ///
    /// A field counts as edited when its parsed value differs from the
    /// initial one (a missing initial value counts as `null`). Values that
    /// fail to parse become field errors.
    pub fn apply_submission(&mut self, posted: &[(String, String)]) {
        self.errors.clear();
        self.summary = None;

        for field in &self.fields {
            match field.parse(posted) {
                Ok(value) => {
                    let initial = self.initial.get(&field.name).unwrap_or(&Value::Null);
                    if self.prefill || !same_value(&value, initial) {
                        self.edited.insert(field.name.clone(), value);
                    } else {
                        self.edited.remove(&field.name);
                    }
                }
                Err(message) => {
                    self.errors.insert(field.name.clone(), message);
                }
            }
        }

        self.posted = Some(posted.to_vec());
    }

    /// Checks the buffer without touching the network.
    pub fn validate(&mut self) -> bool {
        for field in self.fields.iter().filter(|field| field.required) {
            let value = self
                .edited
                .get(&field.name)
                .or_else(|| self.initial.get(&field.name));
            if is_blank(value) {
                self.errors
                    .entry(field.name.clone())
                    .or_insert_with(|| REQUIRED.to_string());
            }
        }

        if !self.errors.is_empty() {
            self.summary = Some(FIX_FIELDS.to_string());
            return false;
        }

        if self.edited.is_empty() && !self.allow_empty {
            self.summary = Some(NOTHING_CHANGED.to_string());
            return false;
        }

        true
    }

    /// Validates, posts the edited fields to `path` and reports the outcome.
    pub async fn submit<A>(
        &mut self,
        api: &A,
        path: &str,
        context: &mut SharedContext,
        hooks: SubmitHooks<'_>,
    ) -> SubmitOutcome
    where
        A: Api + ?Sized,
    {
        if !self.validate() {
            self.phase = FormPhase::Editing;
            return SubmitOutcome::Invalid;
        }

        self.phase = FormPhase::Submitting;
        let body = Value::Object(self.edited.clone());

        match api.post(path, Some(body), SUBMIT_EXPECTED).await {
            Ok(response) if VALIDATION_STATUSES.contains(&response.status()) => {
                self.apply_server_errors(response.body(), context);
                self.phase = FormPhase::Editing;
                SubmitOutcome::Invalid
            }
            Ok(response) => {
                let result = response.into_body();
                if let Some(changed) = hooks.changed {
                    changed(&result);
                }
                if let Some(message) = hooks.success_message {
                    context.set_message(message);
                }
                if let Some(finished) = hooks.finished {
                    finished(&result);
                }
                self.phase = FormPhase::Closed;
                SubmitOutcome::Saved(result)
            }
            Err(err) => {
                log::error!("Failed to submit form to {path}: {err}");
                context.set_error(err.message.clone());
                self.phase = FormPhase::Editing;
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Maps `{detail|errors: [{loc|field, msg|message}]}` onto field errors.
    fn apply_server_errors(&mut self, body: &Value, context: &mut SharedContext) {
        let entries = body
            .get("detail")
            .or_else(|| body.get("errors"))
            .and_then(Value::as_array);

        let mut unmapped = Vec::new();
        for entry in entries.into_iter().flatten() {
            let message = entry
                .get("msg")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Invalid value.")
                .to_string();

            match self.locate(entry) {
                Some(name) => {
                    self.errors.insert(name, message);
                }
                None => unmapped.push(message),
            }
        }

        if self.errors.is_empty() {
            let message = if unmapped.is_empty() {
                body_message(body).unwrap_or_else(|| "The submission was rejected.".to_string())
            } else {
                unmapped.join(" ")
            };
            context.set_error(message);
        } else {
            self.summary = Some(FIX_FIELDS.to_string());
        }
    }

    /// Name of the form field an error entry points at, if any.
    fn locate(&self, entry: &Value) -> Option<String> {
        if let Some(name) = entry.get("field").and_then(Value::as_str) {
            return self.field(name).map(|field| field.name.clone());
        }
        entry
            .get("loc")
            .and_then(Value::as_array)?
            .iter()
            .rev()
            .filter_map(Value::as_str)
            .find_map(|name| self.field(name).map(|field| field.name.clone()))
    }

    /// Template model; the caller fills in routing details.
    pub fn view(&self, slug: impl Into<String>, title: impl Into<String>) -> FormView {
        FormView {
            slug: slug.into(),
            title: title.into(),
            action: String::new(),
            cancel: String::new(),
            submit_label: "Save".to_string(),
            open: false,
            phase: self.phase,
            summary: self.summary.clone(),
            fields: self.fields.iter().map(|field| self.field_view(field)).collect(),
        }
    }

    fn raw(&self, input: &str) -> Option<String> {
        self.posted
            .as_ref()?
            .iter()
            .find(|(key, _)| key == input)
            .map(|(_, value)| value.clone())
    }

    fn field_view(&self, field: &Field) -> FieldView {
        let value = self.value(&field.name);
        let text = self
            .raw(&field.name)
            .unwrap_or_else(|| value.map(value_text).unwrap_or_default());

        let (first, second) = match field.kind {
            FieldType::DateTimeRange => (
                self.raw(&field.sub_input("start"))
                    .unwrap_or_else(|| datetime_input(value.and_then(|value| value.get("start")))),
                self.raw(&field.sub_input("end"))
                    .unwrap_or_else(|| datetime_input(value.and_then(|value| value.get("end")))),
            ),
            FieldType::Geolocation => (
                self.raw(&field.sub_input("lat"))
                    .unwrap_or_else(|| value.map(|value| part_text(value, "lat")).unwrap_or_default()),
                self.raw(&field.sub_input("lng"))
                    .unwrap_or_else(|| value.map(|value| part_text(value, "lng")).unwrap_or_default()),
            ),
            _ => (String::new(), String::new()),
        };

        FieldView {
            name: field.name.clone(),
            label: field.label(),
            kind: field.kind,
            required: field.required,
            checked: value == Some(&Value::Bool(true)),
            choices: field
                .choices
                .iter()
                .map(|choice| {
                    let value = value_text(&choice.value);
                    ChoiceView {
                        selected: value == text,
                        value,
                        label: choice.label.clone(),
                    }
                })
                .collect(),
            value: text,
            first,
            second,
            help_text: field.help_text.clone(),
            placeholder: field.placeholder.clone(),
            max_length: field.max_length,
            min: field.min,
            max: field.max,
            step: field.step,
            error: self.errors.get(&field.name).cloned(),
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FormView {
    pub slug: String,
    pub title: String,
    /// Where the form posts.
    pub action: String,
    /// Where closing the dialog leads.
    pub cancel: String,
    pub submit_label: String,
    pub open: bool,
    pub phase: FormPhase,
    pub summary: Option<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub kind: FieldType,
    pub required: bool,
    pub value: String,
    pub checked: bool,
    /// Start / latitude input of two-part fields.
    pub first: String,
    /// End / longitude input of two-part fields.
    pub second: String,
    pub choices: Vec<ChoiceView>,
    pub help_text: Option<String>,
    pub placeholder: Option<String>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::ApiResponse;
    use crate::domain::company::Company;
    use crate::forms::field::Choice;

    fn posted(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn initial(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn event_form() -> FormEngine {
        FormEngine::new(vec![
            Field::text("name").required(),
            Field::text("venue"),
            Field::new("published", FieldType::Boolean),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = FormEngine::new(vec![Field::text("name"), Field::text("name")]);
        assert!(matches!(result, Err(FormError::DuplicateField(name)) if name == "name"));
    }

    #[test]
    fn displayed_value_falls_back_to_initial_then_default() {
        let mut form = FormEngine::new(vec![
            Field::text("name"),
            Field::text("currency").default("GBP"),
        ])
        .unwrap()
        .with_initial(initial(json!({"name": "Fete"})));

        assert_eq!(form.value("name"), Some(&json!("Fete")));
        assert_eq!(form.value("currency"), Some(&json!("GBP")));

        form.set("name", json!("Summer Fete")).unwrap();
        assert_eq!(form.value("name"), Some(&json!("Summer Fete")));
        assert!(form.set("missing", json!(1)).is_err());
    }

    #[actix_web::test]
    async fn missing_required_field_blocks_the_request() {
        let mut api = MockApi::new();
        api.expect_post().times(0);

        let mut form = FormEngine::new(vec![Field::text("name").required(), Field::text("venue")])
            .unwrap();
        form.apply_submission(&posted(&[("name", ""), ("venue", "")]));

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "events/", &mut context, SubmitHooks::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert_eq!(form.error("name"), Some(REQUIRED));
        assert_eq!(form.summary(), Some(FIX_FIELDS));
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(context.error().is_none());
    }

    #[actix_web::test]
    async fn unchanged_form_is_not_submitted() {
        let mut api = MockApi::new();
        api.expect_post().times(0);

        let mut form = event_form().with_initial(initial(
            json!({"id": 5, "name": "Fete", "venue": "Hall", "published": false}),
        ));
        form.apply_submission(&posted(&[("name", "Fete"), ("venue", "Hall")]));

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "events/5/", &mut context, SubmitHooks::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert_eq!(form.summary(), Some(NOTHING_CHANGED));
    }

    #[actix_web::test]
    async fn empty_submission_allowed_when_configured() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .withf(|path, body, _| path.to_string() == "tickets/9/cancel/" && *body == Some(json!({})))
            .returning(|_, _, _| Ok(ApiResponse::new(200, json!({"id": 9}))));

        let mut form = FormEngine::new(vec![]).unwrap().allow_empty(true);
        form.apply_submission(&[]);

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "tickets/9/cancel/", &mut context, SubmitHooks::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    }

    #[actix_web::test]
    async fn only_edited_fields_are_posted_and_hooks_run_in_order() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .withf(|path, body, expected| {
                path.to_string() == "events/5/"
                    && *body == Some(json!({"venue": "Park"}))
                    && expected.to_vec() == SUBMIT_EXPECTED.to_vec()
            })
            .returning(|_, _, _| {
                Ok(ApiResponse::new(200, json!({"id": 5, "name": "Fete", "venue": "Park"})))
            });

        let mut form = event_form().with_initial(initial(
            json!({"id": 5, "name": "Fete", "venue": "Hall", "published": false}),
        ));
        form.apply_submission(&posted(&[("name", "Fete"), ("venue", "Park")]));

        let calls = RefCell::new(Vec::new());
        let mut context = SharedContext::new(Company::default());
        let hooks = SubmitHooks::new()
            .on_changed(|_| calls.borrow_mut().push("changed"))
            .success_message(Some("Event saved."))
            .on_finished(|result| {
                assert_eq!(result["venue"], json!("Park"));
                calls.borrow_mut().push("finished");
            });

        let outcome = form.submit(&api, "events/5/", &mut context, hooks).await;

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(calls.into_inner(), vec!["changed", "finished"]);
        assert_eq!(context.message(), Some("Event saved."));
        assert_eq!(form.phase(), FormPhase::Closed);
    }

    #[actix_web::test]
    async fn prefill_submits_every_field() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .withf(|_, body, _| {
                *body == Some(json!({"name": "Fete", "venue": "Hall", "published": false}))
            })
            .returning(|_, _, _| Ok(ApiResponse::new(201, json!({"id": 5}))));

        let mut form = event_form()
            .with_initial(initial(json!({"id": 5, "name": "Fete", "venue": "Hall", "published": false})))
            .prefill();
        form.apply_submission(&posted(&[("name", "Fete"), ("venue", "Hall")]));

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "events/5/", &mut context, SubmitHooks::new())
            .await;
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    }

    #[actix_web::test]
    async fn server_validation_errors_map_onto_fields() {
        let mut api = MockApi::new();
        api.expect_post().times(1).returning(|_, _, _| {
            Ok(ApiResponse::new(
                400,
                json!({"detail": [
                    {"loc": ["body", "name"], "msg": "Name already taken"},
                    {"field": "venue", "message": "Unknown venue"}
                ]}),
            ))
        });

        let mut form = event_form();
        form.apply_submission(&posted(&[("name", "Fete"), ("venue", "Moon")]));

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "events/", &mut context, SubmitHooks::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert_eq!(form.error("name"), Some("Name already taken"));
        assert_eq!(form.error("venue"), Some("Unknown venue"));
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(context.error().is_none());
    }

    #[actix_web::test]
    async fn unmapped_conflict_goes_to_the_shared_error() {
        let mut api = MockApi::new();
        api.expect_post().times(1).returning(|_, _, _| {
            Ok(ApiResponse::new(409, json!({"detail": "Event already exists"})))
        });

        let mut form = event_form();
        form.apply_submission(&posted(&[("name", "Fete")]));

        let mut context = SharedContext::new(Company::default());
        form.submit(&api, "events/", &mut context, SubmitHooks::new())
            .await;

        assert!(form.errors().is_empty());
        assert_eq!(context.error(), Some("Event already exists"));
    }

    #[actix_web::test]
    async fn transport_failures_go_to_the_shared_error() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .returning(|path, _, _| Err(ApiError::from_status(500, path, None)));

        let mut form = event_form();
        form.apply_submission(&posted(&[("name", "Fete")]));

        let mut context = SharedContext::new(Company::default());
        let outcome = form
            .submit(&api, "events/", &mut context, SubmitHooks::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(err) if err.status == Some(500)));
        assert!(context.has_error());
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn view_echoes_rejected_input_and_marks_selection() {
        let mut form = FormEngine::new(vec![
            Field::new("quantity", FieldType::Integer).min(1.0),
            Field::new("tier", FieldType::Select)
                .choices([Choice::new("std", "Standard"), Choice::new("vip", "VIP")]),
        ])
        .unwrap();
        form.apply_submission(&posted(&[("quantity", "lots"), ("tier", "vip")]));

        let view = form.view("book", "Book tickets");
        assert_eq!(view.fields[0].value, "lots");
        assert!(view.fields[0].error.is_some());
        assert!(view.fields[1].choices[1].selected);
        assert!(!view.fields[1].choices[0].selected);
    }
}
