//! Per-entity page configurations composed onto the generic renderers.
//!
//! Each entity type is a value, not a subtype: endpoints, formats, buttons,
//! forms and panels are data the dashboard services interpret.

use std::fmt;
use std::str::FromStr;

use crate::api::QueryArgs;
use crate::domain::company::Company;
use crate::domain::entity::Entity;
use crate::forms::FormError;
use crate::forms::engine::FormEngine;
use crate::forms::field::{Choice, Field};
use crate::render::format::FormatMap;
use crate::render::list::DEFAULT_ROW_LINK;
use crate::routing::modal::{ModalMode, ModalRoute};

pub mod categories;
pub mod donations;
pub mod email_templates;
pub mod events;
pub mod public;
pub mod users;

/// Prefix of every dashboard route.
pub const DASHBOARD: &str = "/dashboard";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Events,
    Categories,
    Users,
    Donations,
    EmailTemplates,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Events,
        PageKind::Categories,
        PageKind::Users,
        PageKind::Donations,
        PageKind::EmailTemplates,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            PageKind::Events => "events",
            PageKind::Categories => "categories",
            PageKind::Users => "users",
            PageKind::Donations => "donations",
            PageKind::EmailTemplates => "email-templates",
        }
    }

    /// Navigation label.
    pub fn title(self) -> &'static str {
        match self {
            PageKind::Events => "Events",
            PageKind::Categories => "Categories",
            PageKind::Users => "Users",
            PageKind::Donations => "Donations",
            PageKind::EmailTemplates => "Email templates",
        }
    }

    /// `/dashboard/<slug>/`
    pub fn list_path(self) -> String {
        format!("{DASHBOARD}/{}/", self.slug())
    }

    pub fn config(self) -> PageConfig {
        match self {
            PageKind::Events => events::page(),
            PageKind::Categories => categories::page(),
            PageKind::Users => users::page(),
            PageKind::Donations => donations::page(),
            PageKind::EmailTemplates => email_templates::page(),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownPage(pub String);

impl FromStr for PageKind {
    type Err = UnknownPage;

    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == slug)
            .ok_or_else(|| UnknownPage(slug.to_string()))
    }
}

/// Where a form's dialog lives relative to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormSlot {
    /// `<list>/add/`
    Add,
    /// `<detail>/edit/`
    Edit,
    /// `<detail>/<name>/edit/`, editing a single field.
    Nested(String),
    /// `<base><name>/`, a page-specific dialog such as booking.
    Named(String),
}

impl FormSlot {
    pub fn slug(&self) -> String {
        match self {
            FormSlot::Add => "add".to_string(),
            FormSlot::Edit => "edit".to_string(),
            FormSlot::Nested(name) => format!("{name}-edit"),
            FormSlot::Named(name) => name.clone(),
        }
    }

    /// Route suffix after the list (add) or detail (edit) path.
    pub fn suffix(&self) -> String {
        match self {
            FormSlot::Add => "add/".to_string(),
            FormSlot::Edit => "edit/".to_string(),
            FormSlot::Nested(name) => format!("{name}/edit/"),
            FormSlot::Named(name) => format!("{name}/"),
        }
    }

    /// Regex binding the dialog to its route. `base` is the list path for
    /// add forms and the detail path otherwise.
    pub fn route(&self, base: &str) -> Result<ModalRoute, regex::Error> {
        match self {
            FormSlot::Add => ModalRoute::for_mode(ModalMode::Add),
            other => ModalRoute::anchored(base, &other.suffix()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormConfig {
    pub slot: FormSlot,
    pub title: String,
    pub fields: Vec<Field>,
    /// Backend path; `{key}` placeholders are filled from the entity.
    pub endpoint: String,
    pub allow_empty: bool,
    pub prefill: bool,
    /// The entity only fills the endpoint; the form starts empty.
    pub blank: bool,
    pub success_message: Option<String>,
    pub submit_label: String,
}

impl FormConfig {
    pub fn new(slot: FormSlot, title: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            slot,
            title: title.into(),
            fields: Vec::new(),
            endpoint: endpoint.into(),
            allow_empty: false,
            prefill: false,
            blank: false,
            success_message: None,
            submit_label: "Save".to_string(),
        }
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn prefill(mut self) -> Self {
        self.prefill = true;
        self
    }

    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// A fresh engine over `initial`, or over nothing for add and blank forms.
    pub fn engine(&self, initial: Option<&Entity>) -> Result<FormEngine, FormError> {
        let initial = initial
            .filter(|_| !self.blank)
            .map(|entity| entity.as_map().clone())
            .unwrap_or_default();
        let engine = FormEngine::new(self.fields.clone())?
            .with_initial(initial)
            .allow_empty(self.allow_empty);
        Ok(if self.prefill { engine.prefill() } else { engine })
    }

    pub fn endpoint_for(&self, entity: Option<&Entity>) -> String {
        match entity {
            Some(entity) => entity.fill(&self.endpoint),
            None => self.endpoint.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionButton {
    /// Plain navigation; `href` may carry `{key}` placeholders.
    Link { label: String, href: String },
    /// Confirm-gated POST to a backend endpoint.
    Action {
        slug: String,
        label: String,
        endpoint: String,
        confirm: String,
        /// Where to go afterwards; the detail page when absent.
        redirect: Option<String>,
        success_message: Option<String>,
    },
}

impl ActionButton {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        ActionButton::Link {
            label: label.into(),
            href: href.into(),
        }
    }

    pub fn action(
        slug: impl Into<String>,
        label: impl Into<String>,
        endpoint: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        ActionButton::Action {
            slug: slug.into(),
            label: label.into(),
            endpoint: endpoint.into(),
            confirm: confirm.into(),
            redirect: None,
            success_message: None,
        }
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        if let ActionButton::Action { redirect, .. } = &mut self {
            *redirect = Some(target.into());
        }
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        if let ActionButton::Action {
            success_message, ..
        } = &mut self
        {
            *success_message = Some(message.into());
        }
        self
    }

    pub fn label(&self) -> &str {
        match self {
            ActionButton::Link { label, .. } | ActionButton::Action { label, .. } => label,
        }
    }
}

/// A sub-collection listed on a detail page.
#[derive(Clone, Debug)]
pub struct PanelConfig {
    pub title: String,
    /// Backend path with `{key}` placeholders filled from the parent.
    pub endpoint: String,
    pub items_key: String,
    pub formats: FormatMap,
    pub row_link: String,
    pub empty_message: String,
}

impl PanelConfig {
    pub fn new(title: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            endpoint: endpoint.into(),
            items_key: "items".to_string(),
            formats: FormatMap::new(),
            row_link: DEFAULT_ROW_LINK.to_string(),
            empty_message: "Nothing here yet.".to_string(),
        }
    }

    pub fn formats(mut self, formats: FormatMap) -> Self {
        self.formats = formats;
        self
    }

    pub fn row_link(mut self, row_link: impl Into<String>) -> Self {
        self.row_link = row_link.into();
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }
}

/// Contextual banners for an entity, e.g. "not yet published".
pub type PreHook = fn(&Entity) -> Vec<String>;

#[derive(Clone, Debug)]
pub struct PageConfig {
    pub kind: PageKind,
    pub title: String,
    /// Collection endpoint; detail is `<endpoint><id>/`.
    pub endpoint: String,
    pub items_key: String,
    pub list_formats: FormatMap,
    pub detail_formats: FormatMap,
    pub row_link: String,
    pub empty_message: String,
    pub buttons: Vec<ActionButton>,
    pub forms: Vec<FormConfig>,
    pub panels: Vec<PanelConfig>,
    pub pre: Option<PreHook>,
    /// Extra query arguments sent with every list request.
    pub filters: QueryArgs,
    /// Image upload endpoint with `{key}` placeholders.
    pub upload: Option<String>,
}

impl PageConfig {
    pub fn new(kind: PageKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            endpoint: format!("{}/", kind.slug()),
            items_key: "items".to_string(),
            list_formats: FormatMap::new(),
            detail_formats: FormatMap::new(),
            row_link: DEFAULT_ROW_LINK.to_string(),
            empty_message: "Nothing here yet.".to_string(),
            buttons: Vec::new(),
            forms: Vec::new(),
            panels: Vec::new(),
            pre: None,
            filters: QueryArgs::new(),
            upload: None,
        }
    }

    pub fn detail_endpoint(&self, id: impl fmt::Display) -> String {
        format!("{}{id}/", self.endpoint)
    }

    pub fn detail_path(&self, id: impl fmt::Display) -> String {
        format!("{}{id}/", self.kind.list_path())
    }

    pub fn form(&self, slot: &FormSlot) -> Option<&FormConfig> {
        self.forms.iter().find(|form| &form.slot == slot)
    }

    /// The form whose dialog route matches `path`, if any.
    pub fn form_at(&self, path: &str, id: Option<i64>) -> Option<&FormConfig> {
        self.forms.iter().find(|form| {
            let base = match (&form.slot, id) {
                (FormSlot::Add, None) => self.kind.list_path(),
                (FormSlot::Add, Some(_)) | (_, None) => return false,
                (_, Some(id)) => self.detail_path(id),
            };
            form.slot
                .route(&base)
                .is_ok_and(|route| route.is_match(path))
        })
    }

    /// Fills category selects from the company's category list.
    pub fn with_company(mut self, company: &Company) -> Self {
        let choices = company
            .categories
            .iter()
            .map(|category| Choice::new(category.id.get(), category.name.clone()))
            .collect::<Vec<_>>();
        for form in &mut self.forms {
            for field in &mut form.fields {
                if field.name == events::CATEGORY_FIELD && field.choices.is_empty() {
                    field.choices = choices.clone();
                }
            }
        }
        self
    }

    pub fn action(&self, slug: &str) -> Option<&ActionButton> {
        self.buttons.iter().find(
            |button| matches!(button, ActionButton::Action { slug: action, .. } if action == slug),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_slugs() {
        for kind in PageKind::ALL {
            assert_eq!(kind.slug().parse::<PageKind>(), Ok(kind));
            assert_eq!(kind.config().kind, kind);
        }
        assert!("tickets".parse::<PageKind>().is_err());
        assert_eq!(PageKind::EmailTemplates.list_path(), "/dashboard/email-templates/");
    }

    #[test]
    fn every_page_builds_valid_forms() {
        for kind in PageKind::ALL {
            for form in kind.config().forms {
                assert!(form.engine(None).is_ok(), "{kind}: {}", form.title);
                assert!(form.slot.route("/dashboard/x/1/").is_ok());
            }
        }
    }

    #[test]
    fn form_at_picks_the_dialog_matching_the_path() {
        let page = PageKind::Events.config();

        let add = page.form_at("/dashboard/events/add/", None);
        assert_eq!(add.map(|form| &form.slot), Some(&FormSlot::Add));

        let edit = page.form_at("/dashboard/events/5/edit/", Some(5));
        assert_eq!(edit.map(|form| &form.slot), Some(&FormSlot::Edit));

        let nested = page.form_at("/dashboard/events/5/description/edit/", Some(5));
        assert_eq!(
            nested.map(|form| &form.slot),
            Some(&FormSlot::Nested("description".to_string()))
        );

        assert!(page.form_at("/dashboard/events/5/", Some(5)).is_none());
        assert!(page.form_at("/dashboard/events/5/edit/", Some(6)).is_none());
    }

    #[test]
    fn category_selects_use_company_categories() {
        let mut company = Company::named("Fete Co");
        company.categories = vec![crate::domain::company::Category {
            id: crate::domain::types::EntityId::new(3).unwrap(),
            name: "Music".to_string(),
        }];

        let page = PageKind::Events.config().with_company(&company);
        let form = page.form(&FormSlot::Add).unwrap();
        let field = form
            .fields
            .iter()
            .find(|field| field.name == events::CATEGORY_FIELD)
            .unwrap();
        assert_eq!(field.choices, vec![Choice::new(3, "Music")]);
    }
}
