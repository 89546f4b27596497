//! Visitor-facing pages: event browsing, booking and donations.

use serde::Serialize;

use crate::api::{Api, QueryArgs};
use crate::domain::context::SharedContext;
use crate::domain::entity::Entity;
use crate::domain::types::EntityId;
use crate::forms::engine::{FormEngine, FormView, SubmitHooks, SubmitOutcome};
use crate::pages::FormSlot;
use crate::pages::public::{
    DONATE_PATH, DONATION_OPTIONS_ENDPOINT, DONATION_OPTIONS_KEY, EVENT_LINK, EVENTS_ENDPOINT,
    EVENTS_ITEMS_KEY, book_form, donate_form, event_banners, event_detail_formats,
    event_list_formats, event_path,
};
use crate::render::detail::{DetailView, build_detail_view};
use crate::render::list::{ListOptions, ListView, build_list_view};
use crate::routing::location::Location;
use crate::services::loader::{
    Submitted, fetch_collection, fetch_entity, form_view_for, submit_dialog,
};
use crate::services::{ServiceError, ServiceResult};

const EVENTS_TITLE: &str = "Upcoming events";
const NO_EVENTS: &str = "There are no upcoming events. Please check back soon.";

#[derive(Debug, Serialize)]
pub struct DonateView {
    pub form: FormView,
}

/// Where a public form submission leads.
#[derive(Debug)]
pub enum PublicResult<T> {
    Redirect(String),
    /// Show the page again; `None` when it could not be loaded.
    Rerender(Option<T>),
}

pub async fn load_events<A>(
    api: &A,
    location: &Location,
    context: &mut SharedContext,
) -> ServiceResult<Option<ListView>>
where
    A: Api + ?Sized,
{
    let current_page = location.page();
    let query = QueryArgs::new().with("page", current_page);
    let Some(events) =
        fetch_collection(api, EVENTS_ENDPOINT, EVENTS_ITEMS_KEY, &query, context).await?
    else {
        return Ok(None);
    };

    Ok(Some(build_list_view(
        &events,
        current_page,
        &ListOptions {
            title: EVENTS_TITLE,
            formats: &event_list_formats(),
            row_link: EVENT_LINK,
            empty_message: NO_EVENTS,
        },
    )))
}

fn event_view(
    event: &Entity,
    location: &Location,
    rejected: Option<&FormEngine>,
) -> ServiceResult<DetailView> {
    let id = event.id().ok_or(ServiceError::NotFound)?;
    let base = event_path(id);

    let mut view = build_detail_view(event, &event_detail_formats(), &base);
    view.banners = event_banners(event);

    let config = book_form();
    let rejected = rejected.map(|engine| (config.slot.clone(), engine.clone()));
    view.forms = vec![form_view_for(
        &config,
        Some(event),
        rejected.as_ref(),
        &base,
        location,
    )?];
    Ok(view)
}

fn event_endpoint(id: EntityId) -> String {
    format!("{EVENTS_ENDPOINT}{id}/")
}

/// Event detail with the booking dialog, open on `/events/<id>/book/`.
pub async fn load_event<A>(
    api: &A,
    id: EntityId,
    location: &Location,
    context: &mut SharedContext,
) -> ServiceResult<Option<DetailView>>
where
    A: Api + ?Sized,
{
    match fetch_entity(api, &event_endpoint(id), context).await? {
        Some(event) => event_view(&event, location, None).map(Some),
        None => Ok(None),
    }
}

pub async fn book<A>(
    api: &A,
    id: EntityId,
    location: &Location,
    posted: &[(String, String)],
    context: &mut SharedContext,
) -> ServiceResult<PublicResult<DetailView>>
where
    A: Api + ?Sized,
{
    let Some(event) = fetch_entity(api, &event_endpoint(id), context).await? else {
        return Ok(PublicResult::Redirect(event_path(id)));
    };

    let config = book_form();
    let submitted = submit_dialog(
        api,
        &config,
        Some(&event),
        &event_path(id),
        location,
        posted,
        context,
    )
    .await?;

    match submitted {
        Submitted::Redirect(target) => Ok(PublicResult::Redirect(target)),
        Submitted::Rejected(engine) => Ok(PublicResult::Rerender(Some(event_view(
            &event,
            location,
            Some(&engine),
        )?))),
    }
}

fn donate_view(engine: &FormEngine, title: &str, submit_label: &str) -> DonateView {
    let mut form = engine.view(FormSlot::Named("donate".to_string()).slug(), title);
    form.open = true;
    form.action = DONATE_PATH.to_string();
    form.cancel = "/".to_string();
    form.submit_label = submit_label.to_string();
    DonateView { form }
}

/// Donation page listing the active donation options.
pub async fn load_donate<A>(
    api: &A,
    context: &mut SharedContext,
) -> ServiceResult<Option<DonateView>>
where
    A: Api + ?Sized,
{
    let Some(options) = fetch_collection(
        api,
        DONATION_OPTIONS_ENDPOINT,
        DONATION_OPTIONS_KEY,
        &QueryArgs::new(),
        context,
    )
    .await?
    else {
        return Ok(None);
    };

    let config = donate_form(&options);
    let engine = config.engine(None)?;
    Ok(Some(donate_view(&engine, &config.title, &config.submit_label)))
}

pub async fn donate<A>(
    api: &A,
    posted: &[(String, String)],
    context: &mut SharedContext,
) -> ServiceResult<PublicResult<DonateView>>
where
    A: Api + ?Sized,
{
    let Some(options) = fetch_collection(
        api,
        DONATION_OPTIONS_ENDPOINT,
        DONATION_OPTIONS_KEY,
        &QueryArgs::new(),
        context,
    )
    .await?
    else {
        return Ok(PublicResult::Redirect(DONATE_PATH.to_string()));
    };

    let config = donate_form(&options);
    let mut engine = config.engine(None)?;
    engine.apply_submission(posted);

    let hooks = SubmitHooks::new()
        .on_changed(|result| log::info!("Donation recorded: {result}"))
        .success_message(config.success_message.clone());
    match engine.submit(api, &config.endpoint, context, hooks).await {
        SubmitOutcome::Saved(_) => Ok(PublicResult::Redirect("/".to_string())),
        SubmitOutcome::Invalid | SubmitOutcome::Failed(_) => Ok(PublicResult::Rerender(Some(
            donate_view(&engine, &config.title, &config.submit_label),
        ))),
    }
}
