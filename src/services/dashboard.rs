//! Generic list/detail pages of the administrative dashboard.

use serde::Serialize;

use crate::api::{Api, ApiErrorKind, UploadFile};
use crate::domain::context::SharedContext;
use crate::domain::entity::Entity;
use crate::domain::types::EntityId;
use crate::forms::engine::FormEngine;
use crate::pages::{ActionButton, FormSlot, PageConfig};
use crate::render::detail::{ButtonView, DetailView, Panel, build_detail_view};
use crate::render::list::{ListOptions, ListView, build_list_view};
use crate::routing::location::Location;
use crate::services::loader::{
    Submitted, fetch_collection, fetch_entity, form_view_for, submit_dialog,
};
use crate::services::{ServiceError, ServiceResult};

/// Statuses an action endpoint may answer with.
pub const ACTION_EXPECTED: &[u16] = &[200, 201, 204];

/// A dialog form that was rejected, shown again in place of a fresh one.
pub type Rejected = (FormSlot, FormEngine);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageView {
    List(ListView),
    Detail(DetailView),
    /// The fetch failed; the reason is in the shared error slot.
    Unavailable,
}

#[derive(Debug)]
pub enum FormResult {
    Redirect(String),
    Rerender(PageView),
}

/// Collection page, including the "add" dialog.
pub async fn load_list<A>(
    api: &A,
    page: &PageConfig,
    location: &Location,
    context: &mut SharedContext,
    rejected: Option<&Rejected>,
) -> ServiceResult<Option<ListView>>
where
    A: Api + ?Sized,
{
    let current_page = location.page();
    let query = page.filters.clone().with("page", current_page);

    let Some(collection) =
        fetch_collection(api, &page.endpoint, &page.items_key, &query, context).await?
    else {
        return Ok(None);
    };

    let mut view = build_list_view(
        &collection,
        current_page,
        &ListOptions {
            title: &page.title,
            formats: &page.list_formats,
            row_link: &page.row_link,
            empty_message: &page.empty_message,
        },
    );

    let base = page.kind.list_path();
    view.add_form = page
        .form(&FormSlot::Add)
        .map(|config| form_view_for(config, None, rejected, &base, location))
        .transpose()?;

    Ok(Some(view))
}

/// Detail page of an already fetched entity.
pub async fn detail_view<A>(
    api: &A,
    page: &PageConfig,
    entity: &Entity,
    location: &Location,
    context: &mut SharedContext,
    rejected: Option<&Rejected>,
) -> ServiceResult<DetailView>
where
    A: Api + ?Sized,
{
    let id = entity.id().ok_or(ServiceError::NotFound)?;
    let base = page.detail_path(id);

    let mut view = build_detail_view(entity, &page.detail_formats, &base);

    if let Some(pre) = page.pre {
        view.banners = pre(entity);
    }

    view.buttons = page
        .buttons
        .iter()
        .map(|button| match button {
            ActionButton::Link { label, href } => ButtonView {
                label: label.clone(),
                href: entity.fill(href),
                confirm: None,
            },
            ActionButton::Action {
                slug,
                label,
                confirm,
                ..
            } => ButtonView {
                label: label.clone(),
                href: format!("{base}actions/{slug}/"),
                confirm: Some(confirm.clone()),
            },
        })
        .collect();

    for panel in &page.panels {
        let endpoint = entity.fill(&panel.endpoint);
        let collection = match fetch_collection(
            api,
            &endpoint,
            &panel.items_key,
            &Default::default(),
            context,
        )
        .await
        {
            Ok(Some(collection)) => collection,
            Ok(None) => continue,
            Err(ServiceError::Unauthorized) => return Err(ServiceError::Unauthorized),
            Err(err) => {
                log::warn!("Skipping panel {}: {err}", panel.title);
                continue;
            }
        };
        view.panels.push(Panel {
            list: build_list_view(
                &collection,
                1,
                &ListOptions {
                    title: &panel.title,
                    formats: &panel.formats,
                    row_link: &panel.row_link,
                    empty_message: &panel.empty_message,
                },
            ),
        });
    }

    view.forms = page
        .forms
        .iter()
        .filter(|config| config.slot != FormSlot::Add)
        .map(|config| form_view_for(config, Some(entity), rejected, &base, location))
        .collect::<ServiceResult<Vec<_>>>()?;

    view.upload = page.upload.as_ref().map(|_| format!("{base}upload/"));

    Ok(view)
}

/// Fetches and renders one entity.
pub async fn load_detail<A>(
    api: &A,
    page: &PageConfig,
    id: EntityId,
    location: &Location,
    context: &mut SharedContext,
) -> ServiceResult<Option<DetailView>>
where
    A: Api + ?Sized,
{
    let Some(entity) = fetch_entity(api, &page.detail_endpoint(id), context).await? else {
        return Ok(None);
    };
    detail_view(api, page, &entity, location, context, None)
        .await
        .map(Some)
}

/// Identifier in the path, or `None` on the list route. Paths that are
/// neither are not found.
fn route_id(page: &PageConfig, location: &Location) -> ServiceResult<Option<EntityId>> {
    let list_path = page.kind.list_path();
    let tail = location
        .path()
        .strip_prefix(&list_path)
        .ok_or(ServiceError::NotFound)?;

    if tail.is_empty() || tail == "add/" {
        return Ok(None);
    }
    location
        .entity_id(&list_path)
        .map(Some)
        .ok_or(ServiceError::NotFound)
}

/// List or detail page, whichever the path addresses.
pub async fn load_page<A>(
    api: &A,
    page: &PageConfig,
    location: &Location,
    context: &mut SharedContext,
) -> ServiceResult<PageView>
where
    A: Api + ?Sized,
{
    let view = match route_id(page, location)? {
        None => load_list(api, page, location, context, None)
            .await?
            .map(PageView::List),
        Some(id) => load_detail(api, page, id, location, context)
            .await?
            .map(PageView::Detail),
    };
    Ok(view.unwrap_or(PageView::Unavailable))
}

/// Handles a POST to the dialog route in `location`.
pub async fn submit_form<A>(
    api: &A,
    page: &PageConfig,
    location: &Location,
    posted: &[(String, String)],
    context: &mut SharedContext,
) -> ServiceResult<FormResult>
where
    A: Api + ?Sized,
{
    let id = route_id(page, location)?;
    let config = page
        .form_at(location.path(), id.map(EntityId::get))
        .ok_or(ServiceError::NotFound)?;

    let entity = match id {
        Some(id) => match fetch_entity(api, &page.detail_endpoint(id), context).await? {
            Some(entity) => Some(entity),
            None => return Ok(FormResult::Redirect(location.uri())),
        },
        None => None,
    };

    let base = match id {
        Some(id) => page.detail_path(id),
        None => page.kind.list_path(),
    };

    let engine = match submit_dialog(
        api,
        config,
        entity.as_ref(),
        &base,
        location,
        posted,
        context,
    )
    .await?
    {
        Submitted::Redirect(target) => return Ok(FormResult::Redirect(target)),
        Submitted::Rejected(engine) => engine,
    };

    let rejected = (config.slot.clone(), engine);
    let view = match entity {
        Some(entity) => PageView::Detail(
            detail_view(api, page, &entity, location, context, Some(&rejected)).await?,
        ),
        None => load_list(api, page, location, context, Some(&rejected))
            .await?
            .map_or(PageView::Unavailable, PageView::List),
    };
    Ok(FormResult::Rerender(view))
}

/// Runs a confirm-gated action and returns where to go next.
pub async fn run_action<A>(
    api: &A,
    page: &PageConfig,
    id: EntityId,
    slug: &str,
    context: &mut SharedContext,
) -> ServiceResult<String>
where
    A: Api + ?Sized,
{
    let Some(ActionButton::Action {
        endpoint,
        redirect,
        success_message,
        ..
    }) = page.action(slug)
    else {
        return Err(ServiceError::NotFound);
    };

    let endpoint = endpoint.replace("{id}", &id.to_string());
    match api.post(&endpoint, None, ACTION_EXPECTED).await {
        Ok(_) => {
            log::info!("Ran {slug} on {} {id}", page.kind);
            if let Some(message) = success_message {
                context.set_message(message.clone());
            }
            Ok(redirect.clone().unwrap_or_else(|| page.detail_path(id)))
        }
        Err(err) if err.is_unauthenticated() => Err(ServiceError::Unauthorized),
        Err(err) => {
            log::error!("Failed to run {slug} on {} {id}: {err}", page.kind);
            context.set_error(err.message);
            Ok(page.detail_path(id))
        }
    }
}

/// Forwards an image to the page's upload endpoint.
pub async fn upload_image<A>(
    api: &A,
    page: &PageConfig,
    id: EntityId,
    file: UploadFile,
    context: &mut SharedContext,
) -> ServiceResult<String>
where
    A: Api + ?Sized,
{
    let endpoint = page
        .upload
        .as_ref()
        .ok_or(ServiceError::NotFound)?
        .replace("{id}", &id.to_string());

    match api.upload(&endpoint, file).await {
        Ok(_) => context.set_message("Image uploaded."),
        Err(err) => match err.kind() {
            ApiErrorKind::Unauthenticated => return Err(ServiceError::Unauthorized),
            ApiErrorKind::PayloadTooLarge => {
                context.set_error("The image is too large. Please choose a smaller file.")
            }
            _ => {
                log::error!("Failed to upload image for {} {id}: {err}", page.kind);
                context.set_error(err.message);
            }
        },
    }

    Ok(page.detail_path(id))
}
