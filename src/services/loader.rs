//! Fetching and form plumbing shared by the dashboard and public services.

use crate::api::{Api, ApiError, ApiErrorKind, QueryArgs};
use crate::domain::context::SharedContext;
use crate::domain::entity::{Collection, Entity};
use crate::forms::engine::{FormEngine, FormView, SubmitHooks, SubmitOutcome};
use crate::pages::{FormConfig, FormSlot};
use crate::routing::location::Location;
use crate::routing::modal::ModalState;
use crate::services::{ServiceError, ServiceResult};

/// Outcome of posting a dialog form.
#[derive(Debug)]
pub enum Submitted {
    /// Saved; navigate here.
    Redirect(String),
    /// Show the page again with this form open and its errors.
    Rejected(FormEngine),
}

/// Not-found and unauthenticated abort the page; anything else lands in the
/// shared error slot and the caller renders what it can.
pub fn route_error<T>(err: ApiError, context: &mut SharedContext) -> ServiceResult<Option<T>> {
    match err.kind() {
        ApiErrorKind::NotFound | ApiErrorKind::Unauthenticated => Err(err.into()),
        _ => {
            log::error!("Backend request failed: {err}");
            context.set_error(err.message);
            Ok(None)
        }
    }
}

pub async fn fetch_collection<A>(
    api: &A,
    endpoint: &str,
    items_key: &str,
    query: &QueryArgs,
    context: &mut SharedContext,
) -> ServiceResult<Option<Collection>>
where
    A: Api + ?Sized,
{
    match api.get(endpoint, query).await {
        Ok(response) => Ok(Some(Collection::from_value(response.body(), items_key)?)),
        Err(err) => route_error(err, context),
    }
}

pub async fn fetch_entity<A>(
    api: &A,
    endpoint: &str,
    context: &mut SharedContext,
) -> ServiceResult<Option<Entity>>
where
    A: Api + ?Sized,
{
    match api.get(endpoint, &QueryArgs::new()).await {
        Ok(response) => Ok(Some(Entity::from_value(response.into_body())?)),
        Err(err) => route_error(err, context),
    }
}

/// Template model of a dialog form mounted at `base`, open when the current
/// path matches its route.
pub fn form_view(
    config: &FormConfig,
    engine: &FormEngine,
    base: &str,
    location: &Location,
) -> ServiceResult<FormView> {
    let modal = ModalState::mount(config.slot.route(base)?, location.path());

    let mut view = engine.view(config.slot.slug(), &config.title);
    view.open = modal.shown();
    view.action = format!("{base}{}", config.slot.suffix());
    view.cancel = if modal.shown() {
        modal.close_target(None)
    } else {
        base.to_string()
    };
    view.submit_label = config.submit_label.clone();
    Ok(view)
}

/// The engine to display for `config`: the rejected one if it belongs to
/// this slot, a fresh one otherwise.
pub fn form_view_for(
    config: &FormConfig,
    entity: Option<&Entity>,
    rejected: Option<&(FormSlot, FormEngine)>,
    base: &str,
    location: &Location,
) -> ServiceResult<FormView> {
    match rejected {
        Some((slot, engine)) if *slot == config.slot => form_view(config, engine, base, location),
        _ => form_view(config, &config.engine(entity)?, base, location),
    }
}

/// Runs the form engine for a posted dialog and closes the dialog on
/// success. Add forms navigate to the created entity.
pub async fn submit_dialog<A>(
    api: &A,
    config: &FormConfig,
    entity: Option<&Entity>,
    base: &str,
    location: &Location,
    posted: &[(String, String)],
    context: &mut SharedContext,
) -> ServiceResult<Submitted>
where
    A: Api + ?Sized,
{
    let mut engine = config.engine(entity)?;
    engine.apply_submission(posted);

    let mut modal = ModalState::mount(config.slot.route(base)?, location.path());
    let carry_id = config.slot == FormSlot::Add;
    let endpoint = config.endpoint_for(entity);
    let mut target = None;

    let outcome = {
        let hooks = SubmitHooks::new()
            .on_changed(|result| {
                log::info!("Saved {} via {endpoint}", config.title);
                log::debug!("Backend returned {result}");
            })
            .success_message(config.success_message.clone())
            .on_finished(|result| {
                target = Some(modal.toggle(if carry_id { Some(result) } else { None }));
            });
        engine.submit(api, &endpoint, context, hooks).await
    };

    match outcome {
        SubmitOutcome::Saved(_) => Ok(Submitted::Redirect(
            target.unwrap_or_else(|| base.to_string()),
        )),
        SubmitOutcome::Failed(err) if err.is_unauthenticated() => Err(ServiceError::Unauthorized),
        SubmitOutcome::Invalid | SubmitOutcome::Failed(_) => Ok(Submitted::Rejected(engine)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ApiResponse;
    use crate::api::mock::MockApi;
    use crate::domain::company::Company;
    use crate::forms::field::Field;

    fn category_form() -> FormConfig {
        FormConfig::new(FormSlot::Add, "Add category", "categories/")
            .fields([Field::text("name").required()])
            .success_message("Category created.")
    }

    #[test]
    fn closed_dialog_points_at_its_route() {
        let config = category_form();
        let engine = config.engine(None).unwrap();

        let view = form_view(
            &config,
            &engine,
            "/dashboard/categories/",
            &Location::parse("/dashboard/categories/?page=2"),
        )
        .unwrap();
        assert!(!view.open);
        assert_eq!(view.action, "/dashboard/categories/add/");
        assert_eq!(view.cancel, "/dashboard/categories/");

        let view = form_view(
            &config,
            &engine,
            "/dashboard/categories/",
            &Location::parse("/dashboard/categories/add/"),
        )
        .unwrap();
        assert!(view.open);
    }

    #[actix_web::test]
    async fn saved_add_form_navigates_to_the_new_entity() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .withf(|path, body, _| {
                path.to_string() == "categories/" && *body == Some(json!({"name": "Music"}))
            })
            .returning(|_, _, _| Ok(ApiResponse::new(201, json!({"id": 17, "name": "Music"}))));

        let mut context = SharedContext::new(Company::default());
        let submitted = submit_dialog(
            &api,
            &category_form(),
            None,
            "/dashboard/categories/",
            &Location::parse("/dashboard/categories/add/"),
            &[("name".to_string(), "Music".to_string())],
            &mut context,
        )
        .await
        .unwrap();

        assert!(matches!(submitted, Submitted::Redirect(target) if target == "/dashboard/categories/17/"));
        assert_eq!(context.message(), Some("Category created."));
    }

    #[actix_web::test]
    async fn unauthenticated_submission_is_an_error() {
        let mut api = MockApi::new();
        api.expect_post()
            .times(1)
            .returning(|path, _, _| Err(ApiError::from_status(401, path, None)));

        let mut context = SharedContext::new(Company::default());
        let result = submit_dialog(
            &api,
            &category_form(),
            None,
            "/dashboard/categories/",
            &Location::parse("/dashboard/categories/add/"),
            &[("name".to_string(), "Music".to_string())],
            &mut context,
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn server_errors_are_routed_to_the_context() {
        let mut api = MockApi::new();
        api.expect_get()
            .times(1)
            .returning(|path, _| Err(ApiError::from_status(503, path, None)));

        let mut context = SharedContext::new(Company::default());
        let result = fetch_entity(&api, "events/1/", &mut context).await;

        assert!(matches!(result, Ok(None)));
        assert!(context.has_error());
    }
}
