use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::courses::queries::find_course;
use crate::errors::AppError;
use crate::models::portfolio::Category;
use crate::notifications::{dispatch, DomainEvent};
use crate::policy;
use crate::portfolio::endorsement;
use crate::portfolio::lifecycle::{self, ItemBundle};
use crate::portfolio::validation::{self, ItemForm, UploadedFile};
use crate::portfolio::visibility;
use crate::portfolio::witness::Witness;
use crate::state::AppState;

/// Item projection returned by every item endpoint.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub title: String,
    pub description: String,
    pub github_link: Option<String>,
    pub course_code: Option<String>,
    pub cert_title: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub cert_file: Option<String>,
    pub public_token: String,
    pub is_public: bool,
    pub validated_by_faculty: bool,
    pub validated_by_name: Option<String>,
    pub witnesses: Vec<Witness>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemResponse {
    fn from_bundle(bundle: ItemBundle) -> Self {
        let ItemBundle {
            item,
            link,
            skills,
            witnesses,
        } = bundle;
        ItemResponse {
            id: item.id,
            owner_id: item.owner_id,
            category: item.category,
            title: item.title,
            description: item.description,
            github_link: item.github_link,
            course_code: item.course_code,
            cert_title: item.cert_title,
            issue_date: item.issue_date,
            cert_file: item.cert_file,
            public_token: item.public_token,
            is_public: link.map(|l| l.is_active).unwrap_or(false),
            validated_by_faculty: item.validated_by_faculty,
            validated_by_name: item.validated_by_name,
            witnesses,
            skills,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Collects the multipart body into an `ItemForm`. Unknown parts are skipped.
async fn read_form(mut multipart: Multipart) -> Result<ItemForm, AppError> {
    fn bad_part(e: impl std::fmt::Display) -> AppError {
        AppError::Validation(format!("Malformed multipart body: {e}"))
    }

    let mut form = ItemForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cert_file" => {
                let filename = field.file_name().unwrap_or("certificate").to_string();
                let data = field.bytes().await.map_err(bad_part)?;
                form.cert_file = Some(UploadedFile { filename, data });
            }
            "skills" => {
                let value = field.text().await.map_err(bad_part)?;
                form.skills.get_or_insert_with(Vec::new).push(value);
            }
            "owner_id" => {
                let value = field.text().await.map_err(bad_part)?;
                let id = Uuid::parse_str(value.trim())
                    .map_err(|_| AppError::Validation("owner_id must be a UUID".to_string()))?;
                form.owner_id = Some(id);
            }
            "issue_date" => {
                let value = field.text().await.map_err(bad_part)?;
                let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                    AppError::Validation("issue_date must be formatted YYYY-MM-DD".to_string())
                })?;
                form.issue_date = Some(date);
            }
            "title" => form.title = Some(field.text().await.map_err(bad_part)?),
            "description" => form.description = Some(field.text().await.map_err(bad_part)?),
            "category" => form.category = Some(field.text().await.map_err(bad_part)?),
            "github_link" => form.github_link = Some(field.text().await.map_err(bad_part)?),
            "course_code" => form.course_code = Some(field.text().await.map_err(bad_part)?),
            "cert_title" => form.cert_title = Some(field.text().await.map_err(bad_part)?),
            _ => {}
        }
    }
    Ok(form)
}

/// POST /api/v1/portfolio-items
pub async fn handle_create_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ItemResponse>, AppError> {
    let form = read_form(multipart).await?;

    // Creating on someone else's behalf is not a thing.
    if let Some(owner_id) = form.owner_id {
        policy::require_owner(&caller, owner_id)?;
    }

    let fields = validation::validate_fields(&form)?;
    validation::require_cert_file_on_create(&fields, form.cert_file.is_some())?;
    let skills = validation::normalize_skills(form.skills.as_deref().unwrap_or(&[]));

    let cert_key = match (&fields.category, &form.cert_file) {
        (Category::Microcredential, Some(file)) => Some(
            state
                .files
                .save(file.data.to_vec(), &file.filename)
                .await?,
        ),
        _ => None,
    };

    let item = lifecycle::insert_item(&state.db, caller.id, &fields, cert_key, &skills).await?;

    // A project submitted under a known course notifies the course's creator.
    let mut events = Vec::new();
    if fields.category == Category::Project {
        if let Some(code) = &fields.course_code {
            if let Some(course) = find_course(&state.db, code).await? {
                events.push(DomainEvent::ProjectSubmitted {
                    course_creator: course.created_by,
                    student_id: caller.id,
                    student_name: caller.display_name.clone(),
                    item_id: item.id,
                });
            }
        }
    }
    dispatch(state.notifier.as_ref(), &events).await;

    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// GET /api/v1/portfolio-items/:id
pub async fn handle_get_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = lifecycle::load_item(&state.db, id).await?;
    policy::require_owner_or_staff(&caller, item.owner_id)?;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// GET /api/v1/users/:id/portfolio-items
pub async fn handle_list_user_items(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    policy::require_owner_or_staff(&caller, user_id)?;
    let bundles = lifecycle::load_user_bundles(&state.db, user_id).await?;
    Ok(Json(
        bundles.into_iter().map(ItemResponse::from_bundle).collect(),
    ))
}

/// PUT /api/v1/portfolio-items/:id
pub async fn handle_update_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ItemResponse>, AppError> {
    let form = read_form(multipart).await?;
    let mut item = lifecycle::load_item(&state.db, id).await?;
    policy::require_owner(&caller, item.owner_id)?;

    // Validate first; a rejected update leaves the stored item untouched.
    let fields = validation::validate_fields(&form)?;
    validation::apply_update(&mut item, &fields, Utc::now());

    if fields.category == Category::Microcredential {
        if let Some(file) = &form.cert_file {
            item.cert_file = Some(
                state
                    .files
                    .save(file.data.to_vec(), &file.filename)
                    .await?,
            );
        }
    }

    let skills = form
        .skills
        .as_deref()
        .map(validation::normalize_skills);
    lifecycle::persist_update(&state.db, &item, skills.as_deref()).await?;

    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// DELETE /api/v1/portfolio-items/:id
pub async fn handle_delete_item(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let item = lifecycle::load_item(&state.db, id).await?;
    policy::require_owner(&caller, item.owner_id)?;
    lifecycle::delete_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct VisibilityQuery {
    #[serde(alias = "isPublic")]
    pub is_public: bool,
}

/// PATCH /api/v1/portfolio-items/:id/visibility
pub async fn handle_set_visibility(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = lifecycle::load_item(&state.db, id).await?;
    policy::require_owner(&caller, item.owner_id)?;
    visibility::set_visibility(&state.db, id, query.is_public).await?;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// GET /api/v1/portfolio-items/public/:token — unauthenticated.
pub async fn handle_resolve_public(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = visibility::resolve_public(&state.db, &token).await?;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// PATCH /api/v1/portfolio-items/:id/validate
pub async fn handle_validate(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    policy::require_faculty(&caller)?;
    let mut item = lifecycle::load_item(&state.db, id).await?;
    let course = match &item.course_code {
        Some(code) => find_course(&state.db, code).await?,
        None => None,
    };
    let event = endorsement::validate_project(&mut item, &caller, course.as_ref())?;
    lifecycle::persist_validation(&state.db, &item).await?;
    dispatch(state.notifier.as_ref(), &[event]).await;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// PATCH /api/v1/portfolio-items/:id/unvalidate
pub async fn handle_unvalidate(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    policy::require_faculty(&caller)?;
    let mut item = lifecycle::load_item(&state.db, id).await?;
    let course = match &item.course_code {
        Some(code) => find_course(&state.db, code).await?,
        None => None,
    };
    let event = endorsement::unvalidate_project(&mut item, &caller, course.as_ref())?;
    lifecycle::persist_validation(&state.db, &item).await?;
    dispatch(state.notifier.as_ref(), &[event]).await;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// PATCH /api/v1/portfolio-items/:id/witness
pub async fn handle_witness(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    policy::require_faculty(&caller)?;
    let item = lifecycle::load_item(&state.db, id).await?;
    let mut witnesses = lifecycle::load_witnesses(&state.db, id).await?;
    let event = endorsement::witness_microcredential(&item, &mut witnesses, &caller)?;
    lifecycle::insert_witness(&state.db, id, caller.id, &caller.display_name).await?;
    dispatch(state.notifier.as_ref(), &[event]).await;
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}

/// PATCH /api/v1/portfolio-items/:id/unwitness
pub async fn handle_unwitness(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    policy::require_faculty(&caller)?;
    let item = lifecycle::load_item(&state.db, id).await?;
    let mut witnesses = lifecycle::load_witnesses(&state.db, id).await?;
    let event = endorsement::unwitness_microcredential(&item, &mut witnesses, &caller)?;
    if let Some(event) = event {
        lifecycle::delete_witness(&state.db, id, caller.id).await?;
        dispatch(state.notifier.as_ref(), &[event]).await;
    }
    let bundle = lifecycle::load_bundle(&state.db, item).await?;
    Ok(Json(ItemResponse::from_bundle(bundle)))
}
