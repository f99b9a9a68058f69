use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::dict_detail::{DictDetailForm, DictDetailQueryCriteria};
use crate::models::page::{Page, PageParams, Pageable};
use crate::repository::DictDetailRepository;

type Repo = web::Data<dyn DictDetailRepository>;

fn validated(form: &DictDetailForm) -> Result<DictDetailForm, AppError> {
    let form = DictDetailForm {
        dict_name: form.dict_name.trim().to_string(),
        label: form.label.trim().to_string(),
        value: form.value.trim().to_string(),
        dict_sort: form.dict_sort,
    };
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(form)
}

/// GET /api/dict-details?dict_name=user_status&label=Act&page=1
pub async fn list(
    repo: Repo,
    criteria: web::Query<DictDetailQueryCriteria>,
    params: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let pageable = Pageable::from(&*params);
    let (details, total) = repo.find_page(&criteria.to_filter(), &pageable).await?;
    Ok(HttpResponse::Ok().json(Page::new(details, total, &pageable)))
}

/// GET /api/dict-details/by-name/{name}
pub async fn by_dict_name(
    repo: Repo,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let details = repo.find_by_dict_name(&path).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// POST /api/dict-details
pub async fn create(
    repo: Repo,
    body: web::Json<DictDetailForm>,
) -> Result<HttpResponse, AppError> {
    let form = validated(&body)?;
    let id = repo.create(&form).await?;
    log::info!("Created dictionary detail {id} in '{}'", form.dict_name);
    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}

/// PUT /api/dict-details/{id}
pub async fn update(
    repo: Repo,
    path: web::Path<i64>,
    body: web::Json<DictDetailForm>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let form = validated(&body)?;
    if !repo.update(id, &form).await? {
        return Err(AppError::not_found("Dictionary detail", id));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/dict-details/{id}
pub async fn delete(
    repo: Repo,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !repo.delete(id).await? {
        return Err(AppError::not_found("Dictionary detail", id));
    }
    log::info!("Deleted dictionary detail {id}");
    Ok(HttpResponse::NoContent().finish())
}
