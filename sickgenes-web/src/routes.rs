//! Rotas HTTP do fluxo de identificação e inserção, e da curadoria de
//! estudos/coortes que recebem os achados

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use sickgenes_core::{
    create_cohort, create_study, decode, decode_cohort, decode_study, handle_kind, study_view, CoreError, EntityId,
    EntityKind, FindingRepository, GeneFindingType, MemoryStore, NewCohort, Outcome, Submission, WorkflowMode,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::views::{AddCohortPage, AddStudyPage, IndexPage, MatchPage};

/// Estado compartilhado da aplicação
pub struct AppState {
    pub store: MemoryStore,
}

#[derive(Debug, Deserialize)]
pub struct InsertQuery {
    #[serde(rename = "type")]
    finding_type: Option<String>,
}

impl InsertQuery {
    fn finding_type(&self) -> Result<Option<GeneFindingType>, AppError> {
        match self.finding_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => Ok(Some(GeneFindingType::from_code(code)?)),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/search/identify/:model_type", get(identify_page).post(identify_submit))
        .route("/manage/:cohort_id/:model_type/insert", get(insert_page).post(insert_submit))
        .route("/studies", get(study_list_handler))
        .route("/studies/:study_id", get(study_handler))
        .route("/manage/add_study", get(add_study_page).post(add_study_submit))
        .route("/manage/add_study_cohort/:study_id", get(add_cohort_page).post(add_cohort_submit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index_handler() -> Result<Html<String>, AppError> {
    Ok(Html(IndexPage::new().render()?))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn identify_page(
    State(state): State<Arc<AppState>>,
    Path(model_type): Path<String>,
) -> Result<Response, AppError> {
    run_round(state, &model_type, WorkflowMode::Identify, None).await
}

async fn identify_submit(
    State(state): State<Arc<AppState>>,
    Path(model_type): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    run_round(state, &model_type, WorkflowMode::Identify, Some(decode(&pairs))).await
}

async fn insert_page(
    State(state): State<Arc<AppState>>,
    Path((cohort_id, model_type)): Path<(EntityId, String)>,
    Query(query): Query<InsertQuery>,
) -> Result<Response, AppError> {
    let mode = WorkflowMode::Insert {
        cohort_id,
        finding_type: query.finding_type()?,
    };
    run_round(state, &model_type, mode, None).await
}

async fn insert_submit(
    State(state): State<Arc<AppState>>,
    Path((cohort_id, model_type)): Path<(EntityId, String)>,
    Query(query): Query<InsertQuery>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let mode = WorkflowMode::Insert {
        cohort_id,
        finding_type: query.finding_type()?,
    };
    run_round(state, &model_type, mode, Some(decode(&pairs))).await
}

/// Executa uma rodada fora do runtime async e converte o resultado em resposta.
async fn run_round(
    state: Arc<AppState>,
    model_type: &str,
    mode: WorkflowMode,
    submission: Option<Submission>,
) -> Result<Response, AppError> {
    let kind: EntityKind = model_type.parse()?;

    let outcome = tokio::task::spawn_blocking(move || handle_kind(&state.store, kind, mode, submission)).await??;

    match outcome {
        Outcome::Inserted { study_id, report } => {
            info!(
                study_id,
                inserted = report.inserted,
                already_present = report.already_present,
                "Inserção concluída, redirecionando"
            );
            Ok(Redirect::to(&format!("/studies/{}", study_id)).into_response())
        }
        Outcome::Render { state, resolved, cohort } => {
            let page = MatchPage::new(kind, mode, state, resolved, cohort);
            Ok(Html(page.render()?).into_response())
        }
    }
}

async fn study_handler(
    State(state): State<Arc<AppState>>,
    Path(study_id): Path<EntityId>,
) -> Result<Response, AppError> {
    let view = tokio::task::spawn_blocking(move || study_view(&state.store, study_id)).await??;
    match view {
        Some(view) => Ok(Json(view).into_response()),
        None => Err(AppError::NotFound(format!("Study {}", study_id))),
    }
}

async fn study_list_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let studies = tokio::task::spawn_blocking(move || state.store.studies()).await??;
    Ok(Json(studies).into_response())
}

async fn add_study_page() -> Result<Html<String>, AppError> {
    Ok(Html(AddStudyPage::blank().render()?))
}

async fn add_study_submit(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let draft = decode_study(&pairs);
    let attempt = draft.clone();
    let created = tokio::task::spawn_blocking(move || create_study(&state.store, attempt)).await?;

    match created {
        Ok(study) => Ok(Redirect::to(&format!("/studies/{}", study.id)).into_response()),
        Err(err @ (CoreError::InvalidStudy(_) | CoreError::DuplicateDoi(_))) => {
            let page = AddStudyPage::with_error(draft.normalized(), err.to_string());
            let status = AppError::from(err).status();
            Ok((status, Html(page.render()?)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn add_cohort_page(
    State(state): State<Arc<AppState>>,
    Path(study_id): Path<EntityId>,
) -> Result<Response, AppError> {
    cohort_form(state, study_id, NewCohort::default(), String::new(), StatusCode::OK).await
}

async fn add_cohort_submit(
    State(state): State<Arc<AppState>>,
    Path(study_id): Path<EntityId>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let draft = decode_cohort(&pairs);
    let attempt = draft.clone();
    let repo = state.clone();
    let created = tokio::task::spawn_blocking(move || create_cohort(&repo.store, study_id, attempt)).await?;

    match created {
        Ok(cohort) => {
            info!(study_id, cohort_id = cohort.id, "Coorte criada, redirecionando");
            Ok(Redirect::to(&format!("/studies/{}", study_id)).into_response())
        }
        Err(err @ (CoreError::InvalidCohort(_) | CoreError::UnknownDisease(_))) => {
            let message = err.to_string();
            let status = AppError::from(err).status();
            cohort_form(state, study_id, draft, message, status).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Formulário de coorte com as doenças disponíveis; estudo inexistente é 404.
async fn cohort_form(
    state: Arc<AppState>,
    study_id: EntityId,
    draft: NewCohort,
    error: String,
    status: StatusCode,
) -> Result<Response, AppError> {
    let (study, diseases) = tokio::task::spawn_blocking(move || -> sickgenes_core::Result<_> {
        let study = state.store.study(study_id)?.ok_or(CoreError::StudyNotFound(study_id))?;
        Ok((study, state.store.diseases()?))
    })
    .await??;

    let page = AddCohortPage::new(study, diseases, &draft, error);
    Ok((status, Html(page.render()?)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sickgenes_core::demo_snapshot;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState {
            store: MemoryStore::from_snapshot(demo_snapshot()).unwrap(),
        });
        (router(state.clone()), state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_links_identify_pages() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("search/identify/gene"));
        assert!(body.contains("search/identify/metabolite"));
    }

    #[tokio::test]
    async fn test_identify_get_renders_empty_form() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/search/identify/gene")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("name=\"search_terms\""));
        assert!(body.contains("name=\"one_match-TOTAL_FORMS\" value=\"0\""));
    }

    #[tokio::test]
    async fn test_unknown_model_type() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/search/identify/protein")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_identify_post_shows_candidates() {
        let (app, _) = app();
        let response = app
            .oneshot(post_form("/search/identify/gene", "search_terms=TTN%0ANAC1%0ANOPE"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("NACC1"));
        assert!(body.contains("SCN1A"));
        assert!(body.contains("name=\"multiple_matches-0-item_id\""));
        assert!(body.contains("name=\"no_matches-0-search_term\" value=\"NOPE\""));
        assert!(body.contains("name=\"one_match-0-item_string\" value=\"TTN\""));
        // identificação nunca oferece inserção
        assert!(!body.contains("confirm_insert"));
    }

    #[tokio::test]
    async fn test_insert_redirects_to_study() {
        let (app, state) = app();
        let response = app
            .clone()
            .oneshot(post_form("/manage/2/gene/insert?type=V", "search_terms=TTN%0ABRCA1&confirm_insert=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/studies/1");
        assert_eq!(state.store.findings_for_cohort(2).unwrap().len(), 2);

        let response = app.oneshot(get_request("/studies/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Genetic variation"));
        assert!(body.contains("BRCA1"));
    }

    #[tokio::test]
    async fn test_insert_page_offers_confirmation_when_resolved() {
        let (app, state) = app();
        let response = app
            .oneshot(post_form("/manage/1/metabolite/insert", "search_terms=Pyruvate"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("name=\"confirm_insert\""));
        assert!(body.contains("Metabolic features o"));
        assert!(state.store.findings_for_cohort(1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_finding_type() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/manage/1/gene/insert?type=X")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_cohort() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/manage/99/gene/insert?type=A")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_study() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/studies/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_study_list() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/studies")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Metabolic features of chronic fatigue syndrome"));
        assert!(body.contains("Exome sequencing"));
    }

    #[tokio::test]
    async fn test_add_study_form() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/manage/add_study")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("name=\"doi\""));
        assert!(body.contains("name=\"preprint\""));
    }

    #[tokio::test]
    async fn test_curate_study_and_cohort_then_insert() {
        let (app, state) = app();

        let response = app
            .clone()
            .oneshot(post_form("/manage/add_study", "title=Muscle+biopsies&doi=10.1%2Fmuscle&preprint=on"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/studies/3");
        assert!(state.store.study(3).unwrap().unwrap().preprint);

        let response = app
            .clone()
            .oneshot(post_form("/manage/add_study_cohort/3", "disease_tags=1&disease_tags=3&control_tags=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/studies/3");
        let cohort = state.store.cohort(4).unwrap().unwrap();
        assert_eq!(cohort.study_id, 3);
        assert_eq!(cohort.disease_tags, vec![1, 3]);

        let response = app
            .clone()
            .oneshot(post_form("/manage/4/gene/insert?type=A", "search_terms=TTN&confirm_insert=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/studies/3");
        assert_eq!(state.store.findings_for_cohort(4).unwrap().len(), 1);

        let body = body_text(app.oneshot(get_request("/studies/3")).await.unwrap()).await;
        assert!(body.contains("Molecular abundance"));
        assert!(body.contains("TTN"));
    }

    #[tokio::test]
    async fn test_duplicate_doi_rerenders_form() {
        let (app, state) = app();
        let response = app
            .oneshot(post_form("/manage/add_study", "title=Again&doi=10.1073%2Fpnas.1607571113"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_text(response).await;
        assert!(body.contains("already exists"));
        assert!(body.contains("value=\"Again\""));
        assert_eq!(state.store.studies().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_cohort_to_unknown_study() {
        let (app, _) = app();
        let response = app.oneshot(get_request("/manage/add_study_cohort/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cohort_without_controls_keeps_choices() {
        let (app, state) = app();
        let response = app
            .oneshot(post_form("/manage/add_study_cohort/1", "disease_tags=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("control tag is required"));
        assert!(body.contains("name=\"disease_tags\" value=\"1\" checked"));
        assert_eq!(state.store.cohorts_for_study(1).unwrap().len(), 2);
    }
}
