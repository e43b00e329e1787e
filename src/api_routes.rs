// api_routes.rs
use crate::catalog::dataset_stats;
use crate::data_loader::DataOrigin;
use crate::error::OracleError;
use crate::generator::IdeaGenerator;
use crate::input_process::process_user_input;
use crate::randomness::ThreadRandom;

use crate::api_auth::ApiKey;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::Method;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, Resource, Responder};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

pub const API_VERSION: &str = "2.0 - Enriched Data";
const EXAMPLE_KEYWORD: &str = "viagem rápida";

/// Shared, read-only state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub generator: IdeaGenerator,
    pub origin: DataOrigin,
}

#[derive(Deserialize)]
struct KeywordRequest {
    #[serde(default)]
    keyword: String,
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    json!({ "error": message.into() })
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected request body: {}", err);
    let response = HttpResponse::BadRequest().json(error_body("JSON inválido"));
    InternalError::from_response(err, response).into()
}

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Full application: routes, CORS headers, API key guard and request log.
/// `DefaultHeaders` sits outside `ApiKey` so rejections carry CORS headers too.
pub fn build_app(
    state: AppState,
    api_key: Option<String>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(ApiKey::new(api_key))
        .wrap(middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .configure(configure)
}

// Every API resource also answers CORS preflight.
fn api_resource(path: &str) -> Resource {
    web::resource(path).route(web::method(Method::OPTIONS).to(preflight_route))
}

// Set API Routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(info_route))
        .service(
            web::scope("/api")
                .service(api_resource("").route(web::get().to(info_route)))
                .service(api_resource("/info").route(web::get().to(info_route)))
                .service(api_resource("/gerar-ideia").route(web::post().to(generate_idea_route)))
                .service(api_resource("/temas").route(web::get().to(themes_route)))
                .service(api_resource("/stats").route(web::get().to(stats_route)))
                .service(api_resource("/exemplo").route(web::get().to(example_route)))
                .service(api_resource("/{tail:.*}").default_service(web::to(not_found))),
        )
        .default_service(web::to(not_found));
}

async fn preflight_route() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Methods", ALLOWED_METHODS))
        .insert_header(("Access-Control-Allow-Headers", ALLOWED_HEADERS))
        .finish()
}

async fn info_route() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Bem-vindo ao Oráculo Alucinado!",
        "description": "API que gera ideias alucinadas usando heurísticas",
        "version": API_VERSION,
        "endpoints": {
            "POST /api/gerar-ideia": "Gera uma ideia alucinada baseada em keyword",
            "GET /api/temas": "Lista todos os temas disponíveis com estatísticas",
            "GET /api/stats": "Estatísticas detalhadas do banco de dados",
            "GET /api/exemplo": "Mostra um exemplo de uso",
            "GET /api/info": "Informações da API (JSON)"
        },
        "exemplo_uso": "POST /api/gerar-ideia com body: {\"keyword\": \"viagem rápida\"}"
    }))
}

async fn generate_idea_route(
    request: web::Json<KeywordRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    info!("[{}] gerar-ideia for {:?}", request_id, request.keyword);

    let mut rng = ThreadRandom::default();
    match process_user_input(&request.keyword, &state.generator, &mut rng) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(OracleError::EmptyKeyword) => {
            warn!("[{}] Empty keyword rejected", request_id);
            HttpResponse::BadRequest().json(error_body(OracleError::EmptyKeyword.to_string()))
        }
        Err(e) => {
            error!("[{}] Failed to generate idea: {}", request_id, e);
            HttpResponse::InternalServerError().json(error_body(format!("Erro interno: {}", e)))
        }
    }
}

async fn themes_route(state: web::Data<AppState>) -> impl Responder {
    let catalog = state.generator.catalog();
    HttpResponse::Ok().json(json!({
        "temas_disponiveis": catalog.names(),
        "total_temas": catalog.len(),
        "estatisticas": dataset_stats(catalog, state.generator.connectors()),
    }))
}

async fn stats_route(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "database_stats": dataset_stats(state.generator.catalog(), state.generator.connectors()),
        "version": API_VERSION,
        "data_source": state.origin.to_string(),
    }))
}

async fn example_route(state: web::Data<AppState>) -> impl Responder {
    let mut rng = ThreadRandom::default();
    match process_user_input(EXAMPLE_KEYWORD, &state.generator, &mut rng) {
        Ok(result) => HttpResponse::Ok().json(json!({
            "exemplo_input": EXAMPLE_KEYWORD,
            "exemplo_output": result,
        })),
        Err(e) => {
            error!("Example generation failed: {}", e);
            HttpResponse::InternalServerError().json(error_body(format!("Erro interno: {}", e)))
        }
    }
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(error_body("Endpoint não encontrado"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ConnectorList, Theme, ThemeCatalog};
    use crate::data_loader::fallback_dataset;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    fn fallback_state() -> AppState {
        let dataset = fallback_dataset();
        AppState {
            generator: IdeaGenerator::new(dataset.catalog, dataset.connectors),
            origin: dataset.origin,
        }
    }

    macro_rules! app_with {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn generate_returns_result_document() {
        let app = app_with!(fallback_state());
        let req = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .set_json(json!({"keyword": "blockchain"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["input_solicitado"], "blockchain");
        assert_eq!(body["tema_identificado"], "tecnologia");
        assert!(body["ideia_alucinada"].as_str().unwrap().split(' ').count() >= 3);
        assert!(body["fator_distorcao"]
            .as_str()
            .unwrap()
            .starts_with("Combinou tecnologia com "));
    }

    #[actix_web::test]
    async fn blank_keyword_is_bad_request() {
        let app = app_with!(fallback_state());
        for body in [json!({"keyword": "   "}), json!({})] {
            let req = test::TestRequest::post()
                .uri("/api/gerar-ideia")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Keyword não pode estar vazia");
        }
    }

    #[actix_web::test]
    async fn malformed_json_is_bad_request() {
        let app = app_with!(fallback_state());
        let req = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{ keyword: ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "JSON inválido");
    }

    #[actix_web::test]
    async fn broken_dataset_is_internal_error() {
        let state = AppState {
            generator: IdeaGenerator::new(
                ThemeCatalog::new(vec![Theme::new("A", &["x"])]),
                ConnectorList::from_phrases("base", &["with"]),
            ),
            origin: DataOrigin::Primary("test".to_string()),
        };
        let app = app_with!(state);
        let req = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .set_json(json!({"keyword": "A"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Erro interno"));
    }

    #[actix_web::test]
    async fn themes_and_stats_describe_dataset() {
        let app = app_with!(fallback_state());

        let req = test::TestRequest::get().uri("/api/temas").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body["temas_disponiveis"],
            json!(["tecnologia", "saúde", "viagem", "comida"])
        );
        assert_eq!(body["total_temas"], 4);
        assert_eq!(body["estatisticas"]["total_conectores"], 5);

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data_source"], "built-in fallback dataset");
        assert_eq!(body["version"], API_VERSION);
        assert_eq!(body["database_stats"]["temas"]["viagem"]["keyword_count"], 5);
    }

    #[actix_web::test]
    async fn example_and_info_routes() {
        let app = app_with!(fallback_state());

        let req = test::TestRequest::get().uri("/api/exemplo").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["exemplo_input"], EXAMPLE_KEYWORD);
        assert_eq!(body["exemplo_output"]["tema_identificado"], "viagem");

        for uri in ["/", "/api/info"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["version"], API_VERSION);
        }
    }

    #[actix_web::test]
    async fn unknown_route_is_json_not_found() {
        let app = app_with!(fallback_state());
        let req = test::TestRequest::get().uri("/api/nada").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Endpoint não encontrado");
    }

    fn allow_origin(resp: &ServiceResponse<impl MessageBody>) -> Option<String> {
        resp.headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    #[actix_web::test]
    async fn preflight_for_generate_is_answered() {
        let app = test::init_service(build_app(fallback_state(), Some("segredo".to_string()))).await;
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/gerar-ideia")
            .insert_header(("Origin", "https://outro.example"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "content-type"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(allow_origin(&resp).as_deref(), Some("*"));
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            ALLOWED_METHODS
        );
        let allowed_headers = resp.headers().get("Access-Control-Allow-Headers").unwrap();
        assert!(allowed_headers.to_str().unwrap().contains("Content-Type"));

        // preflight without an Origin header is answered the same way
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/temas")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn every_response_carries_allow_origin() {
        let app = test::init_service(build_app(fallback_state(), Some("segredo".to_string()))).await;

        let ok = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .insert_header(("Authorization", "Bearer segredo"))
            .set_json(json!({"keyword": "sono"}))
            .to_request();
        let bad_request = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .insert_header(("Authorization", "Bearer segredo"))
            .set_json(json!({"keyword": ""}))
            .to_request();
        let unauthorized = test::TestRequest::post()
            .uri("/api/gerar-ideia")
            .set_json(json!({"keyword": "sono"}))
            .to_request();
        let not_found = test::TestRequest::get().uri("/nada").to_request();

        for (req, status) in [
            (ok, StatusCode::OK),
            (bad_request, StatusCode::BAD_REQUEST),
            (unauthorized, StatusCode::UNAUTHORIZED),
            (not_found, StatusCode::NOT_FOUND),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status);
            assert_eq!(allow_origin(&resp).as_deref(), Some("*"), "status {}", status);
        }
    }
}
