use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cloth_layout::config::ServerConfig;
use cloth_layout::order::{OrderLine, accessory_requirements, material_requirements};
use cloth_layout::render::AsciiRenderer;
use cloth_layout::types::{Article, Placement};
use cloth_layout::{
    AccessoryRequirement, AccessoryStock, Allocation, ArticleOutcome, LayoutPlanner, Material,
    MaterialRequirement, StockSnapshot,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct EstimateRequest {
    /// Master data and stock snapshot for every cloth involved.
    materials: Vec<Material>,
    #[serde(default)]
    accessories: Vec<AccessoryStock>,
    #[serde(default)]
    requirements: Vec<MaterialRequirement>,
    #[serde(default)]
    order: Vec<OrderLine>,
    #[serde(default)]
    render: bool,
}

#[derive(Serialize)]
struct EstimateResponse {
    satisfied: bool,
    failing_articles: Vec<Article>,
    articles: Vec<ArticleResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    accessories: Vec<AccessoryRequirement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    accessory_shortages: Vec<Article>,
}

#[derive(Serialize)]
struct ArticleResponse {
    article: Article,
    #[serde(skip_serializing_if = "Option::is_none")]
    allocation: Option<Allocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    used_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    waste_percent: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    placements: Vec<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&ArticleOutcome> for ArticleResponse {
    fn from(outcome: &ArticleOutcome) -> Self {
        match outcome {
            ArticleOutcome::Packed(result) => ArticleResponse {
                article: result.article,
                allocation: Some(result.allocation),
                used_length: Some(result.used_length),
                waste_percent: Some(result.layout.waste_percent()),
                placements: result.layout.placements.clone(),
                map: result.map.clone(),
                error: None,
            },
            ArticleOutcome::Failed { article, error } => ArticleResponse {
                article: *article,
                allocation: None,
                used_length: None,
                waste_percent: None,
                placements: Vec::new(),
                map: None,
                error: Some(error.to_string()),
            },
        }
    }
}

async fn estimate(
    Json(req): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /estimate"
    );

    if let Some(m) = req.materials.iter().find(|m| m.roll_width == 0) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("roll width of article {} must be non-zero", m.article),
        ));
    }
    let mut stock = StockSnapshot::from_materials(req.materials)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    for accessory in req.accessories {
        stock
            .add_accessory(accessory)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    }

    let mut requirements = req.requirements;
    requirements.extend(material_requirements(&req.order));
    for piece in requirements.iter().flat_map(|r| &r.pieces) {
        if piece.rect.is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                "cut dimensions must be non-zero".to_string(),
            ));
        }
    }

    let renderer = AsciiRenderer;
    let mut planner = LayoutPlanner::new(&stock);
    if req.render {
        planner = planner.with_renderer(&renderer);
    }
    let plan = planner.plan(&requirements);

    let accessories = accessory_requirements(&req.order);
    let accessory_shortages = stock.accessory_shortages(&accessories);
    if !accessory_shortages.is_empty() {
        tracing::warn!(articles = ?accessory_shortages, "accessory shortage");
    }

    Ok(Json(EstimateResponse {
        satisfied: plan.is_satisfied() && accessory_shortages.is_empty(),
        failing_articles: plan.failing_articles(),
        articles: plan.outcomes.iter().map(ArticleResponse::from).collect(),
        accessories,
        accessory_shortages,
    }))
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .unwrap_or_else(|e| {
            eprintln!("failed to open {}: {}", config.log_file, e);
            std::process::exit(1);
        });

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let addr = config.addr();

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/estimate", post(estimate))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
