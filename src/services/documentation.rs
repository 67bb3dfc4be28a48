use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the wall control server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::control::list_displays,
        crate::routes::control::play_on_display,
        crate::routes::control::play_on_all,
        crate::routes::control::list_modules,
        crate::routes::control::replace_geometry,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::DisplayInboundMessage,
            crate::dto::ws::LoadModulePayload,
            crate::dto::control::PlayModuleRequest,
            crate::dto::control::PlayModuleResponse,
            crate::dto::control::ClientSummary,
            crate::dto::control::ControllerStatus,
            crate::dto::control::ModuleListItem,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "control", description = "Operator commands forwarded to display controllers"),
        (name = "displays", description = "WebSocket operations for display clients"),
    )
)]
pub struct ApiDoc;
