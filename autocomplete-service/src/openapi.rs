use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{AutocompleteRequest, AutocompleteResponse, SuggestionSource};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::autocomplete,
    ),
    components(schemas(
        AutocompleteRequest,
        AutocompleteResponse,
        SuggestionSource,
    )),
    tags(
        (name = "autocomplete", description = "City name suggestions"),
    ),
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
