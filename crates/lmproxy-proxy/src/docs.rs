//! Interactive API documentation.
//!
//! `/api-docs` serves a Swagger UI page that loads the OpenAPI document
//! from `/api-docs/openapi.json`. The UI assets come from a CDN unless a
//! local asset directory is mounted under [`STATIC_PREFIX`].

use axum::Json;
use axum::response::Html;
use serde_json::{Value, json};

/// Path of the documentation page.
pub const DOCS_PATH: &str = "/api-docs";

/// Path of the OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Mount point for locally served Swagger UI assets.
pub const STATIC_PREFIX: &str = "/api-docs/static";

const CDN_PREFIX: &str = "https://unpkg.com/swagger-ui-dist@5";

/// The OpenAPI 3.0 description of the proxy endpoints.
pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Chat Completions API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "OpenAI-compatible chat completions API"
        },
        "paths": {
            "/v1/chat/models": {
                "get": {
                    "operationId": "listChatModels",
                    "responses": {
                        "200": {
                            "description": "Successful chat models retrieval",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "models": {
                                                "type": "array",
                                                "items": { "$ref": "#/components/schemas/ModelDescriptor" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/v1/chat/completions": {
                "post": {
                    "operationId": "createChatCompletion",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ChatCompletionRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Successful chat completion",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ChatCompletionResponse" }
                                }
                            }
                        },
                        "400": { "description": "Invalid request body, unknown model or unsupported streaming" },
                        "500": { "description": "Host model failure" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ModelDescriptor": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "id": { "type": "string" },
                        "vendor": { "type": "string" },
                        "family": { "type": "string" },
                        "version": { "type": "string" },
                        "maxInputTokens": { "type": "number" }
                    }
                },
                "ChatCompletionRequest": {
                    "type": "object",
                    "required": ["model", "messages"],
                    "properties": {
                        "model": { "type": "string" },
                        "messages": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "required": ["role", "content"],
                                "properties": {
                                    "role": {
                                        "type": "string",
                                        "enum": ["system", "user", "assistant", "tool"]
                                    },
                                    "content": { "type": "string", "nullable": true },
                                    "name": { "type": "string" },
                                    "tool_call_id": { "type": "string" }
                                }
                            }
                        },
                        "tools": { "type": "array", "items": { "type": "object" } },
                        "temperature": { "type": "number" },
                        "stream": { "type": "boolean" }
                    }
                },
                "ChatCompletionResponse": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "object": { "type": "string" },
                        "created": { "type": "number" },
                        "model": { "type": "string" },
                        "choices": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "message": {
                                        "type": "object",
                                        "properties": {
                                            "role": { "type": "string" },
                                            "content": { "type": "string", "nullable": true },
                                            "tool_calls": { "type": "array", "items": { "type": "object" } }
                                        }
                                    },
                                    "finish_reason": { "type": "string", "enum": ["stop", "tool_calls"] },
                                    "index": { "type": "number" }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Render the Swagger UI page.
///
/// With `local_assets` the page loads the bundle from [`STATIC_PREFIX`].
pub fn docs_page(local_assets: bool) -> String {
    let prefix = if local_assets { STATIC_PREFIX } else { CDN_PREFIX };
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Chat Completions API</title>
  <link rel="stylesheet" href="{prefix}/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="{prefix}/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        url: "{OPENAPI_PATH}",
        dom_id: "#swagger-ui",
        deepLinking: true
      }});
    }};
  </script>
</body>
</html>
"##
    )
}

pub(crate) async fn openapi_json() -> Json<Value> {
    Json(openapi_document())
}

pub(crate) fn docs_html(local_assets: bool) -> Html<String> {
    Html(docs_page(local_assets))
}
