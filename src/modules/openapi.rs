//! OpenAPI fragments for the CRUD resources. Paths are relative to the
//! module mount point; the HTTP facade adds the `/api/{module}` prefix.

use serde_json::{json, Value};

use super::query::DEFAULT_LIMIT;

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn error_response(description: &str) -> Value {
    json!({ "description": description, "content": json_content(schema_ref("ErrorResponse")) })
}

pub fn query_param(name: &str, kind: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": kind }
    })
}

pub fn sort_param(fields: &str, example: &str) -> Value {
    json!({
        "name": "sort",
        "in": "query",
        "required": false,
        "description": format!("`field:direction`, field one of {}; direction asc or desc", fields),
        "example": example,
        "schema": { "type": "string", "default": "id:asc" }
    })
}

fn pagination_params() -> [Value; 2] {
    [
        json!({
            "name": "page",
            "in": "query",
            "required": false,
            "schema": { "type": "integer", "minimum": 1, "default": 1 }
        }),
        json!({
            "name": "limit",
            "in": "query",
            "required": false,
            "schema": { "type": "integer", "minimum": 1, "default": DEFAULT_LIMIT }
        }),
    ]
}

/// Paths for list/create on `/` and get/patch/delete on `/{id}`.
pub fn resource_paths(
    tag: &str,
    entity: &str,
    list_item: &str,
    list_params: &[Value],
    schemas: Value,
) -> Value {
    let mut params = list_params.to_vec();
    params.extend(pagination_params());

    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });
    let entity_response = |description: &str| {
        json!({ "description": description, "content": json_content(schema_ref(entity)) })
    };

    let list_schema = json!({
        "type": "object",
        "properties": {
            "data": { "type": "array", "items": schema_ref(list_item) },
            "total": { "type": "integer" },
            "page": { "type": "integer" },
            "limit": { "type": "integer" }
        },
        "required": ["data", "total", "page", "limit"]
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": format!("List {}", tag.to_lowercase()),
                    "tags": [tag],
                    "parameters": params,
                    "responses": {
                        "200": { "description": "Page of results", "content": json_content(list_schema) },
                        "422": error_response("Invalid query parameters")
                    }
                },
                "post": {
                    "summary": format!("Create {}", entity.to_lowercase()),
                    "tags": [tag],
                    "requestBody": { "required": true, "content": json_content(schema_ref(&format!("Create{}", entity))) },
                    "responses": {
                        "201": entity_response("Created"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": format!("Get {} by id", entity.to_lowercase()),
                    "tags": [tag],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": entity_response("Found"),
                        "404": error_response("Not found")
                    }
                },
                "patch": {
                    "summary": format!("Update {}", entity.to_lowercase()),
                    "tags": [tag],
                    "parameters": [id_param.clone()],
                    "requestBody": { "required": true, "content": json_content(schema_ref(&format!("Update{}", entity))) },
                    "responses": {
                        "200": entity_response("Updated"),
                        "404": error_response("Not found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": format!("Delete {}", entity.to_lowercase()),
                    "tags": [tag],
                    "parameters": [id_param],
                    "responses": {
                        "200": entity_response("Deleted"),
                        "404": error_response("Not found")
                    }
                }
            }
        },
        "components": { "schemas": schemas }
    })
}
