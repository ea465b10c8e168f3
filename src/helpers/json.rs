use actix_web::error::{Error, InternalError};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

/// Envelope shared by every JSON response of the service.
#[derive(Serialize, Debug)]
pub struct JsonResponse<T> {
    pub status: String,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
}

#[derive(Debug)]
pub struct JsonResponseBuilder<T> {
    message: String,
    id: Option<i32>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            message: String::new(),
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_msg<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = msg.into();
        self
    }

    pub fn set_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn into_response(self, status: &str, code: StatusCode) -> JsonResponse<T> {
        JsonResponse {
            status: status.to_string(),
            message: self.message,
            code: code.as_u16(),
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    fn respond(self, code: StatusCode, msg: &str) -> HttpResponse {
        let body = self.set_msg(msg).into_response("OK", code);
        HttpResponse::build(code).json(body)
    }

    pub fn ok(self, msg: &str) -> HttpResponse {
        self.respond(StatusCode::OK, msg)
    }

    pub fn created(self, msg: &str) -> HttpResponse {
        self.respond(StatusCode::CREATED, msg)
    }

    pub fn accepted(self, msg: &str) -> HttpResponse {
        self.respond(StatusCode::ACCEPTED, msg)
    }

    /// Failure reported inside a successful HTTP exchange: the transport status
    /// is 200 and `code` in the body carries the real outcome.
    pub fn failure(self, code: StatusCode, msg: &str) -> HttpResponse {
        let body = self.set_msg(msg).into_response("Error", code);
        HttpResponse::Ok().json(body)
    }

    /// Error envelope without the transport response around it.
    pub fn error(self, code: StatusCode) -> JsonResponse<T> {
        self.into_response("Error", code)
    }

    fn to_error(self, code: StatusCode, msg: String) -> Error {
        let body = self.set_msg(msg.clone()).error(code);
        InternalError::from_response(msg, HttpResponse::build(code).json(body)).into()
    }

    pub fn bad_request<S: Into<String>>(self, msg: S) -> Error {
        self.to_error(StatusCode::BAD_REQUEST, msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn failure_keeps_transport_status_ok() {
        let response = JsonResponse::<String>::build()
            .failure(StatusCode::BAD_REQUEST, "Failed!");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "Error");
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Failed!");
        assert!(body.get("item").is_none());
    }

    #[actix_web::test]
    async fn created_carries_the_item() {
        let response = JsonResponse::build()
            .set_id(815)
            .set_item("Foobar".to_string())
            .created("Created");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["id"], 815);
        assert_eq!(body["item"], "Foobar");
        assert_eq!(body["code"], 201);
    }
}
