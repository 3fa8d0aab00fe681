/* 📖 # Why map errors to responses here and not in the PAL?

The PAL only knows that a handler failed, so anything reaching it becomes a 500.
NotFound and BadRequest are part of the resource's contract and get their own
status codes, which only this layer can decide on.
*/

use forumhub_base::pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode,
};
use forumhub_base::{ErrorKind, ForumError, ForumResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::service::TopicService;
use crate::topic::{NewTopic, TopicId, TopicUpdate};

const COLLECTION_PATH: &str = "/topico";
const COLLECTION_ALLOW: &str = "GET, POST";
const ITEM_ALLOW: &str = "GET, PUT, DELETE";

/// Where a request path points.
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Collection,
    Item(&'a str),
    Unknown,
}

impl<'a> Route<'a> {
    fn of(path: &'a str) -> Self {
        let Some(rest) = path.strip_prefix(COLLECTION_PATH) else {
            return Route::Unknown;
        };
        match rest {
            "" | "/" => Route::Collection,
            _ => match rest.strip_prefix('/') {
                Some(id) if !id.contains('/') => Route::Item(id),
                _ => Route::Unknown,
            },
        }
    }
}

/// HTTP front for [`TopicService`], serving the `/topico` resource.
///
/// - `POST /topico` creates a topic: 201 with a `Location` header
/// - `GET /topico` lists summaries
/// - `GET /topico/{id}` returns the detail view
/// - `PUT /topico/{id}` applies a partial update
/// - `DELETE /topico/{id}` removes the topic: 204
///
/// ```
/// use forumhub_base::pal::http::{HttpMethod, HttpRequest, HttpService};
/// use forumhub_base::{MockPal, PalHandle};
/// use forumhub_engine::{InMemoryTopicStore, StoreHandle, TopicApi, TopicService};
///
/// let service = TopicService::new(
///     StoreHandle::new(InMemoryTopicStore::new()),
///     PalHandle::new(MockPal::new()),
/// );
/// let api = TopicApi::new(service);
/// let response = api
///     .handle_request(HttpRequest::new(HttpMethod::Get, "/topico"))
///     .unwrap();
/// assert_eq!(response.body_text(), Some("[]"));
/// ```
#[derive(Debug, Clone)]
pub struct TopicApi {
    service: TopicService,
}

impl TopicApi {
    pub fn new(service: TopicService) -> Self {
        Self { service }
    }

    fn handle_collection(&self, request: &HttpRequest) -> ForumResult<HttpResponse> {
        match request.method() {
            HttpMethod::Get => json_response(HttpStatusCode::Ok, &self.service.list()?),
            HttpMethod::Post => {
                let new_topic: NewTopic = parse_body(request.body())?;
                let detail = self.service.create(new_topic)?;
                let location = location_for(request, detail.id);
                Ok(json_response(HttpStatusCode::Created, &detail)?.with_header("Location", location))
            }
            _ => Ok(method_not_allowed(COLLECTION_ALLOW)),
        }
    }

    fn handle_item(&self, request: &HttpRequest, raw_id: &str) -> ForumResult<HttpResponse> {
        if !matches!(
            request.method(),
            HttpMethod::Get | HttpMethod::Put | HttpMethod::Delete
        ) {
            return Ok(method_not_allowed(ITEM_ALLOW));
        }
        let id = parse_topic_id(raw_id)?;
        match request.method() {
            HttpMethod::Get => json_response(HttpStatusCode::Ok, &self.service.detail(id)?),
            HttpMethod::Put => {
                // An empty body is an empty update.
                let update: TopicUpdate = if request.body().is_empty() {
                    TopicUpdate::default()
                } else {
                    parse_body(request.body())?
                };
                json_response(HttpStatusCode::Ok, &self.service.update(id, update)?)
            }
            _ => {
                self.service.delete(id)?;
                Ok(HttpResponse::no_content())
            }
        }
    }
}

impl HttpService for TopicApi {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    fn handle_request(&self, request: HttpRequest) -> ForumResult<HttpResponse> {
        let result = match Route::of(request.path()) {
            Route::Collection => self.handle_collection(&request),
            Route::Item(raw_id) => self.handle_item(&request, raw_id),
            Route::Unknown => {
                debug!("No route");
                return Ok(HttpResponse::not_found());
            }
        };
        result.or_else(|error| error_response(*error))
    }
}

/// Parse an `{id}` path segment.
///
/// Anything that is not an integer is a bad request. Integers below 1 parse but can
/// never have been issued, so they are reported as missing.
fn parse_topic_id(raw: &str) -> ForumResult<TopicId> {
    let value: i64 = raw
        .parse()
        .map_err(|_| Box::new(ForumError::bad_request(format!("Invalid topic id: {}", raw))))?;
    match u64::try_from(value) {
        Ok(value) if value > 0 => Ok(TopicId::new(value)),
        _ => Err(Box::new(ForumError::not_found("topic", value))),
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ForumResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| Box::new(ForumError::bad_request(format!("Invalid JSON body: {}", e))))
}

fn json_response<T: Serialize>(status: HttpStatusCode, data: &T) -> ForumResult<HttpResponse> {
    serde_json::to_string(data)
        .map(|json| HttpResponse::json(json).with_status(status))
        .map_err(|e| {
            Box::new(ForumError::message(format!(
                "JSON serialization error: {}",
                e
            )))
        })
}

fn method_not_allowed(allow: &str) -> HttpResponse {
    HttpResponse::method_not_allowed().with_header("Allow", allow)
}

fn location_for(request: &HttpRequest, id: TopicId) -> String {
    match request.headers().get("Host") {
        Some(host) => format!("http://{}{}/{}", host, COLLECTION_PATH, id),
        None => format!("{}/{}", COLLECTION_PATH, id),
    }
}

/// Turn contract errors into responses; everything else stays an error.
fn error_response(error: ForumError) -> ForumResult<HttpResponse> {
    match error.kind() {
        ErrorKind::NotFound { .. } => {
            debug!("{}", error);
            Ok(HttpResponse::not_found())
        }
        ErrorKind::BadRequest { message } => {
            warn!("{}", error);
            let body = serde_json::json!({ "error": message });
            Ok(HttpResponse::json(body.to_string()).with_status(HttpStatusCode::BadRequest))
        }
        _ => Err(Box::new(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTopicStore, StoreHandle};
    use crate::topic::{TopicDetail, TopicSummary};
    use expect_test::expect;
    use forumhub_base::pal::http::HttpServerConfig;
    use forumhub_base::{MockPal, Pal, PalHandle};

    const CREATE_BODY: &str = r#"{"title":"T","message":"M","author":"A","course":"C"}"#;

    struct Fixture {
        mock: MockPal,
        port: u16,
        _handle: forumhub_base::pal::http::HttpServerHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let mock = MockPal::new();
            let service = TopicService::new(
                StoreHandle::new(InMemoryTopicStore::new()),
                PalHandle::new(mock.clone()),
            );
            let handle = mock
                .start_http_server(
                    Box::new(TopicApi::new(service)),
                    HttpServerConfig::default(),
                )
                .unwrap();
            Self {
                mock,
                port: handle.port(),
                _handle: handle,
            }
        }

        fn send(&self, request: HttpRequest) -> HttpResponse {
            self.mock.simulate_request(self.port, request).unwrap()
        }

        fn get(&self, url: &str) -> HttpResponse {
            self.send(HttpRequest::new(HttpMethod::Get, url))
        }

        fn create(&self) -> HttpResponse {
            self.send(HttpRequest::new(HttpMethod::Post, "/topico").with_body(CREATE_BODY))
        }
    }

    #[test]
    fn test_route_of() {
        assert_eq!(Route::of("/topico"), Route::Collection);
        assert_eq!(Route::of("/topico/"), Route::Collection);
        assert_eq!(Route::of("/topico/7"), Route::Item("7"));
        assert_eq!(Route::of("/topico/7/replies"), Route::Unknown);
        assert_eq!(Route::of("/topicos"), Route::Unknown);
        assert_eq!(Route::of("/"), Route::Unknown);
    }

    #[test]
    fn test_parse_topic_id() {
        assert_eq!(parse_topic_id("12").unwrap(), TopicId::new(12));
        assert!(parse_topic_id("abc").unwrap_err().is_bad_request());
        assert!(parse_topic_id("1.5").unwrap_err().is_bad_request());
        assert!(parse_topic_id("-3").unwrap_err().is_not_found());
        assert!(parse_topic_id("0").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_returns_created_with_location() {
        let fixture = Fixture::new();
        let response = fixture.create();

        assert_eq!(response.status(), HttpStatusCode::Created);
        assert_eq!(response.headers().get("Location"), Some("/topico/1"));
        assert_eq!(
            response.headers().get("content-type"),
            Some("application/json")
        );
        expect![[r#"{"id":1,"title":"T","message":"M","creationTimestamp":"2024-01-15T10:30:00","status":"UNANSWERED","author":"A","course":"C"}"#]]
            .assert_eq(response.body_text().unwrap());
    }

    #[test]
    fn test_create_location_uses_host_header() {
        let fixture = Fixture::new();
        let response = fixture.send(
            HttpRequest::new(HttpMethod::Post, "/topico")
                .with_header("Host", "localhost:8080")
                .with_body(CREATE_BODY),
        );
        assert_eq!(
            response.headers().get("Location"),
            Some("http://localhost:8080/topico/1")
        );
    }

    #[test]
    fn test_create_missing_field_is_bad_request() {
        let fixture = Fixture::new();
        let response = fixture.send(
            HttpRequest::new(HttpMethod::Post, "/topico")
                .with_body(r#"{"title":"T","message":"M","author":"A"}"#),
        );
        assert_eq!(response.status(), HttpStatusCode::BadRequest);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("course"));
        assert_eq!(fixture.get("/topico").body_text(), Some("[]"));
    }

    #[test]
    fn test_create_malformed_json_is_bad_request() {
        let fixture = Fixture::new();
        let response =
            fixture.send(HttpRequest::new(HttpMethod::Post, "/topico").with_body("{not json"));
        assert_eq!(response.status(), HttpStatusCode::BadRequest);
    }

    #[test]
    fn test_list_returns_summaries() {
        let fixture = Fixture::new();
        fixture.create();
        fixture.create();

        let response = fixture.get("/topico?page=2");
        assert_eq!(response.status(), HttpStatusCode::Ok);
        let summaries: Vec<TopicSummary> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            summaries.iter().map(|s| s.id.value()).collect::<Vec<_>>(),
            vec![1, 2]
        );
        expect![[r#"{"id":1,"title":"T","author":"A","course":"C","status":"UNANSWERED"}"#]]
            .assert_eq(&serde_json::to_string(&summaries[0]).unwrap());
    }

    #[test]
    fn test_detail_missing_is_empty_404() {
        let fixture = Fixture::new();
        let response = fixture.get("/topico/42");
        assert_eq!(response.status(), HttpStatusCode::NotFound);
        assert!(response.body().is_empty());

        assert_eq!(fixture.get("/topico/-1").status(), HttpStatusCode::NotFound);
    }

    #[test]
    fn test_non_integer_id_is_bad_request() {
        let fixture = Fixture::new();
        let response = fixture.get("/topico/abc");
        assert_eq!(response.status(), HttpStatusCode::BadRequest);
        expect![[r#"{"error":"Invalid topic id: abc"}"#]].assert_eq(response.body_text().unwrap());
    }

    #[test]
    fn test_update_with_null_and_empty_body() {
        let fixture = Fixture::new();
        fixture.create();

        let response = fixture.send(
            HttpRequest::new(HttpMethod::Put, "/topico/1")
                .with_body(r#"{"title":null,"status":"RESOLVED"}"#),
        );
        assert_eq!(response.status(), HttpStatusCode::Ok);
        let detail: TopicDetail = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(detail.title, "T");
        assert_eq!(detail.status, "RESOLVED");

        let unchanged = fixture.send(HttpRequest::new(HttpMethod::Put, "/topico/1"));
        assert_eq!(unchanged.status(), HttpStatusCode::Ok);
        assert_eq!(unchanged.body(), response.body());
    }

    #[test]
    fn test_update_missing_is_404() {
        let fixture = Fixture::new();
        let response =
            fixture.send(HttpRequest::new(HttpMethod::Put, "/topico/9").with_body("{}"));
        assert_eq!(response.status(), HttpStatusCode::NotFound);
    }

    #[test]
    fn test_method_not_allowed() {
        let fixture = Fixture::new();
        let response = fixture.send(HttpRequest::new(HttpMethod::Delete, "/topico"));
        assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
        assert_eq!(response.headers().get("Allow"), Some("GET, POST"));

        let response = fixture.send(HttpRequest::new(HttpMethod::Post, "/topico/1"));
        assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
        assert_eq!(response.headers().get("Allow"), Some("GET, PUT, DELETE"));
    }

    #[test]
    fn test_unknown_path_is_404() {
        let fixture = Fixture::new();
        let response = fixture.get("/api/site");
        assert_eq!(response.status(), HttpStatusCode::NotFound);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_end_to_end_lifecycle() {
        let fixture = Fixture::new();

        let created: TopicDetail = serde_json::from_slice(fixture.create().body()).unwrap();
        assert_eq!(created.id, TopicId::FIRST);

        let list: Vec<TopicSummary> =
            serde_json::from_slice(fixture.get("/topico").body()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, TopicId::FIRST);

        let detail: TopicDetail = serde_json::from_slice(fixture.get("/topico/1").body()).unwrap();
        assert_eq!(detail, created);

        let updated = fixture.send(
            HttpRequest::new(HttpMethod::Put, "/topico/1").with_body(r#"{"title":"New"}"#),
        );
        assert_eq!(updated.status(), HttpStatusCode::Ok);
        let detail: TopicDetail = serde_json::from_slice(fixture.get("/topico/1").body()).unwrap();
        assert_eq!(detail.title, "New");
        assert_eq!(detail.message, "M");
        assert_eq!(detail.author, "A");
        assert_eq!(detail.course, "C");

        let deleted = fixture.send(HttpRequest::new(HttpMethod::Delete, "/topico/1"));
        assert_eq!(deleted.status(), HttpStatusCode::NoContent);
        assert!(deleted.body().is_empty());

        assert_eq!(fixture.get("/topico/1").status(), HttpStatusCode::NotFound);
        assert_eq!(
            fixture
                .send(HttpRequest::new(HttpMethod::Delete, "/topico/1"))
                .status(),
            HttpStatusCode::NotFound
        );
    }
}
