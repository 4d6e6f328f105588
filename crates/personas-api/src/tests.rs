//! Router-level tests: every request goes through the full middleware stack
//! built by [`crate::router`].

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use personas_core::{
  audit::{ErrorLogEntry, NewErrorLogEntry},
  person::{NewPerson, Person, PersonId},
  search::SearchField,
  store::PersonStore,
};
use personas_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::router;

async fn make_store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, headers, json)
}

fn ana() -> Value {
  json!({
    "firstName": "Ana",
    "lastName":  "Gómez",
    "birthDate": "1990-05-01T10:00:00+02:00",
    "email":     "ana@example.com",
    "phone":     "+34 600 000 000",
  })
}

async fn create(app: &Router, body: Value) -> Value {
  let (status, _, json) = send(app, "POST", "/api/personas", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{json}");
  json
}

// ── Create / get ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_returns_same_fields() {
  let app = router(make_store().await);

  let (status, headers, created) =
    send(&app, "POST", "/api/personas", Some(ana())).await;
  assert_eq!(status, StatusCode::CREATED);

  let id = created["id"].as_i64().unwrap();
  let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
  assert_eq!(location, format!("/api/personas/{id}"));
  assert!(created["registeredAt"].is_string());

  let (status, _, fetched) = send(&app, "GET", location, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);
  assert_eq!(fetched["firstName"], "Ana");
  assert_eq!(fetched["lastName"], "Gómez");
  assert_eq!(fetched["birthDate"], "1990-05-01T08:00:00Z");
  assert_eq!(fetched["email"], "ana@example.com");
  assert_eq!(fetched["phone"], "+34 600 000 000");
  assert!(fetched["address"].is_null());
}

#[tokio::test]
async fn create_sets_registered_at_to_now() {
  let app = router(make_store().await);
  let before = Utc::now();
  let created = create(&app, ana()).await;
  let after = Utc::now();

  let registered: DateTime<Utc> =
    serde_json::from_value(created["registeredAt"].clone()).unwrap();
  assert!(before <= registered && registered <= after);
}

#[tokio::test]
async fn create_ignores_client_supplied_id_and_registered_at() {
  let app = router(make_store().await);
  let mut body = ana();
  body["id"] = json!(999);
  body["registeredAt"] = json!("2000-01-01T00:00:00Z");

  let created = create(&app, body).await;
  assert_ne!(created["id"], 999);
  assert_ne!(created["registeredAt"], "2000-01-01T00:00:00Z");
}

#[tokio::test]
async fn create_accepts_spanish_property_names() {
  let app = router(make_store().await);
  let created = create(
    &app,
    json!({
      "nombre":          "Luis",
      "apellido":        "Pérez",
      "fechaNacimiento": "1985-12-24",
      "email":           "luis@example.com",
      "direccion":       "Calle Mayor 1",
    }),
  )
  .await;
  assert_eq!(created["firstName"], "Luis");
  assert_eq!(created["birthDate"], "1985-12-24T00:00:00Z");
  assert_eq!(created["address"], "Calle Mayor 1");
}

#[tokio::test]
async fn create_with_invalid_email_names_email() {
  let store = make_store().await;
  let app = router(Arc::clone(&store));
  let mut body = ana();
  body["email"] = json!("not-an-email");

  let (status, _, json) = send(&app, "POST", "/api/personas", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(json["message"].is_string());
  assert!(json["errors"]["email"].is_array());
  assert_eq!(json["errors"].as_object().unwrap().len(), 1);

  assert!(store.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_missing_fields_lists_them() {
  let app = router(make_store().await);
  let (status, _, json) =
    send(&app, "POST", "/api/personas", Some(json!({ "phone": "1" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let fields: Vec<_> = json["errors"].as_object().unwrap().keys().cloned().collect();
  assert_eq!(fields, ["birthDate", "email", "firstName", "lastName"]);
}

async fn send_raw(
  app: &Router,
  uri: &str,
  content_type: Option<&str>,
  body: impl Into<Body>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method("POST").uri(uri);
  if let Some(ct) = content_type {
    builder = builder.header(header::CONTENT_TYPE, ct);
  }
  let resp = app.clone().oneshot(builder.body(body.into()).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn malformed_json_is_a_json_bad_request() {
  let app = router(make_store().await);
  let (status, json) =
    send_raw(&app, "/api/personas", Some("application/json"), "{ not json").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["message"], "El cuerpo de la petición no es un JSON válido.");
}

#[tokio::test]
async fn mistyped_body_keeps_status_and_hides_parser_detail() {
  let app = router(make_store().await);
  let (status, json) = send_raw(
    &app,
    "/api/personas",
    Some("application/json"),
    r#"{ "firstName": 5 }"#,
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let message = json["message"].as_str().unwrap();
  assert!(!message.contains("firstName"), "{message}");
  assert!(!message.contains("invalid type"), "{message}");
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported() {
  let app = router(make_store().await);
  let (status, json) = send_raw(&app, "/api/personas", None, ana().to_string()).await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert!(json["message"].is_string());
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
  let app = router(make_store().await);
  let huge = format!(r#"{{ "address": "{}" }}"#, "x".repeat(3 * 1024 * 1024));
  let (status, json) =
    send_raw(&app, "/api/personas", Some("application/json"), huge).await;
  assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
  assert_eq!(json["message"], "El cuerpo de la petición es demasiado grande.");
}

#[tokio::test]
async fn non_integer_id_is_a_json_bad_request() {
  let app = router(make_store().await);
  let (status, _, json) = send(&app, "GET", "/api/personas/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(json["message"].is_string());
}

#[tokio::test]
async fn unknown_routes_and_methods_answer_json() {
  let app = router(make_store().await);

  let (status, _, json) = send(&app, "GET", "/api/personas/1/extra", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(json["message"].is_string());

  let (status, _, json) = send(&app, "PATCH", "/api/personas/1", None).await;
  assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
  assert!(json["message"].is_string());
}

// ── List ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_every_person() {
  let app = router(make_store().await);
  let (status, _, empty) = send(&app, "GET", "/api/personas", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(empty, json!([]));

  create(&app, ana()).await;
  let mut other = ana();
  other["firstName"] = json!("Luis");
  create(&app, other).await;

  let (_, _, all) = send(&app, "GET", "/api/personas", None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);
}

// ── Not found ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_id_is_not_found_for_get_update_delete() {
  let app = router(make_store().await);

  let (status, _, json) = send(&app, "GET", "/api/personas/41", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(json["message"].as_str().unwrap().contains("41"));

  let (status, _, _) = send(&app, "PUT", "/api/personas/41", Some(ana())).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _, _) = send(&app, "DELETE", "/api/personas/41", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Update ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_fields_and_keeps_registered_at() {
  let app = router(make_store().await);
  let created = create(&app, ana()).await;
  let id = created["id"].as_i64().unwrap();
  let uri = format!("/api/personas/{id}");

  let (status, _, body) = send(
    &app,
    "PUT",
    &uri,
    Some(json!({
      "id":        id + 100,
      "firstName": "Anabel",
      "lastName":  "Gómez Ruiz",
      "birthDate": "1990-05-01T00:00:00",
      "email":     "anabel@example.com",
      "address":   "Calle Luna 2",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (_, _, fetched) = send(&app, "GET", &uri, None).await;
  assert_eq!(fetched["id"], id);
  assert_eq!(fetched["firstName"], "Anabel");
  assert_eq!(fetched["lastName"], "Gómez Ruiz");
  assert_eq!(fetched["birthDate"], "1990-05-01T00:00:00Z");
  assert_eq!(fetched["email"], "anabel@example.com");
  assert!(fetched["phone"].is_null());
  assert_eq!(fetched["address"], "Calle Luna 2");
  assert_eq!(fetched["registeredAt"], created["registeredAt"]);

  let (status, _, _) =
    send(&app, "GET", &format!("/api/personas/{}", id + 100), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_validates_before_touching_the_store() {
  let app = router(make_store().await);
  let created = create(&app, ana()).await;
  let uri = format!("/api/personas/{}", created["id"]);

  let mut body = ana();
  body["email"] = json!("nope");
  let (status, _, json) = send(&app, "PUT", &uri, Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(json["errors"]["email"].is_array());

  // Invalid body on a missing id is still a validation error.
  let (status, _, _) =
    send(&app, "PUT", "/api/personas/77", Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, _, fetched) = send(&app, "GET", &uri, None).await;
  assert_eq!(fetched["email"], "ana@example.com");
}

// ── Delete ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_and_delete_again_are_not_found() {
  let store = make_store().await;
  let app = router(Arc::clone(&store));
  let created = create(&app, ana()).await;
  let uri = format!("/api/personas/{}", created["id"]);

  let (status, _, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _, _) = send(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _, json) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(json["message"].is_string());

  assert!(store.list_error_log().await.unwrap().is_empty());
}

// ── Search ────────────────────────────────────────────────────────────────────

async fn seed_for_search(app: &Router) {
  for (first, last, email) in [
    ("Ana", "Gómez", "ana@example.com"),
    ("Mariana", "Ruiz", "mruiz@example.org"),
    ("LUIS", "Anaya", "luis@example.org"),
  ] {
    create(
      app,
      json!({
        "firstName": first,
        "lastName":  last,
        "birthDate": "1990-01-01",
        "email":     email,
      }),
    )
    .await;
  }
}

fn first_names(json: &Value) -> Vec<String> {
  json
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["firstName"].as_str().unwrap().to_owned())
    .collect()
}

#[tokio::test]
async fn search_by_first_name_is_case_insensitive_substring() {
  let app = router(make_store().await);
  seed_for_search(&app).await;

  let (status, _, json) =
    send(&app, "GET", "/api/personas/buscar?filtro=nombre&valor=ana", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first_names(&json), ["Ana", "Mariana"]);

  let (_, _, json) =
    send(&app, "GET", "/api/personas/buscar?filtro=Apellido&valor=%20ANA%20", None).await;
  assert_eq!(first_names(&json), ["LUIS"]);

  let (_, _, json) =
    send(&app, "GET", "/api/personas/buscar?filtro=email&valor=.org", None).await;
  assert_eq!(first_names(&json), ["Mariana", "LUIS"]);
}

#[tokio::test]
async fn search_without_matches_is_ok_and_empty() {
  let app = router(make_store().await);
  seed_for_search(&app).await;

  let (status, _, json) =
    send(&app, "GET", "/api/personas/buscar?filtro=nombre&valor=zoe", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json, json!([]));
}

#[tokio::test]
async fn search_rejects_missing_or_unknown_parameters() {
  let app = router(make_store().await);

  for uri in [
    "/api/personas/buscar",
    "/api/personas/buscar?filtro=nombre",
    "/api/personas/buscar?filtro=nombre&valor=%20%20",
    "/api/personas/buscar?valor=ana",
    "/api/personas/buscar?filtro=telefono&valor=555",
  ] {
    let (status, _, json) = send(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("nombre, apellido, email"), "{uri}: {message}");
  }
}

#[tokio::test]
async fn undecodable_query_string_is_a_json_bad_request() {
  let app = router(make_store().await);
  let (status, _, json) = send(
    &app,
    "GET",
    "/api/personas/buscar?filtro=nombre&filtro=email&valor=ana",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let message = json["message"].as_str().unwrap();
  assert!(message.contains("nombre, apellido, email"), "{message}");
}

// ── Failure interceptor ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("store unavailable")]
  Unavailable(#[source] std::io::Error),
  #[error("error log unavailable")]
  LogUnavailable,
}

#[derive(Clone, Copy)]
enum Fault {
  Error,
  Panic,
}

/// Fails every person operation; the error log works unless `log_fails`.
struct FlakyStore {
  inner:     SqliteStore,
  fault:     Fault,
  log_fails: bool,
}

impl FlakyStore {
  async fn new(fault: Fault, log_fails: bool) -> Arc<Self> {
    let inner = SqliteStore::open_in_memory().await.unwrap();
    Arc::new(Self { inner, fault, log_fails })
  }

  fn fail<T>(&self) -> Result<T, FlakyError> {
    match self.fault {
      Fault::Error => Err(FlakyError::Unavailable(std::io::Error::other(
        "connection reset",
      ))),
      Fault::Panic => panic!("store exploded"),
    }
  }
}

impl PersonStore for FlakyStore {
  type Error = FlakyError;

  async fn list_persons(&self) -> Result<Vec<Person>, FlakyError> { self.fail() }

  async fn get_person(&self, _: PersonId) -> Result<Option<Person>, FlakyError> {
    self.fail()
  }

  async fn person_exists(&self, _: PersonId) -> Result<bool, FlakyError> {
    self.fail()
  }

  async fn search_persons(
    &self,
    _: SearchField,
    _: &str,
  ) -> Result<Vec<Person>, FlakyError> {
    self.fail()
  }

  async fn insert_person(
    &self,
    _: NewPerson,
    _: DateTime<Utc>,
  ) -> Result<Person, FlakyError> {
    self.fail()
  }

  async fn replace_person(
    &self,
    _: PersonId,
    _: NewPerson,
  ) -> Result<Option<Person>, FlakyError> {
    self.fail()
  }

  async fn delete_person(&self, _: PersonId) -> Result<bool, FlakyError> {
    self.fail()
  }

  async fn append_error(
    &self,
    entry: NewErrorLogEntry,
  ) -> Result<ErrorLogEntry, FlakyError> {
    if self.log_fails {
      return Err(FlakyError::LogUnavailable);
    }
    Ok(self.inner.append_error(entry).await.unwrap())
  }

  async fn list_error_log(&self) -> Result<Vec<ErrorLogEntry>, FlakyError> {
    Ok(self.inner.list_error_log().await.unwrap())
  }
}

fn failing_requests() -> Vec<(&'static str, &'static str, Option<Value>)> {
  vec![
    ("GET", "/api/personas", None),
    ("GET", "/api/personas/1", None),
    ("POST", "/api/personas", Some(ana())),
    ("PUT", "/api/personas/1", Some(ana())),
    ("DELETE", "/api/personas/1", None),
    ("GET", "/api/personas/buscar?filtro=email&valor=ana", None),
  ]
}

fn fixed_envelope() -> Value {
  json!({
    "type":    "error",
    "message": "Ha ocurrido un error inesperado.",
    "status":  500,
  })
}

#[tokio::test]
async fn store_errors_are_logged_once_and_hidden_from_clients() {
  let store = FlakyStore::new(Fault::Error, false).await;
  let app = router(Arc::clone(&store));

  for (expected, (method, uri, body)) in (1..).zip(failing_requests()) {
    let (status, _, json) = send(&app, method, uri, body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
    assert_eq!(json, fixed_envelope(), "{method} {uri}");

    let log = store.list_error_log().await.unwrap();
    assert_eq!(log.len(), expected, "{method} {uri}");
  }

  let log = store.list_error_log().await.unwrap();
  assert!(log.iter().all(|e| e.message == "store unavailable"));
  assert!(
    log
      .iter()
      .all(|e| e.trace.as_deref() == Some("caused by: connection reset"))
  );
}

#[tokio::test]
async fn panics_are_logged_once_and_answered_with_the_envelope() {
  let store = FlakyStore::new(Fault::Panic, false).await;
  let app = router(Arc::clone(&store));

  for (expected, (method, uri, body)) in (1..).zip(failing_requests()) {
    let (status, _, json) = send(&app, method, uri, body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
    assert_eq!(json, fixed_envelope(), "{method} {uri}");
    assert_eq!(store.list_error_log().await.unwrap().len(), expected);
  }

  let log = store.list_error_log().await.unwrap();
  assert!(log.iter().all(|e| e.message.contains("store exploded")));
}

#[tokio::test]
async fn failed_error_log_write_still_yields_the_envelope() {
  let store = FlakyStore::new(Fault::Error, true).await;
  let app = router(store);

  let (status, _, json) = send(&app, "GET", "/api/personas", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(json, fixed_envelope());
}

#[tokio::test]
async fn handled_errors_never_reach_the_error_log() {
  let store = FlakyStore::new(Fault::Error, false).await;
  let app = router(Arc::clone(&store));

  // Validation and parameter errors are answered before any store call.
  let (status, _, _) =
    send(&app, "POST", "/api/personas", Some(json!({ "email": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _, _) =
    send(&app, "GET", "/api/personas/buscar?filtro=edad&valor=3", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  assert!(store.list_error_log().await.unwrap().is_empty());
}
