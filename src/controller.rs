//! Generic CRUD synchronization for one resource type.
//!
//! Every admin page does the same thing: load the list, normalize field
//! names, submit a create/update/delete from a modal form, reload. The
//! controller owns that cycle for one resource type and reports each outcome
//! to a [`Notifier`] exactly once.
//!
//! There is no cancellation and no request deduplication. Two overlapping
//! [`ResourceSyncController::list`] calls both replace the cache, in whatever
//! order their responses arrive.

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{parse_endpoint, ApiConfig};
use crate::error::SyncError;
use crate::field_map::{pascal_case, FieldMap};
use crate::kinds::ResourceKind;
use crate::notify::{Notification, Notifier, Renderer, Severity};
use crate::resource::{NormalizedResource, PendingOperation, Resource, ResourceList};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Load state of the cached list. Writes do not change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
}

#[derive(Debug)]
struct Cache {
    state: LoadState,
    list: ResourceList,
}

pub struct ResourceSyncController {
    resource: String,
    label: String,
    endpoint: Url,
    field_map: FieldMap,
    required_fields: Vec<String>,
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn Notifier>,
    renderer: Option<Arc<dyn Renderer>>,
    cache: Mutex<Cache>,
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A list body is either a bare array or a `{ "data": [...] }` envelope.
/// Any other shape is an empty list.
fn unwrap_list_envelope(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// A write response is a record, optionally inside `{ "data": {...} }`.
fn parse_record(body: &str) -> Option<Resource> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed).ok()? {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Object(inner)) => Some(inner),
            Some(other) => {
                obj.insert("data".to_string(), other);
                Some(obj)
            }
            None => Some(obj),
        },
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("resource")
        .to_string()
}

impl ResourceSyncController {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Build a controller for one endpoint.
    ///
    /// Fails with [`SyncError::Config`] when `endpoint` is empty or not an
    /// absolute http(s) URL; the failure is also reported to `notifier`.
    pub fn configure<I, S>(
        endpoint: &str,
        field_map: FieldMap,
        required_fields: I,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoint = match parse_endpoint(endpoint) {
            Ok(url) => url,
            Err(err) => {
                notifier.notify(Notification::new(
                    "resource",
                    PendingOperation::List,
                    Severity::Error,
                    err.to_string(),
                ));
                return Err(err);
            }
        };

        let mut required: Vec<String> = Vec::new();
        for field in required_fields {
            let field = field.into();
            if !field_map.contains(&field) {
                warn!(field = %field, "required field is not part of the field map");
            }
            if !required.contains(&field) {
                required.push(field);
            }
        }

        let segment = last_path_segment(&endpoint);
        Ok(Self {
            resource: segment.to_ascii_lowercase(),
            label: pascal_case(&segment),
            endpoint,
            field_map,
            required_fields: required,
            transport,
            notifier,
            renderer: None,
            cache: Mutex::new(Cache {
                state: LoadState::Idle,
                list: ResourceList::new(),
            }),
        })
    }

    /// Controller for one of the built-in resource types.
    pub fn for_kind(
        config: &ApiConfig,
        kind: ResourceKind,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SyncError> {
        let endpoint = match config.endpoint(kind.path()) {
            Ok(url) => url,
            Err(err) => {
                notifier.notify(Notification::new(
                    kind.name(),
                    PendingOperation::List,
                    Severity::Error,
                    err.to_string(),
                ));
                return Err(err);
            }
        };
        Ok(Self::configure(
            endpoint.as_str(),
            kind.field_map(),
            kind.required_fields().iter().copied(),
            transport,
            notifier,
        )?
        .named(kind.name(), kind.label()))
    }

    /// Override the names used in logs (`resource`) and messages (`label`).
    pub fn named(mut self, resource: &str, label: &str) -> Self {
        self.resource = resource.to_string();
        self.label = label.to_string();
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    // -----------------------------------------------------------------------
    // Cache
    // -----------------------------------------------------------------------

    fn cache(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> LoadState {
        self.cache().state
    }

    /// Snapshot of the list from the last `list()` call.
    pub fn cached(&self) -> ResourceList {
        self.cache().list.clone()
    }

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    pub fn normalize(&self, raw: &Resource) -> NormalizedResource {
        NormalizedResource::from_canonical(self.field_map.normalize(raw))
    }

    fn normalize_value(&self, raw: &Value) -> NormalizedResource {
        match raw {
            Value::Object(obj) => self.normalize(obj),
            _ => self.normalize(&Map::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    fn notify(&self, op: &PendingOperation, severity: Severity, message: String) {
        self.notifier.notify(Notification::new(
            &self.resource,
            op.clone(),
            severity,
            message,
        ));
    }

    /// Report the outcome of a write exactly once.
    fn finish<T>(
        &self,
        op: &PendingOperation,
        result: Result<T, SyncError>,
        success: String,
    ) -> Result<T, SyncError> {
        match &result {
            Ok(_) => self.notify(op, Severity::Success, success),
            Err(err) => {
                warn!(resource = %self.resource, %op, error = %err, "operation failed");
                self.notify(op, Severity::Error, err.to_string());
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // List
    // -----------------------------------------------------------------------

    /// Fetch the full list and replace the cache with it.
    ///
    /// Never fails: on a non-2xx status, a transport failure or an
    /// unparsable body, the cache is cleared, an empty list is returned and
    /// one error notification is emitted.
    pub async fn list(&self) -> ResourceList {
        let op = PendingOperation::List;
        self.cache().state = LoadState::Loading;

        let request_id = Uuid::new_v4();
        let list = match self.fetch_list(request_id).await {
            Ok(list) => {
                info!(resource = %self.resource, %request_id, count = list.len(), "list loaded");
                list
            }
            Err(err) => {
                warn!(resource = %self.resource, %request_id, error = %err, "list failed");
                self.notify(&op, Severity::Error, err.to_string());
                ResourceList::new()
            }
        };

        {
            let mut cache = self.cache();
            cache.list = list.clone();
            cache.state = LoadState::Idle;
        }
        if let Some(renderer) = &self.renderer {
            renderer.render(&self.resource, &list);
        }
        list
    }

    async fn fetch_list(&self, request_id: Uuid) -> Result<ResourceList, SyncError> {
        debug!(resource = %self.resource, %request_id, url = %self.endpoint, "GET");
        let resp = self
            .transport
            .send(ApiRequest::get(self.endpoint.clone()))
            .await?;
        if !resp.is_success() {
            return Err(SyncError::fetch(format!(
                "Failed to load {} (HTTP {})",
                self.resource, resp.status
            )));
        }

        let value: Value = serde_json::from_str(resp.body.trim()).map_err(|e| {
            SyncError::fetch(format!("Invalid JSON while loading {}: {e}", self.resource))
        })?;
        Ok(unwrap_list_envelope(value)
            .iter()
            .map(|item| self.normalize_value(item))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    fn validate(&self, payload: &Resource) -> Result<(), SyncError> {
        match self
            .required_fields
            .iter()
            .find(|field| is_blank(payload.get(field.as_str())))
        {
            Some(field) => Err(SyncError::validation(field.clone())),
            None => Ok(()),
        }
    }

    fn record_id(id: impl Display) -> Result<String, SyncError> {
        let id = id.to_string().trim().to_string();
        if id.is_empty() {
            return Err(SyncError::validation("id"));
        }
        Ok(id)
    }

    /// `endpoint/{id}` with the id percent-encoded as one path segment.
    fn record_url(&self, id: &str) -> Result<Url, SyncError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SyncError::config(format!("Endpoint cannot take an id: {}", self.endpoint))
            })?;
            segments.pop_if_empty().push(id);
        }
        Ok(url)
    }

    /// Send a request; any non-2xx status becomes `Remote`. Every outcome is
    /// logged with the request id.
    async fn send_checked(&self, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        let request_id = Uuid::new_v4();
        let method = request.method.clone();
        debug!(
            resource = %self.resource,
            %request_id,
            %method,
            url = %request.url,
            "request"
        );
        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(resource = %self.resource, %request_id, %method, error = %err, "transport failed");
                return Err(err.into());
            }
        };
        if !resp.is_success() {
            warn!(
                resource = %self.resource,
                %request_id,
                %method,
                status = resp.status,
                "request rejected"
            );
            return Err(SyncError::Remote {
                status: resp.status,
                body: resp.body,
            });
        }
        info!(resource = %self.resource, %request_id, %method, status = resp.status, "request accepted");
        Ok(resp)
    }

    /// Record returned by the server, or the submitted payload when the
    /// server answered without one.
    fn written_record(&self, resp: &ApiResponse, payload: &Resource) -> NormalizedResource {
        match parse_record(&resp.body) {
            Some(record) => self.normalize(&record),
            None => {
                debug!(resource = %self.resource, "write response has no record, echoing payload");
                self.normalize(payload)
            }
        }
    }

    async fn submit(
        &self,
        id: Option<&str>,
        payload: &Resource,
    ) -> Result<NormalizedResource, SyncError> {
        self.validate(payload)?;
        let body = Value::Object(self.field_map.denormalize(payload));
        let request = match id {
            Some(id) => ApiRequest::put(self.record_url(id)?, body),
            None => ApiRequest::post(self.endpoint.clone(), body),
        };
        let resp = self.send_checked(request).await?;
        Ok(self.written_record(&resp, payload))
    }

    /// Create a record. Required fields are checked before any request.
    pub async fn create(&self, payload: &Resource) -> Result<NormalizedResource, SyncError> {
        let op = PendingOperation::Create;
        let result = self.submit(None, payload).await;
        self.finish(&op, result, format!("{} created successfully", self.label))
    }

    /// Replace the record `id`. A missing record is `Remote { status: 404 }`.
    pub async fn update(
        &self,
        id: impl Display,
        payload: &Resource,
    ) -> Result<NormalizedResource, SyncError> {
        let raw_id = id.to_string();
        let op = PendingOperation::Update(raw_id.trim().to_string());
        let result = match Self::record_id(raw_id) {
            Ok(id) => self.submit(Some(&id), payload).await,
            Err(err) => Err(err),
        };
        self.finish(&op, result, format!("{} updated successfully", self.label))
    }

    /// Delete the record `id`. Success is a 2xx status; the body is ignored.
    pub async fn remove(&self, id: impl Display) -> Result<(), SyncError> {
        let raw_id = id.to_string();
        let op = PendingOperation::Delete(raw_id.trim().to_string());
        let result = match Self::record_id(raw_id) {
            Ok(id) => match self.record_url(&id) {
                Ok(url) => self.send_checked(ApiRequest::delete(url)).await.map(|_| ()),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        self.finish(&op, result, format!("{} deleted", self.label))
    }

    /// Fetch one record by id (the edit form loads it before opening).
    /// Reads never touch the cached list. A missing record is
    /// `Remote { status: 404 }`; a 2xx without a record is a fetch failure.
    pub async fn get(&self, id: impl Display) -> Result<NormalizedResource, SyncError> {
        let raw_id = id.to_string();
        let op = PendingOperation::Get(raw_id.trim().to_string());
        let result = self.fetch_one(raw_id).await;
        if let Err(err) = &result {
            warn!(resource = %self.resource, %op, error = %err, "operation failed");
            self.notify(&op, Severity::Error, err.to_string());
        }
        result
    }

    async fn fetch_one(&self, raw_id: String) -> Result<NormalizedResource, SyncError> {
        let id = Self::record_id(raw_id)?;
        let url = self.record_url(&id)?;
        let resp = self.send_checked(ApiRequest::get(url)).await?;
        parse_record(&resp.body)
            .map(|record| self.normalize(&record))
            .ok_or_else(|| {
                SyncError::fetch(format!("No {} record in response for #{id}", self.label))
            })
    }

    /// Modal form submit: update when editing an existing record, create
    /// otherwise.
    pub async fn save(
        &self,
        editing_id: Option<&str>,
        payload: &Resource,
    ) -> Result<NormalizedResource, SyncError> {
        match editing_id {
            Some(id) => self.update(id, payload).await,
            None => self.create(payload).await,
        }
    }

    /// [`save`](Self::save) followed by a full reload on success.
    pub async fn save_and_reload(
        &self,
        editing_id: Option<&str>,
        payload: &Resource,
    ) -> Result<ResourceList, SyncError> {
        self.save(editing_id, payload).await?;
        Ok(self.list().await)
    }

    /// [`remove`](Self::remove) followed by a full reload on success.
    pub async fn remove_and_reload(&self, id: impl Display) -> Result<ResourceList, SyncError> {
        self.remove(id).await?;
        Ok(self.list().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::notify::MemoryNotifier;
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::json;
    use std::collections::VecDeque;

    const ENDPOINT: &str = "https://localhost:7212/api/Product";

    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<ApiResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(200, "[]")))
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        renders: Mutex<Vec<(String, usize)>>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, resource: &str, list: &ResourceList) {
            self.renders
                .lock()
                .unwrap()
                .push((resource.to_string(), list.len()));
        }
    }

    fn obj(v: Value) -> Resource {
        v.as_object().cloned().unwrap()
    }

    fn products(
        responses: Vec<Result<ApiResponse, TransportError>>,
    ) -> (ResourceSyncController, Arc<ScriptedTransport>, Arc<MemoryNotifier>) {
        let transport = ScriptedTransport::new(responses);
        let notifier = Arc::new(MemoryNotifier::new());
        let controller = ResourceSyncController::configure(
            ENDPOINT,
            ResourceKind::Products.field_map(),
            ["productName", "userStoreId"],
            transport.clone(),
            notifier.clone(),
        )
        .unwrap()
        .named("products", "Product");
        (controller, transport, notifier)
    }

    #[test]
    fn test_configure_rejects_empty_and_malformed_endpoints() {
        for bad in ["", "   ", "Product", "ftp://host/api"] {
            let notifier = Arc::new(MemoryNotifier::new());
            let result = ResourceSyncController::configure(
                bad,
                FieldMap::new(),
                Vec::<String>::new(),
                ScriptedTransport::new(vec![]),
                notifier.clone(),
            );
            assert!(matches!(result, Err(SyncError::Config(_))), "{bad:?}");
            assert_eq!(notifier.count(Severity::Error), 1);
        }
    }

    #[test]
    fn test_configure_derives_names_and_dedupes_required() {
        let controller = ResourceSyncController::configure(
            "https://localhost:7212/api/UserStore/",
            ResourceKind::Stores.field_map(),
            ["storeName", "storeName", "merchantId"],
            ScriptedTransport::new(vec![]),
            Arc::new(MemoryNotifier::new()),
        )
        .unwrap();
        assert_eq!(controller.resource(), "userstore");
        assert_eq!(controller.required_fields(), &["storeName", "merchantId"]);
        assert_eq!(controller.state(), LoadState::Idle);
        assert!(controller.cached().is_empty());
    }

    #[tokio::test]
    async fn test_create_missing_required_field_never_hits_network() {
        let (controller, transport, notifier) = products(vec![]);

        let err = controller
            .create(&obj(json!({ "productName": "Widget" })))
            .await
            .unwrap_err();
        assert_eq!(err, SyncError::validation("userStoreId"));

        let err = controller
            .create(&obj(json!({ "productName": "   ", "userStoreId": 5 })))
            .await
            .unwrap_err();
        assert_eq!(err, SyncError::validation("productName"));

        let err = controller
            .update(3, &obj(json!({ "productName": "W", "userStoreId": null })))
            .await
            .unwrap_err();
        assert_eq!(err, SyncError::validation("userStoreId"));

        assert_eq!(transport.calls(), 0);
        assert_eq!(notifier.count(Severity::Error), 3);
    }

    #[tokio::test]
    async fn test_envelope_and_bare_array_produce_same_list() {
        let items = json!([
            { "ProductId": 1, "ProductName": "A" },
            { "productId": 2, "productName": "B", "isDeleted": true }
        ]);
        let (bare, _, _) = products(vec![Ok(ApiResponse::new(200, items.to_string()))]);
        let (wrapped, _, _) = products(vec![Ok(ApiResponse::new(
            200,
            json!({ "data": items }).to_string(),
        ))]);

        let a = bare.list().await;
        let b = wrapped.list().await;
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert_eq!(a.as_slice()[0].str("productName"), Some("A"));
        assert!(a.as_slice()[1].flag("isDeleted"));
    }

    #[tokio::test]
    async fn test_list_server_error_clears_cache_and_notifies_once() {
        let (controller, _, notifier) = products(vec![
            Ok(ApiResponse::new(200, r#"[{"productId":1}]"#)),
            Ok(ApiResponse::new(500, "boom")),
        ]);

        assert_eq!(controller.list().await.len(), 1);
        assert_eq!(controller.cached().len(), 1);

        let list = controller.list().await;
        assert!(list.is_empty());
        assert!(controller.cached().is_empty());
        assert_eq!(controller.state(), LoadState::Idle);

        let errors: Vec<_> = notifier
            .snapshot()
            .into_iter()
            .filter(|n| n.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].operation, PendingOperation::List);
        assert!(errors[0].message.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_list_transport_and_parse_failures_notify() {
        let (controller, _, notifier) = products(vec![
            Err(TransportError::new("Cannot reach localhost")),
            Ok(ApiResponse::new(200, "<html>")),
        ]);
        assert!(controller.list().await.is_empty());
        assert!(controller.list().await.is_empty());
        assert_eq!(notifier.count(Severity::Error), 2);
    }

    #[tokio::test]
    async fn test_list_unexpected_shape_is_empty_without_notification() {
        let (controller, _, notifier) = products(vec![
            Ok(ApiResponse::new(200, r#"{"items":[1,2]}"#)),
            Ok(ApiResponse::new(200, r#"[5, {"productId": 9}]"#)),
        ]);
        assert!(controller.list().await.is_empty());

        let list = controller.list().await;
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[0].get("productId"), Some(&Value::Null));
        assert_eq!(list.as_slice()[1].i64("productId"), Some(9));
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_list_feeds_renderer() {
        let renderer = Arc::new(RecordingRenderer::default());
        let (controller, _, _) = products(vec![
            Ok(ApiResponse::new(200, r#"[{"productId":1},{"productId":2}]"#)),
            Ok(ApiResponse::new(503, "")),
        ]);
        let controller = controller.with_renderer(renderer.clone());

        controller.list().await;
        controller.list().await;
        let renders = renderer.renders.lock().unwrap().clone();
        assert_eq!(
            renders,
            vec![("products".to_string(), 2), ("products".to_string(), 0)]
        );
    }

    #[tokio::test]
    async fn test_create_posts_server_keys_and_returns_normalized_record() {
        let (controller, transport, notifier) = products(vec![Ok(ApiResponse::new(
            201,
            r#"{"productId":1,"productName":"Widget","userStoreId":5,"isDeleted":false}"#,
        ))]);

        let created = controller
            .create(&obj(json!({ "productName": "Widget", "userStoreId": 5 })))
            .await
            .unwrap();
        assert_eq!(created.i64("productId"), Some(1));
        assert_eq!(created.str("productDescription"), Some(""));
        assert_eq!(created.get("typeId"), Some(&Value::Null));

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url.as_str(), ENDPOINT);
        assert_eq!(
            requests[0].body,
            Some(json!({ "ProductName": "Widget", "UserStoreId": 5 }))
        );

        let sent = notifier.snapshot();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Success);
        assert_eq!(sent[0].message, "Product created successfully");
    }

    #[tokio::test]
    async fn test_create_without_response_record_echoes_payload() {
        let (controller, _, _) = products(vec![
            Ok(ApiResponse::new(204, "")),
            Ok(ApiResponse::new(200, r#"{"data":{"ProductId":8,"ProductName":"W"}}"#)),
        ]);
        let payload = obj(json!({ "productName": "W", "userStoreId": 2 }));

        let echoed = controller.create(&payload).await.unwrap();
        assert_eq!(echoed.i64("userStoreId"), Some(2));
        assert_eq!(echoed.get("productId"), Some(&Value::Null));

        let unwrapped = controller.create(&payload).await.unwrap();
        assert_eq!(unwrapped.i64("productId"), Some(8));
    }

    #[tokio::test]
    async fn test_update_targets_record_url_and_surfaces_404() {
        let (controller, transport, notifier) = products(vec![
            Ok(ApiResponse::new(200, r#"{"productId":3,"productName":"New"}"#)),
            Ok(ApiResponse::new(404, "Not Found")),
        ]);
        let payload = obj(json!({ "productName": "New", "userStoreId": 5 }));

        let updated = controller.update(3, &payload).await.unwrap();
        assert_eq!(updated.str("productName"), Some("New"));

        let err = controller.update("77", &payload).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err,
            SyncError::Remote {
                status: 404,
                body: "Not Found".into()
            }
        );

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].url.as_str(), format!("{ENDPOINT}/3"));
        assert_eq!(requests[1].url.as_str(), format!("{ENDPOINT}/77"));
        assert_eq!(notifier.count(Severity::Success), 1);
        assert_eq!(notifier.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_remove_requires_2xx() {
        let (controller, transport, notifier) = products(vec![
            Ok(ApiResponse::new(200, "")),
            Ok(ApiResponse::new(404, "")),
        ]);

        controller.remove(1).await.unwrap();
        let err = controller.remove(1).await.unwrap_err();
        assert!(matches!(err, SyncError::Remote { status: 404, .. }));

        assert_eq!(transport.requests()[0].method, Method::DELETE);
        let sent = notifier.snapshot();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].message, "Product deleted");
        assert_eq!(sent[1].operation, PendingOperation::Delete("1".into()));
    }

    #[tokio::test]
    async fn test_get_returns_normalized_record_and_leaves_cache() {
        let (controller, transport, notifier) = products(vec![
            Ok(ApiResponse::new(200, r#"[{"productId":1},{"productId":2}]"#)),
            Ok(ApiResponse::new(200, r#"{"data":{"ProductId":2,"ProductName":"Lamp"}}"#)),
            Ok(ApiResponse::new(200, r#"{"productId":1,"productName":"Desk"}"#)),
        ]);
        controller.list().await;

        let wrapped = controller.get(2).await.unwrap();
        assert_eq!(wrapped.i64("productId"), Some(2));
        assert_eq!(wrapped.str("productName"), Some("Lamp"));
        assert!(!wrapped.flag("isDeleted"));

        let bare = controller.get("1").await.unwrap();
        assert_eq!(bare.str("productName"), Some("Desk"));

        let requests = transport.requests();
        assert_eq!(requests[1].method, Method::GET);
        assert_eq!(requests[1].url.as_str(), format!("{ENDPOINT}/2"));
        assert_eq!(controller.cached().len(), 2);
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_record_is_remote_404_and_notifies_once() {
        let (controller, _, notifier) = products(vec![
            Ok(ApiResponse::new(200, r#"[{"productId":1}]"#)),
            Ok(ApiResponse::new(404, "Not Found")),
            Ok(ApiResponse::new(200, "")),
        ]);
        controller.list().await;

        let err = controller.get(9).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        let err = controller.get(9).await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch { .. }));

        let sent = notifier.snapshot();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].severity, Severity::Error);
        assert_eq!(sent[0].operation, PendingOperation::Get("9".into()));
        assert_eq!(controller.cached().len(), 1);
    }

    #[tokio::test]
    async fn test_get_blank_id_never_hits_network() {
        let (controller, transport, notifier) = products(vec![]);
        assert_eq!(controller.get("").await.unwrap_err(), SyncError::validation("id"));
        assert_eq!(transport.calls(), 0);
        assert_eq!(notifier.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_write_transport_failure_is_fetch_error_notified_once() {
        let (controller, transport, notifier) = products(vec![
            Err(TransportError::new("Connection to localhost timed out")),
            Err(TransportError::new("Cannot reach localhost")),
        ]);
        let payload = obj(json!({ "productName": "W", "userStoreId": 1 }));

        let err = controller.create(&payload).await.unwrap_err();
        assert_eq!(err, SyncError::fetch("Connection to localhost timed out"));
        let err = controller.remove(4).await.unwrap_err();
        assert_eq!(err, SyncError::fetch("Cannot reach localhost"));

        assert_eq!(transport.calls(), 2);
        let sent = notifier.snapshot();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|n| n.severity == Severity::Error));
        assert_eq!(sent[0].operation, PendingOperation::Create);
        assert_eq!(sent[1].operation, PendingOperation::Delete("4".into()));
        assert_eq!(sent[1].message, "Cannot reach localhost");
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_locally() {
        let (controller, transport, notifier) = products(vec![]);
        let err = controller.remove("  ").await.unwrap_err();
        assert_eq!(err, SyncError::validation("id"));
        assert_eq!(transport.calls(), 0);
        assert_eq!(notifier.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_record_url_encodes_id() {
        let (controller, transport, _) = products(vec![Ok(ApiResponse::new(204, ""))]);
        controller.remove("a/b").await.unwrap();
        assert_eq!(
            transport.requests()[0].url.as_str(),
            format!("{ENDPOINT}/a%2Fb")
        );
    }

    #[tokio::test]
    async fn test_save_and_reload_refreshes_after_success_only() {
        let (controller, transport, _) = products(vec![
            Ok(ApiResponse::new(201, r#"{"productId":1}"#)),
            Ok(ApiResponse::new(200, r#"[{"productId":1}]"#)),
            Ok(ApiResponse::new(400, "bad")),
        ]);
        let payload = obj(json!({ "productName": "W", "userStoreId": 1 }));

        let list = controller.save_and_reload(None, &payload).await.unwrap();
        assert_eq!(list.len(), 1);
        assert!(controller.save_and_reload(Some("1"), &payload).await.is_err());

        let methods: Vec<Method> = transport.requests().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::POST, Method::GET, Method::PUT]);
        assert_eq!(controller.cached().len(), 1);
    }

    #[tokio::test]
    async fn test_normalize_is_stable_through_controller() {
        let (controller, _, _) = products(vec![]);
        let once = controller.normalize(&obj(json!({ "ProductName": "X", "UserStoreId": 5 })));
        let twice = controller.normalize(&once.clone().into_raw());
        assert_eq!(once, twice);
    }
}
