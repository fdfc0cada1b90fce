//! Request and response envelopes crossing the dispatch boundary

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::params::Parameters;

/// An inbound call: resource id plus raw, per-key JSON parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub resource: String,
    pub input: Vec<u8>,
    pub parameters: HashMap<String, Vec<u8>>,
    pub credentials: HashMap<String, String>,
    pub context: HashMap<String, String>,
}

impl ExecuteRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        ExecuteRequest {
            resource: resource.into(),
            ..Default::default()
        }
    }
}

/// Result of a dispatch. Exactly one of `output` and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteResponse {
    pub output: Option<Vec<u8>>,
    pub error: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl ExecuteResponse {
    pub fn success(output: Vec<u8>, metadata: HashMap<String, String>) -> Self {
        ExecuteResponse {
            output: Some(output),
            error: None,
            metadata,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ExecuteResponse {
            output: None,
            error: Some(message.into()),
            metadata: HashMap::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Deserialize the output payload, if there is one
    pub fn decode_output<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.output.as_deref().map(serde_json::from_slice)
    }
}

/// A request paired with its decoded parameters
#[derive(Debug, Clone)]
pub struct TypedRequest {
    request: ExecuteRequest,
    params: Parameters,
}

impl TypedRequest {
    pub fn new(request: ExecuteRequest) -> Self {
        let params = Parameters::from_raw(&request.parameters);
        TypedRequest { request, params }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn request(&self) -> &ExecuteRequest {
        &self.request
    }

    pub fn resource(&self) -> &str {
        &self.request.resource
    }

    pub fn input(&self) -> &[u8] {
        &self.request.input
    }

    pub fn credential(&self, key: &str) -> Option<&str> {
        self.request.credentials.get(key).map(String::as_str)
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.request.context.get(key).map(String::as_str)
    }

    pub fn into_request(self) -> ExecuteRequest {
        self.request
    }
}

impl From<ExecuteRequest> for TypedRequest {
    fn from(request: ExecuteRequest) -> Self {
        TypedRequest::new(request)
    }
}

/// Value builder for [`ExecuteRequest`].
///
/// Every step consumes the builder and hands back a new one, so a partially
/// built request can be cloned and extended independently.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    request: ExecuteRequest,
}

impl RequestBuilder {
    pub fn new(resource: impl Into<String>) -> Self {
        RequestBuilder {
            request: ExecuteRequest::new(resource),
        }
    }

    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.request.input = input.into();
        self
    }

    pub fn with_input_json<T: Serialize + ?Sized>(mut self, input: &T) -> serde_json::Result<Self> {
        self.request.input = serde_json::to_vec(input)?;
        Ok(self)
    }

    /// Add a parameter, JSON-encoding `value`
    pub fn parameter<T: Serialize + ?Sized>(self, key: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.with_raw_parameter(key, bytes))
    }

    pub fn with_raw_parameter(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.request.parameters.insert(key.into(), bytes.into());
        self
    }

    pub fn with_string(self, key: impl Into<String>, value: &str) -> Self {
        self.with_json_value(key, serde_json::Value::from(value))
    }

    pub fn with_int(self, key: impl Into<String>, value: i64) -> Self {
        self.with_json_value(key, serde_json::Value::from(value))
    }

    pub fn with_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.with_json_value(key, serde_json::Value::from(value))
    }

    fn with_json_value(self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.with_raw_parameter(key, value.to_string())
    }

    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.credentials.insert(key.into(), value.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.context.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ExecuteRequest {
        self.request
    }

    pub fn build_typed(self) -> TypedRequest {
        TypedRequest::new(self.request)
    }
}
