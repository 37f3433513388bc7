//! Immutable request snapshot consumed by the router and handed to actions.

use crate::ids::RequestId;
use crate::router::{last_value, ParamVec};
use http::Method;
use std::borrow::Cow;
use std::sync::Arc;

/// Everything the engine needs to know about one incoming request.
///
/// Built once by the host and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    raw_path: String,
    decoded_path: String,
    host: String,
    query_params: ParamVec,
    form_params: ParamVec,
}

impl RequestContext {
    /// Start building a context from a method and a request URI such as
    /// `/article/12?preview=1`.
    #[must_use]
    pub fn builder(method: Method, uri: &str) -> RequestContextBuilder {
        RequestContextBuilder::new(method, uri)
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path with the query string removed, still percent-encoded.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// [`raw_path`](Self::raw_path) after URL decoding (`+` becomes a space).
    #[must_use]
    pub fn decoded_path(&self) -> &str {
        &self.decoded_path
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn query_params(&self) -> &ParamVec {
        &self.query_params
    }

    #[must_use]
    pub fn form_params(&self) -> &ParamVec {
        &self.form_params
    }

    /// Last value for `name` in the query string.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        last_value(&self.query_params, name)
    }

    /// Last value for `name` in the form body.
    #[must_use]
    pub fn form_param(&self, name: &str) -> Option<&str> {
        last_value(&self.form_params, name)
    }
}

/// Decode a URL component the way form decoders do: `+` is a space and
/// `%XX` escapes are resolved. Invalid UTF-8 is replaced, bad escapes are
/// left untouched.
#[must_use]
pub fn url_decode(input: &str) -> String {
    let spaced: Cow<'_, str> = if input.contains('+') {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn parse_pairs(input: &[u8]) -> ParamVec {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Builder for [`RequestContext`].
#[derive(Debug)]
pub struct RequestContextBuilder {
    method: Method,
    uri: String,
    host: String,
    form_params: ParamVec,
    request_id: Option<String>,
}

impl RequestContextBuilder {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            host: String::new(),
            form_params: ParamVec::new(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn form_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.form_params.push((Arc::from(name), value.into()));
        self
    }

    /// Append the pairs of an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form_body(mut self, body: &[u8]) -> Self {
        self.form_params.extend(parse_pairs(body));
        self
    }

    /// Inbound correlation id; ignored unless it is a valid ULID.
    #[must_use]
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RequestContext {
        let (raw_path, query) = match self.uri.split_once('?') {
            Some((path, query)) => (path.to_string(), query),
            None => (self.uri.clone(), ""),
        };
        RequestContext {
            request_id: RequestId::from_header_or_new(self.request_id.as_deref()),
            method: self.method,
            decoded_path: url_decode(&raw_path),
            raw_path,
            host: self.host,
            query_params: parse_pairs(query.as_bytes()),
            form_params: self.form_params,
        }
    }
}
