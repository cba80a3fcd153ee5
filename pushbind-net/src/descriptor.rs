//! Description of one remote call and the shape its success body decodes into.

use crate::error::DecodeError;
use crate::transport::RawRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// HTTP method of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes a raw success body into `T`.
pub type Decoder<T> = fn(&[u8]) -> Result<T, DecodeError>;

/// JSON decoder for any deserializable `T`. An empty body is an error.
pub fn json_decoder<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
}

/// Everything the executor needs to perform and classify one call.
pub struct CallDescriptor<T> {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    decoder: Decoder<T>,
}

impl<T: DeserializeOwned> CallDescriptor<T> {
    /// A call whose success body is JSON-decoded into `T`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::with_decoder(method, path, json_decoder::<T>)
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }
}

impl<T> CallDescriptor<T> {
    /// A call with a custom success decoder.
    pub fn with_decoder(method: Method, path: impl Into<String>, decoder: Decoder<T>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            decoder,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds an `Authorization: Bearer` header.
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Sets a JSON body and the matching content type.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self.header("Content-Type", "application/json"))
    }

    /// Sets a raw body.
    pub fn raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decodes a success body with this call's decoder.
    pub fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        (self.decoder)(bytes)
    }

    /// Splits into the transport request and the decoder.
    pub(crate) fn into_parts(self) -> (RawRequest, Decoder<T>) {
        let request = RawRequest {
            method: self.method,
            path: self.path,
            headers: self.headers,
            body: self.body,
        };
        (request, self.decoder)
    }
}

impl<T> fmt::Debug for CallDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers.len())
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}
