//! Framework-neutral HTTP adapter.
//!
//! A handler extracts named text arguments from a request, calls
//! `call_with_named_strings`, and encodes the results with a
//! [`ResultWriter`]. Binding failures answer 400, function errors 500.

use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{json, Value as Json};
use tracing::{debug, warn};

use callkit_core::config::HttpConfig;
use callkit_core::errors::{CallError, CallkitErrorCode, HttpError};
use callkit_core::tracing::fields;
use callkit_core::{Context, Value};
use callkit_engine::Wrapper;

use crate::message::user_message;

/// The parts of a request the adapter reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Where named arguments come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSource {
    /// `a=1&b=x`, percent-decoded, `+` as space.
    Query,
    /// Every header, by name as sent.
    Headers,
    /// A JSON object; string members as-is, others as their JSON text.
    JsonBody,
    /// Sources applied in order; later sources override earlier ones.
    Merge(Vec<ArgumentSource>),
}

impl ArgumentSource {
    pub fn extract(
        &self,
        request: &HttpRequest,
        max_body_bytes: usize,
    ) -> Result<HashMap<String, String>, HttpError> {
        let mut args = HashMap::new();
        self.extract_into(request, max_body_bytes, &mut args)?;
        Ok(args)
    }

    fn extract_into(
        &self,
        request: &HttpRequest,
        max_body_bytes: usize,
        args: &mut HashMap<String, String>,
    ) -> Result<(), HttpError> {
        match self {
            Self::Query => args.extend(parse_query(&request.query)?),
            Self::Headers => args.extend(request.headers.iter().cloned()),
            Self::JsonBody => args.extend(parse_json_body(&request.body, max_body_bytes)?),
            Self::Merge(sources) => {
                for source in sources {
                    source.extract_into(request, max_body_bytes, args)?;
                }
            }
        }
        Ok(())
    }
}

/// Parse an `application/x-www-form-urlencoded` string.
pub fn parse_query(query: &str) -> Result<Vec<(String, String)>, HttpError> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((percent_decode(name)?, percent_decode(value)?))
        })
        .collect()
}

fn percent_decode(text: &str) -> Result<String, HttpError> {
    let invalid = |message: String| HttpError::InvalidQuery { message };
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| invalid(format!("bad percent escape in {text:?}")))?;
                out.push(hex);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| invalid(e.to_string()))
}

fn parse_json_body(body: &[u8], max_body_bytes: usize) -> Result<Vec<(String, String)>, HttpError> {
    if body.len() > max_body_bytes {
        return Err(HttpError::BodyTooLarge {
            limit: max_body_bytes,
            actual: body.len(),
        });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let json: Json = serde_json::from_slice(body).map_err(|e| HttpError::InvalidBody {
        message: e.to_string(),
    })?;
    let Json::Object(members) = json else {
        return Err(HttpError::InvalidBody {
            message: "expected a JSON object".to_string(),
        });
    };
    Ok(members
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Json::String(s) => s,
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

/// How results become a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultWriter {
    /// One result as itself, several as an array.
    Json,
    /// `<results><result>...</result></results>`.
    Xml,
    /// Canonical text, one result per line.
    PlainText,
    /// The first result's bytes: a string or a sequence of bytes.
    Binary { content_type: String },
    /// Ignores results and redirects.
    Redirect { location: String, status: u16 },
}

impl FromStr for ResultWriter {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "text" => Ok(Self::PlainText),
            "binary" => Ok(Self::Binary {
                content_type: "application/octet-stream".to_string(),
            }),
            other => Err(HttpError::UnknownFormat {
                name: other.to_string(),
            }),
        }
    }
}

impl ResultWriter {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::PlainText => "text",
            Self::Binary { .. } => "binary",
            Self::Redirect { .. } => "redirect",
        }
    }

    pub fn write(&self, results: &[Value]) -> Result<HttpResponse, HttpError> {
        match self {
            Self::Json => {
                let body = match results {
                    [] => Json::Null,
                    [single] => single.to_json(),
                    many => Json::Array(many.iter().map(Value::to_json).collect()),
                };
                Ok(HttpResponse::new(200, "application/json", body.to_string()))
            }
            Self::Xml => Ok(HttpResponse::new(200, "application/xml", write_xml(results)?)),
            Self::PlainText => {
                let lines: Vec<String> = results.iter().map(Value::to_text).collect();
                Ok(HttpResponse::new(200, "text/plain; charset=utf-8", lines.join("\n")))
            }
            Self::Binary { content_type } => {
                let bytes = match results.first() {
                    None => Vec::new(),
                    Some(value) => binary_bytes(value)?,
                };
                Ok(HttpResponse::new(200, content_type, bytes))
            }
            Self::Redirect { location, status } => Ok(HttpResponse {
                status: *status,
                headers: vec![("Location".to_string(), location.clone())],
                body: Vec::new(),
            }),
        }
    }
}

fn binary_bytes(value: &Value) -> Result<Vec<u8>, HttpError> {
    let encode_error = |message: &str| HttpError::Encode {
        format: "binary".to_string(),
        message: message.to_string(),
    };
    match value {
        Value::Text(s) => Ok(s.clone().into_bytes()),
        Value::Optional(None) => Ok(Vec::new()),
        Value::Optional(Some(inner)) => binary_bytes(inner),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| encode_error("sequence elements must be bytes"))
            })
            .collect(),
        other => Err(encode_error(&format!("cannot write a {} result", other.kind_name()))),
    }
}

fn write_xml(results: &[Value]) -> Result<Vec<u8>, HttpError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, "results", None)?;
    for value in results {
        write_element(&mut writer, "result", Some(value))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("results")))
        .map_err(xml_error)?;
    Ok(writer.into_inner().into_inner())
}

fn xml_error(e: impl std::fmt::Display) -> HttpError {
    HttpError::Encode {
        format: "xml".to_string(),
        message: e.to_string(),
    }
}

/// Write `<tag>` and, for a value, its content and `</tag>`.
/// Without a value only the start tag is written.
fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, value: Option<&Value>) -> Result<(), HttpError> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_error)?;
    let Some(value) = value else {
        return Ok(());
    };
    match value {
        Value::Sequence(items) => {
            for item in items {
                write_element(writer, "item", Some(item))?;
            }
        }
        Value::Composite(fields) => {
            for (name, field) in fields {
                write_element(writer, name, Some(field))?;
            }
        }
        Value::Optional(None) => {}
        Value::Optional(Some(inner)) => {
            writer
                .write_event(Event::Text(BytesText::new(&inner.to_text())))
                .map_err(xml_error)?;
        }
        other => {
            writer
                .write_event(Event::Text(BytesText::new(&other.to_text())))
                .map_err(xml_error)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_error)
}

/// One wrapper behind one route.
pub struct HttpHandler {
    wrapper: Arc<dyn Wrapper>,
    source: ArgumentSource,
    writer: ResultWriter,
    max_body_bytes: usize,
}

impl HttpHandler {
    /// Query arguments, results in the configured format.
    pub fn from_config(wrapper: Arc<dyn Wrapper>, config: &HttpConfig) -> Result<Self, HttpError> {
        Ok(Self {
            wrapper,
            source: ArgumentSource::Query,
            writer: config.effective_result_format().parse()?,
            max_body_bytes: config.effective_max_body_bytes(),
        })
    }

    pub fn new(wrapper: Arc<dyn Wrapper>, source: ArgumentSource, writer: ResultWriter) -> Self {
        Self {
            wrapper,
            source,
            writer,
            max_body_bytes: HttpConfig::default().effective_max_body_bytes(),
        }
    }

    pub fn with_source(mut self, source: ArgumentSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_writer(mut self, writer: ResultWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn handle(&self, ctx: &Context, request: &HttpRequest) -> HttpResponse {
        let name = self.wrapper.name();
        debug!(
            { fields::FUNCTION } = name,
            method = %request.method,
            path = %request.path,
            "handling request"
        );
        let args = match self.source.extract(request, self.max_body_bytes) {
            Ok(args) => args,
            Err(e) => return error_response(e.status(), e.error_code(), &e.to_string()),
        };
        let results = match self.wrapper.call_with_named_strings(ctx, &args) {
            Ok(results) => results,
            Err(e) => {
                let status = call_status(&e);
                if status >= 500 {
                    warn!({ fields::FUNCTION } = name, error = %e, "function failed");
                }
                return error_response(status, e.error_code(), &user_message(&e));
            }
        };
        self.writer.write(&results).unwrap_or_else(|e| {
            warn!({ fields::FUNCTION } = name, error = %e, format = self.writer.name(), "cannot encode results");
            error_response(e.status(), e.error_code(), &e.to_string())
        })
    }
}

/// 400 for binding failures, 500 for the function's own error.
pub fn call_status(err: &CallError) -> u16 {
    if err.is_function_error() {
        500
    } else {
        400
    }
}

fn error_response(status: u16, code: &str, message: &str) -> HttpResponse {
    let body = json!({ "code": code, "error": message });
    HttpResponse::new(status, "application/json", body.to_string())
}
