use super::{FileAttachment, RequestError};
use indexmap::IndexMap;
use log::debug;
use plume_http::{
    Form, HeaderMap, HeaderName, HeaderValue, Method, Multipart, Part, PartMetadata, Query, Request, RequestBody,
    ResponseError, ResponseErrorKind,
};
use serde_json::Value;
use std::{fs::File, io::Error as IoError};

/// 表单字段
///
/// 按照插入顺序保存，同名字段后写入的覆盖先写入的
pub type Fields = IndexMap<String, Value>;

/// 文件附件，按照字段名分组
pub type Files = IndexMap<String, Vec<FileAttachment>>;

/// 请求 HTTP Headers，按照插入顺序保存
pub type Headers = IndexMap<String, String>;

/// 该字段的值将作为 URL 查询参数，而不是请求体
pub(crate) const QUERY_MARKER: &str = "query";

/// 方法覆盖时附带的表单字段
pub(crate) const METHOD_FIELD: &str = "_method";

/// 合并单次请求的表单数据
///
/// 构建器中已经累积的字段优先，新的字段按照原始顺序追加在后面
pub(crate) fn merge_fields(accumulated: &Fields, form_data: Fields) -> Fields {
    let mut merged = accumulated.to_owned();
    for (key, value) in form_data {
        merged.entry(key).or_insert(value);
    }
    merged
}

pub(crate) struct RequestOptions<'a> {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) fields: Fields,
    pub(crate) files: &'a Files,
    pub(crate) headers: &'a Headers,
}

impl RequestOptions<'_> {
    /// 生成传输层请求
    ///
    /// 附件文件在此时打开，由返回的请求持有，请求被释放时文件随之关闭
    pub(crate) fn into_request(self) -> Result<Request, RequestError> {
        let Self {
            method,
            url,
            mut fields,
            files,
            headers,
        } = self;

        let header_map = make_header_map(headers, &url)?;
        let query = fields.shift_remove(QUERY_MARKER).and_then(|value| make_query(&value));
        let body = if files.is_empty() {
            if fields.is_empty() {
                RequestBody::Empty
            } else {
                RequestBody::Form(make_form(&fields))
            }
        } else {
            RequestBody::Multipart(make_multipart(&fields, files, &url)?)
        };
        debug!(
            "build request: {} {}, query: {:?}, body: {}",
            method,
            url,
            query,
            body_mode(&body)
        );

        let mut builder = Request::builder();
        builder.method(method).url(url).headers(header_map).body(body);
        if let Some(query) = query {
            builder.query(query);
        }
        Ok(builder.build())
    }
}

fn body_mode(body: &RequestBody) -> &'static str {
    match body {
        RequestBody::Form(_) => "form",
        RequestBody::Multipart(_) => "multipart",
        _ => "empty",
    }
}

fn make_header_map(headers: &Headers, url: &str) -> Result<HeaderMap, RequestError> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            ResponseError::builder_with_msg(
                ResponseErrorKind::InvalidHeader,
                format!("invalid header name({}): {}", name, err),
            )
            .url(url)
            .build()
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            ResponseError::builder_with_msg(
                ResponseErrorKind::InvalidHeader,
                format!("invalid header value({}): {}", value, err),
            )
            .url(url)
            .build()
        })?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}

fn make_query(value: &Value) -> Option<Query> {
    match value {
        Value::Null => None,
        Value::String(raw) => Some(Query::Raw(raw.to_owned())),
        Value::Array(values) => {
            let mut pairs = Vec::new();
            for (index, value) in values.iter().enumerate() {
                flatten_value(index.to_string(), value, &mut pairs);
            }
            Some(Query::Pairs(pairs))
        }
        Value::Object(map) => {
            let mut pairs = Vec::new();
            for (key, value) in map.iter() {
                flatten_value(key.to_owned(), value, &mut pairs);
            }
            Some(Query::Pairs(pairs))
        }
        scalar => Some(Query::Raw(scalar_text(scalar))),
    }
}

fn make_form(fields: &Fields) -> Form {
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields.iter() {
        flatten_value(key.to_owned(), value, &mut pairs);
    }
    pairs.into_iter().collect()
}

fn make_multipart(fields: &Fields, files: &Files, url: &str) -> Result<Multipart, RequestError> {
    let mut multipart = Multipart::new();
    for (key, value) in fields.iter() {
        multipart = multipart.add_part(key.to_owned(), Part::text(multipart_text(value)));
    }
    for (field_name, attachments) in files.iter() {
        for attachment in attachments.iter() {
            multipart = multipart.add_part(field_name.to_owned(), make_file_part(attachment, url)?);
        }
    }
    Ok(multipart)
}

fn make_file_part(attachment: &FileAttachment, url: &str) -> Result<Part, RequestError> {
    let open_error = |err: IoError| {
        ResponseError::builder(ResponseErrorKind::LocalIoError, err)
            .url(url)
            .build()
    };
    let file = File::open(attachment.source_path()).map_err(open_error)?;
    let metadata = PartMetadata::default()
        .mime(mime_guess::from_path(attachment.display_name()).first_or_octet_stream())
        .file_name(attachment.display_name());
    Ok(Part::file(file).map_err(open_error)?.metadata(metadata))
}

fn flatten_value(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Array(values) => {
            for (index, value) in values.iter().enumerate() {
                flatten_value(format!("{}[{}]", key, index), value, pairs);
            }
        }
        Value::Object(map) => {
            for (sub_key, value) in map.iter() {
                flatten_value(format!("{}[{}]", key, sub_key), value, pairs);
            }
        }
        scalar => pairs.push((key, scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_owned(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) => "0".to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// multipart 中 false 为空字符串，与表单中的 "0" 不同
fn multipart_text(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        Value::Bool(false) => String::new(),
        scalar => scalar_text(scalar),
    }
}
