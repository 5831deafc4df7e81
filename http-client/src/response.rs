use super::{ApiResult, DecodeError, RequestBuilder, RequestError};
use assert_impl::assert_impl;
use plume_http::{
    HeaderMap, Method, Response as HttpResponse, ResponseBody, ResponseError as HttpResponseError,
    ResponseErrorKind as HttpResponseErrorKind, StatusCode, Version,
};
use serde::de::DeserializeOwned;
use serde_json::{from_slice as parse_json_from_slice, Value};
use std::io::Read;

/// 跟随重定向后实际发出的最后一个请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRequest {
    method: Method,
    url: String,
}

impl LastRequest {
    /// 请求 HTTP 方法
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// 请求 URL
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// HTTP 响应
///
/// 包装传输层返回的响应，任何状态码（包括 4xx / 5xx）都会得到该结构体
#[derive(Debug)]
pub struct Response {
    inner: HttpResponse,
    cached_body: Option<Vec<u8>>,
    cached_text: Option<String>,
    request_url: String,
    last_request: Option<LastRequest>,
    original_builder: RequestBuilder,
}

impl Response {
    pub(crate) fn new(inner: HttpResponse, method: Method, request_url: String, original_builder: RequestBuilder) -> Self {
        let last_request = inner.final_url().map(|url| LastRequest {
            method: inner.final_method().cloned().unwrap_or(method),
            url: url.to_owned(),
        });
        Self {
            inner,
            cached_body: None,
            cached_text: None,
            request_url,
            last_request,
            original_builder,
        }
    }

    /// HTTP 状态码
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    /// HTTP 状态码数值
    #[inline]
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// HTTP 版本
    #[inline]
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// 响应是否包含指定的 HTTP Header，名称不区分大小写
    #[inline]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    /// 获取指定 HTTP Header 的全部值，名称不区分大小写
    ///
    /// 不存在时返回空列表
    pub fn get_header(&self, name: &str) -> Vec<String> {
        self.headers()
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect()
    }

    /// 获取响应体字符串
    ///
    /// 首次调用时读取全部响应体并缓存，之后的调用直接返回缓存内容。
    /// 非 UTF-8 字符将被替换为 `U+FFFD`。
    pub fn body(&mut self) -> Result<&str, RequestError> {
        if self.cached_text.is_none() {
            let text = String::from_utf8_lossy(self.body_bytes()?).into_owned();
            self.cached_text = Some(text);
        }
        Ok(self.cached_text.as_deref().unwrap_or_default())
    }

    /// 获取响应体二进制数据
    ///
    /// 与 [`Response::body`] 共享同一份缓存
    pub fn body_bytes(&mut self) -> Result<&[u8], RequestError> {
        if self.cached_body.is_none() {
            let mut buf = Vec::new();
            self.inner.body_mut().read_to_end(&mut buf).map_err(|err| {
                HttpResponseError::builder(HttpResponseErrorKind::ReceiveError, err)
                    .url(self.request_url.as_str())
                    .build()
            })?;
            self.cached_body = Some(buf);
        }
        Ok(self.cached_body.as_deref().unwrap_or_default())
    }

    /// 获取响应体输入流
    ///
    /// 如果响应体已经通过 [`Response::body`] 读取过，输入流将为空
    #[inline]
    pub fn body_raw(&mut self) -> &mut ResponseBody {
        self.inner.body_mut()
    }

    /// 将响应体解析为 JSON
    pub fn json(&mut self) -> ApiResult<Value> {
        self.parse_json()
    }

    /// 将响应体解析为指定类型
    pub fn parse_json<T: DeserializeOwned>(&mut self) -> ApiResult<T> {
        let body = self.body_bytes()?;
        Ok(parse_json_from_slice(body).map_err(DecodeError::from)?)
    }

    /// 请求是否成功，即状态码为 200、201 或 204
    #[inline]
    pub fn successful(&self) -> bool {
        matches!(self.code(), 200 | 201 | 204)
    }

    /// 请求是否失败，即状态码大于等于 400
    #[inline]
    pub fn failure(&self) -> bool {
        self.code() >= 400
    }

    /// 状态码是否为 201
    #[inline]
    pub fn created(&self) -> bool {
        self.code() == 201
    }

    /// 状态码是否为 204
    #[inline]
    pub fn no_content(&self) -> bool {
        self.code() == 204
    }

    /// 状态码是否为 404
    #[inline]
    pub fn not_found(&self) -> bool {
        self.code() == 404
    }

    /// 状态码是否为 401
    #[inline]
    pub fn unauthorized(&self) -> bool {
        self.code() == 401
    }

    /// 状态码是否为 403
    #[inline]
    pub fn forbidden(&self) -> bool {
        self.code() == 403
    }

    /// 状态码是否为 400
    #[inline]
    pub fn bad_request(&self) -> bool {
        self.code() == 400
    }

    /// 是否为服务端错误，即状态码大于等于 500
    #[inline]
    pub fn server_error(&self) -> bool {
        self.code() >= 500
    }

    /// 是否为客户端错误，即状态码在 400 到 499 之间
    #[inline]
    pub fn client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }

    /// 跟随重定向后实际发出的最后一个请求
    ///
    /// 仅当传输层跟随了重定向时存在
    #[inline]
    pub fn last_request(&self) -> Option<&LastRequest> {
        self.last_request.as_ref()
    }

    /// 最后一次重定向的目标 URL，没有发生重定向时返回空字符串
    #[inline]
    pub fn redirect_url(&self) -> String {
        self.last_request
            .as_ref()
            .map(|req| req.url.to_owned())
            .unwrap_or_default()
    }

    /// 发出该请求时构建器的快照
    ///
    /// 之后对原构建器的修改不会反映在快照中
    #[inline]
    pub fn original_builder(&self) -> &RequestBuilder {
        &self.original_builder
    }

    /// 转换为传输层响应
    #[inline]
    pub fn into_inner(self) -> HttpResponse {
        self.inner
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::RecordingHttpCaller, Config, Error};
    use plume_http::{header::SET_COOKIE, HeaderValue};
    use serde::Deserialize;
    use serde_json::json;
    use std::{
        io::{Cursor, Error as IoError, ErrorKind as IoErrorKind, Result as IoResult},
        sync::Arc,
    };

    fn make_builder() -> RequestBuilder {
        RequestBuilder::with_config(Config::new(), Arc::new(RecordingHttpCaller::fixed(200, "")))
    }

    fn make_response(status_code: u16, body: &[u8]) -> Response {
        Response::new(
            HttpResponse::builder()
                .status_code(StatusCode::from_u16(status_code).unwrap())
                .body(ResponseBody::from_reader(Cursor::new(body.to_vec())))
                .build(),
            Method::GET,
            "https://api.test/widgets".to_owned(),
            make_builder(),
        )
    }

    #[test]
    fn test_status_predicates() {
        env_logger::builder().is_test(true).try_init().ok();

        type Predicate = fn(&Response) -> bool;
        let cases: [(Predicate, &[u16]); 10] = [
            (Response::successful, &[200, 201, 204]),
            (Response::failure, &[400, 401, 403, 404, 418, 499, 500, 503, 599]),
            (Response::created, &[201]),
            (Response::no_content, &[204]),
            (Response::not_found, &[404]),
            (Response::unauthorized, &[401]),
            (Response::forbidden, &[403]),
            (Response::bad_request, &[400]),
            (Response::server_error, &[500, 503, 599]),
            (Response::client_error, &[400, 401, 403, 404, 418, 499]),
        ];
        let codes = [
            100, 200, 201, 202, 204, 301, 302, 399, 400, 401, 403, 404, 418, 499, 500, 503, 599,
        ];
        for (predicate, expected) in cases {
            for code in codes {
                assert_eq!(
                    predicate(&make_response(code, b"")),
                    expected.contains(&code),
                    "code {}",
                    code
                );
            }
        }
        assert_eq!(make_response(418, b"").code(), 418);
    }

    #[test]
    fn test_body_is_memoized() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let mut response = make_response(200, b"hello \xF0\x28world");
        let first = response.body()?.to_owned();
        let second = response.body()?.to_owned();
        assert_eq!(first, second);
        assert_eq!(first, "hello \u{FFFD}(world");
        assert_eq!(response.body_bytes()?, b"hello \xF0\x28world");

        let mut rest = Vec::new();
        response.body_raw().read_to_end(&mut rest)?;
        assert!(rest.is_empty());
        Ok(())
    }

    #[test]
    fn test_body_read_error() {
        env_logger::builder().is_test(true).try_init().ok();

        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> IoResult<usize> {
                Err(IoError::new(IoErrorKind::ConnectionReset, "reset"))
            }
        }

        let mut response = Response::new(
            HttpResponse::builder().body(ResponseBody::from_reader(Broken)).build(),
            Method::GET,
            "https://api.test/widgets".to_owned(),
            make_builder(),
        );
        let err = response.body().unwrap_err();
        assert_eq!(err.kind(), HttpResponseErrorKind::ReceiveError);
        assert_eq!(err.url(), Some("https://api.test/widgets"));
    }

    #[test]
    fn test_json() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let mut response = make_response(200, br#"{"a":1}"#);
        assert_eq!(response.json()?, json!({"a": 1}));
        assert_eq!(response.body()?, r#"{"a":1}"#);

        #[derive(Debug, Deserialize, PartialEq)]
        struct Payload {
            a: u32,
        }
        assert_eq!(response.parse_json::<Payload>()?, Payload { a: 1 });

        let mut response = make_response(200, b"not json");
        assert!(matches!(response.json(), Err(Error::Decode(_))));
        assert_eq!(response.body()?, "not json");
        Ok(())
    }

    #[test]
    fn test_headers_and_redirect() {
        env_logger::builder().is_test(true).try_init().ok();

        let inner = HttpResponse::builder()
            .status_code(StatusCode::OK)
            .header(SET_COOKIE, HeaderValue::from_static("a=1"))
            .header(SET_COOKIE, HeaderValue::from_static("b=2"))
            .final_url("https://api.test/new")
            .final_method(Method::GET)
            .build();
        let response = Response::new(inner, Method::POST, "https://api.test/old".to_owned(), make_builder());
        assert!(response.has_header("Set-Cookie"));
        assert!(response.has_header("set-cookie"));
        assert!(!response.has_header("x-missing"));
        assert!(!response.has_header("bad header"));
        assert_eq!(response.get_header("SET-COOKIE"), ["a=1", "b=2"]);
        assert!(response.get_header("x-missing").is_empty());
        assert_eq!(response.redirect_url(), "https://api.test/new");
        let last_request = response.last_request().unwrap();
        assert_eq!(last_request.method(), Method::GET);
        assert_eq!(last_request.url(), "https://api.test/new");

        let inner = HttpResponse::builder().final_url("https://api.test/new").build();
        let response = Response::new(inner, Method::PUT, "https://api.test/old".to_owned(), make_builder());
        assert_eq!(
            response.last_request().map(|req| req.method().to_owned()),
            Some(Method::PUT)
        );

        let response = make_response(200, b"");
        assert_eq!(response.last_request(), None);
        assert_eq!(response.redirect_url(), "");
        assert_eq!(response.into_inner().status_code(), StatusCode::OK);
    }
}
