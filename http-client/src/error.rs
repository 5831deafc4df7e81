use assert_impl::assert_impl;
use plume_http::{ResponseError as HttpResponseError, ResponseErrorKind as HttpResponseErrorKind};
use serde_json::Error as JsonError;
use thiserror::Error;

/// 请求错误
///
/// 传输层无法完成一次请求时返回，例如域名解析失败、连接被拒绝、超时、URL 非法或附件无法读取。
/// 服务器返回的 4xx / 5xx 状态码不属于请求错误。
#[derive(Error, Debug)]
#[error(transparent)]
pub struct RequestError(#[from] HttpResponseError);

impl RequestError {
    /// 获取错误类型
    #[inline]
    pub fn kind(&self) -> HttpResponseErrorKind {
        self.0.kind()
    }

    /// 获取发生错误的请求 URL
    #[inline]
    pub fn url(&self) -> Option<&str> {
        self.0.url()
    }

    /// 转换为传输层错误
    #[inline]
    pub fn into_inner(self) -> HttpResponseError {
        self.0
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}

/// 响应体解析错误
#[derive(Error, Debug)]
#[error("Fetched body is not a json string: {0}")]
pub struct DecodeError(#[from] JsonError);

impl DecodeError {
    /// 转换为 JSON 解析错误
    #[inline]
    pub fn into_inner(self) -> JsonError {
        self.0
    }
}

/// 通过方法名调用了不存在的请求方法
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Method '{method}' does not exist on the http client")]
pub struct UnknownMethodError {
    method: String,
}

impl UnknownMethodError {
    #[inline]
    pub(crate) fn new(method: impl Into<String>) -> Self {
        Self { method: method.into() }
    }

    /// 获取被调用的方法名
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// HTTP 客户端错误
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// 请求错误
    #[error(transparent)]
    Request(#[from] RequestError),

    /// 响应体解析错误
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// 调用了不存在的请求方法
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethodError),
}

impl From<HttpResponseError> for Error {
    #[inline]
    fn from(err: HttpResponseError) -> Self {
        Self::Request(err.into())
    }
}

impl From<JsonError> for Error {
    #[inline]
    fn from(err: JsonError) -> Self {
        Self::Decode(err.into())
    }
}

/// HTTP 客户端结果
pub type ApiResult<T> = Result<T, Error>;
