use super::{Body, ResponseError};
use assert_impl::assert_impl;
use http::{
    header::{AsHeaderName, HeaderMap, HeaderName, HeaderValue},
    method::Method,
    status::StatusCode,
    Version,
};
use std::{default::Default, mem::take, result};

#[derive(Debug, Clone)]
struct ResponseParts {
    status_code: StatusCode,
    version: Version,
    headers: HeaderMap,
    final_url: Option<String>,
    final_method: Option<Method>,
}

impl Default for ResponseParts {
    #[inline]
    fn default() -> Self {
        Self {
            status_code: StatusCode::OK,
            version: Version::HTTP_11,
            headers: Default::default(),
            final_url: None,
            final_method: None,
        }
    }
}

/// HTTP 响应
///
/// 封装 HTTP 响应相关字段
#[derive(Debug, Default)]
pub struct Response {
    parts: ResponseParts,
    body: Body,
}

impl Response {
    /// 返回 HTTP 响应构建器
    #[inline]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// HTTP 状态码
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.parts.status_code
    }

    /// HTTP 版本
    #[inline]
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// 获取 HTTP 响应 Header
    #[inline]
    pub fn header(&self, header_name: impl AsHeaderName) -> Option<&HeaderValue> {
        self.parts.headers.get(header_name)
    }

    /// 跟随重定向后最终请求的 URL
    ///
    /// 仅当传输层报告的最终 URL 与原始请求 URL 不同时才存在
    #[inline]
    pub fn final_url(&self) -> Option<&str> {
        self.parts.final_url.as_deref()
    }

    /// 跟随重定向后最终请求使用的 HTTP 方法
    ///
    /// 传输层跟随 301 / 302 / 303 重定向时可能将方法改为 GET
    #[inline]
    pub fn final_method(&self) -> Option<&Method> {
        self.parts.final_method.as_ref()
    }

    /// 修改 HTTP 响应体
    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
    }
}

/// HTTP 响应构建器
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    inner: Response,
}

impl ResponseBuilder {
    /// 设置 HTTP 状态码
    #[inline]
    pub fn status_code(&mut self, status_code: StatusCode) -> &mut Self {
        self.inner.parts.status_code = status_code;
        self
    }

    /// 设置 HTTP 版本
    #[inline]
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.inner.parts.version = version;
        self
    }

    /// 追加 HTTP Header
    ///
    /// 同名 Header 不会被覆盖
    #[inline]
    pub fn header(&mut self, header_name: HeaderName, header_value: HeaderValue) -> &mut Self {
        self.inner.parts.headers.append(header_name, header_value);
        self
    }

    /// 设置跟随重定向后最终请求的 URL
    #[inline]
    pub fn final_url(&mut self, final_url: impl Into<String>) -> &mut Self {
        self.inner.parts.final_url = Some(final_url.into());
        self
    }

    /// 设置跟随重定向后最终请求使用的 HTTP 方法
    ///
    /// 设置了最终 URL 的传输层应当同时设置该方法
    #[inline]
    pub fn final_method(&mut self, final_method: Method) -> &mut Self {
        self.inner.parts.final_method = Some(final_method);
        self
    }

    /// 设置 HTTP 响应体
    #[inline]
    pub fn body(&mut self, body: Body) -> &mut Self {
        self.inner.body = body;
        self
    }

    /// 构建 HTTP 响应，同时构建器被重置
    #[inline]
    pub fn build(&mut self) -> Response {
        take(&mut self.inner)
    }
}

/// HTTP 响应结果
pub type Result = result::Result<Response, ResponseError>;
