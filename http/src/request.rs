use super::Multipart;
use assert_impl::assert_impl;
use http::{
    header::{HeaderMap, HeaderValue, IntoHeaderName},
    method::Method,
};
use std::{default::Default, mem::take};
use url::{ParseError as UrlParseError, Url};

/// HTTP 查询参数
///
/// 设置后将替换请求 URL 中原有的查询字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// 查询参数对，发送前会进行 URL 编码
    Pairs(Vec<(String, String)>),

    /// 原始查询字符串，不做任何编码
    Raw(String),
}

/// URL 编码的表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    /// 创建空表单
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// 追加表单字段
    #[inline]
    #[must_use]
    pub fn append_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// 获取全部表单字段
    #[inline]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// 表单是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 编码为 `application/x-www-form-urlencoded` 格式
    pub fn encode(&self) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs.iter() {
            form.append_pair(k, v);
        }
        form.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Form {
    #[inline]
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// HTTP 请求体
#[derive(Debug, Default)]
#[non_exhaustive]
pub enum RequestBody {
    /// 无请求体
    #[default]
    Empty,

    /// URL 编码的表单请求体
    Form(Form),

    /// Multipart 表单请求体
    Multipart(Multipart),
}

impl RequestBody {
    /// 请求体是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// HTTP 请求
///
/// 封装传输层发送请求所需的全部字段
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    url: String,
    query: Option<Query>,
    headers: HeaderMap,
    body: RequestBody,
}

impl Request {
    /// 创建 HTTP 请求构建器
    #[inline]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// 获取请求 HTTP 方法
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// 获取请求目标 URL
    ///
    /// 不包含 [`Request::query`] 设置的查询参数
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 获取查询参数
    #[inline]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// 获取请求 HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 获取请求体
    #[inline]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// 取出请求体，原位置留下空请求体
    #[inline]
    pub fn take_body(&mut self) -> RequestBody {
        take(&mut self.body)
    }

    /// 计算最终发送的 URL
    ///
    /// 如果设置了查询参数，将替换目标 URL 中原有的查询字符串
    pub fn effective_url(&self) -> Result<Url, UrlParseError> {
        let mut url = Url::parse(&self.url)?;
        match &self.query {
            Some(Query::Pairs(pairs)) => {
                url.set_query(None);
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs.iter());
                }
            }
            Some(Query::Raw(raw)) if raw.is_empty() => url.set_query(None),
            Some(Query::Raw(raw)) => url.set_query(Some(raw)),
            None => {}
        }
        Ok(url)
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}

/// HTTP 请求构建器
#[derive(Debug, Default)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    /// 设置请求 HTTP 方法
    #[inline]
    pub fn method(&mut self, method: Method) -> &mut Self {
        self.inner.method = method;
        self
    }

    /// 设置请求目标 URL
    #[inline]
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.inner.url = url.into();
        self
    }

    /// 设置查询参数
    #[inline]
    pub fn query(&mut self, query: Query) -> &mut Self {
        self.inner.query = Some(query);
        self
    }

    /// 设置请求 HTTP Headers
    #[inline]
    pub fn headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.inner.headers = headers;
        self
    }

    /// 插入请求 HTTP Header
    #[inline]
    pub fn header(&mut self, header_name: impl IntoHeaderName, header_value: impl Into<HeaderValue>) -> &mut Self {
        self.inner.headers.insert(header_name, header_value.into());
        self
    }

    /// 设置请求体
    #[inline]
    pub fn body(&mut self, body: RequestBody) -> &mut Self {
        self.inner.body = body;
        self
    }

    /// 构建 HTTP 请求，同时构建器被重置
    #[inline]
    pub fn build(&mut self) -> Request {
        take(&mut self.inner)
    }
}
