use super::{config, options::Fields, ApiResult, RequestBuilder, RequestError, Response, Verb};
use serde_json::Value;
use std::path::Path;

/// HTTP 客户端接口
///
/// 描述请求构建器对外提供的固定接口，[`RequestBuilder`] 实现了该接口
pub trait HttpClient {
    /// 发出 GET 请求
    fn get(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError>;

    /// 发出 POST 请求
    fn post(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError>;

    /// 发出 PUT 请求
    fn put(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError>;

    /// 发出 PATCH 请求
    fn patch(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError>;

    /// 发出 DELETE 请求
    fn delete(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError>;

    /// 添加 HTTP Header
    fn add_header(&mut self, key: &str, value: &str) -> &mut Self;

    /// 添加 Bearer 认证信息
    fn bearer(&mut self, token: &str) -> &mut Self;

    /// 添加表单字段
    fn add_param(&mut self, key: &str, value: Value) -> &mut Self;

    /// 添加文件附件
    fn file(&mut self, field_name: &str, display_name: &str, source_path: &Path) -> &mut Self;
}

impl HttpClient for RequestBuilder {
    #[inline]
    fn get(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        self.request(Verb::Get, uri, form_data)
    }

    #[inline]
    fn post(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        self.request(Verb::Post, uri, form_data)
    }

    #[inline]
    fn put(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        self.request(Verb::Put, uri, form_data)
    }

    #[inline]
    fn patch(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        self.request(Verb::Patch, uri, form_data)
    }

    #[inline]
    fn delete(&self, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        self.request(Verb::Delete, uri, form_data)
    }

    #[inline]
    fn add_header(&mut self, key: &str, value: &str) -> &mut Self {
        RequestBuilder::add_header(self, key, value)
    }

    #[inline]
    fn bearer(&mut self, token: &str) -> &mut Self {
        RequestBuilder::bearer(self, token)
    }

    #[inline]
    fn add_param(&mut self, key: &str, value: Value) -> &mut Self {
        RequestBuilder::add_param(self, key, value)
    }

    #[inline]
    fn file(&mut self, field_name: &str, display_name: &str, source_path: &Path) -> &mut Self {
        RequestBuilder::file(self, field_name, display_name, source_path)
    }
}

/// HTTP 静态入口
///
/// 每次调用都会使用全局配置创建一个新的 [`RequestBuilder`] 并转发调用，
/// 返回构建器的方法可以继续链式调用。
///
/// ```no_run
/// use plume_http_client::Http;
///
/// # fn example() -> anyhow::Result<()> {
/// Http::set_base_url("https://api.example.com");
/// let mut response = Http::bearer("t0k3n").add_param("name", "plume").post("/widgets")?;
/// println!("{}: {}", response.code(), response.body()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Http;

impl Http {
    /// 使用全局配置创建构建器
    #[inline]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// 发出 GET 请求
    #[inline]
    pub fn get(uri: &str) -> Result<Response, RequestError> {
        Self::builder().get(uri)
    }

    /// 携带表单数据发出 GET 请求
    #[inline]
    pub fn get_with<K: Into<String>, V: Into<Value>>(
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        Self::builder().get_with(uri, form_data)
    }

    /// 发出 POST 请求
    #[inline]
    pub fn post(uri: &str) -> Result<Response, RequestError> {
        Self::builder().post(uri)
    }

    /// 携带表单数据发出 POST 请求
    #[inline]
    pub fn post_with<K: Into<String>, V: Into<Value>>(
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        Self::builder().post_with(uri, form_data)
    }

    /// 发出 PUT 请求
    #[inline]
    pub fn put(uri: &str) -> Result<Response, RequestError> {
        Self::builder().put(uri)
    }

    /// 携带表单数据发出 PUT 请求
    #[inline]
    pub fn put_with<K: Into<String>, V: Into<Value>>(
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        Self::builder().put_with(uri, form_data)
    }

    /// 发出 PATCH 请求
    #[inline]
    pub fn patch(uri: &str) -> Result<Response, RequestError> {
        Self::builder().patch(uri)
    }

    /// 携带表单数据发出 PATCH 请求
    #[inline]
    pub fn patch_with<K: Into<String>, V: Into<Value>>(
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        Self::builder().patch_with(uri, form_data)
    }

    /// 发出 DELETE 请求
    #[inline]
    pub fn delete(uri: &str) -> Result<Response, RequestError> {
        Self::builder().delete(uri)
    }

    /// 携带表单数据发出 DELETE 请求
    #[inline]
    pub fn delete_with<K: Into<String>, V: Into<Value>>(
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        Self::builder().delete_with(uri, form_data)
    }

    /// 通过方法名发出请求
    ///
    /// 方法名不区分大小写，仅支持 `get`、`post`、`put`、`patch`、`delete`，
    /// 其他方法名返回 [`crate::UnknownMethodError`]，且不会创建构建器。
    pub fn call<K: Into<String>, V: Into<Value>>(
        method: &str,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> ApiResult<Response> {
        let verb = method.parse::<Verb>()?;
        Ok(Self::builder().request(verb, uri, form_data)?)
    }

    /// 创建构建器并添加 HTTP Header
    #[inline]
    pub fn add_header(key: impl Into<String>, value: impl Into<String>) -> RequestBuilder {
        let mut builder = Self::builder();
        builder.add_header(key, value);
        builder
    }

    /// 创建构建器并添加 Bearer 认证信息
    #[inline]
    pub fn bearer(token: impl AsRef<str>) -> RequestBuilder {
        let mut builder = Self::builder();
        builder.bearer(token);
        builder
    }

    /// 创建构建器并添加表单字段
    #[inline]
    pub fn add_param(key: impl Into<String>, value: impl Into<Value>) -> RequestBuilder {
        let mut builder = Self::builder();
        builder.add_param(key, value);
        builder
    }

    /// 创建构建器并添加文件附件
    #[inline]
    pub fn file(
        field_name: impl Into<String>,
        display_name: impl Into<String>,
        source_path: impl AsRef<Path>,
    ) -> RequestBuilder {
        let mut builder = Self::builder();
        builder.file(field_name, display_name, source_path.as_ref());
        builder
    }

    /// 设置全局基础 URL
    ///
    /// 仅影响此后创建的构建器
    #[inline]
    pub fn set_base_url(base_url: impl Into<String>) {
        config::set_base_url(base_url)
    }

    /// 设置全局方法覆盖开关
    ///
    /// 仅影响此后创建的构建器
    #[inline]
    pub fn set_framework_method(framework_method: bool) {
        config::set_framework_method(framework_method)
    }
}
