use super::{
    config::{default_config, default_http_caller},
    options::{merge_fields, Fields, Files, Headers, RequestOptions, METHOD_FIELD},
    Config, FileAttachment, RequestError, Response, Verb,
};
use assert_impl::assert_impl;
use log::{debug, warn};
use plume_http::HttpCaller;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};

/// HTTP 请求构建器
///
/// 累积 HTTP Headers、表单字段和文件附件，然后通过任意请求方法发出请求。
///
/// 发出请求不会清空已经累积的内容，同一个构建器可以多次发出请求。
/// 单次请求传入的表单数据以及方法覆盖产生的 `_method` 字段只对当次请求生效。
///
/// ### 发送带附件的表单
///
/// ```no_run
/// use plume_http_client::RequestBuilder;
///
/// # fn example() -> anyhow::Result<()> {
/// let mut response = RequestBuilder::new()
///     .bearer("t0k3n")
///     .add_param("title", "report")
///     .file("attachment", "report.pdf", "/tmp/report.pdf")
///     .post("https://api.example.com/reports")?;
/// if response.created() {
///     println!("{}", response.body()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: Config,
    http_caller: Arc<dyn HttpCaller>,
    headers: Headers,
    params: Fields,
    files: Files,
}

impl Default for RequestBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// 使用全局配置和全局默认的 HTTP 请求处理函数创建构建器
    ///
    /// 全局配置在此时被复制，之后对全局配置的修改不会影响该构建器
    #[inline]
    pub fn new() -> Self {
        Self::with_config(default_config(), default_http_caller())
    }

    /// 使用指定的配置和 HTTP 请求处理函数创建构建器
    #[inline]
    pub fn with_config(config: Config, http_caller: Arc<dyn HttpCaller>) -> Self {
        Self {
            config,
            http_caller,
            headers: Default::default(),
            params: Default::default(),
            files: Default::default(),
        }
    }

    /// 添加 HTTP Header，同名 Header 将被覆盖
    #[inline]
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 添加 Bearer 认证信息
    #[inline]
    pub fn bearer(&mut self, token: impl AsRef<str>) -> &mut Self {
        self.add_header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// 添加表单字段，同名字段将被覆盖
    ///
    /// 字段名为 `query` 时，字段值将作为 URL 查询参数发送
    #[inline]
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// 添加文件附件
    ///
    /// 同一字段名可以添加多个文件，按照添加顺序发送。文件在发出请求时才会被打开。
    #[inline]
    pub fn file(
        &mut self,
        field_name: impl Into<String>,
        display_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> &mut Self {
        let attachment = FileAttachment::new(field_name, display_name, source_path);
        self.files
            .entry(attachment.field_name().to_owned())
            .or_default()
            .push(attachment);
        self
    }

    /// 获取已经累积的 HTTP Headers
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// 获取已经累积的表单字段
    #[inline]
    pub fn params(&self) -> &Fields {
        &self.params
    }

    /// 获取已经添加的文件附件
    #[inline]
    pub fn files(&self) -> &Files {
        &self.files
    }

    /// 是否添加过文件附件
    #[inline]
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// 获取构建器配置
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 发出 GET 请求
    #[inline]
    pub fn get(&self, uri: &str) -> Result<Response, RequestError> {
        self.dispatch(Verb::Get, uri, Fields::new())
    }

    /// 携带表单数据发出 GET 请求
    #[inline]
    pub fn get_with<K: Into<String>, V: Into<Value>>(
        &self,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.request(Verb::Get, uri, form_data)
    }

    /// 发出 POST 请求
    #[inline]
    pub fn post(&self, uri: &str) -> Result<Response, RequestError> {
        self.dispatch(Verb::Post, uri, Fields::new())
    }

    /// 携带表单数据发出 POST 请求
    #[inline]
    pub fn post_with<K: Into<String>, V: Into<Value>>(
        &self,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.request(Verb::Post, uri, form_data)
    }

    /// 发出 PUT 请求
    #[inline]
    pub fn put(&self, uri: &str) -> Result<Response, RequestError> {
        self.dispatch(Verb::Put, uri, Fields::new())
    }

    /// 携带表单数据发出 PUT 请求
    #[inline]
    pub fn put_with<K: Into<String>, V: Into<Value>>(
        &self,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.request(Verb::Put, uri, form_data)
    }

    /// 发出 PATCH 请求
    #[inline]
    pub fn patch(&self, uri: &str) -> Result<Response, RequestError> {
        self.dispatch(Verb::Patch, uri, Fields::new())
    }

    /// 携带表单数据发出 PATCH 请求
    #[inline]
    pub fn patch_with<K: Into<String>, V: Into<Value>>(
        &self,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.request(Verb::Patch, uri, form_data)
    }

    /// 发出 DELETE 请求
    #[inline]
    pub fn delete(&self, uri: &str) -> Result<Response, RequestError> {
        self.dispatch(Verb::Delete, uri, Fields::new())
    }

    /// 携带表单数据发出 DELETE 请求
    #[inline]
    pub fn delete_with<K: Into<String>, V: Into<Value>>(
        &self,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.request(Verb::Delete, uri, form_data)
    }

    /// 使用指定的请求方法发出请求
    ///
    /// 服务器返回的任何状态码都将返回 [`Response`]，只有传输层无法完成请求时才返回 [`RequestError`]
    pub fn request<K: Into<String>, V: Into<Value>>(
        &self,
        verb: Verb,
        uri: &str,
        form_data: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Response, RequestError> {
        self.dispatch(
            verb,
            uri,
            form_data.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        )
    }

    fn dispatch(&self, verb: Verb, uri: &str, form_data: Fields) -> Result<Response, RequestError> {
        let mut fields = merge_fields(&self.params, form_data);
        let method = if self.config.is_framework_method() && verb.is_overridable() {
            fields.insert(METHOD_FIELD.to_owned(), Value::from(verb.as_str()));
            Verb::Post.method()
        } else {
            verb.method()
        };
        let url = self.config.resolve_url(uri);
        let mut request = RequestOptions {
            method: method.to_owned(),
            url: url.to_owned(),
            fields,
            files: &self.files,
            headers: &self.headers,
        }
        .into_request()?;

        debug!("{} {} via {:?}", method, url, self.http_caller);
        match self.http_caller.call(&mut request) {
            Ok(response) => {
                debug!("{} {} responded {}", method, url, response.status_code());
                Ok(Response::new(response, method, url, self.to_owned()))
            }
            Err(err) => {
                warn!("{} {} failed: {}", method, url, err);
                Err(err.into())
            }
        }
    }

    #[allow(dead_code)]
    fn ignore() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}
