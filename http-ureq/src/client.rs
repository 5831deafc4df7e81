use anyhow::Error as AnyError;
use log::{debug, warn};
use plume_http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    user_agent, HeaderName, HeaderValue, HttpCaller, Method, Request, RequestBody, Response, ResponseBody,
    ResponseError, ResponseErrorKind, ResponseResult, StatusCode, Version,
};
use std::{
    error::Error as StdError,
    fmt::Display,
    io::{Error as IoError, ErrorKind as IoErrorKind},
};
use ureq::{
    Agent, Error as UreqError, ErrorKind as UreqErrorKind, Request as UreqRequest, Response as UreqResponse,
    Transport as UreqTransport,
};

const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Ureq 客户端
#[derive(Debug, Clone)]
pub struct Client {
    client: Agent,
}

impl Client {
    /// 创建 Ureq 客户端
    #[inline]
    pub fn new(client: Agent) -> Self {
        Self { client }
    }
}

impl From<Agent> for Client {
    #[inline]
    fn from(agent: Agent) -> Self {
        Self::new(agent)
    }
}

impl Default for Client {
    #[inline]
    fn default() -> Self {
        Self { client: ureq::agent() }
    }
}

impl HttpCaller for Client {
    fn call(&self, request: &mut Request) -> ResponseResult {
        let url = request
            .effective_url()
            .map_err(|err| ResponseError::builder(ResponseErrorKind::InvalidUrl, err).url(request.url()).build())?;
        let ureq_request = make_ureq_request(&self.client, request, url.as_str())?;
        debug!("ureq: {} {}", request.method(), url);

        let has_content_type = request.headers().contains_key(CONTENT_TYPE);
        let result = match request.take_body() {
            RequestBody::Form(form) => {
                let ureq_request = if has_content_type {
                    ureq_request
                } else {
                    ureq_request.set(CONTENT_TYPE.as_str(), FORM_MIME)
                };
                ureq_request.send_bytes(form.encode().as_bytes())
            }
            RequestBody::Multipart(multipart) => {
                let mut ureq_request = ureq_request;
                if !has_content_type {
                    ureq_request = ureq_request.set(CONTENT_TYPE.as_str(), &multipart.content_type());
                }
                let reader = multipart.into_reader();
                ureq_request
                    .set(CONTENT_LENGTH.as_str(), &reader.content_length().to_string())
                    .send(reader)
            }
            _ => ureq_request.call(),
        };

        match result {
            Ok(response) => make_response(response, request.method(), url.as_str()),
            Err(UreqError::Status(code, response)) => {
                debug!("ureq: {} {} responded {}", request.method(), url, code);
                make_response(response, request.method(), url.as_str())
            }
            Err(UreqError::Transport(transport)) => {
                let kind = transport.kind();
                let timed_out = is_timeout(&transport);
                warn!("ureq: {} {} failed: {}", request.method(), url, transport);
                Err(from_ureq_error(kind, timed_out, AnyError::new(transport), url.as_str()))
            }
        }
    }
}

fn make_user_agent(url: &str) -> Result<HeaderValue, ResponseError> {
    let user_agent = format!("{}/plume-ureq", user_agent());
    HeaderValue::from_str(&user_agent).map_err(|err| build_header_value_error(url, &user_agent, &err))
}

fn make_ureq_request(agent: &Agent, request: &Request, url: &str) -> Result<UreqRequest, ResponseError> {
    let mut request_builder = agent.request(request.method().as_str(), url);
    for (header_name, header_value) in request.headers() {
        request_builder = set_header_for_request_builder(request_builder, url, header_name, header_value)?;
    }
    if !request.headers().contains_key(USER_AGENT) {
        request_builder = set_header_for_request_builder(request_builder, url, &USER_AGENT, &make_user_agent(url)?)?;
    }
    Ok(request_builder)
}

fn make_response(response: UreqResponse, requested_method: &Method, requested_url: &str) -> ResponseResult {
    let mut response_builder = Response::builder();
    response_builder
        .status_code(status_code_of_response(&response, requested_url)?)
        .version(parse_http_version(response.http_version(), requested_url)?);
    if response.get_url() != requested_url {
        response_builder
            .final_url(response.get_url())
            .final_method(redirected_method(requested_method));
    }
    let mut seen: Vec<HeaderName> = Vec::new();
    for header_name_str in response.headers_names().into_iter() {
        let header_name = HeaderName::from_bytes(header_name_str.as_bytes())
            .map_err(|err| build_header_name_error(requested_url, &header_name_str, &err))?;
        if seen.contains(&header_name) {
            continue;
        }
        for header_value_str in response.all(&header_name_str) {
            let header_value = HeaderValue::from_bytes(header_value_str.as_bytes())
                .map_err(|err| build_header_value_error(requested_url, header_value_str, &err))?;
            response_builder.header(header_name.to_owned(), header_value);
        }
        seen.push(header_name);
    }
    response_builder.body(ResponseBody::from_reader(response.into_reader()));
    Ok(response_builder.build())
}

// ureq 跟随 301 / 302 / 303 时将 GET / HEAD 以外的方法改为 GET，
// 跟随 307 / 308 时只接受 GET / HEAD / OPTIONS / TRACE 且不改变方法
fn redirected_method(requested_method: &Method) -> Method {
    if [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(requested_method) {
        requested_method.to_owned()
    } else {
        Method::GET
    }
}

fn build_status_code_error(url: &str, code: u16, err: &dyn Display) -> ResponseError {
    ResponseError::builder_with_msg(
        ResponseErrorKind::InvalidRequestResponse,
        format!("invalid status code({}): {}", code, err),
    )
    .url(url)
    .build()
}

fn build_header_name_error(url: &str, header_name: &str, err: &dyn Display) -> ResponseError {
    ResponseError::builder_with_msg(
        ResponseErrorKind::InvalidHeader,
        format!("invalid header name({}): {}", header_name, err),
    )
    .url(url)
    .build()
}

fn build_header_value_error(url: &str, header_value: &str, err: &dyn Display) -> ResponseError {
    ResponseError::builder_with_msg(
        ResponseErrorKind::InvalidHeader,
        format!("invalid header value({}): {}", header_value, err),
    )
    .url(url)
    .build()
}

fn convert_header_value_error(url: &str, header_value: &HeaderValue, err: &dyn Display) -> ResponseError {
    ResponseError::builder_with_msg(
        ResponseErrorKind::InvalidHeader,
        format!("invalid header value({:?}): {}", header_value, err),
    )
    .url(url)
    .build()
}

fn set_header_for_request_builder(
    request_builder: UreqRequest,
    url: &str,
    header_name: &HeaderName,
    header_value: &HeaderValue,
) -> Result<UreqRequest, ResponseError> {
    Ok(request_builder.set(
        header_name.as_str(),
        header_value
            .to_str()
            .map_err(|err| convert_header_value_error(url, header_value, &err))?,
    ))
}

fn status_code_of_response(response: &UreqResponse, url: &str) -> Result<StatusCode, ResponseError> {
    StatusCode::from_u16(response.status()).map_err(|err| build_status_code_error(url, response.status(), &err))
}

fn parse_http_version(version: &str, url: &str) -> Result<Version, ResponseError> {
    match version {
        "HTTP/0.9" => Ok(Version::HTTP_09),
        "HTTP/1.0" => Ok(Version::HTTP_10),
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/2.0" => Ok(Version::HTTP_2),
        "HTTP/3.0" => Ok(Version::HTTP_3),
        _ => Err(ResponseError::builder_with_msg(
            ResponseErrorKind::InvalidRequestResponse,
            format!("invalid http version: {}", version),
        )
        .url(url)
        .build()),
    }
}

fn is_timeout(transport: &UreqTransport) -> bool {
    transport
        .source()
        .and_then(|source| source.downcast_ref::<IoError>())
        .map_or(false, |err| err.kind() == IoErrorKind::TimedOut)
}

fn from_ureq_error(kind: UreqErrorKind, timed_out: bool, err: AnyError, url: &str) -> ResponseError {
    #[allow(unreachable_patterns)]
    let response_error_kind = match kind {
        _ if timed_out => ResponseErrorKind::TimeoutError,
        UreqErrorKind::InvalidUrl => ResponseErrorKind::InvalidUrl,
        UreqErrorKind::UnknownScheme => ResponseErrorKind::InvalidUrl,
        UreqErrorKind::Dns => ResponseErrorKind::UnknownHostError,
        UreqErrorKind::ConnectionFailed => ResponseErrorKind::ConnectError,
        UreqErrorKind::TooManyRedirects => ResponseErrorKind::TooManyRedirect,
        UreqErrorKind::BadStatus => ResponseErrorKind::InvalidRequestResponse,
        UreqErrorKind::BadHeader => ResponseErrorKind::InvalidHeader,
        UreqErrorKind::Io => ResponseErrorKind::LocalIoError,
        UreqErrorKind::InvalidProxyUrl => ResponseErrorKind::ProxyError,
        UreqErrorKind::ProxyConnect => ResponseErrorKind::ProxyError,
        UreqErrorKind::ProxyUnauthorized => ResponseErrorKind::ProxyError,
        UreqErrorKind::HTTP => ResponseErrorKind::InvalidRequestResponse,
        UreqErrorKind::InsecureRequestHttpsOnly => ResponseErrorKind::SslError,
        _ => ResponseErrorKind::UnknownError,
    };
    ResponseError::builder(response_error_kind, err).url(url).build()
}
