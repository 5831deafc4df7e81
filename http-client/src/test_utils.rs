use plume_http::{
    header::CONTENT_TYPE, HeaderMap, HttpCaller, Method, Request, RequestBody, Response, ResponseBody, ResponseError,
    ResponseErrorKind, ResponseResult, StatusCode,
};
use std::{io::Read, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedPart {
    pub(crate) name: String,
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedBody {
    Empty,
    Form(Vec<(String, String)>),
    Multipart(Vec<RecordedPart>),
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: RecordedBody,
}

impl RecordedRequest {
    pub(crate) fn form(&self) -> &[(String, String)] {
        match &self.body {
            RecordedBody::Form(pairs) => pairs,
            other => panic!("expected form body, got {:?}", other),
        }
    }

    pub(crate) fn parts(&self) -> &[RecordedPart] {
        match &self.body {
            RecordedBody::Multipart(parts) => parts,
            other => panic!("expected multipart body, got {:?}", other),
        }
    }
}

#[derive(Debug)]
enum Reply {
    Status(StatusCode, Vec<u8>),
    Redirect(Method, String),
    Fail(ResponseErrorKind),
}

/// 记录收到的全部请求，并返回固定响应的 HTTP 请求处理函数
#[derive(Debug)]
pub(crate) struct RecordingHttpCaller {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingHttpCaller {
    pub(crate) fn fixed(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Reply::Status(
            StatusCode::from_u16(status_code).expect("invalid status code"),
            body.into(),
        ))
    }

    pub(crate) fn redirecting(final_method: Method, final_url: impl Into<String>) -> Self {
        Self::new(Reply::Redirect(final_method, final_url.into()))
    }

    pub(crate) fn failing(kind: ResponseErrorKind) -> Self {
        Self::new(Reply::Fail(kind))
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Default::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().to_owned()
    }

    pub(crate) fn last_request(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

impl HttpCaller for RecordingHttpCaller {
    fn call(&self, request: &mut Request) -> ResponseResult {
        let url = request
            .effective_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| request.url().to_owned());
        let body = match request.take_body() {
            RequestBody::Form(form) => RecordedBody::Form(form.pairs().to_vec()),
            RequestBody::Multipart(multipart) => RecordedBody::Multipart(
                multipart
                    .into_parts()
                    .into_iter()
                    .map(|(name, part)| {
                        let file_name = part.meta().get_file_name().map(ToOwned::to_owned);
                        let content_type = part
                            .meta()
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|value| value.to_str().ok())
                            .map(ToOwned::to_owned);
                        let mut contents = Vec::new();
                        part.into_reader()
                            .read_to_end(&mut contents)
                            .expect("failed to read part");
                        RecordedPart {
                            name,
                            file_name,
                            content_type,
                            contents: String::from_utf8_lossy(&contents).into_owned(),
                        }
                    })
                    .collect(),
            ),
            _ => RecordedBody::Empty,
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().to_owned(),
            url: url.to_owned(),
            headers: request.headers().to_owned(),
            body,
        });

        match &self.reply {
            Reply::Status(status_code, body) => Ok(Response::builder()
                .status_code(*status_code)
                .body(ResponseBody::from_bytes(body.to_owned()))
                .build()),
            Reply::Redirect(final_method, final_url) => Ok(Response::builder()
                .final_url(final_url.to_owned())
                .final_method(final_method.to_owned())
                .build()),
            Reply::Fail(kind) => Err(ResponseError::builder_with_msg(*kind, "fake transport failure")
                .url(url)
                .build()),
        }
    }
}
