//! Fake Elasticsearch and SMTP servers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request seen by the fake search backend
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub method: Method,
    pub index: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct FakeSearch {
    status: StatusCode,
    response: String,
    requests: Arc<Mutex<Vec<RecordedSearch>>>,
}

impl FakeSearch {
    pub fn requests(&self) -> Vec<RecordedSearch> {
        self.requests.lock().unwrap().clone()
    }
}

async fn search(
    State(state): State<FakeSearch>,
    method: Method,
    headers: axum::http::HeaderMap,
    Path(index): Path<String>,
    RawQuery(query): RawQuery,
    body: String,
) -> (StatusCode, String) {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    state.requests.lock().unwrap().push(RecordedSearch {
        method,
        index,
        query,
        content_type,
        body,
    });

    (state.status, state.response.clone())
}

/// Start a fake `_search` endpoint answering every request with `status` and `response`
pub async fn spawn_search(status: StatusCode, response: &str) -> (FakeSearch, u16) {
    let state = FakeSearch {
        status,
        response: response.to_string(),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/:index/_search", get(search).post(search))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, port)
}

/// SMTP transaction captured by the fake relay
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: Vec<String>,
}

impl Transcript {
    /// Header line value, e.g. `header("Subject")`
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}: ", name);
        self.data
            .iter()
            .take_while(|line| !line.is_empty())
            .find_map(|line| line.strip_prefix(&prefix).map(String::from))
    }

    /// Body lines after the blank separator line, without trailing blanks
    pub fn body(&self) -> Vec<String> {
        let mut body: Vec<String> = self
            .data
            .iter()
            .skip_while(|line| !line.is_empty())
            .skip(1)
            .cloned()
            .collect();
        while body.last().is_some_and(|line| line.is_empty()) {
            body.pop();
        }
        body
    }
}

/// Start a relay that accepts one connection; `rcpt_reply` answers RCPT TO
pub async fn spawn_smtp(rcpt_reply: &'static str) -> (JoinHandle<Transcript>, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut transcript = Transcript::default();

        writer.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                break;
            }
            let command = line.trim_end().to_string();
            let upper = command.to_ascii_uppercase();

            let reply: &str = if upper.starts_with("EHLO") || upper.starts_with("HELO") {
                "250 relay.test\r\n"
            } else if upper.starts_with("MAIL FROM:") {
                transcript.mail_from = command["MAIL FROM:".len()..].to_string();
                "250 OK\r\n"
            } else if upper.starts_with("RCPT TO:") {
                transcript.rcpt_to.push(command["RCPT TO:".len()..].to_string());
                rcpt_reply
            } else if upper == "DATA" {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.unwrap();
                loop {
                    let mut data_line = String::new();
                    if reader.read_line(&mut data_line).await.unwrap() == 0 {
                        break;
                    }
                    let data_line = data_line.trim_end_matches(['\r', '\n']).to_string();
                    if data_line == "." {
                        break;
                    }
                    transcript.data.push(data_line);
                }
                "250 OK queued\r\n"
            } else if upper == "QUIT" {
                writer.write_all(b"221 Bye\r\n").await.unwrap();
                break;
            } else {
                "250 OK\r\n"
            };

            writer.write_all(reply.as_bytes()).await.unwrap();
        }

        transcript
    });

    (handle, port)
}
