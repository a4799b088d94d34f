//! Web view of the dashboard.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that holds one dashboard
//! session and serves it as server-rendered HTML:
//! - `GET /` loads a fresh session
//! - `GET /activity/{i}` opens the detail modal for feed entry `i`
//! - `GET /close` hides the modal
//! - `POST /generate` runs the conversation generator
//! - `GET /api/page` returns the page state as JSON
//!
//! Launched via `vitalboard serve` (default: `http://127.0.0.1:9747`).

pub mod html;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analytics::logger::LoadLog;
use crate::api::Backend;
use crate::api::http::HttpBackend;
use crate::config::schema::VitalboardConfig;
use crate::dashboard::{Dashboard, DashboardOptions};
use crate::render::Action;
use crate::render::page::Page;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What a request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Html(String),
    Json(String),
    NotFound,
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Self::Html(_) | Self::Json(_) => 200,
            Self::NotFound => 404,
        }
    }
}

/// One browser-facing dashboard session.
///
/// Requests are handled one at a time against the same page. `GET /`
/// replaces the whole session; every other route acts on the current one,
/// loading it first if nothing has been loaded yet.
pub struct Session<B: Backend + Clone> {
    backend: B,
    options: DashboardOptions,
    log: LoadLog,
    dashboard: Option<Dashboard<B>>,
    page: Page,
}

impl<B: Backend + Clone> Session<B> {
    pub fn new(backend: B, options: DashboardOptions, log: LoadLog) -> Self {
        Self {
            backend,
            options,
            log,
            dashboard: None,
            page: Page::template(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn dashboard(&self) -> Option<&Dashboard<B>> {
        self.dashboard.as_ref()
    }

    /// Route one request.
    pub fn handle(&mut self, method: &Method, url: &str) -> Result<Reply> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => {
                self.reload();
                Ok(self.html())
            }
            (&Method::Get, "/close") => {
                self.dispatch(Action::CloseModal);
                Ok(self.html())
            }
            (&Method::Post, "/generate") => {
                self.dispatch(Action::GenerateConversations);
                Ok(self.html())
            }
            (&Method::Get, "/api/page") => {
                self.ensure_loaded();
                let json = serde_json::to_string(&self.page).context("failed to encode page")?;
                Ok(Reply::Json(json))
            }
            (&Method::Get, _) => match path
                .strip_prefix("/activity/")
                .and_then(|i| i.parse::<usize>().ok())
            {
                Some(index) => {
                    self.dispatch(Action::OpenActivity(index));
                    Ok(self.html())
                }
                None => Ok(Reply::NotFound),
            },
            _ => Ok(Reply::NotFound),
        }
    }

    fn html(&self) -> Reply {
        Reply::Html(html::render_page(&self.page))
    }

    fn reload(&mut self) {
        let mut page = Page::template();
        let mut dashboard = Dashboard::new(
            self.backend.clone(),
            self.options.clone(),
            self.log.clone(),
        );
        dashboard.initialize(&mut page);
        self.page = page;
        self.dashboard = Some(dashboard);
    }

    fn ensure_loaded(&mut self) {
        if self.dashboard.is_none() {
            self.reload();
        }
    }

    fn dispatch(&mut self, action: Action) {
        self.ensure_loaded();
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.dispatch(&mut self.page, action);
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Errors are answered per-request without
/// stopping the server.
pub fn serve(config: &VitalboardConfig, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut session = Session::new(
        HttpBackend::from_config(&config.backend),
        DashboardOptions::from_config(config),
        LoadLog::from_config(&config.logging),
    );

    println!("vitalboard dashboard running at http://{addr}");
    println!("Backend: {}", config.backend.base_url);
    println!("Press Ctrl+C to stop.\n");

    if config.web.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = match session.handle(&method, &url) {
            Ok(reply) => into_response(reply),
            Err(e) => {
                let body = serde_json::json!({ "error": format!("{e:#}") }).to_string();
                with_content_type(
                    Response::from_string(body).with_status_code(StatusCode(500)),
                    "application/json; charset=utf-8",
                )
            }
        };
        let _ = request.respond(response);

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

type Body = Response<std::io::Cursor<Vec<u8>>>;

fn into_response(reply: Reply) -> Body {
    let status = StatusCode(reply.status());
    match reply {
        Reply::Html(body) => with_content_type(
            Response::from_string(body).with_status_code(status),
            "text/html; charset=utf-8",
        ),
        Reply::Json(body) => with_content_type(
            Response::from_string(body).with_status_code(status),
            "application/json; charset=utf-8",
        ),
        Reply::NotFound => with_content_type(
            Response::from_string(r#"{"error": "not found"}"#).with_status_code(status),
            "application/json; charset=utf-8",
        ),
    }
}

fn with_content_type(mut response: Body, value: &str) -> Body {
    if let Ok(header) = Header::from_bytes("Content-Type", value) {
        response.add_header(header);
    }
    response
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
