/// HTTP backend tests.
///
/// Runs `HttpBackend` against a local `tiny_http` server on an ephemeral
/// port that answers each route with a canned status and body.
use std::thread;

use tiny_http::{Header, Response, Server};

use vitalboard::analytics::logger::LoadLog;
use vitalboard::api::http::HttpBackend;
use vitalboard::api::{Backend, FetchError};
use vitalboard::dashboard::generation::{self, GenerationOutcome};
use vitalboard::model::GenerationResult;
use vitalboard::render::Slot;
use vitalboard::render::page::Page;

/// Serve `routes` (path, status, body) for `requests` requests, then stop.
fn serve(routes: Vec<(&'static str, u16, &'static str)>, requests: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for request in server.incoming_requests().take(requests) {
            let path = request.url().to_string();
            let (status, body) = routes
                .iter()
                .find(|(p, _, _)| *p == path)
                .map(|(_, s, b)| (*s, *b))
                .unwrap_or((404, "not found"));
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}")
}

#[test]
fn decodes_member_profile() {
    let url = serve(
        vec![(
            "/api/member/3",
            200,
            r#"{"name":"Rohan Patel","preferred_name":"Rohan","age":46,"gender":"Male",
                "location":"Singapore","occupation":"Sales","health_goals":["Sleep"]}"#,
        )],
        1,
    );
    let backend = HttpBackend::new(&url, None);
    let member = backend.member(3).unwrap();
    assert_eq!(member.name, "Rohan Patel");
    assert_eq!(member.health_goals, Some(vec!["Sleep".to_string()]));
    assert_eq!(member.chronic_conditions, None);
}

#[test]
fn partial_stats_decode_as_patch() {
    let url = serve(vec![("/api/stats", 200, r#"{"total_events":12}"#)], 1);
    let patch = HttpBackend::new(&url, None).stats().unwrap();
    assert_eq!(patch.total_events, Some(12));
    assert_eq!(patch.days_in_program, None);
}

#[test]
fn timeline_preserves_order() {
    let url = serve(
        vec![(
            "/api/timeline",
            200,
            r#"[{"title":"First","date":"2024-01-01"},{"title":"Second","date":"2024-01-05"}]"#,
        )],
        1,
    );
    let events = HttpBackend::new(&url, None).timeline().unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
}

#[test]
fn error_status_maps_to_status_error() {
    let url = serve(vec![("/api/health-metrics", 503, "{}")], 1);
    let err = HttpBackend::new(&url, None).health_metrics().unwrap_err();
    assert_eq!(err, FetchError::Status(503));
}

#[test]
fn malformed_body_maps_to_decode_error() {
    let url = serve(vec![("/api/timeline", 200, "<html>oops</html>")], 1);
    let err = HttpBackend::new(&url, None).timeline().unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[test]
fn closed_port_is_a_transport_error() {
    let err = HttpBackend::new("http://127.0.0.1:9", None).stats().unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[test]
fn generation_success_is_created() {
    let url = serve(
        vec![(
            "/api/generate-conversations",
            200,
            r#"{"success":true,"total_conversations":5}"#,
        )],
        1,
    );
    let result = HttpBackend::new(&url, None).generate_conversations().unwrap();
    assert_eq!(
        result,
        GenerationResult::Created {
            total_conversations: 5
        }
    );
}

#[test]
fn generation_500_with_body_is_a_refusal() {
    let url = serve(
        vec![(
            "/api/generate-conversations",
            500,
            r#"{"success":false,"error":"Ollama not responding"}"#,
        )],
        1,
    );
    let result = HttpBackend::new(&url, None).generate_conversations().unwrap();
    assert_eq!(
        result,
        GenerationResult::Failed {
            error: "Ollama not responding".to_string()
        }
    );
}

#[test]
fn generation_404_with_error_body_is_a_refusal() {
    let url = serve(
        vec![(
            "/api/generate-conversations",
            404,
            r#"{"error": "No member found"}"#,
        )],
        1,
    );
    let result = HttpBackend::new(&url, None).generate_conversations().unwrap();
    assert_eq!(
        result,
        GenerationResult::Failed {
            error: "No member found".to_string()
        }
    );
}

#[test]
fn refusal_without_success_flag_shows_backend_error() {
    let url = serve(
        vec![(
            "/api/generate-conversations",
            404,
            r#"{"error": "No member found"}"#,
        )],
        1,
    );
    let backend = HttpBackend::new(&url, None);
    let mut page = Page::template();
    let outcome = generation::run(
        &mut page,
        &backend,
        "http://localhost:11434",
        &LoadLog::disabled(),
    );

    assert_eq!(
        outcome,
        Some(GenerationOutcome::Rejected("No member found".to_string()))
    );
    let status: Vec<&str> = page
        .list(Slot::GenerationStatus)
        .unwrap()
        .entries
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(status, ["Error: No member found"]);
}

#[test]
fn generation_500_without_json_is_a_status_error() {
    let url = serve(vec![("/api/generate-conversations", 500, "boom")], 1);
    let err = HttpBackend::new(&url, None)
        .generate_conversations()
        .unwrap_err();
    assert_eq!(err, FetchError::Status(500));
}

#[test]
fn reachability_counts_any_http_answer() {
    let url = serve(vec![("/api/stats", 500, "{}")], 1);
    assert!(HttpBackend::new(&url, None).is_reachable());
    assert!(!HttpBackend::new("http://127.0.0.1:9", None).is_reachable());
}
