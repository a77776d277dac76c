//! Gemini client against a local tiny_http stand-in
#![cfg(feature = "http")]

use mockgen::enrich::{enrich, ContentGenerator, GeneratedContent};
use mockgen::gemini::GeminiGenerator;
use mockgen::{Error, MockgenConfig};
use std::io::Read;
use std::sync::mpsc;
use tiny_http::{Header, Response, Server};

struct Captured {
    url: String,
    body: String,
}

/// Serve `responses` in order, reporting each request back
fn start_server(responses: Vec<(u16, String)>) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for (status, body) in responses {
            let mut request = match server.recv() {
                Ok(r) => r,
                Err(_) => return,
            };
            let mut req_body = String::new();
            let _ = request.as_reader().read_to_string(&mut req_body);
            let _ = tx.send(Captured { url: request.url().to_string(), body: req_body });
            let resp = Response::from_string(body)
                .with_status_code(status)
                .with_header("Content-Type: application/json".parse::<Header>().unwrap());
            let _ = request.respond(resp);
        }
    });
    (format!("http://{}/v1beta", addr), rx)
}

fn config(base: &str) -> MockgenConfig {
    MockgenConfig {
        gemini_api_key: Some("test-key".into()),
        gemini_base_url: base.to_string(),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn candidate(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[test]
fn test_generate_parses_structured_answer() {
    let answer = r#"{"headline":"Coffee Worth Waking For","description":"Single origin beans.","tags":["Coffee","Shop","Local"]}"#;
    let (base, rx) = start_server(vec![(200, candidate(answer))]);
    let generator = GeminiGenerator::new(&config(&base)).unwrap();

    let content = generator.generate("beans.example").unwrap();
    assert_eq!(content.headline, "Coffee Worth Waking For");
    assert_eq!(content.tags, vec!["Coffee", "Shop", "Local"]);

    let req = rx.recv().unwrap();
    assert_eq!(req.url, "/v1beta/models/gemini-2.5-flash:generateContent?key=test-key");
    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"],
        serde_json::json!(["headline", "description", "tags"])
    );
    assert!(body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("\"beans.example\""));
}

#[test]
fn test_api_error_is_reported_and_enrich_falls_back() {
    let error = r#"{"error":{"code":403,"message":"API key not valid"}}"#.to_string();
    let (base, _rx) = start_server(vec![(403, error.clone()), (403, error)]);
    let generator = GeminiGenerator::new(&config(&base)).unwrap();

    match generator.generate("example.com") {
        Err(Error::GenerationError(msg)) => assert!(msg.contains("API key not valid"), "{}", msg),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(enrich(&generator, "example.com"), GeneratedContent::fallback());
}

#[test]
fn test_malformed_answers_fall_back() {
    let (base, _rx) = start_server(vec![
        (200, candidate("not json at all")),
        (200, r#"{"candidates":[]}"#.to_string()),
        (200, "<html>".to_string()),
    ]);
    let generator = GeminiGenerator::new(&config(&base)).unwrap();
    for _ in 0..3 {
        assert_eq!(enrich(&generator, "example.com"), GeneratedContent::fallback());
    }
}

#[test]
fn test_unreachable_service_falls_back() {
    // nothing listens on port 9 locally
    let generator = GeminiGenerator::new(&config("http://127.0.0.1:9/v1beta")).unwrap();
    assert!(matches!(generator.generate("example.com"), Err(Error::NetworkError(_))));
    assert_eq!(enrich(&generator, "example.com").headline, "Stunning Web Experience");
}
