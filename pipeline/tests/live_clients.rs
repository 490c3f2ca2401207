mod support;

use pipeline::EncodedImage;
use pipeline::api::CONNECTIVITY_MESSAGE;
use pipeline::api::advice::ADVICE_SERVER_MESSAGE;
use pipeline::api::prediction::PREDICTION_SERVER_MESSAGE;
use shared::{ErrorKind, Probabilities};
use support::{FakeBackend, Reply, advice_json, closed_port_url, prediction_json, service};

fn leaf_image() -> EncodedImage {
    EncodedImage::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap()
}

fn blight_probs() -> Probabilities {
    Probabilities::from([
        ("LEAF_BLIGHT".to_string(), 0.81),
        ("HEALTHY_LEAF".to_string(), 0.19),
    ])
}

#[tokio::test]
async fn prediction_posts_the_inline_image_with_bearer_key() {
    support::init_logging();
    let backend = FakeBackend::start(&[(
        "/predict",
        Reply::Json(200, prediction_json("LEAF_BLIGHT", 0.81)),
    )]);
    let service = service(&[
        ("MODEL_API_URL", backend.url("/predict").as_str()),
        ("API_KEY", "secret-key"),
    ]);
    assert!(!service.is_demo_mode());

    let image = leaf_image();
    let result = service.prediction().predict(&image).await.unwrap();

    assert_eq!(result.label, "LEAF_BLIGHT");
    assert_eq!(result.latency_ms, 87);
    assert_eq!(result.model_version, "leaf-v3");
    assert_eq!(result.confidence_percent(), 81);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/predict");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret-key"));
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].body["image_base64"], image.as_str());
    assert_eq!(requests[0].body["options"]["return_probs"], true);
}

#[tokio::test]
async fn no_authorization_header_without_a_key() {
    let backend = FakeBackend::start(&[(
        "/predict",
        Reply::Json(200, prediction_json("HEALTHY_LEAF", 0.9)),
    )]);
    let service = service(&[("MODEL_API_URL", backend.url("/predict").as_str())]);

    service.prediction().predict(&leaf_image()).await.unwrap();

    assert!(backend.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn server_errors_keep_the_status_code_and_are_not_retried() {
    support::init_logging();
    let backend = FakeBackend::start(&[(
        "/predict",
        Reply::Text(503, "upstream overloaded".into()),
    )]);
    let service = service(&[("MODEL_API_URL", backend.url("/predict").as_str())]);

    let err = service.prediction().predict(&leaf_image()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.code.as_deref(), Some("503"));
    assert_eq!(err.message, PREDICTION_SERVER_MESSAGE);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn unreachable_server_reports_connectivity() {
    let service = service(&[("MODEL_API_URL", closed_port_url("/predict").as_str())]);

    let err = service.prediction().predict(&leaf_image()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connectivity);
    assert_eq!(err.message, CONNECTIVITY_MESSAGE);
    assert!(err.code.is_none());
}

#[tokio::test]
async fn undecodable_success_body_passes_the_raw_message_through() {
    let backend = FakeBackend::start(&[("/predict", Reply::Text(200, "<html>ok</html>".into()))]);
    let service = service(&[("MODEL_API_URL", backend.url("/predict").as_str())]);

    let err = service.prediction().predict(&leaf_image()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unknown);
    assert!(err.code.is_none());
    assert!(!err.message.is_empty());
    assert_ne!(err.message, PREDICTION_SERVER_MESSAGE);
    assert_ne!(err.message, CONNECTIVITY_MESSAGE);
}

#[tokio::test]
async fn advice_posts_diagnosis_probs_and_question_to_advise() {
    let backend = FakeBackend::start(&[(
        "/api/advise",
        Reply::Json(200, advice_json("Managing leaf blight")),
    )]);
    let service = service(&[
        ("MODEL_API_URL", backend.url("/predict").as_str()),
        ("ADVICE_API_URL", backend.url("/api/").as_str()),
        ("API_KEY", "secret-key"),
    ]);
    assert!(!service.advice().is_simulated());

    let advice = service
        .advice()
        .advise("LEAF_BLIGHT", &blight_probs(), Some("Is it safe to spray before rain?"))
        .await
        .unwrap();
    assert_eq!(advice.title, "Managing leaf blight");
    assert_eq!(advice.bullets.len(), 2);

    service
        .advice()
        .advise("LEAF_BLIGHT", &blight_probs(), None)
        .await
        .unwrap();
    for blank in ["", "   "] {
        service
            .advice()
            .advise("LEAF_BLIGHT", &blight_probs(), Some(blank))
            .await
            .unwrap();
    }

    let requests = backend.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].path, "/api/advise");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret-key"));
    assert_eq!(requests[0].body["diagnosis"], "LEAF_BLIGHT");
    assert_eq!(requests[0].body["probs"]["LEAF_BLIGHT"], 0.81);
    assert_eq!(requests[0].body["question"], "Is it safe to spray before rain?");
    for request in &requests[1..] {
        assert_eq!(request.body["diagnosis"], "LEAF_BLIGHT");
        assert!(request.body.get("question").is_none());
    }
}

#[tokio::test]
async fn advice_errors_use_the_advice_message() {
    let backend = FakeBackend::start(&[("/advise", Reply::Text(500, "boom".into()))]);
    let service = service(&[
        ("MODEL_API_URL", backend.url("/predict").as_str()),
        ("ADVICE_API_URL", backend.url("").as_str()),
    ]);

    let err = service
        .advice()
        .advise("LEAF_BLIGHT", &blight_probs(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.code.as_deref(), Some("500"));
    assert_eq!(err.message, ADVICE_SERVER_MESSAGE);
}

#[tokio::test]
async fn unreachable_advice_service_reports_connectivity() {
    let service = service(&[
        ("MODEL_API_URL", closed_port_url("/predict").as_str()),
        ("ADVICE_API_URL", closed_port_url("").as_str()),
    ]);

    let err = service
        .advice()
        .advise("HEALTHY_LEAF", &blight_probs(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connectivity);
    assert_eq!(err.message, CONNECTIVITY_MESSAGE);
}
