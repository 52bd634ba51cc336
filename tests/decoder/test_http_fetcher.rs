// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP model fetcher tests against an in-process model origin

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use model_qr_decoder::{
    HttpModelFetcher, InitError, ModelSource, QrDecoder, RqrrEngine, SupportedFormat,
    TracingLogger, TransportError,
};

use super::support::ARTIFACT_NAMES;

fn payload(name: &str) -> Vec<u8> {
    format!("{} weights", name).into_bytes()
}

fn origin_router(missing: Option<&'static str>) -> Router {
    let mut router = Router::new();
    for name in ARTIFACT_NAMES {
        let path = format!("/models/{}", name);
        if Some(name) == missing {
            router = router.route(&path, get(|| async { StatusCode::NOT_FOUND }));
        } else {
            router = router.route(&path, get(move || async move { payload(name) }));
        }
    }
    router
}

/// Serve `router` on an ephemeral port and return the model base address
async fn spawn_origin(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/models", addr)
}

fn fetcher() -> HttpModelFetcher {
    HttpModelFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_full_payload() {
    let origin = spawn_origin(origin_router(None)).await;

    let bytes = fetcher().fetch(&origin, "detect.caffemodel").await.unwrap();

    assert_eq!(bytes.as_ref(), payload("detect.caffemodel").as_slice());
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let origin = spawn_origin(origin_router(Some("sr.prototxt"))).await;

    let err = fetcher().fetch(&origin, "sr.prototxt").await.unwrap_err();

    match err {
        TransportError::HttpStatus { status, url } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/models/sr.prototxt"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_unreachable_origin() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher()
        .fetch(&format!("http://{}", addr), "detect.prototxt")
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Request { .. }));
}

#[tokio::test]
async fn test_init_over_http_then_decode_blank_frame() {
    let origin = spawn_origin(origin_router(None)).await;
    let config = model_qr_decoder::DecoderConfig::new(origin);
    let engine = Arc::new(RqrrEngine::new());

    let ready = QrDecoder::init(&config, &fetcher(), engine.as_ref())
        .await
        .unwrap();

    let expected: usize = ARTIFACT_NAMES.iter().map(|n| payload(n).len()).sum();
    assert_eq!(ready.total_bytes(), expected);
    for name in ARTIFACT_NAMES {
        assert!(engine.has_entry(name));
    }

    let mut decoder = QrDecoder::new(
        &ready,
        engine.clone(),
        &[SupportedFormat::QrCode],
        false,
        Arc::new(TracingLogger),
    )
    .unwrap();

    let blank = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
        48,
        48,
        image::Luma([255]),
    ));
    assert!(decoder.decode(&blank).is_not_found());
}

#[tokio::test]
async fn test_init_over_http_fails_when_one_artifact_missing() {
    let origin = spawn_origin(origin_router(Some("sr.caffemodel"))).await;
    let config = model_qr_decoder::DecoderConfig::new(origin);
    let engine = RqrrEngine::new();

    let err = QrDecoder::init(&config, &fetcher(), &engine)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InitError::Transport {
            artifact: "sr.caffemodel",
            source: TransportError::HttpStatus { status: 404, .. }
        }
    ));
    assert!(!engine.has_entry("detect.prototxt"));
}
