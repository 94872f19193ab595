// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    future::IntoFuture as _,
    net::Ipv4Addr,
    sync::{Arc, Mutex},
    time::Duration,
};

use assert_matches::assert_matches;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use promptdrop_generation::{GenerationError, ImageGenerator, PromptGenerator};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const API_KEY: &str = "test-key";
const TIMEOUT: Duration = Duration::from_secs(10);

/// The requests received by a mock service, with their authorization header.
type Requests = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Starts a mock service answering every POST to `path` with `status` and `body`.
async fn mock_service(path: &str, status: StatusCode, body: Value) -> (String, Requests) {
    let requests = Requests::default();
    let handler = move |State(requests): State<Requests>,
                        headers: HeaderMap,
                        Json(request): Json<Value>| {
        let body = body.clone();
        async move {
            let authorization = headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            requests.lock().unwrap().push((authorization, request));
            let response: Response = (status, Json(body)).into_response();
            response
        }
    };
    let router = Router::new()
        .route(path, post(handler))
        .with_state(requests.clone());

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, router).into_future());
    (format!("http://{address}"), requests)
}

fn chat_reply(content: &str) -> Value {
    json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }] })
}

#[test_log::test(tokio::test)]
async fn test_generate_prompt() -> anyhow::Result<()> {
    let (url, requests) =
        mock_service("/v1/chat/completions", StatusCode::OK, chat_reply("  九尾火狐，踏雪而行\n")).await;
    let generator = PromptGenerator::new(format!("{url}/v1/"), Some(API_KEY.to_string()), TIMEOUT)?;

    let generated = generator.generate(" 神兽 ", Some("水墨")).await?;
    assert_eq!(generated.prompt, "九尾火狐，踏雪而行");
    assert_eq!(generated.direction, "神兽");
    assert_eq!(generated.style.as_deref(), Some("水墨"));

    let requests = requests.lock().unwrap();
    let (authorization, request) = &requests[0];
    assert_eq!(authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(request["model"], "deepseek-chat");
    assert_eq!(request["max_tokens"], 300);
    assert!((request["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    assert!((request["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(request["messages"][0]["role"], "system");
    let user = request["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("方向：神兽"));
    assert!(user.contains("风格偏好：水墨"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_refine_prompt() -> anyhow::Result<()> {
    let (url, requests) =
        mock_service("/chat/completions", StatusCode::OK, chat_reply("a sharper prompt")).await;
    let generator = PromptGenerator::new(url, Some(API_KEY.to_string()), TIMEOUT)?;

    assert_eq!(generator.refine("  a prompt ").await?, "a sharper prompt");

    let requests = requests.lock().unwrap();
    let request = &requests[0].1;
    assert_eq!(request["messages"][1]["content"], "a prompt");
    assert!(request.get("temperature").is_none());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_prompt_service_errors() -> anyhow::Result<()> {
    let (url, _) = mock_service(
        "/chat/completions",
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": "rate limited" }),
    )
    .await;
    let generator = PromptGenerator::new(url, Some(API_KEY.to_string()), TIMEOUT)?;
    let error = generator.generate("神兽", None).await.unwrap_err();
    assert_matches!(
        error,
        GenerationError::Status { status: 429, ref body } if body.contains("rate limited")
    );

    let (url, _) = mock_service("/chat/completions", StatusCode::OK, json!({ "choices": [] })).await;
    let generator = PromptGenerator::new(url, Some(API_KEY.to_string()), TIMEOUT)?;
    assert_matches!(
        generator.generate("神兽", None).await,
        Err(GenerationError::MissingField("choices[0].message.content"))
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_prompt_input_is_checked_before_sending() -> anyhow::Result<()> {
    let (url, requests) = mock_service("/chat/completions", StatusCode::OK, chat_reply("x")).await;

    let generator = PromptGenerator::new(url.clone(), Some(API_KEY.to_string()), TIMEOUT)?;
    let error = generator.generate("   ", None).await.unwrap_err();
    assert!(error.is_invalid_input());

    let generator = PromptGenerator::new(url, None, TIMEOUT)?;
    assert_matches!(
        generator.generate("神兽", None).await,
        Err(GenerationError::MissingApiKey(_))
    );
    assert!(requests.lock().unwrap().is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_generate_image() -> anyhow::Result<()> {
    let (url, requests) = mock_service(
        "/images/generations",
        StatusCode::OK,
        json!({ "created": 1, "data": [{ "url": "https://cdn.example.com/fox.png" }] }),
    )
    .await;
    let generator = ImageGenerator::new(
        format!("{url}/images/generations"),
        Some(API_KEY.to_string()),
        TIMEOUT,
    )?;

    let image = generator.generate("九尾火狐", None, Some("watercolor")).await?;
    assert_eq!(image.image_url, "https://cdn.example.com/fox.png");
    assert_eq!(image.original_prompt, "九尾火狐");
    assert_eq!(image.model, "cogview-3");
    assert_eq!(image.size, "1024x1024");
    assert!(image
        .enhanced_prompt
        .starts_with("九尾火狐，水墨画风格，意境深远，融入"));

    let requests = requests.lock().unwrap();
    let (authorization, request) = &requests[0];
    assert_eq!(authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(request["model"], "cogview-3");
    assert_eq!(request["quality"], "standard");
    assert_eq!(request["n"], 1);
    assert_eq!(request["size"], "1024x1024");
    assert_eq!(request["prompt"], image.enhanced_prompt.as_str());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_image_service_errors() -> anyhow::Result<()> {
    let (url, _) = mock_service(
        "/images/generations",
        StatusCode::OK,
        json!({ "data": [{ "b64_json": "AAAA" }] }),
    )
    .await;
    let generator = ImageGenerator::new(
        format!("{url}/images/generations"),
        Some(API_KEY.to_string()),
        TIMEOUT,
    )?;
    assert_matches!(
        generator.generate("fox", Some("512x512"), None).await,
        Err(GenerationError::MissingField("data[0].url"))
    );

    let (url, _) = mock_service(
        "/images/generations",
        StatusCode::BAD_REQUEST,
        json!({ "error": { "code": "1214", "message": "invalid size" } }),
    )
    .await;
    let generator = ImageGenerator::new(
        format!("{url}/images/generations"),
        Some(API_KEY.to_string()),
        TIMEOUT,
    )?;
    assert_matches!(
        generator.generate("fox", Some("1x1"), None).await,
        Err(GenerationError::Status { status: 400, .. })
    );
    Ok(())
}
