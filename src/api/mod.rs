// ============================================================
// Layer 1 — HTTP API
// ============================================================
// One endpoint, thin glue over PredictUseCase:
//
//   POST /predict   multipart/form-data, image in field "file"
//                   (any first field is accepted)
//
//   200 {"message":"Prediction successful","prediction":7,"probabilities":[...]}
//   200 {"message":"An error occurred"}
//
// Both outcomes are HTTP 200; clients read `message`. The
// forward pass runs on tokio's blocking pool.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::predict_use_case::{PredictResponse, PredictUseCase};

/// Multipart field the image is expected in.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub model_dir: String,
    pub host:      String,
    pub port:      u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            model_dir: "trained_models".to_string(),
            host:      "0.0.0.0".to_string(),
            port:      5000,
        }
    }
}

pub fn router(use_case: Arc<PredictUseCase>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(use_case)
}

/// Load the model, bind, and serve until the process is stopped.
pub async fn serve(config: &ServeConfig) -> Result<()> {
    let use_case = PredictUseCase::from_model_dir(&config.model_dir)?;
    let app = router(Arc::new(use_case));

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot bind to {address}"))?;

    tracing::info!("Serving POST /predict on {address}");
    println!("Listening on http://{address}");

    axum::serve(listener, app).await.context("HTTP server stopped")?;
    Ok(())
}

async fn predict(
    State(use_case): State<Arc<PredictUseCase>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<PredictResponse> {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => Err(anyhow::anyhow!(rejection)),
    };
    let bytes = match upload {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Unreadable upload: {e:#}");
            return Json(PredictResponse::failure());
        }
    };

    match tokio::task::spawn_blocking(move || use_case.respond(&bytes)).await {
        Ok(response) => Json(response),
        Err(e) => {
            tracing::error!("Prediction task failed: {e}");
            Json(PredictResponse::failure())
        }
    }
}

/// Bytes of the `file` field, or of the first field if none is named so.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes> {
    let mut first = None;
    while let Some(field) = multipart.next_field().await? {
        let named_file = field.name() == Some(UPLOAD_FIELD);
        let data = field.bytes().await?;
        if named_file {
            return Ok(data);
        }
        first.get_or_insert(data);
    }
    first.context("Multipart body has no fields")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header::CONTENT_TYPE, Request},
    };
    use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
    use std::{io::Cursor, net::SocketAddr};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };

    use crate::application::predict_use_case::{FAILURE_MESSAGE, SUCCESS_MESSAGE};
    use crate::domain::{
        error::DigitError, features::FeatureVector, prediction::PredictionResult,
        traits::DigitClassifier,
    };

    const BOUNDARY: &str = "digitboundary";

    struct AlwaysFour;

    impl DigitClassifier for AlwaysFour {
        fn classify(&self, _: &FeatureVector) -> Result<PredictionResult, DigitError> {
            let mut p = vec![0.0; 10];
            p[4] = 1.0;
            PredictionResult::from_probabilities(p)
        }
    }

    fn use_case() -> Arc<PredictUseCase> {
        Arc::new(PredictUseCase::new(Arc::new(AlwaysFour)))
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(ImageBuffer::from_pixel(20, 20, Luma([255u8])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, data) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"upload.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn extract(body: Vec<u8>) -> Result<Multipart, MultipartRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await
    }

    /// Serve the real router on a loopback port.
    async fn spawn_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(use_case())).await });
        address
    }

    /// One HTTP/1.1 exchange; returns the response head and body.
    async fn send(address: SocketAddr, method: &str, body: &[u8]) -> (String, String) {
        let mut stream = TcpStream::connect(address).await.unwrap();
        let head = format!(
            "{method} /predict HTTP/1.1\r\nHost: {address}\r\n\
             Content-Type: multipart/form-data; boundary={BOUNDARY}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        (head.to_string(), body.to_string())
    }

    #[tokio::test]
    async fn test_router_serves_json_over_http() {
        let address = spawn_server().await;
        let image = png();

        let (head, body) = send(address, "POST", &multipart_body(&[("file", &image[..])])).await;
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["prediction"], 4);

        let (head, body) =
            send(address, "POST", &multipart_body(&[("file", &b"garbage"[..])])).await;
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert_eq!(body, format!(r#"{{"message":"{FAILURE_MESSAGE}"}}"#));
    }

    #[tokio::test]
    async fn test_router_only_accepts_post() {
        let address = spawn_server().await;
        let (head, _) = send(address, "GET", b"").await;
        assert!(head.starts_with("HTTP/1.1 405"), "{head}");
    }

    #[tokio::test]
    async fn test_predict_prefers_file_field() {
        let image = png();
        let body = multipart_body(&[("note", &b"not an image"[..]), ("file", &image[..])]);
        let Json(response) = predict(State(use_case()), extract(body).await).await;
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["prediction"], 4);
    }

    #[tokio::test]
    async fn test_predict_accepts_first_field() {
        let image = png();
        let body = multipart_body(&[("image", &image[..])]);
        let Json(response) = predict(State(use_case()), extract(body).await).await;
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_empty_upload_is_failure_payload() {
        let body = multipart_body(&[("file", &b""[..])]);
        let Json(response) = predict(State(use_case()), extract(body).await).await;
        assert_eq!(response, PredictResponse::Failure { message: FAILURE_MESSAGE.into() });
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_failure_payload() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::empty())
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await;
        assert!(multipart.is_err());
        let Json(response) = predict(State(use_case()), multipart).await;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_no_fields_is_an_error() {
        let multipart = extract(multipart_body(&[])).await.unwrap();
        assert!(read_upload(multipart).await.is_err());
    }
}
