//! reqwest implementations of the collaborator traits against the image
//! backend's REST surface.

use std::time::Duration;

use {
    async_trait::async_trait,
    atelia_common::types::GenerationOutcome,
    reqwest::multipart::{Form, Part},
    serde::Deserialize,
    tracing::debug,
};

use crate::{
    api::{
        AccountDirectory, DefaultsStore, GenerationBackend, GenerationRequest, IntentAssessment,
        IntentAssessor, SubscriberRegistry,
    },
    error::{Context, Error, Result},
};

/// Username half of the basic-auth pair; the password carries the platform
/// user id the call is made on behalf of.
const CALLER_SOURCE: &str = "CHAT";

/// The backend wraps every response in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn is_success(&self) -> bool {
        self.code == "SUCCESS"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentAssessmentBody {
    generate_intent: bool,
    #[serde(default)]
    guide_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenResultBody {
    /// The backend pads with nulls for candidates that produced nothing.
    #[serde(default)]
    images: Vec<Option<String>>,
}

/// Client for the image backend's REST API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let mut form = Form::new().text("text", request.prompt.clone());
        if let Some(bytes) = request.reference_image {
            form = form.part("image", Part::bytes(bytes).file_name("image"));
        }
        for (key, value) in request.params.iter_set() {
            if let Some(field) = key.field_name() {
                form = form.text(field, value.to_string());
            }
        }

        debug!(user = %request.user_id, "submitting generation");
        let envelope: Envelope<GenResultBody> = self
            .client
            .post(self.url("/api/generative-image"))
            .basic_auth(CALLER_SOURCE, Some(&request.user_id))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.is_success() {
            let urls = envelope
                .data
                .map(|d| d.images.into_iter().flatten().collect())
                .unwrap_or_default();
            Ok(GenerationOutcome::success(urls, envelope.message))
        } else {
            Ok(GenerationOutcome::failure(
                envelope
                    .message
                    .unwrap_or_else(|| "generation failed".to_string()),
            ))
        }
    }
}

#[async_trait]
impl IntentAssessor for HttpBackend {
    async fn assess(&self, user_id: &str, text: &str) -> Result<IntentAssessment> {
        let envelope: Envelope<IntentAssessmentBody> = self
            .client
            .post(self.url("/api/generative-image/assess-intent"))
            .basic_auth(CALLER_SOURCE, Some(user_id))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(text.to_string())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.is_success() {
            return Err(Error::Protocol(format!(
                "intent assessment failed: {}",
                envelope.message.unwrap_or_default()
            )));
        }
        let body = envelope.data.context("intent assessment without data")?;
        Ok(IntentAssessment {
            generate_intent: body.generate_intent,
            guide_message: body.guide_message,
        })
    }
}

#[async_trait]
impl DefaultsStore for HttpBackend {
    async fn get(&self, user_id: &str) -> Result<Option<String>> {
        let envelope: Envelope<String> = self
            .client
            .get(self.url("/api/generative-image/config"))
            .basic_auth(CALLER_SOURCE, Some(user_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.data)
    }

    async fn put(&self, user_id: &str, raw: &str) -> Result<()> {
        self.client
            .put(self.url("/api/generative-image/config"))
            .basic_auth(CALLER_SOURCE, Some(user_id))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(raw.to_string())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for HttpBackend {
    async fn is_linked(&self, user_id: &str) -> Result<bool> {
        let envelope: Envelope<bool> = self
            .client
            .get(self.url("/api/user/linked"))
            .query(&[("user_source", CALLER_SOURCE), ("source_code", user_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.data.unwrap_or(false))
    }
}

#[async_trait]
impl SubscriberRegistry for HttpBackend {
    async fn register(&self, user_id: &str) -> Result<()> {
        self.client
            .get(self.url("/api/user/subscribe"))
            .query(&[("user_source", CALLER_SOURCE), ("source_code", user_id)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Downloads reference images from the platform's media host.
pub struct HttpMediaFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMediaFetcher {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl crate::api::MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, media_ref: &str) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(format!("{}/media/{media_ref}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, atelia_params::ParamSet, std::time::Duration};

    fn backend(url: &str) -> HttpBackend {
        HttpBackend::new(url, Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_maps_params_onto_multipart_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generative-image")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::Regex("name=\"text\"".into()),
                mockito::Matcher::Regex("name=\"candidateCount\"".into()),
                mockito::Matcher::Regex("name=\"aspectRatio\"".into()),
                mockito::Matcher::Regex("16:9".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code": "SUCCESS", "message": null,
                    "data": {"images": ["https://img/1.png", null, "https://img/2.png"]}}"#,
            )
            .create_async()
            .await;

        let outcome = backend(&server.url())
            .generate(GenerationRequest {
                user_id: "u1".into(),
                prompt: "a lighthouse".into(),
                reference_image: None,
                params: ParamSet::parse("cc-2 ar-16:9"),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.success);
        // Null candidates are dropped.
        assert_eq!(
            outcome.image_urls,
            vec!["https://img/1.png", "https://img/2.png"]
        );
    }

    #[tokio::test]
    async fn test_generate_declared_failure_is_ok_outcome() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generative-image")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code": "FAIL", "message": "quota exhausted", "data": null}"#)
            .create_async()
            .await;

        let outcome = backend(&server.url())
            .generate(GenerationRequest {
                user_id: "u1".into(),
                prompt: "anything".into(),
                reference_image: None,
                params: ParamSet::default(),
            })
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("quota exhausted"));
    }

    #[tokio::test]
    async fn test_generate_http_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generative-image")
            .with_status(502)
            .create_async()
            .await;

        let err = backend(&server.url())
            .generate(GenerationRequest {
                user_id: "u1".into(),
                prompt: "anything".into(),
                reference_image: None,
                params: ParamSet::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_assess_intent_decodes_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generative-image/assess-intent")
            .match_header("content-type", "text/plain")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code": "SUCCESS", "message": null,
                    "data": {"generateIntent": false, "guideMessage": "try describing a scene"}}"#,
            )
            .create_async()
            .await;

        let assessment = backend(&server.url()).assess("u1", "hello").await.unwrap();
        assert!(!assessment.generate_intent);
        assert_eq!(
            assessment.guide_message.as_deref(),
            Some("try describing a scene")
        );
    }

    #[tokio::test]
    async fn test_assess_intent_fail_envelope_is_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generative-image/assess-intent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code": "FAIL", "message": "nope", "data": null}"#)
            .create_async()
            .await;

        let err = backend(&server.url()).assess("u1", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_defaults_round_trip_endpoints() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/api/generative-image/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code": "SUCCESS", "message": null, "data": "{\"cc\":\"2\"}"}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/api/generative-image/config")
            .match_body(r#"{"cc":"3"}"#)
            .with_status(200)
            .with_body(r#"{"code": "SUCCESS", "message": null, "data": null}"#)
            .create_async()
            .await;

        let backend = backend(&server.url());
        let blob = DefaultsStore::get(&backend, "u1").await.unwrap();
        assert_eq!(blob.as_deref(), Some(r#"{"cc":"2"}"#));
        DefaultsStore::put(&backend, "u1", r#"{"cc":"3"}"#)
            .await
            .unwrap();

        get.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_media_fetcher_returns_bytes() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/m-123")
            .with_status(200)
            .with_body([0x89u8, 0x50, 0x4e, 0x47].as_slice())
            .create_async()
            .await;

        let fetcher = HttpMediaFetcher::new(server.url(), Duration::from_secs(1)).unwrap();
        let bytes = crate::api::MediaFetcher::fetch(&fetcher, "m-123")
            .await
            .unwrap();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }
}
