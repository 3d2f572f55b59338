use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::certificate::{RequestSignature, SignatureAlgorithm, SignatureVerifier};

pub const CERT_CHAIN_URL_HEADER: &str = "signaturecertchainurl";
pub const SIGNATURE_HEADER: &str = "signature";
pub const SIGNATURE_256_HEADER: &str = "signature-256";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Missing SignatureCertChainUrl header")]
    MissingCertHeader,
    #[error("SignatureCertChainUrl is not a valid certificate location")]
    InvalidCertUrl,
    #[error("Missing Signature header")]
    MissingSignature,
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Request timestamp is outside of the allowed tolerance")]
    StaleTimestamp,
    #[error("Request signature could not be verified")]
    SignatureMismatch,
}

/// Checks that a request was sent by Alexa and is not a replay.
pub struct RequestVerifier {
    tolerance: Duration,
    signature: Box<dyn SignatureVerifier>,
}

impl RequestVerifier {
    pub fn new(tolerance: Duration, signature: impl SignatureVerifier + 'static) -> Self {
        Self {
            tolerance,
            signature: Box::new(signature),
        }
    }

    pub async fn verify(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.verify_at(headers, body, timestamp, Utc::now()).await
    }

    /// Every rejection is logged as a warning, the reason is never sent back to the client.
    pub async fn verify_at(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let Some(cert_url) = header(headers, CERT_CHAIN_URL_HEADER) else {
            return Err(reject(VerificationError::MissingCertHeader));
        };

        let Some(cert_url) = parse_cert_url(cert_url) else {
            warn!(
                reason = %VerificationError::InvalidCertUrl,
                "Validation failed, not a valid SignatureCertChainUrl: {cert_url}"
            );
            return Err(VerificationError::InvalidCertUrl);
        };

        let Some(signature) = signature(headers) else {
            return Err(reject(VerificationError::MissingSignature));
        };

        if String::from_utf8_lossy(body).trim().is_empty() {
            return Err(reject(VerificationError::EmptyBody));
        }

        if !within_tolerance(timestamp, now, self.tolerance) {
            warn!(
                reason = %VerificationError::StaleTimestamp,
                %timestamp,
                "Validation failed"
            );
            return Err(VerificationError::StaleTimestamp);
        }

        // Any failure here, including not being able to fetch the certificate, is a rejection
        if let Err(err) = self.signature.verify(&cert_url, &signature, body).await {
            warn!(
                reason = %VerificationError::SignatureMismatch,
                %cert_url,
                "Validation failed: {err}"
            );
            return Err(VerificationError::SignatureMismatch);
        }

        Ok(())
    }
}

fn reject(reason: VerificationError) -> VerificationError {
    warn!(%reason, "Validation failed");
    reason
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn signature(headers: &HeaderMap) -> Option<RequestSignature> {
    if let Some(value) = header(headers, SIGNATURE_256_HEADER) {
        return Some(RequestSignature::new(SignatureAlgorithm::Sha256, value));
    }

    header(headers, SIGNATURE_HEADER)
        .map(|value| RequestSignature::new(SignatureAlgorithm::Sha1, value))
}

/// Amazon only signs with certificates hosted at
/// `https://s3.amazonaws.com[:443]/echo.api/...`, scheme and host are compared case-insensitively
/// (the url crate lowercases them), the path is compared after resolving dot segments.
fn parse_cert_url(value: &str) -> Option<Url> {
    let url = Url::parse(value).ok()?;

    let valid = url.scheme() == "https"
        && url.host_str() == Some("s3.amazonaws.com")
        && url.port_or_known_default() == Some(443)
        && url.path().starts_with("/echo.api/");

    valid.then_some(url)
}

fn within_tolerance(timestamp: DateTime<Utc>, now: DateTime<Utc>, tolerance: Duration) -> bool {
    let difference = now
        .signed_duration_since(timestamp)
        .num_milliseconds()
        .unsigned_abs();

    u128::from(difference) <= tolerance.as_millis()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use url::Url;

    use crate::certificate::{CertificateError, RequestSignature, SignatureVerifier};

    /// Accepts or rejects every signature and records what it was asked to check.
    #[derive(Debug, Clone, Default)]
    pub struct FakeVerifier {
        pub reject: bool,
        pub calls: Arc<Mutex<Vec<(Url, RequestSignature)>>>,
    }

    impl FakeVerifier {
        pub fn accepting() -> Self {
            Self::default()
        }

        pub fn rejecting() -> Self {
            Self {
                reject: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(Url, RequestSignature)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SignatureVerifier for FakeVerifier {
        async fn verify(
            &self,
            cert_url: &Url,
            signature: &RequestSignature,
            _body: &[u8],
        ) -> Result<(), CertificateError> {
            self.calls
                .lock()
                .unwrap()
                .push((cert_url.clone(), signature.clone()));

            if self.reject {
                Err(CertificateError::EmptyChain)
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::TimeDelta;

    use super::testing::FakeVerifier;
    use super::*;
    use crate::certificate::AmazonCertificateVerifier;

    const CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";
    const BODY: &[u8] = br#"{"version":"1.0"}"#;

    fn headers(cert_url: Option<&str>, signature: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(cert_url) = cert_url {
            headers.insert(
                CERT_CHAIN_URL_HEADER,
                HeaderValue::from_str(cert_url).unwrap(),
            );
        }
        if let Some(signature) = signature {
            headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(signature).unwrap());
        }

        headers
    }

    fn verifier(fake: &FakeVerifier) -> RequestVerifier {
        RequestVerifier::new(Duration::from_secs(150), fake.clone())
    }

    async fn verify(
        fake: &FakeVerifier,
        headers: &HeaderMap,
        body: &[u8],
        age: TimeDelta,
    ) -> Result<(), VerificationError> {
        let now = Utc::now();
        verifier(fake)
            .verify_at(headers, body, now - age, now)
            .await
    }

    #[tokio::test]
    async fn valid_request() {
        let fake = FakeVerifier::accepting();
        let headers = headers(Some(CERT_URL), Some("c2lnbmF0dXJl"));

        assert_eq!(verify(&fake, &headers, BODY, TimeDelta::zero()).await, Ok(()));

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_str(), CERT_URL);
        assert_eq!(
            calls[0].1,
            RequestSignature::new(SignatureAlgorithm::Sha1, "c2lnbmF0dXJl")
        );
    }

    #[tokio::test]
    async fn missing_cert_header() {
        let fake = FakeVerifier::accepting();

        for headers in [
            headers(None, Some("c2lnbmF0dXJl")),
            headers(Some("   "), Some("c2lnbmF0dXJl")),
        ] {
            assert_eq!(
                verify(&fake, &headers, BODY, TimeDelta::zero()).await,
                Err(VerificationError::MissingCertHeader)
            );
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_cert_url() {
        let fake = FakeVerifier::accepting();

        for url in [
            "not a url",
            "http://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "https://notamazon.com/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/EcHo.aPi/echo-api-cert.pem",
            "https://s3.amazonaws.com/invalid.path/echo-api-cert.pem",
            "https://s3.amazonaws.com:563/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/echo.api/../invalid.path/echo-api-cert.pem",
        ] {
            let headers = headers(Some(url), Some("c2lnbmF0dXJl"));
            assert_eq!(
                verify(&fake, &headers, BODY, TimeDelta::zero()).await,
                Err(VerificationError::InvalidCertUrl),
                "{url}"
            );
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn accepted_cert_urls() {
        let fake = FakeVerifier::accepting();

        for url in [
            "https://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "HTTPS://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "https://S3.AMAZONAWS.COM/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com:443/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/echo.api/../echo.api/echo-api-cert.pem",
        ] {
            let headers = headers(Some(url), Some("c2lnbmF0dXJl"));
            assert_eq!(
                verify(&fake, &headers, BODY, TimeDelta::zero()).await,
                Ok(()),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn missing_signature() {
        let fake = FakeVerifier::accepting();

        for headers in [headers(Some(CERT_URL), None), headers(Some(CERT_URL), Some(""))] {
            assert_eq!(
                verify(&fake, &headers, BODY, TimeDelta::zero()).await,
                Err(VerificationError::MissingSignature)
            );
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn prefers_sha256_signature() {
        let fake = FakeVerifier::accepting();
        let mut headers = headers(Some(CERT_URL), Some("c2hhMQ=="));
        headers.insert(SIGNATURE_256_HEADER, HeaderValue::from_static("c2hhMjU2"));

        assert_eq!(verify(&fake, &headers, BODY, TimeDelta::zero()).await, Ok(()));
        assert_eq!(
            fake.calls()[0].1,
            RequestSignature::new(SignatureAlgorithm::Sha256, "c2hhMjU2")
        );
    }

    #[tokio::test]
    async fn empty_body() {
        let fake = FakeVerifier::accepting();
        let headers = headers(Some(CERT_URL), Some("c2lnbmF0dXJl"));

        for body in [&b""[..], &b"  \n\t"[..]] {
            assert_eq!(
                verify(&fake, &headers, body, TimeDelta::zero()).await,
                Err(VerificationError::EmptyBody)
            );
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn stale_timestamp() {
        let fake = FakeVerifier::accepting();
        let headers = headers(Some(CERT_URL), Some("c2lnbmF0dXJl"));

        for age in [TimeDelta::minutes(10), TimeDelta::minutes(-10), TimeDelta::seconds(151)] {
            assert_eq!(
                verify(&fake, &headers, BODY, age).await,
                Err(VerificationError::StaleTimestamp)
            );
        }
        // The signature is never checked for stale requests
        assert!(fake.calls().is_empty());

        assert_eq!(
            verify(&fake, &headers, BODY, TimeDelta::seconds(150)).await,
            Ok(())
        );
        assert_eq!(
            verify(&fake, &headers, BODY, TimeDelta::seconds(-150)).await,
            Ok(())
        );
    }

    #[tokio::test]
    async fn signature_mismatch() {
        let fake = FakeVerifier::rejecting();
        let headers = headers(Some(CERT_URL), Some("c2lnbmF0dXJl"));

        assert_eq!(
            verify(&fake, &headers, BODY, TimeDelta::zero()).await,
            Err(VerificationError::SignatureMismatch)
        );
        assert_eq!(fake.calls().len(), 1);
    }

    #[test]
    fn tolerance() {
        let now = Utc::now();
        let tolerance = Duration::from_secs(150);

        assert!(within_tolerance(now, now, tolerance));
        assert!(within_tolerance(
            now - TimeDelta::milliseconds(150_000),
            now,
            tolerance
        ));
        assert!(!within_tolerance(
            now - TimeDelta::milliseconds(150_001),
            now,
            tolerance
        ));
    }

    #[tokio::test]
    async fn unreachable_certificate() {
        let signature = AmazonCertificateVerifier::new(Duration::from_millis(300)).unwrap();
        let verifier = RequestVerifier::new(Duration::from_secs(150), signature);
        let headers = headers(Some(CERT_URL), Some("c2lnbmF0dXJl"));

        // Whether the fetch times out, fails to connect or returns a real chain, a bogus
        // signature is never accepted
        assert_eq!(
            verifier.verify(&headers, BODY, Utc::now()).await,
            Err(VerificationError::SignatureMismatch)
        );
    }
}
