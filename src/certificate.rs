use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pki_types::{CertificateDer, InvalidDnsNameError, ServerName, UnixTime};
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use sha1::Sha1;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use url::Url;
use webpki::{EndEntityCert, KeyUsage};

/// Name the signing certificate has to be issued for
const SIGNING_SUBJECT: &str = "echo-api.amazon.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// `Signature` header
    Sha1,
    /// `Signature-256` header
    Sha256,
}

/// Base64 encoded signature taken from the request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub algorithm: SignatureAlgorithm,
    pub value: String,
}

impl RequestSignature {
    pub fn new(algorithm: SignatureAlgorithm, value: &str) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Failed to fetch certificate chain: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to read certificate chain: {0}")]
    Pem(#[from] std::io::Error),
    #[error("Certificate chain is empty")]
    EmptyChain,
    #[error("Certificate chain is not trusted: {0}")]
    Untrusted(#[from] webpki::Error),
    #[error(transparent)]
    SubjectName(#[from] InvalidDnsNameError),
    #[error("Failed to parse certificate: {0}")]
    Parse(String),
    #[error("Certificate does not contain an RSA public key: {0}")]
    PublicKey(#[from] rsa::pkcs8::spki::Error),
    #[error("Signature is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Signature does not match the request body")]
    Mismatch(#[from] rsa::signature::Error),
}

/// Checks that a request body was signed by the holder of the certificate at `cert_url`.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        cert_url: &Url,
        signature: &RequestSignature,
        body: &[u8],
    ) -> Result<(), CertificateError>;
}

#[derive(Debug)]
pub struct CertificateChain {
    leaf: CertificateDer<'static>,
    intermediates: Vec<CertificateDer<'static>>,
}

impl CertificateChain {
    /// The first certificate is the signing certificate, the rest make up the chain.
    pub fn from_pem(pem: &[u8]) -> Result<Self, CertificateError> {
        let mut certs = rustls_pemfile::certs(&mut &pem[..]).collect::<Result<Vec<_>, _>>()?;
        if certs.is_empty() {
            return Err(CertificateError::EmptyChain);
        }

        let leaf = certs.remove(0);
        Ok(Self {
            leaf,
            intermediates: certs,
        })
    }

    pub fn validate(&self, now: UnixTime) -> Result<(), CertificateError> {
        let cert = EndEntityCert::try_from(&self.leaf)?;

        cert.verify_for_usage(
            webpki::ALL_VERIFICATION_ALGS,
            webpki_roots::TLS_SERVER_ROOTS,
            &self.intermediates,
            now,
            KeyUsage::server_auth(),
            None,
            None,
        )?;

        let subject = ServerName::try_from(SIGNING_SUBJECT)?;
        cert.verify_is_valid_for_subject_name(&subject)?;

        Ok(())
    }

    pub fn public_key(&self) -> Result<RsaPublicKey, CertificateError> {
        let (_, cert) = x509_parser::parse_x509_certificate(self.leaf.as_ref())
            .map_err(|err| CertificateError::Parse(err.to_string()))?;

        Ok(RsaPublicKey::from_public_key_der(cert.public_key().raw)?)
    }
}

/// Verify an RSA PKCS#1 v1.5 signature over the raw request body.
pub fn verify_signature(
    public_key: &RsaPublicKey,
    signature: &RequestSignature,
    body: &[u8],
) -> Result<(), CertificateError> {
    let decoded = STANDARD.decode(signature.value.trim())?;
    let decoded = Signature::try_from(decoded.as_slice())?;

    match signature.algorithm {
        SignatureAlgorithm::Sha1 => {
            VerifyingKey::<Sha1>::new(public_key.clone()).verify(body, &decoded)?
        }
        SignatureAlgorithm::Sha256 => {
            VerifyingKey::<Sha256>::new(public_key.clone()).verify(body, &decoded)?
        }
    }

    Ok(())
}

/// Fetches the signing certificate chain from Amazon and validates it against the webpki roots.
#[derive(Debug, Clone)]
pub struct AmazonCertificateVerifier {
    client: reqwest::Client,
}

impl AmazonCertificateVerifier {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, cert_url: &Url) -> Result<CertificateChain, CertificateError> {
        debug!(%cert_url, "Fetching certificate chain");

        let pem = self
            .client
            .get(cert_url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        CertificateChain::from_pem(&pem)
    }
}

#[async_trait]
impl SignatureVerifier for AmazonCertificateVerifier {
    async fn verify(
        &self,
        cert_url: &Url,
        signature: &RequestSignature,
        body: &[u8],
    ) -> Result<(), CertificateError> {
        let chain = self.fetch(cert_url).await?;
        chain.validate(UnixTime::now())?;

        verify_signature(&chain.public_key()?, signature, body)
    }
}
