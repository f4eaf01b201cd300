//! Document-store sink over HTTPS
//!
//! ## Overview
//!
//! Stations overwrite one document per cycle with their latest readings.
//! The document store's REST API expects every field wrapped in a typed
//! value, so a set is encoded as:
//!
//! ```text
//! {
//!   "fields": {
//!     "pHValue":         { "doubleValue": 7.5 },
//!     "TDSValue":        { "doubleValue": 367.4 },
//!     "turbidityValue":  { "doubleValue": 500.0 },
//!     "ultrasonicValue": { "doubleValue": 50.0 },
//!     "salinitasValue":  { "doubleValue": 0.645 }
//!   }
//! }
//! ```
//!
//! and sent with a PATCH to
//! `{base_url}/v1/projects/{project}/databases/(default)/documents/{path}`.
//!
//! [`encode_document`] is always available; the HTTP client sits behind the
//! `http` feature.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! # #[cfg(feature = "http")]
//! # fn example() -> Result<(), aquasense_connectors::ConnectorError> {
//! use aquasense_connectors::document::{DocumentConfig, DocumentSink};
//!
//! let config = DocumentConfig::new("my-project", "api-key")
//!     .document_path("sensorRead/dataSensor")
//!     .timeout_secs(10);
//! let sink = DocumentSink::new(config)?;
//! # Ok(())
//! # }
//! ```

use aquasense_core::{QuantityKind, ReadingSet};
use serde_json::{json, Map, Value};

/// Document field names, in publication order
pub const FIELD_NAMES: [&str; 5] = [
    "pHValue",
    "TDSValue",
    "turbidityValue",
    "ultrasonicValue",
    "salinitasValue",
];

fn field_name(kind: QuantityKind) -> &'static str {
    match kind {
        QuantityKind::Ph => FIELD_NAMES[0],
        QuantityKind::Tds => FIELD_NAMES[1],
        QuantityKind::Turbidity => FIELD_NAMES[2],
        QuantityKind::Distance => FIELD_NAMES[3],
    }
}

fn double(value: f32) -> Value {
    json!({ "doubleValue": f64::from(value) })
}

/// Encode a set as a document-store document
///
/// Salinity is written as 0 when the set carries none; sinks only receive
/// sendable sets, which always have it.
pub fn encode_document(readings: &ReadingSet) -> Value {
    let mut fields = Map::new();
    for reading in readings.readings() {
        fields.insert(field_name(reading.kind()).to_owned(), double(reading.value()));
    }
    fields.insert(
        FIELD_NAMES[4].to_owned(),
        double(readings.salinity_ppt().unwrap_or(0.0)),
    );
    json!({ "fields": fields })
}

#[cfg(feature = "http")]
pub use client::{DocumentConfig, DocumentSink, DEFAULT_BASE_URL, DEFAULT_DOCUMENT_PATH};

#[cfg(feature = "http")]
mod client {
    use std::time::Duration;

    use aquasense_core::{Ack, ReadingSet, SinkError, TelemetrySink};

    use super::encode_document;
    use crate::{ConnectionStats, ConnectorError};

    /// Public endpoint of the hosted document store
    pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

    /// Document the deployed stations overwrite
    pub const DEFAULT_DOCUMENT_PATH: &str = "sensorRead/dataSensor";

    /// Document sink configuration
    #[derive(Clone)]
    pub struct DocumentConfig {
        /// Base URL of the document store API
        pub base_url: String,
        /// Project owning the database
        pub project_id: String,
        /// Document path inside the default database
        pub document_path: String,
        /// API key sent as the `key` query parameter
        pub api_key: String,
        /// Request timeout
        pub timeout: Duration,
        /// User agent string
        pub user_agent: String,
    }

    impl core::fmt::Debug for DocumentConfig {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.debug_struct("DocumentConfig")
                .field("base_url", &self.base_url)
                .field("project_id", &self.project_id)
                .field("document_path", &self.document_path)
                .field("api_key", &"<redacted>")
                .field("timeout", &self.timeout)
                .finish()
        }
    }

    impl DocumentConfig {
        /// Configuration for `project` authenticated with `api_key`
        pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self {
                base_url: DEFAULT_BASE_URL.into(),
                project_id: project_id.into(),
                document_path: DEFAULT_DOCUMENT_PATH.into(),
                api_key: api_key.into(),
                timeout: Duration::from_secs(15),
                user_agent: format!("AquaSense/{}", env!("CARGO_PKG_VERSION")),
            }
        }

        /// Override the API base URL
        pub fn base_url(mut self, url: impl Into<String>) -> Self {
            self.base_url = url.into();
            self
        }

        /// Set the document path
        pub fn document_path(mut self, path: impl Into<String>) -> Self {
            self.document_path = path.into();
            self
        }

        /// Set request timeout in seconds
        pub fn timeout_secs(mut self, secs: u64) -> Self {
            self.timeout = Duration::from_secs(secs);
            self
        }

        /// Check the settings before any request is made
        pub fn validate(&self) -> Result<(), ConnectorError> {
            if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
                return Err(ConnectorError::Config(
                    "Base URL must start with http:// or https://".into(),
                ));
            }
            if self.project_id.is_empty() {
                return Err(ConnectorError::Config("Project id is empty".into()));
            }
            if self.document_path.is_empty() || self.document_path.starts_with('/') {
                return Err(ConnectorError::Config(
                    "Document path must be relative and non-empty".into(),
                ));
            }
            if self.api_key.is_empty() {
                return Err(ConnectorError::Config("API key is empty".into()));
            }
            Ok(())
        }

        /// Document URL without the key parameter
        pub fn document_url(&self) -> String {
            format!(
                "{}/v1/projects/{}/databases/(default)/documents/{}",
                self.base_url.trim_end_matches('/'),
                self.project_id,
                self.document_path
            )
        }
    }

    /// Sink writing each set into one document
    pub struct DocumentSink {
        config: DocumentConfig,
        agent: ureq::Agent,
        url: String,
        stats: ConnectionStats,
    }

    impl DocumentSink {
        /// Create a sink, validating the configuration
        pub fn new(config: DocumentConfig) -> Result<Self, ConnectorError> {
            config.validate()?;

            let agent = ureq::AgentBuilder::new()
                .timeout(config.timeout)
                .user_agent(&config.user_agent)
                .build();
            let url = config.document_url();

            Ok(Self {
                config,
                agent,
                url,
                stats: ConnectionStats::default(),
            })
        }

        /// Active configuration
        pub fn config(&self) -> &DocumentConfig {
            &self.config
        }

        /// Get connection statistics
        pub fn stats(&self) -> &ConnectionStats {
            &self.stats
        }

        /// PATCH one set, returning the bytes sent
        pub fn patch(&self, readings: &ReadingSet) -> Result<usize, ConnectorError> {
            let body = serde_json::to_string(&encode_document(readings))
                .map_err(|e| ConnectorError::Serialization(e.to_string()))?;

            let response = self
                .agent
                .request("PATCH", &self.url)
                .query("key", &self.config.api_key)
                .set("Content-Type", "application/json")
                .set("Accept", "application/json")
                .send_string(&body);

            match response {
                Ok(_) => Ok(body.len()),
                Err(ureq::Error::Status(code, _)) => Err(ConnectorError::from_status(code)),
                Err(ureq::Error::Transport(e)) => match e.kind() {
                    ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns => {
                        Err(ConnectorError::NotConnected)
                    }
                    _ => Err(ConnectorError::Transport(e.to_string())),
                },
            }
        }
    }

    impl TelemetrySink for DocumentSink {
        fn publish(&mut self, readings: ReadingSet) -> Result<Ack, SinkError> {
            match self.patch(&readings) {
                Ok(bytes) => {
                    log::debug!("cycle {} stored ({} bytes)", readings.cycle(), bytes);
                    self.stats.record_sent(bytes);
                    Ok(Ack)
                }
                Err(err) => {
                    log::warn!("cycle {} not stored: {}", readings.cycle(), err);
                    self.stats.record_failure(&err);
                    Err(err.into())
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn url_follows_document_layout() {
            let config = DocumentConfig::new("pond-42", "k").base_url("https://example.test/");
            assert_eq!(
                config.document_url(),
                "https://example.test/v1/projects/pond-42/databases/(default)/documents/sensorRead/dataSensor"
            );
        }

        #[test]
        fn rejects_bad_settings() {
            let ok = DocumentConfig::new("p", "k");
            assert!(ok.validate().is_ok());

            assert!(matches!(
                DocumentSink::new(ok.clone().base_url("ftp://host")),
                Err(ConnectorError::Config(_))
            ));
            assert!(DocumentConfig::new("", "k").validate().is_err());
            assert!(DocumentConfig::new("p", "").validate().is_err());
            assert!(ok.clone().document_path("/abs").validate().is_err());
        }

        #[test]
        fn debug_hides_api_key() {
            let config = DocumentConfig::new("p", "secret-key");
            assert!(!format!("{:?}", config).contains("secret-key"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquasense_core::{derived::DerivedQuantities, CalibrationProfile, PhysicalReading};

    fn set(tds: f32) -> ReadingSet {
        let readings = [
            PhysicalReading::measured(QuantityKind::Ph, 7.5),
            PhysicalReading::measured(QuantityKind::Tds, tds),
            PhysicalReading::measured(QuantityKind::Turbidity, 250.0),
            PhysicalReading::measured(QuantityKind::Distance, 42.0),
        ];
        let derived = DerivedQuantities::compute(&readings, &CalibrationProfile::REFERENCE_PROBE);
        ReadingSet::assemble(1, 0, readings, derived)
    }

    #[test]
    fn document_has_typed_double_fields() {
        let doc = encode_document(&set(1000.0));
        let fields = doc["fields"].as_object().unwrap();

        assert_eq!(fields.len(), FIELD_NAMES.len());
        for name in FIELD_NAMES {
            assert!(fields[name]["doubleValue"].is_f64(), "{}", name);
        }
        assert_eq!(fields["pHValue"]["doubleValue"], 7.5);
        assert_eq!(fields["turbidityValue"]["doubleValue"], 250.0);
        assert_eq!(fields["ultrasonicValue"]["doubleValue"], 42.0);

        let salinity = fields["salinitasValue"]["doubleValue"].as_f64().unwrap();
        assert!((salinity - 1.754_386).abs() < 1e-5);
    }

    #[test]
    fn missing_salinity_encodes_as_zero() {
        let doc = encode_document(&set(-5.0));
        assert_eq!(doc["fields"]["salinitasValue"]["doubleValue"], 0.0);
    }
}
