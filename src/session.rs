//! Shared handle to the query engine.
//!
//! Mirrors an engine "get or create" surface: the first call builds one
//! `SessionContext` for the whole process and registers the object stores the
//! configured locations need; every later call reuses it.

use std::collections::BTreeSet;
use std::sync::Arc;

use datafusion::prelude::SessionContext;
use object_store::aws::AmazonS3Builder;
use once_cell::sync::OnceCell;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::{EtlError, Result};

static SESSION: OnceCell<SessionContext> = OnceCell::new();

/// Returns the process-wide engine session, building it on first use.
///
/// Later calls ignore their argument and hand back the session built by the
/// first caller. A provisioning failure is fatal to the run.
pub fn get_or_create(config: &Config) -> Result<SessionContext> {
    SESSION
        .get_or_try_init(|| build_session(config))
        .map(|ctx| ctx.clone())
}

fn build_session(config: &Config) -> Result<SessionContext> {
    let ctx = SessionContext::new();

    for bucket in s3_buckets(config) {
        let aws = config.aws.as_ref().ok_or_else(|| {
            EtlError::Config(format!(
                "Location s3://{bucket} requires an [aws] section with credentials"
            ))
        })?;
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket.as_str())
            .with_region(aws.region.as_str())
            .with_access_key_id(aws.access_key_id.as_str())
            .with_secret_access_key(aws.secret_access_key.as_str())
            .build()?;
        let url = Url::parse(&format!("s3://{bucket}"))?;
        ctx.register_object_store(&url, Arc::new(store));
        info!("Registered S3 object store for bucket {}", bucket);
    }

    Ok(ctx)
}

/// Distinct S3 buckets named by the configured locations. Local paths need no
/// registration; the engine serves them with its built-in filesystem store.
fn s3_buckets(config: &Config) -> BTreeSet<String> {
    [
        config.sources.catalog.as_str(),
        config.sources.events.as_str(),
        config.destination.base.as_str(),
    ]
    .into_iter()
    .filter_map(|location| Url::parse(location).ok())
    .filter(|url| url.scheme() == "s3")
    .filter_map(|url| url.host_str().map(str::to_string))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationConfig, EtlConfig, SourcesConfig};

    fn local_config() -> Config {
        Config {
            aws: None,
            sources: SourcesConfig {
                catalog: "/raw".to_string(),
                events: "/raw".to_string(),
                catalog_glob: "song_data/*.json".to_string(),
                events_glob: "log_data/*.json".to_string(),
            },
            destination: DestinationConfig {
                base: "/lake".to_string(),
            },
            etl: EtlConfig::default(),
        }
    }

    #[test]
    fn repeated_calls_reuse_the_same_session() {
        let first = get_or_create(&local_config()).unwrap();
        let second = get_or_create(&local_config()).unwrap();
        assert_eq!(first.session_id(), second.session_id());
    }

    #[test]
    fn local_locations_need_no_bucket_registration() {
        assert!(s3_buckets(&local_config()).is_empty());
    }

    #[test]
    fn s3_locations_collect_distinct_buckets() {
        let mut config = local_config();
        config.sources.catalog = "s3://raw-bucket".to_string();
        config.sources.events = "s3://raw-bucket/".to_string();
        config.destination.base = "s3://lake-bucket/warehouse".to_string();

        let buckets = s3_buckets(&config);
        assert_eq!(
            buckets.into_iter().collect::<Vec<_>>(),
            vec!["lake-bucket".to_string(), "raw-bucket".to_string()]
        );
    }

    #[test]
    fn s3_location_without_credentials_is_a_config_error() {
        let mut config = local_config();
        config.destination.base = "s3://lake-bucket".to_string();
        let err = build_session(&config).err().expect("expected error");
        assert!(matches!(err, EtlError::Config(_)));
    }
}
