use reqwest::ClientBuilder;

use crate::args::TlsVersion;
use crate::error::ValidationError;

use super::PoolSettings;

pub(super) fn apply_tls_settings(mut builder: ClientBuilder, settings: &PoolSettings) -> ClientBuilder {
    if let Some(min) = settings.tls_min {
        builder = builder.min_tls_version(to_reqwest_tls_version(min));
    }
    if let Some(max) = settings.tls_max {
        builder = builder.max_tls_version(to_reqwest_tls_version(max));
    }
    if !settings.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
}

pub(crate) fn validate_tls_bounds(
    min: Option<TlsVersion>,
    max: Option<TlsVersion>,
) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(ValidationError::TlsMinGreaterThanMax);
    }
    Ok(())
}

const fn to_reqwest_tls_version(version: TlsVersion) -> reqwest::tls::Version {
    match version {
        TlsVersion::V1_0 => reqwest::tls::Version::TLS_1_0,
        TlsVersion::V1_1 => reqwest::tls::Version::TLS_1_1,
        TlsVersion::V1_2 => reqwest::tls::Version::TLS_1_2,
        TlsVersion::V1_3 => reqwest::tls::Version::TLS_1_3,
    }
}
