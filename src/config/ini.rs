//! INI loading for [`ShipperConfigBuilder`].
//!
//! ```ini
//! [shipper]
//! url = http://localhost:9200/_bulk
//! connect_timeout_ms = 30000
//! read_timeout_ms = 30000
//! max_queue_size = 104857600
//! flush_interval_ms = 250
//! retention = discard
//!
//! [proxy]
//! host = proxy.internal
//! port = 3128
//! username = shipper
//! password = secret
//!
//! [headers]
//! Content-Type = application/x-ndjson
//!
//! [auth]
//! type = basic
//! username = elastic
//! password = changeme
//! ```
//!
//! Keys in `[headers]` are sent in file order and may repeat.

use std::{fs, path::Path, str::FromStr};

use encoding_rs::Encoding;
use ini::{Ini, Properties};

use super::{BufferRetention, ConfigError, ShipperConfigBuilder};

const DEFAULT_ENCODING: &str = "utf-8";

impl ShipperConfigBuilder {
    /// Parse INI text into a builder.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        parse_ini("<string>", text)
    }

    /// Read and parse an INI file, decoding it with `encoding` (UTF-8 when
    /// `None`).
    pub fn from_ini_file(
        path: impl AsRef<Path>,
        encoding: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} is an empty file",
                path.display()
            )));
        }
        let text = decode_with_encoding(path, &bytes, encoding.unwrap_or(DEFAULT_ENCODING))?;
        parse_ini(&path.display().to_string(), &text)
    }
}

fn decode_with_encoding(path: &Path, bytes: &[u8], label: &str) -> Result<String, ConfigError> {
    let normalized_label = label.trim().to_ascii_lowercase();
    let encoding = Encoding::for_label(normalized_label.as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?;
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConfigError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(decoded.into_owned())
}

fn parse_ini(origin: &str, text: &str) -> Result<ShipperConfigBuilder, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse {
        origin: origin.to_string(),
        message: err.to_string(),
    })?;

    let mut builder = ShipperConfigBuilder::new();
    for (section, props) in ini.iter() {
        builder = match section {
            Some("shipper") => apply_shipper(builder, props)?,
            Some("proxy") => apply_proxy(builder, props)?,
            Some("headers") => props
                .iter()
                .fold(builder, |b, (name, value)| b.with_header(name, value)),
            Some("auth") => apply_auth(builder, props)?,
            None if props.is_empty() => builder,
            None => {
                return Err(ConfigError::Invalid(format!(
                    "{origin}: settings must be placed in a section"
                )));
            }
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "{origin}: unknown section [{other}]"
                )));
            }
        };
    }
    Ok(builder)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!("{key} must be a positive integer, got '{value}'"))
    })
}

fn unknown_key(section: &str, key: &str) -> ConfigError {
    ConfigError::Invalid(format!("unknown key '{key}' in [{section}]"))
}

fn apply_shipper(
    mut builder: ShipperConfigBuilder,
    props: &Properties,
) -> Result<ShipperConfigBuilder, ConfigError> {
    for (key, value) in props.iter() {
        builder = match key {
            "url" => builder.with_url(value.trim()),
            "connect_timeout_ms" => builder.with_connect_timeout_ms(parse_number(key, value)?),
            "read_timeout_ms" => builder.with_read_timeout_ms(parse_number(key, value)?),
            "max_queue_size" => builder.with_max_queue_size(parse_number(key, value)?),
            "flush_interval_ms" => builder.with_flush_interval_ms(parse_number(key, value)?),
            "retention" => builder.with_retention(BufferRetention::from_str(value)?),
            _ => return Err(unknown_key("shipper", key)),
        };
    }
    Ok(builder)
}

fn apply_proxy(
    builder: ShipperConfigBuilder,
    props: &Properties,
) -> Result<ShipperConfigBuilder, ConfigError> {
    if let Some((key, _)) = props
        .iter()
        .find(|(k, _)| !matches!(*k, "host" | "port" | "username" | "password"))
    {
        return Err(unknown_key("proxy", key));
    }

    let host = props.get("host").unwrap_or_default().trim();
    let port = match props.get("port") {
        Some(value) => parse_number("port", value)?,
        None => 0,
    };
    let mut builder = builder.with_proxy(host, port);
    if let Some(username) = props.get("username") {
        let password = props.get("password").unwrap_or_default();
        builder = builder.with_proxy_credentials(username, password);
    }
    Ok(builder)
}

fn apply_auth(
    builder: ShipperConfigBuilder,
    props: &Properties,
) -> Result<ShipperConfigBuilder, ConfigError> {
    let required = |key: &str| {
        props
            .get(key)
            .ok_or_else(|| ConfigError::Invalid(format!("[auth] requires '{key}'")))
    };
    let scheme = required("type")?.trim().to_ascii_lowercase();
    let allowed: &[&str] = match scheme.as_str() {
        "basic" => &["type", "username", "password"],
        "bearer" => &["type", "token"],
        "signed" => &["type", "key_id", "secret"],
        other => {
            return Err(ConfigError::Invalid(format!(
                "invalid auth type '{other}'. Valid options are: basic, bearer, signed"
            )));
        }
    };
    if let Some((key, _)) = props.iter().find(|(k, _)| !allowed.contains(k)) {
        return Err(unknown_key("auth", key));
    }

    Ok(match scheme.as_str() {
        "basic" => builder.with_basic_auth(required("username")?, required("password")?),
        "bearer" => builder.with_bearer_token(required("token")?),
        _ => builder.with_signed_auth(required("key_id")?, required("secret")?),
    })
}
