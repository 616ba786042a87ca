//! Typed query-string parsing.
//!
//! Only the keys the proxy understands are retained; everything else in the
//! query is ignored. Pairs without a key are skipped, keys without `=value`
//! are recorded as flags.

use std::borrow::Cow;

use url::Url;

/// Query parameter carrying the target origin host.
pub const OPHOST_PARAM: &str = "ophost";

/// Query parameter carrying operator-supplied code to inject.
pub const INJECT_PARAM: &str = "x-proxy-inject";

/// Value of a recognised query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Key present without `=value`.
    Flag,
    /// Key present with a (decoded) value, possibly empty.
    Text(String),
}

impl ParamValue {
    /// Text value, if any and non-empty.
    pub fn text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// The recognised parameters of one query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyQuery {
    pub ophost: Option<ParamValue>,
    pub inject: Option<ParamValue>,
}

impl ProxyQuery {
    /// Parse a raw query string (leading `?` optional).
    ///
    /// Later occurrences of a key replace earlier ones.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&') {
            let (key, raw) = match pair.split_once('=') {
                Some((key, raw)) => (key, Some(raw)),
                None => (pair, None),
            };
            if key.is_empty() {
                continue;
            }

            let slot = match key {
                OPHOST_PARAM => &mut parsed.ophost,
                INJECT_PARAM => &mut parsed.inject,
                _ => continue,
            };

            let value = match raw {
                None => Some(ParamValue::Flag),
                Some(raw) if key == INJECT_PARAM => decode_form_component(raw).map(ParamValue::Text),
                Some(raw) => decode_component(raw).map(ParamValue::Text),
            };
            // Undecodable values drop the pair, never the whole query.
            if let Some(value) = value {
                *slot = Some(value);
            }
        }

        parsed
    }

    /// Parse the query of a full URL such as a `Referer` header value.
    pub fn from_url(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => Self::parse(url.query().unwrap_or_default()),
            Err(_) => Self::default(),
        }
    }

    /// Non-empty `ophost` value.
    pub fn ophost(&self) -> Option<&str> {
        self.ophost.as_ref().and_then(ParamValue::text)
    }

    /// Non-empty injection code.
    pub fn inject_code(&self) -> Option<&str> {
        self.inject.as_ref().and_then(ParamValue::text)
    }
}

/// Percent-decode one component. `None` when the result is not UTF-8.
pub fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(Cow::into_owned)
}

/// Decode a form-style component: `+` is a space, then percent escapes.
pub fn decode_form_component(raw: &str) -> Option<String> {
    decode_component(&raw.replace('+', " "))
}
