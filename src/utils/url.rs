//! URL helpers for redirects and upstream links

use url::{form_urlencoded, Url};

/// Whether `target` is a safe redirect destination for a request served at
/// `base`: it must resolve to http(s) on the same host and port.
pub fn is_safe_url(base: &Url, target: &str) -> bool {
    let Ok(resolved) = base.join(target) else {
        return false;
    };

    matches!(resolved.scheme(), "http" | "https")
        && resolved.host_str() == base.host_str()
        && resolved.port_or_known_default() == base.port_or_known_default()
}

/// Path of a hackathon page with the name percent-encoded as one segment
pub fn hackathon_path(name: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return format!("/hackathon/{}", name);
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push("hackathon").push(name);
    }
    url.path().to_string()
}

/// Login route that returns to `next` afterwards
pub fn login_path(next: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/login?{}", query)
}

/// Add query parameters to `base`, replacing any existing ones of the same name
pub fn with_params(base: &str, params: &[(&str, &str)]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(kept);
        query.extend_pairs(params);
    }
    Ok(url)
}
