//! Outgoing request as seen by authentication strategies.

use ureq::Agent;

/// Method, URL and ordered headers of the request about to be sent.
///
/// Header names compare case-insensitively. Duplicate names are kept in the
/// order they were added. On the wire every `X-` pair is its own field line;
/// other names can only appear once per ureq request, so their repeated
/// values are folded into one comma-separated field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingRequest {
    method: &'static str,
    url: String,
    headers: Vec<(String, String)>,
}

impl OutgoingRequest {
    /// A bulk write to `url`.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: "POST",
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path and query of the URL, `/` if it has none.
    pub fn path(&self) -> &str {
        let after_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let path = after_scheme
            .find('/')
            .map_or("/", |idx| &after_scheme[idx..]);
        path.split('#').next().unwrap_or(path)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Append a header, keeping any existing values for the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Replace every value of `name` with `value`.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// First value of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of `name` in insertion order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Header fields as written on the wire, in insertion order.
    ///
    /// Each `X-` pair is emitted as is. Any other name is emitted once, at
    /// its first position, with later values joined by `, `.
    pub(crate) fn wire_headers(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            if repeats_on_wire(name) {
                fields.push((name.clone(), value.clone()));
                continue;
            }
            match fields.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some((_, existing)) => {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
                None => fields.push((name.clone(), value.clone())),
            }
        }
        fields
    }

    pub(crate) fn to_ureq(&self, agent: &Agent) -> ureq::Request {
        self.wire_headers()
            .into_iter()
            .fold(agent.request(self.method, &self.url), |req, (name, value)| {
                req.set(&name, &value)
            })
    }
}

/// ureq appends `X-` headers and replaces every other name on `set`.
fn repeats_on_wire(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("x-"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://localhost:9200/_bulk", "/_bulk")]
    #[case("https://logs.example.com/ingest/v1?pipeline=x", "/ingest/v1?pipeline=x")]
    #[case("http://localhost:9200", "/")]
    #[case("http://localhost:9200/_bulk#frag", "/_bulk")]
    fn path_is_extracted_from_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(OutgoingRequest::post(url).path(), expected);
    }

    #[test]
    fn headers_keep_order_and_duplicates() {
        let mut req = OutgoingRequest::post("http://localhost/");
        req.add_header("Content-Type", "application/x-ndjson");
        req.add_header("X-Tag", "a");
        req.add_header("x-tag", "b");

        assert_eq!(
            req.headers(),
            &[
                ("Content-Type".to_string(), "application/x-ndjson".to_string()),
                ("X-Tag".to_string(), "a".to_string()),
                ("x-tag".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(req.header_values("X-TAG"), vec!["a", "b"]);
    }

    #[test]
    fn wire_headers_keep_extension_pairs_and_fold_the_rest() {
        let mut req = OutgoingRequest::post("http://localhost/");
        req.add_header("Accept", "text/plain");
        req.add_header("X-Tag", "a,b");
        req.add_header("accept", "application/json");
        req.add_header("x-tag", "c");

        assert_eq!(
            req.wire_headers(),
            vec![
                ("Accept".to_string(), "text/plain, application/json".to_string()),
                ("X-Tag".to_string(), "a,b".to_string()),
                ("x-tag".to_string(), "c".to_string()),
            ]
        );
    }

    #[rstest]
    #[case("X-Tag", true)]
    #[case("x-request-id", true)]
    #[case("Accept", false)]
    #[case("X", false)]
    fn only_extension_headers_repeat(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(repeats_on_wire(name), expected);
    }

    #[test]
    fn set_header_replaces_all_values() {
        let mut req = OutgoingRequest::post("http://localhost/");
        req.add_header("Authorization", "one");
        req.add_header("authorization", "two");
        req.set_header("Authorization", "three");
        assert_eq!(req.header_values("Authorization"), vec!["three"]);
    }
}
