//! Static request headers.

/// A single header name/value pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered header list. Duplicate names are kept and all of them are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpRequestHeaders {
    headers: Vec<HttpHeader>,
}

impl HttpRequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: HttpHeader) {
        self.headers.push(header);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HttpHeader> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl FromIterator<HttpHeader> for HttpRequestHeaders {
    fn from_iter<I: IntoIterator<Item = HttpHeader>>(iter: I) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HttpRequestHeaders {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}
