//! Fetch requests and responses.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Character encoding a call site declares for the body it expects.
///
/// Bodies are always decoded with the declared encoding, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEncoding {
    Utf8,
    /// Legacy CJK multi-byte encoding used by rendered pages.
    Gb18030,
}

impl PageEncoding {
    fn encoding(self) -> &'static Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gb18030 => encoding_rs::GB18030,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.encoding().name()
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub referer: Option<&'a str>,
    pub encoding: PageEncoding,
    /// Send `X-Requested-With: XMLHttpRequest`.
    pub xhr: bool,
}

impl<'a> FetchRequest<'a> {
    /// A rendered page in the legacy encoding.
    pub fn page(url: &'a str) -> Self {
        Self {
            url,
            referer: None,
            encoding: PageEncoding::Gb18030,
            xhr: false,
        }
    }

    /// An AJAX endpoint answering UTF-8 JSON.
    pub fn ajax(url: &'a str) -> Self {
        Self {
            url,
            referer: None,
            encoding: PageEncoding::Utf8,
            xhr: true,
        }
    }

    pub fn with_referer(mut self, referer: &'a str) -> Self {
        self.referer = Some(referer);
        self
    }
}

/// Raw body of a successful response plus its declared encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub bytes: Vec<u8>,
    pub encoding: PageEncoding,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, bytes: Vec<u8>, encoding: PageEncoding) -> Self {
        Self {
            url: url.into(),
            status: 200,
            bytes,
            encoding,
        }
    }

    /// Decode the body with the declared encoding.
    ///
    /// Malformed sequences become U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        let (text, had_errors) = self
            .encoding
            .encoding()
            .decode_without_bom_handling(&self.bytes);
        if had_errors {
            tracing::debug!(
                "Body of {} had invalid {} sequences",
                self.url,
                self.encoding.as_str()
            );
        }
        text
    }
}

/// Image bytes returned by an undelayed pass-through fetch.
#[derive(Debug, Clone)]
pub struct PassthroughResponse {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gb18030() {
        let (bytes, _, _) = encoding_rs::GB18030.encode("文章类型：原创");
        let page = FetchedPage::new("u", bytes.into_owned(), PageEncoding::Gb18030);
        assert_eq!(page.text(), "文章类型：原创");
    }

    #[test]
    fn test_declared_encoding_wins() {
        // UTF-8 bytes read as GB18030 must not be auto-corrected.
        let page = FetchedPage::new("u", "天涯客".as_bytes().to_vec(), PageEncoding::Gb18030);
        assert_ne!(page.text(), "天涯客");

        let page = FetchedPage::new("u", "天涯客".as_bytes().to_vec(), PageEncoding::Utf8);
        assert_eq!(page.text(), "天涯客");
    }

    #[test]
    fn test_request_builders() {
        let req = FetchRequest::ajax("http://x/search").with_referer("http://x/search.php");
        assert!(req.xhr);
        assert_eq!(req.encoding, PageEncoding::Utf8);
        assert_eq!(req.referer, Some("http://x/search.php"));

        let req = FetchRequest::page("http://x/onebook.php?novelid=1");
        assert!(!req.xhr);
        assert_eq!(req.encoding, PageEncoding::Gb18030);
        assert_eq!(req.referer, None);
    }
}
