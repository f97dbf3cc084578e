//! Parsing of `ListObjectsV2` response bodies.

use std::sync::LazyLock;

use regex::Regex;

static KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<Contents>.*?<Key>(.*?)</Key>.*?</Contents>").expect("valid regex")
});
static TRUNCATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<IsTruncated>\s*true\s*</IsTruncated>").expect("valid regex"));
static NEXT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<NextContinuationToken>(.*?)</NextContinuationToken>").expect("valid regex")
});

/// One page of a bucket listing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Object keys on this page.
    pub keys: Vec<String>,
    /// Token for the next page, when the listing is truncated.
    pub next_token: Option<String>,
}

/// Parse a `ListBucketResult` document.
///
/// # Errors
///
/// Returns an error if the body is not a listing result, or claims to be
/// truncated without a continuation token.
pub fn parse_list_page(body: &str) -> Result<ListPage, String> {
    if !body.contains("<ListBucketResult") {
        return Err("response is not a ListBucketResult document".into());
    }

    let keys = KEY.captures_iter(body).map(|c| unescape(&c[1])).collect();

    let next_token = if TRUNCATED.is_match(body) {
        let token = NEXT_TOKEN
            .captures(body)
            .map(|c| unescape(&c[1]))
            .ok_or("truncated listing without NextContinuationToken")?;
        Some(token)
    } else {
        None
    };

    Ok(ListPage { keys, next_token })
}

/// Resolve the five predefined XML entities and numeric character references.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        match decoded {
            Some(ch) => out.push(ch),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>placechicken-test</Name>
  <KeyCount>2</KeyCount>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=</NextContinuationToken>
  <Contents>
    <Key>original-test-image.jpg</Key>
    <Size>2048</Size>
  </Contents>
  <Contents>
    <Key>chickens/original &amp; friends.jpg</Key>
    <Size>4096</Size>
  </Contents>
</ListBucketResult>"#;

    #[test]
    fn parses_keys_and_token() {
        let page = parse_list_page(PAGE).unwrap();
        assert_eq!(page.keys, vec!["original-test-image.jpg", "chickens/original & friends.jpg"]);
        assert_eq!(
            page.next_token.as_deref(),
            Some("1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=")
        );
    }

    #[test]
    fn last_page_has_no_token() {
        let body = "<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>";
        assert_eq!(parse_list_page(body).unwrap(), ListPage::default());
    }

    #[test]
    fn error_document_is_rejected() {
        let body = "<Error><Code>AccessDenied</Code></Error>";
        assert!(parse_list_page(body).is_err());
    }

    #[test]
    fn truncated_without_token_is_rejected() {
        let body = "<ListBucketResult><IsTruncated>true</IsTruncated></ListBucketResult>";
        assert!(parse_list_page(body).is_err());
    }

    #[test]
    fn unescape_entities() {
        assert_eq!(unescape("a&lt;b&gt;&quot;c&apos;&amp;"), "a<b>\"c'&");
        assert_eq!(unescape("&#65;&#x42;"), "AB");
        assert_eq!(unescape("keep &bogus; and &"), "keep &bogus; and &");
    }
}
