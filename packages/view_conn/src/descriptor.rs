//! Endpoint identity for view streams.
//!
//! A descriptor names where a stream comes from: the server base, the
//! route (bounded view or live tail), and which source file. The source
//! picker can legitimately have nothing picked, so the selector carries
//! an explicit sentinel instead of an empty string.

use std::fmt::{self, Write};

/// Raw selector value meaning no source has been chosen.
pub const NOT_SELECTED: &str = "not_selected";

/// Which source a stream should read, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    Source(String),
    NotSelected,
}

impl SourceSelector {
    /// Parse a raw selector string, mapping the sentinel to `NotSelected`.
    pub fn parse(raw: &str) -> Self {
        if raw == NOT_SELECTED {
            Self::NotSelected
        } else {
            Self::Source(raw.to_string())
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(id) => f.write_str(id),
            Self::NotSelected => f.write_str(NOT_SELECTED),
        }
    }
}

/// Where in the source a bounded view starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPos {
    Head,
    Center,
    Tail,
}

impl StartPos {
    pub fn as_str(self) -> &'static str {
        match self {
            StartPos::Head => "head",
            StartPos::Center => "center",
            StartPos::Tail => "tail",
        }
    }
}

/// The two stream endpoints the server exposes per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRoute {
    /// Bounded read of a region, optionally positioned and filtered.
    View {
        start_pos: Option<StartPos>,
        filter_text: Option<String>,
    },
    /// Follow-the-end live tail.
    Tail,
}

/// Identity of one stream endpoint: base URI, route, and source selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    base: String,
    route: StreamRoute,
    selector: SourceSelector,
}

impl EndpointDescriptor {
    /// `base` is `{scheme}://{host}[:port]`; trailing slashes are dropped.
    pub fn new(base: impl Into<String>, route: StreamRoute, selector: SourceSelector) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            base,
            route,
            selector,
        }
    }

    pub fn selector(&self) -> &SourceSelector {
        &self.selector
    }

    /// Same base and route, pointed at a different source.
    pub fn with_selector(&self, selector: SourceSelector) -> Self {
        Self {
            selector,
            ..self.clone()
        }
    }

    /// Full connection URL, or `None` when no source is selected.
    pub fn url(&self) -> Option<String> {
        let SourceSelector::Source(id) = &self.selector else {
            return None;
        };
        let url = match &self.route {
            StreamRoute::Tail => format!("{}/ws/tail/{}", self.base, id),
            StreamRoute::View {
                start_pos,
                filter_text,
            } => {
                let mut url = format!("{}/ws/view/{}", self.base, id);
                let mut sep = '?';
                if let Some(pos) = start_pos {
                    url.push(sep);
                    url.push_str("start_pos=");
                    url.push_str(pos.as_str());
                    sep = '&';
                }
                if let Some(filter) = filter_text {
                    url.push(sep);
                    url.push_str("filter_text=");
                    url.push_str(&encode_query(filter));
                }
                url
            }
        };
        Some(url)
    }
}

/// Percent-encode a query value so arbitrary filter text survives URL
/// parsing on the transport side.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> &'static str {
        "ws://127.0.0.1:8000"
    }

    #[test]
    fn tail_url() {
        let ep = EndpointDescriptor::new(base(), StreamRoute::Tail, SourceSelector::parse("app.log"));
        assert_eq!(ep.url().as_deref(), Some("ws://127.0.0.1:8000/ws/tail/app.log"));
    }

    #[test]
    fn view_url_without_params() {
        let route = StreamRoute::View {
            start_pos: None,
            filter_text: None,
        };
        let ep = EndpointDescriptor::new(base(), route, SourceSelector::parse("app.log"));
        assert_eq!(ep.url().as_deref(), Some("ws://127.0.0.1:8000/ws/view/app.log"));
    }

    #[test]
    fn view_url_with_start_pos() {
        let route = StreamRoute::View {
            start_pos: Some(StartPos::Tail),
            filter_text: None,
        };
        let ep = EndpointDescriptor::new(base(), route, SourceSelector::parse("app.log"));
        assert_eq!(
            ep.url().as_deref(),
            Some("ws://127.0.0.1:8000/ws/view/app.log?start_pos=tail")
        );
    }

    #[test]
    fn view_url_with_both_params() {
        let route = StreamRoute::View {
            start_pos: Some(StartPos::Head),
            filter_text: Some("ERROR".to_string()),
        };
        let ep = EndpointDescriptor::new(base(), route, SourceSelector::parse("app.log"));
        assert_eq!(
            ep.url().as_deref(),
            Some("ws://127.0.0.1:8000/ws/view/app.log?start_pos=head&filter_text=ERROR")
        );
    }

    #[test]
    fn filter_only_uses_question_mark() {
        let route = StreamRoute::View {
            start_pos: None,
            filter_text: Some("warn".to_string()),
        };
        let ep = EndpointDescriptor::new(base(), route, SourceSelector::parse("app.log"));
        assert_eq!(
            ep.url().as_deref(),
            Some("ws://127.0.0.1:8000/ws/view/app.log?filter_text=warn")
        );
    }

    #[test]
    fn filter_text_is_percent_encoded() {
        let route = StreamRoute::View {
            start_pos: None,
            filter_text: Some("ERROR 42%&x=1".to_string()),
        };
        let ep = EndpointDescriptor::new(base(), route, SourceSelector::parse("app.log"));
        assert_eq!(
            ep.url().as_deref(),
            Some("ws://127.0.0.1:8000/ws/view/app.log?filter_text=ERROR%2042%25%26x%3D1")
        );
    }

    #[test]
    fn sentinel_has_no_url() {
        let ep = EndpointDescriptor::new(base(), StreamRoute::Tail, SourceSelector::parse(NOT_SELECTED));
        assert!(ep.url().is_none());
        assert!(!ep.selector().is_selected());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let ep = EndpointDescriptor::new(
            "ws://127.0.0.1:8000/",
            StreamRoute::Tail,
            SourceSelector::parse("app.log"),
        );
        assert_eq!(ep.url().as_deref(), Some("ws://127.0.0.1:8000/ws/tail/app.log"));
    }

    #[test]
    fn with_selector_switches_source() {
        let ep = EndpointDescriptor::new(base(), StreamRoute::Tail, SourceSelector::parse("a.log"));
        let other = ep.with_selector(SourceSelector::parse("b.log"));
        assert_eq!(other.url().as_deref(), Some("ws://127.0.0.1:8000/ws/tail/b.log"));
        let idle = ep.with_selector(SourceSelector::NotSelected);
        assert!(idle.url().is_none());
    }
}
