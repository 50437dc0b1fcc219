//! Header style toggle driven by the window scroll offset.

use std::rc::Rc;

use crate::config::ChromeConfig;
use crate::host::Host;
use crate::markup::Selector;

/// Whether `offset` counts as scrolled. Strictly greater than `threshold`.
#[must_use]
pub fn is_scrolled(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

/// Applies the scrolled class to the header on every scroll event,
/// recomputed from the current offset alone.
pub struct ScrollChrome<H: Host> {
    header: H::Node,
}

impl<H: Host> std::fmt::Debug for ScrollChrome<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollChrome")
            .field("header", &self.header)
            .finish()
    }
}

impl<H: Host> ScrollChrome<H> {
    /// Register the scroll listener. Returns `None` (and registers nothing)
    /// when the page has no header.
    pub fn attach(host: &Rc<H>, config: &ChromeConfig) -> Option<Self> {
        let header = host.query(None, &Selector::class(&config.header_class))?;

        let target = header.clone();
        let class = config.scrolled_class.clone();
        let threshold = config.threshold;
        let listener_host = Rc::clone(host);
        host.on_scroll(Box::new(move |offset| {
            if is_scrolled(offset, threshold) {
                listener_host.add_class(&target, &class);
            } else {
                listener_host.remove_class(&target, &class);
            }
        }));
        crate::debug!("scroll chrome attached");

        Some(Self { header })
    }

    #[must_use]
    pub fn header(&self) -> &H::Node {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::markup::Markup;

    #[test]
    fn threshold_is_exclusive() {
        assert!(!is_scrolled(20.0, 20.0));
        assert!(is_scrolled(21.0, 20.0));
        assert!(is_scrolled(20.5, 20.0));
        assert!(!is_scrolled(0.0, 20.0));
    }

    #[test]
    fn toggles_class_both_ways() {
        let host = Rc::new(MemoryHost::with_body([Markup::element("header").class("header")]));
        let chrome = ScrollChrome::attach(&host, &ChromeConfig::default()).unwrap();
        let header = chrome.header().clone();

        host.scroll_to(21.0);
        assert!(host.has_class(&header, "scrolled"));
        host.scroll_to(20.0);
        assert!(!host.has_class(&header, "scrolled"));
        host.scroll_to(500.0);
        host.scroll_to(3.0);
        assert!(!host.has_class(&header, "scrolled"));
    }

    #[test]
    fn no_header_no_listener() {
        let host = Rc::new(MemoryHost::new());
        assert!(ScrollChrome::attach(&host, &ChromeConfig::default()).is_none());
        assert_eq!(host.scroll_listener_count(), 0);
    }
}
