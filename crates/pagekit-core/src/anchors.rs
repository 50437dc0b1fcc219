//! Smooth scrolling for in-page anchor links.

use std::rc::Rc;

use crate::host::{EventKind, Host};
use crate::markup::Selector;

/// Id targeted by an in-page `href`, or `None` for the bare `#` and for
/// hrefs that are not fragments.
#[must_use]
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Wires every `a[href^="#"]` present at setup.
#[derive(Debug, Clone, Copy)]
pub struct AnchorNavigator {
    links: usize,
}

impl AnchorNavigator {
    pub fn attach<H: Host>(host: &Rc<H>) -> Self {
        let links = host.query_all(&Selector::attr_prefix("a", "href", "#"));
        for link in &links {
            let listener_host = Rc::clone(host);
            let anchor = link.clone();
            host.listen(
                link,
                EventKind::Click,
                Box::new(move |event| {
                    event.prevent_default();
                    let Some(href) = listener_host.attribute(&anchor, "href") else {
                        return;
                    };
                    let Some(id) = fragment_target(&href) else {
                        return;
                    };
                    if let Some(target) = listener_host.element_by_id(id) {
                        listener_host.scroll_into_view(&target);
                    }
                }),
            );
        }
        crate::debug!(links = links.len(), "anchor navigator attached");
        Self { links: links.len() }
    }

    /// Number of links wired.
    #[must_use]
    pub const fn link_count(&self) -> usize {
        self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::markup::Markup;

    #[test]
    fn fragment_parsing() {
        assert_eq!(fragment_target("#pricing"), Some("pricing"));
        assert_eq!(fragment_target("#"), None);
        assert_eq!(fragment_target("/about.html"), None);
        assert_eq!(fragment_target(""), None);
    }

    fn page() -> Rc<MemoryHost> {
        Rc::new(MemoryHost::with_body([
            Markup::element("a").id("to-pricing").attr("href", "#pricing"),
            Markup::element("a").id("to-top").attr("href", "#"),
            Markup::element("a").id("external").attr("href", "about.html"),
            Markup::element("section").id("pricing"),
        ]))
    }

    #[test]
    fn only_fragment_links_are_wired() {
        let host = page();
        let nav = AnchorNavigator::attach(&host);
        assert_eq!(nav.link_count(), 2);
        let external = host.element_by_id("external").unwrap();
        assert!(!host.click(&external));
    }

    #[test]
    fn click_scrolls_target_into_view() {
        let host = page();
        AnchorNavigator::attach(&host);
        let link = host.element_by_id("to-pricing").unwrap();
        let target = host.element_by_id("pricing").unwrap();
        assert!(host.click(&link));
        assert_eq!(host.scrolled_into_view(), vec![target]);
    }

    #[test]
    fn bare_hash_prevents_default_only() {
        let host = page();
        AnchorNavigator::attach(&host);
        let link = host.element_by_id("to-top").unwrap();
        assert!(host.click(&link));
        assert!(host.scrolled_into_view().is_empty());
    }
}
