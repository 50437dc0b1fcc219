//! One-way reveal of tagged elements as they scroll into view.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RevealConfig;
use crate::host::{Host, IntersectionEntry};
use crate::markup::Selector;

/// Watches every revealable element found at setup. An element that
/// intersects gets the revealed class and keeps it; non-intersecting
/// observations are ignored. Revealed elements stay observed.
pub struct RevealObserver<H: Host> {
    targets: Vec<H::Node>,
    revealed: Rc<RefCell<Vec<H::Node>>>,
}

impl<H: Host> std::fmt::Debug for RevealObserver<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealObserver")
            .field("targets", &self.targets.len())
            .field("revealed", &self.revealed.borrow().len())
            .finish()
    }
}

impl<H: Host> RevealObserver<H> {
    /// Register the observer. With no targets nothing is registered.
    pub fn attach(host: &Rc<H>, config: &RevealConfig) -> Self {
        let targets = host.query_all(&Selector::class(&config.target_class));
        let revealed: Rc<RefCell<Vec<H::Node>>> = Rc::new(RefCell::new(Vec::new()));

        if !targets.is_empty() {
            let sink = Rc::clone(&revealed);
            let class = config.revealed_class.clone();
            let target_host = Rc::clone(host);
            host.observe_intersections(
                &targets,
                config.threshold,
                Box::new(move |entries: &[IntersectionEntry<H::Node>]| {
                    for entry in entries.iter().filter(|e| e.is_intersecting) {
                        target_host.add_class(&entry.target, &class);
                        let mut seen = sink.borrow_mut();
                        if !seen.contains(&entry.target) {
                            crate::trace!(node = ?entry.target, "revealed");
                            seen.push(entry.target.clone());
                        }
                    }
                }),
            );
        }
        crate::debug!(targets = targets.len(), "reveal observer attached");

        Self { targets, revealed }
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Distinct elements revealed so far.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.borrow().len()
    }
}
