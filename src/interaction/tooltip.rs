use std::cell::RefCell;
use std::rc::Rc;

use super::Tooltip;

#[derive(Debug, Default)]
struct Overlay {
    shown: Option<Shown>,
    next_lease: u64,
}

#[derive(Debug)]
struct Shown {
    lease: u64,
    owner: String,
    tooltip: Tooltip,
}

/// The one tooltip overlay of the gallery, shared by every mounted chart.
///
/// Charts never touch the overlay directly: each holds a `TooltipLease`, and
/// only the lease that last showed content may move or hide it.
#[derive(Clone, Debug, Default)]
pub struct TooltipService {
    overlay: Rc<RefCell<Overlay>>,
}

impl TooltipService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, owner: impl Into<String>) -> TooltipLease {
        let mut overlay = self.overlay.borrow_mut();
        overlay.next_lease += 1;
        TooltipLease {
            overlay: Rc::clone(&self.overlay),
            id: overlay.next_lease,
            owner: owner.into(),
        }
    }

    pub fn current(&self) -> Option<Tooltip> {
        self.overlay
            .borrow()
            .shown
            .as_ref()
            .map(|shown| shown.tooltip.clone())
    }

    pub fn owner(&self) -> Option<String> {
        self.overlay
            .borrow()
            .shown
            .as_ref()
            .map(|shown| shown.owner.clone())
    }
}

/// A chart's right to use the shared overlay. Dropping it hides whatever the
/// lease is currently showing.
#[derive(Debug)]
pub struct TooltipLease {
    overlay: Rc<RefCell<Overlay>>,
    id: u64,
    owner: String,
}

impl TooltipLease {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn show(&self, tooltip: Tooltip) {
        self.overlay.borrow_mut().shown = Some(Shown {
            lease: self.id,
            owner: self.owner.clone(),
            tooltip,
        });
    }

    /// Mirrors the chart's tooltip: shows `Some`, hides on `None`.
    pub fn sync(&self, tooltip: Option<&Tooltip>) {
        match tooltip {
            Some(tooltip) => self.show(tooltip.clone()),
            None => self.hide(),
        }
    }

    pub fn hide(&self) {
        let mut overlay = self.overlay.borrow_mut();
        if overlay.shown.as_ref().is_some_and(|shown| shown.lease == self.id) {
            overlay.shown = None;
        }
    }

    pub fn is_showing(&self) -> bool {
        self.overlay
            .borrow()
            .shown
            .as_ref()
            .is_some_and(|shown| shown.lease == self.id)
    }
}

impl Drop for TooltipLease {
    fn drop(&mut self) {
        self.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(text: &str) -> Tooltip {
        Tooltip::at_pointer(0.0, 0.0, text)
    }

    #[test]
    fn dropping_the_showing_lease_hides_the_tooltip() {
        let service = TooltipService::new();
        let lease = service.acquire("treemap");
        lease.show(tip("Asia: 4.7G"));
        assert_eq!(service.owner().as_deref(), Some("treemap"));
        drop(lease);
        assert_eq!(service.current(), None);
    }

    #[test]
    fn older_lease_cannot_hide_newer_content() {
        let service = TooltipService::new();
        let old = service.acquire("sunburst");
        let new = service.acquire("treemap");
        old.show(tip("old"));
        new.show(tip("new"));

        old.hide();
        drop(old);
        assert_eq!(service.current().map(|t| t.text), Some("new".to_owned()));
        assert!(new.is_showing());

        new.sync(None);
        assert_eq!(service.current(), None);
    }
}
