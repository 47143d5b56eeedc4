//! Hover, tooltip, brush and selection state for a single chart.
//!
//! The state machine knows nothing about layouts: charts translate pointer
//! input into `InteractionEvent`s and react to the returned outcome.

mod tooltip;

use std::hash::Hash;

use indexmap::IndexSet;

pub use tooltip::{TooltipLease, TooltipService};

/// Offset of the tooltip box from the pointer, in screen units.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, -10.0);

/// Opacity of elements outside the hovered neighbourhood.
pub const DIMMED_OPACITY: f32 = 0.3;
/// Opacity of links not incident to the hovered node.
pub const DIMMED_LINK_OPACITY: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl Tooltip {
    /// Tooltip anchored next to the pointer at `(x, y)`.
    pub fn at_pointer(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x: x + TOOLTIP_OFFSET.0,
            y: y + TOOLTIP_OFFSET.1,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent<K> {
    PointerEnter { id: K, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    /// Brush released; `None` when the brush was cleared.
    BrushEnd(Option<[f64; 2]>),
    Click(K),
    ToggleSelection(K),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionOutcome<K> {
    Unchanged,
    HoverChanged,
    TooltipMoved,
    BrushChanged([f64; 2]),
    Clicked(K),
    SelectionChanged,
}

#[derive(Clone, Debug)]
pub struct InteractionState<K> {
    hovered: Option<K>,
    tooltip: Option<Tooltip>,
    brush_range: Option<[f64; 2]>,
    selected: IndexSet<K>,
}

impl<K> Default for InteractionState<K> {
    fn default() -> Self {
        Self {
            hovered: None,
            tooltip: None,
            brush_range: None,
            selected: IndexSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> InteractionState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&K> {
        self.hovered.as_ref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn brush_range(&self) -> Option<[f64; 2]> {
        self.brush_range
    }

    pub fn selected(&self) -> &IndexSet<K> {
        &self.selected
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    /// Replaces the selection wholesale (chart defaults and resets).
    pub fn set_selected<I: IntoIterator<Item = K>>(&mut self, ids: I) {
        self.selected = ids.into_iter().collect();
    }

    pub fn set_brush_range(&mut self, range: Option<[f64; 2]>) {
        self.brush_range = range;
    }

    /// Applies `event`. `describe` renders tooltip text for a newly hovered id.
    pub fn handle<F>(&mut self, event: InteractionEvent<K>, describe: F) -> InteractionOutcome<K>
    where
        F: FnOnce(&K) -> String,
    {
        match event {
            InteractionEvent::PointerEnter { id, x, y } => {
                let changed = self.hovered.as_ref() != Some(&id);
                let text = match (&self.tooltip, changed) {
                    (Some(tooltip), false) => tooltip.text.clone(),
                    _ => describe(&id),
                };
                self.tooltip = Some(Tooltip::at_pointer(x, y, text));
                self.hovered = Some(id);
                if changed {
                    InteractionOutcome::HoverChanged
                } else {
                    InteractionOutcome::TooltipMoved
                }
            }
            InteractionEvent::PointerMove { x, y } => match self.tooltip.as_mut() {
                Some(tooltip) => {
                    tooltip.x = x + TOOLTIP_OFFSET.0;
                    tooltip.y = y + TOOLTIP_OFFSET.1;
                    InteractionOutcome::TooltipMoved
                }
                None => InteractionOutcome::Unchanged,
            },
            InteractionEvent::PointerLeave => {
                if self.hovered.is_none() && self.tooltip.is_none() {
                    return InteractionOutcome::Unchanged;
                }
                self.hovered = None;
                self.tooltip = None;
                InteractionOutcome::HoverChanged
            }
            InteractionEvent::BrushEnd(range) => {
                let Some([a, b]) = range else {
                    return InteractionOutcome::Unchanged;
                };
                if a == b || !a.is_finite() || !b.is_finite() {
                    return InteractionOutcome::Unchanged;
                }
                let range = [a.min(b), a.max(b)];
                self.brush_range = Some(range);
                InteractionOutcome::BrushChanged(range)
            }
            InteractionEvent::Click(id) => InteractionOutcome::Clicked(id),
            InteractionEvent::ToggleSelection(id) => {
                if !self.selected.shift_remove(&id) {
                    self.selected.insert(id);
                }
                InteractionOutcome::SelectionChanged
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
