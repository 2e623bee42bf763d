use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::PanelError;
use crate::layout::{PanelTree, WidgetSlot};
use crate::widget::{WidgetAddress, WidgetId};

/// Sort key tagged onto a positioned widget's element.
///
/// The raw text is always kept; `value` is only present when the text is a
/// finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingKey {
    raw: String,
    value: Option<f64>,
}

impl OrderingKey {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        Self { raw, value }
    }

    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) => Self {
                    raw: n.to_string(),
                    value: Some(v),
                },
                None => Self::parse(n.to_string()),
            },
            serde_json::Value::String(s) => Self::parse(s.clone()),
            other => Self {
                raw: other.to_string(),
                value: None,
            },
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn validate(&self) -> Result<f64, PanelError> {
        self.value
            .ok_or_else(|| PanelError::InvalidOrderingKey(self.raw.clone()))
    }
}

impl From<i64> for OrderingKey {
    fn from(value: i64) -> Self {
        Self {
            raw: value.to_string(),
            value: Some(value as f64),
        }
    }
}

impl From<i32> for OrderingKey {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<&str> for OrderingKey {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Numeric-aware, case-insensitive string collation: digit runs compare by
/// value, so `"2" < "10"` and `"item2" < "item10"`.
pub fn numeric_collate(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ord = compare_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Total order over sort keys. Numeric keys order by value and always rank
/// before malformed ones; malformed keys order by collating their raw text.
pub fn compare_keys(a: &OrderingKey, b: &OrderingKey) -> Ordering {
    match (a.value, b.value) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => numeric_collate(&a.raw, &b.raw),
    }
}

/// Upper-bound binary search over the positioned prefix of `slots`.
///
/// Equal keys land after their existing peers, so arrival order breaks ties.
pub fn insertion_index(slots: &[WidgetSlot], key: &OrderingKey) -> usize {
    let positioned = slots.iter().take_while(|slot| slot.is_positioned()).count();
    let mut first = 0;
    let mut last = positioned;

    while first < last {
        let middle = (first + last) >> 1;
        let sibling = slots[middle]
            .sort_key
            .as_ref()
            .map(|existing| compare_keys(existing, key))
            .unwrap_or(Ordering::Greater);
        if sibling == Ordering::Greater {
            last = middle;
        } else {
            first = middle + 1;
        }
    }
    first
}

/// Result of a single placement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Placed {
        layer: u32,
        section: u32,
        index: usize,
    },
    /// Placed, but the declared position was not numeric.
    InvalidOrderingKey {
        layer: u32,
        section: u32,
        index: usize,
        key: String,
    },
    /// The address does not exist in the active layout; nothing was placed.
    Unresolved { layer: u32, section: u32 },
    /// The widget already has an element in the tree.
    AlreadyPlaced,
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. } | Self::InvalidOrderingKey { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Placed { index, .. } | Self::InvalidOrderingKey { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Insert a widget's element at its resolved address.
pub fn place(
    tree: &mut PanelTree,
    widget: WidgetId,
    name: &str,
    address: &WidgetAddress,
) -> PlacementOutcome {
    if tree.contains(widget) {
        return PlacementOutcome::AlreadyPlaced;
    }

    let WidgetAddress {
        layer,
        section,
        position,
        separator,
    } = address;

    let Some(target) = tree.section_mut(*layer, *section) else {
        return PlacementOutcome::Unresolved {
            layer: *layer,
            section: *section,
        };
    };

    let mut slot = WidgetSlot::new(widget, name);
    if *separator {
        slot.push = Some(target.direction);
    }

    let index = match position {
        Some(key) => {
            let index = insertion_index(&target.slots, key);
            slot.sort_key = Some(key.clone());
            target.slots.insert(index, slot);
            index
        }
        None => {
            target.slots.push(slot);
            target.slots.len() - 1
        }
    };

    match position {
        Some(key) if !key.is_valid() => PlacementOutcome::InvalidOrderingKey {
            layer: *layer,
            section: *section,
            index,
            key: key.raw().to_string(),
        },
        _ => PlacementOutcome::Placed {
            layer: *layer,
            section: *section,
            index,
        },
    }
}
