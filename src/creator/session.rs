use serde::{Deserialize, Serialize};
use std::fmt;

use super::merge::merge;
use super::normalize::clean;

/// Which of the two source images a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a creator value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorSource {
    Iptc,
    ExifArtist,
    ExifCopyright,
    /// Nothing found; the value is empty.
    None,
}

/// The creator credit extracted from one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorMetadata {
    pub side: Side,
    pub raw_value: String,
    pub cleaned_value: String,
    pub source: CreatorSource,
}

impl CreatorMetadata {
    /// IPTC values are only trimmed.
    pub fn from_iptc(side: Side, raw: String) -> Self {
        let cleaned_value = raw.trim().to_string();
        Self {
            side,
            raw_value: raw,
            cleaned_value,
            source: CreatorSource::Iptc,
        }
    }

    /// EXIF values go through [`clean`].
    pub fn from_exif(side: Side, raw: String, source: CreatorSource) -> Self {
        let cleaned_value = clean(&raw);
        Self {
            side,
            raw_value: raw,
            cleaned_value,
            source,
        }
    }

    pub fn empty(side: Side) -> Self {
        Self {
            side,
            raw_value: String::new(),
            cleaned_value: String::new(),
            source: CreatorSource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cleaned_value.is_empty()
    }
}

/// Whether automatic merges may overwrite a caption the user typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPolicy {
    /// A manual caption stays until [`Session::clear_override`].
    #[default]
    KeepManual,
    /// Every completed extraction rewrites the caption.
    AlwaysMerge,
}

/// Handle for one extraction run, issued by [`Session::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// Outcome of [`Session::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(Side),
    /// A newer load for the same slot was started; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<LoadTicket>,
    metadata: Option<CreatorMetadata>,
}

/// Per-session creator state for the left and right images.
///
/// Extraction results arrive in any order through [`Session::complete`]; the
/// caption is recomputed from both current values after each change, so it
/// never depends on arrival order.
#[derive(Debug, Default)]
pub struct Session {
    left: Slot,
    right: Slot,
    next_ticket: u64,
    policy: CaptionPolicy,
    caption: String,
    manual: bool,
}

impl Session {
    pub fn new(policy: CaptionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// A new file was accepted for `side`: forget its previous metadata and
    /// supersede any extraction still running for it.
    pub fn begin_load(&mut self, side: Side) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        let slot = self.slot_mut(side);
        slot.pending = Some(ticket);
        slot.metadata = None;
        self.refresh();
        ticket
    }

    /// Deliver an extraction result.
    ///
    /// The result lands in whichever slot currently owns `ticket`, which
    /// after a [`swap`](Self::swap) is the opposite side from where the load
    /// started.
    pub fn complete(&mut self, ticket: LoadTicket, metadata: CreatorMetadata) -> Completion {
        let Some(side) = Side::BOTH
            .into_iter()
            .find(|side| self.slot(*side).pending == Some(ticket))
        else {
            log::debug!("Dropping superseded extraction result {:?}", metadata.raw_value);
            return Completion::Stale;
        };

        let slot = self.slot_mut(side);
        slot.pending = None;
        slot.metadata = Some(CreatorMetadata { side, ..metadata });
        self.refresh();
        Completion::Applied(side)
    }

    /// Exchange the left and right images, including in-flight loads.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
        for side in Side::BOTH {
            if let Some(metadata) = self.slot_mut(side).metadata.as_mut() {
                metadata.side = side;
            }
        }
        self.refresh();
    }

    pub fn creator(&self, side: Side) -> Option<&CreatorMetadata> {
        self.slot(side).metadata.as_ref()
    }

    pub fn is_pending(&self, side: Side) -> bool {
        self.slot(side).pending.is_some()
    }

    /// The automatic caption for the current state, ignoring any override.
    pub fn merged(&self) -> String {
        let value = |side| {
            self.creator(side)
                .map(|m| m.cleaned_value.as_str())
                .unwrap_or("")
        };
        merge(value(Side::Left), value(Side::Right))
    }

    /// The caption that will be embedded on export.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Record a caption typed by the user.
    pub fn set_caption(&mut self, text: impl Into<String>) {
        self.caption = text.into();
        self.manual = true;
    }

    pub fn is_overridden(&self) -> bool {
        self.manual
    }

    /// Drop the manual caption and return to the automatic merge.
    pub fn clear_override(&mut self) {
        self.manual = false;
        self.refresh();
    }

    fn refresh(&mut self) {
        if self.manual {
            match self.policy {
                CaptionPolicy::KeepManual => return,
                CaptionPolicy::AlwaysMerge => self.manual = false,
            }
        }
        self.caption = self.merged();
        log::debug!("Caption: {:?}", self.caption);
    }
}
