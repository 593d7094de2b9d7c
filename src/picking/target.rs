//! Pick texel encoding: what the picking pass writes and how a read-back
//! texel resolves to an object.

/// Discriminant stored in the pick texture's second channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    /// Cleared background.
    None = 0,
    /// A stored object; the id channel holds `slot + 1`.
    Object = 1,
    /// The object open in the edit session.
    Active = 2,
}

impl PickKind {
    /// Decode a stored discriminant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Object),
            2 => Some(Self::Active),
            _ => None,
        }
    }

    /// Discriminant as written to the texture.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One texel of the pick target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexelInfo {
    /// Picking id: `slot + 1` for stored objects, 0 otherwise.
    pub id: u32,
    /// Which kind of draw covered the texel.
    pub kind: PickKind,
}

impl TexelInfo {
    /// Background (nothing drawn).
    pub const NONE: Self = Self {
        id: 0,
        kind: PickKind::None,
    };

    /// Sentinel written by the active object.
    pub const ACTIVE: Self = Self {
        id: 0,
        kind: PickKind::Active,
    };

    /// Payload for the stored object in `slot`.
    #[must_use]
    pub fn object(slot: usize) -> Self {
        Self {
            id: pick_id(slot),
            kind: PickKind::Object,
        }
    }

    /// Decode the two little-endian `u32` channels of an `Rg32Uint` texel.
    /// Unknown kinds decode as background.
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        let id = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let kind = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        match u8::try_from(kind).ok().and_then(PickKind::from_u8) {
            Some(kind) => Self { id, kind },
            None => {
                log::warn!("pick texel with unknown kind {kind}");
                Self::NONE
            }
        }
    }

    /// `vec4<u32>` shader payload.
    #[must_use]
    pub fn to_gpu(self) -> [u32; 4] {
        [self.id, u32::from(self.kind.as_u8()), 0, 0]
    }

    /// What a click on this texel refers to.
    #[must_use]
    pub fn target(self) -> PickTarget {
        match self.kind {
            PickKind::Active => PickTarget::Active,
            PickKind::Object => {
                slot_from_pick_id(self.id).map_or(PickTarget::Background, PickTarget::Object)
            }
            PickKind::None => PickTarget::Background,
        }
    }
}

/// Resolved pick result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    /// Empty space.
    Background,
    /// Stored object in the given slot.
    Object(usize),
    /// The object currently open in the edit session.
    Active,
}

/// Picking id of `slot`; 0 is reserved for "no object".
#[must_use]
pub fn pick_id(slot: usize) -> u32 {
    u32::try_from(slot).map_or(u32::MAX, |s| s.saturating_add(1))
}

/// Inverse of [`pick_id`]; `None` for the background id.
#[must_use]
pub fn slot_from_pick_id(id: u32) -> Option<usize> {
    id.checked_sub(1).map(|slot| slot as usize)
}

/// Convert a window-space cursor position (origin top-left) to
/// framebuffer coordinates (origin bottom-left). `None` when the cursor is
/// outside the viewport.
#[must_use]
pub fn window_to_framebuffer(
    x: f64,
    y: f64,
    width: u32,
    height: u32,
) -> Option<(u32, u32)> {
    let (w, h) = (f64::from(width), f64::from(height));
    if !(0.0..w).contains(&x) || !(0.0..h).contains(&y) {
        return None;
    }
    let fx = x.floor() as u32;
    let fy = (h - y).floor() as u32;
    Some((fx.min(width - 1), fy.min(height - 1)))
}
