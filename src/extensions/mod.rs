//! Optional extensions to the base rig.

#[cfg(feature = "extension_anchor_indicator")]
pub mod anchor_indicator;
