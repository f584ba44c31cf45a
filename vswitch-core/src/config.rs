//! Codec configuration
//!
//! Decoding is stateless, but a few behaviors are policy decisions that the
//! caller makes once and passes to every decode call: what to do with IPv4 and
//! TCP headers that announce options, and how many stacked 802.1Q tags the
//! chain decoder follows before giving up.

use std::fmt;

/// What to do with a header whose length field announces options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionsPolicy {
    /// Decode the fixed fields and skip the option bytes
    #[default]
    Ignore,
    /// Fail the decode with `UnsupportedOptions`
    Reject,
}

impl fmt::Display for OptionsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsPolicy::Ignore => write!(f, "ignore"),
            OptionsPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Decode policy shared by all codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Handling of IPv4/TCP options
    pub options: OptionsPolicy,
    /// Maximum number of consecutive VLAN tags followed by the chain decoder
    pub max_vlan_depth: usize,
}

impl CodecConfig {
    /// Default number of stacked VLAN tags (single tag plus one Q-in-Q level)
    pub const DEFAULT_MAX_VLAN_DEPTH: usize = 2;

    /// Default policy: options ignored, two stacked VLAN tags
    pub fn new() -> Self {
        CodecConfig {
            options: OptionsPolicy::Ignore,
            max_vlan_depth: Self::DEFAULT_MAX_VLAN_DEPTH,
        }
    }

    /// Set the options policy
    pub fn with_options_policy(mut self, options: OptionsPolicy) -> Self {
        self.options = options;
        self
    }

    /// Set the VLAN stacking limit
    pub fn with_max_vlan_depth(mut self, depth: usize) -> Self {
        self.max_vlan_depth = depth;
        self
    }

    /// Options make IPv4 and TCP decodes fail
    pub fn rejects_options(&self) -> bool {
        self.options == OptionsPolicy::Reject
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}
