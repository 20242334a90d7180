//! Channel name helpers.
//!
//! The default channel-type prefixes are `#` and `&`, matching the
//! `CHANTYPES` default a [`crate::isupport::ParameterStore`] starts with
//! before any `005` line overrides it.

/// Default channel-type prefix characters, used until `ISUPPORT CHANTYPES`
/// says otherwise.
pub const DEFAULT_CHANTYPES: &[char] = &['#', '&'];

/// Extension trait for recognizing channel names in raw parameter strings.
pub trait ChannelExt {
    /// True if this string starts with a recognized channel-type prefix.
    ///
    /// Uses [`DEFAULT_CHANTYPES`]; callers that have negotiated a non-default
    /// `CHANTYPES` value should use [`is_channel_name_with`] instead.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        is_channel_name_with(self, DEFAULT_CHANTYPES)
    }
}

/// True if `name` starts with one of `chantypes`.
pub fn is_channel_name_with(name: &str, chantypes: &[char]) -> bool {
    name.chars().next().is_some_and(|c| chantypes.contains(&c))
}
