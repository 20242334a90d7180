//! MODE-string interpretation driven by a negotiated [`ParameterStore`]
//! rather than this crate's built-in [`super::ChannelMode`] set (§4.4/§4.5).
//!
//! A real network's `CHANMODES`/`PREFIX` tokens can add or remove letters
//! from the defaults, so the engines consult the store instead of hardcoding
//! RFC 2812's list. An unrecognised letter is logged and skipped rather than
//! treated as a parse failure, per §9's tolerance note.

use crate::isupport::ParameterStore;

/// Which §4.2 mode category a letter fell into when applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DynamicModeTarget {
    /// A prefix mode (`o`, `v`, ...): toggles a member's channel privilege.
    Membership,
    /// Type A: list-modify mode (ban, exception, ...), always carries an arg.
    List,
    /// Type B: scalar setting that always takes an arg (e.g. channel key).
    Setting,
    /// Type C: scalar setting that takes an arg only when being set (e.g. limit).
    SettingOnSet,
    /// Type D: argumentless flag toggle.
    Flag,
    /// Not present in `CHANMODES`/`PREFIX` at all.
    Unknown,
}

/// One interpreted mode change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicModeChange {
    pub add: bool,
    pub letter: char,
    pub target: DynamicModeTarget,
    pub arg: Option<String>,
}

/// Interpret `pieces` (the MODE command's parameters after the target) as a
/// sequence of changes, consulting `store` for what each letter means.
/// Never fails: unknown letters are logged and yield a [`DynamicModeTarget::Unknown`]
/// change with no argument consumed.
pub fn apply_mode_string(store: &ParameterStore, pieces: &[&str]) -> Vec<DynamicModeChange> {
    let mut out = Vec::new();
    let Some((flags, rest)) = pieces.split_first() else {
        return out;
    };
    let mut args = rest.iter().copied().peekable();
    let mut adding = true;

    for c in flags.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            letter => {
                let target = classify(store, letter);
                let arg = match target {
                    DynamicModeTarget::Membership | DynamicModeTarget::List | DynamicModeTarget::Setting => {
                        args.next().map(str::to_owned)
                    }
                    DynamicModeTarget::SettingOnSet => {
                        if adding {
                            args.next().map(str::to_owned)
                        } else {
                            None
                        }
                    }
                    DynamicModeTarget::Flag | DynamicModeTarget::Unknown => None,
                };
                if matches!(target, DynamicModeTarget::Unknown) {
                    tracing::warn!(mode = %letter, "unknown mode character, skipping");
                }
                out.push(DynamicModeChange {
                    add: adding,
                    letter,
                    target,
                    arg,
                });
            }
        }
    }

    out
}

fn classify(store: &ParameterStore, letter: char) -> DynamicModeTarget {
    if store.prefixes.iter().any(|(mode, _prefix)| *mode == letter) {
        DynamicModeTarget::Membership
    } else if store.type_a_channel_modes.contains(&letter) {
        DynamicModeTarget::List
    } else if store.type_b_channel_modes.contains(&letter) {
        DynamicModeTarget::Setting
    } else if store.type_c_channel_modes.contains(&letter) {
        DynamicModeTarget::SettingOnSet
    } else if store.type_d_channel_modes.contains(&letter) {
        DynamicModeTarget::Flag
    } else {
        DynamicModeTarget::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_defaults() -> ParameterStore {
        let mut store = ParameterStore::default();
        store.apply("CHANMODES", Some("beI,k,l,imnpst"));
        store.apply("PREFIX", Some("(ov)@+"));
        store
    }

    #[test]
    fn membership_mode_consumes_nick_arg() {
        let store = store_with_defaults();
        let changes = apply_mode_string(&store, &["+o", "nick"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target, DynamicModeTarget::Membership);
        assert_eq!(changes[0].arg.as_deref(), Some("nick"));
        assert!(changes[0].add);
    }

    #[test]
    fn type_a_list_mode_consumes_arg() {
        let store = store_with_defaults();
        let changes = apply_mode_string(&store, &["+b", "*!*@host"]);
        assert_eq!(changes[0].target, DynamicModeTarget::List);
        assert_eq!(changes[0].arg.as_deref(), Some("*!*@host"));
    }

    #[test]
    fn type_c_limit_only_consumes_arg_on_set() {
        let store = store_with_defaults();
        let set = apply_mode_string(&store, &["+l", "40"]);
        assert_eq!(set[0].target, DynamicModeTarget::SettingOnSet);
        assert_eq!(set[0].arg.as_deref(), Some("40"));

        let unset = apply_mode_string(&store, &["-l"]);
        assert_eq!(unset[0].target, DynamicModeTarget::SettingOnSet);
        assert_eq!(unset[0].arg, None);
    }

    #[test]
    fn type_d_flag_takes_no_arg() {
        let store = store_with_defaults();
        let changes = apply_mode_string(&store, &["+n"]);
        assert_eq!(changes[0].target, DynamicModeTarget::Flag);
        assert_eq!(changes[0].arg, None);
    }

    #[test]
    fn unknown_letter_is_tolerated_not_an_error() {
        let store = store_with_defaults();
        let changes = apply_mode_string(&store, &["+Z"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target, DynamicModeTarget::Unknown);
    }

    #[test]
    fn mixed_string_with_sign_switch() {
        let store = store_with_defaults();
        let changes = apply_mode_string(&store, &["+o-v", "alice", "bob"]);
        assert_eq!(changes.len(), 2);
        assert!(changes[0].add);
        assert_eq!(changes[0].arg.as_deref(), Some("alice"));
        assert!(!changes[1].add);
        assert_eq!(changes[1].arg.as_deref(), Some("bob"));
    }
}
