//! Hardening limits for alias replay.

/// Limits applied to alias replay to harden against alias bombs.
///
/// A small document can legally request an enormous amount of replayed
/// output (each alias re-injects a full captured subtree, and captures may
/// contain further aliases resolved earlier). These limits bound that
/// amplification; breaching any of them fails the parse.
#[derive(Clone, Copy, Debug)]
pub struct AliasLimits {
    /// Maximum total number of **replayed** tokens injected from aliases
    /// across the entire parse. When exceeded, parsing errors out.
    pub max_total_replayed_tokens: usize,
    /// Maximum depth of the alias replay stack (nested alias → injected
    /// buffer → alias, etc.).
    pub max_replay_stack_depth: usize,
    /// Maximum number of times a **single anchor** may be expanded via alias.
    /// Use `usize::MAX` for "unlimited".
    pub max_alias_expansions_per_anchor: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_total_replayed_tokens: 1_000_000,
            max_replay_stack_depth: 64,
            max_alias_expansions_per_anchor: usize::MAX,
        }
    }
}
