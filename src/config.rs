/// Config for a container
/// ## Fields
/// - `auto_resolve`:
///   If `true`, constructor parameters without an explicit or language-level default
///   are filled from their type hints: empty containers for list and map hints,
///   type rules or fresh instances for class hints.
///
///   Explicit values and language-level defaults are used either way.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub auto_resolve: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { auto_resolve: false }
    }
}
