//! The composition engine.
//!
//! | Step | Module | Input → output |
//! |---|---|---|
//! | **Parse** | [`node`] | template text → node tree |
//! | **Include** | [`partials`] | `<% ref, {..} %>` → fragment text, recursively |
//! | **Interpolate** | [`interpolate`] | `{{ path }}` → context value |
//! | **Slots** | [`slots`] | page regions → layout placeholders |
//! | **Loops** | [`loops`] | `monad:loop` blocks → one copy per collection item |
//!
//! Every step after parsing takes and returns nodes. [`compose`] runs
//! inclusion and, unless deferred, interpolation of the top-level text. Page
//! rendering defers it so slots can be spliced and loops expanded before the
//! remaining tokens are resolved against the page context by
//! [`interpolate()`], which is also the step that serializes the tree.

pub mod context;
pub mod interpolate;
pub mod loops;
pub mod node;
pub mod partials;
pub mod slots;

pub use context::RenderContext;
pub use interpolate::interpolate;
pub use loops::expand_loops;
pub use node::Node;
pub use partials::{Composer, FragmentSource, FsFragments, MemoryFragments};
pub use slots::{SlotNodes, Slots, extract_slots, fill_placeholders};

#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// Resolve top-level tokens after inclusion.
    pub interpolate: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self { interpolate: true }
    }
}

impl ComposeOptions {
    pub fn deferred() -> Self {
        Self { interpolate: false }
    }
}

/// Expand inclusions in `text`, then interpolate it unless deferred.
pub fn compose(
    text: &str,
    ctx: &RenderContext,
    source: &dyn FragmentSource,
    options: ComposeOptions,
) -> Vec<Node> {
    Composer::new(source).compose(text, ctx, options.interpolate)
}
