use std::sync::Arc;

use crate::models::error::PlatformEffectError;

/// Minimal view-tree capability used by the sanitizer.
///
/// Adapters wrap whatever concrete UI tree a platform exposes. Trees come from
/// third-party code and may be malformed or cyclic.
pub trait UiNode: Send + Sync {
    /// Visible text, if this node renders any.
    fn visible_text(&self) -> Option<String>;

    /// Child nodes. Entries may be `None` when a child vanished mid-enumeration.
    fn children(&self) -> Vec<Option<Arc<dyn UiNode>>>;

    /// The immediate visual group this node belongs to; the unit of concealment.
    fn containing_group(&self) -> Option<Arc<dyn UiNode>>;

    fn is_concealed(&self) -> bool;

    fn conceal(&self) -> Result<(), PlatformEffectError>;

    /// Stable identity, when the adapter has one. Used to skip revisits.
    fn node_key(&self) -> Option<u64> {
        None
    }
}

/// Obtains the current root each tick. The SDK may rebuild its hierarchy between ticks.
pub type RootProvider = Arc<dyn Fn() -> Option<Arc<dyn UiNode>> + Send + Sync + 'static>;
