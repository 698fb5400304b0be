//! Host document access for the `Document` namespace.
//!
//! The renderer that owns the document is outside the runtime. It exposes
//! its element tree through [`DomAccessor`]; scripts only ever see opaque
//! [`ExternalHandle`]s.

use std::sync::Arc;

use crate::value::ExternalHandle;

/// Element lookup and mutation supplied by the host.
pub trait DomAccessor: Send + Sync {
    fn element_by_id(&self, id: &str) -> Option<ExternalHandle>;

    fn elements_by_class_name(&self, class: &str) -> Vec<ExternalHandle>;

    /// Replace an element's children with parsed `markup`.
    fn set_inner_html(&self, element: ExternalHandle, markup: &str) -> Result<(), String>;
}

pub type SharedDom = Arc<dyn DomAccessor>;
