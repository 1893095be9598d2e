//! Icon lookup for node type tags.
//!
//! The catalog of component icons is an external collaborator: archigraph only asks
//! it for the image file of a type tag. Nodes with an icon are rendered as image
//! nodes; nodes without one fall back to the theme's plain node shape.

use std::{collections::HashMap, fmt, path::PathBuf};

use archigraph_core::identifier::TypeTag;

/// Maps node type tags to icon files.
pub trait IconCatalog: fmt::Debug {
    /// Returns the icon for `tag`, if the catalog has one.
    fn icon(&self, tag: TypeTag) -> Option<PathBuf>;
}

/// Catalog without any icons.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIcons;

impl IconCatalog for NoIcons {
    fn icon(&self, _tag: TypeTag) -> Option<PathBuf> {
        None
    }
}

impl IconCatalog for HashMap<TypeTag, PathBuf> {
    fn icon(&self, tag: TypeTag) -> Option<PathBuf> {
        self.get(&tag).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_icons() {
        assert_eq!(NoIcons.icon(TypeTag::new("k8s.compute.Pod")), None);
    }

    #[test]
    fn test_map_catalog() {
        let pod = TypeTag::new("k8s.compute.Pod");
        let mut catalog = HashMap::new();
        catalog.insert(pod, PathBuf::from("icons/k8s/pod.png"));

        assert_eq!(catalog.icon(pod), Some(PathBuf::from("icons/k8s/pod.png")));
        assert_eq!(catalog.icon(TypeTag::new("k8s.compute.Job")), None);
    }
}
