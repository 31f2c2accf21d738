//! Node identifiers.
//!
//! Static layouts derive ids from `(plot id, blueprint id, blueprint version,
//! structural path)` so the same unit resolves to the same id on every
//! regeneration. The structural path records the generation step that produced
//! a node (`root/r0c1`, `root/nested`, `root/child2`), never its label, so
//! relabelling a blueprint does not move observations.
//!
//! Parametric layouts have no published identity to hash. They receive fresh
//! random ids on every generation and callers must persist the ids they need.
use std::fmt;

/// Number of hash bytes rendered into an id (32 hex characters).
const ID_BYTES: usize = 16;

/// Slash-delimited route from the layout root to a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructuralPath(String);

impl StructuralPath {
    pub fn root() -> Self {
        StructuralPath("root".to_owned())
    }

    /// Path of grid cell (`r`, `c`) below `self`.
    pub fn grid_cell(&self, r: u32, c: u32) -> Self {
        self.push(&format!("r{r}c{c}"))
    }

    /// Path of the single child produced by a nested generator.
    pub fn nested(&self) -> Self {
        self.push("nested")
    }

    /// Path of the `index`-th fixed-list child.
    pub fn fixed_child(&self, index: usize) -> Self {
        self.push(&format!("child{index}"))
    }

    /// Path of a parametric subplot.
    pub fn subplot(&self, index: usize) -> Self {
        self.push(&format!("subplot{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment of the path.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    fn push(&self, segment: &str) -> Self {
        StructuralPath(format!("{}/{}", self.0, segment))
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic id for a node of a published blueprint.
///
/// Every field is length-prefixed before hashing so that no two distinct
/// tuples share an input byte stream.
pub fn stable_id(
    plot_id: Option<&str>,
    blueprint_id: &str,
    blueprint_version: u32,
    path: &StructuralPath,
) -> String {
    let mut hasher = blake3::Hasher::new();
    match plot_id {
        Some(plot) => {
            hasher.update(&[1]);
            update_field(&mut hasher, plot.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
    update_field(&mut hasher, blueprint_id.as_bytes());
    hasher.update(&blueprint_version.to_le_bytes());
    update_field(&mut hasher, path.as_str().as_bytes());
    to_hex(&hasher.finalize().as_bytes()[..ID_BYTES])
}

/// Fresh random id, unique per call.
pub fn ephemeral_id() -> String {
    let hi: u64 = rand::random();
    let lo: u64 = rand::random();
    format!("{hi:016x}{lo:016x}")
}

fn update_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn to_hex(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_paths_encode_generation_steps() {
        let root = StructuralPath::root();
        assert_eq!(root.grid_cell(0, 1).as_str(), "root/r0c1");
        assert_eq!(root.nested().as_str(), "root/nested");
        assert_eq!(root.fixed_child(2).as_str(), "root/child2");
        assert_eq!(root.nested().grid_cell(1, 0).last_segment(), "r1c0");
        assert_eq!(root.last_segment(), "root");
    }

    #[test]
    fn stable_id_is_deterministic() {
        let path = StructuralPath::root().grid_cell(0, 1);
        let a = stable_id(Some("plot-1"), "bp", 2, &path);
        let b = stable_id(Some("plot-1"), "bp", 2, &path);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stable_id_changes_with_every_input() {
        let path = StructuralPath::root().grid_cell(0, 1);
        let base = stable_id(Some("plot-1"), "bp", 2, &path);
        assert_ne!(base, stable_id(Some("plot-2"), "bp", 2, &path));
        assert_ne!(base, stable_id(None, "bp", 2, &path));
        assert_ne!(base, stable_id(Some("plot-1"), "bp2", 2, &path));
        assert_ne!(base, stable_id(Some("plot-1"), "bp", 3, &path));
        assert_ne!(
            base,
            stable_id(Some("plot-1"), "bp", 2, &StructuralPath::root().grid_cell(1, 0))
        );
    }

    #[test]
    fn length_prefix_separates_field_boundaries() {
        let path = StructuralPath::root();
        assert_ne!(
            stable_id(Some("ab"), "c", 1, &path),
            stable_id(Some("a"), "bc", 1, &path)
        );
    }

    #[test]
    fn ephemeral_ids_are_fresh() {
        let a = ephemeral_id();
        let b = ephemeral_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
