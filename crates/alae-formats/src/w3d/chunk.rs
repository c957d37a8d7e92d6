//! Decoded chunk model

use super::chunk_type::ChunkTag;

/// One tagged unit of an asset
///
/// Inputs are bare chunk names this chunk depends on. Each input carries a
/// validity flag; filtering clears flags instead of deleting names so that
/// the original order is preserved on export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Structural role
    pub tag: ChunkTag,
    /// Chunk name, when the chunk kind has one
    pub name: Option<String>,
    /// Offset of the chunk header within the source file
    pub offset: u32,
    /// Declared payload length
    pub size: u32,
    inputs: Vec<String>,
    validities: Vec<bool>,
}

impl Chunk {
    /// Create a chunk without inputs
    pub fn new(tag: ChunkTag, name: Option<String>, offset: u32, size: u32) -> Self {
        Self {
            tag,
            name,
            offset,
            size,
            inputs: Vec::new(),
            validities: Vec::new(),
        }
    }

    /// Replace the input list; every input starts out valid
    pub fn set_inputs(&mut self, inputs: Vec<String>) {
        self.validities = vec![true; inputs.len()];
        self.inputs = inputs;
    }

    /// Builder form of [`Chunk::set_inputs`]
    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.set_inputs(inputs);
        self
    }

    /// Name, or an empty string for unnamed chunks
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// All inputs in original order, valid or not
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Whether input `i` is still valid
    pub fn is_valid_input(&self, i: usize) -> bool {
        self.validities.get(i).copied().unwrap_or(false)
    }

    /// Mark input `i` valid
    pub fn validate_input(&mut self, i: usize) {
        if let Some(flag) = self.validities.get_mut(i) {
            *flag = true;
        }
    }

    /// Mark input `i` invalid
    pub fn invalidate_input(&mut self, i: usize) {
        if let Some(flag) = self.validities.get_mut(i) {
            *flag = false;
        }
    }

    /// Valid inputs in original order
    pub fn valid_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .zip(&self.validities)
            .filter(|(_, valid)| **valid)
            .map(|(input, _)| input.as_str())
    }

    /// Number of valid inputs
    pub fn valid_input_count(&self) -> usize {
        self.validities.iter().filter(|valid| **valid).count()
    }

    /// Whether at least one input is still valid
    pub fn has_valid_inputs(&self) -> bool {
        self.validities.contains(&true)
    }

    /// Exchange contents with another chunk
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::w3d::ChunkType;

    fn mesh(inputs: &[&str]) -> Chunk {
        Chunk::new(ChunkTag::Known(ChunkType::Mesh), Some("box.body".into()), 0, 64)
            .with_inputs(inputs.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_inputs_start_valid() {
        let chunk = mesh(&["a.tga", "b.dds"]);
        assert!(chunk.is_valid_input(0));
        assert!(chunk.is_valid_input(1));
        assert!(!chunk.is_valid_input(2));
        assert_eq!(chunk.valid_input_count(), 2);
    }

    #[test]
    fn test_invalidate_keeps_order() {
        let mut chunk = mesh(&["a.tga", "b.dds", "c.png"]);
        chunk.invalidate_input(1);

        assert_eq!(chunk.valid_inputs().collect::<Vec<_>>(), ["a.tga", "c.png"]);
        assert_eq!(chunk.inputs().len(), 3);

        chunk.validate_input(1);
        assert_eq!(chunk.valid_input_count(), 3);
    }

    #[test]
    fn test_has_valid_inputs() {
        let mut chunk = mesh(&["a.tga"]);
        assert!(chunk.has_valid_inputs());
        chunk.invalidate_input(0);
        assert!(!chunk.has_valid_inputs());
        assert!(!mesh(&[]).has_valid_inputs());
    }

    #[test]
    fn test_set_inputs_resets_validity() {
        let mut chunk = mesh(&["a.tga"]);
        chunk.invalidate_input(0);
        chunk.set_inputs(vec!["z.tga".into()]);
        assert!(chunk.is_valid_input(0));
    }

    #[test]
    fn test_swap() {
        let mut a = mesh(&["a.tga"]);
        let mut b = Chunk::new(ChunkTag::Unrecognized(7), None, 8, 16);
        a.swap(&mut b);
        assert_eq!(a.tag, ChunkTag::Unrecognized(7));
        assert_eq!(b.name_str(), "box.body");
        assert_eq!(a.name_str(), "");
    }
}
