//! Per-tag name and input rules
//!
//! Every tag the decoder models is described here once. A rule says whether
//! the chunk is a leaf or a container, where its name comes from, and which
//! bytes (or children) supply its dependency references.

use super::chunk_type::ChunkType;

/// Standard W3D name length
pub(crate) const W3D_NAME_LEN: usize = 16;
/// Long W3D name length (sub-objects, boxes, aggregates)
pub(crate) const W3D_LONG_NAME_LEN: usize = 2 * W3D_NAME_LEN;
/// Emitter texture file name length (`_MAX_PATH`)
pub(crate) const W3D_PATH_LEN: usize = 260;

/// A NUL-padded string inside a leaf payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Field {
    pub offset: usize,
    /// `None` reads to the end of the payload
    pub len: Option<usize>,
}

impl Field {
    pub(crate) const fn fixed(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len: Some(len),
        }
    }

    pub(crate) const fn rest(offset: usize) -> Self {
        Self { offset, len: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Leaf,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameRule {
    None,
    /// Name stored in this chunk's own payload, optionally qualified as
    /// `qualifier.name` when the qualifier field is not empty
    Inline {
        name: Field,
        qualifier: Option<Field>,
    },
    /// Name inherited from the first child with this tag
    FromChild(ChunkType),
}

/// Counted array of fixed-width names inside a leaf payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NameArray {
    /// Offset of the little-endian `u32` element count
    pub count_at: usize,
    /// Offset of the first element
    pub first: usize,
    /// Distance between elements
    pub stride: usize,
    /// Width of the name at the start of each element
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputRule {
    None,
    /// Fixed fields of this chunk's payload, then an optional counted array
    Inline {
        fields: &'static [Field],
        array: Option<NameArray>,
    },
    /// Names of the children with this tag
    ChildNames(ChunkType),
}

/// Decoding rule for one tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkRule {
    pub tag: ChunkType,
    pub layout: Layout,
    /// Kept as a top-level chunk of an asset
    pub primary: bool,
    pub name: NameRule,
    pub inputs: InputRule,
}

impl ChunkRule {
    const fn container(tag: ChunkType) -> Self {
        Self {
            tag,
            layout: Layout::Container,
            primary: false,
            name: NameRule::None,
            inputs: InputRule::None,
        }
    }

    const fn leaf(tag: ChunkType) -> Self {
        Self {
            tag,
            layout: Layout::Leaf,
            primary: false,
            name: NameRule::None,
            inputs: InputRule::None,
        }
    }

    const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    const fn named_by(mut self, child: ChunkType) -> Self {
        self.name = NameRule::FromChild(child);
        self
    }

    const fn named_at(mut self, name: Field) -> Self {
        self.name = NameRule::Inline {
            name,
            qualifier: None,
        };
        self
    }

    const fn qualified_at(mut self, qualifier: Field, name: Field) -> Self {
        self.name = NameRule::Inline {
            name,
            qualifier: Some(qualifier),
        };
        self
    }

    const fn inputs_at(mut self, fields: &'static [Field]) -> Self {
        self.inputs = InputRule::Inline {
            fields,
            array: None,
        };
        self
    }

    const fn child_names(mut self, child: ChunkType) -> Self {
        self.inputs = InputRule::ChildNames(child);
        self
    }
}

const HEADER_NAME: Field = Field::fixed(4, W3D_NAME_LEN);
const ANIM_HIERARCHY: Field = Field::fixed(4 + W3D_NAME_LEN, W3D_NAME_LEN);
const HLOD_NAME: Field = Field::fixed(8, W3D_NAME_LEN);
const HLOD_HIERARCHY: Field = Field::fixed(8 + W3D_NAME_LEN, W3D_NAME_LEN);

static RULES: [ChunkRule; 27] = [
    // Meshes: `container.mesh`, textures referenced by file name
    ChunkRule::container(ChunkType::Mesh)
        .primary()
        .named_by(ChunkType::MeshHeader3),
    ChunkRule::leaf(ChunkType::MeshHeader3).qualified_at(
        Field::fixed(8 + W3D_NAME_LEN, W3D_NAME_LEN),
        Field::fixed(8, W3D_NAME_LEN),
    ),
    ChunkRule::container(ChunkType::Textures).child_names(ChunkType::Texture),
    ChunkRule::container(ChunkType::Texture).named_by(ChunkType::TextureName),
    ChunkRule::leaf(ChunkType::TextureName).named_at(Field::rest(0)),
    // Hierarchies
    ChunkRule::container(ChunkType::Hierarchy)
        .primary()
        .named_by(ChunkType::HierarchyHeader),
    ChunkRule::leaf(ChunkType::HierarchyHeader).named_at(HEADER_NAME),
    // Animations: `hierarchy.anim`, depending on their hierarchy
    ChunkRule::container(ChunkType::Animation)
        .primary()
        .named_by(ChunkType::AnimationHeader),
    ChunkRule::leaf(ChunkType::AnimationHeader)
        .qualified_at(ANIM_HIERARCHY, HEADER_NAME)
        .inputs_at(&[ANIM_HIERARCHY]),
    ChunkRule::container(ChunkType::CompressedAnimation)
        .primary()
        .named_by(ChunkType::CompressedAnimationHeader),
    ChunkRule::leaf(ChunkType::CompressedAnimationHeader)
        .qualified_at(ANIM_HIERARCHY, HEADER_NAME)
        .inputs_at(&[ANIM_HIERARCHY]),
    ChunkRule::container(ChunkType::MorphAnimation)
        .primary()
        .named_by(ChunkType::MorphAnimHeader),
    ChunkRule::leaf(ChunkType::MorphAnimHeader)
        .qualified_at(ANIM_HIERARCHY, HEADER_NAME)
        .inputs_at(&[ANIM_HIERARCHY]),
    // Emitters
    ChunkRule::container(ChunkType::Emitter)
        .primary()
        .named_by(ChunkType::EmitterHeader),
    ChunkRule::leaf(ChunkType::EmitterHeader).named_at(HEADER_NAME),
    ChunkRule::leaf(ChunkType::EmitterInfo).inputs_at(&[Field::fixed(0, W3D_PATH_LEN)]),
    // Aggregates
    ChunkRule::container(ChunkType::Aggregate)
        .primary()
        .named_by(ChunkType::AggregateHeader),
    ChunkRule::leaf(ChunkType::AggregateHeader).named_at(HEADER_NAME),
    ChunkRule {
        inputs: InputRule::Inline {
            fields: &[Field::fixed(0, W3D_LONG_NAME_LEN)],
            array: Some(NameArray {
                count_at: W3D_LONG_NAME_LEN,
                first: W3D_LONG_NAME_LEN + 4,
                stride: 2 * W3D_LONG_NAME_LEN,
                len: W3D_LONG_NAME_LEN,
            }),
        },
        ..ChunkRule::leaf(ChunkType::AggregateInfo)
    },
    // Hierarchical LODs: sub-objects and the hierarchy they bind to
    ChunkRule::container(ChunkType::HLod)
        .primary()
        .named_by(ChunkType::HLodHeader),
    ChunkRule::leaf(ChunkType::HLodHeader)
        .named_at(HLOD_NAME)
        .inputs_at(&[HLOD_HIERARCHY]),
    ChunkRule::container(ChunkType::HLodLodArray),
    ChunkRule::container(ChunkType::HLodAggregateArray),
    ChunkRule::container(ChunkType::HLodProxyArray),
    ChunkRule::leaf(ChunkType::HLodSubObjectArrayHeader),
    ChunkRule::leaf(ChunkType::HLodSubObject).inputs_at(&[Field::fixed(4, W3D_LONG_NAME_LEN)]),
    // Boxes carry their name inline
    ChunkRule::leaf(ChunkType::CollisionBox)
        .primary()
        .named_at(Field::fixed(8, W3D_LONG_NAME_LEN)),
];

/// Rule for a tag, if the decoder interprets it
pub(crate) fn rule_for(tag: ChunkType) -> Option<&'static ChunkRule> {
    RULES.iter().find(|rule| rule.tag == tag)
}
