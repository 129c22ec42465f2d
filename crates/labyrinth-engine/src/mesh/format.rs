use std::ops::{BitOr, BitOrAssign};

/// Per-vertex attribute, in interleaving order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttribute {
    Position,
    Normal,
    Texcoord,
}

impl VertexAttribute {
    /// Declaration order inside an interleaved vertex.
    pub const ORDER: [VertexAttribute; 3] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Texcoord,
    ];

    /// Number of `f32` components.
    pub const fn components(self) -> u32 {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => 3,
            VertexAttribute::Texcoord => 2,
        }
    }

    /// Shader input name the attribute binds to.
    pub const fn input_name(self) -> &'static str {
        match self {
            VertexAttribute::Position => "in_position",
            VertexAttribute::Normal => "in_normal",
            VertexAttribute::Texcoord => "in_texcoord",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            VertexAttribute::Position => 1 << 0,
            VertexAttribute::Normal => 1 << 1,
            VertexAttribute::Texcoord => 1 << 2,
        }
    }
}

/// Set of attributes present in a mesh's vertices.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct VertexFormat(u8);

impl VertexFormat {
    pub const EMPTY: Self = Self(0);
    pub const POSITION: Self = Self(VertexAttribute::Position.bit());
    pub const NORMAL: Self = Self(VertexAttribute::Normal.bit());
    pub const TEXCOORD: Self = Self(VertexAttribute::Texcoord.bit());

    #[inline]
    pub const fn contains(self, attribute: VertexAttribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Attributes present, in declaration order.
    pub fn attributes(self) -> impl Iterator<Item = VertexAttribute> {
        VertexAttribute::ORDER
            .into_iter()
            .filter(move |a| self.contains(*a))
    }

    /// Floats per vertex.
    pub fn vertex_size(self) -> u32 {
        self.attributes().map(VertexAttribute::components).sum()
    }
}

impl BitOr for VertexFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for VertexFormat {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<VertexAttribute> for VertexFormat {
    fn from(attribute: VertexAttribute) -> Self {
        Self(attribute.bit())
    }
}

/// Placement of one attribute inside an interleaved vertex, in floats.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeLayout {
    pub attribute: VertexAttribute,
    pub components: u32,
    pub offset: u32,
}

impl AttributeLayout {
    #[inline]
    pub const fn offset_bytes(&self) -> u32 {
        self.offset * FLOAT_SIZE
    }
}

const FLOAT_SIZE: u32 = std::mem::size_of::<f32>() as u32;

/// Interleaved layout for a vertex format.
///
/// Attributes appear in declaration order; each offset is the running sum of
/// the components before it and the stride is the total.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    stride: u32,
    attributes: Vec<AttributeLayout>,
}

impl VertexLayout {
    pub fn new(format: VertexFormat) -> Self {
        let mut stride = 0;
        let attributes = format
            .attributes()
            .map(|attribute| {
                let layout = AttributeLayout {
                    attribute,
                    components: attribute.components(),
                    offset: stride,
                };
                stride += attribute.components();
                layout
            })
            .collect();

        Self { stride, attributes }
    }

    /// Floats per vertex.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn stride_bytes(&self) -> u32 {
        self.stride * FLOAT_SIZE
    }

    pub fn attributes(&self) -> &[AttributeLayout] {
        &self.attributes
    }

    pub fn get(&self, attribute: VertexAttribute) -> Option<&AttributeLayout> {
        self.attributes.iter().find(|a| a.attribute == attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_formats() -> impl Iterator<Item = VertexFormat> {
        (0u8..8).map(VertexFormat)
    }

    // ── stride ────────────────────────────────────────────────────────────

    #[test]
    fn stride_is_sum_of_present_components() {
        for format in all_formats() {
            let expected: u32 = VertexAttribute::ORDER
                .iter()
                .filter(|a| format.contains(**a))
                .map(|a| a.components())
                .sum();
            let layout = VertexLayout::new(format);
            assert_eq!(layout.stride(), expected, "format {:03b}", format.bits());
            assert_eq!(layout.stride_bytes(), expected * 4);
        }
    }

    #[test]
    fn full_format_is_eight_floats() {
        let f = VertexFormat::POSITION | VertexFormat::NORMAL | VertexFormat::TEXCOORD;
        assert_eq!(VertexLayout::new(f).stride(), 8);
        assert_eq!(f.vertex_size(), 8);
    }

    // ── offsets ───────────────────────────────────────────────────────────

    #[test]
    fn offsets_follow_declaration_order() {
        for format in all_formats() {
            let layout = VertexLayout::new(format);
            for a in layout.attributes() {
                let before: u32 = VertexAttribute::ORDER
                    .iter()
                    .take_while(|x| **x != a.attribute)
                    .filter(|x| format.contains(**x))
                    .map(|x| x.components())
                    .sum();
                assert_eq!(a.offset, before, "format {:03b} {:?}", format.bits(), a.attribute);
                assert_eq!(a.offset_bytes(), before * 4);
            }
        }
    }

    #[test]
    fn position_texcoord_layout() {
        let layout = VertexLayout::new(VertexFormat::POSITION | VertexFormat::TEXCOORD);
        assert_eq!(layout.get(VertexAttribute::Position).unwrap().offset, 0);
        assert_eq!(layout.get(VertexAttribute::Texcoord).unwrap().offset, 3);
        assert!(layout.get(VertexAttribute::Normal).is_none());
        assert_eq!(layout.stride(), 5);
    }

    #[test]
    fn empty_format_has_no_attributes() {
        let layout = VertexLayout::new(VertexFormat::EMPTY);
        assert_eq!(layout.stride(), 0);
        assert!(layout.attributes().is_empty());
    }
}
