//! Element/property tree consumed by the geometry import core.
//!
//! The tokenizer that splits a binary FBX file into nested elements lives
//! outside this crate; it populates an [`ElementTree`] through the builder
//! methods here, and the import core only ever reads it back. Elements form
//! a first-child/next-sibling tree and each element owns an ordered chain of
//! typed properties. Nodes live in contiguous arenas and all links are
//! integer ids, so the tree is cheap to build, trivially `Send + Sync`, and
//! has no destructor chains to walk.

mod property;

pub use property::{ArrayHeader, TypeTag, ARRAY_HEADER_SIZE, ENCODING_DEFLATE, ENCODING_RAW};

use crate::util::{Error, Result};

/// Handle to an element node in an [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

/// Handle to a property node in an [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyId(u32);

struct ElementNode {
    name: String,
    first_child: Option<ElementId>,
    last_child: Option<ElementId>,
    next_sibling: Option<ElementId>,
    first_property: Option<PropertyId>,
    last_property: Option<PropertyId>,
}

struct PropertyNode {
    tag: TypeTag,
    /// Byte span of the payload window in the tree's backing buffer.
    start: u32,
    end: u32,
    next: Option<PropertyId>,
}

/// Arena-backed node tree with a single backing buffer for property payloads.
pub struct ElementTree {
    elements: Vec<ElementNode>,
    properties: Vec<PropertyNode>,
    data: Vec<u8>,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a tree containing only an unnamed root element.
    pub fn new() -> Self {
        Self {
            elements: vec![ElementNode {
                name: String::new(),
                first_child: None,
                last_child: None,
                next_sibling: None,
                first_property: None,
                last_property: None,
            }],
            properties: Vec::new(),
            data: Vec::new(),
        }
    }

    /// The root element.
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    // ------------------------------------------------------------------
    // Builder surface (driven by the tokenizer, and by tests)
    // ------------------------------------------------------------------

    /// Append a child element under `parent`.
    pub fn add_element(&mut self, parent: ElementId, name: &str) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ElementNode {
            name: name.to_string(),
            first_child: None,
            last_child: None,
            next_sibling: None,
            first_property: None,
            last_property: None,
        });
        match self.elements[parent.0 as usize].last_child {
            None => self.elements[parent.0 as usize].first_child = Some(id),
            Some(last) => self.elements[last.0 as usize].next_sibling = Some(id),
        }
        self.elements[parent.0 as usize].last_child = Some(id);
        id
    }

    /// Append a property with a raw payload window, exactly as the
    /// tokenizer sliced it out of the file.
    pub fn add_property(&mut self, element: ElementId, tag: TypeTag, payload: &[u8]) -> PropertyId {
        let start = self.data.len() as u32;
        self.data.extend_from_slice(payload);
        let end = self.data.len() as u32;

        let id = PropertyId(self.properties.len() as u32);
        self.properties.push(PropertyNode { tag, start, end, next: None });

        match self.elements[element.0 as usize].last_property {
            None => self.elements[element.0 as usize].first_property = Some(id),
            Some(last) => self.properties[last.0 as usize].next = Some(id),
        }
        self.elements[element.0 as usize].last_property = Some(id);
        id
    }

    /// Append a string property.
    pub fn add_string(&mut self, element: ElementId, value: &str) -> PropertyId {
        self.add_property(element, TypeTag::String, value.as_bytes())
    }

    /// Append an array property from a pre-encoded payload: the window is
    /// `[count][encoding][payload.len()][payload]`. For `encoding == 1` the
    /// payload holds the compressed bytes.
    pub fn add_array(
        &mut self,
        element: ElementId,
        tag: TypeTag,
        count: u32,
        encoding: u32,
        payload: &[u8],
    ) -> PropertyId {
        debug_assert!(tag.is_array());
        let header = ArrayHeader {
            count,
            encoding,
            byte_length: payload.len() as u32,
        };
        let mut window = Vec::with_capacity(ARRAY_HEADER_SIZE + payload.len());
        header.write(&mut window);
        window.extend_from_slice(payload);
        self.add_property(element, tag, &window)
    }

    /// Append an uncompressed i32 array property.
    pub fn add_i32_array(&mut self, element: ElementId, values: &[i32]) -> PropertyId {
        self.add_array(
            element,
            TypeTag::Int32Array,
            values.len() as u32,
            ENCODING_RAW,
            bytemuck::cast_slice(values),
        )
    }

    /// Append an uncompressed i64 array property.
    pub fn add_i64_array(&mut self, element: ElementId, values: &[i64]) -> PropertyId {
        self.add_array(
            element,
            TypeTag::Int64Array,
            values.len() as u32,
            ENCODING_RAW,
            bytemuck::cast_slice(values),
        )
    }

    /// Append an uncompressed f32 array property.
    pub fn add_f32_array(&mut self, element: ElementId, values: &[f32]) -> PropertyId {
        self.add_array(
            element,
            TypeTag::FloatArray,
            values.len() as u32,
            ENCODING_RAW,
            bytemuck::cast_slice(values),
        )
    }

    /// Append an uncompressed f64 array property.
    pub fn add_f64_array(&mut self, element: ElementId, values: &[f64]) -> PropertyId {
        self.add_array(
            element,
            TypeTag::DoubleArray,
            values.len() as u32,
            ENCODING_RAW,
            bytemuck::cast_slice(values),
        )
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Name of an element.
    pub fn name(&self, element: ElementId) -> &str {
        &self.elements[element.0 as usize].name
    }

    /// First child of an element with the given name.
    pub fn find_child(&self, element: ElementId, name: &str) -> Option<ElementId> {
        self.children(element).find(|&c| self.name(c) == name)
    }

    /// Iterate the children of an element in insertion order.
    pub fn children(&self, element: ElementId) -> Children<'_> {
        Children {
            tree: self,
            cursor: self.elements[element.0 as usize].first_child,
        }
    }

    /// First property of an element.
    pub fn first_property(&self, element: ElementId) -> Option<PropertyId> {
        self.elements[element.0 as usize].first_property
    }

    /// Next sibling property.
    pub fn next_property(&self, property: PropertyId) -> Option<PropertyId> {
        self.properties[property.0 as usize].next
    }

    /// Property at the given position in the element's property chain.
    pub fn property_at(&self, element: ElementId, index: usize) -> Option<PropertyId> {
        self.properties(element).nth(index)
    }

    /// Iterate the properties of an element in insertion order.
    pub fn properties(&self, element: ElementId) -> Properties<'_> {
        Properties {
            tree: self,
            cursor: self.elements[element.0 as usize].first_property,
        }
    }

    // ------------------------------------------------------------------
    // Property access
    // ------------------------------------------------------------------

    /// Type tag of a property.
    pub fn tag(&self, property: PropertyId) -> TypeTag {
        self.properties[property.0 as usize].tag
    }

    /// Raw payload window of a property.
    pub fn payload(&self, property: PropertyId) -> &[u8] {
        let node = &self.properties[property.0 as usize];
        &self.data[node.start as usize..node.end as usize]
    }

    /// Value of a string property.
    pub fn string_value(&self, property: PropertyId) -> Result<&str> {
        if self.tag(property) != TypeTag::String {
            return Err(Error::decode(format!(
                "expected string property, got '{}'",
                self.tag(property).as_char()
            )));
        }
        std::str::from_utf8(self.payload(property))
            .map_err(|_| Error::decode("invalid UTF-8 in string property"))
    }
}

/// Iterator over an element's children.
pub struct Children<'a> {
    tree: &'a ElementTree,
    cursor: Option<ElementId>,
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let id = self.cursor?;
        self.cursor = self.tree.elements[id.0 as usize].next_sibling;
        Some(id)
    }
}

/// Iterator over an element's properties.
pub struct Properties<'a> {
    tree: &'a ElementTree,
    cursor: Option<PropertyId>,
}

impl Iterator for Properties<'_> {
    type Item = PropertyId;

    fn next(&mut self) -> Option<PropertyId> {
        let id = self.cursor?;
        self.cursor = self.tree.properties[id.0 as usize].next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_navigation() {
        let mut tree = ElementTree::new();
        let objects = tree.add_element(tree.root(), "Objects");
        let geom_a = tree.add_element(objects, "Geometry");
        let geom_b = tree.add_element(objects, "Geometry");
        let model = tree.add_element(objects, "Model");

        let children: Vec<_> = tree.children(objects).collect();
        assert_eq!(children, vec![geom_a, geom_b, model]);
        assert_eq!(tree.find_child(tree.root(), "Objects"), Some(objects));
        assert_eq!(tree.find_child(objects, "Geometry"), Some(geom_a));
        assert_eq!(tree.find_child(objects, "Nothing"), None);
        assert_eq!(tree.name(model), "Model");
    }

    #[test]
    fn test_property_chain() {
        let mut tree = ElementTree::new();
        let el = tree.add_element(tree.root(), "LayerElementUV");
        tree.add_string(el, "first");
        tree.add_string(el, "second");

        let first = tree.first_property(el).unwrap();
        assert_eq!(tree.string_value(first).unwrap(), "first");
        let second = tree.next_property(first).unwrap();
        assert_eq!(tree.string_value(second).unwrap(), "second");
        assert!(tree.next_property(second).is_none());

        assert_eq!(tree.property_at(el, 1), Some(second));
        assert_eq!(tree.property_at(el, 2), None);
    }

    #[test]
    fn test_array_window_layout() {
        let mut tree = ElementTree::new();
        let el = tree.add_element(tree.root(), "Vertices");
        let prop = tree.add_i32_array(el, &[1, 2, -3]);

        assert_eq!(tree.tag(prop), TypeTag::Int32Array);
        let window = tree.payload(prop);
        let header = ArrayHeader::parse(window).unwrap();
        assert_eq!(header.count, 3);
        assert_eq!(header.encoding, ENCODING_RAW);
        assert_eq!(header.byte_length, 12);
        assert_eq!(window.len(), ARRAY_HEADER_SIZE + 12);
    }

    #[test]
    fn test_string_value_rejects_non_string() {
        let mut tree = ElementTree::new();
        let el = tree.add_element(tree.root(), "X");
        let prop = tree.add_i32_array(el, &[1]);
        assert!(tree.string_value(prop).is_err());
    }
}
