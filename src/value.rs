use std::fmt;

use num_bigint::BigInt;

use crate::position::Position;

/// A symbol or keyword name with an optional namespace, as in `ns/name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Some(ref namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Nil,

    Boolean(bool),

    /// String contents with escapes already resolved
    String(String),

    Character(char),

    Integer(BigInt),

    Float(f64),

    Symbol(QualifiedName),

    Keyword(QualifiedName),

    List(Vec<ValueNode>),

    Vector(Vec<ValueNode>),

    /// Keys and values flattened in source order, comments and discards included
    Map(Vec<ValueNode>),

    /// Elements in source order; duplicates are kept
    Set(Vec<ValueNode>),

    /// `#tag value`, left uninterpreted
    Tagged(QualifiedName, Box<ValueNode>),

    /// `#_ value`
    Discard(Box<ValueNode>),

    /// Text following `;` up to the end of the line
    Comment(String),
}

impl Kind {
    pub fn description(&self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Boolean(_) => "boolean",
            Kind::String(_) => "string",
            Kind::Character(_) => "character",
            Kind::Integer(_) => "integer",
            Kind::Float(_) => "floating point number",
            Kind::Symbol(_) => "symbol",
            Kind::Keyword(_) => "keyword",
            Kind::List(vs) if vs.is_empty() => "empty list",
            Kind::List(_) => "list",
            Kind::Vector(vs) if vs.is_empty() => "empty vector",
            Kind::Vector(_) => "vector",
            Kind::Map(vs) if vs.is_empty() => "empty map",
            Kind::Map(_) => "map",
            Kind::Set(vs) if vs.is_empty() => "empty set",
            Kind::Set(_) => "set",
            Kind::Tagged(_, _) => "tagged literal",
            Kind::Discard(_) => "discarded form",
            Kind::Comment(_) => "comment",
        }
    }
}

/// A parsed form together with where it started in the source.
///
/// Equality ignores positions: two nodes are equal when their kinds are.
#[derive(Clone, Debug)]
pub struct ValueNode {
    pub position: Position,
    pub kind: Kind,
}

impl ValueNode {
    pub fn new(position: Position, kind: Kind) -> Self {
        Self { position, kind }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn into_kind(self) -> Kind {
        self.kind
    }

    /// Comments and discarded forms, which carry no data for the enclosing form
    pub fn is_trivia(&self) -> bool {
        match self.kind {
            Kind::Comment(_) | Kind::Discard(_) => true,
            _ => false,
        }
    }

    /// The children of a list, vector, map or set, trivia included
    pub fn children(&self) -> Option<&[ValueNode]> {
        match self.kind {
            Kind::List(ref vs) | Kind::Vector(ref vs) | Kind::Map(ref vs) | Kind::Set(ref vs) => {
                Some(vs.as_slice())
            }
            _ => None,
        }
    }

    pub fn significant_children(&self) -> Option<impl Iterator<Item = &ValueNode>> {
        self.children()
            .map(|vs| vs.iter().filter(|v| !v.is_trivia()))
    }

    /// Key/value pairs of a map with comments and discarded forms skipped
    pub fn map_entries(&self) -> Option<Vec<(&ValueNode, &ValueNode)>> {
        if let Kind::Map(ref vs) = self.kind {
            let significant: Vec<&ValueNode> = vs.iter().filter(|v| !v.is_trivia()).collect();
            Some(
                significant
                    .chunks(2)
                    .filter_map(|pair| match pair {
                        [key, value] => Some((*key, *value)),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            None
        }
    }
}

impl PartialEq for ValueNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Wraps a kind at [`Position::START`]; mostly useful for building expected trees.
impl From<Kind> for ValueNode {
    fn from(kind: Kind) -> Self {
        ValueNode::new(Position::START, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> ValueNode {
        Kind::Integer(n.into()).into()
    }

    #[test]
    fn test_equality_ignores_position() {
        let a = ValueNode::new(Position::new(1, 1), Kind::Nil);
        let b = ValueNode::new(Position::new(7, 3), Kind::Nil);
        assert_eq!(a, b);
        assert_ne!(a, ValueNode::new(Position::new(1, 1), Kind::Boolean(false)));
    }

    #[test]
    fn test_qualified_name_display() {
        assert_eq!(QualifiedName::bare("foo").to_string(), "foo");
        assert_eq!(QualifiedName::qualified("foo", "bar").to_string(), "foo/bar");
    }

    #[test]
    fn test_map_entries_skip_trivia() {
        let map = ValueNode::from(Kind::Map(vec![
            int(1),
            Kind::Comment(" one".to_owned()).into(),
            int(2),
            Kind::Discard(Box::new(int(9))).into(),
            int(3),
            int(4),
        ]));

        let entries = map.map_entries().unwrap();
        assert_eq!(entries, vec![(&int(1), &int(2)), (&int(3), &int(4))]);
        assert_eq!(map.significant_children().unwrap().count(), 4);
        assert_eq!(map.children().unwrap().len(), 6);
    }

    #[test]
    fn test_scalars_have_no_children() {
        assert!(int(1).children().is_none());
        assert!(int(1).map_entries().is_none());
        assert!(ValueNode::from(Kind::Vector(vec![])).map_entries().is_none());
    }

    #[test]
    fn test_description() {
        assert_eq!(Kind::List(vec![]).description(), "empty list");
        assert_eq!(Kind::Set(vec![int(1)]).description(), "set");
        assert_eq!(
            Kind::Keyword(QualifiedName::bare("a")).description(),
            "keyword"
        );
    }
}
