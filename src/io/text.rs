//! Line-oriented text format for trees and forests.
//!
//! ```text
//! FOREST BEGIN
//! TREE BEGIN
//! <id> <left_id> <right_id> <feature> <pivot>     (internal node)
//! <id> -1 -1 <v1> <v2> ...                        (leaf node)
//! ...
//! TREE END
//! ...
//! FOREST END
//! ```
//!
//! Node lines are written children before parent: nodes are numbered by a
//! pre-order enumeration starting at the root (id 0) and emitted in
//! descending id order. The parser therefore always has a node's subtrees at
//! hand when it reads the node itself; after a tree's last line exactly one
//! unconsumed node remains, and that node is the root.
//!
//! Numbers are decimal. A non-negative `precision` selects that many
//! significant digits (scientific notation); a negative `precision` uses the
//! shortest round-trip representation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::iter::Peekable;
use std::path::Path;
use std::str::Lines;

use crate::data::Scalar;
use crate::repr::{Forest, Node, NodeId, Tree};

const TREE_BEGIN: &str = "TREE BEGIN";
const TREE_END: &str = "TREE END";
const FOREST_BEGIN: &str = "FOREST BEGIN";
const FOREST_END: &str = "FOREST END";

/// Sentinel child id marking a leaf line.
const INVALID_ID: i64 = -1;

// =============================================================================
// Error type
// =============================================================================

/// Error raised while parsing a serialized tree or forest.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEnd { context: &'static str },
    #[error("invalid open statement: expected {expected:?}, got {got:?}")]
    InvalidHeader {
        expected: &'static str,
        got: String,
    },
    #[error("missing value while parsing {context}")]
    MissingValue { context: &'static str },
    #[error("invalid number {token:?} while parsing {context}")]
    InvalidNumber {
        token: String,
        context: &'static str,
    },
    #[error("node {id} is a leaf (left child -1) but has right child {right}")]
    LeafChildMismatch { id: i64, right: i64 },
    #[error("node {parent} references missing child {child}")]
    MissingChild { parent: i64, child: i64 },
    #[error("duplicate node id {id}")]
    DuplicateNode { id: i64 },
    #[error("node {id} is not reachable from the tree root")]
    StrayNode { id: i64 },
    #[error("negative feature index {value} on node {id}")]
    InvalidFeature { id: i64, value: i64 },
    #[error("tree has no nodes")]
    EmptyTree,
}

// =============================================================================
// Writing
// =============================================================================

fn format_value<T: Scalar>(value: T, precision: i32) -> String {
    if precision < 0 {
        format!("{}", value)
    } else {
        format!("{:.*e}", (precision as usize).saturating_sub(1), value)
    }
}

/// Serialize one tree.
///
/// `precision < 0` writes values with the default (shortest round-trip)
/// representation; otherwise `precision` counts significant digits.
pub fn store_tree<T: Scalar, W: Write>(
    tree: &Tree<T>,
    out: &mut W,
    precision: i32,
) -> io::Result<()> {
    struct Entry {
        node: NodeId,
        children: Option<(usize, usize)>,
    }

    // Pre-order numbering: the root takes id 0, children are appended as
    // their parent is visited.
    let mut order = vec![Entry {
        node: tree.root(),
        children: None,
    }];
    let mut next = 0;
    while next < order.len() {
        if let Node::Split { left, right, .. } = tree.node(order[next].node) {
            let (left, right) = (*left, *right);
            let left_pos = order.len();
            order.push(Entry {
                node: left,
                children: None,
            });
            let right_pos = order.len();
            order.push(Entry {
                node: right,
                children: None,
            });
            order[next].children = Some((left_pos, right_pos));
        }
        next += 1;
    }

    writeln!(out, "{}", TREE_BEGIN)?;
    for pos in (0..order.len()).rev() {
        let entry = &order[pos];
        match tree.node(entry.node) {
            Node::Leaf { values } => {
                write!(out, "{} {} {}", pos, INVALID_ID, INVALID_ID)?;
                for value in values {
                    write!(out, " {}", format_value(*value, precision))?;
                }
                writeln!(out)?;
            }
            Node::Split { feature, pivot, .. } => {
                let (left, right) = entry
                    .children
                    .expect("split nodes are enumerated with children");
                writeln!(
                    out,
                    "{} {} {} {} {}",
                    pos,
                    left,
                    right,
                    feature,
                    format_value(*pivot, precision)
                )?;
            }
        }
    }
    writeln!(out, "{}", TREE_END)?;
    Ok(())
}

/// Serialize a forest.
pub fn store_forest<T: Scalar, W: Write>(
    forest: &Forest<T>,
    out: &mut W,
    precision: i32,
) -> io::Result<()> {
    writeln!(out, "{}", FOREST_BEGIN)?;
    for tree in forest.trees() {
        store_tree(tree, out, precision)?;
    }
    writeln!(out, "{}", FOREST_END)?;
    Ok(())
}

/// Serialize a forest to a file.
pub fn store_forest_path<T: Scalar, P: AsRef<Path>>(
    forest: &Forest<T>,
    path: P,
    precision: i32,
) -> io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    store_forest(forest, &mut out, precision)?;
    out.flush()
}

// =============================================================================
// Reading
// =============================================================================

type LineSource<'a> = Peekable<Lines<'a>>;

fn next_int<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    context: &'static str,
) -> Result<i64, ParseError> {
    let token = tokens.next().ok_or(ParseError::MissingValue { context })?;
    token.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
        context,
    })
}

fn parse_value<T: Scalar>(token: &str, context: &'static str) -> Result<T, ParseError> {
    token.parse::<T>().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
        context,
    })
}

fn expect_line(
    lines: &mut LineSource<'_>,
    expected: &'static str,
    context: &'static str,
) -> Result<(), ParseError> {
    let line = lines.next().ok_or(ParseError::UnexpectedEnd { context })?;
    if line.trim_end() != expected {
        return Err(ParseError::InvalidHeader {
            expected,
            got: line.to_string(),
        });
    }
    Ok(())
}

fn read_tree<T: Scalar>(lines: &mut LineSource<'_>) -> Result<Tree<T>, ParseError> {
    expect_line(lines, TREE_BEGIN, "tree header")?;

    let mut nodes: Vec<Node<T>> = Vec::new();
    // Subtree roots not yet consumed by a parent, by serialized id.
    let mut pending: HashMap<i64, NodeId> = HashMap::new();
    let mut seen: HashSet<i64> = HashSet::new();
    let mut last_id = None;

    loop {
        let line = lines
            .next()
            .ok_or(ParseError::UnexpectedEnd { context: "tree body" })?
            .trim_end();
        if line == TREE_END {
            break;
        }

        let mut tokens = line.split_ascii_whitespace();
        let id = next_int(&mut tokens, "node id")?;
        let left = next_int(&mut tokens, "left child id")?;
        let right = next_int(&mut tokens, "right child id")?;
        if !seen.insert(id) {
            return Err(ParseError::DuplicateNode { id });
        }

        let node = if left == INVALID_ID {
            if right != INVALID_ID {
                return Err(ParseError::LeafChildMismatch { id, right });
            }
            let mut values = Vec::new();
            for token in tokens {
                values.push(parse_value::<T>(token, "leaf value")?);
            }
            Node::Leaf { values }
        } else {
            let feature = next_int(&mut tokens, "feature index")?;
            if feature < 0 {
                return Err(ParseError::InvalidFeature { id, value: feature });
            }
            let pivot_token = tokens
                .next()
                .ok_or(ParseError::MissingValue { context: "pivot" })?;
            let pivot = parse_value::<T>(pivot_token, "pivot")?;

            let left_node = pending
                .remove(&left)
                .ok_or(ParseError::MissingChild { parent: id, child: left })?;
            let right_node = pending
                .remove(&right)
                .ok_or(ParseError::MissingChild { parent: id, child: right })?;
            Node::Split {
                feature: feature as usize,
                pivot,
                left: left_node,
                right: right_node,
            }
        };

        nodes.push(node);
        pending.insert(id, (nodes.len() - 1) as NodeId);
        last_id = Some(id);
    }

    let root_id = last_id.ok_or(ParseError::EmptyTree)?;
    let root = pending
        .remove(&root_id)
        .expect("the last parsed node is never consumed as a child");
    if let Some(&id) = pending.keys().next() {
        return Err(ParseError::StrayNode { id });
    }

    Ok(Tree::from_nodes(nodes, root))
}

/// Parse one serialized tree.
pub fn load_tree<T: Scalar>(input: &str) -> Result<Tree<T>, ParseError> {
    let mut lines = input.lines().peekable();
    read_tree(&mut lines)
}

/// Parse a serialized forest.
pub fn load_forest<T: Scalar>(input: &str) -> Result<Forest<T>, ParseError> {
    let mut lines = input.lines().peekable();
    expect_line(&mut lines, FOREST_BEGIN, "forest header")?;

    let mut trees = Vec::new();
    loop {
        match lines.peek() {
            None => {
                return Err(ParseError::UnexpectedEnd {
                    context: "forest body",
                })
            }
            Some(line) if line.trim_end() == FOREST_END => {
                lines.next();
                break;
            }
            Some(_) => trees.push(read_tree(&mut lines)?),
        }
    }

    Ok(Forest::new(trees))
}

/// Parse a serialized forest from a file.
pub fn load_forest_path<T: Scalar, P: AsRef<Path>>(path: P) -> Result<Forest<T>, ParseError> {
    let input = fs::read_to_string(path)?;
    load_forest(&input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// root split, left leaf, right split with two leaves.
    fn sample_tree() -> Tree<f32> {
        Tree::from_nodes(
            vec![
                Node::Split {
                    feature: 0,
                    pivot: 0.5,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    values: vec![1.0, 2.0],
                },
                Node::Split {
                    feature: 1,
                    pivot: 2.0,
                    left: 3,
                    right: 4,
                },
                Node::Leaf { values: vec![3.0] },
                Node::Leaf { values: vec![4.0] },
            ],
            0,
        )
    }

    fn store_to_string(tree: &Tree<f32>, precision: i32) -> String {
        let mut buffer = Vec::new();
        store_tree(tree, &mut buffer, precision).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn store_writes_children_before_parents() {
        let text = store_to_string(&sample_tree(), -1);
        let expected = "\
TREE BEGIN
4 -1 -1 4
3 -1 -1 3
2 3 4 1 2
1 -1 -1 1 2
0 1 2 0 0.5
TREE END
";
        assert_eq!(text, expected);
    }

    #[test]
    fn tree_round_trip_default_precision() {
        let tree = sample_tree();
        let text = store_to_string(&tree, -1);
        let parsed: Tree<f32> = load_tree(&text).unwrap();

        parsed.validate().unwrap();
        for row in [[0.3f32, 0.0], [0.7, 1.0], [0.7, 5.0]] {
            assert_eq!(tree.eval(&row), parsed.eval(&row));
        }
    }

    #[test]
    fn tree_round_trip_explicit_precision() {
        let tree = Tree::from_nodes(
            vec![
                Node::Split {
                    feature: 2,
                    pivot: 0.123456789f32,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    values: vec![0.000123456, 7.5e8],
                },
                Node::Leaf {
                    values: vec![-42.75],
                },
            ],
            0,
        );
        let text = store_to_string(&tree, 10);
        let parsed: Tree<f32> = load_tree(&text).unwrap();
        parsed.validate().unwrap();

        // 10 significant digits round-trip f32 exactly. The parsed arena is
        // laid out in line order, so compare through evaluation.
        for row in [[0.0f32, 0.0, 0.0], [0.0, 0.0, 1.0]] {
            assert_eq!(tree.eval(&row), parsed.eval(&row));
        }
    }

    #[test]
    fn forest_round_trip() {
        let forest = Forest::new(vec![sample_tree(), sample_tree()]);
        let mut buffer = Vec::new();
        store_forest(&forest, &mut buffer, -1).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let parsed: Forest<f32> = load_forest(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        for row in [[0.3f32, 0.0], [0.7, 1.0], [0.7, 5.0]] {
            assert_eq!(forest.eval(&row), parsed.eval(&row));
        }
    }

    #[test]
    fn empty_forest_round_trip() {
        let forest: Forest<f32> = Forest::new(Vec::new());
        let mut buffer = Vec::new();
        store_forest(&forest, &mut buffer, -1).unwrap();
        let parsed: Forest<f32> =
            load_forest(&String::from_utf8(buffer).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn load_accepts_trailing_whitespace() {
        let text = "TREE BEGIN  \n0 -1 -1 1 2 3   \nTREE END \n";
        let tree: Tree<f32> = load_tree(text).unwrap();
        assert_eq!(tree.eval(&[0.0]), &[1.0, 2.0, 3.0]);
    }

    #[rstest]
    #[case::truncated_header("", "forest header")]
    #[case::truncated_body("FOREST BEGIN\n", "forest body")]
    #[case::truncated_tree("FOREST BEGIN\nTREE BEGIN\n0 -1 -1 1\n", "tree body")]
    fn load_forest_truncation(#[case] input: &str, #[case] _context: &str) {
        assert!(matches!(
            load_forest::<f32>(input),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[rstest]
    #[case::duplicate_id(
        "TREE BEGIN\n1 -1 -1 1\n1 -1 -1 2\n0 1 1 0 0.5\nTREE END\n"
    )]
    fn load_tree_duplicate_id(#[case] input: &str) {
        assert!(matches!(
            load_tree::<f32>(input),
            Err(ParseError::DuplicateNode { id: 1 })
        ));
    }

    #[test]
    fn load_tree_missing_child() {
        let text = "TREE BEGIN\n1 -1 -1 1\n0 1 2 0 0.5\nTREE END\n";
        assert!(matches!(
            load_tree::<f32>(text),
            Err(ParseError::MissingChild { parent: 0, child: 2 })
        ));
    }

    #[test]
    fn load_tree_stray_node() {
        let text = "TREE BEGIN\n5 -1 -1 1\n0 -1 -1 2\nTREE END\n";
        assert!(matches!(
            load_tree::<f32>(text),
            Err(ParseError::StrayNode { id: 5 })
        ));
    }

    #[test]
    fn load_tree_leaf_with_right_child() {
        let text = "TREE BEGIN\n0 -1 3 1\nTREE END\n";
        assert!(matches!(
            load_tree::<f32>(text),
            Err(ParseError::LeafChildMismatch { id: 0, right: 3 })
        ));
    }

    #[test]
    fn load_tree_bad_number() {
        let text = "TREE BEGIN\n0 -1 -1 banana\nTREE END\n";
        assert!(matches!(
            load_tree::<f32>(text),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn load_tree_empty_tree() {
        let text = "TREE BEGIN\nTREE END\n";
        assert!(matches!(load_tree::<f32>(text), Err(ParseError::EmptyTree)));
    }

    #[test]
    fn load_forest_bad_header() {
        assert!(matches!(
            load_forest::<f32>("TREE BEGIN\n"),
            Err(ParseError::InvalidHeader { .. })
        ));
    }
}
