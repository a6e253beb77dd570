//! Parsing of the dot/bracket path syntax used to address the state document.
//!
//! Supported grammar: `ident(.ident|[index])*`, e.g. `order.items[0].sku`.
//! No wildcards and no slicing — every segment names exactly one child.

use crate::error::StateError;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object field access.
    Key(String),
    /// Array element access.
    Index(usize),
}

/// Parse a path string into its segments. An empty string addresses the
/// document root and parses to zero segments.
pub fn parse(path: &str) -> Result<Vec<Segment>, StateError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for dotted in path.split('.') {
        if dotted.is_empty() {
            return Err(StateError::InvalidPath {
                path: path.to_owned(),
            });
        }
        let mut rest = dotted;
        let key_end = rest.find('[').unwrap_or(rest.len());
        if key_end > 0 {
            segments.push(Segment::Key(rest[..key_end].to_owned()));
        }
        rest = &rest[key_end..];
        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(StateError::InvalidPath {
                    path: path.to_owned(),
                });
            }
            let close = rest.find(']').ok_or_else(|| StateError::InvalidPath {
                path: path.to_owned(),
            })?;
            let index: usize =
                rest[1..close]
                    .parse()
                    .map_err(|_| StateError::InvalidPath {
                        path: path.to_owned(),
                    })?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }
    Ok(segments)
}
