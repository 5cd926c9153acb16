//! Fixed-node list grammar.
//!
//! Users list the mesh nodes that must not move as comma-separated tokens,
//! each either a node number or an inclusive `a-b` range:
//!
//! ```text
//! "1,5-7,10"  ->  [1, 5, 6, 7, 10]
//! ```
//!
//! Tokens are expanded left to right without deduplication. An empty string or
//! `none` (any case) means no fixed nodes. A range with `a > b` expands to
//! nothing. At most `MAX_FIXED_NODES` nodes may be listed in total.

use thiserror::Error;

/// A token that is not a node number or a well-formed range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed fixed-node token `{token}`: {reason}")]
pub struct FixedNodeError {
    pub token: String,
    pub reason: &'static str,
}

/// Most node numbers a specification may expand to.
pub const MAX_FIXED_NODES: usize = 1_000_000;

/// Expand a fixed-node specification into node numbers.
pub fn parse_fixed_nodes(spec: &str) -> Result<Vec<i64>, FixedNodeError> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let mut nodes = Vec::new();
    for token in spec.split(',') {
        let parts: Vec<&str> = token.split('-').collect();
        match parts.as_slice() {
            [single] => {
                reserve(&nodes, token, 1)?;
                nodes.push(parse_node(token, single)?);
            }
            [start, end] => {
                let start = parse_node(token, start)?;
                let end = parse_node(token, end)?;
                if start <= end {
                    let span = usize::try_from(end.abs_diff(start))
                        .ok()
                        .and_then(|d| d.checked_add(1))
                        .unwrap_or(usize::MAX);
                    reserve(&nodes, token, span)?;
                    nodes.extend(start..=end);
                }
            }
            _ => {
                return Err(FixedNodeError {
                    token: token.to_string(),
                    reason: "more than one `-`",
                });
            }
        }
    }
    Ok(nodes)
}

fn reserve(nodes: &[i64], token: &str, extra: usize) -> Result<(), FixedNodeError> {
    if extra > MAX_FIXED_NODES - nodes.len() {
        return Err(FixedNodeError {
            token: token.to_string(),
            reason: "too many fixed nodes",
        });
    }
    Ok(())
}

fn parse_node(token: &str, part: &str) -> Result<i64, FixedNodeError> {
    let part = part.trim();
    if part.is_empty() {
        return Err(FixedNodeError {
            token: token.to_string(),
            reason: "missing node number",
        });
    }
    part.parse::<i64>().map_err(|_| FixedNodeError {
        token: token.to_string(),
        reason: "not an integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spellings() {
        assert!(parse_fixed_nodes("").unwrap().is_empty());
        assert!(parse_fixed_nodes("None").unwrap().is_empty());
        assert!(parse_fixed_nodes("none").unwrap().is_empty());
        assert!(parse_fixed_nodes("  NONE ").unwrap().is_empty());
    }

    #[test]
    fn singles_and_ranges() {
        assert_eq!(parse_fixed_nodes("3").unwrap(), vec![3]);
        assert_eq!(parse_fixed_nodes("1-3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_fixed_nodes("1,5-7,10").unwrap(), vec![1, 5, 6, 7, 10]);
        assert_eq!(parse_fixed_nodes(" 2 , 4 - 5").unwrap(), vec![2, 4, 5]);
    }

    #[test]
    fn keeps_duplicates_and_token_order() {
        assert_eq!(parse_fixed_nodes("5,1-2,2").unwrap(), vec![5, 1, 2, 2]);
    }

    #[test]
    fn descending_range_is_empty() {
        assert!(parse_fixed_nodes("3-1").unwrap().is_empty());
        assert_eq!(parse_fixed_nodes("3-1,4").unwrap(), vec![4]);
    }

    #[test]
    fn malformed_tokens_name_the_token() {
        let err = parse_fixed_nodes("a-3").unwrap_err();
        assert_eq!(err.token, "a-3");

        let err = parse_fixed_nodes("1,,2").unwrap_err();
        assert_eq!(err.token, "");

        let err = parse_fixed_nodes("1-2-3").unwrap_err();
        assert_eq!(err.reason, "more than one `-`");

        assert!(parse_fixed_nodes("-3").is_err());
        assert!(parse_fixed_nodes("4.5").is_err());
    }

    #[test]
    fn oversized_range_is_rejected() {
        let err = parse_fixed_nodes("1-50000000").unwrap_err();
        assert_eq!(err.token, "1-50000000");
        assert_eq!(err.reason, "too many fixed nodes");

        let err = parse_fixed_nodes("0-9223372036854775807").unwrap_err();
        assert_eq!(err.reason, "too many fixed nodes");

        let err = parse_fixed_nodes("1-600000,2-600000").unwrap_err();
        assert_eq!(err.token, "2-600000");

        assert_eq!(parse_fixed_nodes("1-1000000").unwrap().len(), MAX_FIXED_NODES);
    }
}
