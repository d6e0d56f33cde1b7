/*!
# Extractor

Derives identifiers from located fragments by splitting on syntax-significant
characters (`=`, `(`, `[`, `;`, `:`). Nothing here understands the program;
it only checks that the pieces come out in the expected number and kind, which
is what catches a fragment that matched for the wrong reason.
*/

use crate::error::{Result, SpliceError};

/// Number of selection-slot assignments at the head of the reset routine
pub const RESET_SELECTION_SLOTS: usize = 3;

/// Number of update calls that follow them
pub const RESET_UPDATE_ROUTINES: usize = 6;

/// Value the reset routine stores in each selection slot
pub const RESET_SENTINEL: &str = "-1";

/// Text before the first `delim`, or the whole token if absent
pub fn head_before(token: &str, delim: char) -> &str {
    token.split(delim).next().unwrap_or(token)
}

/// Split a statement list on `;`
pub fn split_statements(body: &str) -> Vec<&str> {
    body.split(';').collect()
}

/// Fail with `UnexpectedShape` unless `items` has exactly `expected` entries
pub fn expect_count<T>(rule: &str, what: &str, items: &[T], expected: usize) -> Result<()> {
    if items.len() != expected {
        return Err(SpliceError::shape(rule, what, expected, items.len()));
    }
    Ok(())
}

/// Fail with `MalformedFragment` if any name repeats
pub fn expect_distinct(rule: &str, what: &str, names: &[String]) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(SpliceError::malformed(
                rule,
                format!("{what} '{name}' appears more than once"),
            ));
        }
    }
    Ok(())
}

/// A call made through a property-access chain, e.g. `n4V.a1V()`
///
/// These are obfuscation helpers rather than named routines.
pub fn is_property_chain_call(statement: &str) -> bool {
    statement
        .char_indices()
        .filter(|&(i, c)| c == '.' && i > 0)
        .any(|(i, _)| statement[i + 1..].match_indices("()").any(|(k, _)| k >= 1))
}

/// Body of a routine: after the first `{`, up to the last `;}`
pub fn function_body<'a>(rule: &str, fragment: &'a str) -> Result<&'a str> {
    let open = fragment
        .find('{')
        .ok_or_else(|| SpliceError::malformed(rule, "routine has no opening brace"))?;
    let close = fragment
        .rfind(";}")
        .filter(|&close| close > open)
        .ok_or_else(|| SpliceError::malformed(rule, "routine body does not end with ';}'"))?;
    Ok(&fragment[open + 1..close])
}

/// Name of the routine in a leading `function NAME(` definition
pub fn routine_name<'a>(rule: &str, fragment: &'a str) -> Result<&'a str> {
    let rest = fragment
        .strip_prefix("function ")
        .ok_or_else(|| SpliceError::malformed(rule, "fragment does not start with a function definition"))?;
    let name = head_before(rest, '(');
    if name.is_empty() || name.len() == rest.len() || !is_plain_name(name) {
        return Err(SpliceError::malformed(
            rule,
            format!("'{}' is not a routine name", name),
        ));
    }
    Ok(name)
}

/// The map object expression and its backing container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAnchor {
    /// e.g. `abc[12]`
    pub object: String,
    /// e.g. `abc`
    pub container: String,
}

/// Decompose a `KEY:container[index]` anchor
pub fn split_map_anchor(rule: &str, fragment: &str) -> Result<MapAnchor> {
    let parts: Vec<&str> = fragment.split(':').collect();
    expect_count(rule, "':'-separated parts", &parts, 2)?;
    let object = parts[1];
    let container = head_before(object, '[');
    if container.is_empty() || container.len() == object.len() {
        return Err(SpliceError::malformed(
            rule,
            format!("'{object}' is not an indexed slot"),
        ));
    }
    Ok(MapAnchor {
        object: object.to_string(),
        container: container.to_string(),
    })
}

/// Identifiers recovered from the canonical reset routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetShape {
    /// Slots reset to the sentinel, e.g. `z5i[977]`
    pub selection_slots: Vec<String>,
    /// Update routines called afterwards, e.g. `p4Z`
    pub update_routines: Vec<String>,
}

/// Decompose the reset routine into 3 selection slots and 6 update routines
pub fn decompose_reset(rule: &str, fragment: &str) -> Result<ResetShape> {
    let body = function_body(rule, fragment)?;
    let statements: Vec<&str> = split_statements(body)
        .into_iter()
        .filter(|s| !is_property_chain_call(s))
        .collect();
    expect_count(
        rule,
        "statements",
        &statements,
        RESET_SELECTION_SLOTS + RESET_UPDATE_ROUTINES,
    )?;

    let (assignments, calls) = statements.split_at(RESET_SELECTION_SLOTS);

    let selection_slots = assignments
        .iter()
        .map(|statement| match statement.split_once('=') {
            Some((slot, RESET_SENTINEL)) if !slot.is_empty() => Ok(slot.to_string()),
            _ => Err(SpliceError::malformed(
                rule,
                format!("'{statement}' does not reset a slot to {RESET_SENTINEL}"),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    expect_distinct(rule, "selection slot", &selection_slots)?;

    let mut saw_flag_argument = false;
    let update_routines = calls
        .iter()
        .map(|statement| {
            let name = head_before(statement, '(');
            let arguments = statement
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('('))
                .and_then(|rest| rest.strip_suffix(')'))
                .filter(|_| is_plain_name(name))
                .ok_or_else(|| {
                    SpliceError::malformed(rule, format!("'{statement}' is not a call"))
                })?;
            saw_flag_argument |= matches!(arguments, "true" | "false");
            Ok(name.to_string())
        })
        .collect::<Result<Vec<_>>>()?;
    if !saw_flag_argument {
        return Err(SpliceError::malformed(
            rule,
            "no update call takes a boolean flag",
        ));
    }
    expect_distinct(rule, "update routine", &update_routines)?;

    Ok(ResetShape {
        selection_slots,
        update_routines,
    })
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
