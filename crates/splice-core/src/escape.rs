/*!
# Escaper

Turns an extracted literal into text that can be spliced into a dynamically
built pattern and still match only itself.
*/

/// Characters with pattern-metacharacter meaning
const METACHARACTERS: &[char] = &[
    '.', '?', '*', '+', '^', '$', '[', ']', '\\', '(', ')', '{', '}', '|', '-',
];

/// Prefix every pattern metacharacter in `literal` with a backslash
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len() + 8);
    for ch in literal.chars() {
        if METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
