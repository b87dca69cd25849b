//! Helpers for emitting C/C++ source text.

/// C and C++ keywords that cannot be used as generated identifiers.
pub const CPP_KEYWORDS: &[&str] = &[
    // C
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
    // C++
    "alignas", "alignof", "bool", "catch", "class", "constexpr", "const_cast", "decltype",
    "delete", "dynamic_cast", "explicit", "export", "false", "friend", "mutable", "namespace",
    "new", "noexcept", "nullptr", "operator", "private", "protected", "public",
    "reinterpret_cast", "static_assert", "static_cast", "template", "this", "throw", "true",
    "try", "typeid", "typename", "using", "virtual",
];

/// Check if a name is a C or C++ keyword.
pub fn is_cpp_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// Check if a name is a valid C identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape text for use inside a C string literal.
///
/// Newlines become `\n`, carriage returns are dropped, backslashes and
/// double quotes are escaped.
pub fn to_c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_c_string() {
        assert_eq!(to_c_string("plain"), "plain");
        assert_eq!(to_c_string("two\nlines"), "two\\nlines");
        assert_eq!(to_c_string("win\r\nline"), "win\\nline");
        assert_eq!(to_c_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(to_c_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_is_c_identifier() {
        assert!(is_c_identifier("vec3"));
        assert!(is_c_identifier("_private"));
        assert!(is_c_identifier("__init__"));
        assert!(!is_c_identifier("3vec"));
        assert!(!is_c_identifier("has-dash"));
        assert!(!is_c_identifier(""));
    }

    #[test]
    fn test_is_cpp_keyword() {
        assert!(is_cpp_keyword("new"));
        assert!(is_cpp_keyword("struct"));
        assert!(!is_cpp_keyword("spawn"));
    }
}
