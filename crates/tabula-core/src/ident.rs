//! Identifier and literal quoting for definition statements

/// Whether `name` can be written without escaping
fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote a table, index or event name.
///
/// Bare identifiers are returned as-is, anything else is wrapped in
/// backticks with backslashes and backticks escaped.
pub fn quote_ident(name: &str) -> String {
    if is_bare_identifier(name) {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('`');
    for c in name.chars() {
        if c == '`' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('`');
    quoted
}

/// Quote a (possibly nested) field path such as `address.city` or `tags[*]`.
///
/// Each `.`-separated segment is quoted on its own; `*` segments and `[*]`
/// suffixes are kept verbatim.
pub fn quote_field_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            if segment == "*" {
                return segment.to_string();
            }

            let mut base = segment;
            let mut suffixes = 0;
            while let Some(stripped) = base.strip_suffix("[*]") {
                base = stripped;
                suffixes += 1;
            }

            let mut quoted = quote_ident(base);
            for _ in 0..suffixes {
                quoted.push_str("[*]");
            }
            quoted
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a string literal with double quotes
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
