//! SQL identifier quoting.
//!
//! [`Ident`] represents a table or column reference as written by the caller
//! (`users`, `users.id`, `public.users`, `users.*`, `count as total`). Every part is
//! quoted when rendered, with embedded quote characters doubled, so identifiers can
//! never break out of their position in the statement. Names are not validated here:
//! an unknown or misspelled column is reported by the database when the statement runs.
//!
//! # Example
//! ```ignore
//! use fitdb::Ident;
//!
//! assert_eq!(Ident::parse("users.id").to_ansi(), r#""users"."id""#);
//! assert_eq!(Ident::parse("users.*").to_ansi(), r#""users".*"#);
//! ```

/// A part of a dotted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// A name, rendered inside quotes.
    Name(String),
    /// `*`, rendered bare.
    Star,
}

/// A possibly-qualified, possibly-aliased SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
    pub alias: Option<String>,
}

impl Ident {
    /// Split a reference on `.` and an optional trailing ` as <alias>`.
    pub fn parse(s: &str) -> Self {
        let (path, alias) = split_alias(s.trim());
        let parts = path
            .split('.')
            .map(|part| match part.trim() {
                "*" => IdentPart::Star,
                name => IdentPart::Name(name.to_string()),
            })
            .collect();
        Self {
            parts,
            alias: alias.map(str::to_string),
        }
    }

    /// A table reference optionally qualified by a schema.
    pub fn table(schema: Option<&str>, table: &str) -> Self {
        let mut ident = Self::parse(table);
        if let Some(schema) = schema {
            ident.parts.insert(0, IdentPart::Name(schema.to_string()));
        }
        ident
    }

    /// Render with the given quote character.
    pub(crate) fn write_quoted(&self, quote: char, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Star => out.push('*'),
                IdentPart::Name(name) => push_quoted(name, quote, out),
            }
        }
        if let Some(alias) = &self.alias {
            out.push_str(" as ");
            push_quoted(alias, quote, out);
        }
    }

    /// Render using standard double-quote quoting.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        self.write_quoted('"', &mut out);
        out
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::parse(s)
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::parse(&s)
    }
}

fn push_quoted(name: &str, quote: char, out: &mut String) {
    out.push(quote);
    for ch in name.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
}

/// Split `expr as alias` (case-insensitive keyword) into its two halves.
fn split_alias(s: &str) -> (&str, Option<&str>) {
    let lower = s.to_ascii_lowercase();
    match lower.rfind(" as ") {
        Some(pos) => {
            let alias = s[pos + 4..].trim();
            if alias.is_empty() {
                (s, None)
            } else {
                (s[..pos].trim_end(), Some(alias))
            }
        }
        None => (s, None),
    }
}
