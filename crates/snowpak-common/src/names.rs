//! Internal and external asset name notation.
//!
//! The game names assets like `<media>\classes\trucks\a.xml`, where the
//! angle-bracketed prefix is the resource group. On disk the same asset is
//! stored as `[media]\classes\trucks\a.xml`, since `<` and `>` are not
//! allowed in file names.
//!
//! Both notations follow one grammar:
//!
//! ```text
//! name      := group? directory file
//! group     := OPEN [^CLOSE]+ CLOSE
//! directory := "\" | "\" .+ "\"
//! file      := [^\]+
//! ```
//!
//! Cache blocks always carry a group and write a bare `\` directory as `:`
//! in the internal form (`<g>:file`). Their external group is the whole
//! top-level directory, so it may itself contain `]` (`[a]b]\c` is group
//! `a]b`). Load lists allow the group to be absent, in which case the name
//! is a single file component.

use memchr::{memchr, memrchr};

use crate::{Error, Result};

/// Which container's variant of the grammar applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// Group required; `:` stands for the root directory in internal names.
    CacheBlock,
    /// Group optional; no `:` substitution.
    LoadList,
}

/// Borrowed components of a parsed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameParts<'a> {
    /// Resource group without its brackets.
    pub group: Option<&'a str>,
    /// Directory including its leading and trailing `\`; empty without a group.
    pub directory: &'a str,
    /// Final path component.
    pub file: &'a str,
}

#[derive(Debug, Clone, Copy)]
enum Notation {
    Internal,
    External,
}

impl Notation {
    const fn brackets(self) -> (u8, u8) {
        match self {
            Self::Internal => (b'<', b'>'),
            Self::External => (b'[', b']'),
        }
    }
}

const ROOT: &str = "\\";

impl NameStyle {
    /// Split an internal name into its components.
    pub fn parse_internal(self, name: &str) -> Result<NameParts<'_>> {
        let parts = self.parse(name, Notation::Internal)?;
        validate(name, &parts)?;
        Ok(parts)
    }

    /// Split an external name into its components.
    pub fn parse_external(self, name: &str) -> Result<NameParts<'_>> {
        if is_rooted(name) {
            return Err(Error::invalid_name(name, "external name can not be rooted"));
        }
        let parts = self.parse(name, Notation::External)?;
        validate(name, &parts)?;
        Ok(parts)
    }

    /// Convert an internal name to its external form.
    pub fn to_external(self, internal: &str) -> Result<String> {
        self.parse_internal(internal)
            .map(|parts| self.format(&parts, Notation::External))
    }

    /// Convert an external name to its internal form.
    pub fn to_internal(self, external: &str) -> Result<String> {
        self.parse_external(external)
            .map(|parts| self.format(&parts, Notation::Internal))
    }

    /// Format components as an internal name.
    pub fn format_internal(self, parts: &NameParts<'_>) -> String {
        self.format(parts, Notation::Internal)
    }

    /// Format components as an external name.
    pub fn format_external(self, parts: &NameParts<'_>) -> String {
        self.format(parts, Notation::External)
    }

    fn parse(self, name: &str, notation: Notation) -> Result<NameParts<'_>> {
        match self {
            Self::CacheBlock => parse_grouped(
                name,
                notation,
                self.colon_root(notation),
                matches!(notation, Notation::External),
            ),
            Self::LoadList => match parse_grouped(name, notation, false, false) {
                Ok(parts) => Ok(parts),
                Err(_) => parse_file_only(name),
            },
        }
    }

    fn colon_root(self, notation: Notation) -> bool {
        matches!((self, notation), (Self::CacheBlock, Notation::Internal))
    }

    fn format(self, parts: &NameParts<'_>, notation: Notation) -> String {
        let (open, close) = notation.brackets();
        let mut out = String::with_capacity(
            parts.group.map_or(0, |g| g.len() + 2) + parts.directory.len() + parts.file.len(),
        );
        if let Some(group) = parts.group {
            out.push(open as char);
            out.push_str(group);
            out.push(close as char);
        }
        if self.colon_root(notation) && parts.directory == ROOT {
            out.push(':');
        } else {
            out.push_str(parts.directory);
        }
        out.push_str(parts.file);
        out
    }
}

/// With `top_level_group` the group spans everything up to the first `\`
/// and must be wrapped in brackets; otherwise it ends at the first closing
/// bracket.
fn parse_grouped(
    name: &str,
    notation: Notation,
    colon_root: bool,
    top_level_group: bool,
) -> Result<NameParts<'_>> {
    let (open, close) = notation.brackets();
    let bytes = name.as_bytes();

    if bytes.first() != Some(&open) {
        return Err(Error::invalid_name(name, "missing resource group prefix"));
    }
    let close_at = if top_level_group {
        let separator = memchr(b'\\', bytes)
            .ok_or_else(|| Error::invalid_name(name, "missing top-level directory"))?;
        if separator < 2 || bytes[separator - 1] != close {
            return Err(Error::invalid_name(
                name,
                "top-level directory must be a bracketed resource group",
            ));
        }
        separator - 1
    } else {
        memchr(close, &bytes[1..])
            .map(|i| i + 1)
            .ok_or_else(|| Error::invalid_name(name, "unterminated resource group"))?
    };
    if close_at == 1 {
        return Err(Error::invalid_name(name, "empty resource group"));
    }
    let group = &name[1..close_at];
    let rest = &name[close_at + 1..];

    let (directory, file) = if colon_root {
        match rest.as_bytes().first() {
            Some(b':') => (ROOT, &rest[1..]),
            Some(b'\\') => {
                let (directory, file) = split_directory(name, rest)?;
                if directory == ROOT {
                    return Err(Error::invalid_name(
                        name,
                        "root directory must be written as ':'",
                    ));
                }
                (directory, file)
            }
            _ => return Err(Error::invalid_name(name, "expected ':' or '\\' after group")),
        }
    } else {
        if rest.as_bytes().first() != Some(&b'\\') {
            return Err(Error::invalid_name(name, "expected '\\' after group"));
        }
        split_directory(name, rest)?
    };

    if file.is_empty() {
        return Err(Error::invalid_name(name, "missing file name"));
    }
    if memchr(b'\\', file.as_bytes()).is_some() {
        return Err(Error::invalid_name(name, "file name contains '\\'"));
    }

    Ok(NameParts {
        group: Some(group),
        directory,
        file,
    })
}

/// Split `\dir\...\file` at its last separator. `rest` starts with `\`.
fn split_directory<'a>(name: &str, rest: &'a str) -> Result<(&'a str, &'a str)> {
    let last = memrchr(b'\\', rest.as_bytes()).unwrap_or(0);
    // A directory is either "\" or "\" + at least one character + "\".
    if last == 1 {
        return Err(Error::invalid_name(name, "empty directory component"));
    }
    Ok((&rest[..=last], &rest[last + 1..]))
}

fn parse_file_only(name: &str) -> Result<NameParts<'_>> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "empty name"));
    }
    if memchr(b'\\', name.as_bytes()).is_some() {
        return Err(Error::invalid_name(
            name,
            "names with directories need a resource group",
        ));
    }
    Ok(NameParts {
        group: None,
        directory: "",
        file: name,
    })
}

fn is_rooted(name: &str) -> bool {
    match name.as_bytes() {
        [b'\\' | b'/', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Characters that may not appear anywhere in a path.
#[inline]
pub fn is_invalid_path_char(c: char) -> bool {
    matches!(c, '\0'..='\x1F' | '"' | '<' | '>' | '|')
}

/// Characters that may not appear in a single path component.
#[inline]
pub fn is_invalid_name_char(c: char) -> bool {
    is_invalid_path_char(c) || matches!(c, '\\' | '/' | ':' | '*' | '?')
}

fn validate(name: &str, parts: &NameParts<'_>) -> Result<()> {
    if parts.group.is_some_and(|g| g.chars().any(is_invalid_name_char)) {
        return Err(Error::invalid_name(name, "invalid character in resource group"));
    }
    if parts.directory.chars().any(is_invalid_path_char) {
        return Err(Error::invalid_name(name, "invalid character in directory"));
    }
    if parts.file.chars().any(is_invalid_name_char) {
        return Err(Error::invalid_name(name, "invalid character in file name"));
    }
    Ok(())
}
