//! Snapshots of request and process state for `Logger::request`.

use std::collections::BTreeMap;
use std::env;

use crate::error::{new_error, ErrorKind, Result};

pub type Section = BTreeMap<String, String>;

/// The state a request handler wants to be able to dump into a log file.
///
/// Sections are selected with the letters of `SGPFRNEC`, the order of which
/// follows PHP's `variables_order`:
///
/// | letter | section   |
/// |--------|-----------|
/// | `S`    | server    |
/// | `G`    | get       |
/// | `P`    | post      |
/// | `F`    | files     |
/// | `R`    | request   |
/// | `N`    | session   |
/// | `E`    | env       |
/// | `C`    | cookie    |
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestContext {
    pub server:  Option<Section>,
    pub get:     Option<Section>,
    pub post:    Option<Section>,
    pub files:   Option<Section>,
    pub request: Option<Section>,
    pub session: Option<Section>,
    pub env:     Option<Section>,
    pub cookie:  Option<Section>,
}

impl RequestContext {
    /// A context carrying only the current process environment.
    pub fn from_env() -> Self {
        Self {
            env: Some(env::vars().collect()),
            ..Default::default()
        }
    }

    /// Renders the selected sections in selector order, one `$_NAME = ...`
    /// dump per letter.
    pub fn render(&self, selector: &str, endl: &str) -> Result<Vec<String>> {
        selector
            .chars()
            .map(|letter| {
                let (name, section) = self.section(letter)?;

                let dump = match section {
                    Some(s) => print_section(s, endl),
                    // a request without a session is normal, everything else must be supplied
                    None if letter == 'N' => format!("undefined{}", endl),
                    None => return Err(new_error(ErrorKind::MissingSection(name))),
                };

                Ok(format!("{} = {}", name, dump))
            })
            .collect()
    }

    fn section(&self, letter: char) -> Result<(&'static str, Option<&Section>)> {
        let found = match letter {
            'S' => ("$_SERVER", self.server.as_ref()),
            'G' => ("$_GET", self.get.as_ref()),
            'P' => ("$_POST", self.post.as_ref()),
            'F' => ("$_FILES", self.files.as_ref()),
            'R' => ("$_REQUEST", self.request.as_ref()),
            'N' => ("$_SESSION", self.session.as_ref()),
            'E' => ("$_ENV", self.env.as_ref()),
            'C' => ("$_COOKIE", self.cookie.as_ref()),
            other => return Err(new_error(ErrorKind::UnknownSelector(other))),
        };

        Ok(found)
    }
}

// print_r layout, so dumps read the same as the ones PHP applications already produce
fn print_section(section: &Section, endl: &str) -> String {
    let mut out = format!("Array{}({}", endl, endl);

    for (key, value) in section {
        out.push_str(&format!("    [{}] => {}{}", key, value.replace('\n', endl), endl));
    }

    out.push(')');
    out.push_str(endl);

    out
}

#[cfg(test)]
mod tests {
    use super::{RequestContext, Section};
    use crate::error::ErrorKind;

    fn section(pairs: &[(&str, &str)]) -> Section {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_order() {
        let context = RequestContext {
            server: Some(section(&[("HTTP_HOST", "example.org")])),
            get: Some(section(&[("page", "2"), ("id", "7")])),
            ..Default::default()
        };

        let dumps = context.render("GS", "\n").expect("both sections present");

        assert_eq!(
            dumps,
            vec![
                "$_GET = Array\n(\n    [id] => 7\n    [page] => 2\n)\n".to_string(),
                "$_SERVER = Array\n(\n    [HTTP_HOST] => example.org\n)\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_session_is_undefined() {
        let dumps = RequestContext::default().render("N", "\n").unwrap();

        assert_eq!(dumps, vec!["$_SESSION = undefined\n".to_string()]);
    }

    #[test]
    fn test_selector_errors() {
        let context = RequestContext::default();

        match context.render("X", "\n").unwrap_err().into_kind() {
            ErrorKind::UnknownSelector(c) => assert_eq!(c, 'X'),
            other => panic!("unexpected error {:?}", other),
        }

        match context.render("P", "\n").unwrap_err().into_kind() {
            ErrorKind::MissingSection(name) => assert_eq!(name, "$_POST"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
