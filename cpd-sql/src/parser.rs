//! Splits a query template into literal text and `%` placeholders.
//!
//! The grammar is small: `%s`, `%d` and `%f` optionally carrying a one based
//! argument index (`%2$s`), `%%` for a literal percent sign, and everything
//! else passed through as literal text, stray `%` signs included.

use crate::types::Position;

use nom::{branch::alt,
          bytes::complete::{tag, take_till1},
          character::complete::{digit1, one_of},
          combinator::opt,
          multi::many0,
          sequence::terminated,
          IResult};

use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

/// How a placeholder renders its value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Conversion {
    /// `%s`: text run through the engine escaper.
    Str,
    /// `%d`: integer coercion.
    Int,
    /// `%f`: float coercion, shortest text that reads back to the same value.
    Float,
}

/// Which value a placeholder takes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Argument {
    /// The next value of the sequential cursor.
    Next,
    /// A one based index as written in the template.
    Index(usize),
    /// `%0$s`, or an index too large for `usize`.
    Invalid,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub argument:   Argument,
    pub conversion: Conversion,
    pub position:   Position,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fragment<'a> {
    Literal(&'a str),
    /// `%%`
    Percent,
    Placeholder(Placeholder),
}

pub fn literal(span: Span) -> IResult<Span, Fragment> {
    let (span, text) = take_till1(|c: char| c == '%')(span)?;

    Ok((span, Fragment::Literal(text.fragment)))
}

pub fn percent(span: Span) -> IResult<Span, Fragment> {
    let (span, _) = tag("%%")(span)?;

    Ok((span, Fragment::Percent))
}

pub fn argument(span: Span) -> IResult<Span, Argument> {
    let (span, index) = opt(terminated(digit1, tag("$")))(span)?;

    let argument = match index {
        None => Argument::Next,
        Some(digits) => match digits.fragment.parse::<usize>() {
            Ok(0) | Err(_) => Argument::Invalid,
            Ok(i) => Argument::Index(i),
        },
    };

    Ok((span, argument))
}

pub fn conversion(span: Span) -> IResult<Span, Conversion> {
    let (span, c) = one_of("sdf")(span)?;

    let conversion = match c {
        's' => Conversion::Str,
        'd' => Conversion::Int,
        _ => Conversion::Float,
    };

    Ok((span, conversion))
}

pub fn placeholder(span: Span) -> IResult<Span, Fragment> {
    let (rest, _) = tag("%")(span)?;
    let (rest, argument) = argument(rest)?;
    let (rest, conversion) = conversion(rest)?;

    Ok((
        rest,
        Fragment::Placeholder(Placeholder {
            argument,
            conversion,
            position: span.into(),
        }),
    ))
}

/// A `%` that starts nothing the formatter knows is kept as text.
pub fn stray_percent(span: Span) -> IResult<Span, Fragment> {
    let (span, p) = tag("%")(span)?;

    Ok((span, Fragment::Literal(p.fragment)))
}

pub fn fragment(span: Span) -> IResult<Span, Fragment> {
    alt((literal, percent, placeholder, stray_percent))(span)
}

/// Scans a whole template. Every byte of the input ends up in exactly one
/// fragment, so concatenating the literal texts of a template without
/// placeholders gives the template back.
pub fn scan(template: &str) -> Vec<Fragment> {
    match many0(fragment)(Span::new(template)) {
        Ok((_, fragments)) => fragments,
        // every input starts one of the alternatives, so many0 only stops at
        // the end of the input
        Err(_) => vec![Fragment::Literal(template)],
    }
}

#[cfg(test)]
mod tests {
    use super::{argument, placeholder, scan, Argument, Conversion, Fragment, Placeholder, Span};
    use crate::types::Position;

    fn at(offset: usize, line: u32, argument: Argument, conversion: Conversion) -> Fragment<'static> {
        Fragment::Placeholder(Placeholder {
            argument,
            conversion,
            position: Position::new(offset, line),
        })
    }

    #[test]
    fn test_scan_sequential() {
        assert_eq!(
            scan("SELECT * FROM `t` WHERE `a` = '%s' AND `b` = %d"),
            vec![
                Fragment::Literal("SELECT * FROM `t` WHERE `a` = '"),
                at(31, 1, Argument::Next, Conversion::Str),
                Fragment::Literal("' AND `b` = "),
                at(45, 1, Argument::Next, Conversion::Int),
            ]
        );
    }

    #[test]
    fn test_scan_positional_and_lines() {
        assert_eq!(
            scan("a\n%2$f%1$s"),
            vec![
                Fragment::Literal("a\n"),
                at(2, 2, Argument::Index(2), Conversion::Float),
                at(6, 2, Argument::Index(1), Conversion::Str),
            ]
        );
    }

    #[test]
    fn test_scan_percent_and_strays() {
        assert_eq!(
            scan("100%% %%s %x %5s %"),
            vec![
                Fragment::Literal("100"),
                Fragment::Percent,
                Fragment::Literal(" "),
                Fragment::Percent,
                Fragment::Literal("s "),
                Fragment::Literal("%"),
                Fragment::Literal("x "),
                Fragment::Literal("%"),
                Fragment::Literal("5s "),
                Fragment::Literal("%"),
            ]
        );
    }

    #[test]
    fn test_scan_empty() {
        assert_eq!(scan(""), vec![]);
    }

    #[test]
    fn test_argument() {
        let (_, a) = argument(Span::new("3$s")).expect("argument");
        assert_eq!(a, Argument::Index(3));

        let (rest, a) = argument(Span::new("3s")).expect("argument");
        assert_eq!(a, Argument::Next);
        assert_eq!(rest.fragment, "3s");

        let (_, a) = argument(Span::new("0$d")).expect("argument");
        assert_eq!(a, Argument::Invalid);

        let (_, a) = argument(Span::new("99999999999999999999999$d")).expect("argument");
        assert_eq!(a, Argument::Invalid);
    }

    #[test]
    fn test_placeholder_rejects_unknown_conversion() {
        assert!(placeholder(Span::new("%x")).is_err());
        assert!(placeholder(Span::new("%1$x")).is_err());
    }
}
