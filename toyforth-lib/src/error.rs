//! Ties the error types of the stages together and renders them for humans

use crate::parser::ParseError;
use crate::value::Span;
use crate::vm;
use pest::error::{Error as PestError, ErrorVariant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] vm::Error),
}

impl Error {
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Parse(e) => Some(e.span()),
            Error::Runtime(e) => e.span(),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Error::Parse(e) if e.is_recoverable() => "Warning",
            Error::Parse(_) => "Parse error",
            Error::Runtime(_) => "Runtime error",
        }
    }

    /// renders the error with an excerpt of `src`, `path` is only used for the location line
    pub fn render(&self, src: &str, path: Option<&str>) -> String {
        render(self.heading(), &self.to_string(), self.span(), src, path)
    }
}

/// Formats `message` below a pointer into `src`. Falls back to the bare message if there
/// is no span, or if it doesn't fit the source.
pub fn render(
    heading: &str,
    message: &str,
    span: Option<Span>,
    src: &str,
    path: Option<&str>,
) -> String {
    let Some(pest_span) = span.and_then(|s| pest::Span::new(src, s.start, s.end)) else {
        return format!("{}: {}", heading, message);
    };
    let mut err = PestError::<()>::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pest_span,
    );
    if let Some(path) = path {
        err = err.with_path(path);
    }
    format!("{}: {}", heading, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;

    #[test]
    fn render_points_at_the_span() {
        let src = "1 2\n3 foo +\n";
        let err = Error::from(vm::Error::UnrecognizedSymbol {
            name: "foo".into(),
            span: Span::new(6, 9),
        });
        let rendered = err.render(src, Some("test.tf"));
        assert!(rendered.starts_with("Runtime error: "));
        assert!(rendered.contains("test.tf:2:3"), "{rendered}");
        assert!(rendered.contains("3 foo +"), "{rendered}");
        assert!(rendered.contains("unrecognized symbol `foo`"), "{rendered}");
    }

    #[test]
    fn headings() {
        let warning = Error::from(ParseError::MalformedNumber {
            token: "1x".into(),
            span: Span::new(0, 2),
        });
        assert_eq!(warning.heading(), "Warning");
        let fatal = Error::from(compile("[1").unwrap_err());
        assert_eq!(fatal.heading(), "Parse error");
    }

    #[test]
    fn render_without_span() {
        let err = Error::from(vm::Error::Io(std::io::ErrorKind::BrokenPipe.into()));
        assert_eq!(err.render("", None), format!("Runtime error: {}", err));
    }
}
