use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// Malformed loop markers.
    Syntax,
    /// Data context does not fit what the template asks of it.
    Data,
    Xml,
    Internal,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct TemplateError {
    pub kind: TemplateErrorKind,
    pub code: String,
    pub message: String,
}

impl TemplateError {
    pub fn new(
        kind: TemplateErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn syntax(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Syntax, code, message)
    }

    pub fn data(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Data, code, message)
    }

    pub fn xml(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Xml, code, message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Internal, code, message)
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == TemplateErrorKind::Syntax
    }

    pub fn is_data(&self) -> bool {
        self.kind == TemplateErrorKind::Data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let error = TemplateError::data("TEMPLATE_ITERABLE_MISSING", "Missing iterable (rows).");
        assert_eq!(
            error.to_string(),
            "TEMPLATE_ITERABLE_MISSING: Missing iterable (rows)."
        );
        assert!(error.is_data());
        assert!(!error.is_syntax());
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(
            TemplateError::syntax("A", "a").kind,
            TemplateErrorKind::Syntax
        );
        assert_eq!(TemplateError::xml("B", "b").kind, TemplateErrorKind::Xml);
        assert_eq!(
            TemplateError::internal("C", "c").kind,
            TemplateErrorKind::Internal
        );
    }
}
