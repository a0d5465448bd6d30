use tpl_core::{DataContext, TemplateValue};

pub fn parse_path(expression: &str) -> Vec<&str> {
    expression
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Resolves a dotted property path. Returns `None` as soon as a segment is
/// missing or an intermediate value is null.
pub fn resolve<'a>(expression: &str, context: &DataContext<'a>) -> Option<&'a TemplateValue> {
    let path = parse_path(expression);
    let (head, rest) = path.split_first()?;
    let mut value = context.lookup(head)?;
    for segment in rest {
        if value.is_null() {
            return None;
        }
        value = value.get(segment)?;
    }
    Some(value)
}
