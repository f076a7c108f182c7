// Tue Oct 13 2026 - Alex

use serde::Serialize;
use std::fmt;

/// Location of a registry entry: a `/`-separated category and a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypePath {
    pub category: String,
    pub name: String,
}

impl TypePath {
    pub fn new(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    /// Last segment of the category, e.g. `std` for `df/std`.
    pub fn category_name(&self) -> &str {
        self.category.rsplit('/').next().unwrap_or(&self.category)
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.category, self.name)
    }
}

/// A reference to a data type as it is placed in a component, a pointer or
/// an array. Composite, enum, typedef and function types live in the
/// registry and are referenced through `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataType {
    Void,
    /// One undefined byte, the pointee of untyped pointers.
    Default,
    Undefined { size: usize },
    Bool,
    Integer { size: usize, signed: bool },
    Float { size: usize },
    Char,
    /// Fixed-length character buffer; its length comes from the component.
    String,
    TerminatedString,
    Pointer { target: Box<DataType> },
    Array { element: Box<DataType>, count: usize },
    Named { path: TypePath },
}

impl DataType {
    pub fn undefined(size: usize) -> Self {
        DataType::Undefined { size }
    }

    pub fn unsigned(size: usize) -> Self {
        DataType::Integer { size, signed: false }
    }

    pub fn signed(size: usize) -> Self {
        DataType::Integer { size, signed: true }
    }

    pub fn float(size: usize) -> Self {
        DataType::Float { size }
    }

    pub fn pointer_to(target: DataType) -> Self {
        DataType::Pointer { target: Box::new(target) }
    }

    pub fn array_of(element: DataType, count: usize) -> Self {
        DataType::Array {
            element: Box::new(element),
            count,
        }
    }

    pub fn named(path: TypePath) -> Self {
        DataType::Named { path }
    }

    pub fn path(&self) -> Option<&TypePath> {
        match self {
            DataType::Named { path } => Some(path),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, DataType::Default | DataType::Undefined { .. })
    }

    pub fn display_name(&self) -> String {
        match self {
            DataType::Void => "void".to_string(),
            DataType::Default => "undefined".to_string(),
            DataType::Undefined { size } => format!("undefined{}", size),
            DataType::Bool => "bool".to_string(),
            DataType::Integer { size, signed } => integer_name(*size, *signed),
            DataType::Float { size: 4 } => "float".to_string(),
            DataType::Float { size: 8 } => "double".to_string(),
            DataType::Float { size } => format!("float{}", size),
            DataType::Char => "char".to_string(),
            DataType::String => "string".to_string(),
            DataType::TerminatedString => "TerminatedCString".to_string(),
            DataType::Pointer { target } => format!("{} *", target.display_name()),
            DataType::Array { element, count } => format!("{}[{}]", element.display_name(), count),
            DataType::Named { path } => path.name.clone(),
        }
    }
}

fn integer_name(size: usize, signed: bool) -> String {
    let base = match size {
        1 => "byte",
        2 => "short",
        4 => "int",
        8 => "longlong",
        _ => return format!("{}int{}", if signed { "" } else { "u" }, size * 8),
    };
    match (size, signed) {
        (1, true) => "sbyte".to_string(),
        (1, false) => base.to_string(),
        (_, true) => base.to_string(),
        (_, false) => format!("u{}", base),
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let unit = DataType::named(TypePath::new("df", "unit"));
        assert_eq!(DataType::pointer_to(unit.clone()).display_name(), "unit *");
        assert_eq!(DataType::array_of(unit, 4).display_name(), "unit[4]");
        assert_eq!(DataType::unsigned(4).display_name(), "uint");
        assert_eq!(DataType::signed(1).display_name(), "sbyte");
        assert_eq!(DataType::unsigned(8).display_name(), "ulonglong");
        assert_eq!(DataType::pointer_to(DataType::Default).display_name(), "undefined *");
    }

    #[test]
    fn test_category_name() {
        assert_eq!(TypePath::new("df/vtables/methods", "x").category_name(), "methods");
        assert_eq!(TypePath::new("df", "x").category_name(), "df");
    }
}
