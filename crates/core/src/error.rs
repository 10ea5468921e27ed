//! Error types for Atlas.

use crate::types::DataType;
use alloc::string::String;
use core::fmt;

/// Result type alias for Atlas operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A name (table, column, association, projection, index) does not
    /// resolve.
    Schema,
    /// Columns of a table disagree on length, or a link points past the
    /// associated table.
    Shape,
    /// A value, literal or predicate node has the wrong type.
    Type,
}

/// Error types for Atlas operations.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Column not found.
    ColumnNotFound { column: String },
    /// Two columns of one table share a name.
    DuplicateColumn { column: String },
    /// Column length differs from the table's row count.
    ShapeMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
    /// Type mismatch error.
    TypeMismatch {
        context: String,
        expected: DataType,
        got: DataType,
    },
    /// The column type has no ordering usable as an index key.
    NotOrderable { column: String, data_type: DataType },
    /// The requested index representation cannot hold keys of this type.
    UnsupportedRepresentation {
        column: String,
        data_type: DataType,
        representation: &'static str,
    },
    /// A predicate node is not a boolean expression or has malformed operands.
    InvalidPredicate { message: String },
    /// An index registry was used with a table it was not built over.
    IndexMismatch { message: String },
    /// No table is registered under this name.
    TableNotFound { table: String },
    /// A table is already registered under this name.
    DuplicateTable { table: String },
    /// The table has no association with this name.
    AssociationNotFound { association: String },
    /// An association link points past the rows of the associated table.
    DanglingAssociation {
        target: String,
        row: usize,
        position: usize,
        target_rows: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ColumnNotFound { column } => write!(f, "Column not found: {}", column),
            Error::DuplicateColumn { column } => write!(f, "Duplicate column name: {}", column),
            Error::ShapeMismatch {
                column,
                expected,
                got,
            } => write!(
                f,
                "Column {} has {} rows but the table has {}",
                column, got, expected
            ),
            Error::TypeMismatch {
                context,
                expected,
                got,
            } => write!(
                f,
                "Type mismatch in {}: expected {}, got {}",
                context, expected, got
            ),
            Error::NotOrderable { column, data_type } => {
                write!(f, "Column {} of type {} cannot be indexed", column, data_type)
            }
            Error::UnsupportedRepresentation {
                column,
                data_type,
                representation,
            } => write!(
                f,
                "Column {} of type {} has no {} index representation",
                column, data_type, representation
            ),
            Error::InvalidPredicate { message } => write!(f, "Invalid predicate: {}", message),
            Error::IndexMismatch { message } => write!(f, "Index mismatch: {}", message),
            Error::TableNotFound { table } => write!(f, "Table not found: {}", table),
            Error::DuplicateTable { table } => write!(f, "Duplicate table name: {}", table),
            Error::AssociationNotFound { association } => {
                write!(f, "Association not found: {}", association)
            }
            Error::DanglingAssociation {
                target,
                row,
                position,
                target_rows,
            } => write!(
                f,
                "Row {} is associated with row {} of {}, which has {} rows",
                row, position, target, target_rows
            ),
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ColumnNotFound { .. }
            | Error::DuplicateColumn { .. }
            | Error::IndexMismatch { .. }
            | Error::TableNotFound { .. }
            | Error::DuplicateTable { .. }
            | Error::AssociationNotFound { .. } => ErrorKind::Schema,
            Error::ShapeMismatch { .. } | Error::DanglingAssociation { .. } => ErrorKind::Shape,
            Error::TypeMismatch { .. }
            | Error::NotOrderable { .. }
            | Error::UnsupportedRepresentation { .. }
            | Error::InvalidPredicate { .. } => ErrorKind::Type,
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a duplicate column error.
    pub fn duplicate_column(column: impl Into<String>) -> Self {
        Error::DuplicateColumn {
            column: column.into(),
        }
    }

    /// Creates a shape mismatch error.
    pub fn shape_mismatch(column: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ShapeMismatch {
            column: column.into(),
            expected,
            got,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(context: impl Into<String>, expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch {
            context: context.into(),
            expected,
            got,
        }
    }

    /// Creates a not orderable error.
    pub fn not_orderable(column: impl Into<String>, data_type: DataType) -> Self {
        Error::NotOrderable {
            column: column.into(),
            data_type,
        }
    }

    /// Creates an unsupported representation error.
    pub fn unsupported_representation(
        column: impl Into<String>,
        data_type: DataType,
        representation: &'static str,
    ) -> Self {
        Error::UnsupportedRepresentation {
            column: column.into(),
            data_type,
            representation,
        }
    }

    /// Creates an invalid predicate error.
    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Error::InvalidPredicate {
            message: message.into(),
        }
    }

    /// Creates an index mismatch error.
    pub fn index_mismatch(message: impl Into<String>) -> Self {
        Error::IndexMismatch {
            message: message.into(),
        }
    }

    pub fn table_not_found(table: impl Into<String>) -> Self {
        Error::TableNotFound {
            table: table.into(),
        }
    }

    pub fn duplicate_table(table: impl Into<String>) -> Self {
        Error::DuplicateTable {
            table: table.into(),
        }
    }

    pub fn association_not_found(association: impl Into<String>) -> Self {
        Error::AssociationNotFound {
            association: association.into(),
        }
    }

    /// Creates a dangling association error for the link from `row` to
    /// `position` of `target`.
    pub fn dangling_association(
        target: impl Into<String>,
        row: usize,
        position: usize,
        target_rows: usize,
    ) -> Self {
        Error::DanglingAssociation {
            target: target.into(),
            row,
            position,
            target_rows,
        }
    }
}
