//! Collection tables and the statements that provision them.
//!
//! A collection named `docs` is stored in a table named `c$v1docs` with exactly four
//! columns: `_id`, `document`, `embedding` and `metadata`. The naming and schema must
//! stay stable so existing stores remain readable.

use crate::client::Dialect;
use crate::errors::ValidationError;

/// Prefix shared by every collection table.
pub const COLLECTION_TABLE_PREFIX: &str = "c$v1";

/// Column names of a collection table, in creation order.
pub const COLLECTION_COLUMNS: [&str; 4] = ["_id", "document", "embedding", "metadata"];

/// A created collection. The table's state lives in the backend; this is only a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
    dimension: u32,
}

impl Collection {
    pub(crate) fn new(name: String, dimension: u32) -> Self {
        Collection { name, dimension }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn table_name(&self) -> String {
        collection_table_name(&self.name)
    }
}

pub fn collection_table_name(name: &str) -> String {
    format!("{COLLECTION_TABLE_PREFIX}{name}")
}

/// Inverse of [`collection_table_name`]; `None` for tables that are not collections.
pub fn collection_name_from_table(table: &str) -> Option<&str> {
    table
        .strip_prefix(COLLECTION_TABLE_PREFIX)
        .filter(|name| !name.is_empty())
}

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub(crate) fn validate_collection(name: &str, dimension: u32) -> Result<(), ValidationError> {
    validate_name(name)?;
    if dimension == 0 {
        return Err(ValidationError::InvalidDimension(dimension));
    }
    Ok(())
}

//////////////////////// Statements ////////////////////////

pub(crate) fn quote_identifier(dialect: Dialect, identifier: &str) -> String {
    let quote = match dialect {
        Dialect::MySql => '`',
        Dialect::Sqlite => '"',
    };
    let mut quoted = String::with_capacity(identifier.len() + 2);
    quoted.push(quote);
    for c in identifier.chars() {
        if c == quote {
            quoted.push(quote);
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

pub(crate) fn quote_literal(dialect: Dialect, value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' if dialect == Dialect::MySql => quoted.push_str("\\\\"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

pub(crate) fn create_table_sql(dialect: Dialect, name: &str, dimension: u32) -> String {
    let table = quote_identifier(dialect, &collection_table_name(name));
    match dialect {
        Dialect::MySql => format!(
            "CREATE TABLE {table} (\
             _id VARBINARY(512) PRIMARY KEY NOT NULL, \
             document LONGTEXT, \
             embedding VECTOR({dimension}), \
             metadata JSON)"
        ),
        // Embeddings are packed little-endian f32, so the blob length pins the dimension.
        Dialect::Sqlite => format!(
            "CREATE TABLE {table} (\
             _id BLOB PRIMARY KEY NOT NULL, \
             document TEXT, \
             embedding BLOB CHECK (embedding IS NULL OR length(embedding) = {}), \
             metadata TEXT CHECK (metadata IS NULL OR json_valid(metadata)))",
            u64::from(dimension) * 4
        ),
    }
}

pub(crate) fn drop_table_sql(dialect: Dialect, name: &str) -> String {
    format!(
        "DROP TABLE {}",
        quote_identifier(dialect, &collection_table_name(name))
    )
}

pub(crate) fn has_table_sql(dialect: Dialect, name: &str) -> String {
    let table = quote_literal(dialect, &collection_table_name(name));
    match dialect {
        Dialect::MySql => format!(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {table}"
        ),
        Dialect::Sqlite => {
            format!("SELECT name FROM sqlite_master WHERE type = 'table' AND name = {table}")
        }
    }
}

pub(crate) fn list_tables_sql(dialect: Dialect) -> String {
    let pattern = quote_literal(dialect, &format!("{COLLECTION_TABLE_PREFIX}%"));
    match dialect {
        Dialect::MySql => format!(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME LIKE {pattern} \
             ORDER BY TABLE_NAME"
        ),
        Dialect::Sqlite => format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE {pattern} \
             ORDER BY name"
        ),
    }
}

/// Statement listing a collection table's columns, and the row position holding the name.
pub(crate) fn describe_table_sql(dialect: Dialect, name: &str) -> (String, usize) {
    let table = quote_identifier(dialect, &collection_table_name(name));
    match dialect {
        Dialect::MySql => (format!("DESCRIBE {table}"), 0),
        // table_info rows are (cid, name, type, notnull, dflt_value, pk).
        Dialect::Sqlite => (format!("PRAGMA table_info({table})"), 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_round_trip() {
        assert_eq!(collection_table_name("foo"), "c$v1foo");
        assert_eq!(collection_name_from_table("c$v1foo"), Some("foo"));
        assert_eq!(collection_name_from_table("c$v1"), None);
        assert_eq!(collection_name_from_table("migrations"), None);
    }

    #[test]
    fn test_validation() {
        assert_eq!(validate_collection("", 128), Err(ValidationError::EmptyName));
        assert_eq!(
            validate_collection("foo", 0),
            Err(ValidationError::InvalidDimension(0))
        );
        assert_eq!(validate_collection("foo", 128), Ok(()));
    }

    #[test]
    fn test_mysql_create_table() {
        assert_eq!(
            create_table_sql(Dialect::MySql, "foo", 128),
            "CREATE TABLE `c$v1foo` (_id VARBINARY(512) PRIMARY KEY NOT NULL, \
             document LONGTEXT, embedding VECTOR(128), metadata JSON)"
        );
    }

    #[test]
    fn test_sqlite_create_table_pins_dimension() {
        let sql = create_table_sql(Dialect::Sqlite, "foo", 3);
        assert!(sql.starts_with("CREATE TABLE \"c$v1foo\" ("));
        assert!(sql.contains("length(embedding) = 12"));
        for column in COLLECTION_COLUMNS {
            assert!(sql.contains(column));
        }
    }

    #[test]
    fn test_quoting_escapes() {
        assert_eq!(quote_identifier(Dialect::MySql, "a`b"), "`a``b`");
        assert_eq!(quote_identifier(Dialect::Sqlite, "a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal(Dialect::MySql, r"it's\"), r"'it''s\\'");
        assert_eq!(quote_literal(Dialect::Sqlite, r"it's\"), r"'it''s\'");
    }

    #[test]
    fn test_describe_statements() {
        assert_eq!(
            describe_table_sql(Dialect::MySql, "foo"),
            ("DESCRIBE `c$v1foo`".to_string(), 0)
        );
        assert_eq!(
            describe_table_sql(Dialect::Sqlite, "foo"),
            ("PRAGMA table_info(\"c$v1foo\")".to_string(), 1)
        );
    }
}
