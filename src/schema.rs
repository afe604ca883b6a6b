//! Catalog of the MediaWiki tables whose dumps we know how to read.
//!
//! Column lists follow the MediaWiki database layout:
//!
//! - <https://www.mediawiki.org/wiki/Manual:Category_table>
//! - <https://www.mediawiki.org/wiki/Manual:Redirect_table>
//! - <https://www.mediawiki.org/wiki/Manual:Page_props_table>
//! - <https://www.mediawiki.org/wiki/Manual:Page_table>
//! - <https://www.mediawiki.org/wiki/Manual:Categorylinks_table>
//! - <https://www.mediawiki.org/wiki/Manual:Pagelinks_table>

use crate::column::ColumnDescriptor;
use crate::error::ConfigError;
use crate::patterns::ValuePattern;
use std::fmt;
use std::str::FromStr;

const DIGITS: ValuePattern = ValuePattern::digits();
const QUOTED_DIGITS: ValuePattern = ValuePattern::quoted_digits();
const FLOAT: ValuePattern = ValuePattern::float_literal();
const ESCAPED: ValuePattern = ValuePattern::escaped_string();
const ANY_QUOTED: ValuePattern = ValuePattern::any_quoted();
const TIMESTAMP: ValuePattern = ValuePattern::timestamp();
const CL_TYPE: ValuePattern = ValuePattern::quoted_enum(&["page", "subcat", "file"]);

const CATEGORY: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("cat_id", DIGITS),
    ColumnDescriptor::new("cat_title", ESCAPED).text(),
    ColumnDescriptor::new("cat_pages", DIGITS),
    ColumnDescriptor::new("cat_subcats", DIGITS),
    ColumnDescriptor::new("cat_files", DIGITS),
];

const REDIRECT: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("rd_from", DIGITS),
    ColumnDescriptor::new("rd_namespace", DIGITS),
    ColumnDescriptor::new("rd_title", ESCAPED).text(),
    ColumnDescriptor::new("rd_interwiki", ESCAPED).nullable().text(),
    ColumnDescriptor::new("rd_fragment", ESCAPED).nullable().text(),
];

const PAGE_PROPS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("pp_page", DIGITS),
    ColumnDescriptor::new("pp_propname", ANY_QUOTED).unquoted(),
    ColumnDescriptor::new("pp_value", ESCAPED).text(),
    ColumnDescriptor::new("pp_sortkey", DIGITS).nullable(),
];

const PAGE: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("page_id", DIGITS),
    ColumnDescriptor::new("page_namespace", DIGITS),
    ColumnDescriptor::new("page_title", ESCAPED).text(),
    ColumnDescriptor::new("page_restrictions", ESCAPED).text(),
    ColumnDescriptor::new("page_is_redirect", DIGITS),
    ColumnDescriptor::new("page_is_new", DIGITS),
    ColumnDescriptor::new("page_random", FLOAT),
    ColumnDescriptor::new("page_touched", QUOTED_DIGITS).unquoted(),
    ColumnDescriptor::new("page_links_updated", QUOTED_DIGITS)
        .nullable()
        .unquoted(),
    ColumnDescriptor::new("page_latest", DIGITS),
    ColumnDescriptor::new("page_len", DIGITS),
    ColumnDescriptor::new("page_content_model", ESCAPED)
        .nullable()
        .text(),
    ColumnDescriptor::new("page_lang", ESCAPED).nullable().text(),
];

const CATEGORYLINKS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("cl_from", DIGITS),
    ColumnDescriptor::new("cl_to", ESCAPED).text(),
    // binary collation key, passed through untouched
    ColumnDescriptor::new("cl_sortkey", ANY_QUOTED),
    ColumnDescriptor::new("cl_timestamp", TIMESTAMP).unquoted(),
    ColumnDescriptor::new("cl_sortkey_prefix", ESCAPED).text(),
    ColumnDescriptor::new("cl_collation", ESCAPED).text(),
    ColumnDescriptor::new("cl_type", CL_TYPE).unquoted(),
];

const PAGELINKS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("pl_from", DIGITS),
    ColumnDescriptor::new("pl_namespace", DIGITS),
    ColumnDescriptor::new("pl_title", ESCAPED).text(),
    ColumnDescriptor::new("pl_from_namespace", DIGITS),
];

/// Every table with a known dump grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Category,
    Redirect,
    PageProps,
    Page,
    CategoryLinks,
    PageLinks,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Category,
        Table::Redirect,
        Table::PageProps,
        Table::Page,
        Table::CategoryLinks,
        Table::PageLinks,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Table::Category => "category",
            Table::Redirect => "redirect",
            Table::PageProps => "page_props",
            Table::Page => "page",
            Table::CategoryLinks => "categorylinks",
            Table::PageLinks => "pagelinks",
        }
    }

    pub const fn schema(self) -> TableSchema {
        let columns = match self {
            Table::Category => CATEGORY,
            Table::Redirect => REDIRECT,
            Table::PageProps => PAGE_PROPS,
            Table::Page => PAGE,
            Table::CategoryLinks => CATEGORYLINKS,
            Table::PageLinks => PAGELINKS,
        };
        TableSchema {
            table: self,
            columns,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ConfigError::UnknownTable(s.to_string()))
    }
}

/// Ordered column layout of one table, as it appears in each dumped row-tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: Table,
    pub columns: &'static [ColumnDescriptor],
}

impl TableSchema {
    pub fn table_name(&self) -> &'static str {
        self.table.name()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn position(&self, column_name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column_name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub fn lookup(table_name: &str) -> Result<TableSchema, ConfigError> {
    table_name.parse::<Table>().map(Table::schema)
}

pub fn known_table_names() -> Vec<&'static str> {
    Table::ALL.iter().map(|t| t.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn lookup_known_tables() {
        for name in known_table_names() {
            let schema = lookup(name).unwrap();
            assert_eq!(schema.table_name(), name);
            assert!(!schema.is_empty());
        }
    }

    #[test]
    fn lookup_unknown_table_fails() {
        let err = lookup("revision").unwrap_err();
        assert_eq!(err, ConfigError::UnknownTable("revision".to_string()));
        assert!(err.to_string().contains("revision"));
        assert!(err.to_string().contains("pagelinks"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("Category").is_err());
    }

    #[test]
    fn column_names_unique_within_each_table() {
        for table in Table::ALL {
            let names = table.schema().column_names();
            let unique: FxHashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "{table}");
        }
    }

    #[test]
    fn column_names_are_identifiers() {
        for table in Table::ALL {
            for column in table.schema().columns {
                assert!(column
                    .name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_'));
            }
        }
    }

    #[test]
    fn category_layout() {
        let schema = Table::Category.schema();
        assert_eq!(
            schema.column_names(),
            vec!["cat_id", "cat_title", "cat_pages", "cat_subcats", "cat_files"]
        );
        assert_eq!(schema.position("cat_pages"), Some(2));
        assert_eq!(schema.position("nope"), None);
    }

    #[test]
    fn page_arity() {
        assert_eq!(Table::Page.schema().len(), 13);
        assert_eq!(Table::CategoryLinks.schema().len(), 7);
    }

    #[test]
    fn table_display_roundtrip() {
        for table in Table::ALL {
            assert_eq!(table.to_string().parse::<Table>().unwrap(), table);
        }
    }

    #[test]
    fn indices_follow_catalog_order() {
        for (i, table) in Table::ALL.iter().enumerate() {
            assert_eq!(table.index(), i);
        }
    }
}
