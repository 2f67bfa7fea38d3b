//! Command catalog: named configuration templates and show queries.
//!
//! A catalog is plain data. Templates carry `{placeholder}` text that is
//! filled in right before they are applied; nothing here talks to a device.
//!
//! # Example
//!
//! ```rust
//! use ferrisconf::catalog;
//!
//! let catalog = catalog::cisco_ios();
//! let ospf = catalog.template("ospf").unwrap();
//! assert_eq!(ospf.parameters(), vec!["process_id", "network", "wildcard", "area"]);
//! ```

mod cisco_ios;
mod template;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use cisco_ios::catalog as cisco_ios;
pub use template::{Query, Template, TemplateStep};

use crate::error::{Result, TemplateError};

/// Named templates and queries for one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCatalog {
    templates: IndexMap<String, Template>,
    queries: IndexMap<String, Query>,
}

impl CommandCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing one with the same name.
    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.insert(template.name.clone(), template);
        self
    }

    /// Add a query, replacing one with the same name.
    pub fn with_query(mut self, query: Query) -> Self {
        self.queries.insert(query.name.clone(), query);
        self
    }

    /// Look up a template by name.
    pub fn template(&self, name: &str) -> Result<&Template> {
        self.templates.get(name).ok_or_else(|| {
            TemplateError::UnknownTemplate {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Look up a query by name.
    pub fn query(&self, name: &str) -> Result<&Query> {
        self.queries.get(name).ok_or_else(|| {
            TemplateError::UnknownTemplate {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Template names in registration order.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Query names in registration order.
    pub fn query_names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }
}
