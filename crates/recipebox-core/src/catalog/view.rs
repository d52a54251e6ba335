//! Search, sort and grouping over a decoded catalog.
//!
//! These never mutate the catalog; they hand back borrowed rows in the
//! order a list should display them.

use std::collections::BTreeMap;

use super::Catalog;
use crate::models::Recipe;
use crate::utils::{cmp_ignore_case, contains_ignore_case};

// Sorting options for the recipe list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NameAscending,
    NameDescending,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "Name (A-Z)",
            SortOrder::NameDescending => "Name (Z-A)",
        }
    }
}

/// Recipes grouped into sections keyed by cuisine, sections in key order.
pub type CuisineSections<'a> = BTreeMap<&'a str, Vec<&'a Recipe>>;

fn matches_search(recipe: &Recipe, query_lower: &str) -> bool {
    contains_ignore_case(&recipe.name, query_lower)
        || contains_ignore_case(&recipe.cuisine, query_lower)
}

impl Catalog {
    /// Recipes whose name or cuisine contains `query`, case-insensitive.
    /// An empty (or all-whitespace) query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Recipe> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.iter().collect();
        }
        self.iter().filter(|r| matches_search(r, &query)).collect()
    }

    /// All recipes in the given order. Ties keep catalog order.
    pub fn sorted(&self, order: SortOrder) -> Vec<&Recipe> {
        let mut rows: Vec<&Recipe> = self.iter().collect();
        sort_rows(&mut rows, order);
        rows
    }

    /// Filter, sort, then bucket by cuisine.
    pub fn grouped(&self, query: &str, order: SortOrder) -> CuisineSections<'_> {
        let mut rows = self.search(query);
        sort_rows(&mut rows, order);

        let mut sections: CuisineSections<'_> = BTreeMap::new();
        for recipe in rows {
            sections.entry(recipe.cuisine.as_str()).or_default().push(recipe);
        }
        sections
    }
}

fn sort_rows(rows: &mut [&Recipe], order: SortOrder) {
    rows.sort_by(|a, b| {
        let cmp = cmp_ignore_case(&a.name, &b.name);
        match order {
            SortOrder::NameAscending => cmp,
            SortOrder::NameDescending => cmp.reverse(),
        }
    });
}
