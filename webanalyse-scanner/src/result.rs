use crate::links::LinkCounters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything learnt about one page. Built once per analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub version: String,
    pub headings: BTreeMap<String, usize>,
    pub has_login_form: bool,
    pub links: LinkCounters,
}

impl PageSummary {
    pub fn total_headings(&self) -> usize {
        self.headings.values().sum()
    }

    pub fn login_label(&self) -> &'static str {
        if self.has_login_form { "Yes" } else { "No" }
    }
}
