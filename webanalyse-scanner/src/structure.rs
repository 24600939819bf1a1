use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid")
});
static PASSWORD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[type="password"]"#).expect("password selector is valid")
});

/// Read-only queries over an already parsed page.
pub struct PageStructure<'a> {
    document: &'a Html,
}

impl<'a> PageStructure<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self { document }
    }

    /// Text of the first `<title>`, empty when there is none.
    pub fn title(&self) -> String {
        self.document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|title| title.text().collect())
            .unwrap_or_default()
    }

    /// Name of the root element, used as a rough markup version label.
    pub fn version(&self) -> String {
        self.document.root_element().value().name().to_string()
    }

    pub fn headings(&self) -> BTreeMap<String, usize> {
        let mut headings = BTreeMap::new();
        for heading in self.document.select(&HEADING_SELECTOR) {
            *headings
                .entry(heading.value().name().to_string())
                .or_insert(0) += 1;
        }
        headings
    }

    pub fn has_login_form(&self) -> bool {
        self.document.select(&PASSWORD_SELECTOR).next().is_some()
    }
}
