// Server page templates (askama, files under templates/)

use askama::Template;
use registrant_chart::PipelineSummary;

pub struct DisciplineLink {
    /// Already percent-encoded
    pub href: String,
    pub label: String,
    pub users_total: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    /// Rendered chart, inserted unescaped
    pub svg: &'a str,
    pub summary: String,
    pub links: Vec<DisciplineLink>,
}

impl<'a> IndexTemplate<'a> {
    pub fn new(summary: &PipelineSummary, svg: &'a str) -> Self {
        let links = summary
            .buckets
            .iter()
            .map(|b| DisciplineLink {
                href: urlencoding::encode(b.label()).into_owned(),
                label: b.label().to_string(),
                users_total: b.users_total,
            })
            .collect();

        IndexTemplate {
            svg,
            summary: summary.summary(),
            links,
        }
    }
}
