//! Data-quality report over the papers table

use crate::errors::Result;
use paperhub_common::db::models::Paper;
use paperhub_common::Repository;
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// One problem found on a paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    MissingTitle,
    MissingAbstract,
    MissingAuthors,
    MissingContent,
    /// DOI shared with an earlier paper
    DuplicateDoi { doi: String, first: Uuid },
    /// Title (case-insensitive) shared with an earlier paper
    DuplicateTitle { first: Uuid },
    /// `author_ids` entry that is not a UUID
    MalformedAuthorId { value: String },
    /// `author_ids` entry with no matching user
    UnknownAuthor { user_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub paper_id: Uuid,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.paper_id)?;
        match &self.kind {
            IssueKind::MissingTitle => f.write_str("missing title"),
            IssueKind::MissingAbstract => f.write_str("missing abstract"),
            IssueKind::MissingAuthors => f.write_str("no authors"),
            IssueKind::MissingContent => f.write_str("missing content"),
            IssueKind::DuplicateDoi { doi, first } => {
                write!(f, "DOI {} already used by {}", doi, first)
            }
            IssueKind::DuplicateTitle { first } => write!(f, "same title as {}", first),
            IssueKind::MalformedAuthorId { value } => {
                write!(f, "author id {:?} is not a UUID", value)
            }
            IssueKind::UnknownAuthor { user_id } => {
                write!(f, "author id {} does not match any user", user_id)
            }
        }
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Raw `author_ids` entries, keeping malformed ones as text
fn raw_author_ids(paper: &Paper) -> Vec<String> {
    paper
        .author_ids
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => v.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Every UUID referenced from `author_ids` across `papers`
pub fn referenced_user_ids(papers: &[Paper]) -> Vec<Uuid> {
    let ids: HashSet<Uuid> = papers.iter().flat_map(|p| p.author_user_ids()).collect();
    ids.into_iter().collect()
}

/// Check `papers` in order; duplicates are reported on the later paper
pub fn check_papers(papers: &[Paper], known_users: &HashSet<Uuid>) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut dois: HashMap<String, Uuid> = HashMap::new();
    let mut titles: HashMap<String, Uuid> = HashMap::new();

    for paper in papers {
        let mut report = |kind| {
            issues.push(Issue {
                paper_id: paper.id,
                kind,
            })
        };

        if blank(&paper.title) {
            report(IssueKind::MissingTitle);
        }
        if blank(&paper.abstract_text) {
            report(IssueKind::MissingAbstract);
        }
        if paper.author_names().iter().all(|a| blank(a)) {
            report(IssueKind::MissingAuthors);
        }
        if blank(&paper.content) {
            report(IssueKind::MissingContent);
        }

        if let Some(doi) = paper.doi.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            let key = doi.to_lowercase();
            match dois.get(&key) {
                Some(&first) => report(IssueKind::DuplicateDoi {
                    doi: doi.to_string(),
                    first,
                }),
                None => {
                    dois.insert(key, paper.id);
                }
            }
        }

        if !blank(&paper.title) {
            let key = paper
                .title
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            match titles.get(&key) {
                Some(&first) => report(IssueKind::DuplicateTitle { first }),
                None => {
                    titles.insert(key, paper.id);
                }
            }
        }

        for value in raw_author_ids(paper) {
            match Uuid::parse_str(&value) {
                Ok(user_id) if !known_users.contains(&user_id) => {
                    report(IssueKind::UnknownAuthor { user_id })
                }
                Ok(_) => {}
                Err(_) => report(IssueKind::MalformedAuthorId { value }),
            }
        }
    }

    issues
}

/// Load every paper and the users they reference, then check them
pub async fn run_check(repo: &Repository) -> Result<(usize, Vec<Issue>)> {
    let papers = repo.list_all_papers().await?;
    let referenced = referenced_user_ids(&papers);

    let known: HashSet<Uuid> = repo
        .find_users_by_ids(referenced)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    let issues = check_papers(&papers, &known);
    Ok((papers.len(), issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paper(title: &str) -> Paper {
        let now = chrono::Utc::now();
        Paper {
            id: Uuid::new_v4(),
            owner_id: None,
            title: title.into(),
            abstract_text: "An abstract.".into(),
            content: "Body.".into(),
            authors: json!(["Grace Hopper"]),
            author_ids: json!([]),
            keywords: json!([]),
            status: "published".into(),
            source: "platform".into(),
            external_id: None,
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: None,
            research_story: None,
            view_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: None,
        }
    }

    #[test]
    fn clean_paper_has_no_issues() {
        assert!(check_papers(&[paper("Compilers")], &HashSet::new()).is_empty());
    }

    #[test]
    fn reports_missing_fields() {
        let mut p = paper("  ");
        p.abstract_text.clear();
        p.content = "\n".into();
        p.authors = json!([""]);

        let kinds: Vec<_> = check_papers(&[p], &HashSet::new())
            .into_iter()
            .map(|i| i.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::MissingTitle,
                IssueKind::MissingAbstract,
                IssueKind::MissingAuthors,
                IssueKind::MissingContent,
            ]
        );
    }

    #[test]
    fn reports_duplicates_on_the_later_paper() {
        let mut first = paper("Attention Is All You Need");
        first.doi = Some("10.48550/arXiv.1706.03762".into());
        let mut second = paper("attention is  all you need");
        second.doi = Some("10.48550/ARXIV.1706.03762".into());

        let issues = check_papers(&[first.clone(), second.clone()], &HashSet::new());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.paper_id == second.id));
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::DuplicateTitle { first: first.id }));
    }

    #[test]
    fn reports_unresolved_author_ids() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let mut p = paper("Ids");
        p.author_ids = json!([known.to_string(), unknown.to_string(), "nope", 7]);

        let issues = check_papers(&[p], &HashSet::from([known]));
        let kinds: Vec<_> = issues.into_iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::UnknownAuthor { user_id: unknown },
                IssueKind::MalformedAuthorId { value: "nope".into() },
                IssueKind::MalformedAuthorId { value: "7".into() },
            ]
        );
    }

    #[test]
    fn referenced_ids_skip_malformed_entries() {
        let id = Uuid::new_v4();
        let mut a = paper("A");
        a.author_ids = json!([id.to_string(), "bad"]);
        let mut b = paper("B");
        b.author_ids = json!([id.to_string()]);
        assert_eq!(referenced_user_ids(&[a, b]), vec![id]);
    }

    #[test]
    fn issues_render_readably() {
        let issue = Issue {
            paper_id: Uuid::nil(),
            kind: IssueKind::MissingAbstract,
        };
        assert_eq!(
            issue.to_string(),
            "00000000-0000-0000-0000-000000000000: missing abstract"
        );
    }
}
