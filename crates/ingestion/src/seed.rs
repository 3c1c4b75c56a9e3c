//! Demo data for local development

use crate::errors::Result;
use paperhub_common::auth::hash_password;
use paperhub_common::db::models::{PaperSource, PaperStatus, Recommendation, ResearchStory, User};
use paperhub_common::db::{NewPaper, NewReview, NewUser};
use paperhub_common::Repository;
use tracing::{debug, info};

/// Shared password for every demo account
pub const DEMO_PASSWORD: &str = "paperhub-demo";

struct DemoUser {
    username: &'static str,
    email: &'static str,
    full_name: &'static str,
}

const USERS: [DemoUser; 3] = [
    DemoUser {
        username: "ada",
        email: "ada@paperhub.dev",
        full_name: "Ada Lovelace",
    },
    DemoUser {
        username: "alan",
        email: "alan@paperhub.dev",
        full_name: "Alan Turing",
    },
    DemoUser {
        username: "grace",
        email: "grace@paperhub.dev",
        full_name: "Grace Hopper",
    },
];

struct DemoPaper {
    /// Index into `USERS`
    owner: usize,
    title: &'static str,
    abstract_text: &'static str,
    content: &'static str,
    keywords: &'static [&'static str],
    year: i32,
    story: [&'static str; 3],
    /// (commenter, text)
    comment: (usize, &'static str),
    /// (reviewer, rating, text, recommendation)
    review: (usize, i16, &'static str, Recommendation),
}

const PAPERS: [DemoPaper; 3] = [
    DemoPaper {
        owner: 0,
        title: "Notes on the Analytical Engine",
        abstract_text: "We describe a general-purpose mechanical computing machine and give an algorithm for computing Bernoulli numbers on it.",
        content: "The Analytical Engine weaves algebraic patterns just as the Jacquard loom weaves flowers and leaves.",
        keywords: &["computing", "algorithms"],
        year: 1843,
        story: [
            "A machine made of gears can follow a list of instructions to do maths on its own.",
            "The paper shows how a programmable engine separates the operations from the numbers they act on.",
            "Note G gives a full tabulated program for the Bernoulli recurrence, including loop structure.",
        ],
        comment: (1, "The loop construction in Note G is remarkably modern."),
        review: (2, 5, "Foundational and clearly argued.", Recommendation::Accept),
    },
    DemoPaper {
        owner: 1,
        title: "On Computable Numbers, with an Application to the Entscheidungsproblem",
        abstract_text: "We define computable numbers via abstract machines and show that the decision problem has no general solution.",
        content: "A number is computable if its decimal can be written down by a machine.",
        keywords: &["computability", "logic"],
        year: 1936,
        story: [
            "Some questions can never be answered by any computer, no matter how fast.",
            "Simple machines reading a tape can compute anything computable, and some problems are provably beyond them.",
            "A universal machine simulates any other; diagonalisation shows the halting problem is undecidable.",
        ],
        comment: (2, "Would love a follow-up on practical compilers."),
        review: (0, 4, "Elegant proofs, dense notation.", Recommendation::MinorRevision),
    },
    DemoPaper {
        owner: 2,
        title: "The Education of a Computer",
        abstract_text: "We argue that computers can translate problem descriptions written in mathematical notation into machine code.",
        content: "Compiling routines let the programmer state the problem and leave the coding to the machine.",
        keywords: &["compilers", "programming"],
        year: 1952,
        story: [
            "Computers can help write their own instructions.",
            "A library of subroutines plus a translator turns high-level descriptions into programs.",
            "The A-0 system links subroutines by call number, an early form of compilation and linking.",
        ],
        comment: (0, "The subroutine library idea deserves more attention."),
        review: (1, 5, "A convincing case for automatic programming.", Recommendation::Accept),
    },
];

/// Rows created by a seed run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_existing: usize,
    pub papers_created: usize,
    pub papers_skipped: usize,
    pub comments_created: usize,
    pub reviews_created: usize,
}

async fn ensure_user(repo: &Repository, demo: &DemoUser, report: &mut SeedReport) -> Result<User> {
    if let Some(user) = repo.find_user_by_login(demo.username).await? {
        report.users_existing += 1;
        return Ok(user);
    }

    let user = repo
        .create_user(NewUser {
            username: demo.username.to_string(),
            email: demo.email.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            full_name: demo.full_name.to_string(),
        })
        .await?;

    debug!(username = demo.username, "Created demo user");
    report.users_created += 1;
    Ok(user)
}

async fn seed_paper(
    repo: &Repository,
    demo: &DemoPaper,
    users: &[User],
    force: bool,
    report: &mut SeedReport,
) -> Result<()> {
    let owner = &users[demo.owner];

    if !force {
        let existing = repo.list_papers_by_author(owner.id).await?;
        if existing.iter().any(|p| p.title == demo.title) {
            report.papers_skipped += 1;
            return Ok(());
        }
    }

    let paper = repo
        .create_paper(NewPaper {
            owner_id: Some(owner.id),
            title: demo.title.to_string(),
            abstract_text: demo.abstract_text.to_string(),
            content: demo.content.to_string(),
            authors: vec![owner.full_name.clone()],
            author_ids: vec![owner.id],
            keywords: demo.keywords.iter().map(|k| k.to_string()).collect(),
            status: PaperStatus::Published,
            source: PaperSource::Platform,
            external_id: None,
            doi: None,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            url: None,
            publication_year: Some(demo.year),
        })
        .await?;

    let [general, intermediate, expert] = demo.story;
    let paper = repo
        .set_research_story(
            paper,
            ResearchStory {
                general: Some(general.to_string()),
                intermediate: Some(intermediate.to_string()),
                expert: Some(expert.to_string()),
            },
        )
        .await?;
    report.papers_created += 1;

    let (commenter, text) = demo.comment;
    repo.create_comment(paper.id, users[commenter].id, None, text.to_string())
        .await?;
    report.comments_created += 1;

    let (reviewer, rating, text, recommendation) = demo.review;
    repo.create_review(NewReview {
        paper_id: paper.id,
        user_id: users[reviewer].id,
        rating,
        content: text.to_string(),
        recommendation: Some(recommendation),
    })
    .await?;
    report.reviews_created += 1;

    Ok(())
}

/// Insert demo users and papers. Existing users are reused; papers an owner
/// already has (by title) are skipped unless `force` is set.
pub async fn seed(repo: &Repository, force: bool) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let mut users = Vec::with_capacity(USERS.len());
    for demo in &USERS {
        users.push(ensure_user(repo, demo, &mut report).await?);
    }

    for demo in &PAPERS {
        seed_paper(repo, demo, &users, force, &mut report).await?;
    }

    info!(
        users_created = report.users_created,
        users_existing = report.users_existing,
        papers_created = report.papers_created,
        papers_skipped = report.papers_skipped,
        "Seed finished"
    );

    Ok(report)
}
