use serde::Deserialize;

/// The arXiv RSS feeds offered for browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArxivFeed {
    /// Artificial Intelligence (cs.AI)
    #[default]
    Ai,
    /// Computer Science
    Cs,
    Physics,
    Math,
    /// Quantitative Biology
    QBio,
    /// Quantitative Finance
    QFin,
    /// Statistics
    Stat,
}

impl ArxivFeed {
    pub const ALL: [ArxivFeed; 7] = [
        ArxivFeed::Ai,
        ArxivFeed::Cs,
        ArxivFeed::Physics,
        ArxivFeed::Math,
        ArxivFeed::QBio,
        ArxivFeed::QFin,
        ArxivFeed::Stat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArxivFeed::Ai => "AI",
            ArxivFeed::Cs => "CS",
            ArxivFeed::Physics => "Physics",
            ArxivFeed::Math => "Math",
            ArxivFeed::QBio => "Quantitative Biology",
            ArxivFeed::QFin => "Quantitative Finance",
            ArxivFeed::Stat => "Statistics",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            ArxivFeed::Ai => "https://rss.arxiv.org/rss/cs.AI",
            ArxivFeed::Cs => "http://export.arxiv.org/rss/cs",
            ArxivFeed::Physics => "http://export.arxiv.org/rss/physics",
            ArxivFeed::Math => "http://export.arxiv.org/rss/math",
            ArxivFeed::QBio => "http://export.arxiv.org/rss/q-bio",
            ArxivFeed::QFin => "http://export.arxiv.org/rss/q-fin",
            ArxivFeed::Stat => "http://export.arxiv.org/rss/stat",
        }
    }
}

impl std::fmt::Display for ArxivFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
