use crate::data::Category;

/// Minimum keyword score for the content stage to commit to a category.
const MIN_SCORE: usize = 3;

/// Scored in this order; ties go to the earlier entry.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Frontend, &[
        "react", "vue", "angular", "html", "css", "javascript", "typescript", "jsx", "tsx",
        "dom", "webpack", "vite", "sass", "scss", "tailwind", "bootstrap", "ui", "ux",
        "responsive", "component", "hooks", "state", "props", "spa", "pwa", "browser",
    ]),
    (Category::Backend, &[
        "node.js", "express", "fastify", "nest.js", "python", "django", "flask", "fastapi",
        "java", "spring", "php", "laravel", "ruby", "rails", "go", "rust", "c#", ".net",
        "api", "rest", "graphql", "server", "middleware", "authentication", "authorization",
    ]),
    (Category::DataScience, &[
        "pandas", "numpy", "matplotlib", "seaborn", "scikit-learn", "jupyter", "anaconda",
        "data analysis", "data visualization", "statistics", "machine learning", "ml",
        "dataset", "dataframe", "csv", "excel", "sql", "etl", "big data", "analytics",
    ]),
    (Category::AiMl, &[
        "tensorflow", "pytorch", "keras", "neural network", "deep learning", "ai",
        "artificial intelligence", "computer vision", "nlp", "natural language processing",
        "classification", "regression", "clustering", "supervised", "unsupervised",
        "model", "training", "prediction", "algorithm",
    ]),
    (Category::Devops, &[
        "docker", "kubernetes", "aws", "azure", "gcp", "ci/cd", "jenkins", "github actions",
        "deployment", "infrastructure", "terraform", "ansible", "monitoring", "logging",
        "nginx", "apache", "load balancer", "microservices", "containerization",
    ]),
    (Category::Mobile, &[
        "react native", "flutter", "swift", "kotlin", "ios", "android", "mobile app",
        "xamarin", "cordova", "ionic", "app store", "play store", "responsive design",
        "mobile development", "cross-platform", "native",
    ]),
    (Category::Databases, &[
        "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "oracle", "sqlite",
        "database", "sql", "nosql", "query", "schema", "migration", "orm", "sequelize",
        "mongoose", "prisma", "indexing", "optimization", "backup", "replication",
    ]),
    (Category::Security, &[
        "cybersecurity", "authentication", "authorization", "encryption", "hashing",
        "jwt", "oauth", "ssl", "tls", "vulnerability", "penetration testing", "xss",
        "sql injection", "csrf", "security audit", "firewall", "vpn",
    ]),
    (Category::Cloud, &[
        "aws", "azure", "google cloud", "gcp", "cloud computing", "serverless", "lambda",
        "ec2", "s3", "cloudfront", "cloud storage", "auto scaling", "load balancing",
        "cdn", "cloud functions", "cloud run", "cloud sql",
    ]),
    (Category::Tools, &[
        "git", "github", "gitlab", "vscode", "visual studio", "intellij", "sublime text",
        "vim", "emacs", "postman", "insomnia", "chrome devtools", "debugging",
        "linting", "formatting", "productivity", "workflow",
    ]),
];

/// First matching table wins.
const TAG_TABLE: &[(Category, &[&str])] = &[
    (Category::Frontend, &["react", "vue", "angular", "css", "html", "frontend"]),
    (Category::Backend, &["node", "python", "backend", "api", "server"]),
    (Category::Devops, &["docker", "kubernetes", "devops", "ci/cd", "deployment"]),
    (Category::Mobile, &["react-native", "flutter", "mobile", "ios", "android"]),
    (Category::DataScience, &["pandas", "numpy", "datascience", "machine learning", "ai"]),
    (Category::AiMl, &["tensorflow", "pytorch", "ai", "ml", "machine learning"]),
    (Category::Security, &["security", "auth", "encryption", "cybersecurity"]),
    (Category::Tools, &["git", "vscode", "tools", "productivity"]),
    (Category::Databases, &["database", "sql", "mongodb", "postgresql"]),
    (Category::Cloud, &["aws", "azure", "gcp", "cloud", "serverless"]),
];

fn keyword_weight(keyword: &str) -> usize {
    if keyword.chars().count() > 3 { 2 } else { 1 }
}

/// Per-category keyword score over already lower-cased text.
pub fn keyword_scores(lowered: &str) -> Vec<(Category, usize)> {
    KEYWORDS
        .iter()
        .map(|(cat, words)| {
            let score: usize = words.iter().map(|kw| lowered.matches(*kw).count() * keyword_weight(kw)).sum();
            (*cat, score)
        })
        .collect()
}

/// Content stage: `None` when no category reaches the minimum score.
pub fn category_from_keywords(title: &str, content: &str) -> Option<Category> {
    let text = format!("{} {}", title, content).to_lowercase();
    let mut best: Option<(Category, usize)> = None;
    for (cat, score) in keyword_scores(&text) {
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((cat, score));
        }
    }
    best.filter(|(_, s)| *s >= MIN_SCORE).map(|(c, _)| c)
}

/// Tag stage: `None` when no tag is in any table.
pub fn category_from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Category> {
    let names: Vec<String> = tags.iter().map(|t| t.as_ref().trim().to_lowercase()).collect();
    TAG_TABLE
        .iter()
        .find(|(_, table)| names.iter().any(|n| table.contains(&n.as_str())))
        .map(|(cat, _)| *cat)
}

/// Full resolution: taxonomy override, then content keywords, then tags, then `Other`.
pub fn categorize<S: AsRef<str>>(
    term_override: Option<Category>,
    title: &str,
    content: &str,
    tags: &[S],
) -> Category {
    term_override
        .or_else(|| category_from_keywords(title, content))
        .or_else(|| category_from_tags(tags))
        .unwrap_or(Category::Other)
}
