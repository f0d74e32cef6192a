//! Vocabulary-based skill extraction

use crate::config::SkillsConfig;
use crate::error::{MatcherError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::{BTreeMap, HashMap};

/// Built-in canonical skills. Position in this list is the reporting order.
const DEFAULT_SKILLS: &[&str] = &[
    // Programming languages
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Ruby", "Go", "Rust",
    "PHP", "Swift", "Kotlin", "Scala", "R", "MATLAB", "Perl", "Shell", "Bash",
    // Web
    "HTML", "CSS", "React", "Angular", "Vue.js", "Node.js", "Express.js", "Django",
    "Flask", "FastAPI", "Spring Boot", "ASP.NET", "jQuery", "Bootstrap", "Tailwind",
    // Data science and ML
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Keras", "Scikit-learn",
    "Pandas", "NumPy", "SciPy", "Matplotlib", "Seaborn", "Plotly", "NLP", "Computer Vision",
    "Neural Networks", "CNN", "RNN", "LSTM", "Transformer", "BERT", "GPT",
    // Cloud and DevOps
    "AWS", "Azure", "Google Cloud", "GCP", "Docker", "Kubernetes", "Jenkins", "CI/CD",
    "Terraform", "Ansible", "Git", "GitHub", "GitLab", "CircleCI", "Travis CI",
    // Databases
    "SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "Cassandra", "Oracle",
    "SQL Server", "DynamoDB", "Elasticsearch", "Neo4j", "Firebase",
    // Big data and analytics
    "Hadoop", "Spark", "Kafka", "Airflow", "ETL", "Data Warehousing", "Tableau",
    "Power BI", "Looker", "Databricks",
    // Practices and general tech
    "REST API", "GraphQL", "Microservices", "Agile", "Scrum", "JIRA", "Testing",
    "Unit Testing", "Integration Testing", "Selenium", "Jest", "pytest",
    "Linux", "Unix", "Windows Server", "Networking", "Security", "OAuth",
    "JWT", "SOLID", "Design Patterns", "OOP", "Functional Programming",
];

/// alias -> canonical name
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("JS", "JavaScript"),
    ("k8s", "Kubernetes"),
    ("Golang", "Go"),
    ("Postgres", "PostgreSQL"),
    ("ReactJS", "React"),
    ("React.js", "React"),
    ("NodeJS", "Node.js"),
    ("VueJS", "Vue.js"),
    ("sklearn", "Scikit-learn"),
    ("Mongo", "MongoDB"),
    ("Amazon Web Services", "AWS"),
];

/// Skills found in one document, keyed by vocabulary position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    skills: BTreeMap<usize, String>,
}

impl SkillSet {
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.values().any(|s| s.eq_ignore_ascii_case(skill))
    }

    pub(crate) fn contains_position(&self, position: usize) -> bool {
        self.skills.contains_key(&position)
    }

    /// (vocabulary position, canonical name) in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.skills.iter().map(|(pos, name)| (*pos, name.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.skills.values().cloned().collect()
    }

    fn insert(&mut self, position: usize, name: &str) {
        self.skills.entry(position).or_insert_with(|| name.to_string());
    }
}

/// Case-insensitive, boundary-anchored skill matcher over a fixed vocabulary
pub struct SkillMatcher {
    matcher: AhoCorasick,
    /// Canonical names in reporting order
    vocabulary: Vec<String>,
    /// Pattern id -> vocabulary position
    pattern_targets: Vec<usize>,
}

impl SkillMatcher {
    /// Matcher over the built-in vocabulary
    pub fn new() -> Result<Self> {
        Self::with_custom_skills(Vec::new(), BTreeMap::new())
    }

    pub fn from_config(config: &SkillsConfig) -> Result<Self> {
        Self::with_custom_skills(config.additional_skills.clone(), config.aliases.clone())
    }

    /// Build a matcher with extra canonical skills and aliases appended after the built-ins
    pub fn with_custom_skills(
        additional_skills: Vec<String>,
        additional_aliases: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut vocabulary: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        let canonical = DEFAULT_SKILLS
            .iter()
            .map(|s| s.to_string())
            .chain(additional_skills);
        for skill in canonical {
            let skill = skill.trim().to_string();
            if skill.is_empty() {
                continue;
            }
            let key = skill.to_lowercase();
            if positions.contains_key(&key) {
                log::debug!("Skipping duplicate skill '{}'", skill);
                continue;
            }
            positions.insert(key, vocabulary.len());
            vocabulary.push(skill);
        }

        // Surface forms: every canonical name, then every alias
        let mut surface_forms: Vec<String> = vocabulary.iter().map(|s| s.to_lowercase()).collect();
        let mut pattern_targets: Vec<usize> = (0..vocabulary.len()).collect();

        let aliases = DEFAULT_ALIASES
            .iter()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .chain(additional_aliases);
        for (alias, target) in aliases {
            let alias_key = alias.trim().to_lowercase();
            if alias_key.is_empty() {
                continue;
            }
            let position = *positions.get(&target.trim().to_lowercase()).ok_or_else(|| {
                MatcherError::Configuration(format!(
                    "Alias '{}' points to unknown skill '{}'",
                    alias, target
                ))
            })?;
            if let Some(existing) = surface_forms.iter().position(|form| *form == alias_key) {
                if pattern_targets[existing] != position {
                    log::warn!(
                        "Ignoring alias '{}' -> '{}': already maps to '{}'",
                        alias,
                        target,
                        vocabulary[pattern_targets[existing]]
                    );
                }
                continue;
            }
            surface_forms.push(alias_key);
            pattern_targets.push(position);
        }

        // Overlapping search needs the standard match kind
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&surface_forms)
            .map_err(|e| {
                MatcherError::Configuration(format!("Failed to build skill matcher: {}", e))
            })?;

        log::debug!(
            "Skill matcher ready: {} skills, {} surface forms",
            vocabulary.len(),
            surface_forms.len()
        );

        Ok(Self {
            matcher,
            vocabulary,
            pattern_targets,
        })
    }

    /// Find every vocabulary skill mentioned in `text`.
    pub fn extract(&self, text: &str) -> SkillSet {
        let mut found = SkillSet::default();

        for mat in self.matcher.find_overlapping_iter(text) {
            if !is_standalone(text, mat.start(), mat.end()) {
                continue;
            }
            let position = self.pattern_targets[mat.pattern().as_usize()];
            found.insert(position, &self.vocabulary[position]);
        }

        found
    }

    /// Canonical names in reporting order
    pub fn skills(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn skill_count(&self) -> usize {
        self.vocabulary.len()
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '+' | '#')
}

/// A hit must not touch token characters and must not be one half of a
/// dotted compound such as "node.js".
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    match before.next() {
        Some(c) if is_token_char(c) => return false,
        Some('.') if before.next().map_or(false, char::is_alphanumeric) => return false,
        _ => {}
    }

    // "c++17" and "c#10" still name the symbol-suffixed skill
    let symbol_suffixed = text[..end].ends_with(|c: char| c == '+' || c == '#');
    let mut after = text[end..].chars();
    match after.next() {
        Some(c) if symbol_suffixed && c.is_ascii_digit() => {}
        Some(c) if is_token_char(c) => return false,
        Some('.') if after.next().map_or(false, char::is_alphanumeric) => return false,
        _ => {}
    }

    true
}
