//! Word tables the line classifier matches against.
//!
//! The built-in tables target English résumés. A JSON file with the same
//! field names (every field optional) extends them per locale or industry:
//!
//! ```json
//! { "role_words": ["Kurator"], "experience_headers": ["Berufserfahrung"] }
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::model::SectionKind;
use crate::Error;

/// Lower-cased lookup tables injected into [`crate::classify::LineClassifier`].
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub section_headers: Vec<(SectionKind, Vec<String>)>,
    pub role_words: Vec<String>,
    pub company_suffixes: Vec<String>,
    pub known_companies: Vec<String>,
    pub location_words: Vec<String>,
    pub network_domains: Vec<String>,
    pub degree_words: Vec<String>,
    pub institution_words: Vec<String>,
}

/// Additions read from a lexicon file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexiconPatch {
    pub summary_headers: Vec<String>,
    pub experience_headers: Vec<String>,
    pub education_headers: Vec<String>,
    pub skills_headers: Vec<String>,
    pub achievements_headers: Vec<String>,
    pub certifications_headers: Vec<String>,
    pub other_headers: Vec<String>,
    pub role_words: Vec<String>,
    pub company_suffixes: Vec<String>,
    pub known_companies: Vec<String>,
    pub location_words: Vec<String>,
    pub network_domains: Vec<String>,
    pub degree_words: Vec<String>,
    pub institution_words: Vec<String>,
}

const SUMMARY: &[&str] = &[
    "summary",
    "professional summary",
    "executive summary",
    "career summary",
    "profile",
    "professional profile",
    "about",
    "about me",
    "objective",
    "career objective",
    "overview",
];

const EXPERIENCE: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "relevant experience",
    "employment",
    "employment history",
    "work history",
    "career history",
    "career",
    "professional background",
];

const EDUCATION: &[&str] = &[
    "education",
    "education & training",
    "education and training",
    "academic background",
    "academics",
    "qualifications",
];

const SKILLS: &[&str] = &[
    "skills",
    "technical skills",
    "core skills",
    "key skills",
    "core competencies",
    "competencies",
    "areas of expertise",
    "expertise",
    "tools",
    "technologies",
    "skills & tools",
    "tools & technologies",
];

const ACHIEVEMENTS: &[&str] = &[
    "achievements",
    "key achievements",
    "accomplishments",
    "highlights",
    "career highlights",
    "awards",
    "honors",
    "awards & honors",
    "honors & awards",
];

const CERTIFICATIONS: &[&str] = &[
    "certifications",
    "certificates",
    "licenses",
    "licenses & certifications",
    "certifications & licenses",
    "professional development",
];

const OTHER: &[&str] = &[
    "projects",
    "selected projects",
    "volunteer",
    "volunteering",
    "volunteer experience",
    "publications",
    "languages",
    "interests",
    "references",
    "leadership",
    "activities",
    "affiliations",
];

const ROLE_WORDS: &[&str] = &[
    "head", "director", "manager", "lead", "senior", "sr", "sr.", "junior", "jr", "jr.",
    "staff", "principal", "vp", "svp", "evp", "avp", "chief", "ceo", "cto", "cfo", "coo",
    "cmo", "cpo", "ciso", "founder", "co-founder", "cofounder", "president", "partner",
    "engineer", "developer", "designer", "analyst", "architect", "consultant", "scientist",
    "specialist", "coordinator", "associate", "assistant", "administrator", "officer",
    "intern", "researcher", "strategist", "owner", "pm", "tpm", "sde", "swe", "advisor",
    "supervisor", "executive", "representative", "recruiter", "accountant", "editor",
    "writer", "marketer", "producer", "technician", "teacher", "instructor", "nurse",
    "counsel", "attorney", "fellow", "programmer", "operator",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "inc", "inc.", "llc", "l.l.c.", "corp", "corp.", "corporation", "ltd", "ltd.", "limited",
    "co", "co.", "company", "group", "technologies", "technology", "labs", "systems",
    "solutions", "partners", "consulting", "holdings", "ventures", "gmbh", "ag", "plc",
    "s.a.", "sa", "bv", "pty", "llp", "lp", "studios", "agency", "bank", "university",
    "hospital", "foundation", "institute", "capital", "software", "networks", "media",
];

const KNOWN_COMPANIES: &[&str] = &[
    "google", "alphabet", "microsoft", "amazon", "aws", "apple", "meta", "facebook",
    "netflix", "uber", "lyft", "airbnb", "stripe", "shopify", "salesforce", "oracle",
    "ibm", "intel", "nvidia", "adobe", "spotify", "twitter", "linkedin", "tesla",
    "deloitte", "accenture", "mckinsey", "kpmg", "pwc", "ey", "goldman sachs",
    "jpmorgan", "j.p. morgan", "morgan stanley", "atlassian", "slack", "dropbox",
    "pinterest", "snap", "tiktok", "bytedance", "samsung", "sony", "cisco", "vmware",
];

const LOCATION_WORDS: &[&str] = &[
    "remote", "hybrid", "on-site", "onsite", "remote (us)", "remote, us", "worldwide",
    "emea", "apac", "latam", "north america", "europe", "united states", "usa", "uk",
    "united kingdom", "canada", "germany", "india", "australia", "new york", "nyc",
    "san francisco", "london", "berlin", "paris", "toronto", "seattle", "boston",
    "chicago", "austin", "los angeles", "singapore", "amsterdam", "dublin", "bay area",
    "sf bay area",
];

const NETWORK_DOMAINS: &[&str] = &[
    "linkedin.com",
    "github.com",
    "gitlab.com",
    "behance.net",
    "dribbble.com",
    "medium.com",
    "x.com",
    "twitter.com",
    "stackoverflow.com",
];

const DEGREE_WORDS: &[&str] = &[
    "bachelor", "bachelors", "bachelor's", "master", "masters", "master's", "mba", "phd",
    "ph.d.", "ph.d", "doctorate", "associate's", "diploma", "b.s.", "b.s", "bs", "bsc",
    "b.sc.", "b.a.", "ba", "m.s.", "ms", "msc", "m.sc.", "m.a.", "ma", "b.eng", "m.eng",
    "beng", "meng", "b.tech", "m.tech", "btech", "mtech", "jd", "j.d.", "md", "m.d.",
    "degree", "certificate",
];

const INSTITUTION_WORDS: &[&str] = &[
    "university", "college", "institute", "school", "academy", "polytechnic", "conservatory",
    "universität", "université", "universidad",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn lowered(words: Vec<String>) -> impl Iterator<Item = String> {
    words.into_iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty())
}

impl Default for Lexicon {
    fn default() -> Self {
        Lexicon {
            section_headers: vec![
                (SectionKind::Summary, owned(SUMMARY)),
                (SectionKind::Experience, owned(EXPERIENCE)),
                (SectionKind::Education, owned(EDUCATION)),
                (SectionKind::Skills, owned(SKILLS)),
                (SectionKind::Achievements, owned(ACHIEVEMENTS)),
                (SectionKind::Certifications, owned(CERTIFICATIONS)),
                (SectionKind::Other, owned(OTHER)),
            ],
            role_words: owned(ROLE_WORDS),
            company_suffixes: owned(COMPANY_SUFFIXES),
            known_companies: owned(KNOWN_COMPANIES),
            location_words: owned(LOCATION_WORDS),
            network_domains: owned(NETWORK_DOMAINS),
            degree_words: owned(DEGREE_WORDS),
            institution_words: owned(INSTITUTION_WORDS),
        }
    }
}

impl Lexicon {
    /// Built-in tables extended with the JSON lexicon file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::LexiconRead {
            path: path.to_path_buf(),
            source,
        })?;
        let patch: LexiconPatch = serde_json::from_str(&raw).map_err(|source| Error::LexiconParse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lexicon = Lexicon::default();
        lexicon.extend(patch);
        Ok(lexicon)
    }

    /// Append every list in `patch` to the matching table.
    pub fn extend(&mut self, patch: LexiconPatch) {
        let headers = [
            (SectionKind::Summary, patch.summary_headers),
            (SectionKind::Experience, patch.experience_headers),
            (SectionKind::Education, patch.education_headers),
            (SectionKind::Skills, patch.skills_headers),
            (SectionKind::Achievements, patch.achievements_headers),
            (SectionKind::Certifications, patch.certifications_headers),
            (SectionKind::Other, patch.other_headers),
        ];
        for (kind, words) in headers {
            if let Some((_, table)) = self.section_headers.iter_mut().find(|(k, _)| *k == kind) {
                table.extend(lowered(words));
            } else {
                self.section_headers.push((kind, lowered(words).collect()));
            }
        }
        self.role_words.extend(lowered(patch.role_words));
        self.company_suffixes.extend(lowered(patch.company_suffixes));
        self.known_companies.extend(lowered(patch.known_companies));
        self.location_words.extend(lowered(patch.location_words));
        self.network_domains.extend(lowered(patch.network_domains));
        self.degree_words.extend(lowered(patch.degree_words));
        self.institution_words.extend(lowered(patch.institution_words));
    }
}
