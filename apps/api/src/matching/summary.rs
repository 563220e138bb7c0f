/// Skills looked for in a resume, in reporting order. Matching is plain
/// substring containment on the lowercased text, so "java" also fires on
/// "javascript".
pub const SKILL_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "react",
    "node",
    "sql",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "machine learning",
    "data analysis",
    "excel",
    "git",
    "linux",
    "html",
    "css",
    "flask",
    "django",
    "tensorflow",
    "rust",
];

const NO_SKILLS: &str = "No key skills detected in the resume.";

pub fn detected_skills(resume_text: &str) -> Vec<&'static str> {
    let text = resume_text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .copied()
        .filter(|skill| text.contains(skill))
        .collect()
}

/// One-sentence summary of the skills found in `resume_text`.
pub fn summarize(resume_text: &str) -> String {
    let skills = detected_skills(resume_text);
    if skills.is_empty() {
        return NO_SKILLS.to_string();
    }
    format!("Detected skills: {}.", skills.join(", "))
}
