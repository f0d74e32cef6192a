//! Skill gap analysis between a CV and a job description

use crate::processing::skill_matcher::SkillSet;

/// Required skills split by whether the CV covers them.
///
/// Skills that appear only in the CV are not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillGap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

pub fn analyze_gaps(cv: &SkillSet, jd: &SkillSet) -> SkillGap {
    let (matched, missing): (Vec<_>, Vec<_>) = jd
        .iter()
        .partition(|(position, _)| cv.contains_position(*position));

    SkillGap {
        matched: matched.into_iter().map(|(_, name)| name.to_string()).collect(),
        missing: missing.into_iter().map(|(_, name)| name.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::skill_matcher::SkillMatcher;

    #[test]
    fn test_matched_and_missing() {
        let matcher = SkillMatcher::new().unwrap();
        let cv = matcher.extract("python django react postgresql aws");
        let jd = matcher.extract("python django react docker kubernetes");

        let gap = analyze_gaps(&cv, &jd);
        assert_eq!(gap.matched, vec!["Python", "React", "Django"]);
        assert_eq!(gap.missing, vec!["Docker", "Kubernetes"]);
        assert!(!gap.matched.contains(&"AWS".to_string()));
        assert!(!gap.missing.contains(&"AWS".to_string()));
    }

    #[test]
    fn test_no_required_skills() {
        let matcher = SkillMatcher::new().unwrap();
        let gap = analyze_gaps(&matcher.extract("python"), &matcher.extract("friendly team"));
        assert!(gap.matched.is_empty());
        assert!(gap.missing.is_empty());
    }
}
