//! Splits the aggregated crew output into named sections.

use crate::template::Stage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The four-key section mapping handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    pub skill_gap: String,
    pub learning_path: String,
    pub action_plan: String,
    /// Always the complete raw text
    pub full_output: String,
}

impl Sections {
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::SkillGap => &self.skill_gap,
            Stage::LearningPath => &self.learning_path,
            Stage::ActionPlan => &self.action_plan,
        }
    }

    fn slot(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::SkillGap => &mut self.skill_gap,
            Stage::LearningPath => &mut self.learning_path,
            Stage::ActionPlan => &mut self.action_plan,
        }
    }

    /// Section text for display; an empty section shows the full output instead.
    pub fn display(&self, stage: Stage) -> &str {
        let text = self.get(stage);
        if text.trim().is_empty() {
            &self.full_output
        } else {
            text
        }
    }

    /// True when no heading was recognised and every section is the raw text.
    pub fn is_degraded(&self) -> bool {
        Stage::ALL.iter().all(|s| self.get(*s) == self.full_output)
    }
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // level 1 or 2 only: the character after the hashes may not be another '#'
    RE.get_or_init(|| Regex::new(r"^[ \t]{0,3}#{1,2}[ \t]*([^#].*)$").expect("heading pattern is valid"))
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // label first, optionally after emphasis or an ordinal such as "2." or "30-Day"
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[*_ \t]*(?:\d+(?:[- ]?days?)?[.):]?[ \t]+)?(skill gap|learning path|action plan)s?\b")
            .expect("label pattern is valid")
    })
}

/// Which stage a heading's text names, if it starts with a known label.
fn classify(heading: &str) -> Option<Stage> {
    let caps = label_regex().captures(heading)?;
    let label = caps.get(1)?.as_str().to_lowercase();
    Stage::ALL
        .into_iter()
        .find(|stage| stage.label().to_lowercase() == label)
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start_matches([' ', '\t']);
    line.len() - trimmed.len() <= 3 && (trimmed.starts_with("```") || trimmed.starts_with("~~~"))
}

/// A recognised stage heading: the stage and the byte span of the heading line.
struct Heading {
    stage: Stage,
    start: usize,
    end: usize,
}

/// Stage headings outside fenced code blocks, in order of appearance.
fn find_headings(text: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);

        if is_fence(content) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let stage = heading_regex()
            .captures(content)
            .and_then(|caps| classify(caps.get(1)?.as_str()));
        if let Some(stage) = stage {
            headings.push(Heading {
                stage,
                start,
                end: start + content.len(),
            });
        }
    }

    headings
}

/// Stages whose headings appear in `text`, in order of appearance.
pub fn stage_headings(text: &str) -> Vec<Stage> {
    find_headings(text).into_iter().map(|h| h.stage).collect()
}

/// Split `raw_text` at "Skill Gap", "Learning Path" and "Action Plan" headings.
///
/// A heading counts when it is level 1 or 2, sits outside a code fence and
/// starts with one of the labels. Text after a heading, up to the next
/// recognised heading, belongs to that heading's section; a repeated heading
/// overwrites the earlier one. When nothing usable is found every section
/// falls back to the whole text.
pub fn parse_sections(raw_text: &str) -> Sections {
    let mut sections = Sections {
        full_output: raw_text.to_string(),
        ..Sections::default()
    };

    let headings = find_headings(raw_text);
    for (i, heading) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map(|next| next.start).unwrap_or(raw_text.len());
        *sections.slot(heading.stage) = raw_text[heading.end..body_end].trim().to_string();
    }

    if Stage::ALL.iter().all(|s| sections.get(*s).is_empty()) {
        tracing::debug!(
            headings = headings.len(),
            "no section headings recognised, using full output for every section"
        );
        for stage in Stage::ALL {
            *sections.slot(stage) = raw_text.to_string();
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_at_known_headings() {
        let raw = "## Skill Gap\nA\n## Learning Path\nB\n## Action Plan\nC";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "A");
        assert_eq!(sections.learning_path, "B");
        assert_eq!(sections.action_plan, "C");
        assert_eq!(sections.full_output, raw);
        assert!(!sections.is_degraded());
    }

    #[test]
    fn test_no_headings_degrades_to_full_output() {
        let raw = "  Just some advice without structure.\n### Skill Gap is level three\n";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, raw);
        assert_eq!(sections.learning_path, raw);
        assert_eq!(sections.action_plan, raw);
        assert_eq!(sections.full_output, raw);
        assert!(sections.is_degraded());
    }

    #[test]
    fn test_case_insensitive_titles_and_level_one() {
        let raw = "# SKILL GAP ANALYSIS\n- MLOps\n\n##learning path design\n1. Course\n## 30-Day action plan\nWeek 1";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "- MLOps");
        assert_eq!(sections.learning_path, "1. Course");
        assert_eq!(sections.action_plan, "Week 1");
    }

    #[test]
    fn test_unrelated_headings_stay_in_section_body() {
        let raw = "## Action Plan\n## Week 1\nRead\n### Skill Gap notes\nmore";
        let sections = parse_sections(raw);
        assert_eq!(sections.action_plan, "## Week 1\nRead\n### Skill Gap notes\nmore");
        assert_eq!(sections.skill_gap, "");
        assert_eq!(sections.display(Stage::SkillGap), raw);
    }

    #[test]
    fn test_duplicate_heading_last_wins() {
        let raw = "## Skill Gap\nfirst\n## Learning Path\nB\n## Skill Gap\nsecond";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "second");
        assert_eq!(sections.learning_path, "B");
    }

    #[test]
    fn test_parse_is_idempotent_over_full_output() {
        let raw = "intro\n## Skill Gap Analysis\nA\n## Learning Path\nB\n## 30-Day Action Plan\nC\n";
        let first = parse_sections(raw);
        let second = parse_sections(&first.full_output);
        assert_eq!(first, second);

        let plain = "nothing to split";
        assert_eq!(parse_sections(plain), parse_sections(&parse_sections(plain).full_output));
    }

    #[test]
    fn test_stage_headings_in_order() {
        let text = "# Action Plan\n## Notes\n## Skill Gap review\n### Learning Path";
        assert_eq!(stage_headings(text), vec![Stage::ActionPlan, Stage::SkillGap]);
        assert!(stage_headings("plain text").is_empty());
    }

    #[test]
    fn test_label_must_lead_the_heading() {
        let raw = "## Skill Gap\nA\n## 30-Day Action Plan\n## Week 1: revisit your skill gap list\nDay 1: setup\n\
                   ## Review the learning path\nkeep going";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "A");
        assert_eq!(
            sections.action_plan,
            "## Week 1: revisit your skill gap list\nDay 1: setup\n## Review the learning path\nkeep going"
        );
        assert_eq!(sections.learning_path, "");
    }

    #[test]
    fn test_ordinal_and_emphasis_prefixes() {
        let raw = "## 1. Skill Gaps\nA\n## **Learning Path**\nB\n# 30 Day Action Plan\nC";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "A");
        assert_eq!(sections.learning_path, "B");
        assert_eq!(sections.action_plan, "C");
    }

    #[test]
    fn test_headings_inside_code_fences_are_ignored() {
        let raw = "## Learning Path\n1. Practice\n```python\n# close the action plan gap\n# Action Plan\nprint(1)\n```\n2. Ship";
        let sections = parse_sections(raw);
        assert_eq!(
            sections.learning_path,
            "1. Practice\n```python\n# close the action plan gap\n# Action Plan\nprint(1)\n```\n2. Ship"
        );
        assert_eq!(sections.action_plan, "");
        assert_eq!(stage_headings(raw), vec![Stage::LearningPath]);
    }

    #[test]
    fn test_crlf_headings() {
        let raw = "## Skill Gap\r\nA\r\n## Action Plan\r\nC\r\n";
        let sections = parse_sections(raw);
        assert_eq!(sections.skill_gap, "A");
        assert_eq!(sections.action_plan, "C");
    }
}
