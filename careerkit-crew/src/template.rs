//! Prompt templates for the three stages.
//!
//! Each stage pairs an agent persona (role, goal, backstory) with a task
//! description containing `{placeholder}`s for profile fields and an advisory
//! expected-output hint. Templates can be overridden from the config file;
//! anything left out falls back to the built-in defaults below.

use crate::profile::{Profile, ProfileField};
use careerkit_error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SkillGap,
    LearningPath,
    ActionPlan,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::SkillGap, Stage::LearningPath, Stage::ActionPlan];

    /// Section key, e.g. `skill_gap`
    pub fn key(&self) -> &'static str {
        match self {
            Stage::SkillGap => "skill_gap",
            Stage::LearningPath => "learning_path",
            Stage::ActionPlan => "action_plan",
        }
    }

    /// Heading label the section parser looks for
    pub fn label(&self) -> &'static str {
        match self {
            Stage::SkillGap => "Skill Gap",
            Stage::LearningPath => "Learning Path",
            Stage::ActionPlan => "Action Plan",
        }
    }

    /// Full section title; always contains [`Stage::label`]
    pub fn title(&self) -> &'static str {
        match self {
            Stage::SkillGap => "Skill Gap Analysis",
            Stage::LearningPath => "Learning Path Design",
            Stage::ActionPlan => "30-Day Action Plan",
        }
    }

    /// 1-based position in the pipeline
    pub fn ordinal(&self) -> usize {
        match self {
            Stage::SkillGap => 1,
            Stage::LearningPath => 2,
            Stage::ActionPlan => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Typed configuration of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub description: String,
    pub expected_output: String,
}

/// A stage template bound to a concrete profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTask {
    pub stage: Stage,
    pub name: String,
    pub role: String,
    pub system_prompt: String,
    pub description: String,
    pub expected_output: String,
    pub ordinal: usize,
}

/// Lookup table of the three stage templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateStore {
    pub skill_gap: StageConfig,
    pub learning_path: StageConfig,
    pub action_plan: StageConfig,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Placeholder names used by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Substitute `{field}` placeholders with profile values.
pub fn render(template: &str, profile: &Profile) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let field = ProfileField::from_key(&caps[1]).ok_or_else(|| unknown_placeholder(&caps[1]))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&profile.value(field));
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

fn unknown_placeholder(name: &str) -> Error {
    Error::config_invalid(format!("unknown placeholder '{{{}}}'", name))
        .with_context("placeholder", name)
}

impl StageConfig {
    fn validate(&self, stage: Stage) -> Result<()> {
        let fields = [
            ("role", &self.role),
            ("goal", &self.goal),
            ("backstory", &self.backstory),
            ("description", &self.description),
            ("expected_output", &self.expected_output),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::config_invalid(format!("{} must not be empty", name))
                    .with_operation("template::validate")
                    .with_context("stage", stage.key()));
            }
            for placeholder in placeholders(value) {
                if ProfileField::from_key(&placeholder).is_none() {
                    return Err(unknown_placeholder(&placeholder)
                        .with_operation("template::validate")
                        .with_context("stage", stage.key()));
                }
            }
        }
        Ok(())
    }

    fn system_prompt(&self, profile: &Profile) -> Result<String> {
        Ok(format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            render(&self.role, profile)?,
            render(&self.backstory, profile)?,
            render(&self.goal, profile)?
        ))
    }
}

impl TemplateStore {
    pub fn get(&self, stage: Stage) -> &StageConfig {
        match stage {
            Stage::SkillGap => &self.skill_gap,
            Stage::LearningPath => &self.learning_path,
            Stage::ActionPlan => &self.action_plan,
        }
    }

    /// Check that every stage is complete and only references known fields.
    pub fn validate(&self) -> Result<()> {
        for stage in Stage::ALL {
            self.get(stage).validate(stage)?;
        }
        Ok(())
    }

    /// Bind the three templates to a profile, in pipeline order.
    pub fn tasks_for(&self, profile: &Profile) -> Result<Vec<PromptTask>> {
        Stage::ALL
            .into_iter()
            .map(|stage| {
                let config = self.get(stage);
                Ok(PromptTask {
                    stage,
                    name: format!("{}_task", stage.key()),
                    role: render(&config.role, profile)?,
                    system_prompt: config.system_prompt(profile)?,
                    description: render(&config.description, profile)?,
                    expected_output: render(&config.expected_output, profile)?,
                    ordinal: stage.ordinal(),
                })
            })
            .collect()
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self {
            skill_gap: StageConfig {
                role: "Senior Career Development Analyst".into(),
                goal: "Identify the most important skill gaps between the candidate's current \
                       profile and their target role of {career_goal}"
                    .into(),
                backstory: "You have spent fifteen years analysing hiring requirements across the \
                            {industry} industry and know which skills actually move candidates forward."
                    .into(),
                description: "Analyse the skill gap for a candidate who wants to become a \
                              {career_goal} in the {industry} industry.\n\
                              Current skills: {current_skills}\n\
                              Experience: {experience_level}\n\
                              Education: {education}\n\n\
                              Identify the top 3 technical skills to develop, the 2 most critical soft \
                              skills, 2 domain-specific skills for the industry, and any certifications \
                              worth pursuing. Prioritise by importance and urgency."
                    .into(),
                expected_output: "A short markdown report that starts with the heading \
                                  '## Skill Gap Analysis', uses bullet lists, and stays under 300 words."
                    .into(),
            },
            learning_path: StageConfig {
                role: "Educational Curriculum Architect".into(),
                goal: "Design a realistic learning roadmap that closes the skill gaps for a \
                       future {career_goal}"
                    .into(),
                backstory: "You design curricula for working professionals and know the best \
                            courses, projects and certifications on Coursera, Udemy and similar platforms."
                    .into(),
                description: "Design a phased learning path for someone targeting {career_goal} in \
                              {industry}, who already knows: {current_skills}.\n\
                              They can dedicate {time_commitment} hours per week.\n\n\
                              Break the path into phases with milestones, recommend specific courses, \
                              hands-on portfolio projects and certifications, and estimate how long \
                              each phase takes at that weekly pace."
                    .into(),
                expected_output: "A short markdown roadmap that starts with the heading \
                                  '## Learning Path', one sub-list per phase, under 350 words."
                    .into(),
            },
            action_plan: StageConfig {
                role: "Executive Performance Coach".into(),
                goal: "Turn the learning roadmap into an achievable 30-day plan for a future \
                       {career_goal}"
                    .into(),
                backstory: "You coach professionals through career transitions and are known for \
                            plans built from small daily wins and weekly accountability."
                    .into(),
                description: "Create a 30-day action plan for someone with {experience_level} who \
                              is working towards {career_goal} with {time_commitment} hours per week.\n\n\
                              Give daily tasks of 15 to 60 minutes grouped by week, a review checkpoint \
                              at the end of every week, and a few quick wins for the first days."
                    .into(),
                expected_output: "A short markdown plan that starts with the heading \
                                  '## 30-Day Action Plan', one sub-list per week, under 400 words."
                    .into(),
            },
        }
    }
}
