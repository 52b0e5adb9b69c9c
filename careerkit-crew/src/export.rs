//! Downloadable renditions of a finished plan.

use crate::parser::Sections;
use crate::profile::Profile;
use crate::template::Stage;
use careerkit_error::{Error, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Fixed checklist printed on the quick reference card
pub const QUICK_ACTIONS: [&str; 5] = [
    "Review skill gaps daily",
    "Enroll in recommended courses",
    "Complete Week 1 tasks",
    "Build first project",
    "Update resume and LinkedIn",
];

const SECTION_PLACEHOLDER: &str = "See complete report below";

/// One export artifact, ready to be written or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanExport {
    pub file_name: String,
    pub mime: &'static str,
    pub content: String,
}

/// Long-form markdown: profile summary, the three sections and the full output.
pub fn markdown_report(profile: &Profile, sections: &Sections, generated_at: NaiveDateTime) -> String {
    let section = |stage: Stage| {
        let text = sections.get(stage);
        if text.trim().is_empty() {
            SECTION_PLACEHOLDER
        } else {
            text
        }
    };

    format!(
        "# Career Development Plan\n\
         Generated on: {generated}\n\
         \n\
         ## Profile Summary\n\
         - **Career Goal**: {goal}\n\
         - **Industry**: {industry}\n\
         - **Experience Level**: {experience}\n\
         - **Education**: {education}\n\
         - **Current Skills**: {skills}\n\
         - **Time Commitment**: {hours} hours/week\n\
         \n\
         ---\n\
         \n\
         ## Skill Gap Analysis\n\
         {skill_gap}\n\
         \n\
         ---\n\
         \n\
         ## Learning Path Design\n\
         {learning_path}\n\
         \n\
         ---\n\
         \n\
         ## 30-Day Action Plan\n\
         {action_plan}\n\
         \n\
         ---\n\
         \n\
         ## Complete Analysis\n\
         {full}\n\
         \n\
         ---\n\
         \n\
         *Generated by Career Accelerator*\n",
        generated = generated_at.format("%Y-%m-%d %H:%M"),
        goal = profile.career_goal,
        industry = profile.industry,
        experience = profile.experience_level,
        education = profile.education,
        skills = profile.current_skills,
        hours = profile.time_commitment,
        skill_gap = section(Stage::SkillGap),
        learning_path = section(Stage::LearningPath),
        action_plan = section(Stage::ActionPlan),
        full = sections.full_output,
    )
}

/// Short plain-text card: goal, the fixed checklist and the weekly hours.
pub fn quick_reference(profile: &Profile, generated_at: NaiveDateTime) -> String {
    let actions: String = QUICK_ACTIONS
        .iter()
        .enumerate()
        .map(|(i, action)| format!("{}. {}\n", i + 1, action))
        .collect();

    format!(
        "Career Plan Summary - {date}\n\nGoal: {goal} in {industry}\n\nQuick Action Items:\n{actions}\nTime Commitment: {hours} hrs/week\n",
        date = generated_at.format("%Y-%m-%d"),
        goal = profile.career_goal,
        industry = profile.industry,
        hours = profile.time_commitment,
    )
}

pub fn markdown_file_name(generated_at: NaiveDateTime) -> String {
    format!("career_plan_{}.md", generated_at.format("%Y%m%d_%H%M"))
}

pub fn quick_reference_file_name(generated_at: NaiveDateTime) -> String {
    format!("quick_reference_{}.txt", generated_at.format("%Y%m%d"))
}

/// Both exports: the markdown report first, then the quick reference.
pub fn plan_exports(profile: &Profile, sections: &Sections, generated_at: NaiveDateTime) -> [PlanExport; 2] {
    [
        PlanExport {
            file_name: markdown_file_name(generated_at),
            mime: "text/markdown",
            content: markdown_report(profile, sections, generated_at),
        },
        PlanExport {
            file_name: quick_reference_file_name(generated_at),
            mime: "text/plain",
            content: quick_reference(profile, generated_at),
        },
    ]
}

impl PlanExport {
    /// Write into `dir` (created if missing) and return the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::from(e)
                .with_operation("export::write_to")
                .with_context("dir", dir.display().to_string())
        })?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content).map_err(|e| {
            Error::from(e)
                .with_operation("export::write_to")
                .with_context("path", path.display().to_string())
        })?;
        Ok(path)
    }
}
