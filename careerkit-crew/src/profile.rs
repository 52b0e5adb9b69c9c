//! The career profile every stage prompt is built from.

use careerkit_error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for the weekly commitment; there are 168 hours in a week.
pub const MAX_WEEKLY_HOURS: u32 = 168;

/// User-supplied career inputs. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub career_goal: String,
    pub industry: String,
    /// Comma-separated list, e.g. "Python, SQL, Data analysis"
    pub current_skills: String,
    pub experience_level: String,
    pub education: String,
    /// Hours per week available for learning
    pub time_commitment: u32,
}

/// The six profile fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    CareerGoal,
    Industry,
    CurrentSkills,
    ExperienceLevel,
    Education,
    TimeCommitment,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::CareerGoal,
        ProfileField::Industry,
        ProfileField::CurrentSkills,
        ProfileField::ExperienceLevel,
        ProfileField::Education,
        ProfileField::TimeCommitment,
    ];

    /// Snake-case key, also the template placeholder name
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::CareerGoal => "career_goal",
            ProfileField::Industry => "industry",
            ProfileField::CurrentSkills => "current_skills",
            ProfileField::ExperienceLevel => "experience_level",
            ProfileField::Education => "education",
            ProfileField::TimeCommitment => "time_commitment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::CareerGoal => "Career Goal",
            ProfileField::Industry => "Industry",
            ProfileField::CurrentSkills => "Current Skills",
            ProfileField::ExperienceLevel => "Experience Level",
            ProfileField::Education => "Education",
            ProfileField::TimeCommitment => "Time Commitment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl Profile {
    /// The value of a field as it is substituted into prompts
    pub fn value(&self, field: ProfileField) -> String {
        match field {
            ProfileField::CareerGoal => self.career_goal.clone(),
            ProfileField::Industry => self.industry.clone(),
            ProfileField::CurrentSkills => self.current_skills.clone(),
            ProfileField::ExperienceLevel => self.experience_level.clone(),
            ProfileField::Education => self.education.clone(),
            ProfileField::TimeCommitment => self.time_commitment.to_string(),
        }
    }

    /// Every field that is blank or out of range, in form order
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| match field {
                ProfileField::TimeCommitment => {
                    self.time_commitment == 0 || self.time_commitment > MAX_WEEKLY_HOURS
                }
                other => self.value(*other).trim().is_empty(),
            })
            .collect()
    }

    /// Reject the profile unless every field is populated.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }

        let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
        let mut err = Error::new(
            ErrorKind::ValidationFailed,
            format!("please fill in all required fields: {}", labels.join(", ")),
        )
        .with_operation("profile::validate");
        for field in &missing {
            err = err.with_context("field", field.key());
        }
        Err(err)
    }
}
