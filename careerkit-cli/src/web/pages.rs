//! HTML page generation
//!
//! Pages are plain `format!` templates. Every user or model supplied string
//! goes through [`escape`] before it is interpolated.

use super::routes::PlanForm;
use base64::{engine::general_purpose::STANDARD, Engine};
use careerkit_crew::{PipelineResult, PlanExport, Profile, Stage};
use careerkit_error::Error;

pub const INDUSTRIES: [&str; 8] = [
    "Technology/AI",
    "Data Science",
    "Software Development",
    "Cloud Computing",
    "Cybersecurity",
    "Product Management",
    "DevOps",
    "Other",
];

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2933; background: #f7f9fb; }
header { background: #1f77b4; color: #fff; padding: 1.5rem 2rem; }
header h1 { margin: 0; }
header p { margin: 0.25rem 0 0; opacity: 0.85; }
main { max-width: 960px; margin: 0 auto; padding: 1.5rem 2rem; }
form label { display: block; margin-top: 1rem; font-weight: 600; }
form input[type=text], form textarea, form select { width: 100%; padding: 0.5rem; box-sizing: border-box; }
button, .button { margin-top: 1.5rem; background: #1f77b4; color: #fff; border: 0; padding: 0.6rem 1.4rem; border-radius: 4px; text-decoration: none; display: inline-block; }
.notice { background: #fdecea; border-left: 4px solid #d64545; padding: 0.75rem 1rem; }
.tip { background: #e8f4fd; border-left: 4px solid #1f77b4; padding: 0.75rem 1rem; }
.section { background: #fff; border-radius: 6px; padding: 1rem 1.5rem; margin: 1rem 0; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
.plan { white-space: pre-wrap; font-family: inherit; }
.columns { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `data:` URL carrying an export, so downloads need no server-side storage.
pub fn data_url(export: &PlanExport) -> String {
    format!(
        "data:{};charset=utf-8;base64,{}",
        export.mime,
        STANDARD.encode(export.content.as_bytes())
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <header>
        <h1>Career Accelerator</h1>
        <p>Your personalized career development plan</p>
    </header>
    <main>
{body}
    </main>
</body>
</html>"#,
        title = escape(title),
        css = CSS,
        body = body,
    )
}

/// Profile form, optionally with a message above it.
pub fn index_page(form: &PlanForm, notice: Option<&str>) -> String {
    let notice_html = notice
        .map(|msg| format!(r#"<p class="notice">{}</p>"#, escape(msg)))
        .unwrap_or_default();

    let options: String = INDUSTRIES
        .iter()
        .map(|industry| {
            let selected = if *industry == form.industry { " selected" } else { "" };
            format!(
                r#"<option value="{v}"{selected}>{v}</option>"#,
                v = escape(industry),
                selected = selected
            )
        })
        .collect();

    let body = format!(
        r#"        {notice}
        <form method="post" action="/plan" class="section">
            <h2>Your Profile</h2>
            <label for="career_goal">Career Goal</label>
            <input type="text" id="career_goal" name="career_goal" value="{goal}" placeholder="What position are you aiming for?">

            <label for="industry">Industry</label>
            <select id="industry" name="industry">{options}</select>
            <label for="industry_other">If Other, please specify your industry</label>
            <input type="text" id="industry_other" name="industry_other" value="{other}">

            <label for="current_skills">Current Skills</label>
            <textarea id="current_skills" name="current_skills" rows="4" placeholder="Comma-separated">{skills}</textarea>

            <label for="experience_level">Experience Level</label>
            <input type="text" id="experience_level" name="experience_level" value="{experience}">

            <label for="education">Education</label>
            <input type="text" id="education" name="education" value="{education}">

            <label for="time_commitment">Weekly Time Commitment (hours): <output id="hours">{hours}</output></label>
            <input type="range" id="time_commitment" name="time_commitment" min="5" max="40" step="5" value="{hours}"
                   oninput="document.getElementById('hours').value = this.value">

            <button type="submit">Generate Career Plan</button>
        </form>
        <div class="section">
            <h2>What you'll get</h2>
            <ul>
                <li><strong>Skill Gap Analysis</strong>: the skills between you and your goal, prioritised</li>
                <li><strong>Learning Path</strong>: courses, projects and certifications in order</li>
                <li><strong>30-Day Action Plan</strong>: daily tasks and weekly milestones</li>
            </ul>
        </div>"#,
        notice = notice_html,
        goal = escape(&form.career_goal),
        options = options,
        other = escape(&form.industry_other),
        skills = escape(&form.current_skills),
        experience = escape(&form.experience_level),
        education = escape(&form.education),
        hours = escape(&form.time_commitment),
    );

    layout("Career Accelerator", &body)
}

fn profile_summary(profile: &Profile) -> String {
    format!(
        r#"<div class="section">
            <h2>Your Profile Summary</h2>
            <div class="columns">
                <div><strong>Career Goal</strong><br>{goal}</div>
                <div><strong>Industry</strong><br>{industry}</div>
                <div><strong>Experience</strong><br>{experience}</div>
                <div><strong>Education</strong><br>{education}</div>
                <div><strong>Time Commitment</strong><br>{hours} hours/week</div>
            </div>
            <p><strong>Current Skills:</strong> {skills}</p>
        </div>"#,
        goal = escape(&profile.career_goal),
        industry = escape(&profile.industry),
        experience = escape(&profile.experience_level),
        education = escape(&profile.education),
        hours = profile.time_commitment,
        skills = escape(&profile.current_skills),
    )
}

fn stage_tip(stage: Stage) -> &'static str {
    match stage {
        Stage::SkillGap => "Focus on high-priority skills first.",
        Stage::LearningPath => "Bookmark recommended courses now and block learning time in your calendar.",
        Stage::ActionPlan => "Set daily reminders for your tasks and review progress every Sunday.",
    }
}

/// The finished plan with downloads.
pub fn plan_page(profile: &Profile, result: &PipelineResult, exports: &[PlanExport]) -> String {
    let mut body = profile_summary(profile);

    if result.sections.is_degraded() {
        body.push_str(
            r#"<p class="tip">The plan came back without the usual headings, so each section shows the complete report.</p>"#,
        );
    }

    for stage in Stage::ALL {
        body.push_str(&format!(
            r#"
        <div class="section" id="{key}">
            <h2>{title}</h2>
            <div class="plan">{text}</div>
            <p class="tip">{tip}</p>
        </div>"#,
            key = stage.key(),
            title = stage.title(),
            text = escape(result.sections.display(stage)),
            tip = stage_tip(stage),
        ));
    }

    body.push_str(&format!(
        r#"
        <details class="section">
            <summary><strong>Complete Detailed Report</strong></summary>
            <div class="plan">{}</div>
        </details>"#,
        escape(&result.sections.full_output)
    ));

    let links: String = exports
        .iter()
        .map(|export| {
            format!(
                r#"<a class="button" href="{href}" download="{name}">Download {name}</a> "#,
                href = data_url(export),
                name = escape(&export.file_name),
            )
        })
        .collect();
    body.push_str(&format!(
        r#"
        <div class="section">
            <h2>Save Your Plan</h2>
            {links}
        </div>
        <div class="section columns">
            <div><h3>Today</h3>Review the full plan, download it, schedule learning time.</div>
            <div><h3>This Week</h3>Enroll in courses, gather resources, start Day 1 tasks.</div>
            <div><h3>This Month</h3>Track daily progress, review weekly, complete milestones.</div>
            <div><h3>Beyond</h3>Build a portfolio, network actively, apply for roles.</div>
        </div>
        <a class="button" href="/">Plan another goal</a>"#,
        links = links
    ));

    layout("Your Career Plan", &body)
}

/// Failure page: generic notice, collapsible detail and troubleshooting tips.
pub fn error_page(err: &Error) -> String {
    let body = format!(
        r#"        <p class="notice">An error occurred while generating your plan.</p>
        <details class="section">
            <summary>Error details ({category})</summary>
            <pre>{detail}</pre>
        </details>
        <div class="section columns">
            <div>
                <h3>Common issues</h3>
                <ol>
                    <li>API key not configured</li>
                    <li>Network connectivity</li>
                    <li>Rate limiting</li>
                    <li>Invalid configuration</li>
                </ol>
            </div>
            <div>
                <h3>Solutions</h3>
                <ol>
                    <li>Check your .env file or secret store</li>
                    <li>Verify your internet connection</li>
                    <li>Wait a moment and retry</li>
                    <li>Review careerkit.toml</li>
                </ol>
            </div>
        </div>
        <a class="button" href="/">Try again</a>"#,
        category = err.category(),
        detail = escape(&err.to_string()),
    );

    layout("Something went wrong", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_data_url_is_base64() {
        let export = PlanExport {
            file_name: "quick_reference_20260309.txt".into(),
            mime: "text/plain",
            content: "Goal: a b".into(),
        };
        assert_eq!(data_url(&export), "data:text/plain;charset=utf-8;base64,R29hbDogYSBi");
    }

    #[test]
    fn test_index_page_selects_industry() {
        let form = PlanForm {
            industry: "DevOps".into(),
            ..PlanForm::initial()
        };
        let html = index_page(&form, Some("please fill in <all>"));
        assert!(html.contains(r#"<option value="DevOps" selected>"#));
        assert!(html.contains("please fill in &lt;all&gt;"));
        assert!(html.contains(r#"min="5" max="40" step="5" value="15""#));
    }
}
