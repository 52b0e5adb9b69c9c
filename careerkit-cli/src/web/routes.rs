//! Web routes

use super::pages;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Router,
};
use careerkit_crew::{plan_exports, Crew, Profile};
use careerkit_error::{Error, ErrorCategory, Result};
use careerkit_llm::LlmProvider;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state: one crew serves every request.
pub struct AppState<P> {
    crew: Arc<Crew<P>>,
}

impl<P> AppState<P> {
    pub fn new(crew: Crew<P>) -> Self {
        Self { crew: Arc::new(crew) }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            crew: Arc::clone(&self.crew),
        }
    }
}

/// Raw form fields as submitted; everything is text until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanForm {
    pub career_goal: String,
    pub industry: String,
    pub industry_other: String,
    pub current_skills: String,
    pub experience_level: String,
    pub education: String,
    pub time_commitment: String,
}

impl PlanForm {
    /// The prefilled example profile shown on first visit
    pub fn initial() -> Self {
        Self {
            career_goal: "Senior Machine Learning Engineer".into(),
            industry: "Technology/AI".into(),
            industry_other: String::new(),
            current_skills: "Python, Basic ML algorithms, Data analysis, SQL".into(),
            experience_level: "2 years as Junior Data Analyst".into(),
            education: "Bachelor's in Computer Science".into(),
            time_commitment: "15".into(),
        }
    }

    pub fn to_profile(&self) -> Result<Profile> {
        let industry = if self.industry == "Other" {
            &self.industry_other
        } else {
            &self.industry
        };
        let time_commitment = self.time_commitment.trim().parse::<u32>().map_err(|_| {
            Error::validation_failed("time_commitment", "weekly hours must be a whole number")
                .with_operation("web::plan")
        })?;

        Ok(Profile {
            career_goal: self.career_goal.trim().to_string(),
            industry: industry.trim().to_string(),
            current_skills: self.current_skills.trim().to_string(),
            experience_level: self.experience_level.trim().to_string(),
            education: self.education.trim().to_string(),
            time_commitment,
        })
    }
}

pub fn router<P: LlmProvider + 'static>(state: AppState<P>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plan", post(plan::<P>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(pages::index_page(&PlanForm::initial(), None))
}

async fn health() -> &'static str {
    "ok"
}

async fn plan<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    Form(form): Form<PlanForm>,
) -> (StatusCode, Html<String>) {
    let outcome = match form.to_profile() {
        Ok(profile) => state.crew.run(&profile).await.map(|result| (profile, result)),
        Err(err) => Err(err),
    };

    match outcome {
        Ok((profile, result)) => {
            let exports = plan_exports(&profile, &result.sections, chrono::Local::now().naive_local());
            (StatusCode::OK, Html(pages::plan_page(&profile, &result, &exports)))
        }
        Err(err) if err.category() == ErrorCategory::Validation => {
            tracing::info!(error = %err, "profile rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(pages::index_page(&form, Some(err.message()))),
            )
        }
        Err(err) => {
            let status = match err.category() {
                ErrorCategory::Execution => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Html(pages::error_page(&err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use careerkit_crew::CrewConfig;
    use careerkit_llm::{ApiKey, ProviderError, ScriptedProvider};
    use tower::ServiceExt;

    const REPLIES: [&str; 3] = [
        "## Skill Gap Analysis\n- PyTorch <advanced>",
        "## Learning Path\n- Deep Learning Specialization",
        "## 30-Day Action Plan\nDay 1: set up a GPU notebook",
    ];

    fn state_with(provider: ScriptedProvider) -> AppState<ScriptedProvider> {
        let crew = Crew::new(CrewConfig::default(), provider)
            .unwrap()
            .with_credential(ApiKey::new("gsk-test"));
        AppState::new(crew)
    }

    fn form_body(career_goal: &str, industry: &str, hours: &str) -> String {
        format!(
            "career_goal={}&industry={}&industry_other=Fintech+Payments&current_skills=Python%2C+SQL\
             &experience_level=2+years&education=BSc&time_commitment={}",
            career_goal, industry, hours
        )
    }

    fn post_plan(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/plan")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = router(state_with(ScriptedProvider::new()));

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Senior Machine Learning Engineer"));
        assert!(html.contains(r#"<option value="Other">"#));

        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(resp).await, "ok");
    }

    #[tokio::test]
    async fn test_plan_renders_sections_and_downloads() {
        let state = state_with(ScriptedProvider::with_replies(REPLIES));
        let crew = Arc::clone(&state.crew);
        let app = router(state);

        let resp = app
            .oneshot(post_plan(form_body("Data+Engineer", "Data+Science", "20")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;

        assert!(html.contains("- PyTorch &lt;advanced&gt;"));
        assert!(html.contains("Day 1: set up a GPU notebook"));
        assert!(html.contains("20 hours/week"));
        assert!(html.contains("data:text/markdown;charset=utf-8;base64,"));
        assert!(html.contains("data:text/plain;charset=utf-8;base64,"));
        assert!(html.contains(r#"download="career_plan_"#));
        assert_eq!(crew.provider().call_count(), 3);
    }

    #[tokio::test]
    async fn test_other_industry_uses_free_text() {
        let state = state_with(ScriptedProvider::with_replies(REPLIES));
        let crew = Arc::clone(&state.crew);
        let app = router(state);

        let resp = app
            .oneshot(post_plan(form_body("Data+Engineer", "Other", "10")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let first = &crew.provider().requests()[0];
        assert!(first.messages[1].content.contains("Fintech Payments"));
    }

    #[tokio::test]
    async fn test_missing_field_rerenders_form() {
        let state = state_with(ScriptedProvider::with_replies(REPLIES));
        let crew = Arc::clone(&state.crew);
        let app = router(state);

        let resp = app.oneshot(post_plan(form_body("", "DevOps", "15"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(resp).await;
        assert!(html.contains("please fill in all required fields: Career Goal"));
        assert!(html.contains(r#"<option value="DevOps" selected>"#));
        assert_eq!(crew.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_hours_rejected() {
        let app = router(state_with(ScriptedProvider::with_replies(REPLIES)));
        let resp = app.oneshot(post_plan(form_body("Goal", "DevOps", "lots"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(resp).await.contains("whole number"));
    }

    #[tokio::test]
    async fn test_stage_failure_renders_error_page() {
        let provider = ScriptedProvider::with_replies([REPLIES[0]]);
        provider.push_error(ProviderError::Network("connection reset".into()));
        let app = router(state_with(provider));

        let resp = app.oneshot(post_plan(form_body("Goal", "DevOps", "15"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(resp).await;
        assert!(html.contains("An error occurred while generating your plan."));
        assert!(html.contains("ExecutionError"));
        assert!(html.contains("stage: learning_path"));
        assert!(html.contains("Common issues"));
        assert!(html.contains(r#"href="/">Try again"#));
        assert!(!html.contains("Skill Gap Analysis</h2>"));
    }

    #[test]
    fn test_form_to_profile_trims() {
        let form = PlanForm {
            career_goal: "  Staff Engineer ".into(),
            time_commitment: " 25 ".into(),
            ..PlanForm::initial()
        };
        let profile = form.to_profile().unwrap();
        assert_eq!(profile.career_goal, "Staff Engineer");
        assert_eq!(profile.time_commitment, 25);
        assert_eq!(profile.industry, "Technology/AI");
    }
}
