use std::sync::{Arc, RwLock};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use storage::keys;
use storage::repository::KeyValueStore;

use super::config::ApiConfig;
use super::types::{
    ApiResponse, AuthMessage, ChatMessage, CourseProgress, DashboardStats, Discussion, Lesson,
    LoginRequest, NewDiscussion, NewStudyPlan, Page, ProfileUpdate, RemoteAssignment,
    RemoteCourse, RemoteStudyPlan, Reply, SignupRequest, StudyPlanUpdate, TokenRefresh,
    TutorSession, User, UserProgress,
};
use crate::error::ApiError;

type Query<'a> = &'a [(&'a str, String)];

/// Thin JSON client for the StudyMate backend.
///
/// Every call resolves to an `ApiResponse`; transport and HTTP failures are
/// folded into `success = false` with a readable `error`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: config.base_url,
            token: Arc::default(),
            store: None,
        })
    }

    /// Client that keeps its bearer token in `store`, starting from any
    /// token already saved there.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub async fn with_store(
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let mut client = Self::new(config)?;
        let token = match store.get(keys::AUTH_TOKEN).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read saved auth token");
                None
            }
        };
        client.token = Arc::new(RwLock::new(token));
        client.store = Some(store);
        Ok(client)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.clone());
        }
        if let Some(store) = &self.store {
            if let Err(err) = store.set(keys::AUTH_TOKEN, &token).await {
                warn!(error = %err, "failed to persist auth token");
            }
        }
    }

    /// Forget the token and the cached user profile.
    pub async fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
        if let Some(store) = &self.store {
            for key in [keys::AUTH_TOKEN, keys::USER] {
                if let Err(err) = store.remove(key).await {
                    warn!(key, error = %err, "failed to clear saved session");
                }
            }
        }
    }

    pub async fn logout(&self) {
        self.clear_token().await;
    }

    //
    // ─── AUTH ──────────────────────────────────────────────────────────────────
    //

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResponse<AuthMessage> {
        self.post("/auth/login", credentials).await
    }

    pub async fn signup(&self, user: &SignupRequest) -> ApiResponse<AuthMessage> {
        self.post("/auth/signup", user).await
    }

    pub async fn refresh_token(&self) -> ApiResponse<TokenRefresh> {
        self.post_empty("/auth/refresh").await
    }

    //
    // ─── USERS ─────────────────────────────────────────────────────────────────
    //

    pub async fn current_user(&self) -> ApiResponse<User> {
        self.get("/users/me", &[]).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResponse<User> {
        self.send(Method::PUT, "/users/me", &[], Some(update)).await
    }

    //
    // ─── COURSES ───────────────────────────────────────────────────────────────
    //

    pub async fn courses(
        &self,
        page: u32,
        size: u32,
        category: Option<&str>,
    ) -> ApiResponse<Page<RemoteCourse>> {
        let mut query = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        self.get("/courses", &query).await
    }

    /// Courses the signed-in user is enrolled in.
    pub async fn my_courses(&self, page: u32, size: u32) -> ApiResponse<Page<RemoteCourse>> {
        let query = [
            ("page", page.to_string()),
            ("size", size.to_string()),
            ("enrolled", "true".to_string()),
        ];
        self.get("/courses", &query).await
    }

    pub async fn course(&self, course_id: &str) -> ApiResponse<RemoteCourse> {
        self.get(&format!("/courses/{course_id}"), &[]).await
    }

    pub async fn enroll(&self, course_id: &str) -> ApiResponse<()> {
        self.post_empty(&format!("/courses/{course_id}/enroll")).await
    }

    pub async fn course_lessons(&self, course_id: &str) -> ApiResponse<Vec<Lesson>> {
        self.get(&format!("/courses/{course_id}/lessons"), &[]).await
    }

    pub async fn mark_lesson_complete(&self, course_id: &str, lesson_id: &str) -> ApiResponse<()> {
        self.post_empty(&format!("/courses/{course_id}/lessons/{lesson_id}/complete"))
            .await
    }

    //
    // ─── ASSIGNMENTS ───────────────────────────────────────────────────────────
    //

    pub async fn assignments(&self, course_id: Option<&str>) -> ApiResponse<Vec<RemoteAssignment>> {
        let query: Vec<(&str, String)> = course_id
            .map(|id| ("courseId", id.to_string()))
            .into_iter()
            .collect();
        self.get("/assignments", &query).await
    }

    pub async fn assignment(&self, assignment_id: &str) -> ApiResponse<RemoteAssignment> {
        self.get(&format!("/assignments/{assignment_id}"), &[]).await
    }

    pub async fn submit_assignment<S: Serialize + Sync + ?Sized>(
        &self,
        assignment_id: &str,
        submission: &S,
    ) -> ApiResponse<()> {
        self.post(&format!("/assignments/{assignment_id}/submit"), submission)
            .await
    }

    //
    // ─── STUDY PLANS ───────────────────────────────────────────────────────────
    //

    pub async fn study_plans(&self) -> ApiResponse<Vec<RemoteStudyPlan>> {
        self.get("/study-plans", &[]).await
    }

    pub async fn create_study_plan(&self, plan: &NewStudyPlan) -> ApiResponse<RemoteStudyPlan> {
        self.post("/study-plans", plan).await
    }

    pub async fn update_study_plan(
        &self,
        plan_id: &str,
        update: &StudyPlanUpdate,
    ) -> ApiResponse<RemoteStudyPlan> {
        self.send(Method::PUT, &format!("/study-plans/{plan_id}"), &[], Some(update))
            .await
    }

    pub async fn delete_study_plan(&self, plan_id: &str) -> ApiResponse<()> {
        self.send(Method::DELETE, &format!("/study-plans/{plan_id}"), &[], None::<&()>)
            .await
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    pub async fn user_progress(&self) -> ApiResponse<UserProgress> {
        self.get("/progress/me", &[]).await
    }

    pub async fn dashboard_stats(&self) -> ApiResponse<DashboardStats> {
        self.get("/progress/dashboard-stats", &[]).await
    }

    pub async fn course_progress(&self, course_id: &str) -> ApiResponse<CourseProgress> {
        self.get(&format!("/progress/courses/{course_id}"), &[]).await
    }

    //
    // ─── COMMUNITY ─────────────────────────────────────────────────────────────
    //

    pub async fn discussions(
        &self,
        course_id: Option<&str>,
        page: u32,
        size: u32,
    ) -> ApiResponse<Page<Discussion>> {
        let mut query = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(course_id) = course_id {
            query.push(("courseId", course_id.to_string()));
        }
        self.get("/discussions", &query).await
    }

    pub async fn create_discussion(&self, discussion: &NewDiscussion) -> ApiResponse<Discussion> {
        self.post("/discussions", discussion).await
    }

    pub async fn reply_to_discussion(
        &self,
        discussion_id: &str,
        content: &str,
    ) -> ApiResponse<Reply> {
        self.post(
            &format!("/discussions/{discussion_id}/replies"),
            &serde_json::json!({ "content": content }),
        )
        .await
    }

    pub async fn like_discussion(&self, discussion_id: &str) -> ApiResponse<()> {
        self.post_empty(&format!("/discussions/{discussion_id}/like")).await
    }

    //
    // ─── AI TUTOR ──────────────────────────────────────────────────────────────
    //

    pub async fn tutor_sessions(&self) -> ApiResponse<Vec<TutorSession>> {
        self.get("/ai-tutor/sessions", &[]).await
    }

    pub async fn create_tutor_session(&self, subject: &str) -> ApiResponse<TutorSession> {
        self.post("/ai-tutor/sessions", &serde_json::json!({ "subject": subject }))
            .await
    }

    pub async fn send_tutor_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> ApiResponse<ChatMessage> {
        self.post(
            &format!("/ai-tutor/sessions/{session_id}/messages"),
            &serde_json::json!({ "content": message }),
        )
        .await
    }

    //
    // ─── TRANSPORT ─────────────────────────────────────────────────────────────
    //

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> ApiResponse<T> {
        self.send(Method::GET, path, query, None::<&()>).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.send(Method::POST, path, &[], None::<&()>).await
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path, error = %err, "request failed");
                return ApiResponse::failure(err.to_string());
            }
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return ApiResponse::failure(err.to_string()),
        };
        debug!(%method, path, status = status.as_u16(), "response received");

        decode_response(status, &text)
    }
}

/// Turn a raw HTTP reply into the envelope. An empty body reads as JSON
/// `null` so unit responses decode.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResponse<T> {
    let parsed = if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(body)
    };

    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(
                || format!("HTTP error! status: {}", status.as_u16()),
                str::to_owned,
            );
        return ApiResponse::failure(message);
    }

    match parsed.and_then(serde_json::from_value::<T>) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => ApiResponse::failure(err.to_string()),
    }
}
