//! Web UI route table.

mod admin_handlers;
mod auth_handlers;
mod farmer_handlers;
mod home_handlers;
mod loan_handlers;
mod utils;
mod vegetable_handlers;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

pub use utils::anonymous_context;

/// Create the web UI router with every catalog, account and admin route
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home_handlers::index))
        .route("/health", get(home_handlers::health))
        // Catalog
        .route("/vegetables/", get(vegetable_handlers::vegetable_list))
        .route("/vegetable/:id", get(vegetable_handlers::vegetable_detail))
        .route("/farmers/", get(farmer_handlers::farmer_list))
        .route("/farmer/:id", get(farmer_handlers::farmer_detail))
        .route(
            "/farmer/create/",
            get(farmer_handlers::create_page).post(farmer_handlers::create_submit),
        )
        .route(
            "/farmer/:id/update/",
            get(farmer_handlers::update_page).post(farmer_handlers::update_submit),
        )
        .route(
            "/farmer/:id/delete/",
            get(farmer_handlers::delete_page).post(farmer_handlers::delete_submit),
        )
        // Loans
        .route("/myvegetables/", get(loan_handlers::my_borrowed))
        .route("/borrowed/", get(loan_handlers::all_borrowed))
        .route(
            "/vegetable/:id/renew/",
            get(loan_handlers::renew_page).post(loan_handlers::renew_submit),
        )
        // Accounts
        .route(
            "/accounts/login/",
            get(auth_handlers::login_page).post(auth_handlers::login_submit),
        )
        .route("/accounts/logout/", get(auth_handlers::logout))
        // Admin console
        .route("/admin/", get(admin_handlers::index))
        .route("/admin/:model/", get(admin_handlers::changelist))
        .route(
            "/admin/:model/add/",
            get(admin_handlers::add_page).post(admin_handlers::add_submit),
        )
        .route(
            "/admin/:model/:id/change/",
            get(admin_handlers::change_page).post(admin_handlers::change_submit),
        )
        .route(
            "/admin/:model/:id/delete/",
            get(admin_handlers::delete_page).post(admin_handlers::delete_submit),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NewUser, CAN_MARK_RETURNED};
    use crate::catalog::{FamilyInput, InstanceInput, VegetableInput};
    use crate::db::entities::vegetable_instance::LoanStatus;
    use crate::db::init_database;
    use crate::session::AUTH_USER_KEY;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chrono::Duration;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        _dir: TempDir,
        state: Arc<AppState>,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let db = init_database(&dir.path().join("web.db")).await.unwrap();
            let state = Arc::new(AppState::with_db(Arc::new(db)));
            Self { _dir: dir, state }
        }

        /// Register a user and return a session cookie logged in as them.
        async fn login(&self, username: &str, flags: NewUser) -> String {
            let user = self.state.auth.register_user(username, "pw", flags).await.unwrap();
            let session_id = self.state.sessions.resolve(None);
            self.state.sessions.set(&session_id, AUTH_USER_KEY, Value::from(user.id));
            format!("sessionid={}", session_id)
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut request = Request::builder().uri(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            self.send(request.body(Body::empty()).unwrap()).await
        }

        async fn post(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response {
            let mut request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            self.send(request.body(Body::from(body.to_string())).unwrap()).await
        }

        async fn send(&self, request: Request<Body>) -> Response {
            create_router()
                .with_state(self.state.clone())
                .oneshot(request)
                .await
                .unwrap()
        }

        async fn loaned_instance(&self, exp: chrono::NaiveDate) -> String {
            let veg = self
                .state
                .catalog
                .create_vegetable(VegetableInput {
                    title: "Carrot".into(),
                    summary: "Orange root".into(),
                    isbn: "9780000000001".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
            self.state
                .catalog
                .create_instance(InstanceInput {
                    vegetable_id: Some(veg.id),
                    harvest: "Autumn".into(),
                    exp_date: Some(exp),
                    status: LoanStatus::OnLoan,
                    borrower_id: None,
                })
                .await
                .unwrap()
                .id
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    fn librarian() -> NewUser {
        NewUser::default().with_permission(CAN_MARK_RETURNED)
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let response = app.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_home_counts_visits_per_session() {
        let app = TestApp::new().await;

        let first = app.get("/", None).await;
        assert_eq!(first.status(), StatusCode::OK);
        let cookie = first
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert!(body_text(first).await.contains("visited this page 0 times"));

        let second = app.get("/", Some(&cookie)).await;
        assert!(second.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(second).await.contains("visited this page 1 time."));

        let third = app.get("/", Some(&cookie)).await;
        assert!(body_text(third).await.contains("visited this page 2 times"));

        // A new browser starts from zero
        let other = app.get("/", None).await;
        assert!(body_text(other).await.contains("visited this page 0 times"));
    }

    #[tokio::test]
    async fn test_renewal_requires_login_and_permission() {
        let app = TestApp::new().await;
        let id = app.loaned_instance(utils::today()).await;
        let uri = format!("/vegetable/{}/renew/", id);

        let anonymous = app.get(&uri, None).await;
        assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&anonymous), "/accounts/login/");

        let plain = app.login("plain", NewUser::default()).await;
        assert_eq!(app.get(&uri, Some(&plain)).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            app.post(&uri, Some(&plain), "renewal_date=2030-01-01").await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_renewal_unknown_instance_is_404() {
        let app = TestApp::new().await;
        let cookie = app.login("librarian", librarian()).await;

        let missing = format!("/vegetable/{}/renew/", uuid::Uuid::new_v4());
        assert_eq!(app.get(&missing, Some(&cookie)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            app.get("/vegetable/not-a-uuid/renew/", Some(&cookie)).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_renewal_form_proposes_three_weeks() {
        let app = TestApp::new().await;
        let cookie = app.login("librarian", librarian()).await;
        let id = app.loaned_instance(utils::today()).await;

        let response = app.get(&format!("/vegetable/{}/renew/", id), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let proposed = (utils::today() + Duration::days(21)).format("%Y-%m-%d").to_string();
        assert!(body_text(response).await.contains(&format!(r#"value="{}""#, proposed)));
    }

    #[tokio::test]
    async fn test_renewal_submission() {
        let app = TestApp::new().await;
        let cookie = app.login("librarian", librarian()).await;
        let today = utils::today();
        let original = today - Duration::days(3);
        let id = app.loaned_instance(original).await;
        let uri = format!("/vegetable/{}/renew/", id);

        let too_far = (today + Duration::weeks(5)).format("%Y-%m-%d").to_string();
        let rejected = app.post(&uri, Some(&cookie), &format!("renewal_date={}", too_far)).await;
        assert_eq!(rejected.status(), StatusCode::OK);
        assert!(body_text(rejected).await.contains("Invalid date - renewal more than 4 weeks ahead"));

        let past = (today - Duration::days(1)).format("%Y-%m-%d").to_string();
        let rejected = app.post(&uri, Some(&cookie), &format!("renewal_date={}", past)).await;
        assert!(body_text(rejected).await.contains("Invalid date - renewal in past"));

        let garbage = app.post(&uri, Some(&cookie), "renewal_date=soon").await;
        assert!(body_text(garbage).await.contains("Enter a valid date."));

        assert_eq!(app.state.catalog.get_instance(&id).await.unwrap().exp_date, Some(original));

        let good = today + Duration::weeks(2);
        let accepted = app
            .post(&uri, Some(&cookie), &format!("renewal_date={}", good.format("%Y-%m-%d")))
            .await;
        assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&accepted), "/borrowed/");

        let renewed = app.state.catalog.get_instance(&id).await.unwrap();
        assert_eq!(renewed.exp_date, Some(good));
        assert_eq!(renewed.loan_status(), Some(LoanStatus::OnLoan));
    }

    #[tokio::test]
    async fn test_borrowed_listings_access() {
        let app = TestApp::new().await;

        let anonymous = app.get("/myvegetables/", None).await;
        assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);

        let plain = app.login("plain", NewUser::default()).await;
        assert_eq!(app.get("/myvegetables/", Some(&plain)).await.status(), StatusCode::OK);
        assert_eq!(app.get("/myvegetables/?page=2", Some(&plain)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.get("/myvegetables/?page=x", Some(&plain)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.get("/borrowed/", Some(&plain)).await.status(), StatusCode::FORBIDDEN);

        let staff = app.login("librarian", librarian()).await;
        app.loaned_instance(utils::today()).await;
        let listing = app.get("/borrowed/", Some(&staff)).await;
        assert_eq!(listing.status(), StatusCode::OK);
        assert!(body_text(listing).await.contains("Carrot"));
    }

    #[tokio::test]
    async fn test_farmer_create_flow() {
        let app = TestApp::new().await;

        let form = app.get("/farmer/create/", None).await;
        assert!(body_text(form).await.contains(r#"value="2018-05-01""#));

        let invalid = app.post("/farmer/create/", None, "first_name=Ada&last_name=").await;
        assert_eq!(invalid.status(), StatusCode::OK);
        assert!(body_text(invalid).await.contains("This field is required."));

        let allium = app.state.catalog.create_family(FamilyInput { name: "Allium".into() }).await.unwrap();
        let form = app.get("/farmer/create/", None).await;
        assert!(body_text(form).await.contains(r#"name="families""#));

        let created = app
            .post(
                "/farmer/create/",
                None,
                &format!("first_name=Ada&last_name=Furrow&date_of_birth=1970-05-01&date_of_death=&families={}", allium.id),
            )
            .await;
        assert_eq!(created.status(), StatusCode::SEE_OTHER);
        let detail = location(&created).to_string();
        assert!(detail.starts_with("/farmer/"));

        let page = body_text(app.get(&detail, None).await).await;
        assert!(page.contains("Furrow, Ada"));
        assert!(page.contains("Allium"));

        // updating leaves the family links alone
        let id = detail.trim_start_matches("/farmer/");
        let update_form = body_text(app.get(&format!("/farmer/{}/update/", id), None).await).await;
        assert!(!update_form.contains(r#"name="families""#));
        app.post(&format!("/farmer/{}/update/", id), None, "first_name=Ada&last_name=Furrows").await;
        let farmer_id: i32 = id.parse().unwrap();
        assert_eq!(app.state.catalog.farmer_families(farmer_id).await.unwrap().len(), 1);

        let deleted = app.post(&format!("/farmer/{}/delete/", id), None, "").await;
        assert_eq!(location(&deleted), "/farmers/");
        assert_eq!(app.get(&detail, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let app = TestApp::new().await;
        app.state.auth.register_user("gardener", "secret", NewUser::default()).await.unwrap();

        let failed = app.post("/accounts/login/", None, "username=gardener&password=nope").await;
        assert_eq!(failed.status(), StatusCode::OK);
        assert!(body_text(failed).await.contains("Please enter a correct username and password"));

        let ok = app
            .post("/accounts/login/", None, "username=gardener&password=secret&next=/myvegetables/")
            .await;
        assert_eq!(ok.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&ok), "/myvegetables/");
        let cookie = ok
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        assert_eq!(app.get("/myvegetables/", Some(&cookie)).await.status(), StatusCode::OK);

        app.get("/accounts/logout/", Some(&cookie)).await;
        assert_eq!(app.get("/myvegetables/", Some(&cookie)).await.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_admin_is_staff_only() {
        let app = TestApp::new().await;
        assert_eq!(app.get("/admin/", None).await.status(), StatusCode::SEE_OTHER);

        let plain = app.login("plain", librarian()).await;
        assert_eq!(app.get("/admin/", Some(&plain)).await.status(), StatusCode::FORBIDDEN);

        let admin = app.login("root", NewUser::superuser()).await;
        let index = app.get("/admin/", Some(&admin)).await;
        assert_eq!(index.status(), StatusCode::OK);
        assert!(body_text(index).await.contains("Vegetable instances"));
        assert_eq!(app.get("/admin/group/", Some(&admin)).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_add_and_filter() {
        let app = TestApp::new().await;
        let admin = app.login("root", NewUser::superuser()).await;

        let added = app.post("/admin/family/add/", Some(&admin), "name=Allium").await;
        assert_eq!(added.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&added), "/admin/family/");
        assert!(body_text(app.get("/admin/family/", Some(&admin)).await).await.contains("Allium"));

        let rejected = app.post("/admin/family/add/", Some(&admin), "name=").await;
        assert_eq!(rejected.status(), StatusCode::OK);
        assert!(body_text(rejected).await.contains("This field is required."));

        app.loaned_instance(utils::today()).await;
        let on_loan = body_text(app.get("/admin/vegetableinstance/?status=o", Some(&admin)).await).await;
        assert!(on_loan.contains("Carrot"));
        assert!(on_loan.contains("1 vegetable instance<"));
        let available = body_text(app.get("/admin/vegetableinstance/?status=a", Some(&admin)).await).await;
        assert!(!available.contains("Carrot"));
        assert!(available.contains("0 vegetable instances"));

        let undated = body_text(app.get("/admin/vegetableinstance/?status=o&exp_date=no_date", Some(&admin)).await).await;
        assert!(!undated.contains("Carrot"));
        let due_today = body_text(app.get("/admin/vegetableinstance/?status=o&exp_date=today", Some(&admin)).await).await;
        assert!(due_today.contains("Carrot"));
        assert!(due_today.contains(r#"href="?status=a&amp;exp_date=today""#));
    }

    #[tokio::test]
    async fn test_admin_manages_users() {
        let app = TestApp::new().await;
        let admin = app.login("root", NewUser::superuser()).await;
        let reader = app.login("reader", NewUser::default()).await;
        let reader_id = app.state.auth.get_user_by_name("reader").await.unwrap().unwrap().id;
        assert_eq!(app.get("/borrowed/", Some(&reader)).await.status(), StatusCode::FORBIDDEN);
        assert!(body_text(app.get("/admin/user/", Some(&admin)).await).await.contains("reader"));

        let change = format!("/admin/user/{}/change/", reader_id);
        let granted = app
            .post(&change, Some(&admin), &format!("username=reader&permissions={}", CAN_MARK_RETURNED))
            .await;
        assert_eq!(granted.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&granted), "/admin/user/");
        assert_eq!(app.get("/borrowed/", Some(&reader)).await.status(), StatusCode::OK);

        let no_password = app.post("/admin/user/add/", Some(&admin), "username=newbie").await;
        assert_eq!(no_password.status(), StatusCode::OK);
        assert!(body_text(no_password).await.contains("This field is required."));
        let added = app.post("/admin/user/add/", Some(&admin), "username=newbie&password=sprout").await;
        assert_eq!(added.status(), StatusCode::SEE_OTHER);
        assert!(app.state.auth.authenticate("newbie", "sprout").await.is_ok());

        let id = app.loaned_instance(utils::today()).await;
        let inst = app.state.catalog.get_instance(&id).await.unwrap();
        app.state
            .catalog
            .update_instance(
                &id,
                InstanceInput {
                    vegetable_id: inst.vegetable_id,
                    harvest: inst.harvest,
                    exp_date: inst.exp_date,
                    status: LoanStatus::OnLoan,
                    borrower_id: Some(reader_id),
                },
            )
            .await
            .unwrap();

        let deleted = app.post(&format!("/admin/user/{}/delete/", reader_id), Some(&admin), "").await;
        assert_eq!(location(&deleted), "/admin/user/");
        let orphaned = app.state.catalog.get_instance(&id).await.unwrap();
        assert_eq!(orphaned.borrower_id, None);
        assert_eq!(orphaned.loan_status(), Some(LoanStatus::OnLoan));

        // the deleted account's session no longer counts as logged in
        assert_eq!(app.get("/myvegetables/", Some(&reader)).await.status(), StatusCode::SEE_OTHER);
    }
}
