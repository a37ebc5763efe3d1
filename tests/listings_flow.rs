use robotrader::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        robots::{CreateRobotRequest, UpdateRobotRequest},
        users::{ChangePasswordRequest, UpdateProfileRequest},
    },
    entity::{
        Users,
        robots::{ListingStatus, RobotCondition, Specifications},
        users::{self, UserRole},
    },
    error::AppError,
    middleware::auth::{AuthUser, verify_token},
    routes::params::RobotQuery,
    services::{auth_service, robot_service, user_service},
    state::AppState,
};
use axum::http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::time::Duration;
use uuid::Uuid;

// Each run uses fresh emails and a fresh manufacturer, so rows left behind by
// earlier runs never change what is asserted here.
#[tokio::test]
async fn seller_listing_search_and_favorites_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let run = Uuid::new_v4().simple().to_string();
    let manufacturer = format!("Acme-{run}");

    // Register a seller and a buyer; the token must carry the new user's id.
    let seller = register(&state, "Sam Seller", &format!("seller-{run}@example.com"), Some(UserRole::Seller)).await?;
    let buyer = register(&state, "Bo Buyer", &format!("buyer-{run}@example.com"), None).await?;
    assert_eq!(buyer.user.role, UserRole::User);

    // Duplicate email is refused and no second row appears.
    let duplicate = auth_service::register_user(
        &state,
        register_request("Again", &format!("seller-{run}@example.com"), None),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));
    let same_email = Users::find()
        .filter(users::Column::Email.eq(format!("seller-{run}@example.com")))
        .count(&state.orm)
        .await?;
    assert_eq!(same_email, 1);

    // Registering as admin is not allowed.
    let admin = auth_service::register_user(
        &state,
        register_request("Root", &format!("root-{run}@example.com"), Some(UserRole::Admin)),
    )
    .await;
    assert!(matches!(admin, Err(AppError::BadRequest(_))));

    // Seller lists three robots.
    let cheap = create(&state, &seller, &manufacturer, "Helper Bot", 1500.0, RobotCondition::New).await?;
    let mid = create(&state, &seller, &manufacturer, "Warehouse Picker", 4000.0, RobotCondition::Good).await?;
    let marker = format!("zx{run}");
    let pricey = create(
        &state,
        &seller,
        &manufacturer,
        &format!("Surgical Arm {marker}"),
        9000.0,
        RobotCondition::New,
    )
    .await?;
    assert_eq!(cheap.seller_id, seller.id());
    assert_eq!(cheap.status, ListingStatus::Available);

    // Manufacturer and condition filters combine with AND, newest first.
    let filtered = robot_service::list_robots(
        &state,
        RobotQuery {
            manufacturer: Some(manufacturer.clone()),
            condition: Some(RobotCondition::New),
            ..Default::default()
        },
    )
    .await?;
    let ids: Vec<Uuid> = filtered.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![pricey.id, cheap.id]);

    // Price range is inclusive on both ends.
    let in_range = robot_service::list_robots(
        &state,
        RobotQuery {
            manufacturer: Some(manufacturer.clone()),
            price_range: Some("1500-4000".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let ids: Vec<Uuid> = in_range.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![mid.id, cheap.id]);

    // Listings embed a seller summary without contact details.
    let listed = robot_service::list_robots(
        &state,
        RobotQuery {
            search: Some("surgical".to_string()),
            manufacturer: Some(manufacturer.clone()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(listed.len(), 1);
    let summary = listed[0].seller.as_ref().expect("seller populated");
    assert_eq!(summary.name, "Sam Seller");
    assert!(summary.email.is_none());

    // Single view carries the seller's contact.
    let detail = robot_service::get_robot(&state, mid.id).await?;
    let contact = detail.seller.expect("seller populated");
    assert_eq!(contact.email.as_deref(), Some(format!("seller-{run}@example.com").as_str()));

    // Full-text search matches on any of the words and populates the seller summary.
    let found = robot_service::search_robots(&state, &format!("{marker} qqqnowhere")).await?;
    let ids: Vec<Uuid> = found.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![pricey.id]);
    assert_eq!(found[0].seller.as_ref().map(|s| s.name.as_str()), Some("Sam Seller"));
    assert!(robot_service::search_robots(&state, "   ").await?.is_empty());

    // A malformed search regex is the client's fault.
    let bad_pattern = robot_service::list_robots(
        &state,
        RobotQuery {
            search: Some("(".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect_err("unbalanced paren is not a valid regex");
    assert_eq!(bad_pattern.status(), StatusCode::BAD_REQUEST);
    assert_eq!(bad_pattern.client_message(), "Invalid search pattern");

    // Only the seller may change or remove a listing.
    let forbidden = robot_service::update_robot(
        &state,
        &buyer,
        mid.id,
        UpdateRobotRequest {
            price: Some(1.0),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));
    let forbidden = robot_service::delete_robot(&state, &buyer, mid.id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

    let updated = robot_service::update_robot(
        &state,
        &seller,
        mid.id,
        UpdateRobotRequest {
            price: Some(3500.0),
            status: Some(ListingStatus::Pending),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.price, 3500.0);
    assert_eq!(updated.status, ListingStatus::Pending);
    assert_eq!(updated.title, "Warehouse Picker");
    assert!(updated.updated_at >= mid.updated_at);

    // Favorites keep insertion order and toggling twice restores the list.
    user_service::toggle_favorite(&state, &buyer, pricey.id).await?;
    let ids = user_service::toggle_favorite(&state, &buyer, cheap.id).await?;
    assert_eq!(ids, vec![pricey.id, cheap.id]);

    let ids = user_service::toggle_favorite(&state, &buyer, pricey.id).await?;
    assert_eq!(ids, vec![cheap.id]);
    let ids = user_service::toggle_favorite(&state, &buyer, pricey.id).await?;
    assert_eq!(ids, vec![cheap.id, pricey.id]);

    let favorites = user_service::list_favorites(&state, &buyer).await?;
    let favorite_ids: Vec<Uuid> = favorites.iter().map(|r| r.id).collect();
    assert_eq!(favorite_ids, vec![cheap.id, pricey.id]);

    let missing = user_service::toggle_favorite(&state, &buyer, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Deleting a listing also drops it from favorites.
    robot_service::delete_robot(&state, &seller, pricey.id).await?;
    let gone = robot_service::get_robot(&state, pricey.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let favorites = user_service::list_favorites(&state, &buyer).await?;
    assert_eq!(favorites.len(), 1);

    let listings = robot_service::list_seller_robots(&state, &seller).await?;
    assert_eq!(listings.len(), 2);

    Ok(())
}

#[tokio::test]
async fn profile_and_password_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let run = Uuid::new_v4().simple().to_string();
    let email = format!("profile-{run}@example.com");

    let user = register(&state, "Pat", &email, None).await?;

    let updated = user_service::update_profile(
        &state,
        &user,
        UpdateProfileRequest {
            name: Some("Patricia".to_string()),
            phone: Some("555-0100".to_string()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.name, "Patricia");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));

    let user = reload(&state, user.id()).await?;
    let wrong = user_service::change_password(
        &state,
        &user,
        ChangePasswordRequest {
            current_password: "not-it".to_string(),
            new_password: "brand-new-pass".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    user_service::change_password(
        &state,
        &user,
        ChangePasswordRequest {
            current_password: "secret-pass".to_string(),
            new_password: "brand-new-pass".to_string(),
        },
    )
    .await?;

    let old = auth_service::login_user(
        &state,
        LoginRequest {
            email: email.clone(),
            password: "secret-pass".to_string(),
        },
    )
    .await;
    assert!(matches!(old, Err(AppError::Unauthorized(_))));

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: email.clone(),
            password: "brand-new-pass".to_string(),
        },
    )
    .await?;
    assert_eq!(login.user.id, user.id());

    let user = reload(&state, user.id()).await?;
    user_service::delete_account(&state, &user).await?;
    assert!(Users::find_by_id(user.id()).one(&state.orm).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn slow_listing_query_times_out() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let mut config = (*state.config).clone();
    config.list_query_timeout = Duration::ZERO;
    let state = AppState::new(state.orm.clone(), config);

    let err = robot_service::list_robots(&state, RobotQuery::default())
        .await
        .expect_err("no query answers within zero time");
    assert!(matches!(err, AppError::Timeout));
    assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            return Ok(None);
        }
    };

    let config = AppConfig::new(database_url, "integration-secret");
    let orm = create_orm_conn(&config).await?;
    run_migrations(&orm).await?;
    Ok(Some(AppState::new(orm, config)))
}

fn register_request(name: &str, email: &str, role: Option<UserRole>) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret-pass".to_string(),
        phone: None,
        role,
    }
}

async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    role: Option<UserRole>,
) -> anyhow::Result<AuthUser> {
    let auth = auth_service::register_user(state, register_request(name, email, role))
        .await?;
    assert_eq!(verify_token(&auth.token, &state.config.jwt_secret)?, auth.user.id);
    reload(state, auth.user.id).await
}

async fn reload(state: &AppState, id: Uuid) -> anyhow::Result<AuthUser> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {id} missing"))?;
    Ok(AuthUser { user })
}

async fn create(
    state: &AppState,
    seller: &AuthUser,
    manufacturer: &str,
    title: &str,
    price: f64,
    condition: RobotCondition,
) -> anyhow::Result<robotrader::models::Robot> {
    let robot = robot_service::create_robot(
        state,
        seller,
        CreateRobotRequest {
            title: title.to_string(),
            description: format!("{title} for sale"),
            price,
            manufacturer: manufacturer.to_string(),
            model: "M1".to_string(),
            year: 2024,
            condition,
            features: vec!["autonomous navigation".to_string()],
            specifications: Specifications {
                height: "120 cm".to_string(),
                weight: "40 kg".to_string(),
                battery_life: "6 hours".to_string(),
                max_lift_capacity: "10 kg".to_string(),
                processing_unit: "ARM".to_string(),
                connectivity: "Wi-Fi".to_string(),
                sensors: "Cameras".to_string(),
            },
            images: Vec::new(),
            location: None,
            status: None,
        },
    )
    .await?;
    Ok(robot)
}
