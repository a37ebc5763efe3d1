use robotrader::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Robots, Users,
        robots::{self, ListingStatus, Location, RobotCondition, Specifications},
        users::{self, UserRole},
    },
    services::auth_service::hash_password,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let seller_id = ensure_seller(&orm, "Tesla Sales", "tesla@example.com", "hashedpassword123").await?;

    let cleared = Robots::delete_many().exec(&orm).await?;
    println!("Cleared {} existing robots", cleared.rows_affected);

    seed_robots(&orm, seller_id).await?;

    orm.close().await?;
    println!("Seed completed. Seller ID: {seller_id}");
    Ok(())
}

async fn ensure_seller(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let existing = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?;

    let user = match existing {
        Some(user) => {
            let mut active: users::ActiveModel = user.into();
            active.name = Set(name.to_string());
            active.password_hash = Set(password_hash);
            active.role = Set(UserRole::Seller);
            active.update(orm).await?
        }
        None => {
            users::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                email: Set(email.to_string()),
                password_hash: Set(password_hash),
                phone: Set(None),
                role: Set(UserRole::Seller),
                ratings: Set(Some(5.0)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(orm)
            .await?
        }
    };

    println!("Ensured seller {email}");
    Ok(user.id)
}

async fn seed_robots(orm: &DatabaseConnection, seller_id: Uuid) -> anyhow::Result<()> {
    let optimus = robots::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Tesla Optimus Gen 2".to_string()),
        description: Set(
            "The Future of Intelligent Robotics - Tesla's advanced humanoid robot designed for \
             everyday assistance and automation."
                .to_string(),
        ),
        price: Set(19999.0),
        manufacturer: Set("Tesla".to_string()),
        model_name: Set("Optimus".to_string()),
        year: Set(2025),
        condition: Set(RobotCondition::New),
        features: Set(vec![
            "AI-Powered Neural Network with Tesla's proprietary AI".to_string(),
            "Multi-Task Capabilities for household and workplace tasks".to_string(),
            "8-hour battery life with 2-hour charging".to_string(),
            "Tesla Supercharger compatibility".to_string(),
            "Tesla App Integration".to_string(),
            "TeslaOS operating system".to_string(),
        ]),
        specifications: Set(Specifications {
            height: "5'8\" (173 cm)".to_string(),
            weight: "125 lbs (57 kg)".to_string(),
            battery_life: "8 hours".to_string(),
            max_lift_capacity: "45 lbs (20 kg)".to_string(),
            processing_unit: "Tesla Dojo AI Chip".to_string(),
            connectivity: "Wi-Fi 6E, 5G, Bluetooth 5.2".to_string(),
            sensors: "8 high-definition cameras, LiDAR, ultrasonic sensors".to_string(),
        }),
        images: Set(vec!["https://example.com/tesla-bot-main.jpg".to_string()]),
        seller_id: Set(seller_id),
        location: Set(Some(Location {
            city: Some("Fremont".to_string()),
            state: Some("CA".to_string()),
            country: Some("USA".to_string()),
            coordinates: None,
        })),
        status: Set(ListingStatus::Available),
        created_at: NotSet,
        updated_at: NotSet,
    };

    let robot = optimus.insert(orm).await?;
    println!("Inserted {}", robot.title);
    Ok(())
}
