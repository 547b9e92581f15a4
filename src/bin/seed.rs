//! Replaces the product catalog with the stock supermarket assortment and
//! makes sure the admin account exists. Run against a fresh or existing
//! database; existing products are dropped first.

use freshmart_back::{config::AppConfig, database};
use rust_decimal::{Decimal, dec};
use sqlx::PgPool;
use tracing::Level;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    image: &'static str,
    category: &'static str,
    stock: i32,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct { name: "Fresh Bananas", description: "Ripe yellow bananas - 1kg", price: dec!(60), image: "https://images.unsplash.com/photo-1571771894821-ce9b6c11b08e?w=500", category: "fruits", stock: 100 },
    SeedProduct { name: "Red Apples", description: "Crisp red apples - 1kg", price: dec!(180), image: "https://images.unsplash.com/photo-1560806887-1e4cd0b6cbd6?w=500", category: "fruits", stock: 80 },
    SeedProduct { name: "Fresh Oranges", description: "Juicy oranges - 1kg", price: dec!(120), image: "https://images.unsplash.com/photo-1547514701-42782101795e?w=500", category: "fruits", stock: 90 },
    SeedProduct { name: "Fresh Tomatoes", description: "Red ripe tomatoes - 1kg", price: dec!(40), image: "https://images.unsplash.com/photo-1546470427-e26264be0b0d?w=500", category: "vegetables", stock: 120 },
    SeedProduct { name: "Green Spinach", description: "Fresh leafy spinach - 500g", price: dec!(30), image: "https://images.unsplash.com/photo-1576045057995-568f588f82fb?w=500", category: "vegetables", stock: 60 },
    SeedProduct { name: "Onions", description: "Fresh red onions - 1kg", price: dec!(35), image: "https://images.unsplash.com/photo-1518977676601-b53f82aba655?w=500", category: "vegetables", stock: 150 },
    SeedProduct { name: "Fresh Milk", description: "Full cream milk - 1L", price: dec!(65), image: "https://images.unsplash.com/photo-1563636619-e9143da7973b?w=500", category: "dairy", stock: 50 },
    SeedProduct { name: "Cheddar Cheese", description: "Aged cheddar cheese - 200g", price: dec!(180), image: "https://images.unsplash.com/photo-1486297678162-eb2a19b0a32d?w=500", category: "dairy", stock: 30 },
    SeedProduct { name: "Greek Yogurt", description: "Thick Greek yogurt - 400g", price: dec!(120), image: "https://images.unsplash.com/photo-1488477181946-6428a0291777?w=500", category: "dairy", stock: 40 },
    SeedProduct { name: "White Bread", description: "Fresh white bread loaf", price: dec!(45), image: "https://images.unsplash.com/photo-1509440159596-0249088772ff?w=500", category: "bakery", stock: 25 },
    SeedProduct { name: "Croissants", description: "Buttery croissants - pack of 6", price: dec!(150), image: "https://images.unsplash.com/photo-1555507036-ab794f4afe5e?w=500", category: "bakery", stock: 20 },
    SeedProduct { name: "Orange Juice", description: "Fresh orange juice - 1L", price: dec!(120), image: "https://images.unsplash.com/photo-1621506289937-a8e4df240d0b?w=500", category: "beverages", stock: 35 },
    SeedProduct { name: "Green Tea", description: "Premium green tea bags - 25 count", price: dec!(180), image: "https://images.unsplash.com/photo-1556679343-c7306c1976bc?w=500", category: "beverages", stock: 45 },
    SeedProduct { name: "Mixed Nuts", description: "Roasted mixed nuts - 250g", price: dec!(320), image: "https://images.unsplash.com/photo-1599599810769-bcde5a160d32?w=500", category: "snacks", stock: 60 },
    SeedProduct { name: "Potato Chips", description: "Crispy potato chips - 150g", price: dec!(45), image: "https://images.unsplash.com/photo-1566478989037-eec170784d0b?w=500", category: "snacks", stock: 80 },
    SeedProduct { name: "Dish Soap", description: "Liquid dish washing soap - 500ml", price: dec!(85), image: "https://images.unsplash.com/photo-1583947215259-38e31be8751f?w=500", category: "household", stock: 40 },
    SeedProduct { name: "Toilet Paper", description: "Soft toilet paper - 8 rolls", price: dec!(180), image: "https://images.unsplash.com/photo-1584464491033-06628f3a6b7b?w=500", category: "household", stock: 30 },
    SeedProduct { name: "Shampoo", description: "Herbal shampoo - 400ml", price: dec!(220), image: "https://images.unsplash.com/photo-1571781926291-c477ebfd024b?w=500", category: "personal-care", stock: 25 },
    SeedProduct { name: "Toothpaste", description: "Fluoride toothpaste - 100g", price: dec!(65), image: "https://images.unsplash.com/photo-1607613009820-a29f7bb81c04?w=500", category: "personal-care", stock: 50 },
    SeedProduct { name: "Notebook Set", description: "A4 ruled notebooks - pack of 5", price: dec!(180), image: "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=500", category: "stationery", stock: 40 },
    SeedProduct { name: "Pen Set", description: "Blue ballpoint pens - pack of 10", price: dec!(120), image: "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=500", category: "stationery", stock: 60 },
    SeedProduct { name: "Basmati Rice", description: "Premium basmati rice - 5kg", price: dec!(450), image: "https://images.unsplash.com/photo-1586201375761-83865001e31c?w=500", category: "grains", stock: 30 },
    SeedProduct { name: "Wheat Flour", description: "Whole wheat flour - 2kg", price: dec!(120), image: "https://images.unsplash.com/photo-1574323347407-f5e1ad6d020b?w=500", category: "grains", stock: 25 },
];

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match database::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = seed_catalog(&pool).await {
        tracing::error!("Seeding failed: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = seed_admin(&pool).await {
        tracing::error!("Admin account setup failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Done");
}

async fn seed_catalog(pool: &PgPool) -> freshmart_back::Result<()> {
    sqlx::query("DELETE FROM products").execute(pool).await?;
    tracing::info!("Cleared existing products");

    let names: Vec<&str> = CATALOG.iter().map(|p| p.name).collect();
    let descriptions: Vec<&str> = CATALOG.iter().map(|p| p.description).collect();
    let prices: Vec<Decimal> = CATALOG.iter().map(|p| p.price).collect();
    let images: Vec<&str> = CATALOG.iter().map(|p| p.image).collect();
    let categories: Vec<&str> = CATALOG.iter().map(|p| p.category).collect();
    let stocks: Vec<i32> = CATALOG.iter().map(|p| p.stock).collect();

    sqlx::query(
        "INSERT INTO products (name, description, price, image_url, category, stock)
         SELECT unnest($1::varchar[]), unnest($2::text[]), unnest($3::decimal[]),
                unnest($4::text[]), unnest($5::varchar[]), unnest($6::int[])",
    )
    .bind(&names)
    .bind(&descriptions)
    .bind(&prices)
    .bind(&images)
    .bind(&categories)
    .bind(&stocks)
    .execute(pool)
    .await?;

    tracing::info!("Added {} supermarket products", CATALOG.len());
    Ok(())
}

async fn seed_admin(pool: &PgPool) -> freshmart_back::Result<()> {
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@freshmart.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme123".to_string());

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST).map_err(|e| {
        freshmart_back::AppError::InternalError(format!("Password hashing failed: {}", e))
    })?;

    let result = sqlx::query(
        "INSERT INTO users (email, name, password, role)
         VALUES ($1, 'Admin', $2, 'admin')
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(&email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        tracing::info!("Created admin account {}", email);
    } else {
        tracing::info!("Admin account {} already exists", email);
    }

    Ok(())
}
