//! Seed the catalog with taxonomies and a starter set of games.
//!
//! Idempotent: taxonomy inserts use `ON CONFLICT DO NOTHING` and games are
//! skipped when a game with the same title already exists, so re-running the
//! command is safe.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

const PUBLISHERS: &[&str] = &[
    "Catan Studio",
    "Days of Wonder",
    "Stonemaier Games",
    "Czech Games Edition",
    "Repos Production",
];

const GENRES: &[&str] = &[
    "Strategy",
    "Family",
    "Party",
    "Cooperative",
    "Economic",
    "Adventure",
];

const MECHANICS: &[&str] = &[
    "Dice rolling",
    "Worker placement",
    "Set collection",
    "Tile placement",
    "Hand management",
    "Route building",
];

const GAME_TYPES: &[&str] = &["Board game", "Card game", "Dice game"];

const PLAYER_COUNTS: &[&str] = &["1-2", "2-4", "2-5", "3-6", "4+"];

const AGE_GROUPS: &[&str] = &["6+", "8+", "10+", "12+", "14+"];

const DIFFICULTY_LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced", "Expert"];

const DURATIONS: &[&str] = &["< 30 min", "30-60 min", "60-120 min", "> 120 min"];

struct SeedGame {
    title: &'static str,
    description: &'static str,
    rules_summary: &'static str,
    release_year: i32,
    price_cents: i64,
    discount_price_cents: Option<i64>,
    stock: i32,
    publisher: &'static str,
    player_count: &'static str,
    age_group: &'static str,
    difficulty: &'static str,
    duration: &'static str,
    genres: &'static [&'static str],
    mechanics: &'static [&'static str],
    game_types: &'static [&'static str],
}

const GAMES: &[SeedGame] = &[
    SeedGame {
        title: "Catan",
        description: "Settle the island: trade resources, build roads and cities.",
        rules_summary: "Roll for production, trade with neighbors, build toward 10 victory points.",
        release_year: 1995,
        price_cents: 4499,
        discount_price_cents: None,
        stock: 25,
        publisher: "Catan Studio",
        player_count: "3-6",
        age_group: "10+",
        difficulty: "Beginner",
        duration: "60-120 min",
        genres: &["Strategy", "Family"],
        mechanics: &["Dice rolling", "Route building", "Hand management"],
        game_types: &["Board game"],
    },
    SeedGame {
        title: "Ticket to Ride",
        description: "Claim railway routes across the map before your rivals.",
        rules_summary: "Draw train cards, claim routes, complete destination tickets.",
        release_year: 2004,
        price_cents: 5499,
        discount_price_cents: Some(4999),
        stock: 18,
        publisher: "Days of Wonder",
        player_count: "2-5",
        age_group: "8+",
        difficulty: "Beginner",
        duration: "30-60 min",
        genres: &["Family", "Strategy"],
        mechanics: &["Set collection", "Route building"],
        game_types: &["Board game"],
    },
    SeedGame {
        title: "Wingspan",
        description: "Attract a flock of birds to your wildlife preserves.",
        rules_summary: "Play birds, gather food, lay eggs; engine-building over four rounds.",
        release_year: 2019,
        price_cents: 6500,
        discount_price_cents: None,
        stock: 12,
        publisher: "Stonemaier Games",
        player_count: "1-2",
        age_group: "10+",
        difficulty: "Intermediate",
        duration: "60-120 min",
        genres: &["Strategy"],
        mechanics: &["Hand management", "Set collection"],
        game_types: &["Board game", "Card game"],
    },
    SeedGame {
        title: "Codenames",
        description: "Give one-word clues to help your team find its agents.",
        rules_summary: "Spymasters clue words; teams guess without hitting the assassin.",
        release_year: 2015,
        price_cents: 1999,
        discount_price_cents: None,
        stock: 40,
        publisher: "Czech Games Edition",
        player_count: "4+",
        age_group: "12+",
        difficulty: "Beginner",
        duration: "< 30 min",
        genres: &["Party"],
        mechanics: &["Hand management"],
        game_types: &["Card game"],
    },
    SeedGame {
        title: "7 Wonders",
        description: "Lead an ancient civilization through three ages of drafting.",
        rules_summary: "Draft cards, develop science, military and trade, build your wonder.",
        release_year: 2010,
        price_cents: 4999,
        discount_price_cents: Some(4499),
        stock: 9,
        publisher: "Repos Production",
        player_count: "3-6",
        age_group: "10+",
        difficulty: "Intermediate",
        duration: "30-60 min",
        genres: &["Strategy", "Economic"],
        mechanics: &["Hand management", "Set collection"],
        game_types: &["Card game"],
    },
];

/// Seed taxonomies and sample games.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    insert_names(&pool, "publisher", PUBLISHERS).await?;
    insert_names(&pool, "genre", GENRES).await?;
    insert_names(&pool, "mechanic", MECHANICS).await?;
    insert_names(&pool, "game_type", GAME_TYPES).await?;
    insert_names(&pool, "player_count", PLAYER_COUNTS).await?;
    insert_names(&pool, "age_group", AGE_GROUPS).await?;
    insert_names(&pool, "difficulty_level", DIFFICULTY_LEVELS).await?;
    insert_names(&pool, "duration", DURATIONS).await?;
    info!("Taxonomies seeded");

    let mut created = 0usize;
    for game in GAMES {
        if insert_game(&pool, game).await? {
            created += 1;
        }
    }
    info!(created, total = GAMES.len(), "Games seeded");

    Ok(())
}

async fn insert_names(
    pool: &PgPool,
    table: &str,
    names: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    for name in names {
        sqlx::query(&format!(
            "INSERT INTO storefront.{table} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING"
        ))
        .bind(name)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Insert one game with its taxonomy links. Returns `false` if a game with
/// the same title already exists.
async fn insert_game(pool: &PgPool, game: &SeedGame) -> Result<bool, Box<dyn std::error::Error>> {
    let price = Decimal::new(game.price_cents, 2);
    let discount_price = game
        .discount_price_cents
        .map_or(price, |cents| Decimal::new(cents, 2));

    let mut tx = pool.begin().await?;

    let inserted: Option<(i32,)> = sqlx::query_as(
        r"
        INSERT INTO storefront.game
            (title, description, rules_summary, release_year, price, discount_price, stock,
             publisher_id, player_count_id, age_group_id, difficulty_id, duration_id)
        SELECT $1, $2, $3, $4, $5, $6, $7, p.id, pc.id, ag.id, dl.id, du.id
        FROM storefront.publisher p,
             storefront.player_count pc,
             storefront.age_group ag,
             storefront.difficulty_level dl,
             storefront.duration du
        WHERE p.name = $8 AND pc.name = $9 AND ag.name = $10 AND dl.name = $11 AND du.name = $12
          AND NOT EXISTS (SELECT 1 FROM storefront.game WHERE title = $1)
        RETURNING id
        ",
    )
    .bind(game.title)
    .bind(game.description)
    .bind(game.rules_summary)
    .bind(game.release_year)
    .bind(price)
    .bind(discount_price)
    .bind(game.stock)
    .bind(game.publisher)
    .bind(game.player_count)
    .bind(game.age_group)
    .bind(game.difficulty)
    .bind(game.duration)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((game_id,)) = inserted else {
        tx.rollback().await?;
        return Ok(false);
    };

    link_taxonomy(&mut tx, "game_genre", "genre_id", "genre", game_id, game.genres).await?;
    link_taxonomy(
        &mut tx,
        "game_mechanic",
        "mechanic_id",
        "mechanic",
        game_id,
        game.mechanics,
    )
    .await?;
    link_taxonomy(
        &mut tx,
        "game_game_type",
        "game_type_id",
        "game_type",
        game_id,
        game.game_types,
    )
    .await?;

    tx.commit().await?;
    Ok(true)
}

async fn link_taxonomy(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    join_table: &str,
    join_column: &str,
    lookup_table: &str,
    game_id: i32,
    names: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<String> = names.iter().map(ToString::to_string).collect();
    sqlx::query(&format!(
        "INSERT INTO storefront.{join_table} (game_id, {join_column}) \
         SELECT $1, t.id FROM storefront.{lookup_table} t WHERE t.name = ANY($2) \
         ON CONFLICT DO NOTHING"
    ))
    .bind(game_id)
    .bind(names)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
