// recipe-finder - search recipes everywhere, keep the ones you like
//
// Main entry point. Parses CLI args and dispatches to handlers.

use recipe_finder_lib::{
    core::{FavoritesView, Feed, Instructions, LoadOutcome, Provenance, SocialService},
    db::{FavoriteStub, NewRecipe},
    intelligence::SmartSearch,
    Aggregator, AppContext, Config, Database, Recipe, RecipeError, Result,
};
use std::env;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never mix with results
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    // Identity is handed in from outside, once, here
    let (user, rest) = take_flag(&args[2..], "--user");
    let mut ctx = AppContext::new();
    if let Some(user) = user {
        if let Err(e) = ctx.login(&user) {
            eprintln!("Error: {}", e.user_message());
            process::exit(1);
        }
    }

    let command = args[1].as_str();
    let result = match command {
        "search" => handle_search(&rest).await,
        "feed" => handle_feed(&rest).await,
        "show" => handle_show(&rest).await,
        "ask" => handle_ask(&rest).await,
        "publish" => handle_publish(&ctx, &rest).await,
        "mine" => handle_mine(&ctx).await,
        "delete" => handle_delete(&ctx, &rest).await,
        "like" => handle_like(&ctx, &rest).await,
        "review" => handle_review(&ctx, &rest).await,
        "reviews" => handle_reviews(&rest).await,
        "favorite" => handle_favorite(&ctx, &rest).await,
        "favorites" => handle_favorites(&ctx).await,
        "status" => handle_status().await,
        "version" | "-v" | "--version" => {
            println!("recipe-finder v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    };

    ctx.logout();

    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        process::exit(1);
    }
}

async fn handle_search(args: &[String]) -> Result<()> {
    let (offset, words) = take_flag(args, "--offset");
    let offset = offset.and_then(|o| o.parse::<u32>().ok()).unwrap_or(0);
    let query = words.join(" ");

    let (config, db) = open().await?;
    let aggregator = Aggregator::from_config(&config, db)?;
    let page = aggregator.search(&query, offset).await;

    if let Some(insight) = &page.insight {
        println!("\nAI insight: {}", insight.mood);
        if !insight.keywords.is_empty() {
            println!("  Looking for: {}", insight.keywords.join(", "));
        }
        if let Some(cuisine) = &insight.cuisine {
            println!("  Cuisine:     {}", cuisine);
        }
        if let Some(diet) = &insight.diet {
            println!("  Diet:        {}", diet);
        }
        println!("  Max time:    {} min", insight.max_time_minutes);
    }

    if page.results.is_empty() {
        println!("No recipes found matching '{}'", query);
        return Ok(());
    }

    println!(
        "\nShowing {} of {} recipe(s) (offset {}):",
        page.results.len(),
        page.total_count,
        page.offset
    );
    print_recipe_list(&page.results, page.offset as usize);

    Ok(())
}

async fn handle_feed(args: &[String]) -> Result<()> {
    let (pages, words) = take_flag(args, "--pages");
    let pages = pages.and_then(|p| p.parse::<u32>().ok()).unwrap_or(3);
    let query = words.join(" ");

    let (config, db) = open().await?;
    let feed = Feed::new(Arc::new(Aggregator::from_config(&config, db)?), query);

    for _ in 0..pages {
        match feed.load_next().await {
            LoadOutcome::Loaded(count) => println!("Loaded {} more recipe(s)", count),
            LoadOutcome::Suppressed => continue,
            LoadOutcome::Exhausted => {
                println!("That's everything.");
                break;
            }
        }
    }

    if let Some(insight) = feed.insight().await {
        println!("\nAI insight: {}", insight.mood);
    }
    print_recipe_list(&feed.results().await, 0);

    Ok(())
}

async fn handle_show(args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        eprintln!("Error: No recipe id provided");
        return Ok(());
    };

    let (config, db) = open().await?;
    let aggregator = Aggregator::from_config(&config, db.clone())?;
    let recipe = aggregator.find(id).await?;
    print_recipe(&recipe);

    let reviews = SocialService::new(db).reviews(&recipe.id).await?;
    if !reviews.is_empty() {
        println!("\nReviews:");
        for review in reviews {
            println!("  {} {}  - {}", "*".repeat(review.rating as usize), review.comment, review.user_id);
        }
    }

    Ok(())
}

async fn handle_ask(args: &[String]) -> Result<()> {
    let query = args.join(" ");

    let (config, db) = open().await?;
    let aggregator = Aggregator::from_config(&config, db.clone())?;
    let smart = SmartSearch::new(db, aggregator.interpreter());

    let response = smart.search(&query).await?;
    let insight = &response.interpretation;

    println!("\nAI insight: {}", insight.mood);
    println!("  Keywords: {}", insight.keywords.join(", "));
    println!("  Max time: {} min", insight.max_time_minutes);
    if insight.min_protein_grams > 0 {
        println!("  Protein:  at least {} g", insight.min_protein_grams);
    }

    if response.results.is_empty() {
        println!("\nNo community recipes match yet.");
    } else {
        print_recipe_list(&response.results, 0);
    }

    Ok(())
}

async fn handle_publish(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session = ctx.session()?;
    let (file, _) = take_flag(args, "--file");
    let Some(file) = file else {
        eprintln!("Error: --file <recipe.json> is required");
        return Ok(());
    };

    let input: NewRecipe = serde_json::from_str(&std::fs::read_to_string(&file)?)?;

    let (_, db) = open().await?;
    let recipe = SocialService::new(db).publish(session, input).await?;

    println!("Published '{}' as {}", recipe.title, recipe.id);
    Ok(())
}

async fn handle_mine(ctx: &AppContext) -> Result<()> {
    let session = ctx.session()?;
    let (_, db) = open().await?;

    let recipes = SocialService::new(db).my_recipes(session).await?;
    if recipes.is_empty() {
        println!("You haven't published any recipes yet.");
    } else {
        print_recipe_list(&recipes, 0);
    }
    Ok(())
}

async fn handle_delete(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session = ctx.session()?;
    let Some(id) = args.first() else {
        eprintln!("Error: No recipe id provided");
        return Ok(());
    };

    let (_, db) = open().await?;
    SocialService::new(db).delete(session, id).await?;

    println!("Deleted {}", id);
    Ok(())
}

async fn handle_like(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session = ctx.session()?;
    let Some(id) = args.first() else {
        eprintln!("Error: No recipe id provided");
        return Ok(());
    };

    let (_, db) = open().await?;
    let likes = SocialService::new(db).toggle_like(session, id).await?;

    let liked = likes.iter().any(|u| u == session.user_id());
    println!(
        "{} ({} like(s))",
        if liked { "Liked" } else { "Unliked" },
        likes.len()
    );
    Ok(())
}

async fn handle_review(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session = ctx.session()?;
    let (Some(id), Some(rating)) = (args.first(), args.get(1)) else {
        eprintln!("Error: usage: review <recipe-id> <rating 1-5> <comment>");
        return Ok(());
    };
    let rating = rating
        .parse::<i64>()
        .map_err(|_| RecipeError::InvalidReview(format!("'{}' is not a rating", rating)))?;
    let comment = args[2..].join(" ");

    let (_, db) = open().await?;
    SocialService::new(db)
        .add_review(session, id, rating, &comment)
        .await?;

    println!("Review saved");
    Ok(())
}

async fn handle_reviews(args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        eprintln!("Error: No recipe id provided");
        return Ok(());
    };

    let (_, db) = open().await?;
    let reviews = SocialService::new(db).reviews(id).await?;

    if reviews.is_empty() {
        println!("No reviews yet.");
    }
    for review in reviews {
        let when = review
            .created()
            .map(|t| t.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| review.created_at.clone());
        println!(
            "{}/5 by {} on {}\n  {}",
            review.rating, review.user_id, when, review.comment
        );
    }
    Ok(())
}

async fn handle_favorite(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session = ctx.session()?;
    let Some(id) = args.first() else {
        eprintln!("Error: No recipe id provided");
        return Ok(());
    };

    let (config, db) = open().await?;
    let social = SocialService::new(db.clone());

    // Save what we know about the recipe so favorites render without a lookup
    let recipe = Aggregator::from_config(&config, db)?.find(id).await.ok();
    let stub = FavoriteStub {
        recipe_id: id.clone(),
        title: recipe.as_ref().map(|r| r.title.clone()),
        image: recipe.as_ref().and_then(|r| r.image.clone()),
        is_custom: recipe
            .as_ref()
            .is_some_and(|r| r.source == Provenance::Local),
    };

    let view = FavoritesView::new();
    let notice = view.toggle_via(&social, session, &stub).await;
    if notice.is_error() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
    Ok(())
}

async fn handle_favorites(ctx: &AppContext) -> Result<()> {
    let session = ctx.session()?;
    let (_, db) = open().await?;

    let favorites = SocialService::new(db).favorites(session).await?;
    if favorites.is_empty() {
        println!("No favorites yet.");
    } else {
        print_recipe_list(&favorites, 0);
    }
    Ok(())
}

async fn handle_status() -> Result<()> {
    let (config, db) = open().await?;
    let stats = db.stats().await?;

    println!("\nrecipe-finder Status");
    println!("{}", "=".repeat(60));

    println!("\nSources:");
    println!("  TheMealDB:   {}", config.mealdb_base_url);
    println!(
        "  Spoonacular: {}",
        if config.spoonacular_key.is_some() { "configured" } else { "no API key" }
    );
    println!(
        "  Gemini:      {}",
        if config.gemini_key.is_some() { "configured" } else { "no API key" }
    );

    println!("\nLocal Store ({}):", db.path().display());
    println!("  Recipes:     {}", stats.total_recipes);
    println!("  Likes:       {}", stats.total_likes);
    println!("  Favorites:   {}", stats.total_favorites);
    println!("  Reviews:     {}", stats.total_reviews);

    println!("{}", "=".repeat(60));
    Ok(())
}

async fn open() -> Result<(Config, Arc<Database>)> {
    let config = Config::load()?;
    let db = Database::new(&config.db_path).await?;
    Ok((config, Arc::new(db)))
}

// Pull `--flag value` out of the args, returning the value and the rest
fn take_flag(args: &[String], flag: &str) -> (Option<String>, Vec<String>) {
    let mut value = None;
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            i += 1;
            if i < args.len() {
                value = Some(args[i].clone());
            }
        } else {
            rest.push(args[i].clone());
        }
        i += 1;
    }

    (value, rest)
}

fn print_recipe_list(recipes: &[Recipe], start: usize) {
    println!("{}", "=".repeat(60));
    for (i, recipe) in recipes.iter().enumerate() {
        println!(
            "{:3}. {} [{}] {} min, serves {} ({})",
            start + i + 1,
            recipe.title,
            recipe.id,
            recipe.ready_in_minutes,
            recipe.servings,
            recipe.source
        );
    }
    println!("{}", "=".repeat(60));
}

fn print_recipe(recipe: &Recipe) {
    println!("\n{}", recipe.title);
    println!("{}", "=".repeat(60));
    println!(
        "Ready in {} min | Serves {} | From {}",
        recipe.ready_in_minutes, recipe.servings, recipe.source
    );
    println!("Image: {}", recipe.image_or_placeholder());

    if !recipe.ingredients.is_empty() {
        println!("\nIngredients:");
        for ingredient in &recipe.ingredients {
            println!("  - {}", ingredient.original);
        }
    }

    println!("\nInstructions:");
    match &recipe.instructions {
        Instructions::Steps(steps) => {
            for step in steps {
                println!("  {}. {}", step.number, step.text);
            }
        }
        Instructions::Narrative(text) => println!("  {}", text),
    }
}

fn print_usage() {
    println!(
        r#"recipe-finder v{} - Find recipes everywhere, keep the ones you love

USAGE:
    recipe-finder <COMMAND> [OPTIONS] [--user <id>]

COMMANDS:
    search <query> [--offset N]     Search every recipe source
    feed <query> [--pages N]        Scroll through results page by page
    show <id>                       Show one recipe and its reviews
    ask <query>                     AI search over community recipes
    publish --file <recipe.json>    Publish your own recipe
    mine                            List recipes you published
    delete <id>                     Delete a recipe you published
    like <id>                       Like or unlike a community recipe
    review <id> <1-5> <comment>     Review any recipe
    reviews <id>                    Show reviews for a recipe
    favorite <id>                   Save or unsave a recipe
    favorites                       List your saved recipes
    status                          Show configuration and stats
    version                         Show version
    help                            Show this help

Commands that change your data need --user.

EXAMPLES:
    recipe-finder search chicken curry
    recipe-finder show 52772
    recipe-finder ask "quick high protein vegetarian dinner"
    recipe-finder favorite 101 --user alice

ENVIRONMENT:
    SPOONACULAR_API_KEY, GEMINI_API_KEY, RECIPE_FINDER_DB, RUST_LOG
"#,
        env!("CARGO_PKG_VERSION")
    );
}
